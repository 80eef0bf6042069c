//! Capture a pull request title and body through the user's editor.

use std::io::Write;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

const IGNORE_MARKER: &str = "/// ALL LINES BELOW ARE IGNORED";

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Failed to prepare message file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Editor `{editor}` exited unsuccessfully")]
    Failed { editor: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitledMessage {
    pub title: String,
    /// Empty, or ending in a single newline.
    pub body: String,
}

/// Initial contents of the message file.
pub fn template(context: &[String]) -> String {
    let mut text = format!("\n{}\n\n", IGNORE_MARKER);
    text.push_str("/// FIRST LINE SHOULD CONTAIN THE TITLE\n");
    text.push_str("/// SUBSEQUENT LINES SHOULD CONTAIN THE BODY\n\n");
    for line in context {
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Split edited text into title and body. Everything from the marker line
/// down is dropped. None when there is no title.
pub fn parse_titled_message(text: &str) -> Option<TitledMessage> {
    let kept = match text.find(IGNORE_MARKER) {
        Some(idx) => &text[..idx],
        None => text,
    };
    let kept = kept.trim();
    let (title, body) = kept.split_once('\n').unwrap_or((kept, ""));
    let title = title.trim();
    if title.is_empty() {
        return None;
    }

    let mut body = body.trim().to_string();
    if !body.is_empty() {
        body.push('\n');
    }
    Some(TitledMessage {
        title: title.to_string(),
        body,
    })
}

/// `$VISUAL`, then `$EDITOR`, then `vi`.
fn editor_command() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Open the editor on a temporary message file and parse what it leaves.
///
/// Returns None when the file is left unchanged or without a title. The
/// file is removed on every path out of this function.
#[instrument(skip(context))]
pub async fn edit_titled_message(context: &[String]) -> Result<Option<TitledMessage>, EditorError> {
    let initial = template(context);
    let mut file = NamedTempFile::new()?;
    file.write_all(initial.as_bytes())?;
    file.flush()?;

    let editor = editor_command();
    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or("vi");
    debug!(%editor, path = %file.path().display(), "launching editor");

    let status = Command::new(program)
        .args(words)
        .arg(file.path())
        .status()
        .await?;
    if !status.success() {
        return Err(EditorError::Failed { editor });
    }

    let edited = tokio::fs::read_to_string(file.path()).await?;
    if edited == initial {
        debug!("message left unchanged");
        return Ok(None);
    }
    Ok(parse_titled_message(&edited))
}
