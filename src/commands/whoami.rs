use std::io::Write;
use tracing::{info, instrument};

use super::Context;
use crate::auth::AuthError;
use crate::config::write_username;
use crate::error::{GizzError, Result};

/// Show the configured username, or store a new one.
#[instrument(skip(ctx, out))]
pub async fn whoami(ctx: &Context, user: Option<&str>, out: &mut dyn Write) -> Result<()> {
    match user {
        None => match ctx.auth.username() {
            Ok(name) => writeln!(out, "{}", name)?,
            Err(AuthError::UnknownUser) => writeln!(
                out,
                "Unknown user: set your GitHub username with gizz whoami <username>"
            )?,
            Err(err) => return Err(err.into()),
        },
        Some(name) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(GizzError::InvalidArgument("username must not be blank".to_string()));
            }
            let path = ctx.auth.username_file();
            write_username(path, name)?;
            info!(path = %path.display(), "stored username");
            writeln!(out, "Username set to {}", name)?;
        }
    }
    Ok(())
}
