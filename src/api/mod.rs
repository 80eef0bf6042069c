pub mod http;

pub use http::HttpClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::auth::Credentials;

/// Named values substituted into a path template such as `/repos/{user}/{repo}`.
pub type PathParams<'a> = [(&'a str, &'a str)];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("GitHub API returned {status}: {}", message_or_body(.body))]
    Remote { status: u16, body: String },

    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from GitHub API: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No value supplied for path parameter `{0}`")]
    MissingParam(String),

    #[error("Malformed path template: {0}")]
    BadTemplate(String),
}

impl ApiError {
    /// The `message` field of a JSON error body, if the API sent one.
    pub fn remote_message(&self) -> Option<String> {
        match self {
            ApiError::Remote { body, .. } => json_message(body),
            _ => None,
        }
    }
}

fn json_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
}

fn message_or_body(body: &str) -> String {
    json_message(body).unwrap_or_else(|| body.to_string())
}

/// Single-shot access to the JSON API host.
///
/// Implementations return the decoded body on success and never retry.
/// Credentials are only attached when the caller passes them.
#[async_trait]
pub trait RestClient: Send + Sync {
    async fn get(&self, path: &str, params: &PathParams<'_>) -> Result<Value, ApiError>;

    async fn post(
        &self,
        path: &str,
        params: &PathParams<'_>,
        body: Option<Value>,
        credentials: Option<&Credentials>,
    ) -> Result<Value, ApiError>;

    async fn put(
        &self,
        path: &str,
        params: &PathParams<'_>,
        body: Option<Value>,
        credentials: Option<&Credentials>,
    ) -> Result<Value, ApiError>;
}

/// Fill every `{name}` placeholder in `template` from `params`.
///
/// Every placeholder must have a value; extra params are ignored.
pub fn expand_path(template: &str, params: &PathParams<'_>) -> Result<String, ApiError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| ApiError::BadTemplate(template.to_string()))?;
        let name = &after[..close];
        if name.is_empty() {
            return Err(ApiError::BadTemplate(template.to_string()));
        }
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| ApiError::MissingParam(name.to_string()))?;
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// A request seen by [`FakeRest`], with the path already expanded.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub method: &'static str,
        pub path: String,
        pub body: Option<Value>,
        pub authenticated: bool,
    }

    /// In-memory REST client keyed by `"METHOD /expanded/path"`.
    #[derive(Default)]
    pub struct FakeRest {
        responses: Mutex<HashMap<String, Result<Value, (u16, String)>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl FakeRest {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, method: &str, path: &str, value: Value) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(format!("{} {}", method, path), Ok(value));
            self
        }

        pub fn fail(self, method: &str, path: &str, status: u16, body: &str) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(format!("{} {}", method, path), Err((status, body.to_string())));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, method: &str, path: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.method == method && c.path == path)
                .count()
        }

        fn answer(
            &self,
            method: &'static str,
            path: &str,
            params: &PathParams<'_>,
            body: Option<Value>,
            credentials: Option<&Credentials>,
        ) -> Result<Value, ApiError> {
            let path = expand_path(path, params)?;
            self.calls.lock().unwrap().push(RecordedCall {
                method,
                path: path.clone(),
                body,
                authenticated: credentials.is_some(),
            });
            match self.responses.lock().unwrap().get(&format!("{} {}", method, path)) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err((status, body))) => Err(ApiError::Remote {
                    status: *status,
                    body: body.clone(),
                }),
                None => Err(ApiError::Remote {
                    status: 404,
                    body: r#"{"message":"Not Found"}"#.to_string(),
                }),
            }
        }
    }

    #[async_trait]
    impl RestClient for FakeRest {
        async fn get(&self, path: &str, params: &PathParams<'_>) -> Result<Value, ApiError> {
            self.answer("GET", path, params, None, None)
        }

        async fn post(
            &self,
            path: &str,
            params: &PathParams<'_>,
            body: Option<Value>,
            credentials: Option<&Credentials>,
        ) -> Result<Value, ApiError> {
            self.answer("POST", path, params, body, credentials)
        }

        async fn put(
            &self,
            path: &str,
            params: &PathParams<'_>,
            body: Option<Value>,
            credentials: Option<&Credentials>,
        ) -> Result<Value, ApiError> {
            self.answer("PUT", path, params, body, credentials)
        }
    }

    #[test]
    fn test_expand_path_fills_all_placeholders() {
        let path = expand_path(
            "/repos/{user}/{repo}/pulls/{id}",
            &[("user", "alice"), ("repo", "gizz"), ("id", "42")],
        )
        .unwrap();
        assert_eq!(path, "/repos/alice/gizz/pulls/42");
    }

    #[test]
    fn test_expand_path_missing_param() {
        let err = expand_path("/repos/{user}/{repo}", &[("user", "alice")]).unwrap_err();
        assert!(matches!(err, ApiError::MissingParam(ref name) if name == "repo"));
    }

    #[test]
    fn test_expand_path_unterminated_placeholder() {
        let err = expand_path("/users/{user", &[("user", "alice")]).unwrap_err();
        assert!(matches!(err, ApiError::BadTemplate(_)));
    }

    #[test]
    fn test_expand_path_keeps_query_string() {
        let path = expand_path(
            "/repos/{user}/{repo}/pulls?state={state}",
            &[("user", "a"), ("repo", "b"), ("state", "all")],
        )
        .unwrap();
        assert_eq!(path, "/repos/a/b/pulls?state=all");
    }

    #[test]
    fn test_remote_error_prefers_json_message() {
        let err = ApiError::Remote {
            status: 405,
            body: r#"{"message":"Pull Request is not mergeable"}"#.to_string(),
        };
        assert_eq!(err.remote_message().as_deref(), Some("Pull Request is not mergeable"));
        assert_eq!(err.to_string(), "GitHub API returned 405: Pull Request is not mergeable");
    }

    #[test]
    fn test_remote_error_plain_body() {
        let err = ApiError::Remote {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert!(err.remote_message().is_none());
        assert_eq!(err.to_string(), "GitHub API returned 502: Bad Gateway");
    }
}
