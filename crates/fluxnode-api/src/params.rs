//! Request parameter handling.
//!
//! Every parameter may arrive as a path segment or as a query string
//! field; the two forms are interchangeable and the path form wins when
//! both are given.

use fluxnode_common::error::{FluxError, Result};
use fluxnode_common::types::{ContainerRef, ExecRequest};
use serde::Deserialize;

/// Raw parameters accepted by the app endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppParams {
    /// Container ID or name.
    pub container: Option<String>,
    /// Command tokens, as a JSON array or a single bare token.
    pub cmd: Option<String>,
    /// `KEY=value` tokens, as a JSON array or a single bare token.
    pub env: Option<String>,
}

impl AppParams {
    /// Fills fields missing from `self` with those of `fallback`.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            container: non_empty(self.container).or_else(|| non_empty(fallback.container)),
            cmd: non_empty(self.cmd).or_else(|| non_empty(fallback.cmd)),
            env: non_empty(self.env).or_else(|| non_empty(fallback.env)),
        }
    }

    /// Resolves the target container.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::InvalidRequest`] if no container was given.
    pub fn container(&self) -> Result<ContainerRef> {
        self.container
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ContainerRef::new)
            .ok_or_else(|| FluxError::InvalidRequest {
                message: "container is required".into(),
            })
    }

    /// Builds an exec request; absent `cmd`/`env` become empty sequences.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::InvalidRequest`] if the container is missing or
    /// `cmd`/`env` is a JSON value other than an array of strings.
    pub fn exec_request(&self) -> Result<ExecRequest> {
        Ok(ExecRequest::new(
            self.container()?,
            parse_tokens("cmd", self.cmd.as_deref())?,
            parse_tokens("env", self.env.as_deref())?,
        ))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Parses a token list given either as a JSON array of strings or as a
/// single bare token.
fn parse_tokens(field: &str, raw: Option<&str>) -> Result<Option<Vec<String>>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(None);
    };
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str::<Vec<String>>(trimmed)
            .map(Some)
            .map_err(|e| FluxError::InvalidRequest {
                message: format!("{field} must be a JSON array of strings: {e}"),
            })
    } else {
        Ok(Some(vec![raw.to_string()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(container: Option<&str>, cmd: Option<&str>, env: Option<&str>) -> AppParams {
        AppParams {
            container: container.map(String::from),
            cmd: cmd.map(String::from),
            env: env.map(String::from),
        }
    }

    #[test]
    fn path_wins_over_query() {
        let merged = params(Some("from-path"), None, None).or(params(
            Some("from-query"),
            Some(r#"["ls"]"#),
            None,
        ));
        assert_eq!(merged.container.as_deref(), Some("from-path"));
        assert_eq!(merged.cmd.as_deref(), Some(r#"["ls"]"#));
    }

    #[test]
    fn empty_path_value_falls_back_to_query() {
        let merged = params(Some(""), None, None).or(params(Some("web"), None, None));
        assert_eq!(merged.container().unwrap().as_str(), "web");
    }

    #[test]
    fn missing_container_is_invalid_request() {
        let err = AppParams::default().container().unwrap_err();
        assert_eq!(err.name(), "InvalidRequestError");
    }

    #[test]
    fn exec_request_parses_json_arrays() {
        let req = params(
            Some("web"),
            Some(r#"["sh", "-c", "echo hi"]"#),
            Some(r#"["A=1","B=2"]"#),
        )
        .exec_request()
        .unwrap();
        assert_eq!(req.cmd, vec!["sh", "-c", "echo hi"]);
        assert_eq!(req.env, vec!["A=1", "B=2"]);
    }

    #[test]
    fn exec_request_defaults_to_empty_sequences() {
        let req = params(Some("web"), None, Some("")).exec_request().unwrap();
        assert!(req.cmd.is_empty());
        assert!(req.env.is_empty());
    }

    #[test]
    fn bare_token_is_single_argument() {
        let req = params(Some("web"), Some("uptime"), None).exec_request().unwrap();
        assert_eq!(req.cmd, vec!["uptime"]);
    }

    #[test]
    fn non_string_array_is_rejected() {
        let err = params(Some("web"), Some("[1, 2]"), None)
            .exec_request()
            .unwrap_err();
        assert!(err.to_string().contains("cmd must be a JSON array of strings"));
    }
}
