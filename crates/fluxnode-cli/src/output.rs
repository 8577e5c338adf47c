//! Output helpers for CLI commands.
//!
//! One-shot commands print the same tagged envelope the API returns, so
//! scripts can consume either surface with one parser.

use std::process::ExitCode;

use fluxnode_common::error::Result;
use fluxnode_common::response::ApiResponse;
use serde::Serialize;

/// Renders `result` as a pretty-printed tagged envelope.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized.
pub fn render<T: Serialize>(result: Result<T>) -> anyhow::Result<(String, bool)> {
    let response = ApiResponse::from_result(result);
    let ok = response.is_success();
    Ok((serde_json::to_string_pretty(&response)?, ok))
}

/// Prints the envelope for `result` and maps it to a process exit code.
///
/// With `raw`, a successful text capture is printed verbatim instead.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn emit_text(result: Result<String>, raw: bool) -> anyhow::Result<ExitCode> {
    match result {
        Ok(text) if raw => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        other => emit(other),
    }
}

/// Prints the envelope for `result` and maps it to a process exit code.
///
/// # Errors
///
/// Returns an error if the payload cannot be serialized.
#[allow(clippy::print_stdout)]
pub fn emit<T: Serialize>(result: Result<T>) -> anyhow::Result<ExitCode> {
    let (rendered, ok) = render(result)?;
    println!("{rendered}");
    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use fluxnode_common::error::FluxError;
    use fluxnode_common::types::UsageScore;

    use super::*;

    #[test]
    fn render_success_score() {
        let (text, ok) = render(Ok(UsageScore::new(3.5))).unwrap();
        assert!(ok);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], "3.50000000");
    }

    #[test]
    fn render_error_envelope() {
        let err = FluxError::InvalidRequest {
            message: "container is required".into(),
        };
        let (text, ok) = render::<String>(Err(err)).unwrap();
        assert!(!ok);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["data"]["name"], "InvalidRequestError");
    }
}
