//! Firebase CLI invocation
//!
//! Every registry operation is one `firebase` subprocess, awaited to
//! completion before the next one starts. No timeout is applied.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use nativefire_core::prelude::*;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::process::Command;

/// Default executable name looked up on `PATH`
pub const FIREBASE_BIN: &str = "firebase";

const SUCCESS_STATUS: &str = "success";

/// Phrases the CLI prints when no credentials are available
const AUTH_MARKERS: &[&str] = &["not authenticated", "firebase login", "authenticate via"];

/// Captured output of one CLI invocation
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr, as a user would see it in a terminal
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr.trim_end()),
            (false, true) => self.stdout.trim_end().to_string(),
            (true, false) => self.stderr.trim_end().to_string(),
            (true, true) => String::new(),
        }
    }

    /// Best single-line description of a failure
    pub fn failure_message(&self) -> String {
        let combined = self.combined();
        if combined.is_empty() {
            "command exited without output".to_string()
        } else {
            combined
        }
    }
}

/// `{status, result}` envelope used by `--json` subcommands
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct JsonEnvelope<T> {
    status: String,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Check CLI output for the not-authenticated vocabulary
pub fn is_auth_failure(output: &str) -> bool {
    let lower = output.to_lowercase();
    AUTH_MARKERS.iter().any(|m| lower.contains(m))
}

/// Parse a `{status, result}` envelope; any status other than `success` is
/// a registry failure
pub fn parse_envelope<T: DeserializeOwned>(json: &str) -> Result<T> {
    let envelope: JsonEnvelope<T> = serde_json::from_str(json.trim())?;

    if envelope.status != SUCCESS_STATUS {
        let detail = envelope.error.unwrap_or(envelope.status);
        if is_auth_failure(&detail) {
            return Err(Error::NotAuthenticated);
        }
        return Err(Error::registry(format!(
            "Firebase CLI returned non-success status: {}",
            detail
        )));
    }

    envelope
        .result
        .ok_or_else(|| Error::registry("Firebase CLI response has no result"))
}

/// Quote arguments containing whitespace or shell-significant brackets
pub fn format_command(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(|arg| {
            if arg.contains(|c: char| c.is_whitespace() || "()[]{}".contains(c)) {
                format!("\"{}\"", arg)
            } else {
                arg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A resolved `firebase` executable
#[derive(Debug, Clone)]
pub struct FirebaseCli {
    program: PathBuf,
}

impl FirebaseCli {
    /// Locate the CLI on `PATH`, or use the configured override
    ///
    /// The override may be a bare command name or a path to an executable.
    pub fn locate(bin_override: Option<&str>) -> Result<Self> {
        let wanted = bin_override
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(FIREBASE_BIN);

        match which::which(wanted) {
            Ok(program) => {
                debug!("Using Firebase CLI at {:?}", program);
                Ok(Self { program })
            }
            Err(e) => {
                debug!("Firebase CLI lookup for '{}' failed: {}", wanted, e);
                Err(Error::FirebaseCliNotFound)
            }
        }
    }

    /// Use a specific executable without a `PATH` lookup
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run a subcommand and capture its output
    ///
    /// A non-zero exit is not an error here; callers decide how to read the
    /// output. Output mentioning missing credentials always maps to
    /// [`Error::NotAuthenticated`].
    pub async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(
            "Running: {}",
            format_command(&self.program.to_string_lossy(), args)
        );

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::FirebaseCliNotFound
                } else {
                    Error::registry(format!("Failed to run firebase {}: {}", args.join(" "), e))
                }
            })?;

        let output = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        trace!("firebase stdout: {}", output.stdout);
        if !output.stderr.is_empty() {
            debug!("firebase stderr: {}", output.stderr);
        }

        if !output.success && is_auth_failure(&output.combined()) {
            return Err(Error::NotAuthenticated);
        }

        Ok(output)
    }

    /// Run a `--json` subcommand and read its stdout with `parse`
    ///
    /// `parse` is usually [`parse_envelope`] or one of the typed output
    /// parsers built on it.
    pub async fn run_json<T, F>(&self, args: &[&str], parse: F) -> Result<T>
    where
        F: FnOnce(&str) -> Result<T>,
    {
        let output = self.run(args).await?;

        // The CLI reports failures inside the JSON envelope, usually with a
        // non-zero exit; prefer the envelope's message when it parses.
        match parse(&output.stdout) {
            Ok(result) => Ok(result),
            Err(Error::Json(e)) if !output.success => {
                debug!("Unparsable firebase output: {}", e);
                Err(Error::registry(format!(
                    "firebase {} failed: {}",
                    args.first().copied().unwrap_or_default(),
                    output.failure_message()
                )))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_envelope_success() {
        let result: Vec<String> =
            parse_envelope(r#"{"status": "success", "result": ["a", "b"]}"#).unwrap();
        assert_eq!(result, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_envelope_error_status() {
        let err = parse_envelope::<Vec<String>>(r#"{"status": "error", "error": "Quota exceeded"}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Registry { .. }));
        assert!(err.to_string().contains("Quota exceeded"));
    }

    #[test]
    fn test_parse_envelope_auth_error() {
        let err = parse_envelope::<Vec<String>>(
            r#"{"status": "error", "error": "Failed to authenticate, have you run firebase login?"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }

    #[test]
    fn test_parse_envelope_invalid_json() {
        let err = parse_envelope::<Vec<String>>("i  Preparing the list").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(is_auth_failure("Error: Not authenticated. Please run firebase login"));
        assert!(!is_auth_failure("Error: Quota exceeded"));
    }

    #[test]
    fn test_format_command_quotes_spaces() {
        let line = format_command(
            "firebase",
            &["apps:create", "android", "my-app Android", "--project", "demo"],
        );
        assert_eq!(
            line,
            "firebase apps:create android \"my-app Android\" --project demo"
        );
    }

    #[test]
    fn test_combined_output() {
        let output = CommandOutput {
            success: false,
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        assert_eq!(output.combined(), "out\nerr");

        let empty = CommandOutput::default();
        assert_eq!(empty.failure_message(), "command exited without output");
    }

    #[test]
    fn test_locate_missing_binary() {
        let err = FirebaseCli::locate(Some("nativefire-no-such-firebase-binary")).unwrap_err();
        assert!(matches!(err, Error::FirebaseCliNotFound));
    }

    #[cfg(unix)]
    mod process {
        use super::super::*;
        use serial_test::serial;
        use std::os::unix::fs::PermissionsExt;
        use tempfile::TempDir;

        fn script(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("firebase");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        #[serial]
        async fn test_run_json_reads_result() {
            let temp = TempDir::new().unwrap();
            let cli = FirebaseCli::with_program(script(
                &temp,
                r#"echo '{"status": "success", "result": [1, 2, 3]}'"#,
            ));

            let result: Vec<u32> = cli
                .run_json(&["projects:list", "--json"], parse_envelope)
                .await
                .unwrap();
            assert_eq!(result, vec![1, 2, 3]);
        }

        #[tokio::test]
        #[serial]
        async fn test_run_maps_auth_failure() {
            let temp = TempDir::new().unwrap();
            let cli = FirebaseCli::with_program(script(
                &temp,
                "echo 'Error: Failed to authenticate, have you run firebase login?' >&2\nexit 1",
            ));

            let err = cli.run(&["projects:list"]).await.unwrap_err();
            assert!(matches!(err, Error::NotAuthenticated));
        }

        #[tokio::test]
        #[serial]
        async fn test_run_json_non_json_failure() {
            let temp = TempDir::new().unwrap();
            let cli = FirebaseCli::with_program(script(&temp, "echo 'boom' >&2\nexit 2"));

            let err = cli
                .run_json(&["apps:list", "--json"], parse_envelope::<Vec<u32>>)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Registry { .. }));
            assert!(err.to_string().contains("boom"));
        }

        #[tokio::test]
        #[serial]
        async fn test_run_missing_program() {
            let cli = FirebaseCli::with_program("/nonexistent/nativefire/firebase");
            let err = cli.run(&["--version"]).await.unwrap_err();
            assert!(matches!(err, Error::FirebaseCliNotFound));
        }
    }
}
