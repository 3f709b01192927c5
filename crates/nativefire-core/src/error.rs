//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Detection Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No supported platform detected in: {path}")]
    PlatformNotDetected { path: PathBuf },

    #[error("Unsupported platform: {name}")]
    UnknownPlatform { name: String },

    #[error("Platform detection failed: auto-detect is disabled and no platform was specified")]
    AutoDetectDisabled,

    #[error("Cannot derive an app identifier: the Firebase project id is empty")]
    EmptyProjectId,

    // ─────────────────────────────────────────────────────────────
    // Registry (Firebase CLI) Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Firebase CLI not found. Please install it first: npm install -g firebase-tools")]
    FirebaseCliNotFound,

    #[error("Not authenticated with Firebase")]
    NotAuthenticated,

    #[error("Firebase registry error: {message}")]
    Registry { message: String },

    #[error("Project '{project_id}' not found or you don't have access to it")]
    ProjectNotFound { project_id: String },

    #[error("No Firebase projects available")]
    NoProjects,

    #[error("Failed to create Firebase app: {message}")]
    AppCreation { message: String, guidance: String },

    #[error("Required dependencies missing: {}", names.join(", "))]
    MissingDependencies { names: Vec<String> },

    // ─────────────────────────────────────────────────────────────
    // Installation Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Downloaded configuration file not found: {path}")]
    ArtifactMissing { path: PathBuf },

    #[error("Failed to write config file to {path}: {source}")]
    Install {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid selection: {message}")]
    Selection { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn selection(message: impl Into<String>) -> Self {
        Self::Selection {
            message: message.into(),
        }
    }

    pub fn not_detected(path: impl Into<PathBuf>) -> Self {
        Self::PlatformNotDetected { path: path.into() }
    }

    pub fn unknown_platform(name: impl Into<String>) -> Self {
        Self::UnknownPlatform { name: name.into() }
    }

    pub fn project_not_found(project_id: impl Into<String>) -> Self {
        Self::ProjectNotFound {
            project_id: project_id.into(),
        }
    }

    pub fn app_creation(message: impl Into<String>, guidance: impl Into<String>) -> Self {
        Self::AppCreation {
            message: message.into(),
            guidance: guidance.into(),
        }
    }

    pub fn artifact_missing(path: impl Into<PathBuf>) -> Self {
        Self::ArtifactMissing { path: path.into() }
    }

    pub fn install(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Install {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Detection failures can be fixed by re-running with an explicit override.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::PlatformNotDetected { .. }
                | Error::UnknownPlatform { .. }
                | Error::AutoDetectDisabled
                | Error::Selection { .. }
        )
    }

    /// Check if this error should abort the run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::FirebaseCliNotFound
                | Error::NotAuthenticated
                | Error::Registry { .. }
                | Error::ProjectNotFound { .. }
                | Error::NoProjects
                | Error::AppCreation { .. }
                | Error::MissingDependencies { .. }
                | Error::ArtifactMissing { .. }
                | Error::Install { .. }
                | Error::EmptyProjectId
        )
    }

    /// Actionable follow-up for the user, if there is one
    pub fn remediation(&self) -> Option<String> {
        match self {
            Error::PlatformNotDetected { .. } | Error::AutoDetectDisabled => Some(
                "Pass the platform explicitly: --platform android|ios|macos|windows|linux"
                    .to_string(),
            ),
            Error::UnknownPlatform { .. } => {
                Some("Supported platforms: android, ios, macos, windows, linux".to_string())
            }
            Error::FirebaseCliNotFound => Some(
                "Install the Firebase CLI: npm install -g firebase-tools\n   More info: https://firebase.google.com/docs/cli#install_the_firebase_cli"
                    .to_string(),
            ),
            Error::NotAuthenticated => Some("Run: firebase login".to_string()),
            Error::ProjectNotFound { .. } | Error::NoProjects => Some(
                "List your projects with `nativefire projects list` or create one at https://console.firebase.google.com/"
                    .to_string(),
            ),
            Error::AppCreation { guidance, .. } if !guidance.is_empty() => Some(guidance.clone()),
            Error::MissingDependencies { .. } => {
                Some("Install the missing tools listed above and run the command again".to_string())
            }
            Error::ArtifactMissing { .. } => Some(
                "The configuration download did not produce a file; retry, or download it from the Firebase console"
                    .to_string(),
            ),
            Error::Install { path, .. } => Some(format!(
                "Check write permissions, or copy the configuration file to {} manually",
                path.display()
            )),
            Error::EmptyProjectId => Some("Pass a Firebase project with --project <ID>".to_string()),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
