//! Per-run working record

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::identifier::ResolvedIdentifier;
use crate::platform::Platform;

/// How the Firebase app id for the run was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppIdSource {
    /// Passed by the caller; the registry was not consulted
    Explicit,
    /// Matched an app already registered under the project
    Existing,
    /// Registered during this run
    Created,
}

impl fmt::Display for AppIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppIdSource::Explicit => f.write_str("explicit"),
            AppIdSource::Existing => f.write_str("existing"),
            AppIdSource::Created => f.write_str("created"),
        }
    }
}

/// State of one configuration run
///
/// Fields are filled in stage by stage. The platform is fixed at creation,
/// the identifier is set once, and the artifact is consumed by the installer.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    project_id: String,
    platform: Platform,
    root: PathBuf,
    identifier: Option<ResolvedIdentifier>,
    app_id: Option<(String, AppIdSource)>,
    artifact: Option<PathBuf>,
}

impl ProjectConfig {
    pub fn new(project_id: impl Into<String>, platform: Platform, root: impl Into<PathBuf>) -> Result<Self> {
        let project_id = project_id.into().trim().to_string();
        if project_id.is_empty() {
            return Err(Error::EmptyProjectId);
        }
        Ok(Self {
            project_id,
            platform,
            root: root.into(),
            identifier: None,
            app_id: None,
            artifact: None,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Record the resolved identifier; later calls are ignored
    pub fn set_identifier(&mut self, identifier: ResolvedIdentifier) {
        if self.identifier.is_none() {
            self.identifier = Some(identifier);
        }
    }

    pub fn resolved_identifier(&self) -> Option<&ResolvedIdentifier> {
        self.identifier.as_ref()
    }

    pub fn identifier(&self) -> Result<&str> {
        self.identifier
            .as_ref()
            .map(|i| i.value.as_str())
            .ok_or_else(|| Error::config("application identifier has not been resolved"))
    }

    pub fn set_app_id(&mut self, app_id: impl Into<String>, source: AppIdSource) {
        self.app_id = Some((app_id.into(), source));
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_ref().map(|(id, _)| id.as_str())
    }

    pub fn app_id_source(&self) -> Option<AppIdSource> {
        self.app_id.as_ref().map(|(_, source)| *source)
    }

    pub fn set_artifact(&mut self, path: impl Into<PathBuf>) {
        self.artifact = Some(path.into());
    }

    /// Hand the downloaded artifact to the installer (single use)
    pub fn take_artifact(&mut self) -> Result<PathBuf> {
        self.artifact
            .take()
            .ok_or_else(|| Error::config("no configuration file has been downloaded"))
    }
}
