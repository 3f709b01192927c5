//! App registry seam
//!
//! [`Registry`] is the boundary between the configuration pipeline and the
//! Firebase backend. [`FirebaseCli`] implements it by shelling out; tests use
//! the fake in `test_utils`.

use std::path::{Path, PathBuf};

use nativefire_core::prelude::*;
use nativefire_core::{Platform, RegistryPlatform};

use crate::apps::{config_temp_path, extract_app_id, parse_apps_output, RemoteApp};
use crate::cli::FirebaseCli;
use crate::projects::{find_project, parse_projects_output, RemoteProject};

/// Remote app registry operations
#[trait_variant::make(Registry: Send)]
pub trait LocalRegistry {
    /// Active projects visible to the signed-in account
    async fn list_projects(&self) -> Result<Vec<RemoteProject>>;

    /// Every app registered under `project_id`, all platforms
    async fn list_apps(&self, project_id: &str) -> Result<Vec<RemoteApp>>;

    /// Register a new app and return its app id
    async fn create_app(
        &self,
        project_id: &str,
        platform: RegistryPlatform,
        display_name: &str,
        identifier: &str,
    ) -> Result<String>;

    /// Write the app's configuration file to `out`
    async fn download_config(
        &self,
        project_id: &str,
        platform: RegistryPlatform,
        app_id: &str,
        out: &Path,
    ) -> Result<()>;
}

impl Registry for FirebaseCli {
    async fn list_projects(&self) -> Result<Vec<RemoteProject>> {
        self.run_json(&["projects:list", "--json"], parse_projects_output)
            .await
    }

    async fn list_apps(&self, project_id: &str) -> Result<Vec<RemoteApp>> {
        self.run_json(&["apps:list", "--json", "--project", project_id], parse_apps_output)
            .await
    }

    async fn create_app(
        &self,
        project_id: &str,
        platform: RegistryPlatform,
        display_name: &str,
        identifier: &str,
    ) -> Result<String> {
        let flag = platform.identifier_kind().cli_flag();
        let output = self
            .run(&[
                "apps:create",
                platform.cli_name(),
                display_name,
                "--project",
                project_id,
                flag,
                identifier,
            ])
            .await?;

        let combined = output.combined();
        if !output.success {
            return Err(Error::app_creation(output.failure_message(), ""));
        }

        extract_app_id(&combined).ok_or_else(|| {
            Error::app_creation(
                "could not find an app id in the Firebase CLI output",
                "",
            )
        })
    }

    async fn download_config(
        &self,
        project_id: &str,
        platform: RegistryPlatform,
        app_id: &str,
        out: &Path,
    ) -> Result<()> {
        let out = out.to_string_lossy();
        let output = self
            .run(&[
                "apps:sdkconfig",
                platform.cli_name(),
                app_id,
                "--project",
                project_id,
                "--out",
                &out,
            ])
            .await?;

        if !output.success {
            return Err(Error::registry(format!(
                "Failed to download config: {}",
                output.failure_message()
            )));
        }
        Ok(())
    }
}

/// Confirm `project_id` names an active project the account can access
pub async fn validate_project<R: LocalRegistry>(registry: &R, project_id: &str) -> Result<RemoteProject> {
    let projects = registry.list_projects().await?;
    find_project(&projects, project_id)
        .cloned()
        .ok_or_else(|| Error::project_not_found(project_id))
}

/// Download the configuration for `app_id` into a fresh temp file
///
/// On failure nothing is left behind in the temp directory.
pub async fn download_artifact<R: LocalRegistry>(
    registry: &R,
    project_id: &str,
    platform: Platform,
    app_id: &str,
) -> Result<PathBuf> {
    download_artifact_to(registry, project_id, platform, app_id, config_temp_path(platform)).await
}

pub(crate) async fn download_artifact_to<R: LocalRegistry>(
    registry: &R,
    project_id: &str,
    platform: Platform,
    app_id: &str,
    path: PathBuf,
) -> Result<PathBuf> {
    info!("Downloading {} for app {}", platform.config_file_name(), app_id);

    match registry
        .download_config(project_id, platform.registry_platform(), app_id, &path)
        .await
    {
        Ok(()) => {
            debug!("Configuration downloaded to {:?}", path);
            Ok(path)
        }
        Err(e) => {
            if path.exists() {
                if let Err(rm) = std::fs::remove_file(&path) {
                    warn!("Failed to remove partial download {:?}: {}", path, rm);
                }
            }
            Err(e)
        }
    }
}
