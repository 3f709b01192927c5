//! The `configure` run
//!
//! Stages run strictly in order, each consuming what the previous one put
//! into the [`ProjectConfig`]: identifier, app id, downloaded artifact,
//! installed config, source mutation, dependency sync. Everything up to the
//! installer aborts the run on error; mutation and sync only collect
//! warnings.

use std::fmt;
use std::path::PathBuf;

use chrono::Local;
use nativefire_core::prelude::*;
use nativefire_core::{inject, install, resolve, IdentifierKind, Platform, ProjectConfig};
use nativefire_firebase::{app_display_name, download_artifact, reconcile, LocalRegistry};

use crate::summary::RunSummary;
use crate::sync::sync_dependencies;

/// Inputs of one run, already merged from flags and settings
#[derive(Debug, Clone)]
pub struct ConfigureRequest {
    pub project_id: String,
    pub platform: Platform,
    pub root: PathBuf,
    pub app_id: Option<String>,
    pub bundle_id: Option<String>,
    pub package_name: Option<String>,
    /// Run Gradle / CocoaPods after mutation
    pub sync: bool,
}

impl ConfigureRequest {
    pub fn new(project_id: impl Into<String>, platform: Platform, root: impl Into<PathBuf>) -> Self {
        Self {
            project_id: project_id.into(),
            platform,
            root: root.into(),
            app_id: None,
            bundle_id: None,
            package_name: None,
            sync: true,
        }
    }

    /// The explicit identifier matching the platform's identifier kind
    ///
    /// A bundle id passed for an Android-keyed platform (or the reverse) is
    /// ignored with a warning.
    pub fn explicit_identifier(&self) -> Option<&str> {
        let (wanted, other, other_flag) = match self.platform.identifier_kind() {
            IdentifierKind::BundleId => (&self.bundle_id, &self.package_name, "--package-name"),
            IdentifierKind::PackageName => (&self.package_name, &self.bundle_id, "--bundle-id"),
        };
        if other.is_some() {
            warn!("Ignoring {} for {}", other_flag, self.platform);
        }
        wanted.as_deref()
    }
}

/// Progress notifications for the caller's output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    ResolvingIdentifier,
    Reconciling,
    Downloading,
    Installing,
    Injecting,
    Syncing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::ResolvingIdentifier => "🔎 Resolving application identifier...",
            Stage::Reconciling => "📱 Registering app with Firebase...",
            Stage::Downloading => "⬇️  Downloading configuration...",
            Stage::Installing => "📁 Installing configuration file...",
            Stage::Injecting => "💉 Adding Firebase initialization code...",
            Stage::Syncing => "📦 Syncing dependencies...",
        };
        f.write_str(text)
    }
}

/// Configure Firebase for one project directory
#[instrument(skip(registry, on_stage), fields(project = %request.project_id, platform = %request.platform))]
pub async fn configure<R, F>(registry: &R, request: &ConfigureRequest, mut on_stage: F) -> Result<RunSummary>
where
    R: LocalRegistry,
    F: FnMut(Stage),
{
    let started_at = Local::now();
    let mut config = ProjectConfig::new(&request.project_id, request.platform, &request.root)?;
    let platform = config.platform();

    on_stage(Stage::ResolvingIdentifier);
    let resolved = resolve(
        platform,
        request.explicit_identifier(),
        config.root(),
        config.project_id(),
    )?;
    info!(
        "Using {} {} ({})",
        platform.identifier_kind().label(),
        resolved.value,
        resolved.source
    );
    config.set_identifier(resolved);

    on_stage(Stage::Reconciling);
    let display_name = app_display_name(config.root(), platform);
    let reconciled = reconcile(
        registry,
        platform,
        config.identifier()?,
        config.project_id(),
        request.app_id.as_deref(),
        &display_name,
    )
    .await?;
    config.set_app_id(reconciled.app_id, reconciled.source);

    on_stage(Stage::Downloading);
    let app_id = config
        .app_id()
        .ok_or_else(|| Error::config("app id was not resolved"))?
        .to_string();
    let artifact = download_artifact(registry, config.project_id(), platform, &app_id).await?;
    config.set_artifact(artifact);

    on_stage(Stage::Installing);
    let artifact = config.take_artifact()?;
    let installed_config = install(platform, &artifact, config.root())?;

    on_stage(Stage::Injecting);
    let injection = inject(platform, config.root());
    for warning in &injection.warnings {
        debug!("Mutation warning: {}", warning);
    }

    if request.sync {
        on_stage(Stage::Syncing);
    }
    let sync = sync_dependencies(platform, config.root(), &injection, request.sync).await;

    let resolved = config
        .resolved_identifier()
        .cloned()
        .ok_or_else(|| Error::config("application identifier has not been resolved"))?;

    Ok(RunSummary {
        platform,
        project_id: config.project_id().to_string(),
        identifier: resolved.value,
        identifier_source: resolved.source,
        app_id,
        app_id_source: config
            .app_id_source()
            .ok_or_else(|| Error::config("app id was not resolved"))?,
        installed_config,
        injection,
        sync,
        started_at,
        finished_at: Local::now(),
    })
}
