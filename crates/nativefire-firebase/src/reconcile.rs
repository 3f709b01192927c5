//! Registry reconciliation
//!
//! Decides which Firebase app a run configures: the caller's explicit app
//! id, an app already registered with the same identifier, or a new app.
//! Listing and creation are attempted once each; the only retry is a single
//! re-search after a creation failure that looks like a duplicate.

use std::path::Path;

use nativefire_core::prelude::*;
use nativefire_core::{AppIdSource, Platform};

use crate::apps::{find_matching_app, is_duplicate_error, RemoteApp};
use crate::registry::LocalRegistry;

/// Outcome of [`reconcile()`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub app_id: String,
    pub source: AppIdSource,
    /// Display name of the matched or created app, when known
    pub display_name: Option<String>,
}

impl Reconciled {
    fn existing(app: &RemoteApp) -> Self {
        Self {
            app_id: app.app_id.clone(),
            source: AppIdSource::Existing,
            display_name: Some(app.label().to_string()),
        }
    }
}

/// Display name for a newly created app: `<directory name> <platform>`
pub fn app_display_name(root: &Path, platform: Platform) -> String {
    let dir = root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .filter(|n| !n.is_empty());

    match dir {
        Some(name) => format!("{} {}", name, platform.name()),
        None => format!("My {} App", platform.name()),
    }
}

/// Steps the user can take when automatic creation fails
pub fn manual_creation_guidance(platform: Platform, identifier: &str, project_id: &str) -> String {
    let registry_platform = platform.registry_platform();
    let kind = registry_platform.identifier_kind();
    format!(
        "Manual creation options:\n  \
         1. Create an app manually in Firebase Console with {}: {}\n  \
         2. Or run: firebase apps:create {} \"My App\" --project {} {} {}\n  \
         3. Then use the app ID with: nativefire configure --project {} --app-id YOUR_APP_ID",
        kind.label(),
        identifier,
        registry_platform.cli_name(),
        project_id,
        kind.cli_flag(),
        identifier,
        project_id
    )
}

async fn search<R: LocalRegistry>(
    registry: &R,
    platform: Platform,
    identifier: &str,
    project_id: &str,
) -> Result<Option<RemoteApp>> {
    let apps = registry.list_apps(project_id).await?;
    let registry_platform = platform.registry_platform();

    let candidates = apps
        .iter()
        .filter(|a| registry_platform.matches(&a.platform))
        .count();
    debug!(
        "Found {} {} apps ({} total) in project {}",
        candidates,
        registry_platform.cli_name(),
        apps.len(),
        project_id
    );

    Ok(find_matching_app(&apps, registry_platform, identifier).cloned())
}

/// Resolve the Firebase app id for this run
///
/// `display_name` is only used when a new app has to be created.
#[instrument(skip(registry), level = "debug")]
pub async fn reconcile<R: LocalRegistry>(
    registry: &R,
    platform: Platform,
    identifier: &str,
    project_id: &str,
    explicit_app_id: Option<&str>,
    display_name: &str,
) -> Result<Reconciled> {
    if let Some(app_id) = explicit_app_id.map(str::trim).filter(|id| !id.is_empty()) {
        info!("Using existing app ID: {}", app_id);
        return Ok(Reconciled {
            app_id: app_id.to_string(),
            source: AppIdSource::Explicit,
            display_name: None,
        });
    }

    if let Some(app) = search(registry, platform, identifier, project_id).await? {
        info!(
            "Using existing {} app: {} ({})",
            app.platform,
            app.label(),
            app.app_id
        );
        return Ok(Reconciled::existing(&app));
    }

    let registry_platform = platform.registry_platform();
    info!(
        "Creating {} app '{}' with {} {}",
        registry_platform.cli_name(),
        display_name,
        registry_platform.identifier_kind().label(),
        identifier
    );

    let err = match registry
        .create_app(project_id, registry_platform, display_name, identifier)
        .await
    {
        Ok(app_id) => {
            info!("Created Firebase app with ID: {}", app_id);
            return Ok(Reconciled {
                app_id,
                source: AppIdSource::Created,
                display_name: Some(display_name.to_string()),
            });
        }
        Err(e) => e,
    };

    let message = match &err {
        Error::AppCreation { message, .. } => message.clone(),
        _ => return Err(err),
    };

    if !is_duplicate_error(&message) {
        return Err(err);
    }

    warn!("App creation failed, searching for existing app...");
    match search(registry, platform, identifier, project_id).await {
        Ok(Some(app)) => {
            info!(
                "Found and using existing {} app: {} ({})",
                app.platform,
                app.label(),
                app.app_id
            );
            Ok(Reconciled::existing(&app))
        }
        Ok(None) => {
            warn!("No existing {} app found with identifier: {}", registry_platform.cli_name(), identifier);
            Err(Error::app_creation(
                message,
                manual_creation_guidance(platform, identifier, project_id),
            ))
        }
        Err(search_err) => {
            warn!("Re-search after duplicate failed: {}", search_err);
            Err(Error::app_creation(
                message,
                manual_creation_guidance(platform, identifier, project_id),
            ))
        }
    }
}
