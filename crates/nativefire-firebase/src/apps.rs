//! Firebase app records and CLI output parsing

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use nativefire_core::prelude::*;
use nativefire_core::{IdentifierKind, Platform, RegistryPlatform};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cli::parse_envelope;

/// `App ID: 1:123:android:abc` in human-readable `apps:create` output
static APP_ID_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"App ID:\s+([^\s\n]+)").expect("Invalid app id regex"));

/// `"appId": "1:123:ios:def"` in JSON-ish `apps:create` output
static APP_ID_JSON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""appId":\s*"([^"]+)""#).expect("Invalid appId field regex"));

/// Creation failures that may mean the app already exists (lowercase)
pub const DUPLICATE_MARKERS: &[&str] = &[
    "already exists",
    "duplicate",
    "bundle id already exists",
    "package name already exists",
    "bundle id for ios app cannot be empty",
    "failed to create ios app",
    "failed to create android app",
];

/// A registered Firebase app as reported by `firebase apps:list --json`
///
/// The registry stores the identifier redundantly: `namespace` holds it for
/// every platform, while `bundleId` / `packageName` are filled inconsistently.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteApp {
    pub app_id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub project_id: String,

    /// "ANDROID", "IOS" or "WEB"
    #[serde(default)]
    pub platform: String,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub bundle_id: Option<String>,

    #[serde(default)]
    pub package_name: Option<String>,
}

impl RemoteApp {
    /// Platform-specific identifier field for `kind`
    pub fn identifier_field(&self, kind: IdentifierKind) -> Option<&str> {
        match kind {
            IdentifierKind::BundleId => self.bundle_id.as_deref(),
            IdentifierKind::PackageName => self.package_name.as_deref(),
        }
    }

    /// Exact match on `namespace`, then on the platform-specific field
    pub fn matches_identifier(&self, kind: IdentifierKind, identifier: &str) -> bool {
        if self.namespace.as_deref() == Some(identifier) {
            trace!("App {} matched by namespace", self.app_id);
            return true;
        }
        if self.identifier_field(kind) == Some(identifier) {
            trace!("App {} matched by {}", self.app_id, kind.label());
            return true;
        }
        false
    }

    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.app_id
        } else {
            &self.display_name
        }
    }
}

/// Parse `apps:list --json` output
pub fn parse_apps_output(json: &str) -> Result<Vec<RemoteApp>> {
    parse_envelope(json)
}

/// First app of `platform` whose identifier equals `identifier`
///
/// Listing order decides ties.
pub fn find_matching_app<'a>(
    apps: &'a [RemoteApp],
    platform: RegistryPlatform,
    identifier: &str,
) -> Option<&'a RemoteApp> {
    let kind = platform.identifier_kind();
    apps.iter()
        .filter(|app| platform.matches(&app.platform))
        .find(|app| app.matches_identifier(kind, identifier))
}

/// Pull the new app id out of `apps:create` output
pub fn extract_app_id(output: &str) -> Option<String> {
    APP_ID_LINE_REGEX
        .captures(output)
        .or_else(|| APP_ID_JSON_REGEX.captures(output))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Whether a creation failure reads like "this app already exists"
pub fn is_duplicate_error(output: &str) -> bool {
    let lower = output.to_lowercase();
    DUPLICATE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Unique temp path for a downloaded config file
///
/// The file itself is not created; the CLI writes it.
pub fn config_temp_path(platform: Platform) -> PathBuf {
    config_temp_path_in(&std::env::temp_dir(), platform)
}

pub fn config_temp_path_in(dir: &Path, platform: Platform) -> PathBuf {
    let file_name = Path::new(platform.config_file_name());
    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = file_name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    dir.join(format!(
        "nativefire_{}_{}_{}{}",
        stem,
        std::process::id(),
        chrono::Utc::now().timestamp_millis(),
        ext
    ))
}
