//! Target platforms and project classification
//!
//! Platform ecosystems do not share a manifest format, so classification is
//! a union of the most common scaffolding signals per ecosystem. Detectors
//! are evaluated in a fixed priority order and the first match wins.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::probe;

pub const GOOGLE_SERVICES_JSON: &str = "google-services.json";
pub const GOOGLE_SERVICE_INFO_PLIST: &str = "GoogleService-Info.plist";

/// A native target environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    #[serde(rename = "ios")]
    IOS,
    #[serde(rename = "macos")]
    MacOS,
    Windows,
    Linux,
}

/// The kind of application identifier a platform is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// Apple bundle identifier (`CFBundleIdentifier`)
    BundleId,
    /// Android application id / package name
    PackageName,
}

impl IdentifierKind {
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierKind::BundleId => "Bundle ID",
            IdentifierKind::PackageName => "Package Name",
        }
    }

    /// Flag used by `firebase apps:create`
    pub fn cli_flag(&self) -> &'static str {
        match self {
            IdentifierKind::BundleId => "--bundle-id",
            IdentifierKind::PackageName => "--package-name",
        }
    }
}

/// App type used when talking to the Firebase registry
///
/// Firebase only knows Android and Apple apps: macOS registers as an Apple
/// app, desktop targets consume an Android `google-services.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryPlatform {
    Android,
    Ios,
}

impl RegistryPlatform {
    /// Platform argument for `firebase apps:*` commands
    pub fn cli_name(&self) -> &'static str {
        match self {
            RegistryPlatform::Android => "android",
            RegistryPlatform::Ios => "ios",
        }
    }

    /// Identifier kind stored by the registry for this app type
    pub fn identifier_kind(&self) -> IdentifierKind {
        match self {
            RegistryPlatform::Android => IdentifierKind::PackageName,
            RegistryPlatform::Ios => IdentifierKind::BundleId,
        }
    }

    /// Case-insensitive match against the `platform` field of a listed app
    pub fn matches(&self, remote_platform: &str) -> bool {
        remote_platform.eq_ignore_ascii_case(self.cli_name())
    }
}

impl Platform {
    /// Detection priority order
    pub const ALL: [Platform; 5] = [
        Platform::Android,
        Platform::IOS,
        Platform::MacOS,
        Platform::Windows,
        Platform::Linux,
    ];

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::IOS => "iOS",
            Platform::MacOS => "macOS",
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
        }
    }

    /// Conventional file name of the downloaded configuration
    pub fn config_file_name(&self) -> &'static str {
        match self {
            Platform::IOS | Platform::MacOS => GOOGLE_SERVICE_INFO_PLIST,
            Platform::Android | Platform::Windows | Platform::Linux => GOOGLE_SERVICES_JSON,
        }
    }

    pub fn registry_platform(&self) -> RegistryPlatform {
        match self {
            Platform::IOS | Platform::MacOS => RegistryPlatform::Ios,
            Platform::Android | Platform::Windows | Platform::Linux => RegistryPlatform::Android,
        }
    }

    pub fn identifier_kind(&self) -> IdentifierKind {
        self.registry_platform().identifier_kind()
    }

    pub fn is_apple(&self) -> bool {
        matches!(self, Platform::IOS | Platform::MacOS)
    }

    pub fn is_desktop(&self) -> bool {
        matches!(self, Platform::Windows | Platform::Linux)
    }

    /// Platform-preferred subdirectory (`ios`, `macos`, `windows`, `linux`)
    pub(crate) fn preferred_dir(&self) -> Option<&'static str> {
        match self {
            Platform::Android => None,
            Platform::IOS => Some("ios"),
            Platform::MacOS => Some("macos"),
            Platform::Windows => Some("windows"),
            Platform::Linux => Some("linux"),
        }
    }

    /// Check the structural signals for this platform under `root`
    pub fn detect(&self, root: &Path) -> bool {
        match self {
            Platform::Android => {
                probe::first_existing(
                    root,
                    &[
                        "build.gradle",
                        "build.gradle.kts",
                        "app/build.gradle",
                        "app/build.gradle.kts",
                        "android/build.gradle",
                        "android/build.gradle.kts",
                        "settings.gradle",
                        "settings.gradle.kts",
                    ],
                )
                .is_some()
            }
            Platform::IOS => {
                probe::is_dir(root, "ios")
                    || probe::has_file(root, "*.xcodeproj")
                    || probe::has_file(root, "*.xcworkspace")
                    || probe::exists(root, "Podfile")
            }
            Platform::MacOS => {
                probe::is_dir(root, "macos")
                    || (probe::has_file(root, "*.xcodeproj") && probe::exists(root, "Podfile"))
                    || probe::has_file(root, "main.swift")
            }
            Platform::Windows => {
                probe::is_dir(root, "windows")
                    || probe::has_file(root, "*.vcxproj")
                    || probe::has_file(root, "*.sln")
                    || probe::exists(root, "CMakeLists.txt")
            }
            Platform::Linux => {
                probe::is_dir(root, "linux")
                    || probe::exists(root, "CMakeLists.txt")
                    || probe::has_file(root, "Makefile")
            }
        }
    }

    /// Directory the configuration file belongs in for the current layout
    ///
    /// Android prefers the module that owns `src/main`; Apple platforms
    /// descend into `Runner/` or the Xcode project's source folder when
    /// present; desktop targets use their platform folder or the root.
    pub fn config_dir(&self, root: &Path) -> PathBuf {
        match self {
            Platform::Android => {
                if probe::exists(root, "app/src/main") {
                    root.join("app")
                } else if probe::exists(root, "android/app/src/main") {
                    root.join("android/app")
                } else if probe::exists(root, "src/main") {
                    root.to_path_buf()
                } else {
                    root.join("app")
                }
            }
            Platform::IOS | Platform::MacOS => {
                let mut dir = match self.preferred_dir() {
                    Some(sub) if probe::is_dir(root, sub) => root.join(sub),
                    _ => root.to_path_buf(),
                };

                let runner = dir.join("Runner");
                if runner.is_dir() {
                    dir = runner;
                }

                if let Some(name) = xcode_project_name(root) {
                    let nested = dir.join(&name);
                    if nested.is_dir() {
                        dir = nested;
                    }
                }
                dir
            }
            Platform::Windows | Platform::Linux => match self.preferred_dir() {
                Some(sub) if probe::is_dir(root, sub) => root.join(sub),
                _ => root.to_path_buf(),
            },
        }
    }
}

/// Name of the first Xcode project under `root`, without its extension
pub fn xcode_project_name(root: &Path) -> Option<String> {
    let project = probe::find_file(root, "*.xcodeproj")?;
    project
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::IOS),
            "macos" => Ok(Platform::MacOS),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            _ => Err(Error::unknown_platform(s)),
        }
    }
}

/// Classify a project directory
///
/// Returns the first platform (in [`Platform::ALL`] order) whose detector
/// matches, or `None` when nothing matches.
pub fn classify(root: &Path) -> Option<Platform> {
    let platform = Platform::ALL.into_iter().find(|p| p.detect(root));
    match platform {
        Some(p) => debug!("Classified {:?} as {}", root, p),
        None => debug!("No platform signals found in {:?}", root),
    }
    platform
}

/// Classify a project directory, failing with a detection error
pub fn detect_platform(root: &Path) -> Result<Platform> {
    classify(root).ok_or_else(|| Error::not_detected(root))
}
