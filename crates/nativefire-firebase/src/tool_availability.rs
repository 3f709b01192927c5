//! External tool availability
//!
//! Checks that the command-line tools a run relies on are on `PATH` before
//! any project file is touched. Only the Firebase CLI is required; the
//! dependency managers are used by the post-mutation sync step and are
//! optional.

use nativefire_core::prelude::*;
use nativefire_core::Platform;

/// Which platforms a tool matters for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyScope {
    All,
    Apple,
    Android,
}

impl DependencyScope {
    pub fn applies_to(&self, platform: Platform) -> bool {
        match self {
            DependencyScope::All => true,
            DependencyScope::Apple => platform.is_apple(),
            DependencyScope::Android => platform == Platform::Android,
        }
    }
}

/// An external command-line tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: &'static str,
    pub command: &'static str,
    pub required: bool,
    pub scope: DependencyScope,
    pub install_command: &'static str,
    pub install_url: &'static str,
    pub description: &'static str,
}

impl Dependency {
    /// Multi-line install hint for terminal output
    pub fn install_hint(&self) -> String {
        format!(
            "{}\n   Install: {}\n   More info: {}",
            self.description, self.install_command, self.install_url
        )
    }
}

pub const DEPENDENCIES: &[Dependency] = &[
    Dependency {
        name: "Firebase CLI",
        command: "firebase",
        required: true,
        scope: DependencyScope::All,
        install_command: "npm install -g firebase-tools",
        install_url: "https://firebase.google.com/docs/cli#install_the_firebase_cli",
        description: "Required for Firebase project and app management",
    },
    Dependency {
        name: "CocoaPods",
        command: "pod",
        required: false,
        scope: DependencyScope::Apple,
        install_command: "sudo gem install cocoapods",
        install_url: "https://cocoapods.org/",
        description: "Apple dependency manager (alternative to Swift Package Manager)",
    },
    Dependency {
        name: "Gradle",
        command: "gradle",
        required: false,
        scope: DependencyScope::Android,
        install_command: "Use Android Studio or install from https://gradle.org/install/",
        install_url: "https://gradle.org/install/",
        description: "Android build system (gradlew wrapper preferred)",
    },
];

/// Whether `command` resolves on `PATH`
pub fn is_available(command: &str) -> bool {
    which::which(command)
        .inspect_err(|e| debug!("{} not found on PATH: {}", command, e))
        .is_ok()
}

/// Tools relevant to `platform` that `available` reports as missing
pub fn missing_with(
    platform: Platform,
    mut available: impl FnMut(&str) -> bool,
) -> Vec<&'static Dependency> {
    DEPENDENCIES
        .iter()
        .filter(|d| d.scope.applies_to(platform))
        .filter(|d| !available(d.command))
        .collect()
}

/// Tools relevant to `platform` that are not on `PATH`
pub fn check_dependencies(platform: Platform) -> Vec<&'static Dependency> {
    missing_with(platform, is_available)
}

/// Evaluate missing tools: required ones fail, optional ones only warn
///
/// Returns the optional tools that are missing so the caller can mention them.
pub fn evaluate(missing: Vec<&'static Dependency>) -> Result<Vec<&'static Dependency>> {
    let (required, optional): (Vec<_>, Vec<_>) = missing.into_iter().partition(|d| d.required);

    for dep in &optional {
        warn!("Optional dependency missing: {} ({})", dep.name, dep.command);
    }

    if !required.is_empty() {
        return Err(Error::MissingDependencies {
            names: required.iter().map(|d| d.name.to_string()).collect(),
        });
    }

    Ok(optional)
}

/// Check every tool `platform` needs before a run starts
pub fn preflight(platform: Platform) -> Result<Vec<&'static Dependency>> {
    info!("Checking dependencies for {}", platform);
    evaluate(check_dependencies(platform))
}
