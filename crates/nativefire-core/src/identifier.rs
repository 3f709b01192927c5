//! Application identifier resolution
//!
//! Bundle ids (Apple) and package names (Android) are resolved through a
//! fixed chain: explicit value, then a value parsed from project files, then
//! a value generated from the Firebase project id.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::probe;

/// Segment prepended to ids that contain no period
const DEFAULT_DOMAIN: &str = "com.firebase";

/// Segment prepended to ids that already look dotted
const TOP_LEVEL: &str = "com";

/// Where a resolved identifier came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierSource {
    Explicit,
    Parsed(PathBuf),
    Generated,
}

impl fmt::Display for IdentifierSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierSource::Explicit => f.write_str("explicit"),
            IdentifierSource::Parsed(path) => write!(f, "parsed from {}", path.display()),
            IdentifierSource::Generated => f.write_str("generated"),
        }
    }
}

/// A non-empty identifier and its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentifier {
    pub value: String,
    pub source: IdentifierSource,
}

/// How the value is pulled out of a candidate file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extractor {
    Gradle,
    Manifest,
    Plist,
    Pbxproj,
}

const ANDROID_CANDIDATES: &[(&str, Extractor)] = &[
    ("app/build.gradle", Extractor::Gradle),
    ("app/build.gradle.kts", Extractor::Gradle),
    ("android/app/build.gradle", Extractor::Gradle),
    ("android/app/build.gradle.kts", Extractor::Gradle),
    ("build.gradle", Extractor::Gradle),
    ("build.gradle.kts", Extractor::Gradle),
    ("app/src/main/AndroidManifest.xml", Extractor::Manifest),
    ("android/app/src/main/AndroidManifest.xml", Extractor::Manifest),
    ("src/main/AndroidManifest.xml", Extractor::Manifest),
];

const APPLE_CANDIDATES: &[(&str, Extractor)] = &[
    ("ios/Runner/Info.plist", Extractor::Plist),
    ("Info.plist", Extractor::Plist),
    ("Runner/Info.plist", Extractor::Plist),
    ("*.xcodeproj/project.pbxproj", Extractor::Pbxproj),
    ("ios/*.xcodeproj/project.pbxproj", Extractor::Pbxproj),
];

const MACOS_EXTRA_CANDIDATES: &[(&str, Extractor)] = &[
    ("macos/Runner/Info.plist", Extractor::Plist),
    ("macos/*.xcodeproj/project.pbxproj", Extractor::Pbxproj),
];

static APPLICATION_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*applicationId\s*=?\s*["']([^"']+)["']"#).expect("valid regex")
});

static NAMESPACE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*namespace\s*=?\s*["']([^"']+)["']"#).expect("valid regex")
});

static MANIFEST_PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"package\s*=\s*"([^"]+)""#).expect("valid regex"));

static PLIST_STRING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<string>\s*([^<]*?)\s*</string>").expect("valid regex"));

static PBX_BUNDLE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"PRODUCT_BUNDLE_IDENTIFIER\s*=\s*"?([^";\s]+)"?\s*;"#).expect("valid regex")
});

/// Generate an identifier from a Firebase project id
///
/// Hyphens become periods. A result without any period gets the
/// `com.firebase.` domain, anything else gets a `com.` prefix.
pub fn generate(project_id: &str) -> Result<String> {
    let trimmed = project_id.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyProjectId);
    }

    let dotted = trimmed.replace('-', ".");
    if dotted.contains('.') {
        Ok(format!("{}.{}", TOP_LEVEL, dotted))
    } else {
        Ok(format!("{}.{}", DEFAULT_DOMAIN, dotted))
    }
}

/// Parse the identifier from the project files of `platform`
///
/// Candidates are tried in order; templated values are skipped.
pub fn parse(platform: Platform, root: &Path) -> Option<(String, PathBuf)> {
    for (rel, extractor) in candidates(platform) {
        let paths = if rel.contains('*') {
            probe::glob_paths(root, rel)
        } else {
            let path = root.join(rel);
            if path.is_file() {
                vec![path]
            } else {
                Vec::new()
            }
        };

        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    trace!("Skipping unreadable candidate {:?}: {}", path, e);
                    continue;
                }
            };
            if let Some(value) = extract(extractor, &content) {
                debug!("Parsed identifier {} from {:?}", value, path);
                return Some((value, path));
            }
        }
    }
    None
}

fn candidates(platform: Platform) -> Vec<(&'static str, Extractor)> {
    match platform {
        Platform::Android => ANDROID_CANDIDATES.to_vec(),
        Platform::IOS => APPLE_CANDIDATES.to_vec(),
        Platform::MacOS => APPLE_CANDIDATES
            .iter()
            .chain(MACOS_EXTRA_CANDIDATES)
            .copied()
            .collect(),
        Platform::Windows | Platform::Linux => Vec::new(),
    }
}

fn usable(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.contains('$') {
        None
    } else {
        Some(value.to_string())
    }
}

fn extract(extractor: Extractor, content: &str) -> Option<String> {
    match extractor {
        Extractor::Gradle => first_line_match(&APPLICATION_ID_RE, content)
            .or_else(|| first_line_match(&NAMESPACE_RE, content)),
        Extractor::Manifest => MANIFEST_PACKAGE_RE
            .captures_iter(content)
            .find_map(|c| usable(&c[1])),
        Extractor::Plist => extract_plist_bundle_id(content),
        Extractor::Pbxproj => PBX_BUNDLE_ID_RE
            .captures_iter(content)
            .filter_map(|c| usable(&c[1]))
            .find(|v| !v.ends_with("Tests")),
    }
}

fn first_line_match(re: &Regex, content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| re.captures(line))
        .find_map(|c| usable(&c[1]))
}

/// `CFBundleIdentifier` value: the `<string>` on the key line or the next
/// non-blank line
fn extract_plist_bundle_id(content: &str) -> Option<String> {
    let mut lines = content.lines();
    while let Some(line) = lines.next() {
        let Some(pos) = line.find("<key>CFBundleIdentifier</key>") else {
            continue;
        };

        let rest = &line[pos..];
        let value_line = if PLIST_STRING_RE.is_match(rest) {
            Some(rest)
        } else {
            lines.by_ref().find(|l| !l.trim().is_empty())
        };

        return value_line
            .and_then(|l| PLIST_STRING_RE.captures(l))
            .and_then(|c| usable(&c[1]));
    }
    None
}

/// Resolve the identifier for `platform`
///
/// An explicit non-blank value wins, then a parsed value, then a generated
/// one. Fails only when generation is needed and `project_id` is empty.
pub fn resolve(
    platform: Platform,
    explicit: Option<&str>,
    root: &Path,
    project_id: &str,
) -> Result<ResolvedIdentifier> {
    if let Some(value) = explicit.and_then(usable) {
        debug!("Using explicit {}: {}", platform.identifier_kind().label(), value);
        return Ok(ResolvedIdentifier {
            value,
            source: IdentifierSource::Explicit,
        });
    }

    if let Some((value, path)) = parse(platform, root) {
        return Ok(ResolvedIdentifier {
            value,
            source: IdentifierSource::Parsed(path),
        });
    }

    let value = generate(project_id)?;
    debug!(
        "No {} found in project files, generated {}",
        platform.identifier_kind().label(),
        value
    );
    Ok(ResolvedIdentifier {
        value,
        source: IdentifierSource::Generated,
    })
}
