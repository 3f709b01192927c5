//! Source mutation
//!
//! Per-platform patchers that declare the Firebase dependency, locate or
//! create the entry point, and insert the initialization call. Patches run
//! in a fixed order (dependency, entry point, initialization) and each one
//! is idempotent on its own. Anchor misses and file errors are collected
//! into an [`InjectionReport`] instead of aborting the run.

pub mod android;
pub mod apple;
pub mod desktop;
mod templates;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::Error;
use crate::patch::{patch_file, PatchKind, PatchOutcome, PatchRecord};
use crate::platform::Platform;
use crate::probe;

/// Everything the mutator did (or could not do) in one run
#[derive(Debug, Clone, Default)]
pub struct InjectionReport {
    pub records: Vec<PatchRecord>,
    /// Files synthesized from templates
    pub created: Vec<PathBuf>,
    /// Anchor misses and file errors, each with manual-completion guidance
    pub warnings: Vec<String>,
    /// Manual steps the user still has to take
    pub instructions: Vec<String>,
}

impl InjectionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn instruct(&mut self, step: impl Into<String>) {
        self.instructions.push(step.into());
    }

    pub fn add_created(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        info!("Created {:?}", path);
        self.created.push(path);
    }

    /// Records with an `Applied` outcome
    pub fn applied(&self) -> impl Iterator<Item = &PatchRecord> {
        self.records.iter().filter(|r| r.outcome.is_applied())
    }

    pub fn anchor_misses(&self) -> impl Iterator<Item = &PatchRecord> {
        self.records.iter().filter(|r| r.outcome.is_anchor_miss())
    }

    /// Whether a dependency declaration was added to a file whose name
    /// satisfies `pred`
    pub fn dependency_changed(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.applied().any(|r| {
            r.kind == PatchKind::Dependency
                && r.path
                    .file_name()
                    .map(|n| pred(&n.to_string_lossy()))
                    .unwrap_or(false)
        })
    }

    /// Nothing changed and nothing needs attention
    pub fn is_noop(&self) -> bool {
        self.applied().next().is_none() && self.created.is_empty() && self.warnings.is_empty()
    }

    /// Run one patch and record the result
    ///
    /// `hint` describes the manual edit; it is reported only when the anchor
    /// is missing or the file cannot be updated.
    pub(crate) fn patch(
        &mut self,
        root: &Path,
        path: &Path,
        kind: PatchKind,
        markers: &[&str],
        transform: impl FnOnce(&str) -> Option<String>,
        hint: impl FnOnce() -> String,
    ) -> Option<PatchOutcome> {
        let shown = probe::display_relative(root, path);
        match patch_file(path, markers, transform) {
            Ok(outcome) => {
                match outcome {
                    PatchOutcome::Applied => info!("Added {} to {}", kind, shown),
                    PatchOutcome::AlreadyPresent => info!("{} already present in {}", kind, shown),
                    PatchOutcome::AnchorNotFound => {
                        self.warn(format!("Could not add {} to {}: {}", kind, shown, hint()))
                    }
                }
                self.records.push(PatchRecord {
                    path: path.to_path_buf(),
                    kind,
                    outcome,
                });
                Some(outcome)
            }
            Err(e) => {
                self.fail(&shown, kind, &e, hint());
                None
            }
        }
    }

    pub(crate) fn fail(&mut self, display: &str, kind: PatchKind, err: &Error, hint: String) {
        self.warn(format!("Failed to update {} ({}): {}. {}", display, kind, err, hint));
    }
}

/// Inject Firebase setup code for `platform` into the project at `root`
pub fn inject(platform: Platform, root: &Path) -> InjectionReport {
    let mut report = InjectionReport::new();
    match platform {
        Platform::Android => android::inject(root, &mut report),
        Platform::IOS | Platform::MacOS => apple::inject(platform, root, &mut report),
        Platform::Windows | Platform::Linux => desktop::inject(platform, root, &mut report),
    }
    report
}
