//! Post-mutation dependency sync
//!
//! When the mutator declared a new dependency, the project's dependency
//! manager is run once so the next build picks it up. Gradle (wrapper first)
//! for Android, `pod install` for CocoaPods projects. Nothing here is fatal:
//! failures and missing tools become warnings or manual instructions.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use nativefire_core::prelude::*;
use nativefire_core::{InjectionReport, PatchKind, Platform};
use nativefire_firebase::is_available;
use tokio::process::Command;

#[cfg(windows)]
const GRADLE_WRAPPER: &str = "gradlew.bat";
#[cfg(not(windows))]
const GRADLE_WRAPPER: &str = "gradlew";

/// Directories searched for a Gradle wrapper, relative to the project root
const WRAPPER_DIRS: &[&str] = &[".", "android"];

/// What the sync step did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Turned off by flag or settings
    Disabled,
    /// No dependency declaration changed, or the platform has no manager
    NotNeeded,
    Ran { command: String, dir: PathBuf },
    Failed { command: String, message: String },
    /// The tool is not installed; the user has to sync by hand
    Manual { instruction: String },
}

impl SyncOutcome {
    pub fn warning(&self) -> Option<String> {
        match self {
            SyncOutcome::Failed { command, message } => {
                Some(format!("`{}` failed: {}", command, message))
            }
            _ => None,
        }
    }

    pub fn instruction(&self) -> Option<&str> {
        match self {
            SyncOutcome::Manual { instruction } => Some(instruction),
            _ => None,
        }
    }
}

/// A dependency-manager command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl SyncCommand {
    pub fn display(&self) -> String {
        let program = self
            .program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string());
        let program = if self.program.is_absolute() && program == GRADLE_WRAPPER {
            format!("./{}", program)
        } else {
            program
        };
        std::iter::once(program)
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Gradle wrapper under the root or `android/`
pub fn find_gradle_wrapper(root: &Path) -> Option<PathBuf> {
    WRAPPER_DIRS
        .iter()
        .map(|dir| root.join(dir).join(GRADLE_WRAPPER))
        .find(|path| path.is_file())
}

/// Podfile whose dependency declaration changed in this run
fn changed_podfile(report: &InjectionReport) -> Option<PathBuf> {
    report
        .applied()
        .find(|r| {
            r.kind == PatchKind::Dependency
                && r.path.file_name().is_some_and(|n| n == "Podfile")
        })
        .map(|r| r.path.clone())
}

fn gradle_changed(report: &InjectionReport) -> bool {
    report.dependency_changed(|name| name.starts_with("build.gradle"))
}

/// Decide what to run, if anything
///
/// `available` answers whether a command is on `PATH`.
pub fn plan(
    platform: Platform,
    root: &Path,
    report: &InjectionReport,
    available: impl Fn(&str) -> bool,
) -> std::result::Result<Option<SyncCommand>, SyncOutcome> {
    match platform {
        Platform::Android => {
            if !gradle_changed(report) {
                return Ok(None);
            }
            if let Some(wrapper) = find_gradle_wrapper(root) {
                let dir = wrapper.parent().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                return Ok(Some(SyncCommand {
                    program: wrapper,
                    args: vec!["--refresh-dependencies".to_string()],
                    dir,
                }));
            }
            if available("gradle") {
                return Ok(Some(SyncCommand {
                    program: PathBuf::from("gradle"),
                    args: vec!["--refresh-dependencies".to_string()],
                    dir: root.to_path_buf(),
                }));
            }
            Err(SyncOutcome::Manual {
                instruction: "Sync your project with Gradle files in Android Studio (File > Sync Project with Gradle Files)".to_string(),
            })
        }
        Platform::IOS | Platform::MacOS => {
            let Some(podfile) = changed_podfile(report) else {
                return Ok(None);
            };
            let dir = podfile.parent().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
            if available("pod") {
                return Ok(Some(SyncCommand {
                    program: PathBuf::from("pod"),
                    args: vec!["install".to_string()],
                    dir,
                }));
            }
            Err(SyncOutcome::Manual {
                instruction: format!(
                    "Run `pod install` in {} (install CocoaPods with `sudo gem install cocoapods`)",
                    dir.display()
                ),
            })
        }
        Platform::Windows | Platform::Linux => Ok(None),
    }
}

async fn run(command: SyncCommand) -> SyncOutcome {
    let shown = command.display();
    info!("Running {} in {:?}", shown, command.dir);

    let result = Command::new(&command.program)
        .args(&command.args)
        .current_dir(&command.dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(output) if output.status.success() => {
            debug!("{} finished", shown);
            SyncOutcome::Ran {
                command: shown,
                dir: command.dir,
            }
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let text = if stderr.trim().is_empty() { stdout } else { stderr };
            let message = last_lines(&text, 5);
            warn!("{} failed: {}", shown, message);
            SyncOutcome::Failed {
                command: shown,
                message,
            }
        }
        Err(e) => {
            warn!("Failed to start {}: {}", shown, e);
            SyncOutcome::Failed {
                command: shown,
                message: e.to_string(),
            }
        }
    }
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(n);
    let tail = lines[start..].join("\n");
    if tail.is_empty() {
        "exited with an error".to_string()
    } else {
        tail
    }
}

/// Run the dependency manager after source mutation
pub async fn sync_dependencies(
    platform: Platform,
    root: &Path,
    report: &InjectionReport,
    enabled: bool,
) -> SyncOutcome {
    if !enabled {
        debug!("Dependency sync disabled");
        return SyncOutcome::Disabled;
    }

    match plan(platform, root, report, is_available) {
        Ok(Some(command)) => run(command).await,
        Ok(None) => SyncOutcome::NotNeeded,
        Err(outcome) => outcome,
    }
}
