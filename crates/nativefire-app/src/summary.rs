//! End-of-run summary

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use nativefire_core::{AppIdSource, IdentifierSource, InjectionReport, PatchOutcome, Platform};

use crate::sync::SyncOutcome;

/// Everything a configuration run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub platform: Platform,
    pub project_id: String,
    pub identifier: String,
    pub identifier_source: IdentifierSource,
    pub app_id: String,
    pub app_id_source: AppIdSource,
    pub installed_config: PathBuf,
    pub injection: InjectionReport,
    pub sync: SyncOutcome,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunSummary {
    /// Anchor misses, file errors and a failed sync
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self.injection.warnings.clone();
        warnings.extend(self.sync.warning());
        warnings
    }

    /// Manual follow-up steps from the mutator and the sync step
    pub fn instructions(&self) -> Vec<String> {
        let mut steps = self.injection.instructions.clone();
        steps.extend(self.sync.instruction().map(str::to_string));
        steps
    }

    /// Warnings or manual steps are left for the user
    pub fn needs_attention(&self) -> bool {
        !self.warnings().is_empty() || !self.instructions().is_empty()
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Multi-line report for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "✅ Firebase configured for {}", self.platform);
        let _ = writeln!(out, "   Project:    {}", self.project_id);
        let _ = writeln!(
            out,
            "   {}: {} ({})",
            self.platform.identifier_kind().label(),
            self.identifier,
            self.identifier_source
        );
        let _ = writeln!(out, "   App ID:     {} ({})", self.app_id, self.app_id_source);
        let _ = writeln!(out, "   Config:     {}", self.installed_config.display());

        if !self.injection.records.is_empty() || !self.injection.created.is_empty() {
            let _ = writeln!(out, "\n📝 Source changes:");
            for path in &self.injection.created {
                let _ = writeln!(out, "   + created {}", path.display());
            }
            for record in &self.injection.records {
                let mark = match record.outcome {
                    PatchOutcome::Applied => "✓",
                    PatchOutcome::AlreadyPresent => "=",
                    PatchOutcome::AnchorNotFound => "!",
                };
                let _ = writeln!(
                    out,
                    "   {} {} ({}): {}",
                    mark,
                    record.path.display(),
                    record.kind,
                    record.outcome
                );
            }
        }

        if let SyncOutcome::Ran { command, dir } = &self.sync {
            let _ = writeln!(out, "\n📦 Ran `{}` in {}", command, dir.display());
        }

        let warnings = self.warnings();
        if !warnings.is_empty() {
            let _ = writeln!(out, "\n⚠️  Warnings:");
            for warning in warnings {
                let _ = writeln!(out, "   - {}", warning);
            }
        }

        let steps = self.instructions();
        if !steps.is_empty() {
            let _ = writeln!(out, "\n📋 Next steps:");
            for (i, step) in steps.iter().enumerate() {
                let _ = writeln!(out, "   {}. {}", i + 1, step);
            }
        }

        out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nativefire_core::{PatchKind, PatchRecord};

    fn summary() -> RunSummary {
        let now = Local::now();
        let mut injection = InjectionReport::new();
        injection.records.push(PatchRecord {
            path: PathBuf::from("/p/app/build.gradle"),
            kind: PatchKind::Dependency,
            outcome: PatchOutcome::Applied,
        });
        RunSummary {
            platform: Platform::Android,
            project_id: "demo".to_string(),
            identifier: "com.example.app".to_string(),
            identifier_source: IdentifierSource::Generated,
            app_id: "1:1:android:a".to_string(),
            app_id_source: AppIdSource::Created,
            installed_config: PathBuf::from("/p/app/google-services.json"),
            injection,
            sync: SyncOutcome::NotNeeded,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_render_lists_run_facts() {
        let text = summary().render();
        assert!(text.contains("Firebase configured for Android"));
        assert!(text.contains("App ID:     1:1:android:a (created)"));
        assert!(text.contains("Package Name: com.example.app (generated)"));
        assert!(text.contains("/p/app/google-services.json"));
        assert!(text.contains("✓ /p/app/build.gradle"));
        assert!(!text.contains("Warnings"));
    }

    #[test]
    fn test_warnings_include_sync_failure() {
        let mut s = summary();
        s.injection.warn("Could not add initialization to MainActivity.kt");
        s.sync = SyncOutcome::Failed {
            command: "./gradlew --refresh-dependencies".to_string(),
            message: "network".to_string(),
        };

        assert_eq!(s.warnings().len(), 2);
        assert!(s.needs_attention());
        assert!(s.render().contains("⚠️  Warnings:"));
    }

    #[test]
    fn test_instructions_include_manual_sync() {
        let mut s = summary();
        s.sync = SyncOutcome::Manual {
            instruction: "Run `pod install` in ios".to_string(),
        };
        let text = s.render();
        assert!(text.contains("Next steps:"));
        assert!(text.contains("1. Run `pod install` in ios"));
    }

    #[test]
    fn test_clean_run_needs_no_attention() {
        assert!(!summary().needs_attention());
        assert_eq!(summary().elapsed_ms(), 0);
    }
}
