//! # nativefire-app - Configuration Run Orchestration
//!
//! Drives one `configure` run from the resolved platform and project to the
//! installed config file and patched sources, then syncs dependencies and
//! summarizes what happened.
//!
//! Depends on [`nativefire_core`] for detection and mutation and on
//! [`nativefire_firebase`] for the registry.
//!
//! ## Public API
//!
//! - [`configure()`] - Run every stage for a [`ConfigureRequest`]
//! - [`choose_platform()`], [`choose_project()`] - Merge flags, settings and detection
//! - [`Settings`], [`load_settings()`] - `config.toml` with defaults
//! - [`sync_dependencies()`] - Gradle / CocoaPods after mutation
//! - [`RunSummary`] - What the run did, rendered for the terminal

pub mod pipeline;
pub mod select;
pub mod settings;
pub mod summary;
pub mod sync;

pub use pipeline::{configure, ConfigureRequest, Stage};
pub use select::{choose_platform, choose_project, format_project_list, prompt_choice, ProjectChoice};
pub use settings::{default_config_path, load_settings, Settings};
pub use summary::RunSummary;
pub use sync::{sync_dependencies, SyncOutcome};
