//! # nativefire-firebase - Firebase CLI Plumbing
//!
//! Locates and drives the `firebase` command-line tool, parses its JSON and
//! text output, and reconciles the resolved application identifier against
//! the apps already registered under a project.
//!
//! Depends on [`nativefire_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### CLI Invocation (`cli`)
//! - [`FirebaseCli`] - Resolved `firebase` executable, runs subcommands
//!
//! ### Registry (`registry`, `projects`, `apps`)
//! - [`Registry`] / [`LocalRegistry`] - List projects/apps, create apps, download config
//! - [`RemoteProject`], [`RemoteApp`] - Snapshots of registry records
//! - [`download_artifact()`] - Fetch the config file into a unique temp path
//!
//! ### Reconciliation (`reconcile`)
//! - [`reconcile()`] - Reuse a matching app, or create one (with duplicate recovery)
//!
//! ### Tooling (`tool_availability`)
//! - [`check_dependencies()`], [`preflight()`] - External tool checks

pub mod apps;
pub mod cli;
pub mod projects;
pub mod reconcile;
pub mod registry;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;
pub mod tool_availability;

pub use apps::{extract_app_id, find_matching_app, is_duplicate_error, RemoteApp};
pub use cli::{CommandOutput, FirebaseCli};
pub use projects::{find_project, RemoteProject};
pub use reconcile::{app_display_name, manual_creation_guidance, reconcile, Reconciled};
pub use registry::{download_artifact, validate_project, LocalRegistry, Registry};
pub use tool_availability::{
    check_dependencies, is_available, preflight, Dependency, DependencyScope, DEPENDENCIES,
};
