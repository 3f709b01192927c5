//! # nativefire-core - Detection and Source Mutation
//!
//! Foundation crate for nativefire. Classifies a project directory, resolves
//! the application identifier, installs the downloaded configuration file and
//! patches build and source files so Firebase initializes at startup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, regex, walkdir, glob, tracing).
//!
//! ## Public API
//!
//! ### Platforms (`platform`)
//! - [`Platform`] - Android, iOS, macOS, Windows, Linux
//! - [`classify()`] - First platform whose structural signals match
//!
//! ### Identifiers (`identifier`)
//! - [`resolve()`] - Explicit, parsed, then generated bundle id / package name
//! - [`generate()`] - Deterministic identifier from a Firebase project id
//!
//! ### Installation (`install`)
//! - [`install()`] - Move the downloaded config into the platform's directory
//!
//! ### Source Mutation (`mutate`, `patch`)
//! - [`inject()`] - Per-platform dependency, entry point and init patches
//! - [`PatchOutcome`] - Applied, AlreadyPresent or AnchorNotFound
//! - [`InjectionReport`] - Patch records, created files and warnings
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! ```rust
//! use nativefire_core::prelude::*;
//! ```

pub mod error;
pub mod identifier;
pub mod install;
pub mod logging;
pub mod mutate;
pub mod patch;
pub mod platform;
pub mod probe;
pub mod project;

/// Prelude for common imports used throughout all nativefire crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

pub use error::{Error, Result, ResultExt};
pub use identifier::{generate, resolve, IdentifierSource, ResolvedIdentifier};
pub use install::install;
pub use mutate::{inject, InjectionReport};
pub use patch::{PatchKind, PatchOutcome, PatchRecord};
pub use platform::{classify, detect_platform, IdentifierKind, Platform, RegistryPlatform};
pub use project::{AppIdSource, ProjectConfig};
