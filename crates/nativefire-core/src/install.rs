//! Configuration artifact installation

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::platform::Platform;

/// Copy the downloaded artifact into the platform's configuration directory
///
/// The target directory is created when missing. The artifact is consumed:
/// it is removed after a successful copy. Returns the installed path.
pub fn install(platform: Platform, artifact: &Path, root: &Path) -> Result<PathBuf> {
    if !artifact.is_file() {
        return Err(Error::artifact_missing(artifact));
    }

    let target_dir = platform.config_dir(root);
    let target = target_dir.join(platform.config_file_name());
    debug!("Installing {:?} to {:?}", artifact, target);

    fs::create_dir_all(&target_dir).map_err(|e| Error::install(&target, e))?;
    let bytes = fs::read(artifact)?;
    fs::write(&target, bytes).map_err(|e| Error::install(&target, e))?;

    if let Err(e) = fs::remove_file(artifact) {
        warn!("Could not remove downloaded artifact {:?}: {}", artifact, e);
    }

    info!("Installed {} at {:?}", platform.config_file_name(), target);
    Ok(target)
}
