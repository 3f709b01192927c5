//! Firebase project listing

use nativefire_core::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cli::parse_envelope;

/// Lifecycle state of a usable project
pub const ACTIVE_STATE: &str = "ACTIVE";

/// A Firebase project as reported by `firebase projects:list --json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProject {
    pub project_id: String,

    #[serde(default)]
    pub display_name: String,

    /// Numeric project id, serialized as a string by the CLI
    #[serde(default)]
    pub project_number: String,

    /// "ACTIVE" or "DELETE_REQUESTED"
    #[serde(default)]
    pub state: String,
}

impl RemoteProject {
    pub fn is_active(&self) -> bool {
        self.state == ACTIVE_STATE
    }

    /// Display name, falling back to the id for unnamed projects
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.project_id
        } else {
            &self.display_name
        }
    }
}

/// Parse `projects:list --json` output, keeping only active projects
pub fn parse_projects_output(json: &str) -> Result<Vec<RemoteProject>> {
    let projects: Vec<RemoteProject> = parse_envelope(json)?;
    let total = projects.len();
    let active = filter_active(projects);
    debug!("{} of {} projects are active", active.len(), total);
    Ok(active)
}

pub fn filter_active(projects: Vec<RemoteProject>) -> Vec<RemoteProject> {
    projects.into_iter().filter(RemoteProject::is_active).collect()
}

/// Find a project by exact id
pub fn find_project<'a>(projects: &'a [RemoteProject], project_id: &str) -> Option<&'a RemoteProject> {
    projects.iter().find(|p| p.project_id == project_id)
}
