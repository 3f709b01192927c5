//! Test utilities for registry types
//!
//! Provides [`FakeRegistry`], an in-memory [`Registry`](crate::Registry), and
//! helpers for building project and app records.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nativefire_core::prelude::*;
use nativefire_core::RegistryPlatform;

use crate::apps::RemoteApp;
use crate::projects::{RemoteProject, ACTIVE_STATE};
use crate::registry::Registry;

/// Creates an active project whose display name mirrors its id.
pub fn test_project(project_id: &str) -> RemoteProject {
    RemoteProject {
        project_id: project_id.to_string(),
        display_name: project_id.to_string(),
        project_number: "123456789".to_string(),
        state: ACTIVE_STATE.to_string(),
    }
}

/// Creates an app record carrying the identifier in `namespace` only.
///
/// # Arguments
/// * `app_id` - Firebase app id
/// * `platform` - Registry platform string ("ANDROID", "IOS")
/// * `namespace` - Bundle id or package name
pub fn test_app(app_id: &str, platform: &str, namespace: &str) -> RemoteApp {
    RemoteApp {
        app_id: app_id.to_string(),
        display_name: format!("{} app", platform.to_lowercase()),
        project_id: "demo".to_string(),
        platform: platform.to_string(),
        namespace: Some(namespace.to_string()),
        bundle_id: None,
        package_name: None,
    }
}

/// One recorded `create_app` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCall {
    pub project_id: String,
    pub platform: RegistryPlatform,
    pub display_name: String,
    pub identifier: String,
}

#[derive(Debug, Clone)]
enum CreateBehavior {
    Succeed(String),
    Fail(String),
}

/// In-memory registry
///
/// App listings are served from a queue: each `list_apps` call pops the next
/// listing, and the last one is repeated once the queue runs dry.
#[derive(Debug)]
pub struct FakeRegistry {
    projects: Vec<RemoteProject>,
    listings: Mutex<VecDeque<Vec<RemoteApp>>>,
    list_error: Option<String>,
    create: CreateBehavior,
    config_contents: String,
    download_error: Option<String>,
    list_calls: Mutex<usize>,
    creates: Mutex<Vec<CreateCall>>,
    downloads: Mutex<Vec<(RegistryPlatform, String, PathBuf)>>,
}

impl Default for FakeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self {
            projects: Vec::new(),
            listings: Mutex::new(VecDeque::new()),
            list_error: None,
            create: CreateBehavior::Succeed("1:123456789:android:created".to_string()),
            config_contents: "{}".to_string(),
            download_error: None,
            list_calls: Mutex::new(0),
            creates: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn with_projects(mut self, projects: Vec<RemoteProject>) -> Self {
        self.projects = projects;
        self
    }

    /// Serve `apps` for every listing
    pub fn with_apps(self, apps: Vec<RemoteApp>) -> Self {
        self.then_list(apps)
    }

    /// Queue one more listing
    pub fn then_list(self, apps: Vec<RemoteApp>) -> Self {
        if let Ok(mut listings) = self.listings.lock() {
            listings.push_back(apps);
        }
        self
    }

    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn creating(mut self, app_id: &str) -> Self {
        self.create = CreateBehavior::Succeed(app_id.to_string());
        self
    }

    /// `create_app` fails with `message` as CLI output
    pub fn failing_create(mut self, message: &str) -> Self {
        self.create = CreateBehavior::Fail(message.to_string());
        self
    }

    pub fn with_config_contents(mut self, contents: &str) -> Self {
        self.config_contents = contents.to_string();
        self
    }

    pub fn failing_download(mut self, message: &str) -> Self {
        self.download_error = Some(message.to_string());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.lock().map(|n| *n).unwrap_or(0)
    }

    pub fn creates(&self) -> Vec<CreateCall> {
        self.creates.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// (platform, app id, output path) per download
    pub fn downloads(&self) -> Vec<(RegistryPlatform, String, PathBuf)> {
        self.downloads.lock().map(|d| d.clone()).unwrap_or_default()
    }

    fn next_listing(&self) -> Vec<RemoteApp> {
        let Ok(mut listings) = self.listings.lock() else {
            return Vec::new();
        };
        if listings.len() > 1 {
            listings.pop_front().unwrap_or_default()
        } else {
            listings.front().cloned().unwrap_or_default()
        }
    }
}

impl Registry for FakeRegistry {
    async fn list_projects(&self) -> Result<Vec<RemoteProject>> {
        Ok(self.projects.clone())
    }

    async fn list_apps(&self, _project_id: &str) -> Result<Vec<RemoteApp>> {
        if let Ok(mut calls) = self.list_calls.lock() {
            *calls += 1;
        }
        if let Some(message) = &self.list_error {
            return Err(Error::registry(message.clone()));
        }
        Ok(self.next_listing())
    }

    async fn create_app(
        &self,
        project_id: &str,
        platform: RegistryPlatform,
        display_name: &str,
        identifier: &str,
    ) -> Result<String> {
        if let Ok(mut creates) = self.creates.lock() {
            creates.push(CreateCall {
                project_id: project_id.to_string(),
                platform,
                display_name: display_name.to_string(),
                identifier: identifier.to_string(),
            });
        }
        match &self.create {
            CreateBehavior::Succeed(app_id) => Ok(app_id.clone()),
            CreateBehavior::Fail(message) => Err(Error::app_creation(message.clone(), "")),
        }
    }

    async fn download_config(
        &self,
        _project_id: &str,
        platform: RegistryPlatform,
        app_id: &str,
        out: &Path,
    ) -> Result<()> {
        if let Ok(mut downloads) = self.downloads.lock() {
            downloads.push((platform, app_id.to_string(), out.to_path_buf()));
        }
        if let Some(message) = &self.download_error {
            return Err(Error::registry(format!("Failed to download config: {}", message)));
        }
        std::fs::write(out, &self.config_contents)?;
        Ok(())
    }
}
