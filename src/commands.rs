//! Subcommand handlers

use std::io;
use std::path::PathBuf;

use nativefire_app::{
    choose_platform, choose_project, configure as run_configure, format_project_list,
    prompt_choice, ConfigureRequest, ProjectChoice, Settings,
};
use nativefire_core::prelude::*;
use nativefire_core::Platform;
use nativefire_firebase::{preflight, FirebaseCli, LocalRegistry, RemoteProject};

/// `configure` flags, before merging with settings
#[derive(Debug, Default)]
pub struct ConfigureOptions {
    pub project: Option<String>,
    pub platform: Option<String>,
    pub auto_detect: Option<bool>,
    pub app_id: Option<String>,
    pub bundle_id: Option<String>,
    pub package_name: Option<String>,
    pub path: Option<PathBuf>,
    pub skip_sync: bool,
}

impl ConfigureOptions {
    fn platform(&self) -> Result<Option<Platform>> {
        self.platform.as_deref().map(str::parse).transpose()
    }

    fn root(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

fn prompt_stdin(projects: &[RemoteProject]) -> Result<usize> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt_choice(projects, &mut input, &mut output)
}

pub async fn configure(options: ConfigureOptions, settings: &Settings) -> Result<()> {
    let root = options.root();
    let auto_detect = options.auto_detect.unwrap_or(settings.configure.auto_detect);

    let platform = choose_platform(options.platform()?, auto_detect, &root)?;
    println!("🎯 Platform: {}", platform);

    let missing_optional = preflight(platform)?;
    for dep in missing_optional {
        println!("⚠️  {} not found ({})", dep.name, dep.install_hint());
    }

    let cli = FirebaseCli::locate(settings.firebase.bin.as_deref())?;

    let (project, choice) = choose_project(
        &cli,
        options.project.as_deref(),
        settings.firebase.default_project.as_deref(),
        prompt_stdin,
    )
    .await?;
    match choice {
        ProjectChoice::OnlyProject => {
            println!("💡 Auto-selecting the only project: {}", project.project_id)
        }
        _ => println!("🔥 Project: {} ({})", project.label(), project.project_id),
    }
    println!();

    let mut request = ConfigureRequest::new(project.project_id, platform, root);
    request.app_id = options.app_id;
    request.bundle_id = options.bundle_id;
    request.package_name = options.package_name;
    request.sync = !options.skip_sync && settings.configure.sync_dependencies;

    let summary = run_configure(&cli, &request, |stage| println!("{}", stage)).await?;

    println!();
    println!("{}", summary.render());
    info!("Run finished in {} ms", summary.elapsed_ms());
    Ok(())
}

async fn fetch_projects(settings: &Settings) -> Result<Vec<RemoteProject>> {
    let cli = FirebaseCli::locate(settings.firebase.bin.as_deref())?;
    cli.list_projects().await
}

pub async fn list_projects(settings: &Settings, verbose: bool) -> Result<()> {
    let projects = fetch_projects(settings).await?;
    if projects.is_empty() {
        println!("⚠️  No Firebase projects found");
        println!("🔗 Create your first project at https://console.firebase.google.com/");
        return Ok(());
    }

    println!("🔥 Your Firebase projects ({})", projects.len());
    println!();
    println!("{}", format_project_list(&projects, verbose));
    println!();
    println!("Quick start:");
    println!("  nativefire configure --project <PROJECT_ID>");
    println!("  nativefire projects select");
    Ok(())
}

pub async fn select_project(settings: &Settings) -> Result<()> {
    let projects = fetch_projects(settings).await?;
    if projects.is_empty() {
        return Err(Error::NoProjects);
    }

    let index = prompt_stdin(&projects)?;
    let project = projects
        .get(index)
        .ok_or_else(|| Error::selection(format!("no project at position {}", index + 1)))?;

    println!();
    println!("✅ Selected project: {} ({})", project.label(), project.project_id);
    println!("   Next: nativefire configure --project {}", project.project_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_platform_flag() {
        let options = ConfigureOptions {
            platform: Some("web".to_string()),
            ..Default::default()
        };
        assert!(matches!(options.platform(), Err(Error::UnknownPlatform { .. })));
    }

    #[test]
    fn test_platform_flag_parses() {
        let options = ConfigureOptions {
            platform: Some("macos".to_string()),
            ..Default::default()
        };
        assert_eq!(options.platform().unwrap(), Some(Platform::MacOS));
        assert_eq!(ConfigureOptions::default().platform().unwrap(), None);
    }

    #[test]
    fn test_root_prefers_path_flag() {
        let options = ConfigureOptions {
            path: Some(PathBuf::from("/work/app")),
            ..Default::default()
        };
        assert_eq!(options.root(), PathBuf::from("/work/app"));
    }
}
