//! Project and platform selection

use std::io::{BufRead, Write};
use std::path::Path;

use nativefire_core::prelude::*;
use nativefire_core::{detect_platform, Platform};
use nativefire_firebase::{find_project, validate_project, LocalRegistry, RemoteProject};

/// Pick the platform for a run
///
/// An explicit platform always wins. Otherwise the project directory is
/// classified, unless auto-detection is turned off.
pub fn choose_platform(explicit: Option<Platform>, auto_detect: bool, root: &Path) -> Result<Platform> {
    if let Some(platform) = explicit {
        debug!("Using requested platform {}", platform);
        return Ok(platform);
    }
    if !auto_detect {
        return Err(Error::AutoDetectDisabled);
    }
    let platform = detect_platform(root)?;
    info!("Detected platform: {}", platform);
    Ok(platform)
}

/// Where the project id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectChoice {
    Flag,
    Settings,
    OnlyProject,
    Prompted,
}

/// Resolve the Firebase project for a run
///
/// Explicit ids (flag, then settings) are validated against the registry.
/// Without one, a single active project is used as-is; several are offered
/// to `prompt`, which returns the chosen index.
pub async fn choose_project<R, P>(
    registry: &R,
    flag: Option<&str>,
    settings_default: Option<&str>,
    prompt: P,
) -> Result<(RemoteProject, ProjectChoice)>
where
    R: LocalRegistry,
    P: FnOnce(&[RemoteProject]) -> Result<usize>,
{
    let explicit = non_blank(flag)
        .map(|id| (id, ProjectChoice::Flag))
        .or_else(|| non_blank(settings_default).map(|id| (id, ProjectChoice::Settings)));

    if let Some((id, choice)) = explicit {
        let project = validate_project(registry, id).await?;
        return Ok((project, choice));
    }

    let projects = registry.list_projects().await?;
    match projects.len() {
        0 => Err(Error::NoProjects),
        1 => {
            let project = projects.into_iter().next().ok_or(Error::NoProjects)?;
            info!("Using the only available project: {}", project.project_id);
            Ok((project, ProjectChoice::OnlyProject))
        }
        _ => {
            let index = prompt(&projects)?;
            let project = projects
                .get(index)
                .cloned()
                .ok_or_else(|| Error::selection(format!("no project at position {}", index + 1)))?;
            Ok((project, ProjectChoice::Prompted))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Numbered project list, one per line
pub fn format_project_list(projects: &[RemoteProject], verbose: bool) -> String {
    projects
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut line = format!("  {}. {} ({})", i + 1, p.label(), p.project_id);
            if verbose && !p.project_number.is_empty() {
                line.push_str(&format!(" [#{}]", p.project_number));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a 1-based choice into a 0-based index
///
/// A project id typed instead of a number is accepted too.
pub fn parse_choice(input: &str, projects: &[RemoteProject]) -> Result<usize> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::selection("no project selected"));
    }

    if let Ok(n) = input.parse::<usize>() {
        if n >= 1 && n <= projects.len() {
            return Ok(n - 1);
        }
        return Err(Error::selection(format!(
            "please enter a number between 1 and {}",
            projects.len()
        )));
    }

    find_project(projects, input)
        .and_then(|p| projects.iter().position(|q| q.project_id == p.project_id))
        .ok_or_else(|| Error::selection(format!("'{}' is not a listed project", input)))
}

/// Show the list and read one choice
pub fn prompt_choice<R: BufRead, W: Write>(
    projects: &[RemoteProject],
    input: &mut R,
    output: &mut W,
) -> Result<usize> {
    writeln!(output, "📋 Available Firebase projects:")?;
    writeln!(output, "{}", format_project_list(projects, false))?;
    write!(output, "Select a project (1-{}): ", projects.len())?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    parse_choice(&line, projects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nativefire_firebase::test_utils::{test_project, FakeRegistry};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn two_projects() -> Vec<RemoteProject> {
        vec![test_project("alpha"), test_project("beta")]
    }

    #[test]
    fn test_choose_platform_explicit_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("build.gradle"), "").unwrap();

        let platform = choose_platform(Some(Platform::IOS), true, temp.path()).unwrap();
        assert_eq!(platform, Platform::IOS);
    }

    #[test]
    fn test_choose_platform_detects() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("build.gradle"), "").unwrap();
        std::fs::write(temp.path().join("Podfile"), "").unwrap();

        assert_eq!(choose_platform(None, true, temp.path()).unwrap(), Platform::Android);
    }

    #[test]
    fn test_choose_platform_auto_detect_disabled() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("build.gradle"), "").unwrap();

        let err = choose_platform(None, false, temp.path()).unwrap_err();
        assert!(matches!(err, Error::AutoDetectDisabled));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_choose_platform_nothing_detected() {
        let temp = TempDir::new().unwrap();
        let err = choose_platform(None, true, temp.path()).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.remediation().unwrap().contains("--platform"));
    }

    #[tokio::test]
    async fn test_flag_is_validated() {
        let registry = FakeRegistry::new().with_projects(two_projects());

        let (project, choice) = choose_project(&registry, Some("beta"), Some("alpha"), |_| {
            panic!("should not prompt")
        })
        .await
        .unwrap();
        assert_eq!(project.project_id, "beta");
        assert_eq!(choice, ProjectChoice::Flag);

        let err = choose_project(&registry, Some("gamma"), None, |_| Ok(0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_settings_default_used_without_flag() {
        let registry = FakeRegistry::new().with_projects(two_projects());
        let (project, choice) = choose_project(&registry, None, Some("alpha"), |_| Ok(1))
            .await
            .unwrap();
        assert_eq!(project.project_id, "alpha");
        assert_eq!(choice, ProjectChoice::Settings);
    }

    #[tokio::test]
    async fn test_single_project_auto_selected() {
        let registry = FakeRegistry::new().with_projects(vec![test_project("solo")]);
        let (project, choice) = choose_project(&registry, Some("  "), None, |_| {
            panic!("should not prompt")
        })
        .await
        .unwrap();
        assert_eq!(project.project_id, "solo");
        assert_eq!(choice, ProjectChoice::OnlyProject);
    }

    #[tokio::test]
    async fn test_no_projects_fails() {
        let registry = FakeRegistry::new();
        let err = choose_project(&registry, None, None, |_| Ok(0)).await.unwrap_err();
        assert!(matches!(err, Error::NoProjects));
    }

    #[tokio::test]
    async fn test_several_projects_prompt() {
        let registry = FakeRegistry::new().with_projects(two_projects());
        let (project, choice) = choose_project(&registry, None, None, |projects| {
            assert_eq!(projects.len(), 2);
            Ok(1)
        })
        .await
        .unwrap();
        assert_eq!(project.project_id, "beta");
        assert_eq!(choice, ProjectChoice::Prompted);
    }

    #[test]
    fn test_parse_choice() {
        let projects = two_projects();
        assert_eq!(parse_choice("1\n", &projects).unwrap(), 0);
        assert_eq!(parse_choice(" 2 ", &projects).unwrap(), 1);
        assert_eq!(parse_choice("beta", &projects).unwrap(), 1);
        assert!(parse_choice("3", &projects).is_err());
        assert!(parse_choice("0", &projects).is_err());
        assert!(parse_choice("", &projects).is_err());
        assert!(matches!(
            parse_choice("gamma", &projects),
            Err(Error::Selection { .. })
        ));
    }

    #[test]
    fn test_prompt_choice_reads_line() {
        let projects = two_projects();
        let mut input = Cursor::new("2\n");
        let mut output = Vec::new();

        let index = prompt_choice(&projects, &mut input, &mut output).unwrap();
        assert_eq!(index, 1);

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("1. alpha (alpha)"));
        assert!(shown.contains("Select a project (1-2)"));
    }

    #[test]
    fn test_format_project_list_verbose() {
        let list = format_project_list(&[test_project("alpha")], true);
        assert_eq!(list, "  1. alpha (alpha) [#123456789]");
    }
}
