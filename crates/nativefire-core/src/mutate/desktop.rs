//! Windows and Linux: manual setup only
//!
//! Desktop targets use the Firebase C++ SDK, which has no conventional
//! entry point to patch. The installer still places the configuration file.

use std::path::Path;

use tracing::info;

use super::InjectionReport;
use crate::platform::Platform;
use crate::probe;

const CPP_SDK_DOCS: &str = "https://firebase.google.com/docs/cpp/setup";

pub(super) fn inject(platform: Platform, root: &Path, report: &mut InjectionReport) {
    info!("Automatic code injection is not available for {}", platform);

    let config = probe::display_relative(root, &platform.config_dir(root).join(platform.config_file_name()));
    report.instruct(format!(
        "Please manually add Firebase initialization code to your {} application",
        platform
    ));
    report.instruct(format!(
        "Link the Firebase C++ SDK and create the app with firebase::App::Create(), loading {}",
        config
    ));
    let has_cmake = probe::exists(root, "CMakeLists.txt")
        || platform
            .preferred_dir()
            .is_some_and(|d| probe::exists(root, Path::new(d).join("CMakeLists.txt")));
    if has_cmake {
        report.instruct("Add the SDK libraries (firebase_app and the products you use) to target_link_libraries in CMakeLists.txt");
    }
    report.instruct(format!("See {CPP_SDK_DOCS} for platform-specific initialization steps"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_desktop_reports_instructions_only() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("CMakeLists.txt"), "project(demo)\n").unwrap();

        let mut report = InjectionReport::new();
        inject(Platform::Windows, temp.path(), &mut report);

        assert!(report.records.is_empty());
        assert!(report.created.is_empty());
        assert!(report.instructions[0].contains("Windows"));
        assert!(report
            .instructions
            .iter()
            .any(|i| i.contains("google-services.json")));
        assert!(report.instructions.iter().any(|i| i.contains("CMakeLists.txt")));
        assert_eq!(
            fs::read_to_string(temp.path().join("CMakeLists.txt")).unwrap(),
            "project(demo)\n"
        );
    }

    #[test]
    fn test_linux_config_location_in_instructions() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("linux")).unwrap();

        let mut report = InjectionReport::new();
        inject(Platform::Linux, temp.path(), &mut report);

        assert!(report
            .instructions
            .iter()
            .any(|i| i.contains("linux/google-services.json")));
    }
}
