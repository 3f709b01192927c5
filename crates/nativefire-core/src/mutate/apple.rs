//! iOS and macOS dependency and `AppDelegate` patches
//!
//! Two nested dialects are handled: the source language of the delegate
//! (Swift or Objective-C) and the UI structure of the app (a delegate that
//! owns the lifecycle, or a SwiftUI `App` that reaches the delegate through
//! an adaptor property).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::templates;
use super::InjectionReport;
use crate::error::Result;
use crate::patch::{self, PatchKind};
use crate::platform::Platform;
use crate::probe;

pub const FIREBASE_IOS_SDK_URL: &str = "https://github.com/firebase/firebase-ios-sdk";
pub const FIREBASE_IOS_SDK_VERSION: &str = "10.24.0";

const POD_MARKERS: &[&str] = &["FirebaseCore", "Firebase/Core"];
const SWIFT_INIT_MARKER: &str = "FirebaseApp.configure()";
const OBJC_INIT_MARKER: &str = "[FIRApp configure]";
const OBJC_IMPORT_MARKERS: &[&str] = &[
    "@import FirebaseCore;",
    "#import <FirebaseCore/FirebaseCore.h>",
    "@import Firebase;",
    "#import <Firebase/Firebase.h>",
];
const ADAPTOR_MARKER: &str = "ApplicationDelegateAdaptor";
const PUSH_MARKER: &str = "didRegisterForRemoteNotificationsWithDeviceToken";
const MAIN_ATTRIBUTES: &[&str] = &["@main", "@UIApplicationMain", "@NSApplicationMain"];
/// Entry points besides the app delegate that own a UIKit or AppKit lifecycle
const LEGACY_ENTRY_POINTS: &[&str] = &["SceneDelegate.swift", "main.swift", "main.m"];

static POD_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([ \t]*)target\s+['"][^'"]+['"]\s+do\b.*$"#).expect("Invalid target regex")
});

static PACKAGE_DEPENDENCIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"dependencies\s*:\s*\[").expect("Invalid dependencies regex"));

static SWIFT_FIREBASE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import\s+(?:FirebaseCore|Firebase)[ \t]*$").expect("Invalid import regex")
});

static SWIFT_FRAMEWORK_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^import\s+(?:UIKit|SwiftUI|Cocoa|AppKit|Flutter|FlutterMacOS)[ \t]*$")
        .expect("Invalid import regex")
});

static SWIFT_ANY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\s+\S.*$").expect("Invalid import regex"));

static SWIFT_DID_FINISH_LAUNCHING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"func\s+application\s*\([^{]*didFinishLaunchingWithOptions[^{]*\{")
        .expect("Invalid didFinishLaunching regex")
});

static SWIFT_APPKIT_DID_FINISH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"func\s+applicationDidFinishLaunching\s*\([^{]*\{")
        .expect("Invalid applicationDidFinishLaunching regex")
});

static OBJC_DID_FINISH_LAUNCHING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\s*\(BOOL\)\s*application\s*:[^{;]*didFinishLaunchingWithOptions\s*:[^{;]*\{")
        .expect("Invalid didFinishLaunching regex")
});

static OBJC_APPKIT_DID_FINISH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-\s*\(void\)\s*applicationDidFinishLaunching\s*:[^{;]*\{")
        .expect("Invalid applicationDidFinishLaunching regex")
});

static OBJC_APP_DELEGATE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^#import\s+"AppDelegate\.h".*$"#).expect("Invalid import regex")
});

static OBJC_ANY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[#@]import\s+.*$").expect("Invalid import regex"));

static OBJC_FIREBASE_CORE_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:@import\s+Firebase(?:Core)?;|#import\s+<Firebase(?:Core)?/Firebase(?:Core)?\.h>).*$")
        .expect("Invalid import regex")
});

static SWIFTUI_APP_STRUCT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:public\s+)?struct\s+\w+\s*:\s*(?:SwiftUI\.)?App\b[^{]*\{")
        .expect("Invalid App struct regex")
});

static PROXY_DISABLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"<key>FirebaseAppDelegateProxyEnabled</key>\s*(?:<false\s*/>|<false>\s*</false>|<string>NO</string>)",
    )
    .expect("Invalid proxy regex")
});

/// Source language of the app delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppleLanguage {
    Swift,
    ObjectiveC,
}

/// How the app's lifecycle is structured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppleUi {
    /// The delegate owns the lifecycle (`@main class AppDelegate`)
    LegacyLifecycle,
    /// A SwiftUI `App` struct owns the lifecycle
    DeclarativeUi,
}

/// How the Firebase SDK gets into the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyManager {
    CocoaPods(PathBuf),
    SwiftPackage(PathBuf),
    /// Xcode project without a Podfile; packages are added in Xcode
    Xcode,
    Unmanaged,
}

/// Directories searched for entry points, platform folder first
fn search_roots(platform: Platform, root: &Path) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(2);
    if let Some(sub) = platform.preferred_dir() {
        let dir = root.join(sub);
        if dir.is_dir() {
            roots.push(dir);
        }
    }
    roots.push(root.to_path_buf());
    roots
}

fn find_in(platform: Platform, root: &Path, pattern: &str) -> Option<PathBuf> {
    search_roots(platform, root)
        .iter()
        .find_map(|dir| probe::find_file(dir, pattern))
}

fn file_contains(path: &Path, needle: &str) -> bool {
    fs::read_to_string(path)
        .map(|c| c.contains(needle))
        .unwrap_or(false)
}

/// Xcode project name for `platform`, without extension
pub fn project_name(platform: Platform, root: &Path) -> Option<String> {
    find_in(platform, root, "*.xcodeproj")
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
}

pub fn find_podfile(platform: Platform, root: &Path) -> Option<PathBuf> {
    let mut candidates = vec![root.join("Podfile")];
    if let Some(sub) = platform.preferred_dir() {
        candidates.push(root.join(sub).join("Podfile"));
    }
    candidates.into_iter().find(|p| p.is_file())
}

pub fn dependency_manager(platform: Platform, root: &Path) -> DependencyManager {
    if let Some(podfile) = find_podfile(platform, root) {
        return DependencyManager::CocoaPods(podfile);
    }
    let package = root.join("Package.swift");
    if package.is_file() {
        return DependencyManager::SwiftPackage(package);
    }
    if find_in(platform, root, "*.xcodeproj").is_some() {
        return DependencyManager::Xcode;
    }
    DependencyManager::Unmanaged
}

/// Add the Firebase pods after the first `target '...' do` line
pub fn add_pods(content: &str) -> Option<String> {
    let caps = POD_TARGET.captures(content)?;
    let indent = format!("{}  ", &caps[1]);
    let core = format!("{indent}pod 'FirebaseCore'");
    let analytics = format!("{indent}pod 'FirebaseAnalytics'");
    patch::insert_after_anchor(content, &POD_TARGET, &[&core, &analytics])
}

/// Declare the Firebase package in a `Package.swift` dependency list
pub fn add_swift_package(content: &str) -> Option<String> {
    let declaration =
        format!(".package(url: \"{FIREBASE_IOS_SDK_URL}\", from: \"{FIREBASE_IOS_SDK_VERSION}\"),");

    let m = PACKAGE_DEPENDENCIES.find(content)?;
    let rest = &content[m.end()..];
    if rest.trim_start_matches([' ', '\t']).starts_with(']') {
        // Inline empty list: `dependencies: []`
        let line_start = content[..m.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let indent: String = content[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        let close = m.end() + rest.find(']')?;
        return Some(format!(
            "{}\n{indent}    {declaration}\n{indent}{}",
            &content[..m.end()],
            &content[close..]
        ));
    }
    patch::insert_block_start(content, &PACKAGE_DEPENDENCIES, &[&declaration])
}

/// Language for a newly created delegate
///
/// Existing Swift sources win, then Objective-C sources, then a Podfile
/// with `use_frameworks!`. Defaults to Swift.
pub fn detect_language(platform: Platform, root: &Path) -> AppleLanguage {
    if probe::has_file(root, "*.swift") {
        return AppleLanguage::Swift;
    }
    if probe::has_file(root, "*.m") || probe::has_file(root, "*.h") {
        return AppleLanguage::ObjectiveC;
    }
    if find_podfile(platform, root).is_some_and(|p| file_contains(&p, "use_frameworks!")) {
        return AppleLanguage::Swift;
    }
    AppleLanguage::Swift
}

/// Swift file declaring a SwiftUI `App` struct
pub fn find_swiftui_app(platform: Platform, root: &Path) -> Option<PathBuf> {
    search_roots(platform, root).iter().find_map(|dir| {
        probe::find_file_where(dir, "*.swift", probe::DEFAULT_SEARCH_DEPTH, |p| {
            fs::read_to_string(p)
                .map(|c| c.contains("import SwiftUI") && SWIFTUI_APP_STRUCT.is_match(&c))
                .unwrap_or(false)
        })
    })
}

/// Lifecycle style of the project
///
/// A SwiftUI `App` struct means declarative UI. Otherwise any existing
/// entry point (`AppDelegate`, `SceneDelegate`, `main.swift`) keeps the
/// legacy lifecycle, even when individual views import SwiftUI. Only a
/// project with no entry point at all falls back to the SwiftUI imports.
pub fn detect_ui(platform: Platform, root: &Path) -> AppleUi {
    if find_swiftui_app(platform, root).is_some() {
        return AppleUi::DeclarativeUi;
    }
    let has_entry_point = find_app_delegate(platform, root).is_some()
        || LEGACY_ENTRY_POINTS
            .iter()
            .any(|name| find_in(platform, root, name).is_some());
    if has_entry_point {
        return AppleUi::LegacyLifecycle;
    }
    let imports_swiftui = probe::find_file_where(root, "*.swift", probe::DEFAULT_SEARCH_DEPTH, |p| {
        file_contains(p, "import SwiftUI")
    });
    if imports_swiftui.is_some() {
        AppleUi::DeclarativeUi
    } else {
        AppleUi::LegacyLifecycle
    }
}

/// `AppDelegate.swift`, then `AppDelegate.m`
pub fn find_app_delegate(platform: Platform, root: &Path) -> Option<(PathBuf, AppleLanguage)> {
    find_in(platform, root, "AppDelegate.swift")
        .map(|p| (p, AppleLanguage::Swift))
        .or_else(|| find_in(platform, root, "AppDelegate.m").map(|p| (p, AppleLanguage::ObjectiveC)))
}

/// Directory a new delegate is written to
///
/// First existing of `<platform>/<Project>`, `<Project>`, `<platform>`,
/// then the root.
pub fn app_delegate_dir(platform: Platform, root: &Path) -> PathBuf {
    let sub = platform.preferred_dir().unwrap_or("ios");
    let mut candidates = Vec::with_capacity(4);
    if let Some(name) = project_name(platform, root) {
        candidates.push(root.join(sub).join(&name));
        candidates.push(root.join(&name));
    }
    candidates.push(root.join(sub));

    candidates
        .into_iter()
        .find(|p| p.is_dir())
        .unwrap_or_else(|| root.to_path_buf())
}

/// Add `import FirebaseCore` unless a Firebase import is already there
pub fn add_swift_import(content: &str) -> Option<String> {
    if SWIFT_FIREBASE_IMPORT.is_match(content) {
        return Some(content.to_string());
    }
    let import = "import FirebaseCore";
    patch::insert_after_anchor(content, &SWIFT_FRAMEWORK_IMPORT, &[import])
        .or_else(|| patch::insert_after_last(content, &SWIFT_ANY_IMPORT, &[import]))
        .or_else(|| Some(patch::prepend(content, "import FirebaseCore\n")))
}

pub fn add_swift_configure(content: &str, platform: Platform) -> Option<String> {
    let anchor: &Regex = match platform {
        Platform::MacOS => &SWIFT_APPKIT_DID_FINISH,
        _ => &SWIFT_DID_FINISH_LAUNCHING,
    };
    patch::insert_block_start(content, anchor, &[SWIFT_INIT_MARKER])
}

pub fn add_objc_import(content: &str) -> Option<String> {
    let import = "@import FirebaseCore;";
    patch::insert_after_anchor(content, &OBJC_APP_DELEGATE_HEADER, &[import])
        .or_else(|| patch::insert_after_last(content, &OBJC_ANY_IMPORT, &[import]))
        .or_else(|| Some(patch::prepend(content, "@import FirebaseCore;\n")))
}

pub fn add_objc_configure(content: &str, platform: Platform) -> Option<String> {
    let anchor: &Regex = match platform {
        Platform::MacOS => &OBJC_APPKIT_DID_FINISH,
        _ => &OBJC_DID_FINISH_LAUNCHING,
    };
    patch::insert_block_start(content, anchor, &["[FIRApp configure];"])
}

/// Add the delegate adaptor property to the SwiftUI `App` struct
pub fn add_delegate_adaptor(content: &str, platform: Platform) -> Option<String> {
    let line = templates::delegate_adaptor_line(platform);
    patch::insert_block_start(content, &SWIFTUI_APP_STRUCT, &[&line, ""])
}

/// Whether any Info.plist turns off the Firebase app delegate proxy
pub fn app_delegate_proxy_disabled(platform: Platform, root: &Path) -> bool {
    let mut candidates = vec!["ios/Runner/Info.plist", "Info.plist", "Runner/Info.plist"];
    if platform == Platform::MacOS {
        candidates.push("macos/Runner/Info.plist");
    }
    candidates.iter().any(|rel| {
        fs::read_to_string(root.join(rel))
            .map(|c| PROXY_DISABLED.is_match(&c))
            .unwrap_or(false)
    })
}

/// Push notification delegate methods, inserted before the class's closing brace
pub fn add_swift_push_methods(content: &str) -> Option<String> {
    if !content.contains("class AppDelegate") {
        return None;
    }
    let close = content.rfind('}')?;
    Some(format!(
        "{}{}{}",
        &content[..close],
        templates::SWIFT_PUSH_METHODS,
        &content[close..]
    ))
}

/// Push notification delegate methods, inserted before the final `@end`
pub fn add_objc_push_methods(content: &str) -> Option<String> {
    let end = content.rfind("@end")?;
    Some(format!(
        "{}{}{}",
        &content[..end],
        templates::OBJC_PUSH_METHODS,
        &content[end..]
    ))
}

pub fn add_swift_messaging_import(content: &str) -> Option<String> {
    let import = "import FirebaseMessaging";
    patch::insert_after_anchor(content, &SWIFT_FIREBASE_IMPORT, &[import])
        .or_else(|| patch::insert_after_last(content, &SWIFT_ANY_IMPORT, &[import]))
        .or_else(|| Some(patch::prepend(content, "import FirebaseMessaging\n")))
}

pub fn add_objc_messaging_import(content: &str) -> Option<String> {
    let import = "@import FirebaseMessaging;";
    patch::insert_after_anchor(content, &OBJC_FIREBASE_CORE_IMPORT, &[import])
        .or_else(|| patch::insert_after_last(content, &OBJC_ANY_IMPORT, &[import]))
        .or_else(|| Some(patch::prepend(content, "@import FirebaseMessaging;\n")))
}

/// Swift type name derived from the project name
fn app_type_name(platform: Platform, root: &Path) -> String {
    let name: String = project_name(platform, root)
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        "MyApp".to_string()
    } else {
        name
    }
}

fn write_new(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn add_dependency(platform: Platform, root: &Path, report: &mut InjectionReport) {
    match dependency_manager(platform, root) {
        DependencyManager::CocoaPods(podfile) => {
            report.patch(
                root,
                &podfile,
                PatchKind::Dependency,
                POD_MARKERS,
                add_pods,
                || "add `pod 'FirebaseCore'` inside your app target".to_string(),
            );
        }
        DependencyManager::SwiftPackage(package) => {
            let applied = report.patch(
                root,
                &package,
                PatchKind::Dependency,
                &["firebase-ios-sdk"],
                add_swift_package,
                || {
                    format!(
                        "add `.package(url: \"{FIREBASE_IOS_SDK_URL}\", from: \"{FIREBASE_IOS_SDK_VERSION}\")` to the package dependencies"
                    )
                },
            );
            if applied.is_some_and(|o| o.is_applied()) {
                report.instruct(
                    "Add `.product(name: \"FirebaseCore\", package: \"firebase-ios-sdk\")` to your target dependencies, then run `swift package resolve`",
                );
            }
        }
        DependencyManager::Xcode => {
            report.instruct(format!(
                "Add the Firebase SDK in Xcode: File > Add Package Dependencies..., enter {FIREBASE_IOS_SDK_URL}, select version {FIREBASE_IOS_SDK_VERSION} or later and add FirebaseCore to your app target"
            ));
        }
        DependencyManager::Unmanaged => {
            report.instruct(format!(
                "No dependency manager detected. Create a Podfile (`pod init`) and run nativefire again, or add {FIREBASE_IOS_SDK_URL} with Swift Package Manager"
            ));
        }
    }
}

/// Write a delegate from a template; returns its path and language
fn create_app_delegate(
    platform: Platform,
    root: &Path,
    ui: AppleUi,
    report: &mut InjectionReport,
) -> Option<(PathBuf, AppleLanguage)> {
    let dir = app_delegate_dir(platform, root);
    let language = detect_language(platform, root);
    debug!(
        "Creating {:?} app delegate ({:?}) in {:?}",
        language, ui, dir
    );

    let created = match language {
        AppleLanguage::Swift => {
            let path = dir.join("AppDelegate.swift");
            let template = match ui {
                AppleUi::LegacyLifecycle => templates::swift_app_delegate(platform),
                AppleUi::DeclarativeUi => templates::swiftui_app_delegate(platform),
            };
            write_new(&path, template).map(|_| vec![path])
        }
        AppleLanguage::ObjectiveC => {
            let (header, implementation) = templates::objc_app_delegate(platform);
            let header_path = dir.join("AppDelegate.h");
            let implementation_path = dir.join("AppDelegate.m");
            let header_result = if header_path.exists() {
                Ok(Vec::new())
            } else {
                write_new(&header_path, header).map(|_| vec![header_path])
            };
            header_result.and_then(|mut paths| {
                write_new(&implementation_path, implementation)?;
                paths.push(implementation_path);
                Ok(paths)
            })
        }
    };

    match created {
        Ok(paths) => {
            let entry = paths.last().cloned();
            for path in paths {
                report.add_created(path);
            }
            entry.map(|p| (p, language))
        }
        Err(e) => {
            report.warn(format!(
                "Failed to create AppDelegate in {}: {}. Please manually add Firebase initialization code",
                probe::display_relative(root, &dir),
                e
            ));
            None
        }
    }
}

/// Wire the delegate into the SwiftUI `App`, creating the `App` when needed
fn wire_declarative_ui(
    platform: Platform,
    root: &Path,
    delegate: &Path,
    created_delegate: bool,
    report: &mut InjectionReport,
) {
    let attribute = templates::delegate_adaptor_attribute(platform);

    if let Some(app) = find_swiftui_app(platform, root) {
        report.patch(
            root,
            &app,
            PatchKind::Wiring,
            &[ADAPTOR_MARKER],
            |c| add_delegate_adaptor(c, platform),
            || format!("add `{}` to your App struct", templates::delegate_adaptor_line(platform)),
        );
        return;
    }

    if !created_delegate {
        report.instruct(format!(
            "Add `{attribute}(AppDelegate.self) var delegate` to your SwiftUI App struct"
        ));
        return;
    }

    let dir = delegate.parent().unwrap_or(root);
    let name = app_type_name(platform, root);
    let app_path = dir.join(format!("{name}App.swift"));
    if app_path.exists() {
        return;
    }
    match write_new(&app_path, &templates::swiftui_app(platform, &name)) {
        Ok(()) => report.add_created(app_path),
        Err(e) => {
            report.warn(format!(
                "Created AppDelegate but failed to write {}: {}",
                probe::display_relative(root, &app_path),
                e
            ));
            report.instruct(format!(
                "Add `{attribute}(AppDelegate.self) var delegate` to your SwiftUI App struct"
            ));
            return;
        }
    }

    let content_view = dir.join("ContentView.swift");
    if !content_view.exists() {
        match write_new(&content_view, templates::CONTENT_VIEW) {
            Ok(()) => report.add_created(content_view),
            Err(e) => debug!("Skipping ContentView.swift: {}", e),
        }
    }
}

fn add_initialization(
    platform: Platform,
    root: &Path,
    delegate: &Path,
    language: AppleLanguage,
    report: &mut InjectionReport,
) {
    match language {
        AppleLanguage::Swift => {
            if !file_contains(delegate, SWIFT_INIT_MARKER) {
                report.patch(
                    root,
                    delegate,
                    PatchKind::Import,
                    &["import FirebaseCore"],
                    add_swift_import,
                    || "add `import FirebaseCore`".to_string(),
                );
            }
            report.patch(
                root,
                delegate,
                PatchKind::Initialization,
                &[SWIFT_INIT_MARKER],
                |c| add_swift_configure(c, platform),
                || match platform {
                    Platform::MacOS => {
                        "call `FirebaseApp.configure()` at the start of applicationDidFinishLaunching".to_string()
                    }
                    _ => "call `FirebaseApp.configure()` at the start of application(_:didFinishLaunchingWithOptions:)"
                        .to_string(),
                },
            );
        }
        AppleLanguage::ObjectiveC => {
            if !file_contains(delegate, OBJC_INIT_MARKER) {
                report.patch(
                    root,
                    delegate,
                    PatchKind::Import,
                    OBJC_IMPORT_MARKERS,
                    add_objc_import,
                    || "add `@import FirebaseCore;`".to_string(),
                );
            }
            report.patch(
                root,
                delegate,
                PatchKind::Initialization,
                &[OBJC_INIT_MARKER],
                |c| add_objc_configure(c, platform),
                || "call `[FIRApp configure];` at the start of didFinishLaunchingWithOptions".to_string(),
            );
        }
    }
}

fn add_push_wiring(
    root: &Path,
    delegate: &Path,
    language: AppleLanguage,
    report: &mut InjectionReport,
) {
    if file_contains(delegate, PUSH_MARKER) {
        debug!("Push notification delegate methods already present");
        return;
    }

    let (import_markers, add_import, add_methods): (
        &[&str],
        fn(&str) -> Option<String>,
        fn(&str) -> Option<String>,
    ) = match language {
        AppleLanguage::Swift => (
            &["import FirebaseMessaging"],
            add_swift_messaging_import,
            add_swift_push_methods,
        ),
        AppleLanguage::ObjectiveC => (
            &["@import FirebaseMessaging;", "<FirebaseMessaging/FirebaseMessaging.h>"],
            add_objc_messaging_import,
            add_objc_push_methods,
        ),
    };

    report.patch(
        root,
        delegate,
        PatchKind::Import,
        import_markers,
        add_import,
        || "import FirebaseMessaging".to_string(),
    );
    report.patch(
        root,
        delegate,
        PatchKind::Wiring,
        &[PUSH_MARKER],
        add_methods,
        || "implement didRegisterForRemoteNotificationsWithDeviceToken and pass the token to Messaging".to_string(),
    );
    report.instruct("Add the FirebaseMessaging dependency: FirebaseAppDelegateProxyEnabled is disabled");
}

pub(super) fn inject(platform: Platform, root: &Path, report: &mut InjectionReport) {
    add_dependency(platform, root, report);

    let ui = detect_ui(platform, root);
    let (delegate, language, created) = match find_app_delegate(platform, root) {
        Some((path, language)) => (path, language, false),
        None => match create_app_delegate(platform, root, ui, report) {
            Some((path, language)) => (path, language, true),
            None => return,
        },
    };

    add_initialization(platform, root, &delegate, language, report);

    let owns_main = MAIN_ATTRIBUTES.iter().any(|attr| file_contains(&delegate, attr));
    if language == AppleLanguage::Swift && ui == AppleUi::DeclarativeUi && !owns_main {
        wire_declarative_ui(platform, root, &delegate, created, report);
    }

    if app_delegate_proxy_disabled(platform, root) {
        if platform == Platform::IOS {
            add_push_wiring(root, &delegate, language, report);
        } else {
            report.instruct(
                "FirebaseAppDelegateProxyEnabled is disabled: forward the APNs token to Messaging in your app delegate",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::PatchOutcome;
    use tempfile::TempDir;

    const FLUTTER_APP_DELEGATE: &str = "import Flutter\nimport UIKit\n\n@main\n@objc class AppDelegate: FlutterAppDelegate {\n  override func application(\n    _ application: UIApplication,\n    didFinishLaunchingWithOptions launchOptions: [UIApplication.LaunchOptionsKey: Any]?\n  ) -> Bool {\n    GeneratedPluginRegistrant.register(with: self)\n    return super.application(application, didFinishLaunchingWithOptions: launchOptions)\n  }\n}\n";

    const OBJC_APP_DELEGATE: &str = "#import \"AppDelegate.h\"\n#import \"GeneratedPluginRegistrant.h\"\n\n@implementation AppDelegate\n\n- (BOOL)application:(UIApplication *)application\n    didFinishLaunchingWithOptions:(NSDictionary *)launchOptions {\n  [GeneratedPluginRegistrant registerWithRegistry:self];\n  return [super application:application didFinishLaunchingWithOptions:launchOptions];\n}\n\n@end\n";

    const SWIFTUI_APP: &str = "import SwiftUI\n\n@main\nstruct DemoApp: App {\n    var body: some Scene {\n        WindowGroup {\n            ContentView()\n        }\n    }\n}\n";

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn snapshot(root: &Path) -> Vec<(PathBuf, String)> {
        let mut files: Vec<(PathBuf, String)> = walkdir::WalkDir::new(root)
            .into_iter()
            .flatten()
            .filter(|e| e.file_type().is_file())
            .map(|e| (e.path().to_path_buf(), fs::read_to_string(e.path()).unwrap()))
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_add_pods_after_first_target() {
        let podfile = "platform :ios, '13.0'\n\ntarget 'Runner' do\n  use_frameworks!\n\n  target 'RunnerTests' do\n    inherit! :search_paths\n  end\nend\n";
        let updated = add_pods(podfile).unwrap();
        assert!(updated.contains(
            "target 'Runner' do\n  pod 'FirebaseCore'\n  pod 'FirebaseAnalytics'\n  use_frameworks!"
        ));
        assert_eq!(updated.matches("pod 'FirebaseCore'").count(), 1);
    }

    #[test]
    fn test_add_pods_without_target() {
        assert!(add_pods("platform :ios, '13.0'\n").is_none());
    }

    #[test]
    fn test_add_swift_package_multiline() {
        let manifest = "let package = Package(\n    name: \"Demo\",\n    dependencies: [\n        .package(url: \"https://github.com/apple/swift-log\", from: \"1.0.0\"),\n    ],\n)\n";
        let updated = add_swift_package(manifest).unwrap();
        assert!(updated.contains(
            "    dependencies: [\n        .package(url: \"https://github.com/firebase/firebase-ios-sdk\", from: \"10.24.0\"),\n        .package(url: \"https://github.com/apple/swift-log\""
        ));
    }

    #[test]
    fn test_add_swift_package_inline_empty() {
        let manifest = "let package = Package(\n    name: \"Demo\",\n    dependencies: [],\n    targets: []\n)\n";
        let updated = add_swift_package(manifest).unwrap();
        assert!(updated.contains(
            "    dependencies: [\n        .package(url: \"https://github.com/firebase/firebase-ios-sdk\", from: \"10.24.0\"),\n    ],\n    targets: []"
        ));
    }

    #[test]
    fn test_swift_import_and_configure_flutter_delegate() {
        let with_import = add_swift_import(FLUTTER_APP_DELEGATE).unwrap();
        assert!(with_import.starts_with("import Flutter\nimport FirebaseCore\nimport UIKit\n"));

        let updated = add_swift_configure(&with_import, Platform::IOS).unwrap();
        assert!(updated.contains(
            ") -> Bool {\n    FirebaseApp.configure()\n    GeneratedPluginRegistrant.register(with: self)"
        ));
    }

    #[test]
    fn test_swift_umbrella_import_counts_as_present() {
        let content = "import UIKit\nimport Firebase\n\nclass AppDelegate {}\n";
        assert_eq!(add_swift_import(content).unwrap(), content);

        let messaging_only = "import UIKit\nimport FirebaseMessaging\n";
        assert!(add_swift_import(messaging_only)
            .unwrap()
            .contains("import UIKit\nimport FirebaseCore\n"));
    }

    #[test]
    fn test_objc_import_and_configure() {
        let with_import = add_objc_import(OBJC_APP_DELEGATE).unwrap();
        assert!(with_import.starts_with("#import \"AppDelegate.h\"\n@import FirebaseCore;\n#import \"GeneratedPluginRegistrant.h\""));

        let updated = add_objc_configure(&with_import, Platform::IOS).unwrap();
        assert!(updated.contains(
            "didFinishLaunchingWithOptions:(NSDictionary *)launchOptions {\n  [FIRApp configure];\n  [GeneratedPluginRegistrant"
        ));
    }

    #[test]
    fn test_macos_configure_uses_appkit_anchor() {
        let content = "import Cocoa\n\n@main\nclass AppDelegate: NSObject, NSApplicationDelegate {\n    func applicationDidFinishLaunching(_ aNotification: Notification) {\n    }\n}\n";
        let updated = add_swift_configure(content, Platform::MacOS).unwrap();
        assert!(updated.contains(
            "func applicationDidFinishLaunching(_ aNotification: Notification) {\n        FirebaseApp.configure()\n    }"
        ));
        assert!(add_swift_configure(content, Platform::IOS).is_none());
    }

    #[test]
    fn test_add_delegate_adaptor_brace_on_next_line() {
        let content = "import SwiftUI\n\n@main\nstruct DemoApp: App\n{\n    var body: some Scene {\n        WindowGroup { ContentView() }\n    }\n}\n";
        let updated = add_delegate_adaptor(content, Platform::IOS).unwrap();
        assert!(updated.contains(
            "struct DemoApp: App\n{\n    @UIApplicationDelegateAdaptor(AppDelegate.self) var delegate\n\n    var body"
        ));
    }

    #[test]
    fn test_detect_language() {
        let temp = TempDir::new().unwrap();
        assert_eq!(detect_language(Platform::IOS, temp.path()), AppleLanguage::Swift);

        write(temp.path(), "Demo/main.m", "int main() {}\n");
        assert_eq!(detect_language(Platform::IOS, temp.path()), AppleLanguage::ObjectiveC);

        write(temp.path(), "Demo/View.swift", "import UIKit\n");
        assert_eq!(detect_language(Platform::IOS, temp.path()), AppleLanguage::Swift);
    }

    #[test]
    fn test_app_delegate_dir_candidates() {
        let temp = TempDir::new().unwrap();
        assert_eq!(app_delegate_dir(Platform::IOS, temp.path()), temp.path().to_path_buf());

        fs::create_dir_all(temp.path().join("ios")).unwrap();
        assert_eq!(app_delegate_dir(Platform::IOS, temp.path()), temp.path().join("ios"));

        write(temp.path(), "Demo.xcodeproj/project.pbxproj", "");
        fs::create_dir_all(temp.path().join("Demo")).unwrap();
        assert_eq!(app_delegate_dir(Platform::IOS, temp.path()), temp.path().join("Demo"));
    }

    #[test]
    fn test_inject_existing_flutter_delegate_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let podfile = write(
            temp.path(),
            "ios/Podfile",
            "platform :ios, '13.0'\n\ntarget 'Runner' do\n  use_frameworks!\nend\n",
        );
        let delegate = write(temp.path(), "ios/Runner/AppDelegate.swift", FLUTTER_APP_DELEGATE);

        let mut first = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut first);
        assert_eq!(first.applied().count(), 3, "{:?}", first.records);
        assert!(first.created.is_empty());
        assert!(file_contains(&podfile, "pod 'FirebaseCore'"));
        assert_eq!(
            fs::read_to_string(&delegate).unwrap().matches(SWIFT_INIT_MARKER).count(),
            1
        );

        let before = snapshot(temp.path());
        let mut second = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut second);
        assert_eq!(snapshot(temp.path()), before);
        assert_eq!(second.applied().count(), 0);
    }

    #[test]
    fn test_inject_podfile_without_target_is_anchor_miss() {
        let temp = TempDir::new().unwrap();
        let podfile = write(temp.path(), "Podfile", "platform :ios, '13.0'\n");
        write(temp.path(), "Demo/AppDelegate.swift", FLUTTER_APP_DELEGATE);

        let mut report = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut report);

        assert_eq!(fs::read_to_string(&podfile).unwrap(), "platform :ios, '13.0'\n");
        let miss = report.anchor_misses().next().unwrap();
        assert!(miss.path.ends_with("Podfile"));
        assert!(report
            .records
            .iter()
            .any(|r| r.kind == PatchKind::Initialization && r.outcome == PatchOutcome::Applied));
    }

    #[test]
    fn test_inject_creates_swift_delegate_when_missing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Demo.xcodeproj/project.pbxproj", "");
        fs::create_dir_all(temp.path().join("Demo")).unwrap();

        let mut first = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut first);

        let delegate = temp.path().join("Demo/AppDelegate.swift");
        assert_eq!(first.created, vec![delegate.clone()]);
        assert!(file_contains(&delegate, "@main"));
        assert!(first.instructions.iter().any(|i| i.contains("firebase-ios-sdk")));

        let before = snapshot(temp.path());
        let mut second = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut second);
        assert!(second.created.is_empty());
        assert_eq!(snapshot(temp.path()), before);
    }

    #[test]
    fn test_inject_creates_objc_delegate() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Demo.xcodeproj/project.pbxproj", "");
        write(temp.path(), "Demo/main.m", "int main(int argc, char * argv[]) { return 0; }\n");

        let mut report = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut report);

        assert!(temp.path().join("Demo/AppDelegate.h").is_file());
        let implementation = temp.path().join("Demo/AppDelegate.m");
        assert!(file_contains(&implementation, "[FIRApp configure];"));
        assert_eq!(report.created.len(), 2);
    }

    #[test]
    fn test_inject_swiftui_wires_existing_app_struct() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Demo.xcodeproj/project.pbxproj", "");
        let app = write(temp.path(), "Demo/DemoApp.swift", SWIFTUI_APP);

        let mut first = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut first);

        let delegate = temp.path().join("Demo/AppDelegate.swift");
        assert!(file_contains(&delegate, "class AppDelegate: NSObject, UIApplicationDelegate"));
        assert!(!file_contains(&delegate, "@main"));
        let app_source = fs::read_to_string(&app).unwrap();
        assert!(app_source.contains(
            "struct DemoApp: App {\n    @UIApplicationDelegateAdaptor(AppDelegate.self) var delegate\n\n    var body"
        ));

        let before = snapshot(temp.path());
        let mut second = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut second);
        assert_eq!(snapshot(temp.path()), before);
    }

    #[test]
    fn test_inject_swiftui_creates_app_file() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Demo.xcodeproj/project.pbxproj", "");
        write(
            temp.path(),
            "Demo/Views.swift",
            "import SwiftUI\n\nstruct Badge: View {\n    var body: some View { Text(\"x\") }\n}\n",
        );

        let mut report = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut report);

        let app = temp.path().join("Demo/DemoApp.swift");
        assert!(file_contains(&app, "@UIApplicationDelegateAdaptor(AppDelegate.self) var delegate"));
        assert!(temp.path().join("Demo/ContentView.swift").is_file());
        assert_eq!(report.created.len(), 3);
    }

    #[test]
    fn test_detect_ui_ignores_swiftui_views_in_uikit_project() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "Demo.xcodeproj/project.pbxproj", "");
        write(
            temp.path(),
            "Demo/AppDelegate.swift",
            "import UIKit\n\nclass AppDelegate: UIResponder, UIApplicationDelegate {\n    func application(_ application: UIApplication, didFinishLaunchingWithOptions launchOptions: [UIApplication.LaunchOptionsKey: Any]?) -> Bool {\n        return true\n    }\n}\n",
        );
        write(
            temp.path(),
            "Demo/main.swift",
            "import UIKit\n\nUIApplicationMain(CommandLine.argc, CommandLine.unsafeArgv, nil, NSStringFromClass(AppDelegate.self))\n",
        );
        write(
            temp.path(),
            "Demo/PreviewView.swift",
            "import SwiftUI\n\nstruct PreviewView: View {\n    var body: some View { Text(\"preview\") }\n}\n",
        );

        assert_eq!(detect_ui(Platform::IOS, temp.path()), AppleUi::LegacyLifecycle);

        let mut report = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut report);

        assert!(!temp.path().join("Demo/DemoApp.swift").exists());
        assert!(!temp.path().join("Demo/ContentView.swift").exists());
        assert!(report.created.is_empty());
        assert!(file_contains(
            &temp.path().join("Demo/AppDelegate.swift"),
            "FirebaseApp.configure()"
        ));
    }

    #[test]
    fn test_detect_ui_swiftui_without_entry_point() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "Demo/Views.swift",
            "import SwiftUI\n\nstruct Badge: View {\n    var body: some View { Text(\"x\") }\n}\n",
        );
        assert_eq!(detect_ui(Platform::IOS, temp.path()), AppleUi::DeclarativeUi);

        write(temp.path(), "Demo/SceneDelegate.swift", "import UIKit\n");
        assert_eq!(detect_ui(Platform::IOS, temp.path()), AppleUi::LegacyLifecycle);
    }

    #[test]
    fn test_inject_push_wiring_when_proxy_disabled() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "ios/Runner/Info.plist",
            "<dict>\n\t<key>FirebaseAppDelegateProxyEnabled</key>\n\t<false/>\n</dict>\n",
        );
        let delegate = write(temp.path(), "ios/Runner/AppDelegate.swift", FLUTTER_APP_DELEGATE);

        let mut first = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut first);

        let source = fs::read_to_string(&delegate).unwrap();
        assert_eq!(source.matches(PUSH_MARKER).count(), 1);
        assert!(source.contains("import FirebaseCore\nimport FirebaseMessaging\n"));
        assert!(source.trim_end().ends_with('}'));

        let before = snapshot(temp.path());
        let mut second = InjectionReport::new();
        inject(Platform::IOS, temp.path(), &mut second);
        assert_eq!(snapshot(temp.path()), before);
    }

    #[test]
    fn test_macos_prefers_macos_folder() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "ios/Runner/AppDelegate.swift", FLUTTER_APP_DELEGATE);
        let mac = write(
            temp.path(),
            "macos/Runner/AppDelegate.swift",
            "import Cocoa\nimport FlutterMacOS\n\n@main\nclass AppDelegate: FlutterAppDelegate {\n  override func applicationShouldTerminateAfterLastWindowClosed(_ sender: NSApplication) -> Bool {\n    return true\n  }\n}\n",
        );

        assert_eq!(
            find_app_delegate(Platform::MacOS, temp.path()).map(|(p, _)| p),
            Some(mac.clone())
        );

        let mut report = InjectionReport::new();
        inject(Platform::MacOS, temp.path(), &mut report);
        assert!(file_contains(&mac, "import FirebaseCore"));
        assert!(report
            .anchor_misses()
            .any(|r| r.kind == PatchKind::Initialization && r.path == mac));
        assert!(!file_contains(
            &temp.path().join("ios/Runner/AppDelegate.swift"),
            "FirebaseCore"
        ));
    }
}
