//! Android build script and `MainActivity` patches

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::InjectionReport;
use crate::patch::{self, PatchKind};
use crate::probe;

/// Google Services Gradle plugin version declared in project-level scripts
pub const GOOGLE_SERVICES_VERSION: &str = "4.4.2";

const PLUGIN_ID: &str = "com.google.gms.google-services";
const PLUGIN_MARKER: &str = "google-services";
const INIT_MARKER: &str = "FirebaseApp.initializeApp";
const IMPORT_MARKER: &str = "import com.google.firebase.FirebaseApp";

const APP_SCRIPTS: &[&str] = &[
    "app/build.gradle",
    "app/build.gradle.kts",
    "android/app/build.gradle",
    "android/app/build.gradle.kts",
];

/// Root scripts of single-module projects; only used when they apply the
/// application plugin
const ROOT_APP_SCRIPTS: &[&str] = &["build.gradle", "build.gradle.kts"];

const APPLICATION_PLUGIN: &str = "com.android.application";

const PROJECT_SCRIPTS: &[&str] = &[
    "build.gradle",
    "build.gradle.kts",
    "android/build.gradle",
    "android/build.gradle.kts",
];

static PLUGINS_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*plugins\s*\{").expect("Invalid plugins regex"));

static BUILDSCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*buildscript\s*\{").expect("Invalid buildscript regex"));

static DEPENDENCIES_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdependencies\s*\{").expect("Invalid dependencies regex"));

static APPLY_PLUGIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*apply(?:\s+plugin\s*:|\s*\(\s*plugin\s*=).*$"#)
        .expect("Invalid apply plugin regex")
});

static IMPORT_BUNDLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\s+android\.os\.Bundle\b.*$").expect("Invalid import regex"));

static IMPORT_APPCOMPAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^import\s+androidx\.appcompat\.app\.AppCompatActivity\b.*$")
        .expect("Invalid import regex")
});

static ANY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\s+\S.*$").expect("Invalid import regex"));

static PACKAGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^package\s+\S.*$").expect("Invalid package regex"));

static KOTLIN_ON_CREATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"override\s+fun\s+onCreate\s*\([^)]*\)[^{]*\{").expect("Invalid onCreate regex")
});

static JAVA_ON_CREATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"void\s+onCreate\s*\([^)]*\)[^{;]*\{").expect("Invalid onCreate regex")
});

/// Build script dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradleDsl {
    Groovy,
    Kotlin,
}

impl GradleDsl {
    pub fn of(path: &Path) -> Self {
        if path.extension().is_some_and(|e| e == "kts") {
            GradleDsl::Kotlin
        } else {
            GradleDsl::Groovy
        }
    }

    fn plugin_line(&self) -> String {
        match self {
            GradleDsl::Groovy => format!("id '{PLUGIN_ID}'"),
            GradleDsl::Kotlin => format!("id(\"{PLUGIN_ID}\")"),
        }
    }

    fn apply_statement(&self) -> String {
        match self {
            GradleDsl::Groovy => format!("apply plugin: '{PLUGIN_ID}'"),
            GradleDsl::Kotlin => format!("apply(plugin = \"{PLUGIN_ID}\")"),
        }
    }

    fn classpath_line(&self) -> String {
        match self {
            GradleDsl::Groovy => {
                format!("classpath 'com.google.gms:google-services:{GOOGLE_SERVICES_VERSION}'")
            }
            GradleDsl::Kotlin => {
                format!("classpath(\"com.google.gms:google-services:{GOOGLE_SERVICES_VERSION}\")")
            }
        }
    }

    fn plugin_declaration(&self) -> String {
        match self {
            GradleDsl::Groovy => {
                format!("id '{PLUGIN_ID}' version '{GOOGLE_SERVICES_VERSION}' apply false")
            }
            GradleDsl::Kotlin => {
                format!("id(\"{PLUGIN_ID}\") version \"{GOOGLE_SERVICES_VERSION}\" apply false")
            }
        }
    }
}

/// `MainActivity` source language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityLanguage {
    Java,
    Kotlin,
}

impl ActivityLanguage {
    fn terminator(&self) -> &'static str {
        match self {
            ActivityLanguage::Java => ";",
            ActivityLanguage::Kotlin => "",
        }
    }

    fn on_create(&self) -> &'static Regex {
        match self {
            ActivityLanguage::Java => &JAVA_ON_CREATE,
            ActivityLanguage::Kotlin => &KOTLIN_ON_CREATE,
        }
    }
}

/// App-level build script
///
/// Module scripts come first. A root script counts only when it applies
/// `com.android.application` itself.
pub fn find_app_script(root: &Path) -> Option<PathBuf> {
    if let Some(rel) = probe::first_existing(root, APP_SCRIPTS) {
        return Some(root.join(rel));
    }
    ROOT_APP_SCRIPTS
        .iter()
        .map(|rel| root.join(rel))
        .find(|p| std::fs::read_to_string(p).is_ok_and(|c| applies_application_plugin(&c)))
}

/// A line names the application plugin without `apply false`
fn applies_application_plugin(content: &str) -> bool {
    content
        .lines()
        .any(|l| l.contains(APPLICATION_PLUGIN) && !l.contains("apply false"))
}

/// Project-level build script, which is never the app-level one
pub fn find_project_script(root: &Path, app_script: Option<&Path>) -> Option<PathBuf> {
    PROJECT_SCRIPTS
        .iter()
        .map(|rel| root.join(rel))
        .find(|p| p.is_file() && Some(p.as_path()) != app_script)
}

/// `MainActivity.java`, then `MainActivity.kt`
pub fn find_main_activity(root: &Path) -> Option<(PathBuf, ActivityLanguage)> {
    probe::find_file(root, "MainActivity.java")
        .map(|p| (p, ActivityLanguage::Java))
        .or_else(|| probe::find_file(root, "MainActivity.kt").map(|p| (p, ActivityLanguage::Kotlin)))
}

/// Add the Google Services plugin to an app-level build script
///
/// Inserts into the `plugins` block; without one, adds an `apply`
/// statement after the existing ones or at the top of the file.
pub fn add_app_plugin(content: &str, dsl: GradleDsl) -> Option<String> {
    let line = dsl.plugin_line();
    if let Some(updated) = patch::insert_block_start(content, &PLUGINS_BLOCK, &[&line]) {
        return Some(updated);
    }

    let apply = dsl.apply_statement();
    if let Some(updated) = patch::insert_after_last(content, &APPLY_PLUGIN, &[&apply]) {
        return Some(updated);
    }
    Some(patch::prepend(content, &format!("{apply}\n\n")))
}

/// Declare the plugin in a project-level build script
///
/// `buildscript { dependencies { } }` gets a classpath entry, a `plugins`
/// block gets an `apply false` declaration. Anything else is an anchor miss.
pub fn add_project_plugin(content: &str, dsl: GradleDsl) -> Option<String> {
    if let Some(brace) = buildscript_dependencies_brace(content) {
        return patch::insert_block_start_at(content, brace, &[&dsl.classpath_line()]);
    }
    patch::insert_block_start(content, &PLUGINS_BLOCK, &[&dsl.plugin_declaration()])
}

/// Opening brace of the `dependencies` block nested in `buildscript`
///
/// The search stops at the brace closing `buildscript`, so a later
/// `subprojects { dependencies { } }` is never picked up.
fn buildscript_dependencies_brace(content: &str) -> Option<usize> {
    let block = BUILDSCRIPT_BLOCK.find(content)?;
    let open = block.end() - 1;
    let close = patch::matching_brace(content, open)?;

    let body = &content[open + 1..close];
    let deps = DEPENDENCIES_BLOCK.find(body)?;
    let brace = open + 1 + deps.end() - 1;
    patch::opens_multiline_block(content, brace).then_some(brace)
}

/// Apply the plugin in a root script that is also the app script
///
/// A `buildscript` block additionally gets the classpath entry, since no
/// other script can declare it.
pub fn add_single_module_plugin(content: &str, dsl: GradleDsl) -> Option<String> {
    match buildscript_dependencies_brace(content) {
        Some(brace) => {
            let with_classpath = patch::insert_block_start_at(content, brace, &[&dsl.classpath_line()])?;
            add_app_plugin(&with_classpath, dsl)
        }
        None => add_app_plugin(content, dsl),
    }
}

/// Add the `FirebaseApp` import near a recognizable import
pub fn add_import(content: &str, language: ActivityLanguage) -> Option<String> {
    let import = format!("{IMPORT_MARKER}{}", language.terminator());

    for anchor in [&*IMPORT_BUNDLE, &*IMPORT_APPCOMPAT] {
        if let Some(updated) = patch::insert_after_anchor(content, anchor, &[&import]) {
            return Some(updated);
        }
    }
    if let Some(updated) = patch::insert_after_last(content, &ANY_IMPORT, &[&import]) {
        return Some(updated);
    }
    if let Some(updated) = patch::insert_after_anchor(content, &PACKAGE_LINE, &["", &import]) {
        return Some(updated);
    }
    Some(patch::prepend(content, &format!("{import}\n\n")))
}

/// Insert the initialization call as the first statement of `onCreate`
pub fn add_initialization(content: &str, language: ActivityLanguage) -> Option<String> {
    let call = format!("{INIT_MARKER}(this){}", language.terminator());
    patch::insert_block_start(content, language.on_create(), &[&call])
}

pub(super) fn inject(root: &Path, report: &mut InjectionReport) {
    let app_script = find_app_script(root);

    match &app_script {
        Some(path) => {
            let dsl = GradleDsl::of(path);
            let single_module = path.parent() == Some(root);
            report.patch(
                root,
                path,
                PatchKind::Dependency,
                &[PLUGIN_MARKER],
                |c| {
                    if single_module {
                        add_single_module_plugin(c, dsl)
                    } else {
                        add_app_plugin(c, dsl)
                    }
                },
                || format!("add `{}` to the plugins block", dsl.plugin_line()),
            );
        }
        None => report.warn(
            "App-level build.gradle not found. Add the Google Services plugin to your app module manually",
        ),
    }

    match find_project_script(root, app_script.as_deref()) {
        Some(path) => {
            let dsl = GradleDsl::of(&path);
            report.patch(
                root,
                &path,
                PatchKind::Dependency,
                &[PLUGIN_MARKER],
                |c| add_project_plugin(c, dsl),
                || {
                    format!(
                        "declare `{}` (plugins block) or `{}` (buildscript dependencies)",
                        dsl.plugin_declaration(),
                        dsl.classpath_line()
                    )
                },
            );
        }
        None => debug!("No project-level build script found"),
    }

    let Some((activity, language)) = find_main_activity(root) else {
        report.warn(
            "MainActivity not found. Please manually add Firebase initialization code",
        );
        report.instruct(format!(
            "Call {INIT_MARKER}(this) at the start of your launcher activity's onCreate"
        ));
        return;
    };

    let init_present = std::fs::read_to_string(&activity)
        .map(|c| c.contains(INIT_MARKER))
        .unwrap_or(false);
    if !init_present {
        report.patch(
            root,
            &activity,
            PatchKind::Import,
            &[IMPORT_MARKER],
            |c| add_import(c, language),
            || format!("add `{IMPORT_MARKER}` to the imports"),
        );
    }

    report.patch(
        root,
        &activity,
        PatchKind::Initialization,
        &[INIT_MARKER],
        |c| add_initialization(c, language),
        || {
            format!(
                "override onCreate and call `{INIT_MARKER}(this){}` as its first statement",
                language.terminator()
            )
        },
    );
}
