//! Integration tests for full configuration runs against an in-memory registry

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use nativefire_app::{choose_platform, configure, ConfigureRequest, SyncOutcome};
use nativefire_core::{classify, AppIdSource, IdentifierSource, PatchKind, Platform};
use nativefire_firebase::test_utils::{test_app, FakeRegistry};

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

/// Snapshot of every file under `root`, sorted by path
fn snapshot(root: &Path) -> Vec<(PathBuf, String)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let content = fs::read_to_string(entry.path()).unwrap_or_default();
            (entry.into_path(), content)
        })
        .collect()
}

/// Flutter-style iOS host: `ios/Runner.xcodeproj`, `ios/Runner/AppDelegate.swift`
fn create_ios_project(root: &Path) {
    write(
        root,
        "ios/Runner.xcodeproj/project.pbxproj",
        "\t\t\t\tPRODUCT_BUNDLE_IDENTIFIER = com.example.shop.RunnerTests;\n\t\t\t\tPRODUCT_BUNDLE_IDENTIFIER = com.example.shop;\n",
    );
    write(
        root,
        "ios/Runner/AppDelegate.swift",
        r#"import Flutter
import UIKit

@main
@objc class AppDelegate: FlutterAppDelegate {
  override func application(
    _ application: UIApplication,
    didFinishLaunchingWithOptions launchOptions: [UIApplication.LaunchOptionsKey: Any]?
  ) -> Bool {
    GeneratedPluginRegistrant.register(with: self)
    return super.application(application, didFinishLaunchingWithOptions: launchOptions)
  }
}
"#,
    );
    write(
        root,
        "ios/Podfile",
        "platform :ios, '13.0'\n\ntarget 'Runner' do\n  use_frameworks!\nend\n",
    );
}

fn create_android_project(root: &Path) {
    write(
        root,
        "app/build.gradle.kts",
        r#"plugins {
    id("com.android.application")
}

android {
    namespace = "com.example.shop"
    defaultConfig {
        applicationId = "com.example.shop"
    }
}
"#,
    );
    write(
        root,
        "app/src/main/java/com/example/shop/MainActivity.kt",
        r#"package com.example.shop

import android.os.Bundle
import androidx.appcompat.app.AppCompatActivity

class MainActivity : AppCompatActivity() {
    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
    }
}
"#,
    );
}

fn request(root: &Path, platform: Platform) -> ConfigureRequest {
    let mut request = ConfigureRequest::new("shop-prod", platform, root);
    request.sync = false;
    request
}

#[tokio::test]
async fn test_ios_project_end_to_end() {
    let temp = TempDir::new().unwrap();
    create_ios_project(temp.path());

    assert_eq!(classify(temp.path()), Some(Platform::IOS));
    let platform = choose_platform(None, true, temp.path()).unwrap();

    let registry = FakeRegistry::new()
        .with_apps(vec![])
        .creating("1:42:ios:shop")
        .with_config_contents("<plist><dict><key>BUNDLE_ID</key><string>com.example.shop</string></dict></plist>");

    let summary = configure(&registry, &request(temp.path(), platform), |_| {})
        .await
        .unwrap();

    assert_eq!(summary.identifier, "com.example.shop");
    assert!(matches!(summary.identifier_source, IdentifierSource::Parsed(_)));
    assert_eq!(summary.app_id_source, AppIdSource::Created);

    let creates = registry.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].identifier, "com.example.shop");

    let installed = temp.path().join("ios/Runner/GoogleService-Info.plist");
    assert_eq!(summary.installed_config, installed);
    assert!(fs::read_to_string(&installed).unwrap().contains("com.example.shop"));

    let delegate = fs::read_to_string(temp.path().join("ios/Runner/AppDelegate.swift")).unwrap();
    assert!(delegate.contains("import FirebaseCore"));
    assert_eq!(delegate.matches("FirebaseApp.configure()").count(), 1);

    let podfile = fs::read_to_string(temp.path().join("ios/Podfile")).unwrap();
    assert!(podfile.contains("pod 'FirebaseCore'"));
    assert_eq!(summary.sync, SyncOutcome::Disabled);
}

#[tokio::test]
async fn test_rerun_leaves_tree_unchanged() {
    let temp = TempDir::new().unwrap();
    create_ios_project(temp.path());
    let registry = FakeRegistry::new().with_apps(vec![test_app("1:42:ios:shop", "IOS", "com.example.shop")]);

    configure(&registry, &request(temp.path(), Platform::IOS), |_| {})
        .await
        .unwrap();
    let before = snapshot(temp.path());

    let second = configure(&registry, &request(temp.path(), Platform::IOS), |_| {})
        .await
        .unwrap();

    assert_eq!(snapshot(temp.path()), before);
    assert_eq!(second.injection.applied().count(), 0);
    assert_eq!(second.app_id_source, AppIdSource::Existing);
    assert!(registry.creates().is_empty());
}

#[tokio::test]
async fn test_duplicate_creation_recovers_existing_app() {
    let temp = TempDir::new().unwrap();
    create_android_project(temp.path());

    let registry = FakeRegistry::new()
        .then_list(vec![])
        .then_list(vec![test_app("1:42:android:raced", "ANDROID", "com.example.shop")])
        .failing_create("Error: App with package name already exists");

    let summary = configure(&registry, &request(temp.path(), Platform::Android), |_| {})
        .await
        .unwrap();

    assert_eq!(summary.app_id, "1:42:android:raced");
    assert_eq!(summary.app_id_source, AppIdSource::Existing);
    assert_eq!(registry.list_calls(), 2);
    assert!(temp.path().join("app/google-services.json").exists());

    let gradle = fs::read_to_string(temp.path().join("app/build.gradle.kts")).unwrap();
    assert!(gradle.contains("com.google.gms.google-services"));
}

#[tokio::test]
async fn test_duplicate_without_match_reports_guidance() {
    let temp = TempDir::new().unwrap();
    create_android_project(temp.path());

    let registry = FakeRegistry::new()
        .with_apps(vec![])
        .failing_create("Error: App already exists");

    let err = configure(&registry, &request(temp.path(), Platform::Android), |_| {})
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    let hint = err.remediation().unwrap();
    assert!(hint.contains("com.example.shop"));
    assert!(hint.contains("--app-id"));
    assert!(!temp.path().join("app/google-services.json").exists());
}

#[tokio::test]
async fn test_desktop_project_gets_json_config() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "linux/CMakeLists.txt",
        "cmake_minimum_required(VERSION 3.10)\nproject(shop)\nadd_executable(shop main.cc)\n",
    );

    let platform = choose_platform(None, true, temp.path()).unwrap();
    assert_eq!(platform, Platform::Linux);

    let registry = FakeRegistry::new().with_apps(vec![]).creating("1:42:web:shop");
    let summary = configure(&registry, &request(temp.path(), platform), |_| {})
        .await
        .unwrap();

    // no identifier in desktop project files
    assert_eq!(summary.identifier_source, IdentifierSource::Generated);
    assert_eq!(summary.identifier, "com.shop.prod");
    assert_eq!(
        summary.installed_config,
        temp.path().join("linux/google-services.json")
    );
}

#[tokio::test]
async fn test_single_module_android_project() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "build.gradle",
        "plugins {\n    id 'com.android.application'\n}\n\nandroid {\n    namespace 'com.example.shop'\n    defaultConfig {\n        applicationId 'com.example.shop'\n    }\n}\n",
    );
    write(
        temp.path(),
        "src/main/java/com/example/shop/MainActivity.kt",
        "package com.example.shop\n\nimport android.os.Bundle\nimport androidx.appcompat.app.AppCompatActivity\n\nclass MainActivity : AppCompatActivity() {\n    override fun onCreate(savedInstanceState: Bundle?) {\n        super.onCreate(savedInstanceState)\n    }\n}\n",
    );

    let registry = FakeRegistry::new().with_apps(vec![test_app(
        "1:42:android:shop",
        "ANDROID",
        "com.example.shop",
    )]);
    let summary = configure(&registry, &request(temp.path(), Platform::Android), |_| {})
        .await
        .unwrap();

    assert_eq!(summary.identifier, "com.example.shop");
    assert_eq!(
        summary.installed_config,
        temp.path().join("google-services.json")
    );
    assert!(!temp.path().join("app").exists());

    let gradle = fs::read_to_string(temp.path().join("build.gradle")).unwrap();
    assert!(gradle.contains("com.google.gms.google-services"));
    assert!(!gradle.contains("apply false"));

    let activity = fs::read_to_string(
        temp.path().join("src/main/java/com/example/shop/MainActivity.kt"),
    )
    .unwrap();
    assert!(activity.contains("FirebaseApp.initializeApp(this)"));
}

#[tokio::test]
async fn test_buildscript_without_dependencies_is_anchor_miss() {
    let temp = TempDir::new().unwrap();
    create_android_project(temp.path());
    let root_script = "buildscript {\n    ext.kotlin_version = '1.9.0'\n}\n\nsubprojects {\n    dependencies {\n    }\n}\n";
    write(temp.path(), "build.gradle", root_script);

    let registry = FakeRegistry::new().with_apps(vec![test_app(
        "1:42:android:shop",
        "ANDROID",
        "com.example.shop",
    )]);
    let summary = configure(&registry, &request(temp.path(), Platform::Android), |_| {})
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(temp.path().join("build.gradle")).unwrap(),
        root_script
    );

    let misses: Vec<_> = summary.injection.anchor_misses().collect();
    assert_eq!(misses.len(), 1);
    assert_eq!(misses[0].path, temp.path().join("build.gradle"));
    assert_eq!(misses[0].kind, PatchKind::Dependency);

    let app_gradle = fs::read_to_string(temp.path().join("app/build.gradle.kts")).unwrap();
    assert!(app_gradle.contains("com.google.gms.google-services"));
}
