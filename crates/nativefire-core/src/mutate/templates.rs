//! Entry-point templates for Apple projects
//!
//! Every template already imports FirebaseCore and configures Firebase, so
//! the follow-up initialization patch finds its marker and leaves it alone.

use crate::platform::Platform;

const SWIFT_UIKIT_APP_DELEGATE: &str = r#"import UIKit
import FirebaseCore

@main
class AppDelegate: UIResponder, UIApplicationDelegate {

    var window: UIWindow?

    func application(_ application: UIApplication,
                     didFinishLaunchingWithOptions launchOptions: [UIApplication.LaunchOptionsKey: Any]?) -> Bool {
        FirebaseApp.configure()
        return true
    }

    // MARK: UISceneSession Lifecycle
    @available(iOS 13.0, *)
    func application(_ application: UIApplication,
                     configurationForConnecting connectingSceneSession: UISceneSession,
                     options: UIScene.ConnectionOptions) -> UISceneConfiguration {
        return UISceneConfiguration(name: "Default Configuration", sessionRole: connectingSceneSession.role)
    }

    @available(iOS 13.0, *)
    func application(_ application: UIApplication, didDiscardSceneSessions sceneSessions: Set<UISceneSession>) {
    }
}
"#;

const SWIFT_APPKIT_APP_DELEGATE: &str = r#"import Cocoa
import FirebaseCore

@main
class AppDelegate: NSObject, NSApplicationDelegate {

    func applicationDidFinishLaunching(_ notification: Notification) {
        FirebaseApp.configure()
    }

    func applicationWillTerminate(_ notification: Notification) {
    }

    func applicationSupportsSecureRestorableState(_ app: NSApplication) -> Bool {
        return true
    }
}
"#;

const SWIFTUI_UIKIT_APP_DELEGATE: &str = r#"import UIKit
import FirebaseCore

class AppDelegate: NSObject, UIApplicationDelegate {

    func application(_ application: UIApplication,
                     didFinishLaunchingWithOptions launchOptions: [UIApplication.LaunchOptionsKey: Any]?) -> Bool {
        FirebaseApp.configure()
        return true
    }
}
"#;

const SWIFTUI_APPKIT_APP_DELEGATE: &str = r#"import AppKit
import FirebaseCore

class AppDelegate: NSObject, NSApplicationDelegate {

    func applicationDidFinishLaunching(_ notification: Notification) {
        FirebaseApp.configure()
    }
}
"#;

const OBJC_UIKIT_HEADER: &str = r#"#import <UIKit/UIKit.h>

@interface AppDelegate : UIResponder <UIApplicationDelegate>

@property (strong, nonatomic) UIWindow *window;

@end
"#;

const OBJC_UIKIT_IMPLEMENTATION: &str = r#"#import "AppDelegate.h"
@import FirebaseCore;

@implementation AppDelegate

- (BOOL)application:(UIApplication *)application didFinishLaunchingWithOptions:(NSDictionary *)launchOptions {
    [FIRApp configure];
    return YES;
}

#pragma mark - UISceneSession lifecycle

- (UISceneConfiguration *)application:(UIApplication *)application
    configurationForConnectingSceneSession:(UISceneSession *)connectingSceneSession
                                   options:(UISceneConnectionOptions *)options API_AVAILABLE(ios(13.0)) {
    return [[UISceneConfiguration alloc] initWithName:@"Default Configuration" sessionRole:connectingSceneSession.role];
}

@end
"#;

const OBJC_APPKIT_HEADER: &str = r#"#import <Cocoa/Cocoa.h>

@interface AppDelegate : NSObject <NSApplicationDelegate>

@end
"#;

const OBJC_APPKIT_IMPLEMENTATION: &str = r#"#import "AppDelegate.h"
@import FirebaseCore;

@implementation AppDelegate

- (void)applicationDidFinishLaunching:(NSNotification *)aNotification {
    [FIRApp configure];
}

- (void)applicationWillTerminate:(NSNotification *)aNotification {
}

@end
"#;

pub const CONTENT_VIEW: &str = r#"import SwiftUI

struct ContentView: View {
    var body: some View {
        VStack {
            Image(systemName: "globe")
                .imageScale(.large)
                .foregroundColor(.accentColor)
            Text("Hello, world!")
        }
        .padding()
    }
}

#Preview {
    ContentView()
}
"#;

pub const SWIFT_PUSH_METHODS: &str = r#"
    // MARK: - Firebase Push Notification Delegate Methods
    func application(_ application: UIApplication, didRegisterForRemoteNotificationsWithDeviceToken deviceToken: Data) {
        Messaging.messaging().apnsToken = deviceToken
    }

    func application(_ application: UIApplication, didFailToRegisterForRemoteNotificationsWithError error: Error) {
        print("Failed to register for remote notifications: \(error)")
    }

    func application(_ application: UIApplication,
                     didReceiveRemoteNotification userInfo: [AnyHashable: Any],
                     fetchCompletionHandler completionHandler: @escaping (UIBackgroundFetchResult) -> Void) {
        completionHandler(.newData)
    }
"#;

pub const OBJC_PUSH_METHODS: &str = r#"#pragma mark - Firebase Push Notification Delegate Methods

- (void)application:(UIApplication *)application
    didRegisterForRemoteNotificationsWithDeviceToken:(NSData *)deviceToken {
    [FIRMessaging messaging].APNSToken = deviceToken;
}

- (void)application:(UIApplication *)application didFailToRegisterForRemoteNotificationsWithError:(NSError *)error {
    NSLog(@"Failed to register for remote notifications: %@", error);
}

- (void)application:(UIApplication *)application
    didReceiveRemoteNotification:(NSDictionary *)userInfo
          fetchCompletionHandler:(void (^)(UIBackgroundFetchResult))completionHandler {
    completionHandler(UIBackgroundFetchResultNewData);
}

"#;

/// Lifecycle `AppDelegate.swift` that owns `@main`
pub fn swift_app_delegate(platform: Platform) -> &'static str {
    match platform {
        Platform::MacOS => SWIFT_APPKIT_APP_DELEGATE,
        _ => SWIFT_UIKIT_APP_DELEGATE,
    }
}

/// `AppDelegate.swift` driven by a SwiftUI `App` through a delegate adaptor
pub fn swiftui_app_delegate(platform: Platform) -> &'static str {
    match platform {
        Platform::MacOS => SWIFTUI_APPKIT_APP_DELEGATE,
        _ => SWIFTUI_UIKIT_APP_DELEGATE,
    }
}

/// `(AppDelegate.h, AppDelegate.m)`
pub fn objc_app_delegate(platform: Platform) -> (&'static str, &'static str) {
    match platform {
        Platform::MacOS => (OBJC_APPKIT_HEADER, OBJC_APPKIT_IMPLEMENTATION),
        _ => (OBJC_UIKIT_HEADER, OBJC_UIKIT_IMPLEMENTATION),
    }
}

/// Property attribute wiring an app delegate into a SwiftUI `App`
pub fn delegate_adaptor_attribute(platform: Platform) -> &'static str {
    match platform {
        Platform::MacOS => "@NSApplicationDelegateAdaptor",
        _ => "@UIApplicationDelegateAdaptor",
    }
}

pub fn delegate_adaptor_line(platform: Platform) -> String {
    format!(
        "{}(AppDelegate.self) var delegate",
        delegate_adaptor_attribute(platform)
    )
}

/// `<Name>App.swift` with the delegate adaptor in place
pub fn swiftui_app(platform: Platform, name: &str) -> String {
    format!(
        r#"import SwiftUI

@main
struct {name}App: App {{
    {adaptor}

    var body: some Scene {{
        WindowGroup {{
            ContentView()
        }}
    }}
}}
"#,
        adaptor = delegate_adaptor_line(platform)
    )
}
