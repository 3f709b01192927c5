//! nativefire - Firebase setup for native projects
//!
//! This is the binary entry point. Detection, registry access and source
//! mutation live in the workspace crates; this file only parses arguments
//! and prints progress.

mod commands;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use nativefire_core::prelude::*;

/// nativefire - Firebase setup made easy for native apps
#[derive(Parser, Debug)]
#[command(name = "nativefire")]
#[command(about = "🔥 Simplify Firebase setup in native development environments", long_about = None)]
struct Args {
    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (default: <config dir>/nativefire/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 🚀 Configure Firebase for your native application
    Configure(ConfigureArgs),

    /// 🔥 Manage Firebase projects
    Projects {
        #[command(subcommand)]
        action: ProjectsAction,
    },

    /// Print version information
    Version,
}

#[derive(clap::Args, Debug)]
struct ConfigureArgs {
    /// Firebase project ID (prompts when omitted)
    #[arg(short, long, value_name = "ID")]
    project: Option<String>,

    /// Target platform (android, ios, macos, windows, linux)
    #[arg(long, value_name = "PLATFORM")]
    platform: Option<String>,

    /// Detect the platform from the project directory
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    auto_detect: Option<bool>,

    /// Use an existing Firebase app ID
    #[arg(long, value_name = "APP_ID")]
    app_id: Option<String>,

    /// iOS / macOS bundle identifier
    #[arg(long, value_name = "ID")]
    bundle_id: Option<String>,

    /// Android (and desktop) package name
    #[arg(long, value_name = "NAME")]
    package_name: Option<String>,

    /// Project directory (default: current directory)
    #[arg(long, value_name = "PATH")]
    path: Option<PathBuf>,

    /// Do not run Gradle / CocoaPods after patching
    #[arg(long)]
    skip_sync: bool,
}

#[derive(Subcommand, Debug)]
enum ProjectsAction {
    /// 📋 List all available Firebase projects
    List,
    /// 🎯 Interactively select a Firebase project
    Select,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = color_eyre::install() {
        eprintln!("⚠️  Failed to install error handler: {}", e);
    }

    let settings = nativefire_app::load_settings(args.config.as_deref());
    let verbose = args.verbose || settings.logging.verbose;
    if let Err(e) = nativefire_core::logging::init(verbose) {
        eprintln!("⚠️  Logging disabled: {}", e);
    }

    let result = match args.command {
        Command::Configure(configure) => {
            commands::configure(configure.into_options(), &settings).await
        }
        Command::Projects {
            action: ProjectsAction::List,
        } => commands::list_projects(&settings, verbose).await,
        Command::Projects {
            action: ProjectsAction::Select,
        } => commands::select_project(&settings).await,
        Command::Version => {
            println!("nativefire {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        report_error(&e);
        std::process::exit(1);
    }
}

impl ConfigureArgs {
    fn into_options(self) -> commands::ConfigureOptions {
        commands::ConfigureOptions {
            project: self.project,
            platform: self.platform,
            auto_detect: self.auto_detect,
            app_id: self.app_id,
            bundle_id: self.bundle_id,
            package_name: self.package_name,
            path: self.path,
            skip_sync: self.skip_sync,
        }
    }
}

fn report_error(err: &Error) {
    let mut stderr = std::io::stderr().lock();
    if let Err(e) = write_error_report(&mut stderr, err, &nativefire_core::logging::log_directory()) {
        debug!("Failed to print error report: {}", e);
    }
}

/// Error line, remediation hint and where the full log lives
fn write_error_report(out: &mut impl Write, err: &Error, log_dir: &Path) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "❌ {}", err)?;
    if let Some(hint) = err.remediation() {
        writeln!(out, "💡 {}", hint)?;
    }
    writeln!(out, "📄 Logs: {}", log_dir.display())
}
