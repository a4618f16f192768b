//! drivefs command-line front end.
//!
//! Picks a driver, mounts a namespace on it, and runs operations.
//!
//! ## Usage
//!
//! ```bash
//! # Driver metadata (default driver: ftp)
//! drivefs info
//! drivefs --driver native info
//!
//! # Create /httpdocs/index.php, write to it, print metadata
//! drivefs demo --data "some information"
//!
//! # Run an operation script
//! drivefs --config drivefs.toml script ops.txt
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG=drivefs_kernel=debug` for detail.

mod script;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use drivefs_kernel::{DriverRegistry, SystemClock, VfsConfig, VfsNode, VirtualFileSystem, WriteMode};
use tracing_subscriber::{EnvFilter, fmt};

/// Virtual filesystem over pluggable drivers.
#[derive(Parser, Debug)]
#[command(name = "drivefs")]
#[command(about = "Virtual filesystem over pluggable drivers")]
struct Args {
    /// TOML config with extra drivers and a default driver
    #[arg(long)]
    config: Option<PathBuf>,

    /// Driver to mount (overrides the config's default_driver)
    #[arg(short, long)]
    driver: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show driver name, encoding, root, and mount time
    Info,
    /// List registered drivers
    Drivers,
    /// Create a directory and a file in it, write data, and print metadata
    Demo {
        #[arg(long, default_value = "/httpdocs")]
        dir: String,
        #[arg(long, default_value = "index.php")]
        file: String,
        #[arg(long, default_value = "some information")]
        data: String,
    },
    /// Run a script of operations, one per line
    Script {
        /// Script file
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => VfsConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => VfsConfig::default(),
    };
    let registry = DriverRegistry::from_config(&config, Arc::new(SystemClock::new()));

    if let Command::Drivers = args.command {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let driver = args.driver.as_deref().unwrap_or(&config.default_driver);
    let fs = registry
        .open(driver)
        .with_context(|| format!("opening driver {driver}"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Drivers => {}
        Command::Info => print_info(&mut out, &fs, args.json)?,
        Command::Demo { dir, file, data } => {
            print_info(&mut out, &fs, args.json)?;
            fs.create_directory(&dir)?;
            let node = fs.create_file(&dir, &file)?;
            fs.write(&node.path, data.as_bytes(), WriteMode::Rewrite)?;
            script::render_metadata(&mut out, &fs.metadata(&dir)?, args.json)?;
            script::render_metadata(&mut out, &fs.metadata(&node.path)?, args.json)?;
        }
        Command::Script { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            script::run(&fs, &text, &mut out, args.json)?;
        }
    }

    fs.unmount()?;
    Ok(())
}

fn print_info(out: &mut dyn Write, fs: &VirtualFileSystem, json: bool) -> Result<()> {
    let driver = fs.driver();
    let root = driver.root();
    let root_name = match &root {
        VfsNode::File(f) => Some(f.name.as_str()),
        VfsNode::Directory(_) => None,
    };

    if json {
        let value = serde_json::json!({
            "driver": driver.name(),
            "encoding": driver.encoding(),
            "root": {
                "kind": root.kind(),
                "path": root.path(),
                "name": root_name,
            },
            "mounted_at": fs.mounted_at(),
        });
        writeln!(out, "{}", serde_json::to_string(&value)?)?;
        return Ok(());
    }

    writeln!(out, "driver:   {}", driver.name())?;
    writeln!(out, "encoding: {}", driver.encoding())?;
    match root_name {
        Some(name) => writeln!(out, "root:     {} {} ({})", root.kind(), root.path(), name)?,
        None => writeln!(out, "root:     {} {}", root.kind(), root.path())?,
    }
    writeln!(out, "mounted:  {}", fs.mounted_at())?;
    Ok(())
}
