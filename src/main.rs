use clap::{Parser, Subcommand};
use galerie::config::{self, ConfigError, RunConfig, Settings};
use galerie::manifest::Manifest;
use galerie::publish::{Orchestrator, RunOutcome};
use galerie::{output, scan};
use std::path::{Path, PathBuf};

/// Flags shared by the commands that resolve a run configuration.
#[derive(clap::Args, Clone)]
struct RunArgs {
    /// Settings file [default: galerie.toml, if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// Folder with the source pictures
    #[arg(long)]
    source: Option<PathBuf>,

    /// Output tree, rewritten on every run
    #[arg(long)]
    target: Option<PathBuf>,

    /// Previously published tree to compare against
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Where files that differ from the reference are staged
    #[arg(long)]
    delta: Option<PathBuf>,

    /// Gallery title shown by the viewer
    #[arg(long)]
    title: Option<String>,
}

impl RunArgs {
    fn to_settings(&self) -> Settings {
        Settings {
            title: self.title.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            reference: self.reference.clone(),
            delta: self.delta.clone(),
            assets_dir: None,
        }
    }
}

fn version_string() -> &'static str {
    let on_tag = env!("GALERIE_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GALERIE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "galerie")]
#[command(about = "Publish a folder of pictures as a static web gallery")]
#[command(long_about = "\
Publish a folder of pictures as a static web gallery

Every .jpg, .jpeg, .png, .gif and .bmp file directly inside the source
folder is copied to the target tree together with a thumbnail, a manifest
and a small in-browser viewer:

  target/
  ├── index.html
  ├── content/galerie.css
  ├── scripts/galerie-lib.js
  ├── scripts/galerie.js
  └── pics/
      ├── galerie.txt              # Title + ordered picture list
      ├── a.jpg
      └── tn_a.jpg                 # Fits 200x200, same format

Delta publishing: with --reference pointing at the previously published
tree and --delta at a staging folder, every file that differs from the
reference is also copied to the staging folder. Upload that folder to
bring the live site up to date.

Run 'galerie gen-config' to generate a documented galerie.toml.")]
#[command(version = version_string())]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish the gallery: target tree, plus delta tree when enabled
    Build(RunArgs),
    /// Validate settings and show what would be published
    Check(RunArgs),
    /// Print a stock galerie.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => {
            let config = resolve_run_config(&args)?;
            println!(
                "==> Publishing {} \u{2192} {}",
                config.source.display(),
                config.target.display()
            );
            let orchestrator = Orchestrator::new();
            let outcome = orchestrator
                .start(config)?
                .wait_with(output::print_run_event);
            match outcome {
                RunOutcome::Succeeded(summary) => output::print_summary(&summary),
                RunOutcome::Failed(_) => std::process::exit(1),
            }
        }
        Command::Check(args) => {
            let config = resolve_run_config(&args)?;
            let assets = scan::scan(&config.source)?;
            let manifest = Manifest::new(&config.title, &assets);
            output::print_check_output(&config, &assets, &manifest);
            println!("==> Configuration is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_settings_toml());
        }
    }

    Ok(())
}

/// Settings file, overlaid with command-line flags, validated.
///
/// An explicit `--config` must exist; the default file is optional.
fn resolve_run_config(args: &RunArgs) -> Result<RunConfig, ConfigError> {
    let file_settings = match &args.config {
        Some(path) => config::load_settings(path)?.ok_or_else(|| {
            ConfigError::Validation(format!("settings file not found: {}", path.display()))
        })?,
        None => config::load_settings(Path::new(config::DEFAULT_SETTINGS_FILE))?
            .unwrap_or_default(),
    };
    file_settings.merge(args.to_settings()).into_run_config()
}
