//! flotilla CLI - load and inspect application manifests
//!
//! Usage:
//!   flotilla check flotilla.yaml
//!   flotilla dump flotilla.yaml --format json
//!   flotilla secrets flotilla.yaml

use clap::{Parser, Subcommand};
use colored::Colorize;
use flotilla_core::{Application, ManifestLoader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// flotilla - application manifests for multi-service apps
#[derive(Parser)]
#[command(name = "flotilla")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load manifests and report whether they are valid
    Check {
        /// Manifest file(s) to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Load a manifest and print the resolved model
    Dump {
        /// Manifest file to dump
        file: PathBuf,

        /// Output format: yaml, json
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Write to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the secret records a manifest declares
    Secrets {
        /// Manifest file to inspect
        file: PathBuf,
    },
}

/// Run the CLI with the given arguments
pub fn run() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { files } => cmd_check(&files),
        Commands::Dump {
            file,
            format,
            output,
        } => cmd_dump(&file, &format, output.as_deref()),
        Commands::Secrets { file } => cmd_secrets(&file),
    }
}

fn load(file: &Path) -> flotilla_core::Result<Application> {
    ManifestLoader::from_file(file)?.load()
}

fn cmd_check(files: &[PathBuf]) -> ExitCode {
    let mut failed = false;

    for file in files {
        match load(file) {
            Ok(app) => {
                println!(
                    "{} {} ({}: {} services, {} ingress, {} secrets)",
                    "ok".green().bold(),
                    file.display(),
                    app.name,
                    app.services.len(),
                    app.ingress.len(),
                    app.secrets.len()
                );
            }
            Err(e) => {
                failed = true;
                eprintln!("{} {}\n{}", "error".red().bold(), file.display(), e);
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn cmd_dump(file: &Path, format: &str, output: Option<&Path>) -> ExitCode {
    let app = match load(file) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{} {}\n{}", "error".red().bold(), file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let rendered = match format {
        "yaml" => serde_yaml::to_string(&app).map_err(|e| e.to_string()),
        "json" => serde_json::to_string_pretty(&app).map_err(|e| e.to_string()),
        other => Err(format!("unknown format '{}' (expected yaml or json)", other)),
    };

    let rendered = match rendered {
        Ok(r) => r,
        Err(message) => {
            eprintln!("{} {}", "error".red().bold(), message);
            return ExitCode::FAILURE;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, rendered) {
                eprintln!(
                    "{} failed to write {}: {}",
                    "error".red().bold(),
                    path.display(),
                    e
                );
                return ExitCode::FAILURE;
            }
        }
        None => print!("{}", rendered),
    }

    ExitCode::SUCCESS
}

fn cmd_secrets(file: &Path) -> ExitCode {
    let app = match load(file) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{} {}\n{}", "error".red().bold(), file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    if app.secrets.is_empty() {
        println!("{} declares no secrets", app.name);
        return ExitCode::SUCCESS;
    }

    println!("{:<24} {:<16} {:<16}", "NAME".bold(), "SOURCE".bold(), "TYPE".bold());
    for secret in &app.secrets {
        println!("{:<24} {:<16} {:<16}", secret.name, secret.source, secret.kind);
    }

    ExitCode::SUCCESS
}
