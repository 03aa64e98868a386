//! AssetStamp CLI - Hash Assets, Maintain the Manifest
//!
//! Commands: hash, algorithms, manifest
//! Outputs JSON to stdout
//! Returns non-zero on failure

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use assetstamp_core::{supported_hashers, AssetHasher, Config, FileInput, HashAlgorithm};

#[derive(Parser)]
#[command(name = "assetstamp-cli")]
#[command(about = "AssetStamp CLI - Cache-Busting Asset Pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory asset paths are resolved against
    #[arg(short, long, default_value = ".")]
    base: PathBuf,

    /// Directory the manifest file is written into
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// Manifest filename; an empty string disables persistence
    #[arg(short, long, default_value = "assets.json")]
    manifest: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash assets and update the manifest
    Hash {
        /// Files, directories, or glob patterns
        #[arg(required = true)]
        targets: Vec<String>,

        /// Digest algorithm (see `algorithms`)
        #[arg(long)]
        hasher: Option<String>,

        /// Marker prefixed to every digest
        #[arg(long)]
        hash_key: Option<String>,

        /// Max digest characters retained
        #[arg(long)]
        length: Option<usize>,

        /// Hashed filename pattern with {name}, {hash}, {ext} placeholders
        #[arg(long)]
        template: Option<String>,

        /// Delete original sources after their artifacts are written
        #[arg(long)]
        replace: bool,

        /// Compute and record hashes without writing artifact files
        #[arg(long)]
        skip_save: bool,
    },

    /// List supported digest algorithms
    Algorithms,

    /// Print the persisted manifest
    Manifest,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::default();
    config.base = cli.base;
    config.path = cli.path;
    config.manifest = if cli.manifest.is_empty() {
        None
    } else {
        Some(cli.manifest)
    };

    match cli.command {
        Commands::Hash {
            targets,
            hasher,
            hash_key,
            length,
            template,
            replace,
            skip_save,
        } => {
            if let Some(name) = hasher {
                match name.parse::<HashAlgorithm>() {
                    Ok(algo) => config.hasher = algo,
                    Err(e) => {
                        eprintln!(r#"{{"error": "{}"}}"#, e);
                        return ExitCode::FAILURE;
                    }
                }
            }
            if let Some(key) = hash_key {
                config.hash_key = key;
            }
            if let Some(len) = length {
                config.length = len;
            }
            if let Some(tpl) = template {
                config.template = tpl;
            }
            config.replace = replace;
            config.save = !skip_save;

            let mut engine = AssetHasher::new(config);
            engine.load_manifest();

            let inputs: Vec<FileInput> = targets
                .iter()
                .map(|t| FileInput::from(t.as_str()))
                .collect();

            let outcome = match engine.hash(inputs, None) {
                Ok(outcome) => outcome,
                Err(e) => {
                    let output = serde_json::json!({
                        "success": false,
                        "error": e.to_string(),
                    });
                    eprintln!("{}", serde_json::to_string(&output).unwrap());
                    return ExitCode::from(2);
                }
            };

            if let Err(e) = engine.save_manifest() {
                eprintln!(r#"{{"error": "Failed to save manifest: {}"}}"#, e);
                return ExitCode::FAILURE;
            }

            println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
            ExitCode::SUCCESS
        }

        Commands::Algorithms => {
            println!(
                "{}",
                serde_json::to_string_pretty(&supported_hashers()).unwrap()
            );
            ExitCode::SUCCESS
        }

        Commands::Manifest => {
            let mut engine = AssetHasher::new(config);
            engine.load_manifest();

            println!(
                "{}",
                serde_json::to_string_pretty(engine.library()).unwrap()
            );
            ExitCode::SUCCESS
        }
    }
}
