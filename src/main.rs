// Fingerspell - sign-language letter classifier
// Main entry point

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use fingerspell::config::{load_config, Config};
use fingerspell::models::loaders::OnnxRuntime;
use fingerspell::models::preprocess::load_sample;
use fingerspell::LetterClassifier;

#[derive(Parser)]
#[command(name = "fingerspell")]
#[command(about = "Classify hand-sign images to letters with an ONNX model")]
#[command(version)]
struct Cli {
    /// Configuration file path (default: ~/.fingerspell/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one or more samples (images, or .json float arrays)
    Classify {
        /// Sample files
        #[arg(required = true)]
        samples: Vec<PathBuf>,
        /// Model file (overrides config)
        #[arg(short, long)]
        model: Option<PathBuf>,
        /// Confidence threshold (overrides config)
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Check that a model loads
    Check {
        /// Model file (overrides config)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            samples,
            model,
            threshold,
        } => {
            if let Some(t) = threshold {
                config.classifier.confidence_threshold = t;
                config.validate()?;
            }
            let classifier = build_classifier(&config, model.as_deref()).await?;
            classify_all(&classifier, &samples).await;
        }
        Commands::Check { model } => {
            let classifier = build_classifier(&config, model.as_deref()).await?;
            let options = classifier.options();
            let providers: Vec<&str> = classifier
                .runtime()
                .config()
                .resolved_providers()
                .into_iter()
                .map(|p| p.name())
                .collect();
            println!(
                "Model OK (input {}, threshold {}, letters from '{}', providers {})",
                options.shape,
                options.confidence_threshold,
                options.letter_base,
                providers.join(", ")
            );
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Create the ONNX-backed classifier and load the configured model
async fn build_classifier(
    config: &Config,
    model_override: Option<&Path>,
) -> Result<LetterClassifier<OnnxRuntime>> {
    let model_path = model_override
        .map(Path::to_path_buf)
        .or_else(|| config.model.path.clone())
        .context("No model configured. Pass --model or set [model] path in the config file")?;

    let runtime = OnnxRuntime::new(config.model.onnx.clone());
    let classifier = LetterClassifier::with_options(runtime, config.classifier_options());

    let location = model_path.to_string_lossy();
    if !classifier.load_model(&location).await {
        bail!("Failed to load model from {}", location);
    }
    Ok(classifier)
}

async fn classify_all(classifier: &LetterClassifier<OnnxRuntime>, samples: &[PathBuf]) {
    let mut confident = 0usize;

    for path in samples {
        let sample = match load_sample(path, classifier.shape()) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                println!("{}: error", path.display());
                continue;
            }
        };

        match classifier.predict(&sample).await {
            Some(p) => {
                confident += 1;
                println!(
                    "{}: {} (index {}, confidence {:.3})",
                    path.display(),
                    p.letter,
                    p.index,
                    p.confidence
                );
            }
            None => println!("{}: no result", path.display()),
        }
    }

    info!("Classified {}/{} samples", confident, samples.len());
}
