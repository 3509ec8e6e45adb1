use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use huerta::{FeatureExtractor, ModelHandle, PrecomputedFeatures};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, ValueEnum, Debug)]
enum Modality { Audio, Image }

#[derive(Parser, Debug)]
#[command(name="predict", about="Classify one pre-extracted feature vector with a saved model")]
struct Args {
    #[arg(long, default_value="saves/modelos_entrenados.json")] model: PathBuf,
    #[arg(long, value_enum)] modality: Modality,
    /// Comma-separated features, e.g. 0.1,0.2,...
    #[arg(long, allow_hyphen_values=true)] features: String,
    #[arg(long, default_value_t=7)] dim: usize,
}

fn run(args: &Args) -> huerta::Result<String> {
    let handle = ModelHandle::open(&args.model)?;
    let mut extractor = PrecomputedFeatures::new(args.dim);
    tracing::debug!(dim = extractor.dim(), "parsing features");
    let raw = args.features.as_bytes();
    Ok(match args.modality {
        Modality::Audio => handle.predict_audio_raw(&mut extractor, raw)?,
        Modality::Image => handle.predict_image_raw(&mut extractor, raw)?.to_string(),
    })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huerta=warn")))
        .with_target(false)
        .init();
    let args = Args::parse();
    match run(&args) {
        Ok(label) => { println!("{label}"); ExitCode::SUCCESS }
        Err(e) => {
            tracing::error!(error = %e, "prediction failed");
            ExitCode::FAILURE
        }
    }
}
