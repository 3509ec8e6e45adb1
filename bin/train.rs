use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use huerta::{KMeansParams, TrainParams, TrainingOrchestrator};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name="train", about="Fit K-NN (audio) and k-means (image) over N trials, keep the best")]
struct Args {
    #[arg(long, default_value="saves/datos_procesados.json")] data: PathBuf,
    #[arg(long, default_value="saves/modelos_entrenados.json")] out: PathBuf,
    #[arg(long, default_value_t=10)] trials: usize,
    #[arg(long, default_value_t=5)] k: usize,
    #[arg(long, default_value_t=4)] clusters: usize,
    #[arg(long, default_value_t=300)] max_iters: usize,
    #[arg(long, default_value_t=1e-4)] tol: f64,
    /// Run seed; omitted means a fresh random seed (logged).
    #[arg(long)] seed: Option<u64>,
    /// Also write per-trial reports as JSON.
    #[arg(long)] report: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huerta=info,train=info")))
        .with_target(false)
        .init();
    let args = Args::parse();

    let params = TrainParams {
        k: args.k,
        kmeans: KMeansParams { clusters: args.clusters, max_iters: args.max_iters, tol: args.tol, ..KMeansParams::default() },
        seed: args.seed,
    };
    let mut trainer = TrainingOrchestrator::new(params);
    if let Err(e) = trainer.load_data(&args.data) {
        tracing::error!(error = %e, "cannot load dataset");
        return ExitCode::FAILURE;
    }
    let outcome = match trainer.run_trials(args.trials) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!(error = %e, "training failed");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = trainer.finalize(&outcome, &args.out) {
        tracing::error!(error = %e, "cannot save model");
        return ExitCode::FAILURE;
    }
    if let Some(path) = &args.report {
        let written = serde_json::to_vec_pretty(&outcome.trials)
            .map_err(std::io::Error::from)
            .and_then(|bytes| std::fs::write(path, bytes));
        if let Err(e) = written {
            tracing::warn!(error = %e, path = %path.display(), "cannot write trial report");
        }
    }

    println!("run_seed\t{}", outcome.run_seed);
    println!("best_trial\t{}", outcome.best_trial);
    println!("image_accuracy\t{:.2}%", outcome.best_accuracy());
    println!("audio_accuracy\t{:.2}%", outcome.audio.percent);
    eprintln!("saved {}", args.out.display());
    ExitCode::SUCCESS
}
