use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use huerta::eval::{evaluate_audio, evaluate_image, label_stats, LabelStats, Score};
use huerta::{Dataset, LoadedModels, ModelStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name="evaluate", about="Score a saved model against a feature dataset")]
struct Args {
    #[arg(long, default_value="saves/datos_procesados.json")] data: PathBuf,
    #[arg(long, default_value="saves/modelos_entrenados.json")] model: PathBuf,
    /// Print per-label feature mean and variance.
    #[arg(long, default_value_t=false)] stats: bool,
}

fn print_score(name: &str, s: Option<Score>) {
    match s {
        Some(s) => println!("{name}\t{}/{}\t{:.2}%\t(lb95 {:.2}%)", s.correct, s.total, s.percent, s.lower_bound_percent()),
        None => println!("{name}\tunavailable"),
    }
}

fn print_stats(name: &str, stats: &[LabelStats]) {
    println!("# {name}");
    println!("{:<15} {:>5}  mean | variance", "label", "n");
    for s in stats {
        let fmt = |xs: &[f64]| xs.iter().map(|x| format!("{x:.3}")).collect::<Vec<_>>().join(", ");
        println!("{:<15} {:>5}  [{}] | [{}]", s.label, s.count, fmt(&s.mean), fmt(&s.variance));
    }
}

fn run(args: &Args) -> huerta::Result<()> {
    let ds = Dataset::from_file(&args.data)?;
    let models = LoadedModels::from_document(&ModelStore::read_file(&args.model)?)?;

    let audio = models.audio.as_ref().map(|knn| evaluate_audio(knn, &ds.audio, &ds.audio_labels)).transpose()?;
    let image = models.image.as_ref().map(|ncc| evaluate_image(ncc, &ds.image, &ds.image_labels)).transpose()?;
    print_score("audio", audio);
    print_score("image", image);

    if args.stats {
        print_stats("audio", &label_stats(&ds.audio, &ds.audio_labels)?);
        print_stats("image", &label_stats(&ds.image, &ds.image_labels)?);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huerta=info")))
        .with_target(false)
        .init();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "evaluation failed");
            ExitCode::FAILURE
        }
    }
}
