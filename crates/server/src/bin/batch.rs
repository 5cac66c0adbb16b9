//! Aksa TTS batch generator
//!
//! Generates one utterance with a cloned accent and saves it as a WAV file
//! under the configured output directory.

use std::path::PathBuf;
use std::sync::Arc;

use aksa_tts_config::{load_settings, Settings, TtsEngine};
use aksa_tts_core::{SpeechModel, TtsRequest};
use aksa_tts_pipeline::{
    write_to_dir, AccentLibrary, AccentResolver, ModelHandle, ModelLoader, SpeechPipeline,
};
use aksa_tts_server::init_tracing;
use anyhow::Context;
use clap::{ArgGroup, Parser};

/// Characters of input text shown in the progress log
const PREVIEW_CHARS: usize = 30;

/// Aksa TTS batch generator
///
/// Clone an accent from a reference recording and save the result as WAV.
#[derive(Parser, Debug)]
#[command(name = "aksa-tts-batch")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("voice").required(true).args(["accent", "reference"])))]
struct Cli {
    /// Text to synthesize
    #[arg(short, long)]
    text: String,

    /// Accent identifier from the built-in library (e.g. "jawa", "sunda_v2")
    #[arg(short, long)]
    accent: Option<String>,

    /// Path to a reference recording (overrides the accent library)
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output file name, written under the output directory
    #[arg(short, long, default_value = "output.wav")]
    output: String,

    /// Output directory (defaults to `audio.output_dir`)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Model engine override (stub, chatterbox)
    #[arg(long)]
    engine: Option<String>,
}

fn parse_engine(name: &str) -> anyhow::Result<TtsEngine> {
    match name.to_lowercase().as_str() {
        "stub" => Ok(TtsEngine::Stub),
        "chatterbox" => Ok(TtsEngine::Chatterbox),
        other => anyhow::bail!("Unknown engine '{}', expected 'stub' or 'chatterbox'", other),
    }
}

/// How a batch run ended, short of a fatal error
#[derive(Debug)]
enum BatchOutcome {
    /// Nothing generated, the reference recording does not exist
    MissingReference(PathBuf),
    Saved(PathBuf),
    /// Audio generated but could not be written
    SaveFailed(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env = std::env::var("AKSA_TTS_ENV").ok();
    let mut config = load_settings(env.as_deref()).context("Failed to load configuration")?;
    if let Some(engine) = &cli.engine {
        config.model.engine = parse_engine(engine)?;
    }

    init_tracing(&config.observability);

    // A load failure ends the run, there is nothing to fall back to
    let loader = ModelLoader::new(config.model.clone());
    let model = tokio::task::spawn_blocking(move || loader.load())
        .await
        .context("Model loader task panicked")?
        .context("Failed to load model")?;

    tracing::info!("Model ready. Accepting input.");
    println!("{}", "-".repeat(40));

    match run(cli, &config, model).await? {
        BatchOutcome::Saved(path) => {
            tracing::debug!(path = %path.display(), "Batch run complete")
        }
        BatchOutcome::MissingReference(path) => {
            tracing::debug!(path = %path.display(), "Batch run skipped, no reference")
        }
        BatchOutcome::SaveFailed(reason) => {
            tracing::debug!(reason = %reason, "Batch run finished without output")
        }
    }
    Ok(())
}

/// Generate one utterance with `model` and save it under the output directory
async fn run(
    cli: Cli,
    config: &Settings,
    model: Arc<dyn SpeechModel>,
) -> anyhow::Result<BatchOutcome> {
    let resolver = AccentResolver::new(AccentLibrary::builtin(), &config.audio.reference_dir);
    let reference = match (&cli.reference, &cli.accent) {
        (Some(path), _) => path.clone(),
        (None, Some(accent)) => resolver.reference_path(accent),
        (None, None) => anyhow::bail!("Either --accent or --reference is required"),
    };

    if !reference.exists() {
        eprintln!("!! ERROR: Reference file not found at: {}", reference.display());
        return Ok(BatchOutcome::MissingReference(reference));
    }

    let request = TtsRequest::new(cli.text, cli.accent.unwrap_or_default());
    tracing::info!("Starting voice cloning for: '{}...'", request.preview(PREVIEW_CHARS));
    tracing::info!("Using accent from: {}", reference.display());

    let pipeline = SpeechPipeline::new(
        resolver,
        Arc::new(ModelHandle::ready(model)),
        config.synthesis.max_concurrent,
    );
    let audio = pipeline
        .render_with_reference(&request.text, &reference)
        .await
        .context("Speech generation failed")?;

    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&config.audio.output_dir));

    let outcome = match write_to_dir(&output_dir, &cli.output, &audio).await {
        Ok(path) => {
            println!("SUCCESS! Audio saved to: {}", path.display());
            BatchOutcome::Saved(path)
        }
        Err(e) => {
            eprintln!("!! ERROR while saving file: {}", e);
            BatchOutcome::SaveFailed(e.to_string())
        }
    };

    println!("{}", "-".repeat(40));
    Ok(outcome)
}
