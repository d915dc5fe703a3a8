//! narrate - Convert extracted PDF text to narrated audio using a remote TTS service

mod audio;
mod cache;
mod config;
mod ledger;
mod pipeline;
mod text;
mod tts;

use anyhow::{Context, Result};
use cache::ChunkCache;
use clap::{Parser, Subcommand};
use config::NarrateConfig;
use gemini_client::GeminiClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use text::{ChunkLimit, TextChunk};
use tts::SpeechGenerator;
use tts::gemini::GeminiSpeech;

/// File name of the word-count ledger inside the chunk directory.
const LEDGER_FILE: &str = "word_counts.json";

#[derive(Parser, Debug)]
#[command(name = "narrate")]
#[command(about = "Convert extracted PDF text to narrated audio", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the narration text file (UTF-8)
    input_file: Option<PathBuf>,

    /// Final audio file path (default: <input-name>.mp3)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for per-chunk audio artifacts
    #[arg(long, default_value = "output_audio")]
    out_dir: PathBuf,

    /// Voice to use for synthesis
    #[arg(long)]
    voice: Option<String>,

    /// Clean the text via the text-generation service before chunking
    #[arg(long)]
    clean: bool,

    /// Maximum chunk size in words
    #[arg(long)]
    chunk_words: Option<usize>,

    /// Maximum chunk size in characters (instead of words)
    #[arg(long, conflicts_with = "chunk_words")]
    chunk_chars: Option<usize>,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge chunk artifacts into duration-bounded parts
    Merge {
        /// Directory containing chunk_<N>.wav files
        input_dir: PathBuf,

        /// Directory for the merged parts
        #[arg(short, long, default_value = "merged_audio")]
        output: PathBuf,

        /// Maximum duration of each part in minutes
        #[arg(long)]
        max_minutes: Option<u64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the default voice
    SetVoice {
        /// Prebuilt voice name (e.g. Charon, Kore)
        name: String,
    },
    /// Set the speech synthesis model
    SetTtsModel {
        /// Model identifier
        name: String,
    },
    /// Set the narration cleanup model
    SetCleanModel {
        /// Model identifier
        name: String,
    },
    /// Set the default maximum chunk size in words
    SetChunkWords {
        /// Number of words
        value: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match &args.command {
        Some(Commands::Merge {
            input_dir,
            output,
            max_minutes,
        }) => {
            return run_merge(input_dir, output, *max_minutes);
        }
        Some(Commands::Config { action }) => {
            return handle_config_command(action);
        }
        None => {}
    }

    let input_path = args.input_file.clone().ok_or_else(|| {
        anyhow::anyhow!("Input file path is required. Run 'narrate --help' for usage.")
    })?;

    if !input_path.exists() {
        anyhow::bail!("Input file not found: {}", input_path.display());
    }

    let config = NarrateConfig::load().context("Failed to load configuration")?;

    let raw_text = std::fs::read_to_string(&input_path)
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;
    if raw_text.trim().is_empty() {
        anyhow::bail!("Input file is empty: {}", input_path.display());
    }

    // Optional remote cleanup, persisted next to the input for re-runs
    let narration = if args.clean {
        let client = GeminiClient::from_env()?;
        text::rewrite::clean_for_narration(&client, &config.clean_model, &input_path, &raw_text)
            .await?
    } else {
        raw_text
    };

    let limit = match (args.chunk_words, args.chunk_chars) {
        (_, Some(chars)) => ChunkLimit::Chars(chars),
        (Some(words), None) => ChunkLimit::Words(words),
        (None, None) => ChunkLimit::Words(config.chunk_words),
    };

    let chunks = text::chunker::process_text(&narration, limit);
    if chunks.is_empty() {
        anyhow::bail!(
            "No usable text found in {}; nothing to synthesize",
            input_path.display()
        );
    }

    let total_words: usize = chunks.iter().map(|c| c.word_count).sum();
    eprintln!("Chunks: {}, Words: ~{}", chunks.len(), total_words);

    let cache = ChunkCache::open(&args.out_dir)?;

    // Reporting side-channel only; a ledger failure never aborts the run
    let document = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    if let Err(e) = ledger::record_document(&cache.dir().join(LEDGER_FILE), &document, &chunks) {
        log::warn!("Failed to update word-count ledger: {:#}", e);
    }

    generate_pending(&args, &config, &cache, &chunks).await?;

    // Assemble the final file from whatever the cache now holds
    eprintln!("Concatenating audio chunks...");
    let output_path = args.output.clone().unwrap_or_else(|| {
        let stem = input_path.file_stem().unwrap_or_default();
        input_path.with_file_name(format!("{}.mp3", stem.to_string_lossy()))
    });

    let included = audio::assembler::concatenate_chunks(&cache, chunks.len(), &output_path)?;
    if included < chunks.len() {
        eprintln!(
            "Warning: {} of {} chunks missing from the final audio; re-run to fill the gaps",
            chunks.len() - included,
            chunks.len()
        );
    }

    eprintln!("Final audio saved as {}", output_path.display());
    Ok(())
}

/// Generate artifacts for the chunks that have no cached audio yet.
async fn generate_pending(
    args: &Args,
    config: &NarrateConfig,
    cache: &ChunkCache,
    chunks: &[TextChunk],
) -> Result<()> {
    let pending = pipeline::pending_chunks(cache, chunks);

    if pending.is_empty() {
        eprintln!("All chunks already cached");
        return Ok(());
    }

    let client = Arc::new(GeminiClient::from_env()?);
    let voice = args.voice.clone().unwrap_or_else(|| config.voice.clone());
    let backend = GeminiSpeech::new(client, &config.tts_model, &voice);
    let generator = Arc::new(SpeechGenerator::new(Arc::new(backend), cache.clone()));

    let workers = pipeline::default_workers();
    eprintln!(
        "Generating {} chunks with {} workers (voice: {})...",
        pending.len(),
        workers,
        voice
    );

    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let total = pending.len();
    let artifacts = pipeline::generate_all(generator, pending, workers, |progress| {
        pb.set_position((progress.completed + progress.failed) as u64);
        if progress.failed > 0 {
            pb.set_message(format!("{} failed", progress.failed));
        }
    })
    .await;

    pb.finish_and_clear();
    eprintln!(
        "Completed: {}, Failed: {}",
        artifacts.len(),
        total - artifacts.len()
    );

    Ok(())
}

/// Merge cached chunks into duration-bounded parts.
fn run_merge(input_dir: &PathBuf, output_dir: &PathBuf, max_minutes: Option<u64>) -> Result<()> {
    if !input_dir.is_dir() {
        anyhow::bail!("Input directory not found: {}", input_dir.display());
    }

    let config = NarrateConfig::load().context("Failed to load configuration")?;
    let max_ms = max_minutes.unwrap_or(config.max_part_minutes) * 60 * 1000;

    let cache = ChunkCache::open(input_dir)?;
    let parts = audio::assembler::merge_into_parts(&cache, output_dir, max_ms)?;

    for part in &parts {
        log::debug!(
            "part_{}: {} ({} ms)",
            part.part_number,
            part.file_path.display(),
            part.duration_ms
        );
    }

    let total_ms: u64 = parts.iter().map(|p| p.duration_ms).sum();
    eprintln!(
        "Audio merging complete: {} part(s), {:.1} minutes total in {}",
        parts.len(),
        total_ms as f64 / 60_000.0,
        output_dir.display()
    );
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = NarrateConfig::load()?;
            println!("Configuration file: {:?}", NarrateConfig::config_path()?);
            println!();
            println!("voice = \"{}\"", config.voice);
            println!("tts_model = \"{}\"", config.tts_model);
            println!("clean_model = \"{}\"", config.clean_model);
            println!("chunk_words = {}", config.chunk_words);
            println!("max_part_minutes = {}", config.max_part_minutes);
        }
        ConfigAction::SetVoice { name } => {
            let mut config = NarrateConfig::load()?;
            config.voice = name.clone();
            config.save()?;
            println!("Default voice set to: {}", name);
        }
        ConfigAction::SetTtsModel { name } => {
            let mut config = NarrateConfig::load()?;
            config.tts_model = name.clone();
            config.save()?;
            println!("Speech model set to: {}", name);
        }
        ConfigAction::SetCleanModel { name } => {
            let mut config = NarrateConfig::load()?;
            config.clean_model = name.clone();
            config.save()?;
            println!("Cleanup model set to: {}", name);
        }
        ConfigAction::SetChunkWords { value } => {
            let mut config = NarrateConfig::load()?;
            config.chunk_words = *value;
            config.save()?;
            println!("Default chunk size set to: {} words", value);
        }
    }
    Ok(())
}
