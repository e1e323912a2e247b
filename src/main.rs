use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use voicepad::account::{JsonFileStore, Plan, UsageGate};
use voicepad::audio::capture::Recorder;
use voicepad::audio::resample::to_target_rate;
use voicepad::audio::wav::encode_wav_f32;
use voicepad::audio::AudioAsset;
use voicepad::config::AppConfig;
use voicepad::pipeline::{PipelineEvent, SynthesisPipeline, TranscriptionPipeline};
use voicepad::services::{HttpSpeechService, SpeechBackend, SpeechTask, TranscribeOptions};

#[derive(Parser)]
#[command(name = "voicepad", about = "Audio transcription and dictation")]
struct Cli {
    /// Path to a TOML config file. Falls back to ./voicepad.toml, then defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the usage allowance check.
    #[arg(long, global = true)]
    pro: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transcribe an audio file.
    Transcribe {
        file: PathBuf,

        /// Translate to English instead of transcribing verbatim.
        #[arg(long)]
        translate: bool,

        /// Source language hint (e.g. "de"). Auto-detected when omitted.
        #[arg(long)]
        language: Option<String>,
    },

    /// Synthesize speech from text and write a WAV file.
    Synthesize {
        text: String,

        #[arg(long, default_value = "speech.wav")]
        out: PathBuf,
    },

    /// Rewrite a transcript according to an instruction.
    Refine {
        text: String,

        #[arg(long)]
        instruction: String,
    },

    /// Record from the default microphone, then transcribe.
    Record {
        /// Recording length in seconds.
        #[arg(long, default_value_t = 10.0)]
        seconds: f64,

        /// Also save the recording as a WAV file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(p) => AppConfig::load_from_file(p)
            .with_context(|| format!("loading config from {}", p.display())),
        None => {
            let default_path = PathBuf::from("voicepad.toml");
            if default_path.exists() {
                Ok(AppConfig::load_from_file(&default_path)?)
            } else {
                Ok(AppConfig::default())
            }
        }
    }
}

fn build_gate(config: &AppConfig, pro: bool) -> UsageGate {
    let plan = if pro {
        Plan::Pro
    } else {
        Plan::Free {
            allowance_secs: config.limits.free_seconds,
        }
    };
    let store = JsonFileStore::new(PathBuf::from(&config.limits.usage_path));
    UsageGate::new(plan, Box::new(store))
}

fn spawn_progress_printer() -> mpsc::Sender<PipelineEvent> {
    let (tx, mut rx) = mpsc::channel(64);
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                PipelineEvent::Decoded {
                    duration_secs,
                    chunk_count,
                    ..
                } => {
                    println!(
                        "Decoded {:.1}s of audio ({} chunk{})",
                        duration_secs,
                        chunk_count,
                        if chunk_count == 1 { "" } else { "s" }
                    );
                }
                PipelineEvent::ChunkStarted { index, total, .. } => {
                    println!("Processing chunk {} of {}...", index + 1, total);
                }
                _ => {}
            }
        }
    });
    tx
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let service = HttpSpeechService::new(&config.service);

    // Ctrl-C stops the chunk loop before the next request goes out.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping");
            signal_cancel.cancel();
        }
    });

    match cli.command {
        Command::Transcribe {
            file,
            translate,
            language,
        } => {
            let asset = AudioAsset::from_file(&file)
                .with_context(|| format!("reading {}", file.display()))?;

            let opts = TranscribeOptions {
                task: if translate {
                    SpeechTask::Translate
                } else {
                    SpeechTask::Transcribe
                },
                language,
                ..TranscribeOptions::default()
            };

            let pipeline = TranscriptionPipeline::new(service, &config.audio)
                .with_gate(build_gate(&config, cli.pro));
            let progress = spawn_progress_printer();

            let transcript = pipeline
                .transcribe_asset(asset, &opts, &cancel, Some(progress))
                .await?;
            println!("{}", transcript.text);
        }

        Command::Synthesize { text, out } => {
            let pipeline = SynthesisPipeline::new(service, &config.audio);
            let wav = pipeline.synthesize_wav(&text, &config.service.voice).await?;
            std::fs::write(&out, &wav)
                .with_context(|| format!("writing {}", out.display()))?;
            println!("Wrote {} bytes to {}", wav.len(), out.display());
        }

        Command::Refine { text, instruction } => {
            let refined = service.refine(&text, &instruction).await?;
            println!("{}", refined);
        }

        Command::Record { seconds, out } => {
            let recorder = Recorder::start(seconds).map_err(anyhow::Error::from)?;
            println!("Recording for {:.0}s (Ctrl-C to stop early)...", seconds);

            tokio::select! {
                _ = tokio::time::sleep(std::time::Duration::from_secs_f64(seconds)) => {}
                _ = cancel.cancelled() => {}
            }

            let captured = recorder.stop();
            let buffer = to_target_rate(captured, config.audio.target_sample_rate)?;

            if let Some(path) = &out {
                let wav = encode_wav_f32(&buffer.samples, buffer.sample_rate)?;
                std::fs::write(path, &wav)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Saved recording to {}", path.display());
            }

            if buffer.is_empty() {
                println!("Nothing captured.");
                return Ok(());
            }

            // Recording consumed the Ctrl-C as "stop"; give transcription its
            // own fresh token.
            let pipeline = TranscriptionPipeline::new(service, &config.audio)
                .with_gate(build_gate(&config, cli.pro));
            let progress = spawn_progress_printer();
            let transcript = pipeline
                .transcribe_buffer(
                    &buffer,
                    &TranscribeOptions::default(),
                    &CancellationToken::new(),
                    Some(progress),
                )
                .await?;
            println!("{}", transcript.text);
        }
    }

    Ok(())
}
