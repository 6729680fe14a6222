use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use memo_core::audio;
use memo_core::config::{self, AppConfig};
use memo_core::memo;
use memo_core::pipeline::ProgressEvent;
use memo_core::registry::{self, ProviderEnv};
use memo_core::render;
use memo_core::status;
use memo_core::AnalysisContext;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;
    let env = ProviderEnv::from_env();

    match cli.command {
        Commands::Analyze {
            file,
            text,
            json,
            markdown,
            out,
            audio,
            provider,
        } => {
            run_analyze(
                cfg,
                env,
                AnalyzeArgs {
                    file,
                    text,
                    json,
                    markdown,
                    out,
                    audio,
                    provider,
                },
            )
            .await
        }
        Commands::Speak { file, text } => run_speak(cfg, env, file, text).await,
        Commands::Status => {
            let report = status::status_report(&env, &cfg);
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                cfg.server.host = host;
            }
            if let Some(port) = port {
                cfg.server.port = port;
            }
            memo_cli::server::serve(cfg, env).await
        }
    }
}

#[derive(Parser)]
#[command(name = "memo-analyzer")]
#[command(about = "LLM-backed investment memo analyzer", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a memo from a file, --text, or stdin
    Analyze {
        /// Memo file (.txt, .md, .pdf)
        file: Option<PathBuf>,
        /// Memo text given inline
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
        /// Print the result as JSON
        #[arg(long, conflicts_with = "markdown")]
        json: bool,
        /// Print the result as Markdown
        #[arg(long)]
        markdown: bool,
        /// Write an export; .json gets JSON, anything else Markdown
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also render the audio script to speech
        #[arg(long, default_value_t = false)]
        audio: bool,
        /// Provider to use: anthropic|groq|xai
        #[arg(long)]
        provider: Option<String>,
    },
    /// Generate audio for a script
    Speak {
        /// File holding the script
        file: Option<PathBuf>,
        /// Script text given inline
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,
    },
    /// Show provider and configuration status
    Status,
    /// Run the HTTP service
    Serve {
        /// Override server.host
        #[arg(long)]
        host: Option<String>,
        /// Override server.port
        #[arg(long)]
        port: Option<u16>,
    },
}

struct AnalyzeArgs {
    file: Option<PathBuf>,
    text: Option<String>,
    json: bool,
    markdown: bool,
    out: Option<PathBuf>,
    audio: bool,
    provider: Option<String>,
}

async fn read_input(cfg: &AppConfig, file: Option<&Path>, text: Option<String>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return memo::load_memo(path, cfg.upload.max_file_bytes)
            .await
            .with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    Ok(buf)
}

async fn run_analyze(cfg: AppConfig, env: ProviderEnv, args: AnalyzeArgs) -> Result<()> {
    let memo = read_input(&cfg, args.file.as_deref(), args.text).await?;
    let reg = registry::build_registry(&cfg, &env)?;
    let pipeline = registry::pipeline_for(&reg, args.provider.as_deref(), cfg.analysis)?;

    let progress = |event: ProgressEvent| eprintln!("[{event}]");
    let mut ctx = AnalysisContext::new();
    pipeline.run_in(&mut ctx, &memo, &progress).await?;
    let Some(result) = ctx.result() else {
        bail!("analysis finished without a result");
    };

    if let Some(path) = &args.out {
        memo_cli::export::write_export(path, result).await?;
        info!(path = %path.display(), "export written");
    }

    let audio = if args.audio {
        let speech = reg.speech()?;
        Some(audio::generate_audio(speech.as_ref(), &result.audio_script).await?)
    } else {
        None
    };

    if args.json {
        let mut value = serde_json::to_value(result)?;
        if let (Some(obj), Some(audio)) = (value.as_object_mut(), &audio) {
            obj.insert("audio".into(), serde_json::to_value(audio)?);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        if args.markdown {
            println!("{}", render::to_markdown(result));
        } else {
            println!("{}", render::to_text(result));
        }
        if let Some(audio) = &audio {
            if let Some(message) = &audio.message {
                eprintln!("{message}");
            }
            println!("audio: {}", audio.audio_url);
        }
    }
    Ok(())
}

async fn run_speak(
    cfg: AppConfig,
    env: ProviderEnv,
    file: Option<PathBuf>,
    text: Option<String>,
) -> Result<()> {
    let script = read_input(&cfg, file.as_deref(), text).await?;
    let reg = registry::build_registry(&cfg, &env)?;
    let speech = reg.speech()?;
    let outcome = audio::generate_audio(speech.as_ref(), &script).await?;
    if let Some(message) = &outcome.message {
        eprintln!("{message}");
    }
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
