use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use framescribe_core::{
    FfmpegFrameCapture, Pipeline, PipelineOptions, Provider, PunctuationNormalizer, Transcriber,
    WhisperStt, YtDlpFetcher, default_workspace_root, ensure_model,
};

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Grok,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Grok => Provider::Grok,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "framescribe")]
#[command(
    about = "Download a video, transcribe it with Whisper, and generate an illustrated markdown summary"
)]
struct Cli {
    /// Video URL
    url: String,

    /// Summary language (e.g., "en", "ru", "uk"). Defaults to video's detected language.
    #[arg(short, long)]
    lang: Option<String>,

    /// AI provider for moment selection and summary generation
    #[arg(short, long, default_value = "grok")]
    provider: CliProvider,

    /// Summary style; repeat the flag to produce several summaries in one run
    #[arg(short, long = "style", default_value = "long-form")]
    styles: Vec<String>,

    /// Number of screenshots to illustrate the summary with
    #[arg(long, default_value_t = 5)]
    screenshots: usize,

    /// Skip screenshots and produce a plain summary
    #[arg(long)]
    no_screenshots: bool,

    /// Video title to thread into the prompts
    #[arg(long)]
    title: Option<String>,

    /// Cache root directory (defaults to the user cache dir)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force re-processing even if cached files exist
    #[arg(short, long)]
    force: bool,
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

extern "C" fn whisper_log_callback(
    _level: u32,
    _message: *const std::ffi::c_char,
    _user_data: *mut std::ffi::c_void,
) {
    // silent
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();

    unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    }

    // Validate API key early
    if let Err(e) = provider.validate_api_key() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    println!(
        "\n{}  {}\n",
        style("framescribe").cyan().bold(),
        style("Illustrated Video Summaries").dim()
    );

    let workspace_root = cli.output.clone().unwrap_or_else(default_workspace_root);

    let spinner = create_spinner("Preparing Whisper model...");
    let model_path = ensure_model(&workspace_root).await?;
    spinner.finish_and_clear();

    let screenshot_count = if cli.no_screenshots { 0 } else { cli.screenshots };

    let options = PipelineOptions {
        source: cli.url.clone(),
        video_title: cli.title.clone(),
        styles: cli.styles.clone(),
        screenshot_count,
        language_override: cli.lang.clone(),
        force: cli.force,
        workspace_root,
    };

    let provider_name = provider.name();
    let pipeline = Pipeline::new(
        YtDlpFetcher,
        Transcriber::new(WhisperStt::new(model_path))
            .with_normalizer(Box::new(PunctuationNormalizer)),
        provider,
        FfmpegFrameCapture,
    );

    let total_start = Instant::now();
    let results = pipeline.run(&options).await?;

    for result in &results {
        println!();
        if result.success {
            println!(
                "{} {} ({}, {} mode, {}/{} screenshots)",
                style("✓").green().bold(),
                style(&result.style).bold(),
                provider_name,
                result.mode.name(),
                result.screenshots_extracted,
                result.screenshots_requested
            );
            if let Some(path) = &result.summary_path {
                println!("{} {}", style("Saved:").dim(), style(path.display()).cyan());
            }
            if let Some(summary) = &result.summary {
                println!("{}", style("─".repeat(60)).dim());
                println!("{}", summary);
            }
        } else {
            println!(
                "{} {}: no summary produced",
                style("✗").red().bold(),
                style(&result.style).bold()
            );
        }
    }

    println!(
        "\n{} {}",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );

    if results.iter().all(|r| !r.success) {
        std::process::exit(1);
    }

    Ok(())
}
