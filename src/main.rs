use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use tubefetch::downloader::tools::ToolManager;
use tubefetch::{logging, run_batch, BatchConfig, Method};

/// CLI wrapper for Method (needed for clap ValueEnum)
#[derive(Clone, Copy, ValueEnum)]
enum CliMethod {
    #[value(name = "yt-dlp")]
    YtDlp,
    Pytube,
}

impl From<CliMethod> for Method {
    fn from(cli: CliMethod) -> Self {
        match cli {
            CliMethod::YtDlp => Method::YtDlp,
            CliMethod::Pytube => Method::Pytube,
        }
    }
}

#[derive(Parser)]
#[command(name = "tubefetch", version)]
#[command(about = "Download YouTube videos with yt-dlp, falling back to pytube")]
struct Cli {
    /// Video URLs, processed in order
    urls: Vec<String>,

    /// Directory the videos are saved to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Method tried first; the other one is the fallback
    #[arg(short, long)]
    prefer: Option<CliMethod>,

    /// File with one URL per line (# starts a comment)
    #[arg(long)]
    urls_file: Option<PathBuf>,

    /// TOML config file (default: <config dir>/tubefetch/config.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Give up on a single tool run after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp")]
    ytdlp: Option<String>,

    /// Python interpreter with pytube installed
    #[arg(long)]
    python: Option<String>,

    /// Show which download tools are installed and exit
    #[arg(long)]
    check_tools: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<BatchConfig> {
        let mut config = BatchConfig::load_or_default(self.config.as_deref())?;

        if let Some(path) = &self.urls_file {
            config.add_urls_from_file(path)?;
        }
        config.urls.extend(self.urls);
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(method) = self.prefer {
            config.preferred = method.into();
        }
        if self.timeout.is_some() {
            config.timeout_secs = self.timeout;
        }
        if self.ytdlp.is_some() {
            config.ytdlp_path = self.ytdlp;
        }
        if self.python.is_some() {
            config.python_path = self.python;
        }
        Ok(config)
    }
}

fn print_tools(config: &BatchConfig) {
    let manager = ToolManager::new(&config.backend_options());
    for tool in manager.get_all_tools() {
        let status = if tool.is_available { "✓" } else { "✗" };
        println!(
            "{} {:<8} {:<12} {}",
            status,
            tool.name,
            tool.version.as_deref().unwrap_or("missing"),
            tool.path.as_deref().unwrap_or("-")
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    let check_tools = cli.check_tools;

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    if check_tools {
        print_tools(&config);
        return ExitCode::SUCCESS;
    }

    if config.urls.is_empty() {
        eprintln!("Error: no URLs given (pass them as arguments, via --urls-file or in the config file)");
        return ExitCode::from(2);
    }

    let summary = run_batch(&config).await;
    if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
