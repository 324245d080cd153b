use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Parser)]
#[command(name = "duodebate")]
#[command(version = "0.3.0")]
#[command(about = "Watch two AI models debate and refine an idea in real time")]
pub struct Args {
    /// Debate topic sent to the backend
    pub prompt: String,

    /// Maximum number of debate rounds (1-20)
    #[arg(long, short = 'n')]
    pub max_iterations: Option<u32>,

    /// Base URL of the DuoDebate API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Path to a TOML config file (base_url, max_iterations)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the final draft to this markdown file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also write the numbered source list next to the final draft
    #[arg(long)]
    pub sources: bool,

    /// Print the final session state as JSON instead of rendered text
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Use the non-streaming endpoint and wait for the full transcript
    #[arg(long)]
    pub no_stream: bool,
}

/// Derives the sources file path from the draft output path
/// (`debate.md` -> `debate-sources.md`).
pub fn sources_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "debate".to_string());
    let ext = output
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "md".to_string());
    output.with_file_name(format!("{}-sources.{}", stem, ext))
}
