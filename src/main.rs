use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use duodebate::cli::{sources_path, Args};
use duodebate::client::DebateClient;
use duodebate::config::{FileConfig, Settings};
use duodebate::error::DebateError;
use duodebate::events::DebateRequest;
use duodebate::session::SessionState;
use duodebate::{print_message, DebateSession, SessionUpdate};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if args.no_color {
        colored::control::set_override(false);
    }

    if let Err(err) = run(args).await {
        eprintln!("{} {}", "error:".bright_red().bold(), err);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), DebateError> {
    let file_config = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        args.base_url.as_deref(),
        args.max_iterations,
        &file_config,
    );
    let client = DebateClient::new(&settings.base_url);

    if !client.check_health().await {
        eprintln!(
            "{}",
            "warning: backend API might be offline".bright_yellow()
        );
    }
    if let Some(models) = client.get_config().await {
        println!(
            "{}: {}   {}: {}",
            "PROPOSER".bright_cyan().bold(),
            models.proposer_model,
            "CHALLENGER".bright_magenta().bold(),
            models.challenger_model
        );
    }

    let final_state = if args.no_stream {
        let request = DebateRequest::new(&args.prompt, settings.max_iterations);
        let response = client.debate(&request).await?;
        let state = SessionState::from_response(&args.prompt, response);
        if !args.json {
            for message in &state.transcript {
                print_message(message);
            }
        }
        state
    } else {
        let mut session = DebateSession::new(client);
        // In JSON mode route updates through a channel so nothing but the
        // final state reaches stdout
        let _rx = if args.json {
            let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<SessionUpdate>();
            session.update_tx = Some(tx);
            Some(rx)
        } else {
            None
        };
        session.run(&args.prompt, settings.max_iterations).await?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&final_state)?);
    }

    if let Some(output) = &args.output {
        match &final_state.final_draft {
            Some(draft) => {
                std::fs::write(output, draft)?;
                eprintln!("saved final draft to {}", output.display());
                if args.sources && !final_state.sources.is_empty() {
                    let listing: String = final_state
                        .sources
                        .iter()
                        .enumerate()
                        .map(|(i, s)| format!("{}. {}\n", i + 1, s))
                        .collect();
                    let path = sources_path(output);
                    std::fs::write(&path, format!("# Sources\n\n{}", listing))?;
                    eprintln!("saved sources to {}", path.display());
                }
            }
            None => {
                eprintln!(
                    "{}",
                    "warning: no final draft was produced, nothing to save".bright_yellow()
                );
            }
        }
    }
    Ok(())
}
