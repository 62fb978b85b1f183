mod images;
mod inspect;
mod output;
mod posts;
mod runs;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::runs::{parse_named_source, NamedSource};

#[derive(Debug, Parser)]
#[command(name = "sift")]
#[command(about = "Filter, classify and deduplicate captured media feeds")]
struct Cli {
    /// Findings directory; defaults to `SIFT_OUTPUT_DIR`.
    #[arg(long, global = true, value_name = "DIR")]
    out: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay image discovery feeds, one JSON array of candidates per line.
    Images {
        /// Category and feed file, e.g. `"desk setup=feeds/desk.jsonl"`. Repeatable.
        #[arg(long = "feed", value_name = "CATEGORY=PATH", required = true, value_parser = parse_named_source)]
        feeds: Vec<NamedSource>,
        /// Stop each category after this many accepted images.
        #[arg(long)]
        target: Option<usize>,
    },
    /// Extract slideshow posts and hooks from captured profile pages or payloads.
    Posts {
        /// Profile name and capture file (HTML, JSON or JSON lines). Repeatable.
        #[arg(long = "profile", value_name = "NAME=PATH", required = true, value_parser = parse_named_source)]
        profiles: Vec<NamedSource>,
        #[arg(long)]
        target: Option<usize>,
        /// Keep single-image and video posts as well.
        #[arg(long)]
        include_single: bool,
    },
    /// Print the hook, classification, analysis and components of a caption.
    Hook {
        text: String,
        #[arg(long)]
        max_length: Option<usize>,
    },
    /// Classify a pixel size against the aspect-ratio catalog.
    Classify { width: u32, height: u32 },
    /// Canonicalize a media URL or report why it was rejected.
    Normalize { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = sift_core::load_sift_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.app.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(
        env = %config.app.env,
        config_path = %config.app.config_path.display(),
        "configuration loaded"
    );

    if let Some(out) = cli.out {
        config.app.output_dir = out;
    }

    match cli.command {
        Some(Commands::Images { feeds, target }) => {
            if let Some(n) = target {
                config.pipeline.target_count = n;
            }
            sift_core::validate_pipeline(&config.pipeline)?;
            images::run_images(&config, feeds).await?;
        }
        Some(Commands::Posts {
            profiles,
            target,
            include_single,
        }) => {
            if let Some(n) = target {
                config.pipeline.target_count = n;
            }
            if include_single {
                config.pipeline.slideshows_only = false;
            }
            sift_core::validate_pipeline(&config.pipeline)?;
            posts::run_posts(&config, profiles).await?;
        }
        Some(Commands::Hook { text, max_length }) => {
            let max_length = max_length.unwrap_or(config.pipeline.hook_max_length);
            inspect::print_hook(&text, max_length)?;
        }
        Some(Commands::Classify { width, height }) => {
            inspect::print_classification(&config.pipeline, width, height)?;
        }
        Some(Commands::Normalize { url }) => {
            inspect::print_normalized(&config.pipeline, &url)?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
