//! Command-line front end.
//!
//! Loads a catalog file (a JSON array of `prompts` rows), resolves a viewer,
//! and prints the ranked grid or the result of a search.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::config::Config;
use crate::core::prompt::Prompt;
use crate::core::search::{self, MatchResult};
use crate::services::access::{AccessPolicy, Profile, Viewer};
use crate::services::catalog::{Catalog, InMemoryFetcher};
use crate::services::format;

#[derive(Parser)]
#[command(name = "prompt-shelf")]
#[command(about = "Rank and search a prompt catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/prompt-shelf/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct SessionArgs {
    /// JSON file with an array of prompt rows
    pub catalog: PathBuf,

    /// Plan of the simulated viewer (free, pro, ultimate)
    #[arg(long, default_value = "ultimate")]
    pub plan: String,

    /// Simulate a viewer with the admin role
    #[arg(long)]
    pub admin: bool,

    /// Record a successful copy of this id before printing (repeatable)
    #[arg(long = "copy", value_name = "ID")]
    pub copies: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the grid in ranked order
    Rank {
        #[command(flatten)]
        session: SessionArgs,
    },

    /// Search the grid
    Search {
        #[command(flatten)]
        session: SessionArgs,

        /// Search text
        query: String,

        /// Type filter: all, image or motion
        #[arg(long, default_value = "all")]
        facet: String,

        /// Print raw match results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load(),
    };

    match cli.command {
        Commands::Rank { session } => {
            let catalog = open_session(&config, &session)?;
            for (position, prompt) in catalog.ranked().into_iter().enumerate() {
                println!("{}", render_card(position + 1, prompt, &config));
            }
        }
        Commands::Search {
            session,
            query,
            facet,
            json,
        } => {
            let catalog = open_session(&config, &session)?;
            let results = catalog.search(&query, &facet);

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_matches(&catalog, &results, &config);
            }
        }
    }

    Ok(())
}

fn load_rows(path: &Path) -> anyhow::Result<Vec<Prompt>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let rows = Prompt::list_from_json(&content)
        .with_context(|| format!("Failed to parse prompts from {}", path.display()))?;
    Ok(rows)
}

fn open_session(config: &Config, args: &SessionArgs) -> anyhow::Result<Catalog> {
    let rows = load_rows(&args.catalog)?;

    let profile = Profile {
        plan: Some(args.plan.clone()),
        role: args.admin.then(|| "admin".to_string()),
    };
    let access = AccessPolicy::new(config.access.clone())
        .resolve(&Viewer::signed_in("cli", Some(profile)));

    // The file stands in for whichever table this viewer is entitled to
    let mut fetcher = match access.catalog {
        Some(ref query) => InMemoryFetcher::new().with_rows(query, rows),
        None => InMemoryFetcher::new(),
    };

    let mut catalog = Catalog::new();
    catalog.refresh(&mut fetcher, &access)?;
    debug!(count = catalog.len(), "catalog ready");

    if !access.shows_catalog() {
        eprintln!("The {} plan has no catalog access.", access.plan.label());
    }

    for id in &args.copies {
        catalog.record_copy(id, &access)?;
    }

    Ok(catalog)
}

fn render_card(position: usize, prompt: &Prompt, config: &Config) -> String {
    let updated = format::format_updated_at(
        prompt.updated_at.as_deref(),
        config.display.utc_offset_minutes,
        &config.display.time_format,
    );

    let mut card = format!(
        "{:>3}. [{}] {} ({})",
        position,
        prompt.facet.badge(),
        prompt.display_title(),
        prompt.id
    );
    if !updated.is_empty() {
        card.push_str(&format!("  Updated: {}", updated));
    }
    card.push_str(&format!(
        "\n     {}",
        prompt.preview(config.display.preview_chars)
    ));
    card
}

fn print_matches(catalog: &Catalog, results: &[MatchResult], config: &Config) {
    let open = &config.search.highlight_open;
    let close = &config.search.highlight_close;

    let order = search::display_order(results);
    if order.is_empty() {
        println!("No prompts match.");
        return;
    }

    for (position, id) in order.into_iter().enumerate() {
        let Some(result) = results.iter().find(|r| r.id == id) else {
            continue;
        };
        let badge = catalog
            .get(id)
            .map(|p| p.facet.badge())
            .unwrap_or_default();

        println!(
            "{:>3}. [{}] tier {} {}",
            position + 1,
            badge,
            result.tier.value(),
            result.highlighted_title.to_html(open, close)
        );
        println!("     {}", result.highlighted_text.to_html(open, close));
    }
}
