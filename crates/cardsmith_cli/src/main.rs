//! CardSmith CLI
//!
//! Project recompute (card data → trait engine → card data)
//! Registry listing and trait token checks

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use cardsmith_core::api::{check_trait_tokens, registry_entries};
#[cfg(feature = "cli")]
use cardsmith_core::traits::TraitLocalizer;
#[cfg(feature = "cli")]
use cardsmith_core::{CardProject, RecomputeSummary, StudioConfig, TraitInput};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use tracing::debug;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "cardsmith")]
#[command(about = "Recompute card traits and stats in CardSmith projects", long_about = None)]
struct Cli {
    /// Debug logging (overrides RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    /// Studio config JSON (overrides CARDSMITH_CONFIG_PATH)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Recompute traits and stats for every card in a project file
    Apply {
        /// Input project JSON path
        #[arg(long)]
        r#in: PathBuf,

        /// Output path (defaults to rewriting the input)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write compact JSON
        #[arg(long, default_value = "false")]
        compact: bool,
    },

    /// List base traits, derived traits and effects
    Traits {
        /// Label locale (en-US, ar)
        #[arg(long)]
        locale: Option<String>,
    },

    /// Show which tokens of a trait string are accepted
    Check {
        /// Trait string, e.g. "human,animal|swordsman"
        tokens: String,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "studio config");

    match cli.command {
        Commands::Apply { r#in, out, compact } => {
            let out = out.unwrap_or_else(|| r#in.clone());
            println!("Recomputing project...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());

            let summary = apply_project(&r#in, &out, &config, !compact && config.pretty_json)?;
            print_summary(&summary);
        }

        Commands::Traits { locale } => {
            let locale = locale.unwrap_or_else(|| config.locale.clone());
            let localizer = TraitLocalizer::for_locale(&locale)
                .with_context(|| format!("Failed to load trait labels for '{}'", locale))?;

            println!(
                "{:<12} {:<16} {:<12} {:<16} {:>6} {:>7}",
                "base", "label", "derived", "label", "atk", "def"
            );
            for entry in registry_entries(&localizer) {
                println!(
                    "{:<12} {:<16} {:<12} {:<16} {:>+6} {:>+7}",
                    entry.id.to_string(),
                    entry.label,
                    entry.derived.to_string(),
                    entry.derived_label,
                    entry.effect.attack,
                    entry.effect.defense
                );
            }
        }

        Commands::Check { tokens } => {
            let check = check_trait_tokens(&TraitInput::from(tokens));
            let accepted: Vec<&str> = check.accepted.iter().map(|t| t.id()).collect();
            println!(
                "Accepted: {}",
                if accepted.is_empty() { "-".to_string() } else { accepted.join(", ") }
            );
            println!(
                "Unknown:  {}",
                if check.unknown.is_empty() { "-".to_string() } else { check.unknown.join(", ") }
            );
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> Result<StudioConfig> {
    match path {
        Some(path) => StudioConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => StudioConfig::from_env().context("Failed to load config from environment"),
    }
}

#[cfg(feature = "cli")]
fn apply_project(
    input: &Path,
    output: &Path,
    config: &StudioConfig,
    pretty: bool,
) -> Result<RecomputeSummary> {
    let mut project = CardProject::load(input)
        .with_context(|| format!("Failed to load project: {}", input.display()))?;
    let summary = project.recompute(config);
    project
        .save(output, pretty)
        .with_context(|| format!("Failed to write project: {}", output.display()))?;
    Ok(summary)
}

#[cfg(feature = "cli")]
fn print_summary(summary: &RecomputeSummary) {
    println!("\nDone");
    println!("   Cards:             {}", summary.total_cards);
    println!("   Cards with traits: {}", summary.cards_with_traits);
    println!("   Traits applied:    {}", summary.total_traits);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is disabled. Enable with: cargo build --features cli");
    std::process::exit(1);
}
