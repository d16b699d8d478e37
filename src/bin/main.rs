//! # tagman
//!
//! Curates image/caption training sets: every `name.png` is paired with a
//! `name.txt` caption of comma separated tags, and every caption leads with
//! the corpus trigger word.
//!
//! ```bash
//! tagman edit ./dataset
//! tagman tags ./dataset --prefix blue --json
//! tagman normalize ./dataset
//! tagman apply ./dataset "smile"
//! tagman apply ./dataset "smile" --remove
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tagman::config::{Config, OnboardingPolicy, DEFAULT_CONFIG_FILE};
use tagman::session::{CuratorSession, SessionOptions, SessionOutcome, TerminalPrompt};
use tagman::{Dataset, FixedDecision, OnboardingDecision, Target};
use tracing::info;

#[derive(Parser)]
#[command(name = "tagman", version, about = "Caption and tag curation for image training sets")]
struct Cli {
    /// Path to a TOML config file (defaults to `tagman.toml` in the dataset root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the dataset and edit captions interactively
    Edit {
        dir: PathBuf,
    },
    /// List tags in use with the number of captions carrying each
    Tags {
        dir: PathBuf,
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long)]
        json: bool,
    },
    /// Enforce the trigger word on every caption and write the result
    Normalize {
        dir: PathBuf,
    },
    /// Add a tag to (or remove it from) every caption and write the result
    Apply {
        dir: PathBuf,
        tag: String,
        #[arg(long)]
        remove: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tagman=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Edit { dir } => {
            let config = load_config(cli.config.as_deref(), dir)?;
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut stdout = io::stdout();
            let mut dataset = open_dataset(dir, &config, &mut input, &mut stdout)?;

            let options = SessionOptions::from(&config.editor);
            let mut session = CuratorSession::new(&mut dataset, input, stdout, options);
            match session.run()? {
                SessionOutcome::Saved(n) => println!("\nSaved {n} captions."),
                SessionOutcome::Aborted => println!("\nQuit without saving."),
            }
        }
        Commands::Tags { dir, prefix, json } => {
            let config = load_config(cli.config.as_deref(), dir)?;
            let dataset = open_with_stdio(dir, &config)?;
            let counts = dataset.tag_counts(prefix);
            if *json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                let mut stdout = io::stdout().lock();
                for entry in counts {
                    let marker = if Some(entry.tag.as_str()) == dataset.trigger_word() { " (trigger)" } else { "" };
                    writeln!(stdout, "{:>6}  {}{}", entry.count, entry.tag, marker)?;
                }
            }
        }
        Commands::Normalize { dir } => {
            let config = load_config(cli.config.as_deref(), dir)?;
            let dataset = open_with_stdio(dir, &config)?;
            let saved = dataset.save().context("Failed to save captions")?;
            info!(
                "Trigger word '{}' enforced on {} captions",
                dataset.trigger_word().unwrap_or_default(),
                saved
            );
        }
        Commands::Apply { dir, tag, remove } => {
            let config = load_config(cli.config.as_deref(), dir)?;
            let mut dataset = open_with_stdio(dir, &config)?;
            let changed = if *remove {
                dataset.remove_tag_from_image_caption(tag, Target::All)?
            } else {
                dataset.add_tag_to_image_caption(tag, Target::All)?
            };
            dataset.save().context("Failed to save captions")?;
            info!("{} captions changed", changed);
        }
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<Config> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dir.join(DEFAULT_CONFIG_FILE));
    Config::load_or_default(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Opens the dataset for the batch subcommands. Onboarding questions go to
/// stderr so that stdout carries only the command's own output.
fn open_with_stdio(dir: &Path, config: &Config) -> Result<Dataset> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stderr = io::stderr();
    open_dataset(dir, config, &mut input, &mut stderr)
}

fn open_dataset<R, W>(dir: &Path, config: &Config, input: &mut R, output: &mut W) -> Result<Dataset>
where
    R: io::BufRead,
    W: Write,
{
    let dataset = match config.onboarding.policy {
        OnboardingPolicy::Ask => {
            let mut prompt = TerminalPrompt::new(input, output);
            Dataset::open(dir, &config.dataset, &mut prompt)
        }
        OnboardingPolicy::ConfirmAll => {
            Dataset::open(dir, &config.dataset, &mut FixedDecision(OnboardingDecision::Confirm))
        }
        OnboardingPolicy::DeclineAll => {
            Dataset::open(dir, &config.dataset, &mut FixedDecision(OnboardingDecision::Decline))
        }
    };
    dataset.with_context(|| format!("Failed to open dataset at {}", dir.display()))
}
