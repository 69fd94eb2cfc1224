//! # Coverage Lens CLI (`covlens`)
//!
//! The `covlens` binary loads a media-coverage archive, classifies every
//! article as published before or after the event's reference date, and
//! prints filtered, chronological views with score summaries.
//!
//! ## Usage
//!
//! ```bash
//! covlens --config ./config/covlens.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `covlens datasets` | List configured datasets and reference dates |
//! | `covlens view <dataset>` | Print a table or timeline view |
//! | `covlens export <dataset>` | Write the view as JSON |
//! | `covlens serve` | Start the JSON HTTP server |
//! | `covlens completions <shell>` | Generate shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # Post-release coverage mentioning protests, as a timeline
//! covlens view Padmaavat_Cleaned.csv --phase post --search protest --mode timeline
//!
//! # Full view as JSON for charting
//! covlens export Animal_Cleaned.csv --output out/animal.json
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use coverage_lens::{config, datasets, export, server, view};
use coverage_lens_core::{DisplayMode, PhaseFilter, ViewState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Coverage Lens: pre/post release analysis of media coverage archives.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, the built-in dataset table is used.
#[derive(Parser)]
#[command(
    name = "covlens",
    about = "Coverage Lens: pre/post release analysis of media coverage archives",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/covlens.toml")]
    config: PathBuf,

    /// Override `[data].root` (local directory or http(s) base URL).
    #[arg(long, global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// View selections shared by `view` and `export`.
#[derive(clap::Args)]
struct ViewArgs {
    /// Phase filter: `all`, `pre`, or `post`.
    #[arg(long, default_value = "all")]
    phase: PhaseFilter,

    /// Case-insensitive substring matched against title and source.
    #[arg(long, default_value = "")]
    search: String,

    /// Display mode: `table` or `timeline`.
    #[arg(long, default_value = "table")]
    mode: DisplayMode,
}

impl ViewArgs {
    fn into_view_state(self) -> ViewState {
        ViewState::new(self.phase, self.search, self.mode)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List configured datasets, reference dates, and data availability.
    Datasets,

    /// Load a dataset and print its filtered view.
    ///
    /// Records are shown in chronological order. In timeline mode a release
    /// divider is printed before the first post-release record.
    View {
        /// Dataset identifier (CSV file name), e.g. `Padmaavat_Cleaned.csv`.
        dataset: String,

        #[command(flatten)]
        view: ViewArgs,

        /// Print the full view as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Export a dataset view as JSON.
    Export {
        /// Dataset identifier (CSV file name).
        dataset: String,

        #[command(flatten)]
        view: ViewArgs,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Start the JSON HTTP server on `[server].bind`.
    Serve,

    /// Generate shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "covlens=info,coverage_lens=info,coverage_lens_core=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "covlens", &mut std::io::stdout());
        return Ok(());
    }

    let mut cfg = config::load_or_builtin(&cli.config)?;
    if let Some(root) = cli.data {
        cfg.data.root = root;
    }

    match cli.command {
        Commands::Datasets => {
            datasets::list_datasets(&cfg)?;
        }
        Commands::View {
            dataset,
            view: args,
            json,
        } => {
            view::run_view(&cfg, &dataset, &args.into_view_state(), json).await?;
        }
        Commands::Export {
            dataset,
            view: args,
            output,
        } => {
            export::run_export(&cfg, &dataset, &args.into_view_state(), output.as_deref()).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
