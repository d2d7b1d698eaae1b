// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Private Forge — combine images and PDFs into a single PDF, locally.
//
// Entry point. Initialises logging, parses the command line and dispatches to
// the command implementations in `commands`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use forge_core::{PageGeometry, SettingsStore};

#[derive(Parser)]
#[command(name = "forge", about = "Combine images and PDFs into one PDF", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge images and PDFs, in the order given, into one PDF
    Combine {
        /// Input files (.jpg, .jpeg, .png, .pdf, ...)
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,

        /// Output PDF file (default: combined-files-<date>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page size for image entries
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// JPEG quality for re-encoded images (clamped to 1-100)
        #[arg(long, allow_negative_numbers = true)]
        quality: Option<i64>,

        /// Re-encode images as JPEG before embedding
        #[arg(long, conflicts_with = "no_compress")]
        compress: bool,

        /// Embed images as they are
        #[arg(long)]
        no_compress: bool,

        /// Decode and re-encode entries in parallel
        #[arg(long)]
        concurrent: bool,
    },

    /// Print the page count of each PDF
    Pages {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },

    /// Inspect or change the remembered defaults
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current defaults
    Show,
    /// Restore the built-in defaults
    Reset,
    /// Change one or more defaults
    Set {
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        #[arg(long, allow_negative_numbers = true)]
        quality: Option<i64>,

        /// true or false
        #[arg(long)]
        compress: Option<bool>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
    Legal,
    A3,
    A5,
    Tabloid,
    #[value(alias = "original")]
    OriginalSize,
}

impl From<PaperArg> for PageGeometry {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::A3 => Self::A3,
            PaperArg::A5 => Self::A5,
            PaperArg::Tabloid => Self::Tabloid,
            PaperArg::OriginalSize => Self::OriginalSize,
        }
    }
}

/// `Some(true)` for `--compress`, `Some(false)` for `--no-compress`.
fn compress_flag(compress: bool, no_compress: bool) -> Option<bool> {
    match (compress, no_compress) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SettingsStore::default_location();

    let result = match cli.command {
        Commands::Combine {
            files,
            output,
            paper,
            quality,
            compress,
            no_compress,
            concurrent,
        } => {
            let overrides = commands::Overrides {
                page_geometry: paper.map(PageGeometry::from),
                quality,
                compress: compress_flag(compress, no_compress),
            };
            commands::combine(&store, files, output, overrides, concurrent).await
        }
        Commands::Pages { files } => commands::pages(&files).await,
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings_show(&store),
            SettingsAction::Reset => commands::settings_reset(&store),
            SettingsAction::Set {
                paper,
                quality,
                compress,
            } => commands::settings_set(
                &store,
                commands::Overrides {
                    page_geometry: paper.map(PageGeometry::from),
                    quality,
                    compress,
                },
            ),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            commands::report(&err);
            ExitCode::FAILURE
        }
    }
}
