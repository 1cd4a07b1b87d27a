//! Point d'entrée CLI pour jbw-viewer

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::{Commands, SessionArgs};

/// Générer des cartes interactives des Points de Référence
#[derive(Parser)]
#[command(name = "jbw-viewer")]
#[command(author, version)]
#[command(about = "Générer des cartes HTML des Points de Référence (tous les PR ou une sélection)")]
#[command(long_about = "Visionneuse du référentiel des Points de Référence (Lambert-93).\n\nSans sous-commande: génère la carte de tous les PR, ou la carte des codes d'un fichier passé en argument.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    session: SessionArgs,

    /// Sous-commande (défaut: carte de tous les PR)
    #[command(subcommand)]
    command: Option<Commands>,

    /// Fichier de codes PR: génère directement la carte de la sélection
    codes_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    let args = &cli.session;
    match cli.command {
        Some(Commands::All { max_markers, output }) => {
            cli::cmd_all(args, max_markers, output)?;
        }
        Some(Commands::Subset {
            file,
            codes,
            max_markers,
            output,
        }) => {
            let codes = cli::read_codes(file.as_deref(), codes)?;
            cli::cmd_subset(args, &codes, max_markers, output)?;
        }
        Some(Commands::Search { ci, ch, json }) => {
            cli::cmd_search(args, ci.as_deref(), ch.as_deref(), json)?;
        }
        Some(Commands::ToGeojson { output, file }) => {
            info!(output = %output.display(), "Export vers GeoJSON");
            cli::cmd_to_geojson(args, &output, file.as_deref())?;
        }
        Some(Commands::Check) => {
            cli::cmd_check(args)?;
        }
        None => match cli.codes_file {
            Some(path) => {
                // Commande par défaut avec fichier: carte auto-générée
                info!(path = %path.display(), "Carte depuis un fichier de codes");
                let codes = cli::read_codes(Some(path.as_path()), None)?;
                let file_name = jbw_viewer::Config::resolve(&args.config)?.files.auto;
                cli::cmd_subset(args, &codes, None, Some(file_name))?;
            }
            None => {
                cli::cmd_all(args, None, None)?;
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
