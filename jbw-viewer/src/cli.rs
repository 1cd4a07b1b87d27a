//! Définition et implémentation des commandes CLI
//!
//! - `all`: carte de tous les PR
//! - `subset`: carte des PR saisis
//! - `search`: recherche par codes
//! - `to-geojson`: export GeoJSON (sans carte)
//! - `check`: validation du référentiel

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use jbw_viewer::reproject::{self, Lambert93ToWgs84};
use jbw_viewer::{Config, GenerateOptions, GenerationReport, ReferencePoint, Session};
use referentiel::MalformedPolicy;
use tracing::info;

/// Nombre maximal de résultats affichés par `search`
const SEARCH_DISPLAY_LIMIT: usize = 20;

/// Options communes à toutes les commandes
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    /// Config preset name (default/complete) or path to a JSON config
    #[arg(long, global = true, default_value = "default")]
    pub config: String,

    /// Reference table CSV (défaut : config / env JBW_DATA_PATH)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// Output directory for HTML maps (défaut : config / env JBW_OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Skip malformed rows instead of aborting the load
    #[arg(long, global = true)]
    pub skip_malformed: bool,

    /// Write the generation report as JSON
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the map of all reference points (clustered, hidden by default)
    All {
        /// Maximum number of markers (défaut : 1000)
        #[arg(long)]
        max_markers: Option<usize>,

        /// Output file name inside the output directory
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Generate the map of selected reference points (one CI-CH[;description] per line)
    Subset {
        /// File containing the PR codes
        #[arg(short, long, required_unless_present = "codes", conflicts_with = "codes")]
        file: Option<PathBuf>,

        /// PR codes given inline (e.g. "597120-BA\n142091-AO;Monument")
        #[arg(long)]
        codes: Option<String>,

        /// Maximum number of markers (défaut : 100)
        #[arg(long)]
        max_markers: Option<usize>,

        /// Output file name inside the output directory
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Search reference points by exact codes
    Search {
        /// codeCI
        #[arg(long)]
        ci: Option<String>,

        /// codeCH
        #[arg(long)]
        ch: Option<String>,

        /// Print every result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export reference points to GeoJSON (WGS84)
    ToGeojson {
        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Restrict the export to the PR codes in this file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Load the reference table and report its content
    Check,
}

/// Construit la session: config, surcharges env puis CLI, référentiel chargé
pub fn open_session(args: &SessionArgs) -> Result<Session<Lambert93ToWgs84>> {
    let config = resolve_config(args)?;
    let transform = Lambert93ToWgs84::new().context("Failed to initialize Lambert-93 projection")?;

    let mut session = Session::new(config, transform);
    session.reload().with_context(|| {
        format!(
            "Failed to load reference table: {}",
            session.config().data_path.display()
        )
    })?;

    Ok(session)
}

fn resolve_config(args: &SessionArgs) -> Result<Config> {
    let mut config = Config::resolve(&args.config)?;
    config.apply_env();

    if let Some(ref data) = args.data {
        config.data_path = data.clone();
    }
    if let Some(ref dir) = args.output_dir {
        config.output_dir = dir.clone();
    }
    if args.skip_malformed {
        config.on_malformed = MalformedPolicy::Skip;
    }

    Ok(config)
}

/// Exécute la commande `all`
pub fn cmd_all(args: &SessionArgs, max_markers: Option<usize>, output: Option<String>) -> Result<()> {
    let mut session = open_session(args)?;
    let options = GenerateOptions {
        max_markers,
        file_name: output,
    };

    let report = session.generate_all(&options)?;
    finish(&report, args.report.as_deref())
}

/// Exécute la commande `subset` (et la commande par défaut avec fichier de codes)
pub fn cmd_subset(
    args: &SessionArgs,
    codes: &str,
    max_markers: Option<usize>,
    output: Option<String>,
) -> Result<()> {
    let mut session = open_session(args)?;
    let options = GenerateOptions {
        max_markers,
        file_name: output,
    };

    let report = session.generate_subset(codes, &options)?;
    finish(&report, args.report.as_deref())
}

/// Lit la saisie de codes depuis un fichier ou la ligne de commande
pub fn read_codes(file: Option<&Path>, codes: Option<String>) -> Result<String> {
    match (file, codes) {
        (Some(path), _) => std::fs::read_to_string(path)
            .context(format!("Failed to read codes file: {}", path.display())),
        (None, Some(codes)) => Ok(codes),
        (None, None) => anyhow::bail!("No PR codes given. Use --file or --codes"),
    }
}

/// Exécute la commande `search`
pub fn cmd_search(args: &SessionArgs, ci: Option<&str>, ch: Option<&str>, json: bool) -> Result<()> {
    let ci = ci.map(str::trim).filter(|s| !s.is_empty());
    let ch = ch.map(str::trim).filter(|s| !s.is_empty());
    if ci.is_none() && ch.is_none() {
        anyhow::bail!("At least one of --ci or --ch is required");
    }

    let session = open_session(args)?;
    let results = session.search(ci, ch)?;
    info!(ci = ?ci, ch = ?ch, results = results.len(), "Search");

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", format_search_results(&results, SEARCH_DISPLAY_LIMIT));
    }

    Ok(())
}

/// Résultats de recherche lisibles, limités à `limit` entrées
fn format_search_results(results: &[ReferencePoint], limit: usize) -> String {
    if results.is_empty() {
        return "No result found\n".to_string();
    }

    let mut out = format!("Found {} result(s):\n\n", results.len());
    for pr in results.iter().take(limit) {
        out.push_str(&format!("  {}\n", pr.label()));
        out.push_str(&format!("    Coordinates: X={:.2}, Y={:.2}\n", pr.x, pr.y));
    }
    if results.len() > limit {
        out.push_str(&format!("\n  ... and {} more\n", results.len() - limit));
    }
    out
}

/// Exécute la commande `to-geojson`
pub fn cmd_to_geojson(args: &SessionArgs, output: &Path, file: Option<&Path>) -> Result<()> {
    let session = open_session(args)?;
    let codes = file.map(|f| read_codes(Some(f), None)).transpose()?;

    let count = session.export_geojson(codes.as_deref(), output)?;
    println!("Export complete: {} PR to {} (EPSG:4326)", count, output.display());

    Ok(())
}

/// Exécute la commande `check`
pub fn cmd_check(args: &SessionArgs) -> Result<()> {
    let session = open_session(args)?;
    let table = session
        .table()
        .context("Reference table not loaded")?;

    println!("=== Reference table ===");
    println!("Path: {}", table.source().display());
    println!("Encoding: {:?}", table.encoding());
    println!("Checksum: {}", table.checksum());
    println!("Points: {}", table.len());
    println!("Skipped rows: {}", table.skipped().len());
    println!(
        "Reprojection: {}",
        if reproject::is_available() { "PROJ" } else { "unavailable" }
    );
    for row in table.skipped().iter().take(SEARCH_DISPLAY_LIMIT) {
        println!("  line {}: {}", row.line, row.reason);
    }
    if table.skipped().len() > SEARCH_DISPLAY_LIMIT {
        println!("  ... and {} more", table.skipped().len() - SEARCH_DISPLAY_LIMIT);
    }

    Ok(())
}

fn finish(report: &GenerationReport, report_path: Option<&Path>) -> Result<()> {
    report.display();

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .context(format!("Failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "Report saved");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(i: usize) -> ReferencePoint {
        ReferencePoint {
            code_ci: format!("{}", 597120 + i),
            code_ch: "BA".to_string(),
            libelle: "Gare".to_string(),
            x: 652381.256,
            y: 6862047.0,
        }
    }

    #[test]
    fn test_format_search_results() {
        let out = format_search_results(&[pr(0)], 20);
        assert!(out.starts_with("Found 1 result(s):"));
        assert!(out.contains("597120-BA: Gare"));
        assert!(out.contains("X=652381.26, Y=6862047.00"));
    }

    #[test]
    fn test_format_search_results_limit() {
        let results: Vec<_> = (0..25).map(pr).collect();
        let out = format_search_results(&results, 20);
        assert!(out.contains("597139-BA"));
        assert!(!out.contains("597140-BA"));
        assert!(out.contains("... and 5 more"));
    }

    #[test]
    fn test_format_search_results_empty() {
        assert_eq!(format_search_results(&[], 20), "No result found\n");
    }

    #[test]
    fn test_read_codes() {
        assert_eq!(read_codes(None, Some("1-A".to_string())).unwrap(), "1-A");
        assert!(read_codes(None, None).is_err());
        assert!(read_codes(Some(Path::new("/nonexistent/codes.txt")), None).is_err());
    }

    #[test]
    fn test_resolve_config_cli_overrides() {
        let args = SessionArgs {
            config: "default".to_string(),
            data: Some(PathBuf::from("autre.csv")),
            output_dir: None,
            skip_malformed: true,
            report: None,
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.data_path, PathBuf::from("autre.csv"));
        assert_eq!(config.on_malformed, MalformedPolicy::Skip);
    }
}
