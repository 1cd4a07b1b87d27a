//! Session: référentiel chargé, configuration et dernière carte générée
//!
//! Les transitions sont explicites: `reload()` remplace le référentiel,
//! `generate_*()` produit une carte et un rapport neuf.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use referentiel::{load_table, parse_selection, ReferencePoint, ReferenceTable};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ViewerError;
use crate::export::geojson::export_to_geojson;
use crate::map::{self, LeafletRenderer, MapDocument, MapMode};
use crate::report::GenerationReport;
use crate::reproject::CoordinateTransform;

/// Résultat d'un rechargement du référentiel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadOutcome {
    /// Nombre de PR chargés
    pub points: usize,
    /// Lignes ignorées (politique `skip`)
    pub skipped: usize,
    pub checksum: String,
    /// Vrai si le fichier a changé depuis le chargement précédent
    pub changed: bool,
}

/// Options d'une génération
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Limite de marqueurs; `None` = limite configurée pour le mode
    pub max_markers: Option<usize>,
    /// Nom du fichier HTML; `None` = nom configuré pour le mode
    pub file_name: Option<String>,
}

/// Session de la visionneuse
pub struct Session<T: CoordinateTransform> {
    config: Config,
    transform: T,
    renderer: LeafletRenderer,
    table: Option<Arc<ReferenceTable>>,
    last_document: Option<PathBuf>,
}

impl<T: CoordinateTransform> Session<T> {
    /// Crée une session sans référentiel chargé
    pub fn new(config: Config, transform: T) -> Self {
        let renderer = LeafletRenderer::new(config.map.clone());
        Self {
            config,
            transform,
            renderer,
            table: None,
            last_document: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Référentiel chargé, partagé en lecture
    pub fn table(&self) -> Option<Arc<ReferenceTable>> {
        self.table.clone()
    }

    /// Dernière carte écrite
    pub fn last_document(&self) -> Option<&Path> {
        self.last_document.as_deref()
    }

    /// Recharge le référentiel depuis `config.data_path`
    ///
    /// En cas d'échec la session ne conserve aucun référentiel.
    pub fn reload(&mut self) -> Result<ReloadOutcome, ViewerError> {
        let previous = self.table.take().map(|t| t.checksum().to_string());

        let table = match load_table(&self.config.data_path, &self.config.load_options()) {
            Ok(table) => table,
            Err(e) => {
                error!(path = %self.config.data_path.display(), error = %e, "Reference table load failed");
                return Err(e.into());
            }
        };

        let outcome = ReloadOutcome {
            points: table.len(),
            skipped: table.skipped().len(),
            checksum: table.checksum().to_string(),
            changed: previous.as_deref() != Some(table.checksum()),
        };

        info!(
            points = outcome.points,
            skipped = outcome.skipped,
            changed = outcome.changed,
            "Reference table ready"
        );
        self.table = Some(Arc::new(table));
        Ok(outcome)
    }

    fn loaded(&self) -> Result<Arc<ReferenceTable>, ViewerError> {
        self.table.clone().ok_or(ViewerError::NotLoaded)
    }

    /// Recherche exacte par codes; aucun code = tous les PR
    pub fn search(
        &self,
        code_ci: Option<&str>,
        code_ch: Option<&str>,
    ) -> Result<Vec<ReferencePoint>, ViewerError> {
        let table = self.loaded()?;
        Ok(table.find(code_ci, code_ch).into_iter().cloned().collect())
    }

    /// Carte de tous les PR
    pub fn generate_all(&mut self, options: &GenerateOptions) -> Result<GenerationReport, ViewerError> {
        let started = Instant::now();
        let table = self.loaded()?;
        let cap = options.max_markers.unwrap_or(self.config.limits.all);
        let file_name = options
            .file_name
            .clone()
            .unwrap_or_else(|| self.config.files.all.clone());

        let document = map::render_all(table.points(), cap, &self.transform, &self.renderer)?;
        let path = self.write_document(&document, &file_name)?;

        let mut report = GenerationReport::new(MapMode::All, &table);
        report.document = path;
        report.requested = table.len();
        report.found = table.len();
        report.rendered = document.marker_count;
        report.truncated_from = document.truncated_from;
        report.set_duration(started.elapsed());
        report.finalize();

        info!("{}", report.summary());
        Ok(report)
    }

    /// Carte des PR saisis (`CI-CH[;description]` par ligne)
    pub fn generate_subset(
        &mut self,
        text: &str,
        options: &GenerateOptions,
    ) -> Result<GenerationReport, ViewerError> {
        let started = Instant::now();
        let parsed = parse_selection(text);
        for line in &parsed.rejected {
            warn!(line = line.line, content = %line.content, "Invalid PR code line");
        }

        if parsed.request.is_empty() {
            return Err(ViewerError::EmptySelection {
                rejected: parsed.rejected,
            });
        }

        let table = self.loaded()?;
        let selection = table.select(&parsed.request.pairs);
        if selection.is_empty() {
            return Err(ViewerError::NoMatch {
                requested: parsed.request.pairs.len(),
            });
        }
        for key in &selection.missing {
            warn!(code = %key, "PR code not found in reference table");
        }

        let cap = options.max_markers.unwrap_or(self.config.limits.subset);
        let file_name = options
            .file_name
            .clone()
            .unwrap_or_else(|| self.config.files.subset.clone());

        let document = map::render_subset(
            &selection.points,
            &parsed.request.annotations,
            cap,
            &self.transform,
            &self.renderer,
        )?;
        let path = self.write_document(&document, &file_name)?;

        let mut report = GenerationReport::new(MapMode::Subset, &table);
        report.document = path;
        report.requested = parsed.request.pairs.len();
        report.found = selection.points.len();
        report.rendered = document.marker_count;
        report.truncated_from = document.truncated_from;
        report.rejected = parsed.rejected;
        report.missing = selection.missing;
        report.set_duration(started.elapsed());
        report.finalize();

        info!("{}", report.summary());
        Ok(report)
    }

    /// Exporte en GeoJSON tous les PR, ou ceux d'une saisie de codes
    ///
    /// Aucune limite de marqueurs n'est appliquée. Retourne le nombre de features.
    pub fn export_geojson(&self, selection: Option<&str>, output: &Path) -> Result<usize, ViewerError> {
        let table = self.loaded()?;

        let plan = match selection {
            None => map::plan_all(table.points(), usize::MAX, &self.transform)?,
            Some(text) => {
                let parsed = parse_selection(text);
                if parsed.request.is_empty() {
                    return Err(ViewerError::EmptySelection {
                        rejected: parsed.rejected,
                    });
                }
                let selected = table.select(&parsed.request.pairs);
                if selected.is_empty() {
                    return Err(ViewerError::NoMatch {
                        requested: parsed.request.pairs.len(),
                    });
                }
                map::plan_subset(
                    &selected.points,
                    &parsed.request.annotations,
                    usize::MAX,
                    &self.transform,
                )?
            }
        };

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        export_to_geojson(&plan.markers, output)?;

        info!(path = %output.display(), features = plan.markers.len(), "GeoJSON written");
        Ok(plan.markers.len())
    }

    fn write_document(&mut self, document: &MapDocument, file_name: &str) -> Result<PathBuf, ViewerError> {
        std::fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join(file_name);
        document.save(&path)?;
        self.last_document = Some(path.clone());
        Ok(path)
    }
}
