//! Rapport de génération
//!
//! Un rapport neuf est produit à chaque génération de carte: codes demandés,
//! lignes rejetées, codes absents du référentiel, marqueurs rendus.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use referentiel::{PrKey, ReferenceTable, RejectedLine};
use serde::Serialize;

use crate::map::MapMode;

/// Statut global de la génération
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GenerationStatus {
    /// Tous les codes ont été trouvés
    Success,
    /// Carte générée malgré des lignes rejetées ou des codes absents
    PartialSuccess,
}

/// Rapport complet d'une génération
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub mode: MapMode,
    /// Fichier HTML écrit
    pub document: PathBuf,
    /// Durée de la génération
    pub duration_secs: f64,
    /// Statut global
    pub status: GenerationStatus,

    // Référentiel utilisé
    pub source: PathBuf,
    pub source_checksum: String,
    pub table_size: usize,
    pub skipped_rows: usize,

    // Compteurs
    /// Nombre de codes demandés (taille du référentiel en mode `All`)
    pub requested: usize,
    /// Nombre de PR trouvés (doublons compris)
    pub found: usize,
    /// Nombre de marqueurs rendus
    pub rendered: usize,
    /// Nombre de PR avant application de la limite
    pub truncated_from: Option<usize>,

    /// Lignes de saisie rejetées
    pub rejected: Vec<RejectedLine>,
    /// Codes absents du référentiel
    pub missing: Vec<PrKey>,
}

impl GenerationReport {
    /// Crée un rapport pour un mode et un référentiel
    pub fn new(mode: MapMode, table: &ReferenceTable) -> Self {
        Self {
            mode,
            document: PathBuf::new(),
            duration_secs: 0.0,
            status: GenerationStatus::Success,
            source: table.source().to_path_buf(),
            source_checksum: table.checksum().to_string(),
            table_size: table.len(),
            skipped_rows: table.skipped().len(),
            requested: 0,
            found: 0,
            rendered: 0,
            truncated_from: None,
            rejected: Vec::new(),
            missing: Vec::new(),
        }
    }

    /// Définit la durée de la génération
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.rejected.is_empty() && self.missing.is_empty() {
            GenerationStatus::Success
        } else {
            GenerationStatus::PartialSuccess
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("MAP REPORT - {}", self.mode.as_str());
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Document: {}", self.document.display());

        println!("\n--- SUMMARY ---");
        println!(
            "Reference table: {} PR ({} skipped rows) from {}",
            self.table_size,
            self.skipped_rows,
            self.source.display()
        );
        println!(
            "Markers: {} requested, {} found, {} rendered",
            self.requested, self.found, self.rendered
        );
        if let Some(available) = self.truncated_from {
            println!("Limit applied: first {} of {}", self.rendered, available);
        }

        if !self.rejected.is_empty() {
            println!("\n--- REJECTED LINES ({}) ---", self.rejected.len());
            for line in self.rejected.iter().take(20) {
                println!("  {}", line);
            }
            if self.rejected.len() > 20 {
                println!("  ... and {} more", self.rejected.len() - 20);
            }
        }

        if !self.missing.is_empty() {
            println!("\n--- MISSING CODES ({}) ---", self.missing.len());
            for key in self.missing.iter().take(20) {
                println!("  {}", key);
            }
            if self.missing.len() > 20 {
                println!("  ... and {} more", self.missing.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} rendered, {} found, {} missing, {} rejected",
            self.mode.as_str(),
            self.rendered,
            self.found,
            self.missing.len(),
            self.rejected.len()
        )
    }
}
