//! Types d'erreurs pour le crate referentiel

use std::path::PathBuf;

use thiserror::Error;

/// Erreurs pouvant survenir lors du chargement du référentiel PR
#[derive(Debug, Error)]
pub enum ReferentielError {
    /// Fichier du référentiel absent
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Colonne obligatoire absente de l'en-tête
    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    /// Ligne illisible (coordonnée non numérique, champ manquant)
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// Erreur d'I/O lors de la lecture du fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur du lecteur CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ReferentielError {
    /// Crée une erreur de ligne malformée avec contexte
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }

    /// Crée une erreur de colonne manquante
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Vrai si l'erreur concerne le contenu du fichier (et non son absence)
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MissingColumn { .. } | Self::MalformedRow { .. } | Self::Csv(_)
        )
    }
}
