//! Types d'erreurs pour jbw-viewer

use referentiel::{RejectedLine, ReferentielError};
use thiserror::Error;

use crate::reproject::ProjectionError;

/// Erreurs pouvant survenir lors de la génération d'une carte
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Chargement du référentiel impossible (fichier absent ou malformé)
    #[error(transparent)]
    Referentiel(#[from] ReferentielError),

    /// Conversion Lambert-93 → WGS84 impossible
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Aucune ligne de la saisie n'est un code PR valide
    #[error("No valid PR code in selection ({} invalid lines)", .rejected.len())]
    EmptySelection { rejected: Vec<RejectedLine> },

    /// Codes valides mais absents du référentiel
    #[error("No PR found in the reference table for the {requested} requested codes")]
    NoMatch { requested: usize },

    /// Génération demandée avant chargement du référentiel
    #[error("Reference table not loaded")]
    NotLoaded,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Nature d'une erreur, pour brancher sans comparer de messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    /// Ligne malformée ou colonne manquante
    MalformedRow,
    ProjectionError,
    EmptySelection,
    NoMatch,
    NotLoaded,
    Io,
}

impl ViewerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Referentiel(ReferentielError::FileNotFound(_)) => ErrorKind::FileNotFound,
            Self::Referentiel(ReferentielError::Io(_)) => ErrorKind::Io,
            Self::Referentiel(_) => ErrorKind::MalformedRow,
            Self::Projection(_) => ErrorKind::ProjectionError,
            Self::EmptySelection { .. } => ErrorKind::EmptySelection,
            Self::NoMatch { .. } => ErrorKind::NoMatch,
            Self::NotLoaded => ErrorKind::NotLoaded,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}
