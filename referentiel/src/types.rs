//! Types de données pour le crate referentiel

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Un Point de Référence (une ligne du référentiel)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferencePoint {
    /// Code d'identification CI (colonne `codeCI`)
    #[serde(rename = "codeCI")]
    pub code_ci: String,

    /// Code d'identification CH (colonne `codeCH`)
    #[serde(rename = "codeCH")]
    pub code_ch: String,

    /// Libellé descriptif (colonne `libelleCI`)
    #[serde(rename = "libelleCI")]
    pub libelle: String,

    /// Abscisse Lambert-93 en mètres
    #[serde(rename = "XLambert93")]
    pub x: f64,

    /// Ordonnée Lambert-93 en mètres
    #[serde(rename = "YLambert93")]
    pub y: f64,
}

impl ReferencePoint {
    /// Clé naturelle (codeCI, codeCH), non unique
    pub fn key(&self) -> PrKey {
        PrKey::new(&self.code_ci, &self.code_ch)
    }

    /// Vrai si le point porte exactement cette clé
    pub fn has_key(&self, key: &PrKey) -> bool {
        self.code_ci == key.code_ci && self.code_ch == key.code_ch
    }

    /// Libellé lisible: `CI-CH: libellé`
    pub fn label(&self) -> String {
        format!("{}-{}: {}", self.code_ci, self.code_ch, self.libelle)
    }
}

/// Clé d'un PR: couple (codeCI, codeCH)
///
/// La forme affichée `CI-CH` sert aussi de clé pour les annotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PrKey {
    #[serde(rename = "codeCI")]
    pub code_ci: String,
    #[serde(rename = "codeCH")]
    pub code_ch: String,
}

impl PrKey {
    pub fn new(code_ci: impl Into<String>, code_ch: impl Into<String>) -> Self {
        Self {
            code_ci: code_ci.into(),
            code_ch: code_ch.into(),
        }
    }
}

impl fmt::Display for PrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.code_ci, self.code_ch)
    }
}

/// Politique face à une ligne malformée
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// La première ligne malformée interrompt le chargement (aucun PR retenu)
    #[default]
    Abort,
    /// La ligne est ignorée et consignée dans `ReferenceTable::skipped`
    Skip,
}

impl std::str::FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            _ => Err(format!("Invalid malformed-row policy: {}. Use: abort, skip", s)),
        }
    }
}

/// Options de chargement du référentiel
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Séparateur de champs; `None` = détection sur la ligne d'en-tête
    pub delimiter: Option<u8>,

    /// Politique face aux lignes malformées
    pub on_malformed: MalformedPolicy,
}

impl LoadOptions {
    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// Encodage détecté du fichier source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextEncoding {
    Utf8,
    /// Repli pour les exports de tableurs qui ne sont pas en UTF-8
    Windows1252,
}

/// Ligne ignorée sous la politique `Skip`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// Numéro de ligne dans le fichier (1 = en-tête)
    pub line: u64,
    pub reason: String,
}

/// Référentiel chargé: ensemble ordonné et immuable de PR
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    pub(crate) points: Vec<ReferencePoint>,
    pub(crate) source: PathBuf,
    pub(crate) checksum: String,
    pub(crate) encoding: TextEncoding,
    pub(crate) skipped: Vec<SkippedRow>,
}

impl ReferenceTable {
    /// Construit un référentiel en mémoire (sans fichier source)
    pub fn from_points(points: Vec<ReferencePoint>) -> Self {
        Self {
            points,
            source: PathBuf::new(),
            checksum: String::new(),
            encoding: TextEncoding::Utf8,
            skipped: Vec::new(),
        }
    }

    /// Tous les PR, dans l'ordre de chargement
    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Chemin du fichier source
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Empreinte BLAKE3 (hex) du fichier source
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Lignes ignorées (toujours vide sous la politique `Abort`)
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }
}
