//! # referentiel
//!
//! Chargement du référentiel des Points de Référence (PR) et parsing des
//! saisies de codes PR.
//!
//! ## Features
//!
//! - Lecture CSV avec nettoyage des champs (espaces, guillemets)
//! - Virgule ou point décimal pour les coordonnées Lambert-93
//! - Politique explicite face aux lignes malformées (abandon ou saut)
//! - Recherche exacte par codes CI/CH, doublons conservés
//!
//! ## Usage
//!
//! ```rust,ignore
//! use referentiel::{load_table, parse_selection, LoadOptions};
//! use std::path::Path;
//!
//! let table = load_table(Path::new("data/TTH_EXPLORER_REFERENTIEL_PR.csv"), &LoadOptions::default())?;
//! let parsed = parse_selection("597120-BA\n142091-AO;Monument");
//! let selection = table.select(&parsed.request.pairs);
//! println!("{} PR trouvés", selection.points.len());
//! ```

pub mod decode;
pub mod error;
pub mod lookup;
pub mod parser;
pub mod types;

pub use error::ReferentielError;
pub use lookup::{find, select, Selection};
pub use parser::selection::{parse_selection, ParsedSelection, RejectedLine, SelectionRequest};
pub use types::{
    LoadOptions, MalformedPolicy, PrKey, ReferencePoint, ReferenceTable, SkippedRow, TextEncoding,
};

use std::path::Path;

use tracing::info;

/// Chemin par défaut du référentiel
pub const DEFAULT_TABLE_PATH: &str = "data/TTH_EXPLORER_REFERENTIEL_PR.csv";

/// Charge le référentiel PR depuis un fichier CSV.
///
/// # Errors
///
/// - `FileNotFound` si le fichier n'existe pas
/// - `MissingColumn` si une colonne obligatoire manque dans l'en-tête
/// - `MalformedRow` à la première ligne invalide, sous la politique `Abort`:
///   aucun PR n'est alors retourné
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<ReferenceTable, ReferentielError> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReferentielError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    let checksum = blake3::hash(&data).to_hex().to_string();
    let (content, encoding) = decode::decode(&data);
    let parsed = parser::table::parse(&content, options)?;

    info!(
        path = %path.display(),
        points = parsed.points.len(),
        skipped = parsed.skipped.len(),
        "Reference table loaded"
    );

    Ok(ReferenceTable {
        points: parsed.points,
        source: path.to_path_buf(),
        checksum,
        encoding,
        skipped: parsed.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table(Path::new("nonexistent/referentiel.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ReferentielError::FileNotFound(_)));
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_load_table_metadata() {
        let path = write_temp(
            "referentiel_lib_metadata.csv",
            b"codeCI,codeCH,libelleCI,XLambert93,YLambert93\n1,A,Pont,652381,6862047\n",
        );

        let table = load_table(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.source(), path.as_path());
        assert_eq!(table.checksum().len(), 64);
        assert_eq!(table.encoding(), TextEncoding::Utf8);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_malformed_yields_no_points() {
        let path = write_temp(
            "referentiel_lib_malformed.csv",
            b"codeCI,codeCH,libelleCI,XLambert93,YLambert93\n1,A,Pont,652381,6862047\n2,B,Gare,abc,6862047\n",
        );

        let err = load_table(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, ReferentielError::MalformedRow { line: 3, .. }));
        assert!(err.is_malformed());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_latin1_file() {
        let path = write_temp(
            "referentiel_lib_latin1.csv",
            b"codeCI,codeCH,libelleCI,XLambert93,YLambert93\n1,A,Ch\xE2teau,652381,6862047\n",
        );

        let table = load_table(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.points()[0].libelle, "Château");
        assert_eq!(table.encoding(), TextEncoding::Windows1252);

        std::fs::remove_file(path).ok();
    }
}
