//! # jbw-viewer
//!
//! Cartes HTML interactives des Points de Référence (PR) à partir du
//! référentiel Lambert-93.
//!
//! ## Features
//!
//! - Carte de tous les PR (regroupés, limite 1000 par défaut)
//! - Carte d'une sélection de codes avec descriptions (limite 100 par défaut)
//! - Reprojection Lambert-93 → WGS84 via PROJ (feature `reproject`)
//! - Export GeoJSON
//! - Rapport de génération (JSON)
//!
//! ## Usage CLI
//!
//! ```bash
//! # Carte de tous les PR
//! jbw-viewer all
//!
//! # Carte d'une sélection
//! jbw-viewer subset --file codes.txt
//! jbw-viewer codes.txt
//!
//! # Recherche
//! jbw-viewer search --ci 597120
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod map;
pub mod report;
pub mod reproject;
pub mod session;

pub use config::Config;
pub use error::{ErrorKind, ViewerError};
pub use map::{MapDocument, MapMode, MapRenderer};
pub use referentiel::{PrKey, ReferencePoint, ReferenceTable};
pub use report::{GenerationReport, GenerationStatus};
pub use reproject::{CoordinateTransform, GeoPoint, ProjectionError};
pub use session::{GenerateOptions, ReloadOutcome, Session};
