//! Reprojection Lambert-93 (EPSG:2154) → WGS84 (EPSG:4326) avec PROJ
//!
//! L'implémentation PROJ est disponible uniquement avec le feature `reproject`.

use serde::Serialize;
use thiserror::Error;

/// Lambert-93
pub const SOURCE_EPSG: u32 = 2154;
/// WGS84
pub const TARGET_EPSG: u32 = 4326;

/// Position géographique WGS84 en degrés
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

/// Erreurs de reprojection
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Failed to create projection from EPSG:{source_epsg} to EPSG:{target_epsg}: {reason}")]
    Setup {
        source_epsg: u32,
        target_epsg: u32,
        reason: String,
    },

    #[error("Coordinate transformation failed for ({x}, {y}): {reason}")]
    Transform { x: f64, y: f64, reason: String },
}

/// Conversion de coordonnées projetées vers géographiques
pub trait CoordinateTransform {
    fn project(&self, x: f64, y: f64) -> Result<GeoPoint, ProjectionError>;
}

/// Vérifie si la reprojection est disponible
pub fn is_available() -> bool {
    cfg!(feature = "reproject")
}

#[cfg(feature = "reproject")]
use proj::Proj;

/// Transformation Lambert-93 → WGS84 (les deux sens)
#[cfg(feature = "reproject")]
pub struct Lambert93ToWgs84 {
    forward: Proj,
    inverse: Proj,
}

#[cfg(feature = "reproject")]
impl Lambert93ToWgs84 {
    /// Initialise les deux transformations PROJ (une seule fois)
    pub fn new() -> Result<Self, ProjectionError> {
        Ok(Self {
            forward: create_proj(SOURCE_EPSG, TARGET_EPSG)?,
            inverse: create_proj(TARGET_EPSG, SOURCE_EPSG)?,
        })
    }

    /// WGS84 → Lambert-93, retourne (x, y)
    pub fn unproject(&self, point: GeoPoint) -> Result<(f64, f64), ProjectionError> {
        // PROJ normalise l'ordre des axes: (lon, lat)
        self.inverse
            .convert((point.lon, point.lat))
            .map_err(|e| ProjectionError::Transform {
                x: point.lon,
                y: point.lat,
                reason: e.to_string(),
            })
    }
}

#[cfg(feature = "reproject")]
impl CoordinateTransform for Lambert93ToWgs84 {
    fn project(&self, x: f64, y: f64) -> Result<GeoPoint, ProjectionError> {
        let (lon, lat) = self
            .forward
            .convert((x, y))
            .map_err(|e| ProjectionError::Transform {
                x,
                y,
                reason: e.to_string(),
            })?;

        if !lon.is_finite() || !lat.is_finite() {
            return Err(ProjectionError::Transform {
                x,
                y,
                reason: "result outside the projection domain".to_string(),
            });
        }

        Ok(GeoPoint { lat, lon })
    }
}

#[cfg(feature = "reproject")]
fn create_proj(source_epsg: u32, target_epsg: u32) -> Result<Proj, ProjectionError> {
    let source = format!("EPSG:{}", source_epsg);
    let target = format!("EPSG:{}", target_epsg);

    Proj::new_known_crs(&source, &target, None).map_err(|e| ProjectionError::Setup {
        source_epsg,
        target_epsg,
        reason: e.to_string(),
    })
}


/// Transformation factice - pas de reprojection disponible
#[cfg(not(feature = "reproject"))]
pub struct Lambert93ToWgs84;

#[cfg(not(feature = "reproject"))]
impl Lambert93ToWgs84 {
    /// Échoue toujours sans la feature
    pub fn new() -> Result<Self, ProjectionError> {
        Err(ProjectionError::Setup {
            source_epsg: SOURCE_EPSG,
            target_epsg: TARGET_EPSG,
            reason: "requires the 'reproject' feature. Build with: cargo build --features reproject"
                .to_string(),
        })
    }

    pub fn unproject(&self, point: GeoPoint) -> Result<(f64, f64), ProjectionError> {
        Err(ProjectionError::Transform {
            x: point.lon,
            y: point.lat,
            reason: "reprojection unavailable".to_string(),
        })
    }
}

#[cfg(not(feature = "reproject"))]
impl CoordinateTransform for Lambert93ToWgs84 {
    fn project(&self, x: f64, y: f64) -> Result<GeoPoint, ProjectionError> {
        Err(ProjectionError::Transform {
            x,
            y,
            reason: "reprojection unavailable".to_string(),
        })
    }
}
