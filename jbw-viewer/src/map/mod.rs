//! Assemblage des cartes: limite de marqueurs, reprojection, rendu
//!
//! Deux modes:
//! - `All`: tous les PR, regroupés dans une couche masquée par défaut
//! - `Subset`: PR sélectionnés, toujours visibles, vue centrée sur eux

pub mod leaflet;
pub mod popup;

use std::collections::HashMap;
use std::path::Path;

use geo::{BoundingRect, MultiPoint, Point, Rect};
use referentiel::{PrKey, ReferencePoint};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ViewerError;
use crate::reproject::{CoordinateTransform, GeoPoint, ProjectionError};

pub use leaflet::LeafletRenderer;

/// Mode de génération
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    All,
    Subset,
}

impl MapMode {
    /// Limite par défaut du mode
    pub fn default_cap(self) -> usize {
        match self {
            Self::All => 1000,
            Self::Subset => 100,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Subset => "subset",
        }
    }
}

/// Un marqueur prêt à être rendu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub key: PrKey,
    pub libelle: String,
    /// Coordonnées Lambert-93 d'origine
    pub x: f64,
    pub y: f64,
    pub position: GeoPoint,
    pub description: Option<String>,
}

impl Marker {
    fn from_point(
        pr: &ReferencePoint,
        description: Option<&str>,
        transform: &dyn CoordinateTransform,
    ) -> Result<Self, ProjectionError> {
        Ok(Self {
            key: pr.key(),
            libelle: pr.libelle.clone(),
            x: pr.x,
            y: pr.y,
            position: transform.project(pr.x, pr.y)?,
            description: description.map(str::to_string),
        })
    }

    /// Infobulle `CI-CH: libellé`
    pub fn tooltip(&self) -> String {
        format!("{}: {}", self.key, self.libelle)
    }
}

/// Marqueurs retenus pour une carte, avant rendu
#[derive(Debug, Clone)]
pub struct MapPlan {
    pub mode: MapMode,
    pub markers: Vec<Marker>,
    /// Nombre de PR disponibles avant application de la limite
    pub available: usize,
}

impl MapPlan {
    /// Nombre initial si la limite a tronqué la liste
    pub fn truncated_from(&self) -> Option<usize> {
        (self.available > self.markers.len()).then_some(self.available)
    }

    /// Emprise WGS84 des marqueurs
    pub fn bounds(&self) -> Option<Rect<f64>> {
        let points: MultiPoint<f64> = self
            .markers
            .iter()
            .map(|m| Point::from(m.position))
            .collect();
        points.bounding_rect()
    }
}

/// Carte rendue
#[derive(Debug, Clone)]
pub struct MapDocument {
    pub mode: MapMode,
    pub html: String,
    pub marker_count: usize,
    pub truncated_from: Option<usize>,
}

impl MapDocument {
    /// Écrit le document HTML
    pub fn save(&self, path: &Path) -> Result<(), ViewerError> {
        std::fs::write(path, &self.html)?;
        info!(path = %path.display(), markers = self.marker_count, "Map written");
        Ok(())
    }
}

/// Produit un document à partir des marqueurs retenus
pub trait MapRenderer {
    fn render(&self, plan: &MapPlan) -> Result<String, ViewerError>;
}

/// Garde les `cap` premiers éléments, dans l'ordre
fn limit<T>(items: &[T], cap: usize, mode: MapMode) -> &[T] {
    if items.len() > cap {
        info!(
            mode = mode.as_str(),
            available = items.len(),
            cap,
            "Marker limit reached, keeping the first {}",
            cap
        );
        &items[..cap]
    } else {
        items
    }
}

/// Marqueurs pour tous les PR (limite appliquée avant reprojection)
pub fn plan_all(
    points: &[ReferencePoint],
    cap: usize,
    transform: &dyn CoordinateTransform,
) -> Result<MapPlan, ProjectionError> {
    let kept = limit(points, cap, MapMode::All);
    let markers = kept
        .iter()
        .map(|pr| Marker::from_point(pr, None, transform))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(markers = markers.len(), "All-points plan ready");
    Ok(MapPlan {
        mode: MapMode::All,
        markers,
        available: points.len(),
    })
}

/// Marqueurs pour une sélection, avec descriptions indexées par `CI-CH`
pub fn plan_subset(
    points: &[&ReferencePoint],
    annotations: &HashMap<String, String>,
    cap: usize,
    transform: &dyn CoordinateTransform,
) -> Result<MapPlan, ProjectionError> {
    let kept = limit(points, cap, MapMode::Subset);
    let markers = kept
        .iter()
        .map(|pr| {
            let description = annotations.get(&pr.key().to_string()).map(String::as_str);
            Marker::from_point(pr, description, transform)
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(markers = markers.len(), "Subset plan ready");
    Ok(MapPlan {
        mode: MapMode::Subset,
        markers,
        available: points.len(),
    })
}

/// Carte de tous les PR
pub fn render_all(
    points: &[ReferencePoint],
    cap: usize,
    transform: &dyn CoordinateTransform,
    renderer: &dyn MapRenderer,
) -> Result<MapDocument, ViewerError> {
    let plan = plan_all(points, cap, transform)?;
    render_plan(&plan, renderer)
}

/// Carte d'une sélection de PR
pub fn render_subset(
    points: &[&ReferencePoint],
    annotations: &HashMap<String, String>,
    cap: usize,
    transform: &dyn CoordinateTransform,
    renderer: &dyn MapRenderer,
) -> Result<MapDocument, ViewerError> {
    let plan = plan_subset(points, annotations, cap, transform)?;
    render_plan(&plan, renderer)
}

fn render_plan(plan: &MapPlan, renderer: &dyn MapRenderer) -> Result<MapDocument, ViewerError> {
    Ok(MapDocument {
        mode: plan.mode,
        html: renderer.render(plan)?,
        marker_count: plan.markers.len(),
        truncated_from: plan.truncated_from(),
    })
}
