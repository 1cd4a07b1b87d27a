//! Recherche de PR par codes

use crate::types::{PrKey, ReferencePoint, ReferenceTable};

/// Recherche des PR par codes CI et/ou CH
///
/// Sans code: tous les PR. Avec un seul code: filtre sur ce champ.
/// Avec les deux: égalité exacte sur les deux. Ordre de chargement conservé.
pub fn find<'a>(
    points: &'a [ReferencePoint],
    code_ci: Option<&str>,
    code_ch: Option<&str>,
) -> Vec<&'a ReferencePoint> {
    points
        .iter()
        .filter(|pr| code_ci.map_or(true, |ci| pr.code_ci == ci))
        .filter(|pr| code_ch.map_or(true, |ch| pr.code_ch == ch))
        .collect()
}

/// PR retenus pour une liste de codes
#[derive(Debug, Default)]
pub struct Selection<'a> {
    /// PR trouvés, dans l'ordre des codes demandés
    pub points: Vec<&'a ReferencePoint>,

    /// Codes demandés absents du référentiel
    pub missing: Vec<PrKey>,
}

impl Selection<'_> {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Résout une liste de codes (doublons de clés tous retournés)
pub fn select<'a>(points: &'a [ReferencePoint], keys: &[PrKey]) -> Selection<'a> {
    let mut selection = Selection::default();

    for key in keys {
        let before = selection.points.len();
        selection
            .points
            .extend(points.iter().filter(|pr| pr.has_key(key)));

        if selection.points.len() == before {
            selection.missing.push(key.clone());
        }
    }

    selection
}

impl ReferenceTable {
    /// Voir [`find`]
    pub fn find(&self, code_ci: Option<&str>, code_ch: Option<&str>) -> Vec<&ReferencePoint> {
        find(&self.points, code_ci, code_ch)
    }

    /// Voir [`select`]
    pub fn select(&self, keys: &[PrKey]) -> Selection<'_> {
        select(&self.points, keys)
    }
}
