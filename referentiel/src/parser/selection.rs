//! Parser pour la saisie de codes PR
//!
//! Une entrée par ligne:
//!
//! ```text
//! 597120-BA
//! 142091-AO;Monument de Langres
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::types::PrKey;

/// Séparateur entre codeCI et codeCH
pub const CODE_SEPARATOR: char = '-';

/// Séparateur entre le code PR et sa description
pub const ANNOTATION_SEPARATOR: char = ';';

/// Demande de sélection: codes PR ordonnés et descriptions optionnelles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionRequest {
    /// Codes dans l'ordre de saisie (doublons conservés)
    pub pairs: Vec<PrKey>,

    /// Descriptions indexées par `CI-CH`; la dernière saisie l'emporte
    pub annotations: HashMap<String, String>,
}

impl SelectionRequest {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Description associée à un code
    pub fn annotation(&self, key: &PrKey) -> Option<&str> {
        self.annotations.get(&key.to_string()).map(String::as_str)
    }
}

/// Ligne rejetée (non vide mais sans code `CI-CH`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    /// Numéro de ligne (1-based)
    pub line: usize,
    /// Contenu de la ligne, espaces retirés
    pub content: String,
}

impl fmt::Display for RejectedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ligne {}: {}", self.line, self.content)
    }
}

/// Résultat du parsing: la demande et les lignes rejetées
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSelection {
    pub request: SelectionRequest,
    pub rejected: Vec<RejectedLine>,
}

/// Parse une saisie multi-lignes de codes PR
///
/// Les lignes vides sont ignorées. Une ligne invalide est rejetée sans
/// interrompre le parsing des suivantes.
pub fn parse_selection(text: &str) -> ParsedSelection {
    let mut parsed = ParsedSelection::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // Description optionnelle après le premier ';'
        let (codes, annotation) = match line.split_once(ANNOTATION_SEPARATOR) {
            Some((codes, annotation)) => (codes, Some(annotation.trim())),
            None => (line, None),
        };

        let Some((code_ci, code_ch)) = codes.split_once(CODE_SEPARATOR) else {
            parsed.rejected.push(RejectedLine {
                line: index + 1,
                content: line.to_string(),
            });
            continue;
        };

        let key = PrKey::new(code_ci.trim(), code_ch.trim());

        if let Some(annotation) = annotation.filter(|a| !a.is_empty()) {
            parsed
                .request
                .annotations
                .insert(key.to_string(), annotation.to_string());
        }
        parsed.request.pairs.push(key);
    }

    parsed
}
