//! Parser pour le fichier CSV du référentiel PR

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::types::{LoadOptions, MalformedPolicy, ReferencePoint, SkippedRow};
use crate::ReferentielError;

pub const COL_CODE_CI: &str = "codeCI";
pub const COL_CODE_CH: &str = "codeCH";
pub const COL_LIBELLE: &str = "libelleCI";
pub const COL_X: &str = "XLambert93";
pub const COL_Y: &str = "YLambert93";

/// Résultat du parsing: PR retenus et lignes ignorées
#[derive(Debug, Default)]
pub struct ParsedTable {
    pub points: Vec<ReferencePoint>,
    pub skipped: Vec<SkippedRow>,
}

/// Position des colonnes obligatoires dans l'en-tête
#[derive(Debug, Clone, Copy)]
struct Columns {
    code_ci: usize,
    code_ch: usize,
    libelle: usize,
    x: usize,
    y: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, ReferentielError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| clean_field(h) == name)
                .ok_or_else(|| ReferentielError::missing_column(name))
        };

        Ok(Self {
            code_ci: find(COL_CODE_CI)?,
            code_ch: find(COL_CODE_CH)?,
            libelle: find(COL_LIBELLE)?,
            x: find(COL_X)?,
            y: find(COL_Y)?,
        })
    }
}

/// Parse le contenu décodé du référentiel
pub fn parse(content: &str, options: &LoadOptions) -> Result<ParsedTable, ReferentielError> {
    let delimiter = options
        .delimiter
        .unwrap_or_else(|| sniff_delimiter(content));
    let shown = (delimiter as char).escape_default().to_string();
    debug!(delimiter = %shown, "Parsing reference table");

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns = Columns::locate(reader.headers()?)?;
    let mut parsed = ParsedTable::default();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        // En-tête = ligne 1
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);

        match parse_row(&record, &columns, line) {
            Ok(point) => parsed.points.push(point),
            Err(e) => match options.on_malformed {
                MalformedPolicy::Abort => return Err(e),
                MalformedPolicy::Skip => {
                    warn!(line, error = %e, "Skipping malformed row");
                    parsed.skipped.push(SkippedRow {
                        line,
                        reason: e.to_string(),
                    });
                }
            },
        }
    }

    Ok(parsed)
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    line: u64,
) -> Result<ReferencePoint, ReferentielError> {
    let field = |index: usize, name: &str| {
        record
            .get(index)
            .ok_or_else(|| ReferentielError::malformed(line, format!("missing field {}", name)))
    };

    let x_raw = field(columns.x, COL_X)?;
    let y_raw = field(columns.y, COL_Y)?;

    let x = parse_coordinate(x_raw)
        .map_err(|reason| ReferentielError::malformed(line, format!("{}: {}", COL_X, reason)))?;
    let y = parse_coordinate(y_raw)
        .map_err(|reason| ReferentielError::malformed(line, format!("{}: {}", COL_Y, reason)))?;

    Ok(ReferencePoint {
        code_ci: clean_field(field(columns.code_ci, COL_CODE_CI)?).to_string(),
        code_ch: clean_field(field(columns.code_ch, COL_CODE_CH)?).to_string(),
        libelle: clean_field(field(columns.libelle, COL_LIBELLE)?).to_string(),
        x,
        y,
    })
}

/// Nettoie un champ: espaces puis guillemets autour de la valeur
pub fn clean_field(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// Parse une coordonnée Lambert-93 qui peut utiliser la virgule décimale:
/// - "652381,25" → 652381.25
/// - "\"6862047.5\"" → 6862047.5
pub fn parse_coordinate(raw: &str) -> Result<f64, String> {
    let cleaned = clean_field(raw).replace(',', ".");
    if cleaned.is_empty() {
        return Err("empty coordinate".to_string());
    }

    let value: f64 = fast_float::parse(&cleaned)
        .map_err(|_| format!("invalid number '{}'", clean_field(raw)))?;

    if !value.is_finite() {
        return Err(format!("non-finite number '{}'", clean_field(raw)));
    }

    Ok(value)
}

/// Détecte le séparateur sur la ligne d'en-tête
fn sniff_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or("");

    if header.contains(';') && !header.contains(',') {
        b';'
    } else if header.contains('\t') && !header.contains(',') && !header.contains(';') {
        b'\t'
    } else {
        b','
    }
}
