//! Décodage du fichier source (UTF-8, repli Windows-1252)

use std::borrow::Cow;

use tracing::warn;

use crate::types::TextEncoding;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Décode les bytes du référentiel
///
/// Le BOM UTF-8 éventuel est retiré. Un contenu qui n'est pas de l'UTF-8
/// valide est relu en Windows-1252 (exports Excel français).
pub fn decode(data: &[u8]) -> (Cow<'_, str>, TextEncoding) {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    // Validation SIMD
    if let Ok(text) = simdutf8::basic::from_utf8(data) {
        return (Cow::Borrowed(text), TextEncoding::Utf8);
    }

    warn!("Source is not valid UTF-8, decoding as Windows-1252");
    let (decoded, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(data);
    (decoded, TextEncoding::Windows1252)
}
