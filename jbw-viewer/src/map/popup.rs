//! Contenu HTML des popups

use super::Marker;

/// Échappe le texte inséré dans du HTML
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            c => result.push(c),
        }
    }
    result
}

/// Popup d'un PR: libellé, code `CI.CH`, description éventuelle
pub fn popup_html(marker: &Marker) -> String {
    let mut html = String::from("<div style=\"font-family: Arial, sans-serif;\">");
    html.push_str("<h4>Point Remarquable</h4>");
    html.push_str(&format!(
        "<p><strong>Libellé:</strong> {}</p>",
        escape_html(&marker.libelle)
    ));
    html.push_str(&format!(
        "<p><strong>PR:</strong> {}.{}</p>",
        escape_html(&marker.key.code_ci),
        escape_html(&marker.key.code_ch)
    ));

    if let Some(description) = &marker.description {
        html.push_str(&format!(
            "<p><strong>Description:</strong><br><span style=\"color: blue;\">{}</span></p>",
            escape_html(description)
        ));
    }

    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproject::GeoPoint;
    use referentiel::PrKey;

    fn marker(description: Option<&str>) -> Marker {
        Marker {
            key: PrKey::new("142091", "AO"),
            libelle: "Pont <Nord> & Sud".to_string(),
            x: 839500.0,
            y: 6750300.0,
            position: GeoPoint {
                lat: 47.86,
                lon: 5.33,
            },
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("a & \"b\""), "a &amp; &quot;b&quot;");
    }

    #[test]
    fn test_popup_contents() {
        let html = popup_html(&marker(Some("Monument")));
        assert!(html.contains("Point Remarquable"));
        assert!(html.contains("Pont &lt;Nord&gt; &amp; Sud"));
        assert!(html.contains("<strong>PR:</strong> 142091.AO"));
        assert!(html.contains("color: blue;\">Monument</span>"));
    }

    #[test]
    fn test_popup_without_description() {
        let html = popup_html(&marker(None));
        assert!(!html.contains("Description"));
    }
}
