//! Rendu HTML autonome avec Leaflet (tuiles et scripts chargés par CDN)

use serde_json::Value as JsonValue;

use super::popup::{escape_html, popup_html};
use super::{MapMode, MapPlan, MapRenderer};
use crate::config::MapSettings;
use crate::error::ViewerError;
use crate::export::geojson::feature_collection;

/// Nom de la couche regroupée en mode `All`
pub const CLUSTER_LAYER_NAME: &str = "Points de Référence";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{TITLE}}</title>
<link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css">
<link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.Default.css">
<script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js"></script>
<style>
html, body, #map { height: 100%; margin: 0; }
.pr-marker { border-radius: 50%; border: 2px solid #fff; color: #fff; font: bold 14px/22px Arial, sans-serif; text-align: center; box-shadow: 0 0 4px rgba(0, 0, 0, 0.4); }
.pr-marker-info { background: #2a81cb; }
.pr-marker-star { background: #cb2b3e; }
.pr-legend { position: fixed; bottom: 50px; left: 50px; width: 200px; z-index: 9999; background: #fff; border: 2px solid grey; border-radius: 5px; padding: 10px; font: 14px Arial, sans-serif; }
</style>
</head>
<body>
<div id="map"></div>
<div class="pr-legend"><h4 style="margin: 0 0 6px 0;">{{TITLE}}</h4><p style="margin: 0;">{{LEGEND}}</p></div>
<script>
const data = {{DATA}};
const map = L.map('map').setView([{{CENTER_LAT}}, {{CENTER_LON}}], {{ZOOM}});
L.tileLayer({{TILES_URL}}, { attribution: {{ATTRIBUTION}}, maxZoom: 19 }).addTo(map);
L.control.scale().addTo(map);

function prMarker(feature, latlng, kind) {
  const icon = L.divIcon({
    className: 'pr-marker pr-marker-' + kind,
    html: kind === 'star' ? '&#9733;' : 'i',
    iconSize: [26, 26],
    iconAnchor: [13, 13],
    popupAnchor: [0, -13]
  });
  return L.marker(latlng, { icon: icon })
    .bindPopup(feature.properties.popup, { maxWidth: 300 })
    .bindTooltip(feature.properties.tooltip);
}

{{MODE_SCRIPT}}
</script>
</body>
</html>
"#;

/// Couche regroupée, masquée tant qu'elle n'est pas cochée
const ALL_SCRIPT: &str = r#"const cluster = L.markerClusterGroup();
L.geoJSON(data, { pointToLayer: (feature, latlng) => prMarker(feature, latlng, 'info') })
  .eachLayer((layer) => cluster.addLayer(layer));
L.control.layers(null, { {{LAYER_NAME}}: cluster }, { collapsed: false }).addTo(map);"#;

const SUBSET_SCRIPT: &str = r#"L.geoJSON(data, { pointToLayer: (feature, latlng) => prMarker(feature, latlng, 'star') }).addTo(map);"#;

/// Rendu Leaflet configuré par `MapSettings`
#[derive(Debug, Clone, Default)]
pub struct LeafletRenderer {
    settings: MapSettings,
}

impl LeafletRenderer {
    pub fn new(settings: MapSettings) -> Self {
        Self { settings }
    }

    fn mode_script(&self, plan: &MapPlan) -> Result<String, ViewerError> {
        match plan.mode {
            MapMode::All => Ok(ALL_SCRIPT.replace(
                "{{LAYER_NAME}}",
                &js_string(CLUSTER_LAYER_NAME)?,
            )),
            MapMode::Subset => {
                let mut script = SUBSET_SCRIPT.to_string();
                if let Some(rect) = plan.bounds() {
                    script.push_str(&format!(
                        "\nmap.fitBounds([[{}, {}], [{}, {}]], {{ padding: [40, 40], maxZoom: 14 }});",
                        rect.min().y,
                        rect.min().x,
                        rect.max().y,
                        rect.max().x
                    ));
                }
                Ok(script)
            }
        }
    }
}

impl MapRenderer for LeafletRenderer {
    fn render(&self, plan: &MapPlan) -> Result<String, ViewerError> {
        let mut collection = feature_collection(&plan.markers);
        for (feature, marker) in collection.features.iter_mut().zip(&plan.markers) {
            if let Some(properties) = feature.properties.as_mut() {
                properties.insert("popup".to_string(), JsonValue::from(popup_html(marker)));
                properties.insert("tooltip".to_string(), JsonValue::from(marker.tooltip()));
            }
        }

        let data = script_safe(&serde_json::to_string(&collection)?);
        let settings = &self.settings;
        let title = escape_html(&settings.title);

        Ok(fill_template(
            PAGE_TEMPLATE,
            &[
                ("TITLE", title.as_str()),
                ("LEGEND", &escape_html(&settings.legend)),
                ("CENTER_LAT", &settings.center_lat.to_string()),
                ("CENTER_LON", &settings.center_lon.to_string()),
                ("ZOOM", &settings.zoom.to_string()),
                ("TILES_URL", &js_string(&settings.tiles_url)?),
                ("ATTRIBUTION", &js_string(&settings.attribution)?),
                ("MODE_SCRIPT", &self.mode_script(plan)?),
                ("DATA", &data),
            ],
        ))
    }
}

/// Remplace chaque `{{NOM}}` du gabarit en une seule passe
///
/// Les valeurs insérées ne sont jamais relues: un `{{DATA}}` dans un titre reste littéral.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..end])
                .map(|(_, value)| (end, *value))
        });

        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Littéral de chaîne JS
fn js_string(s: &str) -> Result<String, ViewerError> {
    Ok(script_safe(&serde_json::to_string(s)?))
}

/// Empêche la fermeture prématurée de la balise `<script>`
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Marker;
    use crate::reproject::GeoPoint;
    use referentiel::PrKey;

    fn plan(mode: MapMode, markers: usize) -> MapPlan {
        MapPlan {
            mode,
            markers: (0..markers)
                .map(|i| Marker {
                    key: PrKey::new(format!("{}", 597120 + i), "BA"),
                    libelle: format!("Gare {}", i),
                    x: 652381.0,
                    y: 6862047.0,
                    position: GeoPoint {
                        lat: 48.0 + i as f64,
                        lon: 2.0 + i as f64,
                    },
                    description: None,
                })
                .collect(),
            available: markers,
        }
    }

    #[test]
    fn test_render_all_uses_hidden_cluster_layer() {
        let html = LeafletRenderer::default()
            .render(&plan(MapMode::All, 2))
            .unwrap();

        assert!(html.contains("L.markerClusterGroup()"));
        assert!(html.contains("\"Points de Référence\": cluster"));
        assert!(html.contains("L.control.layers"));
        assert!(!html.contains("cluster).addTo(map)"));
        assert!(html.contains("'info'"));
        assert!(html.contains("597120-BA: Gare 0"));
        assert!(!html.contains("fitBounds"));
    }

    #[test]
    fn test_render_subset_fits_bounds() {
        let html = LeafletRenderer::default()
            .render(&plan(MapMode::Subset, 2))
            .unwrap();

        assert!(html.contains("'star'"));
        assert!(!html.contains("markerClusterGroup()"));
        assert!(html.contains("map.fitBounds([[48, 2], [49, 3]]"));
    }

    #[test]
    fn test_settings_are_applied() {
        let settings = MapSettings {
            center_lat: 45.5,
            zoom: 8,
            title: "Carte <PR>".to_string(),
            ..MapSettings::default()
        };
        let html = LeafletRenderer::new(settings)
            .render(&plan(MapMode::All, 0))
            .unwrap();

        assert!(html.contains("setView([45.5, 2], 8)"));
        assert!(html.contains("<title>Carte &lt;PR&gt;</title>"));
        assert!(html.contains("\"https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png\""));
        assert!(html.contains("Cliquez sur un marqueur pour plus d&#39;informations"));
    }

    #[test]
    fn test_placeholder_in_settings_stays_literal() {
        let settings = MapSettings {
            title: "{{DATA}}".to_string(),
            legend: "{{ZOOM}} {{INCONNU}}".to_string(),
            ..MapSettings::default()
        };
        let html = LeafletRenderer::new(settings)
            .render(&plan(MapMode::All, 1))
            .unwrap();

        assert!(html.contains("<title>{{DATA}}</title>"));
        assert!(html.contains("{{ZOOM}} {{INCONNU}}</p>"));
        assert_eq!(html.matches("\"FeatureCollection\"").count(), 1);
    }

    #[test]
    fn test_fill_template() {
        let filled = fill_template("a {{X}} b {{Y}} {{Z}} { {{X}}", &[("X", "1"), ("Y", "{{X}}")]);
        assert_eq!(filled, "a 1 b {{X}} {{Z}} { 1");
    }

    #[test]
    fn test_user_text_cannot_close_script() {
        let mut plan = plan(MapMode::Subset, 1);
        plan.markers[0].libelle = "</script><script>alert(1)</script>".to_string();
        plan.markers[0].description = Some("{{DATA}}".to_string());

        let html = LeafletRenderer::default().render(&plan).unwrap();

        assert_eq!(html.matches("</script>").count(), 3);
        assert!(html.contains("&lt;/script&gt;"));
    }
}
