//! Export des marqueurs en GeoJSON (WGS84)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{json, Map, Value as JsonValue};

use crate::error::ViewerError;
use crate::map::Marker;
use crate::reproject::TARGET_EPSG;

/// Décimales conservées en WGS84 (~1cm)
pub const COORD_PRECISION: u8 = 7;

/// Feature Point d'un marqueur, propriétés aux noms des colonnes source
pub fn marker_feature(marker: &Marker) -> Feature {
    let mut properties = Map::new();
    properties.insert("codeCI".to_string(), JsonValue::from(marker.key.code_ci.clone()));
    properties.insert("codeCH".to_string(), JsonValue::from(marker.key.code_ch.clone()));
    properties.insert("libelleCI".to_string(), JsonValue::from(marker.libelle.clone()));
    properties.insert("XLambert93".to_string(), JsonValue::from(marker.x));
    properties.insert("YLambert93".to_string(), JsonValue::from(marker.y));
    if let Some(description) = &marker.description {
        properties.insert("description".to_string(), JsonValue::from(description.clone()));
    }

    let coordinates = vec![
        round_coord(marker.position.lon, COORD_PRECISION),
        round_coord(marker.position.lat, COORD_PRECISION),
    ];

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(coordinates))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// FeatureCollection des marqueurs, dans l'ordre
pub fn feature_collection(markers: &[Marker]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: markers.iter().map(marker_feature).collect(),
        foreign_members: None,
    }
}

/// Exporte des marqueurs dans un fichier GeoJSON (avec membre CRS)
pub fn export_to_geojson(markers: &[Marker], output_path: &Path) -> Result<(), ViewerError> {
    let mut collection = feature_collection(markers);

    let mut crs = Map::new();
    crs.insert(
        "crs".to_string(),
        json!({
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", TARGET_EPSG) }
        }),
    );
    collection.foreign_members = Some(crs);

    let file = File::create(output_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &collection)?;
    writer.flush()?;

    Ok(())
}

fn round_coord(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproject::GeoPoint;
    use referentiel::PrKey;

    fn marker(description: Option<&str>) -> Marker {
        Marker {
            key: PrKey::new("597120", "BA"),
            libelle: "Gare \"centrale\"".to_string(),
            x: 652381.25,
            y: 6862047.5,
            position: GeoPoint {
                lat: 48.856_613_456,
                lon: 2.352_221_987,
            },
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_marker_feature_properties() {
        let feature = marker_feature(&marker(Some("Site")));
        let props = feature.properties.unwrap();

        assert_eq!(props["codeCI"], "597120");
        assert_eq!(props["codeCH"], "BA");
        assert_eq!(props["libelleCI"], "Gare \"centrale\"");
        assert_eq!(props["XLambert93"], 652381.25);
        assert_eq!(props["description"], "Site");
    }

    #[test]
    fn test_marker_feature_geometry_lon_lat() {
        let feature = marker_feature(&marker(None));
        assert!(!feature.properties.unwrap().contains_key("description"));

        match feature.geometry.unwrap().value {
            Value::Point(coords) => {
                assert_eq!(coords, vec![2.352_222, 48.856_613_5]);
            }
            other => panic!("Expected Point, got {:?}", other),
        }
    }

    #[test]
    fn test_round_coord() {
        assert_eq!(round_coord(2.123_456_789, 7), 2.123_456_8);
        assert_eq!(round_coord(-1.5, 0), -2.0);
    }

    #[test]
    fn test_export_to_geojson() {
        let output_path = std::env::temp_dir().join("jbw_viewer_export_test.geojson");

        export_to_geojson(&[marker(None), marker(Some("bis"))], &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains(r#""type":"FeatureCollection""#));
        assert!(content.contains("EPSG::4326"));

        let parsed: ::geojson::GeoJson = content.parse().unwrap();
        match parsed {
            ::geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
            other => panic!("Expected FeatureCollection, got {:?}", other),
        }

        std::fs::remove_file(output_path).ok();
    }
}
