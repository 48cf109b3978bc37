//! Extraction of [`PlaceRecord`]s from Who's On First `GeoJSON` documents.
//!
//! Records are read defensively: a property that is missing or has an
//! unexpected JSON type is left empty rather than rejecting the document.
//! Only a body that is not JSON at all, or whose top level is not an
//! object, is treated as malformed.

use gazetteer_resolver_models::{Hierarchy, PlaceId, PlaceRecord};
use serde_json::Value;

use crate::GazetteerError;

/// Parses a response body into a [`PlaceRecord`].
///
/// # Errors
///
/// Returns [`GazetteerError`] if the body is not valid JSON or is not a
/// JSON object.
pub fn parse_record(body: &str) -> Result<PlaceRecord, GazetteerError> {
    let json: Value = serde_json::from_str(body)?;
    if !json.is_object() {
        return Err(GazetteerError::Parse {
            message: "place document is not a JSON object".to_string(),
        });
    }
    Ok(record_from_geojson(&json))
}

/// Reads the properties the resolver needs from a `GeoJSON` feature.
#[must_use]
pub fn record_from_geojson(feature: &Value) -> PlaceRecord {
    let props = &feature["properties"];

    PlaceRecord {
        placetype: string_prop(props, "wof:placetype"),
        preferred_english_names: props["name:eng_x_preferred"]
            .as_array()
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        default_name: string_prop(props, "wof:name"),
        parent_id: place_id(&props["wof:parent_id"]),
        hierarchy: props["wof:hierarchy"]
            .as_array()
            .map(|entries| entries.iter().map(hierarchy_from_value).collect())
            .unwrap_or_default(),
        longitude: props["geom:longitude"].as_f64(),
        latitude: props["geom:latitude"].as_f64(),
        abbreviation: string_prop(props, "wof:abbreviation"),
    }
}

fn string_prop(props: &Value, key: &str) -> Option<String> {
    props[key].as_str().map(String::from)
}

/// Converts a hierarchy map, dropping entries that do not hold a valid ID.
fn hierarchy_from_value(value: &Value) -> Hierarchy {
    let entries = value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(key, id)| place_id(id).map(|id| (key.clone(), id)))
                .collect()
        })
        .unwrap_or_default();
    Hierarchy(entries)
}

/// Reads a place ID stored as a JSON number or string.
///
/// Negative values (Who's On First uses `-1` for "none") and empty
/// strings yield `None`.
fn place_id(value: &Value) -> Option<PlaceId> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(|id| id.to_string())
            .or_else(|| number.as_i64().filter(|id| *id >= 0).map(|id| id.to_string())),
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty() && !text.starts_with('-')).then(|| text.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oakland() -> Value {
        serde_json::json!({
            "type": "Feature",
            "properties": {
                "wof:placetype": "locality",
                "wof:name": "Oakland",
                "name:eng_x_preferred": ["Oakland"],
                "wof:parent_id": 102086959,
                "wof:hierarchy": [{
                    "locality_id": 85921881,
                    "county_id": 102086959,
                    "region_id": 85688637,
                    "country_id": 85633793,
                    "continent_id": 102191575,
                    "neighbourhood_id": -1
                }],
                "geom:latitude": 37.769_4,
                "geom:longitude": -122.225_9
            }
        })
    }

    #[test]
    fn reads_place_properties() {
        let record = record_from_geojson(&oakland());
        assert_eq!(record.placetype.as_deref(), Some("locality"));
        assert_eq!(record.preferred_name(), Some("Oakland"));
        assert_eq!(record.parent_id.as_deref(), Some("102086959"));
        assert_eq!(record.hierarchy.len(), 1);
        assert_eq!(record.hierarchy[0].country_id(), Some("85633793"));
        assert_eq!(record.hierarchy[0].region_id(), Some("85688637"));
        assert_eq!(record.hierarchy[0].get("neighbourhood_id"), None);
        assert!((record.latitude.unwrap() - 37.769_4).abs() < 1e-9);
        assert!((record.longitude.unwrap() - -122.225_9).abs() < 1e-9);
        assert_eq!(record.abbreviation, None);
    }

    #[test]
    fn negative_parent_is_root() {
        let record = record_from_geojson(&serde_json::json!({
            "properties": { "wof:placetype": "planet", "wof:parent_id": -1 }
        }));
        assert_eq!(record.parent_id, None);
    }

    #[test]
    fn string_ids_are_accepted() {
        let record = record_from_geojson(&serde_json::json!({
            "properties": { "wof:parent_id": "85633793" }
        }));
        assert_eq!(record.parent_id.as_deref(), Some("85633793"));
    }

    #[test]
    fn mistyped_properties_are_absent() {
        let record = record_from_geojson(&serde_json::json!({
            "properties": {
                "wof:name": 12,
                "geom:latitude": "37.0",
                "wof:hierarchy": "none"
            }
        }));
        assert_eq!(record.default_name, None);
        assert_eq!(record.latitude, None);
        assert!(record.hierarchy.is_empty());
    }

    #[test]
    fn rejects_non_json_and_non_objects() {
        assert!(parse_record("<html>not found</html>").is_err());
        assert!(parse_record("[1, 2, 3]").is_err());
        assert!(parse_record("{\"properties\": {}}").is_ok());
    }
}
