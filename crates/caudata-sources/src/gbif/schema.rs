//! Lenient decoding of GBIF occurrence-search payloads.
//!
//! Every schema field is optional. A field present with the wrong JSON type is
//! treated as missing. Fields outside the schema are kept in
//! [`OccurrenceRecord::extra`].

use caudata_core::models::{BasisOfRecord, OccurrenceRecord};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Meters per foot
const FOOT_M: f64 = 0.3048;

/// Payload fields mapped onto the record schema
pub const SCHEMA_FIELDS: [&str; 11] = [
    "key",
    "scientificName",
    "year",
    "month",
    "decimalLatitude",
    "decimalLongitude",
    "coordinateUncertaintyInMeters",
    "elevation",
    "verbatimElevation",
    "basisOfRecord",
    "institutionCode",
];

/// One page of `occurrence/search`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub end_of_records: bool,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<Value>,
}

fn as_f64(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn as_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Decode one result object; `None` when the result is not an object
pub fn decode_record(value: &Value) -> Option<OccurrenceRecord> {
    let object: &Map<String, Value> = value.as_object()?;
    let field = |name: &str| object.get(name);

    let month = field("month").and_then(Value::as_i64);
    let month = match month {
        Some(m @ 1..=12) => Some(m as u8),
        Some(m) => {
            tracing::warn!(month = m, "Ignoring out-of-range month");
            None
        }
        None => None,
    };

    let verbatim_elevation_m = match field("verbatimElevation") {
        Some(Value::String(text)) => parse_verbatim_elevation(text),
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    };

    let extra = object
        .iter()
        .filter(|(key, _)| !SCHEMA_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(OccurrenceRecord {
        key: field("key").and_then(Value::as_u64),
        scientific_name: as_string(field("scientificName")),
        year: field("year").and_then(Value::as_i64).and_then(|y| i32::try_from(y).ok()),
        month,
        latitude: as_f64(field("decimalLatitude")),
        longitude: as_f64(field("decimalLongitude")),
        coordinate_uncertainty_m: as_f64(field("coordinateUncertaintyInMeters")),
        elevation_m: as_f64(field("elevation")),
        verbatim_elevation_m,
        basis_of_record: as_string(field("basisOfRecord")).map(|b| BasisOfRecord::from_gbif(&b)),
        institution_code: as_string(field("institutionCode")),
        extra,
    })
}

/// Parse a free-text elevation such as `"1200 m"` or `"1,200-1,300 ft"` to meters
///
/// Ranges resolve to their midpoint. Feet are converted. Text without a
/// number yields `None`.
pub fn parse_verbatim_elevation(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "").to_ascii_lowercase();
    let mut numbers: Vec<f64> = Vec::new();
    let mut current = String::new();

    let chars: Vec<char> = cleaned.chars().collect();
    for (i, ch) in chars.iter().enumerate() {
        let leading_sign = *ch == '-'
            && numbers.is_empty()
            && current.is_empty()
            && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
            && chars[..i].iter().all(|c| !c.is_ascii_digit());
        if ch.is_ascii_digit() || (*ch == '.' && !current.is_empty()) || leading_sign {
            current.push(*ch);
        } else if !current.is_empty() {
            numbers.extend(current.parse::<f64>().ok());
            current.clear();
        }
    }
    if !current.is_empty() {
        numbers.extend(current.parse::<f64>().ok());
    }

    let value = match numbers.as_slice() {
        [] => return None,
        [single] => *single,
        [low, high, ..] => (low + high) / 2.0,
    };

    let feet = cleaned.contains("ft") || cleaned.contains("feet") || cleaned.contains('\'');
    Some(if feet { value * FOOT_M } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verbatim_elevation_forms() {
        assert_eq!(parse_verbatim_elevation("1200 m"), Some(1200.0));
        assert_eq!(parse_verbatim_elevation("1200m"), Some(1200.0));
        assert_eq!(parse_verbatim_elevation("1200-1300 m"), Some(1250.0));
        assert_eq!(parse_verbatim_elevation("-15 m"), Some(-15.0));
        assert_eq!(parse_verbatim_elevation("ca. 850.5 m"), Some(850.5));
        assert_eq!(parse_verbatim_elevation("unknown"), None);
        assert_eq!(parse_verbatim_elevation(""), None);

        let feet = parse_verbatim_elevation("1,200-1,300 ft").unwrap();
        assert!((feet - 1250.0 * FOOT_M).abs() < 1e-9);
        let feet = parse_verbatim_elevation("3000'").unwrap();
        assert!((feet - 914.4).abs() < 1e-9);
    }

    #[test]
    fn test_decode_full_record() {
        let record = decode_record(&json!({
            "key": 1234567,
            "scientificName": "Taricha sierrae (Twitty, 1942)",
            "year": 1998,
            "month": 4,
            "decimalLatitude": 38.91,
            "decimalLongitude": -120.73,
            "coordinateUncertaintyInMeters": 150.0,
            "elevation": 1100.0,
            "verbatimElevation": "3600 ft",
            "basisOfRecord": "PRESERVED_SPECIMEN",
            "institutionCode": "MVZ",
            "country": "United States of America"
        }))
        .unwrap();

        assert_eq!(record.key, Some(1234567));
        assert_eq!(record.year, Some(1998));
        assert_eq!(record.month, Some(4));
        assert_eq!(record.longitude, Some(-120.73));
        assert_eq!(record.basis_of_record, Some(BasisOfRecord::PreservedSpecimen));
        assert_eq!(record.institution_code.as_deref(), Some("MVZ"));
        assert!((record.verbatim_elevation_m.unwrap() - 1097.28).abs() < 1e-6);
        assert_eq!(record.extra["country"], "United States of America");
        assert!(!record.extra.contains_key("year"));
    }

    #[test]
    fn test_wrong_types_become_missing() {
        let record = decode_record(&json!({
            "year": "nineteen",
            "month": 13,
            "decimalLatitude": "38.9",
            "decimalLongitude": null,
            "scientificName": "  ",
            "basisOfRecord": 7
        }))
        .unwrap();

        assert_eq!(record.year, None);
        assert_eq!(record.month, None);
        assert_eq!(record.latitude, None);
        assert_eq!(record.longitude, None);
        assert_eq!(record.scientific_name, None);
        assert_eq!(record.basis_of_record, None);
    }

    #[test]
    fn test_non_object_result_is_skipped() {
        assert!(decode_record(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn test_page_defaults() {
        let page: SearchPage = serde_json::from_str(r#"{"results": [{}]}"#).unwrap();
        assert!(!page.end_of_records);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.count, None);
    }
}
