use crate::models::{BoundingBox, Crs, Geometry};
use caudata_core::error::Result;
use caudata_core::models::{BasisOfRecord, CleanedTable};
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// One occurrence as a WGS84 point with its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub geometry: Geometry,
    pub name: String,
    pub year: i32,
    pub coordinate_uncertainty_m: f64,
    pub basis_of_record: BasisOfRecord,
}

impl PointFeature {
    /// (lon, lat) of the point
    pub fn coordinates(&self) -> (f64, f64) {
        match &self.geometry {
            Geometry::Point { coordinates } => (coordinates[0], coordinates[1]),
            other => other.bounding_box().map(|b| b.center()).unwrap_or((f64::NAN, f64::NAN)),
        }
    }
}

/// The geographic point layer built from the cleaned table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLayer {
    pub crs: Crs,
    pub features: Vec<PointFeature>,
}

impl PointLayer {
    /// One point per cleaned record, in table order
    pub fn from_cleaned(table: &CleanedTable) -> Self {
        let features = table
            .iter()
            .map(|r| PointFeature {
                geometry: Geometry::point(r.longitude, r.latitude),
                name: r.name.clone(),
                year: r.year,
                coordinate_uncertainty_m: r.coordinate_uncertainty_m,
                basis_of_record: r.basis_of_record.clone(),
            })
            .collect();

        Self { crs: Crs::wgs84(), features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box of all points, `None` for an empty layer
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut coords = self.features.iter().map(PointFeature::coordinates);
        let (lon, lat) = coords.next()?;
        Some(coords.fold(BoundingBox::new(lon, lat, lon, lat), |b, (lon, lat)| {
            BoundingBox::new(b.min_lon.min(lon), b.min_lat.min(lat), b.max_lon.max(lon), b.max_lat.max(lat))
        }))
    }

    /// Export as a GeoJSON FeatureCollection
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|f| {
                let (lon, lat) = f.coordinates();
                let mut properties = JsonObject::new();
                properties.insert("name".to_string(), JsonValue::from(f.name.clone()));
                properties.insert("year".to_string(), JsonValue::from(f.year));
                properties.insert(
                    "coordinateUncertaintyInMeters".to_string(),
                    JsonValue::from(f.coordinate_uncertainty_m),
                );
                properties.insert(
                    "basisOfRecord".to_string(),
                    JsonValue::from(f.basis_of_record.as_gbif()),
                );

                Feature {
                    bbox: None,
                    geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![lon, lat]))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection { bbox: None, features, foreign_members: None }
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_feature_collection())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudata_core::models::CleanRecord;

    fn table() -> CleanedTable {
        CleanedTable::new(vec![
            CleanRecord {
                name: "Taricha sierrae".to_string(),
                year: 1962,
                longitude: -120.8,
                latitude: 38.9,
                coordinate_uncertainty_m: 1500.0,
                basis_of_record: BasisOfRecord::PreservedSpecimen,
            },
            CleanRecord {
                name: "Taricha torosa sierrae".to_string(),
                year: 2019,
                longitude: -121.1,
                latitude: 39.4,
                coordinate_uncertainty_m: 8.0,
                basis_of_record: BasisOfRecord::HumanObservation,
            },
        ])
    }

    #[test]
    fn test_layer_carries_attributes() {
        let layer = PointLayer::from_cleaned(&table());
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.crs.epsg, 4326);
        assert_eq!(layer.features[0].coordinates(), (-120.8, 38.9));
        assert_eq!(layer.features[1].year, 2019);
        assert_eq!(layer.features[1].basis_of_record, BasisOfRecord::HumanObservation);
    }

    #[test]
    fn test_bounding_box() {
        let layer = PointLayer::from_cleaned(&table());
        assert_eq!(layer.bounding_box(), Some(BoundingBox::new(-121.1, 38.9, -120.8, 39.4)));
        assert_eq!(PointLayer::from_cleaned(&CleanedTable::default()).bounding_box(), None);
    }

    #[test]
    fn test_geojson_export() {
        let json = PointLayer::from_cleaned(&table()).to_geojson_string().unwrap();
        let parsed: geojson::GeoJson = json.parse().unwrap();
        match parsed {
            geojson::GeoJson::FeatureCollection(fc) => {
                assert_eq!(fc.features.len(), 2);
                let props = fc.features[0].properties.as_ref().unwrap();
                assert_eq!(props["year"], 1962);
                assert_eq!(props["basisOfRecord"], "PRESERVED_SPECIMEN");
            }
            other => panic!("Expected FeatureCollection, got {:?}", other),
        }
    }
}
