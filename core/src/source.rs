//! GeoJSON intake: just enough of a `FeatureCollection` to recover each
//! feature's outer ring and its count attribute.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{LoadError, Point};

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

type Position = Vec<f64>;

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Value,
}

/// A feature reduced to what the registry needs.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCell {
    pub ring: Vec<Point>,
    pub count: Option<f64>,
}

impl Feature {
    /// Outer ring of the polygon, or of the first polygon of a multi-polygon.
    fn take_outer_ring(&mut self, index: usize) -> Result<Vec<Point>, LoadError> {
        let geometry = self
            .geometry
            .take()
            .ok_or(LoadError::UnsupportedGeometry { index })?;
        let positions: Option<Vec<Position>> = match geometry.kind.as_str() {
            "Polygon" => {
                let rings: Vec<Vec<Position>> = serde_json::from_value(geometry.coordinates)?;
                rings.into_iter().next()
            }
            "MultiPolygon" => {
                let polygons: Vec<Vec<Vec<Position>>> =
                    serde_json::from_value(geometry.coordinates)?;
                polygons.into_iter().next().and_then(|p| p.into_iter().next())
            }
            _ => return Err(LoadError::UnsupportedGeometry { index }),
        };
        let positions = positions
            .filter(|ring| !ring.is_empty())
            .ok_or(LoadError::EmptyRing { index })?;

        positions
            .iter()
            .map(|pos| match pos.as_slice() {
                [x, y, ..] => Ok(Point::new(*x, *y)),
                _ => Err(LoadError::InvalidPosition { index }),
            })
            .collect()
    }

    fn count(&self, field: &str, index: usize) -> Option<f64> {
        let raw = self.properties.as_ref().and_then(|props| props.get(field));
        let count = parse_count(raw);
        if count.is_none() {
            if let Some(Value::String(s)) = raw {
                if !s.trim().is_empty() {
                    log::warn!("feature {index}: unparseable {field} value {s:?}, treating as absent");
                }
            }
        }
        count
    }
}

/// Numeric passthrough if finite, else string parse if finite, else absent.
pub fn parse_count(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Parses a GeoJSON feature collection into raw cells, in input order.
pub fn parse_feature_collection(json: &str, count_field: &str) -> Result<Vec<RawCell>, LoadError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    if collection.features.is_empty() {
        return Err(LoadError::NoFeatures);
    }

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, mut feature)| {
            Ok(RawCell {
                ring: feature.take_outer_ring(index)?,
                count: feature.count(count_field, index),
            })
        })
        .collect()
}
