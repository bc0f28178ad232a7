use geo::{BoundingRect, Intersects};
use geo_types::{Coord, LineString, MultiPolygon, Point, Polygon};
use georisk_models::GeoRiskError;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use shapefile::dbase::{FieldValue, Record};
use shapefile::PolygonRing;
use std::path::Path;

type Envelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Soil polygons with their map-unit number, held in memory behind an
/// envelope R-tree so a point query only tests the handful of polygons
/// whose bounding boxes cover it.
pub struct SoilMap {
    features: Vec<(MultiPolygon<f64>, String)>,
    index: RTree<Envelope>,
}

impl SoilMap {
    pub fn load(path: &Path) -> Result<Self, GeoRiskError> {
        let mut reader = shapefile::Reader::from_path(path).map_err(|e| load_error(e))?;

        let mut features = Vec::new();
        for entry in reader.iter_shapes_and_records() {
            let (shape, record) = entry.map_err(|e| load_error(e))?;
            let polygon = match shape {
                shapefile::Shape::Polygon(polygon) => multipolygon_from(polygon),
                shapefile::Shape::NullShape => continue,
                other => {
                    return Err(GeoRiskError::DataLoad {
                        source_name: "soil map".to_string(),
                        reason: format!("unexpected shape type: {}", other.shapetype()),
                    })
                }
            };
            features.push((polygon, soil_number(&record)));
        }

        let entries: Vec<Envelope> = features
            .iter()
            .enumerate()
            .filter_map(|(i, (polygon, _))| {
                polygon.bounding_rect().map(|rect| {
                    GeomWithData::new(
                        Rectangle::from_corners(
                            [rect.min().x, rect.min().y],
                            [rect.max().x, rect.max().y],
                        ),
                        i,
                    )
                })
            })
            .collect();

        Ok(Self {
            features,
            index: RTree::bulk_load(entries),
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Soil map-unit number at the given WGS84 coordinate. Envelope
    /// candidates first, precise point-in-polygon second; the first
    /// polygon containing the point wins.
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<&str> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let point = Point::new(lon, lat);
        self.index
            .locate_in_envelope_intersecting(&AABB::from_point([lon, lat]))
            .filter_map(|entry| self.features.get(entry.data))
            .find(|(polygon, _)| polygon.intersects(&point))
            .map(|(_, snum)| snum.as_str())
    }
}

/// Shapefile rings to a geo multipolygon. Outer rings open a new part;
/// inner rings become holes of the part opened most recently, which is
/// how the shapefile format orders them.
fn multipolygon_from(polygon: shapefile::Polygon) -> MultiPolygon<f64> {
    let mut parts: Vec<Polygon<f64>> = Vec::new();
    for ring in polygon.rings() {
        match ring {
            PolygonRing::Outer(points) => {
                parts.push(Polygon::new(LineString::from(to_coords(points)), vec![]))
            }
            PolygonRing::Inner(points) => {
                if let Some(part) = parts.last_mut() {
                    part.interiors_push(LineString::from(to_coords(points)));
                }
            }
        }
    }
    MultiPolygon(parts)
}

fn to_coords(points: &[shapefile::Point]) -> Vec<Coord<f64>> {
    points.iter().map(|p| Coord { x: p.x, y: p.y }).collect()
}

fn soil_number(record: &Record) -> String {
    match record.get("SNUM") {
        Some(FieldValue::Numeric(Some(value))) => format_numeric(*value),
        Some(FieldValue::Float(Some(value))) => format_numeric(f64::from(*value)),
        Some(FieldValue::Integer(value)) => value.to_string(),
        Some(FieldValue::Character(Some(value))) => value.trim().to_string(),
        _ => "Unknown".to_string(),
    }
}

fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn load_error(e: shapefile::Error) -> GeoRiskError {
    GeoRiskError::DataLoad {
        source_name: "soil map".to_string(),
        reason: e.to_string(),
    }
}
