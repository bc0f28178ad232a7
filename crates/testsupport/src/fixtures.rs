use anyhow::Result;
use georisk_models::{DataConfig, FEATURE_COUNT};
use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing, Writer};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Axis-aligned soil polygon for fixtures: lower-left corner, edge
/// length, and the SNUM attribute to stamp on it.
#[derive(Debug, Clone, Copy)]
pub struct SoilSquare {
    pub min_x: f64,
    pub min_y: f64,
    pub size: f64,
    pub snum: f64,
}

/// Write a throwaway soil shapefile (.shp/.shx/.dbf) of square polygons.
pub fn write_soil_map(path: &Path, squares: &[SoilSquare]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let table = TableWriterBuilder::new().add_numeric_field(
        FieldName::try_from("SNUM").expect("valid field name"),
        10,
        0,
    );
    let mut writer = Writer::from_path(path, table)?;

    for square in squares {
        let (x0, y0) = (square.min_x, square.min_y);
        let (x1, y1) = (square.min_x + square.size, square.min_y + square.size);
        // Outer rings run clockwise in the shapefile convention.
        let ring = PolygonRing::Outer(vec![
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
            Point::new(x0, y0),
        ]);
        let mut record = Record::default();
        record.insert("SNUM".to_string(), FieldValue::Numeric(Some(square.snum)));
        writer.write_shape_and_record(&Polygon::new(ring), &record)?;
    }

    Ok(())
}

/// Parameters for a tiny single-band GeoTIFF fixture. `origin` is the
/// model-space coordinate of the top-left pixel corner.
#[derive(Debug, Clone)]
pub struct SlopeFixture {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
    pub epsg: u16,
    pub origin: (f64, f64),
    pub pixel: (f64, f64),
    pub nodata: Option<f64>,
}

impl SlopeFixture {
    /// 1°-per-pixel geographic grid, handy for coordinate math in tests.
    pub fn geographic(width: u32, height: u32, origin: (f64, f64), values: Vec<f32>) -> Self {
        Self {
            width,
            height,
            values,
            epsg: 4326,
            origin,
            pixel: (1.0, 1.0),
            nodata: None,
        }
    }
}

pub fn write_slope_raster(path: &Path, fixture: &SlopeFixture) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(fs::File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    let mut image = encoder.new_image::<colortype::Gray32Float>(fixture.width, fixture.height)?;

    let scale = [fixture.pixel.0, fixture.pixel.1, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, fixture.origin.0, fixture.origin.1, 0.0];
    image.encoder().write_tag(Tag::Unknown(33550), &scale[..])?;
    image.encoder().write_tag(Tag::Unknown(33922), &tiepoint[..])?;

    let geokeys: Vec<u16> = if fixture.epsg == 4326 {
        vec![1, 1, 0, 2, 1024, 0, 1, 2, 2048, 0, 1, 4326]
    } else {
        vec![1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, fixture.epsg]
    };
    image.encoder().write_tag(Tag::Unknown(34735), &geokeys[..])?;

    if let Some(nodata) = fixture.nodata {
        image
            .encoder()
            .write_tag(Tag::Unknown(42113), format!("{nodata}").as_str())?;
    }

    image.write_data(&fixture.values)?;
    Ok(())
}

/// Risk-model JSON with an identity scaler and the given logistic
/// parameters.
pub fn write_risk_model(path: &Path, weights: &[f64; FEATURE_COUNT], bias: f64) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let artifact = serde_json::json!({
        "scaler": {
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
        },
        "classifier": {
            "weights": weights.to_vec(),
            "bias": bias,
        },
    });
    fs::write(path, serde_json::to_string_pretty(&artifact)?)?;
    Ok(())
}

/// Populate `root` with the production data-directory layout: one soil
/// square (SNUM 6223) and a 4x4 slope grid covering lon 0..4 / lat 46..50,
/// plus a slope-driven risk model. Returns a `DataConfig` pointing at it.
pub fn write_data_dir(root: &Path) -> Result<DataConfig> {
    let config = DataConfig {
        dir: root.to_string_lossy().into_owned(),
        soil_map: "soil_map/hays.shp".to_string(),
        slope_map: "slope_map/slope.tif".to_string(),
        risk_model: "models/landslide.json".to_string(),
    };

    write_soil_map(
        &config.soil_map_path(),
        &[SoilSquare {
            min_x: 0.0,
            min_y: 46.0,
            size: 4.0,
            snum: 6223.0,
        }],
    )?;

    let values: Vec<f32> = (0..16).map(|i| i as f32).collect();
    write_slope_raster(
        &config.slope_map_path(),
        &SlopeFixture::geographic(4, 4, (0.0, 50.0), values),
    )?;

    let mut weights = [0.0; FEATURE_COUNT];
    weights[1] = 1.0;
    write_risk_model(&config.risk_model_path(), &weights, -5.0)?;

    Ok(config)
}
