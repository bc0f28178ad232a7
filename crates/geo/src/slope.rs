use crate::crs::Crs;
use georisk_models::GeoRiskError;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;

// GeoTIFF tags.
const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GDAL_NODATA: u16 = 42113;

// GeoKey ids.
const GT_MODEL_TYPE: u16 = 1024;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

/// Single-band slope raster, decoded fully at load time. The grid is
/// immutable for the life of the process, so holding it in memory and
/// sampling per request replaces the original's reopen-per-query access.
pub struct SlopeRaster {
    width: usize,
    height: usize,
    band_stride: usize,
    data: Vec<f64>,
    nodata: Option<f64>,
    tie_raster: (f64, f64),
    tie_model: (f64, f64),
    pixel: (f64, f64),
    crs: Crs,
}

impl SlopeRaster {
    pub fn load(path: &Path) -> Result<Self, GeoRiskError> {
        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let mut decoder =
            Decoder::new(BufReader::new(file)).map_err(|e| load_error(e.to_string()))?;

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| load_error(e.to_string()))?;
        let (width, height) = (width as usize, height as usize);
        if width == 0 || height == 0 {
            return Err(load_error("raster has no pixels".to_string()));
        }

        let scale = f64_tag(&mut decoder, MODEL_PIXEL_SCALE)
            .filter(|v| v.len() >= 2 && v[0] != 0.0 && v[1] != 0.0)
            .ok_or_else(|| load_error("missing or degenerate ModelPixelScale".to_string()))?;
        let tie = f64_tag(&mut decoder, MODEL_TIEPOINT)
            .filter(|v| v.len() >= 6)
            .ok_or_else(|| load_error("missing ModelTiepoint".to_string()))?;

        let geokeys = u16_tag(&mut decoder, GEO_KEY_DIRECTORY)
            .ok_or_else(|| load_error("missing GeoKey directory".to_string()))?;
        let epsg = epsg_from_geokeys(&geokeys)
            .ok_or_else(|| load_error("GeoKey directory names no CRS".to_string()))?;
        let crs = Crs::from_epsg(epsg)?;

        let nodata = ascii_tag(&mut decoder, GDAL_NODATA).and_then(|s| s.trim().parse::<f64>().ok());

        let data = decode_band(&mut decoder)?;
        if data.is_empty() || data.len() % (width * height) != 0 {
            return Err(load_error(format!(
                "sample count {} does not tile {}x{} grid",
                data.len(),
                width,
                height
            )));
        }
        let band_stride = data.len() / (width * height);

        Ok(Self {
            width,
            height,
            band_stride,
            data,
            nodata,
            tie_raster: (tie[0], tie[1]),
            tie_model: (tie[3], tie[4]),
            pixel: (scale[0], scale[1]),
            crs,
        })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Slope value at a WGS84 coordinate, or `None` when the point falls
    /// outside the grid or on a nodata cell.
    pub fn sample(&self, lon: f64, lat: f64) -> Option<f64> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let (x, y) = self.crs.forward(lon, lat);

        let col = self.tie_raster.0 + (x - self.tie_model.0) / self.pixel.0;
        let row = self.tie_raster.1 + (self.tie_model.1 - y) / self.pixel.1;
        if !col.is_finite() || !row.is_finite() || col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col.floor() as usize, row.floor() as usize);
        if col >= self.width || row >= self.height {
            return None;
        }

        let value = self.data[(row * self.width + col) * self.band_stride];
        if !value.is_finite() {
            return None;
        }
        if self.nodata.is_some_and(|nd| value == nd) {
            return None;
        }
        Some(value)
    }
}

fn decode_band<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f64>, GeoRiskError> {
    let image = decoder
        .read_image()
        .map_err(|e| load_error(e.to_string()))?;
    let data = match image {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        _ => {
            return Err(load_error(
                "unsupported raster sample format".to_string(),
            ))
        }
    };
    Ok(data)
}

fn f64_tag<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Option<Vec<f64>> {
    decoder
        .find_tag(Tag::from_u16_exhaustive(code))
        .ok()
        .flatten()
        .and_then(|value| value.into_f64_vec().ok())
}

fn u16_tag<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Option<Vec<u16>> {
    decoder
        .find_tag(Tag::from_u16_exhaustive(code))
        .ok()
        .flatten()
        .and_then(|value| value.into_u16_vec().ok())
}

fn ascii_tag<R: Read + Seek>(decoder: &mut Decoder<R>, code: u16) -> Option<String> {
    decoder
        .find_tag(Tag::from_u16_exhaustive(code))
        .ok()
        .flatten()
        .and_then(|value| value.into_string().ok())
}

/// Walk the GeoKey directory (header of 4 shorts, then 4-short entries)
/// for the EPSG code. Inline values only; none of the keys we read are
/// stored through an auxiliary tag.
fn epsg_from_geokeys(keys: &[u16]) -> Option<u32> {
    if keys.len() < 4 {
        return None;
    }
    let count = keys[3] as usize;

    let mut model_type = None;
    let mut geographic = None;
    let mut projected = None;
    for entry in 0..count {
        let offset = 4 + entry * 4;
        if offset + 3 >= keys.len() {
            break;
        }
        let (id, location, value) = (keys[offset], keys[offset + 1], keys[offset + 3]);
        if location != 0 {
            continue;
        }
        match id {
            GT_MODEL_TYPE => model_type = Some(value),
            GEOGRAPHIC_TYPE => geographic = Some(value),
            PROJECTED_CS_TYPE => projected = Some(value),
            _ => {}
        }
    }

    match model_type {
        Some(1) => projected.map(u32::from),
        Some(2) => geographic.map(u32::from),
        _ => projected.or(geographic).map(u32::from),
    }
}

fn load_error(reason: String) -> GeoRiskError {
    GeoRiskError::DataLoad {
        source_name: "slope raster".to_string(),
        reason,
    }
}
