use georisk_models::GeoRiskError;

// WGS84 ellipsoid.
const SEMI_MAJOR: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;
const UTM_SCALE: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Coordinate reference systems a slope raster may be georeferenced in.
/// Queries always arrive as WGS84 lon/lat and are projected forward into
/// the raster's system before indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326, raster grid addressed directly in degrees.
    Geographic,
    /// EPSG:3857.
    WebMercator,
    /// EPSG:326xx (north) / EPSG:327xx (south).
    Utm { zone: u8, north: bool },
}

impl Crs {
    pub fn from_epsg(code: u32) -> Result<Self, GeoRiskError> {
        match code {
            4326 => Ok(Crs::Geographic),
            3857 => Ok(Crs::WebMercator),
            32601..=32660 => Ok(Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Ok(Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            code => Err(GeoRiskError::UnsupportedCrs { code }),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Geographic => 4326,
            Crs::WebMercator => 3857,
            Crs::Utm { zone, north: true } => 32600 + u32::from(*zone),
            Crs::Utm { zone, north: false } => 32700 + u32::from(*zone),
        }
    }

    /// Forward projection of WGS84 lon/lat (degrees) into this system.
    pub fn forward(&self, lon: f64, lat: f64) -> (f64, f64) {
        match self {
            Crs::Geographic => (lon, lat),
            Crs::WebMercator => web_mercator_forward(lon, lat),
            Crs::Utm { zone, north } => utm_forward(*zone, *north, lon, lat),
        }
    }
}

fn web_mercator_forward(lon: f64, lat: f64) -> (f64, f64) {
    let x = SEMI_MAJOR * lon.to_radians();
    let y = SEMI_MAJOR * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Transverse Mercator series expansion (USGS style) on the WGS84
/// ellipsoid. Accurate to well under a meter inside a UTM zone, which is
/// far finer than a slope raster's cell size.
fn utm_forward(zone: u8, north: bool, lon: f64, lat: f64) -> (f64, f64) {
    let e2 = FLATTENING * (2.0 - FLATTENING);
    let e4 = e2 * e2;
    let e6 = e4 * e2;
    let ep2 = e2 / (1.0 - e2);

    let phi = lat.to_radians();
    let lam = lon.to_radians();
    let lam0 = f64::from(i32::from(zone) * 6 - 183).to_radians();

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let tan_phi = phi.tan();

    let nu = SEMI_MAJOR / (1.0 - e2 * sin_phi * sin_phi).sqrt();
    let t = tan_phi * tan_phi;
    let c = ep2 * cos_phi * cos_phi;
    let a = cos_phi * (lam - lam0);

    let m = SEMI_MAJOR
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin());

    let easting = UTM_FALSE_EASTING
        + UTM_SCALE
            * nu
            * (a + (1.0 - t + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);

    let mut northing = UTM_SCALE
        * (m + nu
            * tan_phi
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if !north {
        northing += UTM_FALSE_NORTHING_SOUTH;
    }

    (easting, northing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_codes_resolve() {
        assert_eq!(Crs::from_epsg(4326).unwrap(), Crs::Geographic);
        assert_eq!(Crs::from_epsg(3857).unwrap(), Crs::WebMercator);
        assert_eq!(
            Crs::from_epsg(32614).unwrap(),
            Crs::Utm {
                zone: 14,
                north: true
            }
        );
        assert_eq!(
            Crs::from_epsg(32733).unwrap(),
            Crs::Utm {
                zone: 33,
                north: false
            }
        );
        assert!(matches!(
            Crs::from_epsg(2230),
            Err(GeoRiskError::UnsupportedCrs { code: 2230 })
        ));
    }

    #[test]
    fn epsg_round_trips() {
        for code in [4326_u32, 3857, 32601, 32614, 32660, 32733] {
            assert_eq!(Crs::from_epsg(code).unwrap().epsg(), code);
        }
    }

    #[test]
    fn geographic_is_identity() {
        assert_eq!(Crs::Geographic.forward(-97.9, 30.05), (-97.9, 30.05));
    }

    #[test]
    fn utm_central_meridian_hits_false_easting() {
        // Zone 14 central meridian is 99°W.
        let (easting, northing) = Crs::from_epsg(32614).unwrap().forward(-99.0, 0.0);
        assert!((easting - 500_000.0).abs() < 1e-6);
        assert!(northing.abs() < 1e-6);
    }

    #[test]
    fn utm_northing_grows_with_latitude() {
        let crs = Crs::from_epsg(32614).unwrap();
        let (_, n30) = crs.forward(-99.0, 30.0);
        let (_, n45) = crs.forward(-99.0, 45.0);
        assert!(n30 > 3_200_000.0 && n30 < 3_400_000.0);
        assert!(n45 > 4_900_000.0 && n45 < 5_050_000.0);
        assert!(n45 > n30);
    }

    #[test]
    fn utm_easting_grows_eastward() {
        let crs = Crs::from_epsg(32614).unwrap();
        let (west, _) = crs.forward(-99.5, 30.0);
        let (east, _) = crs.forward(-98.5, 30.0);
        assert!(west < 500_000.0 && east > 500_000.0);
    }

    #[test]
    fn utm_south_offsets_false_northing() {
        let crs = Crs::from_epsg(32733).unwrap();
        let (_, northing) = crs.forward(15.0, -10.0);
        assert!(northing > 8_800_000.0 && northing < 9_000_000.0);
    }

    #[test]
    fn web_mercator_origin_and_edge() {
        let (x0, y0) = Crs::WebMercator.forward(0.0, 0.0);
        assert!(x0.abs() < 1e-9 && y0.abs() < 1e-9);

        let (x_edge, _) = Crs::WebMercator.forward(180.0, 0.0);
        assert!((x_edge - 20_037_508.342_789_244).abs() < 1e-3);
    }
}
