use super::{Ecef, Vec3};

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);

// (x/a², y/a², z/b²) scaled by a²; keeps the components near unit size.
const A2_OVER_B2: f64 = (WGS84_A * WGS84_A) / (WGS84_B * WGS84_B);

/// Geodetic coordinates in radians and meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();

    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Ecef::new(
        (n + geo.alt_m) * cos_lat * cos_lon,
        (n + geo.alt_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.alt_m) * sin_lat,
    )
}

/// Outward unit normal of the WGS84 ellipsoid family at `p`.
///
/// This is local "up" for a point in engine world space. Returns `None` at
/// the ellipsoid center, where no direction is defined.
pub fn geodetic_surface_normal(p: Vec3) -> Option<Vec3> {
    Vec3::new(p.x, p.y, p.z * A2_OVER_B2).normalized()
}

#[cfg(test)]
mod tests {
    use super::{Geodetic, WGS84_A, WGS84_B, geodetic_surface_normal, geodetic_to_ecef};
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        let ecef = geodetic_to_ecef(Geodetic::new(0.0, 0.0, 0.0));
        assert_close(ecef.x, WGS84_A, 1e-6);
        assert_close(ecef.y, 0.0, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn geodetic_to_ecef_north_pole() {
        let ecef = geodetic_to_ecef(Geodetic::from_degrees(90.0, 0.0, 0.0));
        assert_close(ecef.x, 0.0, 1e-6);
        assert_close(ecef.z, WGS84_B, 1e-6);
    }

    #[test]
    fn surface_normal_on_axes() {
        assert_eq!(
            geodetic_surface_normal(Vec3::new(100.0, 0.0, 0.0)),
            Some(Vec3::new(1.0, 0.0, 0.0))
        );
        assert_eq!(
            geodetic_surface_normal(Vec3::new(0.0, 0.0, -WGS84_B)),
            Some(Vec3::new(0.0, 0.0, -1.0))
        );
    }

    #[test]
    fn surface_normal_matches_geodetic_up() {
        let geo = Geodetic::from_degrees(-33.8688, 151.2093, 0.0);
        let p = geodetic_to_ecef(geo).as_vec3();
        let n = geodetic_surface_normal(p).unwrap();

        let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();
        assert_close(n.x, cos_lat * cos_lon, 1e-12);
        assert_close(n.y, cos_lat * sin_lon, 1e-12);
        assert_close(n.z, sin_lat, 1e-12);
    }

    #[test]
    fn surface_normal_is_not_geocentric_off_the_equator() {
        // At 45N the geodetic normal leans away from the center-to-point ray.
        let p = geodetic_to_ecef(Geodetic::from_degrees(45.0, 0.0, 0.0)).as_vec3();
        let n = geodetic_surface_normal(p).unwrap();
        let radial = p.normalized().unwrap();
        assert!(n.dot(radial) < 1.0 - 1e-6);
    }

    #[test]
    fn no_normal_at_center() {
        assert_eq!(geodetic_surface_normal(Vec3::ZERO), None);
    }
}
