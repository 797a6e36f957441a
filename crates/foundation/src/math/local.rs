use super::{Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up coordinates (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }
}

/// Tangent-plane frame anchored at a geodetic origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EnuFrame {
    pub origin: Vec3,
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl EnuFrame {
    pub fn at(origin: Geodetic) -> Self {
        let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();
        Self {
            origin: geodetic_to_ecef(origin).as_vec3(),
            east: Vec3::new(-sin_lon, cos_lon, 0.0),
            north: Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
            up: Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
        }
    }

    pub fn to_local(&self, world: Vec3) -> Enu {
        let d = world - self.origin;
        Enu::new(d.dot(self.east), d.dot(self.north), d.dot(self.up))
    }

    pub fn to_world(&self, enu: Enu) -> Vec3 {
        self.origin + self.east * enu.east + self.north * enu.north + self.up * enu.up
    }
}

#[cfg(test)]
mod tests {
    use super::{Enu, EnuFrame};
    use crate::math::{Geodetic, geodetic_surface_normal};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn local_round_trip() {
        let frame = EnuFrame::at(Geodetic::from_degrees(51.5, -0.12, 20.0));
        let enu = Enu::new(15.0, -8.0, 2.5);
        let rt = frame.to_local(frame.to_world(enu));

        assert_close(rt.east, enu.east, 1e-6);
        assert_close(rt.north, enu.north, 1e-6);
        assert_close(rt.up, enu.up, 1e-6);
    }

    #[test]
    fn origin_maps_to_zero() {
        let frame = EnuFrame::at(Geodetic::new(0.1, -0.2, 35.0));
        let enu = frame.to_local(frame.origin);
        assert_eq!(enu, Enu::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn up_axis_is_the_surface_normal() {
        let frame = EnuFrame::at(Geodetic::from_degrees(35.68, 139.69, 0.0));
        let n = geodetic_surface_normal(frame.origin).unwrap();
        assert_close(n.dot(frame.up), 1.0, 1e-12);
    }
}
