use super::Vec3;

/// Earth-centered, Earth-fixed Cartesian coordinates (meters).
///
/// The rendering engine's world space is ECEF, so tileset centers and
/// pivots are expressed in this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl From<Vec3> for Ecef {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Ecef> for Vec3 {
    fn from(e: Ecef) -> Self {
        e.as_vec3()
    }
}
