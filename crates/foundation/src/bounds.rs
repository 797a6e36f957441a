use crate::math::{Mat4, Vec3};

/// Bounding sphere as reported by the rendering engine for a tileset.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f64,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Sphere after applying `m`. The radius grows by the largest axis scale
    /// so the result still encloses the transformed volume.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let sx = m.transform_vector(Vec3::new(1.0, 0.0, 0.0)).length();
        let sy = m.transform_vector(Vec3::new(0.0, 1.0, 0.0)).length();
        let sz = m.transform_vector(Vec3::new(0.0, 0.0, 1.0)).length();
        Self {
            center: m.transform_point(self.center),
            radius: self.radius * sx.max(sy).max(sz),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingSphere;
    use crate::math::{Mat4, Vec3};

    #[test]
    fn transformed_moves_center_and_scales_radius() {
        let sphere = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 2.0);
        let m = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)) * Mat4::from_uniform_scale(3.0);
        let out = sphere.transformed(&m);
        assert_eq!(out.center, Vec3::new(3.0, 5.0, 0.0));
        assert_eq!(out.radius, 6.0);
    }
}
