use super::Vec3;

/// 4x4 affine transform in `f64`, stored column-major (`m[col * 4 + row]`)
/// to match the layout the rendering engine reads model matrices in.
///
/// Multiplication follows the column-vector convention: `(a * b) * p`
/// applies `b` first, then `a`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    m: [f64; 16],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_cols_array(m: [f64; 16]) -> Self {
        Self { m }
    }

    pub fn to_cols_array(&self) -> [f64; 16] {
        self.m
    }

    pub fn from_translation(t: Vec3) -> Self {
        let mut out = Self::IDENTITY;
        out.m[12] = t.x;
        out.m[13] = t.y;
        out.m[14] = t.z;
        out
    }

    pub fn from_uniform_scale(s: f64) -> Self {
        let mut out = Self::IDENTITY;
        out.m[0] = s;
        out.m[5] = s;
        out.m[10] = s;
        out
    }

    /// Uniform scale that keeps `pivot` fixed.
    ///
    /// Equivalent to `T(pivot) * S(s) * T(-pivot)`, written out directly so
    /// no intermediate products are rounded.
    pub fn uniform_scale_about(pivot: Vec3, s: f64) -> Self {
        let mut out = Self::from_uniform_scale(s);
        let k = 1.0 - s;
        out.m[12] = pivot.x * k;
        out.m[13] = pivot.y * k;
        out.m[14] = pivot.z * k;
        out
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[12], self.m[13], self.m[14])
    }

    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12],
            m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13],
            m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14],
        )
    }

    /// Transforms a direction (ignores translation).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z,
            m[1] * v.x + m[5] * v.y + m[9] * v.z,
            m[2] * v.x + m[6] * v.y + m[10] * v.z,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.m
            .iter()
            .zip(other.m.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [0.0; 16];
        for col in 0..4 {
            for row in 0..4 {
                out[col * 4 + row] = a[row] * b[col * 4]
                    + a[4 + row] * b[col * 4 + 1]
                    + a[8 + row] * b[col * 4 + 2]
                    + a[12 + row] * b[col * 4 + 3];
            }
        }
        Self { m: out }
    }
}

#[cfg(test)]
mod tests {
    use super::Mat4;
    use crate::math::Vec3;

    #[test]
    fn identity_is_neutral_for_mul() {
        let t = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Mat4::IDENTITY * t, t);
        assert_eq!(t * Mat4::IDENTITY, t);
    }

    #[test]
    fn translation_is_stored_in_last_column() {
        let t = Mat4::from_translation(Vec3::new(4.0, -5.0, 6.0));
        assert_eq!(t.get(0, 3), 4.0);
        assert_eq!(t.get(1, 3), -5.0);
        assert_eq!(t.get(2, 3), 6.0);
        assert_eq!(t.translation(), Vec3::new(4.0, -5.0, 6.0));
    }

    #[test]
    fn scale_about_pivot_keeps_pivot_fixed() {
        let pivot = Vec3::new(10.0, -3.0, 2.0);
        let m = Mat4::uniform_scale_about(pivot, 3.0);
        assert_eq!(m.transform_point(pivot), pivot);

        let p = pivot + Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(m.transform_point(p), pivot + Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn scale_about_pivot_matches_explicit_product() {
        let pivot = Vec3::new(7.0, 1.0, -2.0);
        let explicit = Mat4::from_translation(pivot)
            * Mat4::from_uniform_scale(0.5)
            * Mat4::from_translation(-pivot);
        assert!(Mat4::uniform_scale_about(pivot, 0.5).approx_eq(&explicit, 1e-12));
    }

    #[test]
    fn product_applies_right_operand_first() {
        let t = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let s = Mat4::from_uniform_scale(2.0);
        let p = Vec3::new(1.0, 1.0, 1.0);
        // Scale first, then translate.
        assert_eq!((t * s).transform_point(p), Vec3::new(3.0, 2.0, 2.0));
        // Translate first, then scale.
        assert_eq!((s * t).transform_point(p), Vec3::new(4.0, 2.0, 2.0));
    }

    #[test]
    fn vectors_ignore_translation() {
        let t = Mat4::from_translation(Vec3::new(100.0, 100.0, 100.0));
        assert_eq!(
            t.transform_vector(Vec3::new(1.0, 0.0, 0.0)),
            Vec3::new(1.0, 0.0, 0.0)
        );
    }
}
