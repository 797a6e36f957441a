//! Height/scale compositing around a fixed pivot.
//!
//! The result of one call is absolute: it depends only on the pivot, the
//! current slider values and the base transform, never on whatever matrix
//! the tileset carried before. Re-running with new values replaces the
//! previous edit instead of stacking on top of it.

use foundation::math::{Mat4, Vec3, geodetic_surface_normal};

use crate::config::TransformThresholds;

/// Composes the model matrix for a tileset pivoting at `pivot`.
///
/// `result = base * height * scale`: the uniform scale is taken about the
/// pivot, the height offset moves along the geodetic surface normal at the
/// pivot, and `base` (a ground clamp, say) is applied last.
///
/// `scale` must be positive; the save path clamps it before it gets here.
pub fn compose_transform(
    pivot: Vec3,
    height_offset: f64,
    scale: f64,
    base: Option<&Mat4>,
) -> Mat4 {
    compose_transform_with(
        &TransformThresholds::default(),
        pivot,
        height_offset,
        scale,
        base,
    )
}

pub fn compose_transform_with(
    thresholds: &TransformThresholds,
    pivot: Vec3,
    height_offset: f64,
    scale: f64,
    base: Option<&Mat4>,
) -> Mat4 {
    let height = height_matrix(thresholds, pivot, height_offset);
    let local = height * scale_matrix(thresholds, pivot, scale);
    match base {
        Some(base) => *base * local,
        None => local,
    }
}

fn scale_matrix(thresholds: &TransformThresholds, pivot: Vec3, scale: f64) -> Mat4 {
    if (scale - 1.0).abs() <= thresholds.scale_epsilon {
        return Mat4::IDENTITY;
    }
    Mat4::uniform_scale_about(pivot, scale)
}

fn height_matrix(thresholds: &TransformThresholds, pivot: Vec3, height_offset: f64) -> Mat4 {
    if height_offset.abs() <= thresholds.height_epsilon_m {
        return Mat4::IDENTITY;
    }
    // No "up" exists at the ellipsoid center.
    match geodetic_surface_normal(pivot) {
        Some(up) => Mat4::from_translation(up * height_offset),
        None => Mat4::IDENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_transform, compose_transform_with};
    use crate::config::TransformThresholds;
    use foundation::math::{EnuFrame, Geodetic, Mat4, Vec3, geodetic_to_ecef};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        assert!(
            a.distance(b) <= eps,
            "expected {a:?} ~= {b:?} (distance {})",
            a.distance(b)
        );
    }

    #[test]
    fn neutral_values_give_identity() {
        for pivot in [
            Vec3::new(100.0, 0.0, 0.0),
            geodetic_to_ecef(Geodetic::from_degrees(40.7, -74.0, 12.0)).as_vec3(),
            Vec3::ZERO,
        ] {
            assert!(compose_transform(pivot, 0.0, 1.0, None).is_identity());
        }
    }

    #[test]
    fn values_inside_thresholds_are_suppressed() {
        let pivot = Vec3::new(100.0, 0.0, 0.0);
        assert_eq!(
            compose_transform(pivot, 0.0, 1.0005, None),
            compose_transform(pivot, 0.0, 1.0, None)
        );
        assert!(compose_transform(pivot, 0.005, 1.0, None).is_identity());
        assert!(compose_transform(pivot, -0.01, 1.0, None).is_identity());
    }

    #[test]
    fn custom_thresholds_are_honoured() {
        let strict = TransformThresholds {
            scale_epsilon: 0.0,
            height_epsilon_m: 0.0,
        };
        let pivot = Vec3::new(100.0, 0.0, 0.0);
        let m = compose_transform_with(&strict, pivot, 0.005, 1.0005, None);
        assert!(!m.is_identity());
        assert_close(m.get(0, 0), 1.0005, 1e-15);
    }

    #[test]
    fn scale_keeps_pivot_fixed() {
        let pivot = geodetic_to_ecef(Geodetic::from_degrees(10.0, 20.0, 0.0)).as_vec3();
        let m = compose_transform(pivot, 0.0, 3.0, None);
        assert_vec_close(m.transform_point(pivot), pivot, 1e-6);
    }

    #[test]
    fn height_moves_along_local_up() {
        let geo = Geodetic::from_degrees(-22.9, -43.2, 0.0);
        let frame = EnuFrame::at(geo);
        let m = compose_transform(frame.origin, 25.0, 1.0, None);

        let moved = frame.to_local(m.transform_point(frame.origin));
        assert_close(moved.up, 25.0, 1e-6);
        assert_close(moved.east, 0.0, 1e-6);
        assert_close(moved.north, 0.0, 1e-6);
    }

    #[test]
    fn up_differs_between_locations() {
        let a = geodetic_to_ecef(Geodetic::from_degrees(0.0, 0.0, 0.0)).as_vec3();
        let b = geodetic_to_ecef(Geodetic::from_degrees(0.0, 90.0, 0.0)).as_vec3();
        let ta = compose_transform(a, 10.0, 1.0, None).translation();
        let tb = compose_transform(b, 10.0, 1.0, None).translation();
        assert_vec_close(ta, Vec3::new(10.0, 0.0, 0.0), 1e-9);
        assert_vec_close(tb, Vec3::new(0.0, 10.0, 0.0), 1e-9);
    }

    #[test]
    fn base_is_applied_after_the_edit() {
        let pivot = Vec3::new(100.0, 0.0, 0.0);
        let base = Mat4::from_translation(Vec3::new(0.0, 0.0, 50.0));
        let m = compose_transform(pivot, 10.0, 2.0, Some(&base));

        // base * (height * scale): scale about pivot contributes -100 on x,
        // height +10 along the normal (+x), base +50 on z untouched by scale.
        assert_eq!(m.translation(), Vec3::new(-90.0, 0.0, 50.0));

        let reversed = compose_transform(pivot, 10.0, 2.0, None) * base;
        assert_eq!(reversed.translation(), Vec3::new(-90.0, 0.0, 100.0));
    }

    #[test]
    fn does_not_touch_inputs() {
        let pivot = Vec3::new(100.0, 0.0, 0.0);
        let base = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let base_before = base;
        let _ = compose_transform(pivot, 7.0, 1.5, Some(&base));
        assert_eq!(base, base_before);
        assert_eq!(pivot, Vec3::new(100.0, 0.0, 0.0));
    }
}
