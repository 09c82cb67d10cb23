//! A few general-purpose geometry functions,
//! which might also be useful for users of this library.

use glam::DVec3;

/// Compute the signed volume of a oriented tetrahedron.
///
/// The volume is positive if `v0`, `v1` and `v2` are ordered counterclockwise,
/// as seen from v3.
pub fn signed_volume_tet(v0: DVec3, v1: DVec3, v2: DVec3, v3: DVec3) -> f64 {
    let v01 = v1 - v0;
    let v02 = v2 - v0;
    let v03 = v3 - v0;

    v01.dot(v02.cross(v03)) / 6.
}

/// Calculates the signed area of the ground face `v0`, `v1`, `v2` of the
/// tetrahedron with top `t`.
///
/// The area is positive if the the vertices are ordered counterclockwise
/// as seen from t.
pub fn signed_area_tri(v0: DVec3, v1: DVec3, v2: DVec3, t: DVec3) -> f64 {
    // Normal vector with the area of the ground face as length
    let n = 0.5 * (v1 - v0).cross(v2 - v0);
    let sign = (t - v0).dot(n).signum();
    n.length() * sign
}

/// Center of the sphere through the four points `a`, `b`, `c` and `d`.
///
/// The computation is done relative to `a`, which keeps it accurate for
/// small tetrahedra far from the origin. Returns a non-finite vector for
/// coplanar points.
pub fn circumcenter(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> DVec3 {
    let b = b - a;
    let c = c - a;
    let d = d - a;

    let c_cross_d = c.cross(d);
    let d_cross_b = d.cross(b);
    let b_cross_c = b.cross(c);
    let denominator = 2. * b.dot(c_cross_d);

    a + (b.length_squared() * c_cross_d
        + c.length_squared() * d_cross_b
        + d.length_squared() * b_cross_c)
        / denominator
}

/// Reflect `point` across the plane perpendicular to the coordinate axis
/// `axis` at coordinate `wall`.
pub fn reflect(point: DVec3, axis: usize, wall: f64) -> DVec3 {
    let mut reflected = point;
    reflected[axis] = 2. * wall - point[axis];
    reflected
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use glam::DVec3;

    use super::*;

    #[test]
    fn test_signed_volume() {
        let v0 = DVec3::ZERO;
        let v1 = DVec3::X;
        let v2 = DVec3::Y;
        let v3 = DVec3::Z;

        let volume = signed_volume_tet(v0, v1, v2, v3);
        assert_eq!(volume, 1. / 6.);

        let volume2 = signed_volume_tet(v0, v2, v1, v3);
        assert_eq!(volume, -volume2);
    }

    #[test]
    fn test_signed_area() {
        let v0 = DVec3::ZERO;
        let v1 = DVec3::X;
        let v2 = DVec3::Y;
        let t = DVec3::Z;

        let area = signed_area_tri(v0, v1, v2, t);
        assert_eq!(area, 0.5);

        let area2 = signed_area_tri(v0, v2, v1, t);
        assert_eq!(area, -area2);

        let t = DVec3::new(10., 10., 1.);
        let area3 = signed_area_tri(v0, v1, v2, t);
        assert_eq!(area, area3)
    }

    #[test]
    fn test_circumcenter() {
        let center = circumcenter(DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z);
        assert_eq!(center, DVec3::splat(0.5));

        let offset = DVec3::new(1e3, -2e3, 5e2);
        let center = circumcenter(
            offset,
            offset + DVec3::X,
            offset + DVec3::Y,
            offset + DVec3::Z,
        );
        assert_approx_eq!(f64, center.x, offset.x + 0.5, epsilon = 1e-10);
        assert_approx_eq!(f64, center.y, offset.y + 0.5, epsilon = 1e-10);
        assert_approx_eq!(f64, center.z, offset.z + 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_circumcenter_equidistant() {
        let a = DVec3::new(0.1, 0.2, 0.3);
        let b = DVec3::new(0.9, 0.1, 0.2);
        let c = DVec3::new(0.2, 0.8, 0.1);
        let d = DVec3::new(0.3, 0.3, 0.9);
        let center = circumcenter(a, b, c, d);
        let r2 = center.distance_squared(a);
        for p in [b, c, d] {
            assert_approx_eq!(f64, center.distance_squared(p), r2, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reflect() {
        let p = DVec3::new(0.25, 0.5, 0.75);
        assert_eq!(reflect(p, 0, 0.), DVec3::new(-0.25, 0.5, 0.75));
        assert_eq!(reflect(p, 2, 1.), DVec3::new(0.25, 0.5, 1.25));
    }
}
