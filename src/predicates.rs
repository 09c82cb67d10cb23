//! Exact geometric predicates.
//!
//! Both predicates expect coordinates that were rescaled into `[1, 2)` (see
//! [`SimulationBoundary::rescale`](crate::SimulationBoundary::rescale)). In
//! that range all coordinate differences are exact in double precision, and
//! the 52 mantissa bits of a coordinate can be reinterpreted as an integer
//! coordinate on a uniform grid. A fast floating point evaluation with a
//! static error bound is tried first; only when it cannot certify the sign,
//! the determinant is evaluated exactly with arbitrary precision integers.

#[cfg(feature = "dashu")]
use dashu::Integer;
use glam::DVec3;
#[cfg(feature = "ibig")]
use ibig::IBig as Integer;
#[cfg(feature = "malachite")]
use malachite_base::num::arithmetic::traits::Sign;
#[cfg(feature = "malachite")]
use malachite_nz::integer::Integer;
#[cfg(feature = "num_bigint")]
use num_bigint::{BigInt as Integer, Sign};
#[cfg(feature = "rug")]
use rug::Integer;
#[cfg(feature = "malachite")]
use std::cmp::Ordering;

/// Relative error bound of the floating point orientation determinant.
const ORIENT3D_ERRBOUND: f64 = 1e-14;
/// Relative error bound of the floating point in-sphere determinant.
const IN_SPHERE_ERRBOUND: f64 = 1e-13;
const MANTISSA_MASK: u64 = 0xFFFFFFFFFFFFF;

/// Orientation of the tetrahedron `a`, `b`, `c`, `d`.
///
/// Positive if `a`, `b` and `c` are ordered counterclockwise as seen from `d`,
/// negative if they are ordered clockwise and zero if the four points are
/// coplanar. Only the sign of the result is meaningful.
pub fn orient3d(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    let (det, permanent) = det3_with_permanent(b - a, c - a, d - a);
    if det.abs() > ORIENT3D_ERRBOUND * permanent {
        return det;
    }
    orient3d_exact(&mantissas(a), &mantissas(b), &mantissas(c), &mantissas(d))
}

/// Test whether `e` lies inside the circumsphere of the positively oriented
/// tetrahedron `a`, `b`, `c`, `d`.
///
/// Negative if `e` lies strictly inside, positive if it lies strictly outside
/// and zero if the five points are co-spherical. The sign is reversed for a
/// negatively oriented tetrahedron.
pub fn in_sphere(pa: DVec3, pb: DVec3, pc: DVec3, pd: DVec3, pe: DVec3) -> f64 {
    let b = pb - pa;
    let c = pc - pa;
    let d = pd - pa;
    let e = pe - pa;
    let (b_w, c_w, d_w, e_w) = (
        b.length_squared(),
        c.length_squared(),
        d.length_squared(),
        e.length_squared(),
    );

    // Develop the 4×4 determinant with columns (x, |x|²) over its last row.
    let (cde, cde_perm) = det3_with_permanent(c, d, e);
    let (bde, bde_perm) = det3_with_permanent(b, d, e);
    let (bce, bce_perm) = det3_with_permanent(b, c, e);
    let (bcd, bcd_perm) = det3_with_permanent(b, c, d);
    let det = -b_w * cde + c_w * bde - d_w * bce + e_w * bcd;
    let permanent = b_w * cde_perm + c_w * bde_perm + d_w * bce_perm + e_w * bcd_perm;
    if det.abs() > IN_SPHERE_ERRBOUND * permanent {
        return det;
    }
    in_sphere_exact(
        &mantissas(pa),
        &mantissas(pb),
        &mantissas(pc),
        &mantissas(pd),
        &mantissas(pe),
    )
}

/// Determinant of the 3×3 matrix with columns `b`, `c`, `d`, together with
/// the permanent of the absolute values of its entries.
fn det3_with_permanent(b: DVec3, c: DVec3, d: DVec3) -> (f64, f64) {
    let cy_dz = c.y * d.z;
    let cz_dy = c.z * d.y;
    let cz_dx = c.z * d.x;
    let cx_dz = c.x * d.z;
    let cx_dy = c.x * d.y;
    let cy_dx = c.y * d.x;
    let det = b.x * (cy_dz - cz_dy) + b.y * (cz_dx - cx_dz) + b.z * (cx_dy - cy_dx);
    let permanent = b.x.abs() * (cy_dz.abs() + cz_dy.abs())
        + b.y.abs() * (cz_dx.abs() + cx_dz.abs())
        + b.z.abs() * (cx_dy.abs() + cy_dx.abs());
    (det, permanent)
}

/// Integer grid coordinates of a rescaled point.
fn mantissas(x: DVec3) -> [i64; 3] {
    debug_assert!(x.cmpge(DVec3::ONE).all() && x.cmplt(DVec3::splat(2.)).all());
    // Only the mantissa bits differ between numbers in [1, 2), so these are
    // the coordinates on a uniform grid with spacing 2^-52.
    [
        (x.x.to_bits() & MANTISSA_MASK) as i64,
        (x.y.to_bits() & MANTISSA_MASK) as i64,
        (x.z.to_bits() & MANTISSA_MASK) as i64,
    ]
}

macro_rules! big_int_diff {
    ($a:expr, $b:expr) => {{
        [
            Integer::from($a[0] - $b[0]),
            Integer::from($a[1] - $b[1]),
            Integer::from($a[2] - $b[2]),
        ]
    }};
}

macro_rules! big_int_lifted {
    ($a:expr, $b:expr) => {{
        let [x, y, z] = big_int_diff!($a, $b);
        let mut norm2 = Integer::default();
        norm2 += &x * &x;
        norm2 += &y * &y;
        norm2 += &z * &z;
        [x, y, z, norm2]
    }};
}

macro_rules! big_int_det2x2 {
    ($a:expr, $b:expr, $c:expr, $d:expr, $det:expr) => {{
        $det = Integer::default();
        $det += &$a * &$d;
        $det -= &$b * &$c;
    }};
}

macro_rules! big_int_det3x3 {
    ($a0:expr, $a1:expr, $a2:expr, $b0:expr, $b1:expr, $b2:expr, $c0:expr, $c1:expr, $c2:expr, $tmp:expr, $det:expr) => {
        $det = Integer::default();
        big_int_det2x2!($b1, $b2, $c1, $c2, $tmp);
        $det += &$a0 * &$tmp;
        big_int_det2x2!($b0, $b2, $c0, $c2, $tmp);
        $det -= &$a1 * &$tmp;
        big_int_det2x2!($b0, $b1, $c0, $c1, $tmp);
        $det += &$a2 * &$tmp;
    };
}

fn orient3d_exact(a: &[i64; 3], b: &[i64; 3], c: &[i64; 3], d: &[i64; 3]) -> f64 {
    let b = big_int_diff!(b, a);
    let c = big_int_diff!(c, a);
    let d = big_int_diff!(d, a);

    let mut tmp: Integer;
    let mut det: Integer;
    big_int_det3x3!(b[0], b[1], b[2], c[0], c[1], c[2], d[0], d[1], d[2], tmp, det);

    sign(det)
}

fn in_sphere_exact(a: &[i64; 3], b: &[i64; 3], c: &[i64; 3], d: &[i64; 3], e: &[i64; 3]) -> f64 {
    let b = big_int_lifted!(b, a);
    let c = big_int_lifted!(c, a);
    let d = big_int_lifted!(d, a);
    let e = big_int_lifted!(e, a);

    let mut determinant = Integer::default();
    let mut tmp: Integer;
    let mut det: Integer;
    big_int_det3x3!(c[0], c[1], c[2], d[0], d[1], d[2], e[0], e[1], e[2], tmp, det);
    determinant -= &b[3] * &det;
    big_int_det3x3!(b[0], b[1], b[2], d[0], d[1], d[2], e[0], e[1], e[2], tmp, det);
    determinant += &c[3] * &det;
    big_int_det3x3!(b[0], b[1], b[2], c[0], c[1], c[2], e[0], e[1], e[2], tmp, det);
    determinant -= &d[3] * &det;
    big_int_det3x3!(b[0], b[1], b[2], c[0], c[1], c[2], d[0], d[1], d[2], tmp, det);
    determinant += &e[3] * &det;

    sign(determinant)
}

fn sign(value: Integer) -> f64 {
    #[cfg(any(feature = "dashu", feature = "ibig", feature = "rug"))]
    let result = value.signum().to_f64();
    #[cfg(feature = "dashu")]
    let result = result.value();
    #[cfg(feature = "malachite")]
    let result = match value.sign() {
        Ordering::Less => -1.0,
        Ordering::Equal => 0.0,
        Ordering::Greater => 1.0,
    };
    #[cfg(feature = "num_bigint")]
    let result = match value.sign() {
        Sign::Minus => -1.0,
        Sign::NoSign => 0.0,
        Sign::Plus => 1.0,
    };

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rescaled(x: f64, y: f64, z: f64) -> DVec3 {
        DVec3::ONE + 0.25 * DVec3::new(x, y, z)
    }

    #[test]
    fn test_orient3d_sign() {
        let a = rescaled(0., 0., 0.);
        let b = rescaled(1., 0., 0.);
        let c = rescaled(0., 1., 0.);
        let d = rescaled(0., 0., 1.);
        assert!(orient3d(a, b, c, d) > 0.);
        assert!(orient3d(a, c, b, d) < 0.);
        assert!(orient3d(b, c, d, a) < 0.);
    }

    #[test]
    fn test_orient3d_coplanar() {
        let a = rescaled(0., 0., 0.5);
        let b = rescaled(1., 0., 0.5);
        let c = rescaled(0., 1., 0.5);
        let d = rescaled(0.75, 0.75, 0.5);
        assert_eq!(orient3d(a, b, c, d), 0.);
    }

    #[test]
    fn test_orient3d_exact_fallback() {
        // A tetrahedron spanning a single grid step.
        let a = DVec3::splat(1.5);
        let b = DVec3::new(1.5 + f64::EPSILON, 1.5, 1.5);
        let c = DVec3::new(1.5, 1.5 + f64::EPSILON, 1.5);
        let d = DVec3::new(1.5, 1.5, 1.5 + f64::EPSILON);
        assert_eq!(orient3d_exact(&mantissas(a), &mantissas(b), &mantissas(c), &mantissas(d)), 1.);
        assert!(orient3d(a, b, c, d) > 0.);
        assert!(orient3d(a, c, b, d) < 0.);
    }

    #[test]
    fn test_in_sphere_sign() {
        let a = rescaled(0., 0., 0.);
        let b = rescaled(1., 0., 0.);
        let c = rescaled(0., 1., 0.);
        let d = rescaled(0., 0., 1.);
        assert!(in_sphere(a, b, c, d, rescaled(0.25, 0.25, 0.25)) < 0.);
        assert!(in_sphere(a, b, c, d, rescaled(2., 2., 2.)) > 0.);
        // swapping two vertices inverts the orientation and hence the sign
        assert!(in_sphere(a, c, b, d, rescaled(0.25, 0.25, 0.25)) > 0.);
    }

    #[test]
    fn test_in_sphere_cospherical() {
        // Corners of a cube all lie on its circumsphere.
        let a = rescaled(0., 0., 0.);
        let b = rescaled(1., 0., 0.);
        let c = rescaled(0., 1., 0.);
        let d = rescaled(0., 0., 1.);
        for e in [
            rescaled(1., 1., 0.),
            rescaled(1., 0., 1.),
            rescaled(0., 1., 1.),
            rescaled(1., 1., 1.),
        ] {
            assert_eq!(in_sphere(a, b, c, d, e), 0.);
        }
    }

    #[test]
    fn test_exact_agrees_with_filter() {
        let a = rescaled(0.1, 0.2, 0.3);
        let b = rescaled(0.9, 0.1, 0.2);
        let c = rescaled(0.2, 0.8, 0.1);
        let d = rescaled(0.3, 0.3, 0.9);
        let inside = rescaled(0.4, 0.4, 0.4);
        let outside = rescaled(3., 3., 3.);
        let m = |x| mantissas(x);
        assert_eq!(
            orient3d(a, b, c, d).signum(),
            orient3d_exact(&m(a), &m(b), &m(c), &m(d))
        );
        assert_eq!(in_sphere_exact(&m(a), &m(b), &m(c), &m(d), &m(inside)), -1.);
        assert_eq!(in_sphere_exact(&m(a), &m(b), &m(c), &m(d), &m(outside)), 1.);
    }
}
