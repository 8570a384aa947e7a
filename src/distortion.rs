//! Brown-Conrady lens distortion on normalized image coordinates.
//!
//! Results are undefined outside the calibrated field of view: the polynomial
//! grows without bound and nothing here clamps or reports it.

use nalgebra::Point2;

const UNDISTORT_ITERATIONS: usize = 20;
const UNDISTORT_EPS: f64 = 1e-12;

/// Coefficients in file order: k1, k2, p1, p2, k3.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DistortionCoeffs {
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
}

impl DistortionCoeffs {
    pub fn new(k1: f64, k2: f64, p1: f64, p2: f64, k3: f64) -> DistortionCoeffs {
        DistortionCoeffs { k1, k2, p1, p2, k3 }
    }

    pub fn from_array(v: [f64; 5]) -> DistortionCoeffs {
        DistortionCoeffs::new(v[0], v[1], v[2], v[3], v[4])
    }

    pub fn to_array(&self) -> [f64; 5] {
        [self.k1, self.k2, self.p1, self.p2, self.k3]
    }

    pub fn is_zero(&self) -> bool {
        self.to_array().iter().all(|c| *c == 0.0)
    }

    fn radial(&self, r2: f64) -> f64 {
        1.0 + self.k1 * r2 + self.k2 * r2 * r2 + self.k3 * r2 * r2 * r2
    }

    fn tangential(&self, x: f64, y: f64, r2: f64) -> (f64, f64) {
        let dx = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let dy = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        (dx, dy)
    }
}

/// Applies the radial + tangential model to a normalized point.
pub fn correct(point: &Point2<f64>, coeffs: &DistortionCoeffs) -> Point2<f64> {
    let (x, y) = (point.x, point.y);
    let r2 = x * x + y * y;
    let radial = coeffs.radial(r2);
    let (dx, dy) = coeffs.tangential(x, y, r2);
    Point2::new(x * radial + dx, y * radial + dy)
}

/// Inverse of [`correct`] by fixed-point iteration, starting from the
/// distorted point itself. Converges for moderate distortion inside the
/// calibrated field of view.
pub fn undistort(point: &Point2<f64>, coeffs: &DistortionCoeffs) -> Point2<f64> {
    if coeffs.is_zero() {
        return *point;
    }
    let mut x = point.x;
    let mut y = point.y;
    for _ in 0..UNDISTORT_ITERATIONS {
        let r2 = x * x + y * y;
        let radial = coeffs.radial(r2);
        if radial == 0.0 {
            break;
        }
        let (dx, dy) = coeffs.tangential(x, y, r2);
        let nx = (point.x - dx) / radial;
        let ny = (point.y - dy) / radial;
        let step = (nx - x).abs().max((ny - y).abs());
        x = nx;
        y = ny;
        if step < UNDISTORT_EPS {
            break;
        }
    }
    Point2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn typical() -> DistortionCoeffs {
        DistortionCoeffs::new(0.12, -0.25, 0.001, -0.0005, 0.08)
    }

    #[test]
    fn center_is_fixed_point() {
        let origin = Point2::origin();
        for coeffs in [
            typical(),
            DistortionCoeffs::new(5.0, -3.0, 0.7, 0.9, 11.0),
            DistortionCoeffs::default(),
        ] {
            assert_eq!(correct(&origin, &coeffs), origin);
        }
    }

    #[test]
    fn zero_coefficients_are_identity() {
        let p = Point2::new(0.4, -0.3);
        assert_eq!(correct(&p, &DistortionCoeffs::default()), p);
        assert_eq!(undistort(&p, &DistortionCoeffs::default()), p);
    }

    #[test]
    fn radial_only_matches_closed_form() {
        let coeffs = DistortionCoeffs::new(0.1, 0.01, 0.0, 0.0, 0.001);
        let p = Point2::new(0.3, 0.4);
        // r2 = 0.25
        let radial = 1.0 + 0.1 * 0.25 + 0.01 * 0.0625 + 0.001 * 0.015625;
        let out = correct(&p, &coeffs);
        assert_relative_eq!(out.x, 0.3 * radial, epsilon = 1e-15);
        assert_relative_eq!(out.y, 0.4 * radial, epsilon = 1e-15);
    }

    #[test]
    fn tangential_only_matches_closed_form() {
        let coeffs = DistortionCoeffs::new(0.0, 0.0, 0.01, 0.02, 0.0);
        let p = Point2::new(0.5, -0.2);
        let r2 = 0.29;
        let out = correct(&p, &coeffs);
        assert_relative_eq!(
            out.x,
            0.5 + 2.0 * 0.01 * 0.5 * -0.2 + 0.02 * (r2 + 2.0 * 0.25),
            epsilon = 1e-15
        );
        assert_relative_eq!(
            out.y,
            -0.2 + 0.01 * (r2 + 2.0 * 0.04) + 2.0 * 0.02 * 0.5 * -0.2,
            epsilon = 1e-15
        );
    }

    #[test]
    fn undistort_inverts_correct() {
        let coeffs = typical();
        for p in [
            Point2::new(0.1, 0.05),
            Point2::new(-0.3, 0.2),
            Point2::new(0.25, -0.25),
        ] {
            let back = undistort(&correct(&p, &coeffs), &coeffs);
            assert_relative_eq!(back, p, epsilon = 1e-9);
        }
    }

    #[test]
    fn array_order_is_k1_k2_p1_p2_k3() {
        let c = DistortionCoeffs::from_array([1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!((c.k1, c.k2, c.p1, c.p2, c.k3), (1.0, 2.0, 3.0, 4.0, 5.0));
        assert_eq!(c.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0]);
    }
}
