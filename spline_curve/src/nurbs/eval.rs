//! Point, derivative, curvature and arc length evaluation.

use nalgebra::Vector3;

use super::basis;
use super::knot;
use super::Curve;
use crate::error::ServiceError;

/// Gauss-Legendre 5 point rule on [-1, 1].
const GAUSS_NODES: [f64; 5] = [
    0.0,
    -0.538_469_310_105_683_1,
    0.538_469_310_105_683_1,
    -0.906_179_845_938_664_0,
    0.906_179_845_938_664_0,
];
const GAUSS_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];
const MAX_BISECTIONS: u32 = 24;

pub(crate) fn pad(coords: &[f64]) -> Vector3<f64> {
    Vector3::new(coords[0], coords[1], coords.get(2).copied().unwrap_or(0.0))
}

/// `C(t), C'(t), ..., C^(count)(t)` with `t` clamped to the knot range.
pub(crate) fn derivatives(curve: &Curve, t: f64, count: usize) -> Vec<Vector3<f64>> {
    let (start, end) = curve.knot_range();
    let t = t.clamp(start, end);
    let p = curve.degree();
    let last = curve.control_point_count() - 1;
    let span = basis::find_span(last, p, t, curve.knots());
    let ders = basis::ders_basis_funs(span, t, p, count, curve.knots());

    // weighted (homogeneous) sums, polynomial curves have unit weights
    let mut weighted = vec![Vector3::zeros(); count + 1];
    let mut weight = vec![0.0; count + 1];
    for (k, row) in ders.iter().enumerate() {
        for (j, n) in row.iter().enumerate() {
            let i = span - p + j;
            let w = curve.weight(i);
            weighted[k] += pad(curve.control_point(i)) * (n * w);
            weight[k] += n * w;
        }
    }
    if !curve.kind().is_rational() {
        return weighted;
    }

    // quotient rule, The NURBS Book A4.2
    let mut result: Vec<Vector3<f64>> = Vec::with_capacity(count + 1);
    for k in 0..=count {
        let mut v = weighted[k];
        let mut binomial = 1.0;
        for i in 1..=k {
            binomial = binomial * (k - i + 1) as f64 / i as f64;
            v -= result[k - i] * (binomial * weight[i]);
        }
        result.push(v / weight[0]);
    }
    result
}

pub(crate) fn position(curve: &Curve, t: f64) -> Vector3<f64> {
    derivatives(curve, t, 0)[0]
}

pub(crate) fn point(curve: &Curve, t: f64) -> Vec<f64> {
    position(curve, t).as_slice()[..curve.dimension()].to_vec()
}

fn velocity(ders: &[Vector3<f64>], t: f64) -> Result<(Vector3<f64>, f64), ServiceError> {
    let speed = ders[1].norm();
    if !speed.is_finite() || speed <= f64::EPSILON {
        return Err(ServiceError::SingularDerivative(t));
    }
    Ok((ders[1], speed))
}

pub(crate) fn curvature(curve: &Curve, t: f64) -> Result<f64, ServiceError> {
    let ders = derivatives(curve, t, 2);
    let (v, speed) = velocity(&ders, t)?;
    Ok(v.cross(&ders[2]).norm() / speed.powi(3))
}

/// Derivative of curvature with respect to arc length.
pub(crate) fn curvature_variation(curve: &Curve, t: f64) -> Result<f64, ServiceError> {
    let ders = derivatives(curve, t, 3);
    let (v, speed) = velocity(&ders, t)?;
    let c = v.cross(&ders[2]);
    let c_dot = v.cross(&ders[3]);
    let c_norm = c.norm();

    // |c| is not differentiable where it vanishes, curvature is at a minimum there
    let norm_dot = if c_norm > f64::EPSILON * speed * speed {
        c.dot(&c_dot) / c_norm
    } else {
        0.0
    };
    let dk_dt = norm_dot / speed.powi(3) - 3.0 * c_norm * v.dot(&ders[2]) / speed.powi(5);
    Ok(dk_dt / speed)
}

/// Tangent, normal and binormal unit vectors.
pub(crate) fn frenet_frame(curve: &Curve, t: f64) -> Result<[Vector3<f64>; 3], ServiceError> {
    let ders = derivatives(curve, t, 2);
    let (v, speed) = velocity(&ders, t)?;
    let tangent = v / speed;
    let c = v.cross(&ders[2]);

    if c.norm() > 1e-12 * speed * speed.max(ders[2].norm()) {
        let binormal = c.normalize();
        let normal = binormal.cross(&tangent);
        return Ok([tangent, normal, binormal]);
    }

    // straight stretch, pick the normal to the left of the tangent in the xy plane
    let planar = Vector3::new(-tangent.y, tangent.x, 0.0);
    let normal = if planar.norm() > 1e-12 {
        planar.normalize()
    } else {
        Vector3::x()
    };
    Ok([tangent, normal, tangent.cross(&normal)])
}

fn gauss(curve: &Curve, a: f64, b: f64) -> f64 {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    GAUSS_NODES
        .iter()
        .zip(GAUSS_WEIGHTS.iter())
        .map(|(x, w)| w * derivatives(curve, mid + half * x, 1)[1].norm())
        .sum::<f64>()
        * half
}

fn adaptive(curve: &Curve, a: f64, b: f64, whole: f64, tolerance: f64, depth: u32) -> f64 {
    let mid = 0.5 * (a + b);
    let left = gauss(curve, a, mid);
    let right = gauss(curve, mid, b);
    if depth >= MAX_BISECTIONS || (left + right - whole).abs() <= tolerance {
        return left + right;
    }
    adaptive(curve, a, mid, left, 0.5 * tolerance, depth + 1)
        + adaptive(curve, mid, b, right, 0.5 * tolerance, depth + 1)
}

/// Arc length integrated span by span until successive refinements agree within `tolerance`.
pub(crate) fn arc_length(curve: &Curve, tolerance: f64) -> Result<f64, ServiceError> {
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(ServiceError::InvalidTolerance(tolerance));
    }
    let spans: Vec<_> = knot::spans(curve.knots(), curve.order(), curve.control_point_count()).collect();
    let share = tolerance / spans.len().max(1) as f64;
    let length = spans
        .iter()
        .map(|&(a, b)| adaptive(curve, a, b, gauss(curve, a, b), share, 0))
        .sum::<f64>();
    if !length.is_finite() {
        return Err(ServiceError::NonFinite);
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::tests::quarter_circle;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::FRAC_PI_2;

    fn parabola() -> Curve {
        // y = x^2 on [-1, 1] as a quadratic Bezier, x(t) = 2t - 1
        Curve::new(
            3,
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![-1.0, 1.0, 0.0, -1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn circle_points() {
        let arc = quarter_circle(2.0);
        for i in 0..=10 {
            let p = point(&arc, i as f64 / 10.0);
            assert_abs_diff_eq!((p[0] * p[0] + p[1] * p[1]).sqrt(), 2.0, epsilon = 1e-12);
        }
        let end = point(&arc, 1.0);
        assert_abs_diff_eq!(end[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(end[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rational_derivative_matches_difference() {
        let arc = quarter_circle(3.0);
        let (t, h) = (0.4, 1e-6);
        let d = derivatives(&arc, t, 1)[1];
        let fd = (pad(&point(&arc, t + h)) - pad(&point(&arc, t - h))) / (2.0 * h);
        assert_abs_diff_eq!((d - fd).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn circle_curvature() {
        let arc = quarter_circle(2.0);
        for t in [0.0, 0.3, 0.5, 0.9, 1.0] {
            assert_abs_diff_eq!(curvature(&arc, t).unwrap(), 0.5, epsilon = 1e-10);
            assert_abs_diff_eq!(curvature_variation(&arc, t).unwrap(), 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn parabola_curvature() {
        // curvature of y = x^2 is 2 at the vertex
        let curve = parabola();
        assert_abs_diff_eq!(curvature(&curve, 0.5).unwrap(), 2.0, epsilon = 1e-12);
        let x: f64 = 1.0;
        let expected = 2.0 / (1.0 + 4.0 * x * x).powf(1.5);
        assert_abs_diff_eq!(curvature(&curve, 1.0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn lengths() {
        assert_abs_diff_eq!(
            arc_length(&quarter_circle(2.0), 1e-9).unwrap(),
            FRAC_PI_2 * 2.0,
            epsilon = 1e-8
        );
        let line = Curve::new(2, 3, vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 0.0, 0.0, 1.0, 2.0, 2.0]).unwrap();
        assert_abs_diff_eq!(arc_length(&line, 1e-6).unwrap(), 3.0, epsilon = 1e-12);
        assert_eq!(arc_length(&line, 0.0), Err(ServiceError::InvalidTolerance(0.0)));
    }

    #[test]
    fn frames() {
        let arc = quarter_circle(1.0);
        let [t, n, b] = frenet_frame(&arc, 0.0).unwrap();
        // counter clockwise arc starting at (1, 0)
        assert_abs_diff_eq!((t - Vector3::y()).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!((n + Vector3::x()).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!((b - Vector3::z()).norm(), 0.0, epsilon = 1e-12);

        let line = Curve::new(2, 2, vec![0.0, 0.0, 1.0, 1.0], vec![0.0, 0.0, 2.0, 0.0]).unwrap();
        let [t, n, b] = frenet_frame(&line, 0.5).unwrap();
        assert_abs_diff_eq!((t - Vector3::x()).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!((n - Vector3::y()).norm(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!((b - Vector3::z()).norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_velocity() {
        let dot = Curve::new(2, 2, vec![0.0, 0.0, 1.0, 1.0], vec![1.0, 1.0, 1.0, 1.0]).unwrap();
        assert_eq!(curvature(&dot, 0.5), Err(ServiceError::SingularDerivative(0.5)));
    }
}
