//! Control point reduction: the smallest uniform-knot refit that stays within a per axis bound.

use nalgebra::{DMatrix, Vector3};

use super::basis;
use super::eval;
use super::knot;
use super::{Closure, Curve, Simplified, SimplifyRequest};
use crate::error::ServiceError;

struct Samples {
    params: Vec<f64>,
    /// Original positions at `params`.
    targets: Vec<Vector3<f64>>,
    /// Parameters halfway between samples, only used to measure the error.
    midpoints: Vec<f64>,
}

/// Derivative constraints `C^(k)(t) = value` for `k < values.len()`.
struct EndConstraint {
    param: f64,
    values: Vec<Vector3<f64>>,
}

fn check(tolerance: &[f64; 3]) -> Result<(), ServiceError> {
    match tolerance.iter().find(|t| !(t.is_finite() && **t >= 0.0)) {
        Some(t) => Err(ServiceError::InvalidTolerance(*t)),
        None => Ok(()),
    }
}

fn sample(curve: &Curve, request: &SimplifyRequest) -> Samples {
    let (a, b) = curve.knot_range();
    let spans = knot::spans(curve.knots(), curve.order(), curve.control_point_count()).count();
    let count = (request.samples_per_span.max(1) * spans)
        .max(4 * curve.control_point_count())
        .max(32);
    let params: Vec<f64> = (0..count)
        .map(|i| a + (b - a) * i as f64 / (count - 1) as f64)
        .collect();
    let targets = params.iter().map(|t| eval::position(curve, *t)).collect();
    let midpoints = params.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    Samples {
        params,
        targets,
        midpoints,
    }
}

/// Least squares fit with `count` control points, exact at the constrained ends.
///
/// Solves the Lagrange system `[[NᵀN, Dᵀ], [D, 0]] [P; λ] = [NᵀQ; R]`.
fn refit(
    curve: &Curve,
    count: usize,
    samples: &Samples,
    ends: &[EndConstraint; 2],
) -> Option<Curve> {
    let (order, dimension) = (curve.order(), curve.dimension());
    let degree = order - 1;
    let (a, b) = curve.knot_range();
    let knots = knot::uniform_clamped(order, count, a, b);

    let mut fitting = DMatrix::<f64>::zeros(samples.params.len(), count);
    for (row, &t) in samples.params.iter().enumerate() {
        let span = basis::find_span(count - 1, degree, t, &knots);
        for (j, value) in basis::basis_funs(span, t, degree, &knots).into_iter().enumerate() {
            fitting[(row, span - degree + j)] = value;
        }
    }
    let mut values = DMatrix::<f64>::zeros(samples.params.len(), dimension);
    for (row, target) in samples.targets.iter().enumerate() {
        for k in 0..dimension {
            values[(row, k)] = target[k];
        }
    }

    let constraints: usize = ends.iter().map(|e| e.values.len()).sum();
    let size = count + constraints;
    let mut system = DMatrix::<f64>::zeros(size, size);
    let mut rhs = DMatrix::<f64>::zeros(size, dimension);
    system
        .view_mut((0, 0), (count, count))
        .copy_from(&(fitting.transpose() * &fitting));
    rhs.view_mut((0, 0), (count, dimension))
        .copy_from(&(fitting.transpose() * &values));

    let mut row = count;
    for end in ends {
        if end.values.is_empty() {
            continue;
        }
        let span = basis::find_span(count - 1, degree, end.param, &knots);
        let ders = basis::ders_basis_funs(span, end.param, degree, end.values.len() - 1, &knots);
        for (k, value) in end.values.iter().enumerate() {
            for (j, n) in ders[k].iter().enumerate() {
                let col = span - degree + j;
                system[(row, col)] = *n;
                system[(col, row)] = *n;
            }
            for axis in 0..dimension {
                rhs[(row, axis)] = value[axis];
            }
            row += 1;
        }
    }

    let solution = system.lu().solve(&rhs)?;
    let mut coefficients = Vec::with_capacity(count * dimension);
    for i in 0..count {
        coefficients.extend((0..dimension).map(|axis| solution[(i, axis)]));
    }
    Curve::new(order, dimension, knots, coefficients).ok()
}

fn max_error(original: &Curve, candidate: &Curve, samples: &Samples) -> [f64; 3] {
    let mut error = [0.0; 3];
    let params = samples.params.iter().zip(samples.targets.iter().copied());
    let halves = samples
        .midpoints
        .iter()
        .map(|t| (t, eval::position(original, *t)));
    for (t, target) in params.chain(halves) {
        let diff = eval::position(candidate, *t) - target;
        for (axis, e) in error.iter_mut().enumerate() {
            *e = f64::max(*e, diff[axis].abs());
        }
    }
    error
}

/// Held end derivatives, at most `order` and half the control points per end.
///
/// A closed request with coincident ends moves the end position onto the start.
fn end_constraints(
    curve: &Curve,
    request: &SimplifyRequest,
    count: usize,
    samples: &mut Samples,
) -> [EndConstraint; 2] {
    let (a, b) = curve.knot_range();
    let limit = curve.order().min(count / 2);
    let mut start = eval::derivatives(curve, a, curve.degree());
    let mut end = eval::derivatives(curve, b, curve.degree());
    start.truncate(request.start_fix.min(limit));
    end.truncate(request.end_fix.min(limit));

    if request.closure == Closure::Closed {
        let reach = request.tolerance.iter().copied().fold(0.0, f64::max);
        let (first, last) = (eval::position(curve, a), eval::position(curve, b));
        if (first - last).norm() <= reach {
            if end.is_empty() {
                end.push(first);
            } else {
                end[0] = first;
            }
            if let Some(target) = samples.targets.last_mut() {
                *target = first;
            }
        }
    }
    [
        EndConstraint {
            param: a,
            values: start,
        },
        EndConstraint {
            param: b,
            values: end,
        },
    ]
}

pub(crate) fn simplify(curve: &Curve, request: &SimplifyRequest) -> Result<Simplified, ServiceError> {
    check(&request.tolerance)?;
    let original = curve.control_point_count();
    let unchanged = || Simplified {
        curve: curve.clone(),
        max_error: [0.0; 3],
    };

    let mut low = curve.order();
    let mut high = original.saturating_sub(1);
    if high < low {
        return Ok(unchanged());
    }

    let mut samples = sample(curve, request);
    let mut best: Option<Simplified> = None;
    let mut attempts = 0;
    while low <= high && attempts < request.max_iterations {
        attempts += 1;
        let count = low + (high - low) / 2;
        let ends = end_constraints(curve, request, count, &mut samples);
        let fitted = refit(curve, count, &samples, &ends).map(|candidate| {
            let max_error = max_error(curve, &candidate, &samples);
            (candidate, max_error)
        });
        let passed = match fitted {
            Some((candidate, max_error))
                if max_error
                    .iter()
                    .zip(request.tolerance.iter())
                    .take(curve.dimension())
                    .all(|(e, t)| e <= t) =>
            {
                log::trace!("{count} control points within tolerance, error {max_error:?}");
                best = Some(Simplified {
                    curve: candidate,
                    max_error,
                });
                true
            }
            _ => false,
        };
        if passed {
            high = count - 1;
        } else {
            low = count + 1;
        }
    }

    match best {
        Some(simplified) => {
            log::debug!(
                "reduced {original} control points to {} after {attempts} fits",
                simplified.curve.control_point_count()
            );
            Ok(simplified)
        }
        None => {
            log::warn!(
                "no fit within {:?} found in {attempts} attempts, keeping {original} control points",
                request.tolerance
            );
            Ok(unchanged())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::fit;

    fn request(tolerance: f64) -> SimplifyRequest {
        SimplifyRequest {
            tolerance: [tolerance; 3],
            start_fix: 1,
            end_fix: 1,
            closure: Closure::Open,
            max_iterations: 10,
            samples_per_span: 8,
        }
    }

    fn sine() -> Curve {
        let points: Vec<f64> = (0..20)
            .flat_map(|i| {
                let x = i as f64 * 0.3;
                [x, x.sin()]
            })
            .collect();
        fit::interpolate(&points, 2, 4, None, 0.0).unwrap().curve
    }

    #[test]
    fn fewer_points_within_tolerance() {
        let curve = sine();
        let reduced = simplify(&curve, &request(0.05)).unwrap();
        assert!(reduced.curve.control_point_count() < curve.control_point_count());
        for e in &reduced.max_error[..2] {
            assert!((0.0..=0.05).contains(e), "{:?}", reduced.max_error);
        }
        assert_eq!(reduced.max_error[2], 0.0);
        assert_eq!(reduced.curve.knot_range(), curve.knot_range());

        // end points are held exactly
        let (a, b) = curve.knot_range();
        for t in [a, b] {
            let d = eval::position(&curve, t) - eval::position(&reduced.curve, t);
            assert!(d.norm() < 1e-9);
        }
    }

    #[test]
    fn zero_tolerance_keeps_original() {
        let curve = sine();
        let kept = simplify(&curve, &request(0.0)).unwrap();
        assert_eq!(kept.curve, curve);
        assert_eq!(kept.max_error, [0.0; 3]);
    }

    #[test]
    fn closed_curve_stays_closed() {
        let points: Vec<f64> = (0..=16)
            .flat_map(|i| {
                let a = i as f64 * core::f64::consts::TAU / 16.0;
                [a.cos(), a.sin()]
            })
            .collect();
        let curve = fit::interpolate(&points, 2, 4, None, 0.0).unwrap().curve;
        let mut closed = request(0.01);
        closed.closure = Closure::Closed;
        let reduced = simplify(&curve, &closed).unwrap();
        let (a, b) = reduced.curve.knot_range();
        let gap = eval::position(&reduced.curve, a) - eval::position(&reduced.curve, b);
        assert!(gap.norm() < 1e-9);
    }

    #[test]
    fn rejects_negative_tolerance() {
        let mut bad = request(0.1);
        bad.tolerance[1] = -1.0;
        assert_eq!(
            simplify(&sine(), &bad),
            Err(ServiceError::InvalidTolerance(-1.0))
        );
    }
}
