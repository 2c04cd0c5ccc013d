//! Closest point searches, sampled per knot span and refined with argmin line minimizers.

use argmin::core::observers::ObserverMode;
use argmin::core::{CostFunction, Error, Executor, State};
use argmin::solver::brent::BrentOpt;
use argmin::solver::goldensectionsearch::GoldenSectionSearch;
use argmin_observer_slog::SlogLogger;
use nalgebra::Vector3;

use super::eval::{self, pad};
use super::knot;
use super::{ClosestPoints, Curve, LocalMatch, MatchKind};
use crate::config::SearchConfig;
use crate::error::ServiceError;

/// A stretch of samples is only an interval when it is this many tolerances long.
const INTERVAL_RUN: f64 = 10.0;
/// Smallest relative bracket width the golden section search is asked for.
const GOLDEN_FLOOR: f64 = 1e-10;

struct SquaredDistance<'a> {
    curve: &'a Curve,
    target: Vector3<f64>,
}

impl SquaredDistance<'_> {
    fn distance(&self, t: f64) -> f64 {
        (eval::position(self.curve, t) - self.target).norm()
    }
}

impl CostFunction for SquaredDistance<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, t: &Self::Param) -> Result<Self::Output, Error> {
        Ok((eval::position(self.curve, *t) - self.target).norm_squared())
    }
}

fn solver_error(err: Error) -> ServiceError {
    ServiceError::Solver(err.to_string())
}

fn target(curve: &Curve, point: &[f64]) -> Result<Vector3<f64>, ServiceError> {
    if point.len() != curve.dimension() {
        return Err(ServiceError::PointDimension {
            expected: curve.dimension(),
            found: point.len(),
        });
    }
    if point.iter().any(|c| !c.is_finite()) {
        return Err(ServiceError::NonFinite);
    }
    Ok(pad(point))
}

fn check_tolerance(tolerance: f64) -> Result<(), ServiceError> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(ServiceError::InvalidTolerance(tolerance))
    }
}

/// Evenly spaced parameters inside every non-empty span, domain end included.
fn sample(curve: &Curve, per_span: usize) -> Vec<f64> {
    let mut params = Vec::new();
    for (a, b) in knot::spans(curve.knots(), curve.order(), curve.control_point_count()) {
        params.extend((0..per_span).map(|k| a + (b - a) * k as f64 / per_span as f64));
    }
    params.push(curve.knot_range().1);
    params
}

/// Component of the error vector along the tangent, zero at a closest point.
fn tangential(curve: &Curve, t: f64, target: &Vector3<f64>) -> f64 {
    let ders = eval::derivatives(curve, t, 1);
    let speed = ders[1].norm();
    if speed <= f64::EPSILON {
        return f64::INFINITY;
    }
    ((ders[0] - target).dot(&ders[1]) / speed).abs()
}

/// Brent minimization of the distance inside `[lo, hi]`, returns parameter and distance.
fn refine(
    cost: SquaredDistance,
    lo: f64,
    hi: f64,
    config: &SearchConfig,
) -> Result<(f64, f64), ServiceError> {
    let solver = BrentOpt::new(lo, hi).set_tolerance(f64::EPSILON.sqrt(), 1e-12);
    let mut executor =
        Executor::new(cost, solver).configure(|state| state.max_iters(config.max_iters));
    if config.trace_solver {
        executor = executor.add_observer(SlogLogger::term(), ObserverMode::Always);
    }
    let result = executor.run().map_err(solver_error)?;
    let state = result.state();
    let param = state
        .get_best_param()
        .copied()
        .ok_or_else(|| ServiceError::Solver("brent search returned no parameter".to_string()))?;
    Ok((param, state.get_best_cost().max(0.0).sqrt()))
}

pub(crate) fn closest_points(
    curve: &Curve,
    point: &[f64],
    point_tolerance: f64,
    interval_tolerance: f64,
    config: &SearchConfig,
) -> Result<ClosestPoints, ServiceError> {
    let target = target(curve, point)?;
    check_tolerance(point_tolerance)?;
    check_tolerance(interval_tolerance)?;

    let params = sample(curve, config.samples_per_span.max(2));
    let positions: Vec<_> = params.iter().map(|t| eval::position(curve, *t)).collect();
    let distances: Vec<_> = positions.iter().map(|p| (p - target).norm()).collect();
    let last = params.len() - 1;

    let mut candidates = Vec::new();
    for i in 0..=last {
        let falling = i == 0 || distances[i] <= distances[i - 1];
        let rising = i == last || distances[i] <= distances[i + 1];
        if !(falling && rising) {
            continue;
        }
        let (lo, hi) = (params[i.saturating_sub(1)], params[(i + 1).min(last)]);
        let mut best = (params[i], distances[i]);
        if hi > lo {
            let cost = SquaredDistance { curve, target };
            let refined = refine(cost, lo, hi, config)?;
            if refined.1 < best.1 {
                best = refined;
            }
        }
        candidates.push(best);
    }
    let nearest = candidates
        .iter()
        .map(|c| c.1)
        .fold(f64::INFINITY, f64::min);

    let flagged: Vec<bool> = (0..=last)
        .map(|i| {
            distances[i] - nearest <= interval_tolerance
                && tangential(curve, params[i], &target) <= interval_tolerance
        })
        .collect();
    let mut intervals = Vec::new();
    let mut i = 0;
    while i <= last {
        if !flagged[i] {
            i += 1;
            continue;
        }
        let first = i;
        while i < last && flagged[i + 1] {
            i += 1;
        }
        let run: f64 = positions[first..=i]
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum();
        if i > first && run > 0.0 && run >= INTERVAL_RUN * interval_tolerance {
            intervals.push((params[first], params[i]));
        }
        i += 1;
    }

    let mut near: Vec<(f64, f64)> = candidates
        .into_iter()
        .filter(|(t, d)| {
            d - nearest <= point_tolerance && !intervals.iter().any(|(lo, hi)| t >= lo && t <= hi)
        })
        .collect();
    near.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(near.len());
    for (t, d) in near {
        if let Some(prev) = points.last_mut() {
            let gap = (eval::position(curve, prev.0) - eval::position(curve, t)).norm();
            if gap <= point_tolerance.max(f64::EPSILON) {
                if d < prev.1 {
                    *prev = (t, d);
                }
                continue;
            }
        }
        points.push((t, d));
    }

    log::trace!(
        "closest points at distance {nearest}: {} points, {} intervals",
        points.len(),
        intervals.len()
    );
    Ok(ClosestPoints {
        points: points.into_iter().map(|(t, _)| t).collect(),
        intervals,
    })
}

/// Stopping width for the golden section search, relative to the bracket magnitude as argmin
/// expects it. `tolerance` is a distance along the curve, turned into a parameter step with the
/// speed at `guess`.
fn relative_bracket(curve: &Curve, guess: f64, (lo, hi): (f64, f64), tolerance: f64) -> f64 {
    let speed = eval::derivatives(curve, guess, 1)[1].norm();
    let step = if speed > f64::EPSILON {
        tolerance / speed
    } else {
        tolerance
    };
    (step / (lo.abs() + hi.abs())).clamp(GOLDEN_FLOOR, 1.0)
}

/// Golden section search inside `range` (clamped to the domain) seeded at `guess`.
pub(crate) fn local_closest_point(
    curve: &Curve,
    point: &[f64],
    guess: f64,
    range: (f64, f64),
    tolerance: f64,
    config: &SearchConfig,
) -> Result<LocalMatch, ServiceError> {
    let target = target(curve, point)?;
    check_tolerance(tolerance)?;
    let (start, end) = range;
    if !(guess.is_finite() && start.is_finite() && end.is_finite()) {
        return Err(ServiceError::NonFinite);
    }
    let (a, b) = curve.knot_range();
    let (lo, hi) = (start.max(a), end.min(b));
    if start > end || lo > hi {
        return Err(ServiceError::InvalidRange { start, end });
    }

    let cost = SquaredDistance { curve, target };
    let guess = guess.clamp(lo, hi);
    let mut best = (guess, cost.distance(guess));
    for edge in [lo, hi] {
        let d = cost.distance(edge);
        if d < best.1 {
            best = (edge, d);
        }
    }

    let mut iterations = 0;
    if hi > lo {
        let solver = GoldenSectionSearch::new(lo, hi)
            .and_then(|s| s.with_tolerance(relative_bracket(curve, guess, (lo, hi), tolerance)))
            .map_err(solver_error)?;
        let mut executor = Executor::new(SquaredDistance { curve, target }, solver)
            .configure(|state| state.param(guess).max_iters(config.max_iters));
        if config.trace_solver {
            executor = executor.add_observer(SlogLogger::term(), ObserverMode::Always);
        }
        let result = executor.run().map_err(solver_error)?;
        let state = result.state();
        iterations = state.get_iter();
        if let Some(&param) = state.get_best_param() {
            let d = state.get_best_cost().max(0.0).sqrt();
            if d < best.1 {
                best = (param, d);
            }
        }
    }

    let edge = (hi - lo) * 1e-9;
    let kind = if best.0 - lo <= edge || hi - best.0 <= edge {
        MatchKind::Boundary
    } else {
        MatchKind::Interior
    };
    log::trace!(
        "local search in [{lo}, {hi}] from {guess}: {} at distance {} ({kind:?}, {iterations} iterations)",
        best.0,
        best.1
    );
    Ok(LocalMatch {
        param: best.0,
        distance: best.1,
        kind,
        iterations,
    })
}
