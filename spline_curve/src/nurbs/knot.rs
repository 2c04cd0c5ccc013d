//! Knot vector construction and checks.

use crate::error::ServiceError;

/// A knot vector for `count` control points of the given order must have `count + order`
/// finite, non-decreasing entries.
pub fn validate(knots: &[f64], order: usize, count: usize) -> Result<(), ServiceError> {
    if knots.len() != count + order {
        return Err(ServiceError::InvalidKnots(format!(
            "{} knots for {count} control points of order {order}, expected {}",
            knots.len(),
            count + order
        )));
    }
    if knots.iter().any(|k| !k.is_finite()) {
        return Err(ServiceError::NonFinite);
    }
    if let Some(i) = knots.windows(2).position(|w| w[1] < w[0]) {
        return Err(ServiceError::InvalidKnots(format!(
            "decreasing at index {}",
            i + 1
        )));
    }
    Ok(())
}

/// Clamped knot vector for interpolation at `params`, interior knots placed by averaging
/// `degree` consecutive parameters.
pub fn averaged(params: &[f64], degree: usize) -> Vec<f64> {
    let count = params.len();
    let first = params[0];
    let last = params[count - 1];
    let mut knots = Vec::with_capacity(count + degree + 1);
    knots.extend(std::iter::repeat(first).take(degree + 1));
    for j in 1..count - degree {
        let sum: f64 = params[j..j + degree].iter().sum();
        knots.push(sum / degree as f64);
    }
    knots.extend(std::iter::repeat(last).take(degree + 1));
    knots
}

/// Clamped knot vector over `[start, end]` with evenly spaced interior knots.
pub fn uniform_clamped(order: usize, count: usize, start: f64, end: f64) -> Vec<f64> {
    let interior = count - order;
    let mut knots = Vec::with_capacity(count + order);
    knots.extend(std::iter::repeat(start).take(order));
    for i in 1..=interior {
        knots.push(start + (end - start) * i as f64 / (interior + 1) as f64);
    }
    knots.extend(std::iter::repeat(end).take(order));
    knots
}

/// Non-empty knot spans `(knots[i], knots[i + 1])` inside the curve domain.
pub fn spans(knots: &[f64], order: usize, count: usize) -> impl Iterator<Item = (f64, f64)> + '_ {
    knots[order - 1..=count]
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| (w[0], w[1]))
}
