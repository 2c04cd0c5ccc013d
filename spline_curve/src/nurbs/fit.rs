//! Global interpolation through an ordered point set (The NURBS Book, A9.1).

use nalgebra::DMatrix;

use super::basis;
use super::knot;
use super::{Curve, Interpolant};
use crate::error::ServiceError;

/// Cumulative chord length parameters starting at `start`.
fn chord_length_params(points: &[f64], dimension: usize, start: f64) -> Result<Vec<f64>, ServiceError> {
    let mut params = Vec::with_capacity(points.len() / dimension);
    params.push(start);
    for (i, pair) in points.chunks(dimension).collect::<Vec<_>>().windows(2).enumerate() {
        let chord = pair[0]
            .iter()
            .zip(pair[1])
            .map(|(a, b)| (b - a) * (b - a))
            .sum::<f64>()
            .sqrt();
        if chord <= f64::EPSILON {
            return Err(ServiceError::CoincidentPoints(i));
        }
        params.push(params[i] + chord);
    }
    Ok(params)
}

/// Caller supplied parameters, translated so the first one lands on `start`.
fn explicit_params(parameters: &[f64], count: usize, start: f64) -> Result<Vec<f64>, ServiceError> {
    if parameters.len() != count {
        return Err(ServiceError::ParameterCount {
            expected: count,
            found: parameters.len(),
        });
    }
    if parameters.iter().any(|p| !p.is_finite()) {
        return Err(ServiceError::NonFinite);
    }
    if let Some(i) = parameters.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ServiceError::NonIncreasingParameters(i + 1));
    }
    let offset = start - parameters[0];
    Ok(parameters.iter().map(|p| p + offset).collect())
}

pub(crate) fn interpolate(
    points: &[f64],
    dimension: usize,
    order: usize,
    parameters: Option<&[f64]>,
    start: f64,
) -> Result<Interpolant, ServiceError> {
    if !(2..=3).contains(&dimension) {
        return Err(ServiceError::UnsupportedDimension(dimension));
    }
    if order < 2 {
        return Err(ServiceError::InvalidOrder(order));
    }
    if points.is_empty() || points.len() % dimension != 0 {
        return Err(ServiceError::RaggedPoints {
            len: points.len(),
            dimension,
        });
    }
    if points.iter().any(|c| !c.is_finite()) {
        return Err(ServiceError::NonFinite);
    }
    let count = points.len() / dimension;
    if count < order.max(2) {
        return Err(ServiceError::TooFewPoints {
            required: order,
            found: count,
        });
    }

    let params = match parameters {
        Some(parameters) => explicit_params(parameters, count, start)?,
        None => chord_length_params(points, dimension, start)?,
    };
    let degree = order - 1;
    let knots = knot::averaged(&params, degree);

    let mut system = DMatrix::<f64>::zeros(count, count);
    for (row, &t) in params.iter().enumerate() {
        let span = basis::find_span(count - 1, degree, t, &knots);
        for (j, value) in basis::basis_funs(span, t, degree, &knots).into_iter().enumerate() {
            system[(row, span - degree + j)] = value;
        }
    }
    let rhs = DMatrix::from_row_slice(count, dimension, points);
    let solution = system
        .lu()
        .solve(&rhs)
        .ok_or(ServiceError::SingularSystem)?;

    let mut coefficients = Vec::with_capacity(points.len());
    for row in solution.row_iter() {
        coefficients.extend(row.iter().copied());
    }
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(ServiceError::SingularSystem);
    }

    let end_param = params[count - 1];
    log::trace!("interpolated {count} points with order {order}, domain [{start}, {end_param}]");
    Ok(Interpolant {
        curve: Curve::new(order, dimension, knots, coefficients)?,
        end_param,
    })
}
