//! B-spline/NURBS curve representation and the numerical service operating on it.

pub mod basis;
mod eval;
mod fit;
pub mod knot;
mod reduce;
mod search;
mod service;

use core::fmt;

use crate::error::ServiceError;

pub use service::{
    ClosestPoints, Closure, CurveService, Interpolant, LocalMatch, MatchKind, NativeService,
    Simplified, SimplifyRequest,
};

/// Representation kind of a [`Curve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurveKind {
    PolynomialBSpline,
    RationalBSpline,
    PolynomialBezier,
    RationalBezier,
}

impl CurveKind {
    fn classify(rational: bool, order: usize, count: usize) -> Self {
        match (rational, count == order) {
            (false, false) => Self::PolynomialBSpline,
            (true, false) => Self::RationalBSpline,
            (false, true) => Self::PolynomialBezier,
            (true, true) => Self::RationalBezier,
        }
    }

    pub fn is_rational(self) -> bool {
        matches!(self, Self::RationalBSpline | Self::RationalBezier)
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PolynomialBSpline => "polynomial B-spline",
            Self::RationalBSpline => "rational B-spline",
            Self::PolynomialBezier => "polynomial Bezier",
            Self::RationalBezier => "rational Bezier",
        };
        f.write_str(name)
    }
}

/// A clamped B-spline curve in 2D or 3D, optionally rational.
///
/// Control point coordinates are stored flat, `dimension` values per point.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    order: usize,
    dimension: usize,
    kind: CurveKind,
    knots: Vec<f64>,
    coefficients: Vec<f64>,
    weights: Option<Vec<f64>>,
}

impl Curve {
    /// Polynomial curve from a knot vector and flat control point coordinates.
    pub fn new(
        order: usize,
        dimension: usize,
        knots: Vec<f64>,
        coefficients: Vec<f64>,
    ) -> Result<Self, ServiceError> {
        Self::build(order, dimension, knots, coefficients, None)
    }

    /// Rational curve, one positive weight per control point.
    pub fn rational(
        order: usize,
        dimension: usize,
        knots: Vec<f64>,
        coefficients: Vec<f64>,
        weights: Vec<f64>,
    ) -> Result<Self, ServiceError> {
        Self::build(order, dimension, knots, coefficients, Some(weights))
    }

    fn build(
        order: usize,
        dimension: usize,
        knots: Vec<f64>,
        coefficients: Vec<f64>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, ServiceError> {
        if !(2..=3).contains(&dimension) {
            return Err(ServiceError::UnsupportedDimension(dimension));
        }
        if order < 2 {
            return Err(ServiceError::InvalidOrder(order));
        }
        if coefficients.is_empty() || coefficients.len() % dimension != 0 {
            return Err(ServiceError::RaggedPoints {
                len: coefficients.len(),
                dimension,
            });
        }
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ServiceError::NonFinite);
        }
        let count = coefficients.len() / dimension;
        if count < order {
            return Err(ServiceError::InvalidCurve(format!(
                "{count} control points cannot carry order {order}"
            )));
        }
        if let Some(weights) = &weights {
            if weights.len() != count {
                return Err(ServiceError::InvalidCurve(format!(
                    "{} weights for {count} control points",
                    weights.len()
                )));
            }
            if weights.iter().any(|w| !(w.is_finite() && *w > 0.0)) {
                return Err(ServiceError::InvalidCurve(
                    "weights must be finite and positive".to_string(),
                ));
            }
        }
        knot::validate(&knots, order, count)?;

        Ok(Self {
            order,
            dimension,
            kind: CurveKind::classify(weights.is_some(), order, count),
            knots,
            coefficients,
            weights,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn degree(&self) -> usize {
        self.order - 1
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn control_point_count(&self) -> usize {
        self.coefficients.len() / self.dimension
    }

    pub fn control_point(&self, index: usize) -> &[f64] {
        &self.coefficients[index * self.dimension..(index + 1) * self.dimension]
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub(crate) fn weight(&self, index: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[index])
    }

    /// Knot values bounding the parameter domain, which may be empty.
    pub(crate) fn knot_range(&self) -> (f64, f64) {
        (
            self.knots[self.order - 1],
            self.knots[self.control_point_count()],
        )
    }
}
