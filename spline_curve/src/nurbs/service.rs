use nalgebra::Vector3;

use super::{eval, fit, reduce, search, Curve};
use crate::config::SearchConfig;
use crate::error::ServiceError;

/// Result of fitting a curve through points, the domain starts at the requested start parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Interpolant {
    pub curve: Curve,
    pub end_param: f64,
}

/// Output of a global closest point search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClosestPoints {
    /// Parameters of isolated closest points, ascending.
    pub points: Vec<f64>,
    /// Parameter intervals `(lo, hi)` along which the curve stays at the closest distance.
    pub intervals: Vec<(f64, f64)>,
}

impl ClosestPoints {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.intervals.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
    /// Minimum strictly inside the search range.
    Interior,
    /// Distance still decreasing at the edge of the search range.
    Boundary,
}

/// Output of a bounded closest point search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalMatch {
    pub param: f64,
    pub distance: f64,
    pub kind: MatchKind,
    /// Solver iterations spent, zero for a single point range.
    pub iterations: u64,
}

/// Whether a simplified curve should close on itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Closure {
    #[default]
    Open,
    /// Close the curve when its end points already coincide within tolerance.
    Closed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimplifyRequest {
    /// Per axis error bound.
    pub tolerance: [f64; 3],
    /// Number of derivatives (position included) held fixed at the start.
    pub start_fix: usize,
    /// Number of derivatives (position included) held fixed at the end.
    pub end_fix: usize,
    pub closure: Closure,
    /// Number of candidate fits tried.
    pub max_iterations: usize,
    /// Error samples per knot span of the original curve.
    pub samples_per_span: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Simplified {
    pub curve: Curve,
    /// Per axis maximum deviation from the original curve.
    pub max_error: [f64; 3],
}

/// Numerical routines a [`crate::Spline`] delegates to.
///
/// Curves are plain owned values, so copying and freeing them is left to `Clone` and `Drop`.
pub trait CurveService {
    fn interpolate(
        &self,
        points: &[f64],
        dimension: usize,
        order: usize,
        parameters: Option<&[f64]>,
        start_param: f64,
    ) -> Result<Interpolant, ServiceError>;

    fn domain(&self, curve: &Curve) -> Result<(f64, f64), ServiceError>;

    fn evaluate(&self, curve: &Curve, param: f64) -> Result<Vec<f64>, ServiceError>;

    fn curvature(&self, curve: &Curve, param: f64) -> Result<f64, ServiceError>;

    fn curvature_variation(&self, curve: &Curve, param: f64) -> Result<f64, ServiceError>;

    fn arc_length(&self, curve: &Curve, tolerance: f64) -> Result<f64, ServiceError>;

    fn closest_points(
        &self,
        curve: &Curve,
        point: &[f64],
        point_tolerance: f64,
        interval_tolerance: f64,
    ) -> Result<ClosestPoints, ServiceError>;

    fn local_closest_point(
        &self,
        curve: &Curve,
        point: &[f64],
        guess: f64,
        start: f64,
        end: f64,
        tolerance: f64,
    ) -> Result<LocalMatch, ServiceError>;

    fn simplify(&self, curve: &Curve, request: &SimplifyRequest) -> Result<Simplified, ServiceError>;

    fn frenet_frame(&self, curve: &Curve, param: f64) -> Result<[Vector3<f64>; 3], ServiceError>;
}

/// Pure Rust implementation of [`CurveService`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeService {
    search: SearchConfig,
}

impl NativeService {
    pub fn new(search: SearchConfig) -> Self {
        Self { search }
    }

    pub fn search_config(&self) -> &SearchConfig {
        &self.search
    }
}

impl CurveService for NativeService {
    fn interpolate(
        &self,
        points: &[f64],
        dimension: usize,
        order: usize,
        parameters: Option<&[f64]>,
        start_param: f64,
    ) -> Result<Interpolant, ServiceError> {
        fit::interpolate(points, dimension, order, parameters, start_param)
    }

    fn domain(&self, curve: &Curve) -> Result<(f64, f64), ServiceError> {
        let (start, end) = curve.knot_range();
        if start < end {
            Ok((start, end))
        } else {
            Err(ServiceError::InvalidKnots(format!(
                "empty parameter domain [{start}, {end}]"
            )))
        }
    }

    fn evaluate(&self, curve: &Curve, param: f64) -> Result<Vec<f64>, ServiceError> {
        if !param.is_finite() {
            return Err(ServiceError::NonFinite);
        }
        Ok(eval::point(curve, param))
    }

    fn curvature(&self, curve: &Curve, param: f64) -> Result<f64, ServiceError> {
        eval::curvature(curve, param)
    }

    fn curvature_variation(&self, curve: &Curve, param: f64) -> Result<f64, ServiceError> {
        eval::curvature_variation(curve, param)
    }

    fn arc_length(&self, curve: &Curve, tolerance: f64) -> Result<f64, ServiceError> {
        eval::arc_length(curve, tolerance)
    }

    fn closest_points(
        &self,
        curve: &Curve,
        point: &[f64],
        point_tolerance: f64,
        interval_tolerance: f64,
    ) -> Result<ClosestPoints, ServiceError> {
        search::closest_points(curve, point, point_tolerance, interval_tolerance, &self.search)
    }

    fn local_closest_point(
        &self,
        curve: &Curve,
        point: &[f64],
        guess: f64,
        start: f64,
        end: f64,
        tolerance: f64,
    ) -> Result<LocalMatch, ServiceError> {
        search::local_closest_point(curve, point, guess, (start, end), tolerance, &self.search)
    }

    fn simplify(&self, curve: &Curve, request: &SimplifyRequest) -> Result<Simplified, ServiceError> {
        reduce::simplify(curve, request)
    }

    fn frenet_frame(&self, curve: &Curve, param: f64) -> Result<[Vector3<f64>; 3], ServiceError> {
        eval::frenet_frame(curve, param)
    }
}
