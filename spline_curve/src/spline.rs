use core::cell::Cell;
use core::fmt;

use crate::config::{ConfigError, SimplifyConfig, SplineConfig};
use crate::error::{Result, ServiceError, SplineError};
use crate::nurbs::{
    ClosestPoints, Closure, Curve, CurveKind, CurveService, NativeService, SimplifyRequest,
};

/// A curve together with its parameter domain and the values derived from it.
///
/// Replacing a `FittedCurve` is the only way the cached values go stale.
#[derive(Clone, Debug)]
struct FittedCurve {
    curve: Curve,
    start_param: f64,
    end_param: f64,
    curve_length: Cell<Option<f64>>,
    curvature_max: Cell<Option<f64>>,
}

impl FittedCurve {
    fn new(curve: Curve, start_param: f64, end_param: f64) -> Self {
        Self {
            curve,
            start_param,
            end_param,
            curve_length: Cell::new(None),
            curvature_max: Cell::new(None),
        }
    }
}

/// A parametric path in 2D or 3D, fitted through points or wrapped around an existing curve.
///
/// Numerical work is delegated to a [`CurveService`]. Derived values such as the length are
/// computed on first use and kept until the curve is replaced, so a `Spline` is not `Sync`.
#[derive(Clone, Debug)]
pub struct Spline<S = NativeService> {
    service: S,
    dimension: usize,
    curve_order: usize,
    geometric_resolution: f64,
    simplify: SimplifyConfig,
    fitted: Option<FittedCurve>,
}

/// Summary of the current curve.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveProperties {
    pub point_count: usize,
    pub order: usize,
    pub dimension: usize,
    pub kind: CurveKind,
    pub start_param: f64,
    pub end_param: f64,
    pub length: f64,
}

impl fmt::Display for CurveProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CURVE PROPERTIES")?;
        writeln!(f, "  control points:  {}", self.point_count)?;
        writeln!(f, "  order:           {}", self.order)?;
        writeln!(f, "  dimension:       {}", self.dimension)?;
        writeln!(f, "  kind:            {}", self.kind)?;
        writeln!(
            f,
            "  parameter range: [{:.6}, {:.6}]",
            self.start_param, self.end_param
        )?;
        write!(f, "  length:          {:.6}", self.length)
    }
}

impl Spline<NativeService> {
    /// An empty spline, `interpolate` gives it a curve.
    pub fn new(dimension: usize, geometric_resolution: f64, curve_order: usize) -> Self {
        Self::with_service(
            NativeService::default(),
            dimension,
            geometric_resolution,
            curve_order,
        )
    }

    pub fn from_curve(geometric_resolution: f64, curve: Curve) -> Result<Self> {
        Self::from_curve_with_service(NativeService::default(), geometric_resolution, curve)
    }

    pub fn from_config(config: &SplineConfig) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        let mut spline = Self::with_service(
            NativeService::new(config.search.clone()),
            config.dimension,
            config.geometric_resolution,
            config.curve_order,
        );
        spline.simplify = config.simplify.clone();
        Ok(spline)
    }
}

impl<S: CurveService> Spline<S> {
    pub fn with_service(
        service: S,
        dimension: usize,
        geometric_resolution: f64,
        curve_order: usize,
    ) -> Self {
        Self {
            service,
            dimension,
            curve_order,
            geometric_resolution,
            simplify: SimplifyConfig::default(),
            fitted: None,
        }
    }

    /// Wraps `curve`, taking dimension and order from it.
    pub fn from_curve_with_service(
        service: S,
        geometric_resolution: f64,
        curve: Curve,
    ) -> Result<Self> {
        let (start, end) = service
            .domain(&curve)
            .map_err(SplineError::geometry("domain"))?;
        let mut spline = Self::with_service(
            service,
            curve.dimension(),
            geometric_resolution,
            curve.order(),
        );
        spline.fitted = Some(FittedCurve::new(curve, start, end));
        Ok(spline)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn curve_order(&self) -> usize {
        self.curve_order
    }

    pub fn geometric_resolution(&self) -> f64 {
        self.geometric_resolution
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn has_curve(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn curve(&self) -> Option<&Curve> {
        self.fitted.as_ref().map(|f| &f.curve)
    }

    pub fn into_curve(self) -> Option<Curve> {
        self.fitted.map(|f| f.curve)
    }

    pub fn domain(&self) -> Result<(f64, f64)> {
        let fitted = self.fitted()?;
        Ok((fitted.start_param, fitted.end_param))
    }

    pub fn start_param(&self) -> Result<f64> {
        Ok(self.fitted()?.start_param)
    }

    pub fn end_param(&self) -> Result<f64> {
        Ok(self.fitted()?.end_param)
    }

    fn fitted(&self) -> Result<&FittedCurve> {
        self.fitted.as_ref().ok_or(SplineError::NoCurve)
    }

    /// The current curve if `param` lies in its domain.
    fn checked(&self, param: f64) -> Result<&FittedCurve> {
        let fitted = self.fitted()?;
        if !(param >= fitted.start_param && param <= fitted.end_param) {
            return Err(SplineError::Domain {
                param,
                start: fitted.start_param,
                end: fitted.end_param,
            });
        }
        Ok(fitted)
    }

    /// Fits a curve through `points`, a flat buffer of `dimension` coordinates per point.
    ///
    /// `parameters` is either empty, for chord length parametrization, or holds one increasing
    /// value per point. The domain always starts at zero. The previous curve is discarded even
    /// when the fit fails.
    pub fn interpolate(&mut self, points: &[f64], parameters: &[f64]) -> Result<()> {
        self.fitted = None;
        let parameters = (!parameters.is_empty()).then_some(parameters);
        let fit = self
            .service
            .interpolate(points, self.dimension, self.curve_order, parameters, 0.0)
            .map_err(SplineError::geometry("interpolate"))?;
        log::debug!(
            "interpolated {} points, {} control points over [0, {}]",
            points.len() / self.dimension.max(1),
            fit.curve.control_point_count(),
            fit.end_param
        );
        self.fitted = Some(FittedCurve::new(fit.curve, 0.0, fit.end_param));
        Ok(())
    }

    pub fn clear(&mut self) {
        if self.fitted.take().is_some() {
            log::debug!("cleared curve");
        }
    }

    /// Number of control points.
    pub fn point_count(&self) -> Result<usize> {
        Ok(self.fitted()?.curve.control_point_count())
    }

    pub fn is_nurbs(&self) -> Result<bool> {
        Ok(self.fitted()?.curve.kind().is_rational())
    }

    pub fn point(&self, param: f64) -> Result<Vec<f64>> {
        let fitted = self.checked(param)?;
        self.service
            .evaluate(&fitted.curve, param)
            .map_err(SplineError::geometry("evaluate"))
    }

    pub fn curvature(&self, param: f64) -> Result<f64> {
        let fitted = self.checked(param)?;
        self.service
            .curvature(&fitted.curve, param)
            .map_err(SplineError::geometry("curvature"))
    }

    /// Derivative of curvature with respect to arc length.
    pub fn variation_of_curvature(&self, param: f64) -> Result<f64> {
        let fitted = self.checked(param)?;
        self.service
            .curvature_variation(&fitted.curve, param)
            .map_err(SplineError::geometry("curvature variation"))
    }

    pub fn curve_length(&self) -> Result<f64> {
        let fitted = self.fitted()?;
        if let Some(length) = fitted.curve_length.get() {
            return Ok(length);
        }
        let length = self
            .service
            .arc_length(&fitted.curve, self.geometric_resolution)
            .map_err(SplineError::geometry("curve length"))?;
        log::debug!("curve length {length}");
        fitted.curve_length.set(Some(length));
        Ok(length)
    }

    /// Parameter advance per unit of arc length, averaged over the whole curve.
    pub fn unit_parameter(&self) -> Result<f64> {
        let (start, end) = self.domain()?;
        let length = self.curve_length()?;
        if length <= 0.0 {
            return Err(SplineError::geometry("unit parameter")(ServiceError::ZeroLength));
        }
        Ok((end - start) / length)
    }

    /// Largest curvature sampled every `geometric_resolution` of arc length, end included.
    pub fn curvature_max(&self) -> Result<f64> {
        let fitted = self.fitted()?;
        if let Some(max) = fitted.curvature_max.get() {
            return Ok(max);
        }
        let step = self.unit_parameter()? * self.geometric_resolution;
        if !(step.is_finite() && step > 0.0) {
            return Err(SplineError::Logic("curvature sampling step is not positive"));
        }
        let (start, end) = (fitted.start_param, fitted.end_param);
        let curvature = |t| {
            self.service
                .curvature(&fitted.curve, t)
                .map_err(SplineError::geometry("curvature max"))
        };

        let mut max = curvature(end)?;
        let steps = ((end - start) / step).ceil() as usize;
        for i in 0..steps {
            let t = start + i as f64 * step;
            if t >= end {
                break;
            }
            max = max.max(curvature(t)?);
        }
        log::debug!("curvature max {max} from {steps} samples");
        fitted.curvature_max.set(Some(max));
        Ok(max)
    }

    /// All closest points and intervals to `point`, `resolution` bounds both distance and
    /// interval detection.
    pub fn find_closest_points(&self, point: &[f64], resolution: f64) -> Result<ClosestPoints> {
        let fitted = self.fitted()?;
        let found = self
            .service
            .closest_points(&fitted.curve, point, resolution, resolution)
            .map_err(SplineError::geometry("closest points"))?;
        log::debug!(
            "closest to {point:?}: points {:?} intervals {:?}",
            found.points,
            found.intervals
        );
        Ok(found)
    }

    /// First closest point, or the start of the first closest interval.
    pub fn find_one_closest_point(&self, point: &[f64], resolution: f64) -> Result<f64> {
        let found = self.find_closest_points(point, resolution)?;
        found
            .points
            .first()
            .copied()
            .or_else(|| found.intervals.first().map(|i| i.0))
            .ok_or(SplineError::Logic("no closest point found"))
    }

    /// Closest point inside `[start, end]` found by a search seeded at `guess`.
    pub fn local_closest_point_search(
        &self,
        point: &[f64],
        guess: f64,
        start: f64,
        end: f64,
        resolution: f64,
    ) -> Result<f64> {
        let fitted = self.fitted()?;
        let found = self
            .service
            .local_closest_point(&fitted.curve, point, guess, start, end, resolution)
            .map_err(SplineError::geometry("local closest point"))?;
        log::trace!(
            "local closest point {} at distance {} ({:?}) after {} iterations",
            found.param,
            found.distance,
            found.kind,
            found.iterations
        );
        Ok(found.param)
    }

    /// Simplifies within `geometric_resolution` on every axis.
    pub fn simplify(&mut self) -> Result<[f64; 3]> {
        self.simplify_with_tolerance(self.geometric_resolution)
    }

    /// Replaces the curve by one with fewer control points within `tolerance` on every axis.
    ///
    /// End derivatives up to the curve order are kept, and coincident ends stay closed.
    /// Returns the largest deviation reached on each axis, zero for an unused z axis.
    pub fn simplify_with_tolerance(&mut self, tolerance: f64) -> Result<[f64; 3]> {
        let fitted = self.fitted()?;
        let request = SimplifyRequest {
            tolerance: [tolerance; 3],
            start_fix: self.curve_order,
            end_fix: self.curve_order,
            closure: Closure::Closed,
            max_iterations: self.simplify.max_iterations,
            samples_per_span: self.simplify.samples_per_span,
        };
        let simplified = self
            .service
            .simplify(&fitted.curve, &request)
            .map_err(SplineError::geometry("simplify"))?;
        if simplified.curve.control_point_count() == fitted.curve.control_point_count() {
            log::debug!("simplify kept all {} control points", fitted.curve.control_point_count());
            return Ok(simplified.max_error);
        }
        let (start, end) = self
            .service
            .domain(&simplified.curve)
            .map_err(SplineError::geometry("simplify"))?;
        log::debug!(
            "simplified {} to {} control points, error {:?}",
            fitted.curve.control_point_count(),
            simplified.curve.control_point_count(),
            simplified.max_error
        );
        self.fitted = Some(FittedCurve::new(simplified.curve, start, end));
        Ok(simplified.max_error)
    }

    pub fn properties(&self) -> Result<CurveProperties> {
        let fitted = self.fitted()?;
        Ok(CurveProperties {
            point_count: fitted.curve.control_point_count(),
            order: fitted.curve.order(),
            dimension: fitted.curve.dimension(),
            kind: fitted.curve.kind(),
            start_param: fitted.start_param,
            end_param: fitted.end_param,
            length: self.curve_length()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nurbs::tests::quarter_circle;
    use approx::assert_abs_diff_eq;
    use core::f64::consts::FRAC_PI_2;
    use finitediff::FiniteDiff;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn wave_points() -> Vec<f64> {
        (0..20)
            .flat_map(|i| {
                let x = i as f64 * 0.3;
                [x, x.sin()]
            })
            .collect()
    }

    #[test]
    fn passes_through_end_points() {
        init_logging();
        let points = [0.0, 0.0, 1.0, 2.0, 3.0, 2.5, 5.0, 0.0];
        let mut spline = Spline::new(2, 0.01, 3);
        spline.interpolate(&points, &[]).unwrap();
        let (start, end) = spline.domain().unwrap();
        assert_eq!(start, 0.0);
        let first = spline.point(start).unwrap();
        let last = spline.point(end).unwrap();
        assert_abs_diff_eq!(first[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(first[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(last[0], 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(last[1], 0.0, epsilon = 1e-12);
        assert_eq!(spline.point_count().unwrap(), 4);
        assert!(!spline.is_nurbs().unwrap());
    }

    #[test]
    fn explicit_parameters() {
        let points = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 1.0, 0.0];
        let mut spline = Spline::new(3, 0.01, 2);
        spline.interpolate(&points, &[5.0, 6.0, 8.0]).unwrap();
        assert_eq!(spline.domain().unwrap(), (0.0, 3.0));
        let p = spline.point(1.0).unwrap();
        assert_eq!(p.len(), 3);
        assert_abs_diff_eq!(p[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn collinear_points() {
        let points: Vec<f64> = (0..5).flat_map(|i| [i as f64, 2.0 * i as f64]).collect();
        let mut spline = Spline::new(2, 0.01, 3);
        spline.interpolate(&points, &[]).unwrap();
        let (start, end) = spline.domain().unwrap();
        for i in 0..=10 {
            let t = start + (end - start) * i as f64 / 10.0;
            assert_abs_diff_eq!(spline.curvature(t).unwrap(), 0.0, epsilon = 1e-9);
        }
        let mid = spline.point(0.5 * end).unwrap();
        assert_abs_diff_eq!(mid[1], 2.0 * mid[0], epsilon = 1e-9);
        assert_abs_diff_eq!(spline.curve_length().unwrap(), 20.0_f64.sqrt() * 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(spline.unit_parameter().unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn length_follows_curve() {
        let mut spline = Spline::new(2, 1e-6, 2);
        spline.interpolate(&[0.0, 0.0, 3.0, 4.0], &[]).unwrap();
        assert_abs_diff_eq!(spline.curve_length().unwrap(), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spline.curve_length().unwrap(), 5.0, epsilon = 1e-9);

        spline.interpolate(&[0.0, 0.0, 6.0, 8.0], &[]).unwrap();
        assert_abs_diff_eq!(spline.curve_length().unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn failed_fit_leaves_no_curve() {
        let mut spline = Spline::new(2, 0.01, 2);
        spline.interpolate(&[0.0, 0.0, 1.0, 1.0], &[]).unwrap();
        let err = spline.interpolate(&[1.0, 1.0, 1.0, 1.0], &[]).unwrap_err();
        assert!(matches!(
            err,
            SplineError::Geometry {
                operation: "interpolate",
                source: ServiceError::CoincidentPoints(0)
            }
        ));
        assert!(!spline.has_curve());
        assert_eq!(spline.point_count(), Err(SplineError::NoCurve));
    }

    #[test]
    fn clones_are_independent() {
        let mut spline = Spline::new(2, 0.01, 2);
        spline.interpolate(&[0.0, 0.0, 1.0, 0.0], &[]).unwrap();
        let copy = spline.clone();
        spline.interpolate(&[0.0, 0.0, 0.0, 2.0], &[]).unwrap();
        let p = copy.point(1.0).unwrap();
        assert_eq!(p, vec![1.0, 0.0]);
        assert_abs_diff_eq!(copy.curve_length().unwrap(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(spline.curve_length().unwrap(), 2.0, epsilon = 1e-9);

        spline.clear();
        spline.clear();
        assert!(copy.has_curve());

        // clearing a copy leaves the source intact
        let mut copy = copy.clone();
        let source = copy.clone();
        copy.clear();
        assert!(!copy.has_curve());
        assert_eq!(source.point(1.0).unwrap(), vec![1.0, 0.0]);
        assert_eq!(source.point_count().unwrap(), 2);
    }

    #[test]
    fn domain_and_state_errors() {
        let empty = Spline::new(2, 0.01, 3);
        assert_eq!(empty.point(0.0), Err(SplineError::NoCurve));
        assert_eq!(empty.curve_length(), Err(SplineError::NoCurve));
        assert_eq!(empty.find_closest_points(&[0.0, 0.0], 0.01), Err(SplineError::NoCurve));

        let mut spline = Spline::new(2, 0.01, 2);
        spline.interpolate(&[0.0, 0.0, 1.0, 0.0], &[]).unwrap();
        assert_eq!(
            spline.curvature(1.5),
            Err(SplineError::Domain {
                param: 1.5,
                start: 0.0,
                end: 1.0
            })
        );
        let end = spline.end_param().unwrap();
        assert_eq!(
            spline.point(end + 1.0),
            Err(SplineError::Domain {
                param: end + 1.0,
                start: 0.0,
                end
            })
        );
        assert!(matches!(spline.point(f64::NAN), Err(SplineError::Domain { .. })));
        assert!(matches!(
            spline.find_closest_points(&[0.0, 0.0, 0.0], 0.01),
            Err(SplineError::Geometry {
                source: ServiceError::PointDimension { .. },
                ..
            })
        ));
    }

    #[test]
    fn wraps_existing_curve() {
        let spline = Spline::from_curve(0.001, quarter_circle(2.0)).unwrap();
        assert!(spline.is_nurbs().unwrap());
        assert_eq!(spline.dimension(), 2);
        assert_eq!(spline.curve_order(), 3);
        assert_abs_diff_eq!(spline.curvature(0.3).unwrap(), 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(spline.curvature_max().unwrap(), 0.5, epsilon = 1e-10);

        let collapsed = Curve::new(2, 2, vec![1.0; 4], vec![0.0, 0.0, 1.0, 1.0]).unwrap();
        assert!(matches!(
            Spline::from_curve(0.01, collapsed),
            Err(SplineError::Geometry {
                operation: "domain",
                ..
            })
        ));
    }

    #[test]
    fn curvature_variation_matches_difference() {
        let mut spline = Spline::new(2, 0.01, 4);
        spline.interpolate(&wave_points(), &[]).unwrap();
        let curve = spline.curve().unwrap();
        for t in [0.7, 1.9, 3.3, 4.1] {
            let slope = vec![t].central_diff(&|x: &Vec<f64>| spline.curvature(x[0]).unwrap());
            let speed = crate::nurbs::tests::speed(curve, t);
            assert_abs_diff_eq!(
                spline.variation_of_curvature(t).unwrap(),
                slope[0] / speed,
                epsilon = 1e-4
            );
        }
    }

    #[test]
    fn closest_points() {
        let spline = Spline::from_curve(0.001, quarter_circle(1.0)).unwrap();
        let found = spline.find_closest_points(&[0.0, 0.0], 1e-3).unwrap();
        assert!(found.points.is_empty());
        assert_eq!(found.intervals.len(), 1);
        assert_eq!(spline.find_one_closest_point(&[0.0, 0.0], 1e-3).unwrap(), 0.0);

        let t = spline.find_one_closest_point(&[2.0, 2.0], 1e-6).unwrap();
        assert_abs_diff_eq!(t, 0.5, epsilon = 1e-6);
        let local = spline
            .local_closest_point_search(&[2.0, 2.0], 0.2, 0.1, 0.9, 1e-9)
            .unwrap();
        assert_abs_diff_eq!(local, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn simplify_replaces_curve() {
        init_logging();
        let mut spline = Spline::new(2, 0.01, 4);
        spline.interpolate(&wave_points(), &[]).unwrap();
        let before = spline.point_count().unwrap();
        let length = spline.curve_length().unwrap();
        spline.curvature_max().unwrap();
        let domain = spline.domain().unwrap();

        let error = spline.simplify_with_tolerance(0.05).unwrap();
        assert!(error.iter().all(|e| (0.0..=0.05).contains(e)), "{error:?}");
        assert_eq!(error[2], 0.0);
        assert!(spline.point_count().unwrap() < before);
        assert_eq!(spline.domain().unwrap(), domain);
        assert_abs_diff_eq!(spline.curve_length().unwrap(), length, epsilon = 0.1);

        // cached values belong to the new curve
        let fresh = Spline::from_curve(0.01, spline.curve().unwrap().clone()).unwrap();
        assert_eq!(spline.curve_length().unwrap(), fresh.curve_length().unwrap());
        assert_eq!(spline.curvature_max().unwrap(), fresh.curvature_max().unwrap());

        let mut empty = Spline::new(2, 0.01, 4);
        assert_eq!(empty.simplify(), Err(SplineError::NoCurve));
    }

    #[test]
    fn unreduced_curve_keeps_cache() {
        let mut spline = Spline::new(2, 0.01, 4);
        spline.interpolate(&wave_points(), &[]).unwrap();
        let length = spline.curve_length().unwrap();
        let curve = spline.curve().unwrap().clone();

        assert_eq!(spline.simplify_with_tolerance(0.0).unwrap(), [0.0; 3]);
        assert_eq!(spline.curve(), Some(&curve));
        let fitted = spline.fitted.as_ref().unwrap();
        assert_eq!(fitted.curve_length.get(), Some(length));
    }

    #[test]
    fn curvature_max_of_parabola() {
        // y = x^2 on [-1, 1], sharpest at the vertex
        let parabola = Curve::new(
            3,
            2,
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![-1.0, 1.0, 0.0, -1.0, 1.0, 1.0],
        )
        .unwrap();
        let spline = Spline::from_curve(0.001, parabola).unwrap();
        let max = spline.curvature_max().unwrap();
        assert_abs_diff_eq!(max, 2.0, epsilon = 1e-5);
        assert!(max <= 2.0 + 1e-12);
        assert!(max > spline.curvature(0.0).unwrap());
        assert_eq!(spline.curvature_max().unwrap(), max);
    }

    #[test]
    fn curvature_max_follows_curve() {
        let arc: Vec<f64> = (0..=8)
            .flat_map(|i| {
                let a = i as f64 * FRAC_PI_2 / 8.0;
                [a.cos(), a.sin()]
            })
            .collect();
        let mut spline = Spline::new(2, 0.01, 3);
        spline.interpolate(&arc, &[]).unwrap();
        assert_abs_diff_eq!(spline.curvature_max().unwrap(), 1.0, epsilon = 0.2);

        spline
            .interpolate(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0], &[])
            .unwrap();
        assert_abs_diff_eq!(spline.curvature_max().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn from_config() {
        let config = SplineConfig::from_toml_str("dimension = 3\ncurve_order = 2").unwrap();
        let mut spline = Spline::from_config(&config).unwrap();
        assert_eq!(spline.dimension(), 3);
        assert_eq!(spline.curve_order(), 2);
        assert_eq!(spline.geometric_resolution(), 0.01);
        spline
            .interpolate(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[])
            .unwrap();
        assert_eq!(spline.point_count().unwrap(), 2);

        let bad = SplineConfig {
            curve_order: 0,
            ..Default::default()
        };
        assert!(Spline::from_config(&bad).is_err());
    }

    #[test]
    fn properties_report() {
        let mut spline = Spline::new(2, 1e-6, 2);
        spline.interpolate(&[0.0, 0.0, 3.0, 4.0, 6.0, 0.0], &[]).unwrap();
        let props = spline.properties().unwrap();
        assert_eq!(props.point_count, 3);
        assert_eq!(props.kind, CurveKind::PolynomialBSpline);
        assert_abs_diff_eq!(props.length, 10.0, epsilon = 1e-9);
        let report = props.to_string();
        assert!(report.starts_with("CURVE PROPERTIES"));
        assert!(report.contains("control points:  3"));
        assert!(report.contains("polynomial B-spline"));
    }
}
