//! Path following errors of a planar pose against the curve.

use core::f64::consts::PI;

use nalgebra::{Matrix3, Vector3};
use uom::si::angle::radian;
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;

use crate::error::{Result, SplineError};
use crate::nurbs::CurveService;
use crate::spline::Spline;

/// Brings an angle back into [-π, π] with at most one full turn.
pub fn angle_unwrap(angle: Angle) -> Angle {
    let value = angle.get::<radian>();
    let wrapped = if value > PI {
        value - 2.0 * PI
    } else if value < -PI {
        value + 2.0 * PI
    } else {
        value
    };
    Angle::new::<radian>(wrapped)
}

/// Offset of a pose from the path at the matched parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseError {
    /// Signed lateral distance, positive to the left of the path.
    pub distance: Length,
    /// Pose heading minus path heading.
    pub heading: Angle,
    pub param: f64,
}

impl PoseError {
    /// `[distance in meters, heading in radians, parameter]`
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(
            self.distance.get::<meter>(),
            self.heading.get::<radian>(),
            self.param,
        )
    }
}

impl<S: CurveService> Spline<S> {
    /// Rows are the tangent, normal and binormal at `param`.
    ///
    /// Parameters outside the domain are evaluated at the nearest end.
    pub fn frenet_frame(&self, param: f64) -> Result<Matrix3<f64>> {
        let curve = self.curve().ok_or(SplineError::NoCurve)?;
        let [tangent, normal, binormal] = self
            .service()
            .frenet_frame(curve, param)
            .map_err(SplineError::geometry("frenet frame"))?;
        Ok(Matrix3::from_rows(&[
            tangent.transpose(),
            normal.transpose(),
            binormal.transpose(),
        ]))
    }

    /// Direction of the tangent projected on the xy plane.
    pub fn heading(&self, param: f64) -> Result<Angle> {
        let frame = self.frenet_frame(param)?;
        Ok(Angle::new::<radian>(frame[(0, 1)].atan2(frame[(0, 0)])))
    }

    pub fn heading_error(&self, actual: Angle, param: f64) -> Result<Angle> {
        Ok(angle_unwrap(actual - self.heading(param)?))
    }

    /// Horizontal distance from the curve point at `param`, negative right of the path.
    pub fn distance_error(&self, point: &Vector3<f64>, param: f64) -> Result<Length> {
        let on_curve = self.point(param)?;
        let error = Vector3::new(point.x - on_curve[0], point.y - on_curve[1], 0.0);
        let magnitude = error.norm();
        if magnitude == 0.0 {
            return Ok(Length::new::<meter>(0.0));
        }
        let bearing = Angle::new::<radian>(error.y.atan2(error.x));
        let side = angle_unwrap(bearing - self.heading(param)?);
        let signed = if side.get::<radian>() >= 0.0 {
            magnitude
        } else {
            -magnitude
        };
        Ok(Length::new::<meter>(signed))
    }

    /// Matches `point` to the curve no further than `length_tolerance` of arc length past
    /// `search_start`, and reports the errors there.
    pub fn pose_error(
        &self,
        point: &Vector3<f64>,
        actual: Angle,
        search_start: f64,
        length_tolerance: Length,
    ) -> Result<PoseError> {
        let (start, end) = self.domain()?;
        if !(search_start >= start && search_start <= end) {
            return Err(SplineError::Domain {
                param: search_start,
                start,
                end,
            });
        }
        let reach = self.unit_parameter()? * length_tolerance.get::<meter>();
        let window_end = (search_start + reach).min(end);
        let param = self.local_closest_point_search(
            &point.as_slice()[..self.dimension()],
            search_start,
            search_start,
            window_end,
            self.geometric_resolution(),
        )?;
        let pose = PoseError {
            distance: self.distance_error(point, param)?,
            heading: self.heading_error(actual, param)?,
            param,
        };
        log::trace!("pose error {:?}", pose.as_vector());
        Ok(pose)
    }
}
