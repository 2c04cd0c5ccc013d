//! Parametric B-spline/NURBS paths: fitting, geometry queries, closest point searches,
//! control point reduction and path following errors.
//!
//! ```
//! use spline_curve::Spline;
//!
//! let mut spline = Spline::new(2, 0.001, 3);
//! spline.interpolate(&[0.0, 0.0, 1.0, 1.0, 2.0, 0.0], &[]).unwrap();
//! let end = spline.end_param().unwrap();
//! assert!((spline.point(end).unwrap()[0] - 2.0).abs() < 1e-9);
//! ```

pub mod config;
pub mod error;
pub mod nurbs;
pub mod spline;
pub mod tracking;

pub use config::{ConfigError, SearchConfig, SimplifyConfig, SplineConfig};
pub use error::{Result, ServiceError, SplineError};
pub use nurbs::{ClosestPoints, Curve, CurveKind, CurveService, NativeService};
pub use spline::{CurveProperties, Spline};
pub use tracking::{angle_unwrap, PoseError};
