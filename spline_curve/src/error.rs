use thiserror::Error;

pub type Result<T, E = SplineError> = core::result::Result<T, E>;

/// Failures reported by a [`crate::nurbs::CurveService`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("need at least {required} points for a curve of order {required}, got {found}")]
    TooFewPoints { required: usize, found: usize },

    #[error("point buffer of length {len} is not a non-empty multiple of dimension {dimension}")]
    RaggedPoints { len: usize, dimension: usize },

    #[error("expected {expected} parameter values (one per point), got {found}")]
    ParameterCount { expected: usize, found: usize },

    #[error("parameter values must be strictly increasing (index {0})")]
    NonIncreasingParameters(usize),

    #[error("points {0} and {next} coincide, chord-length parametrization is undefined", next = .0 + 1)]
    CoincidentPoints(usize),

    #[error("only 2D and 3D curves are supported, got dimension {0}")]
    UnsupportedDimension(usize),

    #[error("curve order must be at least 2, got {0}")]
    InvalidOrder(usize),

    #[error("interpolation system is singular")]
    SingularSystem,

    #[error("invalid knot vector: {0}")]
    InvalidKnots(String),

    #[error("invalid curve: {0}")]
    InvalidCurve(String),

    #[error("search range [{start}, {end}] does not intersect the curve domain")]
    InvalidRange { start: f64, end: f64 },

    #[error("reference point has {found} coordinates, curve dimension is {expected}")]
    PointDimension { expected: usize, found: usize },

    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),

    #[error("first derivative vanishes at parameter {0}")]
    SingularDerivative(f64),

    #[error("curve has zero length")]
    ZeroLength,

    #[error("solver failed: {0}")]
    Solver(String),

    #[error("input contains non-finite values")]
    NonFinite,
}

/// Errors raised by [`crate::Spline`] operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("parameter {param} is not in the [{start}, {end}] range")]
    Domain { param: f64, start: f64, end: f64 },

    #[error("{operation} failed: {source}")]
    Geometry {
        operation: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("{0}")]
    Logic(&'static str),

    #[error("the curve is not initialized")]
    NoCurve,
}

impl SplineError {
    pub(crate) fn geometry(operation: &'static str) -> impl FnOnce(ServiceError) -> Self {
        move |source| Self::Geometry { operation, source }
    }
}
