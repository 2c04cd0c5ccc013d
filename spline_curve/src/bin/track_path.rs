//! Fits a path through waypoints and follows it with a simulated robot, printing the pose error
//! at every step. Set RUST_LOG=debug to see the curve operations.

use nalgebra::Vector3;
use spline_curve::{Spline, SplineConfig, SplineError};
use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length};
use uom::si::length::meter;

const CONFIG: &str = r#"
dimension = 2
curve_order = 4
geometric_resolution = 0.001

[simplify]
max_iterations = 12
"#;

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SplineConfig::from_toml_str(CONFIG)?;
    let mut spline = Spline::from_config(&config)?;

    let waypoints: Vec<f64> = (0..=24)
        .flat_map(|i| {
            let x = i as f64 * 0.5;
            [x, 2.0 * (x / 3.0).sin()]
        })
        .collect();
    spline.interpolate(&waypoints, &[])?;
    println!("{}", spline.properties()?);
    println!("curvature max: {:0.4}", spline.curvature_max()?);

    let error = spline.simplify_with_tolerance(0.005)?;
    println!(
        "simplified to {} control points, error x {:0.5} y {:0.5}",
        spline.point_count()?,
        error[0],
        error[1]
    );

    // drive along the path swaying left and right of the tangent
    let (start, end) = spline.domain()?;
    let step = 0.25 * spline.unit_parameter()?;
    let mut param = start;
    let mut t = start;
    while t <= end {
        let frame = spline.frenet_frame(t)?;
        let on_path = spline.point(t)?;
        let offset = 0.1 * (3.0 * t).sin();
        let robot = Vector3::new(
            on_path[0] - offset * frame[(0, 1)],
            on_path[1] + offset * frame[(0, 0)],
            0.0,
        );
        let heading = spline.heading(t)? + Angle::new::<degree>(5.0);
        let pose = spline.pose_error(&robot, heading, param, Length::new::<meter>(1.0))?;
        println!(
            "t {t:7.3} matched {:7.3} distance {:+0.4} m heading {:+0.4} rad",
            pose.param,
            pose.distance.get::<meter>(),
            pose.heading.get::<radian>()
        );
        param = pose.param;
        t += step;
    }

    match spline.find_one_closest_point(&[6.0, 3.0], config.geometric_resolution) {
        Ok(closest) => println!("closest to (6, 3) at {closest:0.4}"),
        Err(SplineError::Logic(msg)) => println!("{msg}"),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("track_path: {err}");
        std::process::exit(1);
    }
}
