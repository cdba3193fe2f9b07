use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use env_logger::Env;
use globe_guard::{
    config::{ConfigFileLoader, ConstraintConfig, GeoPoint},
    BoundsGuard, Cartographic, Ellipsoid, FreeCamera, HeadingPitchRoll, Viewer,
};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_PATH: &str = "globe_guard.json";

/// A scripted camera flight against one constraint.
#[derive(Serialize, Deserialize, Debug, Clone)]
struct DemoConfig {
    constraint: ConstraintConfig,
    start: GeoPoint,
    waypoints: Vec<GeoPoint>,
    frames_per_leg: u32,
    frame_millis: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            constraint: ConstraintConfig::default(),
            start: GeoPoint::new(-75.0, 35.0, 5_000.0),
            waypoints: vec![
                GeoPoint::new(-72.0, 38.0, 8_000.0),
                // Leaves the box to the east
                GeoPoint::new(-65.0, 38.0, 8_000.0),
                GeoPoint::new(-75.0, 32.0, 2_000.0),
            ],
            frames_per_leg: 60,
            frame_millis: 16,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let mut loader = ConfigFileLoader::<DemoConfig>::new(path);
    let config = loader.load_config()?.clone();

    let mut viewer = Viewer::new(FreeCamera::at_cartographic(
        &Ellipsoid::WGS84,
        &config.start.to_cartographic(),
        HeadingPitchRoll::from_degrees(0.0, -45.0, 0.0),
    ));
    let mut guard = BoundsGuard::new(&viewer);
    guard.apply_config(&config.constraint)?;

    let blocked_frames = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&blocked_frames);
    let _listener = guard.on_blocked(move || counter.set(counter.get() + 1));

    let ellipsoid = *viewer.ellipsoid();
    let step = Duration::from_millis(config.frame_millis);
    let frames = config.frames_per_leg.max(1);
    let mut previous = config.start;
    let mut last = ellipsoid.cartographic_to_cartesian(&previous.to_cartographic());
    for waypoint in &config.waypoints {
        for frame in 1..=frames {
            let target = lerp(&previous, waypoint, f64::from(frame) / f64::from(frames));
            let target = ellipsoid.cartographic_to_cartesian(&target.to_cartographic());
            // Relative motion, the way user input drives the camera
            viewer.camera.move_by(target - last);
            last = target;

            let time = viewer.render_frame_after(step);
            log::trace!("Frame {}: {:?}", time.number, guard.last_outcome());
        }
        previous = *waypoint;
    }

    guard.release();

    let end = ellipsoid
        .cartesian_to_cartographic(viewer.camera.position)
        .unwrap_or_default();
    println!(
        "{} frames rendered, {} blocked",
        viewer.time().number,
        blocked_frames.get()
    );
    println!("Camera ended at {}", describe(&end));
    Ok(())
}

fn lerp(from: &GeoPoint, to: &GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(
        from.lon + (to.lon - from.lon) * t,
        from.lat + (to.lat - from.lat) * t,
        from.height + (to.height - from.height) * t,
    )
}

fn describe(cartographic: &Cartographic) -> String {
    format!(
        "lon {:.4}, lat {:.4}, height {:.1} m",
        cartographic.longitude_degrees(),
        cartographic.latitude_degrees(),
        cartographic.height
    )
}
