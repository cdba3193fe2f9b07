pub mod camera;
pub mod config;
pub mod constraint;
pub mod entity;
pub mod error;
pub mod frame;
pub mod geodesy;
pub mod guard;
pub mod viewer;

pub use camera::{FreeCamera, GlobeCamera, HeadingPitchRoll, Pose};
pub use constraint::{Constraint, SkipReason};
pub use error::{ConfigError, GuardError};
pub use geodesy::{Cartographic, Ellipsoid};
pub use guard::{BoundsGuard, FrameOutcome, ListenerId};
pub use viewer::Viewer;
