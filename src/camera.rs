pub mod free_camera;

use ultraviolet::DVec3;

use crate::geodesy::{Cartographic, Ellipsoid};

pub use self::free_camera::FreeCamera;

/// Camera orientation relative to the local east-north-up frame, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadingPitchRoll {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadingPitchRoll {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    pub fn from_degrees(heading: f64, pitch: f64, roll: f64) -> Self {
        Self::new(heading.to_radians(), pitch.to_radians(), roll.to_radians())
    }
}

/// Position and orientation captured at one instant. Always a copy, never a view of a live camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: DVec3,
    pub orientation: HeadingPitchRoll,
}

impl Pose {
    pub fn new(position: DVec3, orientation: HeadingPitchRoll) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

/// What the guard needs from a host camera.
pub trait GlobeCamera {
    /// in world-space (ECEF metres)
    fn position(&self) -> DVec3;
    fn orientation(&self) -> HeadingPitchRoll;

    /// Instantaneous, no transition.
    fn set_pose(&mut self, pose: &Pose);

    fn pose(&self) -> Pose {
        Pose::new(self.position(), self.orientation())
    }

    fn cartographic(&self, ellipsoid: &Ellipsoid) -> Option<Cartographic> {
        ellipsoid.cartesian_to_cartographic(self.position())
    }
}
