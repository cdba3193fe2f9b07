use std::f64::consts::FRAC_PI_2;

use ultraviolet::DVec3;

use crate::geodesy::{Cartographic, Ellipsoid};

use super::{GlobeCamera, HeadingPitchRoll, Pose};

/// A plain globe camera: a position plus heading/pitch/roll, moved directly by the application.
#[derive(Clone, Debug, PartialEq)]
pub struct FreeCamera {
    pub position: DVec3,
    pub orientation: HeadingPitchRoll,
}

impl FreeCamera {
    pub fn new(position: DVec3, orientation: HeadingPitchRoll) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn at_cartographic(
        ellipsoid: &Ellipsoid,
        cartographic: &Cartographic,
        orientation: HeadingPitchRoll,
    ) -> Self {
        Self::new(ellipsoid.cartographic_to_cartesian(cartographic), orientation)
    }

    pub fn set_cartographic(&mut self, ellipsoid: &Ellipsoid, cartographic: &Cartographic) {
        self.position = ellipsoid.cartographic_to_cartesian(cartographic);
    }

    pub fn move_by(&mut self, offset: DVec3) {
        self.position += offset;
    }

    /// Turns the camera. Pitch is clamped to straight up/down, heading wraps to [0, 2pi).
    pub fn look(&mut self, heading_delta: f64, pitch_delta: f64) {
        self.orientation.heading =
            (self.orientation.heading + heading_delta).rem_euclid(std::f64::consts::TAU);
        self.orientation.pitch = (self.orientation.pitch + pitch_delta).clamp(-FRAC_PI_2, FRAC_PI_2);
    }
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self::at_cartographic(
            &Ellipsoid::WGS84,
            &Cartographic::new(0.0, 0.0, 10_000.0),
            HeadingPitchRoll::new(0.0, -FRAC_PI_2, 0.0),
        )
    }
}

impl GlobeCamera for FreeCamera {
    fn position(&self) -> DVec3 {
        self.position
    }

    fn orientation(&self) -> HeadingPitchRoll {
        self.orientation
    }

    fn set_pose(&mut self, pose: &Pose) {
        self.position = pose.position;
        self.orientation = pose.orientation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_pose_snaps_exactly() {
        let mut camera = FreeCamera::default();
        let pose = Pose::new(
            DVec3::new(1.0, 2.0, 3.0),
            HeadingPitchRoll::new(0.1, -0.2, 0.3),
        );
        camera.set_pose(&pose);
        assert_eq!(camera.pose(), pose);
    }

    #[test]
    fn captured_pose_does_not_follow_the_camera() {
        let mut camera = FreeCamera::default();
        let captured = camera.pose();
        camera.move_by(DVec3::new(10.0, 0.0, 0.0));
        camera.look(0.5, 0.1);
        assert_ne!(camera.pose(), captured);
        assert_eq!(captured.position, FreeCamera::default().position);
    }

    #[test]
    fn look_clamps_pitch_and_wraps_heading() {
        let mut camera = FreeCamera::new(DVec3::zero(), HeadingPitchRoll::default());
        camera.look(-0.5, 10.0);
        assert_eq!(camera.orientation.pitch, FRAC_PI_2);
        assert!((camera.orientation.heading - (std::f64::consts::TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn default_camera_reports_its_height() {
        let camera = FreeCamera::default();
        let cartographic = camera.cartographic(&Ellipsoid::WGS84).unwrap();
        assert!((cartographic.height - 10_000.0).abs() < 1e-6);
    }
}
