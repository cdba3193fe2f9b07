use std::time::Duration;

use crate::{
    camera::GlobeCamera,
    frame::{Clock, FrameEvent, FrameTime},
    geodesy::Ellipsoid,
};

/// The host side: a camera on a globe plus the render loop's pre-render hook.
pub struct Viewer<C: GlobeCamera> {
    pub camera: C,
    ellipsoid: Ellipsoid,
    clock: Clock,
    pre_render: FrameEvent<C>,
}

impl<C: GlobeCamera> Viewer<C> {
    pub fn new(camera: C) -> Self {
        Self::with_ellipsoid(camera, Ellipsoid::WGS84)
    }

    pub fn with_ellipsoid(camera: C, ellipsoid: Ellipsoid) -> Self {
        Self {
            camera,
            ellipsoid,
            clock: Clock::new(),
            pre_render: FrameEvent::new(),
        }
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Raised right before every frame is rendered.
    pub fn pre_render(&self) -> &FrameEvent<C> {
        &self.pre_render
    }

    pub fn time(&self) -> FrameTime {
        self.clock.now()
    }

    /// Renders a frame, advancing the clock by the elapsed wall-clock time.
    pub fn render_frame(&mut self) -> FrameTime {
        let time = self.clock.update();
        self.pre_render.raise(&mut self.camera, time);
        time
    }

    /// Renders a frame with a fixed time step.
    pub fn render_frame_after(&mut self, delta: Duration) -> FrameTime {
        let time = self.clock.advance(delta);
        self.pre_render.raise(&mut self.camera, time);
        time
    }
}
