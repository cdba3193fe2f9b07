//! Where a tracked entity is at a given frame.

use ultraviolet::DVec3;

use crate::{
    frame::FrameTime,
    geodesy::{Cartographic, Ellipsoid},
};

/// Resolves an entity's ECEF position for a frame. `None` means the position is unknown right now.
pub trait PositionSource {
    fn position_at(&self, time: FrameTime) -> Option<DVec3>;
}

impl PositionSource for DVec3 {
    fn position_at(&self, _time: FrameTime) -> Option<DVec3> {
        Some(*self)
    }
}

/// Interpreted on the WGS84 ellipsoid
impl PositionSource for Cartographic {
    fn position_at(&self, _time: FrameTime) -> Option<DVec3> {
        Some(Ellipsoid::WGS84.cartographic_to_cartesian(self))
    }
}

impl<F> PositionSource for F
where
    F: Fn(FrameTime) -> Option<DVec3>,
{
    fn position_at(&self, time: FrameTime) -> Option<DVec3> {
        self(time)
    }
}

/// A position track made of time-tagged samples, linearly interpolated in between.
///
/// Outside the sampled interval the position is unknown.
#[derive(Clone, Debug, Default)]
pub struct SampledPosition {
    /// Sorted by time
    samples: Vec<(f64, DVec3)>,
}

impl SampledPosition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a sample, replacing any sample at the same time.
    pub fn add_sample(&mut self, seconds: f64, position: DVec3) {
        match self
            .samples
            .binary_search_by(|(time, _)| time.total_cmp(&seconds))
        {
            Ok(index) => self.samples[index].1 = position,
            Err(index) => self.samples.insert(index, (seconds, position)),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample(&self, seconds: f64) -> Option<DVec3> {
        let (first, last) = (self.samples.first()?, self.samples.last()?);
        if seconds < first.0 || seconds > last.0 {
            return None;
        }
        let upper = self
            .samples
            .partition_point(|(time, _)| *time < seconds)
            .min(self.samples.len() - 1);
        let (t1, p1) = self.samples[upper];
        if upper == 0 || t1 == seconds {
            return Some(p1);
        }
        let (t0, p0) = self.samples[upper - 1];
        let s = (seconds - t0) / (t1 - t0);
        Some(p0 + (p1 - p0) * s)
    }
}

impl PositionSource for SampledPosition {
    fn position_at(&self, time: FrameTime) -> Option<DVec3> {
        self.sample(time.seconds)
    }
}
