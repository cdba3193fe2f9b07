use std::cell::RefCell;
use std::rc::Rc;

use crate::{
    camera::{GlobeCamera, Pose},
    config::ConstraintConfig,
    constraint::{Constraint, SkipReason, Verdict},
    entity::PositionSource,
    error::GuardError,
    frame::{FrameEvent, FrameTime, Subscription},
    geodesy::Ellipsoid,
    viewer::Viewer,
};

/// What the guard did on one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Out of bounds, but there was no valid pose to return to yet. The current pose was stored instead.
    Seeded,
    InBounds,
    /// The camera was snapped back to the last valid pose
    Reverted,
    /// Nothing was checked or changed
    Skipped(SkipReason),
}

/// Returned by [`BoundsGuard::on_blocked`].
#[derive(Debug, PartialEq, Eq)]
pub struct ListenerId(Subscription);

#[derive(Default)]
struct GuardState {
    constraint: Option<Constraint>,
    last_valid_pose: Option<Pose>,
    last_outcome: Option<FrameOutcome>,
    blocked_count: u64,
}

impl GuardState {
    fn check<C: GlobeCamera>(
        &mut self,
        camera: &mut C,
        ellipsoid: &Ellipsoid,
        time: FrameTime,
    ) -> Option<FrameOutcome> {
        let constraint = self.constraint.as_ref()?;
        let outcome = match constraint.evaluate(camera.position(), ellipsoid, time) {
            Verdict::InBounds => {
                self.last_valid_pose = Some(camera.pose());
                FrameOutcome::InBounds
            }
            Verdict::OutOfBounds => match self.last_valid_pose {
                Some(pose) => {
                    camera.set_pose(&pose);
                    self.blocked_count += 1;
                    log::debug!("Frame {}: camera out of bounds, reverted", time.number);
                    FrameOutcome::Reverted
                }
                None => {
                    log::warn!(
                        "Frame {}: camera started out of bounds, accepting its pose as the first valid one",
                        time.number
                    );
                    self.last_valid_pose = Some(camera.pose());
                    FrameOutcome::Seeded
                }
            },
            Verdict::Undetermined(reason) => {
                if self.last_outcome != Some(FrameOutcome::Skipped(reason)) {
                    log::warn!("Frame {}: skipping bounds check ({:?})", time.number, reason);
                }
                FrameOutcome::Skipped(reason)
            }
        };
        self.last_outcome = Some(outcome);
        Some(outcome)
    }
}

/// Keeps a viewer's camera inside a [`Constraint`] by snapping it back to the last pose that
/// satisfied it.
///
/// The guard checks the camera in the viewer's pre-render event. At most one constraint is active;
/// installing another replaces it.
pub struct BoundsGuard<C: GlobeCamera + 'static> {
    pre_render: FrameEvent<C>,
    ellipsoid: Ellipsoid,
    state: Rc<RefCell<GuardState>>,
    blocked: FrameEvent<()>,
    subscription: Option<Subscription>,
}

impl<C: GlobeCamera + 'static> BoundsGuard<C> {
    pub fn new(viewer: &Viewer<C>) -> Self {
        Self::attach(viewer.pre_render().clone(), *viewer.ellipsoid())
    }

    /// Attaches to any pre-render event, for hosts that do not use [`Viewer`].
    pub fn attach(pre_render: FrameEvent<C>, ellipsoid: Ellipsoid) -> Self {
        Self {
            pre_render,
            ellipsoid,
            state: Rc::new(RefCell::new(GuardState::default())),
            blocked: FrameEvent::new(),
            subscription: None,
        }
    }

    /// Keeps the camera within `max_distance` metres (along the surface) of the entity and at most
    /// `max_height` metres above the ellipsoid.
    pub fn constrain_to_entity_distance(
        &mut self,
        entity: impl PositionSource + 'static,
        max_distance: f64,
        max_height: f64,
    ) -> Result<(), GuardError> {
        self.constrain(Constraint::entity_distance(entity, max_distance, max_height)?)
    }

    /// Keeps the camera inside `[lon_min, lon_max] x [lat_min, lat_max]` (degrees) and at most
    /// `max_height` metres above the ellipsoid.
    pub fn constrain_to_bounding_box(
        &mut self,
        lon_min: f64,
        lat_min: f64,
        lon_max: f64,
        lat_max: f64,
        max_height: f64,
    ) -> Result<(), GuardError> {
        self.constrain(Constraint::bounding_box(
            lon_min, lat_min, lon_max, lat_max, max_height,
        )?)
    }

    /// Installs the constraint a config file describes.
    pub fn apply_config(&mut self, config: &ConstraintConfig) -> Result<(), GuardError> {
        self.constrain(config.to_constraint()?)
    }

    /// Installs a constraint, replacing the active one. An invalid constraint is rejected and the
    /// active one stays in place.
    pub fn constrain(&mut self, constraint: Constraint) -> Result<(), GuardError> {
        constraint.validate()?;
        self.release();
        log::info!("Constraining camera to {:?}", constraint);

        {
            let mut state = self.state.borrow_mut();
            state.constraint = Some(constraint);
            state.last_valid_pose = None;
            state.last_outcome = None;
        }

        let state = Rc::clone(&self.state);
        let blocked = self.blocked.clone();
        let ellipsoid = self.ellipsoid;
        self.subscription = Some(self.pre_render.subscribe(move |camera: &mut C, time| {
            // The borrow must end before the blocked listeners run, they may call back into the guard
            let outcome = state.borrow_mut().check(camera, &ellipsoid, time);
            if outcome == Some(FrameOutcome::Reverted) {
                blocked.raise(&mut (), time);
            }
        }));
        Ok(())
    }

    /// Stops checking the camera. Does nothing when no constraint is active.
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.pre_render.unsubscribe(subscription);
            self.state.borrow_mut().constraint = None;
            log::info!("Camera constraint released");
        }
    }

    pub fn is_constrained(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn constraint(&self) -> Option<Constraint> {
        self.state.borrow().constraint.clone()
    }

    /// `None` until the first frame after a constraint was installed.
    pub fn last_valid_pose(&self) -> Option<Pose> {
        self.state.borrow().last_valid_pose
    }

    pub fn last_outcome(&self) -> Option<FrameOutcome> {
        self.state.borrow().last_outcome
    }

    /// Number of reverts since the guard was created.
    pub fn blocked_count(&self) -> u64 {
        self.state.borrow().blocked_count
    }

    /// Registers a callback fired synchronously every time the camera is snapped back.
    pub fn on_blocked(&self, mut listener: impl FnMut() + 'static) -> ListenerId {
        ListenerId(self.blocked.subscribe(move |_: &mut (), _| listener()))
    }

    pub fn remove_blocked_listener(&self, id: ListenerId) -> bool {
        self.blocked.unsubscribe(id.0)
    }
}

impl<C: GlobeCamera + 'static> Drop for BoundsGuard<C> {
    fn drop(&mut self) {
        self.release();
    }
}
