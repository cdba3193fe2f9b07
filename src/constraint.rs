//! The two camera envelopes and the predicates that test them.

use std::fmt;
use std::rc::Rc;

use ultraviolet::DVec3;

use crate::{
    entity::PositionSource,
    error::GuardError,
    frame::FrameTime,
    geodesy::{Cartographic, Ellipsoid},
};

/// Why a frame could not be checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The tracked entity has no position at this frame
    UnresolvedEntityPosition,
    /// The camera sits at the ellipsoid centre, so it has no geodetic coordinates
    DegenerateCameraPosition,
    /// The tracked entity sits at the ellipsoid centre
    DegenerateEntityPosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    InBounds,
    OutOfBounds,
    Undetermined(SkipReason),
}

#[derive(Clone)]
pub enum Constraint {
    /// Stay within `max_distance` metres of the entity, measured between surface projections,
    /// and no higher than `max_height` metres above the ellipsoid.
    EntityDistance {
        entity: Rc<dyn PositionSource>,
        max_distance: f64,
        max_height: f64,
    },
    /// Stay inside a closed lon/lat rectangle (degrees) and below `max_height` metres.
    BoundingBox {
        lon_min: f64,
        lat_min: f64,
        lon_max: f64,
        lat_max: f64,
        max_height: f64,
    },
}

impl Constraint {
    pub fn entity_distance(
        entity: impl PositionSource + 'static,
        max_distance: f64,
        max_height: f64,
    ) -> Result<Self, GuardError> {
        Self::entity_distance_shared(Rc::new(entity), max_distance, max_height)
    }

    /// Like [`Constraint::entity_distance`], for an entity the application keeps updating.
    pub fn entity_distance_shared(
        entity: Rc<dyn PositionSource>,
        max_distance: f64,
        max_height: f64,
    ) -> Result<Self, GuardError> {
        let constraint = Constraint::EntityDistance {
            entity,
            max_distance,
            max_height,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    pub fn bounding_box(
        lon_min: f64,
        lat_min: f64,
        lon_max: f64,
        lat_max: f64,
        max_height: f64,
    ) -> Result<Self, GuardError> {
        let constraint = Constraint::BoundingBox {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
            max_height,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Rejects parameters that would produce meaningless geometry.
    pub fn validate(&self) -> Result<(), GuardError> {
        match *self {
            Constraint::EntityDistance {
                max_distance,
                max_height,
                ..
            } => {
                ensure_finite("max_distance", max_distance)?;
                ensure_finite("max_height", max_height)?;
                if max_distance < 0.0 {
                    return Err(GuardError::NegativeDistance(max_distance));
                }
            }
            Constraint::BoundingBox {
                lon_min,
                lat_min,
                lon_max,
                lat_max,
                max_height,
            } => {
                ensure_finite("lon_min", lon_min)?;
                ensure_finite("lat_min", lat_min)?;
                ensure_finite("lon_max", lon_max)?;
                ensure_finite("lat_max", lat_max)?;
                ensure_finite("max_height", max_height)?;
                ensure_in_range("lon_min", lon_min, 180.0)?;
                ensure_in_range("lon_max", lon_max, 180.0)?;
                ensure_in_range("lat_min", lat_min, 90.0)?;
                ensure_in_range("lat_max", lat_max, 90.0)?;
                if lon_min > lon_max {
                    return Err(GuardError::AntimeridianCrossing { lon_min, lon_max });
                }
                if lat_min > lat_max {
                    return Err(GuardError::InvalidBoundingBox {
                        axis: "latitude",
                        min: lat_min,
                        max: lat_max,
                    });
                }
            }
        }
        Ok(())
    }

    /// Checks the camera against this constraint using its current state.
    pub fn evaluate(&self, camera_position: DVec3, ellipsoid: &Ellipsoid, time: FrameTime) -> Verdict {
        let violated = match self {
            Constraint::EntityDistance {
                entity,
                max_distance,
                max_height,
            } => {
                let Some(entity_position) = entity.position_at(time) else {
                    return Verdict::Undetermined(SkipReason::UnresolvedEntityPosition);
                };
                if ellipsoid.scale_to_geodetic_surface(entity_position).is_none() {
                    return Verdict::Undetermined(SkipReason::DegenerateEntityPosition);
                }
                exceeds_entity_distance(
                    ellipsoid,
                    camera_position,
                    entity_position,
                    *max_distance,
                    *max_height,
                )
            }
            Constraint::BoundingBox {
                lon_min,
                lat_min,
                lon_max,
                lat_max,
                max_height,
            } => ellipsoid
                .cartesian_to_cartographic(camera_position)
                .map(|camera| {
                    outside_bounding_box(&camera, *lon_min, *lat_min, *lon_max, *lat_max, *max_height)
                }),
        };
        match violated {
            Some(true) => Verdict::OutOfBounds,
            Some(false) => Verdict::InBounds,
            None => Verdict::Undetermined(SkipReason::DegenerateCameraPosition),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::EntityDistance {
                max_distance,
                max_height,
                ..
            } => f
                .debug_struct("EntityDistance")
                .field("max_distance", max_distance)
                .field("max_height", max_height)
                .finish_non_exhaustive(),
            Constraint::BoundingBox {
                lon_min,
                lat_min,
                lon_max,
                lat_max,
                max_height,
            } => f
                .debug_struct("BoundingBox")
                .field("lon_min", lon_min)
                .field("lat_min", lat_min)
                .field("lon_max", lon_max)
                .field("lat_max", lat_max)
                .field("max_height", max_height)
                .finish(),
        }
    }
}

/// True when the camera is too far from the entity horizontally or too high.
///
/// Returns `None` when either point has no geodetic coordinates.
pub fn exceeds_entity_distance(
    ellipsoid: &Ellipsoid,
    camera_position: DVec3,
    entity_position: DVec3,
    max_distance: f64,
    max_height: f64,
) -> Option<bool> {
    let camera = ellipsoid.cartesian_to_cartographic(camera_position)?;
    let distance = ellipsoid.surface_distance(camera_position, entity_position)?;
    Some(distance > max_distance || camera.height > max_height)
}

/// True when the camera leaves the closed rectangle or rises above `max_height`.
pub fn outside_bounding_box(
    camera: &Cartographic,
    lon_min: f64,
    lat_min: f64,
    lon_max: f64,
    lat_max: f64,
    max_height: f64,
) -> bool {
    // Compared in radians so edges given in degrees match `Cartographic::from_degrees` exactly
    let (lon, lat) = (camera.longitude, camera.latitude);
    lon < lon_min.to_radians()
        || lon > lon_max.to_radians()
        || lat < lat_min.to_radians()
        || lat > lat_max.to_radians()
        || camera.height > max_height
}

fn ensure_finite(name: &'static str, value: f64) -> Result<(), GuardError> {
    if !value.is_finite() {
        return Err(GuardError::NonFiniteParameter { name, value });
    }
    Ok(())
}

fn ensure_in_range(name: &'static str, value: f64, limit: f64) -> Result<(), GuardError> {
    if value < -limit || value > limit {
        return Err(GuardError::OutOfRange {
            name,
            value,
            min: -limit,
            max: limit,
        });
    }
    Ok(())
}
