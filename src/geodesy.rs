//! Reference ellipsoid math: geodetic <-> cartesian conversion and surface projection.
//!
//! Cartesian positions are Earth-centred Earth-fixed, in metres.

use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

/// Positions closer than this to the ellipsoid centre have no geodetic coordinates.
const CENTER_EPSILON: f64 = 1e-6;
const MAX_ITERATIONS: usize = 16;
const LATITUDE_TOLERANCE: f64 = 1e-14;

/// Geodetic coordinate. Longitude and latitude are in radians, height in metres above the ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude,
            latitude,
            height,
        }
    }

    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians(), height)
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }
}

/// An oblate ellipsoid of revolution around the z axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ellipsoid {
    semi_major: f64,
    semi_minor: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major: 6378137.0,
        semi_minor: 6356752.314245179,
    };

    pub fn new(semi_major: f64, semi_minor: f64) -> Self {
        assert!(
            semi_major > 0.0 && semi_minor > 0.0 && semi_minor <= semi_major,
            "ellipsoid radii must be positive with semi_minor <= semi_major"
        );
        Self {
            semi_major,
            semi_minor,
        }
    }

    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// First eccentricity squared
    fn e2(&self) -> f64 {
        1.0 - (self.semi_minor * self.semi_minor) / (self.semi_major * self.semi_major)
    }

    /// Prime vertical radius of curvature at the given latitude
    fn prime_vertical_radius(&self, sin_lat: f64) -> f64 {
        self.semi_major / (1.0 - self.e2() * sin_lat * sin_lat).sqrt()
    }

    pub fn cartographic_to_cartesian(&self, cartographic: &Cartographic) -> DVec3 {
        let (sin_lat, cos_lat) = cartographic.latitude.sin_cos();
        let (sin_lon, cos_lon) = cartographic.longitude.sin_cos();
        let n = self.prime_vertical_radius(sin_lat);
        let h = cartographic.height;
        DVec3::new(
            (n + h) * cos_lat * cos_lon,
            (n + h) * cos_lat * sin_lon,
            (n * (1.0 - self.e2()) + h) * sin_lat,
        )
    }

    /// Returns `None` at the ellipsoid centre, where latitude is undefined.
    pub fn cartesian_to_cartographic(&self, position: DVec3) -> Option<Cartographic> {
        if !(position.x.is_finite() && position.y.is_finite() && position.z.is_finite()) {
            return None;
        }
        if position.mag() < CENTER_EPSILON {
            return None;
        }

        let e2 = self.e2();
        let p = (position.x * position.x + position.y * position.y).sqrt();
        let longitude = position.y.atan2(position.x);

        let latitude = if p < CENTER_EPSILON {
            // On the polar axis
            std::f64::consts::FRAC_PI_2.copysign(position.z)
        } else {
            let mut latitude = position.z.atan2(p * (1.0 - e2));
            for _ in 0..MAX_ITERATIONS {
                let sin_lat = latitude.sin();
                let n = self.prime_vertical_radius(sin_lat);
                let next = (position.z + e2 * n * sin_lat).atan2(p);
                let converged = (next - latitude).abs() < LATITUDE_TOLERANCE;
                latitude = next;
                if converged {
                    break;
                }
            }
            latitude
        };

        let (sin_lat, cos_lat) = latitude.sin_cos();
        // Stable at every latitude, including the poles
        let height = p * cos_lat + position.z * sin_lat
            - self.semi_major * (1.0 - e2 * sin_lat * sin_lat).sqrt();

        Some(Cartographic {
            longitude,
            latitude,
            height,
        })
    }

    /// Projects a point onto the ellipsoid surface along the geodetic normal, dropping its height.
    pub fn scale_to_geodetic_surface(&self, position: DVec3) -> Option<DVec3> {
        let cartographic = self.cartesian_to_cartographic(position)?;
        Some(self.cartographic_to_cartesian(&Cartographic {
            height: 0.0,
            ..cartographic
        }))
    }

    /// Distance between the surface projections of two points, independent of their heights.
    ///
    /// This is the straight chord between the projected points, not the arc along the surface. The
    /// chord is shorter by roughly d^3 / (24 R^2): about 1 m at 100 km, about 8 km at 2000 km.
    pub fn surface_distance(&self, a: DVec3, b: DVec3) -> Option<f64> {
        let a = self.scale_to_geodetic_surface(a)?;
        let b = self.scale_to_geodetic_surface(b)?;
        Some((a - b).mag())
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Ellipsoid::WGS84
    }
}
