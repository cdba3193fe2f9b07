use std::path::PathBuf;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    constraint::Constraint,
    error::{ConfigError, GuardError},
    geodesy::Cartographic,
};

/// A point given in degrees and metres, the way humans write them into config files.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub height: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64, height: f64) -> Self {
        Self { lon, lat, height }
    }

    pub fn to_cartographic(&self) -> Cartographic {
        Cartographic::from_degrees(self.lon, self.lat, self.height)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstraintConfig {
    EntityDistance {
        entity: GeoPoint,
        max_distance: f64,
        max_height: f64,
    },
    BoundingBox {
        lon_min: f64,
        lat_min: f64,
        lon_max: f64,
        lat_max: f64,
        max_height: f64,
    },
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        ConstraintConfig::BoundingBox {
            lon_min: -80.0,
            lat_min: 30.0,
            lon_max: -70.0,
            lat_max: 40.0,
            max_height: 10_000.0,
        }
    }
}

impl ConstraintConfig {
    pub fn from_str(value: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(value)?)
    }

    /// Entities are placed on the WGS84 ellipsoid.
    pub fn to_constraint(&self) -> Result<Constraint, GuardError> {
        match *self {
            ConstraintConfig::EntityDistance {
                entity,
                max_distance,
                max_height,
            } => Constraint::entity_distance(entity.to_cartographic(), max_distance, max_height),
            ConstraintConfig::BoundingBox {
                lon_min,
                lat_min,
                lon_max,
                lat_max,
                max_height,
            } => Constraint::bounding_box(lon_min, lat_min, lon_max, lat_max, max_height),
        }
    }
}

/// Loads a JSON config file, writing out the default one if the file does not exist yet.
pub struct ConfigFileLoader<T> {
    pub path: PathBuf,
    config: Option<T>,
}

impl<T> ConfigFileLoader<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: None,
        }
    }

    pub fn load_config(&mut self) -> Result<&mut T, ConfigError> {
        let config = match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, writing the default one", self.path);
                let config = T::default();
                self.write(&config)?;
                config
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        Ok(self.config.insert(config))
    }

    pub fn get_or_load_config(&mut self) -> Result<&mut T, ConfigError> {
        if let Some(config) = self.config.take() {
            return Ok(self.config.insert(config));
        }
        self.load_config()
    }

    pub fn save_config(&self) -> Result<(), ConfigError> {
        match &self.config {
            Some(config) => self.write(config),
            None => Ok(()),
        }
    }

    fn write(&self, config: &T) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, content).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bounding_box() {
        let config = ConstraintConfig::from_str(
            r#"{ "kind": "bounding_box", "lon_min": -80, "lat_min": 30, "lon_max": -70, "lat_max": 40, "max_height": 10000 }"#,
        )
        .unwrap();
        assert_eq!(config, ConstraintConfig::default());
        assert!(matches!(
            config.to_constraint(),
            Ok(Constraint::BoundingBox { max_height, .. }) if max_height == 10_000.0
        ));
    }

    #[test]
    fn parses_an_entity_distance_with_default_height() {
        let config = ConstraintConfig::from_str(
            r#"{ "kind": "entity_distance", "entity": { "lon": 8.5, "lat": 47.3 }, "max_distance": 500, "max_height": 100 }"#,
        )
        .unwrap();
        assert_eq!(
            config,
            ConstraintConfig::EntityDistance {
                entity: GeoPoint::new(8.5, 47.3, 0.0),
                max_distance: 500.0,
                max_height: 100.0,
            }
        );
        assert!(config.to_constraint().is_ok());
    }

    #[test]
    fn invalid_constraints_are_reported() {
        let config = ConstraintConfig::EntityDistance {
            entity: GeoPoint::new(0.0, 0.0, 0.0),
            max_distance: -5.0,
            max_height: 100.0,
        };
        assert_eq!(
            config.to_constraint().unwrap_err(),
            GuardError::NegativeDistance(-5.0)
        );
        assert!(matches!(
            ConstraintConfig::from_str(r#"{ "kind": "sphere" }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.json");

        let mut loader = ConfigFileLoader::<ConstraintConfig>::new(&path);
        assert_eq!(*loader.load_config().unwrap(), ConstraintConfig::default());
        assert!(path.exists());

        *loader.get_or_load_config().unwrap() = ConstraintConfig::EntityDistance {
            entity: GeoPoint::new(1.0, 2.0, 3.0),
            max_distance: 10.0,
            max_height: 20.0,
        };
        loader.save_config().unwrap();

        let mut reloaded = ConfigFileLoader::<ConstraintConfig>::new(&path);
        assert!(matches!(
            reloaded.load_config().unwrap(),
            ConstraintConfig::EntityDistance { max_distance, .. } if *max_distance == 10.0
        ));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.json");
        std::fs::write(&path, "{ not json").unwrap();

        let mut loader = ConfigFileLoader::<ConstraintConfig>::new(&path);
        assert!(matches!(loader.load_config(), Err(ConfigError::Json(_))));
    }
}
