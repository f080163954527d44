//! Scene identification: sensors, band roles and file grouping

mod bands;
mod locator;

pub use bands::{BandId, BandRole, BandRoleTable, BandRoles, Sensor, UnsupportedSensor};
pub use locator::{discover, group, locate_scenes, parse_band_id, parse_scene_name, SceneBundle, SceneKey};
