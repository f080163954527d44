//! Sensor models and the band role table
//!
//! Each supported sensor maps the three semantic bands the index engine
//! needs (green, red, near-infrared) onto its own band numbering. Older
//! Landsat missions (TM, ETM+) use bands 2/3/4, OLI missions use 3/4/5.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Satellite sensor model of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Sensor {
    /// Landsat 5 Thematic Mapper
    Landsat5,
    /// Landsat 7 Enhanced Thematic Mapper Plus
    Landsat7,
    /// Landsat 8 Operational Land Imager
    Landsat8,
    /// Landsat 9 Operational Land Imager 2
    Landsat9,
}

impl Sensor {
    pub const ALL: [Sensor; 4] = [
        Sensor::Landsat5,
        Sensor::Landsat7,
        Sensor::Landsat8,
        Sensor::Landsat9,
    ];

    /// Collection product prefix, e.g. `LC08` in `LC08_L2SP_...`
    pub fn prefix(self) -> &'static str {
        match self {
            Sensor::Landsat5 => "LT05",
            Sensor::Landsat7 => "LE07",
            Sensor::Landsat8 => "LC08",
            Sensor::Landsat9 => "LC09",
        }
    }

    /// Identify the sensor from the start of a product file name
    pub fn from_file_prefix(name: &str) -> Option<Sensor> {
        Sensor::ALL.into_iter().find(|s| name.starts_with(s.prefix()))
    }

    /// Human-readable model name
    pub fn name(self) -> &'static str {
        match self {
            Sensor::Landsat5 => "Landsat-5",
            Sensor::Landsat7 => "Landsat-7",
            Sensor::Landsat8 => "Landsat-8",
            Sensor::Landsat9 => "Landsat-9",
        }
    }

    /// Nominal ground sampling distance of the reflective bands, in meters
    pub fn pixel_size_m(self) -> f64 {
        match self {
            Sensor::Landsat5 | Sensor::Landsat7 | Sensor::Landsat8 | Sensor::Landsat9 => 30.0,
        }
    }

    /// Built-in green/red/NIR layout for this sensor
    pub fn default_roles(self) -> BandRoles {
        match self {
            Sensor::Landsat5 | Sensor::Landsat7 => BandRoles::new("B2", "B3", "B4"),
            Sensor::Landsat8 | Sensor::Landsat9 => BandRoles::new("B3", "B4", "B5"),
        }
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sensor {
    type Err = String;

    /// Accepts model names (`Landsat-8`, `landsat8`) and product prefixes (`LC08`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();

        Sensor::ALL
            .into_iter()
            .find(|sensor| {
                normalized == sensor.prefix()
                    || normalized == sensor.name().replace('-', "").to_ascii_uppercase()
            })
            .ok_or_else(|| format!("Unknown sensor: {}. Use Landsat-5, -7, -8 or -9.", s))
    }
}

impl TryFrom<String> for Sensor {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Sensor> for String {
    fn from(s: Sensor) -> Self {
        s.name().to_string()
    }
}

/// Band identifier as it appears in file names, normalized to `B<TOKEN>`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct BandId(String);

impl BandId {
    /// Create a band id; accepts `"B4"`, `"b4"` or a bare token such as `"4"`
    pub fn new(id: &str) -> Self {
        let upper = id.trim().to_uppercase();
        if upper.starts_with('B') {
            BandId(upper)
        } else {
            BandId(format!("B{}", upper))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BandId {
    fn from(s: String) -> Self {
        BandId::new(&s)
    }
}

impl From<BandId> for String {
    fn from(b: BandId) -> Self {
        b.0
    }
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Semantic role of a band in the index computations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandRole {
    Green,
    Red,
    Nir,
}

impl fmt::Display for BandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandRole::Green => write!(f, "green"),
            BandRole::Red => write!(f, "red"),
            BandRole::Nir => write!(f, "NIR"),
        }
    }
}

/// Green/red/NIR band ids for one sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRoles {
    pub green: BandId,
    pub red: BandId,
    pub nir: BandId,
}

impl BandRoles {
    pub fn new(green: &str, red: &str, nir: &str) -> Self {
        Self {
            green: BandId::new(green),
            red: BandId::new(red),
            nir: BandId::new(nir),
        }
    }

    pub fn get(&self, role: BandRole) -> &BandId {
        match role {
            BandRole::Green => &self.green,
            BandRole::Red => &self.red,
            BandRole::Nir => &self.nir,
        }
    }

    /// Roles in read order: green first, since it carries the nodata sentinel
    pub fn iter(&self) -> impl Iterator<Item = (BandRole, &BandId)> {
        [BandRole::Green, BandRole::Red, BandRole::Nir]
            .into_iter()
            .map(move |role| (role, self.get(role)))
    }
}

/// A sensor with no entry in the band role table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no band roles defined for {0}")]
pub struct UnsupportedSensor(pub Sensor);

/// Sensor → band role lookup.
///
/// The default table covers every [`Sensor`]; a configuration file may
/// replace it to re-map bands or withdraw a sensor from processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandRoleTable {
    entries: BTreeMap<Sensor, BandRoles>,
}

impl BandRoleTable {
    /// A table with no sensors
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, sensor: Sensor, roles: BandRoles) -> Self {
        self.entries.insert(sensor, roles);
        self
    }

    pub fn resolve(&self, sensor: Sensor) -> Result<&BandRoles, UnsupportedSensor> {
        self.entries.get(&sensor).ok_or(UnsupportedSensor(sensor))
    }

    pub fn sensors(&self) -> impl Iterator<Item = Sensor> + '_ {
        self.entries.keys().copied()
    }
}

impl Default for BandRoleTable {
    fn default() -> Self {
        Sensor::ALL
            .into_iter()
            .fold(Self::empty(), |table, s| table.with(s, s.default_roles()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layouts() {
        let table = BandRoleTable::default();

        for sensor in [Sensor::Landsat5, Sensor::Landsat7] {
            let roles = table.resolve(sensor).unwrap();
            assert_eq!(roles.green.as_str(), "B2");
            assert_eq!(roles.red.as_str(), "B3");
            assert_eq!(roles.nir.as_str(), "B4");
        }
        for sensor in [Sensor::Landsat8, Sensor::Landsat9] {
            let roles = table.resolve(sensor).unwrap();
            assert_eq!(roles.green.as_str(), "B3");
            assert_eq!(roles.red.as_str(), "B4");
            assert_eq!(roles.nir.as_str(), "B5");
        }
    }

    #[test]
    fn test_withdrawn_sensor_is_unsupported() {
        let table = BandRoleTable::empty().with(Sensor::Landsat8, Sensor::Landsat8.default_roles());
        assert_eq!(
            table.resolve(Sensor::Landsat5),
            Err(UnsupportedSensor(Sensor::Landsat5))
        );
        assert!(table.resolve(Sensor::Landsat8).is_ok());
    }

    #[test]
    fn test_prefix_lookup() {
        assert_eq!(Sensor::from_file_prefix("LT05_L2SP_x"), Some(Sensor::Landsat5));
        assert_eq!(Sensor::from_file_prefix("LE07_L2SP_x"), Some(Sensor::Landsat7));
        assert_eq!(Sensor::from_file_prefix("LC08_L2SP_x"), Some(Sensor::Landsat8));
        assert_eq!(Sensor::from_file_prefix("LC09_L2SP_x"), Some(Sensor::Landsat9));
        assert_eq!(Sensor::from_file_prefix("S2A_MSIL2A_x"), None);
        assert_eq!(Sensor::from_file_prefix("lc08_l2sp_x"), None);
    }

    #[test]
    fn test_sensor_from_str() {
        assert_eq!("Landsat-8".parse::<Sensor>(), Ok(Sensor::Landsat8));
        assert_eq!("landsat7".parse::<Sensor>(), Ok(Sensor::Landsat7));
        assert_eq!("LT05".parse::<Sensor>(), Ok(Sensor::Landsat5));
        assert!("Sentinel-2".parse::<Sensor>().is_err());
    }

    #[test]
    fn test_band_id_normalization() {
        assert_eq!(BandId::new("b4").as_str(), "B4");
        assert_eq!(BandId::new("5").as_str(), "B5");
        assert_eq!(BandId::new("B10"), BandId::new("b10"));
    }

    #[test]
    fn test_table_from_toml() {
        let text = r#"
            [Landsat-8]
            green = "b3"
            red = "B4"
            nir = "B5"
        "#;
        let table: BandRoleTable = toml::from_str(text).unwrap();
        assert_eq!(table.sensors().collect::<Vec<_>>(), vec![Sensor::Landsat8]);
        assert_eq!(table.resolve(Sensor::Landsat8).unwrap().green.as_str(), "B3");
    }
}
