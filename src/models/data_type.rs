use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of forecast products the pipeline ingests. Each variant
/// carries its registry key and default ingestion procedure as static
/// data, so an unsupported data type is unrepresentable rather than a
/// runtime lookup miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    WindSpeed,
    WindGust,
    WindDirection,
    IceMass,
    IceThickness,
}

impl DataType {
    pub const ALL: [DataType; 5] = [
        DataType::WindSpeed,
        DataType::WindGust,
        DataType::WindDirection,
        DataType::IceMass,
        DataType::IceThickness,
    ];

    /// Stable identifier used in configuration keys and logs.
    pub fn key(self) -> &'static str {
        match self {
            DataType::WindSpeed => "wind_speed",
            DataType::WindGust => "wind_gust",
            DataType::WindDirection => "wind_direction",
            DataType::IceMass => "ice_mass",
            DataType::IceThickness => "ice_thickness",
        }
    }

    /// Default ingestion stored procedure for this data type.
    pub fn procedure(self) -> &'static str {
        match self {
            DataType::WindSpeed => "process_wind_speed_data",
            DataType::WindGust => "process_wind_gust_data",
            DataType::WindDirection => "process_wind_direction_data",
            DataType::IceMass => "process_ice_mass_data",
            DataType::IceThickness => "process_ice_thickness_data",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
