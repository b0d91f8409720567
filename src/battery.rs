//! Battery Reader
//!
//! Reads raw battery attributes from the kernel's power-supply interface
//! and normalizes them into a [`Sample`]. Each attribute lives in its own
//! file under `/sys/class/power_supply/<battery>/`, one value per line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Default battery directory on Linux hosts.
pub const DEFAULT_BATTERY_PATH: &str = "/sys/class/power_supply/BAT0";

/// Charging status as reported by the kernel.
///
/// The wire and storage representation matches the kernel strings exactly,
/// including the space in "Not charging".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Charging,
    Discharging,
    #[serde(rename = "Not charging")]
    NotCharging,
}

impl Status {
    /// The kernel/storage string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Charging => "Charging",
            Status::Discharging => "Discharging",
            Status::NotCharging => "Not charging",
        }
    }
}

impl FromStr for Status {
    type Err = ReadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Charging" => Ok(Status::Charging),
            "Discharging" => Ok(Status::Discharging),
            "Not charging" => Ok(Status::NotCharging),
            other => Err(ReadError::InvalidStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One battery observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Capture time (stamped when the reader is called).
    pub timestamp: DateTime<Utc>,
    /// Charge percentage in [0, 100], `energy_now / energy_full * 100`.
    pub percent: f32,
    /// Charging status at capture time.
    pub status: Status,
}

/// Errors surfaced while reading battery attributes.
#[derive(Error, Debug)]
pub enum ReadError {
    /// Attribute file missing or unreadable
    #[error("cannot read battery attribute {field:?}: {source}")]
    Attribute {
        field: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Attribute contained something other than an integer
    #[error("invalid integer {value:?} in battery attribute {field:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// Status string outside the known set
    #[error("invalid battery status: {0:?}")]
    InvalidStatus(String),

    /// Energy readings that make the percentage undefined
    #[error("invalid energy readings: energy_now={energy_now}, energy_full={energy_full}")]
    InvalidEnergy { energy_now: i32, energy_full: i32 },
}

/// Source of battery samples.
///
/// The sampling loop and tests depend on this seam rather than on sysfs
/// directly.
pub trait PowerSource: Send + Sync {
    /// Take one observation of the battery's current state.
    fn read(&self) -> Result<Sample, ReadError>;
}

/// Production [`PowerSource`] backed by the sysfs power-supply directory.
pub struct SysfsBattery {
    base: PathBuf,
}

impl SysfsBattery {
    /// Create a reader over the default battery directory.
    pub fn new() -> Self {
        Self::at(DEFAULT_BATTERY_PATH)
    }

    /// Create a reader over a specific battery directory.
    pub fn at(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    fn read_field(&self, field: &'static str) -> Result<String, ReadError> {
        let raw = std::fs::read_to_string(self.base.join(field))
            .map_err(|source| ReadError::Attribute { field, source })?;
        Ok(raw.trim().to_string())
    }

    fn read_energy(&self, field: &'static str) -> Result<i32, ReadError> {
        let value = self.read_field(field)?;
        value
            .parse::<i32>()
            .map_err(|_| ReadError::InvalidNumber { field, value })
    }
}

impl Default for SysfsBattery {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerSource for SysfsBattery {
    fn read(&self) -> Result<Sample, ReadError> {
        let energy_now = self.read_energy("energy_now")?;
        let energy_full = self.read_energy("energy_full")?;
        let status = Status::from_str(&self.read_field("status")?)?;

        Ok(Sample {
            timestamp: Utc::now(),
            percent: charge_percent(energy_now, energy_full)?,
            status,
        })
    }
}

/// Compute the charge percentage from raw energy readings.
///
/// `energy_full == 0` would make the ratio undefined, and negative readings
/// indicate a broken attribute; both are rejected rather than producing
/// NaN/Inf.
pub fn charge_percent(energy_now: i32, energy_full: i32) -> Result<f32, ReadError> {
    if energy_full <= 0 || energy_now < 0 {
        return Err(ReadError::InvalidEnergy {
            energy_now,
            energy_full,
        });
    }
    Ok(energy_now as f32 / energy_full as f32 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_battery_dir(dir: &Path, energy_now: &str, energy_full: &str, status: &str) {
        std::fs::write(dir.join("energy_now"), format!("{}\n", energy_now)).unwrap();
        std::fs::write(dir.join("energy_full"), format!("{}\n", energy_full)).unwrap();
        std::fs::write(dir.join("status"), format!("{}\n", status)).unwrap();
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(Status::from_str("Charging").unwrap(), Status::Charging);
        assert_eq!(
            Status::from_str("Discharging").unwrap(),
            Status::Discharging
        );
        assert_eq!(
            Status::from_str("Not charging").unwrap(),
            Status::NotCharging
        );
        assert!(matches!(
            Status::from_str("Full"),
            Err(ReadError::InvalidStatus(_))
        ));
    }

    #[test]
    fn test_status_round_trip() {
        for status in [Status::Charging, Status::Discharging, Status::NotCharging] {
            assert_eq!(Status::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_charge_percent() {
        assert_eq!(charge_percent(50, 100).unwrap(), 50.0);
        assert_eq!(charge_percent(0, 100).unwrap(), 0.0);
        assert_eq!(charge_percent(100, 100).unwrap(), 100.0);

        let percent = charge_percent(43_210_000, 57_340_000).unwrap();
        assert!(percent > 0.0 && percent <= 100.0);
    }

    #[test]
    fn test_charge_percent_zero_full_is_error() {
        assert!(matches!(
            charge_percent(100, 0),
            Err(ReadError::InvalidEnergy { .. })
        ));
    }

    #[test]
    fn test_charge_percent_negative_is_error() {
        assert!(charge_percent(-1, 100).is_err());
        assert!(charge_percent(50, -100).is_err());
    }

    #[test]
    fn test_sysfs_read() {
        let dir = tempdir().unwrap();
        write_battery_dir(dir.path(), "50000000", "100000000", "Discharging");

        let sample = SysfsBattery::at(dir.path()).read().unwrap();
        assert_eq!(sample.percent, 50.0);
        assert_eq!(sample.status, Status::Discharging);
    }

    #[test]
    fn test_sysfs_missing_attribute() {
        let dir = tempdir().unwrap();
        // No files at all
        let err = SysfsBattery::at(dir.path()).read().unwrap_err();
        assert!(matches!(err, ReadError::Attribute { .. }));
    }

    #[test]
    fn test_sysfs_bad_number() {
        let dir = tempdir().unwrap();
        write_battery_dir(dir.path(), "not-a-number", "100000000", "Charging");

        let err = SysfsBattery::at(dir.path()).read().unwrap_err();
        assert!(matches!(
            err,
            ReadError::InvalidNumber {
                field: "energy_now",
                ..
            }
        ));
    }

    #[test]
    fn test_sysfs_bad_status() {
        let dir = tempdir().unwrap();
        write_battery_dir(dir.path(), "50000000", "100000000", "Unknown");

        let err = SysfsBattery::at(dir.path()).read().unwrap_err();
        assert!(matches!(err, ReadError::InvalidStatus(_)));
    }

    #[test]
    fn test_sample_json_shape() {
        let sample = Sample {
            timestamp: Utc::now(),
            percent: 87.5,
            status: Status::NotCharging,
        };

        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["percent"], 87.5);
        assert_eq!(json["status"], "Not charging");
        assert!(json["timestamp"].is_string());
    }
}
