//! Battery chemistry, operation mode and port status tables
//!
//! Every human-readable name and every per-chemistry constant is looked up
//! from a static table indexed by the enum discriminant.

use crate::error::ConfigError;

/// Per-chemistry voltage limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryProfile {
    /// Default discharge cutoff (V)
    pub cutoff_voltage: f32,
    /// Fully charged cell voltage (V)
    pub max_voltage: f32,
    /// Nominal cell voltage (V)
    pub nominal_voltage: f32,
    /// Display name
    pub name: &'static str,
}

/// Chemistry table, indexed by [`BatteryKind`]
pub static BATTERY_PROFILES: [BatteryProfile; 3] = [
    BatteryProfile {
        cutoff_voltage: 3.0,
        max_voltage: 4.2,
        nominal_voltage: 3.7,
        name: "Li-ion",
    },
    BatteryProfile {
        cutoff_voltage: 2.5,
        max_voltage: 3.65,
        nominal_voltage: 3.2,
        name: "LiFePO4",
    },
    BatteryProfile {
        cutoff_voltage: 3.0,
        max_voltage: 4.2,
        nominal_voltage: 3.7,
        name: "LiPo",
    },
];

/// Cell chemistry of the battery inserted in a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BatteryKind {
    #[default]
    LiIon = 0,
    LiFePo4 = 1,
    LiPo = 2,
}

impl BatteryKind {
    /// Voltage limits for this chemistry
    pub fn profile(self) -> &'static BatteryProfile {
        &BATTERY_PROFILES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }
}

impl TryFrom<u8> for BatteryKind {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::LiIon),
            1 => Ok(Self::LiFePo4),
            2 => Ok(Self::LiPo),
            other => Err(ConfigError::UnknownBatteryKind(other)),
        }
    }
}

const MODE_NAMES: [&str; 3] = ["Safety", "Charging", "Discharging"];

/// Operator intent for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// Switch held off, port idle
    #[default]
    Safety = 0,
    /// External charger connected; switch held off, completion detected
    Charging = 1,
    /// Switch connects the load until the cutoff voltage is reached
    Discharging = 2,
}

impl Mode {
    pub const fn name(self) -> &'static str {
        MODE_NAMES[self as usize]
    }

    /// Next mode in the selection cycle (Safety → Charging → Discharging → Safety)
    pub const fn next(self) -> Self {
        match self {
            Self::Safety => Self::Charging,
            Self::Charging => Self::Discharging,
            Self::Discharging => Self::Safety,
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = ConfigError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Safety),
            1 => Ok(Self::Charging),
            2 => Ok(Self::Discharging),
            other => Err(ConfigError::UnknownMode(other)),
        }
    }
}

const STATUS_NAMES: [&str; 4] = ["Idle", "Active", "Complete", "Error"];

/// Operational state of a port, derived by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PortStatus {
    #[default]
    Idle = 0,
    Active = 1,
    Complete = 2,
    /// Terminal until the operator changes the mode or resets the port
    Error = 3,
}

impl PortStatus {
    pub const fn name(self) -> &'static str {
        STATUS_NAMES[self as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_chemistry() {
        assert_eq!(BatteryKind::LiIon.profile().cutoff_voltage, 3.0);
        assert_eq!(BatteryKind::LiFePo4.profile().cutoff_voltage, 2.5);
        assert_eq!(BatteryKind::LiFePo4.profile().max_voltage, 3.65);
        assert_eq!(BatteryKind::LiPo.profile().max_voltage, 4.2);
        assert_eq!(BatteryKind::LiFePo4.name(), "LiFePO4");
    }

    #[test]
    fn test_names_from_tables() {
        assert_eq!(Mode::Discharging.name(), "Discharging");
        assert_eq!(PortStatus::Complete.name(), "Complete");
        assert_eq!(PortStatus::Error.name(), "Error");
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(Mode::try_from(1), Ok(Mode::Charging));
        assert_eq!(BatteryKind::try_from(2), Ok(BatteryKind::LiPo));
        assert_eq!(Mode::try_from(3), Err(ConfigError::UnknownMode(3)));
        assert_eq!(
            BatteryKind::try_from(9),
            Err(ConfigError::UnknownBatteryKind(9))
        );
    }

    #[test]
    fn test_mode_cycle_wraps() {
        assert_eq!(Mode::Safety.next(), Mode::Charging);
        assert_eq!(Mode::Charging.next(), Mode::Discharging);
        assert_eq!(Mode::Discharging.next(), Mode::Safety);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Mode::default(), Mode::Safety);
        assert_eq!(BatteryKind::default(), BatteryKind::LiIon);
        assert_eq!(PortStatus::default(), PortStatus::Idle);
    }
}
