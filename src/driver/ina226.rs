//! INA226 current/voltage monitor driver
//!
//! Minimal blocking driver for the TI INA226, one per port, all sharing the
//! sensor I2C bus. The engine is synchronous, so the driver uses the blocking
//! `embedded-hal` I2C trait.
//!
//! # Configuration
//! - Averaging: 16 samples
//! - Bus and shunt conversion time: 1.1 ms each
//! - Mode: shunt and bus, continuous
//!
//! # Calibration
//! ```text
//! Current_LSB = MAX_EXPECTED_CURRENT / 2^15
//! CAL         = 0.00512 / (Current_LSB * R_shunt)
//! ```
//! With 3.2 A and 0.1 Ω this gives a 97.7 µA current LSB and CAL = 524.
//!
//! # Failure Handling
//! A failed read returns NaN for both quantities. The engine rejects
//! non-finite readings, so a flaky bus shows up as consecutive sensor faults
//! rather than as bogus measurements.

use defmt::{debug, error, info};
use embedded_hal::i2c::I2c;
use port_engine::{Measurement, PortSensor, RawReading, SensorError};

use crate::system::config::{MAX_EXPECTED_CURRENT, SHUNT_RESISTANCE_OHMS};

/// INA226 Register addresses
const REG_CONFIG: u8 = 0x00;
const REG_BUS_VOLTAGE: u8 = 0x02;
const REG_CURRENT: u8 = 0x04;
const REG_CALIBRATION: u8 = 0x05;
const REG_MANUFACTURER_ID: u8 = 0xFE;

/// "TI" in ASCII
const MANUFACTURER_ID: u16 = 0x5449;

/// AVG=16, VBUSCT=1.1ms, VSHCT=1.1ms, MODE=shunt and bus continuous
const CONFIG_VALUE: u16 = 0x4000 | (0b010 << 9) | (0b100 << 6) | (0b100 << 3) | 0b111;

/// Bus voltage register LSB (V)
const BUS_VOLTAGE_LSB: f32 = 0.001_25;

/// Fixed scaling constant of the calibration equation
const CALIBRATION_SCALE: f32 = 0.005_12;

/// Current register LSB for the configured full scale (A)
const CURRENT_LSB: f32 = MAX_EXPECTED_CURRENT / 32_768.0;

pub struct Ina226<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Ina226<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Calibration register value for the board's shunt
    fn calibration() -> u16 {
        libm::floorf(CALIBRATION_SCALE / (CURRENT_LSB * SHUNT_RESISTANCE_OHMS)) as u16
    }

    /// Write to a register
    fn write_register(&mut self, register: u8, value: u16) -> Result<(), SensorError> {
        let address = self.address;
        let [high, low] = value.to_be_bytes();
        self.i2c.write(address, &[register, high, low]).map_err(|_| {
            error!("INA226 {=u8:#x} write error", address);
            SensorError::Bus
        })
    }

    /// Read from a register
    fn read_register(&mut self, register: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|_| SensorError::Bus)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Bus voltage (V)
    pub fn bus_voltage(&mut self) -> Result<f32, SensorError> {
        Ok(self.read_register(REG_BUS_VOLTAGE)? as f32 * BUS_VOLTAGE_LSB)
    }

    /// Current through the shunt (A), positive while the cell discharges
    pub fn current(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_register(REG_CURRENT)? as i16;
        Ok(raw as f32 * CURRENT_LSB)
    }
}

impl<I2C: I2c> PortSensor for Ina226<I2C> {
    fn initialize(&mut self) -> Result<(), SensorError> {
        let id = self.read_register(REG_MANUFACTURER_ID).map_err(|_| SensorError::NotFound)?;
        if id != MANUFACTURER_ID {
            error!("INA226 {=u8:#x}: unexpected manufacturer id {=u16:#x}", self.address, id);
            return Err(SensorError::UnexpectedDevice);
        }

        self.write_register(REG_CONFIG, CONFIG_VALUE)?;
        self.write_register(REG_CALIBRATION, Self::calibration())?;

        info!("INA226 {=u8:#x} configured, cal {}", self.address, Self::calibration());
        Ok(())
    }

    fn read_raw(&mut self) -> RawReading {
        match (self.bus_voltage(), self.current()) {
            (Ok(voltage), Ok(current)) => Measurement::new(voltage, current),
            _ => {
                debug!("INA226 {=u8:#x} read failed", self.address);
                Measurement::new(f32::NAN, f32::NAN)
            }
        }
    }
}
