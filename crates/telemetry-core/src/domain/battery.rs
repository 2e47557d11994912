//! Battery voltage to charge-percentage mapping.
//!
//! Producers report the raw pack voltage.  Dashboards show a percentage,
//! computed by linear interpolation between a configured "empty" and "full"
//! voltage and clamped to `0..=100`.
//!
//! ```text
//!   empty_volts            full_volts
//!       │────────────────────────│
//!      0 %                     100 %
//! ```
//!
//! The defaults (5.0 V empty, 6.6 V full) match a 2S LiPo pack under load.

use thiserror::Error;

/// Charge percentage at or below which a pack is reported as critical.
pub const CRITICAL_PERCENT: f32 = 20.0;

/// Rejected `empty`/`full` voltage pair.
#[derive(Debug, Clone, Copy, Error, PartialEq)]
#[error("invalid battery range: full ({full_volts} V) must be finite and above empty ({empty_volts} V)")]
pub struct InvalidBatteryRange {
    pub empty_volts: f32,
    pub full_volts: f32,
}

/// Linear voltage range used to derive a charge percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryRange {
    /// Voltage that maps to 0 %.
    pub empty_volts: f32,
    /// Voltage that maps to 100 %.
    pub full_volts: f32,
}

impl Default for BatteryRange {
    fn default() -> Self {
        Self {
            empty_volts: 5.0,
            full_volts: 6.6,
        }
    }
}

/// Coarse charge band, used for colour coding in dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryLevel {
    /// Above 60 %.
    High,
    /// Above 30 %, up to 60 %.
    Medium,
    /// 30 % or less.
    Low,
}

impl BatteryRange {
    /// Builds a range for a specific pack.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBatteryRange`] unless both voltages are finite and
    /// `full_volts > empty_volts`.
    pub fn new(empty_volts: f32, full_volts: f32) -> Result<Self, InvalidBatteryRange> {
        if !empty_volts.is_finite() || !full_volts.is_finite() || full_volts <= empty_volts {
            return Err(InvalidBatteryRange {
                empty_volts,
                full_volts,
            });
        }
        Ok(Self {
            empty_volts,
            full_volts,
        })
    }

    /// Converts a voltage to a percentage in `0.0..=100.0`.
    ///
    /// Non-finite voltages (NaN, ±∞ from a faulty sensor) map to 0 %.
    ///
    /// ```rust
    /// use telemetry_core::BatteryRange;
    ///
    /// let range = BatteryRange::default();
    /// assert_eq!(range.percent(6.6), 100.0);
    /// assert_eq!(range.percent(4.2), 0.0);
    /// ```
    pub fn percent(&self, volts: f32) -> f32 {
        if !volts.is_finite() {
            return 0.0;
        }
        if volts >= self.full_volts {
            return 100.0;
        }
        if volts <= self.empty_volts {
            return 0.0;
        }
        // f64, and multiply before dividing, so band edges land exactly.
        let span = f64::from(self.full_volts) - f64::from(self.empty_volts);
        let pct = (f64::from(volts) - f64::from(self.empty_volts)) * 100.0 / span;
        pct.clamp(0.0, 100.0) as f32
    }

    /// Returns the charge band for `volts`.
    pub fn level(&self, volts: f32) -> BatteryLevel {
        let pct = self.percent(volts);
        if pct > 60.0 {
            BatteryLevel::High
        } else if pct > 30.0 {
            BatteryLevel::Medium
        } else {
            BatteryLevel::Low
        }
    }

    /// True when the charge is at or below [`CRITICAL_PERCENT`].
    pub fn is_critical(&self, volts: f32) -> bool {
        self.percent(volts) <= CRITICAL_PERCENT
    }
}
