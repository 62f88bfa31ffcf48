use serde::{Deserialize, Serialize};

/// The calendar unit of a bar interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// A bar interval = amount x unit (e.g., 15-Minute, 1-Day).
///
/// Validation of allowed combinations is performed by each data provider
/// implementation, according to its own API rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFrame {
    pub amount: u32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub fn new(amount: u32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    /// The one-day timeframe used for calendar-grade bars.
    pub fn daily() -> Self {
        Self::new(1, TimeFrameUnit::Day)
    }
}
