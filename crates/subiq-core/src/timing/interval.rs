//! Pulse interval types and sequence statistics.

use serde::Serialize;

/// Carrier state during an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Carrier present.
    On,
    /// Carrier suppressed.
    Off,
}

/// One on/off interval of a pulse train.
///
/// The duration is always non-zero; the parser rejects zero-length intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PulseInterval {
    /// Duration in microseconds.
    pub duration_us: u32,
    /// Carrier state.
    pub polarity: Polarity,
}

impl PulseInterval {
    /// Creates a carrier-on interval.
    pub fn on(duration_us: u32) -> Self {
        Self {
            duration_us,
            polarity: Polarity::On,
        }
    }

    /// Creates a carrier-off interval.
    pub fn off(duration_us: u32) -> Self {
        Self {
            duration_us,
            polarity: Polarity::Off,
        }
    }

    /// Builds an interval from the signed microsecond form (sign = polarity).
    ///
    /// Returns `None` for zero or for magnitudes that do not fit in `u32`.
    pub fn from_signed(value: i64) -> Option<Self> {
        let duration_us = u32::try_from(value.unsigned_abs()).ok()?;
        if duration_us == 0 {
            return None;
        }
        let polarity = if value > 0 {
            Polarity::On
        } else {
            Polarity::Off
        };
        Some(Self {
            duration_us,
            polarity,
        })
    }

    /// Returns the signed microsecond form (positive = on, negative = off).
    pub fn signed_us(&self) -> i64 {
        match self.polarity {
            Polarity::On => self.duration_us as i64,
            Polarity::Off => -(self.duration_us as i64),
        }
    }

    /// Returns true if the carrier is present during this interval.
    pub fn is_on(&self) -> bool {
        self.polarity == Polarity::On
    }
}

/// Summary statistics over an interval sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntervalStats {
    /// Number of intervals.
    pub count: usize,
    /// Number of carrier-on intervals.
    pub on_count: usize,
    /// Number of carrier-off intervals.
    pub off_count: usize,
    /// Shortest interval in microseconds (0 for an empty sequence).
    pub shortest_us: u32,
    /// Longest interval in microseconds (0 for an empty sequence).
    pub longest_us: u32,
    /// Total carrier-on time in microseconds.
    pub total_on_us: u64,
    /// Total carrier-off time in microseconds.
    pub total_off_us: u64,
}

impl IntervalStats {
    /// Computes statistics for a sequence.
    pub fn from_intervals(intervals: &[PulseInterval]) -> Self {
        let mut stats = Self::default();
        let mut shortest = u32::MAX;

        for interval in intervals {
            stats.count += 1;
            shortest = shortest.min(interval.duration_us);
            stats.longest_us = stats.longest_us.max(interval.duration_us);
            match interval.polarity {
                Polarity::On => {
                    stats.on_count += 1;
                    stats.total_on_us += interval.duration_us as u64;
                }
                Polarity::Off => {
                    stats.off_count += 1;
                    stats.total_off_us += interval.duration_us as u64;
                }
            }
        }

        if stats.count > 0 {
            stats.shortest_us = shortest;
        }
        stats
    }

    /// Total duration of the sequence in microseconds.
    pub fn total_us(&self) -> u64 {
        self.total_on_us + self.total_off_us
    }

    /// Returns true if the sequence had no intervals.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
