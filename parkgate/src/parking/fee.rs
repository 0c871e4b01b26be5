// parkgate/src/parking/fee.rs

use std::time::Duration;

/// Turns a parking duration into a fee in balance units.
pub trait FeePolicy {
    fn fee(&self, parked: Duration) -> i32;
}

impl<F> FeePolicy for F
where
    F: Fn(Duration) -> i32,
{
    fn fee(&self, parked: Duration) -> i32 {
        self(parked)
    }
}

/// One unit per whole second parked. Handy on a bench where waiting an
/// hour is not an option.
#[derive(Debug, Default, Clone, Copy)]
pub struct ElapsedSeconds;

impl FeePolicy for ElapsedSeconds {
    fn fee(&self, parked: Duration) -> i32 {
        i32::try_from(parked.as_secs()).unwrap_or(i32::MAX)
    }
}

/// `rate` per started hour, counted in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyRate {
    pub rate: i32,
}

impl HourlyRate {
    pub const fn new(rate: i32) -> Self {
        Self { rate }
    }
}

impl Default for HourlyRate {
    fn default() -> Self {
        Self::new(5)
    }
}

impl FeePolicy for HourlyRate {
    fn fee(&self, parked: Duration) -> i32 {
        let minutes = parked.as_secs() / 60;
        let hours = minutes.div_ceil(60);
        i32::try_from(hours)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.rate)
    }
}
