//! Batched transfer of buffered rewards into the ledger
//!
//! Collisions only touch the reward buffer. On a fixed cadence the whole
//! buffer is drained in one step and the sum credited to the economy, so a
//! reward is consumed by exactly one flush.

use super::economy::Economy;
use super::resolver::RewardBuffer;
use super::rewards::from_units;
use crate::consts::RECONCILE_INTERVAL_MS;

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciler {
    interval_ms: f64,
    elapsed_ms: f64,
    /// Lifetime total credited, in fixed-point units
    credited_units: u64,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(RECONCILE_INTERVAL_MS)
    }
}

impl Reconciler {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(1.0),
            elapsed_ms: 0.0,
            credited_units: 0,
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn credited(&self) -> f64 {
        from_units(self.credited_units)
    }

    /// Advance the cadence; flushes once if the interval has elapsed
    ///
    /// Returns the amount credited when a flush happened.
    pub fn tick(
        &mut self,
        dt_ms: f64,
        buffer: &mut RewardBuffer,
        economy: &mut Economy,
    ) -> Option<f64> {
        self.elapsed_ms += dt_ms;
        if self.elapsed_ms < self.interval_ms {
            return None;
        }
        // Several missed intervals collapse into one flush
        self.elapsed_ms %= self.interval_ms;
        Some(self.flush(buffer, economy))
    }

    /// Drain the buffer into the ledger now
    pub fn flush(&mut self, buffer: &mut RewardBuffer, economy: &mut Economy) -> f64 {
        let units = buffer.drain();
        if units == 0 {
            return 0.0;
        }
        let amount = from_units(units);
        economy.credit(amount);
        self.credited_units = self.credited_units.saturating_add(units);
        log::debug!("Reconciled {} (balance {})", amount, economy.currency());
        amount
    }

    /// Throw away unflushed rewards from a board being torn down
    pub fn discard(&mut self, buffer: &mut RewardBuffer) -> f64 {
        self.elapsed_ms = 0.0;
        let lost = from_units(buffer.drain());
        if lost > 0.0 {
            log::warn!("Discarded {} of unflushed reward on board teardown", lost);
        }
        lost
    }
}
