//! Programmable countdown divider, the clock-division primitive shared by
//! the timers, the envelope and the sweep unit

use serde::{Deserialize, Serialize};

/// Countdown divider
///
/// Outputs one clock for every `period + 1` input clocks. Changing the period
/// does not touch the current count; the new value is picked up on the next
/// reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divider {
    /// Reload value
    period: u16,
    /// Current count (0..=period)
    counter: u16,
}

impl Divider {
    pub fn new() -> Self {
        Self {
            period: 0,
            counter: 0,
        }
    }

    /// Set the reload value without touching the counter
    pub fn set_period(&mut self, period: u16) {
        self.period = period;
    }

    /// Get the reload value
    pub fn period(&self) -> u16 {
        self.period
    }

    /// Get the current count
    pub fn counter(&self) -> u16 {
        self.counter
    }

    /// Reload the counter from the period (phase restart)
    pub fn reset_counter(&mut self) {
        self.counter = self.period;
    }

    /// Clock the divider
    /// Returns true when the divider fires (counter was 0 and has been reloaded)
    pub fn clock(&mut self) -> bool {
        if self.counter == 0 {
            self.counter = self.period;
            true
        } else {
            self.counter -= 1;
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider_new() {
        let divider = Divider::new();
        assert_eq!(divider.period(), 0);
        assert_eq!(divider.counter(), 0);
    }

    #[test]
    fn test_divider_period_zero_fires_every_clock() {
        let mut divider = Divider::new();
        for _ in 0..10 {
            assert!(divider.clock());
        }
    }

    #[test]
    fn test_divider_fires_once_per_period_plus_one() {
        for period in [1u16, 2, 5, 17] {
            let mut divider = Divider::new();
            divider.set_period(period);
            divider.reset_counter();

            let mut fired_at = Vec::new();
            for call in 1..=(period as usize + 1) * 4 {
                if divider.clock() {
                    fired_at.push(call);
                }
            }

            // First firing on the (P+1)-th call, then every P+1 calls
            let step = period as usize + 1;
            let expected: Vec<usize> = (1..=4).map(|n| n * step).collect();
            assert_eq!(fired_at, expected, "period {}", period);
        }
    }

    #[test]
    fn test_divider_set_period_keeps_counter() {
        let mut divider = Divider::new();
        divider.set_period(10);
        divider.reset_counter();
        divider.clock();
        assert_eq!(divider.counter(), 9);

        divider.set_period(3);
        assert_eq!(divider.counter(), 9);
        assert_eq!(divider.period(), 3);
    }

    #[test]
    fn test_divider_reload_uses_new_period() {
        let mut divider = Divider::new();
        divider.set_period(2);
        divider.reset_counter();

        divider.clock(); // 2 -> 1
        divider.set_period(5);
        divider.clock(); // 1 -> 0
        assert!(divider.clock()); // fires and reloads from the new period
        assert_eq!(divider.counter(), 5);
    }
}
