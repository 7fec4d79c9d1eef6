//! Common value types for histoplot

use serde::{Deserialize, Serialize};

/// A value with its one-standard-deviation uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Central value.
    pub value: f64,

    /// Uncertainty (non-negative).
    pub uncertainty: f64,
}

impl Measurement {
    /// Create a new measurement
    pub fn new(value: f64, uncertainty: f64) -> Self {
        Self { value, uncertainty }
    }

    /// Relative uncertainty. Returns `None` for a zero value.
    pub fn relative_uncertainty(&self) -> Option<f64> {
        if self.value == 0.0 {
            return None;
        }
        Some(self.uncertainty / self.value.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_uncertainty() {
        let m = Measurement::new(-20.0, 5.0);
        assert_eq!(m.relative_uncertainty(), Some(0.25));
        assert_eq!(Measurement::new(0.0, 1.0).relative_uncertainty(), None);
    }
}
