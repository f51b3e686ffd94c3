use rand::Rng;

use byblia_types::models::config::SessionConfig;

/// Closed interval the per-request temperature is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureRange {
    min: f64,
    max: f64,
}

impl TemperatureRange {
    /// Bounds are reordered if given backwards.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.min_temperature, config.max_temperature)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn sample(&self) -> f64 {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    pub fn clamp(&self, temperature: f64) -> f64 {
        if temperature.is_nan() {
            return self.min;
        }
        temperature.clamp(self.min, self.max)
    }
}

impl Default for TemperatureRange {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}
