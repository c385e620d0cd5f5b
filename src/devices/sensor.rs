use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::ClimateSample;
use crate::settings::SensorSettings;

/// Print-head temperature/humidity probe.
pub trait ClimateSensor {
    fn measure(&mut self) -> Result<ClimateSample>;
}

/// Random-walk probe used when no hardware is attached.
pub struct SimulatedSensor {
    rng: StdRng,
    temperature: f64,
    humidity: f64,
    max_step: f64,
}

impl SimulatedSensor {
    pub fn new(settings: &SensorSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    pub fn seeded(settings: &SensorSettings, seed: u64) -> Self {
        Self::with_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn with_rng(settings: &SensorSettings, rng: StdRng) -> Self {
        Self {
            rng,
            temperature: settings.start_temperature,
            humidity: settings.start_humidity,
            max_step: settings.max_step.abs(),
        }
    }

    fn step(&mut self) -> f64 {
        if self.max_step == 0.0 {
            return 0.0;
        }
        self.rng.gen_range(-self.max_step..=self.max_step)
    }
}

impl ClimateSensor for SimulatedSensor {
    fn measure(&mut self) -> Result<ClimateSample> {
        if !self.temperature.is_finite() || !self.humidity.is_finite() {
            bail!("simulated sensor drifted to a non-finite value");
        }

        let dt = self.step();
        let dh = self.step();
        self.temperature = (self.temperature + dt).clamp(-40.0, 80.0);
        self.humidity = (self.humidity + dh).clamp(0.0, 100.0);

        // The DHT22 reports one decimal.
        Ok(ClimateSample::new(
            (self.temperature * 10.0).round() / 10.0,
            (self.humidity * 10.0).round() / 10.0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_stay_within_step_and_range() {
        let settings = SensorSettings {
            start_temperature: 22.0,
            start_humidity: 99.8,
            max_step: 0.5,
        };
        let mut sensor = SimulatedSensor::seeded(&settings, 7);
        let mut previous = ClimateSample::new(22.0, 99.8);

        for _ in 0..100 {
            let sample = sensor.measure().unwrap();
            assert!((sample.temperature - previous.temperature).abs() <= 0.61);
            assert!((0.0..=100.0).contains(&sample.humidity));
            previous = sample;
        }
    }

    #[test]
    fn zero_step_is_constant() {
        let settings = SensorSettings {
            start_temperature: 18.0,
            start_humidity: 55.0,
            max_step: 0.0,
        };
        let mut sensor = SimulatedSensor::seeded(&settings, 1);

        assert_eq!(sensor.measure().unwrap(), ClimateSample::new(18.0, 55.0));
        assert_eq!(sensor.measure().unwrap(), ClimateSample::new(18.0, 55.0));
    }
}
