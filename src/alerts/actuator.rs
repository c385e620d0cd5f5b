use std::time::Duration;

use anyhow::Result;
use log::{debug, info};

/// Light + buzzer pair driven when an alert is raised.
pub trait AlertActuator {
    fn set_indicator(&mut self, on: bool) -> Result<()>;

    /// Tone intensity as a PWM duty in `0..=1023`; `0` silences the buzzer.
    fn set_tone(&mut self, duty: u16) -> Result<()>;

    /// Force both outputs off.
    fn silence(&mut self) -> Result<()> {
        self.set_tone(0)?;
        self.set_indicator(false)
    }
}

/// Fixed-duration light and tone pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPulse {
    pub duty: u16,
    pub hold: Duration,
}

impl AlertPulse {
    pub fn new(duty: u16, hold: Duration) -> Self {
        Self { duty, hold }
    }

    pub async fn fire<A: AlertActuator>(&self, actuator: &mut A) -> Result<()> {
        actuator.set_indicator(true)?;
        actuator.set_tone(self.duty)?;
        tokio::time::sleep(self.hold).await;
        actuator.silence()
    }
}

/// Host stand-in for the LED and PWM buzzer: logs every change of output.
#[derive(Debug)]
pub struct LogActuator {
    tone_hz: u32,
    indicator: bool,
    duty: u16,
}

impl LogActuator {
    pub fn new(tone_hz: u32) -> Self {
        info!("Alert buzzer configured at {tone_hz} Hz");
        Self {
            tone_hz,
            indicator: false,
            duty: 0,
        }
    }

    pub fn indicator(&self) -> bool {
        self.indicator
    }

    pub fn duty(&self) -> u16 {
        self.duty
    }
}

impl AlertActuator for LogActuator {
    fn set_indicator(&mut self, on: bool) -> Result<()> {
        if self.indicator != on {
            debug!("indicator {}", if on { "on" } else { "off" });
        }
        self.indicator = on;
        Ok(())
    }

    fn set_tone(&mut self, duty: u16) -> Result<()> {
        if self.duty != duty {
            debug!("buzzer {} Hz duty {duty}", self.tone_hz);
        }
        self.duty = duty;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl AlertActuator for Trace {
        fn set_indicator(&mut self, on: bool) -> Result<()> {
            self.0.push(format!("led:{on}"));
            Ok(())
        }

        fn set_tone(&mut self, duty: u16) -> Result<()> {
            self.0.push(format!("tone:{duty}"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn pulse_turns_everything_on_then_off() {
        let mut trace = Trace::default();
        AlertPulse::new(512, Duration::ZERO)
            .fire(&mut trace)
            .await
            .unwrap();

        assert_eq!(trace.0, vec!["led:true", "tone:512", "tone:0", "led:false"]);
    }

    #[tokio::test]
    async fn log_actuator_ends_silent() {
        let mut actuator = LogActuator::new(1000);
        AlertPulse::new(512, Duration::from_millis(1))
            .fire(&mut actuator)
            .await
            .unwrap();

        assert!(!actuator.indicator());
        assert_eq!(actuator.duty(), 0);
    }
}
