//! Single-axis PID controller.

use skirmish_core::config::PidConfig;
use skirmish_core::enums::DerivativeMode;
use skirmish_core::error::ConfigError;

/// Closed-loop controller driving a measured value toward a setpoint.
#[derive(Debug, Clone)]
pub struct PidController {
    config: PidConfig,
    last_value: f64,
    last_error: f64,
    integral: f64,
    velocity: f64,
    derivative_initialized: bool,
}

impl PidController {
    pub fn new(config: PidConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            last_value: 0.0,
            last_error: 0.0,
            integral: 0.0,
            velocity: 0.0,
            derivative_initialized: false,
        })
    }

    /// Forget derivative history so the next update produces no D term.
    ///
    /// The integral accumulator and last error are kept.
    pub fn reset(&mut self) {
        self.derivative_initialized = false;
    }

    /// Advance the controller by `dt` seconds and return the clamped output.
    ///
    /// Returns `setpoint` unchanged when disabled or when `dt <= 0`.
    pub fn update(&mut self, dt: f64, measured: f64, setpoint: f64) -> f64 {
        if !self.config.enabled || dt <= 0.0 {
            return setpoint;
        }

        let error = setpoint - measured;

        let p = self.config.proportional_gain * error;

        let saturation = self.config.integral_saturation;
        self.integral = (self.integral + error * dt).clamp(-saturation, saturation);
        let i = self.config.integral_gain * self.integral;

        let error_rate = (error - self.last_error) / dt;
        self.last_error = error;

        let value_rate = (measured - self.last_value) / dt;
        self.last_value = measured;
        self.velocity = value_rate;

        let derivative = if self.derivative_initialized {
            match self.config.derivative_mode {
                DerivativeMode::Velocity => -value_rate,
                DerivativeMode::ErrorRateOfChange => error_rate,
            }
        } else {
            self.derivative_initialized = true;
            0.0
        };
        let d = self.config.derivative_gain * derivative;

        (p + i + d).clamp(self.config.min_output, self.config.max_output)
    }

    /// Accumulated error-time, always within ±`integral_saturation`.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Rate of change of the measured value seen by the last update.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }
}
