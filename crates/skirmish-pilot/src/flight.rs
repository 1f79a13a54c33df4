//! PID-based flight controller.
//!
//! Turns a target position into normalized yaw/pitch/roll/thrust. Two PID
//! controllers drive bearing and elevation (in degrees) toward zero; an
//! active avoidance signal overrides the matching axis outright.

use glam::DVec3;
use skirmish_core::components::SteeringCommand;
use skirmish_core::config::FlightConfig;
use skirmish_core::enums::ThrustSmoothing;
use skirmish_core::error::ConfigError;
use skirmish_core::types::{angle_between_deg, Pose};

use crate::avoidance::AvoidanceSignal;
use crate::pid::PidController;

const MIN_LOCAL_DISTANCE: f64 = 1e-9;
/// Bearings (degrees) below this count as dead ahead and leave yaw untouched.
const MIN_BEARING_DEG: f64 = 1e-9;

/// Geometry seen by the last update, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightTelemetry {
    /// Horizontal offset of the target from the nose, positive to the right.
    pub bearing_deg: f64,
    /// Vertical offset of the target from the nose, negative below.
    pub pitch_deg: f64,
    pub distance: f64,
}

pub struct FlightController {
    config: FlightConfig,
    yaw_pid: PidController,
    pitch_pid: PidController,
    thrust: f64,
    telemetry: Option<FlightTelemetry>,
}

impl FlightController {
    pub fn new(config: FlightConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            yaw_pid: PidController::new(config.yaw_pid.clone())?,
            pitch_pid: PidController::new(config.pitch_pid.clone())?,
            config,
            thrust: 0.0,
            telemetry: None,
        })
    }

    /// Compute steering toward `target` for one decision tick.
    ///
    /// Returns all zeros when disabled or when there is no target. A `None`
    /// avoidance signal means the ship has no avoidance sensor fitted.
    pub fn update(
        &mut self,
        dt: f64,
        pose: &Pose,
        target: Option<DVec3>,
        avoidance: Option<AvoidanceSignal>,
        enabled: bool,
    ) -> SteeringCommand {
        let Some(target) = target.filter(|_| enabled) else {
            self.thrust = 0.0;
            self.telemetry = None;
            return SteeringCommand::default();
        };

        let local = pose.to_local(target);
        let distance = local.length();
        let (bearing_deg, pitch_deg) = if distance < MIN_LOCAL_DISTANCE {
            (0.0, 0.0)
        } else {
            (
                local.x.atan2(local.z).to_degrees(),
                angle_between_deg(DVec3::NEG_Y, local) - 90.0,
            )
        };
        self.telemetry = Some(FlightTelemetry {
            bearing_deg,
            pitch_deg,
            distance,
        });

        let mut yaw = if !self.config.enable_yaw || bearing_deg.abs() < MIN_BEARING_DEG {
            0.0
        } else {
            -self.yaw_pid.update(dt, bearing_deg, 0.0)
        };
        let mut pitch = if self.config.enable_pitch {
            self.pitch_pid.update(dt, pitch_deg, 0.0)
        } else {
            0.0
        };

        let avoidance = avoidance.unwrap_or(AvoidanceSignal::NONE);
        if let Some(command) = avoidance.horizontal.yaw_command() {
            yaw = command;
        }
        if let Some(command) = avoidance.vertical.pitch_command() {
            pitch = command;
        }

        let roll = if avoidance.is_active() || bearing_deg.abs() <= self.config.roll_deadband_deg {
            0.0
        } else {
            -yaw
        };

        let goal = if distance > self.config.thrust_distance_threshold {
            1.0
        } else {
            0.0
        };
        self.thrust = smooth_thrust(self.config.thrust_smoothing, self.thrust, goal, dt);

        SteeringCommand {
            yaw: yaw.clamp(-1.0, 1.0),
            pitch: pitch.clamp(-1.0, 1.0),
            roll: roll.clamp(-1.0, 1.0),
            thrust: self.thrust.clamp(0.0, 1.0),
        }
    }

    /// Drop the thrust ramp and derivative history.
    pub fn reset(&mut self) {
        self.thrust = 0.0;
        self.telemetry = None;
        self.yaw_pid.reset();
        self.pitch_pid.reset();
    }

    pub fn telemetry(&self) -> Option<FlightTelemetry> {
        self.telemetry
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }
}

fn smooth_thrust(smoothing: ThrustSmoothing, current: f64, goal: f64, dt: f64) -> f64 {
    let alpha = match smoothing {
        ThrustSmoothing::FrameLerp => dt.clamp(0.0, 1.0),
        ThrustSmoothing::TimeConstant { secs } => 1.0 - (-dt.max(0.0) / secs).exp(),
    };
    current + (goal - current) * alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::enums::{HorizontalAvoidance, VerticalAvoidance};

    const DT: f64 = 1.0 / 60.0;

    fn controller() -> FlightController {
        FlightController::new(FlightConfig::default()).unwrap()
    }

    #[test]
    fn test_no_target_coasts() {
        let mut flight = controller();
        let pose = Pose::default();
        flight.update(DT, &pose, Some(DVec3::new(0.0, 0.0, 5000.0)), None, true);
        assert!(flight.thrust() > 0.0);

        let cmd = flight.update(DT, &pose, None, None, true);
        assert_eq!(cmd, SteeringCommand::default());
        assert_eq!(flight.thrust(), 0.0, "thrust ramp resets without a target");
    }

    #[test]
    fn test_tiny_bearing_still_steers() {
        let mut flight = controller();
        // About a microdegree right of the nose.
        let target = DVec3::new(1000.0 * 1e-6_f64.to_radians().tan(), 0.0, 1000.0);
        let cmd = flight.update(DT, &Pose::default(), Some(target), None, true);
        let bearing = flight.telemetry().unwrap().bearing_deg;
        assert!(bearing > MIN_BEARING_DEG, "bearing {bearing}");
        assert!(cmd.yaw > 0.0, "yaw {}", cmd.yaw);
    }

    #[test]
    fn test_disabled_emits_zeros() {
        let mut flight = controller();
        let cmd = flight.update(DT, &Pose::default(), Some(DVec3::new(300.0, 50.0, 10.0)), None, false);
        assert_eq!(cmd, SteeringCommand::default());
    }

    #[test]
    fn test_target_ahead_is_neutral() {
        let mut flight = controller();
        let cmd = flight.update(DT, &Pose::default(), Some(DVec3::new(0.0, 0.0, 1000.0)), None, true);
        assert!(cmd.yaw.abs() < 1e-9);
        assert!(cmd.pitch.abs() < 1e-9, "pitch {}", cmd.pitch);
        assert_eq!(cmd.roll, 0.0);
        let telemetry = flight.telemetry().unwrap();
        assert!(telemetry.pitch_deg.abs() < 1e-9);
    }

    #[test]
    fn test_turns_and_banks_toward_target() {
        let mut flight = controller();
        let right = flight.update(DT, &Pose::default(), Some(DVec3::new(500.0, 0.0, 500.0)), None, true);
        assert!(right.yaw > 0.0, "target to the right should yaw right");
        assert!(right.roll < 0.0, "roll opposes yaw");

        let mut flight = controller();
        let left = flight.update(DT, &Pose::default(), Some(DVec3::new(-500.0, 0.0, 500.0)), None, true);
        assert!(left.yaw < 0.0);
        assert!(left.roll > 0.0);
    }

    #[test]
    fn test_pitches_toward_target() {
        let mut flight = controller();
        let below = flight.update(DT, &Pose::default(), Some(DVec3::new(0.0, -300.0, 500.0)), None, true);
        assert!(below.pitch > 0.0, "target below should lower the nose");

        let mut flight = controller();
        let above = flight.update(DT, &Pose::default(), Some(DVec3::new(0.0, 300.0, 500.0)), None, true);
        assert!(above.pitch < 0.0);
    }

    #[test]
    fn test_bearing_is_in_local_frame() {
        let mut flight = controller();
        // Facing +X: a target at +X is dead ahead.
        let pose = Pose::with_yaw(DVec3::ZERO, 90.0);
        let cmd = flight.update(DT, &pose, Some(DVec3::new(800.0, 0.0, 0.0)), None, true);
        assert!(cmd.yaw.abs() < 1e-6, "yaw {}", cmd.yaw);
        assert!(flight.telemetry().unwrap().bearing_deg.abs() < 1e-6);
    }

    #[test]
    fn test_avoidance_overrides_and_suppresses_roll() {
        let mut flight = controller();
        let signal = AvoidanceSignal {
            vertical: VerticalAvoidance::Up,
            horizontal: HorizontalAvoidance::Left,
        };
        let cmd = flight.update(
            DT,
            &Pose::default(),
            Some(DVec3::new(500.0, -200.0, 500.0)),
            Some(signal),
            true,
        );
        assert_eq!(cmd.yaw, -1.0);
        assert_eq!(cmd.pitch, -1.0);
        assert_eq!(cmd.roll, 0.0);
    }

    #[test]
    fn test_single_axis_override_keeps_other_axis() {
        let mut flight = controller();
        let signal = AvoidanceSignal {
            vertical: VerticalAvoidance::Down,
            horizontal: HorizontalAvoidance::None,
        };
        let cmd = flight.update(
            DT,
            &Pose::default(),
            Some(DVec3::new(500.0, 0.0, 500.0)),
            Some(signal),
            true,
        );
        assert_eq!(cmd.pitch, 1.0);
        assert!(cmd.yaw > 0.0, "yaw still pursues the target");
        assert_eq!(cmd.roll, 0.0);
    }

    #[test]
    fn test_thrust_ramps_with_distance() {
        let mut flight = controller();
        let pose = Pose::default();
        let mut last = 0.0;
        for _ in 0..30 {
            let cmd = flight.update(DT, &pose, Some(DVec3::new(0.0, 0.0, 2000.0)), None, true);
            assert!(cmd.thrust > last && cmd.thrust <= 1.0);
            last = cmd.thrust;
        }
        for _ in 0..30 {
            let cmd = flight.update(DT, &pose, Some(DVec3::new(0.0, 0.0, 50.0)), None, true);
            assert!(cmd.thrust < last && cmd.thrust >= 0.0);
            last = cmd.thrust;
        }
    }

    #[test]
    fn test_frame_lerp_matches_linear_interpolation() {
        let thrust = smooth_thrust(ThrustSmoothing::FrameLerp, 0.2, 1.0, 0.25);
        assert!((thrust - 0.4).abs() < 1e-12);
        assert_eq!(smooth_thrust(ThrustSmoothing::FrameLerp, 0.2, 1.0, 5.0), 1.0);
    }

    #[test]
    fn test_time_constant_is_frame_rate_independent() {
        let smoothing = ThrustSmoothing::TimeConstant { secs: 0.5 };
        let mut coarse = 0.0;
        for _ in 0..10 {
            coarse = smooth_thrust(smoothing, coarse, 1.0, 0.1);
        }
        let mut fine = 0.0;
        for _ in 0..100 {
            fine = smooth_thrust(smoothing, fine, 1.0, 0.01);
        }
        assert!((coarse - fine).abs() < 1e-9, "coarse {coarse} fine {fine}");
    }
}
