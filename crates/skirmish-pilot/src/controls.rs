//! Command sources for ship movement and weapons.
//!
//! Human and autonomous pilots expose the same read-only contract so the
//! physics layer never cares who is flying.

use glam::DVec2;
use skirmish_core::components::{FireCommand, SteeringCommand};
use skirmish_core::constants::DESKTOP_DEAD_ZONE;
use skirmish_core::enums::ControlScheme;

/// Normalized movement commands. Yaw, pitch and roll in [-1, 1]; thrust in [-1, 1].
pub trait MovementControls {
    fn yaw(&self) -> f64;
    fn pitch(&self) -> f64;
    fn roll(&self) -> f64;
    fn thrust(&self) -> f64;
}

pub trait WeaponControls {
    fn primary_fired(&self) -> bool;
    fn secondary_fired(&self) -> bool;
}

/// Raw mouse and keyboard state for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DesktopInput {
    /// Cursor position in pixels, origin bottom-left.
    pub mouse: DVec2,
    pub screen_size: DVec2,
    /// Q held.
    pub roll_left: bool,
    /// E held.
    pub roll_right: bool,
    /// Forward/back axis in [-1, 1].
    pub vertical_axis: f64,
    pub left_button: bool,
    pub right_button: bool,
}

/// Mouse steering relative to the screen centre with a dead zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesktopControls {
    pub dead_zone: f64,
    pub input: DesktopInput,
}

impl Default for DesktopControls {
    fn default() -> Self {
        Self {
            dead_zone: DESKTOP_DEAD_ZONE,
            input: DesktopInput::default(),
        }
    }
}

impl DesktopControls {
    /// Offset of the cursor from the centre along one axis, as a fraction of half the screen.
    fn axis(&self, cursor: f64, extent: f64) -> f64 {
        let centre = extent * 0.5;
        if centre <= 0.0 {
            return 0.0;
        }
        let amount = ((cursor - centre) / centre).clamp(-1.0, 1.0);
        if amount.abs() > self.dead_zone {
            amount
        } else {
            0.0
        }
    }
}

impl MovementControls for DesktopControls {
    fn yaw(&self) -> f64 {
        self.axis(self.input.mouse.x, self.input.screen_size.x)
    }

    fn pitch(&self) -> f64 {
        // Mouse up raises the nose.
        -self.axis(self.input.mouse.y, self.input.screen_size.y)
    }

    fn roll(&self) -> f64 {
        if self.input.roll_left {
            1.0
        } else if self.input.roll_right {
            -1.0
        } else {
            0.0
        }
    }

    fn thrust(&self) -> f64 {
        self.input.vertical_axis.clamp(-1.0, 1.0)
    }
}

impl WeaponControls for DesktopControls {
    fn primary_fired(&self) -> bool {
        self.input.left_button
    }

    fn secondary_fired(&self) -> bool {
        self.input.right_button
    }
}

/// Raw gamepad state for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GamepadInput {
    pub left_stick: DVec2,
    pub right_stick: DVec2,
    pub left_trigger: bool,
    pub right_trigger: bool,
}

impl MovementControls for GamepadInput {
    fn yaw(&self) -> f64 {
        self.left_stick.x.clamp(-1.0, 1.0)
    }

    fn pitch(&self) -> f64 {
        self.left_stick.y.clamp(-1.0, 1.0)
    }

    fn roll(&self) -> f64 {
        -self.right_stick.x.clamp(-1.0, 1.0)
    }

    fn thrust(&self) -> f64 {
        self.right_stick.y.clamp(-1.0, 1.0)
    }
}

impl WeaponControls for GamepadInput {
    fn primary_fired(&self) -> bool {
        self.right_trigger
    }

    fn secondary_fired(&self) -> bool {
        self.left_trigger
    }
}

/// Commands computed by the autonomous pilot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AiControls {
    pub steering: SteeringCommand,
    pub fire: FireCommand,
}

impl MovementControls for AiControls {
    fn yaw(&self) -> f64 {
        self.steering.yaw
    }

    fn pitch(&self) -> f64 {
        self.steering.pitch
    }

    fn roll(&self) -> f64 {
        self.steering.roll
    }

    fn thrust(&self) -> f64 {
        self.steering.thrust
    }
}

impl WeaponControls for AiControls {
    fn primary_fired(&self) -> bool {
        self.fire.primary
    }

    fn secondary_fired(&self) -> bool {
        self.fire.secondary
    }
}

/// Command source selected when a ship is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlSource {
    HumanDesktop(DesktopControls),
    HumanGamepad(GamepadInput),
    Ai(AiControls),
}

impl ControlSource {
    pub fn from_scheme(scheme: ControlScheme) -> Self {
        match scheme {
            ControlScheme::HumanDesktop => ControlSource::HumanDesktop(DesktopControls::default()),
            ControlScheme::HumanGamepad => ControlSource::HumanGamepad(GamepadInput::default()),
            ControlScheme::Ai => ControlSource::Ai(AiControls::default()),
        }
    }

    pub fn scheme(&self) -> ControlScheme {
        match self {
            ControlSource::HumanDesktop(_) => ControlScheme::HumanDesktop,
            ControlSource::HumanGamepad(_) => ControlScheme::HumanGamepad,
            ControlSource::Ai(_) => ControlScheme::Ai,
        }
    }

    /// Store pilot output. Ignored for human sources.
    pub fn set_ai(&mut self, steering: SteeringCommand, fire: FireCommand) {
        if let ControlSource::Ai(ai) = self {
            ai.steering = steering;
            ai.fire = fire;
        }
    }

    /// Replace desktop device state. Ignored for other sources.
    pub fn set_desktop_input(&mut self, input: DesktopInput) {
        if let ControlSource::HumanDesktop(desktop) = self {
            desktop.input = input;
        }
    }

    /// Replace gamepad device state. Ignored for other sources.
    pub fn set_gamepad_input(&mut self, input: GamepadInput) {
        if let ControlSource::HumanGamepad(pad) = self {
            *pad = input;
        }
    }

    fn movement(&self) -> &dyn MovementControls {
        match self {
            ControlSource::HumanDesktop(c) => c,
            ControlSource::HumanGamepad(c) => c,
            ControlSource::Ai(c) => c,
        }
    }

    fn weapons(&self) -> &dyn WeaponControls {
        match self {
            ControlSource::HumanDesktop(c) => c,
            ControlSource::HumanGamepad(c) => c,
            ControlSource::Ai(c) => c,
        }
    }
}

impl MovementControls for ControlSource {
    fn yaw(&self) -> f64 {
        self.movement().yaw()
    }

    fn pitch(&self) -> f64 {
        self.movement().pitch()
    }

    fn roll(&self) -> f64 {
        self.movement().roll()
    }

    fn thrust(&self) -> f64 {
        self.movement().thrust()
    }
}

impl WeaponControls for ControlSource {
    fn primary_fired(&self) -> bool {
        self.weapons().primary_fired()
    }

    fn secondary_fired(&self) -> bool {
        self.weapons().secondary_fired()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop(mouse: DVec2) -> DesktopControls {
        DesktopControls {
            input: DesktopInput {
                mouse,
                screen_size: DVec2::new(1920.0, 1080.0),
                ..DesktopInput::default()
            },
            ..DesktopControls::default()
        }
    }

    #[test]
    fn test_desktop_dead_zone() {
        // 5% right of centre.
        let controls = desktop(DVec2::new(960.0 + 48.0, 540.0));
        assert_eq!(controls.yaw(), 0.0);
        // 50% right of centre.
        let controls = desktop(DVec2::new(960.0 + 480.0, 540.0));
        assert!((controls.yaw() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_desktop_pitch_inverted() {
        let controls = desktop(DVec2::new(960.0, 540.0 + 270.0));
        assert!((controls.pitch() - -0.5).abs() < 1e-12);
    }

    #[test]
    fn test_desktop_roll_keys() {
        let mut controls = desktop(DVec2::new(960.0, 540.0));
        controls.input.roll_left = true;
        assert_eq!(controls.roll(), 1.0);
        controls.input.roll_left = false;
        controls.input.roll_right = true;
        assert_eq!(controls.roll(), -1.0);
    }

    #[test]
    fn test_gamepad_roll_inverted() {
        let pad = GamepadInput {
            right_stick: DVec2::new(0.4, 0.8),
            ..GamepadInput::default()
        };
        assert!((pad.roll() - -0.4).abs() < 1e-12);
        assert!((pad.thrust() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_control_source_dispatch() {
        let mut source = ControlSource::from_scheme(ControlScheme::Ai);
        let steering = SteeringCommand {
            yaw: 0.3,
            pitch: -0.2,
            roll: 0.1,
            thrust: 0.9,
        };
        source.set_ai(
            steering,
            FireCommand {
                primary: true,
                secondary: false,
            },
        );
        assert_eq!(source.yaw(), 0.3);
        assert_eq!(source.thrust(), 0.9);
        assert!(source.primary_fired());
        assert!(!source.secondary_fired());

        let mut human = ControlSource::from_scheme(ControlScheme::HumanGamepad);
        human.set_ai(steering, FireCommand::default());
        assert_eq!(human.yaw(), 0.0, "pilot output ignored by human sources");
        assert_eq!(human.scheme(), ControlScheme::HumanGamepad);
    }
}
