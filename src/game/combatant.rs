//! Combatant state and the per-robot action state machine

use serde::{Deserialize, Serialize};

use super::catalog::{CharacterPreset, MoveSpec, RobotId};

/// Body width in pixels
pub const ROBOT_WIDTH: f32 = 48.0;
/// Body height in pixels
pub const ROBOT_HEIGHT: f32 = 120.0;
/// Upper bound for hp and power
pub const METER_MAX: u32 = 100;

/// Horizontal facing, +1 right / -1 left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// Attack button that started the current move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Light,
    Heavy,
    Special,
}

impl AttackKind {
    /// Stats of this move for a given robot
    pub fn spec(self, preset: &CharacterPreset) -> MoveSpec {
        match self {
            AttackKind::Light => preset.light,
            AttackKind::Heavy => preset.heavy,
            AttackKind::Special => preset.special.as_move(),
        }
    }
}

/// One swing in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    pub kind: AttackKind,
    /// Ticks since the move started
    pub timer: u32,
    /// Set once the swing has landed; cleared only by a new attack
    pub hit_connected: bool,
    /// Started while airborne
    pub air: bool,
    /// Post-hit recovery owed when the swing ends
    pub hit_recovery: u32,
}

impl Attack {
    pub fn new(kind: AttackKind, air: bool) -> Self {
        Self {
            kind,
            timer: 0,
            hit_connected: false,
            air,
            hit_recovery: 0,
        }
    }
}

/// Authoritative action state. Exactly one applies at a time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActionState {
    /// Free to move, jump, block and start attacks
    Idle,
    Attacking(Attack),
    /// Can move and block, cannot start an attack
    Recovering { ticks: u32 },
    /// Hitstun: no control, velocity decays by friction
    Stunned { ticks: u32 },
    /// Lying on the floor until the get-up timer expires
    KnockedDown { get_up: u32 },
}

/// One robot's mutable simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: RobotId,
    pub name: String,
    pub color: String,

    /// Horizontal centre
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub on_ground: bool,

    /// 0..=100
    pub hp: u32,
    /// 0..=100
    pub power: u32,

    pub action: ActionState,
    pub blocking: bool,
    /// Turns the next landing into a knockdown
    pub knockdown_on_land: bool,

    pub last_light: bool,
    pub last_heavy: bool,
    pub last_special: bool,

    /// Cosmetic flash frames remaining
    pub hit_flash: u32,
}

impl Combatant {
    /// Create a robot standing on the floor
    pub fn new(preset: &CharacterPreset, x: f32, floor: f32, facing: Facing) -> Self {
        Self {
            id: preset.id,
            name: preset.name.to_string(),
            color: preset.color.to_string(),
            x,
            y: floor - ROBOT_HEIGHT,
            w: ROBOT_WIDTH,
            h: ROBOT_HEIGHT,
            vx: 0.0,
            vy: 0.0,
            facing,
            on_ground: true,
            hp: METER_MAX,
            power: 0,
            action: ActionState::Idle,
            blocking: false,
            knockdown_on_land: false,
            last_light: false,
            last_heavy: false,
            last_special: false,
            hit_flash: 0,
        }
    }

    /// Put the robot back at its spawn point with a clean action state.
    /// Meters are left to the round controller.
    pub fn reset_for_round(&mut self, x: f32, floor: f32, facing: Facing) {
        self.x = x;
        self.y = floor - self.h;
        self.vx = 0.0;
        self.vy = 0.0;
        self.on_ground = true;
        self.facing = facing;
        self.action = ActionState::Idle;
        self.blocking = false;
        self.knockdown_on_land = false;
        self.last_light = false;
        self.last_heavy = false;
        self.last_special = false;
    }

    /// Vertical centre of the body
    pub fn center_y(&self) -> f32 {
        self.y + self.h / 2.0
    }

    pub fn attack(&self) -> Option<&Attack> {
        match &self.action {
            ActionState::Attacking(attack) => Some(attack),
            _ => None,
        }
    }

    pub fn attack_mut(&mut self) -> Option<&mut Attack> {
        match &mut self.action {
            ActionState::Attacking(attack) => Some(attack),
            _ => None,
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.attack().is_some()
    }

    pub fn attack_kind(&self) -> Option<AttackKind> {
        self.attack().map(|a| a.kind)
    }

    pub fn attack_timer(&self) -> u32 {
        self.attack().map(|a| a.timer).unwrap_or(0)
    }

    pub fn hit_connected(&self) -> bool {
        self.attack().map(|a| a.hit_connected).unwrap_or(false)
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.action, ActionState::Stunned { .. })
    }

    pub fn stun_timer(&self) -> u32 {
        match self.action {
            ActionState::Stunned { ticks } => ticks,
            _ => 0,
        }
    }

    pub fn recover_timer(&self) -> u32 {
        match self.action {
            ActionState::Recovering { ticks } => ticks,
            ActionState::Attacking(attack) => attack.hit_recovery,
            _ => 0,
        }
    }

    pub fn is_knocked_down(&self) -> bool {
        matches!(self.action, ActionState::KnockedDown { .. })
    }

    pub fn get_up_timer(&self) -> u32 {
        match self.action {
            ActionState::KnockedDown { get_up } => get_up,
            _ => 0,
        }
    }

    /// Begin a new swing; clears the previous swing's connect flag
    pub fn start_attack(&mut self, kind: AttackKind) {
        self.action = ActionState::Attacking(Attack::new(kind, !self.on_ground));
    }

    /// Apply hitstun. A knocked-down robot stays down.
    pub fn apply_stun(&mut self, ticks: u32) {
        match self.action {
            ActionState::KnockedDown { .. } => {}
            ActionState::Stunned { ticks: current } => {
                self.action = ActionState::Stunned {
                    ticks: current.max(ticks),
                };
            }
            _ => self.action = ActionState::Stunned { ticks },
        }
    }

    pub fn take_damage(&mut self, damage: u32) {
        self.hp = self.hp.saturating_sub(damage);
    }

    pub fn gain_power(&mut self, amount: u32) {
        self.power = (self.power + amount).min(METER_MAX);
    }

    /// Spend power if enough is available
    pub fn try_spend_power(&mut self, cost: u32) -> bool {
        if self.power >= cost {
            self.power -= cost;
            true
        } else {
            false
        }
    }

    pub fn is_ko(&self) -> bool {
        self.hp == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::{preset, RobotId};

    fn robot() -> Combatant {
        Combatant::new(preset(RobotId::Atlas), 300.0, 480.0, Facing::Right)
    }

    #[test]
    fn test_new_robot_stands_on_floor() {
        let r = robot();
        assert_eq!(r.y + r.h, 480.0);
        assert!(r.on_ground);
        assert_eq!(r.hp, 100);
        assert_eq!(r.power, 0);
        assert_eq!(r.action, ActionState::Idle);
    }

    #[test]
    fn test_meters_are_clamped() {
        let mut r = robot();
        r.take_damage(250);
        assert_eq!(r.hp, 0);
        assert!(r.is_ko());

        r.gain_power(80);
        r.gain_power(80);
        assert_eq!(r.power, 100);
        assert!(!r.try_spend_power(101));
        assert!(r.try_spend_power(30));
        assert_eq!(r.power, 70);
    }

    #[test]
    fn test_stun_keeps_longest_and_spares_knockdown() {
        let mut r = robot();
        r.apply_stun(12);
        r.apply_stun(6);
        assert_eq!(r.stun_timer(), 12);

        r.action = ActionState::KnockedDown { get_up: 20 };
        r.apply_stun(18);
        assert!(r.is_knocked_down());
        assert_eq!(r.get_up_timer(), 20);
    }

    #[test]
    fn test_start_attack_resets_connect_flag() {
        let mut r = robot();
        r.start_attack(AttackKind::Light);
        if let Some(a) = r.attack_mut() {
            a.hit_connected = true;
        }
        assert!(r.hit_connected());
        r.start_attack(AttackKind::Heavy);
        assert!(!r.hit_connected());
        assert_eq!(r.attack_kind(), Some(AttackKind::Heavy));
    }
}
