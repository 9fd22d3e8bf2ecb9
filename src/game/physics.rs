//! Robot physics, action state machine step, and arena constraints

use super::catalog::{CharacterPreset, SpecialKind};
use super::combatant::{ActionState, AttackKind, Combatant};
use super::effects::EffectPool;
use super::input::InputState;

/// Arena width in pixels
pub const ARENA_W: f32 = 1024.0;
/// Arena height in pixels
pub const ARENA_H: f32 = 576.0;
/// Floor baseline
pub const FLOOR_Y: f32 = 480.0;
/// Closest a robot's centre may get to a side wall
pub const ARENA_MARGIN: f32 = 40.0;

/// Ticks spent on the floor after a knockdown landing
pub const KNOCKDOWN_TICKS: u32 = 40;
/// Vulnerability stun applied when standing up
pub const GET_UP_STUN: u32 = 10;
/// Shortest recovery after any completed attack
pub const MIN_RECOVERY: u32 = 6;

const GROUND_FRICTION: f32 = 0.9;
const AIR_FRICTION: f32 = 0.98;
const KNOCKDOWN_FRICTION: f32 = 0.8;
const DASH_SPEED: f32 = 8.0;
const UPPERCUT_LIFT: f32 = 1.2;
const LASER_RECOIL: f32 = 2.0;

/// Bounded play area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub floor: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: ARENA_W,
            height: ARENA_H,
            floor: FLOOR_Y,
        }
    }
}

/// Recovery owed after a move of the given length runs to completion
pub fn end_of_attack_recovery(duration: u32) -> u32 {
    (duration * 3 / 5).max(MIN_RECOVERY)
}

/// Physics system for stepping robots
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance one robot by one tick
    pub fn step_combatant(
        r: &mut Combatant,
        preset: &CharacterPreset,
        input: &InputState,
        arena: &Arena,
        effects: &mut EffectPool,
    ) {
        Self::decay_timers(r);

        // Horizontal control is instant; denied states only bleed off velocity
        match r.action {
            ActionState::Idle | ActionState::Recovering { .. } => {
                let mut vx = 0.0;
                if input.left {
                    vx -= preset.speed;
                }
                if input.right {
                    vx += preset.speed;
                }
                r.vx = vx;
            }
            ActionState::KnockedDown { .. } => {
                r.vx *= KNOCKDOWN_FRICTION;
            }
            ActionState::Attacking(_) | ActionState::Stunned { .. } => {
                r.vx *= if r.on_ground {
                    GROUND_FRICTION
                } else {
                    AIR_FRICTION
                };
            }
        }

        // One jump per ground contact
        if input.up && r.on_ground && !r.is_stunned() && !r.is_knocked_down() {
            r.vy = -preset.jump;
            r.on_ground = false;
        }

        r.vy += preset.gravity;
        r.x += r.vx;
        r.y += r.vy;

        Self::land(r, arena.floor);

        r.blocking = !r.is_stunned()
            && !r.is_knocked_down()
            && input.block
            && !input.any_attack();

        if r.action == ActionState::Idle {
            Self::try_start_attack(r, preset, input, effects);
        }

        if let ActionState::Attacking(attack) = &mut r.action {
            attack.timer += 1;
            let duration = attack.kind.spec(preset).duration;
            if attack.timer >= duration {
                let ticks = end_of_attack_recovery(duration).max(attack.hit_recovery);
                r.action = ActionState::Recovering { ticks };
            }
        }

        r.last_light = input.light;
        r.last_heavy = input.heavy;
        r.last_special = input.special;
    }

    /// Count down recovery, stun and (while grounded) the get-up timer
    fn decay_timers(r: &mut Combatant) {
        r.action = match r.action {
            ActionState::Recovering { ticks } => match ticks.saturating_sub(1) {
                0 => ActionState::Idle,
                ticks => ActionState::Recovering { ticks },
            },
            ActionState::Stunned { ticks } => match ticks.saturating_sub(1) {
                0 => ActionState::Idle,
                ticks => ActionState::Stunned { ticks },
            },
            ActionState::KnockedDown { get_up } if r.on_ground => {
                match get_up.saturating_sub(1) {
                    0 => ActionState::Stunned {
                        ticks: GET_UP_STUN,
                    },
                    get_up => ActionState::KnockedDown { get_up },
                }
            }
            ActionState::Attacking(mut attack) => {
                attack.hit_recovery = attack.hit_recovery.saturating_sub(1);
                ActionState::Attacking(attack)
            }
            other => other,
        };
    }

    /// Floor contact; a launched robot that lands goes down
    fn land(r: &mut Combatant, floor: f32) {
        let floor_y = floor - r.h;
        if r.y >= floor_y {
            let was_air = !r.on_ground;
            r.y = floor_y;
            r.vy = 0.0;
            r.on_ground = true;
            if was_air && r.knockdown_on_land {
                r.knockdown_on_land = false;
                r.action = ActionState::KnockedDown {
                    get_up: KNOCKDOWN_TICKS,
                };
            }
        } else {
            r.on_ground = false;
        }
    }

    /// Rising-edge attack start, priority light > heavy > special
    fn try_start_attack(
        r: &mut Combatant,
        preset: &CharacterPreset,
        input: &InputState,
        effects: &mut EffectPool,
    ) {
        let light_pressed = input.light && !r.last_light;
        let heavy_pressed = input.heavy && !r.last_heavy;
        let special_pressed = input.special && !r.last_special;

        if light_pressed {
            r.start_attack(AttackKind::Light);
        } else if heavy_pressed {
            r.start_attack(AttackKind::Heavy);
        } else if special_pressed && r.try_spend_power(preset.special.cost) {
            r.start_attack(AttackKind::Special);
            Self::activate_special(r, preset, effects);
        }
    }

    fn activate_special(r: &mut Combatant, preset: &CharacterPreset, effects: &mut EffectPool) {
        let facing = r.facing.sign();
        match preset.special.kind {
            SpecialKind::Dash => {
                r.vx = facing * DASH_SPEED;
            }
            SpecialKind::Uppercut => {
                r.vy = -preset.jump * UPPERCUT_LIFT;
                r.on_ground = false;
            }
            SpecialKind::Laser => {
                r.vx -= facing * LASER_RECOIL;
            }
            SpecialKind::Emp => {
                effects.emit_emp_ring(r.x, r.center_y());
            }
        }
    }

    /// Keep a robot inside the walls and above the floor
    pub fn constrain(r: &mut Combatant, arena: &Arena) {
        let min_x = ARENA_MARGIN;
        let max_x = arena.width - ARENA_MARGIN;
        if r.x < min_x {
            r.x = min_x;
            r.vx = r.vx.max(0.0);
        }
        if r.x > max_x {
            r.x = max_x;
            r.vx = r.vx.min(0.0);
        }

        let floor_y = arena.floor - r.h;
        if r.y >= floor_y {
            r.y = floor_y;
            r.vy = 0.0;
            r.on_ground = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::catalog::{preset, RobotId};
    use crate::game::combatant::Facing;

    fn setup(id: RobotId) -> (Combatant, &'static CharacterPreset, Arena, EffectPool) {
        let p = preset(id);
        let arena = Arena::default();
        (
            Combatant::new(p, 300.0, arena.floor, Facing::Right),
            p,
            arena,
            EffectPool::new(),
        )
    }

    fn press(f: impl FnOnce(&mut InputState)) -> InputState {
        let mut input = InputState::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_instant_horizontal_control() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        let right = press(|i| i.right = true);
        PhysicsSystem::step_combatant(&mut r, p, &right, &arena, &mut fx);
        assert_eq!(r.vx, p.speed);
        assert_eq!(r.x, 300.0 + p.speed);

        let both = press(|i| {
            i.left = true;
            i.right = true;
        });
        PhysicsSystem::step_combatant(&mut r, p, &both, &arena, &mut fx);
        assert_eq!(r.vx, 0.0);
    }

    #[test]
    fn test_single_jump_per_ground_contact() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        let up = press(|i| i.up = true);
        PhysicsSystem::step_combatant(&mut r, p, &up, &arena, &mut fx);
        assert!(!r.on_ground);
        assert_eq!(r.vy, -p.jump + p.gravity);

        // Holding jump in the air does not re-launch
        let vy = r.vy;
        PhysicsSystem::step_combatant(&mut r, p, &up, &arena, &mut fx);
        assert_eq!(r.vy, vy + p.gravity);

        // Comes back down eventually
        for _ in 0..60 {
            PhysicsSystem::step_combatant(&mut r, p, &InputState::default(), &arena, &mut fx);
        }
        assert!(r.on_ground);
        assert_eq!(r.y, arena.floor - r.h);
    }

    #[test]
    fn test_attack_requires_rising_edge() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        let light = press(|i| i.light = true);

        PhysicsSystem::step_combatant(&mut r, p, &light, &arena, &mut fx);
        assert_eq!(r.attack_kind(), Some(AttackKind::Light));
        assert_eq!(r.attack_timer(), 1);

        // Hold through the whole move and recovery: no second attack
        for _ in 0..40 {
            PhysicsSystem::step_combatant(&mut r, p, &light, &arena, &mut fx);
        }
        assert_eq!(r.action, ActionState::Idle);

        // Release then press again
        PhysicsSystem::step_combatant(&mut r, p, &InputState::default(), &arena, &mut fx);
        PhysicsSystem::step_combatant(&mut r, p, &light, &arena, &mut fx);
        assert!(r.is_attacking());
    }

    #[test]
    fn test_light_has_priority_over_heavy_and_special() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        r.power = 100;
        let all = press(|i| {
            i.light = true;
            i.heavy = true;
            i.special = true;
        });
        PhysicsSystem::step_combatant(&mut r, p, &all, &arena, &mut fx);
        assert_eq!(r.attack_kind(), Some(AttackKind::Light));
        assert_eq!(r.power, 100);
    }

    #[test]
    fn test_special_requires_and_debits_power() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        let special = press(|i| i.special = true);

        r.power = p.special.cost - 1;
        PhysicsSystem::step_combatant(&mut r, p, &special, &arena, &mut fx);
        assert!(!r.is_attacking());
        assert_eq!(r.power, p.special.cost - 1);

        PhysicsSystem::step_combatant(&mut r, p, &InputState::default(), &arena, &mut fx);
        r.power = 50;
        PhysicsSystem::step_combatant(&mut r, p, &special, &arena, &mut fx);
        assert_eq!(r.attack_kind(), Some(AttackKind::Special));
        assert_eq!(r.power, 50 - p.special.cost);
        // Dash burst lands after this tick's integration
        assert_eq!(r.vx, DASH_SPEED);
    }

    #[test]
    fn test_special_side_effects() {
        let special = press(|i| i.special = true);

        let (mut r, p, arena, mut fx) = setup(RobotId::Nova);
        r.power = 100;
        PhysicsSystem::step_combatant(&mut r, p, &special, &arena, &mut fx);
        assert!(!r.on_ground);
        assert!(r.vy < -p.jump);

        let (mut r, p, arena, mut fx) = setup(RobotId::Titan);
        r.power = 100;
        PhysicsSystem::step_combatant(&mut r, p, &special, &arena, &mut fx);
        assert_eq!(fx.effects.len(), 1);

        let (mut r, p, arena, mut fx) = setup(RobotId::Bolt);
        r.power = 100;
        PhysicsSystem::step_combatant(&mut r, p, &special, &arena, &mut fx);
        assert_eq!(r.vx, -LASER_RECOIL);
    }

    #[test]
    fn test_attack_end_enters_recovery() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        let heavy = press(|i| i.heavy = true);
        PhysicsSystem::step_combatant(&mut r, p, &heavy, &arena, &mut fx);
        for _ in 1..p.heavy.duration {
            PhysicsSystem::step_combatant(&mut r, p, &InputState::default(), &arena, &mut fx);
        }
        assert_eq!(
            r.action,
            ActionState::Recovering {
                ticks: end_of_attack_recovery(p.heavy.duration)
            }
        );
        assert_eq!(end_of_attack_recovery(16), 9);
        assert_eq!(end_of_attack_recovery(8), MIN_RECOVERY);
    }

    #[test]
    fn test_block_is_exclusive_with_attack_buttons() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        let block = press(|i| i.block = true);
        PhysicsSystem::step_combatant(&mut r, p, &block, &arena, &mut fx);
        assert!(r.blocking);

        let block_and_heavy = press(|i| {
            i.block = true;
            i.heavy = true;
        });
        PhysicsSystem::step_combatant(&mut r, p, &block_and_heavy, &arena, &mut fx);
        assert!(!r.blocking);

        r.action = ActionState::Stunned { ticks: 5 };
        PhysicsSystem::step_combatant(&mut r, p, &block, &arena, &mut fx);
        assert!(!r.blocking);
    }

    #[test]
    fn test_stunned_robot_slides_with_friction() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        r.action = ActionState::Stunned { ticks: 10 };
        r.vx = 10.0;
        let right = press(|i| i.right = true);
        PhysicsSystem::step_combatant(&mut r, p, &right, &arena, &mut fx);
        assert!((r.vx - 9.0).abs() < 1e-5);
        assert_eq!(r.stun_timer(), 9);
    }

    #[test]
    fn test_knockdown_landing_and_get_up() {
        let (mut r, p, arena, mut fx) = setup(RobotId::Atlas);
        r.knockdown_on_land = true;
        r.action = ActionState::Stunned { ticks: 30 };
        r.vy = -12.0;

        let mut ticks = 0;
        while !r.is_knocked_down() {
            PhysicsSystem::step_combatant(&mut r, p, &InputState::default(), &arena, &mut fx);
            ticks += 1;
            assert!(ticks < 100, "robot never landed");
        }
        assert_eq!(r.get_up_timer(), KNOCKDOWN_TICKS);
        assert!(!r.knockdown_on_land);
        assert_eq!(r.stun_timer(), 0);

        // Input is ignored while down
        let up = press(|i| {
            i.up = true;
            i.right = true;
        });
        for _ in 0..KNOCKDOWN_TICKS - 1 {
            PhysicsSystem::step_combatant(&mut r, p, &up, &arena, &mut fx);
            assert!(r.on_ground);
        }
        assert!(r.is_knocked_down());
        PhysicsSystem::step_combatant(&mut r, p, &InputState::default(), &arena, &mut fx);
        assert!(!r.is_knocked_down());
        assert_eq!(r.stun_timer(), GET_UP_STUN);
    }

    #[test]
    fn test_constrain_clamps_walls() {
        let (mut r, _, arena, _) = setup(RobotId::Atlas);
        r.x = 10.0;
        r.vx = -5.0;
        PhysicsSystem::constrain(&mut r, &arena);
        assert_eq!(r.x, ARENA_MARGIN);
        assert_eq!(r.vx, 0.0);

        r.x = 2000.0;
        r.vx = 5.0;
        PhysicsSystem::constrain(&mut r, &arena);
        assert_eq!(r.x, ARENA_W - ARENA_MARGIN);
        assert_eq!(r.vx, 0.0);
    }
}
