//! Combat system - active windows, hit detection, damage and feedback

use rand::Rng;
use tracing::debug;

use super::catalog::{CharacterPreset, MoveSpec, SpecialKind};
use super::combatant::{AttackKind, Combatant};
use super::effects::EffectPool;

/// Startup and wind-down ticks at each end of a move with no hit potential
pub const ACTIVE_WINDOW_MARGIN: u32 = 2;
/// Minimum hit flash frames on the defender
pub const HIT_FLASH_TICKS: u32 = 8;
/// Power gained by the attacker on any connect
pub const ATTACKER_POWER_GAIN: u32 = 6;
/// Power gained by a defender for blocking
pub const BLOCK_POWER_GAIN: u32 = 4;
/// Extra stun from an uppercut launch
pub const UPPERCUT_EXTRA_STUN: u32 = 6;

/// A connect detected for one attacker/defender pair.
///
/// Captured before any hit of the tick is applied, so a defender whose own
/// swing gets cancelled by the other hit still trades.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub kind: AttackKind,
    pub spec: MoveSpec,
    /// Present when the move is a special
    pub special: Option<SpecialKind>,
    /// Attacker's jump impulse, scales the uppercut launch
    pub attacker_jump: f32,
    /// Attacker facing sign at the time of the hit
    pub direction: f32,
}

/// Result of applying a hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: u32,
    pub blocked: bool,
    /// Global freeze the hit asks for
    pub hitstop: u32,
    pub defender_ko: bool,
}

/// Combat system for resolving attacks between two robots
pub struct CombatSystem;

impl CombatSystem {
    /// Whether an attack at `timer` ticks can connect
    pub fn is_active(timer: u32, duration: u32) -> bool {
        timer > ACTIVE_WINDOW_MARGIN && timer + ACTIVE_WINDOW_MARGIN < duration
    }

    /// Hitbox test: a reach point projected in front of the attacker
    pub fn in_reach(attacker: &Combatant, defender: &Combatant, spec: &MoveSpec) -> bool {
        let reach_x = attacker.x + attacker.facing.sign() * (attacker.w / 2.0 + spec.reach);
        let dist_x = (defender.x - reach_x).abs();
        let dist_y = (defender.center_y() - attacker.center_y()).abs();
        dist_x < spec.reach && dist_y < attacker.h * 0.75
    }

    /// Detect whether the attacker's current swing connects this tick
    pub fn check_hit(
        attacker: &Combatant,
        preset: &CharacterPreset,
        defender: &Combatant,
    ) -> Option<Hit> {
        let attack = attacker.attack()?;
        if attack.hit_connected {
            return None;
        }

        let spec = attack.kind.spec(preset);
        if !Self::is_active(attack.timer, spec.duration) {
            return None;
        }
        if !Self::in_reach(attacker, defender, &spec) {
            return None;
        }

        Some(Hit {
            kind: attack.kind,
            spec,
            special: (attack.kind == AttackKind::Special).then_some(preset.special.kind),
            attacker_jump: preset.jump,
            direction: attacker.facing.sign(),
        })
    }

    /// Blocked damage, rounded up: ceil(damage * 0.4)
    pub fn blocked_damage(damage: u32) -> u32 {
        (damage * 2 + 4) / 5
    }

    /// Hitstun in ticks
    pub fn hitstun(kind: AttackKind, blocked: bool) -> u32 {
        match (kind, blocked) {
            (AttackKind::Light, true) => 6,
            (AttackKind::Heavy, true) => 9,
            (AttackKind::Special, true) => 12,
            (AttackKind::Light, false) => 12,
            (AttackKind::Heavy, false) => 18,
            (AttackKind::Special, false) => 22,
        }
    }

    /// Global freeze in ticks; blocked hits freeze for 60%
    pub fn hitstop(kind: AttackKind, blocked: bool) -> u32 {
        let stop = match kind {
            AttackKind::Light => 4,
            AttackKind::Heavy => 8,
            AttackKind::Special => 10,
        };
        if blocked {
            stop * 3 / 5
        } else {
            stop
        }
    }

    pub fn shake_strength(kind: AttackKind) -> f32 {
        match kind {
            AttackKind::Light => 4.0,
            AttackKind::Heavy => 8.0,
            AttackKind::Special => 10.0,
        }
    }

    /// Apply a detected hit: damage, knockback, stun, meters and feedback
    pub fn apply_hit<R: Rng>(
        hit: &Hit,
        attacker: &mut Combatant,
        defender: &mut Combatant,
        effects: &mut EffectPool,
        rng: &mut R,
    ) -> HitOutcome {
        let blocked = defender.blocking;
        let (damage, knockback) = if blocked {
            defender.gain_power(BLOCK_POWER_GAIN);
            (Self::blocked_damage(hit.spec.damage), hit.spec.knockback * 0.5)
        } else {
            (hit.spec.damage, hit.spec.knockback)
        };

        defender.take_damage(damage);
        defender.vx += hit.direction * knockback * 0.8;
        defender.vy -= (knockback * 0.3).max(0.0);

        // Recoil keeps a little spacing
        attacker.vx -= hit.direction * (knockback * 0.2).max(0.5);
        attacker.gain_power(ATTACKER_POWER_GAIN);

        let mut stun = Self::hitstun(hit.kind, blocked);
        match hit.special {
            Some(SpecialKind::Uppercut) => {
                defender.vy -= (hit.attacker_jump * 0.9).max(10.0);
                defender.vx += hit.direction * hit.spec.knockback;
                defender.knockdown_on_land = true;
                stun += UPPERCUT_EXTRA_STUN;
            }
            Some(SpecialKind::Dash | SpecialKind::Laser | SpecialKind::Emp) | None => {}
        }
        // Cancels whatever the defender was doing
        defender.apply_stun(stun);

        if let Some(attack) = attacker.attack_mut() {
            attack.hit_recovery = attack.hit_recovery.max(hit.spec.duration / 4);
            attack.hit_connected = true;
        }

        effects.emit_hit(defender.x, defender.y, defender.h, &defender.color, rng);
        defender.hit_flash = defender.hit_flash.max(HIT_FLASH_TICKS);

        let hitstop = Self::hitstop(hit.kind, blocked);
        effects.add_shake(Self::shake_strength(hit.kind), hitstop);

        debug!(
            attacker = %attacker.id,
            defender = %defender.id,
            kind = ?hit.kind,
            damage,
            blocked,
            defender_hp = defender.hp,
            "Hit landed"
        );

        HitOutcome {
            damage,
            blocked,
            hitstop,
            defender_ko: defender.is_ko(),
        }
    }
}
