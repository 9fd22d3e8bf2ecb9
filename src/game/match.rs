//! Duel state and the per-tick simulation step

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::util::time::clamp_frame_dt;

use super::catalog::{self, CharacterPreset, RobotId};
use super::combat::CombatSystem;
use super::combatant::{Combatant, Facing, METER_MAX};
use super::effects::EffectPool;
use super::input::{InputState, Side};
use super::physics::{Arena, PhysicsSystem};
use super::round::{RoundController, RoundPhase, DEFAULT_ROUNDS_TO_WIN};

/// P1 spawn x
pub const P1_SPAWN_X: f32 = 300.0;
/// P2 spawn x
pub const P2_SPAWN_X: f32 = 724.0;
/// Power granted to both robots at the start of each new round
pub const NEXT_ROUND_POWER_BONUS: u32 = 15;

/// Options fixed at match creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub p1: RobotId,
    pub p2: RobotId,
    pub rounds_to_win: u32,
    /// Seeds particle randomness so both peers can replay identically
    #[serde(default)]
    pub seed: u64,
}

impl MatchSetup {
    /// Build from raw identifiers; unknown ids become the catalog default
    pub fn from_ids(p1: &str, p2: &str, rounds_to_win: Option<u32>) -> Self {
        Self {
            p1: catalog::lookup(p1).id,
            p2: catalog::lookup(p2).id,
            rounds_to_win: rounds_to_win
                .filter(|&n| n > 0)
                .unwrap_or(DEFAULT_ROUNDS_TO_WIN),
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for MatchSetup {
    fn default() -> Self {
        Self {
            p1: RobotId::Atlas,
            p2: RobotId::Bolt,
            rounds_to_win: DEFAULT_ROUNDS_TO_WIN,
            seed: 0,
        }
    }
}

/// Something a renderer or audio layer may want to react to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DuelEvent {
    Hit {
        attacker: Side,
        damage: u32,
        blocked: bool,
    },
    Knockout {
        side: Side,
    },
    RoundOver {
        round: u32,
        wins: [u32; 2],
    },
    MatchOver {
        winner: Option<Side>,
    },
    RoundStarted {
        round: u32,
    },
}

/// Complete duel state. Owned by whoever drives the tick loop.
#[derive(Debug, Clone)]
pub struct GameState {
    pub setup: MatchSetup,
    pub arena: Arena,
    pub p1: Combatant,
    pub p2: Combatant,
    pub p1_preset: &'static CharacterPreset,
    pub p2_preset: &'static CharacterPreset,
    pub effects: EffectPool,
    pub rounds: RoundController,
    /// Global impact freeze, in ticks
    pub hitstop: u32,
    /// Simulation ticks advanced
    pub tick: u64,
    rng: ChaCha8Rng,
}

impl GameState {
    pub fn new(setup: MatchSetup) -> Self {
        let arena = Arena::default();
        let p1_preset = catalog::preset(setup.p1);
        let p2_preset = catalog::preset(setup.p2);

        info!(
            p1 = %setup.p1,
            p2 = %setup.p2,
            rounds_to_win = setup.rounds_to_win,
            seed = setup.seed,
            "Duel created"
        );

        Self {
            p1: Combatant::new(p1_preset, P1_SPAWN_X, arena.floor, Facing::Right),
            p2: Combatant::new(p2_preset, P2_SPAWN_X, arena.floor, Facing::Left),
            p1_preset,
            p2_preset,
            effects: EffectPool::new(),
            rounds: RoundController::new(setup.rounds_to_win),
            hitstop: 0,
            tick: 0,
            rng: ChaCha8Rng::seed_from_u64(setup.seed),
            arena,
            setup,
        }
    }

    pub fn combatant(&self, side: Side) -> &Combatant {
        match side {
            Side::P1 => &self.p1,
            Side::P2 => &self.p2,
        }
    }

    pub fn combatant_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::P1 => &mut self.p1,
            Side::P2 => &mut self.p2,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.rounds.phase(self.hitstop)
    }

    pub fn winner(&self) -> Option<Side> {
        self.rounds.winner()
    }

    /// Advance the duel by one tick.
    ///
    /// A zero, negative or non-finite `dt` leaves the state untouched.
    pub fn update(&mut self, p1_input: &InputState, p2_input: &InputState, dt: f32) -> Vec<DuelEvent> {
        let mut events = Vec::new();
        if clamp_frame_dt(dt) <= 0.0 {
            return events;
        }
        self.tick += 1;

        // Only drift leftover particles once the match is decided
        if self.rounds.match_over {
            self.effects.advance(self.arena.floor);
            return events;
        }

        if self.rounds.round_over {
            self.effects.advance(self.arena.floor);
            if self.rounds.tick_cooldown() {
                self.start_next_round();
                events.push(DuelEvent::RoundStarted {
                    round: self.rounds.round,
                });
            }
            return events;
        }

        if self.hitstop > 0 {
            self.hitstop -= 1;
            self.effects.advance(self.arena.floor);
            return events;
        }

        self.rounds.tick_intro();
        self.update_facing();

        PhysicsSystem::step_combatant(
            &mut self.p1,
            self.p1_preset,
            p1_input,
            &self.arena,
            &mut self.effects,
        );
        PhysicsSystem::step_combatant(
            &mut self.p2,
            self.p2_preset,
            p2_input,
            &self.arena,
            &mut self.effects,
        );

        PhysicsSystem::constrain(&mut self.p1, &self.arena);
        PhysicsSystem::constrain(&mut self.p2, &self.arena);

        self.p1.hit_flash = self.p1.hit_flash.saturating_sub(1);
        self.p2.hit_flash = self.p2.hit_flash.saturating_sub(1);

        self.resolve_combat(&mut events);

        self.effects.advance(self.arena.floor);
        events
    }

    /// Each robot turns toward the other
    fn update_facing(&mut self) {
        self.p1.facing = if self.p1.x <= self.p2.x {
            Facing::Right
        } else {
            Facing::Left
        };
        self.p2.facing = if self.p2.x >= self.p1.x {
            Facing::Left
        } else {
            Facing::Right
        };
    }

    /// Evaluate both attack directions against the same pre-hit state,
    /// then apply P1's hit before P2's
    fn resolve_combat(&mut self, events: &mut Vec<DuelEvent>) {
        let hit_on_p2 = CombatSystem::check_hit(&self.p1, self.p1_preset, &self.p2);
        let hit_on_p1 = CombatSystem::check_hit(&self.p2, self.p2_preset, &self.p1);

        let mut knocked_out = Vec::new();

        if let Some(hit) = hit_on_p2 {
            let outcome = CombatSystem::apply_hit(
                &hit,
                &mut self.p1,
                &mut self.p2,
                &mut self.effects,
                &mut self.rng,
            );
            self.hitstop = self.hitstop.max(outcome.hitstop);
            events.push(DuelEvent::Hit {
                attacker: Side::P1,
                damage: outcome.damage,
                blocked: outcome.blocked,
            });
            if outcome.defender_ko {
                knocked_out.push(Side::P2);
            }
        }

        if let Some(hit) = hit_on_p1 {
            let outcome = CombatSystem::apply_hit(
                &hit,
                &mut self.p2,
                &mut self.p1,
                &mut self.effects,
                &mut self.rng,
            );
            self.hitstop = self.hitstop.max(outcome.hitstop);
            events.push(DuelEvent::Hit {
                attacker: Side::P2,
                damage: outcome.damage,
                blocked: outcome.blocked,
            });
            if outcome.defender_ko {
                knocked_out.push(Side::P1);
            }
        }

        if self.rounds.credit_kos(&knocked_out) {
            for side in &knocked_out {
                events.push(DuelEvent::Knockout { side: *side });
            }
            events.push(DuelEvent::RoundOver {
                round: self.rounds.round,
                wins: self.rounds.wins,
            });
            if self.rounds.match_over {
                events.push(DuelEvent::MatchOver {
                    winner: self.rounds.winner(),
                });
            }
        }
    }

    /// Reset the arena for the next round; power carries over with a bonus
    pub fn start_next_round(&mut self) {
        self.rounds.begin_next_round();

        for r in [&mut self.p1, &mut self.p2] {
            r.hp = METER_MAX;
            r.gain_power(NEXT_ROUND_POWER_BONUS);
        }
        self.effects.clear();
        self.hitstop = 0;
        self.reset_positions();
    }

    fn reset_positions(&mut self) {
        let floor = self.arena.floor;
        self.p1.reset_for_round(P1_SPAWN_X, floor, Facing::Right);
        self.p2.reset_for_round(P2_SPAWN_X, floor, Facing::Left);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(MatchSetup::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combatant::ActionState;
    use crate::util::time::tick_delta;

    fn idle() -> InputState {
        InputState::default()
    }

    fn light() -> InputState {
        InputState {
            light: true,
            ..Default::default()
        }
    }

    /// Park P2 on P1's light reach point
    fn face_off(state: &mut GameState) {
        let reach = state.p1_preset.light.reach;
        state.p2.x = state.p1.x + state.p1.w / 2.0 + reach;
    }

    /// Press light once and tick until it lands; returns the tick events
    fn land_p1_light(state: &mut GameState) -> Vec<DuelEvent> {
        let hp = state.p2.hp;
        let mut events = state.update(&light(), &idle(), tick_delta());
        for _ in 0..20 {
            if state.p2.hp != hp {
                return events;
            }
            events = state.update(&idle(), &idle(), tick_delta());
        }
        panic!("light attack never connected");
    }

    #[test]
    fn test_unknown_ids_fall_back() {
        let setup = MatchSetup::from_ids("alpha", "nova", Some(0));
        assert_eq!(setup.p1, RobotId::Atlas);
        assert_eq!(setup.p2, RobotId::Nova);
        assert_eq!(setup.rounds_to_win, DEFAULT_ROUNDS_TO_WIN);

        let state = GameState::new(setup);
        assert_eq!(state.p1.name, "Atlas");
        assert_eq!(state.rounds.intro_timer, 120);
        assert_eq!(state.phase(), RoundPhase::Intro { remaining: 120 });
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut state = GameState::default();
        let right = InputState {
            right: true,
            ..Default::default()
        };
        let before = state.p1.clone();
        state.update(&right, &idle(), 0.0);
        state.update(&right, &idle(), f32::NAN);
        assert_eq!(state.p1, before);
        assert_eq!(state.tick, 0);

        state.update(&right, &idle(), tick_delta());
        assert!(state.p1.x > before.x);
    }

    #[test]
    fn test_combat_runs_during_intro() {
        let mut state = GameState::default();
        face_off(&mut state);
        let events = land_p1_light(&mut state);
        assert!(state.rounds.intro_timer > 0);
        assert_eq!(state.p2.hp, 100 - state.p1_preset.light.damage);
        assert!(events.contains(&DuelEvent::Hit {
            attacker: Side::P1,
            damage: state.p1_preset.light.damage,
            blocked: false,
        }));
    }

    #[test]
    fn test_hitstop_freezes_robots_not_particles() {
        let mut state = GameState::default();
        face_off(&mut state);
        land_p1_light(&mut state);

        let n = state.hitstop;
        assert_eq!(n, 4);
        let (p1, p2) = (state.p1.clone(), state.p2.clone());
        let spark_y = state.effects.sparks[0].y;

        let right = InputState {
            right: true,
            light: true,
            ..Default::default()
        };
        for _ in 0..n {
            state.update(&right, &right, tick_delta());
            assert_eq!(state.p1, p1);
            assert_eq!(state.p2, p2);
        }
        assert_eq!(state.hitstop, 0);
        assert_ne!(state.effects.sparks[0].y, spark_y);

        state.update(&idle(), &idle(), tick_delta());
        assert_ne!(state.p1.attack_timer(), p1.attack_timer());
    }

    #[test]
    fn test_ko_ends_round_and_next_round_resets() {
        let mut state = GameState::default();
        state.p1.power = 95;
        face_off(&mut state);
        state.p2.hp = 1;

        let events = land_p1_light(&mut state);
        assert!(state.rounds.round_over);
        assert!(!state.rounds.match_over);
        assert_eq!(state.rounds.round_cooldown, 180);
        assert_eq!(state.rounds.wins, [1, 0]);
        assert!(events.contains(&DuelEvent::Knockout { side: Side::P2 }));

        // Robots are frozen while the round is over
        let p2_x = state.p2.x;
        for _ in 0..179 {
            state.update(&idle(), &light(), tick_delta());
        }
        assert_eq!(state.p2.x, p2_x);
        assert!(state.rounds.round_over);

        let events = state.update(&idle(), &idle(), tick_delta());
        assert_eq!(events, vec![DuelEvent::RoundStarted { round: 2 }]);
        assert!(!state.rounds.round_over);
        assert_eq!(state.p1.hp, 100);
        assert_eq!(state.p2.hp, 100);
        assert_eq!(state.p1.power, 100);
        assert_eq!(state.p1.x, P1_SPAWN_X);
        assert_eq!(state.p2.x, P2_SPAWN_X);
        assert_eq!(state.p1.action, ActionState::Idle);
        assert!(state.effects.is_empty());
        assert_eq!(state.rounds.intro_timer, 120);
    }

    #[test]
    fn test_match_over_is_terminal() {
        let mut state = GameState::new(MatchSetup::from_ids("atlas", "bolt", Some(1)));
        face_off(&mut state);
        state.p2.hp = 1;
        let events = land_p1_light(&mut state);

        assert!(state.rounds.match_over);
        assert_eq!(state.rounds.round_cooldown, 240);
        assert_eq!(state.winner(), Some(Side::P1));
        assert!(events.contains(&DuelEvent::MatchOver {
            winner: Some(Side::P1)
        }));

        let p1 = state.p1.clone();
        let sparks = state.effects.sparks.len();
        assert!(sparks > 0);
        let right = InputState {
            right: true,
            ..Default::default()
        };
        for _ in 0..300 {
            state.update(&right, &right, tick_delta());
        }
        assert_eq!(state.p1, p1);
        assert_eq!(state.phase(), RoundPhase::MatchOver);
        assert!(state.effects.sparks.is_empty());
    }

    #[test]
    fn test_trade_credits_double_ko() {
        let mut state = GameState::new(MatchSetup::from_ids("atlas", "atlas", Some(2)));
        let reach = state.p1_preset.light.reach;
        state.p1.x = 400.0;
        state.p2.x = 400.0 + state.p1.w / 2.0 + reach;
        state.p1.hp = 1;
        state.p2.hp = 1;

        // Both press on the same tick, so both swings go active together
        let mut events = state.update(&light(), &light(), tick_delta());
        for _ in 0..10 {
            if state.rounds.round_over {
                break;
            }
            events = state.update(&idle(), &idle(), tick_delta());
        }

        assert_eq!(state.p1.hp, 0);
        assert_eq!(state.p2.hp, 0);
        assert_eq!(state.rounds.wins, [1, 1]);
        assert!(events.contains(&DuelEvent::Knockout { side: Side::P1 }));
        assert!(events.contains(&DuelEvent::Knockout { side: Side::P2 }));
    }

    #[test]
    fn test_facing_tracks_opponent() {
        let mut state = GameState::default();
        state.p1.x = 800.0;
        state.p2.x = 200.0;
        state.update(&idle(), &idle(), tick_delta());
        assert_eq!(state.p1.facing, Facing::Left);
        assert_eq!(state.p2.facing, Facing::Right);
    }

    #[test]
    fn test_same_seed_same_particles() {
        let run = || {
            let mut state = GameState::new(MatchSetup::default().with_seed(42));
            face_off(&mut state);
            land_p1_light(&mut state);
            state.effects.clone()
        };
        assert_eq!(run(), run());
    }
}
