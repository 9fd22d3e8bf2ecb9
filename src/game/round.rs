//! Round and match progression

use serde::{Deserialize, Serialize};
use tracing::info;

use super::input::Side;

/// Rounds needed to take the match when no option is given
pub const DEFAULT_ROUNDS_TO_WIN: u32 = 2;
/// Banner ticks at the start of each round
pub const ROUND_INTRO_TICKS: u32 = 120;
/// Pause between a KO and the next round
pub const ROUND_COOLDOWN_TICKS: u32 = 180;
/// Pause after the deciding KO
pub const MATCH_OVER_COOLDOWN_TICKS: u32 = 240;

/// Observable phase of the duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RoundPhase {
    /// Round banner is showing; combat already runs
    Intro { remaining: u32 },
    Fighting,
    /// Impact freeze
    Hitstop { remaining: u32 },
    /// KO landed, waiting for the next round
    RoundOver { cooldown: u32 },
    /// Terminal
    MatchOver,
}

/// Round counters, win tallies and transition timers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundController {
    pub round: u32,
    /// Round wins for P1 and P2
    pub wins: [u32; 2],
    pub rounds_to_win: u32,
    pub round_over: bool,
    pub match_over: bool,
    pub round_cooldown: u32,
    pub intro_timer: u32,
}

impl RoundController {
    /// Non-positive rounds_to_win falls back to the default
    pub fn new(rounds_to_win: u32) -> Self {
        let rounds_to_win = if rounds_to_win > 0 {
            rounds_to_win
        } else {
            DEFAULT_ROUNDS_TO_WIN
        };

        Self {
            round: 1,
            wins: [0, 0],
            rounds_to_win,
            round_over: false,
            match_over: false,
            round_cooldown: 0,
            intro_timer: ROUND_INTRO_TICKS,
        }
    }

    /// Credit every KO detected in one tick.
    ///
    /// Each knocked-out side gives its opponent a round win, so a double KO
    /// credits both. Ignored once the round is already over.
    /// Returns true if this call ended the round.
    pub fn credit_kos(&mut self, knocked_out: &[Side]) -> bool {
        if self.round_over || knocked_out.is_empty() {
            return false;
        }

        for side in knocked_out {
            self.wins[side.opponent().index()] += 1;
        }
        self.round_over = true;

        if self.wins.iter().any(|&w| w >= self.rounds_to_win) {
            self.match_over = true;
            self.round_cooldown = MATCH_OVER_COOLDOWN_TICKS;
            info!(
                round = self.round,
                p1_wins = self.wins[0],
                p2_wins = self.wins[1],
                "Match over"
            );
        } else {
            self.round_cooldown = ROUND_COOLDOWN_TICKS;
            info!(
                round = self.round,
                p1_wins = self.wins[0],
                p2_wins = self.wins[1],
                "Round over"
            );
        }
        true
    }

    /// Count down the between-round pause.
    /// Returns true on the tick the next round should start.
    pub fn tick_cooldown(&mut self) -> bool {
        if !self.round_over || self.match_over || self.round_cooldown == 0 {
            return false;
        }
        self.round_cooldown -= 1;
        self.round_cooldown == 0
    }

    pub fn tick_intro(&mut self) {
        self.intro_timer = self.intro_timer.saturating_sub(1);
    }

    /// Move on to the next round
    pub fn begin_next_round(&mut self) {
        self.round += 1;
        self.round_over = false;
        self.round_cooldown = 0;
        self.intro_timer = ROUND_INTRO_TICKS;
        info!(round = self.round, "Round starting");
    }

    pub fn phase(&self, hitstop: u32) -> RoundPhase {
        if self.match_over {
            RoundPhase::MatchOver
        } else if self.round_over {
            RoundPhase::RoundOver {
                cooldown: self.round_cooldown,
            }
        } else if hitstop > 0 {
            RoundPhase::Hitstop { remaining: hitstop }
        } else if self.intro_timer > 0 {
            RoundPhase::Intro {
                remaining: self.intro_timer,
            }
        } else {
            RoundPhase::Fighting
        }
    }

    /// Winner of the match, if decided. A tied double KO on match point
    /// leaves both sides at the threshold and no single winner.
    pub fn winner(&self) -> Option<Side> {
        if !self.match_over {
            return None;
        }
        match (
            self.wins[0] >= self.rounds_to_win,
            self.wins[1] >= self.rounds_to_win,
        ) {
            (true, false) => Some(Side::P1),
            (false, true) => Some(Side::P2),
            _ => None,
        }
    }
}

impl Default for RoundController {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS_TO_WIN)
    }
}
