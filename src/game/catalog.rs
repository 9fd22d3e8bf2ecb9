//! Character catalog - static per-robot stat sheets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Robots available in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotId {
    /// Balanced brawler with a dash special
    Atlas,
    /// Fast, long laser special
    Bolt,
    /// High jumper with a launching uppercut
    Nova,
    /// Heavy hitter, EMP ring special
    Titan,
}

impl RobotId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotId::Atlas => "atlas",
            RobotId::Bolt => "bolt",
            RobotId::Nova => "nova",
            RobotId::Titan => "titan",
        }
    }
}

impl Default for RobotId {
    fn default() -> Self {
        CATALOG[0].id
    }
}

impl fmt::Display for RobotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an id that is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown robot id: {0}")]
pub struct UnknownRobot(pub String);

impl FromStr for RobotId {
    type Err = UnknownRobot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATALOG
            .iter()
            .find(|p| p.id.as_str().eq_ignore_ascii_case(s.trim()))
            .map(|p| p.id)
            .ok_or_else(|| UnknownRobot(s.to_string()))
    }
}

/// Special move behaviour, matched exhaustively on activation and on hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialKind {
    /// Instant forward velocity burst
    Dash,
    /// Upward launch; a connecting hit knocks the defender down on landing
    Uppercut,
    /// Long reach with a small backward recoil
    Laser,
    /// Emits an expanding ring effect
    Emp,
}

/// Light or heavy attack stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveSpec {
    pub damage: u32,
    /// Horizontal hit radius, also projected in front of the body
    pub reach: f32,
    pub knockback: f32,
    /// Total length of the move in ticks
    pub duration: u32,
}

/// Special attack stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpecialSpec {
    /// Power spent on activation
    pub cost: u32,
    pub damage: u32,
    pub reach: f32,
    pub knockback: f32,
    pub duration: u32,
    pub kind: SpecialKind,
}

impl SpecialSpec {
    pub fn as_move(&self) -> MoveSpec {
        MoveSpec {
            damage: self.damage,
            reach: self.reach,
            knockback: self.knockback,
            duration: self.duration,
        }
    }
}

/// Immutable stat sheet for one robot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterPreset {
    pub id: RobotId,
    pub name: &'static str,
    /// Cosmetic only
    pub color: &'static str,
    /// Horizontal speed per tick
    pub speed: f32,
    /// Jump impulse
    pub jump: f32,
    /// Gravity added to vertical velocity each tick
    pub gravity: f32,
    pub light: MoveSpec,
    pub heavy: MoveSpec,
    pub special: SpecialSpec,
}

static CATALOG: [CharacterPreset; 4] = [
    CharacterPreset {
        id: RobotId::Atlas,
        name: "Atlas",
        color: "#7dd3fc",
        speed: 4.5,
        jump: 14.0,
        gravity: 0.8,
        light: MoveSpec { damage: 6, reach: 40.0, knockback: 6.0, duration: 10 },
        heavy: MoveSpec { damage: 12, reach: 60.0, knockback: 9.0, duration: 16 },
        special: SpecialSpec {
            cost: 30,
            damage: 18,
            reach: 70.0,
            knockback: 14.0,
            duration: 24,
            kind: SpecialKind::Dash,
        },
    },
    CharacterPreset {
        id: RobotId::Bolt,
        name: "Bolt",
        color: "#facc15",
        speed: 5.2,
        jump: 13.0,
        gravity: 0.85,
        light: MoveSpec { damage: 5, reach: 44.0, knockback: 5.0, duration: 10 },
        heavy: MoveSpec { damage: 10, reach: 62.0, knockback: 8.0, duration: 16 },
        special: SpecialSpec {
            cost: 28,
            damage: 16,
            reach: 84.0,
            knockback: 12.0,
            duration: 22,
            kind: SpecialKind::Laser,
        },
    },
    CharacterPreset {
        id: RobotId::Nova,
        name: "Nova",
        color: "#f472b6",
        speed: 4.2,
        jump: 15.0,
        gravity: 0.78,
        light: MoveSpec { damage: 6, reach: 46.0, knockback: 6.0, duration: 12 },
        heavy: MoveSpec { damage: 11, reach: 64.0, knockback: 9.0, duration: 18 },
        special: SpecialSpec {
            cost: 35,
            damage: 20,
            reach: 72.0,
            knockback: 16.0,
            duration: 26,
            kind: SpecialKind::Uppercut,
        },
    },
    CharacterPreset {
        id: RobotId::Titan,
        name: "Titan",
        color: "#a78bfa",
        speed: 3.8,
        jump: 12.5,
        gravity: 0.9,
        light: MoveSpec { damage: 7, reach: 40.0, knockback: 7.0, duration: 12 },
        heavy: MoveSpec { damage: 14, reach: 58.0, knockback: 12.0, duration: 18 },
        special: SpecialSpec {
            cost: 32,
            damage: 0,
            reach: 0.0,
            knockback: 0.0,
            duration: 20,
            kind: SpecialKind::Emp,
        },
    },
];

/// All presets in catalog order
pub fn all() -> &'static [CharacterPreset] {
    &CATALOG
}

/// Preset for a known robot
pub fn preset(id: RobotId) -> &'static CharacterPreset {
    CATALOG
        .iter()
        .find(|p| p.id == id)
        .unwrap_or(&CATALOG[0])
}

/// Preset for a raw identifier; unknown ids fall back to the first entry
pub fn lookup(id: &str) -> &'static CharacterPreset {
    id.parse::<RobotId>()
        .map(preset)
        .unwrap_or(&CATALOG[0])
}
