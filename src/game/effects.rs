//! Visual feedback entities: sparks, debris parts, ring effects, screen shake
//!
//! Nothing in here feeds back into combat. The resolver only emits.

use rand::Rng;
use serde::{Deserialize, Serialize};

const SPARK_COLOR: &str = "#ffd166";
const EMP_COLOR: &str = "#60a5fa";

const SPARK_GRAVITY: f32 = 0.2;
const PART_GRAVITY: f32 = 0.4;
/// Parts bounce this far above the floor line
const PART_FLOOR_OFFSET: f32 = 8.0;
/// Parts are dropped a little before zero life to avoid flicker at the bounce
const PART_CULL_LIFE: f32 = 0.5;

pub const SPARKS_PER_HIT: usize = 6;

/// Impact spark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spark {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub color: String,
}

/// Debris chunk knocked off a robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub rot: f32,
    pub vr: f32,
    pub life: f32,
    pub size: f32,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    EmpRing,
}

/// Expanding ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub vr: f32,
    pub life: f32,
    pub color: String,
}

/// All short-lived feedback entities plus screen shake
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectPool {
    pub sparks: Vec<Spark>,
    pub parts: Vec<Part>,
    pub effects: Vec<Effect>,
    /// Current shake magnitude
    pub shake: f32,
    /// Ticks of shake remaining
    pub shake_time: u32,
}

impl EffectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sparks and debris at a struck robot
    pub fn emit_hit<R: Rng>(&mut self, x: f32, top: f32, height: f32, color: &str, rng: &mut R) {
        for _ in 0..SPARKS_PER_HIT {
            self.sparks.push(Spark {
                x,
                y: top + height * 0.6,
                vx: (rng.gen::<f32>() - 0.5) * 6.0,
                vy: -rng.gen::<f32>() * 5.0,
                life: 16.0 + rng.gen::<f32>() * 10.0,
                color: SPARK_COLOR.to_string(),
            });
        }

        let parts = rng.gen_range(2..=4);
        for _ in 0..parts {
            self.parts.push(Part {
                x,
                y: top + height * 0.4,
                vx: (rng.gen::<f32>() - 0.5) * 4.0,
                vy: -rng.gen::<f32>() * 3.0,
                rot: rng.gen::<f32>() * std::f32::consts::PI,
                vr: (rng.gen::<f32>() - 0.5) * 0.2,
                life: 50.0 + rng.gen::<f32>() * 40.0,
                size: 4.0 + rng.gen::<f32>() * 5.0,
                color: color.to_string(),
            });
        }
    }

    pub fn emit_emp_ring(&mut self, x: f32, y: f32) {
        self.effects.push(Effect {
            kind: EffectKind::EmpRing,
            x,
            y,
            r: 10.0,
            vr: 6.0,
            life: 40.0,
            color: EMP_COLOR.to_string(),
        });
    }

    /// Raise shake to at least the given strength and duration
    pub fn add_shake(&mut self, strength: f32, ticks: u32) {
        self.shake_time = self.shake_time.max(ticks);
        self.shake = self.shake.max(strength);
    }

    /// Advance one tick and cull dead entities
    pub fn advance(&mut self, floor: f32) {
        for s in &mut self.sparks {
            s.x += s.vx;
            s.y += s.vy;
            s.vy += SPARK_GRAVITY;
            s.life -= 1.0;
        }
        self.sparks.retain(|s| s.life > 0.0);

        let bounce_y = floor - PART_FLOOR_OFFSET;
        for p in &mut self.parts {
            p.x += p.vx;
            p.y += p.vy;
            p.vy += PART_GRAVITY;
            p.rot += p.vr;
            p.life -= 1.0;
            if p.y > bounce_y {
                p.y = bounce_y;
                p.vy *= -0.4;
                p.vx *= 0.8;
                p.vr *= 0.8;
            }
        }
        self.parts.retain(|p| p.life > PART_CULL_LIFE);

        for e in &mut self.effects {
            match e.kind {
                EffectKind::EmpRing => {
                    e.r += e.vr;
                    e.life -= 1.0;
                    e.vr *= 0.98;
                }
            }
        }
        self.effects.retain(|e| e.life > 0.0);

        if self.shake_time > 0 {
            self.shake_time -= 1;
            self.shake *= 0.9;
            if self.shake < 0.2 {
                self.shake = 0.0;
            }
        } else {
            self.shake = 0.0;
        }
    }

    pub fn clear(&mut self) {
        self.sparks.clear();
        self.parts.clear();
        self.effects.clear();
    }

    pub fn len(&self) -> usize {
        self.sparks.len() + self.parts.len() + self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_emit_hit_counts() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let mut pool = EffectPool::new();
            pool.emit_hit(500.0, 360.0, 120.0, "#fff", &mut rng);
            assert_eq!(pool.sparks.len(), SPARKS_PER_HIT);
            assert!((2..=4).contains(&pool.parts.len()));
        }
    }

    #[test]
    fn test_sparks_expire() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut pool = EffectPool::new();
        pool.emit_hit(500.0, 360.0, 120.0, "#fff", &mut rng);

        // Longest spark lives under 26 ticks
        for _ in 0..26 {
            pool.advance(480.0);
        }
        assert!(pool.sparks.is_empty());
        assert!(!pool.parts.is_empty());

        for _ in 0..90 {
            pool.advance(480.0);
        }
        assert!(pool.is_empty());
    }

    #[test]
    fn test_parts_bounce_on_floor() {
        let mut pool = EffectPool::new();
        pool.parts.push(Part {
            x: 0.0,
            y: 470.0,
            vx: 2.0,
            vy: 5.0,
            rot: 0.0,
            vr: 0.1,
            life: 60.0,
            size: 4.0,
            color: "#fff".to_string(),
        });
        pool.advance(480.0);
        let p = &pool.parts[0];
        assert_eq!(p.y, 472.0);
        assert!(p.vy < 0.0);
        assert!((p.vx - 1.6).abs() < 1e-5);
    }

    #[test]
    fn test_emp_ring_grows_then_expires() {
        let mut pool = EffectPool::new();
        pool.emit_emp_ring(100.0, 200.0);
        pool.advance(480.0);
        assert_eq!(pool.effects[0].r, 16.0);
        for _ in 0..39 {
            pool.advance(480.0);
        }
        assert!(pool.effects.is_empty());
    }

    #[test]
    fn test_shake_is_monotonic_and_decays() {
        let mut pool = EffectPool::new();
        pool.add_shake(8.0, 8);
        pool.add_shake(4.0, 2);
        assert_eq!(pool.shake, 8.0);
        assert_eq!(pool.shake_time, 8);

        for _ in 0..8 {
            pool.advance(480.0);
        }
        assert_eq!(pool.shake_time, 0);
        pool.advance(480.0);
        assert_eq!(pool.shake, 0.0);
    }
}
