//! Falling-object simulation for the reaction exercise.
//!
//! Coordinates are percentages of the play field: `x` runs left to right,
//! `y` top to bottom. The field is advanced one frame at a time by
//! [`ReactionField::tick`]; the host decides the frame rate, and fall speeds
//! are tuned for roughly 60 frames per second.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{LevelParams, ObjectId};

/// Catcher travel limits.
pub const CATCHER_MIN_X: f64 = 10.0;
pub const CATCHER_MAX_X: f64 = 90.0;
/// Vertical band in which an object can be caught.
pub const CAPTURE_BAND: (f64, f64) = (85.0, 95.0);
/// Maximum lateral distance between an object and the catcher for a catch.
pub const CAPTURE_RADIUS: f64 = 15.0;
/// Objects at or below this height have left the field.
pub const FIELD_BOTTOM: f64 = 100.0;
pub const HAZARD_PROBABILITY: f64 = 0.3;
/// Upper bound of the random speed added to the level's base speed.
pub const SPEED_JITTER: f64 = 0.2;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReactionError {
    #[error("base speed must be positive and finite, got {0}")]
    InvalidBaseSpeed(f64),
    #[error("spawn rate must be positive and finite, got {0} ms")]
    InvalidSpawnRate(f64),
}

//
// ─── OBJECTS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Reward,
    Hazard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallingObject {
    id: ObjectId,
    x: f64,
    y: f64,
    kind: ObjectKind,
    speed: f64,
}

impl FallingObject {
    #[must_use]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Lateral position, `0..=100`.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical position, `0..=100`.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Distance fallen per frame.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    fn in_capture_band(&self) -> bool {
        (CAPTURE_BAND.0..=CAPTURE_BAND.1).contains(&self.y)
    }
}

/// The player-controlled receiver at the bottom of the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Catcher {
    x: f64,
}

impl Default for Catcher {
    fn default() -> Self {
        Self { x: 50.0 }
    }
}

impl Catcher {
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Jump straight to a pointer position. NaN input is ignored.
    pub fn move_to(&mut self, x: f64) {
        if !x.is_nan() {
            self.x = x.clamp(CATCHER_MIN_X, CATCHER_MAX_X);
        }
    }

    fn reaches(&self, object: &FallingObject) -> bool {
        (object.x - self.x).abs() <= CAPTURE_RADIUS
    }
}

//
// ─── FIELD ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    pub id: ObjectId,
    pub kind: ObjectKind,
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub spawned: Option<ObjectId>,
    pub caught: Vec<Capture>,
    /// Objects that fell past the bottom edge. Missing is never penalised.
    pub missed: usize,
}

/// Live objects, the catcher, and the spawn timer.
#[derive(Debug, Clone)]
pub struct ReactionField {
    base_speed: f64,
    spawn_rate_ms: f64,
    since_spawn_ms: f64,
    has_spawned: bool,
    next_id: u64,
    objects: Vec<FallingObject>,
    catcher: Catcher,
}

impl ReactionField {
    /// # Errors
    ///
    /// Returns a `ReactionError` if the base speed or spawn rate is not a
    /// positive finite number.
    pub fn new(params: &LevelParams) -> Result<Self, ReactionError> {
        let base_speed = params.base_speed();
        if !(base_speed.is_finite() && base_speed > 0.0) {
            return Err(ReactionError::InvalidBaseSpeed(base_speed));
        }
        let spawn_rate_ms = params.spawn_rate_ms();
        if !(spawn_rate_ms.is_finite() && spawn_rate_ms > 0.0) {
            return Err(ReactionError::InvalidSpawnRate(spawn_rate_ms));
        }
        Ok(Self {
            base_speed,
            spawn_rate_ms,
            since_spawn_ms: 0.0,
            has_spawned: false,
            next_id: 0,
            objects: Vec::new(),
            catcher: Catcher::default(),
        })
    }

    #[must_use]
    pub fn objects(&self) -> &[FallingObject] {
        &self.objects
    }

    #[must_use]
    pub fn catcher(&self) -> Catcher {
        self.catcher
    }

    pub fn pointer_move(&mut self, x: f64) {
        self.catcher.move_to(x);
    }

    /// Add an object at the top of the field.
    pub fn spawn(&mut self, kind: ObjectKind, x: f64, speed: f64) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        self.objects.push(FallingObject {
            id,
            x: x.clamp(0.0, 100.0),
            y: 0.0,
            kind,
            speed,
        });
        id
    }

    /// Advance one frame: spawn, fall, catch, then drop what left the field.
    ///
    /// `delta_ms` only feeds the spawn timer; fall distance is per frame.
    pub fn tick<R: Rng + ?Sized>(&mut self, delta_ms: f64, rng: &mut R) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.since_spawn_ms += delta_ms;
        }
        if !self.has_spawned || self.since_spawn_ms > self.spawn_rate_ms {
            outcome.spawned = Some(self.spawn_random(rng));
            self.has_spawned = true;
            self.since_spawn_ms = 0.0;
        }

        for object in &mut self.objects {
            object.y += object.speed;
        }

        let catcher = self.catcher;
        let mut caught = Vec::new();
        let mut missed = 0;
        self.objects.retain(|object| {
            if object.in_capture_band() && catcher.reaches(object) {
                caught.push(Capture {
                    id: object.id,
                    kind: object.kind,
                });
                false
            } else if object.y >= FIELD_BOTTOM {
                missed += 1;
                false
            } else {
                true
            }
        });
        outcome.caught = caught;
        outcome.missed = missed;
        outcome
    }

    fn spawn_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ObjectId {
        let kind = if rng.random_bool(HAZARD_PROBABILITY) {
            ObjectKind::Hazard
        } else {
            ObjectKind::Reward
        };
        let x = rng.random_range(CATCHER_MIN_X..=CATCHER_MAX_X);
        let speed = self.base_speed + rng.random_range(0.0..SPEED_JITTER);
        self.spawn(kind, x, speed)
    }
}
