//! Table-driven animation playback.
//!
//! Stands in for the real animation system: each key has an authored
//! duration and playback advances with the driver's clock. Keys with no
//! table entry report [`AnimStatus::Missing`] so the engine can degrade.

use std::collections::HashMap;

use battle_core::{AnimStatus, AnimationDriver, EntityId, Millis};

#[derive(Debug, Clone)]
struct Playback {
    key: String,
    elapsed: Millis,
}

/// Animation driver backed by a duration table.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnimations {
    durations: HashMap<String, Millis>,
    playing: HashMap<EntityId, Playback>,
}

impl ScriptedAnimations {
    /// Empty table: every key is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-seeded with the stock battle animation set.
    pub fn standard() -> Self {
        let mut anims = Self::new();
        for (key, ms) in [
            ("idle", 200.0),
            ("run", 250.0),
            ("crouch", 150.0),
            ("leap", 400.0),
            ("stomp", 250.0),
            ("stomp_weak", 250.0),
            ("whiff", 350.0),
            ("hurt", 300.0),
            ("flip", 250.0),
            ("spin", 300.0),
            ("hammer_raise", 300.0),
            ("hammer_slam", 250.0),
            ("hammer_twirl", 250.0),
            ("backflip", 300.0),
        ] {
            anims.set_duration(key, Millis::new(ms));
        }
        anims
    }

    pub fn set_duration(&mut self, key: impl Into<String>, duration: Millis) {
        self.durations.insert(key.into(), duration);
    }

    /// Advances all playing animations by one tick.
    pub fn advance(&mut self, dt: Millis) {
        for playback in self.playing.values_mut() {
            playback.elapsed += dt;
        }
    }
}

impl AnimationDriver for ScriptedAnimations {
    fn play(&mut self, entity: EntityId, key: &str) {
        self.playing.insert(
            entity,
            Playback {
                key: key.to_owned(),
                elapsed: Millis::ZERO,
            },
        );
    }

    fn status(&self, entity: EntityId, key: &str) -> AnimStatus {
        let Some(duration) = self.durations.get(key) else {
            return AnimStatus::Missing;
        };
        match self.playing.get(&entity) {
            Some(playback) if playback.key == key => {
                if playback.elapsed >= *duration {
                    AnimStatus::Finished
                } else {
                    AnimStatus::Playing
                }
            }
            // Not playing (or replaced): whatever ran has finished.
            _ => AnimStatus::Finished,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_finishes_after_its_duration() {
        let mut anims = ScriptedAnimations::standard();
        let e = EntityId(1);
        anims.play(e, "run");
        assert_eq!(anims.status(e, "run"), AnimStatus::Playing);
        anims.advance(Millis::new(250.0));
        assert_eq!(anims.status(e, "run"), AnimStatus::Finished);
    }

    #[test]
    fn unknown_key_reports_missing() {
        let anims = ScriptedAnimations::new();
        assert_eq!(anims.status(EntityId(1), "no_such"), AnimStatus::Missing);
    }
}
