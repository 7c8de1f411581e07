//! Persisted best distance
//!
//! A single monotonic-max score kept in LocalStorage across runs.

use serde::{Deserialize, Serialize};

/// Best distance achieved on this machine
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u32,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "neon_runner_highscore";

    /// Start with no record
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a finished run's score. Returns true when it sets a new record.
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(score) = serde_json::from_str::<HighScore>(&json) {
                    log::info!("Loaded high score: {}", score.best);
                    return score;
                }
            }
        }

        log::info!("No high score found, starting fresh");
        Self::new()
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("High score saved ({})", self.best);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_the_max() {
        let mut hs = HighScore::new();
        assert!(hs.record(100));
        assert!(!hs.record(40));
        assert_eq!(hs.best, 100);
        assert!(hs.record(250));
        assert_eq!(hs.best, 250);
    }

    #[test]
    fn test_equal_score_is_not_a_new_record() {
        let mut hs = HighScore { best: 100 };
        assert!(!hs.record(100));
        assert_eq!(hs.best, 100);
    }
}
