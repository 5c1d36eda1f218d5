use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealPolicy {
    None,
    Side,
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockMode {
    Slider,
    Button,
}

/// Immutable rule snapshot captured at game creation. Changing settings
/// mid-game is not supported; a new game takes a new snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub include_katanyi: bool,
    pub include_doctor: bool,
    /// Mafia members see each other's identity on the role card.
    pub mafia_know: bool,
    /// true: unanimity (any disagreement means no kill); false: plurality.
    pub mafia_strict_unanimity: bool,
    pub unlock_mode: UnlockMode,
    pub reveal_after_judgement: RevealPolicy,
    pub first_dead_osud: bool,
    /// Offer the no-op masking pick to plain citizens.
    pub mask_citizens: bool,
    pub facts_enabled: bool,
    pub facts_for_all: bool,
    pub facts_no_spoiler: bool,
    /// Minimum on-screen dwell time before "hide and pass" unlocks.
    pub min_screen_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_katanyi: true,
            include_doctor: false,
            mafia_know: true,
            mafia_strict_unanimity: true,
            unlock_mode: UnlockMode::Slider,
            reveal_after_judgement: RevealPolicy::Side,
            first_dead_osud: false,
            mask_citizens: true,
            facts_enabled: true,
            facts_for_all: false,
            facts_no_spoiler: true,
            min_screen_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_the_shipped_defaults() {
        let s = Settings::default();
        assert!(s.include_katanyi);
        assert!(!s.include_doctor);
        assert!(s.mafia_know);
        assert!(s.mafia_strict_unanimity);
        assert_eq!(s.unlock_mode, UnlockMode::Slider);
        assert_eq!(s.reveal_after_judgement, RevealPolicy::Side);
        assert!(!s.first_dead_osud);
        assert!(s.mask_citizens);
        assert!(s.facts_enabled);
        assert!(!s.facts_for_all);
        assert!(s.facts_no_spoiler);
        assert_eq!(s.min_screen_ms, 3000);
    }

    #[test]
    fn reveal_policy_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RevealPolicy::Side).unwrap(),
            "\"side\""
        );
        assert_eq!(
            serde_json::from_str::<RevealPolicy>("\"none\"").unwrap(),
            RevealPolicy::None
        );
    }
}
