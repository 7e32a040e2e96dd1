//! Session phase enumeration

use std::fmt;

use serde::{Deserialize, Serialize};

/// Token reported for a phase code the engine does not know about
pub const UNKNOWN_PHASE: &str = "UNKNOWN";

/// Current session kind. Closed set: there is no long-break phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "IDLE")]
    Idle,
    #[serde(rename = "WORK")]
    Work,
    #[serde(rename = "BREAK_SHORT")]
    Break,
}

impl Phase {
    /// Stable token consumed by display collaborators
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "IDLE",
            Phase::Work => "WORK",
            Phase::Break => "BREAK_SHORT",
        }
    }

    /// Numeric code of the phase (0 = idle, 1 = work, 2 = short break)
    pub fn code(&self) -> u8 {
        match self {
            Phase::Idle => 0,
            Phase::Work => 1,
            Phase::Break => 2,
        }
    }

    /// Look up a phase by its numeric code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Phase::Idle),
            1 => Some(Phase::Work),
            2 => Some(Phase::Break),
            _ => None,
        }
    }

    /// Whether a session is in progress (paused or not)
    pub fn is_active(&self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status light colour for a phase and pause flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorColor {
    Blue,
    Red,
    Orange,
    Green,
    Yellow,
}

impl IndicatorColor {
    /// Idle is blue; work is red (orange when paused); break is green (yellow when paused)
    pub fn for_phase(phase: Phase, paused: bool) -> Self {
        match (phase, paused) {
            (Phase::Idle, _) => IndicatorColor::Blue,
            (Phase::Work, false) => IndicatorColor::Red,
            (Phase::Work, true) => IndicatorColor::Orange,
            (Phase::Break, false) => IndicatorColor::Green,
            (Phase::Break, true) => IndicatorColor::Yellow,
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            IndicatorColor::Blue => [0, 0, 255],
            IndicatorColor::Red => [255, 0, 0],
            IndicatorColor::Orange => [255, 165, 0],
            IndicatorColor::Green => [0, 255, 0],
            IndicatorColor::Yellow => [255, 255, 0],
        }
    }
}

/// Resolve a numeric phase code to its token, falling back to [`UNKNOWN_PHASE`]
pub fn phase_name_for_code(code: u8) -> &'static str {
    Phase::from_code(code)
        .map(|phase| phase.as_str())
        .unwrap_or(UNKNOWN_PHASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_stable() {
        assert_eq!(Phase::Idle.as_str(), "IDLE");
        assert_eq!(Phase::Work.as_str(), "WORK");
        assert_eq!(Phase::Break.as_str(), "BREAK_SHORT");
        assert_eq!(Phase::Break.to_string(), "BREAK_SHORT");
    }

    #[test]
    fn codes_map_back_to_phases() {
        for phase in [Phase::Idle, Phase::Work, Phase::Break] {
            assert_eq!(Phase::from_code(phase.code()), Some(phase));
        }
        assert_eq!(Phase::from_code(3), None);
    }

    #[test]
    fn unknown_code_has_sentinel_name() {
        assert_eq!(phase_name_for_code(1), "WORK");
        assert_eq!(phase_name_for_code(3), UNKNOWN_PHASE);
        assert_eq!(phase_name_for_code(u8::MAX), "UNKNOWN");
    }

    #[test]
    fn indicator_follows_phase_and_pause() {
        assert_eq!(IndicatorColor::for_phase(Phase::Idle, false), IndicatorColor::Blue);
        assert_eq!(IndicatorColor::for_phase(Phase::Work, false), IndicatorColor::Red);
        assert_eq!(IndicatorColor::for_phase(Phase::Work, true), IndicatorColor::Orange);
        assert_eq!(IndicatorColor::for_phase(Phase::Break, false), IndicatorColor::Green);
        assert_eq!(IndicatorColor::for_phase(Phase::Break, true), IndicatorColor::Yellow);
        assert_eq!(IndicatorColor::Orange.rgb(), [255, 165, 0]);
    }

    #[test]
    fn serializes_as_token() {
        let json = serde_json::to_string(&Phase::Break).unwrap();
        assert_eq!(json, "\"BREAK_SHORT\"");
        let back: Phase = serde_json::from_str("\"WORK\"").unwrap();
        assert_eq!(back, Phase::Work);
    }
}
