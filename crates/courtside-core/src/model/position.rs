// Basketball positions and best-ball lineup slots.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Basketball positions a player can be eligible at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Position {
    PointGuard,
    ShootingGuard,
    SmallForward,
    PowerForward,
    Center,
}

impl Position {
    /// Parse a single position label.
    ///
    /// Accepts the provider's abbreviations, case-insensitively:
    /// "PG", "SG", "SF", "PF", "C".
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PG" => Some(Position::PointGuard),
            "SG" => Some(Position::ShootingGuard),
            "SF" => Some(Position::SmallForward),
            "PF" => Some(Position::PowerForward),
            "C" => Some(Position::Center),
            _ => None,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::PointGuard => "PG",
            Position::ShootingGuard => "SG",
            Position::SmallForward => "SF",
            Position::PowerForward => "PF",
            Position::Center => "C",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// Parse a comma-separated position list such as `"PG,SG"`.
///
/// Unknown labels (e.g. "G", "F", "Util") are dropped; duplicates collapse
/// to their first occurrence so the list order stays as given.
pub fn parse_position_list(s: &str) -> Vec<Position> {
    let mut positions = Vec::new();
    for label in s.split(',') {
        if let Some(pos) = Position::from_str_pos(label) {
            if !positions.contains(&pos) {
                positions.push(pos);
            }
        }
    }
    positions
}

/// Render a position list back to the provider's `"PG,SG"` form.
pub fn format_position_list(positions: &[Position]) -> String {
    positions
        .iter()
        .map(|p| p.display_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Serde adapter storing a `Vec<Position>` as its comma-separated label.
pub mod position_list {
    use super::*;

    pub fn serialize<S: Serializer>(positions: &[Position], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format_position_list(positions))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Position>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.as_deref().map(parse_position_list).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Best-ball slots
// ---------------------------------------------------------------------------

/// The lineup slot a player occupies for one week.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum BestBallSlot {
    #[serde(rename = "PG")]
    PointGuard,
    #[serde(rename = "SG")]
    ShootingGuard,
    #[serde(rename = "SF")]
    SmallForward,
    #[serde(rename = "PF")]
    PowerForward,
    #[serde(rename = "C")]
    Center,
    #[serde(rename = "UTIL1")]
    Util1,
    #[serde(rename = "UTIL2")]
    Util2,
    #[default]
    Bench,
}

impl BestBallSlot {
    /// Decision slots in fill order. Bench is not a decision: it is
    /// whatever is left over.
    pub const LINEUP: [BestBallSlot; 7] = [
        BestBallSlot::PointGuard,
        BestBallSlot::ShootingGuard,
        BestBallSlot::SmallForward,
        BestBallSlot::PowerForward,
        BestBallSlot::Center,
        BestBallSlot::Util1,
        BestBallSlot::Util2,
    ];

    /// The position a player must hold to fill this slot. `None` for the
    /// UTIL slots (any eligible player) and for Bench.
    pub fn required_position(&self) -> Option<Position> {
        match self {
            BestBallSlot::PointGuard => Some(Position::PointGuard),
            BestBallSlot::ShootingGuard => Some(Position::ShootingGuard),
            BestBallSlot::SmallForward => Some(Position::SmallForward),
            BestBallSlot::PowerForward => Some(Position::PowerForward),
            BestBallSlot::Center => Some(Position::Center),
            BestBallSlot::Util1 | BestBallSlot::Util2 | BestBallSlot::Bench => None,
        }
    }

    pub fn is_bench(&self) -> bool {
        matches!(self, BestBallSlot::Bench)
    }

    pub fn is_util(&self) -> bool {
        matches!(self, BestBallSlot::Util1 | BestBallSlot::Util2)
    }

    /// Whether a player with the given position set may fill this slot.
    pub fn accepts(&self, positions: &[Position]) -> bool {
        match self {
            BestBallSlot::Bench => true,
            _ => match self.required_position() {
                Some(pos) => positions.contains(&pos),
                None => true,
            },
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            BestBallSlot::PointGuard => "PG",
            BestBallSlot::ShootingGuard => "SG",
            BestBallSlot::SmallForward => "SF",
            BestBallSlot::PowerForward => "PF",
            BestBallSlot::Center => "C",
            BestBallSlot::Util1 => "UTIL1",
            BestBallSlot::Util2 => "UTIL2",
            BestBallSlot::Bench => "Bench",
        }
    }
}

impl fmt::Display for BestBallSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_pos_standard_positions() {
        assert_eq!(Position::from_str_pos("PG"), Some(Position::PointGuard));
        assert_eq!(Position::from_str_pos("SG"), Some(Position::ShootingGuard));
        assert_eq!(Position::from_str_pos("SF"), Some(Position::SmallForward));
        assert_eq!(Position::from_str_pos("PF"), Some(Position::PowerForward));
        assert_eq!(Position::from_str_pos("C"), Some(Position::Center));
    }

    #[test]
    fn from_str_pos_case_insensitive_and_trimmed() {
        assert_eq!(Position::from_str_pos(" pg "), Some(Position::PointGuard));
        assert_eq!(Position::from_str_pos("c"), Some(Position::Center));
    }

    #[test]
    fn from_str_pos_invalid() {
        assert_eq!(Position::from_str_pos("G"), None);
        assert_eq!(Position::from_str_pos(""), None);
        assert_eq!(Position::from_str_pos("UTIL"), None);
    }

    #[test]
    fn parse_position_list_multi() {
        assert_eq!(
            parse_position_list("PG,SG"),
            vec![Position::PointGuard, Position::ShootingGuard]
        );
        assert_eq!(
            parse_position_list("SF, PF ,C"),
            vec![Position::SmallForward, Position::PowerForward, Position::Center]
        );
    }

    #[test]
    fn parse_position_list_drops_unknown_and_duplicates() {
        assert_eq!(parse_position_list("G,PG,F,PG"), vec![Position::PointGuard]);
        assert!(parse_position_list("").is_empty());
    }

    #[test]
    fn format_position_list_roundtrip() {
        let positions = vec![Position::PowerForward, Position::Center];
        assert_eq!(format_position_list(&positions), "PF,C");
        assert_eq!(parse_position_list(&format_position_list(&positions)), positions);
    }

    #[test]
    fn core_slots_require_their_position() {
        let guard = [Position::PointGuard, Position::ShootingGuard];
        assert!(BestBallSlot::PointGuard.accepts(&guard));
        assert!(BestBallSlot::ShootingGuard.accepts(&guard));
        assert!(!BestBallSlot::SmallForward.accepts(&guard));
        assert!(!BestBallSlot::Center.accepts(&guard));
    }

    #[test]
    fn util_slots_accept_anyone() {
        assert!(BestBallSlot::Util1.accepts(&[Position::Center]));
        assert!(BestBallSlot::Util2.accepts(&[]));
    }

    #[test]
    fn lineup_order_is_core_then_util() {
        assert_eq!(BestBallSlot::LINEUP[0], BestBallSlot::PointGuard);
        assert_eq!(BestBallSlot::LINEUP[4], BestBallSlot::Center);
        assert!(BestBallSlot::LINEUP[5].is_util());
        assert!(BestBallSlot::LINEUP[6].is_util());
        assert!(!BestBallSlot::LINEUP.contains(&BestBallSlot::Bench));
    }

    #[test]
    fn slot_serializes_as_provider_label() {
        assert_eq!(serde_json::to_string(&BestBallSlot::Util1).unwrap(), "\"UTIL1\"");
        assert_eq!(serde_json::to_string(&BestBallSlot::Bench).unwrap(), "\"Bench\"");
        let parsed: BestBallSlot = serde_json::from_str("\"SF\"").unwrap();
        assert_eq!(parsed, BestBallSlot::SmallForward);
    }

    #[test]
    fn default_slot_is_bench() {
        assert_eq!(BestBallSlot::default(), BestBallSlot::Bench);
    }
}
