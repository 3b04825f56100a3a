use super::history::RoundRecord;
use super::match_state::MatchState;
use crate::model::round::RoundState;
use crate::model::score::{ScoreBoard, TeamScore};
use crate::model::variant::RuleVariant;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const SNAPSHOT_VERSION: u32 = 2;

/// Persisted match record. Every field added after the first layout carries a
/// default so older saves keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub variant: Option<RuleVariant>,
    #[serde(default)]
    pub is_short_game: bool,
    #[serde(default)]
    pub is_tournament_rules: bool,
    #[serde(default)]
    pub is_finals_game: bool,
    pub team_scores: [TeamScore; 2],
    #[serde(default)]
    pub history: Vec<RoundRecord>,
    pub current_round: Option<RoundState>,
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        let variant = state.variant();
        MatchSnapshot {
            version: SNAPSHOT_VERSION,
            variant: Some(variant),
            is_short_game: matches!(variant, RuleVariant::Short),
            is_tournament_rules: variant.is_tournament(),
            is_finals_game: matches!(variant, RuleVariant::TournamentFinals),
            team_scores: state.scores().teams().clone(),
            history: state.history().to_vec(),
            current_round: Some(state.round().clone()),
        }
    }

    pub fn variant(&self) -> RuleVariant {
        self.variant.unwrap_or_else(|| {
            RuleVariant::from_legacy_flags(
                self.is_short_game,
                self.is_tournament_rules,
                self.is_finals_game,
            )
        })
    }

    /// Written by a build with a newer save layout than this one understands.
    pub fn from_newer_release(&self) -> bool {
        self.version > SNAPSHOT_VERSION
    }

    pub fn restore(self) -> MatchState {
        if self.from_newer_release() {
            warn!(
                version = self.version,
                supported = SNAPSHOT_VERSION,
                "save was written by a newer release; unknown fields are ignored"
            );
        } else if self.version < SNAPSHOT_VERSION {
            debug!(version = self.version, "upgrading older save layout");
        }
        let variant = self.variant();
        let scores = ScoreBoard::from_teams(self.team_scores);
        let current_round = match self.current_round {
            Some(round) => round,
            None => MatchState::fresh_round(&scores),
        };
        MatchState::from_parts(variant, scores, self.history, current_round)
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchSnapshot, SNAPSHOT_VERSION};
    use crate::game::confirm::AutoApprove;
    use crate::game::match_state::MatchState;
    use crate::model::bid::Bid;
    use crate::model::player::{PlayerPosition, Team};
    use crate::model::round::RoundPhase;
    use crate::model::variant::RuleVariant;

    fn one_round(variant: RuleVariant) -> MatchState {
        let mut state = MatchState::new(variant);
        for seat in PlayerPosition::LOOP {
            state.set_bid(seat, Bid::Contract(3)).unwrap();
        }
        state.submit_bids(&mut AutoApprove).unwrap();
        state.set_team_tricks(Team::NorthSouth, 8).unwrap();
        state.submit_tricks(&mut AutoApprove).unwrap();
        if variant.is_tournament() {
            state.set_yellow_cards(Team::EastWest, 1).unwrap();
            state.confirm_yellow_cards(&mut AutoApprove).unwrap();
        }
        state.finalize_round(&mut AutoApprove).unwrap();
        state
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let state = one_round(RuleVariant::Short);
        let json = MatchSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"variant\": \"short\""));
        assert!(json.contains("\"is_short_game\": true"));
        assert!(json.contains("\"history\""));
    }

    #[test]
    fn snapshot_roundtrip_restores_match() {
        let mut state = one_round(RuleVariant::Tournament);
        state.set_bid(PlayerPosition::West, Bid::Contract(2)).unwrap();
        let json = MatchSnapshot::to_json(&state).unwrap();
        let restored = MatchSnapshot::from_json(&json).unwrap().restore();
        assert_eq!(restored, state);
        assert_eq!(restored.phase(), RoundPhase::AwaitingBids);
        assert_eq!(restored.scores().team(Team::EastWest).yellow_cards, 1);
    }

    #[test]
    fn snapshot_from_json_fills_missing_fields() {
        let legacy = r#"{
            "is_tournament_rules": true,
            "team_scores": [
                { "name": "Aces", "player_names": ["Alice", "Bob"], "score": 0, "bags": 0 },
                { "name": "Kings", "score": 0, "bags": 0 }
            ],
            "current_round": null
        }"#;

        let snapshot = MatchSnapshot::from_json(legacy).unwrap();
        assert_eq!(snapshot.variant(), RuleVariant::Tournament);
        let state = snapshot.restore();
        assert_eq!(state.scores().team(Team::NorthSouth).name, "Aces");
        assert_eq!(state.round().player(PlayerPosition::North).name, "Alice");
        assert_eq!(state.round().player(PlayerPosition::South).name, "Bob");
        assert_eq!(state.round().player(PlayerPosition::East).name, "Player 3");
        assert_eq!(state.scores().team(Team::EastWest).penalized_yellow_cards, 0);
        assert!(state.history().is_empty());
        assert_eq!(state.phase(), RoundPhase::AwaitingBids);
    }

    #[test]
    fn restore_rebuilds_totals_from_history() {
        let state = one_round(RuleVariant::Regular);
        let mut snapshot = MatchSnapshot::capture(&state);
        snapshot.team_scores[0].score = 12345;
        let restored = snapshot.restore();
        assert_eq!(restored.scores().team(Team::NorthSouth).score, 60);
    }

    #[test]
    fn out_of_range_contract_in_save_is_rejected() {
        let state = one_round(RuleVariant::Regular);
        let json = MatchSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"Contract\": 3"));
        let tampered = json.replace("\"Contract\": 3", "\"Contract\": 200");
        let err = MatchSnapshot::from_json(&tampered).unwrap_err();
        assert!(err.to_string().contains("outside 1..=13"), "{err}");
    }

    #[test]
    fn unsettleable_history_keeps_stored_totals() {
        let state = one_round(RuleVariant::Regular);
        let mut snapshot = MatchSnapshot::capture(&state);
        snapshot.history[0]
            .round
            .edit_bid(PlayerPosition::North, Bid::Contract(200));
        let restored = snapshot.restore();
        assert_eq!(restored.scores(), state.scores());
        assert_eq!(restored.history().len(), 1);
    }

    #[test]
    fn newer_save_layout_is_flagged() {
        let mut snapshot = MatchSnapshot::capture(&one_round(RuleVariant::Regular));
        assert!(!snapshot.from_newer_release());
        snapshot.version = SNAPSHOT_VERSION + 1;
        assert!(snapshot.from_newer_release());
        assert_eq!(snapshot.restore().history().len(), 1);
    }
}
