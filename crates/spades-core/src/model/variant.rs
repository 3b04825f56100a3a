use core::fmt;
use serde::{Deserialize, Serialize};

pub const POINTS_PER_TRICK: i32 = 10;
pub const NELLO_VALUE: i32 = 100;
pub const BLIND_NELLO_VALUE: i32 = 200;
pub const BLIND_NELLO_DEFICIT: i32 = 250;
pub const YELLOW_CARD_PENALTY: i32 = 50;
pub const YELLOW_CARDS_PER_PENALTY: u32 = 2;
pub const TOURNAMENT_ROUND_LIMIT: u32 = 8;

/// Rule set for a match. Every scoring difference between variants is read
/// from here; nothing else branches on the variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleVariant {
    #[default]
    Regular,
    Short,
    Tournament,
    TournamentFinals,
}

impl RuleVariant {
    pub const ALL: [RuleVariant; 4] = [
        RuleVariant::Regular,
        RuleVariant::Short,
        RuleVariant::Tournament,
        RuleVariant::TournamentFinals,
    ];

    pub const fn bag_threshold(self) -> u32 {
        match self {
            RuleVariant::Regular | RuleVariant::TournamentFinals => 10,
            RuleVariant::Short | RuleVariant::Tournament => 5,
        }
    }

    pub const fn bag_penalty(self) -> i32 {
        match self {
            RuleVariant::Regular | RuleVariant::TournamentFinals => 100,
            RuleVariant::Short | RuleVariant::Tournament => 50,
        }
    }

    pub const fn winning_score(self) -> i32 {
        match self {
            RuleVariant::Regular | RuleVariant::TournamentFinals => 500,
            RuleVariant::Short | RuleVariant::Tournament => 250,
        }
    }

    /// Rounds after which the match ends regardless of score.
    pub const fn round_limit(self) -> Option<u32> {
        match self {
            RuleVariant::Tournament => Some(TOURNAMENT_ROUND_LIMIT),
            _ => None,
        }
    }

    pub const fn is_tournament(self) -> bool {
        matches!(self, RuleVariant::Tournament | RuleVariant::TournamentFinals)
    }

    pub const fn allows_blind_nello(self) -> bool {
        !matches!(self, RuleVariant::Tournament)
    }

    /// Tournament tables accept an over-committed bid sheet after confirmation;
    /// everywhere else it is rejected outright.
    pub const fn bid_total_is_hard_limit(self) -> bool {
        !self.is_tournament()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RuleVariant::Regular => "regular",
            RuleVariant::Short => "short",
            RuleVariant::Tournament => "tournament",
            RuleVariant::TournamentFinals => "tournament_finals",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "regular" | "standard" => Some(RuleVariant::Regular),
            "short" => Some(RuleVariant::Short),
            "tournament" => Some(RuleVariant::Tournament),
            "tournament_finals" | "finals" => Some(RuleVariant::TournamentFinals),
            _ => None,
        }
    }

    /// Map the boolean option triple older snapshots stored.
    pub const fn from_legacy_flags(short: bool, tournament: bool, finals: bool) -> Self {
        match (short, tournament, finals) {
            (_, true, true) => RuleVariant::TournamentFinals,
            (_, true, false) => RuleVariant::Tournament,
            (true, false, _) => RuleVariant::Short,
            _ => RuleVariant::Regular,
        }
    }

    pub fn rules_text(self) -> String {
        let mut text = String::from(
            "Spades are always trump. Four players in two partnerships; all 13 tricks are played each round.\n\
             Each player bids tricks; partners' bids form the team contract. Bidding 0 is a nello.\n\
             Making the contract scores 10 per trick bid; each trick over the contract is a bag.\n\
             Missing the contract loses 10 per trick bid.\n\
             A nello scores +100 when the player takes no tricks and -100 otherwise.\n",
        );

        text.push_str(&format!(
            "Every {} bags cost {} points and the {} bags are removed from the running count.\n",
            self.bag_threshold(),
            self.bag_penalty(),
            self.bag_threshold()
        ));

        if self.allows_blind_nello() {
            text.push_str(&format!(
                "A team behind by {BLIND_NELLO_DEFICIT} points or more may call blind nello: +/-{BLIND_NELLO_VALUE}.\n"
            ));
        } else {
            text.push_str("Blind nello is not allowed.\n");
        }

        if self.is_tournament() {
            text.push_str(&format!(
                "Yellow cards are recorded each round; every {YELLOW_CARDS_PER_PENALTY} cards cost {YELLOW_CARD_PENALTY} points.\n"
            ));
        }

        match self.round_limit() {
            Some(limit) => text.push_str(&format!(
                "The game ends at {} points or after {limit} rounds.\n",
                self.winning_score()
            )),
            None => text.push_str(&format!(
                "The game ends when a team reaches {} points.\n",
                self.winning_score()
            )),
        }

        text.push_str("Equal scores are decided by fewest total bags; equal bags play another round.\n");
        text
    }
}

impl fmt::Display for RuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::RuleVariant;

    #[test]
    fn variant_table_matches_house_rules() {
        let rows = [
            (RuleVariant::Regular, 10, 100, 500, true),
            (RuleVariant::Short, 5, 50, 250, true),
            (RuleVariant::Tournament, 5, 50, 250, false),
            (RuleVariant::TournamentFinals, 10, 100, 500, true),
        ];
        for (variant, threshold, penalty, winning, blind) in rows {
            assert_eq!(variant.bag_threshold(), threshold, "{variant}");
            assert_eq!(variant.bag_penalty(), penalty, "{variant}");
            assert_eq!(variant.winning_score(), winning, "{variant}");
            assert_eq!(variant.allows_blind_nello(), blind, "{variant}");
        }
    }

    #[test]
    fn only_regular_tournament_has_round_limit() {
        assert_eq!(RuleVariant::Tournament.round_limit(), Some(8));
        assert_eq!(RuleVariant::TournamentFinals.round_limit(), None);
        assert_eq!(RuleVariant::Regular.round_limit(), None);
    }

    #[test]
    fn legacy_flags_map_to_variants() {
        assert_eq!(RuleVariant::from_legacy_flags(false, false, false), RuleVariant::Regular);
        assert_eq!(RuleVariant::from_legacy_flags(true, false, false), RuleVariant::Short);
        assert_eq!(RuleVariant::from_legacy_flags(true, true, false), RuleVariant::Tournament);
        assert_eq!(
            RuleVariant::from_legacy_flags(false, true, true),
            RuleVariant::TournamentFinals
        );
    }

    #[test]
    fn parse_roundtrips_labels() {
        for variant in RuleVariant::ALL {
            assert_eq!(RuleVariant::from_str(variant.as_str()), Some(variant));
        }
        assert_eq!(RuleVariant::from_str("tournament-finals"), Some(RuleVariant::TournamentFinals));
    }

    #[test]
    fn rules_text_mentions_variant_thresholds() {
        let text = RuleVariant::Tournament.rules_text();
        assert!(text.contains("Every 5 bags cost 50 points"));
        assert!(text.contains("Blind nello is not allowed"));
        assert!(text.contains("after 8 rounds"));
    }
}
