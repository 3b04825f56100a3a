//! Round settlement: turns one team's bids, tricks, nello results and yellow
//! cards into its next [`TeamScore`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::bid::{NelloOutcome, TRICKS_PER_ROUND};
use crate::model::player::Player;
use crate::model::score::TeamScore;
use crate::model::variant::{
    BLIND_NELLO_VALUE, NELLO_VALUE, POINTS_PER_TRICK, RuleVariant, YELLOW_CARD_PENALTY,
    YELLOW_CARDS_PER_PENALTY,
};

/// How a team's points moved in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SettlementBreakdown {
    pub team_bid: u8,
    pub tricks_won: u8,
    pub contract_points: i32,
    pub bags_added: u32,
    pub nello_points: i32,
    pub bag_penalties: u32,
    pub bag_penalty_points: i32,
    pub yellow_cards: u32,
    pub yellow_penalty_points: i32,
}

impl SettlementBreakdown {
    pub fn points(&self) -> i32 {
        self.contract_points + self.nello_points
            - self.bag_penalty_points
            - self.yellow_penalty_points
    }

    pub fn made_contract(&self) -> bool {
        self.tricks_won >= self.team_bid
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub score: TeamScore,
    pub breakdown: SettlementBreakdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("nello result for {player} has not been recorded")]
    UnresolvedNello { player: String },
    #[error("a team cannot win {0} tricks; at most 13 are played")]
    TooManyTricks(u8),
    #[error("{player} holds a contract of {bid} tricks; at most 13 can be bid")]
    ContractOutOfRange { player: String, bid: u8 },
}

/// Settle one partnership for a finished round.
///
/// `yellow_cards` is ignored outside tournament variants.
pub fn settle_team(
    players: [&Player; 2],
    tricks_won: u8,
    prior: &TeamScore,
    yellow_cards: u32,
    variant: RuleVariant,
) -> Result<Settlement, SettlementError> {
    if tricks_won > TRICKS_PER_ROUND {
        return Err(SettlementError::TooManyTricks(tricks_won));
    }

    if let Some(player) = players
        .iter()
        .find(|p| p.bid.contract_tricks() > TRICKS_PER_ROUND)
    {
        return Err(SettlementError::ContractOutOfRange {
            player: player.name.clone(),
            bid: player.bid.contract_tricks(),
        });
    }

    let mut score = prior.clone();
    let mut breakdown = SettlementBreakdown {
        tricks_won,
        ..SettlementBreakdown::default()
    };

    breakdown.team_bid = players
        .iter()
        .filter(|p| !p.is_nello())
        .map(|p| p.bid.contract_tricks())
        .sum();

    let team_bid = i32::from(breakdown.team_bid);
    if tricks_won >= breakdown.team_bid {
        breakdown.contract_points = team_bid * POINTS_PER_TRICK;
        breakdown.bags_added = u32::from(tricks_won - breakdown.team_bid);
    } else {
        breakdown.contract_points = -team_bid * POINTS_PER_TRICK;
    }

    for player in players.iter().filter(|p| p.is_nello()) {
        let value = if player.bid.is_blind() {
            BLIND_NELLO_VALUE
        } else {
            NELLO_VALUE
        };
        match player.nello_result {
            Some(NelloOutcome::Made) => {
                breakdown.nello_points += value;
                score.consecutive_nellos += 1;
            }
            Some(NelloOutcome::Failed) => {
                breakdown.nello_points -= value;
                score.consecutive_nellos = 0;
            }
            None => {
                return Err(SettlementError::UnresolvedNello {
                    player: player.name.clone(),
                });
            }
        }
    }

    score.bags += breakdown.bags_added;
    score.total_bags += breakdown.bags_added;

    let threshold = variant.bag_threshold();
    while score.bags >= threshold {
        score.bags -= threshold;
        breakdown.bag_penalties += 1;
        breakdown.bag_penalty_points += variant.bag_penalty();
    }
    if breakdown.bag_penalties > 0 {
        debug!(
            team = %score.name,
            penalties = breakdown.bag_penalties,
            remaining_bags = score.bags,
            "bag threshold reached"
        );
    }

    if variant.is_tournament() {
        breakdown.yellow_cards = yellow_cards;
        score.yellow_cards += yellow_cards;
        let pairs = (score.yellow_cards - score.penalized_yellow_cards) / YELLOW_CARDS_PER_PENALTY;
        if pairs > 0 {
            score.penalized_yellow_cards += pairs * YELLOW_CARDS_PER_PENALTY;
            breakdown.yellow_penalty_points = pairs as i32 * YELLOW_CARD_PENALTY;
            debug!(
                team = %score.name,
                total_cards = score.yellow_cards,
                pairs,
                "yellow card penalty applied"
            );
        }
    }

    score.score += breakdown.points();
    Ok(Settlement { score, breakdown })
}
