use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::player::Team;
use crate::model::round::RoundState;
use crate::model::score::{ScoreBoard, TeamScore};
use crate::model::settlement::{Settlement, SettlementBreakdown, SettlementError, settle_team};
use crate::model::variant::RuleVariant;

/// One team's outcome for a finalized round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResult {
    pub breakdown: SettlementBreakdown,
    /// Cumulative record after this round.
    pub after: TeamScore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: RoundState,
    pub results: [TeamResult; 2],
}

impl RoundRecord {
    pub fn result(&self, team: Team) -> &TeamResult {
        &self.results[team.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameStatus {
    #[default]
    InProgress,
    Won {
        winner: Team,
    },
    /// The game reached its end condition level on score and bags; another
    /// round is played.
    Tied,
}

impl GameStatus {
    pub fn evaluate(scores: &ScoreBoard, rounds_played: u32, variant: RuleVariant) -> Self {
        let winning = variant.winning_score();
        let reached = scores.teams().iter().any(|t| t.score >= winning);
        let out_of_rounds = variant
            .round_limit()
            .is_some_and(|limit| rounds_played >= limit);

        if !reached && !out_of_rounds {
            return GameStatus::InProgress;
        }

        match scores.leading_team() {
            Some(winner) => GameStatus::Won { winner },
            None => GameStatus::Tied,
        }
    }

    pub const fn is_over(self) -> bool {
        matches!(self, GameStatus::Won { .. })
    }
}

/// Settle both teams for one round against `scores`.
pub fn settle_round(
    round: &RoundState,
    scores: &ScoreBoard,
    variant: RuleVariant,
) -> Result<[Settlement; 2], SettlementError> {
    let settle = |team: Team| {
        settle_team(
            round.team_players(team),
            round.team_tricks(team),
            scores.team(team),
            round.yellow_cards(team),
            variant,
        )
    };
    Ok([settle(Team::NorthSouth)?, settle(Team::EastWest)?])
}

/// Rebuild every cumulative value from zero. Names come from `names`; all
/// counters start fresh so each threshold crossing is charged exactly once.
pub fn replay<'a, I>(
    names: &ScoreBoard,
    rounds: I,
    variant: RuleVariant,
) -> Result<(ScoreBoard, Vec<RoundRecord>), SettlementError>
where
    I: IntoIterator<Item = &'a RoundState>,
{
    let mut scores = names.zeroed();
    let mut records = Vec::new();

    for round in rounds {
        let [ns, ew] = settle_round(round, &scores, variant)?;
        scores.set_team(Team::NorthSouth, ns.score.clone());
        scores.set_team(Team::EastWest, ew.score.clone());
        records.push(RoundRecord {
            round: round.clone(),
            results: [
                TeamResult {
                    breakdown: ns.breakdown,
                    after: ns.score,
                },
                TeamResult {
                    breakdown: ew.breakdown,
                    after: ew.score,
                },
            ],
        });
    }

    debug!(rounds = records.len(), %variant, "history replayed");
    Ok((scores, records))
}
