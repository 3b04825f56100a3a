use thiserror::Error;
use tracing::{info, warn};

use crate::game::confirm::{ActionKind, ActionSummary, ConfirmationGate};
use crate::game::history::{GameStatus, RoundRecord, TeamResult, replay, settle_round};
use crate::model::bid::{Bid, NelloOutcome};
use crate::model::player::{PlayerPosition, Team};
use crate::model::round::{RoundError, RoundPhase, RoundState};
use crate::model::score::ScoreBoard;
use crate::model::settlement::{Settlement, SettlementError};
use crate::model::variant::{BLIND_NELLO_DEFICIT, RuleVariant};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error("action declined; nothing was changed")]
    Declined,
    #[error("the game is over; reset to start a new one")]
    GameOver,
    #[error("history has no round {} ({len} rounds played)", .index + 1)]
    HistoryIndex { index: usize, len: usize },
    #[error("the rule variant can only change before the first round is finalized")]
    VariantLocked,
}

/// Settlement of the current round for both teams, not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPreview {
    pub settlements: [Settlement; 2],
}

impl RoundPreview {
    pub fn settlement(&self, team: Team) -> &Settlement {
        &self.settlements[team.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    variant: RuleVariant,
    scores: ScoreBoard,
    history: Vec<RoundRecord>,
    current_round: RoundState,
    status: GameStatus,
}

impl MatchState {
    pub fn new(variant: RuleVariant) -> Self {
        let scores = ScoreBoard::new();
        let current_round = Self::fresh_round(&scores);
        Self {
            variant,
            scores,
            history: Vec::new(),
            current_round,
            status: GameStatus::InProgress,
        }
    }

    /// Assemble a match from persisted parts. Cumulative values are rebuilt
    /// from the history so a stale score record cannot drift from it.
    pub fn from_parts(
        variant: RuleVariant,
        scores: ScoreBoard,
        history: Vec<RoundRecord>,
        current_round: RoundState,
    ) -> Self {
        let mut state = Self {
            variant,
            scores,
            history,
            current_round,
            status: GameStatus::InProgress,
        };
        if !state.history.is_empty() {
            let rounds: Vec<RoundState> = state.history.iter().map(|r| r.round.clone()).collect();
            match replay(&state.scores, &rounds, variant) {
                Ok((scores, records)) => {
                    state.scores = scores;
                    state.history = records;
                }
                Err(err) => warn!(%err, "stored history could not be replayed; keeping stored totals"),
            }
        }
        state.refresh_status();
        state
    }

    pub fn variant(&self) -> RuleVariant {
        self.variant
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn round(&self) -> &RoundState {
        &self.current_round
    }

    pub fn phase(&self) -> RoundPhase {
        self.current_round.phase(self.variant)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn rounds_played(&self) -> u32 {
        self.history.len() as u32
    }

    /// 1-based number of the round being entered.
    pub fn round_number(&self) -> u32 {
        self.rounds_played() + 1
    }

    pub fn set_variant(&mut self, variant: RuleVariant) -> Result<(), MatchError> {
        if variant == self.variant {
            return Ok(());
        }
        if !self.history.is_empty() || self.phase() != RoundPhase::AwaitingBids {
            return Err(MatchError::VariantLocked);
        }
        if !variant.allows_blind_nello() {
            for seat in PlayerPosition::LOOP {
                if self.current_round.player(seat).bid.is_blind() {
                    self.current_round.set_bid(seat, Bid::Nello)?;
                }
            }
        }
        info!(from = %self.variant, to = %variant, "rule variant changed");
        self.variant = variant;
        Ok(())
    }

    /// True when the seat's team may call blind nello right now.
    pub fn blind_nello_available(&self, seat: PlayerPosition) -> bool {
        self.check_blind_nello(seat).is_ok()
    }

    pub fn set_bid(&mut self, seat: PlayerPosition, bid: Bid) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        if bid.is_blind() {
            self.check_blind_nello(seat)?;
        }
        self.current_round.set_bid(seat, bid)?;
        Ok(())
    }

    pub fn submit_bids(&mut self, gate: &mut impl ConfirmationGate) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        let over = self.current_round.check_bid_total(self.variant)?;

        let mut summary = ActionSummary::new(ActionKind::SubmitBids);
        for team in Team::BOTH {
            let score = self.scores.team(team);
            summary = summary.line(format!("{}:", score.name));
            for player in self.current_round.team_players(team) {
                summary = summary.line(format!("  {}: {}", player.name, player.bid));
            }
        }
        let total = self.current_round.total_bid();
        summary = summary.line(format!("Total bids: {total}"));
        if over {
            summary = summary.warning(format!("total bids of {total} exceed the 13 tricks available"));
        }

        if !gate.confirm(&summary) {
            return Err(MatchError::Declined);
        }
        self.current_round.mark_bidding_complete();
        info!(round = self.round_number(), total_bid = total, "bids submitted");
        Ok(())
    }

    pub fn set_team_tricks(&mut self, team: Team, tricks: u8) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        self.current_round.set_team_tricks(team, tricks)?;
        Ok(())
    }

    pub fn set_player_tricks(&mut self, seat: PlayerPosition, tricks: u8) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        self.current_round.set_player_tricks(seat, tricks)?;
        Ok(())
    }

    pub fn submit_tricks(&mut self, gate: &mut impl ConfirmationGate) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        self.current_round.check_trick_total()?;

        let mut summary = ActionSummary::new(ActionKind::SubmitTricks);
        for team in Team::BOTH {
            let [first, second] = self.current_round.team_players(team);
            summary = summary
                .line(format!("{}:", self.scores.team(team).name))
                .line(format!("  Bids: {} + {}", first.bid, second.bid))
                .line(format!(
                    "  Tricks won: {}",
                    self.current_round.team_tricks(team)
                ));
        }

        if !gate.confirm(&summary) {
            return Err(MatchError::Declined);
        }
        self.current_round.mark_tricks_complete();
        info!(
            round = self.round_number(),
            ns = self.current_round.team_tricks(Team::NorthSouth),
            ew = self.current_round.team_tricks(Team::EastWest),
            "tricks submitted"
        );
        Ok(())
    }

    pub fn record_nello_result(
        &mut self,
        seat: PlayerPosition,
        outcome: NelloOutcome,
    ) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        self.current_round.record_nello_result(seat, outcome)?;
        Ok(())
    }

    pub fn set_yellow_cards(&mut self, team: Team, cards: u32) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        self.current_round
            .set_yellow_cards(team, cards, self.variant)?;
        Ok(())
    }

    pub fn confirm_yellow_cards(&mut self, gate: &mut impl ConfirmationGate) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        if !self.variant.is_tournament() {
            return Err(RoundError::NotTournament.into());
        }
        if self.phase() != RoundPhase::AwaitingYellowCardConfirm {
            return Err(RoundError::YellowCardsUnavailable.into());
        }

        let mut summary = ActionSummary::new(ActionKind::ConfirmYellowCards);
        for team in Team::BOTH {
            let score = self.scores.team(team);
            let this_round = self.current_round.yellow_cards(team);
            summary = summary.line(format!(
                "{}: {} this round, {} total, {} already penalized",
                score.name,
                this_round,
                score.yellow_cards + this_round,
                score.penalized_yellow_cards
            ));
        }

        if !gate.confirm(&summary) {
            return Err(MatchError::Declined);
        }
        self.current_round.mark_yellow_cards_complete();
        Ok(())
    }

    /// Settle the current round for both teams without committing anything.
    pub fn preview(&self) -> Result<RoundPreview, MatchError> {
        if !matches!(
            self.phase(),
            RoundPhase::AwaitingYellowCardConfirm | RoundPhase::ReadyToFinalize
        ) {
            return Err(RoundError::NotReady(self.phase()).into());
        }
        let settlements = settle_round(&self.current_round, &self.scores, self.variant)?;
        Ok(RoundPreview { settlements })
    }

    /// Commit the current round: settle both teams, append it to history and
    /// start the next round.
    pub fn finalize_round(&mut self, gate: &mut impl ConfirmationGate) -> Result<GameStatus, MatchError> {
        self.ensure_in_play()?;
        let phase = self.phase();
        if phase != RoundPhase::ReadyToFinalize {
            return Err(RoundError::NotReady(phase).into());
        }

        let [ns, ew] = settle_round(&self.current_round, &self.scores, self.variant)?;

        let mut summary = ActionSummary::new(ActionKind::FinalizeRound);
        for (team, settlement) in [(Team::NorthSouth, &ns), (Team::EastWest, &ew)] {
            let before = self.scores.team(team);
            let after = &settlement.score;
            let delta = settlement.breakdown.points();
            summary = summary
                .line(format!("{}:", before.name))
                .line(format!("  Points: {} -> {} ({delta:+})", before.score, after.score))
                .line(format!("  Bags: {} -> {}", before.bags, after.bags))
                .line(format!("  Total bags: {}", after.total_bags));
            if self.variant.is_tournament() {
                summary = summary.line(format!(
                    "  Yellow cards: {} this round, {} total, penalty {}",
                    settlement.breakdown.yellow_cards,
                    after.yellow_cards,
                    -settlement.breakdown.yellow_penalty_points
                ));
            }
        }

        if !gate.confirm(&summary) {
            return Err(MatchError::Declined);
        }

        let round_number = self.round_number();
        self.scores.set_team(Team::NorthSouth, ns.score.clone());
        self.scores.set_team(Team::EastWest, ew.score.clone());
        let finalized = std::mem::replace(&mut self.current_round, Self::fresh_round(&self.scores));
        self.history.push(RoundRecord {
            round: finalized,
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
        self.refresh_status();

        info!(
            round = round_number,
            ns_score = self.scores.team(Team::NorthSouth).score,
            ew_score = self.scores.team(Team::EastWest).score,
            status = ?self.status,
            "round finalized"
        );
        Ok(self.status)
    }

    pub fn reopen_bidding(&mut self) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        self.current_round.reopen_bidding();
        Ok(())
    }

    pub fn reopen_tricks(&mut self) -> Result<(), MatchError> {
        self.ensure_in_play()?;
        self.current_round.reopen_tricks()?;
        Ok(())
    }

    /// Replace a finalized round and replay the whole history from zero.
    pub fn edit_round(
        &mut self,
        index: usize,
        mut edited: RoundState,
        gate: &mut impl ConfirmationGate,
    ) -> Result<(), MatchError> {
        let len = self.history.len();
        if index >= len {
            return Err(MatchError::HistoryIndex { index, len });
        }
        edited.seal(self.variant)?;

        let rounds: Vec<RoundState> = self
            .history
            .iter()
            .enumerate()
            .map(|(i, record)| {
                if i == index {
                    edited.clone()
                } else {
                    record.round.clone()
                }
            })
            .collect();
        let (scores, records) = replay(&self.scores, &rounds, self.variant)?;

        let mut summary = ActionSummary::new(ActionKind::EditHistory)
            .line(format!("Round {} will be replaced", index + 1));
        for team in Team::BOTH {
            let score = scores.team(team);
            summary = summary.line(format!(
                "{}: {} ({} bags)",
                score.name, score.score, score.bags
            ));
        }

        if !gate.confirm(&summary) {
            return Err(MatchError::Declined);
        }
        self.scores = scores;
        self.history = records;
        self.refresh_status();
        info!(round = index + 1, "history round edited and replayed");
        Ok(())
    }

    pub fn rename_team(&mut self, team: Team, name: impl Into<String>) {
        self.scores.team_mut(team).name = name.into();
    }

    pub fn rename_player(&mut self, seat: PlayerPosition, name: impl Into<String>) {
        let name = name.into();
        self.scores.team_mut(seat.team()).player_names[seat.slot()] = name.clone();
        self.current_round.set_player_name(seat, name);
    }

    /// Clear scores and history; team and player names are kept.
    pub fn reset_game(&mut self, gate: &mut impl ConfirmationGate) -> Result<(), MatchError> {
        let summary = ActionSummary::new(ActionKind::ResetGame)
            .line("All scores and history will be cleared.");
        if !gate.confirm(&summary) {
            return Err(MatchError::Declined);
        }
        self.scores = self.scores.zeroed();
        self.history.clear();
        self.current_round = Self::fresh_round(&self.scores);
        self.status = GameStatus::InProgress;
        info!("game reset");
        Ok(())
    }

    /// Back to a brand-new regular match with default names.
    pub fn reset_everything(&mut self, gate: &mut impl ConfirmationGate) -> Result<(), MatchError> {
        let summary = ActionSummary::new(ActionKind::ResetEverything)
            .line("Scores, history, names and rule options will be cleared.");
        if !gate.confirm(&summary) {
            return Err(MatchError::Declined);
        }
        *self = MatchState::new(RuleVariant::default());
        info!("match reset to defaults");
        Ok(())
    }

    fn check_blind_nello(&self, seat: PlayerPosition) -> Result<(), RoundError> {
        if !self.variant.allows_blind_nello() {
            return Err(RoundError::BlindNelloNotAllowed(self.variant));
        }
        let deficit = self.scores.deficit(seat.team());
        if deficit < BLIND_NELLO_DEFICIT {
            return Err(RoundError::BlindNelloDeficit {
                deficit,
                required: BLIND_NELLO_DEFICIT,
            });
        }
        Ok(())
    }

    fn ensure_in_play(&self) -> Result<(), MatchError> {
        if self.status.is_over() {
            return Err(MatchError::GameOver);
        }
        Ok(())
    }

    fn refresh_status(&mut self) {
        self.status = GameStatus::evaluate(&self.scores, self.rounds_played(), self.variant);
    }

    pub(crate) fn fresh_round(scores: &ScoreBoard) -> RoundState {
        RoundState::new(PlayerPosition::LOOP.map(|seat| {
            scores.team(seat.team()).player_names[seat.slot()].clone()
        }))
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new(RuleVariant::default())
    }
}
