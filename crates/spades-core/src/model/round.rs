use core::fmt;
use serde::{Deserialize, Serialize};
use std::array;
use thiserror::Error;

use crate::model::bid::{Bid, NelloOutcome, TRICKS_PER_ROUND};
use crate::model::player::{Player, PlayerPosition, Team};
use crate::model::variant::RuleVariant;

/// Entries for the hand currently being played, plus its progress flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    players: [Player; 4],
    #[serde(default)]
    team_tricks: [u8; 2],
    #[serde(default)]
    yellow_cards: [u32; 2],
    #[serde(default)]
    bidding_complete: bool,
    #[serde(default)]
    tricks_complete: bool,
    #[serde(default)]
    nello_results_complete: bool,
    #[serde(default)]
    yellow_cards_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    AwaitingBids,
    AwaitingTricks,
    AwaitingNelloResults,
    AwaitingYellowCardConfirm,
    ReadyToFinalize,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoundPhase::AwaitingBids => "awaiting bids",
            RoundPhase::AwaitingTricks => "awaiting tricks",
            RoundPhase::AwaitingNelloResults => "awaiting nello results",
            RoundPhase::AwaitingYellowCardConfirm => "awaiting yellow card confirmation",
            RoundPhase::ReadyToFinalize => "ready to finalize",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    #[error("bids have already been submitted")]
    BiddingClosed,
    #[error("bids have not been submitted yet")]
    BiddingOpen,
    #[error("tricks have already been submitted")]
    TricksClosed,
    #[error("tricks have not been submitted yet")]
    TricksOpen,
    #[error("total bids of {0} exceed the 13 tricks in a round")]
    BidTotal(u32),
    #[error("total tricks must equal 13 (currently {0})")]
    TrickTotal(u32),
    #[error("{0} did not bid nello")]
    NotNelloBidder(PlayerPosition),
    #[error("nello result for {0} is still missing")]
    NelloPending(PlayerPosition),
    #[error("blind nello is not allowed in {0} games")]
    BlindNelloNotAllowed(RuleVariant),
    #[error("blind nello requires trailing by {required} points (currently {deficit})")]
    BlindNelloDeficit { deficit: i32, required: i32 },
    #[error("yellow cards are only recorded under tournament rules")]
    NotTournament,
    #[error("yellow cards can only be recorded once tricks and nello results are in")]
    YellowCardsUnavailable,
    #[error("round is {0}")]
    NotReady(RoundPhase),
}

impl RoundState {
    /// Empty round; `names` is indexed by seat.
    pub fn new(names: [String; 4]) -> Self {
        let mut names = names.into_iter();
        Self {
            players: array::from_fn(|_| Player::named(names.next().unwrap_or_default())),
            team_tricks: [0; 2],
            yellow_cards: [0; 2],
            bidding_complete: false,
            tricks_complete: false,
            nello_results_complete: false,
            yellow_cards_complete: false,
        }
    }

    pub fn phase(&self, variant: RuleVariant) -> RoundPhase {
        if !self.bidding_complete {
            RoundPhase::AwaitingBids
        } else if !self.tricks_complete {
            RoundPhase::AwaitingTricks
        } else if !self.nello_results_complete {
            RoundPhase::AwaitingNelloResults
        } else if variant.is_tournament() && !self.yellow_cards_complete {
            RoundPhase::AwaitingYellowCardConfirm
        } else {
            RoundPhase::ReadyToFinalize
        }
    }

    pub fn player(&self, seat: PlayerPosition) -> &Player {
        &self.players[seat.index()]
    }

    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    pub fn team_players(&self, team: Team) -> [&Player; 2] {
        team.seats().map(|seat| self.player(seat))
    }

    pub fn team_tricks(&self, team: Team) -> u8 {
        self.team_tricks[team.index()]
    }

    pub fn yellow_cards(&self, team: Team) -> u32 {
        self.yellow_cards[team.index()]
    }

    pub fn total_tricks(&self) -> u32 {
        self.team_tricks.iter().copied().map(u32::from).sum()
    }

    /// Sum of every contract at the table; nello bids count as zero.
    pub fn total_bid(&self) -> u32 {
        self.players
            .iter()
            .map(|p| u32::from(p.bid.contract_tricks()))
            .sum()
    }

    pub fn team_bid(&self, team: Team) -> u32 {
        self.team_players(team)
            .iter()
            .map(|p| u32::from(p.bid.contract_tricks()))
            .sum()
    }

    pub fn pending_nello(&self) -> Option<PlayerPosition> {
        PlayerPosition::LOOP
            .iter()
            .copied()
            .find(|seat| self.player(*seat).nello_pending())
    }

    pub fn has_nello_bidders(&self) -> bool {
        self.players.iter().any(Player::is_nello)
    }

    pub fn set_player_name(&mut self, seat: PlayerPosition, name: impl Into<String>) {
        self.players[seat.index()].name = name.into();
    }

    pub fn set_bid(&mut self, seat: PlayerPosition, bid: Bid) -> Result<(), RoundError> {
        if self.bidding_complete {
            return Err(RoundError::BiddingClosed);
        }
        self.apply_bid(seat, bid);
        Ok(())
    }

    /// Hard failure when the variant treats 13 as a limit; otherwise reports
    /// whether the sheet is over-committed so the caller can warn.
    pub fn check_bid_total(&self, variant: RuleVariant) -> Result<bool, RoundError> {
        if self.bidding_complete {
            return Err(RoundError::BiddingClosed);
        }
        let total = self.total_bid();
        if total > u32::from(TRICKS_PER_ROUND) {
            if variant.bid_total_is_hard_limit() {
                return Err(RoundError::BidTotal(total));
            }
            return Ok(true);
        }
        Ok(false)
    }

    pub fn mark_bidding_complete(&mut self) {
        self.bidding_complete = true;
    }

    /// Set one team's tricks and give the remainder of the 13 to the other.
    pub fn set_team_tricks(&mut self, team: Team, tricks: u8) -> Result<(), RoundError> {
        self.ensure_trick_entry()?;
        let tricks = tricks.min(TRICKS_PER_ROUND);
        self.team_tricks[team.index()] = tricks;
        self.team_tricks[team.opponent().index()] = TRICKS_PER_ROUND - tricks;
        Ok(())
    }

    /// Record a single seat's tricks; the team total becomes the sum of its
    /// seats' recorded counts.
    pub fn set_player_tricks(&mut self, seat: PlayerPosition, tricks: u8) -> Result<(), RoundError> {
        self.ensure_trick_entry()?;
        self.players[seat.index()].tricks = Some(tricks.min(TRICKS_PER_ROUND));
        let team = seat.team();
        let recorded: u32 = self
            .team_players(team)
            .iter()
            .map(|p| u32::from(p.tricks.unwrap_or(0)))
            .sum();
        self.team_tricks[team.index()] = recorded.min(u32::from(TRICKS_PER_ROUND)) as u8;
        Ok(())
    }

    pub fn check_trick_total(&self) -> Result<(), RoundError> {
        self.ensure_trick_entry()?;
        match self.total_tricks() {
            total if total == u32::from(TRICKS_PER_ROUND) => Ok(()),
            total => Err(RoundError::TrickTotal(total)),
        }
    }

    pub fn mark_tricks_complete(&mut self) {
        self.tricks_complete = true;
        self.nello_results_complete = self.pending_nello().is_none();
    }

    pub fn record_nello_result(
        &mut self,
        seat: PlayerPosition,
        outcome: NelloOutcome,
    ) -> Result<(), RoundError> {
        if !self.tricks_complete {
            return Err(RoundError::TricksOpen);
        }
        if !self.player(seat).is_nello() {
            return Err(RoundError::NotNelloBidder(seat));
        }
        self.players[seat.index()].nello_result = Some(outcome);
        self.nello_results_complete = self.pending_nello().is_none();
        Ok(())
    }

    pub fn set_yellow_cards(
        &mut self,
        team: Team,
        cards: u32,
        variant: RuleVariant,
    ) -> Result<(), RoundError> {
        if !variant.is_tournament() {
            return Err(RoundError::NotTournament);
        }
        if self.phase(variant) != RoundPhase::AwaitingYellowCardConfirm {
            return Err(RoundError::YellowCardsUnavailable);
        }
        self.yellow_cards[team.index()] = cards;
        Ok(())
    }

    pub fn mark_yellow_cards_complete(&mut self) {
        self.yellow_cards_complete = true;
    }

    /// Reopen the bid sheet; everything recorded after bidding must be re-entered.
    pub fn reopen_bidding(&mut self) {
        self.bidding_complete = false;
        self.tricks_complete = false;
        self.nello_results_complete = false;
        self.yellow_cards_complete = false;
    }

    pub fn reopen_tricks(&mut self) -> Result<(), RoundError> {
        if !self.bidding_complete {
            return Err(RoundError::BiddingOpen);
        }
        self.tricks_complete = false;
        self.nello_results_complete = false;
        self.yellow_cards_complete = false;
        Ok(())
    }

    /// Correct a bid on a finalized round. Switching to a contract clears any
    /// nello result the seat carried.
    pub fn edit_bid(&mut self, seat: PlayerPosition, bid: Bid) {
        self.apply_bid(seat, bid);
    }

    pub fn edit_team_tricks(&mut self, team: Team, tricks: u8) {
        self.team_tricks[team.index()] = tricks.min(TRICKS_PER_ROUND);
    }

    pub fn edit_nello_result(&mut self, seat: PlayerPosition, outcome: NelloOutcome) {
        if self.player(seat).is_nello() {
            self.players[seat.index()].nello_result = Some(outcome);
        }
    }

    pub fn edit_yellow_cards(&mut self, team: Team, cards: u32) {
        self.yellow_cards[team.index()] = cards;
    }

    /// Check a round that is about to become history and close every flag.
    pub fn seal(&mut self, variant: RuleVariant) -> Result<(), RoundError> {
        let total = self.total_tricks();
        if total != u32::from(TRICKS_PER_ROUND) {
            return Err(RoundError::TrickTotal(total));
        }
        if let Some(seat) = self.pending_nello() {
            return Err(RoundError::NelloPending(seat));
        }
        if !variant.allows_blind_nello() && self.players.iter().any(|p| p.bid.is_blind()) {
            return Err(RoundError::BlindNelloNotAllowed(variant));
        }
        if !variant.is_tournament() {
            self.yellow_cards = [0; 2];
        }
        self.bidding_complete = true;
        self.tricks_complete = true;
        self.nello_results_complete = true;
        self.yellow_cards_complete = true;
        Ok(())
    }

    fn apply_bid(&mut self, seat: PlayerPosition, bid: Bid) {
        let player = &mut self.players[seat.index()];
        if player.bid != bid || !bid.is_nello() {
            player.nello_result = None;
        }
        player.bid = bid;
    }

    fn ensure_trick_entry(&self) -> Result<(), RoundError> {
        if !self.bidding_complete {
            return Err(RoundError::BiddingOpen);
        }
        if self.tricks_complete {
            return Err(RoundError::TricksClosed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RoundError, RoundPhase, RoundState};
    use crate::model::bid::{Bid, NelloOutcome};
    use crate::model::player::{PlayerPosition, Team};
    use crate::model::variant::RuleVariant;

    fn names() -> [String; 4] {
        ["N", "E", "S", "W"].map(String::from)
    }

    fn bid_all(round: &mut RoundState, bids: [u8; 4]) {
        for seat in PlayerPosition::LOOP {
            round.set_bid(seat, Bid::tricks(bids[seat.index()])).unwrap();
        }
    }

    #[test]
    fn fresh_round_awaits_bids() {
        let round = RoundState::new(names());
        assert_eq!(round.phase(RuleVariant::Regular), RoundPhase::AwaitingBids);
        assert_eq!(round.player(PlayerPosition::West).name, "W");
    }

    #[test]
    fn bid_total_is_hard_limit_outside_tournaments() {
        let mut round = RoundState::new(names());
        bid_all(&mut round, [4, 4, 4, 4]);
        assert_eq!(
            round.check_bid_total(RuleVariant::Regular),
            Err(RoundError::BidTotal(16))
        );
        assert_eq!(round.check_bid_total(RuleVariant::Tournament), Ok(true));
    }

    #[test]
    fn setting_team_tricks_fills_the_other_team() {
        let mut round = RoundState::new(names());
        bid_all(&mut round, [3, 3, 3, 3]);
        round.mark_bidding_complete();
        round.set_team_tricks(Team::NorthSouth, 9).unwrap();
        assert_eq!(round.team_tricks(Team::EastWest), 4);
        round.set_team_tricks(Team::EastWest, 20).unwrap();
        assert_eq!(round.team_tricks(Team::EastWest), 13);
        assert_eq!(round.team_tricks(Team::NorthSouth), 0);
    }

    #[test]
    fn player_tricks_roll_up_to_team_total() {
        let mut round = RoundState::new(names());
        bid_all(&mut round, [3, 3, 3, 3]);
        round.mark_bidding_complete();
        round.set_player_tricks(PlayerPosition::North, 4).unwrap();
        round.set_player_tricks(PlayerPosition::South, 2).unwrap();
        round.set_player_tricks(PlayerPosition::East, 5).unwrap();
        assert_eq!(round.team_tricks(Team::NorthSouth), 6);
        assert_eq!(round.check_trick_total(), Err(RoundError::TrickTotal(11)));
        round.set_player_tricks(PlayerPosition::West, 2).unwrap();
        assert_eq!(round.check_trick_total(), Ok(()));
    }

    #[test]
    fn tricks_cannot_be_entered_before_bids() {
        let mut round = RoundState::new(names());
        assert_eq!(
            round.set_team_tricks(Team::NorthSouth, 6),
            Err(RoundError::BiddingOpen)
        );
    }

    #[test]
    fn oversized_stored_counts_are_totalled_without_wrapping() {
        let mut round = RoundState::new(names());
        for seat in PlayerPosition::LOOP {
            round.edit_bid(seat, Bid::Contract(200));
        }
        round.team_tricks = [200, 200];
        assert_eq!(round.total_bid(), 800);
        assert_eq!(round.team_bid(Team::EastWest), 400);
        assert_eq!(
            round.seal(RuleVariant::Regular),
            Err(RoundError::TrickTotal(400))
        );
    }

    #[test]
    fn nello_bidders_gate_the_round() {
        let mut round = RoundState::new(names());
        bid_all(&mut round, [0, 3, 4, 3]);
        round.mark_bidding_complete();
        round.set_team_tricks(Team::NorthSouth, 5).unwrap();
        round.mark_tricks_complete();
        assert_eq!(
            round.phase(RuleVariant::Regular),
            RoundPhase::AwaitingNelloResults
        );
        assert_eq!(
            round.record_nello_result(PlayerPosition::East, NelloOutcome::Made),
            Err(RoundError::NotNelloBidder(PlayerPosition::East))
        );
        round
            .record_nello_result(PlayerPosition::North, NelloOutcome::Made)
            .unwrap();
        assert_eq!(round.phase(RuleVariant::Regular), RoundPhase::ReadyToFinalize);
        assert_eq!(
            round.phase(RuleVariant::Tournament),
            RoundPhase::AwaitingYellowCardConfirm
        );
    }

    #[test]
    fn yellow_cards_rejected_outside_tournaments() {
        let mut round = RoundState::new(names());
        assert_eq!(
            round.set_yellow_cards(Team::EastWest, 1, RuleVariant::Regular),
            Err(RoundError::NotTournament)
        );
        assert_eq!(
            round.set_yellow_cards(Team::EastWest, 1, RuleVariant::Tournament),
            Err(RoundError::YellowCardsUnavailable)
        );
    }

    #[test]
    fn reopen_bidding_clears_later_flags() {
        let mut round = RoundState::new(names());
        bid_all(&mut round, [3, 3, 3, 3]);
        round.mark_bidding_complete();
        round.set_team_tricks(Team::NorthSouth, 7).unwrap();
        round.mark_tricks_complete();
        assert_eq!(round.phase(RuleVariant::Regular), RoundPhase::ReadyToFinalize);

        round.reopen_bidding();
        assert_eq!(round.phase(RuleVariant::Regular), RoundPhase::AwaitingBids);
        round.set_bid(PlayerPosition::North, Bid::Contract(5)).unwrap();
    }

    #[test]
    fn switching_bid_to_contract_drops_nello_result() {
        let mut round = RoundState::new(names());
        bid_all(&mut round, [0, 3, 4, 3]);
        round.mark_bidding_complete();
        round.set_team_tricks(Team::NorthSouth, 5).unwrap();
        round.mark_tricks_complete();
        round
            .record_nello_result(PlayerPosition::North, NelloOutcome::Failed)
            .unwrap();

        round.edit_bid(PlayerPosition::North, Bid::Contract(2));
        assert_eq!(round.player(PlayerPosition::North).nello_result, None);
        assert!(!round.player(PlayerPosition::North).is_nello());
    }

    #[test]
    fn seal_validates_history_rounds() {
        let mut round = RoundState::new(names());
        bid_all(&mut round, [0, 3, 4, 3]);
        round.edit_team_tricks(Team::NorthSouth, 6);
        round.edit_team_tricks(Team::EastWest, 6);
        assert_eq!(round.seal(RuleVariant::Regular), Err(RoundError::TrickTotal(12)));

        round.edit_team_tricks(Team::EastWest, 7);
        assert_eq!(
            round.seal(RuleVariant::Regular),
            Err(RoundError::NelloPending(PlayerPosition::North))
        );

        round.edit_nello_result(PlayerPosition::North, NelloOutcome::Made);
        round.edit_bid(PlayerPosition::South, Bid::BlindNello);
        round.edit_nello_result(PlayerPosition::South, NelloOutcome::Made);
        assert_eq!(
            round.seal(RuleVariant::Tournament),
            Err(RoundError::BlindNelloNotAllowed(RuleVariant::Tournament))
        );
        assert_eq!(round.seal(RuleVariant::Regular), Ok(()));
        assert_eq!(round.phase(RuleVariant::Regular), RoundPhase::ReadyToFinalize);
    }
}
