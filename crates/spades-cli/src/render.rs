use std::fmt::{self, Write};

use spades_core::game::history::{GameStatus, RoundRecord};
use spades_core::game::match_state::{MatchState, RoundPreview};
use spades_core::model::player::{PlayerPosition, Team};
use spades_core::model::round::RoundPhase;
use spades_core::model::settlement::SettlementBreakdown;

pub fn status(state: &MatchState) -> String {
    Status(state).to_string()
}

pub fn preview(state: &MatchState, preview: &RoundPreview) -> String {
    Preview { state, preview }.to_string()
}

pub fn history(state: &MatchState) -> String {
    History(state).to_string()
}

struct Status<'a>(&'a MatchState);

impl fmt::Display for Status<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let variant = state.variant();
        writeln!(f, "Variant: {variant}")?;
        for team in Team::BOTH {
            let score = state.scores().team(team);
            write!(
                f,
                "{} ({}): {} points, {} bags (total {})",
                score.name, team, score.score, score.bags, score.total_bags
            )?;
            if variant.is_tournament() {
                write!(f, ", {} yellow cards", score.yellow_cards)?;
            }
            f.write_char('\n')?;
        }

        match state.status() {
            GameStatus::Won { winner } => {
                return writeln!(
                    f,
                    "Game over: {} wins. Reset to start a new game.",
                    state.scores().team(winner).name
                );
            }
            GameStatus::Tied => writeln!(f, "Scores and bags are level; play another round.")?,
            GameStatus::InProgress => {}
        }

        let phase = state.phase();
        writeln!(f, "Round {}: {phase}", state.round_number())?;
        write_round(f, state, phase)
    }
}

fn write_round(out: &mut impl Write, state: &MatchState, phase: RoundPhase) -> fmt::Result {
    let round = state.round();
    for seat in PlayerPosition::LOOP {
        let player = round.player(seat);
        write!(
            out,
            "  {:<5} {:<12} bid {}",
            seat.to_string(),
            player.name,
            player.bid
        )?;
        if let Some(tricks) = player.tricks {
            write!(out, ", tricks {tricks}")?;
        }
        if let Some(result) = player.nello_result {
            write!(out, ", nello {}", result.as_str())?;
        }
        if phase == RoundPhase::AwaitingBids
            && !player.bid.is_blind()
            && state.blind_nello_available(seat)
        {
            out.write_str(" (blind nello available)")?;
        }
        out.write_char('\n')?;
    }
    if phase != RoundPhase::AwaitingBids {
        writeln!(
            out,
            "  Tricks: North/South {}, East/West {}",
            round.team_tricks(Team::NorthSouth),
            round.team_tricks(Team::EastWest)
        )?;
    }
    Ok(())
}

struct Preview<'a> {
    state: &'a MatchState,
    preview: &'a RoundPreview,
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for team in Team::BOTH {
            let before = self.state.scores().team(team);
            let settlement = self.preview.settlement(team);
            writeln!(
                f,
                "{}: {} -> {}",
                before.name, before.score, settlement.score.score
            )?;
            write_breakdown(f, &settlement.breakdown)?;
        }
        Ok(())
    }
}

fn write_breakdown(out: &mut impl Write, b: &SettlementBreakdown) -> fmt::Result {
    let verdict = if b.made_contract() { "made" } else { "set" };
    writeln!(
        out,
        "  Contract {} ({verdict}), won {}: {:+}",
        b.team_bid, b.tricks_won, b.contract_points
    )?;
    if b.nello_points != 0 {
        writeln!(out, "  Nello: {:+}", b.nello_points)?;
    }
    if b.bags_added > 0 {
        writeln!(out, "  Bags: +{}", b.bags_added)?;
    }
    if b.bag_penalties > 0 {
        writeln!(
            out,
            "  Bag penalty x{}: -{}",
            b.bag_penalties, b.bag_penalty_points
        )?;
    }
    if b.yellow_penalty_points > 0 {
        writeln!(out, "  Yellow cards: -{}", b.yellow_penalty_points)?;
    }
    Ok(())
}

struct History<'a>(&'a MatchState);

impl fmt::Display for History<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        if state.history().is_empty() {
            return writeln!(f, "No rounds played yet.");
        }
        for (index, record) in state.history().iter().enumerate() {
            write_history_entry(f, state, index, record)?;
        }
        Ok(())
    }
}

fn write_history_entry(
    out: &mut impl Write,
    state: &MatchState,
    index: usize,
    record: &RoundRecord,
) -> fmt::Result {
    writeln!(out, "Round {}", index + 1)?;
    for team in Team::BOTH {
        let result = record.result(team);
        let [first, second] = record.round.team_players(team);
        write!(
            out,
            "  {}: bids {} + {}, won {}, {:+} -> {} ({} bags)",
            state.scores().team(team).name,
            first.bid,
            second.bid,
            record.round.team_tricks(team),
            result.breakdown.points(),
            result.after.score,
            result.after.bags
        )?;
        if state.variant().is_tournament() {
            write!(out, ", {} yellow", result.breakdown.yellow_cards)?;
        }
        out.write_char('\n')?;
    }
    Ok(())
}
