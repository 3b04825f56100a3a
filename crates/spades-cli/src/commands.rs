use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use spades_core::AppInfo;
use spades_core::game::confirm::ConfirmationGate;
use spades_core::game::match_state::{MatchError, MatchState};
use spades_core::model::bid::{Bid, NelloOutcome, TRICKS_PER_ROUND, parse_count};
use spades_core::model::player::{PlayerPosition, Team};
use spades_core::model::round::RoundPhase;
use spades_core::model::variant::RuleVariant;

use crate::render;

#[derive(Debug, Parser)]
#[command(
    name = AppInfo::name(),
    author,
    version = AppInfo::version(),
    about = AppInfo::description()
)]
pub struct Cli {
    /// Path to the YAML configuration file (defaults to ./spades.yaml when present).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the saved match location from the configuration.
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Approve every confirmation without prompting.
    #[arg(short = 'y', long)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReopenStage {
    Bids,
    Tricks,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start a new match, discarding the current one.
    New {
        #[arg(long, value_parser = parse_variant)]
        variant: Option<RuleVariant>,
        #[arg(long, value_name = "NAME")]
        team1: Option<String>,
        #[arg(long, value_name = "NAME")]
        team2: Option<String>,
    },
    /// Change the rule variant before the first round is finalized.
    Variant {
        #[arg(value_parser = parse_variant)]
        variant: RuleVariant,
    },
    /// Show scores and the round being entered.
    Status,
    /// Enter a bid: a trick count, `nello` or `blind`.
    Bid {
        #[arg(value_parser = parse_seat)]
        seat: PlayerPosition,
        bid: String,
    },
    SubmitBids,
    /// Set a team's tricks; the other team gets the rest of the 13.
    Tricks {
        #[arg(value_parser = parse_team)]
        team: Team,
        count: String,
    },
    /// Set one player's tricks; the team total is the sum of both partners.
    PlayerTricks {
        #[arg(value_parser = parse_seat)]
        seat: PlayerPosition,
        count: String,
    },
    SubmitTricks,
    /// Record whether a nello bidder took zero tricks.
    Nello {
        #[arg(value_parser = parse_seat)]
        seat: PlayerPosition,
        #[arg(value_parser = parse_outcome)]
        result: NelloOutcome,
    },
    /// Yellow cards a team received this round (tournament only).
    Yellow {
        #[arg(value_parser = parse_team)]
        team: Team,
        count: String,
    },
    ConfirmYellow,
    /// Show what finalizing the round would score.
    Preview,
    Finalize,
    /// Reopen bidding or trick entry for the current round.
    Reopen {
        #[arg(value_enum)]
        stage: ReopenStage,
    },
    /// Correct a finalized round and recompute every later score.
    EditRound {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        round: u32,
        /// SEAT=BID, e.g. `n=4` or `e=nello`.
        #[arg(long = "bid", value_parser = parse_seat_bid)]
        bids: Vec<(PlayerPosition, Bid)>,
        /// TEAM=COUNT; the other team gets the rest of the 13.
        #[arg(long = "tricks", value_parser = parse_team_count)]
        tricks: Vec<(Team, u8)>,
        /// SEAT=made|failed.
        #[arg(long = "nello", value_parser = parse_seat_outcome)]
        nello: Vec<(PlayerPosition, NelloOutcome)>,
        /// TEAM=COUNT.
        #[arg(long = "yellow", value_parser = parse_team_count)]
        yellow: Vec<(Team, u8)>,
    },
    History,
    /// Print the rules of the active (or given) variant.
    Rules {
        #[arg(long, value_parser = parse_variant)]
        variant: Option<RuleVariant>,
    },
    RenameTeam {
        #[arg(value_parser = parse_team)]
        team: Team,
        name: String,
    },
    RenamePlayer {
        #[arg(value_parser = parse_seat)]
        seat: PlayerPosition,
        name: String,
    },
    /// Clear scores and history, keeping names; `--all` also resets names and variant.
    Reset {
        #[arg(long)]
        all: bool,
    },
}

/// Text to print after a command ran. `changed` is false for read-only
/// commands, which never trigger a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub changed: bool,
}

impl Report {
    fn changed(text: String) -> Self {
        Self {
            text,
            changed: true,
        }
    }

    fn unchanged(text: String) -> Self {
        Self {
            text,
            changed: false,
        }
    }
}

pub fn execute(
    command: Command,
    state: &mut MatchState,
    gate: &mut impl ConfirmationGate,
    default_variant: RuleVariant,
) -> Result<Report, MatchError> {
    match command {
        Command::New {
            variant,
            team1,
            team2,
        } => {
            let variant = variant.unwrap_or(default_variant);
            if state.history().is_empty() && state.phase() == RoundPhase::AwaitingBids {
                *state = MatchState::new(variant);
            } else {
                state.reset_everything(gate)?;
                state.set_variant(variant)?;
            }
            if let Some(name) = team1 {
                state.rename_team(Team::NorthSouth, name);
            }
            if let Some(name) = team2 {
                state.rename_team(Team::EastWest, name);
            }
        }
        Command::Variant { variant } => state.set_variant(variant)?,
        Command::Status => return Ok(Report::unchanged(render::status(state))),
        Command::Bid { seat, bid } => state.set_bid(seat, Bid::parse(&bid))?,
        Command::SubmitBids => state.submit_bids(gate)?,
        Command::Tricks { team, count } => state.set_team_tricks(team, parse_count(&count))?,
        Command::PlayerTricks { seat, count } => {
            state.set_player_tricks(seat, parse_count(&count))?
        }
        Command::SubmitTricks => state.submit_tricks(gate)?,
        Command::Nello { seat, result } => state.record_nello_result(seat, result)?,
        Command::Yellow { team, count } => {
            state.set_yellow_cards(team, u32::from(parse_count(&count)))?
        }
        Command::ConfirmYellow => state.confirm_yellow_cards(gate)?,
        Command::Preview => {
            let preview = state.preview()?;
            return Ok(Report::unchanged(render::preview(state, &preview)));
        }
        Command::Finalize => {
            state.finalize_round(gate)?;
        }
        Command::Reopen { stage } => match stage {
            ReopenStage::Bids => state.reopen_bidding()?,
            ReopenStage::Tricks => state.reopen_tricks()?,
        },
        Command::EditRound {
            round,
            bids,
            tricks,
            nello,
            yellow,
        } => {
            let index = (round - 1) as usize;
            let len = state.history().len();
            let mut edited = state
                .history()
                .get(index)
                .map(|record| record.round.clone())
                .ok_or(MatchError::HistoryIndex { index, len })?;
            for (seat, bid) in bids {
                edited.edit_bid(seat, bid);
            }
            for (team, count) in tricks {
                edited.edit_team_tricks(team, count);
                edited.edit_team_tricks(team.opponent(), TRICKS_PER_ROUND - count);
            }
            for (seat, outcome) in nello {
                edited.edit_nello_result(seat, outcome);
            }
            for (team, cards) in yellow {
                edited.edit_yellow_cards(team, u32::from(cards));
            }
            state.edit_round(index, edited, gate)?;
            return Ok(Report::changed(render::history(state)));
        }
        Command::History => return Ok(Report::unchanged(render::history(state))),
        Command::Rules { variant } => {
            let variant = variant.unwrap_or(state.variant());
            return Ok(Report::unchanged(variant.rules_text()));
        }
        Command::RenameTeam { team, name } => state.rename_team(team, name),
        Command::RenamePlayer { seat, name } => state.rename_player(seat, name),
        Command::Reset { all } => {
            if all {
                state.reset_everything(gate)?;
                state.set_variant(default_variant)?;
            } else {
                state.reset_game(gate)?;
            }
        }
    }
    Ok(Report::changed(render::status(state)))
}

fn parse_seat(value: &str) -> Result<PlayerPosition, String> {
    PlayerPosition::from_str(value)
        .ok_or_else(|| format!("unknown seat '{value}' (expected north, east, south or west)"))
}

fn parse_team(value: &str) -> Result<Team, String> {
    Team::from_str(value).ok_or_else(|| format!("unknown team '{value}' (expected 1, 2, ns or ew)"))
}

fn parse_variant(value: &str) -> Result<RuleVariant, String> {
    RuleVariant::from_str(value).ok_or_else(|| {
        format!("unknown variant '{value}' (expected regular, short, tournament or finals)")
    })
}

fn parse_outcome(value: &str) -> Result<NelloOutcome, String> {
    NelloOutcome::from_str(value)
        .ok_or_else(|| format!("unknown nello result '{value}' (expected made or failed)"))
}

fn split_pair(value: &str) -> Result<(&str, &str), String> {
    value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))
}

fn parse_seat_bid(value: &str) -> Result<(PlayerPosition, Bid), String> {
    let (seat, bid) = split_pair(value)?;
    Ok((parse_seat(seat)?, Bid::parse(bid)))
}

fn parse_seat_outcome(value: &str) -> Result<(PlayerPosition, NelloOutcome), String> {
    let (seat, outcome) = split_pair(value)?;
    Ok((parse_seat(seat)?, parse_outcome(outcome)?))
}

fn parse_team_count(value: &str) -> Result<(Team, u8), String> {
    let (team, count) = split_pair(value)?;
    Ok((parse_team(team)?, parse_count(count)))
}
