use core::fmt;
use serde::{Deserialize, Serialize};

use crate::model::bid::{Bid, NelloOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerPosition {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl PlayerPosition {
    pub const LOOP: [PlayerPosition; 4] = [
        PlayerPosition::North,
        PlayerPosition::East,
        PlayerPosition::South,
        PlayerPosition::West,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn team(self) -> Team {
        match self {
            PlayerPosition::North | PlayerPosition::South => Team::NorthSouth,
            PlayerPosition::East | PlayerPosition::West => Team::EastWest,
        }
    }

    /// Slot of the seat inside its partnership (0 for North/East, 1 for South/West).
    pub const fn slot(self) -> usize {
        match self {
            PlayerPosition::North | PlayerPosition::East => 0,
            PlayerPosition::South | PlayerPosition::West => 1,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "n" | "north" => Some(PlayerPosition::North),
            "e" | "east" => Some(PlayerPosition::East),
            "s" | "south" => Some(PlayerPosition::South),
            "w" | "west" => Some(PlayerPosition::West),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlayerPosition::North => "North",
            PlayerPosition::East => "East",
            PlayerPosition::South => "South",
            PlayerPosition::West => "West",
        };
        f.write_str(label)
    }
}

/// One of the two fixed partnerships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    NorthSouth,
    EastWest,
}

impl Team {
    pub const BOTH: [Team; 2] = [Team::NorthSouth, Team::EastWest];

    pub const fn index(self) -> usize {
        match self {
            Team::NorthSouth => 0,
            Team::EastWest => 1,
        }
    }

    pub const fn seats(self) -> [PlayerPosition; 2] {
        match self {
            Team::NorthSouth => [PlayerPosition::North, PlayerPosition::South],
            Team::EastWest => [PlayerPosition::East, PlayerPosition::West],
        }
    }

    pub const fn opponent(self) -> Team {
        match self {
            Team::NorthSouth => Team::EastWest,
            Team::EastWest => Team::NorthSouth,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "1" | "ns" | "north-south" | "northsouth" => Some(Team::NorthSouth),
            "2" | "ew" | "east-west" | "eastwest" => Some(Team::EastWest),
            _ => None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::NorthSouth => f.write_str("North/South"),
            Team::EastWest => f.write_str("East/West"),
        }
    }
}

/// A seat's entries for a single round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub bid: Bid,
    #[serde(default)]
    pub tricks: Option<u8>,
    #[serde(default)]
    pub nello_result: Option<NelloOutcome>,
}

impl Player {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bid: Bid::default(),
            tricks: None,
            nello_result: None,
        }
    }

    pub fn is_nello(&self) -> bool {
        self.bid.is_nello()
    }

    /// True when the seat still owes a nello result.
    pub fn nello_pending(&self) -> bool {
        self.is_nello() && self.nello_result.is_none()
    }
}
