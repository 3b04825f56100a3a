use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, de};

/// Tricks dealt per round; also the ceiling for any single count.
pub const TRICKS_PER_ROUND: u8 = 13;

/// A seat's bid. A contract of zero tricks is a nello, so a non-zero bid and a
/// nello flag can never coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Bid {
    Contract(u8),
    #[default]
    Nello,
    BlindNello,
}

impl Bid {
    /// Build a bid from a trick count; zero maps to nello, counts clamp to 13.
    pub fn tricks(count: u8) -> Self {
        match count.min(TRICKS_PER_ROUND) {
            0 => Bid::Nello,
            n => Bid::Contract(n),
        }
    }

    pub const fn is_nello(self) -> bool {
        matches!(self, Bid::Nello | Bid::BlindNello)
    }

    pub const fn is_blind(self) -> bool {
        matches!(self, Bid::BlindNello)
    }

    /// Tricks this bid contributes to the team contract.
    pub const fn contract_tricks(self) -> u8 {
        match self {
            Bid::Contract(n) => n,
            Bid::Nello | Bid::BlindNello => 0,
        }
    }

    /// Parse operator input. `nello`/`nil` and `blind` select the special bids;
    /// anything else goes through [`parse_count`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "nello" | "nil" => Bid::Nello,
            "blind" | "blind-nello" | "blind-nil" | "bn" => Bid::BlindNello,
            other => Bid::tricks(parse_count(other)),
        }
    }
}

/// Wire shape of [`Bid`]; contracts are range-checked before they become bids.
#[derive(Deserialize)]
enum StoredBid {
    Contract(u8),
    Nello,
    BlindNello,
}

impl<'de> Deserialize<'de> for Bid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StoredBid::deserialize(deserializer)? {
            StoredBid::Contract(n) if (1..=TRICKS_PER_ROUND).contains(&n) => Ok(Bid::Contract(n)),
            StoredBid::Contract(n) => Err(de::Error::custom(format!(
                "contract of {n} tricks is outside 1..=13"
            ))),
            StoredBid::Nello => Ok(Bid::Nello),
            StoredBid::BlindNello => Ok(Bid::BlindNello),
        }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bid::Contract(n) => write!(f, "{n}"),
            Bid::Nello => f.write_str("Nello"),
            Bid::BlindNello => f.write_str("Blind Nello"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NelloOutcome {
    Made,
    Failed,
}

impl NelloOutcome {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "made" | "success" | "yes" | "y" => Some(NelloOutcome::Made),
            "failed" | "fail" | "no" | "n" => Some(NelloOutcome::Failed),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            NelloOutcome::Made => "made",
            NelloOutcome::Failed => "failed",
        }
    }
}

/// Coerce free-form numeric input: empty, non-numeric or negative input is 0,
/// large values saturate at 13.
pub fn parse_count(value: &str) -> u8 {
    let trimmed = value.trim();
    if trimmed.starts_with('-') {
        return 0;
    }
    match trimmed.parse::<u64>() {
        Ok(n) => n.min(TRICKS_PER_ROUND as u64) as u8,
        Err(_) => 0,
    }
}
