use serde::{Deserialize, Serialize};

use crate::model::player::Team;

/// Running record for one partnership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamScore {
    pub name: String,
    #[serde(default)]
    pub player_names: [String; 2],
    #[serde(default)]
    pub score: i32,
    /// Bags not yet converted into a penalty; always below the bag threshold.
    #[serde(default)]
    pub bags: u32,
    /// Every bag ever taken, used to break ties.
    #[serde(default)]
    pub total_bags: u32,
    #[serde(default)]
    pub yellow_cards: u32,
    /// Cards already charged as part of a penalty pair.
    #[serde(default)]
    pub penalized_yellow_cards: u32,
    #[serde(default)]
    pub consecutive_nellos: u32,
}

impl TeamScore {
    pub fn new(name: impl Into<String>, player_names: [String; 2]) -> Self {
        Self {
            name: name.into(),
            player_names,
            score: 0,
            bags: 0,
            total_bags: 0,
            yellow_cards: 0,
            penalized_yellow_cards: 0,
            consecutive_nellos: 0,
        }
    }

    pub fn for_team(team: Team) -> Self {
        match team {
            Team::NorthSouth => Self::new(
                "Team 1",
                ["Player 1".to_string(), "Player 2".to_string()],
            ),
            Team::EastWest => Self::new(
                "Team 2",
                ["Player 3".to_string(), "Player 4".to_string()],
            ),
        }
    }

    /// Same names, every counter back to zero.
    pub fn zeroed(&self) -> Self {
        Self::new(self.name.clone(), self.player_names.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBoard {
    teams: [TeamScore; 2],
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self {
            teams: [
                TeamScore::for_team(Team::NorthSouth),
                TeamScore::for_team(Team::EastWest),
            ],
        }
    }

    /// Blank player names, as left by saves that predate them, take the seat
    /// defaults.
    pub fn from_teams(mut teams: [TeamScore; 2]) -> Self {
        for team in Team::BOTH {
            let defaults = TeamScore::for_team(team).player_names;
            for (name, default) in teams[team.index()].player_names.iter_mut().zip(defaults) {
                if name.trim().is_empty() {
                    *name = default;
                }
            }
        }
        Self { teams }
    }

    pub fn team(&self, team: Team) -> &TeamScore {
        &self.teams[team.index()]
    }

    pub fn team_mut(&mut self, team: Team) -> &mut TeamScore {
        &mut self.teams[team.index()]
    }

    pub fn set_team(&mut self, team: Team, score: TeamScore) {
        self.teams[team.index()] = score;
    }

    pub fn teams(&self) -> &[TeamScore; 2] {
        &self.teams
    }

    /// Points the team trails its opponent by (zero or negative when ahead).
    pub fn deficit(&self, team: Team) -> i32 {
        self.team(team.opponent()).score - self.team(team).score
    }

    pub fn zeroed(&self) -> Self {
        Self {
            teams: [self.teams[0].zeroed(), self.teams[1].zeroed()],
        }
    }

    /// Higher score leads; equal scores fall to fewer total bags. `None` when
    /// both agree.
    pub fn leading_team(&self) -> Option<Team> {
        let ns = self.team(Team::NorthSouth);
        let ew = self.team(Team::EastWest);
        match ns.score.cmp(&ew.score) {
            std::cmp::Ordering::Greater => Some(Team::NorthSouth),
            std::cmp::Ordering::Less => Some(Team::EastWest),
            std::cmp::Ordering::Equal => match ns.total_bags.cmp(&ew.total_bags) {
                std::cmp::Ordering::Less => Some(Team::NorthSouth),
                std::cmp::Ordering::Greater => Some(Team::EastWest),
                std::cmp::Ordering::Equal => None,
            },
        }
    }
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{ScoreBoard, TeamScore};
    use crate::model::player::Team;

    #[test]
    fn default_names_follow_seating() {
        let board = ScoreBoard::new();
        assert_eq!(board.team(Team::NorthSouth).name, "Team 1");
        assert_eq!(board.team(Team::EastWest).player_names[1], "Player 4");
    }

    #[test]
    fn blank_stored_names_take_seat_defaults() {
        let board = ScoreBoard::from_teams([
            TeamScore::new("Aces", [String::new(), "Bea".to_string()]),
            TeamScore::new("Kings", [String::new(), String::new()]),
        ]);
        assert_eq!(board.team(Team::NorthSouth).player_names, ["Player 1", "Bea"]);
        assert_eq!(board.team(Team::EastWest).player_names, ["Player 3", "Player 4"]);
        assert_eq!(board.team(Team::EastWest).name, "Kings");
    }

    #[test]
    fn deficit_is_relative_to_opponent() {
        let mut board = ScoreBoard::new();
        board.team_mut(Team::EastWest).score = 300;
        board.team_mut(Team::NorthSouth).score = 20;
        assert_eq!(board.deficit(Team::NorthSouth), 280);
        assert_eq!(board.deficit(Team::EastWest), -280);
    }

    #[test]
    fn leading_team_breaks_ties_on_total_bags() {
        let mut board = ScoreBoard::new();
        board.team_mut(Team::NorthSouth).score = 260;
        board.team_mut(Team::EastWest).score = 260;
        board.team_mut(Team::NorthSouth).total_bags = 9;
        board.team_mut(Team::EastWest).total_bags = 4;
        assert_eq!(board.leading_team(), Some(Team::EastWest));

        board.team_mut(Team::NorthSouth).total_bags = 4;
        assert_eq!(board.leading_team(), None);
    }

    #[test]
    fn zeroed_keeps_names() {
        let mut score = TeamScore::for_team(Team::NorthSouth);
        score.name = "Aces".to_string();
        score.score = 120;
        score.bags = 3;
        score.penalized_yellow_cards = 2;
        let zeroed = score.zeroed();
        assert_eq!(zeroed.name, "Aces");
        assert_eq!(zeroed.score, 0);
        assert_eq!(zeroed.bags, 0);
        assert_eq!(zeroed.penalized_yellow_cards, 0);
    }

    #[test]
    fn missing_counters_default_to_zero() {
        let legacy = r#"{ "name": "Team 1", "score": 40, "bags": 2 }"#;
        let score: TeamScore = serde_json::from_str(legacy).unwrap();
        assert_eq!(score.score, 40);
        assert_eq!(score.penalized_yellow_cards, 0);
        assert_eq!(score.total_bags, 0);
    }
}
