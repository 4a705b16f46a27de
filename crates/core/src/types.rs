//! Player identities and final scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two players of a game.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Red,
    Blue,
}

impl Player {
    /// Both players, in turn order of a fresh game.
    pub const ALL: [Player; 2] = [Player::Red, Player::Blue];

    /// Get the opposing player.
    pub fn opposite(self) -> Self {
        match self {
            Player::Red => Player::Blue,
            Player::Blue => Player::Red,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Red => write!(f, "red"),
            Player::Blue => write!(f, "blue"),
        }
    }
}

/// Final score of each player.
///
/// A positive score means that player won; a draw scores zero for both.
///
/// # Example
/// ```
/// use uct_core::{Player, Scores};
///
/// let scores = Scores::win(Player::Red);
/// assert_eq!(scores[Player::Red], 1);
/// assert!(!scores.is_win(Player::Blue));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    red: i32,
    blue: i32,
}

impl Scores {
    /// Create scores from explicit values.
    pub fn new(red: i32, blue: i32) -> Self {
        Self { red, blue }
    }

    /// `winner` scores +1, the other player -1.
    pub fn win(winner: Player) -> Self {
        match winner {
            Player::Red => Self::new(1, -1),
            Player::Blue => Self::new(-1, 1),
        }
    }

    /// Both players score 0.
    pub fn draw() -> Self {
        Self::new(0, 0)
    }

    /// Score of the given player.
    pub fn get(&self, player: Player) -> i32 {
        match player {
            Player::Red => self.red,
            Player::Blue => self.blue,
        }
    }

    /// True if the given player won.
    pub fn is_win(&self, player: Player) -> bool {
        self.get(player) > 0
    }

    /// The winning player, if any.
    pub fn winner(&self) -> Option<Player> {
        Player::ALL.into_iter().find(|&p| self.is_win(p))
    }
}

impl std::ops::Index<Player> for Scores {
    type Output = i32;

    fn index(&self, player: Player) -> &Self::Output {
        match player {
            Player::Red => &self.red,
            Player::Blue => &self.blue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_opposite() {
        assert_eq!(Player::Red.opposite(), Player::Blue);
        assert_eq!(Player::Blue.opposite(), Player::Red);
    }

    #[test]
    fn test_scores_win() {
        let scores = Scores::win(Player::Blue);
        assert_eq!(scores[Player::Blue], 1);
        assert_eq!(scores[Player::Red], -1);
        assert!(scores.is_win(Player::Blue));
        assert!(!scores.is_win(Player::Red));
        assert_eq!(scores.winner(), Some(Player::Blue));
    }

    #[test]
    fn test_scores_draw() {
        let scores = Scores::draw();
        assert!(!scores.is_win(Player::Red));
        assert!(!scores.is_win(Player::Blue));
        assert_eq!(scores.winner(), None);
    }

    #[test]
    fn test_player_display() {
        assert_eq!(Player::Red.to_string(), "red");
        assert_eq!(Player::Blue.to_string(), "blue");
    }
}
