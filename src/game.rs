use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BoardDims {
    pub width: u32,
    pub height: u32,
    pub goal_width: u32,
    pub free_kick: u32,
}

impl Default for BoardDims {
    fn default() -> Self {
        BoardDims {
            width: 21,
            height: 31,
            goal_width: 6,
            free_kick: 5,
        }
    }
}

impl fmt::Display for BoardDims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.width, self.height, self.goal_width, self.free_kick
        )
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn to_index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn from_number(n: u32) -> Option<Player> {
        match n {
            1 => Some(Player::One),
            2 => Some(Player::Two),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Outcome {
    #[default]
    Undetermined,
    Win(Player),
}

impl Outcome {
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(player) => Some(player),
            Outcome::Undetermined => None,
        }
    }

    pub fn is_determined(self) -> bool {
        self != Outcome::Undetermined
    }

    pub fn score_str(self) -> &'static str {
        match self {
            Outcome::Win(Player::One) => "1-0",
            Outcome::Win(Player::Two) => "0-1",
            Outcome::Undetermined => "???",
        }
    }
}

/// Snapshot of the arbiter's view of a game. Both fields empty means
/// the engine answered but reported neither a turn nor a result; that
/// never counts as a finished game.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Status {
    pub active: Option<Player>,
    pub winner: Option<Player>,
}

impl Status {
    /// Scans `key: value` response lines in order. A win line clears the
    /// active player even if an earlier line set it; anything unparsable
    /// is skipped.
    pub fn parse(lines: &[String]) -> Status {
        let mut status = Status::default();
        for line in lines {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_ascii_lowercase();
            match key.as_str() {
                "active player" => {
                    status.active = value.parse::<u32>().ok().and_then(Player::from_number);
                }
                "status" => {
                    if value.contains("player 1 win") {
                        status.winner = Some(Player::One);
                        status.active = None;
                    } else if value.contains("player 2 win") {
                        status.winner = Some(Player::Two);
                        status.active = None;
                    }
                }
                _ => {}
            }
        }
        status
    }
}
