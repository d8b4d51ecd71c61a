use crate::game::{Outcome, Player};

#[derive(Debug, Clone)]
pub struct MoveEntry {
    pub player: Player,
    pub text: String,
    pub commentary: Vec<String>,
}

/// Everything one game produced: the moves in play order, the outcome,
/// and an optional failure note when the game did not end over the board.
/// Aborted games simply stop appending; nothing is rewritten.
#[derive(Debug, Clone, Default)]
pub struct GameRecord {
    moves: Vec<MoveEntry>,
    outcome: Outcome,
    failure: Option<String>,
    steps: u64,
}

impl GameRecord {
    pub fn new() -> GameRecord {
        GameRecord::default()
    }

    pub fn push_move(&mut self, player: Player, text: String, commentary: Vec<String>) {
        self.steps += text.split_whitespace().count() as u64;
        self.moves.push(MoveEntry {
            player,
            text,
            commentary,
        });
    }

    pub fn fail(&mut self, reason: impl Into<String>) {
        self.failure = Some(reason.into());
    }

    pub fn set_outcome(&mut self, outcome: Outcome) {
        self.outcome = outcome;
    }

    pub fn moves(&self) -> &[MoveEntry] {
        &self.moves
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Total step tokens over all moves; a paper-football move is a chain
    /// of steps, so this runs ahead of the ply count.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn plies(&self) -> usize {
        self.moves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_step_tokens_not_plies() {
        let mut record = GameRecord::new();
        record.push_move(Player::One, "E E N".to_string(), vec![]);
        record.push_move(Player::Two, "W".to_string(), vec![]);
        assert_eq!(record.plies(), 2);
        assert_eq!(record.steps(), 4);
    }

    #[test]
    fn preserves_play_order() {
        let mut record = GameRecord::new();
        record.push_move(Player::One, "E".to_string(), vec!["deep".to_string()]);
        record.push_move(Player::Two, "NW SE".to_string(), vec![]);
        let players: Vec<_> = record.moves().iter().map(|m| m.player).collect();
        assert_eq!(players, vec![Player::One, Player::Two]);
        assert_eq!(record.moves()[0].commentary, vec!["deep".to_string()]);
    }

    #[test]
    fn fresh_record_is_undetermined() {
        let record = GameRecord::new();
        assert_eq!(record.outcome(), Outcome::Undetermined);
        assert_eq!(record.failure(), None);
        assert_eq!(record.plies(), 0);
    }

    #[test]
    fn last_outcome_wins() {
        let mut record = GameRecord::new();
        record.set_outcome(Outcome::Win(Player::One));
        record.set_outcome(Outcome::Win(Player::Two));
        assert_eq!(record.outcome(), Outcome::Win(Player::Two));
    }

    #[test]
    fn failure_text_is_kept_verbatim() {
        let mut record = GameRecord::new();
        record.fail("Infinite game");
        assert_eq!(record.failure(), Some("Infinite game"));
        assert_eq!(record.outcome(), Outcome::Undetermined);
    }
}
