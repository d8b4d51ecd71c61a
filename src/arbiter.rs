use crate::engine::{EngineSession, StepVerdict};
use crate::game::{Outcome, Player};
use crate::record::GameRecord;
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct MatchRules {
    pub ply_cap: u64,
    pub commentary: bool,
}

impl Default for MatchRules {
    fn default() -> Self {
        MatchRules {
            ply_cap: 1000,
            commentary: true,
        }
    }
}

/// Plays one game to the end. The arbiter session is ground truth for
/// legality and termination; the two player sessions keep their own
/// boards in sync by replaying every accepted move.
///
/// Attribution on abort is fixed per cause: a move the arbiter rejects
/// (or that fails to pass the turn) loses for the mover; a move the
/// opponent's own session rejects loses for the opponent. Only
/// communication failures before any verdict leave the outcome open.
pub fn run_match(
    arbiter: &mut EngineSession,
    one: &mut EngineSession,
    two: &mut EngineSession,
    rules: &MatchRules,
) -> GameRecord {
    let mut record = GameRecord::new();

    if let Err(e) = arbiter.status() {
        record.fail(format!("Arbiter gave no initial status: {e}"));
        return record;
    }

    for ply in 0..rules.ply_cap {
        let mover = if ply % 2 == 0 { Player::One } else { Player::Two };
        let (engine, opponent) = match mover {
            Player::One => (&mut *one, &mut *two),
            Player::Two => (&mut *two, &mut *one),
        };

        let reply = engine.go(rules.commentary);
        if reply.is_unknown() {
            warn!("{} produced no usable move", engine.name());
        }
        info!("{mover}> {}", reply.move_text);
        let move_text = reply.move_text.clone();
        record.push_move(mover, reply.move_text, reply.commentary);

        match arbiter.step(&move_text) {
            Ok(StepVerdict::Accepted) => {}
            Ok(StepVerdict::Rejected(reasons)) => {
                for reason in &reasons {
                    info!("arbiter: {reason}");
                }
                record.fail(format!(
                    "Check failed for move {move_text} from engine {mover}."
                ));
                record.set_outcome(Outcome::Win(mover.other()));
                return record;
            }
            Err(e) => {
                record.fail(format!(
                    "Check failed for move {move_text} from engine {mover}: {e}"
                ));
                record.set_outcome(Outcome::Win(mover.other()));
                return record;
            }
        }

        let status = match arbiter.status() {
            Ok(status) => status,
            Err(e) => {
                // No verdict on an accepted move is treated like a failed
                // check; the mover carries the blame (known asymmetric
                // policy, kept as-is).
                record.fail(format!(
                    "Check failed for move {move_text} from engine {mover}: {e}"
                ));
                record.set_outcome(Outcome::Win(mover.other()));
                return record;
            }
        };

        if let Some(winner) = status.winner {
            debug!("winner reported after ply {}: {winner}", ply + 1);
            record.set_outcome(Outcome::Win(winner));
            return record;
        }

        if status.active != Some(mover.other()) {
            info!("active player did not advance, too long move?");
            record.fail(format!(
                "Check failed for move {move_text} from engine {mover}."
            ));
            record.set_outcome(Outcome::Win(mover.other()));
            return record;
        }

        match opponent.step(&move_text) {
            Ok(StepVerdict::Accepted) => {}
            Ok(StepVerdict::Rejected(reasons)) => {
                for reason in &reasons {
                    info!("{}: {reason}", opponent.name());
                }
                record.fail(format!(
                    "Move {move_text} rejected by engine {}.",
                    mover.other()
                ));
                record.set_outcome(Outcome::Win(mover));
                return record;
            }
            Err(e) => {
                record.fail(format!(
                    "Move {move_text} rejected by engine {}: {e}",
                    mover.other()
                ));
                record.set_outcome(Outcome::Win(mover));
                return record;
            }
        }
    }

    record.fail("Infinite game");
    record
}
