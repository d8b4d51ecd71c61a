use crate::params::AiParams;
use crate::record::GameRecord;
use chrono::{DateTime, Utc};

mod ledger_out_wrapper;
mod reporter_wrapper;
mod round_robin;

pub use ledger_out_wrapper::LedgerOutWrapper;
pub use reporter_wrapper::ReporterWrapper;
pub use round_robin::{Pairing, RoundRobin, Schedule};

#[derive(Debug, Clone)]
pub struct MatchTicket {
    pub id: u64,
    pub round: u64,
    pub engines: [usize; 2],
}

/// Identifying metadata for one side of a match, kept with the record so
/// persistence can attribute the game.
#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub name: String,
    pub seed: u64,
    pub params: AiParams,
}

#[derive(Debug, Clone)]
pub struct MatchResult {
    pub ticket: MatchTicket,
    pub game_start: DateTime<Utc>,
    pub players: [PlayerInfo; 2],
    pub record: GameRecord,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TournamentState {
    Continue,
    Stop,
}

pub trait Tournament {
    fn next(&mut self) -> Option<MatchTicket>;
    fn match_complete(&mut self, result: MatchResult) -> TournamentState;
    fn tournament_complete(&self);
    fn expected_maximum_match_count(&self) -> Option<u64>;
}
