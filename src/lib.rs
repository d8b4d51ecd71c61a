//! Tournament driver for paper-football engines speaking a line-oriented
//! stdin/stdout protocol.

pub mod arbiter;
pub mod channel;
pub mod cli;
pub mod engine;
pub mod game;
pub mod ledger;
pub mod params;
pub mod record;
pub mod runner;
pub mod tournament;
