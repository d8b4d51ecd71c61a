use crate::arbiter::{MatchRules, run_match};
use crate::engine::{EngineSpec, SessionError};
use crate::game::BoardDims;
use crate::record::GameRecord;
use crate::tournament::{MatchResult, MatchTicket, PlayerInfo, Tournament, TournamentState};
use chrono::Utc;
use crossbeam_channel;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::thread;

/// Engine seeds are drawn uniformly from [0, 10^9).
const SEED_RANGE: u64 = 1_000_000_000;

/// Worker pool that plays out tickets from a [`Tournament`]. Each worker
/// drives one match end-to-end: fresh sessions per match, the arbiter
/// loop, then teardown. When no dedicated arbiter engine is configured,
/// the home player's spec doubles as the arbiter.
#[derive(Debug)]
pub struct Runner {
    pub engines: Vec<EngineSpec>,
    pub arbiter: Option<EngineSpec>,
    pub dims: BoardDims,
    pub rules: MatchRules,
    pub concurrency: u64,
    pub rand_seed: Option<u64>,
}

impl Runner {
    pub fn run(&self, mut tournament: Box<dyn Tournament>) {
        let tournament = tournament.as_mut();

        let (send_ticket, recv_ticket) = crossbeam_channel::bounded(0);
        let (send_result, recv_result) = crossbeam_channel::bounded(0);

        let mut thread_handles = vec![];

        for i in 0..self.concurrency {
            let recv_ticket = recv_ticket.clone();
            let send_result = send_result.clone();
            let worker = Worker {
                engines: self.engines.clone(),
                arbiter: self.arbiter.clone(),
                dims: self.dims,
                rules: self.rules,
                // one seed stream per worker keeps -srand runs reproducible
                // at -concurrency 1
                rng: match self.rand_seed {
                    Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(i)),
                    None => ChaCha8Rng::from_os_rng(),
                },
            };
            thread_handles.push(thread::spawn(move || {
                worker.main(i, recv_ticket, send_result);
            }));
        }

        let mut state = TournamentState::Continue;
        let mut ticket = None;
        while state != TournamentState::Stop {
            if ticket.is_none() {
                ticket = tournament.next();
            }
            if ticket.is_none() {
                crossbeam_channel::select! {
                    recv(recv_result) -> result => state = tournament.match_complete(result.unwrap()),
                }
            } else {
                crossbeam_channel::select! {
                    recv(recv_result) -> result => state = tournament.match_complete(result.unwrap()),
                    send(send_ticket, ticket.clone()) -> result => {
                        assert!(result.is_ok());
                        ticket = None;
                    }
                }
            }
        }

        for _ in 0..self.concurrency {
            send_ticket.send(None).unwrap();
        }

        while let Some(h) = thread_handles.pop() {
            h.join().expect("could not join thread");
        }

        tournament.tournament_complete();
    }
}

struct Worker {
    engines: Vec<EngineSpec>,
    arbiter: Option<EngineSpec>,
    dims: BoardDims,
    rules: MatchRules,
    rng: ChaCha8Rng,
}

impl Worker {
    fn main(
        mut self,
        thread_index: u64,
        recv: crossbeam_channel::Receiver<Option<MatchTicket>>,
        send: crossbeam_channel::Sender<MatchResult>,
    ) {
        while let Some(ticket) = recv.recv().unwrap() {
            assert!(ticket.engines[0] != ticket.engines[1]);
            info!("Thread {thread_index} received ticket: {:?}", &ticket);

            let result = self.play(&ticket);

            info!("Thread {thread_index} sending result: {:?}", &result);
            send.send(result).unwrap();
        }
    }

    fn play(&mut self, ticket: &MatchTicket) -> MatchResult {
        let game_start = Utc::now();
        let specs = [
            &self.engines[ticket.engines[0]],
            &self.engines[ticket.engines[1]],
        ];
        let arbiter_spec = self.arbiter.as_ref().unwrap_or(specs[0]);

        let arbiter_seed = self.rng.random_range(0..SEED_RANGE);
        let seeds = [
            self.rng.random_range(0..SEED_RANGE),
            self.rng.random_range(0..SEED_RANGE),
        ];

        let players = [0usize, 1].map(|i| PlayerInfo {
            name: specs[i].display_name().to_string(),
            seed: seeds[i],
            params: specs[i].params.clone(),
        });

        let record = self.drive(arbiter_spec, specs, arbiter_seed, seeds);

        MatchResult {
            ticket: ticket.clone(),
            game_start,
            players,
            record,
        }
    }

    /// Launches the three sessions and plays the match. Early returns lean
    /// on the sessions' drop-time teardown; the normal path closes them
    /// explicitly in reverse launch order.
    fn drive(
        &self,
        arbiter_spec: &EngineSpec,
        specs: [&EngineSpec; 2],
        arbiter_seed: u64,
        seeds: [u64; 2],
    ) -> GameRecord {
        let launch_failure = |spec: &EngineSpec, e: SessionError| {
            let mut record = GameRecord::new();
            record.fail(format!("Engine {} failed to start: {e}", spec.display_name()));
            record
        };

        let mut arbiter = match arbiter_spec.launch(self.dims, arbiter_seed) {
            Ok(session) => session,
            Err(e) => return launch_failure(arbiter_spec, e),
        };
        let mut one = match specs[0].launch(self.dims, seeds[0]) {
            Ok(session) => session,
            Err(e) => return launch_failure(specs[0], e),
        };
        let mut two = match specs[1].launch(self.dims, seeds[1]) {
            Ok(session) => session,
            Err(e) => return launch_failure(specs[1], e),
        };

        let record = run_match(&mut arbiter, &mut one, &mut two, &self.rules);

        two.close();
        one.close();
        arbiter.close();

        record
    }
}
