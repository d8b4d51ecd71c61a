use crate::tournament::{MatchResult, MatchTicket, Tournament, TournamentState};

/// One scheduled game: the global 1-based round plus the two competitor
/// slots, home side first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub round: u64,
    pub home: usize,
    pub away: usize,
}

/// Circle-method pairing sequence over competitor indices. An odd field
/// gets a synthetic bye slot so the rotation stays even; games against
/// the bye are skipped. Home and away alternate by the parity of
/// `i1 + i2 + cycle`, which balances orientation across repeat cycles.
#[derive(Debug, Clone)]
pub struct Schedule {
    competitors: usize,
    slots: usize,
    cycles: u64,
    cycle: u64,
    rounds_done: u64,
    round: u64,
    i1: usize,
}

impl Schedule {
    pub fn new(competitors: usize, cycles: u64) -> Schedule {
        Schedule {
            competitors,
            slots: competitors + competitors % 2,
            cycles: if competitors < 2 { 0 } else { cycles },
            cycle: 0,
            rounds_done: 0,
            round: 1,
            i1: 0,
        }
    }

    /// Real pairings over the whole schedule, bye games excluded.
    pub fn pairing_count(&self) -> u64 {
        if self.competitors < 2 {
            return 0;
        }
        let n = self.competitors as u64;
        self.cycles * n * (n - 1) / 2
    }
}

impl Iterator for Schedule {
    type Item = Pairing;

    fn next(&mut self) -> Option<Pairing> {
        loop {
            if self.cycle >= self.cycles {
                return None;
            }

            if self.i1 >= self.slots {
                self.i1 = 0;
                self.round += 1;
                self.rounds_done += 1;
                if self.rounds_done >= (self.slots - 1) as u64 {
                    self.rounds_done = 0;
                    self.cycle += 1;
                }
                continue;
            }

            let i1 = self.i1;
            self.i1 += 1;

            let wheel = (self.slots - 1) as i64;
            let mut i2 = (self.round as i64 - i1 as i64 - 1).rem_euclid(wheel) as usize;
            if i2 == i1 {
                i2 = self.slots - 1;
            }
            // keep each unordered pair once; i2 past the field is the bye
            if i1 > i2 || i2 >= self.competitors {
                continue;
            }

            let pairing = if (i1 + i2 + self.cycle as usize) % 2 == 0 {
                Pairing {
                    round: self.round,
                    home: i1,
                    away: i2,
                }
            } else {
                Pairing {
                    round: self.round,
                    home: i2,
                    away: i1,
                }
            };
            return Some(pairing);
        }
    }
}

#[derive(Debug)]
pub struct RoundRobin {
    schedule: Schedule,
    match_index: u64,
    completed_matches: u64,
    total_matches: u64,
}

impl RoundRobin {
    pub fn new(competitors: usize, cycles: u64) -> RoundRobin {
        let schedule = Schedule::new(competitors, cycles);
        RoundRobin {
            total_matches: schedule.pairing_count(),
            schedule,
            match_index: 0,
            completed_matches: 0,
        }
    }
}

impl Tournament for RoundRobin {
    fn next(&mut self) -> Option<MatchTicket> {
        let pairing = self.schedule.next()?;
        let id = self.match_index;
        self.match_index += 1;
        Some(MatchTicket {
            id,
            round: pairing.round,
            engines: [pairing.home, pairing.away],
        })
    }
    fn match_complete(&mut self, _: MatchResult) -> TournamentState {
        self.completed_matches += 1;

        if self.completed_matches >= self.total_matches {
            TournamentState::Stop
        } else {
            TournamentState::Continue
        }
    }
    fn tournament_complete(&self) {}
    fn expected_maximum_match_count(&self) -> Option<u64> {
        Some(self.total_matches)
    }
}
