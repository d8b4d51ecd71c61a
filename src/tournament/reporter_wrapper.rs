use crate::game::Player;
use crate::tournament::{MatchResult, MatchTicket, Tournament, TournamentState};
use itertools::Itertools;

/// Console decorator: one line per game start and finish, and a final
/// crosstable sorted by wins once the tournament drains.
pub struct ReporterWrapper {
    inner: Box<dyn Tournament>,
    engine_names: Vec<String>,
    wins: Vec<u64>,
    games: Vec<u64>,
    results: Vec<Vec<String>>,
}

impl ReporterWrapper {
    pub fn new(inner: Box<dyn Tournament>, engine_names: Vec<String>) -> ReporterWrapper {
        let field = engine_names.len();
        ReporterWrapper {
            inner,
            engine_names,
            wins: vec![0; field],
            games: vec![0; field],
            results: vec![vec![String::new(); field]; field],
        }
    }

    fn format_of_max_string(&self) -> String {
        match self.expected_maximum_match_count() {
            Some(count) => format!(" of {count}"),
            None => String::from(""),
        }
    }

    fn tally(&mut self, winner: usize, loser: usize) {
        self.results[winner][loser].push('1');
        self.results[loser][winner].push('0');
        self.wins[winner] += 1;
        self.games[winner] += 1;
        self.games[loser] += 1;
    }

    fn print_standings(&self) {
        for line in self.standings_lines() {
            println!("{line}");
        }
    }

    fn standings_lines(&self) -> Vec<String> {
        let field = self.engine_names.len();
        let mut order: Vec<usize> = (0..field).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(self.wins[i]));

        let name_width = self
            .engine_names
            .iter()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6);
        let cell_width = self
            .results
            .iter()
            .flatten()
            .map(|cell| cell.len())
            .max()
            .unwrap_or(0);

        let mut rows = Vec::with_capacity(field);
        for (rank, &p1) in order.iter().enumerate() {
            let cells = order
                .iter()
                .filter_map(|&p2| {
                    if p1 == p2 {
                        // the diagonal is dropped for a two-player field
                        if field > 2 {
                            Some("=".repeat(cell_width))
                        } else {
                            None
                        }
                    } else {
                        let mut cell = self.results[p1][p2].clone();
                        while cell.len() < cell_width {
                            cell.push('.');
                        }
                        Some(cell)
                    }
                })
                .join(" ");
            let win_rate = if self.games[p1] > 0 {
                format!("{:.3}", self.wins[p1] as f64 / self.games[p1] as f64)
            } else {
                String::from("-")
            };
            rows.push(format!(
                "{:2}. {:<name_width$}   {cells} {:5} {:5}    {win_rate:>5}",
                rank + 1,
                self.engine_names[p1],
                self.wins[p1],
                self.games[p1],
            ));
        }
        rows
    }
}

impl Tournament for ReporterWrapper {
    fn next(&mut self) -> Option<MatchTicket> {
        let ticket = self.inner.as_mut().next();
        if let Some(ticket) = &ticket {
            println!(
                "Started game {}{} ({} vs {})",
                ticket.id + 1,
                self.format_of_max_string(),
                &self.engine_names[ticket.engines[0]],
                &self.engine_names[ticket.engines[1]]
            );
        }
        ticket
    }
    fn match_complete(&mut self, result: MatchResult) -> TournamentState {
        let ticket = &result.ticket;
        println!(
            "Finished game {} ({} vs {}): {} {{{}}}",
            ticket.id + 1,
            &self.engine_names[ticket.engines[0]],
            &self.engine_names[ticket.engines[1]],
            result.record.outcome().score_str(),
            result.record.failure().unwrap_or("OK"),
        );
        match result.record.outcome().winner() {
            Some(Player::One) => self.tally(ticket.engines[0], ticket.engines[1]),
            Some(Player::Two) => self.tally(ticket.engines[1], ticket.engines[0]),
            None => {}
        }
        self.inner.as_mut().match_complete(result)
    }
    fn tournament_complete(&self) {
        self.print_standings();
        self.inner.as_ref().tournament_complete();
    }
    fn expected_maximum_match_count(&self) -> Option<u64> {
        self.inner.as_ref().expected_maximum_match_count()
    }
}
