use crate::game::BoardDims;
use crate::ledger::Ledger;
use crate::tournament::{MatchResult, MatchTicket, Tournament, TournamentState};
use log::debug;

/// Persistence decorator: every completed match is appended to the
/// ledger and written out as a transcript before being passed on.
pub struct LedgerOutWrapper {
    inner: Box<dyn Tournament>,
    ledger: Ledger,
    dims: BoardDims,
}

impl LedgerOutWrapper {
    pub fn new(
        inner: Box<dyn Tournament>,
        root: &str,
        dims: BoardDims,
    ) -> Result<LedgerOutWrapper, std::io::Error> {
        Ok(LedgerOutWrapper {
            inner,
            ledger: Ledger::open(root)?,
            dims,
        })
    }
}

impl Tournament for LedgerOutWrapper {
    fn next(&mut self) -> Option<MatchTicket> {
        self.inner.as_mut().next()
    }
    fn match_complete(&mut self, result: MatchResult) -> TournamentState {
        let id = self.ledger.record(&result, self.dims).unwrap();
        debug!("match {} persisted as game {id}", result.ticket.id);
        self.inner.as_mut().match_complete(result)
    }
    fn tournament_complete(&self) {
        self.inner.as_ref().tournament_complete();
    }
    fn expected_maximum_match_count(&self) -> Option<u64> {
        self.inner.as_ref().expected_maximum_match_count()
    }
}
