#![cfg(unix)]

mod common;

use common::{
    StubDir, arbiter_engine, obedient_engine, rejecting_arbiter, rejecting_player,
    stuck_turn_arbiter,
};
use footballtest::arbiter::{MatchRules, run_match};
use footballtest::game::{BoardDims, Outcome, Player};
use footballtest::runner::Runner;
use footballtest::tournament::{LedgerOutWrapper, RoundRobin, Tournament};
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};

fn sessions(
    dir: &StubDir,
    arbiter_script: &str,
    rules: &MatchRules,
) -> footballtest::record::GameRecord {
    let dims = BoardDims::default();
    let mut arbiter = dir
        .stub("arbiter", arbiter_script)
        .launch(dims, 1)
        .unwrap();
    let mut one = dir
        .stub("one", &obedient_engine("E E N"))
        .launch(dims, 2)
        .unwrap();
    let mut two = dir
        .stub("two", &obedient_engine("W"))
        .launch(dims, 3)
        .unwrap();

    let record = run_match(&mut arbiter, &mut one, &mut two, rules);

    two.close();
    one.close();
    arbiter.close();
    record
}

#[test]
fn match_plays_to_a_reported_win() {
    let dir = StubDir::new();
    let record = sessions(&dir, &arbiter_engine(3, 1), &MatchRules::default());

    assert_eq!(record.outcome(), Outcome::Win(Player::One));
    assert_eq!(record.failure(), None);
    assert_eq!(record.plies(), 3);
    let players: Vec<Player> = record.moves().iter().map(|m| m.player).collect();
    assert_eq!(players, vec![Player::One, Player::Two, Player::One]);
    assert_eq!(record.moves()[0].text, "E E N");
    assert_eq!(record.moves()[1].text, "W");
}

#[test]
fn single_exchange_leaves_the_outcome_open() {
    let dir = StubDir::new();
    let rules = MatchRules {
        ply_cap: 1,
        commentary: true,
    };
    let record = sessions(&dir, &arbiter_engine(99, 1), &rules);

    assert_eq!(record.plies(), 1);
    assert_eq!(record.moves()[0].player, Player::One);
    assert_eq!(record.moves()[0].text, "E E N");
    assert_eq!(record.outcome(), Outcome::Undetermined);
}

#[test]
fn arbiter_rejection_credits_the_other_player() {
    let dir = StubDir::new();
    let record = sessions(&dir, &rejecting_arbiter(2), &MatchRules::default());

    // the rejected second move is still recorded; nothing follows it
    assert_eq!(record.plies(), 2);
    assert_eq!(record.moves()[1].player, Player::Two);
    assert_eq!(record.outcome(), Outcome::Win(Player::One));
    assert_eq!(
        record.failure(),
        Some("Check failed for move W from engine 2.")
    );
}

#[test]
fn stalled_turn_blames_the_mover() {
    // accepted move that never passes the turn loses for the mover; this
    // attribution is deliberately one-sided
    let dir = StubDir::new();
    let record = sessions(&dir, &stuck_turn_arbiter(), &MatchRules::default());

    assert_eq!(record.plies(), 1);
    assert_eq!(record.outcome(), Outcome::Win(Player::Two));
    assert_eq!(
        record.failure(),
        Some("Check failed for move E E N from engine 1.")
    );
}

#[test]
fn opponent_rejection_credits_the_mover() {
    let dir = StubDir::new();
    let dims = BoardDims::default();
    let rules = MatchRules::default();

    let mut arbiter = dir
        .stub("arbiter", &arbiter_engine(99, 1))
        .launch(dims, 1)
        .unwrap();
    let mut one = dir
        .stub("one", &obedient_engine("E E N"))
        .launch(dims, 2)
        .unwrap();
    let mut two = dir
        .stub("two", &rejecting_player("W"))
        .launch(dims, 3)
        .unwrap();

    let record = run_match(&mut arbiter, &mut one, &mut two, &rules);
    two.close();
    one.close();
    arbiter.close();

    assert_eq!(record.plies(), 1);
    assert_eq!(record.outcome(), Outcome::Win(Player::One));
    assert_eq!(
        record.failure(),
        Some("Move E E N rejected by engine 2.")
    );
}

#[test]
fn ply_cap_ends_an_infinite_game_undetermined() {
    let dir = StubDir::new();
    let rules = MatchRules {
        ply_cap: 4,
        commentary: false,
    };
    let record = sessions(&dir, &arbiter_engine(999, 1), &rules);

    assert_eq!(record.plies(), 4);
    assert_eq!(record.outcome(), Outcome::Undetermined);
    assert_eq!(record.failure(), Some("Infinite game"));
}

static LEDGER_SEQ: AtomicU64 = AtomicU64::new(0);

#[test]
fn tournament_end_to_end_with_ledger() {
    let dir = StubDir::new();
    let n = LEDGER_SEQ.fetch_add(1, Ordering::Relaxed);
    let root = std::env::temp_dir().join(format!(
        "footballtest-tourney-{}-{n}",
        std::process::id()
    ));
    let root_str = root.to_str().unwrap().to_string();

    let alpha = dir.stub("alpha", &obedient_engine("E E N"));
    let beta = dir.stub("beta", &obedient_engine("W"));
    let arbiter = dir.stub("arbiter", &arbiter_engine(3, 1));

    // two engines over two cycles: one game per cycle, home and away swapped
    let tournament: Box<dyn Tournament> = Box::new(RoundRobin::new(2, 2));
    let tournament =
        Box::new(LedgerOutWrapper::new(tournament, &root_str, BoardDims::default()).unwrap());

    let runner = Runner {
        engines: vec![alpha, beta],
        arbiter: Some(arbiter),
        dims: BoardDims::default(),
        rules: MatchRules::default(),
        concurrency: 1,
        rand_seed: Some(7),
    };
    runner.run(tournament);

    let stats = fs::read_to_string(root.join("games").join("stats.txt")).unwrap();
    let rows: Vec<Vec<String>> = stats
        .lines()
        .map(|line| line.split('\t').map(|f| f.trim().to_string()).collect())
        .collect();
    assert_eq!(rows.len(), 2);

    // cycle 0 orients the two-engine pairing away-first, cycle 1 flips it
    assert_eq!(rows[0][1], "beta");
    assert_eq!(rows[0][2], "alpha");
    assert_eq!(rows[1][1], "alpha");
    assert_eq!(rows[1][2], "beta");
    for row in &rows {
        assert_eq!(row[3], "1-0");
        assert_eq!(row[6], "OK");
    }

    // both transcripts were written next to the ledger
    let day_dirs: Vec<_> = fs::read_dir(root.join("games"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .collect();
    assert_eq!(day_dirs.len(), 1);
    assert_eq!(fs::read_dir(day_dirs[0].path()).unwrap().count(), 2);

    fs::remove_dir_all(&root).unwrap();
}
