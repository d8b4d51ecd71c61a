//! Generated POSIX-shell stub engines for driving real sessions.
#![allow(dead_code)]

use footballtest::engine::EngineSpec;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static STUB_SEQ: AtomicU64 = AtomicU64::new(0);

pub struct StubDir {
    pub path: PathBuf,
}

impl StubDir {
    pub fn new() -> StubDir {
        let n = STUB_SEQ.fetch_add(1, Ordering::Relaxed);
        let path =
            std::env::temp_dir().join(format!("footballtest-stub-{}-{n}", std::process::id()));
        fs::create_dir_all(&path).unwrap();
        StubDir { path }
    }

    /// Writes an executable stub script and returns a spec that launches it.
    pub fn stub(&self, name: &str, script: &str) -> EngineSpec {
        let file = self.path.join(format!("{name}.sh"));
        fs::write(&file, script).unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o755)).unwrap();
        EngineSpec {
            name: name.to_string(),
            cmd: file.to_str().unwrap().to_string(),
            ..EngineSpec::default()
        }
    }
}

impl Drop for StubDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Engine that answers every ping, derives the turn from its own step
/// count, and always proposes `mv` with one line of commentary.
pub fn obedient_engine(mv: &str) -> String {
    format!(
        r#"#!/bin/sh
steps=0
while read cmd rest; do
  case "$cmd" in
    ping) echo "pong $rest" ;;
    status)
      if [ $((steps % 2)) -eq 0 ]; then echo "Active player: 1"; else echo "Active player: 2"; fi
      echo "Status: in progress"
      ;;
    ai) echo "examined 42 branches"; echo "{mv}" ;;
    step) steps=$((steps + 1)) ;;
    quit) exit 0 ;;
  esac
done
"#
    )
}

/// Arbiter that accepts every step and declares `winner` once `win_after`
/// steps have been applied.
pub fn arbiter_engine(win_after: u32, winner: u32) -> String {
    format!(
        r#"#!/bin/sh
steps=0
while read cmd rest; do
  case "$cmd" in
    ping) echo "pong $rest" ;;
    status)
      if [ "$steps" -ge "{win_after}" ]; then
        echo "Status: player {winner} win"
      else
        if [ $((steps % 2)) -eq 0 ]; then echo "Active player: 1"; else echo "Active player: 2"; fi
        echo "Status: in progress"
      fi
      ;;
    step) steps=$((steps + 1)) ;;
    quit) exit 0 ;;
  esac
done
"#
    )
}

/// Arbiter that rejects step number `reject_at` on stderr and accepts
/// everything else. The sleep lets the stderr line reach the session's
/// diagnostic pump before the sync echo goes out.
pub fn rejecting_arbiter(reject_at: u32) -> String {
    format!(
        r#"#!/bin/sh
steps=0
while read cmd rest; do
  case "$cmd" in
    ping) echo "pong $rest" ;;
    status)
      if [ $((steps % 2)) -eq 0 ]; then echo "Active player: 1"; else echo "Active player: 2"; fi
      echo "Status: in progress"
      ;;
    step)
      next=$((steps + 1))
      if [ "$next" -eq "{reject_at}" ]; then
        echo "illegal move" >&2
        sleep 0.1
      else
        steps=$next
      fi
      ;;
    quit) exit 0 ;;
  esac
done
"#
    )
}

/// Arbiter that accepts every step but never advances the active player.
pub fn stuck_turn_arbiter() -> String {
    String::from(
        r#"#!/bin/sh
while read cmd rest; do
  case "$cmd" in
    ping) echo "pong $rest" ;;
    status) echo "Active player: 1"; echo "Status: in progress" ;;
    step) ;;
    quit) exit 0 ;;
  esac
done
"#,
    )
}

/// Player whose own board refuses every forwarded move.
pub fn rejecting_player(mv: &str) -> String {
    format!(
        r#"#!/bin/sh
while read cmd rest; do
  case "$cmd" in
    ping) echo "pong $rest" ;;
    ai) echo "{mv}" ;;
    step) echo "cannot apply" >&2; sleep 0.1 ;;
    quit) exit 0 ;;
  esac
done
"#
    )
}

/// Engine with assorted misbehaviors: `slow` stalls before the sync echo,
/// `flood` prints far past the reply cap, `die` exits mid-command,
/// `broken` reports its search failure on stderr, and `ai` starts
/// explaining a search then dies without answering.
pub fn hostile_engine() -> String {
    String::from(
        r#"#!/bin/sh
while read cmd rest; do
  case "$cmd" in
    ping) echo "pong $rest" ;;
    slow) sleep 2 ;;
    flood)
      i=0
      while [ "$i" -lt 4000 ]; do echo "noise $i"; i=$((i + 1)); done
      ;;
    die) exit 7 ;;
    broken) echo "search blew up" >&2; sleep 0.1; echo "E" ;;
    ai) echo "expanding root"; echo "backend gone" >&2; sleep 0.1; exit 7 ;;
    quit) exit 0 ;;
  esac
done
"#,
    )
}

/// Engine that logs every non-ping command it receives to `log`.
pub fn recording_engine(log: &Path) -> String {
    format!(
        r#"#!/bin/sh
while read cmd rest; do
  case "$cmd" in
    ping) echo "pong $rest" ;;
    quit) exit 0 ;;
    *) echo "$cmd $rest" >> "{}" ;;
  esac
done
"#,
        log.display()
    )
}
