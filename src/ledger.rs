use crate::game::BoardDims;
use crate::tournament::MatchResult;
use std::fs::{self, File, OpenOptions};
use std::io::{Error, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use lock::FileLock;

/// Append-only match ledger under a shared root. One tab-separated row
/// per game in `games/stats.txt`, plus a dated transcript file per game.
/// The row append runs under an exclusive file lock so concurrent
/// tournament runners over the same root never interleave; the id is
/// derived from the line count read under that lock.
#[derive(Debug)]
pub struct Ledger {
    games_dir: PathBuf,
}

impl Ledger {
    pub fn open(root: &str) -> Result<Ledger, Error> {
        let games_dir = PathBuf::from(root).join("games");
        fs::create_dir_all(&games_dir)?;
        Ok(Ledger { games_dir })
    }

    /// Appends the summary row and writes the companion transcript.
    /// Returns the game id the ledger assigned.
    pub fn record(&self, result: &MatchResult, dims: BoardDims) -> Result<u64, Error> {
        let record = &result.record;
        let outcome = record.outcome().score_str();
        let status = record.failure().unwrap_or("OK");
        let timestamp = result.game_start.format("%Y-%m-%dT%H:%M:%S").to_string();

        let stats = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(self.games_dir.join("stats.txt"))?;

        let id = {
            let _lock = FileLock::exclusive(&stats)?;
            (&stats).seek(SeekFrom::Start(0))?;
            let mut content = String::new();
            (&stats).read_to_string(&mut content)?;
            let id = content.lines().count() as u64 + 1;
            writeln!(
                &stats,
                "{id:>6}\t{:<15}\t{:<15}\t{outcome}\t{:>3}\t{timestamp}\t{status}",
                result.players[0].name,
                result.players[1].name,
                record.steps(),
            )?;
            id
        };

        let day_dir = self
            .games_dir
            .join(result.game_start.format("%Y-%m-%d").to_string());
        fs::create_dir_all(&day_dir)?;

        let mut transcript = File::create(day_dir.join(format!("{id:06}.txt")))?;
        writeln!(transcript, "DATE {timestamp}")?;
        for (label, info) in ["PLAYER1", "PLAYER2"].iter().zip(&result.players) {
            writeln!(
                transcript,
                "{label} {} seed={} [{}]",
                info.name, info.seed, info.params
            )?;
        }
        writeln!(transcript, "RESULT {outcome}")?;
        writeln!(transcript, "GAME {dims}")?;
        for entry in record.moves() {
            writeln!(transcript, "{} {}", entry.player, entry.text)?;
            for line in &entry.commentary {
                let indent = if line.contains("score") { "> " } else { ">>  " };
                writeln!(transcript, "  {indent}{line}")?;
            }
        }

        Ok(id)
    }
}

#[cfg(unix)]
mod lock {
    use std::fs::File;
    use std::io::Error;
    use std::os::unix::io::AsRawFd;

    pub struct FileLock<'a> {
        file: &'a File,
    }

    impl<'a> FileLock<'a> {
        pub fn exclusive(file: &'a File) -> Result<FileLock<'a>, Error> {
            if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX) } != 0 {
                return Err(Error::last_os_error());
            }
            Ok(FileLock { file })
        }
    }

    impl Drop for FileLock<'_> {
        fn drop(&mut self) {
            unsafe {
                libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
            }
        }
    }
}

#[cfg(windows)]
mod lock {
    use std::fs::File;
    use std::io::Error;
    use std::os::windows::io::AsRawHandle;
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::Storage::FileSystem::{LOCKFILE_EXCLUSIVE_LOCK, LockFileEx, UnlockFile};
    use windows::Win32::System::IO::OVERLAPPED;

    pub struct FileLock<'a> {
        file: &'a File,
    }

    impl<'a> FileLock<'a> {
        pub fn exclusive(file: &'a File) -> Result<FileLock<'a>, Error> {
            let mut overlapped = OVERLAPPED::default();
            unsafe {
                LockFileEx(
                    HANDLE(file.as_raw_handle()),
                    LOCKFILE_EXCLUSIVE_LOCK,
                    0,
                    u32::MAX,
                    u32::MAX,
                    &mut overlapped,
                )
            }
            .map_err(Error::other)?;
            Ok(FileLock { file })
        }
    }

    impl Drop for FileLock<'_> {
        fn drop(&mut self) {
            let _ = unsafe {
                UnlockFile(
                    HANDLE(self.file.as_raw_handle()),
                    0,
                    0,
                    u32::MAX,
                    u32::MAX,
                )
            };
        }
    }
}
