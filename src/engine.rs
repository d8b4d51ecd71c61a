use crate::channel::{DEFAULT_DEADLINE, LineChannel, StreamClosed};
use crate::game::{BoardDims, Status};
use crate::params::AiParams;
use itertools::Itertools;
use log::{error, trace, warn};
use std::io::Write;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::time::Duration;
use std::{env, fmt, io};
use wait_timeout::ChildExt;

/// Longest we wait for `ai go` before declaring the engine hung.
const SEARCH_DEADLINE: Duration = Duration::from_secs(60);
/// Reply cap per command; a healthy engine never comes close.
const MAX_REPLY_LINES: usize = 3000;
const QUIT_WAIT: Duration = Duration::from_secs(5);
const TERM_WAIT: Duration = Duration::from_secs(2);

/// Sentinel returned by a search that produced no usable move.
pub const UNKNOWN_MOVE: &str = "?";

const STAT_CATEGORIES: [&str; 4] = ["time", "score", "steps", "cache"];

#[derive(Debug)]
pub enum SessionError {
    Spawn(io::Error),
    Io(io::Error),
    NotRunning,
    /// The abort variants keep whatever the engine managed to say before
    /// things went wrong, so a failed search still lands in the transcript.
    Crashed { partial: Reply },
    Hung { seconds: u64, partial: Reply },
    Flooded { partial: Reply },
}

impl SessionError {
    /// Output collected before the failure. Empty for errors that never
    /// reached the engine.
    pub fn into_partial(self) -> Reply {
        match self {
            SessionError::Crashed { partial }
            | SessionError::Hung { partial, .. }
            | SessionError::Flooded { partial } => partial,
            _ => Reply::default(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Spawn(e) => write!(f, "engine failed to start: {e}"),
            SessionError::Io(e) => write!(f, "engine pipe failed: {e}"),
            SessionError::NotRunning => write!(f, "engine process not running"),
            SessionError::Crashed { .. } => write!(f, "engine closed its output stream"),
            SessionError::Hung { seconds, .. } => {
                write!(f, "engine hung, {seconds} sec without response")
            }
            SessionError::Flooded { partial } => {
                write!(
                    f,
                    "engine flooded us, {} lines and no sync echo",
                    partial.lines.len()
                )
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Spawn(e) | SessionError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// One command's worth of engine output: everything the engine printed
/// before the sync echo, plus whatever was waiting on stderr afterwards.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub diagnostics: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SearchReply {
    pub move_text: String,
    pub commentary: Vec<String>,
}

impl SearchReply {
    pub fn is_unknown(&self) -> bool {
        self.move_text == UNKNOWN_MOVE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepVerdict {
    Accepted,
    Rejected(Vec<String>),
}

#[derive(Clone, PartialEq, Debug)]
pub struct EngineSpec {
    pub name: String,
    pub cmd: String,
    pub dir: String,
    pub ai: String,
    pub params: AiParams,
}

impl Default for EngineSpec {
    fn default() -> Self {
        EngineSpec {
            name: String::new(),
            cmd: String::new(),
            dir: String::new(),
            ai: String::from("mcts"),
            params: AiParams::default(),
        }
    }
}

impl EngineSpec {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.cmd
        } else {
            &self.name
        }
    }

    pub fn launch(&self, dims: BoardDims, seed: u64) -> Result<EngineSession, SessionError> {
        let working_directory = env::current_dir()
            .map_err(SessionError::Spawn)?
            .join(&self.dir);

        let mut child = Command::new(&self.cmd)
            .current_dir(working_directory)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(SessionError::Spawn)?;

        let stdout = child.stdout.take().unwrap();
        let stderr = child.stderr.take().unwrap();
        let stdin = child.stdin.take().unwrap();

        let name = self.display_name().to_string();
        let mut session = EngineSession {
            output: LineChannel::spawn(stdout, format!("{name}-out")),
            diagnostics: LineChannel::spawn(stderr, format!("{name}-err")),
            stdin,
            child: Some(child),
            name,
            seed,
            sync: 0,
        };

        session.configure(&format!("srand {seed}"))?;
        session.configure(&format!("new {dims}"))?;
        session.configure(&format!("set ai {}", self.ai))?;
        for (param, value) in self.params.iter() {
            session.configure(&format!("set ai.{param} {value}"))?;
        }

        Ok(session)
    }
}

#[derive(Debug)]
pub struct EngineSession {
    child: Option<Child>,
    stdin: ChildStdin,
    output: LineChannel,
    diagnostics: LineChannel,
    name: String,
    seed: u64,
    sync: u64,
}

impl EngineSession {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Writes one command plus its `ping` trailer, then collects output
    /// until the matching `pong` echo. Replies never interleave because
    /// every marker is distinct and commands go out one at a time.
    pub fn send(&mut self, command: &str, deadline: Duration) -> Result<Reply, SessionError> {
        if self.child.is_none() {
            return Err(SessionError::NotRunning);
        }

        self.sync += 1;
        let marker = format!("SYNC_{}", self.sync);

        trace!("{} < {command}", self.name);
        self.stdin
            .write_all(format!("{command}\nping {marker}\n").as_bytes())
            .map_err(SessionError::Io)?;
        self.stdin.flush().map_err(SessionError::Io)?;

        let echo = format!("pong {marker}");
        let mut lines = Vec::new();
        loop {
            match self.output.read_line(deadline) {
                Err(StreamClosed) => {
                    error!("{} (cmd {command:?}) disconnected", self.name);
                    return Err(SessionError::Crashed {
                        partial: self.partial_reply(lines),
                    });
                }
                Ok(None) => {
                    error!("{} (cmd {command:?}) gave no sync echo", self.name);
                    return Err(SessionError::Hung {
                        seconds: deadline.as_secs(),
                        partial: self.partial_reply(lines),
                    });
                }
                Ok(Some(line)) if line == echo => break,
                Ok(Some(line)) => {
                    trace!("{} > {line}", self.name);
                    lines.push(line);
                    if lines.len() > MAX_REPLY_LINES {
                        error!("{} (cmd {command:?}) flooded its reply", self.name);
                        return Err(SessionError::Flooded {
                            partial: self.partial_reply(lines),
                        });
                    }
                }
            }
        }

        Ok(Reply {
            lines,
            diagnostics: self.diagnostics.drain(),
        })
    }

    fn partial_reply(&self, lines: Vec<String>) -> Reply {
        let diagnostics = self.diagnostics.drain();
        for line in &diagnostics {
            error!("{} ! {line}", self.name);
        }
        Reply { lines, diagnostics }
    }

    fn configure(&mut self, command: &str) -> Result<(), SessionError> {
        let reply = self.send(command, DEFAULT_DEADLINE)?;
        for line in &reply.diagnostics {
            warn!("{}: {line}", self.name);
        }
        Ok(())
    }

    pub fn status(&mut self) -> Result<Status, SessionError> {
        let reply = self.send("status", DEFAULT_DEADLINE)?;
        for line in &reply.diagnostics {
            warn!("{}: {line}", self.name);
        }
        Ok(Status::parse(&reply.lines))
    }

    /// Asks the engine to choose a move. The last reply line is the move;
    /// anything before it is explanation. A failed or empty search comes
    /// back as [`UNKNOWN_MOVE`] with whatever was collected, stderr lines
    /// prefixed `E: `.
    pub fn go(&mut self, with_stats: bool) -> SearchReply {
        let command = if with_stats {
            format!("ai go {}", STAT_CATEGORIES.iter().join(","))
        } else {
            String::from("ai go")
        };

        let Reply {
            mut lines,
            diagnostics,
        } = match self.send(&command, SEARCH_DEADLINE) {
            Ok(reply) => reply,
            Err(e) => {
                let note = format!("E: {e}");
                let Reply { lines, diagnostics } = e.into_partial();
                let mut commentary = lines;
                commentary.extend(diagnostics.into_iter().map(|d| format!("E: {d}")));
                commentary.push(note);
                return SearchReply {
                    move_text: UNKNOWN_MOVE.to_string(),
                    commentary,
                };
            }
        };

        match lines.pop() {
            Some(move_text) if diagnostics.is_empty() => SearchReply {
                move_text,
                commentary: if with_stats { lines } else { Vec::new() },
            },
            popped => {
                let mut commentary = lines;
                commentary.extend(popped);
                commentary.extend(diagnostics.into_iter().map(|d| format!("E: {d}")));
                SearchReply {
                    move_text: UNKNOWN_MOVE.to_string(),
                    commentary,
                }
            }
        }
    }

    /// Plays `move_text` into this engine's own board. Acceptance is
    /// silence: any stderr output means the engine refused the move.
    pub fn step(&mut self, move_text: &str) -> Result<StepVerdict, SessionError> {
        let reply = self.send(&format!("step {move_text}"), DEFAULT_DEADLINE)?;
        if reply.diagnostics.is_empty() {
            Ok(StepVerdict::Accepted)
        } else {
            Ok(StepVerdict::Rejected(reply.diagnostics))
        }
    }

    /// Graceful quit, then terminate, then kill. Safe to call any number
    /// of times; the process handle is released exactly once.
    pub fn close(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        let _ = writeln!(self.stdin, "quit");
        let _ = self.stdin.flush();

        match child.wait_timeout(QUIT_WAIT) {
            Ok(Some(status)) => {
                trace!("{} exited: {status}", self.name);
                return;
            }
            Ok(None) => {
                warn!("{} ignored quit, terminating", self.name);
            }
            Err(e) => {
                error!("{} wait failed: {e}", self.name);
            }
        }

        terminate(&mut child);
        if let Ok(Some(status)) = child.wait_timeout(TERM_WAIT) {
            trace!("{} exited: {status}", self.name);
            return;
        }

        warn!("{} survived terminate, killing", self.name);
        let _ = child.kill();
        let _ = child.wait();
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
    }
}

#[cfg(windows)]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}
