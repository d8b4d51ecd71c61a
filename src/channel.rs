use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use memchr::memchr;
use std::io::{ErrorKind, Read};
use std::thread;
use std::time::Duration;

/// Effectively "wait forever, but never hang": one full day per attempt.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(86_400);

const CHUNK_SIZE: usize = 4096;

/// The stream behind this channel reached end-of-file or failed; no more
/// lines will ever arrive.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct StreamClosed;

/// Complete, decoded lines from one child stream. A pump thread does the
/// blocking reads so a caller can wait with a deadline on one stream
/// without stalling reads on another.
#[derive(Debug)]
pub struct LineChannel {
    lines: Receiver<String>,
}

impl LineChannel {
    pub fn spawn<R: Read + Send + 'static>(source: R, tag: String) -> LineChannel {
        let (send, recv) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name(format!("pump-{tag}"))
            .spawn(move || pump(source, send))
            .expect("could not spawn pump thread");
        LineChannel { lines: recv }
    }

    /// Next complete line, waiting up to `deadline` for one to arrive.
    /// `Ok(None)` means the deadline passed with no complete line; lines
    /// buffered before end-of-stream are still delivered before
    /// `StreamClosed` is reported.
    pub fn read_line(&self, deadline: Duration) -> Result<Option<String>, StreamClosed> {
        match self.lines.recv_timeout(deadline) {
            Ok(line) => Ok(Some(line)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(StreamClosed),
        }
    }

    /// Zero-wait sweep of everything already buffered.
    pub fn drain(&self) -> Vec<String> {
        let mut drained = vec![];
        loop {
            match self.lines.try_recv() {
                Ok(line) => drained.push(line),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return drained,
            }
        }
    }
}

fn pump<R: Read>(mut source: R, send: Sender<String>) {
    let mut pending = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let count = match source.read(&mut chunk) {
            Ok(0) => return,
            Ok(count) => count,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(_) => return,
        };
        pending.extend_from_slice(&chunk[..count]);

        // Decode only once a full line is isolated, so a multi-byte
        // character split across chunks never corrupts the line after it.
        let mut consumed = 0;
        while let Some(offset) = memchr(b'\n', &pending[consumed..]) {
            let end = consumed + offset;
            let line = String::from_utf8_lossy(&pending[consumed..end])
                .trim()
                .to_string();
            if send.send(line).is_err() {
                return;
            }
            consumed = end + 1;
        }
        pending.drain(..consumed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    struct ScriptedRead {
        chunks: VecDeque<(Duration, Vec<u8>)>,
    }

    impl ScriptedRead {
        fn new(chunks: &[(u64, &[u8])]) -> ScriptedRead {
            ScriptedRead {
                chunks: chunks
                    .iter()
                    .map(|(ms, bytes)| (Duration::from_millis(*ms), bytes.to_vec()))
                    .collect(),
            }
        }
    }

    impl Read for ScriptedRead {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some((delay, bytes)) = self.chunks.pop_front() else {
                return Ok(0);
            };
            thread::sleep(delay);
            buf[..bytes.len()].copy_from_slice(&bytes);
            Ok(bytes.len())
        }
    }

    #[test]
    fn reassembles_lines_split_across_chunks() {
        let source = ScriptedRead::new(&[(0, b"hel"), (0, b"lo\nwo"), (0, b"rld\n")]);
        let channel = LineChannel::spawn(source, "test".to_string());
        assert_eq!(
            channel.read_line(DEFAULT_DEADLINE),
            Ok(Some("hello".to_string()))
        );
        assert_eq!(
            channel.read_line(DEFAULT_DEADLINE),
            Ok(Some("world".to_string()))
        );
        assert_eq!(channel.read_line(Duration::from_secs(5)), Err(StreamClosed));
    }

    #[test]
    fn multibyte_sequence_split_across_chunks() {
        let bytes = "pong SYNC_1 é\n".as_bytes();
        let (a, b) = bytes.split_at(bytes.len() - 3); // cuts é in half
        let source = ScriptedRead::new(&[(0, a), (0, b)]);
        let channel = LineChannel::spawn(source, "test".to_string());
        assert_eq!(
            channel.read_line(DEFAULT_DEADLINE),
            Ok(Some("pong SYNC_1 é".to_string()))
        );
    }

    #[test]
    fn deadline_expiry_is_not_an_error() {
        let source = ScriptedRead::new(&[(300, b"late\n")]);
        let channel = LineChannel::spawn(source, "test".to_string());
        assert_eq!(channel.read_line(Duration::from_millis(30)), Ok(None));
        assert_eq!(
            channel.read_line(Duration::from_secs(5)),
            Ok(Some("late".to_string()))
        );
    }

    #[test]
    fn buffered_lines_survive_stream_close() {
        let source = ScriptedRead::new(&[(0, b"a\nb\n")]);
        let channel = LineChannel::spawn(source, "test".to_string());
        thread::sleep(Duration::from_millis(100));
        assert_eq!(channel.drain(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(channel.read_line(Duration::from_secs(1)), Err(StreamClosed));
    }

    #[test]
    fn unterminated_trailing_fragment_is_dropped() {
        let source = ScriptedRead::new(&[(0, b"whole\npartial")]);
        let channel = LineChannel::spawn(source, "test".to_string());
        assert_eq!(
            channel.read_line(DEFAULT_DEADLINE),
            Ok(Some("whole".to_string()))
        );
        assert_eq!(channel.read_line(Duration::from_secs(5)), Err(StreamClosed));
    }

    #[test]
    fn carriage_returns_are_stripped() {
        let source = ScriptedRead::new(&[(0, b"pong SYNC_1\r\n")]);
        let channel = LineChannel::spawn(source, "test".to_string());
        assert_eq!(
            channel.read_line(DEFAULT_DEADLINE),
            Ok(Some("pong SYNC_1".to_string()))
        );
    }
}
