//! Input drivers feeding `(begin, end, value)` triples into a store
//!
//! Two input shapes are understood:
//!
//! - raw byte buffers, as produced by a fuzzer: a native-endian `i32` begin,
//!   a native-endian `i32` end and one value byte, 9 bytes in total;
//! - text, as typed at a console: two integers and one character separated by
//!   whitespace.
//!
//! [`Replayer`] pushes a whole corpus of byte buffers through one store and
//! can verify the canonical form after every input.

use std::fmt;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::config::DriverConfig;
use crate::error::Error;
use crate::interval::{IntervalStore, SegmentMap};
use crate::Result;

/// Minimum length of a byte buffer carrying one assignment
pub const INPUT_LEN: usize = 9;

/// Prompt printed by the interactive session
pub const PROMPT: &str = "Enter two integers and char: ";

/// One decoded `(begin, end, value)` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    /// Inclusive start of the range
    pub begin: i32,
    /// Exclusive end of the range
    pub end: i32,
    /// Value byte assigned to the range
    pub value: u8,
}

impl Assignment {
    /// Create a new assignment
    pub fn new(begin: i32, end: i32, value: u8) -> Self {
        Self { begin, end, value }
    }

    /// Decode the leading 9 bytes of a buffer; shorter buffers yield `None`
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < INPUT_LEN {
            return None;
        }
        let begin = i32::from_ne_bytes(data[0..4].try_into().ok()?);
        let end = i32::from_ne_bytes(data[4..8].try_into().ok()?);
        Some(Self::new(begin, end, data[8]))
    }

    /// Encode into the byte layout understood by [`Assignment::decode`]
    pub fn encode(&self) -> [u8; INPUT_LEN] {
        let mut buf = [0u8; INPUT_LEN];
        buf[0..4].copy_from_slice(&self.begin.to_ne_bytes());
        buf[4..8].copy_from_slice(&self.end.to_ne_bytes());
        buf[8] = self.value;
        buf
    }

    /// Apply to a store
    pub fn apply<M: SegmentMap<i32, u8>>(&self, store: &mut IntervalStore<i32, u8, M>) {
        store.assign(self.begin, self.end, self.value);
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) = {}",
            self.begin,
            self.end,
            self.value.escape_ascii()
        )
    }
}

/// Feed one fuzz input into `store`
///
/// Returns whether the buffer was long enough for `assign` to be called.
pub fn fuzz_one_input<M: SegmentMap<i32, u8>>(store: &mut IntervalStore<i32, u8, M>, data: &[u8]) -> bool {
    match Assignment::decode(data) {
        Some(assignment) => {
            assignment.apply(store);
            true
        }
        None => {
            debug!(len = data.len(), "ignoring short fuzz input");
            false
        }
    }
}

fn parse_key(token: &str) -> Result<i32> {
    token
        .parse::<i32>()
        .map_err(|e| Error::Parse(format!("invalid integer {:?}: {}", token, e)))
}

fn parse_value(token: &str) -> Result<u8> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(Error::Parse(format!(
            "expected a single ASCII character, got {:?}",
            token
        ))),
    }
}

fn parse_tokens(tokens: &[&str]) -> Result<Assignment> {
    match tokens {
        [begin, end, value] => Ok(Assignment::new(
            parse_key(begin)?,
            parse_key(end)?,
            parse_value(value)?,
        )),
        _ => Err(Error::Parse(format!(
            "expected two integers and a character, got {} tokens",
            tokens.len()
        ))),
    }
}

/// Parse `"<begin> <end> <char>"`
pub fn parse_interactive(line: &str) -> Result<Assignment> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    parse_tokens(&tokens)
}

/// Read whitespace-separated tokens until one assignment is complete
///
/// The three tokens may be spread across several lines.
pub fn read_assignment<R: BufRead>(input: &mut R) -> Result<Assignment> {
    let mut tokens: Vec<String> = Vec::with_capacity(3);
    let mut line = String::new();
    while tokens.len() < 3 {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Err(Error::Parse(format!(
                "unexpected end of input after {} tokens",
                tokens.len()
            )));
        }
        tokens.extend(line.split_whitespace().map(str::to_owned));
    }
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
    parse_tokens(&tokens)
}

/// Run one interactive round: prompt, read one assignment, report
///
/// The store is returned so callers can inspect it further.
pub fn run_session<R: BufRead, W: Write>(
    config: &DriverConfig,
    input: &mut R,
    output: &mut W,
) -> Result<IntervalStore<i32, u8>> {
    if config.prompt {
        write!(output, "{}", PROMPT)?;
        output.flush()?;
    }

    let assignment = read_assignment(input)?;
    let mut store = IntervalStore::new(config.default_value);
    assignment.apply(&mut store);

    writeln!(output, "Is canonical: {}", store.is_canonical())?;
    writeln!(output, "Size: {}", store.size())?;
    Ok(store)
}

/// Summary of a replay run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplayReport {
    /// Inputs seen
    pub inputs: usize,
    /// Inputs decoded and passed to `assign`
    pub applied: usize,
    /// Inputs too short to decode
    pub skipped: usize,
    /// Boundaries stored after the last input
    pub final_size: usize,
    /// Whether the store was canonical after the last input
    pub canonical: bool,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Inputs: {}", self.inputs)?;
        writeln!(f, "Applied: {}", self.applied)?;
        writeln!(f, "Skipped: {}", self.skipped)?;
        writeln!(f, "Is canonical: {}", self.canonical)?;
        write!(f, "Size: {}", self.final_size)
    }
}

/// Replays fuzz inputs against one long-lived store
pub struct Replayer {
    store: IntervalStore<i32, u8>,
    config: DriverConfig,
    inputs: usize,
    applied: usize,
    skipped: usize,
}

impl Replayer {
    /// Create a replayer with a fresh store
    pub fn new(config: DriverConfig) -> Self {
        Self {
            store: IntervalStore::new(config.default_value),
            config,
            inputs: 0,
            applied: 0,
            skipped: 0,
        }
    }

    /// Feed one buffer; returns whether it was applied
    pub fn feed(&mut self, data: &[u8]) -> Result<bool> {
        self.inputs += 1;
        if !fuzz_one_input(&mut self.store, data) {
            self.skipped += 1;
            return Ok(false);
        }
        self.applied += 1;

        if self.config.verify_canonical && !self.store.is_canonical() {
            warn!(input = self.inputs, "store lost canonical form");
            return Err(Error::NotCanonical { after: self.inputs });
        }
        Ok(true)
    }

    /// Feed the contents of one file
    pub fn feed_file(&mut self, path: &Path) -> Result<bool> {
        let data = fs::read(path)?;
        debug!(path = %path.display(), len = data.len(), "replaying input");
        self.feed(&data)
    }

    /// Feed a file, or every file of a directory in file-name order
    pub fn feed_path(&mut self, path: &Path) -> Result<()> {
        if !path.is_dir() {
            self.feed_file(path)?;
            return Ok(());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        for file in files {
            self.feed_file(&file)?;
        }
        Ok(())
    }

    /// Current summary
    pub fn report(&self) -> ReplayReport {
        ReplayReport {
            inputs: self.inputs,
            applied: self.applied,
            skipped: self.skipped,
            final_size: self.store.size(),
            canonical: self.store.is_canonical(),
        }
    }

    /// The store inputs are replayed into
    pub fn store(&self) -> &IntervalStore<i32, u8> {
        &self.store
    }

    /// Consume the replayer, keeping the store
    pub fn into_store(self) -> IntervalStore<i32, u8> {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_decode_layout() {
        let mut data = Vec::new();
        data.extend_from_slice(&1i32.to_ne_bytes());
        data.extend_from_slice(&5i32.to_ne_bytes());
        data.push(b'B');

        assert_eq!(Assignment::decode(&data), Some(Assignment::new(1, 5, b'B')));

        // Trailing bytes are ignored
        data.extend_from_slice(b"junk");
        assert_eq!(Assignment::decode(&data), Some(Assignment::new(1, 5, b'B')));
    }

    #[test]
    fn test_decode_short_buffer() {
        assert_eq!(Assignment::decode(&[]), None);
        assert_eq!(Assignment::decode(&[0u8; INPUT_LEN - 1]), None);
        assert!(Assignment::decode(&[0u8; INPUT_LEN]).is_some());
    }

    #[test]
    fn test_encode_matches_decode_layout() {
        let assignment = Assignment::new(-7, i32::MAX, b'z');
        let buf = assignment.encode();

        assert_eq!(&buf[0..4], &(-7i32).to_ne_bytes());
        assert_eq!(&buf[4..8], &i32::MAX.to_ne_bytes());
        assert_eq!(buf[8], b'z');
        assert_eq!(Assignment::decode(&buf), Some(assignment));
    }

    #[test]
    fn test_fuzz_one_input() {
        let mut store = IntervalStore::new(b'A');

        assert!(!fuzz_one_input(&mut store, b"short"));
        assert!(store.is_empty());

        assert!(fuzz_one_input(&mut store, &Assignment::new(1, 5, b'B').encode()));
        assert_eq!(store.lookup(&3), &b'B');
        assert_eq!(store.size(), 2);

        // Inverted ranges still count as a call, they just change nothing
        assert!(fuzz_one_input(&mut store, &Assignment::new(9, 2, b'C').encode()));
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_parse_interactive() {
        assert_eq!(parse_interactive("1 5 B").unwrap(), Assignment::new(1, 5, b'B'));
        assert_eq!(
            parse_interactive("  -3\t12   x \n").unwrap(),
            Assignment::new(-3, 12, b'x')
        );

        assert!(matches!(parse_interactive("1 5"), Err(Error::Parse(_))));
        assert!(matches!(parse_interactive("1 5 B C"), Err(Error::Parse(_))));
        assert!(matches!(parse_interactive("one 5 B"), Err(Error::Parse(_))));
        assert!(matches!(parse_interactive("1 5 BC"), Err(Error::Parse(_))));
        assert!(matches!(parse_interactive("1 5 é"), Err(Error::Parse(_))));
        assert!(matches!(parse_interactive("1 99999999999 B"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_read_assignment_across_lines() {
        let mut input = Cursor::new("1\n\n5\nB\n");
        assert_eq!(read_assignment(&mut input).unwrap(), Assignment::new(1, 5, b'B'));

        let mut truncated = Cursor::new("1 5\n");
        assert!(matches!(read_assignment(&mut truncated), Err(Error::Parse(_))));
    }

    #[test]
    fn test_run_session_reports() {
        let config = DriverConfig::default();
        let mut input = Cursor::new("1 5 B\n");
        let mut output = Vec::new();

        let store = run_session(&config, &mut input, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert_eq!(text, format!("{}Is canonical: true\nSize: 2\n", PROMPT));
        assert_eq!(store.lookup(&1), &b'B');
    }

    #[test]
    fn test_run_session_without_prompt() {
        let config = DriverConfig {
            prompt: false,
            ..DriverConfig::default()
        };
        let mut input = Cursor::new("4 4 Q\n");
        let mut output = Vec::new();

        run_session(&config, &mut input, &mut output).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Is canonical: true\nSize: 0\n"
        );
    }

    #[test]
    fn test_replayer_counts_inputs() {
        let mut replayer = Replayer::new(DriverConfig::default());

        assert!(replayer.feed(&Assignment::new(1, 10, b'B').encode()).unwrap());
        assert!(!replayer.feed(&[1, 2, 3]).unwrap());
        assert!(replayer.feed(&Assignment::new(3, 7, b'C').encode()).unwrap());

        let report = replayer.report();
        assert_eq!(
            report,
            ReplayReport {
                inputs: 3,
                applied: 2,
                skipped: 1,
                final_size: 4,
                canonical: true,
            }
        );
        assert_eq!(replayer.store().lookup(&5), &b'C');
    }

    #[test]
    fn test_replay_corpus_directory() {
        let dir = TempDir::new().unwrap();
        let corpus = [
            Assignment::new(0, 100, b'B'),
            Assignment::new(10, 20, b'C'),
            Assignment::new(15, 90, b'B'),
        ];
        for (i, assignment) in corpus.iter().enumerate() {
            fs::write(dir.path().join(format!("input-{:03}", i)), assignment.encode()).unwrap();
        }
        fs::write(dir.path().join("input-999"), b"tiny").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let mut replayer = Replayer::new(DriverConfig::default());
        replayer.feed_path(dir.path()).unwrap();

        let report = replayer.report();
        assert_eq!(report.inputs, 4);
        assert_eq!(report.applied, 3);
        assert_eq!(report.skipped, 1);
        assert!(report.canonical);

        let store = replayer.into_store();
        let boundaries: Vec<(i32, u8)> = store.segments().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(boundaries, vec![(0, b'B'), (10, b'C'), (15, b'B'), (100, b'A')]);
    }

    #[test]
    fn test_replay_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut replayer = Replayer::new(DriverConfig::default());

        let result = replayer.feed_path(&dir.path().join("absent"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_report_display() {
        let report = ReplayReport {
            inputs: 2,
            applied: 1,
            skipped: 1,
            final_size: 2,
            canonical: true,
        };
        assert_eq!(
            report.to_string(),
            "Inputs: 2\nApplied: 1\nSkipped: 1\nIs canonical: true\nSize: 2"
        );
    }

    #[test]
    fn test_assignment_display() {
        assert_eq!(Assignment::new(1, 5, b'B').to_string(), "[1, 5) = B");
        assert_eq!(Assignment::new(0, 1, b'\n').to_string(), "[0, 1) = \\n");
    }
}
