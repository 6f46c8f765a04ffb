//! Probe records as written by the UDP receiver.
//!
//! Every line of the raw probe log is the Python `repr` of the tuple
//! `(source address, payload, receive time)`:
//!
//! ```text
//! (('10.0.0.1', 7), '(12, 1487236862.123)', 1487236862.456)
//! ```
//!
//! The source port identifies the monitored path, the payload carries
//! the global sequence number and the send timestamp. Fields are read
//! positionally; any deviation from that shape is a parse error.

mod lexer;

use crate::path::PathId;
use std::{
    fmt,
    io::{self, BufRead},
    str::FromStr,
};
use thiserror::Error;

/// Global probe tick, shared by all the paths of a send session.
pub type SequenceNumber = u64;

/// One observation of one probe packet on one path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRecord {
    /// address the probe was sent from
    pub source_host: String,
    pub path: PathId,
    pub sequence: SequenceNumber,
    /// send timestamp, in seconds
    pub send_time: f64,
    /// receive timestamp, in seconds
    pub receive_time: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeParseError {
    #[error("unrecognised input at column {column}")]
    InvalidToken { column: usize },
    #[error("expecting {expected} at column {column}, found `{found}'")]
    Unexpected {
        expected: &'static str,
        found: String,
        column: usize,
    },
    #[error("expecting {expected}, the record ended early")]
    UnexpectedEnd { expected: &'static str },
    #[error("trailing input at column {column}")]
    Trailing { column: usize },
    #[error("invalid {what} `{value}'")]
    InvalidNumber { what: &'static str, value: String },
    #[error("invalid payload: {0}")]
    Payload(Box<ProbeParseError>),
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ProbeParseError,
    },
    #[error("failed to read the probe log")]
    Io(#[from] io::Error),
}

impl ProbeRecord {
    /// end to end delay of the probe, in milliseconds.
    pub fn delay_ms(&self) -> f64 {
        (self.receive_time - self.send_time) * 1_000.0
    }
}

impl FromStr for ProbeRecord {
    type Err = ProbeParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lexer::parse_record(s)
    }
}

impl fmt::Display for ProbeRecord {
    /// Formats the record the way the receiver logs it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(('{host}', {port}), '({seq}, {send:?})', {recv:?})",
            host = self.source_host,
            port = self.path,
            seq = self.sequence,
            send = self.send_time,
            recv = self.receive_time,
        )
    }
}

/// read every record of a probe log.
///
/// Blank lines are skipped. The first malformed line stops the read:
/// the cumulative counters built from the log rely on every record
/// being accounted for.
pub fn read_log<R: BufRead>(reader: R) -> Result<Vec<ProbeRecord>, LogError> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line_content = line?;
        if line_content.trim().is_empty() {
            continue;
        }

        let record = line_content
            .parse()
            .map_err(|source| LogError::Parse {
                line: index + 1,
                source,
            })?;
        records.push(record);
    }

    Ok(records)
}

/// same as [`read_log`], from an in memory log.
pub fn parse_log(content: &str) -> Result<Vec<ProbeRecord>, LogError> {
    read_log(content.as_bytes())
}
