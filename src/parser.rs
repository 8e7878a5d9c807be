//! Parser for the textual `getall` dump.
//!
//! The store prints one `"key": "value"` pair per line. This is not parsed
//! as JSON: the key/value boundary is the first colon after the second
//! double quote on the line, and each half is unquoted by taking what lies
//! between its first and last double quote. Escaped or nested quotes are
//! not interpreted.

use tracing::{debug, warn};

use crate::error::TransferError;
use crate::record::Record;

const QUOTE: u8 = b'"';
const COLON: u8 = b':';
const NEWLINE: u8 = b'\n';

/// Returns the bytes strictly between the first and the last `"` of `span`.
///
/// Both ends are scanned in the same pass. Fails when the span holds fewer
/// than two quotes. An empty result (`""`) is valid.
pub fn extract_quoted(span: &[u8]) -> Result<&[u8], TransferError> {
    let mut lt = None;
    let mut rt = None;

    for (i, ri) in (0..span.len()).zip((0..span.len()).rev()) {
        if lt.is_none() && span[i] == QUOTE {
            lt = Some(i);
        }
        if rt.is_none() && span[ri] == QUOTE {
            rt = Some(ri);
        }
        if lt.is_some() && rt.is_some() {
            break;
        }
    }

    match (lt, rt) {
        (Some(l), Some(r)) if l < r => Ok(&span[l + 1..r]),
        _ => {
            debug!(span = %String::from_utf8_lossy(span), "failed to remove quotes");
            Err(TransferError::NoQuotesFound { len: span.len() })
        }
    }
}

/// Splits on `\n` only. Carriage returns and whitespace stay in the line.
/// A trailing newline does not produce a trailing empty line.
pub fn split_lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = data.strip_suffix(&[NEWLINE]).unwrap_or(data);
    (!data.is_empty())
        .then(|| body.split(|b| *b == NEWLINE))
        .into_iter()
        .flatten()
}

/// Parses one `"key": "value"` line.
pub fn parse_record(line: &[u8]) -> Result<Record, TransferError> {
    let malformed = || TransferError::MalformedRecordLine { len: line.len() };

    let mut quotes = 0usize;
    let split = line
        .iter()
        .position(|&b| {
            if b == QUOTE {
                quotes += 1;
            }
            quotes >= 2 && b == COLON
        })
        .ok_or_else(malformed)?;

    let (left, right) = line.split_at(split);
    let key = extract_quoted(left).map_err(|_| malformed())?;
    let value = extract_quoted(right).map_err(|_| malformed())?;

    Ok(Record::new(key, value))
}

/// Records parsed from a dump, in line order.
#[derive(Debug, Default)]
pub struct ParsedDump {
    pub records: Vec<Record>,
    /// 1-based numbers of the lines that were skipped
    pub rejected: Vec<usize>,
}

/// Parses every line of a dump. Bad lines are logged and skipped.
pub fn parse_dump(data: &[u8]) -> ParsedDump {
    let mut out = ParsedDump::default();

    for (i, line) in split_lines(data).enumerate() {
        let line_no = i + 1;
        match parse_record(line) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                warn!(line = line_no, error = %e, "failed to process line");
                debug!(line = line_no, content = %String::from_utf8_lossy(line), "rejected line");
                out.rejected.push(line_no);
            }
        }
    }

    out
}
