//! Registry file format.
//!
//! One record per line, four fields separated by TAB:
//!
//! ```text
//! name <TAB> status <TAB> remote_address <TAB> timestamp <LF>
//! ```
//!
//! - `status` is `local` or `synced`
//! - `remote_address` is empty for local records
//! - `timestamp` is RFC 3339 UTC with microseconds
//!
//! A field containing TAB, `|`, CR or LF is wrapped in `|` quotes with any
//! inner `|` doubled. CRLF line endings and the `%Y-%m-%d::%H:%M:%S`
//! timestamps written by older registries are accepted on read.

use crate::error::{FilerError, FilerResult};
use crate::record::{ArtifactRecord, ArtifactStatus};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::iter::Peekable;
use std::str::Chars;

/// Field delimiter.
pub const DELIMITER: char = '\t';

/// Quote character for fields that contain special characters.
pub const QUOTE: char = '|';

/// Number of fields per record.
const FIELD_COUNT: usize = 4;

/// Timestamp layout used by older registries.
const LEGACY_TIMESTAMP: &str = "%Y-%m-%d::%H:%M:%S";

/// Encodes a record as one registry line, including the trailing newline.
#[must_use]
pub fn encode_record(record: &ArtifactRecord) -> String {
    let timestamp = record
        .timestamp()
        .to_rfc3339_opts(SecondsFormat::Micros, true);
    let fields = [
        record.name(),
        record.status().as_str(),
        record.remote_address().unwrap_or(""),
        timestamp.as_str(),
    ];

    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(DELIMITER);
        }
        push_field(&mut line, field);
    }
    line.push('\n');
    line
}

/// Encodes a full registry file.
#[must_use]
pub fn encode_records(records: &[ArtifactRecord]) -> String {
    records.iter().map(encode_record).collect()
}

/// Parses a full registry file, preserving record order.
///
/// Blank lines are skipped.
///
/// # Errors
///
/// Returns `RegistryCorrupted` naming the first offending line.
pub fn parse_records(contents: &str) -> FilerResult<Vec<ArtifactRecord>> {
    let mut records = Vec::new();
    let mut rows = RowReader::new(contents);
    while let Some((line, fields)) = rows.next_row()? {
        records.push(record_from_fields(line, fields)?);
    }
    Ok(records)
}

fn push_field(out: &mut String, field: &str) {
    let needs_quotes = field
        .chars()
        .any(|c| c == DELIMITER || c == QUOTE || c == '\n' || c == '\r');

    if !needs_quotes {
        out.push_str(field);
        return;
    }

    out.push(QUOTE);
    for c in field.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
}

fn record_from_fields(line: usize, fields: Vec<String>) -> FilerResult<ArtifactRecord> {
    let [name, status, address, timestamp]: [String; FIELD_COUNT] =
        fields.try_into().map_err(|fields: Vec<String>| {
            FilerError::corrupted(
                line,
                format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
            )
        })?;

    if name.is_empty() {
        return Err(FilerError::corrupted(line, "empty artifact name"));
    }

    let status: ArtifactStatus = status
        .parse()
        .map_err(|e: String| FilerError::corrupted(line, e))?;
    let timestamp = parse_timestamp(&timestamp)
        .ok_or_else(|| FilerError::corrupted(line, format!("bad timestamp {timestamp:?}")))?;
    let address = if address.is_empty() {
        None
    } else {
        Some(address)
    };

    ArtifactRecord::new(name, status, address, timestamp)
        .map_err(|e| FilerError::corrupted(line, e.to_string()))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Splits registry text into rows of unquoted fields.
struct RowReader<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> RowReader<'a> {
    fn new(contents: &'a str) -> Self {
        Self {
            chars: contents.chars().peekable(),
            line: 1,
        }
    }

    /// Returns the next non-blank row and the line it starts on.
    fn next_row(&mut self) -> FilerResult<Option<(usize, Vec<String>)>> {
        loop {
            if self.chars.peek().is_none() {
                return Ok(None);
            }

            let start = self.line;
            let fields = self.read_row()?;
            let blank = fields.len() == 1 && fields[0].is_empty();
            if !blank {
                return Ok(Some((start, fields)));
            }
        }
    }

    fn read_row(&mut self) -> FilerResult<Vec<String>> {
        let start = self.line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;

        while let Some(c) = self.chars.next() {
            match c {
                QUOTE if field.is_empty() && !quoted => {
                    self.read_quoted(&mut field, start)?;
                    quoted = true;
                }
                QUOTE => return Err(FilerError::corrupted(self.line, "stray quote character")),
                DELIMITER => {
                    fields.push(std::mem::take(&mut field));
                    quoted = false;
                }
                '\r' if self.chars.peek() == Some(&'\n') => {}
                '\n' => {
                    self.line += 1;
                    fields.push(field);
                    return Ok(fields);
                }
                _ if quoted => {
                    return Err(FilerError::corrupted(
                        self.line,
                        "data after closing quote",
                    ))
                }
                _ => field.push(c),
            }
        }

        fields.push(field);
        Ok(fields)
    }

    fn read_quoted(&mut self, field: &mut String, start: usize) -> FilerResult<()> {
        while let Some(c) = self.chars.next() {
            if c == QUOTE {
                if self.chars.peek() == Some(&QUOTE) {
                    self.chars.next();
                    field.push(QUOTE);
                } else {
                    return Ok(());
                }
            } else {
                if c == '\n' {
                    self.line += 1;
                }
                field.push(c);
            }
        }
        Err(FilerError::corrupted(start, "unterminated quoted field"))
    }
}
