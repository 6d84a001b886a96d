//! CoNLL-U file parsing
//!
//! Reads CoNLL-U text sentence by sentence into unlinked [`Token`] records.
//! Multiword token ranges (`1-2`) and empty nodes (`2.1`) are skipped.
//! Forms and transliterations are case-folded on the way in.
//!
//! CoNLL-U format: https://universaldependencies.org/format.html

use crate::bytes::{bs_atoi, bs_split_columns, bs_split_once};
use crate::tree::Token;
use bstr::ByteSlice;
use bstr::io::{BufReadExt, ByteLines};
use flate2::read::MultiGzDecoder;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;
use thiserror::Error;

/// Error during CoNLL-U parsing
#[derive(Debug, Error)]
#[error("Parse error at line {line_num}: {message}")]
pub struct ParseError {
    pub line_num: usize,
    pub message: String,
}

/// One sentence worth of token records plus its comment metadata
#[derive(Debug, Clone, Default)]
pub struct SentenceRecords {
    /// `# sent_id`, or the 1-based ordinal of the sentence in its source
    pub sent_id: String,
    pub text: Option<String>,
    pub metadata: HashMap<String, String>,
    pub tokens: Vec<Token>,
}

/// CoNLL-U reader that iterates over sentences
pub struct ConlluReader<R: BufRead> {
    lines: ByteLines<R>,
    line_num: usize,
    sentence_num: usize,
    done: bool,
}

impl<R: BufRead> ConlluReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.byte_lines(),
            line_num: 0,
            sentence_num: 0,
            done: false,
        }
    }
}

impl ConlluReader<Box<dyn BufRead>> {
    /// Create a reader from a file path, decompressing `.gz` files
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl ConlluReader<Cursor<Vec<u8>>> {
    /// Create a reader from a string
    pub fn from_string(text: &str) -> Self {
        Self::new(Cursor::new(text.as_bytes().to_vec()))
    }
}

impl<R: BufRead> Iterator for ConlluReader<R> {
    type Item = Result<SentenceRecords, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut records = SentenceRecords::default();
        let mut sent_id = None;
        let mut error = None;
        let mut seen_content = false;

        // Read lines until we hit a blank line (sentence boundary) or EOF
        loop {
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    if seen_content {
                        break;
                    }
                    return None;
                }
                Some(Err(e)) => {
                    // An I/O error poisons the rest of the stream
                    self.done = true;
                    return Some(Err(ParseError {
                        line_num: self.line_num + 1,
                        message: format!("IO error: {}", e),
                    }));
                }
                Some(Ok(line)) => line,
            };
            self.line_num += 1;

            if line.trim().is_empty() {
                if seen_content {
                    break;
                }
                continue;
            }
            seen_content = true;

            // Keep consuming to the sentence boundary after an error so the
            // next call starts on a fresh sentence.
            if error.is_some() {
                continue;
            }

            let result = if let Some(comment) = line.strip_prefix(b"#") {
                parse_comment(comment, &mut sent_id, &mut records).map_err(|message| ParseError {
                    line_num: self.line_num,
                    message,
                })
            } else {
                parse_line(&line, self.line_num).map(|token| {
                    if let Some(token) = token {
                        records.tokens.push(token);
                    }
                })
            };
            if let Err(e) = result {
                error = Some(e);
            }
        }

        self.sentence_num += 1;
        if let Some(e) = error {
            return Some(Err(e));
        }
        records.sent_id = sent_id.unwrap_or_else(|| self.sentence_num.to_string());
        Some(Ok(records))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, String> {
    bytes
        .to_str()
        .map_err(|e| format!("Invalid UTF-8: {}", e))
}

/// Parse a comment line (after the leading '#')
fn parse_comment(
    comment: &[u8],
    sent_id: &mut Option<String>,
    records: &mut SentenceRecords,
) -> Result<(), String> {
    let Some((key, value)) = bs_split_once(comment, b'=') else {
        return Ok(());
    };
    let key = utf8(key.trim())?;
    let value = utf8(value.trim())?.to_string();

    match key {
        "sent_id" => *sent_id = Some(value),
        "text" => records.text = Some(value),
        _ => {
            records.metadata.insert(key.to_string(), value);
        }
    }
    Ok(())
}

/// Parse a single CoNLL-U line into a Token
/// Returns None for multiword tokens and empty nodes
fn parse_line(line: &[u8], line_num: usize) -> Result<Option<Token>, ParseError> {
    let error = |message: String| ParseError { line_num, message };

    let fields = bs_split_columns(line)
        .map_err(|found| error(format!("Expected 10 fields, found {}", found)))?;

    // Field 0: ID
    if fields[0].contains(&b'-') || fields[0].contains(&b'.') {
        return Ok(None);
    }
    let id = bs_atoi(fields[0])
        .ok_or_else(|| error(format!("Invalid ID: {}", fields[0].as_bstr())))?;

    // Field 6: HEAD
    let head = bs_atoi(fields[6])
        .ok_or_else(|| error(format!("Invalid HEAD: {}", fields[6].as_bstr())))?;

    let text = |bytes: &[u8]| utf8(bytes).map(str::to_string).map_err(error);

    // Field 9: MISC, only the transliteration is kept
    let transliteration = fields[9]
        .split_str("|")
        .filter_map(|pair| bs_split_once(pair, b'='))
        .find(|(key, _)| key.trim() == b"Translit")
        .map(|(_, value)| utf8(value.trim()).map(str::to_lowercase))
        .transpose()
        .map_err(error)?;

    Ok(Some(Token::with_full_fields(
        id,
        utf8(fields[1].trim()).map_err(error)?.to_lowercase(),
        text(fields[2])?,
        text(fields[3])?,
        text(fields[4])?,
        text(fields[5])?,
        head,
        text(fields[7])?,
        text(fields[8])?,
        transliteration,
    )))
}
