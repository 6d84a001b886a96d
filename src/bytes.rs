use atoi::FromRadix10Checked;
use memchr::memchr_iter;

/// Number of columns on a CoNLL-U token line
pub const CONLLU_COLUMNS: usize = 10;

// Divide a bytestring into two at delim
#[inline]
pub fn bs_split_once(bytes: &[u8], delim: u8) -> Option<(&[u8], &[u8])> {
    let pos = memchr::memchr(delim, bytes)?;
    Some((&bytes[..pos], &bytes[pos + 1..]))
}

/// Split a token line into exactly ten tab-separated columns
///
/// Returns the number of columns found on mismatch.
#[inline]
pub fn bs_split_columns(line: &[u8]) -> Result<[&[u8]; CONLLU_COLUMNS], usize> {
    let mut columns: [&[u8]; CONLLU_COLUMNS] = [&[]; CONLLU_COLUMNS];
    let mut count = 0;
    let mut start = 0;

    for tab in memchr_iter(b'\t', line).chain(std::iter::once(line.len())) {
        if count < CONLLU_COLUMNS {
            columns[count] = &line[start..tab];
        }
        count += 1;
        start = tab + 1;
    }

    if count == CONLLU_COLUMNS {
        Ok(columns)
    } else {
        Err(count)
    }
}

/// Parse a whole bytestring as an unsigned decimal
#[inline]
pub fn bs_atoi(bytes: &[u8]) -> Option<usize> {
    match usize::from_radix_10_checked(bytes) {
        (Some(n), used) if used == bytes.len() && used > 0 => Some(n),
        _ => None,
    }
}
