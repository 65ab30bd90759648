use crate::constants::{
    ENCODING_MASK, ENCODING_OFFSET, LINE_TERMINATOR, LINE_TRAILER_SIZE, MAX_ENCODED_WIDTH,
};
use crate::error::UrgError;

/// Decode a group of 6-bit packed characters, most significant first.
pub fn decode_value(chars: &[u8]) -> Result<u32, UrgError> {
    if chars.len() > MAX_ENCODED_WIDTH {
        return Err(UrgError::DecodeError(format!(
            "group of {} characters does not fit into 32 bits",
            chars.len()
        )));
    }
    let mut value: u32 = 0;
    for &c in chars {
        if !is_encoded_char(c) {
            return Err(UrgError::DecodeError(format!(
                "character {:?} is outside the encoding range",
                c as char
            )));
        }
        value = (value << 6) | ((c - ENCODING_OFFSET) & ENCODING_MASK) as u32;
    }
    Ok(value)
}

/// Decode `chars` in groups of `group_size` characters.
///
/// A trailing group shorter than `group_size` is decoded as it is.
pub fn decode_sequence(chars: &[u8], group_size: usize) -> Result<Vec<u32>, UrgError> {
    if group_size == 0 {
        return Err(UrgError::DecodeError("group size must be positive".to_string()));
    }
    chars.chunks(group_size).map(decode_value).collect()
}

/// Encode `value` into `width` packed characters.
pub fn encode_value(value: u32, width: usize) -> Vec<u8> {
    (0..width)
        .rev()
        .map(|i| {
            let bits = value.checked_shr(6 * i as u32).unwrap_or(0);
            (bits as u8 & ENCODING_MASK) + ENCODING_OFFSET
        })
        .collect()
}

/// SCIP2.0 checksum: low 6 bits of the byte sum, offset into printable range.
pub fn checksum(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u32, |acc, &b| acc.wrapping_add(b as u32));
    (sum as u8 & ENCODING_MASK) + ENCODING_OFFSET
}

/// Drop the checksum character and the line terminator.
pub fn strip_checksum(line: &[u8]) -> &[u8] {
    &line[..line.len().saturating_sub(LINE_TRAILER_SIZE)]
}

/// Split a data line into its payload and checksum character.
pub fn split_checksum(line: &[u8]) -> Option<(&[u8], u8)> {
    let body = strip_terminator(line);
    let (&sum, payload) = body.split_last()?;
    Some((payload, sum))
}

/// Return the payload of `line` after checking its checksum character.
pub fn verify_checksum(line: &[u8]) -> Result<&[u8], UrgError> {
    let (payload, expected) = split_checksum(line)
        .ok_or_else(|| UrgError::DecodeError("line has no checksum".to_string()))?;
    let calculated = checksum(payload);
    if calculated != expected {
        return Err(UrgError::ChecksumMismatch(expected, calculated));
    }
    Ok(payload)
}

pub(crate) fn strip_terminator(line: &[u8]) -> &[u8] {
    match line.split_last() {
        Some((&LINE_TERMINATOR, body)) => body,
        _ => line,
    }
}

pub(crate) fn to_string(line: &[u8]) -> String {
    String::from_utf8_lossy(line).escape_debug().to_string()
}

fn is_encoded_char(c: u8) -> bool {
    (ENCODING_OFFSET..=ENCODING_OFFSET + ENCODING_MASK).contains(&c)
}
