/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Packing of offset lists into tokens.
//!
//! Every offset is written with a prefix code of one to four bytes. The number
//! of leading ones of the first byte gives the number of additional bytes, and
//! the remaining bits of the first byte are the most significant bits of the
//! payload:
//!
//! | first byte | bytes | values                       |
//! |------------|-------|------------------------------|
//! | `0xxxxxxx` | 1     | `[0, 128)`                   |
//! | `10xxxxxx` | 2     | `[128, 16_512)`              |
//! | `110xxxxx` | 3     | `[16_512, 2_113_664)`        |
//! | `1110xxxx` | 4     | `[2_113_664, 270_549_120)`   |
//!
//! Longer codes are biased by the upper bound of the shorter ones, so every
//! value has exactly one representation. First bytes of the form `1111xxxx`
//! are never produced and are rejected on decoding.

const UPPER_BOUND_1: u32 = 128;
const UPPER_BOUND_2: u32 = 128_u32.pow(2) + UPPER_BOUND_1;
const UPPER_BOUND_3: u32 = 128_u32.pow(3) + UPPER_BOUND_2;
const UPPER_BOUND_4: u32 = 128_u32.pow(4) + UPPER_BOUND_3;

/// The largest value that can be encoded.
pub const MAX_VALUE: u32 = UPPER_BOUND_4 - 1;

/// Errors of the offset codec.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Value {0} exceeds the largest encodable value {MAX_VALUE}")]
    /// The value does not fit in four bytes.
    ValueTooLarge(u32),
    #[error("Truncated code at byte {pos}")]
    /// The token ends in the middle of a code.
    Truncated { pos: usize },
    #[error("Invalid first byte {byte:#04x} at byte {pos}")]
    /// The first byte announces a code longer than four bytes.
    InvalidPrefix { byte: u8, pos: usize },
}

/// Return the length in bytes of the code of `value`.
#[inline(always)]
pub fn encode_int_len(value: u32) -> usize {
    if value < UPPER_BOUND_1 {
        1
    } else if value < UPPER_BOUND_2 {
        2
    } else if value < UPPER_BOUND_3 {
        3
    } else {
        4
    }
}

/// Append the code of `value` to `data`.
#[inline(always)]
pub fn encode_int(mut value: u32, data: &mut Vec<u8>) -> Result<(), CodecError> {
    if value < UPPER_BOUND_1 {
        data.push(value as u8);
        return Ok(());
    }
    if value < UPPER_BOUND_2 {
        value -= UPPER_BOUND_1;
        debug_assert!((value >> 8) < (1 << 6));
        data.push(0x80 | (value >> 8) as u8);
        data.push(value as u8);
        return Ok(());
    }
    if value < UPPER_BOUND_3 {
        value -= UPPER_BOUND_2;
        debug_assert!((value >> 16) < (1 << 5));
        data.push(0xC0 | (value >> 16) as u8);
        data.push((value >> 8) as u8);
        data.push(value as u8);
        return Ok(());
    }
    if value < UPPER_BOUND_4 {
        value -= UPPER_BOUND_3;
        debug_assert!((value >> 24) < (1 << 4));
        data.push(0xE0 | (value >> 24) as u8);
        data.push((value >> 16) as u8);
        data.push((value >> 8) as u8);
        data.push(value as u8);
        return Ok(());
    }
    Err(CodecError::ValueTooLarge(value))
}

/// Decode the code at the start of `data`, returning the value and the rest
/// of the data.
///
/// `pos` is the position of `data` in the token and is used only for error
/// reporting.
#[inline(always)]
fn decode_int_at(data: &[u8], pos: usize) -> Result<(u32, &[u8]), CodecError> {
    let Some(&x) = data.first() else {
        return Err(CodecError::Truncated { pos });
    };
    let len = match x {
        0x00..=0x7F => return Ok((x as u32, &data[1..])),
        0x80..=0xBF => 2,
        0xC0..=0xDF => 3,
        0xE0..=0xEF => 4,
        _ => return Err(CodecError::InvalidPrefix { byte: x, pos }),
    };
    if data.len() < len {
        return Err(CodecError::Truncated { pos });
    }
    let x = match len {
        2 => (((x & !0xC0) as u32) << 8 | data[1] as u32) + UPPER_BOUND_1,
        3 => {
            (((x & !0xE0) as u32) << 16 | (data[1] as u32) << 8 | data[2] as u32) + UPPER_BOUND_2
        }
        _ => {
            (((x & !0xF0) as u32) << 24
                | (data[1] as u32) << 16
                | (data[2] as u32) << 8
                | data[3] as u32)
                + UPPER_BOUND_3
        }
    };
    Ok((x, &data[len..]))
}

/// Decode the code at the start of `data`, returning the value and the rest
/// of the data.
#[inline(always)]
pub fn decode_int(data: &[u8]) -> Result<(u32, &[u8]), CodecError> {
    decode_int_at(data, 0)
}

/// Pack a list of values into a token.
pub fn encode(values: &[u32]) -> Result<Vec<u8>, CodecError> {
    let mut token = Vec::with_capacity(values.iter().map(|&v| encode_int_len(v)).sum());
    for &value in values {
        encode_int(value, &mut token)?;
    }
    Ok(token)
}

/// Unpack a token into the list of values it was built from.
pub fn decode(token: &[u8]) -> Result<Vec<u32>, CodecError> {
    let mut values = Vec::with_capacity(token.len());
    let mut data = token;
    while !data.is_empty() {
        let (value, rest) = decode_int_at(data, token.len() - data.len())?;
        values.push(value);
        data = rest;
    }
    Ok(values)
}

#[cfg(test)]
#[cfg_attr(test, test)]
fn test_encode_decode_int() {
    const MAX: u32 = 1 << 22;
    let mut buffer = Vec::with_capacity(128);

    for i in 0..MAX {
        encode_int(i, &mut buffer).unwrap();
    }

    let mut data = &buffer[..];
    for i in 0..MAX {
        let (j, tmp) = decode_int(data).unwrap();
        assert_eq!(data.len() - tmp.len(), encode_int_len(i));
        data = tmp;
        assert_eq!(i, j);
    }
    assert!(data.is_empty());
}

#[cfg(test)]
#[cfg_attr(test, test)]
fn test_code_boundaries() {
    for (value, len) in [
        (0, 1),
        (UPPER_BOUND_1 - 1, 1),
        (UPPER_BOUND_1, 2),
        (UPPER_BOUND_2 - 1, 2),
        (UPPER_BOUND_2, 3),
        (UPPER_BOUND_3 - 1, 3),
        (UPPER_BOUND_3, 4),
        (MAX_VALUE, 4),
    ] {
        let mut data = vec![];
        encode_int(value, &mut data).unwrap();
        assert_eq!(data.len(), len, "value {}", value);
        assert_eq!(decode_int(&data), Ok((value, &[][..])));
    }
    assert_eq!(
        encode_int(MAX_VALUE + 1, &mut vec![]),
        Err(CodecError::ValueTooLarge(MAX_VALUE + 1))
    );
    assert_eq!(
        encode(&[2, u32::MAX]),
        Err(CodecError::ValueTooLarge(u32::MAX))
    );
}

#[cfg(test)]
#[cfg_attr(test, test)]
fn test_malformed_tokens() {
    let token = encode(&[2, 300, 70_000, 5_000_000]).unwrap();
    assert_eq!(decode(&token), Ok(vec![2, 300, 70_000, 5_000_000]));
    // every proper prefix that cuts a code is rejected
    for cut in 1..token.len() {
        match decode(&token[..cut]) {
            Ok(values) => assert!(values.len() < 4),
            Err(err) => assert!(matches!(err, CodecError::Truncated { .. })),
        }
    }
    assert_eq!(decode(&token[..2]), Err(CodecError::Truncated { pos: 1 }));
    assert_eq!(
        decode(&[0x05, 0xF3, 0, 0, 0, 0]),
        Err(CodecError::InvalidPrefix { byte: 0xF3, pos: 1 })
    );
    assert_eq!(decode(&[]), Ok(vec![]));
}
