/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */
use crate::prelude::*;
use arbitrary::Arbitrary;

#[derive(Arbitrary, Debug)]
pub struct Data {
    /// hostnames to compress, valid or not
    hostnames: Vec<String>,
    /// tokens to decompress, mostly garbage
    tokens: Vec<Vec<u8>>,
    /// the maximum label length
    max_label_len: u8,
    /// the growth block size
    block_size: u16,
}

/// Compress and decompress arbitrary data, checking that valid hostnames
/// round-trip and that nothing panics.
pub fn harness(data: Data) {
    let config = Config::default()
        .max_label_len(data.max_label_len.max(1))
        .block_size(data.block_size as usize + 1);
    let Ok(mut encoder) = HostEncoder::with_config(config) else {
        return;
    };

    let mut compressed = vec![];
    for hostname in &data.hostnames {
        if let Some(token) = encoder.compress(hostname) {
            // idempotent
            assert_eq!(encoder.find(hostname).as_ref(), Some(&token));
            compressed.push((hostname, token));
        }
    }

    for (hostname, token) in &compressed {
        let result = encoder.decompress(token).expect("Valid token rejected");
        // the case of the first occurrence wins
        assert!(result.eq_ignore_ascii_case(hostname));
    }

    for token in &data.tokens {
        if let Some(hostname) = encoder.decompress(token) {
            // a token that decodes names a path of the trie
            assert_eq!(encoder.find(&hostname).as_deref(), Some(&token[..]));
        }
    }
}
