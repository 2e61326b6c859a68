/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Compression of hostnames by label deduplication.

A [`HostEncoder`] splits hostnames into labels, from the rightmost to the
leftmost, and inserts them into a [`LabelTrie`] whose labels are written once
in a [`LabelStore`]. A hostname is then represented by the list of the store
offsets of its labels, packed by the [codec](crate::codec) into a short
token. Labels are deduplicated ignoring ASCII case: a hostname whose labels
are already known is always compressed to the same token, and decompressing
a token returns the labels with the case of their first occurrence.

Tokens are meaningful only for the encoder that produced them (or an exact
copy of it): they contain offsets into its private store, and no check can
tell a token of another encoder from a valid one.

```
use hostpack::prelude::*;

let mut encoder = HostEncoder::new();
let token = encoder.compress("www.example.com").unwrap();
assert_eq!(encoder.decompress(&token).as_deref(), Some("www.example.com"));
assert!(encoder.compress("bad..example.com").is_none());
```

*/

use crate::codec::{self, CodecError};
use crate::store::{LabelStore, StoreError};
use crate::trie::{LabelTrie, ROOT};
use derive_setters::Setters;
use log::debug;
use mem_dbg::*;
use std::string::FromUtf8Error;

/// The parameters of a [`HostEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Setters, MemDbg, MemSize)]
pub struct Config {
    /// The maximum length of a label. The default, 63, is the limit of the
    /// DNS protocol; the type makes it impossible to exceed what the
    /// one-byte length prefix of the store can represent.
    pub max_label_len: u8,
    /// The number of bytes the label store grows by.
    pub block_size: usize,
    /// The maximum size of the label store in bytes. It cannot exceed
    /// [`codec::MAX_VALUE`]` + 1`, as larger offsets cannot be encoded.
    pub max_store_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_label_len: 63,
            block_size: 2048,
            max_store_bytes: codec::MAX_VALUE as usize + 1,
        }
    }
}

/// Invalid [`Config`] values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("The block size must be positive")]
    ZeroBlockSize,
    #[error("The maximum label length must be positive")]
    ZeroLabelLength,
    #[error("The store limit {limit} exceeds the largest addressable size {max}")]
    StoreLimitTooLarge { limit: usize, max: usize },
}

/// Reasons for which a hostname cannot be compressed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressError {
    #[error("Empty hostname")]
    EmptyHostname,
    #[error("Empty label at byte {pos}")]
    /// A leading, trailing, or doubled dot.
    EmptyLabel { pos: usize },
    #[error("Label at byte {pos} has {len} bytes, maximum is {max}")]
    LabelTooLong { pos: usize, len: usize, max: u8 },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Reasons for which a token cannot be decompressed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompressError {
    #[error("Empty token")]
    EmptyToken,
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Offset {0} is not a label of the store")]
    /// The offset is reserved, past the end of the store, or its entry
    /// runs past the end of the store.
    OffsetOutOfBounds(u32),
    #[error("Offset {0} does not continue the path of the previous labels")]
    NotInTrie(u32),
    #[error("The token decodes to an empty hostname")]
    ZeroLength,
    #[error(transparent)]
    Utf8(#[from] FromUtf8Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, MemDbg, MemSize)]
/// Statistics of the compressed hostnames.
pub struct Stats {
    /// The number of successful compressions.
    pub hostnames: usize,
    /// The total sum of the hostname lengths in bytes.
    pub sum_host_bytes: usize,
    /// The total sum of the token lengths in bytes.
    pub sum_token_bytes: usize,
    /// Maximum token length in bytes.
    pub max_token_bytes: usize,
    /// Maximum number of labels in a hostname.
    pub max_labels: usize,
    /// The number of labels that were added to the trie.
    pub inserted_labels: usize,
    /// The number of labels that were found in the trie.
    pub reused_labels: usize,
}

/// A hostname compressor.
///
/// See the [module documentation](self) for details. Compression mutates the
/// encoder and thus needs exclusive access; decompression does not.
#[derive(Debug, Clone, MemDbg, MemSize)]
pub struct HostEncoder {
    config: Config,
    store: LabelStore,
    trie: LabelTrie,
    stats: Stats,
}

impl Default for HostEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check that all labels of `name` are nonempty and at most `max` bytes long,
/// returning their number.
fn check_labels(name: &[u8], max: u8) -> Result<usize, CompressError> {
    if name.is_empty() {
        return Err(CompressError::EmptyHostname);
    }
    let mut count = 0;
    let mut end = name.len();
    for label in name.rsplit(|&c| c == b'.') {
        let pos = end - label.len();
        if label.is_empty() {
            return Err(CompressError::EmptyLabel { pos });
        }
        if label.len() > max as usize {
            return Err(CompressError::LabelTooLong {
                pos,
                len: label.len(),
                max,
            });
        }
        count += 1;
        end = pos.saturating_sub(1);
    }
    Ok(count)
}

impl HostEncoder {
    fn from_config(config: Config) -> Self {
        Self {
            store: LabelStore::new(
                config.max_label_len,
                config.block_size,
                config.max_store_bytes,
            ),
            trie: LabelTrie::new(),
            stats: Stats::default(),
            config,
        }
    }

    /// Create an encoder with the default [`Config`].
    pub fn new() -> Self {
        Self::from_config(Config::default())
    }

    /// Create an encoder with the given configuration.
    pub fn with_config(config: Config) -> Result<Self, ConfigError> {
        if config.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if config.max_label_len == 0 {
            return Err(ConfigError::ZeroLabelLength);
        }
        let max = codec::MAX_VALUE as usize + 1;
        if config.max_store_bytes > max {
            return Err(ConfigError::StoreLimitTooLarge {
                limit: config.max_store_bytes,
                max,
            });
        }
        Ok(Self::from_config(config))
    }

    /// Compress a hostname, returning its token, or `None` if the hostname is
    /// malformed or the label store cannot hold its labels.
    ///
    /// Labels written before a failure are not removed from the store: they
    /// waste space, but they are valid entries.
    pub fn compress(&mut self, hostname: &str) -> Option<Vec<u8>> {
        self.try_compress(hostname)
            .inspect_err(|e| debug!("Cannot compress {:?}: {}", hostname, e))
            .ok()
    }

    pub(crate) fn try_compress(&mut self, hostname: &str) -> Result<Vec<u8>, CompressError> {
        let name = hostname.as_bytes();
        let num_labels = check_labels(name, self.config.max_label_len)?;

        let mut offsets = Vec::with_capacity(num_labels);
        let mut node = ROOT;
        let mut inserted = 0;
        for label in name.rsplit(|&c| c == b'.') {
            let nodes = self.trie.len();
            node = self.trie.find_or_insert(&mut self.store, node, label)?;
            if self.trie.len() != nodes {
                inserted += 1;
            }
            offsets.push(self.trie.offset(node));
        }
        let token = codec::encode(&offsets)?;

        // update stats
        self.stats.hostnames += 1;
        self.stats.sum_host_bytes += name.len();
        self.stats.sum_token_bytes += token.len();
        self.stats.max_token_bytes = self.stats.max_token_bytes.max(token.len());
        self.stats.max_labels = self.stats.max_labels.max(num_labels);
        self.stats.inserted_labels += inserted;
        self.stats.reused_labels += num_labels - inserted;

        Ok(token)
    }

    /// Return the token of a hostname whose labels are all in the encoder,
    /// without modifying the encoder.
    pub fn find(&self, hostname: &str) -> Option<Vec<u8>> {
        let name = hostname.as_bytes();
        let num_labels = check_labels(name, self.config.max_label_len).ok()?;
        let mut offsets = Vec::with_capacity(num_labels);
        let mut node = ROOT;
        for label in name.rsplit(|&c| c == b'.') {
            node = self.trie.find(&self.store, node, label)?;
            offsets.push(self.trie.offset(node));
        }
        codec::encode(&offsets).ok()
    }

    /// Return whether a hostname has already been compressed, ignoring case.
    ///
    /// Note that a suffix of a compressed hostname is contained, too, as
    /// its labels form a path of the trie.
    pub fn contains(&self, hostname: &str) -> bool {
        self.find(hostname).is_some()
    }

    /// Decompress a token produced by [`compress`](Self::compress) on this
    /// encoder, or return `None` if the token is not valid.
    pub fn decompress(&self, token: &[u8]) -> Option<String> {
        self.try_decompress(token)
            .inspect_err(|e| debug!("Cannot decompress {:02x?}: {}", token, e))
            .ok()
    }

    pub(crate) fn try_decompress(&self, token: &[u8]) -> Result<String, DecompressError> {
        if token.is_empty() {
            return Err(DecompressError::EmptyToken);
        }
        let offsets = codec::decode(token)?;

        // name length plus the dot
        let mut labels = Vec::with_capacity(offsets.len());
        let mut total_len = 0;
        for &offset in &offsets {
            let label = self
                .store
                .get(offset)
                .ok_or(DecompressError::OffsetOutOfBounds(offset))?;
            total_len += label.len() + 1;
            labels.push(label);
        }
        let total_len = total_len.saturating_sub(1);
        if total_len == 0 {
            return Err(DecompressError::ZeroLength);
        }

        // offsets in bounds might still point inside an entry
        let mut node = ROOT;
        for &offset in &offsets {
            node = self
                .trie
                .child_with_offset(&self.store, node, offset)
                .ok_or(DecompressError::NotInTrie(offset))?;
        }

        // the first label is the rightmost one
        let mut result = vec![0; total_len];
        let mut end = total_len;
        for (i, label) in labels.iter().enumerate() {
            let start = end - label.len();
            result[start..end].copy_from_slice(label);
            end = start;
            if i != labels.len() - 1 {
                end -= 1;
                result[end] = b'.';
            }
        }
        debug_assert_eq!(end, 0);

        Ok(String::from_utf8(result)?)
    }

    #[inline(always)]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline(always)]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    #[inline(always)]
    pub fn store(&self) -> &LabelStore {
        &self.store
    }

    #[inline(always)]
    pub fn trie(&self) -> &LabelTrie {
        &self.trie
    }

    /// Print in an human readable format the statistics of the encoder.
    pub fn print_stats(&self) {
        let stats = &self.stats;
        let n = stats.hostnames.max(1) as f64;
        println!("{:>20}: {:>10}", "hostnames", stats.hostnames);
        println!("{:>20}: {:>10}", "unique_labels", self.store.num_labels());
        println!("{:>20}: {:>10}", "inserted_labels", stats.inserted_labels);
        println!("{:>20}: {:>10}", "reused_labels", stats.reused_labels);
        println!("{:>20}: {:>10}", "max_labels", stats.max_labels);
        println!("{:>20}: {:>10}", "trie_nodes", self.trie.len());
        println!("{:>20}: {:>10}", "store_growths", self.store.growths());
        println!(
            "{:>20}: {:>10.3}",
            "avg_host_bytes",
            stats.sum_host_bytes as f64 / n
        );
        println!("{:>20}: {:>10}", "max_token_bytes", stats.max_token_bytes);
        println!(
            "{:>20}: {:>10.3}",
            "avg_token_bytes",
            stats.sum_token_bytes as f64 / n
        );

        fn human(key: &str, x: usize) {
            const UOM: &[&str] = &["B", "KB", "MB", "GB", "TB"];
            let mut y = x as f64;
            let mut uom_idx = 0;
            while y > 1000.0 {
                uom_idx += 1;
                y /= 1000.0;
            }
            println!("{:>20}:{:>10.3}{}{:>20} ", key, y, UOM[uom_idx], x);
        }

        human("uncompressed_size", stats.sum_host_bytes);
        human("tokens_size", stats.sum_token_bytes);
        human("store_size", self.store.len());
        human("store_capacity", self.store.capacity());
        human("total_size", self.mem_size(SizeFlags::CAPACITY));

        println!(
            "compression_ratio: {:.3}",
            (stats.sum_token_bytes + self.store.len()) as f64 / stats.sum_host_bytes.max(1) as f64
        );
    }
}
