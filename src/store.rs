/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Append-only storage of labels.
//!
//! Labels are written one after the other as `[length][bytes]`, with the
//! length in a single byte. The first [`RESERVED`] bytes of the store are
//! never used, so no label has offset zero, and zero can be used as an unset
//! marker. Once written, an entry is never modified or removed: the offset
//! returned by [`LabelStore::append`] stays valid for the whole life of the
//! store.

use crate::codec;
use log::debug;
use mem_dbg::*;
use std::collections::TryReserveError;

/// The number of bytes at the start of the store that are never used.
pub const RESERVED: usize = 2;

/// Errors of [`LabelStore::append`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Label of {len} bytes exceeds the maximum label length {max}")]
    /// The label is longer than the maximum label length.
    LabelTooLong { len: usize, max: u8 },
    #[error("Label store full: {needed} bytes needed, limit is {limit}")]
    /// The label would not fit below the store size limit.
    Full { needed: usize, limit: usize },
    #[error("Cannot grow the label store: {0}")]
    /// The allocator refused to grow the store.
    Alloc(#[from] TryReserveError),
}

/// An append-only buffer of length-prefixed labels.
///
/// The buffer grows by whole multiples of a fixed block size, and only when
/// the next entry would not fit in the current capacity. Its size is capped so
/// that every offset it hands out can be packed by the [offset
/// codec](crate::codec).
#[derive(Debug, Clone, MemDbg, MemSize)]
pub struct LabelStore {
    /// The entries, preceded by [`RESERVED`] unused bytes.
    data: Vec<u8>,
    /// The number of entries.
    num_labels: usize,
    /// The number of times the buffer has been grown.
    growths: usize,
    /// The growth increment in bytes.
    block_size: usize,
    /// The maximum size of the buffer in bytes.
    max_bytes: usize,
    /// The maximum length of a label.
    max_label_len: u8,
}

impl LabelStore {
    /// Create an empty store.
    ///
    /// `max_bytes` is silently reduced to the largest size whose offsets
    /// can be encoded by the codec.
    pub fn new(max_label_len: u8, block_size: usize, max_bytes: usize) -> Self {
        debug_assert!(block_size > 0);
        Self {
            data: vec![0; RESERVED],
            num_labels: 0,
            growths: 0,
            block_size: block_size.max(1),
            max_bytes: max_bytes.min(codec::MAX_VALUE as usize + 1),
            max_label_len,
        }
    }

    /// Append a label, returning its offset.
    ///
    /// On failure the store is left untouched.
    pub fn append(&mut self, label: &[u8]) -> Result<u32, StoreError> {
        if label.len() > self.max_label_len as usize {
            return Err(StoreError::LabelTooLong {
                len: label.len(),
                max: self.max_label_len,
            });
        }

        let offset = self.data.len();
        let needed = offset + 1 + label.len();
        if needed > self.max_bytes {
            return Err(StoreError::Full {
                needed,
                limit: self.max_bytes,
            });
        }

        if needed > self.data.capacity() {
            let capacity = (needed / self.block_size + 1) * self.block_size;
            self.data.try_reserve_exact(capacity - offset)?;
            self.growths += 1;
            debug!(
                "Label store grown to {} bytes ({} labels)",
                self.data.capacity(),
                self.num_labels
            );
        }

        // save [length, bytes]
        self.data.push(label.len() as u8);
        self.data.extend_from_slice(label);
        self.num_labels += 1;
        // the size limit keeps offsets within the codec range
        Ok(offset as u32)
    }

    /// Return the label at `offset`, or `None` if the offset is reserved,
    /// beyond the end of the store, or if the entry would run past the end
    /// of the store.
    pub fn get(&self, offset: u32) -> Option<&[u8]> {
        let offset = offset as usize;
        if offset < RESERVED || offset >= self.data.len() {
            return None;
        }
        let start = offset + 1;
        self.data.get(start..start + self.data[offset] as usize)
    }

    /// Return the label at an offset returned by [`append`](Self::append).
    #[inline(always)]
    pub(crate) fn label(&self, offset: u32) -> &[u8] {
        let offset = offset as usize;
        debug_assert!(offset >= RESERVED && offset < self.data.len());
        let start = offset + 1;
        &self.data[start..start + self.data[offset] as usize]
    }

    /// The number of bytes used, including the reserved prefix.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if no label has been stored.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.num_labels == 0
    }

    #[inline(always)]
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The number of growth events since creation.
    #[inline(always)]
    pub fn growths(&self) -> usize {
        self.growths
    }

    #[inline(always)]
    pub fn max_label_len(&self) -> u8 {
        self.max_label_len
    }

    #[inline(always)]
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}
