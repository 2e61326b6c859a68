/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unconditional_recursion)]

pub mod codec;
pub mod encoder;
pub mod store;
pub mod trie;

#[cfg(feature = "fuzz")]
pub mod fuzz;

pub mod prelude {
    pub use crate::codec::CodecError;
    pub use crate::encoder::*;
    pub use crate::store::{LabelStore, StoreError};
    pub use crate::trie::{LabelTrie, NodeId};
}

/// Initialize an [`env_logger`] at level `info`, unless otherwise specified
/// by the `RUST_LOG` environment variable.
pub fn init_env_logger() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()?;
    Ok(())
}
