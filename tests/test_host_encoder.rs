/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use hostpack::codec;
use hostpack::prelude::*;
use rand::prelude::*;
use rand::rngs::SmallRng;
use std::io::prelude::*;
use std::io::BufReader;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789-_";

fn random_label(rng: &mut SmallRng, max_len: usize) -> String {
    let len = rng.random_range(1..=max_len);
    (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

fn random_hostname(rng: &mut SmallRng, max_labels: usize, max_len: usize) -> String {
    let labels = rng.random_range(1..=max_labels);
    (0..labels)
        .map(|_| random_label(rng, max_len))
        .collect::<Vec<_>>()
        .join(".")
}

#[test]
fn test_hostnames_100() -> Result<()> {
    let hostnames = BufReader::new(std::fs::File::open("tests/data/hostnames.100")?)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()?;

    let mut encoder = HostEncoder::new();
    let tokens = hostnames
        .iter()
        .map(|h| encoder.compress(h).unwrap())
        .collect::<Vec<_>>();

    for (hostname, token) in hostnames.iter().zip(&tokens) {
        assert_eq!(encoder.decompress(token).as_ref(), Some(hostname));
        assert_eq!(encoder.find(hostname).as_ref(), Some(token));
        assert!(encoder.contains(hostname));
    }

    // compressing again changes nothing
    let used = encoder.store().len();
    for (hostname, token) in hostnames.iter().zip(&tokens) {
        assert_eq!(encoder.compress(hostname).as_ref(), Some(token));
    }
    assert_eq!(encoder.store().len(), used);

    let stats = encoder.stats();
    assert_eq!(stats.hostnames, 200);
    assert!(stats.reused_labels > stats.inserted_labels);
    assert!(stats.sum_token_bytes < stats.sum_host_bytes);
    assert_eq!(stats.inserted_labels, encoder.store().num_labels());
    assert_eq!(stats.inserted_labels + 1, encoder.trie().len());
    encoder.print_stats();
    Ok(())
}

#[test]
fn test_round_trip() {
    let mut rng = SmallRng::seed_from_u64(0);
    let mut encoder = HostEncoder::new();
    for _ in 0..10_000 {
        let hostname = random_hostname(&mut rng, 6, 63);
        let token = encoder.compress(&hostname).unwrap();
        assert_eq!(encoder.decompress(&token), Some(hostname));
    }

    let token = encoder.compress("localhost").unwrap();
    assert_eq!(codec::decode(&token).unwrap().len(), 1);
    assert_eq!(encoder.decompress(&token).as_deref(), Some("localhost"));
}

#[test]
fn test_dedup() -> Result<()> {
    let mut encoder = HostEncoder::new();
    let a = codec::decode(&encoder.compress("a.example.com").unwrap())?;
    let b = codec::decode(&encoder.compress("b.example.com").unwrap())?;
    assert_eq!(a.len(), 3);
    assert_eq!(b.len(), 3);
    // "com" and "example"
    assert_eq!(a[..2], b[..2]);
    assert_ne!(a[2], b[2]);

    // a label under a different parent is stored again
    let c = codec::decode(&encoder.compress("example.org").unwrap())?;
    assert_ne!(c[1], a[1]);
    assert_eq!(encoder.store().num_labels(), 6);
    Ok(())
}

#[test]
fn test_first_write_wins() {
    let mut encoder = HostEncoder::new();
    let upper = encoder.compress("EXAMPLE.com").unwrap();
    let used = encoder.store().len();
    let lower = encoder.compress("example.com").unwrap();
    assert_eq!(upper, lower);
    assert_eq!(encoder.store().len(), used);
    assert_eq!(encoder.decompress(&lower).as_deref(), Some("EXAMPLE.com"));

    let mixed = encoder.compress("www.Example.COM").unwrap();
    assert_eq!(encoder.decompress(&mixed).as_deref(), Some("www.EXAMPLE.com"));
    assert!(encoder.contains("Www.example.com"));
}

#[test]
fn test_label_length_boundary() {
    let mut encoder = HostEncoder::new();
    let max = encoder.config().max_label_len as usize;
    assert_eq!(max, 63);

    let hostname = format!("{}.example.com", "a".repeat(max));
    let token = encoder.compress(&hostname).unwrap();
    assert_eq!(encoder.decompress(&token), Some(hostname));

    let used = encoder.store().len();
    assert!(encoder
        .compress(&format!("{}.example.com", "a".repeat(max + 1)))
        .is_none());
    assert!(encoder
        .compress(&format!("www.{}.com", "b".repeat(max + 1)))
        .is_none());
    assert_eq!(encoder.store().len(), used);
}

#[test]
fn test_malformed_hostnames() {
    let mut encoder = HostEncoder::new();
    for hostname in ["", ".", "..", ".com", "example.com.", "www..example.com"] {
        assert!(encoder.compress(hostname).is_none(), "{:?}", hostname);
        assert!(!encoder.contains(hostname));
    }
    assert!(encoder.store().is_empty());
    assert!(encoder.trie().is_empty());
}

#[test]
fn test_malformed_tokens() -> Result<()> {
    let mut encoder = HostEncoder::new();
    assert_eq!(encoder.decompress(&[]), None);
    assert_eq!(encoder.decompress(&[2]), None);

    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..1000 {
        encoder.compress(&random_hostname(&mut rng, 4, 20)).unwrap();
    }
    let token = encoder.compress("www.example.com").unwrap();

    // tokens cut inside a code are rejected
    let mut long = codec::encode(&[10_000, 20_000])?;
    long.truncate(3);
    assert_eq!(encoder.decompress(&long), None);

    // offsets beyond the store
    let past = encoder.store().len() as u32;
    assert_eq!(encoder.decompress(&codec::encode(&[past])?), None);
    assert_eq!(encoder.decompress(&codec::encode(&[codec::MAX_VALUE])?), None);
    assert_eq!(encoder.decompress(&[0, 0]), None);
    assert_eq!(encoder.decompress(&[0xFF]), None);

    // random garbage either fails or names an existing hostname
    for _ in 0..100_000 {
        let len = rng.random_range(1..8);
        let garbage = (0..len).map(|_| rng.random::<u8>()).collect::<Vec<_>>();
        if let Some(hostname) = encoder.decompress(&garbage) {
            assert_eq!(encoder.find(&hostname), Some(garbage));
        }
    }

    assert_eq!(encoder.decompress(&token).as_deref(), Some("www.example.com"));
    Ok(())
}

#[test]
fn test_growth_stability() {
    let config = Config::default().block_size(64);
    let mut encoder = HostEncoder::with_config(config).unwrap();
    let mut rng = SmallRng::seed_from_u64(2);
    let mut issued: Vec<(String, Vec<u8>)> = vec![];
    let mut growths = encoder.store().growths();
    while encoder.store().growths() < 50 {
        let hostname = random_hostname(&mut rng, 5, 30);
        let token = encoder.compress(&hostname).unwrap();
        // every earlier token survives each growth
        if encoder.store().growths() != growths {
            growths = encoder.store().growths();
            for (hostname, token) in &issued {
                assert_eq!(encoder.decompress(token).as_ref(), Some(hostname));
            }
        }
        issued.push((hostname, token));
    }
    assert_eq!(encoder.store().capacity() % 64, 0);
    for (hostname, token) in &issued {
        assert_eq!(encoder.decompress(token).as_ref(), Some(hostname));
    }
}

#[cfg(feature = "slow_tests")]
#[test]
fn test_large_offsets() {
    // push the store past the one- to three-byte code ranges
    let mut encoder = HostEncoder::new();
    let mut rng = SmallRng::seed_from_u64(3);
    let mut issued = vec![];
    while encoder.store().len() < 4_000_000 {
        let hostname = random_hostname(&mut rng, 3, 63);
        let token = encoder.compress(&hostname).unwrap();
        if rng.random_ratio(1, 100) {
            issued.push((hostname, token));
        }
    }
    assert!(encoder.stats().max_token_bytes >= 8);
    for (hostname, token) in &issued {
        assert_eq!(encoder.decompress(token).as_ref(), Some(hostname));
    }
}
