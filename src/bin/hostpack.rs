/*
 * SPDX-FileCopyrightText: 2026 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */
use anyhow::{ensure, Context, Result};
use clap::Parser;
use dsi_progress_logger::*;
use hostpack::prelude::*;
use log::info;
use mem_dbg::*;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};

#[derive(Parser, Debug)]
#[command(about = "Compresses a list of hostnames by label deduplication and prints statistics.", long_about = None)]
struct Args {
    /// A file containing hostnames, one per line, or - for standard input.
    source: String,
    /// The input is compressed with zstd.
    #[arg(long, conflicts_with = "gzip")]
    zstd: bool,
    /// The input is compressed with gzip.
    #[arg(long)]
    gzip: bool,
    /// The maximum length of a label.
    #[arg(short = 'l', long, default_value_t = 63)]
    max_label_len: u8,
    /// The number of bytes the label store grows by.
    #[arg(short, long, default_value_t = 2048)]
    block_size: usize,
    /// Decompress every token and check it against its hostname.
    #[arg(long, default_value_t = false)]
    verify: bool,
    /// Print the memory layout of the encoder.
    #[arg(long, default_value_t = false)]
    mem: bool,
}

fn open(args: &Args) -> Result<Box<dyn BufRead>> {
    let input: Box<dyn Read> = if args.source == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(File::open(&args.source).with_context(|| format!("Cannot open {}", args.source))?)
    };
    Ok(if args.zstd {
        Box::new(BufReader::new(zstd::Decoder::new(input)?))
    } else if args.gzip {
        Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(input)))
    } else {
        Box::new(BufReader::new(input))
    })
}

fn main() -> Result<()> {
    hostpack::init_env_logger()?;

    let args = Args::parse();

    let config = Config::default()
        .max_label_len(args.max_label_len)
        .block_size(args.block_size);
    let mut encoder = HostEncoder::with_config(config)?;
    let mut tokens = vec![];
    let mut rejected = 0_usize;

    let mut pl = ProgressLogger::default();
    pl.display_memory(true).item_name("hostname");
    pl.start("Compressing hostnames...");

    for line in open(&args)?.lines() {
        let line = line?;
        let hostname = line.trim();
        match encoder.compress(hostname) {
            Some(token) => {
                if args.verify {
                    tokens.push((hostname.to_owned(), token));
                }
            }
            None => rejected += 1,
        }
        pl.light_update();
    }

    pl.done();
    info!("Rejected {} malformed hostnames", rejected);

    if args.verify {
        pl.item_name("token");
        pl.start("Verifying tokens...");
        for (hostname, token) in &tokens {
            let result = encoder
                .decompress(token)
                .with_context(|| format!("Cannot decompress the token of {}", hostname))?;
            ensure!(
                result.eq_ignore_ascii_case(hostname),
                "{} decompressed as {}",
                hostname,
                result
            );
            pl.light_update();
        }
        pl.done();
    }

    encoder.print_stats();

    if args.mem {
        encoder.mem_dbg(DbgFlags::default())?;
    }

    Ok(())
}
