#![no_main]

use hostpack::fuzz::hostnames::{harness, Data};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Data| harness(data));
