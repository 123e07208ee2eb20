//! Throughput sender harness. Opens the mesh created by `local_thr` as
//! node 1 and blocking-sends `count` fixed-size messages to node 0, then
//! prints achieved throughput in msg/s.
//!
//! Mirrors the original `remote_thr` tool's contract, substituting
//! `std::time::Instant` for `gettimeofday`.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use meshring::{Context, Node};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: remote_thr <queue> <message-size> <roundtrip-count>");
        return ExitCode::from(1);
    }

    let path = &args[1];
    let message_size: u32 = match args[2].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("invalid message-size: {}", args[2]);
            return ExitCode::from(1);
        }
    };
    let roundtrip_count: u64 = match args[3].parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("invalid roundtrip-count: {}", args[3]);
            return ExitCode::from(1);
        }
    };

    let ctx = match Context::open(path, 2, 16, message_size) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            eprintln!("error in context open: {e}");
            return ExitCode::from(255);
        }
    };

    let node = Node::new(ctx, 1);
    let buf = vec![0u8; message_size as usize];

    let start = Instant::now();
    for _ in 0..roundtrip_count {
        if let Err(e) = node.send(0, &buf) {
            eprintln!("error in send: {e}");
            return ExitCode::from(255);
        }
    }
    let elapsed = start.elapsed();

    let thr = (roundtrip_count as f64 / elapsed.as_secs_f64()) as u64;
    println!("{thr} msg/s");

    ExitCode::SUCCESS
}
