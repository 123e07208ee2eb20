//! Throughput receiver harness. Creates a 2-node mesh as node 0 and
//! blocking-receives `count` fixed-size messages from node 1.
//!
//! Mirrors the original `local_thr` tool's contract: usage error exits 1,
//! setup failure prints the error and exits with a negative code.

use std::process::ExitCode;
use std::sync::Arc;

use meshring::{Context, Node};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: local_thr <queue> <message-size> <roundtrip-count>");
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

    let ctx = match Context::create(path, 2, 16, message_size) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            eprintln!("error in context create: {e}");
            return ExitCode::from(255); // negative-equivalent setup failure
        }
    };

    let node = Node::new(ctx, 0);
    let mut buf = vec![0u8; message_size as usize];
    for _ in 0..roundtrip_count {
        if let Err(e) = node.recv_from(1, &mut buf) {
            eprintln!("error in recv: {e}");
            return ExitCode::from(255);
        }
    }

    ExitCode::SUCCESS
}
