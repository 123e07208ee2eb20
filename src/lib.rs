//! MeshRing — a fixed-topology, shared-memory message-passing fabric for a
//! small, predeclared set of cooperating processes on the same host.
//!
//! Each process attaches by mapping a backing file and identifies itself as
//! one of `nodes` endpoints via a [`Node`]. Nodes exchange fixed-size
//! messages through lock-free single-producer/single-consumer ring buffers
//! allocated pairwise between every ordered pair of nodes — `nodes *
//! (nodes - 1)` rings in total. A [`Context`] owns the backing region; a
//! [`Node`] is a thin, process-local handle binding a node identity to a
//! shared `Context`.
//!
//! # Example
//!
//! ```no_run
//! use meshring::{Context, Node};
//! use std::sync::Arc;
//!
//! # fn main() -> meshring::Result<()> {
//! let ctx = Arc::new(Context::create("/tmp/mesh.ring", 4, 16, 100)?);
//! let node0 = Node::new(Arc::clone(&ctx), 0);
//! let node1 = Node::new(Arc::clone(&ctx), 1);
//!
//! node0.send(1, b"test\0")?;
//! let mut buf = [0u8; 100];
//! let n = node1.recv_from(0, &mut buf)?;
//! assert_eq!(&buf[..n], b"test\0");
//! # Ok(())
//! # }
//! ```

mod backoff;
mod config;
mod context;
mod error;
mod layout;
mod node;
mod region;
mod ring;

pub use context::Context;
pub use error::{Error, Result};
pub use node::Node;
