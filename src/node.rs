use std::cell::Cell;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::ring;

/// A process-local handle binding `(context, node_id)`.
///
/// Holds the cached cross-core cursors used by the fast path of the
/// enqueue/dequeue protocol (one per outgoing ring this node produces on,
/// one per incoming ring it consumes from), plus the rotation cursor used
/// by [`Node::recv`]/[`Node::try_recv`] for round-robin receive-any
/// fairness. All of this state is process-local — it is not written into
/// the shared mapping, and is not meaningful to share across processes.
pub struct Node {
    context: Arc<Context>,
    node_id: u32,
    /// Producer-side cache of `head`, indexed by destination node.
    head_cache: Vec<Cell<u32>>,
    /// Consumer-side cache of `tail`, indexed by source node.
    tail_cache: Vec<Cell<u32>>,
    /// Next source index to resume scanning from in `recv`/`try_recv`.
    recv_cursor: Cell<u32>,
}

impl Node {
    /// Binds `node_id` to `context`. `node_id` must be in `[0, nodes)`;
    /// out-of-range ids are accepted here (construction cannot fail) but
    /// every method validates routes and returns [`Error::InvalidRoute`].
    pub fn new(context: Arc<Context>, node_id: u32) -> Self {
        let nodes = context.nodes() as usize;
        Self {
            context,
            node_id,
            head_cache: (0..nodes).map(|_| Cell::new(0)).collect(),
            tail_cache: (0..nodes).map(|_| Cell::new(0)).collect(),
            recv_cursor: Cell::new(0),
        }
    }

    /// This node's id.
    pub fn id(&self) -> u32 {
        self.node_id
    }

    /// Blocking send: spins with adaptive backoff until `to`'s ring has a
    /// free slot.
    pub fn send(&self, to: u32, buf: &[u8]) -> Result<()> {
        let index = self.context.ring_index(self.node_id, to)?;
        let mut cache = self.head_cache[to as usize].get();
        let result = ring::enqueue(self.context.region(), index, buf, &mut cache);
        self.head_cache[to as usize].set(cache);
        result
    }

    /// Non-blocking send: returns [`Error::Full`] if `to`'s ring has no free
    /// slot.
    pub fn try_send(&self, to: u32, buf: &[u8]) -> Result<()> {
        let index = self.context.ring_index(self.node_id, to)?;
        let mut cache = self.head_cache[to as usize].get();
        let result = ring::try_enqueue(self.context.region(), index, buf, &mut cache);
        self.head_cache[to as usize].set(cache);
        result
    }

    /// Blocking receive from a specific source: spins with adaptive backoff
    /// until a message arrives on the `(from, self)` ring. Returns the
    /// number of bytes written into `buf`.
    pub fn recv_from(&self, from: u32, buf: &mut [u8]) -> Result<usize> {
        let index = self.context.ring_index(from, self.node_id)?;
        let mut cache = self.tail_cache[from as usize].get();
        let result = ring::dequeue(self.context.region(), index, buf, &mut cache);
        self.tail_cache[from as usize].set(cache);
        result
    }

    /// Non-blocking receive from a specific source: returns [`Error::Empty`]
    /// if the `(from, self)` ring has nothing to read.
    pub fn try_recv_from(&self, from: u32, buf: &mut [u8]) -> Result<usize> {
        let index = self.context.ring_index(from, self.node_id)?;
        let mut cache = self.tail_cache[from as usize].get();
        let result = ring::try_dequeue(self.context.region(), index, buf, &mut cache);
        self.tail_cache[from as usize].set(cache);
        result
    }

    /// Blocking receive-any: polls every incoming `(i -> self)` ring in
    /// round-robin order, resuming from the source just after the one
    /// served last call, and returns as soon as one yields a message.
    pub fn recv(&self, buf: &mut [u8]) -> Result<(u32, usize)> {
        let mut backoff = crate::backoff::Backoff::new();
        loop {
            if let Some(result) = self.poll_any(buf) {
                return result;
            }
            backoff.snooze();
        }
    }

    /// Non-blocking receive-any: returns [`Error::Empty`] if every incoming
    /// ring was empty on this sweep.
    pub fn try_recv(&self, buf: &mut [u8]) -> Result<(u32, usize)> {
        self.poll_any(buf).unwrap_or(Err(Error::Empty))
    }

    /// One round-robin sweep over all incoming rings, starting just after
    /// the last-served source. Returns `None` if every ring was empty.
    fn poll_any(&self, buf: &mut [u8]) -> Option<Result<(u32, usize)>> {
        let nodes = self.head_cache.len() as u32;
        let start = self.recv_cursor.get();
        for step in 0..nodes {
            let from = (start + step) % nodes;
            if from == self.node_id {
                continue;
            }
            match self.try_recv_from(from, buf) {
                Ok(n) => {
                    self.recv_cursor.set((from + 1) % nodes);
                    return Some(Ok((from, n)));
                }
                Err(Error::Empty) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use tempfile::NamedTempFile;

    fn fresh_path() -> std::path::PathBuf {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        drop(tmp);
        path
    }

    #[test]
    fn send_recv_from_round_trip() {
        let path = fresh_path();
        let _ = std::fs::remove_file(&path);
        let ctx = Arc::new(Context::create(&path, 4, 16, 100).unwrap());
        let n0 = Node::new(Arc::clone(&ctx), 0);
        let n1 = Node::new(Arc::clone(&ctx), 1);

        n0.send(1, b"test\0").unwrap();
        let mut buf = [0u8; 100];
        let n = n1.recv_from(0, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"test\0");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn invalid_route_rejected() {
        let path = fresh_path();
        let _ = std::fs::remove_file(&path);
        let ctx = Arc::new(Context::create(&path, 4, 16, 8).unwrap());
        let n0 = Node::new(Arc::clone(&ctx), 0);
        assert!(matches!(
            n0.send(0, b"x"),
            Err(Error::InvalidRoute { .. })
        ));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn receive_any_round_robins_across_sources() {
        let path = fresh_path();
        let _ = std::fs::remove_file(&path);
        let ctx = Arc::new(Context::create(&path, 3, 16, 8).unwrap());
        let n0 = Node::new(Arc::clone(&ctx), 0);
        let n1 = Node::new(Arc::clone(&ctx), 1);
        let n2 = Node::new(Arc::clone(&ctx), 2);

        n0.send(2, b"from0").unwrap();
        n1.send(2, b"from1").unwrap();

        let mut buf = [0u8; 8];
        let (first_src, _) = n2.recv(&mut buf).unwrap();
        let (second_src, _) = n2.recv(&mut buf).unwrap();
        let mut sources = [first_src, second_src];
        sources.sort_unstable();
        assert_eq!(sources, [0, 1]);

        let _ = std::fs::remove_file(&path);
    }
}
