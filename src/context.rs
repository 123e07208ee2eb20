use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::region::Region;

/// The shared-memory ring mesh: owns the backing region, the ring table, and
/// the (from, to) → ring-slot addressing function. No component other than
/// `Context` (via `ring.rs`) touches ring internals.
pub struct Context {
    region: Region,
}

impl Context {
    /// Creates a new backing file exclusively and initializes the mesh for
    /// `nodes` participants, a ring capacity rounded up to the next power of
    /// two from `requested_capacity`, and a uniform `msg_size`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidParameter`] for bad parameters, [`Error::AlreadyExists`]
    /// if `path` already names a file, [`Error::Io`] for other file errors,
    /// [`Error::MapFailed`] if `mmap` fails.
    pub fn create<P: AsRef<Path>>(
        path: P,
        nodes: u32,
        requested_capacity: u32,
        msg_size: u32,
    ) -> Result<Self> {
        let config = Config::new(nodes, requested_capacity, msg_size)?;
        let region = Region::create(path.as_ref(), config)?;
        Ok(Self { region })
    }

    /// Opens an existing backing file, mapping it at its current size and
    /// validating the caller's parameters against the on-disk header. If
    /// the file does not exist, falls back to [`Context::create`] — this is
    /// how peers bootstrap without coordinating who creates first.
    ///
    /// # Errors
    ///
    /// [`Error::ParameterMismatch`] if the caller's `(nodes, capacity,
    /// msg_size)` disagree with the header's. Otherwise as [`Context::create`].
    pub fn open<P: AsRef<Path>>(
        path: P,
        nodes: u32,
        requested_capacity: u32,
        msg_size: u32,
    ) -> Result<Self> {
        let config = Config::new(nodes, requested_capacity, msg_size)?;
        match Region::open(path.as_ref(), config) {
            Ok(region) => Ok(Self { region }),
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let region = Region::create(path.as_ref(), config)?;
                Ok(Self { region })
            }
            Err(e) => Err(e),
        }
    }

    /// Returns `(nodes, capacity, msg_size)` as stored in the header.
    pub fn describe(&self) -> (u32, u32, u32) {
        (
            self.region.nodes(),
            self.region.capacity(),
            self.region.msg_size(),
        )
    }

    pub(crate) fn region(&self) -> &Region {
        &self.region
    }

    pub(crate) fn nodes(&self) -> u32 {
        self.region.nodes()
    }

    /// Maps a directed pair `(from, to)` with `from != to`, both in
    /// `[0, nodes)`, to a distinct ring index in `[0, nodes * (nodes - 1))`.
    ///
    /// Enumerates ordered pairs in lexicographic order of `(from, to)`,
    /// skipping the diagonal: `idx = from * (nodes - 1) + (to - [to > from])`.
    /// This is the corrected bijection called for in the design notes — the
    /// original source's `from * (to - 1) + 1` is not a bijection for
    /// general N and is never implemented here.
    pub(crate) fn ring_index(&self, from: u32, to: u32) -> Result<u32> {
        let nodes = self.nodes();
        if from == to || from >= nodes || to >= nodes {
            return Err(Error::InvalidRoute { from, to, nodes });
        }
        let adjusted_to = if to > from { to - 1 } else { to };
        Ok(from * (nodes - 1) + adjusted_to)
    }
}
