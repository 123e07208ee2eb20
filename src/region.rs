//! Backing-region lifecycle: the memory-mapped file that holds the header,
//! ring descriptor table, and data arena.
//!
//! `Region` is the single owning handle for the `mmap(2)` mapping and the
//! `File` that backs it, following the same file-backed-mmap shape used
//! elsewhere in the corpus for cross-process shared ring buffers: open or
//! create the file, size it, map it `MAP_SHARED`, then hand out typed views
//! into the mapping rather than raw pointer arithmetic at each call site.

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::layout::{
    region_size, slot_stride, Header, RingDescriptor, HEADER_SIZE, RING_DESCRIPTOR_SIZE,
};

pub(crate) struct Region {
    ptr: *mut u8,
    len: usize,
    // Kept alive for the lifetime of the mapping; never read after mapping.
    _file: File,
}

// SAFETY: all accesses to the mapped memory go through `AtomicU32`
// operations on the head/tail words (synchronized across processes by the
// protocol in `ring.rs`) or through one-time, write-once initialization at
// `create()` before any other process attaches. The raw pointer itself does
// not alias Rust-level mutable references.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Region {
    /// Creates a new backing file exclusively, sizes it, maps it, and
    /// zero-initializes the header and every ring descriptor.
    pub(crate) fn create(path: &Path, config: Config) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    Error::AlreadyExists
                } else {
                    Error::Io(e)
                }
            })?;

        let rings = config.rings();
        let total_size = region_size(rings, config.capacity, config.msg_size);
        file.set_len(total_size as u64).map_err(Error::Io)?;

        let ptr = map(&file, total_size)?;

        // SAFETY: the mapping is exclusively ours (just created), so
        // zero-filling and initializing the header/ring table races with no
        // other process.
        unsafe {
            std::ptr::write_bytes(ptr, 0, total_size);

            let header = &mut *ptr.cast::<Header>();
            header.nodes = config.nodes;
            header.rings = rings;
            header.capacity_mask = config.capacity_mask();
            header.msg_size = config.msg_size;

            let ring_table = ptr.add(HEADER_SIZE).cast::<RingDescriptor>();
            for i in 0..rings as usize {
                let ring = &mut *ring_table.add(i);
                ring.line1.capacity_mask = config.capacity_mask();
                ring.line1.msg_size = config.msg_size;
                // Offset is relative to the data arena (computed in `slot_ptr`),
                // not the start of the file. Each slot occupies `slot_stride`
                // bytes, not `msg_size` — the leading length prefix counts.
                ring.line1.offset = (i * config.capacity as usize
                    * slot_stride(config.msg_size) as usize)
                    as u32;
            }
        }

        Ok(Self {
            ptr,
            len: total_size,
            _file: file,
        })
    }

    /// Opens an existing backing file, maps it at its current size, and
    /// validates the caller's parameters against the header.
    pub(crate) fn open(path: &Path, config: Config) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(Error::Io)?;

        let metadata = file.metadata().map_err(Error::Io)?;
        let len = metadata.len() as usize;

        let ptr = map(&file, len)?;

        let region = Self {
            ptr,
            len,
            _file: file,
        };

        let header = region.header();
        if !config.matches(header.nodes, header.capacity_mask + 1, header.msg_size) {
            return Err(Error::ParameterMismatch {
                caller_nodes: config.nodes,
                caller_capacity: config.capacity,
                caller_msg_size: config.msg_size,
                header_nodes: header.nodes,
                header_capacity: header.capacity_mask + 1,
                header_msg_size: header.msg_size,
            });
        }

        Ok(region)
    }

    #[inline]
    pub(crate) fn header(&self) -> &Header {
        // SAFETY: header occupies the first `HEADER_SIZE` bytes of a mapping
        // of at least that size, written once at create time.
        unsafe { &*self.ptr.cast::<Header>() }
    }

    #[inline]
    pub(crate) fn ring(&self, index: u32) -> &RingDescriptor {
        debug_assert!(index < self.header().rings);
        // SAFETY: `index < rings`, and the ring table occupies
        // `rings * RING_DESCRIPTOR_SIZE` bytes immediately after the header.
        unsafe {
            let table = self.ptr.add(HEADER_SIZE).cast::<RingDescriptor>();
            &*table.add(index as usize)
        }
    }

    /// Raw pointer to the start of slot `slot` in ring `index`'s slot buffer,
    /// i.e. the 4-byte length prefix immediately followed by up to
    /// `msg_size` payload bytes. Always derived from *that ring's own*
    /// `offset` field, never the first ring's (see the original source's
    /// aliasing bug in the design notes).
    #[inline]
    pub(crate) fn slot_ptr(&self, index: u32, slot: u32) -> *mut u8 {
        let header = self.header();
        let data_arena = unsafe {
            self.ptr
                .add(HEADER_SIZE + header.rings as usize * RING_DESCRIPTOR_SIZE)
        };
        let ring = self.ring(index);
        unsafe {
            data_arena
                .add(ring.line1.offset as usize)
                .add(slot as usize * slot_stride(ring.line1.msg_size) as usize)
        }
    }

    pub(crate) fn nodes(&self) -> u32 {
        self.header().nodes
    }

    pub(crate) fn capacity(&self) -> u32 {
        self.header().capacity_mask + 1
    }

    pub(crate) fn msg_size(&self) -> u32 {
        self.header().msg_size
    }
}

impl Drop for Region {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.ptr.cast(), self.len);
        }
    }
}

fn map(file: &File, len: usize) -> Result<*mut u8> {
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_SHARED,
            file.as_raw_fd(),
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(Error::MapFailed(std::io::Error::last_os_error()));
    }
    Ok(ptr.cast())
}
