//! On-disk / on-mmap types. These are written directly into the backing
//! file's bytes, so every field must be a fixed-size, natural-aligned POD
//! type and every struct must be `#[repr(C)]` — no Rust-layout-dependent
//! types are allowed to cross the process boundary.

use std::sync::atomic::AtomicU32;

/// Process-wide header, one per backing region.
///
/// Written once at `create()` time; every other field access by an
/// attaching process is read-only.
///
/// Padded to a full 128-byte line so that `HEADER_SIZE` is itself a multiple
/// of the `RingDescriptor` alignment. `mmap` hands back a page-aligned (and
/// therefore 128-aligned) base address, so the ring table that immediately
/// follows the header — at byte offset `HEADER_SIZE` — only lands on a
/// `RingDescriptor`-aligned address if `HEADER_SIZE` itself is a multiple of
/// 128; without this padding every `&*table.add(index)` in `region.rs` forms
/// a reference to an under-aligned `RingDescriptor`, which is undefined
/// behavior regardless of whether the bytes happen to be readable.
#[repr(C, align(128))]
pub(crate) struct Header {
    pub(crate) nodes: u32,
    pub(crate) rings: u32,
    pub(crate) capacity_mask: u32,
    pub(crate) msg_size: u32,
    _pad: [u8; 112],
}

/// First cache line of a [`RingDescriptor`]: the immutable, write-once
/// fields plus the consumer-owned `head`.
///
/// 128-byte alignment (not merely 64) matches the teacher crate's own
/// `CacheAligned<T>` convention in `ring.rs`, chosen there to defeat
/// prefetcher-induced false sharing between adjacent hot words on
/// Intel/AMD cores that prefetch adjacent cache lines.
#[repr(C, align(128))]
pub(crate) struct RingLine1 {
    pub(crate) capacity_mask: u32,
    pub(crate) msg_size: u32,
    pub(crate) offset: u32,
    /// Index of the next slot to be read. R/W by the consumer, read-only
    /// to the producer.
    pub(crate) head: AtomicU32,
    _pad: [u8; 112],
}

/// Second cache line of a [`RingDescriptor`]: the producer-owned `tail`,
/// isolated onto its own cache line so producer and consumer writes never
/// share a line.
#[repr(C, align(128))]
pub(crate) struct RingLine2 {
    /// Index of the next slot to be written. R/W by the producer,
    /// read-only to the consumer.
    pub(crate) tail: AtomicU32,
    _pad: [u8; 124],
}

/// One directed SPSC ring's descriptor: immutable metadata plus the
/// atomic `head`/`tail` words, each pinned to its own cache line.
#[repr(C)]
pub(crate) struct RingDescriptor {
    pub(crate) line1: RingLine1,
    pub(crate) line2: RingLine2,
}

impl RingDescriptor {
    #[inline]
    pub(crate) fn head(&self) -> &AtomicU32 {
        &self.line1.head
    }

    #[inline]
    pub(crate) fn tail(&self) -> &AtomicU32 {
        &self.line2.tail
    }
}

pub(crate) const HEADER_SIZE: usize = std::mem::size_of::<Header>();
pub(crate) const RING_DESCRIPTOR_SIZE: usize = std::mem::size_of::<RingDescriptor>();

/// Bytes reserved at the front of every slot for the actual payload length.
///
/// `msg_size` names the maximum *payload* bytes a message may carry; it does
/// not by itself let a receiver distinguish a 0-byte signal from a
/// `msg_size`-byte message, which the spec's zero-length-payload and
/// round-trip properties both require. Each slot therefore stores a
/// little-endian `u32` length ahead of up to `msg_size` payload bytes — see
/// the Open Question resolution in DESIGN.md.
pub(crate) const LENGTH_PREFIX_SIZE: u32 = 4;

/// Total on-disk bytes occupied by one slot: the length prefix plus the
/// slot's payload capacity.
#[inline]
pub(crate) const fn slot_stride(msg_size: u32) -> u32 {
    msg_size + LENGTH_PREFIX_SIZE
}

/// Total size, in bytes, of the backing file for the given parameters.
///
/// Layout: `header | ring[0..rings] | data arena (rings * capacity * slot_stride(msg_size) bytes)`.
pub(crate) fn region_size(rings: u32, capacity: u32, msg_size: u32) -> usize {
    HEADER_SIZE
        + rings as usize * RING_DESCRIPTOR_SIZE
        + rings as usize * capacity as usize * slot_stride(msg_size) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_ring_fields_are_naturally_aligned() {
        assert_eq!(std::mem::align_of::<Header>(), 128);
        assert_eq!(HEADER_SIZE % 4, 0);
    }

    #[test]
    fn header_size_is_a_multiple_of_ring_descriptor_alignment() {
        // The ring table starts at byte offset `HEADER_SIZE` from a
        // page-aligned (hence 128-aligned) mmap base. For every
        // `RingDescriptor` in that table to itself land on a 128-aligned
        // address, `HEADER_SIZE` must be a multiple of 128.
        assert_eq!(HEADER_SIZE % 128, 0);
    }

    #[test]
    fn ring_descriptor_occupies_two_cache_lines() {
        assert_eq!(RING_DESCRIPTOR_SIZE, 256);
        assert_eq!(std::mem::align_of::<RingDescriptor>(), 128);
    }

    #[test]
    fn head_and_tail_land_on_different_cache_lines() {
        let head_offset = std::mem::offset_of!(RingDescriptor, line1)
            + std::mem::offset_of!(RingLine1, head);
        let tail_offset = std::mem::offset_of!(RingDescriptor, line2)
            + std::mem::offset_of!(RingLine2, tail);
        assert_ne!(head_offset / 128, tail_offset / 128);
    }

    /// The compile-time checks above prove the *type's* alignment
    /// requirement; they don't prove a real mapping actually places
    /// descriptors on 128-aligned addresses. Map a `Region` and check the
    /// address of every ring descriptor directly.
    #[test]
    fn mapped_ring_descriptors_are_128_byte_aligned() {
        use crate::config::Config;
        use crate::region::Region;
        use tempfile::NamedTempFile;

        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        drop(tmp);
        let _ = std::fs::remove_file(&path);

        let config = Config::new(4, 16, 8).unwrap();
        let region = Region::create(&path, config).unwrap();

        for i in 0..config.rings() {
            let ring_ptr = region.ring(i) as *const RingDescriptor as usize;
            assert_eq!(
                ring_ptr % 128,
                0,
                "ring descriptor {i} is not 128-byte aligned"
            );
        }

        let _ = std::fs::remove_file(&path);
    }
}
