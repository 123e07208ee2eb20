//! The SPSC transport protocol: enqueue on the producer side of a ring,
//! dequeue on the consumer side. Pure functions over a [`Region`] and a ring
//! index — no state here outlives a single call except the caller-owned
//! cached cursor, which exists purely to avoid an `Acquire` load on every
//! operation when the ring is comfortably non-full/non-empty (see
//! `reserve()`/`readable()`'s fast path in the teacher crate's `ring.rs`).

use std::sync::atomic::Ordering;

use crate::error::{Error, Result};
use crate::layout::LENGTH_PREFIX_SIZE;
use crate::region::Region;

/// Attempts to enqueue `payload` into ring `index`. Non-blocking: returns
/// [`Error::Full`] immediately if there is no free slot, and
/// [`Error::MessageTooLarge`] before touching the ring if `payload` exceeds
/// the ring's fixed `msg_size`.
///
/// `cached_head` is the producer's last-observed `head`, used to avoid an
/// `Acquire` load when the cache already proves there is space; it is
/// updated in place whenever a fresh `Acquire` load is taken.
pub(crate) fn try_enqueue(
    region: &Region,
    index: u32,
    payload: &[u8],
    cached_head: &mut u32,
) -> Result<()> {
    let ring = region.ring(index);
    let msg_size = ring.line1.msg_size;
    if payload.len() > msg_size as usize {
        return Err(Error::MessageTooLarge {
            len: payload.len(),
            msg_size,
        });
    }

    let mask = ring.line1.capacity_mask;
    // Only this producer writes `tail`; Relaxed is sufficient.
    let tail = ring.tail().load(Ordering::Relaxed);
    let next_tail = tail.wrapping_add(1) & mask;

    if next_tail == *cached_head {
        // Cache says full; take the slow path and refresh from the real head.
        let head = ring.head().load(Ordering::Acquire);
        *cached_head = head;
        if next_tail == head {
            return Err(Error::Full);
        }
    }

    // SAFETY: `tail` identifies a slot not currently readable by the
    // consumer (the consumer only reads slots in `[head, tail)`), and only
    // this producer writes to it. The slot holds a 4-byte little-endian
    // length prefix followed by up to `msg_size` payload bytes.
    unsafe {
        let dst = region.slot_ptr(index, tail);
        std::ptr::copy_nonoverlapping(
            (payload.len() as u32).to_le_bytes().as_ptr(),
            dst,
            LENGTH_PREFIX_SIZE as usize,
        );
        if !payload.is_empty() {
            std::ptr::copy_nonoverlapping(
                payload.as_ptr(),
                dst.add(LENGTH_PREFIX_SIZE as usize),
                payload.len(),
            );
        }
    }

    // Release: publishes the payload store to any thread that subsequently
    // observes the new `tail`.
    ring.tail().store(next_tail, Ordering::Release);
    Ok(())
}

/// Blocking enqueue: spins with adaptive backoff until a slot frees up.
pub(crate) fn enqueue(region: &Region, index: u32, payload: &[u8], cached_head: &mut u32) -> Result<()> {
    let mut backoff = crate::backoff::Backoff::new();
    loop {
        match try_enqueue(region, index, payload, cached_head) {
            Err(Error::Full) => backoff.snooze(),
            other => return other,
        }
    }
}

/// Attempts to dequeue from ring `index` into `buf`. Non-blocking: returns
/// [`Error::Empty`] immediately if the ring has nothing to read. On success,
/// returns the number of bytes written into `buf`, which is the lesser of
/// `buf.len()` and the length actually given to the matching `try_enqueue`
/// call — not `msg_size`, which only bounds the maximum.
///
/// `cached_tail` is the consumer's last-observed `tail`, refreshed only when
/// the cache says the ring might be empty.
pub(crate) fn try_dequeue(
    region: &Region,
    index: u32,
    buf: &mut [u8],
    cached_tail: &mut u32,
) -> Result<usize> {
    let ring = region.ring(index);
    let mask = ring.line1.capacity_mask;

    // Only this consumer writes `head`; Relaxed is sufficient.
    let head = ring.head().load(Ordering::Relaxed);

    if head == *cached_tail {
        // Cache says empty; take the slow path and refresh from the real tail.
        let tail = ring.tail().load(Ordering::Acquire);
        *cached_tail = tail;
        if head == tail {
            return Err(Error::Empty);
        }
    }

    // SAFETY: `head` identifies a slot published by the producer's Release
    // store to `tail` (established above, directly or via the cache), and
    // only this consumer reads it until `head` advances. The slot holds a
    // 4-byte little-endian length prefix followed by its payload bytes.
    let len = unsafe {
        let src = region.slot_ptr(index, head);
        let mut prefix = [0u8; 4];
        std::ptr::copy_nonoverlapping(src, prefix.as_mut_ptr(), LENGTH_PREFIX_SIZE as usize);
        let stored_len = u32::from_le_bytes(prefix) as usize;
        let len = stored_len.min(buf.len());
        if len > 0 {
            std::ptr::copy_nonoverlapping(src.add(LENGTH_PREFIX_SIZE as usize), buf.as_mut_ptr(), len);
        }
        len
    };

    let next_head = head.wrapping_add(1) & mask;
    // Release: orders the payload read before the head advance becomes
    // visible to the producer.
    ring.head().store(next_head, Ordering::Release);
    Ok(len)
}

/// Blocking dequeue: spins with adaptive backoff until a message arrives.
pub(crate) fn dequeue(
    region: &Region,
    index: u32,
    buf: &mut [u8],
    cached_tail: &mut u32,
) -> Result<usize> {
    let mut backoff = crate::backoff::Backoff::new();
    loop {
        match try_dequeue(region, index, buf, cached_tail) {
            Err(Error::Empty) => backoff.snooze(),
            other => return other,
        }
    }
}
