use crate::error::{Error, Result};

/// Validated create/open parameters for a [`crate::Context`].
///
/// Mirrors the role of the teacher crate's own `Config`: a small `Copy` value
/// that centralizes parameter validation and the capacity/mask arithmetic so
/// every call site (`create`, `open`'s fallback-to-create path) shares one
/// source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub(crate) nodes: u32,
    pub(crate) capacity: u32,
    pub(crate) msg_size: u32,
}

impl Config {
    /// Validates `(nodes, requested_capacity, msg_size)` and rounds
    /// `requested_capacity` up to the next power of two.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `nodes < 2`, `msg_size == 0`,
    /// `requested_capacity < 2` (a requested capacity of 1 rounds up to a
    /// power of two with zero usable slots after the reserved-gap
    /// convention — see `po2(1)` in the design notes — so it is rejected
    /// up front rather than silently producing a ring that is always full),
    /// or `requested_capacity > 2^31` (no power of two above `2^31` is
    /// representable in a `u32`, so `po2` would panic on overflow instead of
    /// reporting an error).
    pub fn new(nodes: u32, requested_capacity: u32, msg_size: u32) -> Result<Self> {
        if nodes < 2 {
            return Err(Error::InvalidParameter("nodes must be >= 2"));
        }
        if msg_size == 0 {
            return Err(Error::InvalidParameter("msg_size must be > 0"));
        }
        if requested_capacity < 2 {
            return Err(Error::InvalidParameter(
                "requested_capacity must be >= 2 (capacity 1 has zero usable slots)",
            ));
        }
        if requested_capacity > (1 << 31) {
            return Err(Error::InvalidParameter(
                "requested_capacity must be <= 2^31 (no larger power of two fits in u32)",
            ));
        }

        let capacity = po2(requested_capacity);

        Ok(Self {
            nodes,
            capacity,
            msg_size,
        })
    }

    /// Number of directed rings: `nodes * (nodes - 1)`.
    #[inline]
    pub(crate) const fn rings(self) -> u32 {
        self.nodes * (self.nodes - 1)
    }

    /// `capacity - 1`, used as a bitwise-AND mask for wrapping indices.
    #[inline]
    pub(crate) const fn capacity_mask(self) -> u32 {
        self.capacity - 1
    }

    pub(crate) fn matches(self, header_nodes: u32, header_capacity: u32, header_msg_size: u32) -> bool {
        self.nodes == header_nodes && self.capacity == header_capacity && self.msg_size == header_msg_size
    }
}

/// Rounds `n` up to the next power of two.
///
/// `po2(1)` would return `1`, giving a ring with zero usable slots under the
/// reserved-gap convention; callers must reject `requested_capacity < 2`
/// before calling this (see [`Config::new`]). `next_power_of_two` also
/// panics on overflow for any `n > 2^31`, since no larger power of two is
/// representable in a `u32`; callers must reject that range too before
/// calling this.
const fn po2(n: u32) -> u32 {
    n.next_power_of_two()
}
