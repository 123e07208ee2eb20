use thiserror::Error;

/// Errors surfaced by [`crate::Context`] and [`crate::Node`].
///
/// Backing-region errors (`Io`, `MapFailed`, `ParameterMismatch`,
/// `AlreadyExists`) are fatal to the call that produced them; the `Context`
/// is left unmodified. Transport errors (`Full`, `Empty`, `MessageTooLarge`,
/// `InvalidRoute`) are reported, never retried internally by non-blocking
/// calls.
#[derive(Debug, Error)]
pub enum Error {
    /// `nodes`, `capacity`, or `msg_size` violated a create/open precondition.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// `open()` was called with parameters that disagree with the header
    /// already written to the backing file.
    #[error(
        "parameter mismatch: caller passed (nodes={caller_nodes}, capacity={caller_capacity}, \
         msg_size={caller_msg_size}), header has (nodes={header_nodes}, \
         capacity={header_capacity}, msg_size={header_msg_size})"
    )]
    ParameterMismatch {
        caller_nodes: u32,
        caller_capacity: u32,
        caller_msg_size: u32,
        header_nodes: u32,
        header_capacity: u32,
        header_msg_size: u32,
    },

    /// A file operation (open, stat, `set_len`) failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `mmap(2)` failed.
    #[error("mmap failed: {0}")]
    MapFailed(std::io::Error),

    /// `create()` was called on a path that already has a file.
    #[error("backing file already exists")]
    AlreadyExists,

    /// `from == to`, or `from`/`to` out of `[0, nodes)`.
    #[error("invalid route: from={from}, to={to}, nodes={nodes}")]
    InvalidRoute { from: u32, to: u32, nodes: u32 },

    /// Payload longer than the ring's fixed `msg_size`.
    #[error("message too large: {len} bytes exceeds msg_size {msg_size}")]
    MessageTooLarge { len: usize, msg_size: u32 },

    /// Non-blocking send on a full ring.
    #[error("ring full")]
    Full,

    /// Non-blocking receive on an empty ring (or, for receive-any, every
    /// incoming ring was empty on that sweep).
    #[error("ring empty")]
    Empty,
}

pub type Result<T> = std::result::Result<T, Error>;
