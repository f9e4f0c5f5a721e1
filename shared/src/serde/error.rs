use thiserror::Error;

/// Errors that can occur while encoding or decoding the binary update stream.
///
/// Every variant is fatal for the decode call that produced it: the reader
/// position is unspecified afterwards, so the caller must abandon the whole
/// buffer rather than resume mid-stream. The connection layer decides whether
/// a failed batch warrants a disconnect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The buffer ended in the middle of a record.
    #[error("unexpected end of buffer: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A record discriminator byte outside the known set.
    #[error("invalid record discriminator: {value}")]
    InvalidDiscriminator { value: u8 },

    /// A tile type byte outside the closed enum.
    #[error("invalid tile type: {value}")]
    InvalidTileType { value: u8 },

    /// An entity kind byte outside the closed enum.
    #[error("invalid entity kind: {value}")]
    InvalidEntityKind { value: u8 },

    /// A triggered-action code outside the closed enum.
    #[error("invalid action code: {value}")]
    InvalidActionCode { value: u8 },

    /// A direction byte outside the eight compass points.
    #[error("invalid direction: {value}")]
    InvalidDirection { value: u8 },

    /// A length-prefixed string was not valid UTF-8.
    #[error("length-prefixed string is not valid UTF-8")]
    BadUtf8,

    /// A length prefix describes more data than the buffer holds.
    #[error("length prefix {length} exceeds remaining buffer ({remaining} bytes)")]
    LengthOverflow { length: usize, remaining: usize },

    /// A tile-data blob declared a cell count that does not match its region.
    #[error("tile data cell count {got} does not match region size {expected}")]
    BadCellCount { got: usize, expected: usize },
}
