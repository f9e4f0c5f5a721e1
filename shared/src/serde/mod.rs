//! Byte-level serialization for the update stream.
//!
//! Everything that crosses the wire implements [`WireSerde`]. The encoding is
//! deliberately plain: fixed-width little-endian numerics, u16-length-prefixed
//! strings and blobs, one discriminator byte per closed enum. Decoding never
//! panics; a malformed buffer surfaces as a [`WireError`] and the caller
//! abandons the whole batch.

mod error;
mod reader;
mod writer;

pub use error::WireError;
pub use reader::ByteReader;
pub use writer::ByteWriter;

/// Symmetric wire encoding: `de(ser(x)) == x` for every implementing type,
/// including the "all optional fields absent" case.
pub trait WireSerde: Sized {
    fn ser(&self, writer: &mut ByteWriter);
    fn de(reader: &mut ByteReader) -> Result<Self, WireError>;

    /// Convenience: encode into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        self.ser(&mut writer);
        writer.to_bytes()
    }
}
