/// A growable byte buffer for outgoing messages.
///
/// The write side mirrors [`crate::ByteReader`] exactly: fixed-width
/// little-endian numerics, u16-length-prefixed blobs and strings.
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(256),
        }
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_i16(&mut self, value: i16) {
        self.write_u16(value as u16);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.write_u32(value as u32);
    }

    pub fn write_f32(&mut self, value: f32) {
        self.write_u32(value.to_bits());
    }

    /// Writes a u16-length-prefixed byte blob.
    ///
    /// Blobs longer than `u16::MAX` never occur in this protocol (the largest
    /// is a region tile blob); the length is truncated rather than asserted.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let length = bytes.len().min(u16::MAX as usize);
        self.write_u16(length as u16);
        self.buffer.extend_from_slice(&bytes[..length]);
    }

    /// Writes a u16-length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ByteReader;

    #[test]
    fn writes_little_endian() {
        let mut writer = ByteWriter::new();
        writer.write_u32(0x0403_0201);
        assert_eq!(writer.to_bytes(), vec![0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn string_round_trip() {
        let mut writer = ByteWriter::new();
        writer.write_string("Cloudy Skies");
        let buffer = writer.to_bytes();

        let mut reader = ByteReader::new(&buffer);
        assert_eq!(reader.read_string().unwrap(), "Cloudy Skies");
        assert!(reader.is_empty());
    }

    #[test]
    fn float_round_trip_is_bit_exact() {
        let mut writer = ByteWriter::new();
        writer.write_f32(10.5);
        writer.write_f32(-0.0);

        let buffer = writer.to_bytes();
        let mut reader = ByteReader::new(&buffer);
        assert_eq!(reader.read_f32().unwrap().to_bits(), 10.5_f32.to_bits());
        assert_eq!(reader.read_f32().unwrap().to_bits(), (-0.0_f32).to_bits());
    }
}
