//! Parcel reading and writing.
//!
//! Every message exchanged with the modem is a flat sequence of fields with
//! no padding and no self-description:
//!
//! ```text
//! int32   : 4 bytes, little-endian
//! string  : int32 byte length (-1 = null) + UTF-8 bytes
//! bytes   : int32 length (-1 = null) + raw bytes
//! ```
//!
//! [`WireCursor`] reads fields in declared order and can checkpoint and
//! rewind its position, which is how a dispatch layer peeks at a header
//! and then hands the untouched buffer on. [`ParcelWriter`] is the inverse
//! and is used to encode outgoing requests.

use bytes::{BufMut, BytesMut};

use crate::error::{ProtocolError, ProtocolResult};

/// Size of an encoded integer.
pub const INT_SIZE: usize = 4;

/// Length prefix marking an absent string or byte array.
const NULL_LENGTH: i32 = -1;

/// A saved read position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Checkpoint(usize);

impl Checkpoint {
    /// Byte offset this checkpoint refers to.
    pub fn offset(&self) -> usize {
        self.0
    }
}

/// Sequential reader over a response buffer.
#[derive(Debug, Clone)]
pub struct WireCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireCursor<'a> {
    /// Open a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        WireCursor { data, pos: 0 }
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether any unread bytes remain.
    pub fn has_remaining(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Save the current read position.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    /// Rewind (or advance) to a saved position.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.pos = checkpoint.0.min(self.data.len());
    }

    /// The whole underlying buffer, independent of the read position.
    pub fn buffer(&self) -> &'a [u8] {
        self.data
    }

    /// The unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn take(&mut self, n: usize) -> ProtocolResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(ProtocolError::Underrun {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a 32-bit signed integer.
    pub fn read_i32(&mut self) -> ProtocolResult<i32> {
        let b = self.take(INT_SIZE)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read an integer and treat any non-zero value as `true`.
    pub fn read_bool(&mut self) -> ProtocolResult<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Read an element count.
    ///
    /// Fails if the count is negative or if `count * min_element_size`
    /// bytes cannot possibly remain, so callers can size allocations from
    /// the result without trusting the wire.
    pub fn read_count(&mut self, min_element_size: usize) -> ProtocolResult<usize> {
        let offset = self.pos;
        let count = self.read_i32()?;
        if count < 0 {
            return Err(ProtocolError::InvalidLength {
                offset,
                length: count,
            });
        }
        let needed = (count as usize).saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(ProtocolError::InvalidLength {
                offset,
                length: count,
            });
        }
        Ok(count as usize)
    }

    /// Read a length prefix, returning `None` for the null marker.
    fn read_length(&mut self) -> ProtocolResult<Option<usize>> {
        let offset = self.pos;
        match self.read_i32()? {
            NULL_LENGTH => Ok(None),
            len if len < 0 => Err(ProtocolError::InvalidLength {
                offset,
                length: len,
            }),
            len => Ok(Some(len as usize)),
        }
    }

    /// Read a length-prefixed UTF-8 string. `None` is the null string.
    pub fn read_string(&mut self) -> ProtocolResult<Option<String>> {
        let Some(len) = self.read_length()? else {
            return Ok(None);
        };
        let offset = self.pos;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(|s| Some(s.to_owned()))
            .map_err(|_| ProtocolError::InvalidUtf8 { offset })
    }

    /// Read a length-prefixed byte blob. `None` is the null blob.
    pub fn read_byte_array(&mut self) -> ProtocolResult<Option<Vec<u8>>> {
        let Some(len) = self.read_length()? else {
            return Ok(None);
        };
        Ok(Some(self.take(len)?.to_vec()))
    }

    /// Consume `n` integers whose values are not needed.
    pub fn skip_ints(&mut self, n: usize) -> ProtocolResult<()> {
        self.take(n.saturating_mul(INT_SIZE))?;
        Ok(())
    }

    /// Consume a string whose value is not needed.
    pub fn skip_string(&mut self) -> ProtocolResult<()> {
        if let Some(len) = self.read_length()? {
            self.take(len)?;
        }
        Ok(())
    }
}

/// Builder for outgoing parcels.
#[derive(Debug, Default, Clone)]
pub struct ParcelWriter {
    buffer: BytesMut,
}

impl ParcelWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        ParcelWriter {
            buffer: BytesMut::with_capacity(64),
        }
    }

    /// Append a 32-bit signed integer.
    pub fn write_i32(&mut self, value: i32) -> &mut Self {
        self.buffer.put_i32_le(value);
        self
    }

    /// Append a boolean as `0` / `1`.
    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_i32(i32::from(value))
    }

    /// Append an optional string; `None` writes the null marker.
    pub fn write_string(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(s) => {
                self.buffer.put_i32_le(s.len() as i32);
                self.buffer.extend_from_slice(s.as_bytes());
            }
            None => self.buffer.put_i32_le(NULL_LENGTH),
        }
        self
    }

    /// Append a present string.
    pub fn write_str(&mut self, value: &str) -> &mut Self {
        self.write_string(Some(value))
    }

    /// Append an optional byte blob; `None` writes the null marker.
    pub fn write_byte_array(&mut self, value: Option<&[u8]>) -> &mut Self {
        match value {
            Some(b) => {
                self.buffer.put_i32_le(b.len() as i32);
                self.buffer.extend_from_slice(b);
            }
            None => self.buffer.put_i32_le(NULL_LENGTH),
        }
        self
    }

    /// Append a count-prefixed integer vector.
    pub fn write_ints(&mut self, values: &[i32]) -> &mut Self {
        self.write_i32(values.len() as i32);
        for &v in values {
            self.write_i32(v);
        }
        self
    }

    /// Append a count-prefixed string vector.
    pub fn write_strings<S: AsRef<str>>(&mut self, values: &[Option<S>]) -> &mut Self {
        self.write_i32(values.len() as i32);
        for v in values {
            self.write_string(v.as_ref().map(|s| s.as_ref()));
        }
        self
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Borrow the encoded bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the encoded bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.buffer.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_fields_in_order() {
        let mut w = ParcelWriter::new();
        w.write_i32(-7)
            .write_str("hello")
            .write_string(None)
            .write_byte_array(Some(&[1, 2, 3]))
            .write_bool(true);
        let data = w.into_vec();

        let mut c = WireCursor::new(&data);
        assert_eq!(c.read_i32().unwrap(), -7);
        assert_eq!(c.read_string().unwrap().as_deref(), Some("hello"));
        assert_eq!(c.read_string().unwrap(), None);
        assert_eq!(c.read_byte_array().unwrap(), Some(vec![1, 2, 3]));
        assert!(c.read_bool().unwrap());
        assert!(!c.has_remaining());
    }

    #[test]
    fn test_checkpoint_restore() {
        let mut w = ParcelWriter::new();
        w.write_i32(1).write_i32(2);
        let data = w.into_vec();

        let mut c = WireCursor::new(&data);
        let cp = c.checkpoint();
        assert_eq!(c.read_i32().unwrap(), 1);
        assert_eq!(c.position(), 4);
        c.restore(cp);
        assert_eq!(c.position(), 0);
        assert_eq!(c.read_i32().unwrap(), 1);
        assert_eq!(c.read_i32().unwrap(), 2);
    }

    #[test]
    fn test_underrun_reports_offset() {
        let data = [1u8, 0, 0];
        let mut c = WireCursor::new(&data);
        assert_eq!(
            c.read_i32(),
            Err(ProtocolError::Underrun {
                offset: 0,
                needed: 4,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_string_longer_than_buffer() {
        let mut w = ParcelWriter::new();
        w.write_i32(100);
        let data = w.into_vec();
        let mut c = WireCursor::new(&data);
        assert!(matches!(
            c.read_string(),
            Err(ProtocolError::Underrun { needed: 100, .. })
        ));
    }

    #[test]
    fn test_negative_length_rejected() {
        let mut w = ParcelWriter::new();
        w.write_i32(-5);
        let data = w.into_vec();
        let mut c = WireCursor::new(&data);
        assert_eq!(
            c.read_byte_array(),
            Err(ProtocolError::InvalidLength {
                offset: 0,
                length: -5
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let mut w = ParcelWriter::new();
        w.write_byte_array(Some(&[0xff, 0xfe]));
        let data = w.into_vec();
        let mut c = WireCursor::new(&data);
        assert_eq!(c.read_string(), Err(ProtocolError::InvalidUtf8 { offset: 4 }));
    }

    #[test]
    fn test_read_count_bounds() {
        let mut w = ParcelWriter::new();
        w.write_i32(3).write_i32(0).write_i32(0);
        let data = w.into_vec();

        // Three ints announced, only two present.
        let mut c = WireCursor::new(&data);
        assert!(matches!(
            c.read_count(INT_SIZE),
            Err(ProtocolError::InvalidLength { length: 3, .. })
        ));

        let mut c = WireCursor::new(&data);
        assert_eq!(c.read_count(0).unwrap(), 3);
    }

    #[test]
    fn test_skip_fields() {
        let mut w = ParcelWriter::new();
        w.write_i32(1)
            .write_i32(2)
            .write_str("skip me")
            .write_string(None)
            .write_i32(42);
        let data = w.into_vec();

        let mut c = WireCursor::new(&data);
        c.skip_ints(2).unwrap();
        c.skip_string().unwrap();
        c.skip_string().unwrap();
        assert_eq!(c.read_i32().unwrap(), 42);
    }
}
