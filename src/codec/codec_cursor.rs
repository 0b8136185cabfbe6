use crate::codec::{Bounds, DecodeError, EncodeError};
use crate::constants::{LENGTH_PREFIX_SIZE, NULL_LENGTH_PREFIX};

/// Bounds-checked writer over a buffer allocated to the exact encoded size.
///
/// Every write is checked against the remaining capacity, so a codec that
/// under-reports its size fails with `EncodeError::Overflow` instead of
/// corrupting memory.
pub struct WriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WriteCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let remaining = self.remaining();
        if bytes.len() > remaining {
            return Err(EncodeError::Overflow {
                needed: bytes.len(),
                remaining,
            });
        }

        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    pub fn put_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.put_bytes(&[byte])
    }

    pub fn put_u16(&mut self, value: u16) -> Result<(), EncodeError> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Writes a small count (arity, argument count) as a `u16`.
    pub fn put_count(&mut self, count: usize) -> Result<(), EncodeError> {
        let count = u16::try_from(count).map_err(|_| EncodeError::LengthOverflow(count))?;
        self.put_u16(count)
    }

    /// Writes an `i32` length prefix, or the null sentinel for `None`.
    pub fn put_length(&mut self, length: Option<usize>) -> Result<(), EncodeError> {
        let prefix = match length {
            Some(len) => i32::try_from(len).map_err(|_| EncodeError::LengthOverflow(len))?,
            None => NULL_LENGTH_PREFIX,
        };
        self.put_bytes(&prefix.to_le_bytes())
    }

    /// Writes a length-prefixed byte run, or the null sentinel for `None`.
    pub fn put_blob(&mut self, bytes: Option<&[u8]>) -> Result<(), EncodeError> {
        self.put_length(bytes.map(<[u8]>::len))?;
        match bytes {
            Some(bytes) => self.put_bytes(bytes),
            None => Ok(()),
        }
    }
}

/// Bounds-checked reader that tracks how many payload bytes remain.
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Starts reading `buf` at `offset`.
    pub fn at(buf: &'a [u8], offset: usize) -> Result<Self, DecodeError> {
        if offset > buf.len() {
            return Err(DecodeError::OffsetOutOfRange {
                offset,
                len: buf.len(),
            });
        }

        Ok(Self { buf, pos: offset })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Fails with `TrailingBytes` unless every byte has been consumed.
    pub fn ensure_exhausted(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            left => Err(DecodeError::TrailingBytes(left)),
        }
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::Truncated {
                needed: len,
                remaining,
            });
        }

        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    /// Reads an `i32` length prefix. `None` is the null sentinel.
    ///
    /// Under `Bounds::Strict` the declared length, multiplied by
    /// `min_element_size`, must fit in the bytes that follow. `Bounds::Relaxed`
    /// skips that up-front check; individual reads stay bounds-checked.
    pub fn read_length(
        &mut self,
        bounds: Bounds,
        min_element_size: usize,
    ) -> Result<Option<usize>, DecodeError> {
        let prefix = i32::from_le_bytes(self.take_array::<LENGTH_PREFIX_SIZE>()?);

        if prefix == NULL_LENGTH_PREFIX {
            return Ok(None);
        }

        let declared = usize::try_from(prefix).map_err(|_| DecodeError::InvalidLength(prefix))?;

        if bounds == Bounds::Strict
            && declared.saturating_mul(min_element_size) > self.remaining()
        {
            return Err(DecodeError::ImplausibleLength {
                declared,
                remaining: self.remaining(),
            });
        }

        Ok(Some(declared))
    }

    /// Reads a length-prefixed byte run. `None` is the null sentinel.
    pub fn read_blob(&mut self, bounds: Bounds) -> Result<Option<&'a [u8]>, DecodeError> {
        match self.read_length(bounds, 1)? {
            Some(len) => Ok(Some(self.take(len)?)),
            None => Ok(None),
        }
    }
}
