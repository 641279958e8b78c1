//! Growable byte buffer used on both sides of a conversion stream.
//!
//! Raw input is appended at the back and consumed from the front as the
//! converter accepts it; converted output is appended through a scoped
//! spare-capacity writer so the converter sees a plain `&mut [u8]`.

/// A contiguous, growable byte queue.
///
/// Backed by a `Vec<u8>`; `consume` removes bytes from the front, which is
/// how a streaming converter acknowledges the input it has accepted while
/// leaving a trailing partial sequence in place for the next chunk.
#[derive(Debug, Clone, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
}

impl ByteBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Spare capacity available without reallocating.
    pub fn avail(&self) -> usize {
        self.data.capacity() - self.data.len()
    }

    /// Ensures at least `additional` bytes of spare capacity.
    pub fn grow(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    /// Appends `bytes` at the back.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Removes `count` bytes from the front.
    ///
    /// # Panics
    ///
    /// Panics if `count` exceeds [`len`](Self::len).
    pub fn consume(&mut self, count: usize) {
        self.data.drain(..count);
    }

    /// The held bytes, front to back.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning the held bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Exposes up to `max` bytes of zeroed space at the back to `f`, then
    /// keeps exactly the prefix `f` reports as written.
    ///
    /// `f` returns `(written, value)`; `value` is passed through so callers
    /// can thread a conversion outcome out of the closure.
    pub fn append_with<T>(&mut self, max: usize, f: impl FnOnce(&mut [u8]) -> (usize, T)) -> T {
        let start = self.data.len();
        self.data.resize(start + max, 0);
        let (written, value) = f(&mut self.data[start..]);
        debug_assert!(written <= max);
        self.data.truncate(start + written);
        value
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_consume_from_front() {
        let mut buf = ByteBuffer::new();
        buf.push_bytes(b"hello world");
        buf.consume(6);
        assert_eq!(buf.data(), b"world");
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn grow_reserves_spare_capacity() {
        let mut buf = ByteBuffer::from(&b"abc"[..]);
        buf.grow(4096);
        assert!(buf.avail() >= 4096);
        assert_eq!(buf.data(), b"abc");
    }

    #[test]
    fn append_with_keeps_written_prefix() {
        let mut buf = ByteBuffer::from(&b"xy"[..]);
        let n = buf.append_with(8, |dst| {
            dst[0] = b'z';
            dst[1] = b'w';
            (2, 2usize)
        });
        assert_eq!(n, 2);
        assert_eq!(buf.data(), b"xyzw");
    }

    #[test]
    fn append_with_zero_written() {
        let mut buf = ByteBuffer::from(&b"ab"[..]);
        buf.append_with(16, |_| (0, ()));
        assert_eq!(buf.data(), b"ab");
    }
}
