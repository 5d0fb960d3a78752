//! Byte sinks for encoding

/// Append-only byte sink that every encoder writes into.
///
/// `Target` plays the role of [`std::io::Write`] for encoding, except that
/// its `push_*` methods are infallible and total: the `usize` they return
/// is the number of bytes appended, used by callers only to total up the
/// length of what they wrote.
pub trait Target {
    /// Hints that at least `extra` more bytes are about to be appended.
    ///
    /// May be called with partial information, and more than once per value.
    fn anticipate(&mut self, extra: usize);

    /// Returns a fresh, empty sink.
    fn create() -> Self;

    /// Appends a single byte, returning `1`.
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends a fixed-length array, returning `N`.
    ///
    /// Equivalent to calling `push_one` on each byte in order.
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends a byte-slice, returning its length.
    ///
    /// Equivalent to calling `push_one` on each byte in order.
    fn push_all(&mut self, buf: &[u8]) -> usize;

    /// Appends a byte-slice preceded by its length as a varint, which is the
    /// wire form shared by BARE `String` and `Data`.
    #[inline]
    fn push_prefixed(&mut self, buf: &[u8]) -> usize
    where
        Self: Sized,
    {
        self.anticipate(buf.len() + 1);
        crate::varint::write_uint(self, buf.len() as u64) + self.push_all(buf)
    }

    /// Marks the end of a logical unit of pushes.
    ///
    /// Must not alter the byte contents of the sink.
    #[inline(always)]
    fn resolve(&mut self) {}

    /// Calls [`Target::resolve`] and returns `0`, for use as the final
    /// term of a sum of byte-counts.
    #[inline]
    fn resolve_zero(&mut self) -> usize {
        self.resolve();
        0
    }
}

#[macro_export]
macro_rules! resolve_zero {
    ( $buf:expr ) => {{
        $crate::conv::target::Target::resolve($buf);
        0
    }};
}

/// Sink that stores nothing and only counts, used to measure encodings.
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline]
    fn create() -> Self {
        std::io::sink()
    }

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_many<const N: usize>(&mut self, _: [u8; N]) -> usize {
        N
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    #[inline]
    fn create() -> Self {
        Self::new()
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend_from_slice(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}
