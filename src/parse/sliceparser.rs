use super::error::{BufferError, ParseResult};
use super::Parser;

/// Parser over a borrowed byte-slice, which avoids copying its input.
#[derive(Debug, Clone, Copy)]
pub struct SliceParser<'a> {
    rest: &'a [u8],
    offset: usize,
}

impl<'a> SliceParser<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            rest: bytes,
            offset: 0,
        }
    }

    /// Returns the unconsumed tail of the input.
    #[must_use]
    pub const fn rest(&self) -> &'a [u8] {
        self.rest
    }

    fn split(&mut self, nbytes: usize) -> ParseResult<&'a [u8]> {
        if nbytes > self.rest.len() {
            return Err(BufferError::ConsumeWouldExceedLimit {
                offset: self.offset,
                requested: nbytes,
                limit: self.offset + self.rest.len(),
            }
            .into());
        }
        let (head, tail) = self.rest.split_at(nbytes);
        self.rest = tail;
        self.offset += nbytes;
        Ok(head)
    }
}

impl<'a> Parser for SliceParser<'a> {
    type Buffer = &'a [u8];

    fn from_buffer(buf: Self::Buffer) -> Self {
        Self::new(buf)
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn remainder(&self) -> Option<usize> {
        Some(self.rest.len())
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        Ok(self.split(1)?[0])
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        self.split(nbytes)
    }
}
