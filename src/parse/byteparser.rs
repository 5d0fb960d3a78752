use super::buffer::VecBuffer;
use super::error::{BufferError, ParseResult};
use super::Parser;

/// Parser over an owned, in-memory byte-buffer.
#[derive(Debug)]
pub struct ByteParser {
    buffer: VecBuffer,
    offset: usize,
}

impl ByteParser {
    /// Returns the unconsumed tail of the buffer without consuming it.
    #[must_use]
    pub fn peek_rest(&self) -> &[u8] {
        &self.buffer.as_slice()[self.offset..]
    }

    fn advance(&mut self, nbytes: usize) -> ParseResult<usize> {
        let limit = self.buffer.len();
        match self.offset.checked_add(nbytes) {
            Some(end) if end <= limit => {
                let ix = self.offset;
                self.offset = end;
                Ok(ix)
            }
            _ => Err(BufferError::ConsumeWouldExceedLimit {
                offset: self.offset,
                requested: nbytes,
                limit,
            }
            .into()),
        }
    }
}

impl Parser for ByteParser {
    type Buffer = VecBuffer;

    fn from_buffer(buffer: Self::Buffer) -> Self {
        Self { buffer, offset: 0 }
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn remainder(&self) -> Option<usize> {
        Some(self.buffer.len() - self.offset)
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        let ix = self.advance(1)?;
        Ok(self.buffer.as_slice()[ix])
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        let ix = self.advance(nbytes)?;
        Ok(&self.buffer.as_slice()[ix..ix + nbytes])
    }
}
