use std::io::Read;

use super::error::{BufferError, ParseResult};
use super::Parser;

/// Parser over a [`Read`] stream.
///
/// Bytes are pulled from the reader only as they are consumed, so a
/// `ReadParser` can decode one value off the front of a stream and leave the
/// rest unread. Large requests are read incrementally rather than allocated
/// up front, so a corrupt length prefix fails with end-of-stream instead of
/// exhausting memory.
#[derive(Debug)]
pub struct ReadParser<R> {
    reader: R,
    scratch: Vec<u8>,
    offset: usize,
}

impl<R: Read> ReadParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            scratch: Vec::new(),
            offset: 0,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Parser for ReadParser<R> {
    type Buffer = R;

    fn from_buffer(buf: Self::Buffer) -> Self {
        Self::new(buf)
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn remainder(&self) -> Option<usize> {
        None
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        let mut byte = [0u8; 1];
        match self.reader.read_exact(&mut byte) {
            Ok(()) => {
                self.offset += 1;
                Ok(byte[0])
            }
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                Err(BufferError::EndOfStream {
                    offset: self.offset,
                    requested: 1,
                }
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        self.scratch.clear();
        let got = (&mut self.reader)
            .take(nbytes as u64)
            .read_to_end(&mut self.scratch)?;
        self.offset += got;
        if got < nbytes {
            return Err(BufferError::EndOfStream {
                offset: self.offset - got,
                requested: nbytes,
            }
            .into());
        }
        Ok(&self.scratch)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::error::ParseError;

    #[test]
    fn reads_incrementally() {
        let data: &[u8] = &[0x01, 0x02, 0x03, 0x04, 0x05];
        let mut p = ReadParser::new(data);
        assert_eq!(p.consume_byte().unwrap(), 0x01);
        assert_eq!(p.take_u16().unwrap(), 0x0302);
        assert_eq!(p.offset(), 3);
        assert_eq!(p.remainder(), None);
        assert_eq!(p.into_inner(), &[0x04, 0x05]);
    }

    #[test]
    fn end_of_stream() {
        let data: &[u8] = &[0x01, 0x02];
        let mut p = ReadParser::new(data);
        match p.consume(usize::MAX >> 1) {
            Err(ParseError::Buffer(BufferError::EndOfStream { offset: 0, .. })) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
