//! Contiguous in-memory builder

use crate::conv::target::Target;

/// Growable byte buffer whose `Debug` output is the hex of its contents,
/// so that encodings can be compared and logged as readable strings.
#[derive(PartialEq, Eq, Clone, Default)]
#[repr(transparent)]
pub struct StrictBuilder(Vec<u8>);

impl std::fmt::Debug for StrictBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::hexstring::util::write_hex!(f, "StrictBuilder:"; &self.0)
    }
}

impl AsRef<[u8]> for StrictBuilder {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<StrictBuilder> for Vec<u8> {
    fn from(b: StrictBuilder) -> Self {
        b.0
    }
}

impl From<Vec<u8>> for StrictBuilder {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl std::io::Write for StrictBuilder {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()
    }
}

impl Target for StrictBuilder {
    fn anticipate(&mut self, extra: usize) {
        self.0.reserve(extra)
    }

    fn create() -> Self {
        Self::default()
    }

    fn push_one(&mut self, b: u8) -> usize {
        self.0.push_one(b)
    }

    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.0.push_many(arr)
    }

    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.0.push_all(buf)
    }
}

impl super::Builder for StrictBuilder {
    type Final = Vec<u8>;

    fn words<const N: usize>(arr: [u8; N]) -> Self {
        arr.to_vec().into()
    }

    fn finalize(self) -> Self::Final {
        self.0
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::builder::Builder;

    #[test]
    fn collects_encodings() {
        use crate::{Encode, Uint};
        let mut b = StrictBuilder::words([0x01]);
        let n = ("ab".to_string(), Uint(300)).write_to(&mut b);
        assert_eq!(n, 5);
        assert_eq!(b.into_hex(), "01026162ac02");
    }

    #[test]
    fn builds_hex() {
        let mut b = StrictBuilder::empty();
        assert!(b.is_empty());
        b.push_many([0xde, 0xad]);
        b.push_all(&[0xbe, 0xef]);
        assert_eq!(b.len(), 4);
        assert_eq!(format!("{:?}", b), "StrictBuilder:deadbeef");
        assert_eq!(b.into_hex(), "deadbeef");
    }
}
