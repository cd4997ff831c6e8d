use std::io::Read;

use crate::{error, item::{ClassFileItem, ConstantPool}};

/// A utility wrapper to allow easily reading class file types from a [Reader](std::io::Read).
///
/// The second field counts the bytes consumed so far.
pub struct ClassFileStream<'a, R: Read>(pub &'a mut R, pub usize);

impl<'a, R: Read> ClassFileStream<'a, R> {

    /// Create a new stream from a reader.
    pub fn new(r: &'a mut R) -> Self {
        Self(r, 0)
    }

    /// Number of bytes read from this stream so far.
    pub fn position(&self) -> usize {
        self.1
    }

    /// Read a sequence of `length` `T`s from this stream.
    pub fn read_sequence<T: ClassFileItem>(&mut self, constant_pool: Option<&ConstantPool>, length: usize) -> error::Result<Vec<T>> {
        // Lengths come straight from untrusted input, so cap the preallocation.
        let mut v = Vec::with_capacity(length.min(1024));
        for _ in 0..length {
            v.push(T::read_from_stream(self, constant_pool)?);
        }
        Ok(v)
    }

    /// Read an unsigned 4-byte integer from the stream.
    pub fn read_u4(&mut self) -> error::Result<u32> {
        Ok(u32::from_be_bytes(self.read::<4>()?))
    }

    /// Read an unsigned 2-byte integer from the stream.
    pub fn read_u2(&mut self) -> error::Result<u16> {
        Ok(u16::from_be_bytes(self.read::<2>()?))
    }

    /// Read an unsigned byte from the stream.
    pub fn read_u1(&mut self) -> error::Result<u8> {
        Ok(self.read::<1>()?[0])
    }

    /// Utility method to read `S` bytes from the stream.
    pub fn read<const S: usize>(&mut self) -> error::Result<[u8; S]> {
        let mut w = [0; S];
        self.0.read_exact(&mut w)?;
        self.1 += S;
        Ok(w)
    }

    /// Utility method to read `l` bytes from the stream with runtime length.
    pub fn read_dynamic(&mut self, l: usize) -> error::Result<Vec<u8>> {
        let mut w = Vec::new();
        let read = (&mut *self.0).take(l as u64).read_to_end(&mut w)?;
        if read != l {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        self.1 += l;
        Ok(w)
    }

}

impl ClassFileItem for u8 {
    fn read_from_stream<R: Read>(s: &mut ClassFileStream<R>, _cp: Option<&ConstantPool>) -> error::Result<Self>
    where
        Self: std::marker::Sized {
        s.read_u1()
    }
}

impl ClassFileItem for u16 {
    fn read_from_stream<R: Read>(s: &mut ClassFileStream<R>, _cp: Option<&ConstantPool>) -> error::Result<Self>
    where
        Self: std::marker::Sized {
        s.read_u2()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::ClassFileStream;
    use crate::error::ClassFileError;

    #[test]
    fn reads_big_endian_values() {
        let mut data = Cursor::new(vec![0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34, 0x07]);
        let mut s = ClassFileStream::new(&mut data);
        assert_eq!(s.read_u4().unwrap(), 0xCAFEBABE);
        assert_eq!(s.read_u2().unwrap(), 52);
        assert_eq!(s.read_u1().unwrap(), 7);
        assert_eq!(s.position(), 7);
    }

    #[test]
    fn truncated_dynamic_read_is_an_error() {
        let mut data = Cursor::new(vec![1, 2, 3]);
        let mut s = ClassFileStream::new(&mut data);
        assert!(matches!(s.read_dynamic(8), Err(ClassFileError::IoError(_))));
    }
}
