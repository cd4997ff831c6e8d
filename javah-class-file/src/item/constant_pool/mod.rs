use std::io::Read;

use crate::{error::{self, ClassFileError}, stream::ClassFileStream};

pub use self::entry::{decode_modified_utf8, ConstantPoolEntry, RefKind, Utf8Text};

use super::ClassFileItem;

mod entry;


/// The constant pool. Contains all constant pool entries.
///
/// Entries are stored by slot, so the slot following a `Long` or `Double`
/// holds [`ConstantPoolEntry::Unusable`] and indices map directly onto the
/// class file's 1-based numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPool {
    /// The entries of the constant pool.
    pub entries: Vec<ConstantPoolEntry>,
}

impl ClassFileItem for ConstantPool {
    fn read_from_stream<R: Read>(s: &mut ClassFileStream<R>, cp: Option<&ConstantPool>) -> error::Result<Self>
    where
        Self: Sized,
    {
        let len = s.read_u2()?.saturating_sub(1) as usize;
        let mut entries = Vec::with_capacity(len);
        while entries.len() < len {
            let entry = ConstantPoolEntry::read_from_stream(s, cp)?;
            let wide = entry.is_wide();
            entries.push(entry);
            if wide {
                entries.push(ConstantPoolEntry::Unusable);
            }
        }
        // A wide entry in the last slot spills one past the declared count.
        entries.truncate(len);
        Ok(Self { entries })
    }
}

impl ConstantPool {
    /// Get a constant from the pool. Entries are based on 1.
    pub fn get_constant(&self, index: u16) -> error::Result<&ConstantPoolEntry> {
        let entry = (index as usize)
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .ok_or(ClassFileError::BadConstantPoolIndex(index))?;
        if let ConstantPoolEntry::Unusable = entry {
            return Err(ClassFileError::BadConstantPoolIndex(index));
        }
        Ok(entry)
    }

    /// Get the raw text of a `Utf8` constant.
    pub fn get_utf8_text(&self, index: u16) -> error::Result<&Utf8Text> {
        match self.get_constant(index)? {
            ConstantPoolEntry::Utf8 { data } => Ok(data),
            _ => Err(ClassFileError::UnexpectedConstant { index, expected: "Utf8" }),
        }
    }

    /// Get a `Utf8` constant as a string. Fails for text with unpaired
    /// surrogates, which never occur in names and descriptors.
    pub fn get_utf8_constant(&self, index: u16) -> error::Result<&str> {
        self.get_utf8_text(index)?
            .as_str()
            .ok_or(ClassFileError::UnpairedSurrogate(index))
    }

    /// Get the internal-form name of a `Class` constant.
    pub fn get_class_name(&self, index: u16) -> error::Result<&str> {
        match self.get_constant(index)? {
            ConstantPoolEntry::Class { name_index } => self.get_utf8_constant(*name_index),
            _ => Err(ClassFileError::UnexpectedConstant { index, expected: "Class" }),
        }
    }

    /// Number of slots in the pool, including unusable ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{ConstantPool, ConstantPoolEntry};
    use crate::{error::ClassFileError, item::ClassFileItem, stream::ClassFileStream};

    fn pool(bytes: &[u8]) -> ConstantPool {
        let mut cursor = Cursor::new(bytes.to_vec());
        ConstantPool::read_from_stream(&mut ClassFileStream::new(&mut cursor), None).unwrap()
    }

    #[test]
    fn long_constants_take_two_slots() {
        // count = 4: Long (slots 1-2), Utf8 "A" (slot 3)
        let p = pool(&[
            0x00, 0x04,
            5, 0, 0, 0, 0, 0, 0, 0, 42,
            1, 0x00, 0x01, b'A',
        ]);
        assert_eq!(p.len(), 3);
        assert_eq!(p.get_constant(1).unwrap(), &ConstantPoolEntry::Long { bytes: 42 });
        assert!(matches!(p.get_constant(2), Err(ClassFileError::BadConstantPoolIndex(2))));
        assert_eq!(p.get_utf8_constant(3).unwrap(), "A");
    }

    #[test]
    fn lookups_check_index_and_type() {
        // count = 3: Utf8 "Foo" (1), Class -> 1 (2)
        let p = pool(&[0x00, 0x03, 1, 0x00, 0x03, b'F', b'o', b'o', 7, 0x00, 0x01]);
        assert_eq!(p.get_class_name(2).unwrap(), "Foo");
        assert!(matches!(p.get_constant(0), Err(ClassFileError::BadConstantPoolIndex(0))));
        assert!(matches!(p.get_constant(3), Err(ClassFileError::BadConstantPoolIndex(3))));
        assert!(matches!(
            p.get_class_name(1),
            Err(ClassFileError::UnexpectedConstant { index: 1, expected: "Class" })
        ));
        assert!(matches!(
            p.get_utf8_constant(2),
            Err(ClassFileError::UnexpectedConstant { index: 2, expected: "Utf8" })
        ));
    }

    #[test]
    fn unpaired_surrogates_fail_only_as_names() {
        // count = 3: Utf8 "\uD800" (1), String -> 1 (2)
        let p = pool(&[0x00, 0x03, 1, 0x00, 0x03, 0xed, 0xa0, 0x80, 8, 0x00, 0x01]);
        assert_eq!(p.get_utf8_text(1).unwrap().units(), &[0xd800]);
        assert!(matches!(p.get_utf8_constant(1), Err(ClassFileError::UnpairedSurrogate(1))));
        assert_eq!(p.get_constant(2).unwrap(), &ConstantPoolEntry::String { string_index: 1 });
    }
}
