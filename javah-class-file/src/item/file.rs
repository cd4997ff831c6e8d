use std::io::{Cursor, Read};

use crate::{
    error::{self, ClassFileError},
    stream::ClassFileStream,
};

use super::{fields::FieldInfo, methods::MethodInfo, attribute_info::AttributesCollection};
pub use super::{constant_pool::ConstantPool, ClassFileItem};

/// The magic number of a class file.
pub const CLASS_MAGIC: u32 = 0xCAFEBABE;

bitflags::bitflags! {
    pub struct ClassAccessFlags: u16 {
        /// Declared public; may be accessed from outside its package.
        const ACC_PUBLIC = 0x0001;
        /// Declared final; no subclasses allowed.
        const ACC_FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by the invokespecial instruction.
        const ACC_SUPER = 0x0020;
        /// Is an interface, not a class.
        const ACC_INTERFACE = 0x0200;
        /// Declared abstract; must not be instantiated.
        const ACC_ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code.
        const ACC_SYNTHETIC = 0x1000;
        /// Declared as an annotation type.
        const ACC_ANNOTATION = 0x2000;
        /// Declared as an enum type.
        const ACC_ENUM = 0x4000;
        /// Is a module, not a class or interface.
        const ACC_MODULE = 0x8000;
    }
}

/// A class file.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFile {
    /// The class file's version (major, minor).
    pub version: (u16, u16),
    /// The constant pool.
    pub constant_pool: ConstantPool,
    /// This class's access flags.
    pub access_flags: ClassAccessFlags,
    /// Index of the `Class` constant representing the class or interface
    /// defined by this class file.
    pub this_class: u16,
    /// Index of the `Class` constant of the direct superclass, or zero for
    /// `java/lang/Object`.
    pub super_class: u16,
    /// Indices of `Class` constants for the direct superinterfaces, in
    /// source order.
    pub interfaces: Vec<u16>,
    /// The fields declared by this class or interface. Inherited fields are
    /// not included.
    pub fields: Vec<FieldInfo>,
    /// All methods declared by this class or interface, including
    /// initialization methods, in declaration order. Inherited methods are
    /// not included.
    pub methods: Vec<MethodInfo>,
    /// The class-level attributes.
    pub attributes: AttributesCollection,
}

impl ClassFile {
    /// Decode a class file held in memory.
    pub fn from_bytes(bytes: &[u8]) -> error::Result<Self> {
        let mut cursor = Cursor::new(bytes);
        Self::read_from_stream(&mut ClassFileStream::new(&mut cursor), None)
    }

    /// The internal-form binary name of this class, e.g. `java/lang/Object`.
    pub fn this_class_name(&self) -> error::Result<&str> {
        self.constant_pool.get_class_name(self.this_class)
    }
}

impl ClassFileItem for ClassFile {
    fn read_from_stream<R: Read>(s: &mut ClassFileStream<R>, _cp: Option<&ConstantPool>) -> error::Result<Self>
    where
        Self: Sized,
    {
        // check magic number
        let magic = s.read_u4()?;
        if magic != CLASS_MAGIC {
            return Err(ClassFileError::BadMagicNumber(magic));
        }

        // read file version
        let minor_version = s.read_u2()?;
        let major_version = s.read_u2()?;

        // read constant pool
        let constant_pool = ConstantPool::read_from_stream(s, None)?;

        // read access flags
        let flags = s.read_u2()?;
        let access_flags =
            ClassAccessFlags::from_bits(flags).ok_or(ClassFileError::BadClassAccessFlags(flags))?;

        // read this class & super class
        let this_class = s.read_u2()?;
        let super_class = s.read_u2()?;

        // read interfaces
        let interfaces_count = s.read_u2()?;
        let interfaces = s.read_sequence::<u16>(Some(&constant_pool), interfaces_count as usize)?;

        // read fields
        let fields_count = s.read_u2()?;
        let fields = s.read_sequence(Some(&constant_pool), fields_count as usize)?;

        // read methods
        let methods_count = s.read_u2()?;
        let methods = s.read_sequence(Some(&constant_pool), methods_count as usize)?;

        // read attributes
        let attributes = AttributesCollection::read_from_stream(s, Some(&constant_pool))?;

        Ok(Self {
            version: (major_version, minor_version),
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes
        })
    }
}
