use std::io::Read;

use crate::{
    error::{self, ClassFileError},
    stream::ClassFileStream,
};

use super::{attribute_info::AttributesCollection, ClassFileItem, ConstantPool};

/// Method info.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInfo {
    /// Mask of flags used to denote access permission to and properties of
    /// this method.
    pub access_flags: MethodAccessFlags,
    /// Index of a `Utf8` constant holding the method's unqualified name,
    /// or one of the special names `<init>` and `<clinit>`.
    pub name_index: u16,
    /// Index of a `Utf8` constant holding the method descriptor.
    pub descriptor_index: u16,
    /// Method attributes. Native methods carry no `Code` attribute.
    pub attributes: AttributesCollection,
}

impl MethodInfo {
    pub fn is_native(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::ACC_NATIVE)
    }

    pub fn is_static(&self) -> bool {
        self.access_flags.contains(MethodAccessFlags::ACC_STATIC)
    }
}

impl ClassFileItem for MethodInfo {
    fn read_from_stream<R: Read>(
        s: &mut ClassFileStream<R>,
        cp: Option<&ConstantPool>,
    ) -> error::Result<Self>
    where
        Self: Sized,
    {
        let flags = s.read_u2()?;
        let access_flags =
            MethodAccessFlags::from_bits(flags).ok_or(ClassFileError::BadMethodAccessFlags(flags))?;

        let name_index = s.read_u2()?;

        let descriptor_index = s.read_u2()?;

        Ok(Self {
            access_flags,
            name_index,
            descriptor_index,
            attributes: AttributesCollection::read_from_stream(s, cp)?,
        })
    }
}

bitflags::bitflags! {
    pub struct MethodAccessFlags: u16 {
        /// Declared public; may be accessed from outside its package.
        const ACC_PUBLIC = 0x0001;
        /// Declared private; accessible only within the defining class.
        const ACC_PRIVATE = 0x0002;
        /// Declared protected; may be accessed within subclasses.
        const ACC_PROTECTED = 0x0004;
        /// Declared static.
        const ACC_STATIC = 0x0008;
        /// Declared final; must not be overridden.
        const ACC_FINAL = 0x0010;
        /// Declared synchronized; invocation is wrapped by a monitor use.
        const ACC_SYNCHRONIZED = 0x0020;
        /// A bridge method, generated by the compiler.
        const ACC_BRIDGE = 0x0040;
        /// Declared with variable number of arguments.
        const ACC_VARARGS = 0x0080;
        /// Declared native; implemented in a language other than Java.
        const ACC_NATIVE = 0x0100;
        /// Declared abstract; no implementation is provided.
        const ACC_ABSTRACT = 0x0400;
        /// Declared strictfp; floating-point mode is FP-strict.
        const ACC_STRICT = 0x0800;
        /// Declared synthetic; not present in the source code.
        const ACC_SYNTHETIC = 0x1000;
    }
}
