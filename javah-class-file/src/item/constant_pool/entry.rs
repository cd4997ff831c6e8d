use std::io::Read;

use crate::{
    error::{self, ClassFileError},
    stream::ClassFileStream,
};

pub use self::refkind::RefKind;

use crate::item::ClassFileItem;

use super::ConstantPool;

/// The tag values for each type of constant pool entry.
#[allow(non_upper_case_globals)]
mod tags {
    pub const CONSTANT_Utf8: u8 = 1;
    pub const CONSTANT_Integer: u8 = 3;
    pub const CONSTANT_Float: u8 = 4;
    pub const CONSTANT_Long: u8 = 5;
    pub const CONSTANT_Double: u8 = 6;
    pub const CONSTANT_Class: u8 = 7;
    pub const CONSTANT_String: u8 = 8;
    pub const CONSTANT_Fieldref: u8 = 9;
    pub const CONSTANT_Methodref: u8 = 10;
    pub const CONSTANT_InterfaceMethodref: u8 = 11;
    pub const CONSTANT_NameAndType: u8 = 12;
    pub const CONSTANT_MethodHandle: u8 = 15;
    pub const CONSTANT_MethodType: u8 = 16;
    pub const CONSTANT_Dynamic: u8 = 17;
    pub const CONSTANT_InvokeDynamic: u8 = 18;
    pub const CONSTANT_Module: u8 = 19;
    pub const CONSTANT_Package: u8 = 20;
}

/// The possible reference kind values for method handles.
#[allow(non_upper_case_globals, non_camel_case_types)]
mod refkind {
    use crate::error::{self, ClassFileError};

    pub const REF_getField: u8 = 1;
    pub const REF_getStatic: u8 = 2;
    pub const REF_putField: u8 = 3;
    pub const REF_putStatic: u8 = 4;
    pub const REF_invokeVirtual: u8 = 5;
    pub const REF_invokeStatic: u8 = 6;
    pub const REF_invokeSpecial: u8 = 7;
    pub const REF_newInvokeSpecial: u8 = 8;
    pub const REF_invokeInterface: u8 = 9;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum RefKind {
        REF_getField = REF_getField as isize,
        REF_getStatic = REF_getStatic as isize,
        REF_putField = REF_putField as isize,
        REF_putStatic = REF_putStatic as isize,
        REF_invokeVirtual = REF_invokeVirtual as isize,
        REF_invokeStatic = REF_invokeStatic as isize,
        REF_invokeSpecial = REF_invokeSpecial as isize,
        REF_newInvokeSpecial = REF_newInvokeSpecial as isize,
        REF_invokeInterface = REF_invokeInterface as isize,
    }

    impl RefKind {
        pub fn decode(v: u8) -> error::Result<Self> {
            match v {
                REF_getField => Ok(Self::REF_getField),
                REF_getStatic => Ok(Self::REF_getStatic),
                REF_putField => Ok(Self::REF_putField),
                REF_putStatic => Ok(Self::REF_putStatic),
                REF_invokeVirtual => Ok(Self::REF_invokeVirtual),
                REF_invokeStatic => Ok(Self::REF_invokeStatic),
                REF_invokeSpecial => Ok(Self::REF_invokeSpecial),
                REF_newInvokeSpecial => Ok(Self::REF_newInvokeSpecial),
                REF_invokeInterface => Ok(Self::REF_invokeInterface),
                _ => Err(ClassFileError::UnknownReferenceKind(v)),
            }
        }
    }
}

/// A constant pool entry.
///
/// Deserialization does not perform any index verification; lookups through
/// [`ConstantPool`] check indices and entry types lazily.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    /// The CONSTANT_Class_info structure is used to represent a class or an interface.
    Class {
        /// Index of a `Utf8` entry holding the binary class name in internal form.
        name_index: u16,
    },
    Fieldref {
        class_index: u16,
        name_and_type_index: u16,
    },
    Methodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodref {
        class_index: u16,
        name_and_type_index: u16,
    },
    /// The CONSTANT_String_info structure is used to represent constant objects of the type String.
    String {
        string_index: u16,
    },
    /// A 4-byte `int` constant. Also backs `boolean`, `byte`, `char` and `short` constant fields.
    Integer {
        bytes: i32,
    },
    /// A 4-byte `float` constant, kept as raw IEEE 754 bits.
    Float {
        float: u32,
    },
    /// An 8-byte `long` constant.
    ///
    /// We combine the high and low halves to a single i64 at parsing stage.
    Long {
        bytes: i64,
    },
    /// An 8-byte `double` constant, kept as raw IEEE 754 bits.
    Double {
        bytes: u64,
    },
    /// The CONSTANT_NameAndType_info structure is used to represent a field or method, without indicating which class or interface type it belongs to.
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    /// The CONSTANT_Utf8_info structure is used to represent constant string values.
    ///
    /// The modified UTF-8 encoding of the class file is decoded on read.
    Utf8 { data: Utf8Text },
    /// The CONSTANT_MethodHandle_info structure is used to represent a method handle.
    MethodHandle {
        reference_kind: RefKind,
        reference_index: u16,
    },
    /// The CONSTANT_MethodType_info structure is used to represent a method type.
    MethodType {
        descriptor_index: u16,
    },
    /// A dynamically-computed constant.
    Dynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    /// The CONSTANT_InvokeDynamic_info structure is used by an invokedynamic instruction.
    InvokeDynamic {
        bootstrap_method_attr_index: u16,
        name_and_type_index: u16,
    },
    /// A module, only present in `module-info` classes.
    Module {
        name_index: u16,
    },
    /// A package exported or opened by a module.
    Package {
        name_index: u16,
    },
    /// The slot following a `Long` or `Double` entry. It is never a valid
    /// target of a constant pool index.
    Unusable,
}

impl ConstantPoolEntry {
    /// Whether this entry occupies two slots of the pool.
    pub fn is_wide(&self) -> bool {
        matches!(self, Self::Long { .. } | Self::Double { .. })
    }
}

impl ClassFileItem for ConstantPoolEntry {
    fn read_from_stream<R: Read>(s: &mut ClassFileStream<R>, _cp: Option<&ConstantPool>) -> error::Result<Self>
    where
        Self: Sized,
    {
        match s.read_u1()? {
            tags::CONSTANT_Class => Ok(Self::Class {
                name_index: s.read_u2()?,
            }),
            tags::CONSTANT_Fieldref => Ok(Self::Fieldref {
                class_index: s.read_u2()?,
                name_and_type_index: s.read_u2()?,
            }),
            tags::CONSTANT_Methodref => Ok(Self::Methodref {
                class_index: s.read_u2()?,
                name_and_type_index: s.read_u2()?,
            }),
            tags::CONSTANT_InterfaceMethodref => Ok(Self::InterfaceMethodref {
                class_index: s.read_u2()?,
                name_and_type_index: s.read_u2()?,
            }),
            tags::CONSTANT_String => Ok(Self::String {
                string_index: s.read_u2()?,
            }),
            tags::CONSTANT_Integer => Ok(Self::Integer {
                bytes: s.read_u4()? as i32,
            }),
            tags::CONSTANT_Float => Ok(Self::Float {
                float: s.read_u4()?,
            }),
            tags::CONSTANT_Long => Ok(Self::Long {
                bytes: i64::from_be_bytes(s.read::<8>()?),
            }),
            tags::CONSTANT_Double => Ok(Self::Double {
                bytes: u64::from_be_bytes(s.read::<8>()?),
            }),
            tags::CONSTANT_NameAndType => Ok(Self::NameAndType {
                name_index: s.read_u2()?,
                descriptor_index: s.read_u2()?,
            }),
            tags::CONSTANT_Utf8 => {
                let length = s.read_u2()?;
                let bytes = s.read_dynamic(length as usize)?;
                Ok(Self::Utf8 {
                    data: decode_modified_utf8(&bytes)?,
                })
            }
            tags::CONSTANT_MethodHandle => Ok(Self::MethodHandle {
                reference_kind: RefKind::decode(s.read_u1()?)?,
                reference_index: s.read_u2()?,
            }),
            tags::CONSTANT_MethodType => Ok(Self::MethodType {
                descriptor_index: s.read_u2()?,
            }),
            tags::CONSTANT_Dynamic => Ok(Self::Dynamic {
                bootstrap_method_attr_index: s.read_u2()?,
                name_and_type_index: s.read_u2()?,
            }),
            tags::CONSTANT_InvokeDynamic => Ok(Self::InvokeDynamic {
                bootstrap_method_attr_index: s.read_u2()?,
                name_and_type_index: s.read_u2()?,
            }),
            tags::CONSTANT_Module => Ok(Self::Module {
                name_index: s.read_u2()?,
            }),
            tags::CONSTANT_Package => Ok(Self::Package {
                name_index: s.read_u2()?,
            }),
            v => Err(ClassFileError::UnknownConstantPoolTag(v)),
        }
    }
}

/// The text of a `Utf8` entry.
///
/// String constants may hold unpaired surrogates, which no Rust string can
/// represent. The UTF-16 code units are always kept; [`Utf8Text::as_str`] is
/// only available when they form valid Unicode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Text {
    units: Vec<u16>,
    text: Option<String>,
}

impl Utf8Text {
    pub fn from_units(units: Vec<u16>) -> Self {
        let text = String::from_utf16(&units).ok();
        Self { units, text }
    }

    /// The UTF-16 code units, unpaired surrogates included.
    pub fn units(&self) -> &[u16] {
        &self.units
    }

    pub fn as_str(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Decodes the class file format's modified UTF-8 encoding.
///
/// Modified UTF-8 encodes NUL as two bytes and characters outside the BMP as
/// two three-byte surrogates, so the bytes are decoded to UTF-16 code units.
pub fn decode_modified_utf8(b: &[u8]) -> error::Result<Utf8Text> {
    let mut units = Vec::with_capacity(b.len());
    let mut index = 0;
    while index < b.len() {
        let byte = b[index];
        match byte {
            0x01..=0x7f => {
                units.push(byte as u16);
                index += 1;
            }
            0xc0..=0xdf => {
                let b2 = continuation(b, index + 1)?;
                units.push(((byte as u16 & 0x1f) << 6) | (b2 as u16 & 0x3f));
                index += 2;
            }
            0xe0..=0xef => {
                let b2 = continuation(b, index + 1)?;
                let b3 = continuation(b, index + 2)?;
                units.push(((byte as u16 & 0x0f) << 12) | ((b2 as u16 & 0x3f) << 6) | (b3 as u16 & 0x3f));
                index += 3;
            }
            _ => return Err(ClassFileError::InvalidModifiedUtf8),
        }
    }
    Ok(Utf8Text::from_units(units))
}

fn continuation(b: &[u8], index: usize) -> error::Result<u8> {
    match b.get(index) {
        Some(&c) if c & 0xc0 == 0x80 => Ok(c),
        _ => Err(ClassFileError::InvalidModifiedUtf8),
    }
}
