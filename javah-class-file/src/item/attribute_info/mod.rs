use std::io::{Cursor, Read};

use fnv::FnvHashMap;

use crate::{
    error::{self, ClassFileError},
    item::{constant_pool::ConstantPool, ClassFileItem},
    stream::ClassFileStream,
};

use self::attrtype::{ConstantValue, EnclosingMethod, InnerClasses};

/// Attribute types understood by the decoder.
#[allow(non_upper_case_globals)]
pub mod attrtype {
    pub const ConstantValue: &str = "ConstantValue";
    pub const InnerClasses: &str = "InnerClasses";
    pub const EnclosingMethod: &str = "EnclosingMethod";
}

/// Attributes in a class file.
///
/// These are used in the `ClassFile`, `field_info` and `method_info`
/// structures of the class file format.
#[derive(Debug, Clone, PartialEq)]
pub enum Attributes {
    /// The ConstantValue attribute is a fixed-length attribute in the
    /// attributes table of a field_info structure. It represents the value
    /// of a constant expression.
    ConstantValue {
        /// Index of an `Integer`, `Long`, `Float`, `Double` or `String`
        /// constant holding the field's value.
        constantvalue_index: u16,
    },
    /// The InnerClasses attribute is a variable-length attribute
    /// in the attributes table of a ClassFile structure.
    ///
    /// The constant pool of every nested class refers to its enclosing
    /// class, so a nested class has InnerClasses information for each
    /// enclosing class as well as for its own members.
    InnerClasses {
        classes: Vec<ClassArrayEntry>,
    },
    /// The EnclosingMethod attribute is present if and only if the class
    /// is a local or anonymous class.
    EnclosingMethod {
        /// Index of a `Class` constant for the innermost enclosing class.
        class_index: u16,
        /// Index of a `NameAndType` constant for the enclosing method, or
        /// zero when the class is not enclosed by a method.
        method_index: u16,
    },
    /// Any attribute the header generator has no use for, kept verbatim.
    Opaque {
        info: Vec<u8>,
    },
}

/// Collection of all attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributesCollection {
    pub collection: FnvHashMap<String, Vec<Attributes>>
}

impl AttributesCollection {
    /// Insert an attribute in to the collection.
    fn insert(&mut self, k: String, v: Attributes) {
        self.collection.entry(k).or_default().push(v);
    }

    pub fn get(&self, k: &str) -> &[Attributes] {
        self.collection.get(k).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// The entries of the first `InnerClasses` attribute, if any.
    pub fn inner_classes(&self) -> &[ClassArrayEntry] {
        self.get(InnerClasses)
            .iter()
            .find_map(|a| match a {
                Attributes::InnerClasses { classes } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// The `ConstantValue` index of a field, if it carries one.
    pub fn constant_value(&self) -> Option<u16> {
        self.get(ConstantValue).iter().find_map(|a| match a {
            Attributes::ConstantValue { constantvalue_index } => Some(*constantvalue_index),
            _ => None,
        })
    }

    /// The `(class_index, method_index)` pair of an `EnclosingMethod` attribute.
    pub fn enclosing_method(&self) -> Option<(u16, u16)> {
        self.get(EnclosingMethod).iter().find_map(|a| match a {
            Attributes::EnclosingMethod { class_index, method_index } => Some((*class_index, *method_index)),
            _ => None,
        })
    }
}

impl ClassFileItem for AttributesCollection {
    fn read_from_stream<R: Read>(s: &mut ClassFileStream<R>, cp: Option<&ConstantPool>) -> error::Result<Self>
    where
        Self: Sized {
        let attributes_count = s.read_u2()?;
        let mut attributes = Self::default();
        for _ in 0..attributes_count {
            let attribute_name_index = s.read_u2()?;
            let attribute_length = s.read_u4()? as usize;
            let info = s.read_dynamic(attribute_length)?;

            // Attributes can only be named once the pool exists. Without one
            // every attribute is kept opaque under its index.
            let attribute_name = match cp {
                Some(cp) => cp.get_utf8_constant(attribute_name_index)?.to_string(),
                None => {
                    attributes.insert(format!("#{}", attribute_name_index), Attributes::Opaque { info });
                    continue;
                }
            };

            let a = match attribute_name.as_str() {
                ConstantValue => read_exact_attribute(ConstantValue, info, |s| {
                    Ok(Attributes::ConstantValue {
                        constantvalue_index: s.read_u2()?,
                    })
                })?,
                InnerClasses => read_exact_attribute(InnerClasses, info, |s| {
                    let number_of_classes = s.read_u2()?;
                    Ok(Attributes::InnerClasses {
                        classes: s.read_sequence(cp, number_of_classes as usize)?,
                    })
                })?,
                EnclosingMethod => read_exact_attribute(EnclosingMethod, info, |s| {
                    Ok(Attributes::EnclosingMethod {
                        class_index: s.read_u2()?,
                        method_index: s.read_u2()?,
                    })
                })?,
                _ => Attributes::Opaque { info },
            };
            attributes.insert(attribute_name, a);
        };
        Ok(attributes)
    }
}

/// Decodes an attribute body, requiring the reader to consume it completely.
fn read_exact_attribute<F>(name: &'static str, info: Vec<u8>, f: F) -> error::Result<Attributes>
where
    F: FnOnce(&mut ClassFileStream<Cursor<Vec<u8>>>) -> error::Result<Attributes>,
{
    let length = info.len();
    let mut cursor = Cursor::new(info);
    let mut s = ClassFileStream::new(&mut cursor);
    let attribute = f(&mut s).map_err(|e| match e {
        ClassFileError::IoError(_) => ClassFileError::MalformedAttribute(name),
        e => e,
    })?;
    if s.position() != length {
        return Err(ClassFileError::MalformedAttribute(name));
    }
    Ok(attribute)
}

bitflags::bitflags! {
    /// Access flags of a nested class as declared in source.
    pub struct InnerClassAccessFlags: u16 {
        /// Marked or implicitly public in source.
        const ACC_PUBLIC = 0x0001;
        /// Marked private in source.
        const ACC_PRIVATE = 0x0002;
        /// Marked protected in source.
        const ACC_PROTECTED = 0x0004;
        /// Marked or implicitly static in source.
        const ACC_STATIC = 0x0008;
        /// Marked or implicitly final in source.
        const ACC_FINAL = 0x0010;
        /// Was an interface in source.
        const ACC_INTERFACE = 0x0200;
        /// Marked or implicitly abstract in source.
        const ACC_ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code.
        const ACC_SYNTHETIC = 0x1000;
        /// Declared as an annotation interface.
        const ACC_ANNOTATION = 0x2000;
        /// Declared as an enum class.
        const ACC_ENUM = 0x4000;
    }
}

/// An entry in the `classes` array of the `InnerClasses` attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassArrayEntry {
    /// Index of a `Class` constant representing the nested class C.
    pub inner_class_info_index: u16,
    /// If C is not a member of a class or an interface (a top-level,
    /// local or anonymous class), zero. Otherwise the index of a `Class`
    /// constant for the class of which C is a member.
    pub outer_class_info_index: u16,
    /// If C is anonymous, zero. Otherwise the index of a `Utf8` constant
    /// holding the simple name of C as given in source.
    pub inner_name_index: u16,
    /// Access flags of C as declared in source.
    pub inner_class_access_flags: InnerClassAccessFlags,
}

impl ClassFileItem for ClassArrayEntry {
    fn read_from_stream<R: Read>(
        s: &mut ClassFileStream<R>,
        _cp: Option<&ConstantPool>,
    ) -> error::Result<Self>
    where
        Self: std::marker::Sized,
    {
        let inner_class_info_index = s.read_u2()?;
        let outer_class_info_index = s.read_u2()?;
        let inner_name_index = s.read_u2()?;
        let flags = s.read_u2()?;
        Ok(Self {
            inner_class_info_index,
            outer_class_info_index,
            inner_name_index,
            inner_class_access_flags: InnerClassAccessFlags::from_bits(flags)
                .ok_or(ClassFileError::BadInnerClassAccessFlags(flags))?,
        })
    }
}
