//! Builds a [`ClassInfo`] out of a decoded class file.

use fnv::{FnvHashMap, FnvHashSet};
use javah_class_file::{
    item::{
        constant_pool::{ConstantPool, ConstantPoolEntry},
        fields::FieldInfo,
        methods::MethodAccessFlags,
    },
    ClassFile,
};

use crate::{
    descriptor::{parse_field_descriptor, BaseType, FieldType, MethodDescriptor},
    error::{Error, Result},
    model::{ClassInfo, ConstantField, ConstantValue, MethodInfo},
};

/// Name used in errors raised before `this_class` could be read.
const UNKNOWN_CLASS: &str = "<unknown>";

/// Reads the class model out of `class_file`.
///
/// Fails with [`Error::MalformedClass`] when constant pool references do not
/// hold, a descriptor is unparsable or the nesting information is cyclic.
pub fn read_class(class_file: &ClassFile) -> Result<ClassInfo> {
    let cp = &class_file.constant_pool;
    let name = class_file
        .this_class_name()
        .map_err(|e| Error::decode(UNKNOWN_CLASS, e))?
        .to_string();

    let enclosing_chain = enclosing_chain(class_file, &name)?;

    let mut methods = Vec::with_capacity(class_file.methods.len());
    for method in &class_file.methods {
        let method_name = cp.get_utf8_constant(method.name_index).map_err(|e| Error::decode(&name, e))?;
        let descriptor = cp
            .get_utf8_constant(method.descriptor_index)
            .map_err(|e| Error::decode(&name, e))?;
        MethodDescriptor::parse(descriptor).map_err(|e| Error::descriptor(&name, method_name, descriptor, e))?;

        let flags = method.access_flags;
        let mut info = MethodInfo::new(method_name, descriptor)
            .with_static(flags.contains(MethodAccessFlags::ACC_STATIC))
            .with_visibility(
                flags.contains(MethodAccessFlags::ACC_PUBLIC),
                flags.contains(MethodAccessFlags::ACC_PROTECTED),
            );
        if flags.contains(MethodAccessFlags::ACC_NATIVE) {
            info = info.native();
        }
        methods.push(info);
    }

    let mut constants = Vec::new();
    for field in class_file.fields.iter().filter(|f| f.is_static_final()) {
        if let Some(constant) = read_constant(cp, field).map_err(|reason| Error::malformed(&name, reason))? {
            constants.push(constant);
        }
    }

    Ok(ClassInfo {
        qualified_name: name,
        enclosing_chain,
        methods,
        constants,
    })
}

/// Resolves the enclosing classes of `name`, outermost first.
///
/// Member classes are linked to their outer class by `InnerClasses`; local
/// and anonymous classes only record their enclosing class in
/// `EnclosingMethod`.
fn enclosing_chain(class_file: &ClassFile, name: &str) -> Result<Vec<String>> {
    let cp = &class_file.constant_pool;
    let mut outer_of: FnvHashMap<&str, &str> = FnvHashMap::default();
    for entry in class_file.attributes.inner_classes() {
        if entry.outer_class_info_index == 0 {
            continue;
        }
        let inner = cp
            .get_class_name(entry.inner_class_info_index)
            .map_err(|e| Error::decode(name, e))?;
        let outer = cp
            .get_class_name(entry.outer_class_info_index)
            .map_err(|e| Error::decode(name, e))?;
        outer_of.insert(inner, outer);
    }

    let mut current = match outer_of.get(name) {
        Some(&outer) => outer,
        None => match class_file.attributes.enclosing_method() {
            Some((class_index, _)) => cp.get_class_name(class_index).map_err(|e| Error::decode(name, e))?,
            None => return Ok(Vec::new()),
        },
    };

    let mut seen: FnvHashSet<&str> = FnvHashSet::default();
    seen.insert(name);
    let mut chain = Vec::new();
    loop {
        if !seen.insert(current) {
            return Err(Error::malformed(name, format!("cyclic nesting through {}", current)));
        }
        chain.push(current.to_string());
        match outer_of.get(current) {
            Some(&outer) => current = outer,
            None => break,
        }
    }
    chain.reverse();
    Ok(chain)
}

/// Reads the value of a `static final` field, if it is a primitive constant.
///
/// `String` constants and fields without a `ConstantValue` yield `None`.
fn read_constant(cp: &ConstantPool, field: &FieldInfo) -> std::result::Result<Option<ConstantField>, String> {
    let Some(index) = field.attributes.constant_value() else {
        return Ok(None);
    };
    let name = cp.get_utf8_constant(field.name_index).map_err(|e| e.to_string())?;
    let descriptor = cp.get_utf8_constant(field.descriptor_index).map_err(|e| e.to_string())?;
    let field_type = parse_field_descriptor(descriptor)
        .map_err(|e| format!("field {} has invalid descriptor {}: {}", name, descriptor, e))?;
    let FieldType::Base(base) = field_type else {
        return Ok(None);
    };
    let entry = cp.get_constant(index).map_err(|e| e.to_string())?;

    let value = match (base, entry) {
        (
            BaseType::Boolean | BaseType::Byte | BaseType::Char | BaseType::Short | BaseType::Int,
            ConstantPoolEntry::Integer { bytes },
        ) => ConstantValue::Int(*bytes),
        (BaseType::Long, ConstantPoolEntry::Long { bytes }) => ConstantValue::Long(*bytes),
        (BaseType::Float, ConstantPoolEntry::Float { float }) => ConstantValue::Float(f32::from_bits(*float)),
        (BaseType::Double, ConstantPoolEntry::Double { bytes }) => ConstantValue::Double(f64::from_bits(*bytes)),
        _ => {
            return Err(format!(
                "constant field {} of type {} has a mismatched ConstantValue",
                name, descriptor
            ))
        }
    };
    Ok(Some(ConstantField::new(name, value)))
}

#[cfg(test)]
mod tests {
    use javah_class_file::{
        item::{attribute_info::InnerClassAccessFlags, fields::FieldAccessFlags, methods::MethodAccessFlags},
        testing::{ClassFileBuilder, ConstantSpec},
        ClassFile,
    };

    use super::read_class;
    use crate::{
        error::Error,
        model::{ConstantField, ConstantValue, MethodInfo},
    };

    fn read(bytes: Vec<u8>) -> crate::Result<crate::ClassInfo> {
        read_class(&ClassFile::from_bytes(&bytes).unwrap())
    }

    #[test]
    fn reads_methods_with_flags() {
        let class = read(
            ClassFileBuilder::new("com/example/Foo")
                .method(MethodAccessFlags::ACC_PUBLIC.bits(), "<init>", "()V")
                .native_method("bar", "(Ljava/lang/String;)I")
                .method(
                    (MethodAccessFlags::ACC_PROTECTED | MethodAccessFlags::ACC_STATIC | MethodAccessFlags::ACC_NATIVE)
                        .bits(),
                    "baz",
                    "()V",
                )
                .build(),
        )
        .unwrap();

        assert_eq!(class.qualified_name, "com/example/Foo");
        assert!(class.enclosing_chain.is_empty());
        assert_eq!(
            class.methods,
            vec![
                MethodInfo::new("<init>", "()V").with_visibility(true, false),
                MethodInfo::new("bar", "(Ljava/lang/String;)I").native().with_visibility(true, false),
                MethodInfo::new("baz", "()V").native().with_static(true).with_visibility(false, true),
            ]
        );
    }

    #[test]
    fn resolves_member_class_chain() {
        let inner = InnerClassAccessFlags::ACC_STATIC.bits();
        let class = read(
            ClassFileBuilder::new("a/Outer$Mid$In")
                .inner_class("a/Outer$Mid", Some("a/Outer"), Some("Mid"), inner)
                .inner_class("a/Outer$Mid$In", Some("a/Outer$Mid"), Some("In"), inner)
                .build(),
        )
        .unwrap();
        assert_eq!(class.enclosing_chain, ["a/Outer", "a/Outer$Mid"]);
    }

    #[test]
    fn local_classes_use_enclosing_method() {
        let class = read(
            ClassFileBuilder::new("a/Outer$1Local")
                .inner_class("a/Outer$1Local", None, Some("Local"), 0)
                .enclosing_class("a/Outer")
                .build(),
        )
        .unwrap();
        assert_eq!(class.enclosing_chain, ["a/Outer"]);
    }

    #[test]
    fn dollar_in_top_level_name_is_not_nesting() {
        let class = read(ClassFileBuilder::new("a/Odd$Name").build()).unwrap();
        assert!(class.enclosing_chain.is_empty());
    }

    #[test]
    fn cyclic_nesting_is_malformed() {
        let err = read(
            ClassFileBuilder::new("a/X")
                .inner_class("a/X", Some("a/Y"), Some("X"), 0)
                .inner_class("a/Y", Some("a/X"), Some("Y"), 0)
                .build(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedClass { ref class, .. } if class == "a/X"), "{:?}", err);
    }

    #[test]
    fn bad_descriptors() {
        let err = read(ClassFileBuilder::new("a/B").native_method("f", "(I").build()).unwrap_err();
        assert!(matches!(err, Error::MalformedClass { .. }), "{:?}", err);

        let err = read(ClassFileBuilder::new("a/B").native_method("f", "(Q)V").build()).unwrap_err();
        assert!(
            matches!(err, Error::UnsupportedDescriptor { ref method, code: 'Q', .. } if method == "f"),
            "{:?}",
            err
        );
    }

    #[test]
    fn collects_primitive_constants() {
        let class = read(
            ClassFileBuilder::new("a/K")
                .constant_field("FLAG", "Z", ConstantSpec::Int(1))
                .constant_field("LIMIT", "J", ConstantSpec::Long(-5))
                .constant_field("RATIO", "F", ConstantSpec::Float(0.5))
                .constant_field("SCALE", "D", ConstantSpec::Double(2.0))
                .constant_field("NAME", "Ljava/lang/String;", ConstantSpec::String("k".to_string()))
                .field(
                    (FieldAccessFlags::ACC_PUBLIC | FieldAccessFlags::ACC_STATIC).bits(),
                    "counter",
                    "I",
                )
                .build(),
        )
        .unwrap();
        assert_eq!(
            class.constants,
            vec![
                ConstantField::new("FLAG", ConstantValue::Int(1)),
                ConstantField::new("LIMIT", ConstantValue::Long(-5)),
                ConstantField::new("RATIO", ConstantValue::Float(0.5)),
                ConstantField::new("SCALE", ConstantValue::Double(2.0)),
            ]
        );
    }

    #[test]
    fn mismatched_constant_is_malformed() {
        let err = read(
            ClassFileBuilder::new("a/K")
                .constant_field("LIMIT", "J", ConstantSpec::Int(1))
                .build(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedClass { .. }), "{:?}", err);
    }

    #[test]
    fn constant_with_invalid_field_descriptor_is_malformed() {
        let err = read(
            ClassFileBuilder::new("a/K")
                .constant_field("LIMIT", "JJ", ConstantSpec::Long(1))
                .build(),
        )
        .unwrap_err();
        assert!(
            matches!(err, Error::MalformedClass { ref reason, .. } if reason.contains("invalid descriptor JJ")),
            "{:?}",
            err
        );
    }

    #[test]
    fn array_constants_are_not_macros() {
        let class = read(
            ClassFileBuilder::new("a/K")
                .constant_field("TABLE", "[I", ConstantSpec::Int(1))
                .build(),
        )
        .unwrap();
        assert!(class.constants.is_empty());
    }
}
