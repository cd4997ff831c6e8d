//! Renders header units in javah's layout.

use std::fmt;

use crate::{descriptor::JniSignature, mangle::MangledSymbol};

const PREAMBLE: &str = "/* DO NOT EDIT THIS FILE - it is machine generated */\n#include <jni.h>\n";

/// Declaration of one native entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prototype {
    /// The method name as declared, unmangled.
    pub method_name: String,
    /// The raw method descriptor.
    pub descriptor: String,
    pub symbol: MangledSymbol,
    pub signature: JniSignature,
}

/// A `#define` for a constant field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantMacro {
    /// Mangled class name, `_` and the field name.
    pub name: String,
    /// The value as a C literal.
    pub literal: String,
}

/// The header generated for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderUnit {
    /// Binary name in internal form, e.g. `com/example/Foo`.
    pub class_name: String,
    /// The class name mangled the way symbols spell it.
    pub mangled_class: String,
    /// Mangled class name + `.h`.
    pub file_name: String,
    /// `_Included_` + mangled class name.
    pub guard_token: String,
    pub constants: Vec<ConstantMacro>,
    /// In method declaration order.
    pub prototypes: Vec<Prototype>,
}

impl HeaderUnit {
    /// A unit with neither constants nor prototypes.
    pub fn new(class_name: impl Into<String>, mangled_class: impl Into<String>) -> Self {
        let mangled_class = mangled_class.into();
        Self {
            class_name: class_name.into(),
            file_name: format!("{}.h", mangled_class),
            guard_token: format!("_Included_{}", mangled_class),
            mangled_class,
            constants: Vec::new(),
            prototypes: Vec::new(),
        }
    }

    /// The complete text of the header file.
    pub fn render(&self) -> String {
        format!("{}{}", PREAMBLE, Block(self))
    }
}

/// Everything of a unit after the preamble.
struct Block<'a>(&'a HeaderUnit);

impl fmt::Display for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = self.0;
        let class = &unit.mangled_class;
        writeln!(f, "/* Header for class {} */", class)?;
        f.write_str("\n")?;
        writeln!(f, "#ifndef {}", unit.guard_token)?;
        writeln!(f, "#define {}", unit.guard_token)?;
        f.write_str("#ifdef __cplusplus\nextern \"C\" {\n#endif\n")?;
        for constant in &unit.constants {
            writeln!(f, "#undef {}", constant.name)?;
            writeln!(f, "#define {} {}", constant.name, constant.literal)?;
        }
        for prototype in &unit.prototypes {
            f.write_str("/*\n")?;
            writeln!(f, " * Class:     {}", class)?;
            writeln!(f, " * Method:    {}", prototype.method_name)?;
            writeln!(f, " * Signature: {}", prototype.descriptor)?;
            f.write_str(" */\n")?;
            writeln!(
                f,
                "JNIEXPORT {} JNICALL {}",
                prototype.signature.return_type.c_name(),
                prototype.symbol
            )?;
            writeln!(f, "  ({});", prototype.signature.parameter_list())?;
            f.write_str("\n")?;
        }
        f.write_str("#ifdef __cplusplus\n}\n#endif\n#endif\n")
    }
}

/// Renders several units into one file: a single preamble, then each class.
pub fn render_combined(units: &[HeaderUnit]) -> String {
    let mut out = String::from(PREAMBLE);
    for unit in units {
        out.push_str(&Block(unit).to_string());
    }
    out
}
