//! Derives the exported C symbol of a native method.

use std::fmt;

use crate::config::JniAbi;

/// Appends the escaped form of `name` to `out`.
///
/// Works on UTF-16 code units in a single left-to-right pass: `/` and `.`
/// become `_`, ASCII letters and digits pass through, `_`, `;` and `[`
/// become `_1`, `_2` and `_3`, and every other unit becomes `_0` followed by
/// its hex value. A digit `0` to `3` opening a segment is escaped as well,
/// since `_` followed by such a digit would read as an escape.
fn escape_into(out: &mut String, name: &str, abi: JniAbi) {
    let width = abi.escape_width();
    let mut segment_start = true;
    for unit in name.encode_utf16() {
        let at_start = std::mem::replace(&mut segment_start, false);
        let ascii = u8::try_from(unit).ok().filter(u8::is_ascii);
        match ascii {
            Some(b'/' | b'.') => {
                out.push('_');
                segment_start = true;
            }
            Some(b'_') => out.push_str("_1"),
            Some(b';') => out.push_str("_2"),
            Some(b'[') => out.push_str("_3"),
            Some(b'0'..=b'3') if at_start => escape_unit(out, unit, width),
            Some(c) if c.is_ascii_alphanumeric() => out.push(char::from(c)),
            _ => escape_unit(out, unit, width),
        }
    }
}

fn escape_unit(out: &mut String, unit: u16, width: usize) {
    out.push_str(&format!("_0{:0width$x}", unit, width = width));
}

/// Mangles a class, method or descriptor fragment.
pub fn mangle_name(name: &str, abi: JniAbi) -> String {
    let mut out = String::with_capacity(name.len());
    escape_into(&mut out, name, abi);
    out
}

/// Mangles a binary class name, e.g. `com/example/Foo` to `com_example_Foo`.
pub fn mangle_class_name(qualified_name: &str, abi: JniAbi) -> String {
    mangle_name(qualified_name, abi)
}

/// Mangles a field name for use in a constant macro.
///
/// Unlike method names, `_` is kept as it is, so `MAX_VALUE` stays readable.
pub fn mangle_field_name(name: &str, abi: JniAbi) -> String {
    let width = abi.escape_width();
    let mut out = String::with_capacity(name.len());
    for unit in name.encode_utf16() {
        match u8::try_from(unit).ok().filter(u8::is_ascii) {
            Some(c) if c == b'_' || c.is_ascii_alphanumeric() => out.push(char::from(c)),
            _ => escape_unit(&mut out, unit, width),
        }
    }
    out
}

/// Mangles the parameter portion of a method descriptor, e.g.
/// `(I[Ljava/lang/String;)V` to `I_3Ljava_lang_String_2`.
pub fn mangle_parameters(descriptor: &str, abi: JniAbi) -> String {
    let parameters = descriptor
        .strip_prefix('(')
        .and_then(|d| d.split_once(')'))
        .map(|(params, _)| params)
        .unwrap_or(descriptor);
    mangle_name(parameters, abi)
}

/// The exported name of one native method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MangledSymbol {
    /// `Java_` + class + `_` + method.
    pub base_name: String,
    /// `__` + mangled parameters, only for overloaded natives.
    pub overload_suffix: Option<String>,
}

impl MangledSymbol {
    /// Computes the symbol of `method_name` declared in `qualified_name`.
    ///
    /// `overload_index` is the method's position among the natives sharing
    /// its name, `None` when the name is unique. Every overload carries the
    /// suffix, so only whether it is present affects the result.
    pub fn new(
        qualified_name: &str,
        method_name: &str,
        descriptor: &str,
        overload_index: Option<usize>,
        abi: JniAbi,
    ) -> Self {
        let mut base_name = String::from(abi.symbol_prefix());
        escape_into(&mut base_name, qualified_name, abi);
        base_name.push('_');
        escape_into(&mut base_name, method_name, abi);

        let overload_suffix = overload_index.map(|_| {
            let mut suffix = String::from(abi.overload_separator());
            suffix.push_str(&mangle_parameters(descriptor, abi));
            suffix
        });

        Self {
            base_name,
            overload_suffix,
        }
    }

    pub fn full_name(&self) -> String {
        match &self.overload_suffix {
            Some(suffix) => format!("{}{}", self.base_name, suffix),
            None => self.base_name.clone(),
        }
    }
}

impl fmt::Display for MangledSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_name)?;
        if let Some(suffix) = &self.overload_suffix {
            f.write_str(suffix)?;
        }
        Ok(())
    }
}
