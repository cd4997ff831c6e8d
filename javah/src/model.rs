//! The in-memory class model every later stage works on.

use std::fmt;

/// A class reduced to what the header generator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassInfo {
    /// Binary name in internal form, e.g. `com/example/Outer$Inner`.
    pub qualified_name: String,
    /// Enclosing classes, outermost first. Empty for top-level classes.
    pub enclosing_chain: Vec<String>,
    /// Methods in declaration order.
    pub methods: Vec<MethodInfo>,
    /// `static final` primitive constants in declaration order.
    pub constants: Vec<ConstantField>,
}

impl ClassInfo {
    /// A class without members. Accepts dotted or slashed names.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into().replace('.', "/"),
            enclosing_chain: Vec::new(),
            methods: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodInfo) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_constant(mut self, constant: ConstantField) -> Self {
        self.constants.push(constant);
        self
    }

    /// Whether the class declares at least one native method.
    pub fn has_native_methods(&self) -> bool {
        self.methods.iter().any(|m| m.is_native)
    }
}

/// One method of a [`ClassInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodInfo {
    pub name: String,
    /// Raw method descriptor, e.g. `(ILjava/lang/String;)V`.
    pub descriptor: String,
    pub is_native: bool,
    pub is_static: bool,
    pub is_public: bool,
    pub is_protected: bool,
}

impl MethodInfo {
    /// A package-private instance method.
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
            is_native: false,
            is_static: false,
            is_public: false,
            is_protected: false,
        }
    }

    /// Marks the method `native`.
    pub fn native(mut self) -> Self {
        self.is_native = true;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_visibility(mut self, is_public: bool, is_protected: bool) -> Self {
        self.is_public = is_public;
        self.is_protected = is_protected;
        self
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

/// A `static final` field whose value is a compile-time primitive constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantField {
    pub name: String,
    pub value: ConstantValue,
}

impl ConstantField {
    pub fn new(name: impl Into<String>, value: ConstantValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// The value of a constant field.
///
/// `boolean`, `byte`, `char` and `short` constants are stored as `Int`, the
/// way the class file stores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl ConstantValue {
    /// The value as a C literal with javah's suffixes.
    pub fn c_literal(&self) -> String {
        match *self {
            Self::Int(v) => format!("{}L", v),
            Self::Long(v) => format!("{}LL", v),
            Self::Float(v) if v.is_finite() => {
                format!("{}f", java_decimal(v.abs() as f64, format!("{:?}", v), format!("{:e}", v)))
            }
            Self::Float(v) => non_finite_literal(v.is_nan(), v.is_sign_negative(), "f"),
            Self::Double(v) if v.is_finite() => {
                java_decimal(v.abs(), format!("{:?}", v), format!("{:e}", v))
            }
            Self::Double(v) => non_finite_literal(v.is_nan(), v.is_sign_negative(), ""),
        }
    }
}

/// Picks Java's `toString` shape: plain decimals for magnitudes in
/// `[1e-3, 1e7)`, computerized scientific notation otherwise.
fn java_decimal(abs: f64, plain: String, scientific: String) -> String {
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        return plain;
    }
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    if mantissa.contains('.') {
        format!("{}E{}", mantissa, exponent)
    } else {
        format!("{}.0E{}", mantissa, exponent)
    }
}

fn non_finite_literal(nan: bool, negative: bool, suffix: &str) -> String {
    match (nan, negative) {
        (true, _) => format!("(0.0{0}/0.0{0})", suffix),
        (false, false) => format!("(1.0{0}/0.0{0})", suffix),
        (false, true) => format!("(-1.0{0}/0.0{0})", suffix),
    }
}
