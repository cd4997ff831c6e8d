//! Method descriptors and their JNI types.

use std::fmt;

use thiserror::Error;

/// Base types.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}

impl BaseType {
    pub fn from_code(code: char) -> Option<Self> {
        Some(match code {
            'B' => Self::Byte,
            'C' => Self::Char,
            'D' => Self::Double,
            'F' => Self::Float,
            'I' => Self::Int,
            'J' => Self::Long,
            'S' => Self::Short,
            'Z' => Self::Boolean,
            _ => return None,
        })
    }
}

/// Field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// An object type, holding the internal-form class name.
    Object(String),
    Array(Box<FieldType>),
}

/// Return descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Field(FieldType),
}

/// A method descriptor contains zero or more parameter descriptors,
/// representing the types of parameters that the method takes, and a
/// return descriptor, representing the type of the value (if any) that
/// the method returns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: ReturnType,
}

/// Why a descriptor failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("unknown type code '{0}'")]
    UnknownTypeCode(char),
    #[error("descriptor ends unexpectedly")]
    UnexpectedEnd,
    #[error("expected '{expected}' at offset {offset}")]
    Expected { expected: char, offset: usize },
    #[error("empty class name at offset {0}")]
    EmptyClassName(usize),
    #[error("illegal character in class name at offset {0}")]
    InvalidClassName(usize),
    #[error("unexpected characters after offset {0}")]
    TrailingCharacters(usize),
}

struct Cursor<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.offset..].chars().next()
    }

    fn bump(&mut self) -> Result<char, DescriptorError> {
        let c = self.peek().ok_or(DescriptorError::UnexpectedEnd)?;
        self.offset += c.len_utf8();
        Ok(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), DescriptorError> {
        let offset = self.offset;
        match self.bump()? {
            c if c == expected => Ok(()),
            _ => Err(DescriptorError::Expected { expected, offset }),
        }
    }

    fn field_type(&mut self) -> Result<FieldType, DescriptorError> {
        let start = self.offset;
        match self.bump()? {
            'L' => {
                let rest = &self.text[self.offset..];
                let end = rest.find(';').ok_or(DescriptorError::UnexpectedEnd)?;
                let name = &rest[..end];
                if name.is_empty() {
                    return Err(DescriptorError::EmptyClassName(start));
                }
                if name.contains(|c| matches!(c, '.' | '[' | '(' | ')')) {
                    return Err(DescriptorError::InvalidClassName(start));
                }
                self.offset += end + 1;
                Ok(FieldType::Object(name.to_string()))
            }
            '[' => Ok(FieldType::Array(Box::new(self.field_type()?))),
            c => BaseType::from_code(c)
                .map(FieldType::Base)
                .ok_or(DescriptorError::UnknownTypeCode(c)),
        }
    }
}

impl MethodDescriptor {
    /// Parse a method descriptor such as `(ILjava/lang/String;)V`.
    pub fn parse(descriptor: &str) -> Result<Self, DescriptorError> {
        let mut cursor = Cursor { text: descriptor, offset: 0 };
        cursor.expect('(')?;
        let mut parameters = vec![];
        loop {
            match cursor.peek() {
                Some(')') => {
                    cursor.bump()?;
                    break;
                }
                Some(_) => parameters.push(cursor.field_type()?),
                None => return Err(DescriptorError::UnexpectedEnd),
            }
        }
        let return_type = if cursor.peek() == Some('V') {
            cursor.bump()?;
            ReturnType::Void
        } else {
            ReturnType::Field(cursor.field_type()?)
        };
        if cursor.offset != descriptor.len() {
            return Err(DescriptorError::TrailingCharacters(cursor.offset));
        }
        Ok(Self { parameters, return_type })
    }
}

/// Parse a field descriptor such as `[J`.
pub fn parse_field_descriptor(descriptor: &str) -> Result<FieldType, DescriptorError> {
    let mut cursor = Cursor { text: descriptor, offset: 0 };
    let ty = cursor.field_type()?;
    if cursor.offset != descriptor.len() {
        return Err(DescriptorError::TrailingCharacters(cursor.offset));
    }
    Ok(ty)
}

/// Types of the JNI vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JniType {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
    Class,
    String,
    Throwable,
    BooleanArray,
    ByteArray,
    CharArray,
    ShortArray,
    IntArray,
    LongArray,
    FloatArray,
    DoubleArray,
    ObjectArray,
}

impl JniType {
    /// The `jni.h` spelling of the type.
    pub fn c_name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Boolean => "jboolean",
            Self::Byte => "jbyte",
            Self::Char => "jchar",
            Self::Short => "jshort",
            Self::Int => "jint",
            Self::Long => "jlong",
            Self::Float => "jfloat",
            Self::Double => "jdouble",
            Self::Object => "jobject",
            Self::Class => "jclass",
            Self::String => "jstring",
            Self::Throwable => "jthrowable",
            Self::BooleanArray => "jbooleanArray",
            Self::ByteArray => "jbyteArray",
            Self::CharArray => "jcharArray",
            Self::ShortArray => "jshortArray",
            Self::IntArray => "jintArray",
            Self::LongArray => "jlongArray",
            Self::FloatArray => "jfloatArray",
            Self::DoubleArray => "jdoubleArray",
            Self::ObjectArray => "jobjectArray",
        }
    }

    fn of_base(base: BaseType) -> Self {
        match base {
            BaseType::Boolean => Self::Boolean,
            BaseType::Byte => Self::Byte,
            BaseType::Char => Self::Char,
            BaseType::Short => Self::Short,
            BaseType::Int => Self::Int,
            BaseType::Long => Self::Long,
            BaseType::Float => Self::Float,
            BaseType::Double => Self::Double,
        }
    }

    /// Maps a field type onto its JNI type.
    pub fn of(ty: &FieldType) -> Self {
        match ty {
            FieldType::Base(base) => Self::of_base(*base),
            FieldType::Object(name) => match name.as_str() {
                "java/lang/String" => Self::String,
                "java/lang/Class" => Self::Class,
                "java/lang/Throwable" => Self::Throwable,
                _ => Self::Object,
            },
            FieldType::Array(component) => match component.as_ref() {
                FieldType::Base(base) => match base {
                    BaseType::Boolean => Self::BooleanArray,
                    BaseType::Byte => Self::ByteArray,
                    BaseType::Char => Self::CharArray,
                    BaseType::Short => Self::ShortArray,
                    BaseType::Int => Self::IntArray,
                    BaseType::Long => Self::LongArray,
                    BaseType::Float => Self::FloatArray,
                    BaseType::Double => Self::DoubleArray,
                },
                _ => Self::ObjectArray,
            },
        }
    }

    pub fn of_return(ty: &ReturnType) -> Self {
        match ty {
            ReturnType::Void => Self::Void,
            ReturnType::Field(field) => Self::of(field),
        }
    }
}

impl fmt::Display for JniType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.c_name())
    }
}

/// The C-level signature of a native method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JniSignature {
    /// `jclass` for static methods, `jobject` for instance methods.
    pub receiver: JniType,
    pub parameters: Vec<JniType>,
    pub return_type: JniType,
}

impl JniSignature {
    /// The parameter list as javah prints it, e.g. `JNIEnv *, jobject, jint`.
    pub fn parameter_list(&self) -> String {
        let mut list = String::from("JNIEnv *, ");
        list.push_str(self.receiver.c_name());
        for parameter in &self.parameters {
            list.push_str(", ");
            list.push_str(parameter.c_name());
        }
        list
    }
}

/// Maps a raw method descriptor onto its JNI signature.
///
/// Identical descriptor text always yields an identical signature.
pub fn map_descriptor(descriptor: &str, is_static: bool) -> Result<JniSignature, DescriptorError> {
    let parsed = MethodDescriptor::parse(descriptor)?;
    Ok(JniSignature {
        receiver: if is_static { JniType::Class } else { JniType::Object },
        parameters: parsed.parameters.iter().map(JniType::of).collect(),
        return_type: JniType::of_return(&parsed.return_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parameters_and_return_type() {
        let desc = MethodDescriptor::parse("(I[[Ljava/lang/String;J)[I").unwrap();
        assert_eq!(
            desc.parameters,
            vec![
                FieldType::Base(BaseType::Int),
                FieldType::Array(Box::new(FieldType::Array(Box::new(FieldType::Object(
                    "java/lang/String".to_string()
                ))))),
                FieldType::Base(BaseType::Long),
            ]
        );
        assert_eq!(
            desc.return_type,
            ReturnType::Field(FieldType::Array(Box::new(FieldType::Base(BaseType::Int))))
        );
        assert_eq!(MethodDescriptor::parse("()V").unwrap().return_type, ReturnType::Void);
    }

    #[test]
    fn rejects_malformed_descriptors() {
        assert_eq!(MethodDescriptor::parse("I)V"), Err(DescriptorError::Expected { expected: '(', offset: 0 }));
        assert_eq!(MethodDescriptor::parse("(I"), Err(DescriptorError::UnexpectedEnd));
        assert_eq!(MethodDescriptor::parse("(Q)V"), Err(DescriptorError::UnknownTypeCode('Q')));
        assert_eq!(MethodDescriptor::parse("(V)V"), Err(DescriptorError::UnknownTypeCode('V')));
        assert_eq!(MethodDescriptor::parse("(L;)V"), Err(DescriptorError::EmptyClassName(1)));
        assert_eq!(MethodDescriptor::parse("(Ljava/lang/String)V"), Err(DescriptorError::UnexpectedEnd));
        assert_eq!(MethodDescriptor::parse("(Ljava.lang.String;)V"), Err(DescriptorError::InvalidClassName(1)));
        assert_eq!(MethodDescriptor::parse("()VV"), Err(DescriptorError::TrailingCharacters(3)));
        assert_eq!(MethodDescriptor::parse("()"), Err(DescriptorError::UnexpectedEnd));
    }

    #[test]
    fn maps_to_jni_types() {
        let sig = map_descriptor(
            "(ZBCSIJFDLjava/lang/Object;Ljava/lang/String;Ljava/lang/Class;Ljava/lang/Throwable;)V",
            false,
        )
        .unwrap();
        assert_eq!(
            sig.parameter_list(),
            "JNIEnv *, jobject, jboolean, jbyte, jchar, jshort, jint, jlong, jfloat, jdouble, \
             jobject, jstring, jclass, jthrowable"
        );
        assert_eq!(sig.return_type, JniType::Void);
    }

    #[test]
    fn maps_arrays() {
        let sig = map_descriptor("([Z[B[C[S[I[J[F[D[Ljava/lang/String;[[I)[[J", true).unwrap();
        assert_eq!(sig.receiver, JniType::Class);
        assert_eq!(
            sig.parameters.iter().map(|t| t.c_name()).collect::<Vec<_>>(),
            [
                "jbooleanArray", "jbyteArray", "jcharArray", "jshortArray", "jintArray",
                "jlongArray", "jfloatArray", "jdoubleArray", "jobjectArray", "jobjectArray",
            ]
        );
        assert_eq!(sig.return_type, JniType::ObjectArray);
    }

    #[test]
    fn field_descriptors() {
        assert_eq!(parse_field_descriptor("J"), Ok(FieldType::Base(BaseType::Long)));
        assert_eq!(parse_field_descriptor("JJ"), Err(DescriptorError::TrailingCharacters(1)));
    }
}
