use thiserror::Error;

/// An error which can occur on deserialization of a class file.
#[derive(Debug, Error)]
pub enum ClassFileError {
    /// A generic I/O error, usually a truncated file.
    #[error("failed to read class file: {0}")]
    IoError(#[from] std::io::Error),

    /// Returned when a class file has a bad magic number.
    #[error("bad magic number 0x{0:08x}")]
    BadMagicNumber(u32),

    /// Returned when an unknown constant pool tag is found.
    #[error("unknown constant pool tag {0}")]
    UnknownConstantPoolTag(u8),

    /// Returned when a `Utf8` constant is not valid modified UTF-8.
    #[error("invalid modified UTF-8 in constant pool")]
    InvalidModifiedUtf8,

    /// Returned when text with an unpaired surrogate is used as a name or descriptor.
    #[error("constant pool entry {0} holds an unpaired surrogate")]
    UnpairedSurrogate(u16),

    /// Returned when a constant pool index is zero or past the end of the pool.
    #[error("constant pool index {0} is out of range")]
    BadConstantPoolIndex(u16),

    /// Returned when a constant pool entry has a different type than expected.
    #[error("constant pool entry {index} is not a {expected} constant")]
    UnexpectedConstant { index: u16, expected: &'static str },

    /// Returned when an unknown reference kind is found.
    #[error("unknown method handle reference kind {0}")]
    UnknownReferenceKind(u8),

    /// Returned when bad class access flags are found.
    #[error("bad class access flags 0x{0:04x}")]
    BadClassAccessFlags(u16),

    /// Returned when bad inner class access flags are found.
    #[error("bad inner class access flags 0x{0:04x}")]
    BadInnerClassAccessFlags(u16),

    /// Returned when bad field access flags are found.
    #[error("bad field access flags 0x{0:04x}")]
    BadFieldAccessFlags(u16),

    /// Returned when bad method access flags are found.
    #[error("bad method access flags 0x{0:04x}")]
    BadMethodAccessFlags(u16),

    /// Returned when an attribute's declared length does not match its contents.
    #[error("malformed {0} attribute")]
    MalformedAttribute(&'static str),
}

pub type Result<T> = std::result::Result<T, ClassFileError>;
