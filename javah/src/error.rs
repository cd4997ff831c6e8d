use javah_class_file::ClassFileError;
use thiserror::Error;

use crate::descriptor::DescriptorError;

/// Errors raised while generating a header for one class.
///
/// Every variant names the class it concerns; none of them is transient.
#[derive(Debug, Error)]
pub enum Error {
    /// The decoded class is structurally invalid.
    #[error("malformed class {class}: {reason}")]
    MalformedClass {
        class: String,
        reason: String,
        #[source]
        source: Option<ClassFileError>,
    },

    /// A descriptor uses a type code outside the descriptor grammar.
    #[error("class {class}, method {method}: unsupported type code '{code}' in descriptor {descriptor}")]
    UnsupportedDescriptor {
        class: String,
        method: String,
        descriptor: String,
        code: char,
    },

    /// Two native methods mangle to the same symbol.
    #[error("class {class}: native methods {method}{first} and {method}{second} both link as {symbol}")]
    AmbiguousNativeSignature {
        class: String,
        method: String,
        symbol: String,
        first: String,
        second: String,
    },

    /// The class could not be located or read.
    #[error("could not load class {class}")]
    Unresolved {
        class: String,
        #[source]
        source: std::io::Error,
    },

    /// The run was cancelled before this class was started.
    #[error("processing stopped before class {class}")]
    Cancelled { class: String },
}

impl Error {
    pub(crate) fn malformed(class: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedClass {
            class: class.into(),
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn decode(class: impl Into<String>, source: ClassFileError) -> Self {
        Self::MalformedClass {
            class: class.into(),
            reason: "could not decode class file".to_string(),
            source: Some(source),
        }
    }

    /// Classifies a descriptor failure: a type code outside the grammar is
    /// unsupported, anything else means the class is corrupt.
    pub(crate) fn descriptor(class: &str, method: &str, descriptor: &str, error: DescriptorError) -> Self {
        match error {
            DescriptorError::UnknownTypeCode(code) => Self::UnsupportedDescriptor {
                class: class.to_string(),
                method: method.to_string(),
                descriptor: descriptor.to_string(),
                code,
            },
            error => Self::malformed(
                class,
                format!("method {}: bad descriptor {}: {}", method, descriptor, error),
            ),
        }
    }

    /// The class this error concerns.
    pub fn class(&self) -> &str {
        match self {
            Self::MalformedClass { class, .. }
            | Self::UnsupportedDescriptor { class, .. }
            | Self::AmbiguousNativeSignature { class, .. }
            | Self::Unresolved { class, .. }
            | Self::Cancelled { class } => class,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
