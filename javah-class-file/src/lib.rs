//! Class file decoder.
//!
//! Reads the parts of a class file the header generator needs into an
//! easily usable data structure: the constant pool, access flags, the field
//! and method tables, and the nesting and constant-value attributes. Every
//! other attribute is kept as opaque bytes.

pub mod item;
pub mod stream;
pub mod error;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use item::file::ClassFile;
pub use error::ClassFileError;
