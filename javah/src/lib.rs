//! Native method header generator.
//!
//! Turns decoded class files into C headers declaring the JNI entry point of
//! every `native` method, in the layout of the JDK's former `javah` tool.
//! Stages run strictly forward and never perform I/O:
//!
//! 1. [`reader`] adapts a decoded [`ClassFile`](javah_class_file::ClassFile) into a [`ClassInfo`],
//! 2. [`select`] groups the native methods by name,
//! 3. [`descriptor`] maps method descriptors onto JNI types,
//! 4. [`mangle`] derives the exported symbol names,
//! 5. [`render`] produces a [`HeaderUnit`],
//! 6. [`pipeline`] runs all of the above over many classes in parallel.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod mangle;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod render;
pub mod select;

pub use config::{ErrorPolicy, GeneratorConfig, JniAbi};
pub use error::{Error, Result};
pub use model::{ClassInfo, ConstantField, ConstantValue, MethodInfo};
pub use pipeline::{analyze_class, analyze_class_file, CancellationToken, ClassResolver, Pipeline, Report};
pub use render::{render_combined, HeaderUnit, Prototype};
