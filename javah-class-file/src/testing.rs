//! Assembles class file bytes for tests.
//!
//! Only the structures the decoder understands are supported; method bodies
//! are never emitted, which is fine for native and abstract methods and
//! irrelevant to the decoder for everything else.

use fnv::FnvHashMap;

use crate::item::{
    fields::FieldAccessFlags,
    file::{ClassAccessFlags, CLASS_MAGIC},
    methods::MethodAccessFlags,
};

/// Value of a `ConstantValue` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantSpec {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

/// Builder producing the bytes of a class file.
#[derive(Debug, Clone)]
pub struct ClassFileBuilder {
    pool: Vec<u8>,
    pool_slots: u16,
    utf8: FnvHashMap<String, u16>,
    classes: FnvHashMap<String, u16>,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    fields: Vec<u8>,
    field_count: u16,
    methods: Vec<u8>,
    method_count: u16,
    inner_classes: Vec<[u16; 4]>,
    attributes: Vec<(u16, Vec<u8>)>,
}

impl ClassFileBuilder {
    /// A public class named `name` (internal form) extending `java/lang/Object`.
    pub fn new(name: &str) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            pool_slots: 0,
            utf8: FnvHashMap::default(),
            classes: FnvHashMap::default(),
            access_flags: (ClassAccessFlags::ACC_PUBLIC | ClassAccessFlags::ACC_SUPER).bits(),
            this_class: 0,
            super_class: 0,
            fields: Vec::new(),
            field_count: 0,
            methods: Vec::new(),
            method_count: 0,
            inner_classes: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class(name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    fn next_slot(&mut self, width: u16) -> u16 {
        let index = self.pool_slots + 1;
        self.pool_slots += width;
        index
    }

    /// Interns a `Utf8` constant.
    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(&index) = self.utf8.get(value) {
            return index;
        }
        let encoded = encode_modified_utf8(value);
        let index = self.next_slot(1);
        self.pool.push(1);
        self.pool.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(&encoded);
        self.utf8.insert(value.to_string(), index);
        index
    }

    /// Interns a `Class` constant.
    pub fn class(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.classes.get(name) {
            return index;
        }
        let name_index = self.utf8(name);
        let index = self.next_slot(1);
        self.pool.push(7);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.classes.insert(name.to_string(), index);
        index
    }

    /// Adds a loadable constant and returns its index.
    pub fn constant(&mut self, value: &ConstantSpec) -> u16 {
        match value {
            ConstantSpec::Int(v) => {
                let index = self.next_slot(1);
                self.pool.push(3);
                self.pool.extend_from_slice(&v.to_be_bytes());
                index
            }
            ConstantSpec::Float(v) => {
                let index = self.next_slot(1);
                self.pool.push(4);
                self.pool.extend_from_slice(&v.to_bits().to_be_bytes());
                index
            }
            ConstantSpec::Long(v) => {
                let index = self.next_slot(2);
                self.pool.push(5);
                self.pool.extend_from_slice(&v.to_be_bytes());
                index
            }
            ConstantSpec::Double(v) => {
                let index = self.next_slot(2);
                self.pool.push(6);
                self.pool.extend_from_slice(&v.to_bits().to_be_bytes());
                index
            }
            ConstantSpec::String(v) => {
                let string_index = self.utf8(v);
                let index = self.next_slot(1);
                self.pool.push(8);
                self.pool.extend_from_slice(&string_index.to_be_bytes());
                index
            }
        }
    }

    /// Adds a `String` constant from raw UTF-16 units, which may include
    /// unpaired surrogates.
    pub fn string_constant_units(mut self, units: &[u16]) -> Self {
        let encoded = encode_utf16_units(units);
        let utf8_index = self.next_slot(1);
        self.pool.push(1);
        self.pool.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(&encoded);
        self.next_slot(1);
        self.pool.push(8);
        self.pool.extend_from_slice(&utf8_index.to_be_bytes());
        self
    }

    pub fn access_flags(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    /// Adds a method without a `Code` attribute.
    pub fn method(mut self, flags: u16, name: &str, descriptor: &str) -> Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.methods.extend_from_slice(&flags.to_be_bytes());
        self.methods.extend_from_slice(&name_index.to_be_bytes());
        self.methods.extend_from_slice(&descriptor_index.to_be_bytes());
        self.methods.extend_from_slice(&0u16.to_be_bytes());
        self.method_count += 1;
        self
    }

    /// Adds a `public native` instance method.
    pub fn native_method(self, name: &str, descriptor: &str) -> Self {
        let flags = MethodAccessFlags::ACC_PUBLIC | MethodAccessFlags::ACC_NATIVE;
        self.method(flags.bits(), name, descriptor)
    }

    /// Adds a `public static native` method.
    pub fn static_native_method(self, name: &str, descriptor: &str) -> Self {
        let flags = MethodAccessFlags::ACC_PUBLIC
            | MethodAccessFlags::ACC_STATIC
            | MethodAccessFlags::ACC_NATIVE;
        self.method(flags.bits(), name, descriptor)
    }

    /// Adds a field without attributes.
    pub fn field(mut self, flags: u16, name: &str, descriptor: &str) -> Self {
        self.push_field(flags, name, descriptor, None);
        self
    }

    /// Adds a `public static final` field carrying a `ConstantValue` attribute.
    pub fn constant_field(mut self, name: &str, descriptor: &str, value: ConstantSpec) -> Self {
        let flags = FieldAccessFlags::ACC_PUBLIC | FieldAccessFlags::ACC_STATIC | FieldAccessFlags::ACC_FINAL;
        let value_index = self.constant(&value);
        self.push_field(flags.bits(), name, descriptor, Some(value_index));
        self
    }

    fn push_field(&mut self, flags: u16, name: &str, descriptor: &str, constant: Option<u16>) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.fields.extend_from_slice(&flags.to_be_bytes());
        self.fields.extend_from_slice(&name_index.to_be_bytes());
        self.fields.extend_from_slice(&descriptor_index.to_be_bytes());
        match constant {
            Some(value_index) => {
                let attribute_name = self.utf8("ConstantValue");
                self.fields.extend_from_slice(&1u16.to_be_bytes());
                self.fields.extend_from_slice(&attribute_name.to_be_bytes());
                self.fields.extend_from_slice(&2u32.to_be_bytes());
                self.fields.extend_from_slice(&value_index.to_be_bytes());
            }
            None => self.fields.extend_from_slice(&0u16.to_be_bytes()),
        }
        self.field_count += 1;
    }

    /// Adds an entry to the class's `InnerClasses` attribute.
    pub fn inner_class(mut self, inner: &str, outer: Option<&str>, simple_name: Option<&str>, flags: u16) -> Self {
        let inner_index = self.class(inner);
        let outer_index = outer.map(|o| self.class(o)).unwrap_or(0);
        let name_index = simple_name.map(|n| self.utf8(n)).unwrap_or(0);
        self.inner_classes.push([inner_index, outer_index, name_index, flags]);
        self
    }

    /// Adds an `EnclosingMethod` attribute naming `class` as the enclosing class.
    pub fn enclosing_class(mut self, class: &str) -> Self {
        let class_index = self.class(class);
        let mut info = class_index.to_be_bytes().to_vec();
        info.extend_from_slice(&0u16.to_be_bytes());
        let name_index = self.utf8("EnclosingMethod");
        self.attributes.push((name_index, info));
        self
    }

    /// Adds an arbitrary class-level attribute.
    pub fn attribute(mut self, name: &str, info: Vec<u8>) -> Self {
        let name_index = self.utf8(name);
        self.attributes.push((name_index, info));
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        if !self.inner_classes.is_empty() {
            let mut info = (self.inner_classes.len() as u16).to_be_bytes().to_vec();
            for entry in &self.inner_classes {
                for value in entry {
                    info.extend_from_slice(&value.to_be_bytes());
                }
            }
            let name_index = self.utf8("InnerClasses");
            self.attributes.push((name_index, info));
        }

        let mut out = Vec::new();
        out.extend_from_slice(&CLASS_MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&52u16.to_be_bytes());
        out.extend_from_slice(&(self.pool_slots + 1).to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&self.field_count.to_be_bytes());
        out.extend_from_slice(&self.fields);
        out.extend_from_slice(&self.method_count.to_be_bytes());
        out.extend_from_slice(&self.methods);
        out.extend_from_slice(&(self.attributes.len() as u16).to_be_bytes());
        for (name_index, info) in &self.attributes {
            out.extend_from_slice(&name_index.to_be_bytes());
            out.extend_from_slice(&(info.len() as u32).to_be_bytes());
            out.extend_from_slice(info);
        }
        out
    }
}

/// Encodes a string in the class file's modified UTF-8.
pub fn encode_modified_utf8(value: &str) -> Vec<u8> {
    encode_utf16_units(&value.encode_utf16().collect::<Vec<_>>())
}

fn encode_utf16_units(units: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(units.len());
    for &unit in units {
        match unit {
            0x0001..=0x007f => out.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                out.push(0xc0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
            _ => {
                out.push(0xe0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3f) as u8);
                out.push(0x80 | (unit & 0x3f) as u8);
            }
        }
    }
    out
}
