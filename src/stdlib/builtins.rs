//! Native Functions Registry
//!
//! Defines the functions every tinyjs program can call without declaring them.

use std::collections::HashMap;

use crate::types::TypeTag;

/// Native function signature
#[derive(Debug, Clone, PartialEq)]
pub struct NativeFunc {
    pub name: String,
    pub params: Vec<TypeTag>,
    pub ret_type: TypeTag,
}

/// Registry of all native functions
pub struct NativeRegistry {
    functions: HashMap<String, NativeFunc>,
}

impl NativeRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            functions: HashMap::new(),
        };
        registry.register_all();
        registry
    }

    fn register_all(&mut self) {
        // I/O
        self.register("print", vec![TypeTag::String], TypeTag::Void);
        self.register("println", vec![TypeTag::String], TypeTag::Void);
        self.register("input", vec![], TypeTag::String);

        // Conversion
        self.register("toNumber", vec![TypeTag::String], TypeTag::Number);

        // Collections
        self.register("length", vec![TypeTag::Any], TypeTag::Number);
        self.register("push", vec![TypeTag::Array, TypeTag::Any], TypeTag::Void);
        self.register("pop", vec![TypeTag::Array], TypeTag::Any);

        // Strings
        self.register("concat", vec![TypeTag::String, TypeTag::String], TypeTag::String);
    }

    fn register(&mut self, name: &str, params: Vec<TypeTag>, ret_type: TypeTag) {
        self.functions.insert(
            name.to_string(),
            NativeFunc {
                name: name.to_string(),
                params,
                ret_type,
            },
        );
    }

    /// All natives, in no particular order
    pub fn all(&self) -> impl Iterator<Item = &NativeFunc> {
        self.functions.values()
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
