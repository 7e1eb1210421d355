//! Symbol tables of a program that passed validation.

use std::collections::HashMap;

use kite_parser::ast::{ClassDefinition, FunctionDefinition, VarDeclaration};
use kite_value::Builtins;

/// Functions (or methods) by name.
pub type FnTable<'a> = HashMap<&'a str, &'a FunctionDefinition>;

/// A registered class.
#[derive(Debug)]
pub struct ValidatedClass<'a> {
    pub def: &'a ClassDefinition,
    pub methods: FnTable<'a>,
    /// First declaration of every property, in source order.
    pub properties: Vec<&'a VarDeclaration>,
}

impl<'a> ValidatedClass<'a> {
    pub fn ident(&self) -> &'a str {
        &self.def.ident
    }

    pub fn constructor(&self) -> &'a FunctionDefinition {
        &self.def.constructor
    }

    pub fn property(&self, ident: &str) -> Option<&'a VarDeclaration> {
        self.properties.iter().copied().find(|p| p.ident == ident)
    }
}

/// A program whose symbols are all resolved. Borrows the syntax tree it was validated from.
pub struct ValidatedProgram<'a> {
    pub functions: FnTable<'a>,
    pub classes: HashMap<&'a str, ValidatedClass<'a>>,
    pub builtins: &'a Builtins,
}
