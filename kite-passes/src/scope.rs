//! Lexical scopes used while validating function bodies.

use std::collections::{HashMap, HashSet};

use kite_parser::ast::Type;

use crate::validated::FnTable;

/// A local variable, parameter or property visible in a body.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub ty: Type,
    pub initialized: bool,
}

#[derive(Debug, Default)]
struct Frame {
    declared: HashMap<String, Variable>,
    /// Variables of enclosing frames that were initialized inside this frame.
    /// Dropped with the frame, so the enclosing frames do not see the initialization.
    initialized: HashSet<String>,
}

/// The bindings visible at a point of a function, constructor or method body.
///
/// Every block (`if`, `else`, `while`) opens a frame with [`Self::enter_scope`].
/// Declarations made inside a frame vanish with it.
pub struct ScopeContext<'s, 'a> {
    frames: Vec<Frame>,
    /// Methods of the enclosing class, callable as plain functions. `None` in free functions.
    pub methods: Option<&'s FnTable<'a>>,
    /// Declared return type of the enclosing body.
    pub return_ty: Type,
}

impl<'s, 'a> ScopeContext<'s, 'a> {
    pub fn new(return_ty: Type, methods: Option<&'s FnTable<'a>>) -> Self {
        Self {
            frames: vec![Frame::default()],
            methods,
            return_ty,
        }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn exit_scope(&mut self) {
        debug_assert!(self.frames.len() > 1, "cannot exit the body scope");
        self.frames.pop();
    }

    /// Declares a variable in the innermost frame.
    /// Returns `false` if a variable with the same name is visible already.
    pub fn declare(&mut self, ident: &str, ty: Type, initialized: bool) -> bool {
        if self.get(ident).is_some() {
            return false;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame
                .declared
                .insert(ident.to_string(), Variable { ty, initialized });
        }
        true
    }

    /// Looks up a visible variable.
    /// The result is initialized if it was declared initialized or assigned in this frame or any frame in between.
    pub fn get(&self, ident: &str) -> Option<Variable> {
        let mut initialized = false;
        for frame in self.frames.iter().rev() {
            initialized |= frame.initialized.contains(ident);
            if let Some(variable) = frame.declared.get(ident) {
                return Some(Variable {
                    ty: variable.ty.clone(),
                    initialized: initialized || variable.initialized,
                });
            }
        }
        None
    }

    /// Marks a visible variable as initialized until the innermost frame is exited.
    pub fn mark_initialized(&mut self, ident: &str) {
        let frame = match self.frames.last_mut() {
            Some(frame) => frame,
            None => return,
        };
        match frame.declared.get_mut(ident) {
            Some(variable) => variable.initialized = true,
            None => {
                frame.initialized.insert(ident.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> ScopeContext<'static, 'static> {
        ScopeContext::new(Type::Void, None)
    }

    #[test]
    fn test_declare_and_get() {
        let mut scope = scope();
        assert!(scope.declare("a", Type::Int, false));
        assert_eq!(
            scope.get("a"),
            Some(Variable {
                ty: Type::Int,
                initialized: false
            })
        );
        assert_eq!(scope.get("b"), None);
    }

    #[test]
    fn test_redeclaration_across_frames() {
        let mut scope = scope();
        assert!(scope.declare("a", Type::Int, true));
        assert!(!scope.declare("a", Type::Bool, true));

        scope.enter_scope();
        assert!(!scope.declare("a", Type::Bool, true));
        assert!(scope.declare("b", Type::Bool, true));
        scope.exit_scope();

        // `b` vanished with its frame
        assert_eq!(scope.get("b"), None);
        assert!(scope.declare("b", Type::Int, true));
    }

    #[test]
    fn test_initialization_in_block_does_not_leak() {
        let mut scope = scope();
        scope.declare("a", Type::Int, false);

        scope.enter_scope();
        scope.mark_initialized("a");
        assert!(scope.get("a").unwrap().initialized);

        scope.enter_scope();
        assert!(scope.get("a").unwrap().initialized);
        scope.exit_scope();

        scope.exit_scope();
        assert!(!scope.get("a").unwrap().initialized);

        scope.mark_initialized("a");
        assert!(scope.get("a").unwrap().initialized);
    }
}
