use std::collections::HashMap;

use kite_passes::validated::ValidatedClass;
use kite_value::Value;

/// Variables of one function, constructor or method invocation.
///
/// Blocks push a frame on entry and pop it on exit, so variables declared in a block vanish with it while
/// assignments to variables of enclosing blocks persist.
pub struct Environment<'p, 'a> {
    frames: Vec<HashMap<String, Value>>,
    /// Class whose constructor or method is running. Its methods are callable as plain functions.
    pub class: Option<&'p ValidatedClass<'a>>,
}

impl<'p, 'a> Environment<'p, 'a> {
    pub fn new(class: Option<&'p ValidatedClass<'a>>) -> Self {
        Self {
            frames: vec![HashMap::new()],
            class,
        }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        debug_assert!(self.frames.len() > 1, "cannot exit the invocation scope");
        self.frames.pop();
    }

    /// Binds `ident` in the innermost frame.
    pub fn declare(&mut self, ident: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(ident.to_string(), value);
        }
    }

    pub fn get(&self, ident: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(ident))
    }

    pub fn get_mut(&mut self, ident: &str) -> Option<&mut Value> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(ident))
    }

    /// Overwrites the innermost binding of `ident`. Returns `false` if there is none.
    pub fn assign(&mut self, ident: &str, value: Value) -> bool {
        match self.get_mut(ident) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Removes `ident` from the invocation frame and returns its value.
    pub fn take(&mut self, ident: &str) -> Option<Value> {
        self.frames.first_mut().and_then(|frame| frame.remove(ident))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_variables_vanish() {
        let mut env = Environment::new(None);
        env.declare("a", Value::Int(1));

        env.enter_scope();
        env.declare("b", Value::Int(2));
        assert!(env.assign("a", Value::Int(3)));
        assert_eq!(env.get("b"), Some(&Value::Int(2)));
        env.exit_scope();

        assert_eq!(env.get("a"), Some(&Value::Int(3)));
        assert_eq!(env.get("b"), None);
        assert!(!env.assign("b", Value::Int(4)));
    }

    #[test]
    fn test_take() {
        let mut env = Environment::new(None);
        env.declare("a", Value::Bool(true));
        assert_eq!(env.take("a"), Some(Value::Bool(true)));
        assert_eq!(env.take("a"), None);
    }
}
