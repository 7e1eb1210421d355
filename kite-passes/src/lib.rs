//! Semantic passes over the kite syntax tree.

pub mod scope;
pub mod validate;
pub mod validated;
