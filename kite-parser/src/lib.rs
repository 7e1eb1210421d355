//! Tokenizer, syntax tree and recursive-descent parser for kite programs.

pub mod ast;
pub mod lexer;
pub mod parser;
