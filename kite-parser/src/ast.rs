//! Abstract syntax tree. Built once by the [`crate::parser::Parser`] and only read afterwards.

use std::fmt;

/// A type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Bool,
    String,
    /// Only valid as a return type.
    Void,
    /// A user defined class, referred to by name.
    Class(String),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Class(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// `true` for `or` and `and`.
    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::Or | BinOp::And)
    }

    /// `true` for `==` and `!=`, the only relations defined on `bool`.
    pub fn is_equality(self) -> bool {
        matches!(self, BinOp::Equals | BinOp::NotEquals)
    }

    /// `true` for `+ - * / %`.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Less => "<",
            BinOp::LessEquals => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEquals => ">=",
            BinOp::Equals => "==",
            BinOp::NotEquals => "!=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        };
        f.write_str(symbol)
    }
}

/// A call to a free function, a builtin or a class constructor (e.g. `foo(1, a)`).
#[derive(Debug, Clone, PartialEq)]
pub struct FnCall {
    pub ident: String,
    pub args: Vec<Expr>,
}

/// A call to a method on a named object (e.g. `obj.foo(1)`).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub object: String,
    pub call: FnCall,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(i32),
    BoolLit(bool),
    StringLit(String),
    /// A variable (e.g. `foo`).
    Variable(String),
    /// A property read (e.g. `obj.foo`).
    PropertyAccess { object: String, property: String },
    FnCall(FnCall),
    MethodCall(MethodCall),
    /// A binary expression (e.g. `1 + 1`).
    Binary {
        lhs: Box<Expr>,
        op: BinOp,
        rhs: Box<Expr>,
    },
    /// `not` applied to a primary expression.
    Not(Box<Expr>),
}

/// `Type ident;` or `Type ident = initializer;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclaration {
    pub ident: String,
    pub ty: Type,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDeclaration(VarDeclaration),
    Assignment {
        ident: String,
        value: Expr,
    },
    FnCall(FnCall),
    MethodCall(MethodCall),
    If {
        condition: Expr,
        then_block: Vec<Stmt>,
        else_block: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    Return(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Type,
    pub ident: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub ident: String,
    pub return_ty: Type,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    pub ident: String,
    /// Named after the class, with the class as return type.
    pub constructor: FunctionDefinition,
    pub methods: Vec<FunctionDefinition>,
    /// Initializers, when present, are int or bool literals.
    pub properties: Vec<VarDeclaration>,
}

/// Definitions are kept in source order, duplicates included. Rejecting them is up to the validator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<FunctionDefinition>,
    pub classes: Vec<ClassDefinition>,
}
