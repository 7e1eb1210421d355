use crate::ast::BinOp;
use logos::{Lexer, Logos};
use std::fmt;

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    /// Magnitude only. A leading `-` is folded in by the parser.
    #[regex(r"[0-9]+", |lex| lex.slice().parse())]
    IntLit(i64),
    #[regex(r"true|false", |lex| lex.slice() == "true")]
    BoolLit(bool),
    #[regex(r#""([^"\\]|\\.)*""#, string_lit)]
    StringLit(String),

    // identifiers
    #[regex("[a-zA-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // binary operators
    // - arithmetics
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: also folded into negative int literals
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    // - assignment
    #[token("=")]
    Equals,
    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - ordering
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,
    // - logical
    #[token("and")]
    And,
    #[token("or")]
    Or,

    // unary operators
    #[token("not")]
    Not,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,

    // keywords
    #[token("program")]
    Program,
    #[token("class")]
    Class,
    #[token("def")]
    Def,
    #[token("init")]
    Init,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    // - types
    #[token("int")]
    IntType,
    #[token("bool")]
    BoolType,
    #[token("string")]
    StringType,
    #[token("void")]
    VoidType,

    // misc
    #[regex(r"[ \t\n\r\f]+", logos::skip)]
    #[regex(r"#[^\n]*", logos::skip)] // single line comments
    #[error]
    Error,

    /// Only generated in parse phase when `lexer.next()` returns `None`.
    Eof,
}

/// Unescapes the body of a string literal. Returns `None` on an unknown escape sequence.
fn string_lit(lex: &mut Lexer<Token>) -> Option<String> {
    let slice = lex.slice();
    let body = &slice[1..slice.len() - 1];

    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => value.push('\\'),
            'n' => value.push('\n'),
            '"' => value.push('"'),
            't' => value.push('\t'),
            _ => return None,
        }
    }
    Some(value)
}

impl Token {
    /// Returns the binary binding power or `None` if invalid binop token.
    /// Binding power `0` and `1` is reserved for accepting any expression.
    /// Every binary operator is left associative.
    pub fn binop_bp(&self) -> Option<(u8, u8)> {
        match self {
            /* Logical */
            Token::Or => Some((2, 3)),
            Token::And => Some((4, 5)),
            /* Relational */
            Token::EqualsEquals
            | Token::NotEquals
            | Token::GreaterThan
            | Token::GreaterThanEquals
            | Token::LessThan
            | Token::LessThanEquals => Some((6, 7)),
            /* Additive */
            Token::Plus | Token::Minus => Some((8, 9)),
            /* Multiplicative */
            Token::Asterisk | Token::Slash | Token::Percent => Some((10, 11)),
            _ => None,
        }
    }

    /// Returns the [`BinOp`] represented by this token or `None` if invalid binop token.
    pub fn binop(&self) -> Option<BinOp> {
        Some(match self {
            Token::Or => BinOp::Or,
            Token::And => BinOp::And,
            Token::EqualsEquals => BinOp::Equals,
            Token::NotEquals => BinOp::NotEquals,
            Token::GreaterThan => BinOp::Greater,
            Token::GreaterThanEquals => BinOp::GreaterEquals,
            Token::LessThan => BinOp::Less,
            Token::LessThanEquals => BinOp::LessEquals,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Sub,
            Token::Asterisk => BinOp::Mul,
            Token::Slash => BinOp::Div,
            Token::Percent => BinOp::Mod,
            _ => return None,
        })
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Token::IntLit(val) => return write!(f, "int literal '{}'", val),
            Token::BoolLit(val) => return write!(f, "bool literal '{}'", val),
            Token::StringLit(val) => return write!(f, "string literal {:?}", val),
            Token::Identifier(ident) => return write!(f, "identifier '{}'", ident),
            Token::Error => return write!(f, "invalid token"),
            Token::Eof => return write!(f, "end of file"),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Asterisk => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Equals => "=",
            Token::EqualsEquals => "==",
            Token::NotEquals => "!=",
            Token::GreaterThan => ">",
            Token::GreaterThanEquals => ">=",
            Token::LessThan => "<",
            Token::LessThanEquals => "<=",
            Token::And => "and",
            Token::Or => "or",
            Token::Not => "not",
            Token::OpenParen => "(",
            Token::CloseParen => ")",
            Token::OpenBrace => "{",
            Token::CloseBrace => "}",
            Token::Comma => ",",
            Token::Semi => ";",
            Token::Dot => ".",
            Token::Program => "program",
            Token::Class => "class",
            Token::Def => "def",
            Token::Init => "init",
            Token::If => "if",
            Token::Else => "else",
            Token::While => "while",
            Token::Return => "return",
            Token::IntType => "int",
            Token::BoolType => "bool",
            Token::StringType => "string",
            Token::VoidType => "void",
        };
        write!(f, "'{}'", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Token::lexer(source).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            lex("program class def init initial int integer"),
            vec![
                Token::Program,
                Token::Class,
                Token::Def,
                Token::Init,
                Token::Identifier("initial".to_string()),
                Token::IntType,
                Token::Identifier("integer".to_string()),
            ]
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            lex(r#"42 true false "a\"b\n""#),
            vec![
                Token::IntLit(42),
                Token::BoolLit(true),
                Token::BoolLit(false),
                Token::StringLit("a\"b\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_escape() {
        assert_eq!(lex(r#""a\qb""#), vec![Token::Error]);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex("= == != < <= > >= + - * / % ."),
            vec![
                Token::Equals,
                Token::EqualsEquals,
                Token::NotEquals,
                Token::LessThan,
                Token::LessThanEquals,
                Token::GreaterThan,
                Token::GreaterThanEquals,
                Token::Plus,
                Token::Minus,
                Token::Asterisk,
                Token::Slash,
                Token::Percent,
                Token::Dot,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("int a; # a comment\nbool b;"),
            vec![
                Token::IntType,
                Token::Identifier("a".to_string()),
                Token::Semi,
                Token::BoolType,
                Token::Identifier("b".to_string()),
                Token::Semi,
            ]
        );
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(lex("@"), vec![Token::Error]);
    }
}
