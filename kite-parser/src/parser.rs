use crate::ast::*;
use crate::lexer::Token;
use kite_source::{Fatal, Source};
use logos::{Lexer, Logos};
use std::convert::TryFrom;
use std::mem;
use std::ops::Range;
use tracing::{debug, trace};

mod class;
mod expr;
mod stmt;

/// Every syntax error is fatal. It is recorded in the [`Source`] errors and returned as [`Fatal`].
pub type ParseResult<T> = Result<T, Fatal>;

pub struct Parser<'a> {
    /// Cached token for peeking.
    current_token: Token,
    /// Span of `current_token`.
    current_span: Range<usize>,
    lexer: Lexer<'a, Token>,
    /// Source code
    source: &'a Source<'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        let lexer = Token::lexer(source.content);
        let mut parser = Self {
            current_token: Token::Eof,
            current_span: 0..0,
            lexer,
            source,
        };
        parser.next(); // load the first token
        parser
    }
}

impl<'a> Parser<'a> {
    /// Parses a whole program: `program { (class | function)* }`.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect(Token::Program)?;
        self.expect(Token::OpenBrace)?;

        let mut program = Program::default();
        loop {
            match self.current_token {
                Token::Def => program.functions.push(self.parse_fn_definition()?),
                Token::Class => program.classes.push(self.parse_class_definition()?),
                _ => break,
            }
        }

        self.expect(Token::CloseBrace)?;
        self.expect(Token::Eof)?;

        debug!(
            functions = program.functions.len(),
            classes = program.classes.len(),
            "parsed program"
        );
        Ok(program)
    }

    /// Parses a type annotation. `void` is only accepted if `allow_void` is `true`.
    fn parse_type(&mut self, allow_void: bool) -> ParseResult<Type> {
        let ty = match &self.current_token {
            Token::IntType => Type::Int,
            Token::BoolType => Type::Bool,
            Token::StringType => Type::String,
            Token::VoidType if allow_void => Type::Void,
            Token::Identifier(ident) => Type::Class(ident.clone()),
            _ => return Err(self.unexpected("type")),
        };
        self.next();
        Ok(ty)
    }

    /// Parses an optionally negative int literal. The sign is folded into the value.
    fn parse_int_lit(&mut self) -> ParseResult<i32> {
        let negative = self.eat(Token::Minus);
        match self.current_token {
            Token::IntLit(magnitude) => {
                let value = if negative { -magnitude } else { magnitude };
                let value = i32::try_from(value).map_err(|_| {
                    self.fatal(format!(
                        "Integer overflow in number declaration {}",
                        self.position()
                    ))
                })?;
                self.next();
                Ok(value)
            }
            _ if negative => Err(self.fatal(format!(
                "Unable to parse 'int literal' expression {}",
                self.position()
            ))),
            _ => Err(self.unexpected("int literal")),
        }
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    fn next(&mut self) -> Token {
        let token = self.lexer.next().unwrap_or(Token::Eof);
        trace!(?token, "next token");
        self.current_span = match token {
            Token::Eof => self.source.content.len()..self.source.content.len(),
            _ => self.lexer.span(),
        };
        self.current_token = token.clone();
        token
    }

    /// Predicate that tests whether the next token has the same discriminant and eats the next token if yes as a side effect.
    fn eat(&mut self, tok: Token) -> bool {
        if mem::discriminant(&self.current_token) == mem::discriminant(&tok) {
            self.next(); // eat token
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token) -> ParseResult<()> {
        let expected = tok.to_string();
        if self.eat(tok) {
            Ok(())
        } else {
            Err(self.unexpected(&expected))
        }
    }

    /// Eats an identifier and returns its name.
    fn expect_ident(&mut self) -> ParseResult<String> {
        match &self.current_token {
            Token::Identifier(ident) => {
                let ident = ident.clone();
                self.next();
                Ok(ident)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// `[Line: l, Position: c]` of the current token.
    fn position(&self) -> String {
        let (line, column) = self.source.line_col(self.current_span.start);
        format!("[Line: {}, Position: {}]", line, column)
    }

    fn fatal(&self, message: String) -> Fatal {
        self.source.errors.fatal(message)
    }

    /// Raises an unexpected token error.
    fn unexpected(&self, expected: &str) -> Fatal {
        let message = match self.current_token {
            Token::Error => {
                let slice = &self.source.content[self.current_span.clone()];
                if !slice.is_empty() && slice.bytes().all(|b| b.is_ascii_digit()) {
                    format!("Integer overflow in number declaration {}", self.position())
                } else {
                    format!("Invalid token '{}' {}", slice, self.position())
                }
            }
            _ => format!(
                "Unexpected token {}, expected {} {}",
                self.current_token,
                expected,
                self.position()
            ),
        };
        self.fatal(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(source: &str) -> Program {
        let source = source.into();
        let program = Parser::new(&source).parse_program();
        assert!(source.has_no_errors(), "{}", source.errors);
        program.unwrap()
    }

    fn syntax_error(source: &str) -> String {
        let source = source.into();
        let result = Parser::new(&source).parse_program();
        let fatal = result.expect_err("expected a syntax error");
        assert_eq!(source.errors.errors(), vec![fatal.message().to_string()]);
        fatal.message().to_string()
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(program("program { }"), Program::default());
    }

    #[test]
    fn test_functions_keep_source_order() {
        let program = program(
            "program { def void Main() { } def int Foo(int a, Bar b) { return a; } def void Main() { } }",
        );
        let idents: Vec<_> = program.functions.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, vec!["Main", "Foo", "Main"]);

        let foo = &program.functions[1];
        assert_eq!(foo.return_ty, Type::Int);
        assert_eq!(
            foo.params,
            vec![
                Param {
                    ty: Type::Int,
                    ident: "a".to_string()
                },
                Param {
                    ty: Type::Class("Bar".to_string()),
                    ident: "b".to_string()
                },
            ]
        );
        assert_eq!(
            foo.body,
            vec![Stmt::Return(Some(Expr::Variable("a".to_string())))]
        );
    }

    #[test]
    fn test_missing_program_keyword() {
        assert_eq!(
            syntax_error("{ }"),
            "Unexpected token '{', expected 'program' [Line: 1, Position: 1]"
        );
    }

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(
            syntax_error("program {\n  def void Main() {\n    int a = 1\n  }\n}"),
            "Unexpected token '}', expected ';' [Line: 4, Position: 3]"
        );
    }

    #[test]
    fn test_trailing_tokens() {
        assert_eq!(
            syntax_error("program { } }"),
            "Unexpected token '}', expected end of file [Line: 1, Position: 13]"
        );
    }

    #[test]
    fn test_invalid_token() {
        assert_eq!(
            syntax_error("program { def void Main() { int a = 1 @ 2; } }"),
            "Invalid token '@' [Line: 1, Position: 39]"
        );
    }

    #[test]
    fn test_int_literal_overflow() {
        assert_eq!(
            syntax_error("program { def void Main() { int a = 2147483648; } }"),
            "Integer overflow in number declaration [Line: 1, Position: 37]"
        );
        assert_eq!(
            syntax_error("program { def void Main() { int a = 99999999999999999999; } }"),
            "Integer overflow in number declaration [Line: 1, Position: 37]"
        );
    }

    #[test]
    fn test_int_literal_min_value() {
        let program = program("program { def void Main() { int a = -2147483648; } }");
        assert_eq!(
            program.functions[0].body,
            vec![Stmt::VarDeclaration(VarDeclaration {
                ident: "a".to_string(),
                ty: Type::Int,
                initializer: Some(Expr::IntLit(i32::MIN)),
            })]
        );
    }

    #[test]
    fn test_void_parameter_is_rejected() {
        assert_eq!(
            syntax_error("program { def void Main(void a) { } }"),
            "Unexpected token 'void', expected type [Line: 1, Position: 25]"
        );
    }
}
