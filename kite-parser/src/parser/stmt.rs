use super::*;

impl<'a> Parser<'a> {
    /// Parses a function definition: `def Type Name(params) { ... }`.
    /// Methods share this grammar.
    pub(super) fn parse_fn_definition(&mut self) -> ParseResult<FunctionDefinition> {
        self.expect(Token::Def)?;
        let return_ty = self.parse_type(true)?;
        let ident = self.expect_ident()?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;

        trace!(%ident, params = params.len(), "parsed function definition");
        Ok(FunctionDefinition {
            ident,
            return_ty,
            params,
            body,
        })
    }

    /// Parses a parenthesized parameter list: `(Type name, Type name)`.
    pub(super) fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(Token::OpenParen)?;

        let mut params = Vec::new();
        if !self.eat(Token::CloseParen) {
            loop {
                let ty = self.parse_type(false)?;
                let ident = self.expect_ident()?;
                params.push(Param { ty, ident });

                if self.eat(Token::CloseParen) {
                    break;
                } else if !self.eat(Token::Comma) {
                    return Err(self.unexpected("',' or ')'"));
                }
            }
        }

        Ok(params)
    }

    /// Parses `{ stmt* }`.
    pub fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(Token::OpenBrace)?;

        let mut body = Vec::new();
        while !self.eat(Token::CloseBrace) {
            body.push(self.parse_stmt()?);
        }

        Ok(body)
    }

    /// Parses a statement.
    pub fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current_token {
            Token::If => self.parse_if_stmt(),
            Token::While => self.parse_while_stmt(),
            Token::Return => self.parse_return_stmt(),
            Token::IntType | Token::BoolType | Token::StringType => {
                let ty = self.parse_type(false)?;
                Ok(Stmt::VarDeclaration(self.parse_var_declaration(ty)?))
            }
            Token::Identifier(_) => self.parse_identifier_led_stmt(),
            _ => Err(self.unexpected("statement")),
        }
    }

    /// Parses the part of a variable declaration after its type: `name;` or `name = expr;`.
    fn parse_var_declaration(&mut self, ty: Type) -> ParseResult<VarDeclaration> {
        let ident = self.expect_ident()?;
        let initializer = if self.eat(Token::Equals) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(Token::Semi)?;
        Ok(VarDeclaration {
            ident,
            ty,
            initializer,
        })
    }

    /// Parses a statement starting with an identifier.
    /// The form is decided by the token that follows the identifier:
    /// * another identifier - declaration of a variable with a class type
    /// * `=` - assignment
    /// * `(` - function call
    /// * `.` - method call
    fn parse_identifier_led_stmt(&mut self) -> ParseResult<Stmt> {
        let ident = self.expect_ident()?;

        match self.current_token {
            Token::Identifier(_) => Ok(Stmt::VarDeclaration(
                self.parse_var_declaration(Type::Class(ident))?,
            )),
            Token::Equals => {
                self.next();
                let value = self.parse_expr()?;
                self.expect(Token::Semi)?;
                Ok(Stmt::Assignment { ident, value })
            }
            Token::OpenParen => {
                let args = self.parse_args()?;
                self.expect(Token::Semi)?;
                Ok(Stmt::FnCall(FnCall { ident, args }))
            }
            Token::Dot => {
                self.next();
                let method = self.expect_ident()?;
                let args = self.parse_args()?;
                self.expect(Token::Semi)?;
                Ok(Stmt::MethodCall(MethodCall {
                    object: ident,
                    call: FnCall {
                        ident: method,
                        args,
                    },
                }))
            }
            _ => Err(self.unexpected("declaration, assignment or call")),
        }
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::If)?;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat(Token::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_block,
            else_block,
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::While)?;
        let condition = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { condition, body })
    }

    /// Parses `( expr )`.
    fn parse_condition(&mut self) -> ParseResult<Expr> {
        self.expect(Token::OpenParen)?;
        let condition = self.parse_expr()?;
        self.expect(Token::CloseParen)?;
        Ok(condition)
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Return)?;
        if self.eat(Token::Semi) {
            return Ok(Stmt::Return(None));
        }
        let expr = self.parse_expr()?;
        self.expect(Token::Semi)?;
        Ok(Stmt::Return(Some(expr)))
    }
}
