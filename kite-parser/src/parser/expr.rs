use super::*;

impl<'a> Parser<'a> {
    /* Expressions */
    /// Parses any expression.
    /// This is equivalent to calling [`Self::parse_expr_bp`] with `min_bp = 0`.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_expr_bp(0) // 0 to accept any expression
    }

    /// Parses an expression with the specified `min_bp`.
    /// To parse any expression use, [`Self::parse_expr`].
    fn parse_expr_bp(&mut self, min_bp: u8) -> ParseResult<Expr> {
        let mut lhs = self.parse_unary_expr()?;

        loop {
            let (l_bp, r_bp) = match self.current_token.binop_bp() {
                Some(bp) => bp,
                None => break, // not a valid binop, stop parsing
            };
            if l_bp < min_bp {
                break; // less than the min_bp, stop parsing
            }

            // self.current_token is a valid binop
            let op = match self.current_token.binop() {
                Some(op) => op,
                None => break,
            };
            self.next();

            let rhs = self.parse_expr_bp(r_bp)?;

            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            }
        }

        Ok(lhs)
    }

    /// Parses an optional `not` followed by a primary expression.
    fn parse_unary_expr(&mut self) -> ParseResult<Expr> {
        if self.eat(Token::Not) {
            Ok(Expr::Not(Box::new(self.parse_primary_expr()?)))
        } else {
            self.parse_primary_expr()
        }
    }

    /// Parses a primary (atom) expression.
    fn parse_primary_expr(&mut self) -> ParseResult<Expr> {
        match self.current_token {
            // NOTE: a leading minus is only allowed directly before an int literal
            Token::IntLit(_) | Token::Minus => Ok(Expr::IntLit(self.parse_int_lit()?)),
            Token::BoolLit(_) | Token::StringLit(_) => self.parse_literal_expr(),
            Token::OpenParen => {
                self.next();
                let expr = self.parse_expr()?;
                self.expect(Token::CloseParen)?;
                Ok(expr)
            }
            Token::Identifier(_) => self.parse_identifier_led_expr(),
            _ => Err(self.unexpected("expression")),
        }
    }

    /* Expressions.Literals */
    /// Parses a bool or string literal expression.
    fn parse_literal_expr(&mut self) -> ParseResult<Expr> {
        let val = match &self.current_token {
            Token::BoolLit(val) => Expr::BoolLit(*val),
            Token::StringLit(val) => Expr::StringLit(val.clone()),
            _ => return Err(self.unexpected("literal")),
        };
        self.next(); // eat parsed token
        Ok(val)
    }

    /* Expressions.Identifier */
    /// Parses a variable, a property access, a function call or a method call.
    /// The form is decided by the token that follows the identifier.
    fn parse_identifier_led_expr(&mut self) -> ParseResult<Expr> {
        let ident = self.expect_ident()?;

        match self.current_token {
            Token::OpenParen => {
                let args = self.parse_args()?;
                Ok(Expr::FnCall(FnCall { ident, args }))
            }
            Token::Dot => {
                self.next();
                let member = self.expect_ident()?;
                if let Token::OpenParen = self.current_token {
                    let args = self.parse_args()?;
                    Ok(Expr::MethodCall(MethodCall {
                        object: ident,
                        call: FnCall {
                            ident: member,
                            args,
                        },
                    }))
                } else {
                    Ok(Expr::PropertyAccess {
                        object: ident,
                        property: member,
                    })
                }
            }
            _ => Ok(Expr::Variable(ident)),
        }
    }

    /// Parses a parenthesized, comma separated argument list.
    pub(super) fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(Token::OpenParen)?;

        let mut args = Vec::new();
        if !self.eat(Token::CloseParen) {
            loop {
                args.push(self.parse_expr()?);

                if self.eat(Token::CloseParen) {
                    break;
                } else if !self.eat(Token::Comma) {
                    return Err(self.unexpected("',' or ')'"));
                }
            }
        }

        Ok(args)
    }
}
