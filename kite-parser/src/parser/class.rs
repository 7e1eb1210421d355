use super::*;

impl<'a> Parser<'a> {
    /// Parses a class definition:
    /// `class Name { def init(params) { ... } (method | property)* }`.
    /// The constructor is mandatory and always comes first.
    pub(super) fn parse_class_definition(&mut self) -> ParseResult<ClassDefinition> {
        self.expect(Token::Class)?;
        let ident = self.expect_ident()?;
        self.expect(Token::OpenBrace)?;

        self.expect(Token::Def)?;
        self.expect(Token::Init)?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let constructor = FunctionDefinition {
            ident: ident.clone(),
            return_ty: Type::Class(ident.clone()),
            params,
            body,
        };

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        loop {
            match self.current_token {
                Token::Def => methods.push(self.parse_fn_definition()?),
                Token::IntType | Token::BoolType | Token::StringType | Token::Identifier(_) => {
                    properties.push(self.parse_property()?)
                }
                _ => break,
            }
        }
        self.expect(Token::CloseBrace)?;

        trace!(
            %ident,
            methods = methods.len(),
            properties = properties.len(),
            "parsed class definition"
        );
        Ok(ClassDefinition {
            ident,
            constructor,
            methods,
            properties,
        })
    }

    /// Parses `Type name;` or `Type name = literal;` where literal is an int or bool literal.
    fn parse_property(&mut self) -> ParseResult<VarDeclaration> {
        let ty = self.parse_type(false)?;
        let ident = self.expect_ident()?;

        let initializer = if self.eat(Token::Equals) {
            let literal = match self.current_token {
                Token::IntLit(_) | Token::Minus => Expr::IntLit(self.parse_int_lit()?),
                Token::BoolLit(val) => {
                    self.next();
                    Expr::BoolLit(val)
                }
                _ => {
                    return Err(self.fatal(format!(
                        "Unable to initialize property with type '{}' in declaration {}",
                        ty,
                        self.position()
                    )))
                }
            };
            Some(literal)
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;

    fn class(source: &str) -> ClassDefinition {
        let source = source.into();
        let ast = Parser::new(&source).parse_class_definition();
        assert!(source.has_no_errors(), "{}", source.errors);
        ast.unwrap()
    }

    fn error(source: &str) -> String {
        let source = source.into();
        let result = Parser::new(&source).parse_class_definition();
        result.expect_err("expected a syntax error").message().to_string()
    }

    #[test]
    fn test_constructor_only() {
        assert_debug_snapshot!(class("class A { def init() { } }"), @r###"
        ClassDefinition {
            ident: "A",
            constructor: FunctionDefinition {
                ident: "A",
                return_ty: Class(
                    "A",
                ),
                params: [],
                body: [],
            },
            methods: [],
            properties: [],
        }
        "###);
    }

    #[test]
    fn test_methods_and_properties() {
        let class = class(
            "class Point {
                def init(int x) { X = x; }
                int X;
                def int GetX() { return X; }
                bool Visible = true;
                int Y = -4;
                Point Next;
                def void Hide() { Visible = false; }
            }",
        );
        let methods: Vec<_> = class.methods.iter().map(|m| m.ident.as_str()).collect();
        assert_eq!(methods, vec!["GetX", "Hide"]);
        assert_eq!(
            class.properties,
            vec![
                VarDeclaration {
                    ident: "X".to_string(),
                    ty: Type::Int,
                    initializer: None,
                },
                VarDeclaration {
                    ident: "Visible".to_string(),
                    ty: Type::Bool,
                    initializer: Some(Expr::BoolLit(true)),
                },
                VarDeclaration {
                    ident: "Y".to_string(),
                    ty: Type::Int,
                    initializer: Some(Expr::IntLit(-4)),
                },
                VarDeclaration {
                    ident: "Next".to_string(),
                    ty: Type::Class("Point".to_string()),
                    initializer: None,
                },
            ]
        );
        assert_eq!(
            class.constructor.params,
            vec![Param {
                ty: Type::Int,
                ident: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_constructor() {
        assert_eq!(
            error("class A { int X; }"),
            "Unexpected token 'int', expected 'def' [Line: 1, Position: 11]"
        );
        assert_eq!(
            error("class A { def void Foo() { } }"),
            "Unexpected token 'void', expected 'init' [Line: 1, Position: 15]"
        );
    }

    #[test]
    fn test_non_literal_property_initializer() {
        assert_eq!(
            error("class A { def init() { } int X = 1 + 2; }"),
            "Unexpected token '+', expected ';' [Line: 1, Position: 36]"
        );
        assert_eq!(
            error(r#"class A { def init() { } string S = "s"; }"#),
            "Unable to initialize property with type 'string' in declaration [Line: 1, Position: 37]"
        );
        assert_eq!(
            error("class A { def init() { } int X = y; }"),
            "Unable to initialize property with type 'int' in declaration [Line: 1, Position: 34]"
        );
    }
}
