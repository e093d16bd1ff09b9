//! Top-level declarations: namespace, use, function, class-like, const.

use crate::php::ast::{
    ClassDecl, ClassMember, ClosureFlags, ConstDecl, FunctionDecl, Item, MethodDecl,
    NamespaceDecl, PropertyDecl, Stmt, UseDecl, UseEntry,
};
use crate::php::error::PhpError;
use crate::php::lexer::TokenKind;

use super::Parser;

impl<'src> Parser<'src> {
    pub(super) fn parse_item(&mut self) -> Result<Item, PhpError> {
        if self.at_keyword("namespace")? {
            return self.parse_namespace();
        }
        if self.at_keyword("use")? {
            return self.parse_use();
        }
        if self.at_keyword("const")? {
            return Ok(Item::Const(self.parse_const_decl()?));
        }
        if self.at_keyword("abstract")? || self.at_keyword("final")? {
            self.consume()?;
            return self.parse_class_like();
        }
        if self.at_keyword("class")? || self.at_keyword("interface")? || self.at_keyword("trait")? {
            return self.parse_class_like();
        }
        if self.at_keyword("function")? {
            return self.parse_function_or_closure_stmt();
        }
        Ok(Item::Stmt(self.parse_stmt()?))
    }

    fn parse_namespace(&mut self) -> Result<Item, PhpError> {
        let keyword = self.expect_keyword("namespace", "'namespace'")?;
        let name = self.parse_name()?;
        self.expect(TokenKind::Semicolon, "';' after namespace declaration")?;
        Ok(Item::Namespace(NamespaceDecl {
            name,
            line: keyword.line,
        }))
    }

    fn parse_use(&mut self) -> Result<Item, PhpError> {
        let keyword = self.expect_keyword("use", "'use'")?;
        // `use function`/`use const` imports resolve by the same alias rules.
        if self.at_keyword("function")? || self.at_keyword("const")? {
            self.consume()?;
        }
        let mut entries = Vec::new();
        loop {
            let path = self.parse_name()?;
            if self.eat(TokenKind::Backslash)? {
                // Group form: the path so far is a shared prefix.
                self.expect(TokenKind::LBrace, "'{' in group use")?;
                loop {
                    let member = self.parse_name()?;
                    let alias = self.parse_use_alias()?;
                    let mut full = path.clone();
                    full.segments.extend(member.segments.iter().cloned());
                    entries.push(UseEntry { path: full, alias });
                    if !self.eat(TokenKind::Comma)? {
                        break;
                    }
                    if self.check(TokenKind::RBrace)? {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "'}' closing group use")?;
            } else {
                let alias = self.parse_use_alias()?;
                entries.push(UseEntry { path, alias });
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::Semicolon, "';' after use statement")?;
        Ok(Item::Use(UseDecl {
            entries,
            line: keyword.line,
        }))
    }

    fn parse_use_alias(&mut self) -> Result<Option<String>, PhpError> {
        if self.eat_keyword("as")? {
            let alias = self.expect_identifier("alias after 'as'")?;
            Ok(Some(alias.lexeme))
        } else {
            Ok(None)
        }
    }

    fn parse_const_decl(&mut self) -> Result<ConstDecl, PhpError> {
        let keyword = self.expect_keyword("const", "'const'")?;
        let name = self.expect_identifier("constant name")?;
        self.expect(TokenKind::Eq, "'=' in const declaration")?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';' after const declaration")?;
        Ok(ConstDecl {
            name: name.lexeme,
            value,
            line: keyword.line,
        })
    }

    /// `function` at statement level is either a named declaration or a bare
    /// closure expression statement; the token after the optional `&` decides.
    fn parse_function_or_closure_stmt(&mut self) -> Result<Item, PhpError> {
        let keyword = self.expect_keyword("function", "'function'")?;
        let by_ref = self.eat(TokenKind::Amp)?;
        if self.check(TokenKind::Identifier)? {
            let name = self.expect_identifier("function name")?;
            let params = self.parse_params()?;
            let return_type = if self.eat(TokenKind::Colon)? {
                Some(self.parse_type_hint()?)
            } else {
                None
            };
            let body = self.parse_block()?;
            return Ok(Item::Function(FunctionDecl {
                name: name.lexeme,
                params,
                return_type,
                body,
                line: keyword.line,
            }));
        }
        let mut flags = ClosureFlags::empty();
        if by_ref {
            flags |= ClosureFlags::BY_REF;
        }
        let closure = self.parse_closure_tail(flags, keyword.line)?;
        self.expect(TokenKind::Semicolon, "';' after expression")?;
        Ok(Item::Stmt(Stmt::Expr(closure)))
    }

    fn parse_class_like(&mut self) -> Result<Item, PhpError> {
        let keyword = self.consume()?; // class | interface | trait
        let name = self.expect_identifier("type name")?;
        let mut parent = None;
        if self.eat_keyword("extends")? {
            parent = Some(self.parse_name()?);
        }
        if self.eat_keyword("implements")? {
            // Interface list has no bearing on export; parse and drop.
            loop {
                self.parse_name()?;
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::LBrace, "'{' opening class body")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace)? {
            members.push(self.parse_class_member()?);
        }
        self.expect(TokenKind::RBrace, "'}' closing class body")?;
        Ok(Item::Class(ClassDecl {
            name: name.lexeme,
            parent,
            members,
            line: keyword.line,
        }))
    }

    fn parse_class_member(&mut self) -> Result<ClassMember, PhpError> {
        let mut is_static = false;
        loop {
            if self.at_keyword("static")? {
                is_static = true;
                self.consume()?;
                continue;
            }
            if self.at_keyword("public")?
                || self.at_keyword("protected")?
                || self.at_keyword("private")?
                || self.at_keyword("final")?
                || self.at_keyword("abstract")?
                || self.at_keyword("readonly")?
            {
                self.consume()?;
                continue;
            }
            break;
        }

        if self.at_keyword("const")? {
            return Ok(ClassMember::Const(self.parse_const_decl()?));
        }
        if self.at_keyword("function")? {
            return Ok(ClassMember::Method(self.parse_method(is_static)?));
        }
        self.parse_property().map(ClassMember::Property)
    }

    fn parse_method(&mut self, is_static: bool) -> Result<MethodDecl, PhpError> {
        let keyword = self.expect_keyword("function", "'function'")?;
        self.eat(TokenKind::Amp)?;
        let name = self.expect_identifier("method name")?;
        let params = self.parse_params()?;
        let return_type = if self.eat(TokenKind::Colon)? {
            Some(self.parse_type_hint()?)
        } else {
            None
        };
        // Abstract and interface methods end at ';' with no body.
        let body = if self.check(TokenKind::Semicolon)? {
            self.consume()?;
            Vec::new()
        } else {
            self.parse_block()?
        };
        Ok(MethodDecl {
            name: name.lexeme,
            is_static,
            params,
            return_type,
            body,
            line: keyword.line,
        })
    }

    fn parse_property(&mut self) -> Result<PropertyDecl, PhpError> {
        // Optional property type hint.
        if !self.check(TokenKind::Variable)? {
            self.parse_type_hint()?;
        }
        let name = self.expect(TokenKind::Variable, "property variable")?;
        let default = if self.eat(TokenKind::Eq)? {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';' after property")?;
        Ok(PropertyDecl {
            name: name.lexeme,
            default,
            line: name.line,
        })
    }
}
