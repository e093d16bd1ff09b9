//! Statement forms allowed inside function and closure bodies.

use crate::php::ast::Stmt;
use crate::php::error::PhpError;
use crate::php::lexer::TokenKind;

use super::Parser;

impl<'src> Parser<'src> {
    pub(super) fn parse_stmt(&mut self) -> Result<Stmt, PhpError> {
        if self.at_keyword("return")? {
            self.consume()?;
            if self.eat(TokenKind::Semicolon)? {
                return Ok(Stmt::Return(None));
            }
            let value = self.parse_expr()?;
            self.expect(TokenKind::Semicolon, "';' after return value")?;
            return Ok(Stmt::Return(Some(value)));
        }
        if self.at_keyword("if")? {
            return self.parse_if();
        }
        if self.at_keyword("while")? {
            self.consume()?;
            self.expect(TokenKind::LParen, "'(' after 'while'")?;
            let cond = self.parse_expr()?;
            self.expect(TokenKind::RParen, "')' after while condition")?;
            let body = self.parse_body()?;
            return Ok(Stmt::While { cond, body });
        }
        if self.at_keyword("foreach")? {
            return self.parse_foreach();
        }
        if self.at_keyword("echo")? {
            self.consume()?;
            let mut values = vec![self.parse_expr()?];
            while self.eat(TokenKind::Comma)? {
                values.push(self.parse_expr()?);
            }
            self.expect(TokenKind::Semicolon, "';' after echo")?;
            return Ok(Stmt::Echo(values));
        }
        if self.at_keyword("break")? {
            self.consume()?;
            self.expect(TokenKind::Semicolon, "';' after break")?;
            return Ok(Stmt::Break);
        }
        if self.at_keyword("continue")? {
            self.consume()?;
            self.expect(TokenKind::Semicolon, "';' after continue")?;
            return Ok(Stmt::Continue);
        }
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::Expr(expr))
    }

    /// `{ ... }` block required, e.g. after a function header.
    pub(super) fn parse_block(&mut self) -> Result<Vec<Stmt>, PhpError> {
        self.expect(TokenKind::LBrace, "'{' opening block")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace)? {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace, "'}' closing block")?;
        Ok(stmts)
    }

    /// Control-flow body: a block, or a single statement.
    fn parse_body(&mut self) -> Result<Vec<Stmt>, PhpError> {
        if self.check(TokenKind::LBrace)? {
            self.parse_block()
        } else {
            Ok(vec![self.parse_stmt()?])
        }
    }

    fn parse_if(&mut self) -> Result<Stmt, PhpError> {
        self.expect_keyword("if", "'if'")?;
        self.expect(TokenKind::LParen, "'(' after 'if'")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')' after if condition")?;
        let then = self.parse_body()?;

        let mut elseifs = Vec::new();
        let mut otherwise = None;
        loop {
            if self.eat_keyword("elseif")? {
                self.expect(TokenKind::LParen, "'(' after 'elseif'")?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')' after elseif condition")?;
                elseifs.push((cond, self.parse_body()?));
                continue;
            }
            if self.at_keyword("else")? {
                self.consume()?;
                if self.at_keyword("if")? {
                    // `else if` is an elseif spelled apart.
                    self.consume()?;
                    self.expect(TokenKind::LParen, "'(' after 'else if'")?;
                    let cond = self.parse_expr()?;
                    self.expect(TokenKind::RParen, "')' after else if condition")?;
                    elseifs.push((cond, self.parse_body()?));
                    continue;
                }
                otherwise = Some(self.parse_body()?);
            }
            break;
        }
        Ok(Stmt::If {
            cond,
            then,
            elseifs,
            otherwise,
        })
    }

    fn parse_foreach(&mut self) -> Result<Stmt, PhpError> {
        self.expect_keyword("foreach", "'foreach'")?;
        self.expect(TokenKind::LParen, "'(' after 'foreach'")?;
        let subject = self.parse_expr()?;
        self.expect_keyword("as", "'as' in foreach")?;

        let mut by_ref = self.eat(TokenKind::Amp)?;
        let first = self.expect(TokenKind::Variable, "foreach variable")?;
        let (key_var, value_var) = if self.eat(TokenKind::DoubleArrow)? {
            if by_ref {
                return Err(self.error_here("foreach key cannot be by reference".to_string()));
            }
            by_ref = self.eat(TokenKind::Amp)?;
            let value = self.expect(TokenKind::Variable, "foreach value variable")?;
            (Some(first.lexeme), value.lexeme)
        } else {
            (None, first.lexeme)
        };
        self.expect(TokenKind::RParen, "')' closing foreach header")?;
        let body = self.parse_body()?;
        Ok(Stmt::Foreach {
            subject,
            key_var,
            by_ref,
            value_var,
            body,
        })
    }
}
