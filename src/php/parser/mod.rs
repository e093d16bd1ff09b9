//! Recursive-descent parser for the supported PHP subset.
//!
//! Split by construct: `item` handles top-level declarations, `stmt` the
//! statement forms, `expr` the precedence-climbing expression grammar. This
//! module owns the token plumbing shared by all of them.

mod expr;
mod item;
mod stmt;

use super::ast::{Name, Param, Program, TypeHint};
use super::error::PhpError;
use super::lexer::{Lexer, Token, TokenKind};

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    peeked: Option<Token>,
}

/// Parses a complete source file into a [`Program`].
pub fn parse_source(src: &str) -> Result<Program, PhpError> {
    let mut parser = Parser::new(src);
    parser.parse_program()
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, PhpError> {
        self.expect(TokenKind::OpenTag, "<?php open tag")?;
        let mut items = Vec::new();
        while !self.check(TokenKind::Eof)? {
            items.push(self.parse_item()?);
        }
        Ok(Program { items })
    }

    pub(super) fn peek(&mut self) -> Result<&Token, PhpError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.as_ref().expect("peeked token must exist"))
    }

    pub(super) fn consume(&mut self) -> Result<Token, PhpError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.lexer.next_token()
    }

    pub(super) fn check(&mut self, kind: TokenKind) -> Result<bool, PhpError> {
        Ok(self.peek()?.kind == kind)
    }

    pub(super) fn eat(&mut self, kind: TokenKind) -> Result<bool, PhpError> {
        if self.check(kind)? {
            self.consume()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(super) fn expect(&mut self, kind: TokenKind, context: &str) -> Result<Token, PhpError> {
        let token = self.consume()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(self.error_at(&token, format!("expected {context}, found '{}'", token.lexeme)))
        }
    }

    /// PHP keywords are case-insensitive; lexed as plain identifiers and
    /// matched here by lexeme.
    pub(super) fn at_keyword(&mut self, keyword: &str) -> Result<bool, PhpError> {
        let token = self.peek()?;
        Ok(token.kind == TokenKind::Identifier && token.lexeme.eq_ignore_ascii_case(keyword))
    }

    pub(super) fn eat_keyword(&mut self, keyword: &str) -> Result<bool, PhpError> {
        if self.at_keyword(keyword)? {
            self.consume()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(super) fn expect_keyword(&mut self, keyword: &str, context: &str) -> Result<Token, PhpError> {
        if self.at_keyword(keyword)? {
            self.consume()
        } else {
            let token = self.consume()?;
            Err(self.error_at(&token, format!("expected {context}")))
        }
    }

    pub(super) fn expect_identifier(&mut self, context: &str) -> Result<Token, PhpError> {
        self.expect(TokenKind::Identifier, context)
    }

    pub(super) fn error_at(&self, token: &Token, message: String) -> PhpError {
        PhpError::Parser {
            message,
            line: token.line,
        }
    }

    pub(super) fn error_here(&mut self, message: String) -> PhpError {
        let line = self.peek().map(|t| t.line).unwrap_or(0);
        PhpError::Parser { message, line }
    }

    /// Parses a possibly backslash-qualified name. The leading backslash marks
    /// a root-qualified reference.
    pub(super) fn parse_name(&mut self) -> Result<Name, PhpError> {
        let fully_qualified = self.eat(TokenKind::Backslash)?;
        let first = self.expect_identifier("name segment")?;
        let mut name = Name::new([first.lexeme]);
        name.fully_qualified = fully_qualified;
        while self.check(TokenKind::Backslash)? {
            self.consume()?;
            let segment = self.expect_identifier("name segment after '\\'")?;
            name.segments.push(segment.lexeme);
        }
        Ok(name)
    }

    pub(super) fn parse_type_hint(&mut self) -> Result<TypeHint, PhpError> {
        if self.eat(TokenKind::Question)? {
            let inner = self.parse_type_atom()?;
            return Ok(TypeHint::Nullable(Box::new(inner)));
        }
        let first = self.parse_type_atom()?;
        if !self.check(TokenKind::Pipe)? {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.eat(TokenKind::Pipe)? {
            members.push(self.parse_type_atom()?);
        }
        Ok(TypeHint::Union(members))
    }

    fn parse_type_atom(&mut self) -> Result<TypeHint, PhpError> {
        Ok(TypeHint::Name(self.parse_name()?))
    }

    /// Parses a parenthesized parameter list, shared by functions, methods,
    /// closures, and arrow functions.
    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, PhpError> {
        self.expect(TokenKind::LParen, "'(' before parameter list")?;
        let mut params = Vec::new();
        if self.eat(TokenKind::RParen)? {
            return Ok(params);
        }
        loop {
            params.push(self.parse_param()?);
            if self.eat(TokenKind::Comma)? {
                // Trailing comma before ')'.
                if self.eat(TokenKind::RParen)? {
                    break;
                }
                continue;
            }
            self.expect(TokenKind::RParen, "')' after parameter list")?;
            break;
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param, PhpError> {
        // Constructor property promotion modifiers are parsed and dropped.
        while self.at_keyword("public")?
            || self.at_keyword("protected")?
            || self.at_keyword("private")?
            || self.at_keyword("readonly")?
        {
            self.consume()?;
        }
        let mut type_hint = None;
        if !self.check(TokenKind::Variable)?
            && !self.check(TokenKind::Amp)?
            && !self.check(TokenKind::Ellipsis)?
        {
            type_hint = Some(self.parse_type_hint()?);
        }
        let by_ref = self.eat(TokenKind::Amp)?;
        let variadic = self.eat(TokenKind::Ellipsis)?;
        let name = self.expect(TokenKind::Variable, "parameter variable")?;
        let default = if self.eat(TokenKind::Eq)? {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Param {
            name: name.lexeme,
            type_hint,
            by_ref,
            variadic,
            default,
        })
    }
}

#[cfg(test)]
mod tests;
