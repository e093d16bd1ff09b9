//! Expression grammar, precedence climbing from assignment down to primaries.

use crate::php::ast::{
    ArrayEntry, ArrowFnExpr, BinOp, CallTarget, ClosureExpr, ClosureFlags, ClosureUse, Expr, Name,
    UnOp,
};
use crate::php::error::PhpError;
use crate::php::lexer::TokenKind;

use super::Parser;

impl<'src> Parser<'src> {
    pub(super) fn parse_expr(&mut self) -> Result<Expr, PhpError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr, PhpError> {
        let lhs = self.parse_ternary()?;
        let op = match self.peek()?.kind {
            TokenKind::Eq => None,
            TokenKind::PlusEq => Some(BinOp::Add),
            TokenKind::MinusEq => Some(BinOp::Sub),
            TokenKind::StarEq => Some(BinOp::Mul),
            TokenKind::SlashEq => Some(BinOp::Div),
            TokenKind::PercentEq => Some(BinOp::Mod),
            TokenKind::DotEq => Some(BinOp::Concat),
            TokenKind::CoalesceEq => Some(BinOp::Coalesce),
            _ => return Ok(lhs),
        };
        self.consume()?;
        let value = self.parse_assignment()?;
        Ok(Expr::Assign {
            target: Box::new(lhs),
            op,
            value: Box::new(value),
        })
    }

    fn parse_ternary(&mut self) -> Result<Expr, PhpError> {
        let cond = self.parse_coalesce()?;
        if !self.eat(TokenKind::Question)? {
            return Ok(cond);
        }
        let then = if self.check(TokenKind::Colon)? {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        self.expect(TokenKind::Colon, "':' in ternary")?;
        let otherwise = self.parse_ternary()?;
        Ok(Expr::Ternary {
            cond: Box::new(cond),
            then,
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_coalesce(&mut self) -> Result<Expr, PhpError> {
        let lhs = self.parse_or()?;
        if self.eat(TokenKind::Coalesce)? {
            let rhs = self.parse_coalesce()?;
            return Ok(binary(BinOp::Coalesce, lhs, rhs));
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_and()?;
        while self.eat(TokenKind::PipePipe)? {
            let rhs = self.parse_and()?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_bit_or()?;
        while self.eat(TokenKind::AmpAmp)? {
            let rhs = self.parse_bit_or()?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bit_or(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_bit_xor()?;
        while self.eat(TokenKind::Pipe)? {
            let rhs = self.parse_bit_xor()?;
            lhs = binary(BinOp::BitOr, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bit_xor(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_bit_and()?;
        while self.eat(TokenKind::Caret)? {
            let rhs = self.parse_bit_and()?;
            lhs = binary(BinOp::BitXor, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_bit_and(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(TokenKind::Amp)? {
            let rhs = self.parse_equality()?;
            lhs = binary(BinOp::BitAnd, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::EqEqEq => BinOp::Identical,
                TokenKind::BangEq => BinOp::NotEq,
                TokenKind::BangEqEq => BinOp::NotIdentical,
                _ => return Ok(lhs),
            };
            self.consume()?;
            let rhs = self.parse_relational()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_shift()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::LtEq => BinOp::LtEq,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::GtEq => BinOp::GtEq,
                _ => return Ok(lhs),
            };
            self.consume()?;
            let rhs = self.parse_shift()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_shift(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::Shl => BinOp::Shl,
                TokenKind::Shr => BinOp::Shr,
                _ => return Ok(lhs),
            };
            self.consume()?;
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                TokenKind::Dot => BinOp::Concat,
                _ => return Ok(lhs),
            };
            self.consume()?;
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, PhpError> {
        let mut lhs = self.parse_instanceof()?;
        loop {
            let op = match self.peek()?.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => return Ok(lhs),
            };
            self.consume()?;
            let rhs = self.parse_instanceof()?;
            lhs = binary(op, lhs, rhs);
        }
    }

    fn parse_instanceof(&mut self) -> Result<Expr, PhpError> {
        let mut expr = self.parse_unary()?;
        while self.eat_keyword("instanceof")? {
            let class = self.parse_name()?;
            expr = Expr::Instanceof {
                expr: Box::new(expr),
                class,
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, PhpError> {
        let op = match self.peek()?.kind {
            TokenKind::Bang => Some(UnOp::Not),
            TokenKind::Minus => Some(UnOp::Neg),
            TokenKind::Plus => Some(UnOp::Plus),
            TokenKind::Tilde => Some(UnOp::BitNot),
            _ => None,
        };
        if let Some(op) = op {
            self.consume()?;
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Expr, PhpError> {
        let base = self.parse_postfix()?;
        if self.eat(TokenKind::StarStar)? {
            // Right-associative; the exponent may itself be signed.
            let exponent = self.parse_unary()?;
            return Ok(binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self) -> Result<Expr, PhpError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.check(TokenKind::LParen)? {
                let args = self.parse_args()?;
                let callee = match expr {
                    Expr::ConstFetch(name) => CallTarget::Name(name),
                    other => CallTarget::Expr(Box::new(other)),
                };
                expr = Expr::Call { callee, args };
                continue;
            }
            if self.eat(TokenKind::LBracket)? {
                if self.eat(TokenKind::RBracket)? {
                    // `$xs[] = ...` append target.
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: None,
                    };
                    continue;
                }
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket, "']' closing index")?;
                expr = Expr::Index {
                    base: Box::new(expr),
                    index: Some(Box::new(index)),
                };
                continue;
            }
            if self.eat(TokenKind::Arrow)? {
                let member = self.expect_identifier("member name after '->'")?;
                if self.check(TokenKind::LParen)? {
                    let args = self.parse_args()?;
                    expr = Expr::MethodCall {
                        object: Box::new(expr),
                        method: member.lexeme,
                        args,
                    };
                } else {
                    expr = Expr::PropFetch {
                        object: Box::new(expr),
                        prop: member.lexeme,
                    };
                }
                continue;
            }
            if self.check(TokenKind::DoubleColon)? {
                let Expr::ConstFetch(class) = expr else {
                    return Err(self.error_here("'::' requires a class name".to_string()));
                };
                self.consume()?;
                let member = self.expect_identifier("member name after '::'")?;
                if self.check(TokenKind::LParen)? {
                    let args = self.parse_args()?;
                    expr = Expr::StaticCall {
                        class,
                        method: member.lexeme,
                        args,
                    };
                } else {
                    expr = Expr::ClassConst {
                        class,
                        constant: member.lexeme,
                    };
                }
                continue;
            }
            return Ok(expr);
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, PhpError> {
        if self.check(TokenKind::Number)? {
            let token = self.consume()?;
            return Ok(Expr::Number(token.lexeme));
        }
        if self.check(TokenKind::String)? {
            let token = self.consume()?;
            return Ok(Expr::Str(token.lexeme));
        }
        if self.check(TokenKind::Variable)? {
            let token = self.consume()?;
            return Ok(Expr::Variable(token.lexeme));
        }
        if self.eat(TokenKind::LParen)? {
            let inner = self.parse_expr()?;
            self.expect(TokenKind::RParen, "')' closing parenthesized expression")?;
            return Ok(inner);
        }
        if self.eat(TokenKind::LBracket)? {
            return self.parse_array_literal(TokenKind::RBracket);
        }
        if self.check(TokenKind::Ellipsis)? {
            self.consume()?;
            let inner = self.parse_expr()?;
            return Ok(Expr::Spread(Box::new(inner)));
        }

        if self.check(TokenKind::Identifier)? {
            return self.parse_identifier_primary();
        }
        if self.check(TokenKind::Backslash)? {
            let name = self.parse_name()?;
            return Ok(Expr::ConstFetch(name));
        }
        let token = self.consume()?;
        Err(self.error_at(
            &token,
            format!("unexpected token '{}' in expression", token.lexeme),
        ))
    }

    /// Identifier-led primaries: keywords with expression forms, magic
    /// constants, literal keywords, and plain names.
    fn parse_identifier_primary(&mut self) -> Result<Expr, PhpError> {
        let lexeme = self.peek()?.lexeme.clone();
        let line = self.peek()?.line;

        if lexeme.eq_ignore_ascii_case("function") {
            self.consume()?;
            let mut flags = ClosureFlags::empty();
            if self.eat(TokenKind::Amp)? {
                flags |= ClosureFlags::BY_REF;
            }
            return self.parse_closure_tail(flags, line);
        }
        if lexeme.eq_ignore_ascii_case("fn") {
            self.consume()?;
            let mut flags = ClosureFlags::empty();
            if self.eat(TokenKind::Amp)? {
                flags |= ClosureFlags::BY_REF;
            }
            return self.parse_arrow_tail(flags, line);
        }
        if lexeme.eq_ignore_ascii_case("static") {
            self.consume()?;
            if self.at_keyword("function")? {
                self.consume()?;
                let mut flags = ClosureFlags::STATIC;
                if self.eat(TokenKind::Amp)? {
                    flags |= ClosureFlags::BY_REF;
                }
                return self.parse_closure_tail(flags, line);
            }
            if self.at_keyword("fn")? {
                self.consume()?;
                let mut flags = ClosureFlags::STATIC;
                if self.eat(TokenKind::Amp)? {
                    flags |= ClosureFlags::BY_REF;
                }
                return self.parse_arrow_tail(flags, line);
            }
            // `static::` late-static reference.
            return Ok(Expr::ConstFetch(Name::new(["static"])));
        }
        if lexeme.eq_ignore_ascii_case("new") {
            self.consume()?;
            let class = self.parse_name()?;
            let args = if self.check(TokenKind::LParen)? {
                self.parse_args()?
            } else {
                Vec::new()
            };
            return Ok(Expr::New { class, args });
        }
        if lexeme.eq_ignore_ascii_case("array") {
            self.consume()?;
            self.expect(TokenKind::LParen, "'(' after 'array'")?;
            return self.parse_array_literal(TokenKind::RParen);
        }
        if lexeme.eq_ignore_ascii_case("true") {
            self.consume()?;
            return Ok(Expr::Bool(true));
        }
        if lexeme.eq_ignore_ascii_case("false") {
            self.consume()?;
            return Ok(Expr::Bool(false));
        }
        if lexeme.eq_ignore_ascii_case("null") {
            self.consume()?;
            return Ok(Expr::Null);
        }
        if lexeme.eq_ignore_ascii_case("__FILE__") {
            self.consume()?;
            return Ok(Expr::MagicFile);
        }
        if lexeme.eq_ignore_ascii_case("__DIR__") {
            self.consume()?;
            return Ok(Expr::MagicDir);
        }
        if lexeme.eq_ignore_ascii_case("__CLASS__") {
            self.consume()?;
            return Ok(Expr::MagicClass);
        }

        let name = self.parse_name()?;
        Ok(Expr::ConstFetch(name))
    }

    pub(super) fn parse_closure_tail(
        &mut self,
        flags: ClosureFlags,
        line: usize,
    ) -> Result<Expr, PhpError> {
        let params = self.parse_params()?;
        let mut uses = Vec::new();
        if self.eat_keyword("use")? {
            self.expect(TokenKind::LParen, "'(' after 'use'")?;
            loop {
                let by_ref = self.eat(TokenKind::Amp)?;
                let name = self.expect(TokenKind::Variable, "captured variable")?;
                uses.push(ClosureUse {
                    name: name.lexeme,
                    by_ref,
                });
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')' closing use list")?;
        }
        let return_type = if self.eat(TokenKind::Colon)? {
            Some(self.parse_type_hint()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(Expr::Closure(ClosureExpr {
            flags,
            params,
            uses,
            return_type,
            body,
            line,
        }))
    }

    fn parse_arrow_tail(&mut self, flags: ClosureFlags, line: usize) -> Result<Expr, PhpError> {
        let params = self.parse_params()?;
        let return_type = if self.eat(TokenKind::Colon)? {
            Some(self.parse_type_hint()?)
        } else {
            None
        };
        self.expect(TokenKind::DoubleArrow, "'=>' in arrow function")?;
        let body = self.parse_expr()?;
        Ok(Expr::ArrowFn(ArrowFnExpr {
            flags,
            params,
            return_type,
            body: Box::new(body),
            line,
        }))
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, PhpError> {
        self.expect(TokenKind::LParen, "'(' opening argument list")?;
        let mut args = Vec::new();
        if self.eat(TokenKind::RParen)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.eat(TokenKind::Comma)? {
                if self.eat(TokenKind::RParen)? {
                    break;
                }
                continue;
            }
            self.expect(TokenKind::RParen, "')' closing argument list")?;
            break;
        }
        Ok(args)
    }

    fn parse_array_literal(&mut self, closer: TokenKind) -> Result<Expr, PhpError> {
        let mut entries = Vec::new();
        if self.eat(closer)? {
            return Ok(Expr::ArrayLit(entries));
        }
        loop {
            let first = self.parse_expr()?;
            let entry = if self.eat(TokenKind::DoubleArrow)? {
                let value = self.parse_expr()?;
                ArrayEntry {
                    key: Some(first),
                    value,
                }
            } else {
                ArrayEntry {
                    key: None,
                    value: first,
                }
            };
            entries.push(entry);
            if self.eat(TokenKind::Comma)? {
                if self.eat(closer)? {
                    break;
                }
                continue;
            }
            self.expect(closer, "closing bracket of array literal")?;
            break;
        }
        Ok(Expr::ArrayLit(entries))
    }
}

fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
