//! Expression parsing (Pratt)

use super::ast::*;
use super::state::*;
use crate::frontend::lexer::tokens::TokenKind;
use crate::util::diagnostic::DiagnosticCode;

impl ParserState {
    /// Parse an expression whose operators bind tighter than `min_bp`
    ///
    /// Expressions nested deeper than [`MAX_NESTING_DEPTH`] are reported and
    /// yield `None`.
    pub fn parse_expression(
        &mut self,
        min_bp: u8,
    ) -> Option<Expr> {
        self.parse_nested(min_bp).map(|(expr, _)| expr)
    }

    /// Parse an expression along with the depth of its tree
    fn parse_nested(
        &mut self,
        min_bp: u8,
    ) -> Option<(Expr, usize)> {
        if !self.enter_nesting() {
            return None;
        }
        let parsed = self.parse_operators(min_bp);
        self.leave_nesting();
        parsed
    }

    fn parse_operators(
        &mut self,
        min_bp: u8,
    ) -> Option<(Expr, usize)> {
        let (mut left, mut depth) = self.parse_prefix()?;

        loop {
            if self.at(&TokenKind::Dot) {
                left = self.parse_member(left)?;
                depth += 1;
            } else if self.at(&TokenKind::LParen) {
                let (call, arg_depth) = self.parse_call(left)?;
                left = call;
                depth = depth.max(arg_depth) + 1;
            } else {
                let Some((op, bp)) = infix_info(self.kind()) else {
                    break;
                };
                if bp <= min_bp {
                    break;
                }
                self.bump();
                let (right, right_depth) = self.parse_nested(bp)?;
                let span = left.span().to(right.span());
                left = Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                };
                depth = depth.max(right_depth) + 1;
            }

            if depth > MAX_NESTING_DEPTH {
                self.nesting_error();
                return None;
            }
        }

        Some((left, depth))
    }

    fn parse_prefix(&mut self) -> Option<(Expr, usize)> {
        let span = self.span();
        let expr = match self.kind().clone() {
            TokenKind::IntLiteral(n) => {
                self.bump();
                Expr::Lit(Literal::Int(n), span)
            }
            TokenKind::DoubleLiteral(n) => {
                self.bump();
                Expr::Lit(Literal::Double(n), span)
            }
            TokenKind::StringLiteral(s) => {
                self.bump();
                Expr::Lit(Literal::String(s), span)
            }
            TokenKind::KwTrue => {
                self.bump();
                Expr::Lit(Literal::Bool(true), span)
            }
            TokenKind::KwFalse => {
                self.bump();
                Expr::Lit(Literal::Bool(false), span)
            }
            TokenKind::Identifier(name) => {
                self.bump();
                Expr::Name(Ident { name, span })
            }
            TokenKind::Minus | TokenKind::Not => {
                let op = if self.at(&TokenKind::Minus) {
                    UnOp::Neg
                } else {
                    UnOp::Not
                };
                self.bump();
                let (operand, depth) = self.parse_nested(BP_UNARY)?;
                let span = span.to(operand.span());
                let expr = Expr::Unary {
                    op,
                    expr: Box::new(operand),
                    span,
                };
                return Some((expr, depth + 1));
            }
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_nested(BP_LOWEST)?;
                self.expect(&TokenKind::RParen, "')'");
                return Some(inner);
            }
            _ => {
                let found = describe(self.kind());
                self.error(
                    DiagnosticCode::UnexpectedToken,
                    format!("expected expression, found {}", found),
                    span,
                );
                return None;
            }
        };
        Some((expr, 1))
    }

    fn parse_member(
        &mut self,
        target: Expr,
    ) -> Option<Expr> {
        self.bump();
        let member = self.expect_ident()?;
        let span = target.span().to(member.span);
        Some(Expr::Member {
            target: Box::new(target),
            member,
            span,
        })
    }

    /// Parse an argument list; the depth is that of the deepest argument
    fn parse_call(
        &mut self,
        callee: Expr,
    ) -> Option<(Expr, usize)> {
        if !matches!(callee, Expr::Member { .. } | Expr::Name(_)) {
            self.error(
                DiagnosticCode::UnexpectedToken,
                "only methods can be called",
                self.span(),
            );
            return None;
        }
        self.bump();

        let mut args = Vec::new();
        let mut depth = 0;
        if !self.at(&TokenKind::RParen) {
            loop {
                let (arg, arg_depth) = self.parse_nested(BP_LOWEST)?;
                args.push(arg);
                depth = depth.max(arg_depth);
                if !self.skip(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if !self.expect(&TokenKind::RParen, "')'") {
            return None;
        }

        let span = callee.span().to(self.prev_span());
        let call = Expr::Call {
            callee: Box::new(callee),
            args,
            span,
        };
        Some((call, depth))
    }
}

/// Binary operator and binding power for the current token
fn infix_info(kind: &TokenKind) -> Option<(BinOp, u8)> {
    Some(match kind {
        TokenKind::Or => (BinOp::Or, BP_OR),
        TokenKind::And => (BinOp::And, BP_AND),
        TokenKind::Eq => (BinOp::Eq, BP_EQ),
        TokenKind::Neq => (BinOp::Neq, BP_EQ),
        TokenKind::Lt => (BinOp::Lt, BP_CMP),
        TokenKind::Le => (BinOp::Le, BP_CMP),
        TokenKind::Gt => (BinOp::Gt, BP_CMP),
        TokenKind::Ge => (BinOp::Ge, BP_CMP),
        TokenKind::Plus => (BinOp::Add, BP_ADD),
        TokenKind::Minus => (BinOp::Sub, BP_ADD),
        TokenKind::Star => (BinOp::Mul, BP_MUL),
        TokenKind::Slash => (BinOp::Div, BP_MUL),
        TokenKind::Percent => (BinOp::Rem, BP_MUL),
        _ => return None,
    })
}
