//! Statement and declaration parsing

use super::ast::*;
use super::state::*;
use crate::frontend::lexer::tokens::TokenKind;
use crate::util::diagnostic::DiagnosticCode;

/// Where a statement appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StmtContext {
    /// Top level of a script line: `using`, `#r` and a trailing result expression allowed
    ScriptTop,
    /// Inside a block or method body
    Block,
}

impl ParserState {
    /// Parse one statement, recovering to the next boundary on error
    pub(crate) fn parse_stmt_recovering(
        &mut self,
        ctx: StmtContext,
    ) -> Option<Stmt> {
        let before = self.token_index();
        let stmt = self.parse_stmt(ctx);
        if stmt.is_none() {
            self.synchronize();
            // no progress means we are parked on a `}` the caller does not own
            if self.token_index() == before && !self.at_end() {
                self.unexpected();
                self.bump();
            }
        }
        stmt
    }

    fn parse_stmt(
        &mut self,
        ctx: StmtContext,
    ) -> Option<Stmt> {
        if !self.enter_nesting() {
            return None;
        }
        let stmt = self.parse_stmt_kind(ctx);
        self.leave_nesting();
        stmt
    }

    fn parse_stmt_kind(
        &mut self,
        ctx: StmtContext,
    ) -> Option<Stmt> {
        let start = self.span();
        match self.kind().clone() {
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = block.span;
                Some(Stmt {
                    kind: StmtKind::Block(block),
                    span,
                })
            }
            TokenKind::Semicolon => {
                self.bump();
                Some(Stmt {
                    kind: StmtKind::Empty,
                    span: start,
                })
            }
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwUsing => {
                let stmt = self.parse_using()?;
                if ctx != StmtContext::ScriptTop {
                    self.error(
                        DiagnosticCode::StatementNotAllowed,
                        "using directives are only allowed at the top level",
                        stmt.span,
                    );
                }
                Some(stmt)
            }
            TokenKind::Directive(name) => self.parse_directive(&name, ctx),
            TokenKind::KwNamespace | TokenKind::KwClass => {
                self.error(
                    DiagnosticCode::StatementNotAllowed,
                    "type and namespace declarations are not allowed here",
                    start,
                );
                self.skip_braced_declaration();
                Some(Stmt {
                    kind: StmtKind::Empty,
                    span: start.to(self.prev_span()),
                })
            }
            kind if is_type_start(&kind) && matches!(self.peek_nth(1), TokenKind::Identifier(_)) => {
                self.parse_var_decl()
            }
            TokenKind::Identifier(_)
                if matches!(
                    self.peek_nth(1),
                    TokenKind::Assign | TokenKind::PlusAssign | TokenKind::MinusAssign
                ) =>
            {
                self.parse_assign(ctx)
            }
            _ => self.parse_expr_stmt(ctx),
        }
    }

    /// Parse `{ stmts }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.span();
        if !self.expect(&TokenKind::LBrace, "'{'") {
            return None;
        }

        let mut stmts = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_end() {
            if let Some(stmt) = self.parse_stmt_recovering(StmtContext::Block) {
                stmts.push(stmt);
            }
        }
        self.expect(&TokenKind::RBrace, "'}'");

        Some(Block {
            stmts,
            span: start.to(self.prev_span()),
        })
    }

    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump();
        let condition = self.parse_condition()?;
        let then_branch = Box::new(self.parse_stmt(StmtContext::Block)?);
        let else_branch = if self.skip(&TokenKind::KwElse) {
            Some(Box::new(self.parse_stmt(StmtContext::Block)?))
        } else {
            None
        };
        Some(Stmt {
            kind: StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump();
        let condition = self.parse_condition()?;
        let body = Box::new(self.parse_stmt(StmtContext::Block)?);
        Some(Stmt {
            kind: StmtKind::While { condition, body },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_condition(&mut self) -> Option<Expr> {
        if !self.expect(&TokenKind::LParen, "'('") {
            return None;
        }
        let condition = self.parse_expression(BP_LOWEST)?;
        if !self.expect(&TokenKind::RParen, "')'") {
            return None;
        }
        Some(condition)
    }

    /// Parse `using A.B;`
    pub(crate) fn parse_using(&mut self) -> Option<Stmt> {
        let start = self.span();
        self.bump();
        let path = self.parse_path()?;
        self.expect(&TokenKind::Semicolon, "';'");
        Some(Stmt {
            kind: StmtKind::Using { path },
            span: start.to(self.prev_span()),
        })
    }

    /// Parse a dotted name
    pub(crate) fn parse_path(&mut self) -> Option<Vec<Ident>> {
        let mut path = vec![self.expect_ident()?];
        while self.skip(&TokenKind::Dot) {
            path.push(self.expect_ident()?);
        }
        Some(path)
    }

    fn parse_directive(
        &mut self,
        name: &str,
        ctx: StmtContext,
    ) -> Option<Stmt> {
        let start = self.span();
        if name != "r" {
            self.error(
                DiagnosticCode::UnexpectedToken,
                format!("unknown directive '#{}'", name),
                start,
            );
            return None;
        }
        if ctx != StmtContext::ScriptTop {
            self.error(
                DiagnosticCode::StatementNotAllowed,
                "reference directives are only allowed at the top level",
                start,
            );
        }
        self.bump();

        let TokenKind::StringLiteral(target) = self.kind().clone() else {
            let found = describe(self.kind());
            self.error(
                DiagnosticCode::ExpectedToken,
                format!("expected reference name in quotes, found {}", found),
                self.span(),
            );
            return None;
        };
        let target_span = self.span();
        self.bump();
        self.skip(&TokenKind::Semicolon);

        Some(Stmt {
            kind: StmtKind::Reference {
                target,
                target_span,
            },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_var_decl(&mut self) -> Option<Stmt> {
        let start = self.span();
        let ty = type_name(self.kind())?;
        self.bump();
        let name = self.expect_ident()?;
        let init = if self.skip(&TokenKind::Assign) {
            Some(self.parse_expression(BP_LOWEST)?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon, "';'");
        Some(Stmt {
            kind: StmtKind::VarDecl {
                ty,
                ty_span: start,
                name,
                init,
            },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_assign(
        &mut self,
        ctx: StmtContext,
    ) -> Option<Stmt> {
        let start = self.span();
        let target = self.expect_ident()?;
        let op = match self.kind() {
            TokenKind::PlusAssign => AssignOp::Add,
            TokenKind::MinusAssign => AssignOp::Sub,
            _ => AssignOp::Set,
        };
        self.bump();
        let value = self.parse_expression(BP_LOWEST)?;
        // a script line may end with an assignment and no semicolon
        let trailing_ok = ctx == StmtContext::ScriptTop && self.at_end();
        if !trailing_ok && !self.expect(&TokenKind::Semicolon, "';'") {
            return None;
        }
        Some(Stmt {
            kind: StmtKind::Assign { target, op, value },
            span: start.to(self.prev_span()),
        })
    }

    fn parse_expr_stmt(
        &mut self,
        ctx: StmtContext,
    ) -> Option<Stmt> {
        let start = self.span();
        let expr = self.parse_expression(BP_LOWEST)?;

        if self.skip(&TokenKind::Semicolon) {
            return Some(Stmt {
                kind: StmtKind::Expr(expr),
                span: start.to(self.prev_span()),
            });
        }
        if ctx == StmtContext::ScriptTop && self.at_end() {
            let span = expr.span();
            return Some(Stmt {
                kind: StmtKind::Result(expr),
                span,
            });
        }

        self.expect(&TokenKind::Semicolon, "';'");
        let span = start.to(expr.span());
        Some(Stmt {
            kind: StmtKind::Expr(expr),
            span,
        })
    }

    /// Skip a `namespace`/`class` header and its balanced braces
    fn skip_braced_declaration(&mut self) {
        while !self.at_end() && !self.at(&TokenKind::LBrace) {
            self.bump();
        }
        let mut depth = 0usize;
        while !self.at_end() {
            match self.kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    // ------------------------------------------------------------------
    // Regular documents
    // ------------------------------------------------------------------

    /// Parse `namespace A.B { ... }`
    pub(crate) fn parse_namespace(&mut self) -> Option<NamespaceDecl> {
        let start = self.span();
        self.bump();
        let path = self.parse_path()?;
        if !self.expect(&TokenKind::LBrace, "'{'") {
            return None;
        }

        let mut usings = Vec::new();
        let mut classes = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_end() {
            match self.kind() {
                TokenKind::KwUsing => {
                    if let Some(using) = self.parse_using() {
                        usings.push(using);
                    }
                }
                TokenKind::KwClass => {
                    if let Some(class) = self.parse_class() {
                        classes.push(class);
                    }
                }
                _ => {
                    self.error(
                        DiagnosticCode::StatementNotAllowed,
                        "only classes can be declared in a namespace",
                        self.span(),
                    );
                    self.parse_stmt_recovering(StmtContext::Block);
                }
            }
        }
        self.expect(&TokenKind::RBrace, "'}'");

        Some(NamespaceDecl {
            path,
            usings,
            classes,
            span: start.to(self.prev_span()),
        })
    }

    fn parse_class(&mut self) -> Option<ClassDecl> {
        let start = self.span();
        self.bump();
        let name = self.expect_ident()?;
        if !self.expect(&TokenKind::LBrace, "'{'") {
            return None;
        }

        let mut methods = Vec::new();
        while !self.at(&TokenKind::RBrace) && !self.at_end() {
            match self.parse_method() {
                Some(method) => methods.push(method),
                None => self.skip_braced_declaration(),
            }
        }
        self.expect(&TokenKind::RBrace, "'}'");

        Some(ClassDecl {
            name,
            methods,
            span: start.to(self.prev_span()),
        })
    }

    fn parse_method(&mut self) -> Option<MethodDecl> {
        let start = self.span();
        let Some(return_type) = type_name(self.kind()).filter(|t| *t != TypeName::Var) else {
            let found = describe(self.kind());
            self.error(
                DiagnosticCode::ExpectedToken,
                format!("expected method declaration, found {}", found),
                start,
            );
            return None;
        };
        self.bump();
        let name = self.expect_ident()?;
        if !self.expect(&TokenKind::LParen, "'('") || !self.expect(&TokenKind::RParen, "')'") {
            return None;
        }
        let body = self.parse_block()?;
        Some(MethodDecl {
            return_type,
            name,
            body,
            span: start.to(self.prev_span()),
        })
    }
}

fn is_type_start(kind: &TokenKind) -> bool {
    type_name(kind).is_some()
}

fn type_name(kind: &TokenKind) -> Option<TypeName> {
    Some(match kind {
        TokenKind::KwVar => TypeName::Var,
        TokenKind::KwInt => TypeName::Int,
        TokenKind::KwDouble => TypeName::Double,
        TokenKind::KwString => TypeName::String,
        TokenKind::KwBool => TypeName::Bool,
        TokenKind::KwVoid => TypeName::Void,
        _ => return None,
    })
}
