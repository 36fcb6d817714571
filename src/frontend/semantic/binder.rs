//! Name binding and type checking

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::scope::{Globals, Import, Imports};
use super::types::Type;
use super::{BindContext, Bound, LocalSymbol, SemanticModel, SymbolClass};
use crate::frontend::parser::ast::*;
use crate::frontend::parser::SyntaxTree;
use crate::references::{instance_members, select_overload, Member, MemberKind, Reference, CATALOG};
use crate::util::diagnostic::{Diagnostic, DiagnosticCode};
use crate::util::span::Span;

pub(super) fn bind_tree(
    tree: &SyntaxTree,
    ctx: BindContext<'_>,
) -> SemanticModel {
    let BindContext {
        parent,
        references: project_references,
        implicit_usings,
    } = ctx;

    let mut diagnostics = Vec::new();
    let mut references = project_references.clone();
    let mut explicit_usings = Vec::new();
    collect_directives(tree, &mut references, &mut explicit_usings, &mut diagnostics);

    let mut usings: IndexSet<String> = implicit_usings.iter().cloned().collect();
    let imports = {
        let mut all_references: IndexSet<&Reference> = parent
            .as_ref()
            .map(|p| p.references().iter().collect())
            .unwrap_or_default();
        all_references.extend(references.iter());

        let namespaces = CATALOG.namespaces_for(all_references.iter().copied());
        for (path, span) in explicit_usings {
            if namespaces.contains(path.as_str()) {
                usings.insert(path);
            } else {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::UnknownNamespace,
                    format!(
                        "The type or namespace name '{}' could not be found (are you missing a reference?)",
                        path
                    ),
                    span,
                ));
            }
        }

        let mut all_usings: IndexSet<&str> = parent
            .as_ref()
            .map(|p| p.usings().iter().map(String::as_str).collect())
            .unwrap_or_default();
        all_usings.extend(usings.iter().map(String::as_str));
        Arc::new(Imports::new(all_references.iter().copied(), &all_usings))
    };

    let (own, locals, symbols, binder_diagnostics, result_type) = {
        let mut binder = Binder::new(parent.as_deref(), tree.kind.is_script(), &imports);
        binder.bind_items(&tree.items);
        (
            binder.own,
            binder.locals,
            binder.symbols,
            binder.diagnostics,
            binder.result_type,
        )
    };
    diagnostics.extend(binder_diagnostics);

    SemanticModel {
        globals: Arc::new(Globals::new(parent, own, usings, references)),
        imports,
        diagnostics,
        locals,
        symbols,
        result_type,
    }
}

/// Gather `#r` targets and `using` paths before binding so they apply to the
/// whole line
fn collect_directives(
    tree: &SyntaxTree,
    references: &mut IndexSet<Reference>,
    usings: &mut Vec<(String, Span)>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut visit = |stmt: &Stmt| match &stmt.kind {
        StmtKind::Reference {
            target,
            target_span,
        } => match CATALOG.resolve_target(target) {
            Ok(resolved) => references.extend(resolved),
            Err(e) => diagnostics.push(Diagnostic::error(
                DiagnosticCode::UnknownReference,
                e.to_string(),
                *target_span,
            )),
        },
        StmtKind::Using { path } => {
            let span = path_span(path);
            usings.push((path_to_string(path), span));
        }
        _ => {}
    };

    for item in &tree.items {
        match item {
            Item::Stmt(stmt) => visit(stmt),
            Item::Namespace(ns) => ns.usings.iter().for_each(&mut visit),
        }
    }
}

fn path_span(path: &[Ident]) -> Span {
    match (path.first(), path.last()) {
        (Some(first), Some(last)) => first.span.to(last.span),
        _ => Span::new(0, 0),
    }
}

pub(super) struct Binder<'a> {
    parent: Option<&'a Globals>,
    /// Globals declared by this line
    own: IndexMap<String, Type>,
    script: bool,
    imports: &'a Imports,
    /// Block scopes, innermost last
    scopes: Vec<(Span, IndexMap<String, Type>)>,
    locals: Vec<LocalSymbol>,
    symbols: Vec<(Span, SymbolClass)>,
    diagnostics: Vec<Diagnostic>,
    result_type: Option<Type>,
}

impl<'a> Binder<'a> {
    fn new(
        parent: Option<&'a Globals>,
        script: bool,
        imports: &'a Imports,
    ) -> Self {
        Self {
            parent,
            own: IndexMap::new(),
            script,
            imports,
            scopes: Vec::new(),
            locals: Vec::new(),
            symbols: Vec::new(),
            diagnostics: Vec::new(),
            result_type: None,
        }
    }

    /// Binder for ad-hoc queries against a finished model
    pub(super) fn for_query(
        globals: &'a Globals,
        imports: &'a Imports,
        locals: IndexMap<String, Type>,
    ) -> Self {
        let mut binder = Self::new(Some(globals), false, imports);
        binder.scopes.push((Span::new(0, usize::MAX), locals));
        binder
    }

    fn error(
        &mut self,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) {
        self.diagnostics.push(Diagnostic::error(code, message, span));
    }

    fn classify(
        &mut self,
        span: Span,
        class: SymbolClass,
    ) {
        self.symbols.push((span, class));
    }

    // ------------------------------------------------------------------
    // Declarations and scopes
    // ------------------------------------------------------------------

    fn lookup_var(
        &self,
        name: &str,
    ) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|(_, scope)| scope.get(name).copied())
            .or_else(|| self.own.get(name).copied())
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }

    fn declare(
        &mut self,
        name: &Ident,
        ty: Type,
        visible_from: usize,
    ) {
        self.classify(name.span, SymbolClass::Variable);

        if self.scopes.is_empty() {
            if !self.script {
                return;
            }
            if self.own.contains_key(&name.name) {
                self.redeclared(name);
            }
            self.own.insert(name.name.clone(), ty);
            return;
        }

        if self.scopes.iter().any(|(_, s)| s.contains_key(&name.name)) {
            self.redeclared(name);
        }
        if let Some((span, scope)) = self.scopes.last_mut() {
            scope.insert(name.name.clone(), ty);
            self.locals.push(LocalSymbol {
                name: name.name.clone(),
                ty,
                declared_at: visible_from,
                scope: *span,
            });
        }
    }

    fn redeclared(
        &mut self,
        name: &Ident,
    ) {
        self.error(
            DiagnosticCode::Redeclaration,
            format!(
                "A local variable named '{}' is already defined in this scope",
                name.name
            ),
            name.span,
        );
    }

    fn with_scope(
        &mut self,
        span: Span,
        f: impl FnOnce(&mut Self),
    ) {
        self.scopes.push((span, IndexMap::new()));
        f(self);
        self.scopes.pop();
    }

    // ------------------------------------------------------------------
    // Items and statements
    // ------------------------------------------------------------------

    fn bind_items(
        &mut self,
        items: &[Item],
    ) {
        for item in items {
            match item {
                Item::Stmt(stmt) => self.bind_stmt(stmt),
                Item::Namespace(ns) => self.bind_namespace(ns),
            }
        }
    }

    fn bind_namespace(
        &mut self,
        ns: &NamespaceDecl,
    ) {
        for ident in &ns.path {
            self.classify(ident.span, SymbolClass::Namespace);
        }
        for using in &ns.usings {
            self.bind_stmt(using);
        }
        for class in &ns.classes {
            self.classify(class.name.span, SymbolClass::Type);
            for method in &class.methods {
                self.classify(method.name.span, SymbolClass::Method);
                self.bind_block(&method.body);
            }
        }
    }

    fn bind_block(
        &mut self,
        block: &Block,
    ) {
        self.with_scope(block.span, |b| {
            for stmt in &block.stmts {
                b.bind_stmt(stmt);
            }
        });
    }

    /// `if`/`while` bodies get their own scope even without braces
    fn bind_embedded(
        &mut self,
        stmt: &Stmt,
    ) {
        match &stmt.kind {
            StmtKind::Block(block) => self.bind_block(block),
            _ => self.with_scope(stmt.span, |b| b.bind_stmt(stmt)),
        }
    }

    fn bind_stmt(
        &mut self,
        stmt: &Stmt,
    ) {
        match &stmt.kind {
            StmtKind::Using { path } => {
                for ident in path {
                    self.classify(ident.span, SymbolClass::Namespace);
                }
            }
            StmtKind::Reference { .. } | StmtKind::Empty => {}
            StmtKind::VarDecl {
                ty,
                ty_span,
                name,
                init,
            } => self.bind_var_decl(*ty, *ty_span, name, init.as_ref(), stmt.span.end),
            StmtKind::Assign { target, op, value } => self.bind_assign(target, *op, value),
            StmtKind::Expr(expr) => {
                self.value_of(expr);
            }
            StmtKind::Result(expr) => {
                let ty = self.value_of(expr);
                self.result_type = Some(ty);
            }
            StmtKind::Block(block) => self.bind_block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.bind_condition(condition);
                self.bind_embedded(then_branch);
                if let Some(else_branch) = else_branch {
                    self.bind_embedded(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.bind_condition(condition);
                self.bind_embedded(body);
            }
        }
    }

    fn bind_var_decl(
        &mut self,
        ty: TypeName,
        ty_span: Span,
        name: &Ident,
        init: Option<&Expr>,
        visible_from: usize,
    ) {
        let init_ty = init.map(|e| self.expect_value(e));
        let declared = match (Type::from_name(ty), init_ty) {
            (Some(Type::Void), _) => {
                self.error(
                    DiagnosticCode::VoidValue,
                    "A variable cannot be of type 'void'",
                    ty_span,
                );
                Type::Error
            }
            (Some(declared), Some(init_ty)) => {
                if !declared.accepts(init_ty) {
                    let span = init.map(Expr::span).unwrap_or(name.span);
                    self.mismatch(init_ty, declared, span);
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(init_ty)) => init_ty,
            (None, None) => {
                self.error(
                    DiagnosticCode::UninferableType,
                    "Implicitly-typed variables must be initialized",
                    name.span,
                );
                Type::Error
            }
        };
        self.declare(name, declared, visible_from);
    }

    fn bind_assign(
        &mut self,
        target: &Ident,
        op: AssignOp,
        value: &Expr,
    ) {
        let value_ty = self.expect_value(value);
        let Some(target_ty) = self.lookup_var(&target.name) else {
            self.unknown_name(target);
            return;
        };
        self.classify(target.span, SymbolClass::Variable);

        let ok = match op {
            AssignOp::Set => target_ty.accepts(value_ty),
            AssignOp::Add if target_ty == Type::String => true,
            AssignOp::Add | AssignOp::Sub => {
                (target_ty.is_numeric() || target_ty.is_error())
                    && (value_ty.is_numeric() || value_ty.is_error())
                    && target_ty.accepts(value_ty)
            }
        };
        if !ok {
            self.mismatch(value_ty, target_ty, value.span());
        }
    }

    fn bind_condition(
        &mut self,
        condition: &Expr,
    ) {
        let ty = self.expect_value(condition);
        if !Type::Bool.accepts(ty) {
            self.mismatch(ty, Type::Bool, condition.span());
        }
    }

    fn mismatch(
        &mut self,
        found: Type,
        expected: Type,
        span: Span,
    ) {
        self.error(
            DiagnosticCode::TypeMismatch,
            format!(
                "Cannot implicitly convert type '{}' to '{}'",
                found, expected
            ),
            span,
        );
    }

    fn unknown_name(
        &mut self,
        ident: &Ident,
    ) {
        self.error(
            DiagnosticCode::UnknownName,
            format!(
                "The name '{}' does not exist in the current context",
                ident.name
            ),
            ident.span,
        );
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// Type of an expression used as a value; `void` is allowed
    fn value_of(
        &mut self,
        expr: &Expr,
    ) -> Type {
        match self.bind_expr(expr) {
            Bound::Value(ty) => ty,
            Bound::Error => Type::Error,
            Bound::Type(t) => {
                self.error(
                    DiagnosticCode::TypeMismatch,
                    format!("'{}' is a type, which is not valid in the given context", t.name),
                    expr.span(),
                );
                Type::Error
            }
            Bound::Namespace(ns) => {
                self.error(
                    DiagnosticCode::TypeMismatch,
                    format!("'{}' is a namespace, which is not valid in the given context", ns),
                    expr.span(),
                );
                Type::Error
            }
        }
    }

    /// Type of an expression whose value is consumed
    fn expect_value(
        &mut self,
        expr: &Expr,
    ) -> Type {
        match self.value_of(expr) {
            Type::Void => {
                self.error(
                    DiagnosticCode::VoidValue,
                    "Expression of type 'void' does not produce a value",
                    expr.span(),
                );
                Type::Error
            }
            ty => ty,
        }
    }

    pub(super) fn bind_expr(
        &mut self,
        expr: &Expr,
    ) -> Bound {
        match expr {
            Expr::Lit(lit, _) => Bound::Value(match lit {
                Literal::Int(_) => Type::Int,
                Literal::Double(_) => Type::Double,
                Literal::Bool(_) => Type::Bool,
                Literal::String(_) => Type::String,
            }),
            Expr::Name(ident) => self.bind_name(ident),
            Expr::Unary { op, expr, span } => {
                let ty = self.expect_value(expr);
                let result = match op {
                    UnOp::Neg if ty.is_numeric() => Some(ty),
                    UnOp::Not if ty == Type::Bool => Some(ty),
                    _ if ty.is_error() => Some(Type::Error),
                    _ => None,
                };
                match result {
                    Some(ty) => Bound::Value(ty),
                    None => {
                        let symbol = if *op == UnOp::Neg { "-" } else { "!" };
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            format!(
                                "Operator '{}' cannot be applied to operand of type '{}'",
                                symbol, ty
                            ),
                            *span,
                        );
                        Bound::Error
                    }
                }
            }
            Expr::Binary {
                op,
                left,
                right,
                span,
            } => {
                let l = self.expect_value(left);
                let r = self.expect_value(right);
                match binary_result(*op, l, r) {
                    Some(ty) => Bound::Value(ty),
                    None => {
                        self.error(
                            DiagnosticCode::TypeMismatch,
                            format!(
                                "Operator '{}' cannot be applied to operands of type '{}' and '{}'",
                                op, l, r
                            ),
                            *span,
                        );
                        Bound::Error
                    }
                }
            }
            Expr::Member {
                target, member, ..
            } => self.bind_member(target, member),
            Expr::Call { callee, args, span } => self.bind_call(callee, args, *span),
        }
    }

    fn bind_name(
        &mut self,
        ident: &Ident,
    ) -> Bound {
        if let Some(ty) = self.lookup_var(&ident.name) {
            self.classify(ident.span, SymbolClass::Variable);
            return Bound::Value(ty);
        }
        match self.imports.resolve(&ident.name) {
            Some(import) => self.bind_import(import, ident.span),
            None => {
                self.unknown_name(ident);
                Bound::Error
            }
        }
    }

    fn bind_import(
        &mut self,
        import: Import,
        span: Span,
    ) -> Bound {
        match import {
            Import::Type(t) => {
                self.classify(span, SymbolClass::Type);
                Bound::Type(t)
            }
            Import::Namespace(ns) => {
                self.classify(span, SymbolClass::Namespace);
                Bound::Namespace(ns)
            }
        }
    }

    fn bind_member(
        &mut self,
        target: &Expr,
        member: &Ident,
    ) -> Bound {
        let (owner, candidates): (String, Vec<&'static Member>) = match self.bind_expr(target) {
            Bound::Error => return Bound::Error,
            Bound::Namespace(ns) => {
                return match self.imports.resolve_in(ns, &member.name) {
                    Some(import) => self.bind_import(import, member.span),
                    None => {
                        self.error(
                            DiagnosticCode::UnknownMember,
                            format!(
                                "The type or namespace name '{}' does not exist in the namespace '{}'",
                                member.name, ns
                            ),
                            member.span,
                        );
                        Bound::Error
                    }
                };
            }
            Bound::Type(t) => (
                t.name.to_string(),
                t.members.iter().filter(|m| m.name == member.name).collect(),
            ),
            Bound::Value(ty) => {
                if ty.is_error() {
                    return Bound::Error;
                }
                (
                    ty.to_string(),
                    instance_members(ty)
                        .iter()
                        .filter(|m| m.name == member.name)
                        .collect(),
                )
            }
        };

        let Some(first) = candidates.first() else {
            self.missing_member(&owner, member);
            return Bound::Error;
        };
        match first.kind {
            MemberKind::Method => {
                self.classify(member.span, SymbolClass::Method);
                self.error(
                    DiagnosticCode::UnknownMember,
                    format!(
                        "'{}.{}' is a method, which is not valid in the given context",
                        owner, member.name
                    ),
                    member.span,
                );
                Bound::Error
            }
            MemberKind::Property => {
                self.classify(member.span, SymbolClass::Property);
                Bound::Value(first.ret)
            }
            MemberKind::Field => {
                self.classify(member.span, SymbolClass::Field);
                Bound::Value(first.ret)
            }
        }
    }

    fn missing_member(
        &mut self,
        owner: &str,
        member: &Ident,
    ) {
        self.error(
            DiagnosticCode::UnknownMember,
            format!(
                "'{}' does not contain a definition for '{}'",
                owner, member.name
            ),
            member.span,
        );
    }

    fn bind_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
    ) -> Bound {
        let (target, name) = match callee {
            Expr::Member { target, member, .. } => (target, member),
            Expr::Name(ident) => {
                for arg in args {
                    self.value_of(arg);
                }
                if self.lookup_var(&ident.name).is_some() {
                    self.classify(ident.span, SymbolClass::Variable);
                    self.error(
                        DiagnosticCode::TypeMismatch,
                        format!(
                            "'{}' is a variable but is used like a method",
                            ident.name
                        ),
                        ident.span,
                    );
                } else {
                    self.unknown_name(ident);
                }
                return Bound::Error;
            }
            _ => {
                self.error(DiagnosticCode::TypeMismatch, "Method name expected", span);
                return Bound::Error;
            }
        };

        let receiver = self.bind_expr(target);
        let arg_types: Vec<Type> = args.iter().map(|a| self.value_of(a)).collect();

        let (owner, candidates): (String, Vec<&'static Member>) = match receiver {
            Bound::Error => return Bound::Error,
            Bound::Value(ty) if ty.is_error() => return Bound::Error,
            Bound::Namespace(ns) => {
                self.error(
                    DiagnosticCode::UnknownMember,
                    format!(
                        "The type or namespace name '{}' does not exist in the namespace '{}'",
                        name.name, ns
                    ),
                    name.span,
                );
                return Bound::Error;
            }
            Bound::Type(t) => (
                t.name.to_string(),
                t.members.iter().filter(|m| m.name == name.name).collect(),
            ),
            Bound::Value(ty) => (
                ty.to_string(),
                instance_members(ty)
                    .iter()
                    .filter(|m| m.name == name.name)
                    .collect(),
            ),
        };

        if candidates.is_empty() {
            self.missing_member(&owner, name);
            return Bound::Error;
        }
        self.classify(name.span, SymbolClass::Method);

        if arg_types.iter().any(|t| t.is_error()) {
            // an argument already failed; pick by arity only to avoid noise
            return match candidates.iter().find(|m| m.params.len() == args.len()) {
                Some(m) => Bound::Value(m.ret),
                None => Bound::Error,
            };
        }

        match select_overload(candidates.iter().copied(), &arg_types) {
            Some(member) => Bound::Value(member.ret),
            None if candidates.iter().all(|m| m.params.len() != args.len()) => {
                self.error(
                    DiagnosticCode::ArgumentCount,
                    format!(
                        "No overload for method '{}' takes {} arguments",
                        name.name,
                        args.len()
                    ),
                    span,
                );
                Bound::Error
            }
            None => {
                let shown = arg_types
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.error(
                    DiagnosticCode::TypeMismatch,
                    format!(
                        "The best overload for '{}.{}' does not accept arguments ({})",
                        owner, name.name, shown
                    ),
                    span,
                );
                Bound::Error
            }
        }
    }
}

/// Result type of a binary operator, `None` if the operands do not fit
pub(crate) fn binary_result(
    op: BinOp,
    l: Type,
    r: Type,
) -> Option<Type> {
    if l.is_error() || r.is_error() {
        return Some(match op {
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => Type::Bool,
            BinOp::And | BinOp::Or => Type::Bool,
            _ => Type::Error,
        });
    }

    let numeric = |l: Type, r: Type| {
        if l == Type::Int && r == Type::Int {
            Type::Int
        } else {
            Type::Double
        }
    };
    let both_numeric = l.is_numeric() && r.is_numeric();

    match op {
        BinOp::Add if l == Type::String || r == Type::String => Some(Type::String),
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem if both_numeric => {
            Some(numeric(l, r))
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge if both_numeric => Some(Type::Bool),
        BinOp::Eq | BinOp::Neq if l == r || both_numeric => Some(Type::Bool),
        BinOp::And | BinOp::Or if l == Type::Bool && r == Type::Bool => Some(Type::Bool),
        _ => None,
    }
}
