//! Tree-walking interpreter for compiled lines
//!
//! Globals live in the interpreter and persist across `execute` calls, so a
//! chain of lines is run by executing each line in order on one interpreter.

use std::collections::HashMap;

use tracing::trace;

use super::output::EvaluationLogger;
use super::value::Value;
use super::{RuntimeError, MAX_STRING_LENGTH};
use crate::frontend::parser::ast::*;
use crate::frontend::parser::SyntaxTree;
use crate::frontend::semantic::{Import, Imports, SemanticModel, Type};
use crate::references::{instance_members, select_overload, CallContext, Member, MemberKind};

/// Default step budget per line
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

#[derive(Debug)]
pub struct Interpreter {
    globals: HashMap<String, Value>,
    max_steps: u64,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STEPS)
    }
}

impl Interpreter {
    pub fn new(max_steps: u64) -> Self {
        Self {
            globals: HashMap::new(),
            max_steps,
        }
    }

    /// Current value of a global
    pub fn global(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Run one compiled line; returns the trailing result value, if any
    pub fn execute(
        &mut self,
        tree: &SyntaxTree,
        model: &SemanticModel,
        logger: &dyn EvaluationLogger,
    ) -> Result<Option<Value>, RuntimeError> {
        let mut frame = Frame {
            globals: &mut self.globals,
            scopes: Vec::new(),
            imports: &model.imports,
            ctx: CallContext { logger },
            steps: 0,
            max_steps: self.max_steps,
        };

        let mut result = None;
        for stmt in tree.statements() {
            match &stmt.kind {
                StmtKind::Result(expr) => {
                    frame.tick()?;
                    let value = frame.eval(expr)?;
                    result = (value != Value::Void).then_some(value);
                }
                _ => frame.exec(stmt)?,
            }
        }
        trace!("Line finished after {} steps", frame.steps);
        Ok(result)
    }
}

struct Frame<'a> {
    globals: &'a mut HashMap<String, Value>,
    scopes: Vec<HashMap<String, Value>>,
    imports: &'a Imports,
    ctx: CallContext<'a>,
    steps: u64,
    max_steps: u64,
}

impl Frame<'_> {
    fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(RuntimeError::StepBudgetExceeded(self.max_steps));
        }
        Ok(())
    }

    fn lookup(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|s| s.get(name))
            .or_else(|| self.globals.get(name))
    }

    fn slot(
        &mut self,
        name: &str,
    ) -> Option<&mut Value> {
        if let Some(scope) = self.scopes.iter_mut().rev().find(|s| s.contains_key(name)) {
            return scope.get_mut(name);
        }
        self.globals.get_mut(name)
    }

    fn define(
        &mut self,
        name: &str,
        value: Value,
    ) {
        match self.scopes.last_mut() {
            Some(scope) => scope.insert(name.to_string(), value),
            None => self.globals.insert(name.to_string(), value),
        };
    }

    fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, RuntimeError>,
    ) -> Result<T, RuntimeError> {
        self.scopes.push(HashMap::new());
        let result = f(self);
        self.scopes.pop();
        result
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn exec(
        &mut self,
        stmt: &Stmt,
    ) -> Result<(), RuntimeError> {
        self.tick()?;
        match &stmt.kind {
            StmtKind::Using { .. } | StmtKind::Reference { .. } | StmtKind::Empty => Ok(()),
            StmtKind::VarDecl { ty, name, init, .. } => {
                let declared = Type::from_name(*ty);
                let value = match init {
                    Some(expr) => self.eval(expr)?,
                    None => Value::default_for(declared.unwrap_or(Type::Error)),
                };
                let value = match declared {
                    Some(ty) => value.coerce(ty),
                    None => value,
                };
                self.define(&name.name, value);
                Ok(())
            }
            StmtKind::Assign { target, op, value } => {
                let rhs = self.eval(value)?;
                let current = self
                    .lookup(&target.name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::Unbound(target.name.clone()))?;
                let updated = match op {
                    AssignOp::Set => rhs,
                    AssignOp::Add => binary(BinOp::Add, current.clone(), rhs)?,
                    AssignOp::Sub => binary(BinOp::Sub, current.clone(), rhs)?,
                };
                let updated = updated.coerce(current.ty());
                if let Some(slot) = self.slot(&target.name) {
                    *slot = updated;
                }
                Ok(())
            }
            StmtKind::Expr(expr) | StmtKind::Result(expr) => self.eval(expr).map(|_| ()),
            StmtKind::Block(block) => self.exec_block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.condition(condition)? {
                    self.scoped(|f| f.exec(then_branch))
                } else if let Some(else_branch) = else_branch {
                    self.scoped(|f| f.exec(else_branch))
                } else {
                    Ok(())
                }
            }
            StmtKind::While { condition, body } => {
                while self.condition(condition)? {
                    self.scoped(|f| f.exec(body))?;
                }
                Ok(())
            }
        }
    }

    fn exec_block(
        &mut self,
        block: &Block,
    ) -> Result<(), RuntimeError> {
        self.scoped(|f| {
            for stmt in &block.stmts {
                f.exec(stmt)?;
            }
            Ok(())
        })
    }

    fn condition(
        &mut self,
        expr: &Expr,
    ) -> Result<bool, RuntimeError> {
        self.tick()?;
        self.eval(expr)?
            .as_bool()
            .ok_or_else(|| RuntimeError::InvalidOperation("condition is not a bool".to_string()))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn eval(
        &mut self,
        expr: &Expr,
    ) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Lit(lit, _) => Ok(match lit {
                Literal::Int(n) => Value::Int(*n),
                Literal::Double(d) => Value::Double(*d),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::String(s) => Value::string(s.as_str()),
            }),
            Expr::Name(ident) => self
                .lookup(&ident.name)
                .cloned()
                .ok_or_else(|| RuntimeError::Unbound(ident.name.clone())),
            Expr::Unary { op, expr, .. } => match (op, self.eval(expr)?) {
                (UnOp::Neg, Value::Int(n)) => Ok(Value::Int(n.wrapping_neg())),
                (UnOp::Neg, Value::Double(d)) => Ok(Value::Double(-d)),
                (UnOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (_, v) => Err(RuntimeError::InvalidOperation(format!(
                    "unary operator on {}",
                    v.ty()
                ))),
            },
            Expr::Binary {
                op: BinOp::And,
                left,
                right,
                ..
            } => Ok(Value::Bool(self.condition(left)? && self.condition(right)?)),
            Expr::Binary {
                op: BinOp::Or,
                left,
                right,
                ..
            } => Ok(Value::Bool(self.condition(left)? || self.condition(right)?)),
            Expr::Binary {
                op, left, right, ..
            } => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;
                binary(*op, l, r)
            }
            Expr::Member { target, member, .. } => self.eval_member(target, member),
            Expr::Call { callee, args, .. } => self.eval_call(callee, args),
        }
    }

    /// Resolve `Math` or `System.Math` to a library type when the prefix is
    /// not shadowed by a variable
    fn resolve_static(
        &self,
        expr: &Expr,
    ) -> Option<Import> {
        match expr {
            Expr::Name(ident) if self.lookup(&ident.name).is_none() => self.imports.resolve(&ident.name),
            Expr::Member { target, member, .. } => match self.resolve_static(target)? {
                Import::Namespace(ns) => self.imports.resolve_in(ns, &member.name),
                Import::Type(_) => None,
            },
            _ => None,
        }
    }

    fn eval_member(
        &mut self,
        target: &Expr,
        member: &Ident,
    ) -> Result<Value, RuntimeError> {
        if let Some(Import::Type(t)) = self.resolve_static(target) {
            let found = t
                .members
                .iter()
                .find(|m| m.name == member.name && m.kind != MemberKind::Method);
            return match found {
                Some(m) => (m.invoke)(&self.ctx, &[]),
                None => Err(RuntimeError::Unbound(format!("{}.{}", t.name, member.name))),
            };
        }

        let receiver = self.eval(target)?;
        let found = instance_members(receiver.ty())
            .iter()
            .find(|m| m.name == member.name && m.kind != MemberKind::Method);
        match found {
            Some(m) => (m.invoke)(&self.ctx, &[receiver]),
            None => Err(RuntimeError::Unbound(member.name.clone())),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
    ) -> Result<Value, RuntimeError> {
        let Expr::Member { target, member, .. } = callee else {
            return Err(RuntimeError::InvalidOperation("call target is not a method".to_string()));
        };

        let static_type = match self.resolve_static(target) {
            Some(Import::Type(t)) => Some(t),
            _ => None,
        };
        let receiver = match static_type {
            Some(_) => None,
            None => Some(self.eval(target)?),
        };

        let mut values = Vec::with_capacity(args.len() + 1);
        for arg in args {
            values.push(self.eval(arg)?);
        }
        let arg_types: Vec<Type> = values.iter().map(Value::ty).collect();

        let candidates: Vec<&'static Member> = match (&receiver, static_type) {
            (_, Some(t)) => t.members.iter().filter(|m| m.name == member.name).collect(),
            (Some(value), None) => instance_members(value.ty())
                .iter()
                .filter(|m| m.name == member.name)
                .collect(),
            (None, None) => Vec::new(),
        };
        let method = select_overload(candidates, &arg_types)
            .ok_or_else(|| RuntimeError::Unbound(member.name.clone()))?;

        let mut call_args: Vec<Value> = values
            .into_iter()
            .zip(method.params)
            .map(|(v, p)| v.coerce(*p))
            .collect();
        if let Some(receiver) = receiver {
            call_args.insert(0, receiver);
        }
        (method.invoke)(&self.ctx, &call_args)
    }
}

/// Apply a non-short-circuit binary operator
fn binary(
    op: BinOp,
    l: Value,
    r: Value,
) -> Result<Value, RuntimeError> {
    use Value::*;

    if op == BinOp::Add && (matches!(l, String(_)) || matches!(r, String(_))) {
        let (l, r) = (l.to_string(), r.to_string());
        if l.len() + r.len() > MAX_STRING_LENGTH {
            return Err(RuntimeError::StringTooLong(MAX_STRING_LENGTH));
        }
        return Ok(Value::string(l + &r));
    }

    match (l, r) {
        (Int(a), Int(b)) => int_op(op, a, b),
        (Bool(a), Bool(b)) => match op {
            BinOp::Eq => Ok(Bool(a == b)),
            BinOp::Neq => Ok(Bool(a != b)),
            _ => Err(unsupported(op, Type::Bool)),
        },
        (String(a), String(b)) => match op {
            BinOp::Eq => Ok(Bool(a == b)),
            BinOp::Neq => Ok(Bool(a != b)),
            _ => Err(unsupported(op, Type::String)),
        },
        (l, r) => match (l.as_double(), r.as_double()) {
            (Some(a), Some(b)) => double_op(op, a, b),
            _ => Err(unsupported(op, l.ty())),
        },
    }
}

fn int_op(
    op: BinOp,
    a: i64,
    b: i64,
) -> Result<Value, RuntimeError> {
    Ok(match op {
        BinOp::Add => Value::Int(a.wrapping_add(b)),
        BinOp::Sub => Value::Int(a.wrapping_sub(b)),
        BinOp::Mul => Value::Int(a.wrapping_mul(b)),
        BinOp::Div => {
            if b == 0 {
                return Err(RuntimeError::DivideByZero);
            }
            Value::Int(a.checked_div(b).ok_or(RuntimeError::Overflow)?)
        }
        BinOp::Rem => {
            if b == 0 {
                return Err(RuntimeError::DivideByZero);
            }
            Value::Int(a.wrapping_rem(b))
        }
        BinOp::Eq => Value::Bool(a == b),
        BinOp::Neq => Value::Bool(a != b),
        BinOp::Lt => Value::Bool(a < b),
        BinOp::Le => Value::Bool(a <= b),
        BinOp::Gt => Value::Bool(a > b),
        BinOp::Ge => Value::Bool(a >= b),
        BinOp::And | BinOp::Or => return Err(unsupported(op, Type::Int)),
    })
}

fn double_op(
    op: BinOp,
    a: f64,
    b: f64,
) -> Result<Value, RuntimeError> {
    Ok(match op {
        BinOp::Add => Value::Double(a + b),
        BinOp::Sub => Value::Double(a - b),
        BinOp::Mul => Value::Double(a * b),
        BinOp::Div => Value::Double(a / b),
        BinOp::Rem => Value::Double(a % b),
        BinOp::Eq => Value::Bool(a == b),
        BinOp::Neq => Value::Bool(a != b),
        BinOp::Lt => Value::Bool(a < b),
        BinOp::Le => Value::Bool(a <= b),
        BinOp::Gt => Value::Bool(a > b),
        BinOp::Ge => Value::Bool(a >= b),
        BinOp::And | BinOp::Or => return Err(unsupported(op, Type::Double)),
    })
}

fn unsupported(
    op: BinOp,
    ty: Type,
) -> RuntimeError {
    RuntimeError::InvalidOperation(format!("operator '{}' on {}", op, ty))
}
