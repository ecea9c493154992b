use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::ast::{Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::value::{Builtin, Function, Value};

/// Shared handle to a scope. Closures keep their defining scope alive
/// through this, and every closure over the same scope observes the same
/// mutations.
pub type Env = Rc<RefCell<Environment>>;

/// A name→value mapping with a link to the enclosing scope.
///
/// `declare` binds in the current scope only and refuses rebinding there
/// (shadowing an outer binding is fine); `assign` overwrites the nearest
/// enclosing binding and never creates one.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    parent: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_child(parent: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .parent
                .as_ref()
                .and_then(|parent| parent.borrow().get(name)),
        }
    }

    /// Returns false if the name already exists in this scope.
    pub fn declare(&mut self, name: &str, value: Value) -> bool {
        if self.store.contains_key(name) {
            return false;
        }
        self.store.insert(name.to_string(), value);
        true
    }

    /// Returns false if no enclosing scope holds the name.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.store.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => false,
        }
    }
}

/// Recursive tree walker.
///
/// Holds the global environment (so a REPL can evaluate many programs into
/// the same scope) and the sink that the printing intrinsics write to.
/// Drivers pass `io::stdout()`; tests pass a `Vec<u8>` and assert on it.
pub struct Evaluator<W: Write> {
    globals: Env,
    out: W,
}

impl<W: Write> Evaluator<W> {
    pub fn new(out: W) -> Self {
        Self {
            globals: Environment::new(),
            out,
        }
    }

    /// Evaluates a whole program in the global scope. The result is the
    /// value of the last evaluated statement, with an outer early-return
    /// wrapper stripped; statement evaluation stops at the first error or
    /// early return.
    pub fn eval_program(&mut self, program: &Program) -> Value {
        let env = Rc::clone(&self.globals);
        self.eval_statements(&program.statements, &env).unwrap_return()
    }

    fn eval_statements(&mut self, statements: &[Stmt], env: &Env) -> Value {
        let mut result = Value::Null;

        for stmt in statements {
            result = self.eval_statement(stmt, env);
            if matches!(result, Value::Return(_) | Value::Error(_)) {
                return result;
            }
        }

        result
    }

    fn eval_statement(&mut self, stmt: &Stmt, env: &Env) -> Value {
        match stmt {
            Stmt::Let { name, value } => {
                let value = self.eval_expression(value, env);
                self.declare_value(name, value, env)
            }
            Stmt::Fn { name, params, body } => {
                // Sugar for `let name = fn(params) { body };`
                let value = Value::Fn(Function {
                    params: params.clone(),
                    body: body.clone(),
                    env: Rc::clone(env),
                });
                self.declare_value(name, value, env)
            }
            Stmt::Return { value } => {
                Value::Return(Box::new(self.eval_expression(value, env)))
            }
            Stmt::Expr { value } => self.eval_expression(value, env),
            Stmt::Block(block) => {
                let child = Environment::new_child(env);
                self.eval_statements(&block.statements, &child)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => self.eval_if(condition, then_branch, else_branch.as_deref(), env),
        }
    }

    fn declare_value(&mut self, name: &str, value: Value, env: &Env) -> Value {
        if value.is_error() {
            return value;
        }
        if env.borrow_mut().declare(name, value) {
            Value::Null
        } else {
            Value::Error(format!("identifier already exists: {}", name))
        }
    }

    fn eval_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        env: &Env,
    ) -> Value {
        match self.eval_expression(condition, env) {
            Value::Bool(true) => self.eval_statement(then_branch, env),
            Value::Bool(false) => match else_branch {
                Some(alt) => self.eval_statement(alt, env),
                None => Value::Null,
            },
            other => Value::Error(format!(
                "if statement condition must evaluate to bool not {}",
                other.type_name()
            )),
        }
    }

    fn eval_expression(&mut self, expr: &Expr, env: &Env) -> Value {
        match expr {
            Expr::Int(value) => Value::Int(*value),
            Expr::Bool(value) => Value::Bool(*value),
            Expr::Null => Value::Null,
            Expr::Str(text) => Value::Str(text.clone()),
            Expr::Ident(name) => self.eval_identifier(name, env),
            Expr::Fn { params, body } => Value::Fn(Function {
                params: params.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            }),
            Expr::Prefix { operator, right } => {
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                eval_prefix(*operator, right)
            }
            Expr::Infix {
                left,
                operator,
                right,
            } => self.eval_infix(left, *operator, right, env),
            Expr::Call { function, args } => self.eval_call_expression(function, args, env),
        }
    }

    fn eval_identifier(&mut self, name: &str, env: &Env) -> Value {
        if let Some(value) = env.borrow().get(name) {
            return value;
        }
        if let Some(builtin) = Builtin::lookup(name) {
            return Value::Builtin(builtin);
        }
        Value::Error(format!("identifier not found: {}", name))
    }

    // The right operand is evaluated before the left one; for `=` only the
    // right side is evaluated at all, the left must name a binding.
    fn eval_infix(&mut self, left: &Expr, operator: InfixOp, right: &Expr, env: &Env) -> Value {
        let right_val = self.eval_expression(right, env);
        if right_val.is_error() {
            return right_val;
        }

        if operator == InfixOp::Assign {
            return match left {
                Expr::Ident(name) => {
                    if env.borrow_mut().assign(name, right_val.clone()) {
                        right_val
                    } else {
                        Value::Error(format!("identifier not found: {}", name))
                    }
                }
                other => Value::Error(format!("{} is not an identifier", other)),
            };
        }

        let left_val = self.eval_expression(left, env);
        if left_val.is_error() {
            return left_val;
        }

        eval_infix_values(operator, left_val, right_val)
    }

    fn eval_call_expression(&mut self, function: &Expr, args: &[Expr], env: &Env) -> Value {
        let callee = self.eval_expression(function, env);
        if callee.is_error() {
            return callee;
        }

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            let value = self.eval_expression(arg, env);
            if value.is_error() {
                return value;
            }
            arg_values.push(value);
        }

        self.eval_call(callee, arg_values)
    }

    fn eval_call(&mut self, callee: Value, args: Vec<Value>) -> Value {
        match callee {
            Value::Fn(function) => {
                if args.len() != function.params.len() {
                    return Value::Error(format!(
                        "wrong number of arguments: wanted {}, got {}",
                        function.params.len(),
                        args.len()
                    ));
                }

                // Parameters bind in a fresh child of the captured scope and
                // the body runs directly in it, so `let` of a parameter name
                // is a duplicate.
                let env = Environment::new_child(&function.env);
                for (param, arg) in function.params.iter().zip(args) {
                    env.borrow_mut().declare(param, arg);
                }

                self.eval_statements(&function.body.statements, &env)
                    .unwrap_return()
            }
            Value::Builtin(builtin) => self.apply_builtin(builtin, args),
            other => Value::Error(format!("{} is not a function", other.type_name())),
        }
    }

    fn apply_builtin(&mut self, builtin: Builtin, args: Vec<Value>) -> Value {
        match builtin {
            Builtin::Echo => match args.as_slice() {
                [value] => value.clone(),
                _ => Value::Error(format!(
                    "wrong number of arguments: wanted 1, got {}",
                    args.len()
                )),
            },
            Builtin::Inspect => {
                for arg in &args {
                    let _ = writeln!(self.out, "{}", arg);
                }
                let _ = self.out.flush();
                Value::Null
            }
            Builtin::Println => self.builtin_println(&args),
        }
    }

    /// `println(fmt, …)`: every `{}` in the format string is replaced by the
    /// inspect rendering of the next argument.
    fn builtin_println(&mut self, args: &[Value]) -> Value {
        let format = match args.first() {
            Some(Value::Str(text)) => text,
            _ => {
                return Value::Error(
                    "println expects at least one argument of type string".to_string(),
                )
            }
        };

        let bytes = format.as_bytes();
        let mut rendered = Vec::with_capacity(bytes.len());
        let mut next_arg = 1;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'{' && i + 1 < bytes.len() && bytes[i + 1] == b'}' {
                if next_arg >= args.len() {
                    return Value::Error("println expects more arguments".to_string());
                }
                rendered.extend_from_slice(args[next_arg].to_string().as_bytes());
                next_arg += 1;
                i += 2;
            } else {
                rendered.push(bytes[i]);
                i += 1;
            }
        }

        rendered.push(b'\n');
        let _ = self.out.write_all(&rendered);
        let _ = self.out.flush();
        Value::Null
    }
}

fn eval_prefix(operator: PrefixOp, right: Value) -> Value {
    match operator {
        PrefixOp::Not => match right {
            Value::Bool(value) => Value::Bool(!value),
            other => Value::Error(format!(
                "type {} is incompatible with ! operator",
                other.type_name()
            )),
        },
        PrefixOp::Negate => match right {
            Value::Int(value) => Value::Int(value.wrapping_neg()),
            other => Value::Error(format!(
                "type {} is incompatible with - operator",
                other.type_name()
            )),
        },
    }
}

fn eval_infix_values(operator: InfixOp, left: Value, right: Value) -> Value {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => eval_int_infix(operator, l, r),
        (Value::Bool(l), Value::Bool(r)) => eval_bool_infix(operator, l, r),
        (Value::Str(l), Value::Str(r)) => eval_string_infix(operator, l, r),
        (l, r) => Value::Error(format!(
            "types mismatch {} {} {}",
            l.type_name(),
            operator,
            r.type_name()
        )),
    }
}

fn eval_int_infix(operator: InfixOp, left: i32, right: i32) -> Value {
    match operator {
        InfixOp::Add => Value::Int(left.wrapping_add(right)),
        InfixOp::Subtract => Value::Int(left.wrapping_sub(right)),
        InfixOp::Multiply => Value::Int(left.wrapping_mul(right)),
        // Truncates toward zero; division by zero is left to the host.
        InfixOp::Divide => Value::Int(left / right),
        InfixOp::Equal => Value::Bool(left == right),
        InfixOp::NotEqual => Value::Bool(left != right),
        InfixOp::Less => Value::Bool(left < right),
        InfixOp::LessEqual => Value::Bool(left <= right),
        InfixOp::Greater => Value::Bool(left > right),
        InfixOp::GreaterEqual => Value::Bool(left >= right),
        _ => Value::Error(format!("type int is incompatible with {} operator", operator)),
    }
}

fn eval_bool_infix(operator: InfixOp, left: bool, right: bool) -> Value {
    match operator {
        InfixOp::Equal => Value::Bool(left == right),
        InfixOp::NotEqual => Value::Bool(left != right),
        _ => Value::Error(format!(
            "type bool is incompatible with {} operator",
            operator
        )),
    }
}

fn eval_string_infix(operator: InfixOp, left: String, right: String) -> Value {
    match operator {
        InfixOp::Add => Value::Str(left + &right),
        _ => Value::Error(format!(
            "type string is incompatible with {} operator",
            operator
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declare_refuses_same_scope_rebinding() {
        let env = Environment::new();
        assert!(env.borrow_mut().declare("x", Value::Int(1)));
        assert!(!env.borrow_mut().declare("x", Value::Int(2)));
        assert_eq!(env.borrow().get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn child_scope_shadows_parent() {
        let parent = Environment::new();
        parent.borrow_mut().declare("x", Value::Int(1));

        let child = Environment::new_child(&parent);
        assert!(child.borrow_mut().declare("x", Value::Int(2)));
        assert_eq!(child.borrow().get("x"), Some(Value::Int(2)));
        assert_eq!(parent.borrow().get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn get_walks_parents() {
        let parent = Environment::new();
        parent.borrow_mut().declare("x", Value::Int(1));

        let child = Environment::new_child(&parent);
        assert_eq!(child.borrow().get("x"), Some(Value::Int(1)));
        assert_eq!(child.borrow().get("y"), None);
    }

    #[test]
    fn assign_overwrites_nearest_binding() {
        let parent = Environment::new();
        parent.borrow_mut().declare("x", Value::Int(1));

        let child = Environment::new_child(&parent);
        assert!(child.borrow_mut().assign("x", Value::Int(9)));
        assert_eq!(parent.borrow().get("x"), Some(Value::Int(9)));
    }

    #[test]
    fn assign_never_creates() {
        let env = Environment::new();
        assert!(!env.borrow_mut().assign("missing", Value::Int(1)));
        assert_eq!(env.borrow().get("missing"), None);
    }

    #[test]
    fn prefix_operators() {
        assert_eq!(eval_prefix(PrefixOp::Not, Value::Bool(true)), Value::Bool(false));
        assert_eq!(eval_prefix(PrefixOp::Not, Value::Bool(false)), Value::Bool(true));
        assert_eq!(eval_prefix(PrefixOp::Negate, Value::Int(5)), Value::Int(-5));
        assert_eq!(
            eval_prefix(PrefixOp::Not, Value::Int(1)),
            Value::Error("type int is incompatible with ! operator".to_string())
        );
        assert_eq!(
            eval_prefix(PrefixOp::Negate, Value::Bool(true)),
            Value::Error("type bool is incompatible with - operator".to_string())
        );
    }

    #[test]
    fn int_division_truncates_toward_zero() {
        assert_eq!(eval_int_infix(InfixOp::Divide, 7, 2), Value::Int(3));
        assert_eq!(eval_int_infix(InfixOp::Divide, -7, 2), Value::Int(-3));
    }

    #[test]
    fn mismatched_operand_types() {
        assert_eq!(
            eval_infix_values(InfixOp::Add, Value::Bool(true), Value::Int(1)),
            Value::Error("types mismatch bool + int".to_string())
        );
        assert_eq!(
            eval_infix_values(InfixOp::Less, Value::Str("a".into()), Value::Int(1)),
            Value::Error("types mismatch string < int".to_string())
        );
    }

    #[test]
    fn unsupported_operators_for_type() {
        assert_eq!(
            eval_infix_values(InfixOp::Less, Value::Bool(true), Value::Bool(false)),
            Value::Error("type bool is incompatible with < operator".to_string())
        );
        assert_eq!(
            eval_infix_values(InfixOp::Subtract, Value::Str("a".into()), Value::Str("b".into())),
            Value::Error("type string is incompatible with - operator".to_string())
        );
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(
            eval_infix_values(
                InfixOp::Add,
                Value::Str("hi ".into()),
                Value::Str("there".into())
            ),
            Value::Str("hi there".into())
        );
    }
}
