use std::fmt;
use std::rc::Rc;

use crate::ast::Block;
use crate::evaluator::Env;

/// Runtime values. `Return` never escapes the evaluator: it only exists to
/// carry an early return up to the nearest function or program boundary.
/// Runtime failures are first-class `Error` values rather than Rust errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    Null,
    Str(String),
    Fn(Function),
    Builtin(Builtin),
    Return(Box<Value>),
    Error(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Fn(_) => "fn",
            Value::Builtin(_) => "builtin fn",
            Value::Return(_) => "return",
            Value::Error(_) => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Strips an outer `Return` wrapper. Only function invocation and
    /// program evaluation do this; blocks pass the wrapper through.
    pub fn unwrap_return(self) -> Value {
        match self {
            Value::Return(inner) => *inner,
            other => other,
        }
    }
}

// The Display rendering doubles as the language's `inspect` form: raw string
// text without quotes, `true`/`false`, `null`, and pretty-printed closures.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Null => write!(f, "null"),
            Value::Str(text) => write!(f, "{}", text),
            Value::Fn(function) => {
                write!(f, "fn({}) {}", function.params.join(", "), function.body)
            }
            Value::Builtin(_) => write!(f, "builtin fn"),
            Value::Return(inner) => write!(f, "return value: {}", inner),
            Value::Error(message) => write!(f, "runtime error: {}", message),
        }
    }
}

/// A closure: parameter names, body, and the environment captured at the
/// point the `fn` literal was evaluated.
#[derive(Clone)]
pub struct Function {
    pub params: Vec<String>,
    pub body: Block,
    pub env: Env,
}

// The captured environment stays out of Debug output: the scope graph
// reaches back to every value bound in it, including this closure.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.body == other.body
            && Rc::ptr_eq(&self.env, &other.env)
    }
}

/// Host-provided intrinsics, resolved when an identifier misses the
/// environment. Application lives in the evaluator, next to its output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Echo,
    Inspect,
    Println,
}

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        match name {
            "echo" => Some(Builtin::Echo),
            "inspect" => Some(Builtin::Inspect),
            "println" => Some(Builtin::Println),
            _ => None,
        }
    }
}
