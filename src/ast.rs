use std::fmt;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let {
        name: String,
        value: Expr,
    },
    Return {
        value: Expr,
    },
    Expr {
        value: Expr,
    },
    Block(Block),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `fn name(params) { body }`, sugar for `let name = fn(params) { body };`
    Fn {
        name: String,
        params: Vec<String>,
        body: Block,
    },
}

/// A brace-delimited statement sequence. Function bodies are always blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    Int(i32),
    Bool(bool),
    Null,
    Str(String),
    Prefix {
        operator: PrefixOp,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: InfixOp,
        right: Box<Expr>,
    },
    Call {
        function: Box<Expr>,
        args: Vec<Expr>,
    },
    Fn {
        params: Vec<String>,
        body: Block,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Assign,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PrefixOp::Negate => "-",
            PrefixOp::Not => "!",
        };
        write!(f, "{}", text)
    }
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            InfixOp::Add => "+",
            InfixOp::Subtract => "-",
            InfixOp::Multiply => "*",
            InfixOp::Divide => "/",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
            InfixOp::Less => "<",
            InfixOp::LessEqual => "<=",
            InfixOp::Greater => ">",
            InfixOp::GreaterEqual => ">=",
            InfixOp::Assign => "=",
        };
        write!(f, "{}", text)
    }
}

// The Display impls reproduce canonical source text. Expressions come back
// fully parenthesized, which makes precedence visible when dumping an AST.

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Let { name, value } => writeln!(f, "let {} = {};", name, value),
            Stmt::Return { value } => writeln!(f, "return {};", value),
            Stmt::Expr { value } => writeln!(f, "{};", value),
            Stmt::Block(block) => write!(f, "{}", block),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                write!(f, "if {} {}", condition, then_branch)?;
                if let Some(alt) = else_branch {
                    write!(f, "else {}", alt)?;
                }
                Ok(())
            }
            Stmt::Fn { name, params, body } => {
                write!(f, "fn {}({}) {}", name, params.join(", "), body)
            }
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(name) => write!(f, "{}", name),
            Expr::Int(value) => write!(f, "{}", value),
            Expr::Bool(value) => write!(f, "{}", value),
            Expr::Null => write!(f, "null"),
            Expr::Str(text) => write!(f, "\"{}\"", text),
            Expr::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Expr::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator, right),
            Expr::Call { function, args } => {
                let args = args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({})", function, args)
            }
            Expr::Fn { params, body } => write!(f, "fn({}) {}", params.join(", "), body),
        }
    }
}
