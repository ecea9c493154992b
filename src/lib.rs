// Silt Language Interpreter Library
//
// Core pipeline for the Silt language: a byte-driven lexer, a Pratt parser
// producing a typed AST, and a tree-walking evaluator with first-class
// closures over lexically nested environments.

// Public modules
pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
pub use evaluator::{Env, Environment, Evaluator};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use value::{Builtin, Function, Value};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
