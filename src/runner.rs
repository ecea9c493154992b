use std::io;

use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;

/// Runs a whole source text against a fresh environment. Parse diagnostics
/// suppress evaluation; a runtime error is the only evaluation result that
/// gets printed.
pub fn run(source: &str) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        print_parser_errors(parser.errors());
        return;
    }

    let mut evaluator = Evaluator::new(io::stdout());
    let value = evaluator.eval_program(&program);
    if value.is_error() {
        println!("{}", value);
    }
}

/// Parses a source text and prints its canonical form instead of running it.
pub fn dump_ast(source: &str) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        print_parser_errors(parser.errors());
        return;
    }

    print!("{}", program);
}

fn print_parser_errors(errors: &[String]) {
    for error in errors {
        println!("parser error: {}", error);
    }
}
