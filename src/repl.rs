use std::io::{self, BufRead, Write};

use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;

const PROMPT: &str = "> ";

/// Interactive loop. Every line is lexed, parsed and evaluated against one
/// persistent evaluator, so bindings survive between lines.
pub fn start() -> io::Result<()> {
    println!("Silt v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut evaluator = Evaluator::new(io::stdout());
    let mut line = String::new();

    loop {
        write!(stdout, "{}", PROMPT)?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF (Ctrl+D or piped input ended)
            println!();
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            println!("Goodbye!");
            break;
        }

        run_line(input, &mut evaluator);
    }

    Ok(())
}

fn run_line(source: &str, evaluator: &mut Evaluator<io::Stdout>) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        for error in parser.errors() {
            println!("parser error: {}", error);
        }
        return;
    }

    let value = evaluator.eval_program(&program);
    println!("{}", value);
}
