use anyhow::Context;
use clap::{Arg, Command};
use std::fs;
use std::process;

use silt::{repl, runner};

fn main() -> anyhow::Result<()> {
    let matches = Command::new("silt")
        .about("A small expression-oriented scripting language with first-class functions")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode even when a file is given")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ast")
                .long("ast")
                .help("Parse the file and print its AST instead of evaluating")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    match matches.get_one::<String>("file") {
        Some(path) if !matches.get_flag("interactive") => {
            let source = read_file(path);
            if matches.get_flag("ast") {
                runner::dump_ast(&source);
            } else {
                runner::run(&source);
            }
        }
        _ => repl::start().context("repl terminated on an I/O error")?,
    }

    Ok(())
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(_) => {
            eprintln!("Failed to open file {}", path);
            process::exit(1);
        }
    }
}
