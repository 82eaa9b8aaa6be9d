//! Think Language CLI
//!
//! Command-line interface for the Think programming language.

use std::env;
use std::fs;
use std::process;

use think_lang::{run, Diagnostic, ExecuteOptions, Lexer, TraceStyle, VERSION};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut explain = false;
    let mut show_tokens = false;
    let mut show_help = false;
    let mut style = TraceStyle::Default;
    let mut filename: Option<&String> = None;

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--explain" | "-e" => explain = true,
            "--tokens" | "-t" => show_tokens = true,
            "--help" | "-h" => show_help = true,
            "--style" => {
                let Some(name) = iter.next() else {
                    eprintln!("Error: --style requires a value");
                    print_usage();
                    process::exit(1);
                };
                match TraceStyle::from_name(name) {
                    Some(s) => style = s,
                    None => {
                        eprintln!("Unknown style: {}", name);
                        eprintln!(
                            "Available styles: {}",
                            TraceStyle::ALL
                                .iter()
                                .map(|s| s.name())
                                .collect::<Vec<_>>()
                                .join(", ")
                        );
                        process::exit(1);
                    }
                }
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown flag: {}", arg);
                print_usage();
                process::exit(1);
            }
            _ => filename = Some(arg),
        }
    }

    if show_help {
        print_help();
        return;
    }

    let Some(file) = filename else {
        eprintln!("Error: No input file specified");
        print_usage();
        process::exit(1);
    };

    if show_tokens {
        if let Err(e) = show_file_tokens(file) {
            eprintln!("{}", e);
            process::exit(1);
        }
        return;
    }

    let options = ExecuteOptions {
        explain,
        style,
        max_loop_iterations: None,
    };
    if let Err(e) = run_file(file, &options) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: think [OPTIONS] [script]");
    eprintln!("       think --help");
}

fn print_help() {
    println!("Think v{} - An educational programming language", VERSION);
    println!();
    println!("USAGE:");
    println!("    think [OPTIONS] [script]");
    println!();
    println!("OPTIONS:");
    println!("    -e, --explain      Trace execution step by step");
    println!("        --style NAME   Trace style: default, minimal, detailed,");
    println!("                       color, markdown, educational");
    println!("    -t, --tokens       Show tokenization output (lexer only)");
    println!("    -h, --help         Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("    think grades.think                    Run a Think script");
    println!("    think --explain grades.think          Run with an execution trace");
    println!("    think --explain --style color x.think Colored execution trace");
    println!("    think --tokens grades.think           Show tokens from the lexer");
}

/// Run a Think script from a file
fn run_file(filename: &str, options: &ExecuteOptions) -> Result<(), String> {
    let source = fs::read_to_string(filename)
        .map_err(|e| format!("Failed to read file '{}': {}", filename, e))?;

    match run(&source, options) {
        Ok(result) => {
            // The trace already renders every OUTPUT line; without
            // explain mode only the raw program output is shown
            if let Some(trace) = result.trace {
                print!("{}", trace);
            } else {
                print!("{}", result.program_output);
            }
            Ok(())
        }
        Err(e) => Err(Diagnostic::with_source(e, &source).format()),
    }
}

/// Show tokens from lexing a file
fn show_file_tokens(filename: &str) -> Result<(), String> {
    let source = fs::read_to_string(filename)
        .map_err(|e| format!("Failed to read file '{}': {}", filename, e))?;

    let mut lexer = Lexer::new(&source, Some(filename));
    let tokens = lexer.tokenize().map_err(|e| format!("{}", e))?;

    println!("Tokens for '{}':", filename);
    println!("{}", "=".repeat(60));

    for (i, token) in tokens.iter().enumerate() {
        println!(
            "{:4}: {:24} | {:?}",
            i,
            format!("{:?}", token.token_type),
            token.lexeme
        );
    }

    println!("{}", "=".repeat(60));
    println!("Total tokens: {}", tokens.len());

    Ok(())
}
