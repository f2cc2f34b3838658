use std::io::{Write, stdin, stdout};

use clap::Parser;
use clap::Subcommand;
use expr_evaluator::EvalError;
use expr_evaluator::Evaluator;
use expr_evaluator::Lexer;
use miette::IntoDiagnostic;

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the token stream of an expression, one token per line.
    Tokenize { expression: String },
    /// Evaluate an expression, prompting for one on stdin when omitted.
    Eval { expression: Option<String> },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Tokenize { expression } => {
            for token in Lexer::new(&expression) {
                match token {
                    Ok(token) => println!("{token}"),
                    Err(e) => {
                        eprintln!("{:?}", miette::Report::new(e));
                        std::process::exit(65);
                    }
                }
            }
        }
        Commands::Eval { expression } => {
            let expression = match expression {
                Some(expression) => expression,
                None => prompt_line("Enter an expression: ")?,
            };

            let mut evaluator = Evaluator::new(prompt_variable);
            match evaluator.evaluate(&expression) {
                Ok(value) => println!("{value}"),
                Err(e) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    std::process::exit(65);
                }
            }
        }
    }
    Ok(())
}

fn prompt_line(message: &str) -> miette::Result<String> {
    write!(stdout(), "{message}").into_diagnostic()?;
    stdout().flush().into_diagnostic()?;
    let mut line = String::new();
    stdin().read_line(&mut line).into_diagnostic()?;
    Ok(line.trim().to_string())
}

/// Asks the terminal for the value of an unresolved variable. The evaluator
/// calls this once per name and memoizes the answer.
fn prompt_variable(name: &str) -> Result<f64, EvalError> {
    let bad_input = |input: &str| EvalError::InvalidVariableInput {
        name: name.to_string(),
        input: input.to_string(),
    };

    write!(stdout(), "Enter a value for variable {name}: ")
        .map_err(|e| bad_input(&e.to_string()))?;
    stdout().flush().map_err(|e| bad_input(&e.to_string()))?;

    let mut input = String::new();
    stdin()
        .read_line(&mut input)
        .map_err(|e| bad_input(&e.to_string()))?;
    let input = input.trim();

    input.parse().map_err(|_| bad_input(input))
}
