use std::cell::Cell;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use clap::Parser;
use mathex::{builtins, Config, Flags};

/// Evaluates arithmetic expressions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Expression to evaluate. Without one, expressions are read line by line
    /// from stdin, and a line `name = value` updates a bound variable.
    expression: Option<String>,

    /// Binds a variable, e.g. `--var x=1.5`.
    #[arg(long = "var", value_parser = parse_binding)]
    vars: Vec<(String, f64)>,

    /// Enables the `^` operator.
    #[arg(long)]
    exponentiation: bool,

    /// Enables the `%` operator.
    #[arg(long)]
    modulus: bool,

    /// Closes unbalanced parentheses implicitly.
    #[arg(long)]
    implicit_parentheses: bool,

    /// Leaves out the built-in constants and functions.
    #[arg(long)]
    no_builtins: bool,

    /// Logs at debug level to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_binding(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{}': {}", name.trim(), e))?;
    Ok((name.trim().to_string(), value))
}

fn flags(args: &Args) -> Flags {
    let mut flags = Flags::DEFAULT;
    flags.set(Flags::EXPONENTIATION, args.exponentiation);
    flags.set(Flags::MODULUS, args.modulus);
    flags.set(Flags::IMPLICIT_PARENTHESES, args.implicit_parentheses);
    flags
}

fn main() {
    let args = Args::parse();

    if args.verbose || std::env::var("RUST_LOG").is_ok() {
        let filter = if args.verbose {
            tracing_subscriber::EnvFilter::new("debug")
        } else {
            tracing_subscriber::EnvFilter::from_default_env()
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    let mut config = Config::new(flags(&args));
    if !args.no_builtins {
        if let Err(e) = builtins::register(&mut config) {
            eprintln!("Failed to register the built-in functions: {}", e);
            std::process::exit(1);
        }
    }

    let mut cells: HashMap<String, Rc<Cell<f64>>> = HashMap::new();
    for (name, value) in &args.vars {
        let cell = Rc::new(Cell::new(*value));
        let accessor = {
            let cell = Rc::clone(&cell);
            move || cell.get()
        };
        if let Err(e) = config.add_variable(name, accessor) {
            eprintln!("Failed to bind variable '{}': {}", name, e);
            std::process::exit(1);
        }
        cells.insert(name.clone(), cell);
    }

    if let Some(expression) = &args.expression {
        match config.evaluate(expression) {
            Ok(result) => println!("{}", result),
            Err(e) => {
                eprintln!("Failed to evaluate the expression: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        if io::stdout().flush().is_err() {
            return;
        }

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => return,
            Ok(_) => {}
            Err(e) => {
                eprintln!("Failed to read the input: {}", e);
                return;
            }
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if let Some((name, value)) = line.split_once('=') {
            match (cells.get(name.trim()), value.trim().parse::<f64>()) {
                (Some(cell), Ok(value)) => cell.set(value),
                (None, _) => eprintln!("Unknown variable '{}'", name.trim()),
                (_, Err(e)) => eprintln!("Failed to parse the value: {}", e),
            }
            continue;
        }

        match config.evaluate(line) {
            Ok(result) => println!("{}", result),
            Err(e) => eprintln!("Failed to evaluate the expression: {}", e),
        }
    }
}
