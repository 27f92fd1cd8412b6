//! Command-line interface for rulescan
//! Runs the bundled readers over files or stdin and prints the result.
//!
//! Usage:
//!   rulescan calc `<expr>`                       - Evaluate an arithmetic expression
//!   rulescan ini `<path>` [--format `<format>`]    - Read an INI file
//!   rulescan json `<path>` [--format `<format>`]   - Read a relaxed-JSON file
//!   rulescan lml `<path>` [--format `<format>`]    - Read an LML file
//!
//! A `<path>` of `-` reads from stdin.

use std::io::Read;

use clap::{Arg, ArgAction, Command};
use serde::Serialize;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use rulescan::readers::{calc, ini, json, lml};

fn main() {
    let format_arg = Arg::new("format")
        .long("format")
        .short('f')
        .help("Output format ('json' or 'yaml')")
        .default_value("json");
    let path_arg = Arg::new("path")
        .help("Path to the input file, or '-' for stdin")
        .required(true)
        .index(1);

    let matches = Command::new("rulescan")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run the bundled grammar readers over an input")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log scan progress to stderr")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("calc")
                .about("Evaluate an arithmetic expression")
                .arg(
                    Arg::new("expr")
                        .help("Expression to evaluate")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("ini")
                .about("Read an INI file")
                .arg(path_arg.clone())
                .arg(format_arg.clone()),
        )
        .subcommand(
            Command::new("json")
                .about("Read a relaxed-JSON file")
                .arg(path_arg.clone())
                .arg(format_arg.clone()),
        )
        .subcommand(
            Command::new("lml")
                .about("Read an LML file")
                .arg(path_arg)
                .arg(format_arg),
        )
        .get_matches();

    init_logging(matches.get_flag("verbose"));

    let outcome = match matches.subcommand() {
        Some(("calc", m)) => handle_calc(m.get_one::<String>("expr").unwrap()),
        Some(("ini", m)) => handle_ini(
            m.get_one::<String>("path").unwrap(),
            m.get_one::<String>("format").unwrap(),
        ),
        Some(("json", m)) => handle_json(
            m.get_one::<String>("path").unwrap(),
            m.get_one::<String>("format").unwrap(),
        ),
        Some(("lml", m)) => handle_lml(
            m.get_one::<String>("path").unwrap(),
            m.get_one::<String>("format").unwrap(),
        ),
        _ => unreachable!(),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let _ = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );
}

fn handle_calc(expr: &str) -> Result<(), String> {
    let value = calc::evaluate(expr).map_err(|e| e.to_string())?;
    println!("{}", value);
    Ok(())
}

fn handle_ini(path: &str, format: &str) -> Result<(), String> {
    let input = read_input(path)?;
    let reader = ini::IniReader::new().map_err(|e| e.to_string())?;
    let doc = reader.read(&input).map_err(|e| e.to_string())?;
    print_value(&doc, format)
}

fn handle_json(path: &str, format: &str) -> Result<(), String> {
    let input = read_input(path)?;
    let value = json::read(&input).map_err(|e| e.to_string())?;
    print_value(&value, format)
}

fn handle_lml(path: &str, format: &str) -> Result<(), String> {
    let input = read_input(path)?;
    let root = lml::read(&input).map_err(|e| e.to_string())?;
    print_value(&root, format)
}

fn read_input(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .map_err(|e| format!("error reading stdin: {}", e))?;
        Ok(input)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("error reading file: {}", e))
    }
}

fn print_value<T: Serialize>(value: &T, format: &str) -> Result<(), String> {
    match format {
        "json" => {
            let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
            println!("{}", text);
        }
        "yaml" => {
            let text = serde_yaml::to_string(value).map_err(|e| e.to_string())?;
            print!("{}", text);
        }
        other => return Err(format!("unknown output format '{}'", other)),
    }
    Ok(())
}
