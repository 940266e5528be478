//! CLI tool to run, format, analyze, and validate PrintScript files.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use printscript::{
    AnalyzerConfig, FormatConfig, Lexer, LexerRules, Node, Runner, StdoutPrinter,
};

fn usage() -> ExitCode {
    eprintln!("Usage: printscript <command> <file> [config.json]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run       Execute the file line by line");
    eprintln!("  format    Print the formatted file to stdout");
    eprintln!("  analyze   Report style diagnostics");
    eprintln!("  validate  Check that every line parses");
    eprintln!();
    eprintln!("The optional JSON file holds lexer rules for `run`,");
    eprintln!("formatter options for `format`, and analyzer options for `analyze`.");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  printscript run main.ps");
    eprintln!("  printscript format main.ps format.json");
    ExitCode::from(2)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 || args[1] == "--help" || args[1] == "-h" {
        return usage();
    }

    let command = args[1].as_str();
    let path = &args[2];
    let config = args.get(3).map(Path::new);

    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match command {
        "run" => run(path, &content, config),
        "format" => format(path, &content, config),
        "analyze" => analyze(path, &content, config),
        "validate" => validate(path, &content),
        _ => {
            eprintln!("Unknown command: {command}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{path}: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &str, content: &str, rules: Option<&Path>) -> Result<bool, printscript::Error> {
    let lexer = match rules {
        Some(rules) => Lexer::new(&LexerRules::from_path(rules)?)?,
        None => Lexer::standard(),
    };
    let reports = Runner::with_lexer(lexer).run(content, &mut StdoutPrinter);
    let mut ok = true;
    for report in reports.iter().filter(|r| r.outcome.is_failure()) {
        eprintln!("{path}:{}: {}", report.line + 1, report.outcome);
        ok = false;
    }
    Ok(ok)
}

/// Parse every non-blank line, reporting failures as they occur.
fn parse_all(path: &str, content: &str) -> (Vec<(usize, Node)>, bool) {
    let mut nodes = Vec::new();
    let mut ok = true;
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match printscript::parse_line(line, index) {
            Ok(node) => nodes.push((index, node)),
            Err(e) => {
                eprintln!("{path}:{}: {e}", index + 1);
                ok = false;
            }
        }
    }
    (nodes, ok)
}

fn format(path: &str, content: &str, config: Option<&Path>) -> Result<bool, printscript::Error> {
    let config: FormatConfig = match config {
        Some(config) => printscript::config::load_json(config)?,
        None => FormatConfig::default(),
    };
    let (nodes, ok) = parse_all(path, content);
    let nodes: Vec<Node> = nodes.into_iter().map(|(_, node)| node).collect();
    print!("{}", printscript::format_program(&nodes, &config));
    Ok(ok)
}

fn analyze(path: &str, content: &str, config: Option<&Path>) -> Result<bool, printscript::Error> {
    let config: AnalyzerConfig = match config {
        Some(config) => printscript::config::load_json(config)?,
        None => AnalyzerConfig::default(),
    };
    let (nodes, mut ok) = parse_all(path, content);
    for (index, node) in &nodes {
        for diagnostic in printscript::analyze(node, &config, *index) {
            println!("{path}: {diagnostic}");
            ok = false;
        }
    }
    Ok(ok)
}

fn validate(path: &str, content: &str) -> Result<bool, printscript::Error> {
    let (nodes, ok) = parse_all(path, content);
    if ok {
        eprintln!("{path}: valid ({} statement(s))", nodes.len());
    }
    Ok(ok)
}
