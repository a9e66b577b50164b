use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use clap::Parser;
use crossterm::style::Stylize;
use nc::input::{self, HasSpan};

mod doc;

/// Evaluate arithmetic expressions
#[derive(Debug, Parser)]
#[command(name = "nc", version, after_help = doc::AFTER_HELP)]
struct Cli {
    /// Expressions to evaluate
    evals: Vec<String>,

    /// Keep prompting for expressions after EVALS (requires a terminal)
    #[arg(short, long)]
    interactive: bool,

    /// Print only the resulting value
    #[arg(short, long)]
    strip: bool,

    /// Trace the tokens and expression tree of each line on stderr
    #[arg(short, long)]
    verbose: bool,

    /// List the available functions and constants
    #[arg(long)]
    functions: bool,

    /// Print the expression grammar
    #[arg(long)]
    grammar: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        // already reported with its diagnostic
        Err(Error::Calc(_)) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{}: {err}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let style = io::stdout().is_terminal();
    if cli.functions {
        let mut out = io::stdout().lock();
        doc::write_functions(&mut out, style)?;
        writeln!(out)?;
        doc::write_constants(&mut out, style)?;
        return Ok(());
    }
    if cli.grammar {
        print!("{}", doc::GRAMMAR);
        return Ok(());
    }

    let mode = input_mode(
        !cli.evals.is_empty(),
        cli.interactive,
        io::stdin().is_terminal(),
    )?;

    let driver = Driver {
        mode,
        strip: cli.strip,
        verbose: cli.verbose,
        style: io::stderr().is_terminal(),
    };
    driver.do_loop(cli.evals)
}

/// Where lines come from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    /// Command line arguments only.
    Args,
    /// Arguments, then lines typed at a prompt.
    Prompt,
    /// Arguments, then lines piped on stdin.
    Piped,
}

fn input_mode(has_eval: bool, interactive: bool, is_terminal: bool) -> Result<Mode, ArgError> {
    // Prompting needs a terminal. Without --interactive, evaluations passed
    // as arguments are all we do, otherwise stdin is read,
    // with a prompt only if it is a terminal.
    match (has_eval, interactive, is_terminal) {
        (_, true, false) => Err(ArgError::NeedTerminal),
        (_, true, true) => Ok(Mode::Prompt),
        (true, false, _) => Ok(Mode::Args),
        (false, false, true) => Ok(Mode::Prompt),
        (false, false, false) => Ok(Mode::Piped),
    }
}

struct Driver {
    mode: Mode,
    strip: bool,
    verbose: bool,
    style: bool,
}

impl Driver {
    fn prompting(&self) -> bool {
        self.mode == Mode::Prompt
    }

    fn do_loop(&self, evals: Vec<String>) -> Result<(), Error> {
        let evals = evals.into_iter().map(Result::Ok);
        match self.mode {
            Mode::Args => self.line_loop(evals),
            Mode::Prompt | Mode::Piped => self.line_loop(evals.chain(io::stdin().lock().lines())),
        }
    }

    fn line_loop<L>(&self, lines: L) -> Result<(), Error>
    where
        L: Iterator<Item = Result<String, io::Error>>,
    {
        if self.prompting() {
            print_prompt()?;
        }
        for line in lines {
            let line = line?;
            if self.prompting() {
                let ll = line.trim().to_lowercase();
                if matches!(ll.as_str(), "exit" | "quit" | "q") {
                    break;
                }
            }
            self.do_line(&line)?;
            if self.prompting() {
                print_prompt()?;
            }
        }
        Ok(())
    }

    fn do_line(&self, line: &str) -> Result<(), Error> {
        if line.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        if self.verbose {
            trace_line(line);
        }

        match nc::eval_line(line) {
            Ok(val) if self.strip => println!("{val}"),
            Ok(val) => println!("Result: {val}"),
            Err(err) => {
                print_diagnostic(line, &err, self.style);
                if !self.prompting() {
                    return Err(Error::Calc(err));
                }
            }
        }
        Ok(())
    }
}

fn trace_line(line: &str) {
    // failures are reported by the evaluation that follows
    let Ok(tokens) = nc::lex::tokenize(line) else {
        return;
    };
    let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
    eprintln!("{} {}", "tokens:".dim(), lexemes.join(" "));
    if let Ok(expr) = nc::parse::parse(&tokens) {
        eprintln!("{} {}", "tree:".dim(), expr);
    }
}

fn print_diagnostic(line: &str, err: &nc::Error, style: bool) {
    let span = err.span();
    let caret = input::caret(line, span);
    if style {
        eprintln!("{}: {}", "error".red().bold(), err);
        eprintln!("{line}");
        eprintln!("{}", caret.red().bold());
    } else {
        eprintln!("at {}: {}", span.0 + 1, err);
        eprintln!("{line}");
        eprintln!("{caret}");
    }
}

fn print_prompt() -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "Enter expression: ")?;
    out.flush()
}

#[derive(Debug)]
enum ArgError {
    NeedTerminal,
}

impl Display for ArgError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgError::NeedTerminal => write!(f, "--interactive requires terminal"),
        }
    }
}

#[derive(Debug)]
enum Error {
    Calc(nc::Error),
    Io(io::Error),
    Arg(ArgError),
    EmptyInput,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Calc(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Arg(err) => err.fmt(f),
            Error::EmptyInput => write!(f, "Empty expression"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ArgError> for Error {
    fn from(e: ArgError) -> Self {
        Error::Arg(e)
    }
}

#[test]
fn test_input_mode() {
    use Mode::*;

    //  has_eval, interactive, is_terminal => mode (None is an error)
    let tests = [
        (false, false, false, Some(Piped)),
        (false, false, true, Some(Prompt)),
        (false, true, false, None),
        (false, true, true, Some(Prompt)),
        (true, false, false, Some(Args)),
        (true, false, true, Some(Args)),
        (true, true, false, None),
        (true, true, true, Some(Prompt)),
    ];

    for (has_eval, interactive, is_terminal, expected) in tests {
        let mode = input_mode(has_eval, interactive, is_terminal).ok();
        assert_eq!(
            mode, expected,
            "{} {} {}",
            has_eval, interactive, is_terminal
        );
    }
}

#[test]
fn test_cli_args() {
    let cli = Cli::try_parse_from(["nc", "-s", "1 + 2", "pow(2, 3)"]).unwrap();
    assert!(cli.strip);
    assert!(!cli.interactive);
    assert_eq!(cli.evals, ["1 + 2", "pow(2, 3)"]);

    let cli = Cli::try_parse_from(["nc", "--functions"]).unwrap();
    assert!(cli.functions);
    assert!(cli.evals.is_empty());
}

#[test]
fn test_empty_line_is_fatal() {
    let driver = Driver {
        mode: Mode::Args,
        strip: true,
        verbose: false,
        style: false,
    };
    assert!(matches!(driver.do_line("   "), Err(Error::EmptyInput)));
    assert!(matches!(driver.do_line("1 +"), Err(Error::Calc(_))));
    assert!(driver.do_line("1 + 1").is_ok());

    let driver = Driver {
        mode: Mode::Prompt,
        ..driver
    };
    assert!(matches!(driver.do_line(""), Err(Error::EmptyInput)));
    assert!(matches!(driver.do_line(" \t"), Err(Error::EmptyInput)));
    assert!(driver.do_line("1 +").is_ok());
}
