use std::io::{self, Write};

use crossterm::style::Stylize;
use nc::{func, registry};

pub const GRAMMAR: &str = include_str!("../doc/Grammar.ebnf");
pub const AFTER_HELP: &str = "If [EVALS] is provided, each argument is evaluated,
and the program exits unless --interactive is specified.

If [EVALS] is not provided, the program prompts for expressions
when connected to a terminal, and reads lines from stdin otherwise.
";

pub fn write_functions<W: Write>(out: &mut W, style: bool) -> io::Result<()> {
    let mut cat = None;

    let funcs = func::all_funcs();
    let max_len = funcs.iter().map(|f| f.name.len()).max().unwrap_or(0);
    for func in funcs {
        if cat != Some(func.category) {
            if cat.is_some() {
                writeln!(out)?;
            }
            write_heading(out, &func.category.to_string(), style)?;
        }
        cat = Some(func.category);

        let space = " ".repeat(max_len - func.name.len());
        if style {
            writeln!(out, "    {}{space}: {}", func.name.bold(), func.help)?;
        } else {
            writeln!(out, "    {}{space}: {}", func.name, func.help)?;
        }
    }
    Ok(())
}

pub fn write_constants<W: Write>(out: &mut W, style: bool) -> io::Result<()> {
    write_heading(out, "Constants", style)?;
    for (name, val) in registry::CONSTANTS {
        if style {
            writeln!(out, "    {}: {val}", name.to_string().bold())?;
        } else {
            writeln!(out, "    {name}: {val}")?;
        }
    }
    Ok(())
}

fn write_heading<W: Write>(out: &mut W, heading: &str, style: bool) -> io::Result<()> {
    if style {
        writeln!(out, "{}:", heading.to_string().bold().blue())
    } else {
        writeln!(out, "{heading}:")
    }
}

#[test]
fn test_write_functions_plain() {
    let mut out = Vec::new();
    write_functions(&mut out, false).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("General:\n"));
    assert!(out.contains("    root : root(n, x) is the n-th root of x\n"));
    assert!(out.contains("\nPowers and Roots:\n"));
}

#[test]
fn test_write_constants_plain() {
    let mut out = Vec::new();
    write_constants(&mut out, false).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("Constants:\n"));
    assert!(out.contains("    PI: 3.14159"));
}
