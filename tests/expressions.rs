use std::f64::consts::PI;

use approx::assert_relative_eq;
use nc::{eval_line, Error};

fn eval(line: &str) -> f64 {
    match eval_line(line) {
        Ok(val) => val,
        Err(err) => panic!("{line}: {err}"),
    }
}

#[test]
fn precedence() {
    assert_eq!(eval("1 + 2 * 3"), 7.0);
    assert_eq!(eval("(1 + 2) * 3"), 9.0);
    assert_eq!(eval("1 + 2 * 3 ^ 2"), 19.0);
    assert_eq!(eval("(1 + 2 * 3) ^ 2"), 49.0);
    assert_eq!(eval("1 + 2 - 3 + 4"), 4.0);
    assert_eq!(eval("10 mod 4 * 2"), 4.0);
    assert_eq!(eval("2 + 10 mod 4"), 4.0);
    assert_eq!(eval("2 ^ 3 ^ 2"), 512.0);
}

#[test]
fn functions() {
    assert_eq!(eval("root(2, 16)"), 4.0);
    assert_eq!(eval("pow(2, 3)"), 8.0);
    assert_eq!(eval("mod(10, 3)"), 1.0);
    assert_eq!(eval("mod(10 + 5, 6)"), 3.0);
    assert_eq!(eval("abs(-5)"), 5.0);
    assert_eq!(eval("abs(-root(2, 16))"), 4.0);
    assert_eq!(eval("ceil(4.2)"), 5.0);
    assert_eq!(eval("floor(4.9)"), 4.0);
    assert_eq!(eval("round(4.4)"), 4.0);
    assert_eq!(eval("round(4.5)"), 5.0);
    assert_eq!(eval("round(-4.5)"), -5.0);
    assert_eq!(eval("pow(2, pow(2, 2))"), 16.0);
    assert_eq!(eval("pow(2, 3 + 1)"), 16.0);
    assert_eq!(eval("pow(2, root(2, 16))"), 16.0);
    assert_eq!(eval("round(root(2, 15))"), 4.0);
    assert_eq!(eval("round(root(2, 16) + 0.4)"), 4.0);
    assert_eq!(eval("root(2, 16) + pow(2, 2) * mod(10, 3)"), 8.0);
    assert_eq!(eval("5 + 10 + root ( 2 , 16 )"), 19.0);
}

#[test]
fn nested_roots() {
    assert_relative_eq!(eval("root(2, root(3, 64))"), 2.0, epsilon = 1e-12);
    assert_relative_eq!(
        eval("root(2, root(3, 64)) + root(2, root(5, 1024))"),
        4.0,
        epsilon = 1e-12
    );
    assert_relative_eq!(eval("root(2, 9) + root(3, 27)"), 6.0, epsilon = 1e-12);
}

#[test]
fn constants() {
    assert_relative_eq!(eval("PI * 2"), 2.0 * PI, epsilon = f64::EPSILON);
    assert_relative_eq!(eval("TAU / 2"), PI, epsilon = f64::EPSILON);
    assert_relative_eq!(eval("abs(-PI) + abs(-TAU)"), 3.0 * PI, epsilon = 1e-12);
    assert_relative_eq!(eval("pi + tau"), 3.0 * PI, epsilon = 1e-12);
}

#[test]
fn unary_chains() {
    assert_eq!(eval("- - 1"), 1.0);
    assert_eq!(eval("- 1 - 2"), -3.0);
    assert_eq!(eval("- 1 - - 2"), 1.0);
    assert_eq!(eval("- 1 + - 2"), -3.0);
    assert_eq!(eval("- - -(- 1 - - - 2)"), 3.0);
    assert_eq!(eval("- - - -(- 1 - - - 2)"), -3.0);
    assert_eq!(eval("-2 ^ 2"), 4.0);
    assert_eq!(eval("2 ^ -1"), 0.5);
}

#[test]
fn ieee_values() {
    assert_eq!(eval("1 / 0"), f64::INFINITY);
    assert_eq!(eval("-1 / 0"), f64::NEG_INFINITY);
    assert!(eval("0 / 0").is_nan());
    assert!(eval("5 mod 0").is_nan());
}

#[test]
fn idempotent() {
    for line in ["1 + 2 * 3", "root(3, 64)", "TAU / 3", "round(2.5) mod 2"] {
        assert_eq!(eval(line).to_bits(), eval(line).to_bits(), "{line}");
    }
}

#[test]
fn errors() {
    let syntax = [
        "1 +",
        "* 3",
        "(1 + 2",
        "1 + 2)",
        "pow()",
        "PI()",
        "TAU(2)",
        "round(,4)",
        "1 + + 2",
        "- 1 + + 2",
        "1 2",
        "5 5 5",
        "root(2 root(2, 16))",
        "pow(2, )",
        "mod(,3)",
        ",1 + 2",
        "sin(1)",
        "abs 5",
        "",
    ];
    for line in syntax {
        assert!(
            matches!(eval_line(line), Err(Error::Syntax(_))),
            "{line}: {:?}",
            eval_line(line)
        );
    }

    let arity = ["root(2)", "root(2, 16, 8)", "abs(1, 2)", "mod(10)"];
    for line in arity {
        assert!(
            matches!(eval_line(line), Err(Error::Eval(_))),
            "{line}: {:?}",
            eval_line(line)
        );
    }

    let lexical = ["1.2.3", "4.", "1 $ 2", "3 % 2"];
    for line in lexical {
        assert!(
            matches!(eval_line(line), Err(Error::Lex(_))),
            "{line}: {:?}",
            eval_line(line)
        );
    }
}

#[test]
fn deep_nesting() {
    let line = format!("{}1{}", "(".repeat(40), ")".repeat(40));
    assert_eq!(eval(&line), 1.0);

    for line in [
        format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000)),
        format!("{}1", "-".repeat(10_000)),
        format!("2{}", "^1".repeat(10_000)),
    ] {
        assert!(
            matches!(eval_line(&line), Err(Error::Syntax(nc::parse::Error::TooDeep { .. }))),
            "{:?}",
            eval_line(&line)
        );
    }
}
