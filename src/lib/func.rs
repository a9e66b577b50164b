use std::collections::HashMap;
use std::fmt::Display;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Category {
    General,
    Rounding,
    Power,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::General => write!(f, "General"),
            Category::Rounding => write!(f, "Rounding"),
            Category::Power => write!(f, "Powers and Roots"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgCount {
    One,
    Two,
}

impl Display for ArgCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // printed in error message
            ArgCount::One => write!(f, "one argument"),
            ArgCount::Two => write!(f, "two arguments"),
        }
    }
}

/// Evaluated arguments, shaped after the function's `ArgCount`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Args {
    One(f64),
    Two(f64, f64),
}

impl Args {
    /// Shape `vals` for a function taking `arg_count` arguments.
    /// Returns `None` if the number of values doesn't match.
    pub fn new(arg_count: ArgCount, vals: &[f64]) -> Option<Args> {
        match (arg_count, vals) {
            (ArgCount::One, [a]) => Some(Args::One(*a)),
            (ArgCount::Two, [a, b]) => Some(Args::Two(*a, *b)),
            _ => None,
        }
    }

    pub fn first(&self) -> f64 {
        match self {
            Args::One(v) => *v,
            Args::Two(v, _) => *v,
        }
    }

    pub fn second(&self) -> f64 {
        match self {
            Args::One(..) => unreachable!("Not enough arguments"),
            Args::Two(_, v) => *v,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Func {
    pub category: Category,
    pub name: &'static str,
    pub help: &'static str,
    pub arg_count: ArgCount,
    pub eval: fn(Args) -> f64,
}

static FUNCS: &[Func] = &[
    Func {
        category: Category::General,
        name: "abs",
        help: "compute absolute value",
        arg_count: ArgCount::One,
        eval: |args| args.first().abs(),
    },
    Func {
        category: Category::General,
        name: "mod",
        help: "mod(a, b) is the remainder of a / b, with the sign of a",
        arg_count: ArgCount::Two,
        eval: |args| args.first() % args.second(),
    },
    Func {
        category: Category::Rounding,
        name: "round",
        help: "round value to nearest integer (halves away from zero)",
        arg_count: ArgCount::One,
        eval: |args| args.first().round(),
    },
    Func {
        category: Category::Rounding,
        name: "floor",
        help: "floor value to lower integer",
        arg_count: ArgCount::One,
        eval: |args| args.first().floor(),
    },
    Func {
        category: Category::Rounding,
        name: "ceil",
        help: "ceil value to upper integer",
        arg_count: ArgCount::One,
        eval: |args| args.first().ceil(),
    },
    Func {
        category: Category::Power,
        name: "pow",
        help: "first argument raised to the power the second argument",
        arg_count: ArgCount::Two,
        eval: |args| args.first().powf(args.second()),
    },
    Func {
        category: Category::Power,
        name: "root",
        help: "root(n, x) is the n-th root of x",
        arg_count: ArgCount::Two,
        eval: |args| args.second().powf(1.0 / args.first()),
    },
];

/// All builtin functions, grouped by category.
pub fn all_funcs() -> &'static [Func] {
    FUNCS
}

/// Look up a function by its exact (case-sensitive) name.
pub fn lookup(name: &str) -> Option<&'static Func> {
    static BY_NAME: OnceLock<HashMap<&'static str, &'static Func>> = OnceLock::new();
    BY_NAME
        .get_or_init(|| FUNCS.iter().map(|f| (f.name, f)).collect())
        .get(name)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::{lookup, ArgCount, Args};
    use approx::assert_relative_eq;

    fn call(name: &str, vals: &[f64]) -> f64 {
        let func = lookup(name).unwrap();
        let args = Args::new(func.arg_count, vals).unwrap();
        (func.eval)(args)
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("root").unwrap().arg_count, ArgCount::Two);
        assert_eq!(lookup("pow").unwrap().arg_count, ArgCount::Two);
        assert_eq!(lookup("abs").unwrap().arg_count, ArgCount::One);
        assert!(lookup("Abs").is_none());
        assert!(lookup("sin").is_none());
    }

    #[test]
    fn test_args_shape() {
        assert_eq!(Args::new(ArgCount::One, &[1.0]), Some(Args::One(1.0)));
        assert_eq!(Args::new(ArgCount::Two, &[1.0, 2.0]), Some(Args::Two(1.0, 2.0)));
        assert_eq!(Args::new(ArgCount::One, &[]), None);
        assert_eq!(Args::new(ArgCount::Two, &[1.0]), None);
        assert_eq!(Args::new(ArgCount::Two, &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(call("round", &[4.4]), 4.0);
        assert_eq!(call("round", &[4.5]), 5.0);
        assert_eq!(call("round", &[-4.5]), -5.0);
        assert_eq!(call("floor", &[4.9]), 4.0);
        assert_eq!(call("floor", &[-4.1]), -5.0);
        assert_eq!(call("ceil", &[4.2]), 5.0);
        assert_eq!(call("ceil", &[-4.9]), -4.0);
    }

    #[test]
    fn test_powers() {
        assert_eq!(call("pow", &[2.0, 3.0]), 8.0);
        assert_eq!(call("root", &[2.0, 16.0]), 4.0);
        assert_relative_eq!(call("root", &[3.0, 27.0]), 3.0, epsilon = 1e-12);
        assert_eq!(call("mod", &[10.0, 3.0]), 1.0);
        assert_eq!(call("mod", &[-10.0, 3.0]), -1.0);
    }
}
