use crate::config::Config;
use crate::error::Error;

const UNARY: [(&str, fn(f64) -> f64); 17] = [
    ("abs", f64::abs),
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
    ("exp", f64::exp),
    ("ln", f64::ln),
    ("log10", f64::log10),
    ("log2", f64::log2),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
    ("round", f64::round),
    ("trunc", f64::trunc),
];

const VARIADIC: [(&str, fn(&[f64]) -> f64); 4] = [
    ("min", |args| args.iter().copied().fold(f64::INFINITY, f64::min)),
    ("max", |args| args.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
    ("sum", |args| args.iter().sum()),
    ("avg", |args| args.iter().sum::<f64>() / args.len() as f64),
];

/// Adds the constants `pi` and `e` and a set of common math functions.
///
/// Single-argument functions reject any other argument count with
/// [`Error::IncorrectArgsNum`]; `min`, `max`, `sum` and `avg` accept one or
/// more arguments.
pub fn register(config: &mut Config) -> Result<(), Error> {
    config.add_constant("pi", std::f64::consts::PI)?;
    config.add_constant("e", std::f64::consts::E)?;

    for (name, function) in UNARY {
        config.add_function(name, move |args| match args {
            [x] => Ok(function(*x)),
            _ => Err(Error::IncorrectArgsNum),
        })?;
    }

    for (name, function) in VARIADIC {
        config.add_function(name, move |args| {
            if args.is_empty() {
                return Err(Error::IncorrectArgsNum);
            }
            Ok(function(args))
        })?;
    }

    Ok(())
}
