use crate::constant::*;

/// The syntactic shape of one raw Cli argument.
///
/// Classification is purely syntactic; whether a flag exists (or how many tokens it consumes) is decided by the parser.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Token<'t> {
    /// `--help` or `-h`.
    Help,
    /// A lone `--`: every following token is positional.
    Separator,
    /// Anything not starting with `-`, as well as a lone `-`.
    Positional(&'t str),
    /// `--name` or `--name=value`.
    Long {
        name: &'t str,
        value: Option<&'t str>,
    },
    /// `-k` or `-k=value`.
    Short { key: char, value: Option<&'t str> },
    /// `-abc`: two or more short keys in one token.
    Combined { keys: Vec<char> },
    /// A short form with `=` but not exactly one key before it, ex: `-=value` or `-ab=value`.
    Malformed(&'t str),
}

pub(crate) fn classify(token: &str) -> Token<'_> {
    if token == HELP_TOKEN || token == HELP_SHORT_TOKEN {
        return Token::Help;
    }

    if token == SEPARATOR {
        return Token::Separator;
    }

    // Find a 'long' flag, such as:
    //  --initial
    //  --initial=..
    if let Some(long) = token.strip_prefix("--") {
        let (name, value) = split_equals_delimiter(long);
        return Token::Long { name, value };
    }

    // Find 'short' flag(s), such as (both -i and -v are example short flags):
    //  -i
    //  -i=..
    //  -iv
    match token.strip_prefix('-') {
        Some(short) if !short.is_empty() => {
            let (keys, value) = split_equals_delimiter(short);
            let mut chars = keys.chars();

            match (chars.next(), chars.next(), value) {
                (None, _, _) => Token::Malformed(token),
                (Some(key), None, _) => Token::Short { key, value },
                // Only a single key may take an '=' value.
                (Some(_), Some(_), Some(_)) => Token::Malformed(token),
                (Some(_), Some(_), None) => Token::Combined {
                    keys: keys.chars().collect(),
                },
            }
        }
        _ => Token::Positional(token),
    }
}

// Only the first '=' separates; the value may contain more.
fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (token, None),
    }
}
