//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! Line level recognizers. Everything in here is a pure function of its input: a line either
//! matches one of the shapes below, or it is left alone and copied through by the caller.
//!
//! Names consist of letters, digits and underscores where the first character is not a digit
//! (`[_a-zA-Z][_a-zA-Z0-9]*`). Tokens not of this form are never treated as symbols.

use nom::{
    bytes::complete::{take_while, take_while1},
    character::complete::{char, satisfy},
    combinator::recognize,
    sequence::{pair, preceded, tuple},
    IResult,
};

pub fn is_word_char_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_word_char_end(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn space(input: &str) -> IResult<&str, &str> {
    take_while(char::is_whitespace)(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(satisfy(is_word_char_start), take_while(is_word_char_end)))(input)
}

/// A `#<word><rest>` line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Directive<'a> {
    pub name: &'a str,
    /// Everything after the directive word. Either empty, or starting with whitespace or `(`.
    pub rest: &'a str,
}

fn parse_directive(input: &str) -> IResult<&str, &str> {
    preceded(
        tuple((space, char('#'), space)),
        take_while1(is_word_char_end),
    )(input)
}

pub fn directive(line: &str) -> Option<Directive<'_>> {
    let (rest, name) = parse_directive(line).ok()?;
    match rest.chars().next() {
        None => Some(Directive { name, rest }),
        Some(c) if c.is_whitespace() || c == '(' => Some(Directive { name, rest }),
        Some(_) => None,
    }
}

/// Split the payload of `#define`/`#undef` into the leading name and whatever follows it.
pub fn valid_name(input: &str) -> Option<(&str, &str)> {
    let parsed: IResult<&str, &str> = preceded(space, identifier)(input);
    parsed.ok().map(|(rest, name)| (name, rest))
}

/// The next identifier on a line, along with the whitespace leading up to it.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct NextToken<'a> {
    pub space: &'a str,
    pub name: &'a str,
    pub rest: &'a str,
}

pub fn next_token(input: &str) -> Option<NextToken<'_>> {
    let parsed: IResult<&str, (&str, &str)> = pair(space, identifier)(input);
    parsed
        .ok()
        .map(|(rest, (space, name))| NextToken { space, name, rest })
}

/// Consume a run of whitespace plus a single non whitespace character. Returns the consumed text
/// and the rest of the line, or `None` if only whitespace remains.
pub fn next_start(input: &str) -> Option<(&str, &str)> {
    let parsed: IResult<&str, &str> =
        recognize(pair(space, satisfy(|c| !c.is_whitespace())))(input);
    parsed.ok().map(|(rest, consumed)| (consumed, rest))
}

/// The path of an `#include "path"` directive. The quotes must enclose the whole remainder,
/// apart from surrounding whitespace.
pub fn include_path(input: &str) -> Option<&str> {
    let parsed: IResult<&str, char> = preceded(space, char('"'))(input);
    let (rest, _) = parsed.ok()?;
    rest.trim_end().strip_suffix('"')
}

/// Call site arguments following a macro name, e.g. `(a, (b, c))` yields `["a", "(b, c)"]`.
/// Returns `None` if the text doesn't start with an argument list or the list is never closed.
pub fn call_arguments(input: &str) -> Option<Vec<&str>> {
    let parsed: IResult<&str, char> = preceded(space, char('('))(input);
    let (inner, _) = parsed.ok()?;

    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            ')' => {
                let last = inner[start..i].trim();
                if !(args.is_empty() && last.is_empty()) {
                    args.push(last);
                }
                return Some(args);
            }
            ',' if depth == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod test {
    use super::{
        call_arguments, directive, include_path, next_start, next_token, valid_name, Directive,
        NextToken,
    };
    use test_log::test;

    #[test]
    fn test_directive_with_argument() {
        assert_eq!(
            directive("#define FOO 1"),
            Some(Directive {
                name: "define",
                rest: " FOO 1"
            })
        );
    }

    #[test]
    fn test_directive_padded() {
        let d = directive("   #  ifdef\tFOO").unwrap();
        assert_eq!(d.name, "ifdef");
        assert_eq!(d.rest.trim(), "FOO");
    }

    #[test]
    fn test_directive_bare() {
        assert_eq!(
            directive("#endif"),
            Some(Directive {
                name: "endif",
                rest: ""
            })
        );
    }

    #[test]
    fn test_directive_open_paren() {
        assert_eq!(directive("#foo(1)").unwrap().rest, "(1)");
    }

    #[test]
    fn test_directive_fail_trailing_garbage() {
        assert_eq!(directive("#endif;"), None);
        assert_eq!(directive("# "), None);
        assert_eq!(directive("int x; #define"), None);
    }

    #[test]
    fn test_valid_name() {
        assert_eq!(valid_name("  some_word_23 rest"), Some(("some_word_23", " rest")));
        assert_eq!(valid_name("MACRO(a, b)"), Some(("MACRO", "(a, b)")));
    }

    #[test]
    fn test_valid_name_fail_number_start() {
        assert_eq!(valid_name(" 22word"), None);
        assert_eq!(valid_name(""), None);
    }

    #[test]
    fn test_next_token() {
        assert_eq!(
            next_token("  hello, world"),
            Some(NextToken {
                space: "  ",
                name: "hello",
                rest: ", world"
            })
        );
        assert_eq!(next_token(", world"), None);
    }

    #[test]
    fn test_next_start() {
        assert_eq!(next_start("  , world"), Some(("  ,", " world")));
        assert_eq!(next_start("123abc"), Some(("1", "23abc")));
        assert_eq!(next_start("   "), None);
        assert_eq!(next_start(""), None);
    }

    #[test]
    fn test_include_path() {
        assert_eq!(include_path(" \"child.txt\"  "), Some("child.txt"));
        assert_eq!(include_path("\"a\" \"b\""), Some("a\" \"b"));
        assert_eq!(include_path(" \"\""), Some(""));
    }

    #[test]
    fn test_include_path_fail() {
        assert_eq!(include_path(" <stdio.h>"), None);
        assert_eq!(include_path(" \"child.txt\" trailing"), None);
        assert_eq!(include_path(" \"child.txt"), None);
        assert_eq!(include_path(" \""), None);
    }

    #[test]
    fn test_call_arguments() {
        assert_eq!(call_arguments("(a, b) + 1"), Some(vec!["a", "b"]));
        assert_eq!(call_arguments(" (f(x, y), z)"), Some(vec!["f(x, y)", "z"]));
        assert_eq!(call_arguments("()"), Some(vec![]));
        assert_eq!(call_arguments("(,)"), Some(vec!["", ""]));
    }

    #[test]
    fn test_call_arguments_fail() {
        assert_eq!(call_arguments(" + (a)"), None);
        assert_eq!(call_arguments("(a, b"), None);
    }
}
