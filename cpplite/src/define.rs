//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

//! `#define` and `#undef`.
//!
//! A `#define` value may continue over several lines. A trailing `\` splices the next line
//! directly onto the value, a trailing `\\` keeps a newline between the two lines:
//!
//! ```text
//! #define GREETING hello \
//! world\\
//! bye
//! ```
//!
//! defines `GREETING` as `"hello world\nbye"`.

use crate::lexer;
use crate::state::{ParseState, PendingDefine};
use crate::symbols::{MacroArg, SymbolTable};

/// Whether `line` continues onto the next one.
pub fn is_continuation(line: &str) -> bool {
    line.trim_end().ends_with('\\')
}

/// Join the continuation lines of a `#define` into its value. The last line is taken as is,
/// including any trailing whitespace.
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut value = String::new();
    let mut newline = false;
    for line in lines {
        let line = line.as_ref();
        if newline {
            value.push('\n');
        }
        let trimmed = line.trim_end();
        if let Some(content) = trimmed.strip_suffix("\\\\") {
            value.push_str(content);
            newline = true;
        } else if let Some(content) = trimmed.strip_suffix('\\') {
            value.push_str(content);
            newline = false;
        } else {
            value.push_str(line);
            break;
        }
    }
    value
}

/// Parse the argument list of a function like macro. `list` is the text between the
/// parentheses.
fn parse_macro_args(name: &str, list: &str) -> Result<Vec<MacroArg>, String> {
    let mut args = Vec::new();
    for arg in list.split(',') {
        let mut arg_name = arg.trim();
        if let Some(stripped) = arg_name.strip_suffix(')') {
            arg_name = stripped;
        }
        let variadic = match arg_name.strip_prefix("...") {
            Some(stripped) => {
                arg_name = stripped;
                true
            }
            None => false,
        };
        if arg_name.is_empty() {
            return Err(format!("Empty argument name in macro definition {name}"));
        }
        match lexer::next_token(arg_name) {
            Some(token) if token.rest.is_empty() => args.push(MacroArg {
                name: token.name.to_owned(),
                variadic,
            }),
            _ => {
                return Err(format!(
                    "Invalid argument name in macro definition {name}: \"{arg_name}\""
                ))
            }
        }
    }
    Ok(args)
}

/// `#define`, `rest` being everything after the directive word.
pub fn handle_define(table: &mut SymbolTable, rest: &str) -> ParseState {
    let (name, value) = match lexer::valid_name(rest) {
        Some(parsed) => parsed,
        None => return ParseState::error(format!("Invalid define statement: {rest}")),
    };
    let value = value.trim_start();

    if let Some(after_open) = value.strip_prefix('(') {
        let close = match after_open.find(')') {
            Some(close) => close,
            None => {
                return ParseState::error(format!(
                    "Missing closing paren on macro definition {name}"
                ))
            }
        };
        let args = match parse_macro_args(name, &after_open[..close]) {
            Ok(args) => args,
            Err(message) => return ParseState::error(message),
        };
        log::debug!("handle_define() macro {name} with {} argument(s)", args.len());
        let body = after_open[close + 1..].trim_start();
        return consume_define(table, PendingDefine::macro_definition(name, args), body);
    }

    consume_define(table, PendingDefine::symbol(name), value)
}

/// Feed the next value line of a `#define`. Once the last line arrives the definition is added to
/// `table` and processing returns to normal.
pub fn consume_define(
    table: &mut SymbolTable,
    mut pending: PendingDefine,
    line: &str,
) -> ParseState {
    if is_continuation(line) {
        pending.lines.push(line.to_owned());
        return ParseState::CollectingDefine(pending);
    }

    pending.lines.push(line.to_owned());
    let value = join_lines(&pending.lines);
    match pending.args {
        Some(args) => table.add_macro(&pending.name, args, Some(value)),
        None => table.add_sym(pending.name, Some(value)),
    }
    ParseState::Normal
}

/// `#undef`. Removing a name that isn't defined is not an error.
pub fn handle_undef(table: &mut SymbolTable, rest: &str) -> ParseState {
    match lexer::valid_name(rest) {
        Some((name, _)) => {
            table.remove_sym(name);
            ParseState::Normal
        }
        None => ParseState::error(format!("Invalid undef statement: {rest}")),
    }
}

#[cfg(test)]
mod test {
    use super::{consume_define, handle_define, handle_undef, is_continuation, join_lines};
    use crate::state::ParseState;
    use crate::symbols::{Definition, MacroArg, SymbolTable};
    use test_log::test;

    #[test]
    fn test_join_lines_policy() {
        assert_eq!(join_lines(&["a\\", "b\\\\", "c"]), "ab\nc");
    }

    #[test]
    fn test_join_lines_single() {
        assert_eq!(join_lines(&["value  "]), "value  ");
    }

    #[test]
    fn test_join_lines_trailing_space_after_backslash() {
        assert_eq!(join_lines(&["one \\\\  ", "two \\ ", "three"]), "one \ntwo three");
    }

    #[test]
    fn test_is_continuation() {
        assert!(is_continuation("a \\"));
        assert!(is_continuation("a \\\\  "));
        assert!(!is_continuation("a"));
        assert!(!is_continuation(""));
    }

    #[test]
    fn test_define_symbol() {
        let mut table = SymbolTable::new();
        let state = handle_define(&mut table, " GREETING hello");
        assert_eq!(state, ParseState::Normal);
        assert_eq!(table.expand_symbol("GREETING"), Some("hello"));
    }

    #[test]
    fn test_define_empty() {
        let mut table = SymbolTable::new();
        assert_eq!(handle_define(&mut table, " EMPTY"), ParseState::Normal);
        assert!(table.is_defined("EMPTY"));
        assert_eq!(table.expand_symbol("EMPTY"), Some(""));
    }

    #[test]
    fn test_define_continued() {
        let mut table = SymbolTable::new();
        let state = handle_define(&mut table, " LONG first \\");
        let pending = match state {
            ParseState::CollectingDefine(pending) => pending,
            state => panic!("unexpected state {state:?}"),
        };
        let state = consume_define(&mut table, pending, "second\\\\");
        let pending = match state {
            ParseState::CollectingDefine(pending) => pending,
            state => panic!("unexpected state {state:?}"),
        };
        assert!(!table.is_defined("LONG"));
        assert_eq!(consume_define(&mut table, pending, "third"), ParseState::Normal);
        assert_eq!(table.expand_symbol("LONG"), Some("first second\nthird"));
    }

    #[test]
    fn test_define_macro() {
        let mut table = SymbolTable::new();
        let state = handle_define(&mut table, " ADD(x, y) x + y");
        assert_eq!(state, ParseState::Normal);
        assert_eq!(
            table.get("2*ADD"),
            Some(&Definition::Macro {
                args: vec![MacroArg::new("x"), MacroArg::new("y")],
                body: Some("x + y".to_owned()),
            })
        );
    }

    #[test]
    fn test_define_macro_variadic() {
        let mut table = SymbolTable::new();
        handle_define(&mut table, " LOG(fmt, ...args) printf(fmt)");
        assert_eq!(
            table.get("**LOG"),
            Some(&Definition::Macro {
                args: vec![MacroArg::new("fmt"), MacroArg::variadic("args")],
                body: Some("printf(fmt)".to_owned()),
            })
        );
    }

    #[test]
    fn test_define_macro_no_args() {
        let mut table = SymbolTable::new();
        assert_eq!(
            handle_define(&mut table, " NOW() 12"),
            ParseState::error("Empty argument name in macro definition NOW")
        );
        assert!(!table.is_defined("NOW"));
    }

    #[test]
    fn test_define_invalid() {
        let mut table = SymbolTable::new();
        assert_eq!(
            handle_define(&mut table, " 1abc"),
            ParseState::error("Invalid define statement:  1abc")
        );
    }

    #[test]
    fn test_define_missing_paren() {
        let mut table = SymbolTable::new();
        assert_eq!(
            handle_define(&mut table, " F(a, b"),
            ParseState::error("Missing closing paren on macro definition F")
        );
    }

    #[test]
    fn test_define_empty_arg() {
        let mut table = SymbolTable::new();
        assert_eq!(
            handle_define(&mut table, " F(a, ) a"),
            ParseState::error("Empty argument name in macro definition F")
        );
        assert_eq!(
            handle_define(&mut table, " F(...) a"),
            ParseState::error("Empty argument name in macro definition F")
        );
    }

    #[test]
    fn test_define_invalid_arg() {
        let mut table = SymbolTable::new();
        assert_eq!(
            handle_define(&mut table, " F(a b) a"),
            ParseState::error("Invalid argument name in macro definition F: \"a b\"")
        );
        assert_eq!(
            handle_define(&mut table, " F(2x) a"),
            ParseState::error("Invalid argument name in macro definition F: \"2x\"")
        );
        assert!(!table.is_defined("F"));
    }

    #[test]
    fn test_undef() {
        let mut table = SymbolTable::new();
        table.add_sym("X", None);
        assert_eq!(handle_undef(&mut table, " X"), ParseState::Normal);
        assert!(!table.is_defined("X"));
        assert_eq!(handle_undef(&mut table, " X"), ParseState::Normal);
    }

    #[test]
    fn test_undef_invalid() {
        let mut table = SymbolTable::new();
        assert_eq!(
            handle_undef(&mut table, ""),
            ParseState::error("Invalid undef statement: ")
        );
    }
}
