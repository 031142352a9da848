//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use crate::lexer;
use crate::symbols::SymbolTable;

/// Rewrite a line of text, replacing every name defined in `table` with its value. Everything
/// else, including the whitespace in front of a replaced name, is copied unchanged. The result
/// is newline terminated.
///
/// Expansion is a single pass: replacement text is not scanned again.
pub fn expand_line(table: &SymbolTable, line: &str) -> String {
    let mut expanded = String::with_capacity(line.len() + 1);
    let mut remaining = line;

    loop {
        if let Some(token) = lexer::next_token(remaining) {
            expanded.push_str(token.space);
            if table.is_symbol(token.name) {
                let value = table.expand_symbol(token.name).unwrap_or_default();
                log::trace!("expand_line() symbol {} -> {value:?}", token.name);
                expanded.push_str(value);
            } else if table.is_macro(token.name) {
                // The call site arguments only pick the definition, they stay in the output.
                let bindings = lexer::call_arguments(token.rest).unwrap_or_default();
                let body = table.expand_macro(token.name, &bindings);
                log::trace!(
                    "expand_line() macro {} with {} argument(s) -> {body:?}",
                    token.name,
                    bindings.len()
                );
                expanded.push_str(&body);
            } else {
                expanded.push_str(token.name);
            }
            remaining = token.rest;
        } else if let Some((text, rest)) = lexer::next_start(remaining) {
            expanded.push_str(text);
            remaining = rest;
        } else {
            // Trailing whitespace
            expanded.push_str(remaining);
            remaining = "";
        }

        if remaining.is_empty() {
            break;
        }
    }

    expanded.push('\n');
    expanded
}
