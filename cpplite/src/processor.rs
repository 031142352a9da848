//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::conditions::{ConditionStack, UnexpectedDirective};
use crate::define;
use crate::error::{Error, Result};
use crate::expand::expand_line;
use crate::lexer;
use crate::state::ParseState;
use crate::symbols::SymbolTable;

/// Guards against files which (indirectly) include themselves.
const MAX_INCLUDE_DEPTH: usize = 200;

/// Drives input lines through the parse state machine. Included files are processed by the same
/// processor, so they share the symbol table, the condition stack and the parse state with the
/// file including them.
#[derive(Debug, Default)]
pub struct Processor {
    table: SymbolTable,
    conditions: ConditionStack,
    state: ParseState,
    include_depth: usize,
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn condition_state(result: std::result::Result<(), UnexpectedDirective>) -> ParseState {
    match result {
        Ok(()) => ParseState::Normal,
        Err(unexpected) => ParseState::error(unexpected.to_string()),
    }
}

impl Processor {
    pub fn new(table: SymbolTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    pub fn conditions(&self) -> &ConditionStack {
        &self.conditions
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Process every line of `input`, writing the result to `output`. Stops reading `input` as
    /// soon as the error state is reached.
    ///
    /// Bytes which aren't valid UTF-8 are replaced rather than rejected.
    pub fn process<R: BufRead>(&mut self, mut input: R, output: &mut dyn Write) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            if let ParseState::Error { message } = &self.state {
                log::warn!("Processor::process() stopping on parse error: {message}");
                return Ok(());
            }
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = strip_line_ending(&buf);
            self.process_line(&String::from_utf8_lossy(line), output)?;
        }
    }

    /// Feed a single line, without its line terminator.
    pub fn process_line(&mut self, line: &str, output: &mut dyn Write) -> Result<()> {
        self.state = match std::mem::take(&mut self.state) {
            ParseState::Normal => self.dispatch(line, output)?,
            ParseState::CollectingDefine(pending) => {
                define::consume_define(&mut self.table, pending, line)
            }
            error @ ParseState::Error { .. } => error,
        };
        Ok(())
    }

    fn dispatch(&mut self, line: &str, output: &mut dyn Write) -> Result<ParseState> {
        let directive = match lexer::directive(line) {
            Some(directive) => directive,
            None => {
                if self.conditions.is_active() {
                    output.write_all(expand_line(&self.table, line).as_bytes())?;
                }
                return Ok(ParseState::Normal);
            }
        };
        log::debug!(
            "Processor::dispatch() #{} {:?}",
            directive.name,
            directive.rest
        );

        let rest = directive.rest;
        let state = match directive.name {
            "define" => define::handle_define(&mut self.table, rest),
            "undef" => define::handle_undef(&mut self.table, rest),
            "ifdef" => {
                self.conditions.push(self.table.is_defined(rest.trim()));
                ParseState::Normal
            }
            "ifndef" => {
                self.conditions.push(!self.table.is_defined(rest.trim()));
                ParseState::Normal
            }
            "elifdef" => {
                let defined = self.table.is_defined(rest.trim());
                condition_state(self.conditions.replace(defined))
            }
            "elifndef" => {
                let defined = self.table.is_defined(rest.trim());
                condition_state(self.conditions.replace(!defined))
            }
            "else" => condition_state(self.conditions.invert()),
            "endif" => condition_state(self.conditions.pop()),
            "include" if self.conditions.is_active() => self.include_file(rest, output)?,
            "include" => ParseState::Normal,
            name => {
                writeln!(output, "#{name} not recognized")?;
                ParseState::Normal
            }
        };
        Ok(state)
    }

    /// `#include "path"`. The path is used as written, relative to the working directory.
    fn include_file(&mut self, rest: &str, output: &mut dyn Write) -> Result<ParseState> {
        let path = match lexer::include_path(rest) {
            Some(path) => PathBuf::from(path),
            None => return Ok(ParseState::error("#include requires a quoted filename")),
        };
        if self.include_depth >= MAX_INCLUDE_DEPTH {
            return Err(Error::IncludeDepth { path });
        }
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(error) => {
                return Ok(ParseState::error(format!(
                    "Unable to open include file {path:?}: {error}"
                )))
            }
        };

        let before = self.conditions.depth();
        log::debug!("Processor::include_file() {path:?} at depth {before}");
        self.include_depth += 1;
        let result = self.process(BufReader::new(file), output);
        self.include_depth -= 1;
        result?;

        let after = self.conditions.depth();
        if before != after {
            return Err(Error::UnbalancedInclude {
                path,
                before,
                after,
            });
        }
        Ok(std::mem::take(&mut self.state))
    }

    /// Checks once the top level input is exhausted. Returns the parse error if processing
    /// stopped on one.
    pub fn finish(&mut self) -> Result<()> {
        if let ParseState::CollectingDefine(pending) = &self.state {
            log::warn!("unterminated #define {}, discarding it", pending.name);
            self.state = ParseState::Normal;
        }
        if self.conditions.depth() > 0 {
            log::warn!(
                "{} unterminated #ifdef/#ifndef directive(s)",
                self.conditions.depth()
            );
        }
        match &self.state {
            ParseState::Error { message } => Err(Error::Parse(message.clone())),
            _ => Ok(()),
        }
    }
}
