//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use crate::symbols::MacroArg;

/// Where the line driver is. The symbol table and the condition stack are shared by every state
/// and live in [`crate::processor::Processor`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParseState {
    /// Dispatching directives and expanding text.
    #[default]
    Normal,
    /// Gathering the continuation lines of a `#define`.
    CollectingDefine(PendingDefine),
    /// Terminal for the current source.
    Error { message: String },
}

impl ParseState {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// A `#define` whose value has not been completely read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDefine {
    pub name: String,
    /// `Some` for a function like macro, even when it takes no arguments.
    pub args: Option<Vec<MacroArg>>,
    /// Continuation lines read so far, still carrying their trailing backslashes.
    pub lines: Vec<String>,
}

impl PendingDefine {
    pub fn symbol(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            lines: Vec::new(),
        }
    }

    pub fn macro_definition(name: impl Into<String>, args: Vec<MacroArg>) -> Self {
        Self {
            name: name.into(),
            args: Some(args),
            lines: Vec::new(),
        }
    }
}
