//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

/// One entry per open `#ifdef`/`#ifndef`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConditionStack {
    conditions: Vec<bool>,
}

/// An `#else`, `#elifdef`, `#elifndef` or `#endif` without an open conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnexpectedDirective {
    Elif,
    Else,
    Endif,
}

impl std::fmt::Display for UnexpectedDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnexpectedDirective::Elif => "Unexpected elif",
            UnexpectedDirective::Else => "Unexpected else",
            UnexpectedDirective::Endif => "Unexpected endif",
        };
        f.write_str(s)
    }
}

impl ConditionStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.conditions.len()
    }

    /// Output is only produced when every open level is true.
    pub fn is_active(&self) -> bool {
        self.conditions.iter().all(|c| *c)
    }

    /// `#ifdef`/`#ifndef`
    pub fn push(&mut self, condition: bool) {
        self.conditions.push(condition);
    }

    /// `#elifdef`/`#elifndef`: the new condition replaces the current level.
    pub fn replace(&mut self, condition: bool) -> Result<(), UnexpectedDirective> {
        let top = self
            .conditions
            .last_mut()
            .ok_or(UnexpectedDirective::Elif)?;
        *top = condition;
        Ok(())
    }

    /// `#else`
    pub fn invert(&mut self) -> Result<(), UnexpectedDirective> {
        let top = self
            .conditions
            .last_mut()
            .ok_or(UnexpectedDirective::Else)?;
        *top = !*top;
        Ok(())
    }

    /// `#endif`
    pub fn pop(&mut self) -> Result<(), UnexpectedDirective> {
        self.conditions
            .pop()
            .map(|_| ())
            .ok_or(UnexpectedDirective::Endif)
    }
}
