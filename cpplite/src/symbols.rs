//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::collections::HashMap;
use std::fmt::Display;
use std::io::Write;
use std::rc::Rc;

/// A parameter of a function like macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroArg {
    pub name: String,
    /// Captures the remaining call site arguments (`...name` in the definition).
    pub variadic: bool,
}

impl MacroArg {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variadic: false,
        }
    }

    pub fn variadic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variadic: true,
        }
    }
}

/// `*name` is shorthand for a variadic parameter.
impl From<&str> for MacroArg {
    fn from(value: &str) -> Self {
        match value.strip_prefix('*') {
            Some(name) => Self::variadic(name),
            None => Self::new(value),
        }
    }
}

impl Display for MacroArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.variadic {
            f.write_str("...")?;
        }
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// `#define NAME value`
    Symbol { value: Option<String> },
    /// `#define NAME(args) body`
    Macro {
        args: Vec<MacroArg>,
        body: Option<String>,
    },
}

impl Definition {
    pub fn value(&self) -> Option<&str> {
        match self {
            Definition::Symbol { value } => value.as_deref(),
            Definition::Macro { body, .. } => body.as_deref(),
        }
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Definition::Macro { .. })
    }
}

/// Lookup key of a macro taking exactly `arg_count` arguments.
pub fn arity_key(name: &str, arg_count: usize) -> String {
    format!("{arg_count}*{name}")
}

/// Lookup key of the (single) variadic macro called `name`.
pub fn variadic_key(name: &str) -> String {
    format!("**{name}")
}

pub fn macro_key(name: &str, args: &[MacroArg]) -> String {
    if args.iter().any(|arg| arg.variadic) {
        variadic_key(name)
    } else {
        arity_key(name, args.len())
    }
}

/// The macro name a lookup key was derived from, `None` for plain symbol keys.
fn key_base_name(key: &str) -> Option<&str> {
    if let Some(name) = key.strip_prefix("**") {
        return Some(name);
    }
    let (count, name) = key.split_once('*')?;
    if !count.is_empty() && count.bytes().all(|b| b.is_ascii_digit()) {
        Some(name)
    } else {
        None
    }
}

/// Maps names (and macro lookup keys, see [`macro_key`]) to their definitions.
///
/// A table may have a parent, in which case every query that misses locally is answered by the
/// parent. This is how the scope of a macro expansion sees the global definitions.
#[derive(Debug, Default)]
pub struct SymbolTable {
    definitions: HashMap<String, Definition>,
    /// Number of local macro definitions per macro name.
    macro_names: HashMap<String, usize>,
    parent: Option<Rc<SymbolTable>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Root table seeded with the `-D` command line bindings.
    pub fn from_bindings<I>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut table = Self::new();
        for (name, value) in bindings {
            table.add_sym(name, value);
        }
        table
    }

    pub fn with_parent(parent: Rc<SymbolTable>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<&Rc<SymbolTable>> {
        self.parent.as_ref()
    }

    pub fn add_sym(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        log::debug!("SymbolTable::add_sym() {name}: {value:?}");
        let previous = self.definitions.insert(name.clone(), Definition::Symbol { value });
        self.forget_macro(&name, previous);
    }

    /// Only ever removes a local definition. Must not be called on a table that has a parent.
    pub fn remove_sym(&mut self, name: &str) -> bool {
        log::debug!("SymbolTable::remove_sym() {name}");
        let previous = self.definitions.remove(name);
        let removed = previous.is_some();
        self.forget_macro(name, previous);
        removed
    }

    pub fn add_macro(&mut self, name: &str, args: Vec<MacroArg>, body: Option<String>) {
        let key = macro_key(name, &args);
        log::debug!("SymbolTable::add_macro() {key}: {body:?}");
        let previous = self.definitions.insert(key, Definition::Macro { args, body });
        if !previous.is_some_and(|d| d.is_macro()) {
            *self.macro_names.entry(name.to_owned()).or_default() += 1;
        }
    }

    /// Update the macro name counts after the definition under `key` was replaced or removed.
    fn forget_macro(&mut self, key: &str, previous: Option<Definition>) {
        if !previous.is_some_and(|d| d.is_macro()) {
            return;
        }
        let Some(name) = key_base_name(key) else {
            return;
        };
        if let Some(count) = self.macro_names.get_mut(name) {
            *count -= 1;
            if *count == 0 {
                self.macro_names.remove(name);
            }
        }
    }

    /// Raw lookup by key, e.g. `FOO` for a symbol or `2*FOO` for a macro.
    pub fn get(&self, key: &str) -> Option<&Definition> {
        match self.definitions.get(key) {
            Some(definition) => Some(definition),
            None => self.parent.as_ref()?.get(key),
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.is_symbol(name) || self.is_macro(name)
    }

    pub fn is_symbol(&self, name: &str) -> bool {
        match self.definitions.get(name) {
            Some(definition) => !definition.is_macro(),
            None => self.parent.as_ref().is_some_and(|p| p.is_symbol(name)),
        }
    }

    /// Whether any macro is registered under `name`, whatever its arity. Also accepts a lookup
    /// key directly.
    pub fn is_macro(&self, name: &str) -> bool {
        if let Some(definition) = self.definitions.get(name) {
            return definition.is_macro();
        }
        self.macro_names.contains_key(name)
            || self.parent.as_ref().is_some_and(|p| p.is_macro(name))
    }

    /// The value of a symbol, `""` if it was defined without one.
    pub fn expand_symbol(&self, name: &str) -> Option<&str> {
        self.get(name).map(|d| d.value().unwrap_or_default())
    }

    /// The macro which a call to `name` with `arg_count` arguments refers to: the exact arity
    /// definition if there is one, otherwise the variadic one.
    pub fn resolve_macro(&self, name: &str, arg_count: usize) -> Option<&Definition> {
        self.get(&arity_key(name, arg_count))
            .or_else(|| self.get(&variadic_key(name)))
            .filter(|d| d.is_macro())
    }

    /// The body of the macro selected by the number of `bindings`, or `name` itself if there is
    /// no such macro.
    ///
    /// NOTE: the bindings are not substituted into the body yet, the body is returned as it was
    /// defined.
    pub fn expand_macro(&self, name: &str, bindings: &[&str]) -> String {
        match self.resolve_macro(name, bindings.len()) {
            Some(definition) => definition.value().unwrap_or_default().to_owned(),
            None => name.to_owned(),
        }
    }

    /// Write every definition in this table and its parents to `out`, for debugging.
    pub fn dump(&self, out: &mut dyn Write) -> std::io::Result<()> {
        self.dump_prefixed(out, "")
    }

    fn dump_prefixed(&self, out: &mut dyn Write, prefix: &str) -> std::io::Result<()> {
        let mut keys: Vec<&String> = self.definitions.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(out, "{prefix}Symbol {key}: ")?;
            let definition = &self.definitions[key];
            if let Definition::Macro { args, .. } = definition {
                let args: Vec<String> = args.iter().map(ToString::to_string).collect();
                writeln!(out, "Macro: ({})", args.join(", "))?;
            }
            match definition.value() {
                Some(value) => writeln!(out, "Value: '{value}'")?,
                None => writeln!(out, "Value: <undefined>")?,
            }
        }
        if let Some(parent) = &self.parent {
            parent.dump_prefixed(out, &format!("parent:{prefix}"))?;
        }
        Ok(())
    }
}
