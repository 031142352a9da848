//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::builder::{TypedValueParser, ValueParserFactory};
use error::{Error, Result};
use output::Output;
use processor::Processor;
use symbols::SymbolTable;

mod conditions;
pub mod define;
pub mod error;
mod expand;
pub mod lexer;
mod output;
pub mod processor;
pub mod state;
pub mod symbols;

pub use conditions::{ConditionStack, UnexpectedDirective};
pub use expand::expand_line;

/// A `-D name[=val]` command line binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDefine {
    pub name: String,
    pub value: Option<String>,
}

impl ArgumentDefine {
    /// Only the first `=` separates the name from the value.
    pub fn parse(define: &str) -> Self {
        match define.split_once('=') {
            Some((name, value)) => Self {
                name: name.to_owned(),
                value: Some(value.to_owned()),
            },
            None => Self {
                name: define.to_owned(),
                value: None,
            },
        }
    }

    pub fn into_binding(self) -> (String, Option<String>) {
        (self.name, self.value)
    }
}

#[derive(Clone)]
pub struct ArgumentDefineParser;

impl TypedValueParser for ArgumentDefineParser {
    type Value = ArgumentDefine;

    fn parse_ref(
        &self,
        cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &OsStr,
    ) -> std::result::Result<Self::Value, clap::Error> {
        let value = value
            .to_str()
            .ok_or_else(|| clap::Error::new(clap::error::ErrorKind::InvalidUtf8).with_cmd(cmd))?;
        let define = ArgumentDefine::parse(value);
        if define.name.is_empty() {
            return Err(clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("missing name in definition {value:?}\n"),
            )
            .with_cmd(cmd));
        }
        Ok(define)
    }
}

impl ValueParserFactory for ArgumentDefine {
    type Parser = ArgumentDefineParser;

    fn value_parser() -> Self::Parser {
        ArgumentDefineParser
    }
}

#[derive(Debug, clap::Parser, Clone, Default)]
#[command(version, about)]
pub struct Args {
    /// Add `dir` to the include path. Accepted for compatibility with cpp, `#include` currently
    /// only opens the path exactly as written.
    #[arg(short = 'I', value_name = "dir")]
    pub include: Vec<PathBuf>,
    /// `name[=val]`
    ///
    /// Define `name` to `val`, or define it without a value if `=val` is omitted.
    #[arg(short = 'D', long, value_name = "name[=val]")]
    pub define: Vec<ArgumentDefine>,
    /// Write output to `outfile` instead of stdout.
    #[arg(short = 'o', value_name = "outfile")]
    pub output: Option<PathBuf>,
    /// Dump the symbol table to stderr once processing has finished.
    #[arg(long)]
    pub dump_symbols: bool,
    /// Input file, stdin if omitted.
    pub file: Option<PathBuf>,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_owned(),
        source,
    })
}

pub fn run<STDOUT: Write + 'static, STDERR: Write>(
    stdout: STDOUT,
    mut stderr: STDERR,
    args: Args,
) -> Result<()> {
    match run_impl(stdout, &mut stderr, args) {
        Ok(_) => Ok(()),
        Err(error) => {
            if let Err(error) = writeln!(stderr, "cpplite: {error}") {
                return Err(error.into());
            }
            Err(error)
        }
    }
}

pub fn run_impl<STDOUT: Write + 'static>(
    stdout: STDOUT,
    stderr: &mut dyn Write,
    args: Args,
) -> Result<()> {
    for dir in &args.include {
        log::debug!("run_impl() include directory {dir:?} is not searched");
    }
    let bindings = args.define.into_iter().map(ArgumentDefine::into_binding);
    let mut processor = Processor::new(SymbolTable::from_bindings(bindings));

    // The input is opened first so a missing input doesn't truncate the output file.
    let input: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(open(path)?)),
        None => Box::new(std::io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path).map_err(|source| Error::Open {
            path: path.clone(),
            source,
        })?),
        None => Box::new(stdout),
    };
    let mut output = Output::new(writer);

    let result = processor
        .process(input, &mut output)
        .and_then(|_| processor.finish());

    // Whatever was produced before an error is kept.
    output.close()?;
    if args.dump_symbols {
        processor.table().dump(stderr)?;
    }
    result
}
