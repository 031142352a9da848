//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error processing io: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Processing stopped in the error state.
    #[error("parse error: {0}")]
    Parse(String),
    #[error("#include {path:?} doesn't have balanced #if/#endif's ({before} vs {after})")]
    UnbalancedInclude {
        path: PathBuf,
        before: usize,
        after: usize,
    },
    #[error("#include {path:?} nested too deeply")]
    IncludeDepth { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait GetExitCode {
    fn get_exit_code(&self) -> i32;
}

impl<T> GetExitCode for Result<T> {
    fn get_exit_code(&self) -> i32 {
        match self {
            Ok(_) => 0,
            Err(_) => 1,
        }
    }
}
