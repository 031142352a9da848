//
// Copyright (c) 2024 Hemi Labs, Inc.
//
// This file is part of the posixutils-rs project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//

use std::io::{BufWriter, Write};

use crate::error::Result;

/// Where the processed text goes, usually [`std::io::stdout`] or the `-o` file. Fragments are
/// written in order and buffered until [`Output::close`].
pub struct Output {
    writer: BufWriter<Box<dyn Write>>,
}

impl Output {
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Flush everything written so far. Called once all output for a run has been produced,
    /// including runs that stopped on an error.
    pub fn close(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
