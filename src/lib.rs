/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

pub mod assembler;
pub mod ast;
pub mod errors;
pub mod file_reader;
pub mod normalizer;
pub mod parser;
pub mod reports;

use std::path::Path;

use anyhow::Result;
use assembler::{Assembler, Assembly};
use file_reader::SourceReader;

/// Assembles a complete source text in one pass and backpatches every
/// pending reference. Per-line errors never abort the run; they come back
/// as diagnostics on the Assembly.
pub fn assemble_source(source: &str) -> Assembly {
    let mut assembler = Assembler::new();
    for (index, raw_line) in source.lines().enumerate() {
        assembler.assemble_line(index + 1, raw_line);
    }
    assembler.finish()
}

pub fn assemble<R: SourceReader>(source_path: &Path, reader: &R) -> Result<Assembly> {
    let source = reader.read_source(source_path)?;
    Ok(assemble_source(&source))
}
