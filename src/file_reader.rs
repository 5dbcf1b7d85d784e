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

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AssemblyError;

/// Where the assembler gets its program text from. The driver only ever
/// needs whole-file reads; tests substitute an in-memory implementation.
pub trait SourceReader {
    fn read_source(&self, path: &Path) -> Result<String>;
}

// production reader backed by the filesystem
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read_source(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .with_context(|| format!("Cannot open source program: {}", path.display()))
    }
}

// in-memory reader for tests
#[derive(Default)]
pub struct MockSourceReader {
    programs: HashMap<PathBuf, String>,
}

impl MockSourceReader {
    pub fn add_program(&mut self, path: &str, source: &str) {
        self.programs
            .insert(PathBuf::from(path), source.to_string());
    }
}

impl SourceReader for MockSourceReader {
    fn read_source(&self, path: &Path) -> Result<String> {
        self.programs
            .get(path)
            .cloned()
            .ok_or_else(|| AssemblyError::SourceNotFound(path.display().to_string()).into())
    }
}
