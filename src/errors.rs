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

use thiserror::Error;

// Per-line failures are collected as diagnostics on the final Assembly and
// never abort the run; the offending line simply emits nothing.
#[derive(Error, Debug, PartialEq)]
pub enum AssemblyError {
    #[error("Syntax error on line {line}: {reason}")]
    SyntaxError { line: usize, reason: String },

    #[error("Range error on line {line}: {reason}")]
    RangeError { line: usize, reason: String },

    #[error("Unsupported operand mode on line {line}: {reason}")]
    UnsupportedMode { line: usize, reason: String },

    #[error("Duplicate label definition on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("Warning: label \"{0}\" was never defined, its references remain unresolved")]
    UnresolvedLabel(String),

    #[error("Source program not found: {0}")]
    SourceNotFound(String),
}
