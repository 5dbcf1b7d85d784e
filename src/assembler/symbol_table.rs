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

use std::collections::HashMap;
use std::fmt;

// The symbol table stores label names and the location counter at their
// point of definition.
pub type SymbolTable = HashMap<String, u32>;

/// How a patched-in value relates to its label: the label's address itself,
/// or the distance from the byte after the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Absolute,
    PcRelative,
}

impl fmt::Display for RefKind {
    // Report vocabulary, kept in the original's language.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Absolute => write!(f, "ABSOLUTO"),
            RefKind::PcRelative => write!(f, "RELATIVO"),
        }
    }
}

/// A placeholder region in the emit buffer waiting for its label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReference {
    /// Offset of the first placeholder byte in the emit buffer.
    pub position: usize,
    /// 1 or 4 placeholder bytes.
    pub width: u8,
    pub kind: RefKind,
}

// Patch sites are kept per label, in the order they were recorded.
pub type ReferenceTable = HashMap<String, Vec<PendingReference>>;

pub fn record_pending(
    references: &mut ReferenceTable,
    label: &str,
    position: usize,
    width: u8,
    kind: RefKind,
) {
    references
        .entry(label.to_string())
        .or_default()
        .push(PendingReference {
            position,
            width,
            kind,
        });
}
