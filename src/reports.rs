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

//! Renderers for the three output files. The headers and field names keep
//! the original report vocabulary so existing consumers of the files keep
//! working.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::assembler::Assembly;
use crate::assembler::symbol_table::{ReferenceTable, SymbolTable};
use anyhow::{Context, Result};

const BYTES_PER_ROW: usize = 16;

/// ASCII rendering of the emit buffer: two uppercase hex digits and a space
/// per byte, a newline after every 16th byte and after a partial final row.
pub fn render_hex_dump(code: &[u8]) -> String {
    let mut out = String::new();
    for (index, byte) in code.iter().enumerate() {
        write!(out, "{:02X} ", byte).expect("writing to a String cannot fail");
        if (index + 1) % BYTES_PER_ROW == 0 {
            out.push('\n');
        }
    }
    if code.len() % BYTES_PER_ROW != 0 {
        out.push('\n');
    }
    out
}

pub fn render_symbol_report(symbols: &SymbolTable) -> String {
    let mut out = String::from("Tabla de Simbolos:\n");
    for (name, offset) in symbols {
        writeln!(out, "{} -> {}", name, offset).expect("writing to a String cannot fail");
    }
    out
}

pub fn render_reference_report(references: &ReferenceTable) -> String {
    let mut out = String::from("Tabla de Referencias Pendientes:\n");
    for (label, sites) in references {
        for site in sites {
            writeln!(
                out,
                "Etiqueta: {}, Posicion: {}, Tamano: {}, Tipo: {}",
                label, site.position, site.width, site.kind
            )
            .expect("writing to a String cannot fail");
        }
    }
    out
}

/// Writes the emitted-bytes file and the two table reports.
pub fn write_reports(
    assembly: &Assembly,
    hex_path: &Path,
    symbol_path: &Path,
    reference_path: &Path,
) -> Result<()> {
    fs::write(hex_path, render_hex_dump(&assembly.machine_code))
        .with_context(|| format!("Failed to write {}", hex_path.display()))?;
    fs::write(symbol_path, render_symbol_report(&assembly.symbols))
        .with_context(|| format!("Failed to write {}", symbol_path.display()))?;
    fs::write(reference_path, render_reference_report(&assembly.references))
        .with_context(|| format!("Failed to write {}", reference_path.display()))?;
    Ok(())
}

// ------------- unit tests -------------
