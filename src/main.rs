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

use anyhow::Result;
use asm32::assemble;
use asm32::file_reader::FsSourceReader;
use asm32::reports::write_reports;
use clap::Parser as clap_parser;
use std::path::PathBuf;

// Every path defaults to the classic fixed file names, so running the
// binary with no arguments assembles programa.asm in the working directory.
#[derive(clap_parser)]
#[clap(version = "0.1.0")]
struct Opts {
    /// Source program to assemble
    #[clap(short, long, default_value = "programa.asm")]
    input: PathBuf,
    /// Hex rendering of the emitted bytes
    #[clap(long, default_value = "programa.hex")]
    hex_output: PathBuf,
    /// Symbol table report
    #[clap(long, default_value = "simbolos.txt")]
    symbol_report: PathBuf,
    /// Pending-reference report
    #[clap(long, default_value = "referencias.txt")]
    reference_report: PathBuf,
}

fn main() -> Result<()> {
    let opts: Opts = Opts::parse();

    let reader = FsSourceReader;
    let assembly = assemble(&opts.input, &reader)?;

    // Diagnostics are advisory; they never change the exit code.
    for diagnostic in &assembly.diagnostics {
        eprintln!("{}", diagnostic);
    }

    write_reports(
        &assembly,
        &opts.hex_output,
        &opts.symbol_report,
        &opts.reference_report,
    )?;

    println!(
        "Assembled {} ({} bytes) into {}, {} and {}",
        opts.input.display(),
        assembly.machine_code.len(),
        opts.hex_output.display(),
        opts.symbol_report.display(),
        opts.reference_report.display()
    );

    Ok(())
}
