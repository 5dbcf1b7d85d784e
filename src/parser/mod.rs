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

mod ast_builder;

use crate::ast::SourceLine;
use crate::errors::AssemblyError;
use ast_builder::AstBuilder;
use pest::Parser;
use pest_derive::Parser;

pub use ast_builder::operand_builders::parse_immediate;

// Derive the parser from our grammar file.
#[derive(Parser)]
#[grammar = "./grammar.pest"]
pub struct AsmParser;

// Parses one normalized, non-empty source line into its AST form. Lines are
// parsed independently; the caller supplies the original line number for
// diagnostics.
pub fn parse_line(line_number: usize, text: &str) -> Result<SourceLine, AssemblyError> {
    let mut pairs = AsmParser::parse(Rule::line, text).map_err(|_| AssemblyError::SyntaxError {
        line: line_number,
        reason: format!("unrecognized line: {}", text),
    })?;

    let mut source_line = SourceLine {
        line_number,
        ..SourceLine::default()
    };

    let line_pair = pairs.next().expect("a successful parse yields a line pair");
    for pair in line_pair.into_inner() {
        match pair.as_rule() {
            Rule::label_def => {
                let name = pair
                    .into_inner()
                    .next()
                    .expect("label rule holds an ident")
                    .as_str();
                source_line.label = Some(name.to_string());
            }
            // NASM housekeeping (SECTION/GLOBAL/EXTERN/BITS, EQU) emits nothing.
            Rule::skipped | Rule::equ_line => {}
            Rule::data_def => {
                let (label, directive) = AstBuilder::new(line_number, pair).build_data_def()?;
                source_line.label = Some(label);
                source_line.directive = Some(directive);
            }
            Rule::instruction => {
                source_line.instruction =
                    Some(AstBuilder::new(line_number, pair).build_instruction()?);
            }
            Rule::EOI => {}
            _ => unreachable!("unexpected statement rule: {:?}", pair.as_rule()),
        }
    }

    Ok(source_line)
}

// ------------- unit tests -------------
