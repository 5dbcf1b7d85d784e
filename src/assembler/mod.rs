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

mod encoder;
pub mod symbol_table;

use crate::ast::{Directive, SourceLine};
use crate::errors::AssemblyError;
use crate::normalizer::normalize;
use crate::parser;
use crate::parser::parse_immediate;
use encoder::Encoder;
use symbol_table::{PendingReference, RefKind, ReferenceTable, SymbolTable};

/// Result of a complete run: the patched machine code plus the two tables
/// and the diagnostics collected along the way. References stay listed even
/// after being resolved so the report can show every patch site.
#[derive(Debug, Default)]
pub struct Assembly {
    pub machine_code: Vec<u8>,
    pub symbols: SymbolTable,
    pub references: ReferenceTable,
    pub diagnostics: Vec<AssemblyError>,
}

/// Single-pass assembler state. Lines are fed front to back; `finish` runs
/// the backpatcher and yields the final Assembly. The location counter is
/// the emit buffer's length at all times.
#[derive(Default)]
pub struct Assembler {
    code: Vec<u8>,
    symbols: SymbolTable,
    references: ReferenceTable,
    diagnostics: Vec<AssemblyError>,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one raw source line: normalize, parse, apply. Any error is
    /// recorded as a diagnostic and the line emits nothing; assembly
    /// continues with the next line.
    pub fn assemble_line(&mut self, line_number: usize, raw: &str) {
        let text = normalize(raw);
        if text.is_empty() {
            return;
        }
        match parser::parse_line(line_number, &text) {
            Ok(line) => self.apply(line),
            Err(error) => self.diagnostics.push(error),
        }
    }

    fn apply(&mut self, line: SourceLine) {
        // The label takes the LC before the line's own bytes are emitted.
        if let Some(label) = &line.label {
            self.define_symbol(line.line_number, label);
        }

        if let Some(instruction) = &line.instruction {
            let mut encoder = Encoder::new(
                &mut self.code,
                &self.symbols,
                &mut self.references,
                line.line_number,
            );
            if let Err(error) = encoder.encode_instruction(instruction) {
                self.diagnostics.push(error);
            }
        }

        if let Some(directive) = &line.directive {
            self.apply_directive(line.line_number, directive);
        }
    }

    /// The first definition wins on a duplicate; the redefinition is
    /// reported and ignored.
    fn define_symbol(&mut self, line_number: usize, label: &str) {
        if self.symbols.contains_key(label) {
            self.diagnostics.push(AssemblyError::DuplicateLabel {
                line: line_number,
                label: label.to_string(),
            });
            return;
        }
        self.symbols
            .insert(label.to_string(), self.code.len() as u32);
    }

    fn apply_directive(&mut self, line_number: usize, directive: &Directive) {
        match directive {
            Directive::DefineDwords(values) => {
                for value in values {
                    let parsed = match parse_immediate(value) {
                        Some(parsed) => parsed,
                        None => {
                            self.diagnostics.push(AssemblyError::SyntaxError {
                                line: line_number,
                                reason: format!("invalid DD value: {}", value),
                            });
                            0
                        }
                    };
                    self.code.extend_from_slice(&parsed.to_le_bytes());
                }
            }
            Directive::DefineByte(value) => {
                let parsed = match value {
                    Some(token) => match parse_immediate(token) {
                        Some(parsed) => parsed,
                        None => {
                            self.diagnostics.push(AssemblyError::SyntaxError {
                                line: line_number,
                                reason: format!("invalid DB value: {}", token),
                            });
                            0
                        }
                    },
                    None => 0,
                };
                self.code.push(parsed as u8);
            }
        }
    }

    /// Runs the backpatcher and hands over the finished program.
    pub fn finish(mut self) -> Assembly {
        self.resolve_references();
        Assembly {
            machine_code: self.code,
            symbols: self.symbols,
            references: self.references,
            diagnostics: self.diagnostics,
        }
    }

    fn resolve_references(&mut self) {
        let references = std::mem::take(&mut self.references);
        for (label, sites) in &references {
            let Some(&target) = self.symbols.get(label) else {
                self.diagnostics
                    .push(AssemblyError::UnresolvedLabel(label.clone()));
                continue;
            };
            for site in sites {
                self.patch(site, target);
            }
        }
        self.references = references;
    }

    fn patch(&mut self, site: &PendingReference, target: u32) {
        let value = match site.kind {
            RefKind::Absolute => target,
            RefKind::PcRelative => {
                (i64::from(target) - (site.position as i64 + i64::from(site.width))) as u32
            }
        };
        match site.width {
            // A rel8 site takes the low byte even when the distance does not
            // fit; the short-form commitment is never rewritten.
            1 => self.code[site.position] = value as u8,
            4 => self.code[site.position..site.position + 4]
                .copy_from_slice(&value.to_le_bytes()),
            _ => unreachable!("patch sites are 1 or 4 bytes wide"),
        }
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble_source;

    #[test]
    fn test_mov_reg_imm() {
        let result = assemble_source("MOV EAX, 1");
        assert_eq!(result.machine_code, vec![0xB8, 0x01, 0x00, 0x00, 0x00]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_mov_reg_reg() {
        let result = assemble_source("MOV EBX, EAX");
        assert_eq!(result.machine_code, vec![0x89, 0xC3]);
    }

    #[test]
    fn test_accumulator_form_wins_over_short_immediate() {
        let result = assemble_source("ADD EAX, 5");
        assert_eq!(result.machine_code, vec![0x05, 0x05, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_short_immediate_on_non_accumulator() {
        let result = assemble_source("ADD ECX, 5");
        assert_eq!(result.machine_code, vec![0x83, 0xC1, 0x05]);
    }

    #[test]
    fn test_long_immediate_on_non_accumulator() {
        let result = assemble_source("ADD ECX, 300");
        assert_eq!(
            result.machine_code,
            vec![0x81, 0xC1, 0x2C, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn test_negative_immediate_takes_short_form() {
        // -1 sign-extends from one byte, so the 0x83 form applies.
        let result = assemble_source("SUB EBX, -1");
        assert_eq!(result.machine_code, vec![0x83, 0xEB, 0xFF]);
    }

    #[test]
    fn test_alu_reg_reg_family() {
        assert_eq!(assemble_source("SUB EBX, EAX").machine_code, vec![0x29, 0xC3]);
        assert_eq!(assemble_source("CMP EAX, EBX").machine_code, vec![0x39, 0xD8]);
        assert_eq!(assemble_source("XOR EAX, EAX").machine_code, vec![0x31, 0xC0]);
        assert_eq!(assemble_source("AND EDX, ECX").machine_code, vec![0x21, 0xCA]);
        assert_eq!(assemble_source("OR ESI, EDI").machine_code, vec![0x09, 0xFE]);
    }

    #[test]
    fn test_alu_memory_forms() {
        let result = assemble_source("SUMA DD 0\nADD [SUMA], EAX");
        assert_eq!(
            result.machine_code,
            vec![0x00, 0x00, 0x00, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00, 0x00]
        );

        let result = assemble_source("SUMA DD 0\nADD EAX, [SUMA]");
        assert_eq!(
            result.machine_code,
            vec![0x00, 0x00, 0x00, 0x00, 0x03, 0x05, 0x00, 0x00, 0x00, 0x00]
        );

        // mem,imm with the imm8 downgrade: 83 /0 over the disp32 form.
        let result = assemble_source("SUMA DD 0\nADD [SUMA], 5");
        assert_eq!(
            result.machine_code,
            vec![0x00, 0x00, 0x00, 0x00, 0x83, 0x05, 0x00, 0x00, 0x00, 0x00, 0x05]
        );
    }

    #[test]
    fn test_short_self_jump() {
        let result = assemble_source("INICIO: \nJMP INICIO");
        assert_eq!(result.machine_code, vec![0xEB, 0xFE]);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_backward_jump_out_of_short_range_takes_near_form() {
        let mut source = String::from("INICIO:\n");
        for _ in 0..130 {
            source.push_str("NOP\n");
        }
        source.push_str("JMP INICIO");
        let result = assemble_source(&source);

        assert_eq!(result.machine_code.len(), 135);
        assert_eq!(result.machine_code[130], 0xE9);
        // rel32 from the byte after the displacement: 0 - 135 = -135
        assert_eq!(
            &result.machine_code[131..135],
            &(-135i32).to_le_bytes()[..]
        );
    }

    #[test]
    fn test_forward_short_jump_truncates_to_low_byte() {
        // The forward JMP commits to the short form; the resolved distance
        // (130) does not fit in a signed byte and the low byte is written
        // as-is. Documented single-pass behavior, not a near-form rewrite.
        let mut source = String::from("JMP FIN\n");
        for _ in 0..130 {
            source.push_str("NOP\n");
        }
        source.push_str("FIN:");
        let result = assemble_source(&source);

        assert_eq!(result.machine_code.len(), 132);
        assert_eq!(result.machine_code[0], 0xEB);
        assert_eq!(result.machine_code[1], 0x82);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_data_then_load() {
        let result = assemble_source("DATO DD 5, 2, 8\nMOV EAX, [DATO]");
        assert_eq!(
            result.machine_code,
            vec![
                0x05, 0x00, 0x00, 0x00, // 5
                0x02, 0x00, 0x00, 0x00, // 2
                0x08, 0x00, 0x00, 0x00, // 8
                0x8B, 0x05, 0x00, 0x00, 0x00, 0x00, // MOV EAX, [0]
            ]
        );
        assert_eq!(result.symbols.get("DATO"), Some(&0));
    }

    #[test]
    fn test_accumulator_store_uses_moffs_form() {
        let result = assemble_source("DATO DD 7\nMOV [DATO], EAX");
        assert_eq!(
            result.machine_code,
            vec![0x07, 0x00, 0x00, 0x00, 0xA3, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_non_accumulator_store_takes_general_form() {
        let result = assemble_source("DATO DD 7\nMOV [DATO], EBX");
        assert_eq!(
            result.machine_code,
            vec![0x07, 0x00, 0x00, 0x00, 0x89, 0x1D, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_mov_memory_immediate() {
        let result = assemble_source("VAR DD 0\nMOV [VAR], 2");
        assert_eq!(
            result.machine_code,
            vec![
                0x00, 0x00, 0x00, 0x00, // VAR
                0xC7, 0x05, 0x00, 0x00, 0x00, 0x00, // C7 /0 [0]
                0x02, 0x00, 0x00, 0x00, // imm32
            ]
        );
    }

    #[test]
    fn test_ebp_displacement_forms() {
        assert_eq!(
            assemble_source("MOV EAX, [EBP + 8]").machine_code,
            vec![0x8B, 0x45, 0x08]
        );
        assert_eq!(
            assemble_source("MOV [EBP - 4], ECX").machine_code,
            vec![0x89, 0x4D, 0xFC]
        );
        // Zero displacement still encodes a disp8 field.
        assert_eq!(
            assemble_source("PUSH [EBP]").machine_code,
            vec![0xFF, 0x75, 0x00]
        );
        assert_eq!(
            assemble_source("MOV EAX, [EBP + 300]").machine_code,
            vec![0x8B, 0x85, 0x2C, 0x01, 0x00, 0x00]
        );
    }

    #[test]
    fn test_scaled_index_forms() {
        let result = assemble_source("TABLA DD 1\nMOV EAX, [TABLA + ESI*4]");
        assert_eq!(
            result.machine_code,
            vec![
                0x01, 0x00, 0x00, 0x00, // TABLA
                0x8B, 0x04, 0xB5, 0x00, 0x00, 0x00, 0x00,
            ]
        );

        let result = assemble_source("TABLA DD 1\nMOV EAX, [TABLA + ESI*4 + 2]");
        assert_eq!(
            result.machine_code,
            vec![
                0x01, 0x00, 0x00, 0x00,
                0x8B, 0x44, 0xB5, 0x02, 0x00, 0x00, 0x00, 0x00,
            ]
        );
    }

    #[test]
    fn test_call_resolves_forward() {
        let result = assemble_source("CALL RUTINA\nRET\nRUTINA:\nRET");
        assert_eq!(
            result.machine_code,
            vec![0xE8, 0x01, 0x00, 0x00, 0x00, 0xC3, 0xC3]
        );
    }

    #[test]
    fn test_loop_backward() {
        let result = assemble_source("INICIO:\nNOP\nLOOP INICIO");
        assert_eq!(result.machine_code, vec![0x90, 0xE2, 0xFD]);
    }

    #[test]
    fn test_conditional_forward_short() {
        let result = assemble_source("JE FIN\nNOP\nFIN:");
        assert_eq!(result.machine_code, vec![0x74, 0x01, 0x90]);
    }

    #[test]
    fn test_conditional_backward_near() {
        let mut source = String::from("INICIO:\n");
        for _ in 0..130 {
            source.push_str("NOP\n");
        }
        source.push_str("JNE INICIO");
        let result = assemble_source(&source);

        assert_eq!(result.machine_code.len(), 136);
        assert_eq!(result.machine_code[130], 0x0F);
        assert_eq!(result.machine_code[131], 0x85);
        assert_eq!(
            &result.machine_code[132..136],
            &(-136i32).to_le_bytes()[..]
        );
    }

    #[test]
    fn test_single_byte_instructions() {
        assert_eq!(assemble_source("LEAVE").machine_code, vec![0xC9]);
        assert_eq!(assemble_source("RET").machine_code, vec![0xC3]);
        assert_eq!(assemble_source("NOP").machine_code, vec![0x90]);
    }

    #[test]
    fn test_inc_dec_push_pop() {
        assert_eq!(assemble_source("INC EAX").machine_code, vec![0x40]);
        assert_eq!(assemble_source("DEC EDI").machine_code, vec![0x4F]);
        assert_eq!(assemble_source("PUSH ECX").machine_code, vec![0x51]);
        assert_eq!(assemble_source("POP EBX").machine_code, vec![0x5B]);
        assert_eq!(
            assemble_source("PUSH 10").machine_code,
            vec![0x68, 0x0A, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_int_and_range_error() {
        assert_eq!(assemble_source("INT 80H").machine_code, vec![0xCD, 0x80]);

        let result = assemble_source("INT 300");
        assert!(result.machine_code.is_empty());
        assert!(matches!(
            result.diagnostics[0],
            AssemblyError::RangeError { line: 1, .. }
        ));
    }

    #[test]
    fn test_group3_register_and_memory() {
        assert_eq!(assemble_source("MUL EBX").machine_code, vec![0xF7, 0xE3]);
        assert_eq!(assemble_source("DIV ECX").machine_code, vec![0xF7, 0xF1]);
        assert_eq!(assemble_source("IDIV EDX").machine_code, vec![0xF7, 0xFA]);

        let result = assemble_source("DATO DD 3\nMUL [DATO]");
        assert_eq!(
            result.machine_code,
            vec![0x03, 0x00, 0x00, 0x00, 0xF7, 0x25, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_group3_rejects_other_memory_forms_without_stray_bytes() {
        let result = assemble_source("MUL [EBP + 4]");
        assert!(result.machine_code.is_empty());
        assert!(matches!(
            result.diagnostics[0],
            AssemblyError::UnsupportedMode { .. }
        ));
    }

    #[test]
    fn test_movzx_forms() {
        assert_eq!(
            assemble_source("MOVZX EAX, AL").machine_code,
            vec![0x0F, 0xB6, 0xC0]
        );
        let result = assemble_source("FLAG DB 7\nMOVZX EBX, BYTE [FLAG]");
        assert_eq!(
            result.machine_code,
            vec![0x07, 0x0F, 0xB6, 0x1D, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_imul_test_xchg() {
        assert_eq!(
            assemble_source("IMUL EAX, EBX").machine_code,
            vec![0x0F, 0xAF, 0xC3]
        );
        assert_eq!(assemble_source("TEST EAX, EBX").machine_code, vec![0x85, 0xD8]);
        assert_eq!(assemble_source("XCHG EAX, ECX").machine_code, vec![0x87, 0xC8]);
    }

    #[test]
    fn test_lea_over_every_memory_form() {
        let result = assemble_source("TABLA DD 1\nLEA EAX, [TABLA + ESI*4 + 4]");
        assert_eq!(
            result.machine_code,
            vec![
                0x01, 0x00, 0x00, 0x00,
                0x8D, 0x44, 0xB5, 0x04, 0x00, 0x00, 0x00, 0x00,
            ]
        );
        assert_eq!(
            assemble_source("LEA EDX, [EBP - 8]").machine_code,
            vec![0x8D, 0x55, 0xF8]
        );
    }

    #[test]
    fn test_db_values() {
        assert_eq!(assemble_source("FLAG DB 255").machine_code, vec![0xFF]);
        assert_eq!(assemble_source("FLAG DB 'A'").machine_code, vec![0x41]);
        // Only the low byte of the value is kept.
        assert_eq!(assemble_source("FLAG DB 300").machine_code, vec![0x2C]);
    }

    #[test]
    fn test_dd_bad_value_becomes_zero() {
        let result = assemble_source("DATO DD 5, XYZ, 8");
        assert_eq!(
            result.machine_code,
            vec![
                0x05, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00,
                0x08, 0x00, 0x00, 0x00,
            ]
        );
        assert!(matches!(
            result.diagnostics[0],
            AssemblyError::SyntaxError { line: 1, .. }
        ));
    }

    #[test]
    fn test_duplicate_label_keeps_first_definition() {
        let result = assemble_source("X:\nNOP\nX:");
        assert_eq!(result.symbols.get("X"), Some(&0));
        assert!(matches!(
            result.diagnostics[0],
            AssemblyError::DuplicateLabel { line: 3, .. }
        ));
    }

    #[test]
    fn test_unresolved_label_warns_and_leaves_zero() {
        let result = assemble_source("JMP NADA");
        assert_eq!(result.machine_code, vec![0xEB, 0x00]);
        assert_eq!(
            result.diagnostics,
            vec![AssemblyError::UnresolvedLabel("NADA".to_string())]
        );
    }

    #[test]
    fn test_ignored_directives_emit_nothing() {
        let result = assemble_source("SECTION .TEXT\nGLOBAL _START\nBITS 32\nLEN EQU 6");
        assert!(result.machine_code.is_empty());
        assert!(result.symbols.is_empty());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_errors_do_not_stop_assembly() {
        let result = assemble_source("MOV EAX, 1\nFROB EBX\nMOV EBX, 2");
        assert_eq!(
            result.machine_code,
            vec![0xB8, 0x01, 0x00, 0x00, 0x00, 0xBB, 0x02, 0x00, 0x00, 0x00]
        );
        assert_eq!(result.diagnostics.len(), 1);
    }

    #[test]
    fn test_pending_references_stay_inside_the_buffer() {
        let result = assemble_source(
            "CALL RUTINA\nJMP FIN\nDATO DD 1\nMOV EAX, [DATO]\nRUTINA:\nRET\nFIN:",
        );
        let len = result.machine_code.len();
        for sites in result.references.values() {
            for site in sites {
                assert!(site.position + site.width as usize <= len);
            }
        }
    }

    #[test]
    fn test_pc_relative_patches_read_back_as_distance() {
        let result = assemble_source("CALL RUTINA\nNOP\nRUTINA:\nRET");
        for (label, sites) in &result.references {
            let target = result.symbols[label];
            for site in sites {
                if site.kind == RefKind::PcRelative && site.width == 4 {
                    let mut raw = [0u8; 4];
                    raw.copy_from_slice(
                        &result.machine_code[site.position..site.position + 4],
                    );
                    let stored = i32::from_le_bytes(raw);
                    let expected =
                        i64::from(target) - (site.position as i64 + i64::from(site.width));
                    assert_eq!(i64::from(stored), expected);
                }
            }
        }
    }
}
