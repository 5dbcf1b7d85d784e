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

use crate::assembler::encoder::Encoder;
use crate::assembler::encoder::utility_functions::{modrm, sib};
use crate::assembler::symbol_table::RefKind;
use crate::ast::{Operand, Register32};
use crate::errors::AssemblyError;

// Memory-addressing emitters shared by every instruction that takes an r/m
// operand. Each writes the ModR/M byte, any SIB byte and any displacement,
// recording an absolute pending reference wherever a label address has to be
// patched in later. The caller has already emitted the opcode.
impl<'a> Encoder<'a> {
    pub(super) fn emit_mem_operand(
        &mut self,
        operand: &Operand,
        reg_field: u8,
    ) -> Result<(), AssemblyError> {
        match operand {
            Operand::MemAbs(label) => {
                self.emit_mem_abs(label, reg_field);
                Ok(())
            }
            Operand::MemBase { base, disp } => {
                self.emit_mem_base(*base, *disp, reg_field);
                Ok(())
            }
            Operand::MemSib { label, disp8 } => {
                self.emit_mem_sib(label, *disp8, reg_field);
                Ok(())
            }
            _ => Err(AssemblyError::UnsupportedMode {
                line: self.line_num,
                reason: "expected a memory operand".to_string(),
            }),
        }
    }

    /// `[LABEL]`: mod=00 with r/m=101 selects a bare disp32.
    fn emit_mem_abs(&mut self, label: &str, reg_field: u8) {
        self.emit_byte(modrm(0b00, reg_field, 0b101));
        self.record_reference(label, 4, RefKind::Absolute);
        self.emit_dword(0);
    }

    /// `[EBP±disp]`. A zero displacement still takes the disp8 form, since
    /// mod=00 with r/m=101 would mean bare disp32 instead of [EBP].
    fn emit_mem_base(&mut self, base: Register32, disp: i32, reg_field: u8) {
        if (-128..=127).contains(&disp) {
            self.emit_byte(modrm(0b01, reg_field, base.code()));
            self.emit_byte(disp as i8 as u8);
        } else {
            self.emit_byte(modrm(0b10, reg_field, base.code()));
            self.emit_dword(disp as u32);
        }
    }

    /// `[LABEL + ESI*4 (+ d8)]`: r/m=100 announces the SIB byte; scale=4,
    /// index=ESI, base=101 so the label's disp32 follows.
    fn emit_mem_sib(&mut self, label: &str, disp8: u8, reg_field: u8) {
        let mode = if disp8 == 0 { 0b00 } else { 0b01 };
        self.emit_byte(modrm(mode, reg_field, 0b100));
        self.emit_byte(sib(0b10, 0b110, 0b101));
        if mode == 0b01 {
            self.emit_byte(disp8);
        }
        self.record_reference(label, 4, RefKind::Absolute);
        self.emit_dword(0);
    }
}
