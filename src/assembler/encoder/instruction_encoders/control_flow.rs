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
use crate::assembler::encoder::constants::*;
use crate::assembler::symbol_table::RefKind;
use crate::ast::Condition;
use crate::errors::AssemblyError;

impl<'a> Encoder<'a> {
    pub fn encode_call(&mut self, target: &str) -> Result<(), AssemblyError> {
        self.emit_byte(CALL_REL32);
        self.record_reference(target, 4, RefKind::PcRelative);
        self.emit_dword(0);
        Ok(())
    }

    pub fn encode_loop(&mut self, target: &str) -> Result<(), AssemblyError> {
        self.emit_byte(LOOP_REL8);
        self.record_reference(target, 1, RefKind::PcRelative);
        self.emit_byte(0);
        Ok(())
    }

    /// Short vs near selection: a label already defined and within rel8
    /// range resolves immediately; a defined label out of range takes the
    /// near form with a pending rel32 site; an unknown forward label commits
    /// to the short form and is patched later, truncating to the low byte if
    /// the final distance does not fit (the single-pass policy).
    pub fn encode_jmp(&mut self, target: &str) -> Result<(), AssemblyError> {
        match self.short_branch_offset(target) {
            Some(offset) => {
                self.emit_byte(JMP_SHORT);
                self.emit_byte(offset as u8);
            }
            None if self.symbol_table.contains_key(target) => {
                self.emit_byte(JMP_NEAR);
                self.record_reference(target, 4, RefKind::PcRelative);
                self.emit_dword(0);
            }
            None => {
                self.emit_byte(JMP_SHORT);
                self.record_reference(target, 1, RefKind::PcRelative);
                self.emit_byte(0);
            }
        }
        Ok(())
    }

    pub fn encode_jcc(&mut self, condition: Condition, target: &str) -> Result<(), AssemblyError> {
        let (short_opcode, near_opcode) = condition_opcodes(condition);
        match self.short_branch_offset(target) {
            Some(offset) => {
                self.emit_byte(short_opcode);
                self.emit_byte(offset as u8);
            }
            None if self.symbol_table.contains_key(target) => {
                self.emit_byte(TWO_BYTE_PREFIX);
                self.emit_byte(near_opcode);
                self.record_reference(target, 4, RefKind::PcRelative);
                self.emit_dword(0);
            }
            None => {
                self.emit_byte(short_opcode);
                self.record_reference(target, 1, RefKind::PcRelative);
                self.emit_byte(0);
            }
        }
        Ok(())
    }

    /// rel8 distance to an already-defined label, measured from the byte
    /// after a two-byte short branch starting at the current LC.
    fn short_branch_offset(&self, target: &str) -> Option<i8> {
        let &target_lc = self.symbol_table.get(target)?;
        let offset = i64::from(target_lc) - (self.lc() as i64 + 2);
        i8::try_from(offset).ok()
    }
}
