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

mod components;
mod constants;
mod instruction_encoders;
mod utility_functions;

use crate::assembler::symbol_table::{RefKind, ReferenceTable, SymbolTable, record_pending};
use crate::ast::Instruction;
use crate::errors::AssemblyError;
use constants::*;

/// Per-line encoder. Borrows the assembler's emit buffer and tables; the
/// location counter is always the buffer's current length, so every byte
/// appended advances it by one.
pub struct Encoder<'a> {
    code: &'a mut Vec<u8>,
    symbol_table: &'a SymbolTable,
    references: &'a mut ReferenceTable,
    line_num: usize,
}

impl<'a> Encoder<'a> {
    pub fn new(
        code: &'a mut Vec<u8>,
        symbol_table: &'a SymbolTable,
        references: &'a mut ReferenceTable,
        line_num: usize,
    ) -> Self {
        Self {
            code,
            symbol_table,
            references,
            line_num,
        }
    }

    /// Location counter: the offset at which the next byte will be written.
    pub fn lc(&self) -> usize {
        self.code.len()
    }

    fn emit_byte(&mut self, byte: u8) {
        self.code.push(byte);
    }

    fn emit_dword(&mut self, dword: u32) {
        self.code.extend_from_slice(&dword.to_le_bytes());
    }

    /// Records a patch site starting at the current LC; the caller emits the
    /// placeholder bytes right after.
    fn record_reference(&mut self, label: &str, width: u8, kind: RefKind) {
        record_pending(self.references, label, self.lc(), width, kind);
    }

    pub fn encode_instruction(&mut self, instruction: &Instruction) -> Result<(), AssemblyError> {
        match instruction {
            Instruction::Mov(dst, src) => self.encode_mov(dst, src),
            Instruction::Alu(op, dst, src) => self.encode_alu(*op, dst, src),
            Instruction::Imul(dst, src) => self.encode_imul(dst, src),
            Instruction::Inc(operand) => self.encode_inc(operand),
            Instruction::Dec(operand) => self.encode_dec(operand),
            Instruction::Mul(operand) => self.encode_group3("MUL", MUL_EXT, operand),
            Instruction::Div(operand) => self.encode_group3("DIV", DIV_EXT, operand),
            Instruction::Idiv(operand) => self.encode_group3("IDIV", IDIV_EXT, operand),
            Instruction::Test(dst, src) => self.encode_test(dst, src),
            Instruction::Xchg(dst, src) => self.encode_xchg(dst, src),
            Instruction::Movzx(dst, src) => self.encode_movzx(dst, src),
            Instruction::Lea(dst, src) => self.encode_lea(dst, src),
            Instruction::Push(operand) => self.encode_push(operand),
            Instruction::Pop(operand) => self.encode_pop(operand),
            Instruction::Int(operand) => self.encode_int(operand),
            Instruction::Call(target) => self.encode_call(target),
            Instruction::Loop(target) => self.encode_loop(target),
            Instruction::Jmp(target) => self.encode_jmp(target),
            Instruction::Jcc(condition, target) => self.encode_jcc(*condition, target),
            Instruction::Leave => {
                self.emit_byte(LEAVE_OPCODE);
                Ok(())
            }
            Instruction::Ret => {
                self.emit_byte(RET_OPCODE);
                Ok(())
            }
            Instruction::Nop => {
                self.emit_byte(NOP_OPCODE);
                Ok(())
            }
        }
    }

    fn unsupported_mode(&self, mnemonic: &str) -> AssemblyError {
        AssemblyError::UnsupportedMode {
            line: self.line_num,
            reason: format!("operand combination not supported for {}", mnemonic),
        }
    }
}
