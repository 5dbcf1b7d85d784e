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
use crate::assembler::encoder::utility_functions::{fits_imm8, modrm};
use crate::ast::{AluOp, Operand, Register32};
use crate::errors::AssemblyError;

impl<'a> Encoder<'a> {
    /// Shared encoder for ADD/SUB/CMP/XOR/AND/OR. Shapes are tried in
    /// order: reg,reg; EAX,imm; reg,mem; mem,reg; r/m,imm — so the
    /// accumulator form wins over the short-immediate optimization.
    pub fn encode_alu(
        &mut self,
        op: AluOp,
        dst: &Operand,
        src: &Operand,
    ) -> Result<(), AssemblyError> {
        let opcodes = alu_opcodes(op);
        match (dst, src) {
            (Operand::Reg32(d), Operand::Reg32(s)) => {
                self.emit_byte(opcodes.rm_reg);
                self.emit_byte(modrm(0b11, s.code(), d.code()));
                Ok(())
            }
            (Operand::Reg32(Register32::Eax), Operand::Imm32(value)) => {
                self.emit_byte(opcodes.eax_imm);
                self.emit_dword(*value);
                Ok(())
            }
            (Operand::Reg32(d), src) if src.is_memory() => {
                self.emit_byte(opcodes.reg_rm);
                self.emit_mem_operand(src, d.code())
            }
            (dst, Operand::Reg32(s)) if dst.is_memory() => {
                self.emit_byte(opcodes.rm_reg);
                self.emit_mem_operand(dst, s.code())
            }
            (dst, Operand::Imm32(value)) if dst.is_memory() => {
                let short = fits_imm8(*value);
                self.emit_byte(if short { ALU_IMM8_RM } else { opcodes.imm_general });
                self.emit_mem_operand(dst, opcodes.ext)?;
                self.emit_alu_immediate(*value, short);
                Ok(())
            }
            (Operand::Reg32(d), Operand::Imm32(value)) => {
                let short = fits_imm8(*value);
                self.emit_byte(if short { ALU_IMM8_RM } else { opcodes.imm_general });
                self.emit_byte(modrm(0b11, opcodes.ext, d.code()));
                self.emit_alu_immediate(*value, short);
                Ok(())
            }
            _ => Err(self.unsupported_mode(op.mnemonic())),
        }
    }

    fn emit_alu_immediate(&mut self, value: u32, short: bool) {
        if short {
            self.emit_byte(value as u8);
        } else {
            self.emit_dword(value);
        }
    }

    pub fn encode_imul(&mut self, dst: &Operand, src: &Operand) -> Result<(), AssemblyError> {
        match (dst, src) {
            // 0F AF /r with reg = destination, unlike the one-byte ALU forms.
            (Operand::Reg32(d), Operand::Reg32(s)) => {
                self.emit_byte(TWO_BYTE_PREFIX);
                self.emit_byte(IMUL_REG_RM);
                self.emit_byte(modrm(0b11, d.code(), s.code()));
                Ok(())
            }
            _ => Err(self.unsupported_mode("IMUL")),
        }
    }

    pub fn encode_inc(&mut self, operand: &Operand) -> Result<(), AssemblyError> {
        match operand {
            Operand::Reg32(r) => {
                self.emit_byte(INC_REG_BASE + r.code());
                Ok(())
            }
            _ => Err(self.unsupported_mode("INC")),
        }
    }

    pub fn encode_dec(&mut self, operand: &Operand) -> Result<(), AssemblyError> {
        match operand {
            Operand::Reg32(r) => {
                self.emit_byte(DEC_REG_BASE + r.code());
                Ok(())
            }
            _ => Err(self.unsupported_mode("DEC")),
        }
    }

    /// MUL/DIV/IDIV: F7 with the extension in the reg field. The operand
    /// shape is validated before any byte is written, so a bad operand
    /// leaves the buffer untouched.
    pub fn encode_group3(
        &mut self,
        mnemonic: &str,
        ext: u8,
        operand: &Operand,
    ) -> Result<(), AssemblyError> {
        match operand {
            Operand::Reg32(r) => {
                self.emit_byte(GROUP3_RM);
                self.emit_byte(modrm(0b11, ext, r.code()));
                Ok(())
            }
            Operand::MemAbs(_) => {
                self.emit_byte(GROUP3_RM);
                self.emit_mem_operand(operand, ext)
            }
            _ => Err(self.unsupported_mode(mnemonic)),
        }
    }

    pub fn encode_test(&mut self, dst: &Operand, src: &Operand) -> Result<(), AssemblyError> {
        match (dst, src) {
            (Operand::Reg32(d), Operand::Reg32(s)) => {
                self.emit_byte(TEST_RM_REG);
                self.emit_byte(modrm(0b11, s.code(), d.code()));
                Ok(())
            }
            _ => Err(self.unsupported_mode("TEST")),
        }
    }
}
