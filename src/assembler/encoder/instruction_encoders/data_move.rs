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
use crate::assembler::encoder::utility_functions::modrm;
use crate::assembler::symbol_table::RefKind;
use crate::ast::{Operand, Register32};
use crate::errors::AssemblyError;

impl<'a> Encoder<'a> {
    /// MOV. First matching shape wins; the accumulator store to a plain
    /// label takes its dedicated A3 form ahead of the general r/m path.
    pub fn encode_mov(&mut self, dst: &Operand, src: &Operand) -> Result<(), AssemblyError> {
        match (dst, src) {
            (Operand::Reg32(d), Operand::Reg32(s)) => {
                self.emit_byte(MOV_RM_REG);
                self.emit_byte(modrm(0b11, s.code(), d.code()));
                Ok(())
            }
            (Operand::Reg32(d), Operand::Imm32(value)) => {
                self.emit_byte(MOV_REG_IMM_BASE + d.code());
                self.emit_dword(*value);
                Ok(())
            }
            (Operand::MemAbs(label), Operand::Reg32(Register32::Eax)) => {
                self.emit_byte(MOV_MOFFS_EAX);
                self.record_reference(label, 4, RefKind::Absolute);
                self.emit_dword(0);
                Ok(())
            }
            (dst, Operand::Reg32(s)) if dst.is_memory() => {
                self.emit_byte(MOV_RM_REG);
                self.emit_mem_operand(dst, s.code())
            }
            (Operand::Reg32(d), src) if src.is_memory() => {
                self.emit_byte(MOV_REG_RM);
                self.emit_mem_operand(src, d.code())
            }
            (dst, Operand::Imm32(value)) if dst.is_memory() => {
                self.emit_byte(MOV_MEM_IMM);
                self.emit_mem_operand(dst, 0b000)?;
                self.emit_dword(*value);
                Ok(())
            }
            _ => Err(self.unsupported_mode("MOV")),
        }
    }

    /// MOVZX widens an 8-bit source (register or memory byte) into r32.
    pub fn encode_movzx(&mut self, dst: &Operand, src: &Operand) -> Result<(), AssemblyError> {
        match (dst, src) {
            (Operand::Reg32(d), Operand::Reg8(s)) => {
                self.emit_byte(TWO_BYTE_PREFIX);
                self.emit_byte(MOVZX_RM8);
                self.emit_byte(modrm(0b11, d.code(), s.code()));
                Ok(())
            }
            (Operand::Reg32(d), src) if src.is_memory() => {
                self.emit_byte(TWO_BYTE_PREFIX);
                self.emit_byte(MOVZX_RM8);
                self.emit_mem_operand(src, d.code())
            }
            _ => Err(self.unsupported_mode("MOVZX")),
        }
    }

    pub fn encode_xchg(&mut self, dst: &Operand, src: &Operand) -> Result<(), AssemblyError> {
        match (dst, src) {
            (Operand::Reg32(d), Operand::Reg32(s)) => {
                self.emit_byte(XCHG_RM_REG);
                self.emit_byte(modrm(0b11, s.code(), d.code()));
                Ok(())
            }
            _ => Err(self.unsupported_mode("XCHG")),
        }
    }

    pub fn encode_lea(&mut self, dst: &Operand, src: &Operand) -> Result<(), AssemblyError> {
        match (dst, src) {
            (Operand::Reg32(d), src) if src.is_memory() => {
                self.emit_byte(LEA_REG_MEM);
                self.emit_mem_operand(src, d.code())
            }
            _ => Err(self.unsupported_mode("LEA")),
        }
    }
}
