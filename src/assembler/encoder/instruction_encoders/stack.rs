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
use crate::ast::Operand;
use crate::errors::AssemblyError;

impl<'a> Encoder<'a> {
    pub fn encode_push(&mut self, operand: &Operand) -> Result<(), AssemblyError> {
        match operand {
            Operand::Reg32(r) => {
                self.emit_byte(PUSH_REG_BASE + r.code());
                Ok(())
            }
            Operand::Imm32(value) => {
                self.emit_byte(PUSH_IMM);
                self.emit_dword(*value);
                Ok(())
            }
            // FF /6 through the base+displacement or plain-label forms; the
            // scaled-index form is not accepted here.
            Operand::MemBase { .. } | Operand::MemAbs(_) => {
                self.emit_byte(PUSH_RM);
                self.emit_mem_operand(operand, PUSH_RM_EXT)
            }
            _ => Err(self.unsupported_mode("PUSH")),
        }
    }

    pub fn encode_pop(&mut self, operand: &Operand) -> Result<(), AssemblyError> {
        match operand {
            Operand::Reg32(r) => {
                self.emit_byte(POP_REG_BASE + r.code());
                Ok(())
            }
            _ => Err(self.unsupported_mode("POP")),
        }
    }
}
