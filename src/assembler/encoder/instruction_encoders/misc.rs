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
use crate::assembler::encoder::constants::INT_OPCODE;
use crate::ast::Operand;
use crate::errors::AssemblyError;

impl<'a> Encoder<'a> {
    pub fn encode_int(&mut self, operand: &Operand) -> Result<(), AssemblyError> {
        match operand {
            Operand::Imm32(value) if *value <= 0xFF => {
                self.emit_byte(INT_OPCODE);
                self.emit_byte(*value as u8);
                Ok(())
            }
            Operand::Imm32(value) => Err(AssemblyError::RangeError {
                line: self.line_num,
                reason: format!("INT vector out of range (0-255): {}", value),
            }),
            _ => Err(self.unsupported_mode("INT")),
        }
    }
}
