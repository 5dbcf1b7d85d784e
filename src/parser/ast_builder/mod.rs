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

pub mod operand_builders;

use crate::ast::{AluOp, Condition, Directive, Instruction, Operand};
use crate::errors::AssemblyError;
use crate::parser::Rule;
use operand_builders::build_operand;
use pest::iterators::{Pair, Pairs};

pub struct AstBuilder<'a> {
    line_number: usize,
    pairs: Pairs<'a, Rule>,
}

impl<'a> AstBuilder<'a> {
    pub fn new(line_number: usize, pair: Pair<'a, Rule>) -> Self {
        Self {
            line_number,
            pairs: pair.into_inner(),
        }
    }

    // --- data definitions ---

    /// `NAME DD v1, v2, …` / `NAME DB v`: yields the defining label plus the
    /// directive carrying the raw value tokens.
    pub fn build_data_def(mut self) -> Result<(String, Directive), AssemblyError> {
        let label = self
            .pairs
            .next()
            .expect("data definition starts with its label")
            .as_str()
            .to_string();
        let keyword = self
            .pairs
            .next()
            .expect("data definition carries DD or DB")
            .as_str();
        let values: Vec<String> = match self.pairs.next() {
            Some(list) => list
                .into_inner()
                .map(|value| value.as_str().trim().to_string())
                .filter(|value| !value.is_empty())
                .collect(),
            None => Vec::new(),
        };

        let directive = match keyword {
            "DD" => Directive::DefineDwords(values),
            "DB" => Directive::DefineByte(values.into_iter().next()),
            _ => unreachable!("unknown data keyword: {}", keyword),
        };
        Ok((label, directive))
    }

    // --- instructions ---

    pub fn build_instruction(mut self) -> Result<Instruction, AssemblyError> {
        let mnemonic = self
            .pairs
            .next()
            .expect("instruction starts with its mnemonic")
            .as_str()
            .to_string();
        let operands = match self.pairs.next() {
            Some(list) => list
                .into_inner()
                .map(|operand| build_operand(self.line_number, operand))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        self.dispatch(&mnemonic, operands)
    }

    fn dispatch(
        &self,
        mnemonic: &str,
        operands: Vec<Operand>,
    ) -> Result<Instruction, AssemblyError> {
        match mnemonic {
            "MOV" => {
                let (dst, src) = self.two_operands(mnemonic, operands)?;
                Ok(Instruction::Mov(dst, src))
            }
            "ADD" => self.build_alu(AluOp::Add, operands),
            "SUB" => self.build_alu(AluOp::Sub, operands),
            "CMP" => self.build_alu(AluOp::Cmp, operands),
            "XOR" => self.build_alu(AluOp::Xor, operands),
            "AND" => self.build_alu(AluOp::And, operands),
            "OR" => self.build_alu(AluOp::Or, operands),
            "IMUL" => {
                let (dst, src) = self.two_operands(mnemonic, operands)?;
                Ok(Instruction::Imul(dst, src))
            }
            "TEST" => {
                let (dst, src) = self.two_operands(mnemonic, operands)?;
                Ok(Instruction::Test(dst, src))
            }
            "XCHG" => {
                let (dst, src) = self.two_operands(mnemonic, operands)?;
                Ok(Instruction::Xchg(dst, src))
            }
            "MOVZX" => {
                let (dst, src) = self.two_operands(mnemonic, operands)?;
                Ok(Instruction::Movzx(dst, src))
            }
            "LEA" => {
                let (dst, src) = self.two_operands(mnemonic, operands)?;
                Ok(Instruction::Lea(dst, src))
            }
            "INC" => Ok(Instruction::Inc(self.one_operand(mnemonic, operands)?)),
            "DEC" => Ok(Instruction::Dec(self.one_operand(mnemonic, operands)?)),
            "MUL" => Ok(Instruction::Mul(self.one_operand(mnemonic, operands)?)),
            "DIV" => Ok(Instruction::Div(self.one_operand(mnemonic, operands)?)),
            "IDIV" => Ok(Instruction::Idiv(self.one_operand(mnemonic, operands)?)),
            "PUSH" => Ok(Instruction::Push(self.one_operand(mnemonic, operands)?)),
            "POP" => Ok(Instruction::Pop(self.one_operand(mnemonic, operands)?)),
            "INT" => Ok(Instruction::Int(self.one_operand(mnemonic, operands)?)),
            "CALL" => Ok(Instruction::Call(self.branch_target(mnemonic, operands)?)),
            "LOOP" => Ok(Instruction::Loop(self.branch_target(mnemonic, operands)?)),
            "JMP" => Ok(Instruction::Jmp(self.branch_target(mnemonic, operands)?)),
            "JE" | "JZ" => self.build_jcc(Condition::E, mnemonic, operands),
            "JNE" | "JNZ" => self.build_jcc(Condition::Ne, mnemonic, operands),
            "JL" => self.build_jcc(Condition::L, mnemonic, operands),
            "JLE" => self.build_jcc(Condition::Le, mnemonic, operands),
            "JG" => self.build_jcc(Condition::G, mnemonic, operands),
            "JGE" => self.build_jcc(Condition::Ge, mnemonic, operands),
            "JA" => self.build_jcc(Condition::A, mnemonic, operands),
            "JAE" => self.build_jcc(Condition::Ae, mnemonic, operands),
            "JB" => self.build_jcc(Condition::B, mnemonic, operands),
            "JBE" => self.build_jcc(Condition::Be, mnemonic, operands),
            "LEAVE" => {
                self.no_operands(mnemonic, &operands)?;
                Ok(Instruction::Leave)
            }
            "RET" => {
                self.no_operands(mnemonic, &operands)?;
                Ok(Instruction::Ret)
            }
            "NOP" => {
                self.no_operands(mnemonic, &operands)?;
                Ok(Instruction::Nop)
            }
            _ => Err(AssemblyError::SyntaxError {
                line: self.line_number,
                reason: format!("unsupported mnemonic or directive: {}", mnemonic),
            }),
        }
    }

    fn build_alu(&self, op: AluOp, operands: Vec<Operand>) -> Result<Instruction, AssemblyError> {
        let (dst, src) = self.two_operands(op.mnemonic(), operands)?;
        Ok(Instruction::Alu(op, dst, src))
    }

    fn build_jcc(
        &self,
        condition: Condition,
        mnemonic: &str,
        operands: Vec<Operand>,
    ) -> Result<Instruction, AssemblyError> {
        Ok(Instruction::Jcc(
            condition,
            self.branch_target(mnemonic, operands)?,
        ))
    }

    // --- operand count and shape checks ---

    fn two_operands(
        &self,
        mnemonic: &str,
        operands: Vec<Operand>,
    ) -> Result<(Operand, Operand), AssemblyError> {
        if operands.len() != 2 {
            return Err(AssemblyError::SyntaxError {
                line: self.line_number,
                reason: format!("expected 2 operands for {}", mnemonic),
            });
        }
        let mut operands = operands.into_iter();
        Ok((operands.next().unwrap(), operands.next().unwrap()))
    }

    fn one_operand(
        &self,
        mnemonic: &str,
        operands: Vec<Operand>,
    ) -> Result<Operand, AssemblyError> {
        if operands.len() != 1 {
            return Err(AssemblyError::SyntaxError {
                line: self.line_number,
                reason: format!("expected 1 operand for {}", mnemonic),
            });
        }
        Ok(operands.into_iter().next().unwrap())
    }

    fn no_operands(&self, mnemonic: &str, operands: &[Operand]) -> Result<(), AssemblyError> {
        if operands.is_empty() {
            Ok(())
        } else {
            Err(AssemblyError::SyntaxError {
                line: self.line_number,
                reason: format!("{} takes no operands", mnemonic),
            })
        }
    }

    fn branch_target(
        &self,
        mnemonic: &str,
        operands: Vec<Operand>,
    ) -> Result<String, AssemblyError> {
        match self.one_operand(mnemonic, operands)? {
            Operand::Label(name) => Ok(name),
            _ => Err(AssemblyError::UnsupportedMode {
                line: self.line_number,
                reason: format!("the target of {} must be a label", mnemonic),
            }),
        }
    }
}
