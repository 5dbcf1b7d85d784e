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

use crate::ast::{Operand, REG8_NAMES, REG32_NAMES, Register8, Register32};
use crate::errors::AssemblyError;
use crate::parser::Rule;
use pest::iterators::Pair;

// Helper to build an Operand from a pest pair.
pub fn build_operand(line: usize, pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    let inner_pair = pair
        .into_inner()
        .next()
        .expect("operand rule holds one alternative");
    match inner_pair.as_rule() {
        Rule::memory => build_memory(line, inner_pair),
        Rule::reg32 => Ok(Operand::Reg32(
            Register32::from_name(inner_pair.as_str())
                .expect("grammar only matches known 32-bit registers"),
        )),
        Rule::reg8 => Ok(Operand::Reg8(
            Register8::from_name(inner_pair.as_str())
                .expect("grammar only matches known 8-bit registers"),
        )),
        Rule::immediate => build_immediate(line, inner_pair),
        Rule::ident => Ok(Operand::Label(inner_pair.as_str().to_string())),
        _ => unreachable!("unknown operand rule: {:?}", inner_pair.as_rule()),
    }
}

fn build_immediate(line: usize, pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    let token = pair.as_str();
    let value = parse_immediate(token).ok_or_else(|| AssemblyError::SyntaxError {
        line,
        reason: format!("invalid immediate value: {}", token),
    })?;
    Ok(Operand::Imm32(value))
}

/// Computes the 32-bit value of an immediate token: a single character
/// between apostrophes, `…H` hex, `0X…` hex, or decimal. Negative decimals
/// wrap to their two's-complement representation; a token that does not fit
/// in 32 bits is rejected rather than silently truncated. The whole token
/// must be consumed.
pub fn parse_immediate(token: &str) -> Option<u32> {
    let bytes = token.as_bytes();
    if bytes.len() == 3 && bytes[0] == b'\'' && bytes[2] == b'\'' {
        return Some(u32::from(bytes[1]));
    }
    if let Some(hex) = token.strip_suffix('H') {
        return u32::from_str_radix(hex, 16).ok();
    }
    if let Some(hex) = token.strip_prefix("0X") {
        return u32::from_str_radix(hex, 16).ok();
    }
    if let Some(magnitude) = token.strip_prefix('-') {
        let magnitude: u32 = magnitude.parse().ok()?;
        let value = -i64::from(magnitude);
        if value < i64::from(i32::MIN) {
            return None;
        }
        return Some(value as i32 as u32);
    }
    token.parse::<u32>().ok()
}

fn build_memory(line: usize, pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    for inner in pair.into_inner() {
        match inner.as_rule() {
            // The size hint carries no encoding information in this subset.
            Rule::byte_hint => continue,
            Rule::mem_sib => return build_mem_sib(inner),
            Rule::mem_base => return build_mem_base(line, inner),
            Rule::mem_abs => return build_mem_abs(line, inner),
            _ => unreachable!("unknown memory sub-rule: {:?}", inner.as_rule()),
        }
    }
    unreachable!("memory rule always holds a sub-form")
}

fn build_mem_sib(pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    let mut inner = pair.into_inner();
    let label = inner
        .next()
        .expect("scaled-index form starts with its label")
        .as_str()
        .to_string();

    let mut disp8 = 0u8;
    for part in inner {
        if part.as_rule() == Rule::sib_disp {
            let tail = part
                .into_inner()
                .next()
                .expect("sib_disp wraps its tail")
                .as_str();
            // An unparseable tail leaves the displacement at zero.
            disp8 = tail.trim().parse::<i8>().map(|d| d as u8).unwrap_or(0);
        }
    }

    Ok(Operand::MemSib { label, disp8 })
}

fn build_mem_base(line: usize, pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    let mut disp: i64 = 0;
    for part in pair.into_inner() {
        if part.as_rule() == Rule::ebp_disp {
            let mut inner = part.into_inner();
            let sign = inner
                .next()
                .expect("displacement starts with its sign")
                .as_str();
            let digits = inner
                .next()
                .expect("displacement carries its digits")
                .as_str();
            let magnitude: i64 = digits.parse().map_err(|_| AssemblyError::RangeError {
                line,
                reason: format!("base displacement out of range: {}{}", sign, digits),
            })?;
            disp = if sign == "-" { -magnitude } else { magnitude };
        }
    }

    if disp < i64::from(i32::MIN) || disp > i64::from(i32::MAX) {
        return Err(AssemblyError::RangeError {
            line,
            reason: format!("base displacement out of range: {}", disp),
        });
    }

    Ok(Operand::MemBase {
        base: Register32::Ebp,
        disp: disp as i32,
    })
}

fn build_mem_abs(line: usize, pair: Pair<Rule>) -> Result<Operand, AssemblyError> {
    let label = pair
        .into_inner()
        .next()
        .expect("simple form holds an ident")
        .as_str();

    // A plain bracketed operand must be a bare label; anything that looks
    // like a register inside the brackets is not an addressing form we know.
    let contains_register = REG32_NAMES
        .iter()
        .chain(REG8_NAMES.iter())
        .any(|name| label.contains(name));
    if contains_register {
        return Err(AssemblyError::SyntaxError {
            line,
            reason: format!("memory operand not recognized: [{}]", label),
        });
    }

    Ok(Operand::MemAbs(label.to_string()))
}

// ------------- unit tests -------------
