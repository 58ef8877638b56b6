// aligncheck - Soft-core MMIO and UART Validation Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! SystemVerilog memory initialization for a flat firmware image, so the
//! probe binary can be preloaded into the block RAM of an RTL simulation.
//!
//! Each output line assigns one `mem_width`-bit word, built from the image
//! bytes in little-endian order:
//!
//! ```text
//! mock_mem.block_ram_inst.memory['h0001] = 32'h00A50533; // 0x4: add a0,a0,a0
//! ```

use regex::Regex;
use std::collections::BTreeMap;

pub const DEFAULT_MEMORY_NAME: &str = "mock_mem";
pub const DEFAULT_MEM_WIDTH: u32 = 8;

/// `addr: opcode-bytes  instruction`, as printed by `objdump -d`.
const LISTING_LINE: &str = r"^\s*([0-9a-fA-F]+):\s+([0-9a-fA-F ]+)\s+(.+)$";

#[derive(Debug, thiserror::Error)]
pub enum SvMemError {
    #[error("memory width ({0}) must be a non-zero multiple of 8")]
    InvalidWidth(u32),
    #[error("Invalid listing pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Instruction text keyed by byte address.
pub type Disassembly = BTreeMap<u64, String>;

/// Collects the instruction lines of a disassembly listing. Headers, labels
/// and blank lines are skipped; a repeated address keeps the last entry.
pub fn parse_disassembly(listing: &str) -> Result<Disassembly, SvMemError> {
    let line_re = Regex::new(LISTING_LINE)?;
    let mut instrs = Disassembly::new();
    for line in listing.lines() {
        let Some(caps) = line_re.captures(line) else {
            continue;
        };
        let Ok(addr) = u64::from_str_radix(&caps[1], 16) else {
            tracing::debug!("Skipping listing line with oversized address: {}", line);
            continue;
        };
        instrs.insert(addr, caps[3].trim().to_string());
    }
    Ok(instrs)
}

/// Renders `image` as one assignment per `mem_width`-bit word of
/// `memory_name`. A trailing partial word is zero-padded.
pub fn render(
    image: &[u8],
    disassembly: &Disassembly,
    memory_name: &str,
    mem_width: u32,
) -> Result<String, SvMemError> {
    if mem_width == 0 || mem_width % 8 != 0 {
        return Err(SvMemError::InvalidWidth(mem_width));
    }
    let word_bytes = (mem_width / 8) as usize;

    let mut out = String::new();
    for (index, chunk) in image.chunks(word_bytes).enumerate() {
        let addr = (index * word_bytes) as u64;
        let mut word = chunk.to_vec();
        if word.len() < word_bytes {
            tracing::warn!(
                "Incomplete memory word at address 0x{:X}, padding with zeros",
                addr
            );
            word.resize(word_bytes, 0);
        }
        // Most significant byte first for the hex literal.
        word.reverse();

        out.push_str(&format!(
            "{}.block_ram_inst.memory['h{:04X}] = {}'h{};",
            memory_name,
            index,
            mem_width,
            hex::encode_upper(&word)
        ));

        let comments: Vec<String> = disassembly
            .range(addr..addr + word_bytes as u64)
            .map(|(at, instr)| format!("0x{:X}: {}", at, instr))
            .collect();
        if !comments.is_empty() {
            out.push_str(" // ");
            out.push_str(&comments.join(" ; "));
        }
        out.push('\n');
    }
    Ok(out)
}
