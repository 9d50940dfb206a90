//! Splitting the interleaved codeword stream into Reed-Solomon blocks and back.
//!
//! A symbol's codewords are divided into `num_blocks` blocks that share one ECC
//! length. When the data does not split evenly, the first blocks ("short") hold
//! one data codeword fewer than the rest. The stream carries data codewords
//! round-robin across blocks, then ECC codewords round-robin.

use crate::decoder::tables::{ec_block_info, total_codewords};
use crate::error::{DecodeError, Result};
use crate::models::{ECLevel, Version};

/// One Reed-Solomon block: `[data | ecc]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub codewords: Vec<u8>,
    pub num_data: usize,
}

impl Block {
    /// Data portion
    pub fn data(&self) -> &[u8] {
        &self.codewords[..self.num_data]
    }

    /// ECC portion
    pub fn ecc(&self) -> &[u8] {
        &self.codewords[self.num_data..]
    }
}

/// Block geometry for a version/level pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub num_blocks: usize,
    pub ecc_per_block: usize,
    pub num_short_blocks: usize,
    pub short_block_len: usize,
    pub total_codewords: usize,
}

impl BlockLayout {
    pub fn new(version: Version, ec_level: ECLevel) -> Self {
        let info = ec_block_info(version, ec_level);
        let total = total_codewords(version);
        let num_short_blocks = info.num_blocks - total % info.num_blocks;
        Self {
            num_blocks: info.num_blocks,
            ecc_per_block: info.ecc_per_block,
            num_short_blocks,
            short_block_len: total / info.num_blocks,
            total_codewords: total,
        }
    }

    /// Data codewords held by block `i`
    pub fn data_len(&self, i: usize) -> usize {
        let short_data = self.short_block_len - self.ecc_per_block;
        if i < self.num_short_blocks {
            short_data
        } else {
            short_data + 1
        }
    }

    /// Data codewords across all blocks
    pub fn total_data(&self) -> usize {
        self.total_codewords - self.num_blocks * self.ecc_per_block
    }
}

/// Split the raw codeword stream into blocks
pub fn deinterleave(codewords: &[u8], version: Version, ec_level: ECLevel) -> Result<Vec<Block>> {
    let layout = BlockLayout::new(version, ec_level);
    if codewords.len() != layout.total_codewords {
        return Err(DecodeError::CodewordCountMismatch {
            expected: layout.total_codewords,
            actual: codewords.len(),
        });
    }

    let mut blocks: Vec<Block> = (0..layout.num_blocks)
        .map(|i| Block {
            codewords: Vec::with_capacity(layout.data_len(i) + layout.ecc_per_block),
            num_data: layout.data_len(i),
        })
        .collect();

    let mut stream = codewords.iter().copied();
    let max_data = layout.data_len(layout.num_blocks - 1);
    for round in 0..max_data {
        for block in blocks.iter_mut() {
            if round < block.num_data {
                // Length was checked against the layout above
                if let Some(byte) = stream.next() {
                    block.codewords.push(byte);
                }
            }
        }
    }
    for _ in 0..layout.ecc_per_block {
        for block in blocks.iter_mut() {
            if let Some(byte) = stream.next() {
                block.codewords.push(byte);
            }
        }
    }

    Ok(blocks)
}

/// Merge blocks back into transmission order
pub fn interleave(blocks: &[Block]) -> Vec<u8> {
    let mut out = Vec::with_capacity(blocks.iter().map(|b| b.codewords.len()).sum());
    let max_data = blocks.iter().map(|b| b.num_data).max().unwrap_or(0);
    for round in 0..max_data {
        for block in blocks {
            if round < block.num_data {
                out.push(block.codewords[round]);
            }
        }
    }
    let max_ecc = blocks.iter().map(|b| b.ecc().len()).max().unwrap_or(0);
    for round in 0..max_ecc {
        for block in blocks {
            if let Some(&byte) = block.ecc().get(round) {
                out.push(byte);
            }
        }
    }
    out
}
