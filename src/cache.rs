//! # 替换缓存模块
//!
//! 记录 (当前调色板索引, 目标奇偶位) 已经求得的替换索引。
//! 调色板在一次运行中不变，因此缓存项永不失效。

use crate::constants::PALETTE_SIZE;

/// 每个源索引、每个奇偶位各一个槽位，共 512 项。
#[derive(Debug, Clone)]
pub struct SubstitutionCache {
    slots: [[Option<u8>; 2]; PALETTE_SIZE],
    hits: usize,
    misses: usize,
}

impl Default for SubstitutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SubstitutionCache {
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; PALETTE_SIZE],
            hits: 0,
            misses: 0,
        }
    }

    /// 查询缓存，同时累计命中/未命中次数。
    ///
    /// `bit` 只取最低位。
    pub fn lookup(&mut self, source: u8, bit: u8) -> Option<u8> {
        let found = self.slots[source as usize][(bit & 1) as usize];
        match found {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        found
    }

    pub fn store(&mut self, source: u8, bit: u8, replacement: u8) {
        self.slots[source as usize][(bit & 1) as usize] = Some(replacement);
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
