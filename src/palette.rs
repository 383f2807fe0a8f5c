//! # 调色板与颜色距离模块
//!
//! 定义 256 色调色板、颜色奇偶性，以及按欧氏距离对调色板条目排序的逻辑。

use crate::constants::{BMP_PALETTE_ENTRY_SIZE, PALETTE_SIZE};

/// 调色板中的单个颜色条目。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// BMP 颜色表中每个条目的第 4 个字节，读写时原样保留。
    pub reserved: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            reserved: 0,
        }
    }

    /// 颜色的奇偶位：`(R + G + B) mod 2`。
    ///
    /// 这是每个像素能够携带的唯一 1 bit 信息。
    pub fn parity(&self) -> u8 {
        ((self.red as u16 + self.green as u16 + self.blue as u16) % 2) as u8
    }

    /// 两个颜色在 RGB 空间中的欧氏距离。
    ///
    /// 通道先提升为 `i32` 再相减，避免 `u8` 减法回绕。
    pub fn distance(&self, other: &Color) -> f64 {
        let dr = self.red as i32 - other.red as i32;
        let dg = self.green as i32 - other.green as i32;
        let db = self.blue as i32 - other.blue as i32;
        ((dr * dr + dg * dg + db * db) as f64).sqrt()
    }
}

/// 固定 256 个条目的调色板，在一次运行中不可变。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Color; PALETTE_SIZE],
}

impl Palette {
    pub fn new(colors: [Color; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// 从 BMP 颜色表 (每个条目依次为 蓝、绿、红、保留) 构造调色板。
    ///
    /// `table` 至少需要 `256 * 4` 字节，多余部分被忽略。
    pub fn from_bgra_table(table: &[u8]) -> Option<Self> {
        if table.len() < PALETTE_SIZE * BMP_PALETTE_ENTRY_SIZE {
            return None;
        }

        let mut colors = [Color::default(); PALETTE_SIZE];
        colors
            .iter_mut()
            .zip(table.chunks_exact(BMP_PALETTE_ENTRY_SIZE))
            .for_each(|(color, entry)| {
                *color = Color {
                    blue: entry[0],
                    green: entry[1],
                    red: entry[2],
                    reserved: entry[3],
                };
            });

        Some(Self { colors })
    }

    /// 按 BMP 颜色表的字节布局输出调色板。
    pub fn to_bgra_table(&self) -> Vec<u8> {
        self.colors
            .iter()
            .flat_map(|c| [c.blue, c.green, c.red, c.reserved])
            .collect()
    }

    pub fn color(&self, index: u8) -> Color {
        self.colors[index as usize]
    }

    pub fn colors(&self) -> &[Color; PALETTE_SIZE] {
        &self.colors
    }

    /// 像素值 `index` 所引用颜色的奇偶位。
    pub fn parity(&self, index: u8) -> u8 {
        self.color(index).parity()
    }

    /// 按与 `reference` 的距离从近到远排列全部 256 个条目。
    ///
    /// 距离相同时，索引较小的条目在前。`reference` 本身总在结果中，
    /// 且距离为 0。
    pub fn rank(&self, reference: u8) -> DistanceRanking {
        let origin = self.color(reference);
        let mut entries: Vec<RankedEntry> = (0..=u8::MAX)
            .map(|index| RankedEntry {
                distance: origin.distance(&self.color(index)),
                index,
            })
            .collect();

        // `sort_by` 是稳定排序，相同距离保持 0..=255 的插入顺序
        entries.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        DistanceRanking { entries }
    }
}

/// 排名中的一项：调色板索引及其与参考颜色的距离。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedEntry {
    pub distance: f64,
    pub index: u8,
}

/// 以某个参考颜色为基准、按距离升序排列的调色板索引。
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceRanking {
    entries: Vec<RankedEntry>,
}

impl DistanceRanking {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 排名中第一个奇偶位等于 `bit` 的条目。
    ///
    /// 如果参考颜色自身的奇偶位已经匹配，返回的就是它自己 (距离 0)。
    /// 调色板中完全没有该奇偶性的颜色时返回 `None`。
    pub fn closest_with_parity(&self, palette: &Palette, bit: u8) -> Option<RankedEntry> {
        self.entries
            .iter()
            .find(|entry| palette.parity(entry.index) == bit)
            .copied()
    }
}
