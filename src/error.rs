//! # 错误类型模块
//!
//! 核心算法 (`StegoError`) 与 BMP 容器 (`BmpError`) 各自的错误类型。
//! 命令层再通过 `anyhow` 为它们附加上下文。

use thiserror::Error;

/// 嵌入或提取载荷时可能出现的错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StegoError {
    /// 载荷 (含 32 bit 长度前缀) 所需的像素数超过了图像的像素数。
    #[error("Not enough space in the image: {required} bits required, {available} pixels available")]
    Capacity { required: usize, available: usize },

    /// 载荷长度无法用 `u32` 表示。
    #[error("Payload of {0} bytes is too large, the length prefix holds at most u32::MAX bytes")]
    PayloadTooLarge(usize),

    /// 调色板中不存在任何奇偶性为 `bit` 的颜色。
    #[error("No palette entry with parity {bit} exists to replace index {index}")]
    ParityUnavailable { index: u8, bit: u8 },

    /// 读取位置超出了像素流或比特流的末尾。
    #[error("Hidden data is truncated: {required} bits required, {available} available")]
    Truncated { required: usize, available: usize },
}

/// 解析或构造 8 位调色板 BMP 时可能出现的错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BmpError {
    #[error("Not a BMP file (missing 'BM' signature)")]
    BadSignature,

    #[error("BMP data is truncated: {needed} bytes needed, {actual} present")]
    Truncated { needed: usize, actual: usize },

    #[error("Unsupported info header size {0}")]
    UnsupportedHeader(u32),

    #[error("Not an 8-bit palette BMP (bit depth {0})")]
    UnsupportedBitDepth(u16),

    #[error("Compressed BMP pixel data is not supported (compression {0})")]
    Compressed(u32),

    #[error("Palette must contain 256 entries, found {0}")]
    IncompletePalette(u32),

    #[error("Pixel data at offset {pixel_offset} overlaps the headers or colour table ending at {palette_end}")]
    OverlappingPixels { pixel_offset: u32, palette_end: usize },

    #[error("Image dimensions {width}x{height} are too large for an 8-bit BMP")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Pixel buffer of {actual} bytes does not match {width}x{height} (expected {expected})")]
    DimensionMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
