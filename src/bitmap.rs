//! # BMP 容器模块
//!
//! 读取和写回 8 位调色板 BMP。文件的所有字节 (文件头、信息头、颜色表、
//! 空隙) 都原样保留，只有像素数据块可以被修改。
//!
//! 布局 (所有多字节字段均为小端序)：
//!
//! ```text
//! [14 bytes ] 文件头：'BM'、文件大小、保留字段、像素数据偏移
//! [biSize   ] 信息头：宽、高、位深 (必须为 8)、压缩方式、像素数据大小 ...
//! [256 * 4  ] 颜色表：蓝、绿、红、保留
//! [...      ] 像素数据：每个字节是一个调色板索引，每行补齐到 4 字节
//! ```

use crate::constants::{
    BMP_FILE_HEADER_SIZE, BMP_INFO_HEADER_SIZE, BMP_PALETTE_ENTRY_SIZE, PALETTE_SIZE,
};
use crate::error::BmpError;
use crate::palette::Palette;

const SIGNATURE: &[u8; 2] = b"BM";
const BI_RGB: u32 = 0;

fn u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn i32_le(bytes: &[u8], offset: usize) -> i32 {
    u32_le(bytes, offset) as i32
}

fn ensure_len(bytes: &[u8], needed: usize) -> Result<(), BmpError> {
    if bytes.len() < needed {
        return Err(BmpError::Truncated {
            needed,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// 8 位 BMP 每行占用的字节数 (补齐到 4 字节)。
pub fn row_stride(width: u32) -> usize {
    (width as usize).div_ceil(4) * 4
}

/// 像素数据块的字节数 (含行补齐)，溢出时返回 `None`。
fn pixel_block_size(width: u32, height: u32) -> Option<usize> {
    row_stride(width).checked_mul(height as usize)
}

/// 从文件头与信息头中解析出的字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapHeader {
    pub file_size: u32,
    pub pixel_offset: u32,
    pub info_size: u32,
    pub width: i32,
    /// 正数表示自下而上存储，负数表示自上而下。
    pub height: i32,
    pub bit_count: u16,
    pub compression: u32,
    /// 像素数据块的字节数 (`biSizeImage` 为 0 时由尺寸推算)。
    pub image_size: u32,
    pub colors_used: u32,
}

/// 一个已加载的 8 位调色板 BMP。
#[derive(Debug, Clone)]
pub struct Bitmap {
    raw: Vec<u8>,
    header: BitmapHeader,
    palette: Palette,
}

impl Bitmap {
    /// 解析 BMP 文件内容。
    ///
    /// # Errors
    ///
    /// 文件不是未压缩的 8 位调色板 BMP，或者任何数据块超出文件末尾时返回 [`BmpError`]。
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self, BmpError> {
        ensure_len(&raw, BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE)?;

        if &raw[0..2] != SIGNATURE {
            return Err(BmpError::BadSignature);
        }

        let info_size = u32_le(&raw, 14);
        if (info_size as usize) < BMP_INFO_HEADER_SIZE {
            return Err(BmpError::UnsupportedHeader(info_size));
        }

        let bit_count = u16_le(&raw, 28);
        if bit_count != 8 {
            return Err(BmpError::UnsupportedBitDepth(bit_count));
        }

        let compression = u32_le(&raw, 30);
        if compression != BI_RGB {
            return Err(BmpError::Compressed(compression));
        }

        let colors_used = u32_le(&raw, 46);
        if colors_used != 0 && (colors_used as usize) < PALETTE_SIZE {
            return Err(BmpError::IncompletePalette(colors_used));
        }

        let width = i32_le(&raw, 18);
        let height = i32_le(&raw, 22);
        let image_size = match u32_le(&raw, 34) {
            0 => pixel_block_size(width.unsigned_abs(), height.unsigned_abs())
                .and_then(|size| u32::try_from(size).ok())
                .ok_or(BmpError::ImageTooLarge {
                    width: width.unsigned_abs(),
                    height: height.unsigned_abs(),
                })?,
            size => size,
        };

        let palette_offset = BMP_FILE_HEADER_SIZE + info_size as usize;
        let palette_end = palette_offset + PALETTE_SIZE * BMP_PALETTE_ENTRY_SIZE;
        ensure_len(&raw, palette_end)?;
        let palette = Palette::from_bgra_table(&raw[palette_offset..palette_end]).ok_or(
            BmpError::Truncated {
                needed: palette_end,
                actual: raw.len(),
            },
        )?;

        // 像素块必须位于颜色表之后，否则嵌入会改写调色板
        let pixel_offset = u32_le(&raw, 10);
        if (pixel_offset as usize) < palette_end {
            return Err(BmpError::OverlappingPixels {
                pixel_offset,
                palette_end,
            });
        }
        ensure_len(&raw, pixel_offset as usize + image_size as usize)?;

        let header = BitmapHeader {
            file_size: u32_le(&raw, 2),
            pixel_offset,
            info_size,
            width,
            height,
            bit_count,
            compression,
            image_size,
            colors_used,
        };

        Ok(Self {
            raw,
            header,
            palette,
        })
    }

    /// 用给定的调色板与像素数据合成一个最小的自下而上 8 位 BMP。
    ///
    /// `pixels` 必须正好是 `row_stride(width) * height` 字节 (含行补齐)。
    pub fn new(width: u32, height: u32, palette: &Palette, pixels: &[u8]) -> Result<Self, BmpError> {
        let too_large = BmpError::ImageTooLarge { width, height };
        let (Ok(signed_width), Ok(signed_height)) = (i32::try_from(width), i32::try_from(height))
        else {
            return Err(too_large);
        };

        let expected = pixel_block_size(width, height).ok_or(too_large.clone())?;
        if pixels.len() != expected {
            return Err(BmpError::DimensionMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        let pixel_offset =
            BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE + PALETTE_SIZE * BMP_PALETTE_ENTRY_SIZE;
        let file_size = u32::try_from(pixel_offset + pixels.len()).map_err(|_| too_large)?;

        let mut raw = Vec::with_capacity(file_size as usize);
        raw.extend_from_slice(SIGNATURE);
        raw.extend_from_slice(&file_size.to_le_bytes());
        raw.extend_from_slice(&[0; 4]);
        raw.extend_from_slice(&(pixel_offset as u32).to_le_bytes());

        raw.extend_from_slice(&(BMP_INFO_HEADER_SIZE as u32).to_le_bytes());
        raw.extend_from_slice(&signed_width.to_le_bytes());
        raw.extend_from_slice(&signed_height.to_le_bytes());
        raw.extend_from_slice(&1u16.to_le_bytes());
        raw.extend_from_slice(&8u16.to_le_bytes());
        raw.extend_from_slice(&BI_RGB.to_le_bytes());
        raw.extend_from_slice(&(pixels.len() as u32).to_le_bytes());
        // 2835 像素/米 ≈ 72 DPI
        raw.extend_from_slice(&2835i32.to_le_bytes());
        raw.extend_from_slice(&2835i32.to_le_bytes());
        raw.extend_from_slice(&(PALETTE_SIZE as u32).to_le_bytes());
        raw.extend_from_slice(&0u32.to_le_bytes());

        raw.extend_from_slice(&palette.to_bgra_table());
        raw.extend_from_slice(pixels);

        Self::from_bytes(raw)
    }

    pub fn header(&self) -> &BitmapHeader {
        &self.header
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn pixel_range(&self) -> std::ops::Range<usize> {
        let start = self.header.pixel_offset as usize;
        start..start + self.header.image_size as usize
    }

    /// 像素数据块：每个字节是一个调色板索引。
    pub fn pixels(&self) -> &[u8] {
        &self.raw[self.pixel_range()]
    }

    /// 同时借出调色板 (只读) 与像素数据 (可写)，供嵌入使用。
    pub fn palette_and_pixels_mut(&mut self) -> (&Palette, &mut [u8]) {
        let range = self.pixel_range();
        (&self.palette, &mut self.raw[range])
    }

    /// 完整的文件内容，可直接写入磁盘。
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }
}
