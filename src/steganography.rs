//! # 调色板奇偶隐写核心模块
//!
//! 实现 Fridrich 的调色板隐写方法：每个像素承载 1 bit，
//! 通过把像素改为"与原颜色最接近、且奇偶位等于该 bit"的调色板条目来嵌入。
//!
//! 像素严格按 0, 1, 2, ... 的顺序处理，嵌入与提取必须走相同的顺序。

use crate::cache::SubstitutionCache;
use crate::constants::{BITS_PER_BYTE, LENGTH_PREFIX_BITS};
use crate::error::StegoError;
use crate::framing::{self, bits_to_length, pack_bytes};
use crate::palette::Palette;
use tracing::{debug, trace};

/// 一次嵌入的统计信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmbedReport {
    /// 消耗的比特数，也就是处理过的像素数。
    pub bits_embedded: usize,
    /// 索引实际发生变化的像素数。
    pub pixels_changed: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// 能够容纳的最大载荷字节数 (扣除 32 bit 长度前缀)。
pub fn capacity_bytes(pixel_count: usize) -> usize {
    pixel_count.saturating_sub(LENGTH_PREFIX_BITS) / BITS_PER_BYTE
}

/// 检查 `payload_len` 字节的载荷能否放入 `pixel_count` 个像素。
///
/// # Errors
///
/// 分帧后的比特数超过像素数时返回 [`StegoError::Capacity`]。
pub fn check_capacity(pixel_count: usize, payload_len: usize) -> Result<(), StegoError> {
    let required = framing::framed_bit_len(payload_len);
    if required > pixel_count {
        return Err(StegoError::Capacity {
            required,
            available: pixel_count,
        });
    }
    Ok(())
}

/// 为索引 `source` 选择奇偶位等于 `bit` 的最近调色板条目 (不经过缓存)。
///
/// `source` 自身的奇偶位已经匹配时直接返回 `source`，即使调色板中另有
/// 索引更小的同色条目。
///
/// # Errors
///
/// 调色板中没有任何该奇偶性的颜色时返回 [`StegoError::ParityUnavailable`]。
pub fn select_replacement(palette: &Palette, source: u8, bit: u8) -> Result<u8, StegoError> {
    if palette.parity(source) == bit {
        return Ok(source);
    }

    let ranking = palette.rank(source);
    let chosen = ranking
        .closest_with_parity(palette, bit)
        .ok_or(StegoError::ParityUnavailable { index: source, bit })?;

    trace!(source, bit, chosen = chosen.index, distance = chosen.distance, "resolved replacement");
    Ok(chosen.index)
}

/// 把比特序列逐像素嵌入 `pixels`，原地修改。
///
/// 第 `p` 个像素承载 `bits[p]`；`bits.len()` 之后的像素保持不变。
///
/// # Errors
///
/// * 比特数超过像素数时返回 [`StegoError::Capacity`]，此时不修改任何像素。
/// * 调色板缺少所需奇偶性时返回 [`StegoError::ParityUnavailable`]。
pub fn embed(palette: &Palette, pixels: &mut [u8], bits: &[u8]) -> Result<EmbedReport, StegoError> {
    if bits.len() > pixels.len() {
        return Err(StegoError::Capacity {
            required: bits.len(),
            available: pixels.len(),
        });
    }

    let mut cache = SubstitutionCache::new();
    let mut pixels_changed = 0;

    for (pixel, &bit) in pixels.iter_mut().zip(bits) {
        let source = *pixel;
        let bit = bit & 1;

        let replacement = match cache.lookup(source, bit) {
            Some(index) => index,
            None => {
                let index = select_replacement(palette, source, bit)?;
                cache.store(source, bit, index);
                index
            }
        };

        if replacement != source {
            pixels_changed += 1;
        }
        *pixel = replacement;
    }

    let report = EmbedReport {
        bits_embedded: bits.len(),
        pixels_changed,
        cache_hits: cache.hits(),
        cache_misses: cache.misses(),
    };
    debug!(?report, "embedding finished");

    Ok(report)
}

/// 分帧并嵌入整个载荷。
///
/// # Errors
///
/// 容量不足时在修改任何像素之前返回 [`StegoError::Capacity`]。
pub fn hide(palette: &Palette, pixels: &mut [u8], payload: &[u8]) -> Result<EmbedReport, StegoError> {
    check_capacity(pixels.len(), payload.len())?;
    let bits = framing::frame(payload)?;
    embed(palette, pixels, &bits)
}

/// 读取像素流中 `[start, start + count)` 范围内每个像素的奇偶位。
fn read_parity_bits(
    palette: &Palette,
    pixels: &[u8],
    start: usize,
    count: usize,
) -> Result<Vec<u8>, StegoError> {
    let end = start.checked_add(count).filter(|&end| end <= pixels.len());
    let Some(end) = end else {
        return Err(StegoError::Truncated {
            required: start.saturating_add(count),
            available: pixels.len(),
        });
    };

    Ok(pixels[start..end]
        .iter()
        .map(|&index| palette.parity(index))
        .collect())
}

/// 从前 32 个像素中读出载荷长度。
///
/// 返回 `(长度, 下一个未读像素的位置)`，后者恒为 32。
///
/// # Errors
///
/// 像素少于 32 个时返回 [`StegoError::Truncated`]。
pub fn extract_length(palette: &Palette, pixels: &[u8]) -> Result<(u32, usize), StegoError> {
    let bits = read_parity_bits(palette, pixels, 0, LENGTH_PREFIX_BITS)?;
    Ok((bits_to_length(&bits), LENGTH_PREFIX_BITS))
}

/// 从 `start` 开始读取 `length * 8` 个像素，重新组装出 `length` 个字节。
///
/// 字节内高位在前。提取是只读操作。
///
/// # Errors
///
/// 剩余像素不足时返回 [`StegoError::Truncated`]，通常说明图像中并没有隐藏数据。
pub fn extract_payload(
    palette: &Palette,
    pixels: &[u8],
    length: u32,
    start: usize,
) -> Result<Vec<u8>, StegoError> {
    let count = (length as usize).saturating_mul(BITS_PER_BYTE);
    let bits = read_parity_bits(palette, pixels, start, count)?;
    Ok(pack_bytes(&bits))
}

/// 读出长度前缀并提取完整载荷。
pub fn recover(palette: &Palette, pixels: &[u8]) -> Result<Vec<u8>, StegoError> {
    let (length, start) = extract_length(palette, pixels)?;
    debug!(length, "decoded payload length");
    extract_payload(palette, pixels, length, start)
}
