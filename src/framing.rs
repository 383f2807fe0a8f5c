//! # 载荷分帧模块
//!
//! 把载荷字节展开为比特序列，并在前面加上 32 bit 的长度前缀：
//!
//! ```text
//! [32 bits] 载荷字节数 (u32)，低位在前
//! [8L bits] 载荷字节，每个字节高位在前
//! ```
//!
//! 长度前缀与字节内的位序相反，这是既有隐写图像的格式，必须保持一致。
//! 比特序列中每个元素都是 0 或 1。

use crate::constants::{BITS_PER_BYTE, LENGTH_PREFIX_BITS};
use crate::error::StegoError;

/// 分帧后 `payload_len` 字节载荷所需的比特数 (含长度前缀)。
pub fn framed_bit_len(payload_len: usize) -> usize {
    LENGTH_PREFIX_BITS + payload_len * BITS_PER_BYTE
}

/// 将载荷转换为带长度前缀的比特序列。
///
/// # Errors
///
/// 载荷长度超过 `u32::MAX` 时返回 [`StegoError::PayloadTooLarge`]。
pub fn frame(payload: &[u8]) -> Result<Vec<u8>, StegoError> {
    let len = u32::try_from(payload.len()).map_err(|_| StegoError::PayloadTooLarge(payload.len()))?;

    let mut bits = Vec::with_capacity(framed_bit_len(payload.len()));
    bits.extend(length_to_bits(len));
    bits.extend(payload.iter().flat_map(|&byte| byte_to_bits(byte)));
    Ok(bits)
}

/// [`frame`] 的逆操作。
///
/// 先按低位在前读出 32 bit 长度，再把后续比特每 8 个 (高位在前) 组成一个字节。
/// 长度之后多余的比特被忽略。
///
/// # Errors
///
/// 比特数不足以容纳长度前缀或声明的载荷时返回 [`StegoError::Truncated`]。
pub fn unframe(bits: &[u8]) -> Result<Vec<u8>, StegoError> {
    if bits.len() < LENGTH_PREFIX_BITS {
        return Err(StegoError::Truncated {
            required: LENGTH_PREFIX_BITS,
            available: bits.len(),
        });
    }

    let (prefix, body) = bits.split_at(LENGTH_PREFIX_BITS);
    let len = bits_to_length(prefix) as usize;
    let required = len * BITS_PER_BYTE;
    if body.len() < required {
        return Err(StegoError::Truncated {
            required: LENGTH_PREFIX_BITS + required,
            available: bits.len(),
        });
    }

    Ok(pack_bytes(&body[..required]))
}

/// 长度的 32 个比特，第 `i` 个是长度的第 `i` 位 (低位在前)。
pub fn length_to_bits(len: u32) -> impl Iterator<Item = u8> {
    (0..LENGTH_PREFIX_BITS).map(move |i| ((len >> i) & 1) as u8)
}

/// [`length_to_bits`] 的逆操作。最多读取前 32 个比特。
pub fn bits_to_length(bits: &[u8]) -> u32 {
    bits.iter()
        .take(LENGTH_PREFIX_BITS)
        .enumerate()
        .fold(0u32, |len, (i, &bit)| len | (((bit & 1) as u32) << i))
}

/// 单个字节的 8 个比特，从第 7 位到第 0 位。
pub fn byte_to_bits(byte: u8) -> [u8; BITS_PER_BYTE] {
    let mut bits = [0u8; BITS_PER_BYTE];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (byte >> (BITS_PER_BYTE - 1 - i)) & 1;
    }
    bits
}

/// 把比特每 8 个一组、高位在前地重新组装成字节。
///
/// 末尾不足 8 个的比特被丢弃。
pub fn pack_bytes(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(BITS_PER_BYTE)
        .map(|chunk| {
            chunk
                .iter()
                .fold(0u8, |byte, &bit| (byte << 1) | (bit & 1))
        })
        .collect()
}
