//! # palette_hide 库
//!
//! 本库包含调色板奇偶隐写工具的核心逻辑：
//! 调色板距离排序、替换缓存、嵌入/提取、载荷分帧以及 8 位 BMP 容器读写。

// 声明库包含的所有模块。

pub mod bitmap;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod error;
pub mod framing;
pub mod handler;
pub mod palette;
pub mod steganography;
