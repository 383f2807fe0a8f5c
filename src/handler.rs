//! # 命令处理逻辑模块
//!
//! 包含处理 `hide`、`recover` 和 `inspect` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、校验容量与格式、调用核心隐写算法以及向用户报告结果。

use crate::bitmap::Bitmap;
use crate::cli::{HideArgs, InspectArgs, RecoverArgs};
use crate::constants::{DEFAULT_RECOVERED_NAME, DEFAULT_STEGO_NAME};
use crate::framing::framed_bit_len;
use crate::steganography::{capacity_bytes, check_capacity, hide, recover};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 读取并解析一个 8 位调色板 BMP。
fn load_bitmap(path: &Path) -> Result<Bitmap> {
    let raw = fs::read(path).with_context(|| {
        format!(
            "Unable to read image file: {}",
            path.to_string_lossy().red().bold()
        )
    })?;

    let bitmap = Bitmap::from_bytes(raw).with_context(|| {
        format!(
            "{} is not a usable 8-bit palette BMP image",
            path.to_string_lossy().red().bold()
        )
    })?;

    info!(
        path = %path.display(),
        width = bitmap.header().width,
        height = bitmap.header().height,
        pixels = bitmap.pixels().len(),
        "loaded bitmap"
    );
    Ok(bitmap)
}

/// 用户未指定输出路径时，在 `source` 所在目录下使用 `default_name`。
fn resolve_output(explicit: Option<PathBuf>, source: &Path, default_name: &str) -> PathBuf {
    explicit.unwrap_or_else(|| source.with_file_name(default_name))
}

/// 输出文件已存在且未指定 `--force` 时拒绝写入。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {} \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

/// 处理 'Hide' 命令的执行逻辑。
///
/// 负责读取载体图像和载荷文件、检查隐写空间是否足够、调用隐写核心函数嵌入载荷，
/// 最后将结果写入目标图像文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `HideArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像或载荷文件，或图像不是 8 位调色板 BMP。
/// * 图像没有足够的像素来隐藏载荷 (含 32 bit 长度前缀)。
/// * 目标文件已存在且未指定 `--force`。
/// * 核心隐写函数 (`hide`) 在执行过程中失败。
/// * 无法写入到目标图像文件。
pub fn handle_hide(args: HideArgs) -> Result<()> {
    let dest = resolve_output(args.dest, &args.image, DEFAULT_STEGO_NAME);
    ensure_writable(&dest, args.force)?;

    let mut bitmap = load_bitmap(&args.image)?;

    let payload = fs::read(&args.payload).with_context(|| {
        format!(
            "Unable to read payload file: {}",
            args.payload.to_string_lossy().red().bold()
        )
    })?;

    let available_space = bitmap.pixels().len();
    check_capacity(available_space, payload.len()).with_context(|| {
        format!(
            "Not enough space in the image to hide the payload. \nRequired: {} bits, Available: {} pixels",
            framed_bit_len(payload.len()).to_string().red().bold(),
            available_space.to_string().green().bold()
        )
    })?;

    let (palette, pixels) = bitmap.palette_and_pixels_mut();
    let report = hide(palette, pixels, &payload).with_context(|| {
        format!(
            "Failed to hide {} in the image.",
            args.payload.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&dest, bitmap.as_bytes()).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;
    info!(path = %dest.display(), bytes = payload.len(), "wrote stego image");

    println!(
        "The payload has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    println!(
        "{} bits embedded, {} pixels changed ({} cache hits, {} palette searches)",
        report.bits_embedded.to_string().green(),
        report.pixels_changed.to_string().green(),
        report.cache_hits,
        report.cache_misses
    );

    Ok(())
}

/// 处理 'Recover' 命令的执行逻辑。
///
/// 负责读取经过隐写的图像文件、从像素奇偶性中恢复载荷长度和内容，
/// 最后将恢复的内容写入目标文件。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `RecoverArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入的图像文件，或图像不是 8 位调色板 BMP。
/// * 解出的长度超出了图像的容量 (图像中可能没有隐藏数据)。
/// * 目标文件已存在且未指定 `--force`。
/// * 无法写入到目标文件。
pub fn handle_recover(args: RecoverArgs) -> Result<()> {
    let output = resolve_output(args.output, &args.image, DEFAULT_RECOVERED_NAME);
    ensure_writable(&output, args.force)?;

    let bitmap = load_bitmap(&args.image)?;

    let payload = recover(bitmap.palette(), bitmap.pixels()).with_context(|| {
        format!(
            "Failed to recover the payload from '{}'. \nThe image may not contain a hidden payload or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    fs::write(&output, &payload).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            output.to_string_lossy().red().bold()
        )
    })?;
    info!(path = %output.display(), bytes = payload.len(), "wrote recovered payload");

    println!(
        "The payload ({} bytes) has been successfully recovered and saved: {}",
        payload.len().to_string().green(),
        output.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Inspect' 命令的执行逻辑。
///
/// 打印 BMP 头部字段、像素数据大小、可隐藏的最大载荷字节数，
/// 以及调色板中偶/奇校验颜色的数量。
pub fn handle_inspect(args: InspectArgs) -> Result<()> {
    let bitmap = load_bitmap(&args.image)?;
    let header = bitmap.header();

    let odd = bitmap
        .palette()
        .colors()
        .iter()
        .filter(|color| color.parity() == 1)
        .count();
    let even = bitmap.palette().colors().len() - odd;

    println!("{}", args.image.to_string_lossy().bold());
    println!("  dimensions:    {} x {}", header.width, header.height);
    println!("  bit depth:     {}", header.bit_count);
    println!("  file size:     {} bytes", header.file_size);
    println!("  pixel offset:  {}", header.pixel_offset);
    println!("  pixel data:    {} bytes", header.image_size);
    println!(
        "  capacity:      {} bytes",
        capacity_bytes(bitmap.pixels().len()).to_string().green().bold()
    );
    println!("  palette:       {} even / {} odd", even, odd);

    if even == 0 || odd == 0 {
        println!(
            "{}",
            "  warning: every palette entry has the same parity, nothing can be hidden".yellow()
        );
    }

    Ok(())
}
