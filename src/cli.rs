//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

/// 基于调色板奇偶性 (Fridrich 方法) 的隐写工具，用于在 8 位调色板 BMP 图像中隐藏或恢复任意文件。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "基于调色板奇偶性 (Fridrich 方法) 的隐写工具。\n每个像素被替换为与原颜色最接近、且 (R+G+B) mod 2 等于待隐藏比特的调色板条目。\n设置 RUST_LOG=palette_hide=debug 可查看嵌入统计。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：hide (隐藏)、recover (恢复) 和 inspect (查看)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在 8 位调色板 BMP 图像中隐藏一个文件。
    Hide(HideArgs),

    /// 从经过隐写的图像中恢复隐藏的文件。
    Recover(RecoverArgs),

    /// 显示 BMP 的头部信息、隐写容量和调色板奇偶分布。
    Inspect(InspectArgs),
}

/// 'hide' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct HideArgs {
    /// 作为载体的 8 位调色板 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径 (任意二进制内容)。
    #[arg(short, long)]
    pub payload: PathBuf,

    /// 隐写图像的输出路径。默认为载体图像所在目录下的 `outfile.bmp`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'recover' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct RecoverArgs {
    /// 已隐藏数据的图像文件路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复出的文件的保存路径。默认为图像所在目录下的 `recovered`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时强制覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'inspect' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// 要查看的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,
}
