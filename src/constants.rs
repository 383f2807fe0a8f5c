/// 调色板固定包含的颜色条目数。
/// 像素值是 `u8`，因此恰好可以索引 0..=255 的全部条目。
pub const PALETTE_SIZE: usize = 256;

/// 用于隐写载荷长度信息的比特数 (也就是像素数)。
/// 长度以 `u32` 保存，每个像素承载 1 bit，因此需要 32 个像素。
pub const LENGTH_PREFIX_BITS: usize = 32;

/// 每个载荷字节展开后的比特数，每个 bit 占用一个像素。
pub const BITS_PER_BYTE: usize = 8;

/// BMP 文件头 (BITMAPFILEHEADER) 的大小 (字节)。
pub const BMP_FILE_HEADER_SIZE: usize = 14;

/// BITMAPINFOHEADER 的最小大小 (字节)。更新版本的信息头只会更长。
pub const BMP_INFO_HEADER_SIZE: usize = 40;

/// 调色板中每个条目的字节数：蓝、绿、红、保留。
pub const BMP_PALETTE_ENTRY_SIZE: usize = 4;

/// 未指定 `--dest` 时，隐写图像的默认文件名 (与载体图像位于同一目录)。
pub const DEFAULT_STEGO_NAME: &str = "outfile.bmp";

/// 未指定 `--output` 时，恢复出的载荷的默认文件名 (与隐写图像位于同一目录)。
pub const DEFAULT_RECOVERED_NAME: &str = "recovered";
