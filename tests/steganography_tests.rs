use palette_hide::{
    error::StegoError,
    framing::{frame, framed_bit_len},
    palette::{Color, Palette},
    steganography::{
        capacity_bytes, check_capacity, embed, extract_length, extract_payload, hide, recover,
        select_replacement,
    },
};
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};

/// 一个辅助函数，生成随机调色板，并保证奇偶两种颜色都存在
fn random_palette(rng: &mut StdRng) -> Palette {
    let mut colors = [Color::default(); 256];
    for color in colors.iter_mut() {
        *color = Color::new(rng.random(), rng.random(), rng.random());
    }
    colors[0] = Color::new(10, 20, 30);
    colors[1] = Color::new(10, 20, 31);
    Palette::new(colors)
}

/// 一个辅助函数，生成随机的像素索引
fn random_pixels(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; len];
    rng.fill_bytes(&mut pixels);
    pixels
}

/// 一个辅助函数，生成指定长度的随机载荷
fn random_payload(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rng.fill_bytes(&mut payload);
    payload
}

/// 验证任意载荷在容量足够时都能完整地嵌入并恢复
#[test]
fn test_round_trip_random_payloads() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(76);

    for len in [0usize, 1, 7, 64, 500] {
        let palette = random_palette(&mut rng);
        let mut pixels = random_pixels(&mut rng, framed_bit_len(len) + 100);
        let payload = random_payload(&mut rng, len);

        hide(&palette, &mut pixels, &payload)?;
        assert_eq!(recover(&palette, &pixels)?, payload);
    }

    Ok(())
}

/// 验证每个被处理过的像素的奇偶位都等于对应的比特，且之后的像素不变
#[test]
fn test_parity_contract_and_untouched_tail() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(1);
    let palette = random_palette(&mut rng);
    let original = random_pixels(&mut rng, 2000);
    let payload = random_payload(&mut rng, 100);
    let bits = frame(&payload)?;

    let mut pixels = original.clone();
    let report = embed(&palette, &mut pixels, &bits)?;

    assert_eq!(report.bits_embedded, bits.len());
    for (p, &bit) in bits.iter().enumerate() {
        assert_eq!(palette.parity(pixels[p]), bit, "pixel {p}");
    }
    assert_eq!(&pixels[bits.len()..], &original[bits.len()..]);

    Ok(())
}

/// 验证原颜色的奇偶位已经匹配时，像素保持不变
#[test]
fn test_matching_parity_leaves_pixel_unchanged() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(2);
    let palette = random_palette(&mut rng);
    let original = random_pixels(&mut rng, 1000);
    let bits: Vec<u8> = (0..1000).map(|_| rng.random_range(0..2)).collect();

    let mut pixels = original.clone();
    let report = embed(&palette, &mut pixels, &bits)?;

    let mut changed = 0;
    for p in 0..bits.len() {
        if palette.parity(original[p]) == bits[p] {
            assert_eq!(pixels[p], original[p], "pixel {p} should not change");
        } else {
            assert_ne!(pixels[p], original[p]);
            changed += 1;
        }
    }
    assert_eq!(report.pixels_changed, changed);

    Ok(())
}

/// 即使调色板中存在索引更小的同色条目，匹配的像素也保持原索引
#[test]
fn test_duplicate_colors_keep_original_index() -> anyhow::Result<()> {
    let mut colors = [Color::new(200, 0, 0); 256];
    colors[3] = Color::new(5, 5, 5);
    colors[9] = Color::new(5, 5, 5);
    colors[10] = Color::new(5, 5, 6);
    let palette = Palette::new(colors);

    // (5,5,5) 的奇偶位为 1
    assert_eq!(select_replacement(&palette, 9, 1)?, 9);
    // 需要 0 时，同色的 3 也是奇数，最近的偶数颜色是 10
    assert_eq!(select_replacement(&palette, 9, 0)?, 10);

    Ok(())
}

/// 验证缓存只是优化：逐像素直接计算的结果与 `embed` 完全一致
#[test]
fn test_cache_is_transparent() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(3);
    let palette = random_palette(&mut rng);
    // 只使用少量不同的索引，让缓存频繁命中
    let original: Vec<u8> = (0..3000).map(|_| rng.random_range(0..16)).collect();
    let bits: Vec<u8> = (0..3000).map(|_| rng.random_range(0..2)).collect();

    let mut cached = original.clone();
    let report = embed(&palette, &mut cached, &bits)?;

    let uncached = original
        .iter()
        .zip(&bits)
        .map(|(&source, &bit)| select_replacement(&palette, source, bit))
        .collect::<Result<Vec<u8>, StegoError>>()?;

    assert_eq!(cached, uncached);
    assert!(report.cache_misses <= 32);
    assert_eq!(report.cache_hits + report.cache_misses, bits.len());

    Ok(())
}

/// 验证相同输入两次嵌入得到相同的输出
#[test]
fn test_embedding_is_deterministic() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(4);
    let palette = random_palette(&mut rng);
    let original = random_pixels(&mut rng, 800);
    let payload = random_payload(&mut rng, 50);

    let mut first = original.clone();
    let mut second = original.clone();
    hide(&palette, &mut first, &payload)?;
    hide(&palette, &mut second, &payload)?;

    assert_eq!(first, second);
    Ok(())
}

/// 验证距离相同时选择索引较小的条目
#[test]
fn test_ties_prefer_lower_index() -> anyhow::Result<()> {
    let mut colors = [Color::new(0, 0, 0); 256];
    colors[0] = Color::new(10, 10, 10);
    colors[3] = Color::new(11, 10, 10);
    colors[5] = Color::new(10, 11, 10);
    colors[7] = Color::new(9, 10, 10);
    let palette = Palette::new(colors);

    assert_eq!(palette.parity(0), 0);
    assert_eq!(select_replacement(&palette, 0, 1)?, 3);
    assert_eq!(select_replacement(&palette, 0, 0)?, 0);

    Ok(())
}

/// 验证 "A" (0x41) 的具体像素模式
#[test]
fn test_single_byte_vector_in_pixels() -> anyhow::Result<()> {
    let mut colors = [Color::new(0, 0, 0); 256];
    colors[1] = Color::new(0, 0, 1);
    let palette = Palette::new(colors);

    let mut pixels = vec![0u8; 40];
    hide(&palette, &mut pixels, &[0x41])?;

    let mut expected = vec![0u8; 40];
    expected[0] = 1;
    expected[33] = 1;
    expected[39] = 1;
    assert_eq!(pixels, expected);

    assert_eq!(extract_length(&palette, &pixels)?, (1, 32));
    assert_eq!(extract_payload(&palette, &pixels, 1, 32)?, vec![0x41]);

    Ok(())
}

/// 验证恰好填满容量的载荷可以嵌入，多一个像素的需求则被拒绝且图像不变
#[test]
fn test_capacity_boundary() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(5);
    let palette = random_palette(&mut rng);
    let payload = random_payload(&mut rng, 20);
    let exact = framed_bit_len(payload.len());

    assert_eq!(exact, 192);
    assert_eq!(capacity_bytes(exact), 20);
    assert_eq!(capacity_bytes(exact - 1), 19);

    let mut pixels = random_pixels(&mut rng, exact);
    let report = hide(&palette, &mut pixels, &payload)?;
    assert_eq!(report.bits_embedded, exact);
    assert_eq!(recover(&palette, &pixels)?, payload);

    let original = random_pixels(&mut rng, exact - 1);
    let mut pixels = original.clone();
    let result = hide(&palette, &mut pixels, &payload);
    assert_eq!(
        result,
        Err(StegoError::Capacity {
            required: exact,
            available: exact - 1
        })
    );
    assert_eq!(pixels, original, "rejected payload must not touch pixels");
    assert!(check_capacity(exact - 1, payload.len()).is_err());

    Ok(())
}

/// 验证调色板全部为同一奇偶性时报告错误而不是死循环
#[test]
fn test_single_parity_palette_is_rejected() {
    let mut colors = [Color::default(); 256];
    for (i, color) in colors.iter_mut().enumerate() {
        *color = Color::new(i as u8, i as u8, 0);
    }
    let palette = Palette::new(colors);
    let mut pixels = vec![5u8; 64];

    let result = hide(&palette, &mut pixels, &[0xFF]);
    assert_eq!(
        result,
        Err(StegoError::ParityUnavailable { index: 5, bit: 1 })
    );
}

/// 验证从没有隐藏数据的图像中提取时报告截断而不是越界
#[test]
fn test_recover_reports_truncated_stream() {
    let mut colors = [Color::new(0, 0, 0); 256];
    colors[1] = Color::new(0, 0, 1);
    let palette = Palette::new(colors);

    // 前 32 个像素全部为奇数颜色：长度 = u32::MAX
    let pixels = vec![1u8; 100];
    assert!(matches!(
        recover(&palette, &pixels),
        Err(StegoError::Truncated { available: 100, .. })
    ));

    assert_eq!(
        extract_length(&palette, &pixels[..31]),
        Err(StegoError::Truncated {
            required: 32,
            available: 31
        })
    );
}
