//! 输入帧到引擎缓冲区的拷贝.

use avs2_core::{Avs2Error, Avs2Result};
use byteorder::{ByteOrder, NativeEndian};

use crate::engine::InputImage;
use crate::frame::VideoFrame;

/// 左移位数上限 (u16 采样)
const MAX_SAMPLE_SHIFT: u32 = 15;

/// 按行拷贝, 每行拷贝 `width * in_sample_size` 字节
pub fn copy_frame(image: &mut InputImage, frame: &VideoFrame) -> Avs2Result<()> {
    for plane in 0..3 {
        let (src, src_stride) = source_plane(frame, plane)?;
        let row_bytes = image.widths[plane] * image.in_sample_size;
        let dst_stride = image.strides[plane];

        for line in 0..image.lines[plane] {
            let s = row(src, line * src_stride, row_bytes, plane, "输入帧")?;
            let d = image.planes[plane]
                .get_mut(line * dst_stride..line * dst_stride + row_bytes)
                .ok_or_else(|| short_plane(plane, "引擎缓冲区"))?;
            d.copy_from_slice(s);
        }
    }
    Ok(())
}

/// 把 8 位采样扩展为 16 位并左移 `shift` 位
///
/// 目标行先整行清零, 再写入 `width` 个采样.
pub fn copy_frame_with_shift(
    image: &mut InputImage,
    frame: &VideoFrame,
    shift: u32,
) -> Avs2Result<()> {
    for plane in 0..3 {
        let (src, src_stride) = source_plane(frame, plane)?;
        let width = image.widths[plane];
        let dst_stride = image.strides[plane];
        if width * 2 > dst_stride {
            return Err(short_plane(plane, "引擎缓冲区"));
        }

        for line in 0..image.lines[plane] {
            let s = row(src, line * src_stride, width, plane, "输入帧")?;
            let d = image.planes[plane]
                .get_mut(line * dst_stride..(line + 1) * dst_stride)
                .ok_or_else(|| short_plane(plane, "引擎缓冲区"))?;
            d.fill(0);
            for (sample, out) in s.iter().zip(d.chunks_exact_mut(2)) {
                NativeEndian::write_u16(out, u16::from(*sample) << shift);
            }
        }
    }
    Ok(())
}

/// 解析引擎的 `SampleShift` 参数
///
/// 取开头的十进制整数 (可带符号), 无法解析时为 0; 结果限制在 0..=15.
pub fn parse_sample_shift(value: Option<&str>) -> u32 {
    let Some(text) = value else {
        return 0;
    };
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if negative {
        return 0;
    }
    // 逐位累加并饱和, 超长数字按上限处理
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        });
    magnitude.min(MAX_SAMPLE_SHIFT)
}

fn source_plane(frame: &VideoFrame, plane: usize) -> Avs2Result<(&[u8], usize)> {
    match (frame.data.get(plane), frame.linesize.get(plane)) {
        (Some(data), Some(&linesize)) => Ok((data.as_slice(), linesize)),
        _ => Err(Avs2Error::InvalidArgument(format!(
            "输入帧缺少平面 {}",
            plane
        ))),
    }
}

fn row<'a>(
    data: &'a [u8],
    start: usize,
    len: usize,
    plane: usize,
    what: &str,
) -> Avs2Result<&'a [u8]> {
    data.get(start..start + len)
        .ok_or_else(|| short_plane(plane, what))
}

fn short_plane(plane: usize, what: &str) -> Avs2Error {
    Avs2Error::InvalidArgument(format!("{}平面 {} 尺寸不足", what, plane))
}
