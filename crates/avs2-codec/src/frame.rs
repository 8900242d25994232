//! 解码后的帧数据 (Frame).
//!
//! 对标 FFmpeg 的 `AVFrame`, 表示解码后或待编码的原始视频数据.

use avs2_core::timestamp::NOPTS_VALUE;
use avs2_core::{PixelFormat, Rational};

/// 视频帧
///
/// 包含原始像素数据, 按平面存储.
/// YUV420P 有 3 个平面: Y, U, V.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// 各平面的像素数据
    pub data: Vec<Vec<u8>>,
    /// 各平面每行的字节数 (linesize / stride)
    pub linesize: Vec<usize>,
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 显示时间戳 (PTS)
    pub pts: i64,
    /// 时间基
    pub time_base: Rational,
    /// 帧时长 (以 time_base 为单位)
    pub duration: i64,
    /// 是否为关键帧
    pub is_keyframe: bool,
    /// 图片类型 (I/P/B 帧)
    pub picture_type: PictureType,
    /// 采样宽高比 (SAR)
    pub sample_aspect_ratio: Rational,
}

impl VideoFrame {
    /// 创建空的视频帧
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat) -> Self {
        let plane_count = pixel_format.plane_count() as usize;
        Self {
            data: vec![Vec::new(); plane_count],
            linesize: vec![0; plane_count],
            width,
            height,
            pixel_format,
            pts: NOPTS_VALUE,
            time_base: Rational::UNDEFINED,
            duration: 0,
            is_keyframe: false,
            picture_type: PictureType::None,
            sample_aspect_ratio: Rational::new(1, 1),
        }
    }

    /// 按像素格式分配紧凑排列的平面 (linesize 等于有效行宽)
    pub fn alloc(width: u32, height: u32, pixel_format: PixelFormat) -> Option<Self> {
        let mut frame = Self::new(width, height, pixel_format);
        for plane in 0..frame.data.len() {
            let linesize = pixel_format.plane_linesize(plane, width)?;
            let lines = pixel_format.plane_height(plane, height)?;
            frame.data[plane] = vec![0; linesize * lines];
            frame.linesize[plane] = linesize;
        }
        Some(frame)
    }
}

/// 帧
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Frame {
    /// 视频帧
    Video(VideoFrame),
}

impl Frame {
    /// 获取视频帧
    pub fn video(&self) -> Option<&VideoFrame> {
        match self {
            Self::Video(v) => Some(v),
        }
    }

    /// 显示时间戳
    pub fn pts(&self) -> i64 {
        match self {
            Self::Video(v) => v.pts,
        }
    }
}

/// 图片类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PictureType {
    /// 未指定
    #[default]
    None,
    /// I 帧 (关键帧, 帧内编码)
    I,
    /// P 帧 (前向预测)
    P,
    /// B 帧 (双向预测)
    B,
    /// S 帧 (AVS2 场景图像)
    S,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_yuv420p10le_planes() {
        let frame = VideoFrame::alloc(16, 8, PixelFormat::Yuv420p10le).unwrap();
        assert_eq!(frame.linesize, vec![32, 16, 16]);
        assert_eq!(frame.data[0].len(), 32 * 8);
        assert_eq!(frame.data[1].len(), 16 * 4);
    }

    #[test]
    fn test_alloc_unknown_format() {
        let frame = VideoFrame::alloc(16, 8, PixelFormat::None).unwrap();
        assert!(frame.data.is_empty());
    }
}
