//! 编解码器参数.
//!
//! 对标 FFmpeg 的 `AVCodecParameters` 与 `AVCodecContext` 中被 AVS2 适配器用到的字段.

use avs2_core::{PixelFormat, Rational};

use crate::codec_id::CodecId;

/// 编解码器参数
///
/// 传递给编解码器的配置信息, 通常从容器格式中提取.
#[derive(Debug, Clone)]
pub struct CodecParameters {
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 额外数据
    pub extra_data: Vec<u8>,
    /// 码率 (bits/s), 0 表示不使用码率控制
    pub bit_rate: u64,
    /// 线程数 (0 表示由引擎自动决定)
    pub thread_count: u32,
    /// 媒体类型特定参数
    pub params: CodecParamsType,
}

/// 媒体类型特定参数
#[derive(Debug, Clone)]
pub enum CodecParamsType {
    /// 视频参数
    Video(VideoCodecParams),
    /// 无特定参数
    None,
}

/// 视频编解码器参数
#[derive(Debug, Clone)]
pub struct VideoCodecParams {
    /// 宽度 (像素)
    pub width: u32,
    /// 高度 (像素)
    pub height: u32,
    /// 像素格式
    pub pixel_format: PixelFormat,
    /// 帧率
    pub frame_rate: Rational,
    /// 采样宽高比 (SAR)
    pub sample_aspect_ratio: Rational,
    /// GOP 长度 (关键帧间隔)
    pub gop_size: u32,
    /// 最大连续 B 帧数
    pub max_b_frames: u32,
    /// 是否使用封闭 GOP
    pub closed_gop: bool,
}

impl Default for VideoCodecParams {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            pixel_format: PixelFormat::None,
            frame_rate: Rational::UNDEFINED,
            sample_aspect_ratio: Rational::new(1, 1),
            gop_size: 12,
            max_b_frames: 0,
            closed_gop: false,
        }
    }
}

impl CodecParameters {
    /// 创建视频参数
    pub fn new_video(codec_id: CodecId, video: VideoCodecParams) -> Self {
        Self {
            codec_id,
            extra_data: Vec::new(),
            bit_rate: 0,
            thread_count: 0,
            params: CodecParamsType::Video(video),
        }
    }

    /// 获取视频参数 (如果是视频流)
    pub fn video(&self) -> Option<&VideoCodecParams> {
        match &self.params {
            CodecParamsType::Video(v) => Some(v),
            CodecParamsType::None => None,
        }
    }

    /// 获取可变视频参数
    pub fn video_mut(&mut self) -> Option<&mut VideoCodecParams> {
        match &mut self.params {
            CodecParamsType::Video(v) => Some(v),
            CodecParamsType::None => None,
        }
    }
}
