//! libxavs2 AVS2 编码器适配.
//!
//! 打开时把框架参数与私有选项翻译成引擎的字符串参数 (`Width`、`BFrames`、
//! `RateControl` 等), 编码时把输入帧拷贝进引擎分配的缓冲区.
//!
//! 引擎参数值以定长缓冲区传递, 超过 15 字节的值会被截断.
//! 被引擎拒绝的参数只产生警告.

pub mod options;
pub mod picture;

use std::collections::VecDeque;
use std::fmt::Display;

use avs2_core::{Avs2Error, Avs2Result, Dictionary, PixelFormat, Rational};
use log::{debug, error, warn};

use crate::capabilities::CodecCapabilities;
use crate::codec_id::CodecId;
use crate::codec_parameters::{CodecParameters, VideoCodecParams};
use crate::encoder::Encoder;
use crate::engine::{EncoderApi, EncoderEngine, EncoderParams, InputPicture};
use crate::frame::Frame;
use crate::frame_rate::find_best_frame_rate_code;
use crate::packet::Packet;

pub use options::Xavs2Options;

/// 默认 GOP 长度
pub const DEFAULT_GOP_SIZE: u32 = 48;
/// 默认最大连续 B 帧数
pub const DEFAULT_MAX_B_FRAMES: u32 = 7;

/// 引擎参数值的最大字节数
const MAX_PARAM_VALUE_LEN: usize = 15;

/// 生成带 libxavs2 默认值的编码参数 (码率 0, GOP 48, B 帧 7)
pub fn default_parameters(
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
    frame_rate: Rational,
) -> CodecParameters {
    CodecParameters::new_video(
        CodecId::Avs2,
        VideoCodecParams {
            width,
            height,
            pixel_format,
            frame_rate,
            gop_size: DEFAULT_GOP_SIZE,
            max_b_frames: DEFAULT_MAX_B_FRAMES,
            ..VideoCodecParams::default()
        },
    )
}

/// libxavs2 编码器
pub struct Xavs2Encoder<A: EncoderApi> {
    /// 私有选项
    options: Xavs2Options,
    /// 引擎实例
    engine: Option<A::Engine>,
    /// 引擎参数对象
    params: Option<A::Params>,
    /// 编码库句柄
    api: Option<A>,
    /// 输入像素格式
    pixel_format: PixelFormat,
    /// 待取出的数据包
    pending: VecDeque<Packet>,
    /// 是否已收到刷新信号
    flushing: bool,
    /// 引擎是否已无更多输出
    drained: bool,
}

impl<A: EncoderApi + 'static> Xavs2Encoder<A> {
    /// 创建编码器实例 (工厂函数)
    pub fn create() -> Avs2Result<Box<dyn Encoder>> {
        Ok(Box::new(Self::new(Xavs2Options::default())))
    }
}

impl<A: EncoderApi> Xavs2Encoder<A> {
    /// 使用指定选项创建未打开的编码器
    pub fn new(options: Xavs2Options) -> Self {
        Self {
            options,
            engine: None,
            params: None,
            api: None,
            pixel_format: PixelFormat::None,
            pending: VecDeque::new(),
            flushing: false,
            drained: false,
        }
    }

    /// 当前私有选项
    pub fn options(&self) -> &Xavs2Options {
        &self.options
    }

    /// 引擎参数对象 (打开后可用)
    pub fn engine_params(&self) -> Option<&A::Params> {
        self.params.as_ref()
    }

    /// 释放引擎, 先销毁引擎实例再释放参数对象
    fn close(&mut self) {
        if self.engine.take().is_some() {
            debug!("libxavs2 编码器已销毁");
        }
        self.params = None;
        self.api = None;
    }

    /// 依次写入全部引擎参数
    fn configure(
        &self,
        params: &mut A::Params,
        codec: &CodecParameters,
        video: &VideoCodecParams,
        bit_depth: u32,
    ) {
        let opts = &self.options;
        set_param(params, "Width", video.width);
        set_param(params, "Height", video.height);
        set_param(params, "BFrames", video.max_b_frames);
        set_param(params, "BitDepth", bit_depth);
        set_param(params, "Log", opts.log_level);
        set_param(params, "Preset", opts.speed_level);
        set_param(params, "IntraPeriodMax", video.gop_size);
        set_param(params, "IntraPeriodMin", video.gop_size);
        set_param(params, "ThreadFrames", codec.thread_count);
        set_param(params, "ThreadRows", opts.lcu_row_threads);
        set_param(params, "OpenGOP", u8::from(!video.closed_gop));

        if let Some(text) = &opts.xavs2_params {
            match Dictionary::parse(text, "=", ":") {
                Ok(dict) => {
                    for (key, value) in dict.iter() {
                        set_param(params, key, value);
                    }
                }
                Err(e) => warn!("忽略无法解析的 xavs2-params: {}", e),
            }
        }

        if codec.bit_rate > 0 {
            set_param(params, "RateControl", 1);
            set_param(params, "TargetBitRate", codec.bit_rate);
            set_param(params, "InitialQP", opts.initial_qp);
            set_param(params, "MaxQP", opts.max_qp);
            set_param(params, "MinQP", opts.min_qp);
        } else {
            set_param(params, "InitialQP", opts.qp);
        }

        let code = find_best_frame_rate_code(video.frame_rate);
        set_param(params, "FrameRate", code);
    }

    /// 刷新时向引擎要一个包, 引擎错误视为无输出
    fn drain_once(&mut self) -> Avs2Result<Option<Packet>> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(None);
        };
        match encode_packet(engine, None) {
            Ok(packet) => Ok(packet),
            Err(Avs2Error::External(msg)) => {
                debug!("libxavs2 刷新结束: {}", msg);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl<A: EncoderApi> Encoder for Xavs2Encoder<A> {
    fn codec_id(&self) -> CodecId {
        CodecId::Avs2
    }

    fn name(&self) -> &str {
        "libxavs2"
    }

    fn capabilities(&self) -> CodecCapabilities {
        CodecCapabilities::DELAY | CodecCapabilities::AUTO_THREADS
    }

    fn set_option(&mut self, key: &str, value: &str) -> Avs2Result<()> {
        self.options.set(key, value)
    }

    fn open(&mut self, codec: &CodecParameters) -> Avs2Result<()> {
        let video = codec
            .video()
            .ok_or_else(|| Avs2Error::InvalidArgument("libxavs2 编码器需要视频参数".into()))?;
        let bit_depth = match video.pixel_format {
            PixelFormat::Yuv420p => 8,
            PixelFormat::Yuv420p10le => 10,
            other => {
                return Err(Avs2Error::InvalidArgument(format!(
                    "libxavs2 不支持像素格式 {}",
                    other
                )));
            }
        };
        self.options.validate()?;
        self.close();

        let api = A::load(bit_depth).ok_or_else(|| {
            error!("libxavs2 加载 {} 位编码库失败", bit_depth);
            Avs2Error::External(format!("无法加载 {} 位 libxavs2", bit_depth))
        })?;
        let mut params = api.alloc_params().ok_or_else(|| {
            error!("libxavs2 参数对象分配失败");
            Avs2Error::OutOfMemory("libxavs2 参数对象".into())
        })?;

        self.configure(&mut params, codec, video, bit_depth);

        let engine = api.create_encoder(&params).ok_or_else(|| {
            error!("libxavs2 无法创建编码器");
            Avs2Error::InvalidArgument("libxavs2 无法以当前参数创建编码器".into())
        })?;

        self.engine = Some(engine);
        self.params = Some(params);
        self.api = Some(api);
        self.pixel_format = video.pixel_format;
        self.pending.clear();
        self.flushing = false;
        self.drained = false;

        debug!(
            "libxavs2 编码器已创建: {}x{}, {} 位, GOP={}, B 帧={}, 码率={}",
            video.width, video.height, bit_depth, video.gop_size, video.max_b_frames, codec.bit_rate,
        );
        Ok(())
    }

    fn send_frame(&mut self, frame: Option<&Frame>) -> Avs2Result<()> {
        let Some(frame) = frame else {
            self.flushing = true;
            match self.drain_once()? {
                Some(packet) => self.pending.push_back(packet),
                None => self.drained = true,
            }
            return Ok(());
        };

        if self.flushing {
            return Err(Avs2Error::Codec("编码器已进入刷新状态, 不再接受输入".into()));
        }
        let video = frame
            .video()
            .ok_or_else(|| Avs2Error::InvalidArgument("libxavs2 只接受视频帧".into()))?;
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| Avs2Error::Codec("编码器未打开, 请先调用 open()".into()))?;

        let mut input = engine.get_buffer().map_err(|code| {
            error!("libxavs2 获取输入缓冲区失败, 错误码 {}", code);
            Avs2Error::External(format!("获取输入缓冲区失败, 错误码 {}", code))
        })?;

        let same_size = input.image.in_sample_size == input.image.enc_sample_size;
        match video.pixel_format {
            PixelFormat::Yuv420p if same_size => picture::copy_frame(&mut input.image, video)?,
            PixelFormat::Yuv420p => {
                let shift = picture::parse_sample_shift(
                    self.params
                        .as_ref()
                        .and_then(|p| p.get("SampleShift"))
                        .as_deref(),
                );
                picture::copy_frame_with_shift(&mut input.image, video, shift)?;
            }
            PixelFormat::Yuv420p10le if same_size => {
                picture::copy_frame(&mut input.image, video)?
            }
            other => {
                error!("libxavs2 不支持的像素格式 {}", other);
                return Err(Avs2Error::InvalidArgument(format!(
                    "不支持的像素格式 {}",
                    other
                )));
            }
        }

        input.state = 0;
        input.pts = video.pts;
        input.frame_type = 0;

        if let Some(packet) = encode_packet(engine, Some(input)).inspect_err(|e| {
            if matches!(e, Avs2Error::External(_)) {
                error!("libxavs2 编码失败");
            }
        })? {
            self.pending.push_back(packet);
        }
        Ok(())
    }

    fn receive_packet(&mut self) -> Avs2Result<Packet> {
        if let Some(packet) = self.pending.pop_front() {
            return Ok(packet);
        }
        if !self.flushing {
            return Err(Avs2Error::NeedMoreData);
        }
        if self.drained {
            return Err(Avs2Error::Eof);
        }
        match self.drain_once()? {
            Some(packet) => Ok(packet),
            None => {
                self.drained = true;
                Err(Avs2Error::Eof)
            }
        }
    }

    /// 丢弃已缓存的数据包并退出刷新状态, 引擎内部状态不受影响
    fn flush(&mut self) {
        self.pending.clear();
        self.flushing = false;
        self.drained = false;
    }
}

impl<A: EncoderApi> Drop for Xavs2Encoder<A> {
    fn drop(&mut self) {
        self.close();
    }
}

/// 调用引擎编码并把输出拷贝为 [`Packet`]
fn encode_packet<En: EncoderEngine>(
    engine: &mut En,
    input: Option<InputPicture>,
) -> Avs2Result<Option<Packet>> {
    let encoded = engine
        .encode(input)
        .map_err(|code| Avs2Error::External(format!("libxavs2 编码失败, 错误码 {}", code)))?;
    if !encoded.has_payload() {
        return Ok(None);
    }

    let mut data = Vec::new();
    data.try_reserve_exact(encoded.data.len())?;
    data.extend_from_slice(encoded.data);

    let mut packet = Packet::from_data(data);
    packet.pts = encoded.pts;
    packet.dts = encoded.dts;
    Ok(Some(packet))
}

/// 写入一个引擎参数, 值超过 15 字节时截断, 被拒绝时告警
fn set_param<P: EncoderParams>(params: &mut P, key: &str, value: impl Display) {
    let text = value.to_string();
    let text = truncate_value(&text);
    if params.set(key, text).is_err() {
        warn!("libxavs2 参数 {} 的取值无效: {}", key, text);
    }
}

fn truncate_value(text: &str) -> &str {
    if text.len() <= MAX_PARAM_VALUE_LEN {
        return text;
    }
    let mut end = MAX_PARAM_VALUE_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
