//! libdavs2 AVS2 解码器适配.
//!
//! 把框架的 send/receive 解码流程映射到 davs2 引擎的 decode/flush 调用:
//! - 引擎解析到序列头时更新宽高、像素格式与帧率
//! - 引擎输出图像时把三个平面拷贝到新分配的 [`VideoFrame`] 中
//! - 引擎报错时关闭引擎, 后续调用均失败

use std::collections::VecDeque;

use avs2_core::{Avs2Error, Avs2Result, PixelFormat, Rational};
use log::{debug, error, warn};

use crate::capabilities::CodecCapabilities;
use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::decoder::Decoder;
use crate::engine::{
    DecoderConfig, DecoderEngine, EngineOutput, EnginePacket, EnginePicture, SequenceInfo,
};
use crate::frame::{Frame, PictureType, VideoFrame};
use crate::packet::Packet;

/// 帧率逼近时分子分母的上限
const FRAME_RATE_MAX: i32 = 4096;

/// libdavs2 解码器
pub struct Davs2Decoder<E: DecoderEngine> {
    /// 引擎句柄, 出错或关闭后为 None
    engine: Option<E>,
    /// 引擎未消耗的码流
    pending_input: Vec<u8>,
    /// 解码状态
    state: DecodeState,
    /// 是否已收到刷新信号 (空包)
    flushing: bool,
    /// 打开时的引擎配置, 重置时用于重建引擎
    config: Option<DecoderConfig>,
}

/// 与引擎句柄分离的解码状态
#[derive(Debug)]
struct DecodeState {
    /// 最近一次解析到的序列头
    sequence: Option<SequenceInfo>,
    /// 输出像素格式
    pixel_format: PixelFormat,
    /// 帧率
    frame_rate: Rational,
    /// 待取出的帧
    frames: VecDeque<Frame>,
    /// 已解码帧数
    decoded_frames: u64,
}

impl<E: DecoderEngine + 'static> Davs2Decoder<E> {
    /// 创建解码器实例 (工厂函数)
    pub fn create() -> Avs2Result<Box<dyn Decoder>> {
        Ok(Box::new(Self::new()))
    }
}

impl<E: DecoderEngine> Davs2Decoder<E> {
    /// 创建未打开的解码器
    pub fn new() -> Self {
        Self {
            engine: None,
            pending_input: Vec::new(),
            state: DecodeState::default(),
            flushing: false,
            config: None,
        }
    }

    /// 当前序列宽高 (尚未解析到序列头时为 None)
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.state.sequence.map(|s| (s.width, s.height))
    }

    /// 当前输出像素格式
    pub fn pixel_format(&self) -> PixelFormat {
        self.state.pixel_format
    }

    /// 当前帧率
    pub fn frame_rate(&self) -> Rational {
        self.state.frame_rate
    }

    /// 已解码帧数
    pub fn decoded_frames(&self) -> u64 {
        self.state.decoded_frames
    }

    /// 引擎是否处于打开状态
    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    fn close_engine(&mut self) {
        if self.engine.take().is_some() {
            debug!(
                "libdavs2 解码器已销毁, 已解码 {} 帧",
                self.state.decoded_frames
            );
        }
    }

    /// 把缓冲的码流尽量交给引擎
    fn decode_pending(&mut self, pts: i64, dts: i64) -> Avs2Result<()> {
        let mut offset = 0usize;
        let mut failure = None;
        let mut rejected = None;

        while offset < self.pending_input.len() {
            let engine = self
                .engine
                .as_mut()
                .ok_or_else(|| Avs2Error::Codec("解码器未打开, 请先调用 open()".into()))?;
            let packet = EnginePacket {
                data: &self.pending_input[offset..],
                pts,
                dts,
            };
            let step = match engine.decode(&packet) {
                Ok(step) => step,
                Err(code) => {
                    failure = Some(code);
                    break;
                }
            };

            let remaining = self.pending_input.len() - offset;
            let consumed = step.consumed.min(remaining);
            let produced = step.output.is_some();
            offset += consumed;
            if let Some(output) = step.output {
                if let Err(e) = self.state.accept(output) {
                    rejected = Some(e);
                    break;
                }
            }

            if consumed == 0 && !produced {
                break;
            }
        }

        self.pending_input.drain(..offset);

        if let Some(e) = rejected {
            return Err(e);
        }

        if let Some(code) = failure {
            error!("libdavs2 解码出错, 错误码 {}", code);
            self.close_engine();
            return Err(Avs2Error::External(format!(
                "libdavs2 解码失败, 错误码 {}",
                code
            )));
        }
        Ok(())
    }

    /// 取出引擎中缓存的全部输出
    fn drain_engine(&mut self) -> Avs2Result<()> {
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        loop {
            match engine.flush() {
                Ok(Some(output)) => self.state.accept(output)?,
                Ok(None) => break,
                Err(code) => {
                    debug!("libdavs2 刷新结束, 返回码 {}", code);
                    break;
                }
            }
        }
        Ok(())
    }
}

impl<E: DecoderEngine> Default for Davs2Decoder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for DecodeState {
    fn default() -> Self {
        Self {
            sequence: None,
            pixel_format: PixelFormat::None,
            frame_rate: Rational::UNDEFINED,
            frames: VecDeque::new(),
            decoded_frames: 0,
        }
    }
}

impl DecodeState {
    fn accept(&mut self, output: EngineOutput<'_>) -> Avs2Result<()> {
        match output {
            EngineOutput::Header(info) => {
                self.on_sequence_header(info);
                Ok(())
            }
            EngineOutput::Picture(picture) => {
                let frame = self.copy_picture(&picture)?;
                self.frames.push_back(Frame::Video(frame));
                self.decoded_frames += 1;
                Ok(())
            }
        }
    }

    fn on_sequence_header(&mut self, info: SequenceInfo) {
        self.pixel_format = if info.output_bit_depth == 10 {
            PixelFormat::Yuv420p10le
        } else {
            PixelFormat::Yuv420p
        };
        self.frame_rate = Rational::from_f64(info.frame_rate, FRAME_RATE_MAX);
        self.sequence = Some(info);
        debug!(
            "libdavs2 序列头: {}x{}, 格式={}, 帧率={}",
            info.width, info.height, self.pixel_format, self.frame_rate,
        );
    }

    fn copy_picture(&self, picture: &EnginePicture<'_>) -> Avs2Result<VideoFrame> {
        let sequence = self
            .sequence
            .ok_or_else(|| Avs2Error::InvalidArgument("未收到序列头即输出图像".into()))?;

        let mut frame = VideoFrame::new(sequence.width, sequence.height, self.pixel_format);
        frame.data = Vec::with_capacity(3);
        frame.linesize = Vec::with_capacity(3);

        for plane in 0..3 {
            let linesize = picture.widths[plane] * picture.bytes_per_sample;
            let size = linesize * picture.lines[plane];
            let src = picture.planes[plane].get(..size).ok_or_else(|| {
                Avs2Error::InvalidData(format!(
                    "平面 {} 数据不足: 需要 {} 字节, 实际 {} 字节",
                    plane,
                    size,
                    picture.planes[plane].len()
                ))
            })?;
            let mut data = Vec::new();
            data.try_reserve_exact(size)?;
            data.extend_from_slice(src);
            frame.data.push(data);
            frame.linesize.push(linesize);
        }

        frame.pts = picture.pts;
        frame.picture_type = picture.picture_type.into();
        frame.is_keyframe = frame.picture_type == PictureType::I;
        if self.frame_rate.is_valid() && self.frame_rate.num > 0 {
            frame.time_base = self.frame_rate.invert();
            frame.duration = 1;
        }
        Ok(frame)
    }
}

impl<E: DecoderEngine> Decoder for Davs2Decoder<E> {
    fn codec_id(&self) -> CodecId {
        CodecId::Avs2
    }

    fn name(&self) -> &str {
        "libdavs2"
    }

    fn capabilities(&self) -> CodecCapabilities {
        CodecCapabilities::DELAY
    }

    fn open(&mut self, params: &CodecParameters) -> Avs2Result<()> {
        if params.codec_id != CodecId::Avs2 {
            return Err(Avs2Error::InvalidArgument(format!(
                "libdavs2 不支持 {}",
                params.codec_id
            )));
        }
        self.close_engine();

        let config = DecoderConfig {
            threads: params.thread_count,
            info_level: 0,
        };
        let engine = E::open(&config)
            .ok_or_else(|| Avs2Error::External("libdavs2 引擎打开失败".into()))?;
        self.engine = Some(engine);
        self.config = Some(config);
        self.pending_input.clear();
        self.state = DecodeState::default();
        self.flushing = false;

        debug!("libdavs2 解码器已创建, 线程数={}", config.threads);
        Ok(())
    }

    fn send_packet(&mut self, packet: &Packet) -> Avs2Result<()> {
        if packet.is_empty() {
            if !self.pending_input.is_empty() {
                warn!(
                    "libdavs2 刷新时丢弃 {} 字节未消耗码流",
                    self.pending_input.len()
                );
                self.pending_input.clear();
            }
            self.drain_engine()?;
            self.flushing = true;
            return Ok(());
        }

        if self.engine.is_none() {
            return Err(Avs2Error::Codec("解码器未打开, 请先调用 open()".into()));
        }
        self.pending_input.try_reserve(packet.data.len())?;
        self.pending_input.extend_from_slice(&packet.data);
        self.decode_pending(packet.pts, packet.dts)
    }

    fn receive_frame(&mut self) -> Avs2Result<Frame> {
        if let Some(frame) = self.state.frames.pop_front() {
            return Ok(frame);
        }
        if self.flushing {
            Err(Avs2Error::Eof)
        } else {
            Err(Avs2Error::NeedMoreData)
        }
    }

    /// 重置: 丢弃缓存的帧与码流, 并重建引擎以清除其内部缓存的图像
    ///
    /// 序列头信息保留, 直到新引擎再次输出序列头.
    fn flush(&mut self) {
        self.state.frames.clear();
        self.pending_input.clear();
        self.flushing = false;

        let Some(config) = self.config else {
            return;
        };
        self.close_engine();
        self.engine = E::open(&config);
        if self.engine.is_none() {
            error!("libdavs2 重置时无法重新打开引擎");
        }
    }
}

impl<E: DecoderEngine> Drop for Davs2Decoder<E> {
    fn drop(&mut self) {
        self.close_engine();
    }
}
