//! 外部 AVS2 编解码引擎接口.
//!
//! 解码引擎对应 libdavs2, 编码引擎对应 libxavs2. 两者都是本地库,
//! 由绑定 crate 实现这里的 trait 后交给适配器 ([`crate::decoders::davs2`]、
//! [`crate::encoders::xavs2`]) 使用.
//!
//! 引擎返回的负值错误码原样透传为 `i32`, 由适配器映射为 [`avs2_core::Avs2Error`].
//! 引擎输出以借用形式返回, 借用结束即视为归还引擎 (对应 C 接口的 unref).

use crate::frame::PictureType;

// ============================================================
// 解码引擎
// ============================================================

/// 解码引擎配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    /// 线程数 (0 表示自动)
    pub threads: u32,
    /// 引擎内部日志级别
    pub info_level: i32,
}

/// 送入解码引擎的码流片段
#[derive(Debug, Clone, Copy)]
pub struct EnginePacket<'a> {
    /// 码流数据
    pub data: &'a [u8],
    /// 显示时间戳
    pub pts: i64,
    /// 解码时间戳
    pub dts: i64,
}

/// 序列头信息
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceInfo {
    /// 水平尺寸
    pub width: u32,
    /// 垂直尺寸
    pub height: u32,
    /// 输出位深 (8 或 10)
    pub output_bit_depth: u32,
    /// 帧率
    pub frame_rate: f64,
}

/// 引擎图像类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePictureType {
    /// I 图像
    I,
    /// P 图像
    P,
    /// B 图像
    B,
    /// 背景图像 (G)
    G,
    /// 前向参考背景的 P 图像 (F)
    F,
    /// 场景图像 (S)
    S,
}

impl From<EnginePictureType> for PictureType {
    fn from(value: EnginePictureType) -> Self {
        match value {
            EnginePictureType::I | EnginePictureType::G => PictureType::I,
            EnginePictureType::P | EnginePictureType::F => PictureType::P,
            EnginePictureType::B => PictureType::B,
            EnginePictureType::S => PictureType::S,
        }
    }
}

/// 引擎输出的一帧图像 (借用引擎内部缓冲区)
#[derive(Debug, Clone, Copy)]
pub struct EnginePicture<'a> {
    /// Y/U/V 三个平面, 每平面紧凑排列
    pub planes: [&'a [u8]; 3],
    /// 各平面每行采样数
    pub widths: [usize; 3],
    /// 各平面行数
    pub lines: [usize; 3],
    /// 每采样字节数
    pub bytes_per_sample: usize,
    /// 显示时间戳
    pub pts: i64,
    /// 图像类型
    pub picture_type: EnginePictureType,
}

/// 解码引擎的一次输出
#[derive(Debug, Clone, Copy)]
pub enum EngineOutput<'a> {
    /// 解析到序列头
    Header(SequenceInfo),
    /// 输出一帧图像
    Picture(EnginePicture<'a>),
}

/// 一次 decode 调用的结果
#[derive(Debug, Clone, Copy)]
pub struct DecodeStep<'a> {
    /// 本次消耗的字节数
    pub consumed: usize,
    /// 产生的输出 (如有)
    pub output: Option<EngineOutput<'a>>,
}

/// 解码引擎 (libdavs2)
///
/// Drop 即关闭引擎.
pub trait DecoderEngine: Send + Sized {
    /// 打开引擎, 失败返回 None
    fn open(config: &DecoderConfig) -> Option<Self>;

    /// 送入码流, 返回消耗字节数及可能的输出. 错误返回负值错误码.
    fn decode(&mut self, packet: &EnginePacket<'_>) -> Result<DecodeStep<'_>, i32>;

    /// 取出引擎缓存的输出, 无更多输出时返回 `Ok(None)`
    fn flush(&mut self) -> Result<Option<EngineOutput<'_>>, i32>;
}

// ============================================================
// 编码引擎
// ============================================================

/// 引擎分配的输入图像缓冲区
#[derive(Debug, Clone, Default)]
pub struct InputImage {
    /// Y/U/V 平面
    pub planes: [Vec<u8>; 3],
    /// 各平面行跨度 (字节)
    pub strides: [usize; 3],
    /// 各平面每行采样数
    pub widths: [usize; 3],
    /// 各平面行数
    pub lines: [usize; 3],
    /// 输入采样字节数
    pub in_sample_size: usize,
    /// 编码内部采样字节数
    pub enc_sample_size: usize,
}

/// 送入编码引擎的图像
#[derive(Debug, Clone, Default)]
pub struct InputPicture {
    /// 图像数据
    pub image: InputImage,
    /// 显示时间戳
    pub pts: i64,
    /// 帧类型, 0 表示由引擎自动决定
    pub frame_type: i32,
    /// 状态字
    pub state: i32,
}

/// 编码输出包状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PacketState {
    /// 普通数据
    #[default]
    Normal,
    /// 刷新已全部结束
    FlushEnd,
}

/// 编码引擎产出的数据包 (借用引擎内部缓冲区)
#[derive(Debug, Clone, Copy)]
pub struct EncodedPacket<'a> {
    /// 码流数据 (可能为空)
    pub data: &'a [u8],
    /// 显示时间戳
    pub pts: i64,
    /// 解码时间戳
    pub dts: i64,
    /// 状态
    pub state: PacketState,
}

impl EncodedPacket<'_> {
    /// 是否携带有效数据
    pub fn has_payload(&self) -> bool {
        !self.data.is_empty() && self.state != PacketState::FlushEnd
    }
}

/// 编码参数对象
pub trait EncoderParams: Send {
    /// 设置参数, 被引擎拒绝时返回错误码
    fn set(&mut self, key: &str, value: &str) -> Result<(), i32>;

    /// 查询参数当前值
    fn get(&self, key: &str) -> Option<String>;
}

/// 编码引擎实例
///
/// Drop 即销毁引擎.
pub trait EncoderEngine: Send {
    /// 申请一块输入图像缓冲区
    fn get_buffer(&mut self) -> Result<InputPicture, i32>;

    /// 编码一帧, `None` 表示刷新
    fn encode(&mut self, picture: Option<InputPicture>) -> Result<EncodedPacket<'_>, i32>;
}

/// 编码库入口 (按位深加载)
pub trait EncoderApi: Send + Sized {
    /// 参数对象类型
    type Params: EncoderParams;
    /// 引擎实例类型
    type Engine: EncoderEngine;

    /// 加载指定位深的编码库, 不支持时返回 None
    fn load(bit_depth: u32) -> Option<Self>;

    /// 分配参数对象
    fn alloc_params(&self) -> Option<Self::Params>;

    /// 依据参数创建引擎
    fn create_encoder(&self, params: &Self::Params) -> Option<Self::Engine>;
}
