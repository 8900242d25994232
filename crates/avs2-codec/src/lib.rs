//! # avs2-codec
//!
//! AVS2 编解码器框架, 提供 Packet/Frame 抽象、编解码器 trait 与注册表,
//! 以及对外部 AVS2 引擎的适配器.
//!
//! 本 crate 对标 FFmpeg 的 libavcodec 中与 AVS2 相关的部分:
//!
//! - **解码器**: libdavs2 适配 ([`decoders::davs2::Davs2Decoder`])
//! - **编码器**: libxavs2 适配 ([`encoders::xavs2::Xavs2Encoder`])
//! - **解析器**: AVS2 起始码扫描 ([`parsers::avs2`])
//!
//! 引擎本身通过 [`engine`] 中的 trait 接入.
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use avs2_codec::{CodecId, CodecRegistry};
//!
//! let mut reg = CodecRegistry::new();
//! avs2_codec::decoders::register_davs2::<MyDavs2>(&mut reg);
//! avs2_codec::encoders::register_xavs2::<MyXavs2>(&mut reg);
//!
//! let decoder = reg.create_decoder(CodecId::Avs2)?;
//! ```

pub mod capabilities;
pub mod codec_id;
pub mod codec_parameters;
pub mod decoder;
pub mod decoders;
pub mod encoder;
pub mod encoders;
pub mod engine;
pub mod frame;
pub mod frame_rate;
pub mod packet;
pub mod parsers;
pub mod registry;

// 重导出常用类型
pub use capabilities::CodecCapabilities;
pub use codec_id::CodecId;
pub use codec_parameters::{CodecParameters, CodecParamsType, VideoCodecParams};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use frame::{Frame, PictureType, VideoFrame};
pub use packet::Packet;
pub use registry::CodecRegistry;

/// 以指定引擎注册 AVS2 解码器与编码器
pub fn register_all<D, E>(registry: &mut CodecRegistry)
where
    D: engine::DecoderEngine + 'static,
    E: engine::EncoderApi + 'static,
{
    decoders::register_davs2::<D>(registry);
    encoders::register_xavs2::<E>(registry);
}
