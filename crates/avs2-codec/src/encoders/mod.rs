//! 编码器实现模块.

pub mod xavs2;

use crate::codec_id::CodecId;
use crate::engine::EncoderApi;
use crate::registry::CodecRegistry;

/// 以指定编码库注册 libxavs2 编码器
pub fn register_xavs2<A: EncoderApi + 'static>(registry: &mut CodecRegistry) {
    registry.register_encoder(CodecId::Avs2, "libxavs2", xavs2::Xavs2Encoder::<A>::create);
}
