//! 解码器实现模块.

pub mod davs2;

use crate::codec_id::CodecId;
use crate::engine::DecoderEngine;
use crate::registry::CodecRegistry;

/// 以指定引擎注册 libdavs2 解码器
pub fn register_davs2<E: DecoderEngine + 'static>(registry: &mut CodecRegistry) {
    registry.register_decoder(CodecId::Avs2, "libdavs2", davs2::Davs2Decoder::<E>::create);
}
