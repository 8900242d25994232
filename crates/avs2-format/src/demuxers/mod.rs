//! 解封装器实现模块.

pub mod avs2;

use crate::format_id::FormatId;
use crate::registry::FormatRegistry;

/// 注册所有内置解封装器
pub fn register_all_demuxers(registry: &mut FormatRegistry) {
    registry.register_demuxer(FormatId::Avs2Es, "avs2", avs2::Avs2EsDemuxer::create);
    registry.register_probe(Box::new(avs2::Avs2Probe));
}
