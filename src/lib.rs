//! # avs2
//!
//! AVS2/IEEE 1857.4 码流探测与外部编解码引擎适配层, 对标 FFmpeg 的
//! `avs2` 裸流输入格式与 `libdavs2`/`libxavs2` 封装.
//!
//! 本库不实现 AVS2 编解码算法, 引擎通过 [`codec::engine`] 中的 trait 接入.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use avs2::format::IoContext;
//!
//! # fn main() -> avs2::core::Avs2Result<()> {
//! let registry = avs2::default_format_registry();
//! let mut io = IoContext::open_read("clip.avs2")?;
//! let result = registry.probe_input(&mut io, Some("clip.avs2"))?;
//! println!("格式: {} (score={})", result.format_id, result.score);
//! # Ok(())
//! # }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `avs2-core` | 核心类型与工具 |
//! | `avs2-codec` | 编解码器框架与引擎适配 |
//! | `avs2-format` | 裸流探测与解封装 |

pub mod logging;

/// 核心类型与工具 (对标 libavutil)
pub use avs2_core as core;

/// 编解码器框架 (对标 libavcodec)
pub use avs2_codec as codec;

/// 输入格式框架 (对标 libavformat)
pub use avs2_format as format;

/// 获取版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建以指定引擎注册了 `libdavs2`/`libxavs2` 的编解码器注册表
pub fn default_codec_registry<D, E>() -> avs2_codec::CodecRegistry
where
    D: avs2_codec::engine::DecoderEngine + 'static,
    E: avs2_codec::engine::EncoderApi + 'static,
{
    let mut registry = avs2_codec::CodecRegistry::new();
    avs2_codec::register_all::<D, E>(&mut registry);
    registry
}

/// 创建已注册所有内置输入格式的注册表
pub fn default_format_registry() -> avs2_format::FormatRegistry {
    let mut registry = avs2_format::FormatRegistry::new();
    avs2_format::register_all(&mut registry);
    registry
}
