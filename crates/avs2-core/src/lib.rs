//! # avs2-core
//!
//! AVS2 适配层核心库, 提供基础类型定义、错误处理和工具函数.
//!
//! 本 crate 对标 FFmpeg 的 libavutil 中被 AVS2 适配器用到的部分:
//! 错误码、有理数、像素格式、时间戳与键值字典.

pub mod dict;
pub mod error;
pub mod media_type;
pub mod pixel_format;
pub mod rational;
pub mod timestamp;

// 重导出常用类型
pub use dict::Dictionary;
pub use error::{Avs2Error, Avs2Result};
pub use media_type::MediaType;
pub use pixel_format::PixelFormat;
pub use rational::Rational;
pub use timestamp::Timestamp;
