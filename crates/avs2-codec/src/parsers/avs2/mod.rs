//! AVS2 (IEEE 1857.4) 码流解析器.
//!
//! 提供对 AVS2 Elementary Stream 起始码的扫描与单元类型识别:
//! - 起始码 (`00 00 01 xx`) 滚动窗口扫描
//! - 单元类型 (序列头、图像头、扩展、用户数据等) 分类
//! - 序列头后的 profile_id 识别

pub mod unit;

pub use unit::{Profile, StartCode, StartCodeScanner, UnitType, is_avs2_profile};
