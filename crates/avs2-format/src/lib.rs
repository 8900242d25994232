//! # avs2-format
//!
//! AVS2 裸流格式库, 提供输入 I/O、格式探测与解封装框架.
//!
//! 本 crate 对标 FFmpeg 的 libavformat 中 `avs2` 裸流输入格式:
//! [`demuxers::avs2::avs2_probe`] 通过起始码结构识别 AVS2 码流,
//! [`demuxers::avs2::Avs2EsDemuxer`] 把输入切块交给解码器.

pub mod demuxer;
pub mod demuxers;
pub mod format_id;
pub mod io;
pub mod probe;
pub mod registry;
pub mod stream;

// 重导出常用类型
pub use demuxer::{Demuxer, SeekFlags};
pub use demuxers::avs2::avs2_probe;
pub use format_id::FormatId;
pub use io::IoContext;
pub use probe::{ProbeResult, ProbeScore, SCORE_EXTENSION, SCORE_MAX};
pub use registry::FormatRegistry;
pub use stream::Stream;

/// 注册所有内置输入格式
pub fn register_all(registry: &mut FormatRegistry) {
    demuxers::register_all_demuxers(registry);
}
