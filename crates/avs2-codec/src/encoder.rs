//! 编码器 trait 定义.
//!
//! 所有编码器实现必须实现 `Encoder` trait.

use avs2_core::{Avs2Error, Avs2Result};

use crate::capabilities::CodecCapabilities;
use crate::codec_id::CodecId;
use crate::codec_parameters::CodecParameters;
use crate::frame::Frame;
use crate::packet::Packet;

/// 编码器 trait
///
/// 编码流程:
/// 1. 调用 `send_frame()` 送入原始帧数据
/// 2. 调用 `receive_packet()` 取出压缩数据包
/// 3. 重复以上步骤直到所有数据处理完毕
/// 4. 送入 None 表示编码结束, 刷新编码器缓存
pub trait Encoder: Send {
    /// 获取编码器标识
    fn codec_id(&self) -> CodecId;

    /// 获取编码器名称
    fn name(&self) -> &str;

    /// 编码器能力
    fn capabilities(&self) -> CodecCapabilities {
        CodecCapabilities::empty()
    }

    /// 按名称设置编码器私有选项, 需在 `open()` 之前调用
    fn set_option(&mut self, key: &str, _value: &str) -> Avs2Result<()> {
        Err(Avs2Error::Unsupported(format!(
            "{} 编码器没有选项 {}",
            self.name(),
            key
        )))
    }

    /// 使用参数配置编码器
    fn open(&mut self, _params: &CodecParameters) -> Avs2Result<()> {
        Ok(())
    }

    /// 送入一帧原始数据进行编码
    ///
    /// # 参数
    /// - `frame`: 原始帧数据. `None` 表示刷新 (flush), 取出缓存的数据包.
    fn send_frame(&mut self, frame: Option<&Frame>) -> Avs2Result<()>;

    /// 从编码器取出一个压缩数据包
    ///
    /// # 返回
    /// - `Ok(packet)`: 成功取出一个数据包
    /// - `Err(Avs2Error::NeedMoreData)`: 需要送入更多帧
    /// - `Err(Avs2Error::Eof)`: 所有数据包已取出
    fn receive_packet(&mut self) -> Avs2Result<Packet>;

    /// 刷新编码器, 丢弃已缓存的输出
    fn flush(&mut self);
}
