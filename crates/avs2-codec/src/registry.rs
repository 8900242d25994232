//! 编解码器注册表.
//!
//! 对标 FFmpeg 的编解码器注册机制, 支持按 CodecId 或名称查找并实例化编解码器.
//!
//! AVS2 编解码器依赖外部引擎, 由调用方在注册时选定引擎实现:
//!
//! ```rust,ignore
//! registry.register_decoder(CodecId::Avs2, "libdavs2", Davs2Decoder::<MyEngine>::create);
//! ```

use std::collections::HashMap;

use avs2_core::{Avs2Error, Avs2Result};

use crate::codec_id::CodecId;
use crate::decoder::Decoder;
use crate::encoder::Encoder;

/// 解码器工厂函数类型
pub type DecoderFactory = fn() -> Avs2Result<Box<dyn Decoder>>;

/// 编码器工厂函数类型
pub type EncoderFactory = fn() -> Avs2Result<Box<dyn Encoder>>;

/// 编解码器注册表
pub struct CodecRegistry {
    /// 解码器工厂映射
    decoders: HashMap<CodecId, Vec<Entry<DecoderFactory>>>,
    /// 编码器工厂映射
    encoders: HashMap<CodecId, Vec<Entry<EncoderFactory>>>,
}

/// 注册条目
struct Entry<F> {
    /// 名称
    name: String,
    /// 工厂函数
    factory: F,
}

impl CodecRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
            encoders: HashMap::new(),
        }
    }

    /// 注册一个解码器
    pub fn register_decoder(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: DecoderFactory,
    ) {
        self.decoders.entry(codec_id).or_default().push(Entry {
            name: name.into(),
            factory,
        });
    }

    /// 注册一个编码器
    pub fn register_encoder(
        &mut self,
        codec_id: CodecId,
        name: impl Into<String>,
        factory: EncoderFactory,
    ) {
        self.encoders.entry(codec_id).or_default().push(Entry {
            name: name.into(),
            factory,
        });
    }

    /// 创建指定编解码器 ID 的解码器实例 (先注册者优先)
    pub fn create_decoder(&self, codec_id: CodecId) -> Avs2Result<Box<dyn Decoder>> {
        let entry = self
            .decoders
            .get(&codec_id)
            .and_then(|entries| entries.first())
            .ok_or_else(|| Avs2Error::CodecNotFound(format!("未找到 {} 的解码器", codec_id)))?;
        (entry.factory)()
    }

    /// 创建指定编解码器 ID 的编码器实例 (先注册者优先)
    pub fn create_encoder(&self, codec_id: CodecId) -> Avs2Result<Box<dyn Encoder>> {
        let entry = self
            .encoders
            .get(&codec_id)
            .and_then(|entries| entries.first())
            .ok_or_else(|| Avs2Error::CodecNotFound(format!("未找到 {} 的编码器", codec_id)))?;
        (entry.factory)()
    }

    /// 按名称创建解码器实例
    pub fn create_decoder_by_name(&self, name: &str) -> Avs2Result<Box<dyn Decoder>> {
        let entry = self
            .decoders
            .values()
            .flatten()
            .find(|e| e.name == name)
            .ok_or_else(|| Avs2Error::CodecNotFound(format!("未找到解码器 {}", name)))?;
        (entry.factory)()
    }

    /// 按名称创建编码器实例
    pub fn create_encoder_by_name(&self, name: &str) -> Avs2Result<Box<dyn Encoder>> {
        let entry = self
            .encoders
            .values()
            .flatten()
            .find(|e| e.name == name)
            .ok_or_else(|| Avs2Error::CodecNotFound(format!("未找到编码器 {}", name)))?;
        (entry.factory)()
    }

    /// 获取所有已注册的解码器名称
    pub fn list_decoders(&self) -> Vec<(CodecId, &str)> {
        let mut result = Vec::new();
        for (id, entries) in &self.decoders {
            for entry in entries {
                result.push((*id, entry.name.as_str()));
            }
        }
        result
    }

    /// 获取所有已注册的编码器名称
    pub fn list_encoders(&self) -> Vec<(CodecId, &str)> {
        let mut result = Vec::new();
        for (id, entries) in &self.encoders {
            for entry in entries {
                result.push((*id, entry.name.as_str()));
            }
        }
        result
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}
