//! 码流解析器模块.

pub mod avs2;
