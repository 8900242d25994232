//! AVS2 起始码与单元类型.
//!
//! # 起始码
//!
//! AVS2 与 MPEG-1/2 一样使用 `00 00 01 xx` 分隔码流单元, `xx` 为单元类型:
//!
//! ```text
//! 0x00..=0x8F  slice
//! 0xB0         video_sequence_start_code  (序列头)
//! 0xB1         video_sequence_end_code    (序列结束)
//! 0xB2         user_data_start_code
//! 0xB3         intra_picture_start_code   (I 图像)
//! 0xB5         extension_start_code
//! 0xB6         inter_picture_start_code   (P/B 图像)
//! 0xB7         video_edit_code
//! ```
//!
//! 序列头类型字节之后紧跟 `profile_id`, 用来区分 AVS2 与共用起始码的其它格式.

use std::fmt;

/// 序列头
pub const SEQUENCE_HEADER_CODE: u8 = 0xB0;
/// 序列结束
pub const SEQUENCE_END_CODE: u8 = 0xB1;
/// 用户数据
pub const USER_DATA_CODE: u8 = 0xB2;
/// I 图像
pub const INTRA_PICTURE_CODE: u8 = 0xB3;
/// 扩展数据
pub const EXTENSION_CODE: u8 = 0xB5;
/// P/B 图像
pub const INTER_PICTURE_CODE: u8 = 0xB6;
/// 视频编辑码
pub const VIDEO_EDIT_CODE: u8 = 0xB7;

/// 最大 slice 起始码
const MAX_SLICE_CODE: u8 = 0x8F;

/// AVS2 单元类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    /// Slice (0x00..=0x8F, 值为 slice 垂直位置)
    Slice(u8),
    /// 序列头
    SequenceHeader,
    /// 序列结束
    SequenceEnd,
    /// 用户数据
    UserData,
    /// I 图像头
    IntraPicture,
    /// 扩展数据
    Extension,
    /// P/B 图像头
    InterPicture,
    /// 视频编辑码
    VideoEdit,
    /// 其它 (保留或系统起始码)
    Other(u8),
}

impl UnitType {
    /// 从起始码后的类型字节创建
    pub const fn from_code(code: u8) -> Self {
        match code {
            0x00..=MAX_SLICE_CODE => Self::Slice(code),
            SEQUENCE_HEADER_CODE => Self::SequenceHeader,
            SEQUENCE_END_CODE => Self::SequenceEnd,
            USER_DATA_CODE => Self::UserData,
            INTRA_PICTURE_CODE => Self::IntraPicture,
            EXTENSION_CODE => Self::Extension,
            INTER_PICTURE_CODE => Self::InterPicture,
            VIDEO_EDIT_CODE => Self::VideoEdit,
            _ => Self::Other(code),
        }
    }

    /// 获取类型字节
    pub const fn code(&self) -> u8 {
        match self {
            Self::Slice(code) | Self::Other(code) => *code,
            Self::SequenceHeader => SEQUENCE_HEADER_CODE,
            Self::SequenceEnd => SEQUENCE_END_CODE,
            Self::UserData => USER_DATA_CODE,
            Self::IntraPicture => INTRA_PICTURE_CODE,
            Self::Extension => EXTENSION_CODE,
            Self::InterPicture => INTER_PICTURE_CODE,
            Self::VideoEdit => VIDEO_EDIT_CODE,
        }
    }

    /// 是否为序列头
    pub const fn is_sequence_header(&self) -> bool {
        matches!(self, Self::SequenceHeader)
    }

    /// 是否为序列结束
    pub const fn is_end_of_sequence(&self) -> bool {
        matches!(self, Self::SequenceEnd)
    }

    /// 是否为图像头 (I 或 P/B)
    pub const fn is_picture(&self) -> bool {
        matches!(self, Self::IntraPicture | Self::InterPicture)
    }

    /// 是否为结构单元 (序列头/结束、用户数据、图像头、扩展、视频编辑码)
    ///
    /// 结构单元的起始码标志着上一个单元的结束.
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::SequenceHeader
                | Self::SequenceEnd
                | Self::UserData
                | Self::IntraPicture
                | Self::Extension
                | Self::InterPicture
                | Self::VideoEdit
        )
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slice(code) => write!(f, "Slice({code})"),
            Self::SequenceHeader => write!(f, "SequenceHeader"),
            Self::SequenceEnd => write!(f, "SequenceEnd"),
            Self::UserData => write!(f, "UserData"),
            Self::IntraPicture => write!(f, "IntraPicture"),
            Self::Extension => write!(f, "Extension"),
            Self::InterPicture => write!(f, "InterPicture"),
            Self::VideoEdit => write!(f, "VideoEdit"),
            Self::Other(code) => write!(f, "Other(0x{code:02X})"),
        }
    }
}

/// AVS2 profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// Main Picture (0x12)
    MainPicture,
    /// Main (0x20)
    Main,
    /// Main 10 (0x22)
    Main10,
    /// High (0x30)
    High,
    /// High 10 (0x32)
    High10,
}

impl Profile {
    /// 从 profile_id 创建, 未知值返回 None
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0x12 => Some(Self::MainPicture),
            0x20 => Some(Self::Main),
            0x22 => Some(Self::Main10),
            0x30 => Some(Self::High),
            0x32 => Some(Self::High10),
            _ => None,
        }
    }

    /// 获取 profile_id
    pub const fn id(&self) -> u8 {
        match self {
            Self::MainPicture => 0x12,
            Self::Main => 0x20,
            Self::Main10 => 0x22,
            Self::High => 0x30,
            Self::High10 => 0x32,
        }
    }
}

/// 判断字节是否为 AVS2 profile_id
pub const fn is_avs2_profile(id: u8) -> bool {
    Profile::from_id(id).is_some()
}

/// 扫描到的起始码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartCode {
    /// 单元类型
    pub unit_type: UnitType,
    /// 类型字节之后的偏移 (即单元负载的起始位置)
    pub end: usize,
}

/// 起始码扫描器
///
/// 使用 32 位滚动窗口逐字节扫描 `00 00 01 xx`, 窗口初值全 1.
/// 窗口在两次命中之间保留, 因此起始码前缀可以与上一个类型字节重叠.
/// 游标只前进不后退.
#[derive(Debug, Clone)]
pub struct StartCodeScanner<'a> {
    data: &'a [u8],
    pos: usize,
    state: u32,
}

impl<'a> StartCodeScanner<'a> {
    /// 创建扫描器, 游标位于缓冲区开头
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            state: u32::MAX,
        }
    }

    /// 当前游标位置 (扫描耗尽时等于缓冲区长度)
    pub fn cursor(&self) -> usize {
        self.pos
    }
}

impl Iterator for StartCodeScanner<'_> {
    type Item = StartCode;

    fn next(&mut self) -> Option<StartCode> {
        while self.pos < self.data.len() {
            self.state = (self.state << 8) | u32::from(self.data[self.pos]);
            self.pos += 1;
            if self.state & 0xFFFF_FF00 == 0x0000_0100 {
                return Some(StartCode {
                    unit_type: UnitType::from_code(self.state as u8),
                    end: self.pos,
                });
            }
        }
        None
    }
}
