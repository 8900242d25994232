//! AVS2 裸流 (Elementary Stream) 探测与解封装器.
//!
//! AVS2 裸流没有容器结构, 由一连串以 `00 00 01 xx` 分隔的码流单元组成:
//!
//! ```text
//! [00 00 01 B0] profile_id level_id ...   序列头
//! [00 00 01 B2] ...                       用户数据 (可选)
//! [00 00 01 B3] ...                       I 图像头
//! [00 00 01 00..8F] ...                   slice
//! [00 00 01 B6] ...                       P/B 图像头
//! ...
//! [00 00 01 B1]                           序列结束 (可选)
//! ```
//!
//! 探测只看起始码结构, 不解析语法元素. 解封装器按固定大小切块输出,
//! 帧边界交给解码器处理.

use avs2_codec::parsers::avs2::{StartCodeScanner, is_avs2_profile};
use avs2_codec::{CodecId, Packet};
use avs2_core::timestamp::NOPTS_VALUE;
use avs2_core::{Avs2Error, Avs2Result, MediaType, PixelFormat, Rational};
use bytes::Bytes;
use log::debug;

use crate::demuxer::{Demuxer, SeekFlags};
use crate::format_id::FormatId;
use crate::io::IoContext;
use crate::probe::{FormatProbe, ProbeScore, SCORE_EXTENSION};
use crate::stream::{Stream, StreamParams, VideoStreamParams};

/// 起始码前缀长度 (`00 00 01` + 类型字节)
const START_CODE_SIZE: usize = 4;

/// 序列头起始码之后至少需要的字节数 (含起始码本身)
const MIN_SEQUENCE_HEADER_SIZE: usize = 21;

/// 探测命中分数, 略高于扩展名匹配
const AVS2_PROBE_SCORE: ProbeScore = SCORE_EXTENSION + 2;

/// 每个数据包的最大字节数
const RAW_PACKET_SIZE: usize = 1024;

/// 裸流时间基 (裸流不携带时间戳)
const RAW_TIME_BASE: Rational = Rational::new(1, 1_200_000);

/// 默认帧率
const DEFAULT_FRAME_RATE: Rational = Rational::new(25, 1);

/// 探测缓冲区是否为 AVS2 裸流
///
/// 返回 `SCORE_EXTENSION + 2` 表示识别, 0 表示不是.
///
/// - 只记录第一个序列头, 其后出现的任何结构单元都会结束扫描
/// - 序列头之后必须紧跟 AVS2 profile_id, 否则立即判定为否
/// - 序列头之前出现序列结束码立即判定为否
/// - 扫描结束时, 游标距序列头起始码至少 21 字节才算识别
pub fn avs2_probe(data: &[u8]) -> ProbeScore {
    let mut scanner = StartCodeScanner::new(data);
    let mut header_start: Option<usize> = None;

    while let Some(code) = scanner.next() {
        let unit = code.unit_type;
        if !unit.is_structural() {
            continue;
        }
        if header_start.is_some() {
            break;
        }
        if unit.is_sequence_header() {
            match data.get(code.end) {
                Some(&profile) if is_avs2_profile(profile) => {
                    header_start = Some(code.end - START_CODE_SIZE);
                }
                _ => return 0,
            }
        } else if unit.is_end_of_sequence() {
            return 0;
        }
    }

    match header_start {
        Some(start) if scanner.cursor() - start >= MIN_SEQUENCE_HEADER_SIZE => AVS2_PROBE_SCORE,
        _ => 0,
    }
}

/// AVS2 裸流格式探测器
pub struct Avs2Probe;

impl FormatProbe for Avs2Probe {
    fn probe(&self, data: &[u8], _filename: Option<&str>) -> Option<ProbeScore> {
        match avs2_probe(data) {
            0 => None,
            score => Some(score),
        }
    }

    fn format_id(&self) -> FormatId {
        FormatId::Avs2Es
    }
}

/// AVS2 裸流解封装器
pub struct Avs2EsDemuxer {
    /// 流信息
    streams: Vec<Stream>,
    /// 已输出的数据包数
    packet_count: u64,
}

impl Avs2EsDemuxer {
    /// 创建 AVS2 裸流解封装器实例 (工厂函数)
    pub fn create() -> Avs2Result<Box<dyn Demuxer>> {
        Ok(Box::new(Self {
            streams: Vec::new(),
            packet_count: 0,
        }))
    }
}

impl Demuxer for Avs2EsDemuxer {
    fn format_id(&self) -> FormatId {
        FormatId::Avs2Es
    }

    fn name(&self) -> &str {
        "avs2"
    }

    fn open(&mut self, _io: &mut IoContext) -> Avs2Result<()> {
        debug!("AVS2: 打开裸流");

        self.streams = vec![Stream {
            index: 0,
            media_type: MediaType::Video,
            codec_id: CodecId::Avs2,
            time_base: RAW_TIME_BASE,
            duration: -1,
            start_time: 0,
            nb_frames: 0,
            params: StreamParams::Video(VideoStreamParams {
                width: 0,  // 解码器从序列头中解析
                height: 0, // 解码器从序列头中解析
                pixel_format: PixelFormat::None,
                frame_rate: DEFAULT_FRAME_RATE,
                sample_aspect_ratio: Rational::new(1, 1),
                bit_rate: 0,
            }),
        }];
        self.packet_count = 0;
        Ok(())
    }

    fn streams(&self) -> &[Stream] {
        &self.streams
    }

    fn read_packet(&mut self, io: &mut IoContext) -> Avs2Result<Packet> {
        if self.streams.is_empty() {
            return Err(Avs2Error::InvalidArgument("解封装器尚未打开".into()));
        }

        let pos = io.position()?;
        let mut buf = vec![0u8; RAW_PACKET_SIZE];
        let read = io.read_partial(&mut buf)?;
        if read == 0 {
            debug!("AVS2: 到达末尾, 共 {} 个数据包", self.packet_count);
            return Err(Avs2Error::Eof);
        }
        buf.truncate(read);
        self.packet_count += 1;

        Ok(Packet {
            data: Bytes::from(buf),
            pts: NOPTS_VALUE,
            dts: NOPTS_VALUE,
            duration: 0,
            time_base: RAW_TIME_BASE,
            stream_index: 0,
            is_keyframe: false,
            pos: pos as i64,
        })
    }

    fn seek(
        &mut self,
        io: &mut IoContext,
        _stream_index: usize,
        timestamp: i64,
        flags: SeekFlags,
    ) -> Avs2Result<()> {
        if !flags.byte {
            return Err(Avs2Error::Unsupported("AVS2 裸流只支持按字节 seek".into()));
        }
        if timestamp < 0 {
            return Err(Avs2Error::InvalidArgument(format!(
                "无效的字节偏移: {}",
                timestamp
            )));
        }
        io.seek(std::io::SeekFrom::Start(timestamp as u64))?;
        Ok(())
    }

    fn duration(&self) -> Option<f64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryBackend;

    /// 构造: 序列头起始码 + profile + `filler` 个填充字节
    fn sequence_header(profile: u8, filler: usize) -> Vec<u8> {
        let mut data = vec![0x00, 0x00, 0x01, 0xB0, profile];
        data.extend(std::iter::repeat_n(0x5A, filler));
        data
    }

    #[test]
    fn test_probe_short_buffers() {
        assert_eq!(avs2_probe(&[]), 0);
        assert_eq!(avs2_probe(&[0x00]), 0);
        assert_eq!(avs2_probe(&[0x00, 0x00, 0x01]), 0);
    }

    #[test]
    fn test_probe_no_start_code() {
        assert_eq!(avs2_probe(&[0x5A; 256]), 0);
    }

    #[test]
    fn test_probe_valid_sequence_header() {
        let data = sequence_header(0x20, 17);
        assert_eq!(data.len(), 22);
        assert_eq!(avs2_probe(&data), SCORE_EXTENSION + 2);
    }

    #[test]
    fn test_probe_threshold_boundary() {
        let data = sequence_header(0x22, 16);
        assert_eq!(data.len(), 21);
        assert_eq!(avs2_probe(&data), SCORE_EXTENSION + 2);
        assert_eq!(avs2_probe(&data[..20]), 0);
    }

    #[test]
    fn test_probe_all_profiles() {
        for profile in [0x12, 0x20, 0x22, 0x30, 0x32] {
            assert_eq!(avs2_probe(&sequence_header(profile, 32)), 52, "0x{profile:02X}");
        }
    }

    #[test]
    fn test_probe_bad_profile_regardless_of_length() {
        assert_eq!(avs2_probe(&sequence_header(0x48, 17)), 0);
        assert_eq!(avs2_probe(&sequence_header(0x00, 4096)), 0);
    }

    #[test]
    fn test_probe_header_type_byte_is_last() {
        assert_eq!(avs2_probe(&[0x5A, 0x00, 0x00, 0x01, 0xB0]), 0);
    }

    #[test]
    fn test_probe_second_structural_unit_inside_window() {
        let mut data = vec![0x00, 0x00, 0x01, 0xB0, 0x20, 0x5A];
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3]);
        data.extend(std::iter::repeat_n(0x5A, 64));
        assert_eq!(avs2_probe(&data), 0);
    }

    #[test]
    fn test_probe_structural_unit_after_window() {
        let mut data = sequence_header(0x20, 20);
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB3, 0x00]);
        assert_eq!(avs2_probe(&data), 52);
    }

    #[test]
    fn test_scan_second_sequence_header_inside_window() {
        let mut data = sequence_header(0x20, 4);
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB0, 0x20]);
        data.extend(std::iter::repeat_n(0x5A, 64));
        assert_eq!(avs2_probe(&data), 0);
    }

    #[test]
    fn test_scan_end_of_sequence_inside_window() {
        let mut data = sequence_header(0x20, 4);
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB1]);
        data.extend(std::iter::repeat_n(0x5A, 64));
        assert_eq!(avs2_probe(&data), 0);
    }

    #[test]
    fn test_scan_second_sequence_header_after_window() {
        // 只以第一个序列头判定, 第二个序列头不再检查
        let mut data = sequence_header(0x20, 20);
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0xB0, 0x48]);
        data.extend(std::iter::repeat_n(0x5A, 16));
        assert_eq!(avs2_probe(&data), 52);
    }

    #[test]
    fn test_probe_slice_does_not_stop_scan() {
        let mut data = vec![0x00, 0x00, 0x01, 0xB0, 0x20];
        data.extend_from_slice(&[0x00, 0x00, 0x01, 0x05]);
        data.extend(std::iter::repeat_n(0x5A, 16));
        assert_eq!(avs2_probe(&data), 52);
    }

    #[test]
    fn test_probe_lone_end_of_sequence() {
        assert_eq!(avs2_probe(&[0x00, 0x00, 0x01, 0xB1]), 0);
        let mut data = vec![0x00, 0x00, 0x01, 0xB1];
        data.extend(sequence_header(0x20, 32));
        assert_eq!(avs2_probe(&data), 0);
    }

    #[test]
    fn test_probe_leading_garbage_and_user_data() {
        let mut data = vec![0x12, 0x34, 0x00, 0x00, 0x01, 0xB2, 0x01, 0x02];
        data.extend(sequence_header(0x30, 17));
        assert_eq!(avs2_probe(&data), 52);
    }

    #[test]
    fn test_probe_is_idempotent() {
        let data = sequence_header(0x20, 40);
        assert_eq!(avs2_probe(&data), avs2_probe(&data));
        let bad = sequence_header(0x20, 3);
        assert_eq!(avs2_probe(&bad), avs2_probe(&bad));
    }

    #[test]
    fn test_format_probe_wrapper() {
        assert_eq!(Avs2Probe.probe(&sequence_header(0x20, 17), None), Some(52));
        assert_eq!(Avs2Probe.probe(&[], Some("clip.avs2")), None);
        assert_eq!(Avs2Probe.format_id(), FormatId::Avs2Es);
    }

    fn open_demuxer(data: Vec<u8>) -> (Box<dyn Demuxer>, IoContext) {
        let backend = MemoryBackend::from_data(data);
        let mut io = IoContext::new(Box::new(backend));
        let mut demuxer = Avs2EsDemuxer::create().unwrap();
        demuxer.open(&mut io).unwrap();
        (demuxer, io)
    }

    #[test]
    fn test_demuxer_stream_info() {
        let (demuxer, _io) = open_demuxer(sequence_header(0x20, 64));
        let streams = demuxer.streams();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].codec_id, CodecId::Avs2);
        assert_eq!(streams[0].media_type, MediaType::Video);
        assert_eq!(streams[0].time_base, Rational::new(1, 1_200_000));
        let video = streams[0].video().unwrap();
        assert_eq!(video.frame_rate, Rational::new(25, 1));
        assert_eq!(video.pixel_format, PixelFormat::None);
        assert!(demuxer.duration().is_none());
    }

    #[test]
    fn test_demuxer_chunks_input() {
        let data: Vec<u8> = (0..2500u32).map(|i| i as u8).collect();
        let (mut demuxer, mut io) = open_demuxer(data.clone());

        let mut sizes = Vec::new();
        let mut collected = Vec::new();
        loop {
            match demuxer.read_packet(&mut io) {
                Ok(pkt) => {
                    assert_eq!(pkt.pts, NOPTS_VALUE);
                    assert_eq!(pkt.dts, NOPTS_VALUE);
                    assert_eq!(pkt.pos as usize, collected.len());
                    sizes.push(pkt.size());
                    collected.extend_from_slice(&pkt.data);
                }
                Err(Avs2Error::Eof) => break,
                Err(e) => panic!("读取失败: {e}"),
            }
        }
        assert_eq!(sizes, vec![1024, 1024, 452]);
        assert_eq!(collected, data);
    }

    #[test]
    fn test_demuxer_empty_input() {
        let (mut demuxer, mut io) = open_demuxer(Vec::new());
        assert!(matches!(demuxer.read_packet(&mut io), Err(Avs2Error::Eof)));
    }

    #[test]
    fn test_demuxer_byte_seek() {
        let data: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        let (mut demuxer, mut io) = open_demuxer(data.clone());
        demuxer.read_packet(&mut io).unwrap();

        demuxer.seek(&mut io, 0, 2000, SeekFlags::bytes()).unwrap();
        let pkt = demuxer.read_packet(&mut io).unwrap();
        assert_eq!(pkt.pos, 2000);
        assert_eq!(&pkt.data[..], &data[2000..]);
    }

    #[test]
    fn test_demuxer_time_seek_unsupported() {
        let (mut demuxer, mut io) = open_demuxer(vec![0u8; 16]);
        let err = demuxer
            .seek(&mut io, 0, 0, SeekFlags::default())
            .unwrap_err();
        assert!(matches!(err, Avs2Error::Unsupported(_)));
    }
}
