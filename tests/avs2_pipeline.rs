//! 端到端集成测试: AVS2 裸流的完整处理管线.
//!
//! 测试流程: 生成视频帧 → libxavs2 适配器编码 → 写入裸流文件 → 探测 →
//! 解封装 → libdavs2 适配器解码 → 验证.
//!
//! 引擎使用一对玩具实现: 编码端输出带真实起始码结构的单元,
//! 解码端按起始码切分单元并还原图像. 图像负载不做防竞争处理,
//! 因此字段取值避免出现 `00 00 01`.

use std::collections::HashMap;

use avs2::codec::engine::{
    DecodeStep, DecoderConfig, DecoderEngine, EncodedPacket, EncoderApi, EncoderEngine,
    EncoderParams, EngineOutput, EnginePacket, EnginePicture, EnginePictureType, InputImage,
    InputPicture, PacketState, SequenceInfo,
};
use avs2::codec::frame_rate::frame_rate_from_code;
use avs2::codec::parsers::avs2::{StartCodeScanner, UnitType};
use avs2::codec::{
    CodecId, CodecParameters, CodecRegistry, Encoder, Frame, Packet, PictureType, VideoCodecParams,
    VideoFrame,
};
use avs2::core::{Avs2Error, PixelFormat, Rational};
use avs2::format::{FormatId, IoContext, SCORE_EXTENSION, avs2_probe};

const WIDTH: u32 = 64;
const HEIGHT: u32 = 32;
const GOP: u32 = 4;

// ============================================================
// 玩具编码引擎
// ============================================================

struct ToyApi;

#[derive(Default)]
struct ToyParams {
    values: HashMap<String, String>,
}

impl EncoderParams for ToyParams {
    fn set(&mut self, key: &str, value: &str) -> Result<(), i32> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

struct ToyEncoder {
    width: usize,
    height: usize,
    gop: u32,
    frame_rate_code: u8,
    header_sent: bool,
    count: u32,
    out: Vec<u8>,
}

impl EncoderApi for ToyApi {
    type Params = ToyParams;
    type Engine = ToyEncoder;

    fn load(bit_depth: u32) -> Option<Self> {
        (bit_depth == 8).then_some(ToyApi)
    }

    fn alloc_params(&self) -> Option<ToyParams> {
        Some(ToyParams::default())
    }

    fn create_encoder(&self, params: &ToyParams) -> Option<ToyEncoder> {
        let int = |key: &str| params.get(key)?.parse::<u32>().ok();
        Some(ToyEncoder {
            width: int("Width")? as usize,
            height: int("Height")? as usize,
            gop: int("IntraPeriodMax")?,
            frame_rate_code: int("FrameRate")? as u8,
            header_sent: false,
            count: 0,
            out: Vec::new(),
        })
    }
}

impl EncoderEngine for ToyEncoder {
    fn get_buffer(&mut self) -> Result<InputPicture, i32> {
        let (w, h) = (self.width, self.height);
        let widths = [w, w / 2, w / 2];
        let lines = [h, h / 2, h / 2];
        Ok(InputPicture {
            image: InputImage {
                planes: [0, 1, 2].map(|p| vec![0u8; widths[p] * lines[p]]),
                strides: widths,
                widths,
                lines,
                in_sample_size: 1,
                enc_sample_size: 1,
            },
            ..Default::default()
        })
    }

    fn encode(&mut self, picture: Option<InputPicture>) -> Result<EncodedPacket<'_>, i32> {
        let Some(picture) = picture else {
            return Ok(EncodedPacket {
                data: &[],
                pts: 0,
                dts: 0,
                state: PacketState::FlushEnd,
            });
        };

        self.out.clear();
        if !self.header_sent {
            self.out.extend_from_slice(&[0x00, 0x00, 0x01, 0xB0, 0x20, 0x42]);
            self.out.extend_from_slice(&(self.width as u16).to_be_bytes());
            self.out.extend_from_slice(&(self.height as u16).to_be_bytes());
            self.out.extend_from_slice(&[8, self.frame_rate_code]);
            self.out.extend_from_slice(&[0xFF; 16]);
            self.header_sent = true;
        }

        let intra = self.count % self.gop == 0;
        self.out
            .extend_from_slice(&[0x00, 0x00, 0x01, if intra { 0xB3 } else { 0xB6 }]);
        self.out.push(if intra { b'I' } else { b'P' });
        self.out.extend_from_slice(format!("{};", picture.pts).as_bytes());
        self.out.push(picture.image.planes[0][0]);
        self.out.extend_from_slice(&[0xEE; 32]);
        self.count += 1;

        Ok(EncodedPacket {
            data: &self.out,
            pts: picture.pts,
            dts: picture.pts,
            state: PacketState::Normal,
        })
    }
}

// ============================================================
// 玩具解码引擎 (一帧延迟输出)
// ============================================================

struct ToyPicture {
    planes: [Vec<u8>; 3],
    pts: i64,
    kind: EnginePictureType,
}

struct ToyDecoder {
    header: Option<SequenceInfo>,
    delayed: Option<ToyPicture>,
    out: Option<ToyPicture>,
}

impl ToyDecoder {
    fn emit(&mut self, picture: ToyPicture) -> Option<EngineOutput<'_>> {
        self.out = Some(picture);
        let info = self.header?;
        let pic = self.out.as_ref()?;
        let (w, h) = (info.width as usize, info.height as usize);
        Some(EngineOutput::Picture(EnginePicture {
            planes: [&pic.planes[0], &pic.planes[1], &pic.planes[2]],
            widths: [w, w / 2, w / 2],
            lines: [h, h / 2, h / 2],
            bytes_per_sample: 1,
            pts: pic.pts,
            picture_type: pic.kind,
        }))
    }
}

impl DecoderEngine for ToyDecoder {
    fn open(_config: &DecoderConfig) -> Option<Self> {
        Some(Self {
            header: None,
            delayed: None,
            out: None,
        })
    }

    fn decode(&mut self, packet: &EnginePacket<'_>) -> Result<DecodeStep<'_>, i32> {
        let data = packet.data;
        let mut scanner = StartCodeScanner::new(data);
        let Some(first) = scanner.next() else {
            return Ok(DecodeStep {
                consumed: data.len().saturating_sub(3),
                output: None,
            });
        };
        if first.end > 4 {
            return Ok(DecodeStep {
                consumed: first.end - 4,
                output: None,
            });
        }
        let Some(next) = scanner.next() else {
            // 单元尚不完整
            return Ok(DecodeStep {
                consumed: 0,
                output: None,
            });
        };
        let consumed = next.end - 4;
        let unit = &data[first.end..consumed];

        match first.unit_type {
            UnitType::SequenceHeader => {
                let width = u16::from_be_bytes([unit[2], unit[3]]);
                let height = u16::from_be_bytes([unit[4], unit[5]]);
                let frame_rate = frame_rate_from_code(unit[7]).ok_or(-22)?;
                let info = SequenceInfo {
                    width: u32::from(width),
                    height: u32::from(height),
                    output_bit_depth: u32::from(unit[6]),
                    frame_rate: frame_rate.to_f64(),
                };
                self.header = Some(info);
                Ok(DecodeStep {
                    consumed,
                    output: Some(EngineOutput::Header(info)),
                })
            }
            UnitType::IntraPicture | UnitType::InterPicture => {
                let info = self.header.ok_or(-1)?;
                let kind = if unit[0] == b'I' {
                    EnginePictureType::I
                } else {
                    EnginePictureType::P
                };
                let sep = unit.iter().position(|&b| b == b';').ok_or(-22)?;
                let pts = std::str::from_utf8(&unit[1..sep])
                    .ok()
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or(-22)?;
                let fill = unit[sep + 1];
                let luma = (info.width * info.height) as usize;
                let picture = ToyPicture {
                    planes: [vec![fill; luma], vec![0x80; luma / 4], vec![0x80; luma / 4]],
                    pts,
                    kind,
                };
                let output = match self.delayed.replace(picture) {
                    Some(previous) => self.emit(previous),
                    None => None,
                };
                Ok(DecodeStep { consumed, output })
            }
            _ => Ok(DecodeStep {
                consumed,
                output: None,
            }),
        }
    }

    fn flush(&mut self) -> Result<Option<EngineOutput<'_>>, i32> {
        match self.delayed.take() {
            Some(picture) => Ok(self.emit(picture)),
            None => Ok(None),
        }
    }
}

// ============================================================
// 辅助函数
// ============================================================

fn codec_registry() -> CodecRegistry {
    avs2::default_codec_registry::<ToyDecoder, ToyApi>()
}

fn make_frame(index: u8) -> Frame {
    let mut frame = VideoFrame::alloc(WIDTH, HEIGHT, PixelFormat::Yuv420p).unwrap();
    frame.data[0].fill(0x20 + index);
    frame.pts = i64::from(index);
    Frame::Video(frame)
}

fn encoder_params() -> CodecParameters {
    CodecParameters::new_video(
        CodecId::Avs2,
        VideoCodecParams {
            width: WIDTH,
            height: HEIGHT,
            pixel_format: PixelFormat::Yuv420p,
            frame_rate: Rational::new(25, 1),
            gop_size: GOP,
            ..Default::default()
        },
    )
}

/// 编码 `count` 帧, 返回拼接后的裸流 (以序列结束码收尾)
fn encode_stream(count: u8) -> Vec<u8> {
    let registry = codec_registry();
    let mut encoder = registry.create_encoder(CodecId::Avs2).unwrap();
    encoder.set_option("qp", "30").unwrap();
    encoder.open(&encoder_params()).unwrap();

    let mut stream = Vec::new();
    for i in 0..count {
        encoder.send_frame(Some(&make_frame(i))).unwrap();
        drain_packets(encoder.as_mut(), &mut stream);
    }
    encoder.send_frame(None).unwrap();
    drain_packets(encoder.as_mut(), &mut stream);

    stream.extend_from_slice(&[0x00, 0x00, 0x01, 0xB1]);
    stream
}

fn drain_packets(encoder: &mut dyn Encoder, stream: &mut Vec<u8>) {
    loop {
        match encoder.receive_packet() {
            Ok(pkt) => stream.extend_from_slice(&pkt.data),
            Err(Avs2Error::NeedMoreData) | Err(Avs2Error::Eof) => break,
            Err(e) => panic!("编码失败: {e}"),
        }
    }
}

/// 解封装并解码全部数据, 返回解码出的帧
fn demux_and_decode(path: &str) -> (Vec<Frame>, usize) {
    let formats = avs2::default_format_registry();
    let mut io = IoContext::open_read(path).unwrap();
    let mut demuxer = formats.open_input(&mut io, Some(path)).unwrap();
    assert_eq!(demuxer.format_id(), FormatId::Avs2Es);

    let stream = &demuxer.streams()[0];
    let params = CodecParameters::new_video(stream.codec_id, VideoCodecParams::default());
    let mut decoder = codec_registry().create_decoder(stream.codec_id).unwrap();
    decoder.open(&params).unwrap();

    let mut frames = Vec::new();
    let mut packets = 0;
    loop {
        let pkt = match demuxer.read_packet(&mut io) {
            Ok(pkt) => pkt,
            Err(Avs2Error::Eof) => break,
            Err(e) => panic!("读取数据包失败: {e}"),
        };
        packets += 1;
        decoder.send_packet(&pkt).unwrap();
        loop {
            match decoder.receive_frame() {
                Ok(frame) => frames.push(frame),
                Err(Avs2Error::NeedMoreData) => break,
                Err(e) => panic!("解码失败: {e}"),
            }
        }
    }

    decoder.send_packet(&Packet::empty()).unwrap();
    loop {
        match decoder.receive_frame() {
            Ok(frame) => frames.push(frame),
            Err(Avs2Error::Eof) => break,
            Err(e) => panic!("刷新失败: {e}"),
        }
    }
    (frames, packets)
}

// ============================================================
// 测试
// ============================================================

#[test]
fn test_encoded_stream_is_recognised() {
    let stream = encode_stream(3);
    assert_eq!(avs2_probe(&stream), SCORE_EXTENSION + 2);

    let formats = avs2::default_format_registry();
    let result = formats.probe(&stream, None).unwrap();
    assert_eq!(result.format_id, FormatId::Avs2Es);
    assert_eq!(result.score, 52);
}

#[test]
fn test_encode_demux_decode_round_trip() {
    let _ = env_logger::builder().is_test(true).try_init();
    // 帧数足够多, 让单元跨越多个 1024 字节的数据包
    let count = 60u8;
    let stream = encode_stream(count);
    assert!(stream.len() > 2048);

    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), &stream).unwrap();
    let path = file.path().to_string_lossy().to_string();

    let (frames, packets) = demux_and_decode(&path);
    assert_eq!(packets, stream.len().div_ceil(1024));
    assert_eq!(frames.len(), usize::from(count));

    for (i, frame) in frames.iter().enumerate() {
        let video = frame.video().unwrap();
        assert_eq!(video.pts, i as i64);
        assert_eq!((video.width, video.height), (WIDTH, HEIGHT));
        assert_eq!(video.pixel_format, PixelFormat::Yuv420p);
        assert_eq!(video.time_base, Rational::new(1, 25));
        assert!(video.data[0].iter().all(|&v| v == 0x20 + i as u8));
        assert_eq!(video.linesize, vec![64, 32, 32]);

        let intra = i as u32 % GOP == 0;
        assert_eq!(video.is_keyframe, intra, "帧 {i}");
        let expected = if intra { PictureType::I } else { PictureType::P };
        assert_eq!(video.picture_type, expected);
    }
}

#[test]
fn test_extension_fallback_for_unrecognised_content() {
    let formats = avs2::default_format_registry();
    // 序列头后紧跟另一个结构单元, 内容探测失败
    let data = [0x00, 0x00, 0x01, 0xB0, 0x20, 0x00, 0x00, 0x01, 0xB3, 0x00];
    assert_eq!(avs2_probe(&data), 0);
    assert!(formats.probe(&data, None).is_none());

    let result = formats.probe(&data, Some("clip.avs")).unwrap();
    assert_eq!(result.format_id, FormatId::Avs2Es);
    assert_eq!(result.score, SCORE_EXTENSION);
}

#[test]
fn test_unrecognised_input_fails_to_open() {
    let formats = avs2::default_format_registry();
    let mut io = IoContext::from_memory(vec![0x47u8; 4096]);
    let err = formats.open_input(&mut io, Some("clip.ts")).err().unwrap();
    assert!(matches!(err, Avs2Error::FormatNotFound(_)));
}

#[test]
fn test_registries_list_adapters() {
    let codecs = codec_registry();
    assert_eq!(codecs.list_decoders(), vec![(CodecId::Avs2, "libdavs2")]);
    assert_eq!(codecs.list_encoders(), vec![(CodecId::Avs2, "libxavs2")]);
    assert!(codecs.create_decoder_by_name("libdavs2").is_ok());

    let formats = avs2::default_format_registry();
    assert_eq!(formats.list_demuxers(), vec![(FormatId::Avs2Es, "avs2")]);
}
