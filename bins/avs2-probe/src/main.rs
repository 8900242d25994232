//! avs2-probe - AVS2 裸流信息探测工具
//!
//! 对标 FFmpeg 的 ffprobe, 识别 AVS2 裸流并输出格式、流与数据包信息.

mod logging;

use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use serde::Serialize;

use avs2_core::{Avs2Error, Timestamp};
use avs2_format::stream::StreamParams;
use avs2_format::{Demuxer, FormatRegistry, IoContext, Stream};

/// AVS2 裸流信息探测工具
#[derive(Parser, Debug)]
#[command(name = "avs2-probe", version, about = "AVS2/IEEE 1857.4 裸流探测工具")]
struct Cli {
    /// 输入文件路径
    input: String,

    /// 只对文件头部运行探测器, 输出分数后退出
    #[arg(long)]
    score_only: bool,

    /// 列出每个数据包 (会读取全部数据)
    #[arg(long)]
    show_packets: bool,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 静默模式 (控制台只输出错误日志)
    #[arg(short, long)]
    quiet: bool,

    /// 日志详细程度 (-v/-vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 完整探测结果
#[derive(Serialize)]
struct ProbeOutput {
    format: FormatInfo,
    streams: Vec<StreamInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    packets: Option<PacketReport>,
}

/// 格式信息
#[derive(Serialize)]
struct FormatInfo {
    filename: String,
    format_name: String,
    format_long_name: String,
    probe_score: u32,
    nb_streams: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

/// 流信息
#[derive(Serialize)]
struct StreamInfo {
    index: usize,
    codec_type: String,
    codec_name: String,
    codec_long_name: String,
    time_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pixel_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_rate: Option<String>,
}

/// 单个数据包
#[derive(Serialize)]
struct PacketInfo {
    stream_index: usize,
    pts: String,
    pos: i64,
    size: usize,
}

/// 数据包列表与统计
#[derive(Serialize)]
struct PacketReport {
    total_packets: u64,
    total_bytes: u64,
    packets: Vec<PacketInfo>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init("avs2-probe", cli.verbose, cli.quiet) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    if let Err(e) = run(&cli) {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let registry = format_registry();
    let mut io = IoContext::open_read(&cli.input)
        .with_context(|| format!("无法打开文件 '{}'", cli.input))?;

    if cli.score_only {
        return print_score(&mut io, &cli.input, cli.json);
    }

    let probe = registry
        .probe_input(&mut io, Some(&cli.input))
        .context("无法识别文件格式")?;
    info!("{}: 格式 {} (score={})", cli.input, probe.format_id, probe.score);

    let mut demuxer = registry
        .create_demuxer(probe.format_id)
        .context("无法创建解封装器")?;
    demuxer.open(&mut io).context("无法解析文件头部")?;

    let format = FormatInfo {
        filename: cli.input.clone(),
        format_name: probe.format_id.name().to_string(),
        format_long_name: probe.format_id.long_name().to_string(),
        probe_score: probe.score,
        nb_streams: demuxer.streams().len(),
        duration: demuxer.duration(),
        size: io.size(),
    };
    let streams = demuxer.streams().iter().map(build_stream_info).collect();
    let packets = if cli.show_packets {
        Some(collect_packets(demuxer.as_mut(), &mut io))
    } else {
        None
    };

    let output = ProbeOutput {
        format,
        streams,
        packets,
    };
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&output);
    }
    Ok(())
}

fn format_registry() -> FormatRegistry {
    let mut registry = FormatRegistry::new();
    avs2_format::register_all(&mut registry);
    registry
}

/// 只运行 AVS2 探测器
fn print_score(io: &mut IoContext, filename: &str, json: bool) -> Result<()> {
    const PROBE_SIZE: usize = 8192;
    let mut buf = vec![0u8; PROBE_SIZE];
    let read = io.read_partial(&mut buf)?;
    let score = avs2_format::avs2_probe(&buf[..read]);
    debug!("探测 {} 字节, score={}", read, score);

    if json {
        let value = serde_json::json!({ "filename": filename, "score": score });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{filename}: {score}");
    }
    Ok(())
}

fn build_stream_info(stream: &Stream) -> StreamInfo {
    let mut info = StreamInfo {
        index: stream.index,
        codec_type: match stream.media_type {
            avs2_core::MediaType::Video => "video",
            avs2_core::MediaType::Data => "data",
        }
        .to_string(),
        codec_name: stream.codec_id.name().to_string(),
        codec_long_name: stream.codec_id.long_name().to_string(),
        time_base: stream.time_base.to_string(),
        pixel_format: None,
        frame_rate: None,
    };
    if let StreamParams::Video(video) = &stream.params {
        info.pixel_format = Some(video.pixel_format.to_string());
        if video.frame_rate.is_valid() {
            info.frame_rate = Some(video.frame_rate.to_string());
        }
    }
    info
}

fn collect_packets(demuxer: &mut dyn Demuxer, io: &mut IoContext) -> PacketReport {
    let mut report = PacketReport {
        total_packets: 0,
        total_bytes: 0,
        packets: Vec::new(),
    };
    loop {
        match demuxer.read_packet(io) {
            Ok(pkt) => {
                report.total_packets += 1;
                report.total_bytes += pkt.size() as u64;
                report.packets.push(PacketInfo {
                    stream_index: pkt.stream_index,
                    pts: Timestamp::new(pkt.pts, pkt.time_base).to_string(),
                    pos: pkt.pos,
                    size: pkt.size(),
                });
            }
            Err(Avs2Error::Eof) => break,
            Err(e) => {
                warn!("读取数据包时出错: {}", e);
                break;
            }
        }
    }
    report
}

fn print_text(output: &ProbeOutput) {
    let format = &output.format;
    println!("[FORMAT]");
    println!("  文件名       : {}", format.filename);
    println!(
        "  格式名称     : {} ({})",
        format.format_name, format.format_long_name
    );
    println!("  探测置信度   : {}", format.probe_score);
    println!("  流数量       : {}", format.nb_streams);
    if let Some(size) = format.size {
        println!("  大小         : {size} 字节");
    }
    if let Some(dur) = format.duration {
        println!("  时长         : {dur:.3} 秒");
    }
    println!("[/FORMAT]");

    for stream in &output.streams {
        println!();
        println!("[STREAM #{}]", stream.index);
        println!("  类型         : {}", stream.codec_type);
        println!(
            "  编解码器     : {} ({})",
            stream.codec_name, stream.codec_long_name
        );
        println!("  时间基       : {}", stream.time_base);
        if let Some(ref pf) = stream.pixel_format {
            println!("  像素格式     : {pf}");
        }
        if let Some(ref fr) = stream.frame_rate {
            println!("  帧率         : {fr}");
        }
        println!("[/STREAM]");
    }

    if let Some(report) = &output.packets {
        println!();
        for pkt in &report.packets {
            println!(
                "packet stream={} pts={} pos={} size={}",
                pkt.stream_index, pkt.pts, pkt.pos, pkt.size
            );
        }
        println!(
            "[PACKETS] 共 {} 个, {} 字节",
            report.total_packets, report.total_bytes
        );
    }
}
