//! isom-probe - AAC 音频配置探测工具
//!
//! 从文件中读取 ADTS 帧头部或 MP4 `esds` 描述符, 输出解码后的 MPEG-4 音频配置.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use serde::Serialize;

use isom_codec::{Mpeg4AudioConfig, read_adts_header, read_mpeg4_audio_config};
use isom_core::ByteReader;
use isom_format::EsDescriptor;
use isom_format::esds::ES_DESCR_TAG;

/// AAC 音频配置探测工具
#[derive(Parser, Debug)]
#[command(name = "isom-probe", version, about = "AAC 音频配置探测工具")]
struct Cli {
    /// 输入文件路径
    input: PathBuf,

    /// 输入类型
    #[arg(long, value_enum, default_value_t = InputKind::Auto)]
    kind: InputKind,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 日志详细程度 (-v=debug, -vv=trace), RUST_LOG 可覆盖
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// 输入数据类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum InputKind {
    /// 按内容自动识别
    Auto,
    /// ADTS 裸流 (读取第一个帧头部)
    Adts,
    /// ES_Descriptor 字节, 可带 esds box 头部
    Esds,
}

// ============================================================
// JSON 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize)]
struct ProbeOutput {
    input: String,
    kind: &'static str,
    audio: AudioInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    adts: Option<AdtsInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    es_descriptor: Option<EsInfo>,
}

/// MPEG-4 音频配置
#[derive(Serialize)]
struct AudioInfo {
    object_type: u32,
    sample_rate_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
    channel_config: u32,
    channel_count: u32,
}

/// ADTS 帧信息
#[derive(Serialize)]
struct AdtsInfo {
    frame_length: u32,
}

/// ES_Descriptor 信息
#[derive(Serialize)]
struct EsInfo {
    es_id: u16,
    stream_priority: u8,
    object_type_indication: u8,
    stream_type: u8,
    buffer_size_db: u32,
    max_bitrate: u32,
    avg_bitrate: u32,
    decoder_specific_info: String,
}

// ============================================================
// 主逻辑
// ============================================================

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

/// 初始化日志, 默认 warn, 通过 -v 提升
fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<()> {
    let data = std::fs::read(&cli.input)
        .with_context(|| format!("无法读取文件 '{}'", cli.input.display()))?;
    info!("输入文件: {} ({} 字节)", cli.input.display(), data.len());

    let kind = match cli.kind {
        InputKind::Auto => detect_kind(&data)?,
        kind => kind,
    };
    debug!("输入类型: {:?}", kind);

    let output = match kind {
        InputKind::Adts => probe_adts(cli, &data)?,
        InputKind::Esds => probe_esds(cli, &data)?,
        InputKind::Auto => unreachable!("detect_kind 不会返回 Auto"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("序列化 JSON 失败")?;
        println!("{json}");
    } else {
        print_text(&output);
    }
    Ok(())
}

/// 按内容识别输入类型
fn detect_kind(data: &[u8]) -> Result<InputKind> {
    if data.len() >= 2 && data[0] == 0xFF && data[1] & 0xF0 == 0xF0 {
        return Ok(InputKind::Adts);
    }
    if strip_esds_box(data).first() == Some(&ES_DESCR_TAG) {
        return Ok(InputKind::Esds);
    }
    bail!("无法识别输入类型, 请通过 --kind 指定")
}

/// 数据以完整 esds box 开头时 (size + "esds" + version/flags), 返回其后的描述符字节
fn strip_esds_box(data: &[u8]) -> &[u8] {
    let mut r = ByteReader::new(data);
    let is_box = r.skip(4).is_ok()
        && r.read_bytes(4).is_ok_and(|box_type| box_type == b"esds")
        && r.skip(4).is_ok();
    if is_box { r.read_to_end() } else { data }
}

fn probe_adts(cli: &Cli, data: &[u8]) -> Result<ProbeOutput> {
    let header = read_adts_header(data).context("解析 ADTS 头部失败")?;
    Ok(ProbeOutput {
        input: cli.input.display().to_string(),
        kind: "adts",
        audio: audio_info(&header.to_audio_config()),
        adts: Some(AdtsInfo {
            frame_length: header.frame_length,
        }),
        es_descriptor: None,
    })
}

fn probe_esds(cli: &Cli, data: &[u8]) -> Result<ProbeOutput> {
    let mut r = ByteReader::new(strip_esds_box(data));
    let es = EsDescriptor::read(&mut r).context("解析 ES_Descriptor 失败")?;
    let dc = &es.decoder_config;
    let config = read_mpeg4_audio_config(dc.decoder_specific_info)
        .context("解析 DecoderSpecificInfo 失败")?;

    Ok(ProbeOutput {
        input: cli.input.display().to_string(),
        kind: "esds",
        audio: audio_info(&config.complete()),
        adts: None,
        es_descriptor: Some(EsInfo {
            es_id: es.es_id,
            stream_priority: es.flags.stream_priority(),
            object_type_indication: dc.object_type_indication,
            stream_type: dc.stream_type,
            buffer_size_db: dc.buffer_size_db,
            max_bitrate: dc.max_bitrate,
            avg_bitrate: dc.avg_bitrate,
            decoder_specific_info: to_hex(dc.decoder_specific_info),
        }),
    })
}

fn audio_info(config: &Mpeg4AudioConfig) -> AudioInfo {
    AudioInfo {
        object_type: config.object_type,
        sample_rate_index: config.sample_rate_index,
        sample_rate: config.sample_rate_hz(),
        channel_config: config.channel_config,
        channel_count: config.channel_count,
    }
}

fn to_hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}

/// 文本输出
fn print_text(output: &ProbeOutput) {
    println!("[INPUT]");
    println!("  文件         : {}", output.input);
    println!("  类型         : {}", output.kind);
    println!("[/INPUT]");
    println!();

    let audio = &output.audio;
    println!("[AUDIO]");
    println!("  对象类型     : {}", audio.object_type);
    println!("  采样率索引   : {}", audio.sample_rate_index);
    match audio.sample_rate {
        Some(rate) => println!("  采样率       : {rate} Hz"),
        None => println!("  采样率       : 保留值"),
    }
    println!("  声道配置     : {}", audio.channel_config);
    println!("  声道数       : {}", audio.channel_count);
    println!("[/AUDIO]");
    println!();

    if let Some(ref adts) = output.adts {
        println!("[ADTS]");
        println!("  帧长度       : {} 字节", adts.frame_length);
        println!("[/ADTS]");
        println!();
    }

    if let Some(ref es) = output.es_descriptor {
        println!("[ES_DESCRIPTOR]");
        println!("  ES_ID        : {}", es.es_id);
        println!("  优先级       : {}", es.stream_priority);
        println!("  OTI          : 0x{:02X}", es.object_type_indication);
        println!("  流类型       : 0x{:02X}", es.stream_type);
        println!("  缓冲区大小   : {}", es.buffer_size_db);
        if es.max_bitrate > 0 {
            println!("  最大码率     : {} kbps", es.max_bitrate / 1000);
        }
        if es.avg_bitrate > 0 {
            println!("  平均码率     : {} kbps", es.avg_bitrate / 1000);
        }
        println!("  DSI          : {}", es.decoder_specific_info);
        println!("[/ES_DESCRIPTOR]");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            detect_kind(&[0xFF, 0xF1, 0x50, 0x80]).unwrap(),
            InputKind::Adts
        );
        assert_eq!(detect_kind(&[0x03, 0x16, 0x00]).unwrap(), InputKind::Esds);

        let mut boxed = vec![0x00, 0x00, 0x00, 0x24];
        boxed.extend_from_slice(b"esds");
        boxed.extend_from_slice(&[0, 0, 0, 0, 0x03, 0x16]);
        assert_eq!(detect_kind(&boxed).unwrap(), InputKind::Esds);

        assert!(detect_kind(&[0x00, 0x01]).is_err());
        assert!(detect_kind(&[]).is_err());
    }

    #[test]
    fn test_strip_esds_box() {
        let mut boxed = vec![0x00, 0x00, 0x00, 0x0E];
        boxed.extend_from_slice(b"esds");
        boxed.extend_from_slice(&[0, 0, 0, 0, 0x05, 0x00]);
        assert_eq!(strip_esds_box(&boxed), &[0x05, 0x00]);
        assert_eq!(strip_esds_box(&[0x03, 0x00]), &[0x03, 0x00]);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0x12, 0x10, 0xAB]), "1210ab");
        assert_eq!(to_hex(&[]), "");
    }
}
