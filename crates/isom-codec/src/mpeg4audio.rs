//! MPEG-4 音频配置 (ISO 14496-3 AudioSpecificConfig 前缀) 的位域编解码.
//!
//! # 位流结构 (MSB first)
//! ```text
//! audioObjectType          5 bits  (== 31 时再读 6 bits, 值为 32 + ext)
//! samplingFrequencyIndex   4 bits  (== 15 时再读 24 bits, 作为显式采样率)
//! channelConfiguration     4 bits
//! [补零到字节边界]
//! ```
//!
//! 编码结果最短 13 位 (2 字节), 两个转义同时出现时 48 位 (6 字节).

use isom_core::{BitReader, BitWriter, IsomError, IsomResult};
use log::debug;

// ============================================================
// 音频对象类型 (Audio Object Type)
// ============================================================

/// AAC Main
pub const AOT_AAC_MAIN: u32 = 1;
/// AAC Low Complexity
pub const AOT_AAC_LC: u32 = 2;
/// AAC Scalable Sample Rate
pub const AOT_AAC_SSR: u32 = 3;
/// AAC Long Term Prediction
pub const AOT_AAC_LTP: u32 = 4;
/// Spectral Band Replication (HE-AAC)
pub const AOT_SBR: u32 = 5;
/// AAC Scalable
pub const AOT_AAC_SCALABLE: u32 = 6;
/// Twin Vector Quantizer
pub const AOT_TWINVQ: u32 = 7;
/// Code Excited Linear Prediction
pub const AOT_CELP: u32 = 8;
/// Harmonic Vector eXcitation Coding
pub const AOT_HVXC: u32 = 9;
/// Text-To-Speech Interface
pub const AOT_TTSI: u32 = 12;
/// Main Synthesis
pub const AOT_MAINSYNTH: u32 = 13;
/// Wavetable Synthesis
pub const AOT_WAVESYNTH: u32 = 14;
/// General MIDI
pub const AOT_MIDI: u32 = 15;
/// Algorithmic Synthesis and Audio Effects
pub const AOT_SAFX: u32 = 16;
/// Error Resilient AAC Low Complexity
pub const AOT_ER_AAC_LC: u32 = 17;
/// Error Resilient AAC Long Term Prediction
pub const AOT_ER_AAC_LTP: u32 = 19;
/// Error Resilient AAC Scalable
pub const AOT_ER_AAC_SCALABLE: u32 = 20;
/// Error Resilient Twin Vector Quantizer
pub const AOT_ER_TWINVQ: u32 = 21;
/// Error Resilient Bit-Sliced Arithmetic Coding
pub const AOT_ER_BSAC: u32 = 22;
/// Error Resilient AAC Low Delay
pub const AOT_ER_AAC_LD: u32 = 23;
/// Error Resilient CELP
pub const AOT_ER_CELP: u32 = 24;
/// Error Resilient HVXC
pub const AOT_ER_HVXC: u32 = 25;
/// Error Resilient Harmonic and Individual Lines plus Noise
pub const AOT_ER_HILN: u32 = 26;
/// Error Resilient Parametric
pub const AOT_ER_PARAM: u32 = 27;
/// SinuSoidal Coding
pub const AOT_SSC: u32 = 28;
/// Parametric Stereo
pub const AOT_PS: u32 = 29;
/// MPEG Surround
pub const AOT_SURROUND: u32 = 30;
/// 转义值: 5 位字段等于此值时后跟 6 位扩展
pub const AOT_ESCAPE: u32 = 31;
/// Layer 1
pub const AOT_L1: u32 = 32;
/// Layer 2
pub const AOT_L2: u32 = 33;
/// Layer 3
pub const AOT_L3: u32 = 34;
/// Direct Stream Transfer
pub const AOT_DST: u32 = 35;
/// Audio LosslesS
pub const AOT_ALS: u32 = 36;
/// Scalable LosslesS
pub const AOT_SLS: u32 = 37;
/// Scalable LosslesS (non core)
pub const AOT_SLS_NON_CORE: u32 = 38;
/// Error Resilient Enhanced Low Delay
pub const AOT_ER_AAC_ELD: u32 = 39;
/// Symbolic Music Representation Simple
pub const AOT_SMR_SIMPLE: u32 = 40;
/// Symbolic Music Representation Main
pub const AOT_SMR_MAIN: u32 = 41;
/// Unified Speech and Audio Coding (no SBR)
pub const AOT_USAC_NOSBR: u32 = 42;
/// Spatial Audio Object Coding
pub const AOT_SAOC: u32 = 43;
/// Low Delay MPEG Surround
pub const AOT_LD_SURROUND: u32 = 44;
/// Unified Speech and Audio Coding
pub const AOT_USAC: u32 = 45;

/// 6 位扩展字段可表示的最大对象类型
pub const MAX_OBJECT_TYPE: u32 = 32 + 0x3F;

// ============================================================
// 查找表
// ============================================================

/// 采样率索引表 (ISO 14496-3)
pub const SAMPLE_RATE_TABLE: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// 声道配置 → 声道数
pub const CHANNEL_COUNT_TABLE: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 8];

/// 采样率索引的转义值: 后跟 24 位显式采样率
pub const SAMPLE_RATE_INDEX_ESCAPE: u32 = 0xF;

/// MPEG-4 音频配置
///
/// `sample_rate_index` 与 `channel_config` 是写入码流的权威字段,
/// `sample_rate` 与 `channel_count` 只是便于使用的投影, 两者只有在调用
/// [`complete`](Self::complete) 或 [`resolve`](Self::resolve) 之后才保证一致.
///
/// `sample_rate_index >= 15` 表示显式采样率 (单位 Hz), 而非表索引.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mpeg4AudioConfig {
    /// 采样率 (Hz), 由索引查表得出
    pub sample_rate: u32,
    /// 声道数, 由声道配置查表得出
    pub channel_count: u32,
    /// 音频对象类型 (1=AAC Main, 2=AAC LC, ...)
    pub object_type: u32,
    /// 采样率索引 (0-12 为表索引, >= 15 为显式采样率)
    pub sample_rate_index: u32,
    /// 声道配置 (0 表示声道布局由带内 PCE 给出)
    pub channel_config: u32,
}

impl Mpeg4AudioConfig {
    /// 由权威字段正向查表, 填充 `sample_rate` 与 `channel_count`
    ///
    /// 索引不在表内时对应的投影字段保持原值.
    pub fn complete(&self) -> Self {
        let mut config = *self;
        if let Some(&rate) = SAMPLE_RATE_TABLE.get(config.sample_rate_index as usize) {
            config.sample_rate = rate;
        }
        if let Some(&count) = CHANNEL_COUNT_TABLE.get(config.channel_config as usize) {
            config.channel_count = count;
        }
        config
    }

    /// 反向查表, 为值为 0 的 `sample_rate_index` / `channel_config` 补全索引
    ///
    /// 这是编码前执行的步骤. 0 同时也是合法索引 (96000 Hz / 带内声道配置),
    /// 因此无法区分 "未设置" 与 "显式为 0": 查表无匹配时保持 0.
    /// 需要写入索引 0 以外含义的调用者应直接设置权威字段.
    pub fn resolve(&self) -> Self {
        let mut config = *self;
        if config.sample_rate_index == 0 {
            if let Some(index) = sample_rate_index_of(config.sample_rate) {
                config.sample_rate_index = index;
            }
        }
        if config.channel_config == 0 {
            if let Some(index) = CHANNEL_COUNT_TABLE
                .iter()
                .position(|&count| count == config.channel_count)
            {
                config.channel_config = index as u32;
            }
        }
        config
    }

    /// 实际采样率 (Hz)
    ///
    /// 索引 0-12 查表, >= 15 视为显式采样率, 保留值 13/14 返回 `None`.
    pub fn sample_rate_hz(&self) -> Option<u32> {
        match self.sample_rate_index {
            index if index >= SAMPLE_RATE_INDEX_ESCAPE => Some(index),
            index => SAMPLE_RATE_TABLE.get(index as usize).copied(),
        }
    }

    /// 从比特流读取配置
    ///
    /// 只填充权威字段; 需要投影字段时再调用 [`complete`](Self::complete).
    pub fn read(br: &mut BitReader<'_>) -> IsomResult<Self> {
        let start = br.bits_read();
        let object_type = read_object_type(br)?;
        let sample_rate_index = read_sample_rate_index(br)?;
        let channel_config = br.read_bits(4)?;

        let config = Self {
            object_type,
            sample_rate_index,
            channel_config,
            ..Default::default()
        };
        debug!(
            "MPEG-4 音频配置: aot={}, sr_index={}, ch_config={}, {} 位",
            object_type,
            sample_rate_index,
            channel_config,
            br.bits_read() - start,
        );
        Ok(config)
    }

    /// 写入比特流, 末尾补零对齐到字节边界
    ///
    /// 写入前先执行 [`resolve`](Self::resolve), 调用者可以只提供采样率和声道数.
    /// 所有字段在写入第一位之前完成校验, 出错时 `bw` 保持不变.
    pub fn write(&self, bw: &mut BitWriter) -> IsomResult<()> {
        let config = self.resolve();
        config.validate()?;

        let start = bw.bits_written();
        write_object_type(bw, config.object_type);
        write_sample_rate_index(bw, config.sample_rate_index);
        bw.write_bits(config.channel_config, 4);
        bw.align_to_byte();

        debug!(
            "写入 MPEG-4 音频配置: aot={}, sr_index={}, ch_config={}, {} 位",
            config.object_type,
            config.sample_rate_index,
            config.channel_config,
            bw.bits_written() - start,
        );
        Ok(())
    }

    /// 校验权威字段是否可编码
    fn validate(&self) -> IsomResult<()> {
        if self.object_type > MAX_OBJECT_TYPE {
            return Err(IsomError::InvalidArgument(format!(
                "对象类型 {} 超出转义编码范围 (最大 {})",
                self.object_type, MAX_OBJECT_TYPE,
            )));
        }
        if self.sample_rate_index > 0x00FF_FFFF {
            return Err(IsomError::InvalidArgument(format!(
                "显式采样率 {} 超过 24 位",
                self.sample_rate_index,
            )));
        }
        if self.channel_config > 0x0F {
            return Err(IsomError::InvalidArgument(format!(
                "声道配置 {} 超过 4 位",
                self.channel_config,
            )));
        }
        Ok(())
    }
}

/// 采样率 → 采样率索引, 无精确匹配时返回 `None`
pub fn sample_rate_index_of(sample_rate: u32) -> Option<u32> {
    SAMPLE_RATE_TABLE
        .iter()
        .position(|&rate| rate == sample_rate)
        .map(|index| index as u32)
}

/// 从字节数据解析 MPEG-4 音频配置 (DecoderSpecificInfo 负载)
pub fn read_mpeg4_audio_config(data: &[u8]) -> IsomResult<Mpeg4AudioConfig> {
    let mut br = BitReader::new(data);
    Mpeg4AudioConfig::read(&mut br)
}

/// 将 MPEG-4 音频配置编码为字节数据
pub fn write_mpeg4_audio_config(config: &Mpeg4AudioConfig) -> IsomResult<Vec<u8>> {
    let mut bw = BitWriter::new();
    config.write(&mut bw)?;
    Ok(bw.finish())
}

/// 读取对象类型: 5 位, 等于转义值时再读 6 位
fn read_object_type(br: &mut BitReader<'_>) -> IsomResult<u32> {
    let object_type = br.read_bits(5)?;
    if object_type == AOT_ESCAPE {
        return Ok(32 + br.read_bits(6)?);
    }
    Ok(object_type)
}

/// 写入对象类型: >= 32 时写转义值加 6 位余量
fn write_object_type(bw: &mut BitWriter, object_type: u32) {
    if object_type >= 32 {
        bw.write_bits(AOT_ESCAPE, 5);
        bw.write_bits(object_type - 32, 6);
    } else {
        bw.write_bits(object_type, 5);
    }
}

/// 读取采样率索引: 4 位, 等于 0xF 时再读 24 位显式值
fn read_sample_rate_index(br: &mut BitReader<'_>) -> IsomResult<u32> {
    let index = br.read_bits(4)?;
    if index == SAMPLE_RATE_INDEX_ESCAPE {
        return br.read_bits(24);
    }
    Ok(index)
}

/// 写入采样率索引: >= 0xF 时写转义值加 24 位显式值
fn write_sample_rate_index(bw: &mut BitWriter, index: u32) {
    if index >= SAMPLE_RATE_INDEX_ESCAPE {
        bw.write_bits(SAMPLE_RATE_INDEX_ESCAPE, 4);
        bw.write_bits(index, 24);
    } else {
        bw.write_bits(index, 4);
    }
}
