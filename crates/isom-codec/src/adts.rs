//! ADTS 帧头部解析 (只读).
//!
//! # ADTS 帧头部结构 (7 或 9 字节)
//! ```text
//! AAAAAAAA AAAABCCD EEFFFFGH HHIJKLMM MMMMMMMM MMMOOOOO OOOOOOPP (QQQQQQQQ QQQQQQQQ)
//!
//! A 12  sync word (0xFFF, 不校验)
//! B  1  ID: 0=MPEG-4, 1=MPEG-2
//! C  2  layer
//! D  1  protection_absent
//! E  2  profile = 音频对象类型 - 1
//! F  4  sampling_frequency_index (15 为禁止值, 不拒绝)
//! G  1  private_bit
//! H  3  channel_configuration
//! I..L  originality / home / copyright_id_bit / copyright_id_start
//! M 13  frame_length (含头部 7 或 9 字节)
//! O 11  adts_buffer_fullness
//! P  2  number_of_raw_data_blocks - 1
//! Q 16  CRC (仅当 protection_absent=0, 此处不读取)
//! ```
//!
//! 实际码流中的 ADTS 头部经常不规范, 因此这里只在数据不足时失败,
//! 语义上的合法性留给调用者判断.

use isom_core::{BitReader, IsomResult};
use log::trace;

use crate::mpeg4audio::Mpeg4AudioConfig;

/// 不含 CRC 的 ADTS 头部长度
pub const ADTS_HEADER_SIZE: usize = 7;

/// ADTS 帧头部中与流配置相关的字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdtsHeader {
    /// 音频对象类型 (profile + 1, 与 [`Mpeg4AudioConfig::object_type`] 编号一致)
    pub object_type: u32,
    /// 采样率索引 (原始值)
    pub sample_rate_index: u32,
    /// 声道配置 (原始值)
    pub channel_config: u32,
    /// 帧总长度 (含头部)
    pub frame_length: u32,
}

impl AdtsHeader {
    /// 转换为 MPEG-4 音频配置, 并补全采样率与声道数
    ///
    /// 由 ADTS 流生成 DecoderSpecificInfo 时使用.
    pub fn to_audio_config(&self) -> Mpeg4AudioConfig {
        Mpeg4AudioConfig {
            object_type: self.object_type,
            sample_rate_index: self.sample_rate_index,
            channel_config: self.channel_config,
            ..Default::default()
        }
        .complete()
    }
}

/// 解析 ADTS 帧头部
///
/// `data` 至少需要 7 字节, 否则返回 [`IsomError::Eof`](isom_core::IsomError::Eof).
pub fn read_adts_header(data: &[u8]) -> IsomResult<AdtsHeader> {
    let mut br = BitReader::new(data);

    // sync word + ID + layer + protection_absent
    br.skip_bits(12 + 1 + 2 + 1)?;
    let object_type = br.read_bits(2)? + 1;
    let sample_rate_index = br.read_bits(4)?;
    // private_bit
    br.skip_bits(1)?;
    let channel_config = br.read_bits(3)?;
    // originality, home, copyright_id_bit, copyright_id_start
    br.skip_bits(4)?;
    let frame_length = br.read_bits(13)?;
    // adts_buffer_fullness + number_of_raw_data_blocks
    br.skip_bits(11 + 2)?;

    trace!(
        "ADTS 头部: aot={}, sr_index={}, ch_config={}, frame_length={}",
        object_type, sample_rate_index, channel_config, frame_length,
    );

    Ok(AdtsHeader {
        object_type,
        sample_rate_index,
        channel_config,
        frame_length,
    })
}
