//! ES_Descriptor 三层嵌套结构 (ISO 14496-1 §7.2.6).
//!
//! ```text
//! ES_Descriptor (tag=0x03)
//!   ES_ID(16) flags(8) [dependsOn_ES_ID(16)] [URLlength(8) URLstring] [OCR_ES_Id(16)]
//!   DecoderConfigDescriptor (tag=0x04)
//!     objectTypeIndication(8) streamType(8) bufferSizeDB(24) maxBitrate(32) avgBitrate(32)
//!     DecoderSpecificInfo (tag=0x05)
//!       AAC 时为 MPEG-4 音频配置位流
//! ```
//!
//! 嵌套深度固定, 解析与构建都按三步顺序展开/包装, 不做通用的递归遍历.
//! 位于所需描述符之后的兄弟描述符 (如 SLConfigDescriptor) 被忽略.

use bitflags::bitflags;
use isom_codec::mpeg4audio::{
    Mpeg4AudioConfig, read_mpeg4_audio_config, write_mpeg4_audio_config,
};
use isom_core::{ByteReader, ByteWriter, IsomError, IsomResult};
use log::debug;

use crate::descriptor::{read_descriptor, write_descriptor};

/// ES_Descriptor tag
pub const ES_DESCR_TAG: u8 = 0x03;
/// DecoderConfigDescriptor tag
pub const DEC_CONFIG_DESCR_TAG: u8 = 0x04;
/// DecoderSpecificInfo tag
pub const DEC_SPECIFIC_DESCR_TAG: u8 = 0x05;

/// objectTypeIndication: MPEG-4 Audio (AAC)
pub const OBJECT_TYPE_INDICATION_AAC: u8 = 0x40;
/// streamType(6)=AudioStream + upStream(1)=0 + reserved(1)=1
pub const STREAM_TYPE_AUDIO: u8 = 0x15;

bitflags! {
    /// ES_Descriptor 标志字节
    ///
    /// 低 5 位为 streamPriority, 通过 [`EsFlags::stream_priority`] 读取.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EsFlags: u8 {
        /// 后跟 dependsOn_ES_ID
        const STREAM_DEPENDENCE = 0x80;
        /// 后跟 URL
        const URL = 0x40;
        /// 后跟 OCR_ES_Id
        const OCR_STREAM = 0x20;
    }
}

impl EsFlags {
    /// streamPriority (低 5 位)
    pub fn stream_priority(&self) -> u8 {
        self.bits() & 0x1F
    }
}

/// DecoderConfigDescriptor 及其内嵌的 DecoderSpecificInfo 负载
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfigDescriptor<'a> {
    /// objectTypeIndication (0x40 = MPEG-4 Audio)
    pub object_type_indication: u8,
    /// streamType + upStream + reserved
    pub stream_type: u8,
    /// bufferSizeDB (24 位)
    pub buffer_size_db: u32,
    /// 最大码率
    pub max_bitrate: u32,
    /// 平均码率
    pub avg_bitrate: u32,
    /// DecoderSpecificInfo 负载
    pub decoder_specific_info: &'a [u8],
}

impl<'a> DecoderConfigDescriptor<'a> {
    /// AAC 音频流的解码器配置, 缓冲区大小与码率均为 0
    pub fn aac(decoder_specific_info: &'a [u8]) -> Self {
        Self {
            object_type_indication: OBJECT_TYPE_INDICATION_AAC,
            stream_type: STREAM_TYPE_AUDIO,
            buffer_size_db: 0,
            max_bitrate: 0,
            avg_bitrate: 0,
            decoder_specific_info,
        }
    }

    /// 读取 DecoderConfigDescriptor (tag 必须为 0x04)
    pub fn read(r: &mut ByteReader<'a>) -> IsomResult<Self> {
        let desc = read_descriptor(r)?.expect_tag(DEC_CONFIG_DESCR_TAG)?;
        let mut r = desc.reader();

        let object_type_indication = r.read_u8()?;
        let stream_type = r.read_u8()?;
        let buffer_size_db = r.read_u24_be()?;
        let max_bitrate = r.read_u32_be()?;
        let avg_bitrate = r.read_u32_be()?;

        let dsi = read_descriptor(&mut r)?.expect_tag(DEC_SPECIFIC_DESCR_TAG)?;

        debug!(
            "DecoderConfigDescriptor: oti=0x{:02X}, stream_type=0x{:02X}, buffer_size={}, max_bitrate={}, avg_bitrate={}, dsi_len={}",
            object_type_indication,
            stream_type,
            buffer_size_db,
            max_bitrate,
            avg_bitrate,
            dsi.data.len(),
        );

        Ok(Self {
            object_type_indication,
            stream_type,
            buffer_size_db,
            max_bitrate,
            avg_bitrate,
            decoder_specific_info: dsi.data,
        })
    }

    /// 写入 DecoderConfigDescriptor (含 DecoderSpecificInfo)
    pub fn write(&self, w: &mut ByteWriter) -> IsomResult<()> {
        let mut body = ByteWriter::new();
        body.write_u8(self.object_type_indication)?;
        body.write_u8(self.stream_type)?;
        body.write_u24_be(self.buffer_size_db)?;
        body.write_u32_be(self.max_bitrate)?;
        body.write_u32_be(self.avg_bitrate)?;
        write_descriptor(&mut body, DEC_SPECIFIC_DESCR_TAG, self.decoder_specific_info)?;

        write_descriptor(w, DEC_CONFIG_DESCR_TAG, body.data())
    }
}

/// ES_Descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EsDescriptor<'a> {
    /// ES_ID
    pub es_id: u16,
    /// 标志字节 (含 streamPriority)
    pub flags: EsFlags,
    /// dependsOn_ES_ID, 仅当设置 [`EsFlags::STREAM_DEPENDENCE`]
    pub depends_on_es_id: Option<u16>,
    /// URL 字符串原始字节, 仅当设置 [`EsFlags::URL`]
    pub url: Option<&'a [u8]>,
    /// OCR_ES_Id, 仅当设置 [`EsFlags::OCR_STREAM`]
    pub ocr_es_id: Option<u16>,
    /// 解码器配置
    pub decoder_config: DecoderConfigDescriptor<'a>,
}

impl<'a> EsDescriptor<'a> {
    /// AAC 音频流的最简 ES_Descriptor: ES_ID=0, 无标志
    pub fn aac(decoder_specific_info: &'a [u8]) -> Self {
        Self {
            es_id: 0,
            flags: EsFlags::empty(),
            depends_on_es_id: None,
            url: None,
            ocr_es_id: None,
            decoder_config: DecoderConfigDescriptor::aac(decoder_specific_info),
        }
    }

    /// 读取 ES_Descriptor (tag 必须为 0x03) 及其嵌套的解码器配置
    ///
    /// tag 不匹配时只消费了这一个描述符.
    pub fn read(r: &mut ByteReader<'a>) -> IsomResult<Self> {
        let desc = read_descriptor(r)?.expect_tag(ES_DESCR_TAG)?;
        let mut r = desc.reader();

        let es_id = r.read_u16_be()?;
        let flags = EsFlags::from_bits_retain(r.read_u8()?);

        let depends_on_es_id = if flags.contains(EsFlags::STREAM_DEPENDENCE) {
            Some(r.read_u16_be()?)
        } else {
            None
        };
        let url = if flags.contains(EsFlags::URL) {
            let len = r.read_u8()?;
            Some(r.read_bytes(usize::from(len))?)
        } else {
            None
        };
        let ocr_es_id = if flags.contains(EsFlags::OCR_STREAM) {
            Some(r.read_u16_be()?)
        } else {
            None
        };

        debug!(
            "ES_Descriptor: es_id={}, flags=0x{:02X}, priority={}",
            es_id,
            flags.bits(),
            flags.stream_priority(),
        );

        let decoder_config = DecoderConfigDescriptor::read(&mut r)?;

        Ok(Self {
            es_id,
            flags,
            depends_on_es_id,
            url,
            ocr_es_id,
            decoder_config,
        })
    }

    /// 写入 ES_Descriptor
    ///
    /// 标志位声明的可选字段必须提供, 否则返回 [`IsomError::InvalidArgument`].
    pub fn write(&self, w: &mut ByteWriter) -> IsomResult<()> {
        let mut body = ByteWriter::new();
        body.write_u16_be(self.es_id)?;
        body.write_u8(self.flags.bits())?;

        if self.flags.contains(EsFlags::STREAM_DEPENDENCE) {
            let id = self
                .depends_on_es_id
                .ok_or_else(|| missing_field("dependsOn_ES_ID"))?;
            body.write_u16_be(id)?;
        }
        if self.flags.contains(EsFlags::URL) {
            let url = self.url.ok_or_else(|| missing_field("URL"))?;
            let len = u8::try_from(url.len()).map_err(|_| {
                IsomError::InvalidArgument(format!("URL 长度 {} 超过 255 字节", url.len()))
            })?;
            body.write_u8(len)?;
            body.write_all(url)?;
        }
        if self.flags.contains(EsFlags::OCR_STREAM) {
            let id = self.ocr_es_id.ok_or_else(|| missing_field("OCR_ES_Id"))?;
            body.write_u16_be(id)?;
        }

        self.decoder_config.write(&mut body)?;

        write_descriptor(w, ES_DESCR_TAG, body.data())
    }
}

fn missing_field(name: &str) -> IsomError {
    IsomError::InvalidArgument(format!("ES_Descriptor 标志声明了 {} 但未提供", name))
}

/// 读取 ES_Descriptor, 返回 DecoderSpecificInfo 负载
pub fn read_elem_stream_desc<'a>(r: &mut ByteReader<'a>) -> IsomResult<&'a [u8]> {
    let es = EsDescriptor::read(r)?;
    Ok(es.decoder_config.decoder_specific_info)
}

/// 读取 ES_Descriptor 并解析其中的 MPEG-4 音频配置
pub fn read_elem_stream_desc_aac(r: &mut ByteReader<'_>) -> IsomResult<Mpeg4AudioConfig> {
    let data = read_elem_stream_desc(r)?;
    read_mpeg4_audio_config(data)
}

/// 将 MPEG-4 音频配置包装为 AAC 的 ES_Descriptor 并写入
pub fn write_elem_stream_desc_aac(w: &mut ByteWriter, config: &Mpeg4AudioConfig) -> IsomResult<()> {
    let dsi = write_mpeg4_audio_config(config)?;
    EsDescriptor::aac(&dsi).write(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// AAC-LC 44100Hz 立体声的完整 ES_Descriptor
    const ESDS_AAC_LC_44100_STEREO: [u8; 24] = [
        0x03, 0x16, // ES_Descriptor
        0x00, 0x00, 0x00, // ES_ID + flags
        0x04, 0x11, // DecoderConfigDescriptor
        0x40, 0x15, // oti + stream_type
        0x00, 0x00, 0x00, // bufferSizeDB
        0x00, 0x00, 0x00, 0x00, // maxBitrate
        0x00, 0x00, 0x00, 0x00, // avgBitrate
        0x05, 0x02, 0x12, 0x10, // DecoderSpecificInfo
    ];

    fn aac_lc_44100_stereo() -> Mpeg4AudioConfig {
        Mpeg4AudioConfig {
            object_type: 2,
            sample_rate: 44100,
            channel_count: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_write_aac_exact_bytes() {
        let mut w = ByteWriter::new();
        write_elem_stream_desc_aac(&mut w, &aac_lc_44100_stereo()).unwrap();
        assert_eq!(w.data(), &ESDS_AAC_LC_44100_STEREO);
    }

    #[test]
    fn test_read_aac() {
        let mut r = ByteReader::new(&ESDS_AAC_LC_44100_STEREO);
        let cfg = read_elem_stream_desc_aac(&mut r).unwrap();
        assert_eq!(cfg.object_type, 2);
        assert_eq!(cfg.sample_rate_index, 4);
        assert_eq!(cfg.channel_config, 2);
        assert!(r.is_empty());
    }

    #[test]
    fn test_read_structured_fields() {
        let mut r = ByteReader::new(&ESDS_AAC_LC_44100_STEREO);
        let es = EsDescriptor::read(&mut r).unwrap();
        assert_eq!(es, EsDescriptor::aac(&[0x12, 0x10]));
    }

    #[test]
    fn test_outer_tag_mismatch() {
        // tag=4 的描述符后跟 2 字节其它数据
        let data = [0x04, 0x01, 0xAA, 0xFF, 0xFF];
        let mut r = ByteReader::new(&data);
        let err = read_elem_stream_desc(&mut r).unwrap_err();
        assert!(matches!(
            err,
            IsomError::TagNotFound {
                expected: ES_DESCR_TAG,
                found: 4
            }
        ));
        assert_eq!(r.position(), 3);
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn test_decoder_config_tag_mismatch() {
        let mut data = ESDS_AAC_LC_44100_STEREO;
        data[5] = 0x06;
        let mut r = ByteReader::new(&data);
        assert!(matches!(
            read_elem_stream_desc(&mut r),
            Err(IsomError::TagNotFound {
                expected: DEC_CONFIG_DESCR_TAG,
                found: 6
            })
        ));
    }

    #[test]
    fn test_decoder_specific_tag_mismatch() {
        let mut data = ESDS_AAC_LC_44100_STEREO;
        data[20] = 0x06;
        let mut r = ByteReader::new(&data);
        assert!(matches!(
            read_elem_stream_desc(&mut r),
            Err(IsomError::TagNotFound {
                expected: DEC_SPECIFIC_DESCR_TAG,
                found: 6
            })
        ));
    }

    #[test]
    fn test_truncated_is_eof() {
        for len in 0..ESDS_AAC_LC_44100_STEREO.len() {
            let mut r = ByteReader::new(&ESDS_AAC_LC_44100_STEREO[..len]);
            assert!(
                matches!(read_elem_stream_desc(&mut r), Err(IsomError::Eof)),
                "len={}",
                len
            );
        }
    }

    #[test]
    fn test_optional_es_fields_are_skipped() {
        // 三个标志全部置位, priority=3, URL="abc"
        let dsi = [0x12, 0x10];
        let es = EsDescriptor {
            es_id: 1,
            flags: EsFlags::from_bits_retain(0xE3),
            depends_on_es_id: Some(7),
            url: Some(b"abc".as_slice()),
            ocr_es_id: Some(9),
            decoder_config: DecoderConfigDescriptor {
                max_bitrate: 128_000,
                avg_bitrate: 96_000,
                buffer_size_db: 0x1800,
                ..DecoderConfigDescriptor::aac(&dsi)
            },
        };
        let mut w = ByteWriter::new();
        es.write(&mut w).unwrap();
        let data = w.into_inner();
        // ES 负载: 3 + 2 + 1 + 3 + 2 + (2 + 13 + 4)
        assert_eq!(data[1] as usize, data.len() - 2);
        assert_eq!(
            &data[2..13],
            &[0x00, 0x01, 0xE3, 0x00, 0x07, 0x03, b'a', b'b', b'c', 0x00, 0x09]
        );

        let mut r = ByteReader::new(&data);
        let parsed = EsDescriptor::read(&mut r).unwrap();
        assert_eq!(parsed, es);
        assert_eq!(parsed.flags.stream_priority(), 3);

        let mut r = ByteReader::new(&data);
        assert_eq!(read_elem_stream_desc(&mut r).unwrap(), &dsi);
    }

    #[test]
    fn test_trailing_sl_config_ignored() {
        // ES 负载末尾附带 SLConfigDescriptor (tag=0x06, predefined=2)
        let mut payload = ESDS_AAC_LC_44100_STEREO[2..].to_vec();
        payload.extend_from_slice(&[0x06, 0x01, 0x02]);
        let mut w = ByteWriter::new();
        write_descriptor(&mut w, ES_DESCR_TAG, &payload).unwrap();
        let data = w.into_inner();

        let mut r = ByteReader::new(&data);
        let cfg = read_elem_stream_desc_aac(&mut r).unwrap();
        assert_eq!(cfg.complete().sample_rate, 44100);
        assert!(r.is_empty());
    }

    #[test]
    fn test_missing_optional_field_rejected() {
        let mut es = EsDescriptor::aac(&[0x12, 0x10]);
        es.flags = EsFlags::URL;
        let mut w = ByteWriter::new();
        assert!(matches!(
            es.write(&mut w),
            Err(IsomError::InvalidArgument(_))
        ));
        assert!(w.is_empty());
    }

    #[test]
    fn test_invalid_aac_config_writes_nothing() {
        let mut w = ByteWriter::new();
        w.write_all(&ESDS_AAC_LC_44100_STEREO).unwrap();
        let cfg = Mpeg4AudioConfig {
            object_type: 2,
            sample_rate_index: 4,
            channel_config: 16,
            ..Default::default()
        };
        assert!(matches!(
            write_elem_stream_desc_aac(&mut w, &cfg),
            Err(IsomError::InvalidArgument(_))
        ));
        assert_eq!(w.data(), &ESDS_AAC_LC_44100_STEREO);
    }

    #[test]
    fn test_aac_roundtrip_escaped_config() {
        let cfg = Mpeg4AudioConfig {
            object_type: 42,
            sample_rate_index: 50000,
            channel_config: 1,
            ..Default::default()
        };
        let mut w = ByteWriter::new();
        write_elem_stream_desc_aac(&mut w, &cfg).unwrap();
        let data = w.into_inner();

        let mut r = ByteReader::new(&data);
        let decoded = read_elem_stream_desc_aac(&mut r).unwrap();
        assert_eq!(decoded.object_type, 42);
        assert_eq!(decoded.sample_rate_index, 50000);
        assert_eq!(decoded.channel_config, 1);
    }
}
