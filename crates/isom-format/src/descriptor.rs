//! MPEG-4 通用描述符 (ISO 14496-1 BaseDescriptor).
//!
//! # 结构
//! ```text
//! tag      8 bits
//! length   1-4 字节, 大端 base-128: 每字节低 7 位为值, 最高位为续标志
//! data     length 字节
//! ```
//!
//! 读取时最多消费 4 个长度字节, 即使第 4 个字节仍带续标志.
//! 写入时使用最短编码; 长度为 0 时不写任何长度字节.

use isom_core::{ByteReader, ByteWriter, IsomError, IsomResult};
use log::trace;

/// 4 个长度字节可表示的最大负载长度 (28 位)
pub const MAX_DESCRIPTOR_LENGTH: usize = 0x0FFF_FFFF;

/// 长度字段最多字节数
const MAX_LENGTH_BYTES: usize = 4;

/// 描述符: tag 与借用自输入的负载
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a> {
    /// 描述符 tag
    pub tag: u8,
    /// 负载数据
    pub data: &'a [u8],
}

impl<'a> Descriptor<'a> {
    /// 以负载为子流创建读取器, 用于解析嵌套内容
    pub fn reader(&self) -> ByteReader<'a> {
        ByteReader::new(self.data)
    }

    /// 校验 tag, 不一致时返回 [`IsomError::TagNotFound`]
    pub fn expect_tag(self, expected: u8) -> IsomResult<Self> {
        if self.tag != expected {
            return Err(IsomError::TagNotFound {
                expected,
                found: self.tag,
            });
        }
        Ok(self)
    }
}

/// 读取一个描述符
///
/// 负载不足 `length` 字节时返回 [`IsomError::Eof`].
pub fn read_descriptor<'a>(r: &mut ByteReader<'a>) -> IsomResult<Descriptor<'a>> {
    let tag = r.read_u8()?;
    let length = read_desc_length(r)?;
    let data = r.read_bytes(length)?;
    trace!("描述符: tag={}, length={}", tag, length);
    Ok(Descriptor { tag, data })
}

/// 写入一个描述符
///
/// 负载超过 [`MAX_DESCRIPTOR_LENGTH`] 时返回 [`IsomError::InvalidArgument`], 且不写入任何字节.
pub fn write_descriptor(w: &mut ByteWriter, tag: u8, data: &[u8]) -> IsomResult<()> {
    check_desc_length(data.len())?;
    w.write_u8(tag)?;
    write_desc_length(w, data.len())?;
    w.write_all(data)
}

/// 读取 base-128 变长长度, 高位组在前
fn read_desc_length(r: &mut ByteReader<'_>) -> IsomResult<usize> {
    let mut length = 0usize;
    for _ in 0..MAX_LENGTH_BYTES {
        let b = r.read_u8()?;
        length = (length << 7) | usize::from(b & 0x7F);
        if b & 0x80 == 0 {
            break;
        }
    }
    Ok(length)
}

fn check_desc_length(length: usize) -> IsomResult<()> {
    if length > MAX_DESCRIPTOR_LENGTH {
        return Err(IsomError::InvalidArgument(format!(
            "描述符长度 {} 超过 {} 字节长度字段的上限",
            length, MAX_LENGTH_BYTES,
        )));
    }
    Ok(())
}

/// 写入 base-128 变长长度 (最短编码, 除最后一字节外均置续标志)
fn write_desc_length(w: &mut ByteWriter, length: usize) -> IsomResult<()> {
    check_desc_length(length)?;

    // 高位组在前
    for i in (0..desc_length_size(length)).rev() {
        let group = ((length >> (7 * i)) & 0x7F) as u8;
        let continuation = if i > 0 { 0x80 } else { 0x00 };
        w.write_u8(group | continuation)?;
    }
    Ok(())
}

/// 描述符长度字段的编码字节数
pub fn desc_length_size(length: usize) -> usize {
    match length {
        0 => 0,
        1..0x80 => 1,
        0x80..0x4000 => 2,
        0x4000..0x20_0000 => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_length(length: usize) -> Vec<u8> {
        let mut w = ByteWriter::new();
        write_desc_length(&mut w, length).unwrap();
        w.into_inner()
    }

    #[test]
    fn test_length_encoding() {
        assert_eq!(encode_length(0), Vec::<u8>::new());
        assert_eq!(encode_length(1), vec![0x01]);
        assert_eq!(encode_length(127), vec![0x7F]);
        assert_eq!(encode_length(128), vec![0x81, 0x00]);
        assert_eq!(encode_length(16383), vec![0xFF, 0x7F]);
        assert_eq!(encode_length(16384), vec![0x81, 0x80, 0x00]);
        assert_eq!(
            encode_length(MAX_DESCRIPTOR_LENGTH),
            vec![0xFF, 0xFF, 0xFF, 0x7F]
        );
    }

    #[test]
    fn test_length_size_matches_encoding() {
        for length in [0, 1, 127, 128, 16383, 16384, 0x1F_FFFF, 0x20_0000] {
            assert_eq!(
                desc_length_size(length),
                encode_length(length).len(),
                "length={}",
                length
            );
        }
    }

    #[test]
    fn test_length_overflow_rejected() {
        let mut w = ByteWriter::new();
        let err = write_desc_length(&mut w, MAX_DESCRIPTOR_LENGTH + 1).unwrap_err();
        assert!(matches!(err, IsomError::InvalidArgument(_)));
    }

    #[test]
    fn test_read_length_multi_byte() {
        let data = [0x81, 0x00];
        let mut r = ByteReader::new(&data);
        assert_eq!(read_desc_length(&mut r).unwrap(), 128);

        // 部分封装器使用非最短的 4 字节形式
        let data = [0x80, 0x80, 0x80, 0x22];
        let mut r = ByteReader::new(&data);
        assert_eq!(read_desc_length(&mut r).unwrap(), 0x22);
    }

    #[test]
    fn test_read_length_capped_at_four_bytes() {
        // 第 4 字节仍带续标志, 但不再继续读取
        let data = [0x05, 0x80, 0x80, 0x80, 0x82, 0xAA, 0xBB];
        let mut r = ByteReader::new(&data);
        let desc = read_descriptor(&mut r).unwrap();
        assert_eq!(desc.tag, 5);
        assert_eq!(desc.data, &[0xAA, 0xBB]);
        assert!(r.is_empty());
    }

    #[test]
    fn test_read_descriptor_short_payload() {
        let data = [0x05, 0x04, 0x01, 0x02];
        let mut r = ByteReader::new(&data);
        assert!(matches!(read_descriptor(&mut r), Err(IsomError::Eof)));

        // 缺少长度字节
        let data = [0x05];
        let mut r = ByteReader::new(&data);
        assert!(matches!(read_descriptor(&mut r), Err(IsomError::Eof)));
    }

    #[test]
    fn test_oversized_descriptor_writes_nothing() {
        let payload = vec![0u8; MAX_DESCRIPTOR_LENGTH + 1];
        let mut w = ByteWriter::new();
        w.write_u8(0x42).unwrap();
        let err = write_descriptor(&mut w, 0x05, &payload).unwrap_err();
        assert!(matches!(err, IsomError::InvalidArgument(_)));
        assert_eq!(w.data(), &[0x42]);
    }

    #[test]
    fn test_write_empty_descriptor() {
        let mut w = ByteWriter::new();
        write_descriptor(&mut w, 0x06, &[]).unwrap();
        assert_eq!(w.into_inner(), vec![0x06]);
    }

    #[test]
    fn test_descriptor_roundtrip_all_tags() {
        let payload: Vec<u8> = (0..200u32).map(|i| i as u8).collect();
        for tag in 0..=255u8 {
            let mut w = ByteWriter::new();
            write_descriptor(&mut w, tag, &payload).unwrap();
            let data = w.into_inner();

            let mut r = ByteReader::new(&data);
            let desc = read_descriptor(&mut r).unwrap();
            assert_eq!(desc.tag, tag);
            assert_eq!(desc.data, payload.as_slice());
            assert!(r.is_empty());
        }
    }

    #[test]
    fn test_descriptor_roundtrip_lengths() {
        for length in [1usize, 2, 127, 128, 129, 1000, 16383, 16384] {
            let payload: Vec<u8> = (0..length).map(|i| (i * 7) as u8).collect();
            let mut w = ByteWriter::new();
            write_descriptor(&mut w, 0x04, &payload).unwrap();
            let data = w.into_inner();
            assert_eq!(data.len(), 1 + desc_length_size(length) + length);

            let mut r = ByteReader::new(&data);
            let desc = read_descriptor(&mut r).unwrap();
            assert_eq!(desc.tag, 0x04);
            assert_eq!(desc.data, payload.as_slice(), "length={}", length);
        }
    }

    #[test]
    fn test_expect_tag() {
        let desc = Descriptor {
            tag: 4,
            data: &[],
        };
        assert!(desc.expect_tag(4).is_ok());
        match desc.expect_tag(3) {
            Err(IsomError::TagNotFound { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 4);
            }
            other => panic!("应为 TagNotFound, 实际 {:?}", other),
        }
    }
}
