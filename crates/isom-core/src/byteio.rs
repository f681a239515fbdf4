//! 字节流读写原语.
//!
//! 描述符层只处理字节对齐的大端整数和字节块, 因此在内存缓冲区上
//! 以 `byteorder` 提供 u8/u16/u24/u32 的读写, 以及字节块的拷贝与跳过.

use std::io::{self, Cursor, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{IsomError, IsomResult};

/// 将读取时的 `UnexpectedEof` 统一为 [`IsomError::Eof`]
fn map_read_err(err: io::Error) -> IsomError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        IsomError::Eof
    } else {
        IsomError::Io(err)
    }
}

/// 内存字节读取器
///
/// 读取的字节块直接借用源数据, 不做拷贝.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    /// 从字节切片创建读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    /// 当前读取位置 (字节)
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// 剩余可读字节数
    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    /// 是否已读完
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// 读取 u8
    pub fn read_u8(&mut self) -> IsomResult<u8> {
        self.cursor.read_u8().map_err(map_read_err)
    }

    /// 读取 u16 大端
    pub fn read_u16_be(&mut self) -> IsomResult<u16> {
        self.cursor.read_u16::<BigEndian>().map_err(map_read_err)
    }

    /// 读取 u24 大端 (3 字节无符号整数)
    pub fn read_u24_be(&mut self) -> IsomResult<u32> {
        self.cursor.read_u24::<BigEndian>().map_err(map_read_err)
    }

    /// 读取 u32 大端
    pub fn read_u32_be(&mut self) -> IsomResult<u32> {
        self.cursor.read_u32::<BigEndian>().map_err(map_read_err)
    }

    /// 读取指定数量的字节, 不足时返回 [`IsomError::Eof`] 且不移动位置
    pub fn read_bytes(&mut self, count: usize) -> IsomResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(IsomError::Eof);
        }
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position();
        let end = start + count;
        self.cursor.set_position(end as u64);
        Ok(&data[start..end])
    }

    /// 跳过指定字节数
    pub fn skip(&mut self, count: usize) -> IsomResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// 取出全部剩余字节
    pub fn read_to_end(&mut self) -> &'a [u8] {
        let data: &'a [u8] = *self.cursor.get_ref();
        let start = self.position().min(data.len());
        self.cursor.set_position(data.len() as u64);
        &data[start..]
    }
}

/// 内存字节写入器
#[derive(Debug, Default)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// 创建空写入器
    pub fn new() -> Self {
        Self::default()
    }

    /// 已写入的字节数
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// 是否尚未写入任何数据
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// 已写入数据的引用
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// 消耗自身, 返回写入的数据
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    /// 写入 u8
    pub fn write_u8(&mut self, v: u8) -> IsomResult<()> {
        self.buf.write_u8(v)?;
        Ok(())
    }

    /// 写入 u16 大端
    pub fn write_u16_be(&mut self, v: u16) -> IsomResult<()> {
        self.buf.write_u16::<BigEndian>(v)?;
        Ok(())
    }

    /// 写入 u24 大端, `v` 超过 24 位时报错
    pub fn write_u24_be(&mut self, v: u32) -> IsomResult<()> {
        if v > 0x00FF_FFFF {
            return Err(IsomError::InvalidArgument(format!(
                "write_u24_be: 0x{:X} 超过 24 位",
                v,
            )));
        }
        self.buf.write_u24::<BigEndian>(v)?;
        Ok(())
    }

    /// 写入 u32 大端
    pub fn write_u32_be(&mut self, v: u32) -> IsomResult<()> {
        self.buf.write_u32::<BigEndian>(v)?;
        Ok(())
    }

    /// 写入全部数据
    pub fn write_all(&mut self, data: &[u8]) -> IsomResult<()> {
        self.buf.write_all(data)?;
        Ok(())
    }
}
