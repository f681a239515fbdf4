//! # isom-core
//!
//! isom 核心库, 提供统一错误类型以及编解码所依赖的流读写原语.
//!
//! - [`BitReader`] / [`BitWriter`]: 大端位序 (MSB first) 比特流
//! - [`ByteReader`] / [`ByteWriter`]: 大端字节序整数与字节块读写

pub mod bitreader;
pub mod bitwriter;
pub mod byteio;
pub mod error;

// 重导出常用类型
pub use bitreader::BitReader;
pub use bitwriter::BitWriter;
pub use byteio::{ByteReader, ByteWriter};
pub use error::{IsomError, IsomResult};
