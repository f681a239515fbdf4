//! # isom
//!
//! 纯 Rust 实现的 MPEG-4 音频配置编解码, 用于在 MP4 `esds` box 与 ADTS 帧头部中
//! 携带 AAC 参数. 只处理描述音频编码方式的元数据, 不编解码音频样本.
//!
//! # 快速开始
//!
//! ```rust
//! use isom::codec::Mpeg4AudioConfig;
//! use isom::core::{ByteReader, ByteWriter};
//! use isom::format::{read_elem_stream_desc_aac, write_elem_stream_desc_aac};
//!
//! let config = Mpeg4AudioConfig {
//!     object_type: 2,
//!     sample_rate: 44100,
//!     channel_count: 2,
//!     ..Default::default()
//! };
//!
//! let mut w = ByteWriter::new();
//! write_elem_stream_desc_aac(&mut w, &config).unwrap();
//! let esds = w.into_inner();
//!
//! let decoded = read_elem_stream_desc_aac(&mut ByteReader::new(&esds)).unwrap();
//! assert_eq!(decoded.sample_rate_index, 4);
//! assert_eq!(decoded.complete().sample_rate, 44100);
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `isom-core` | 错误类型, 比特流/字节流读写 |
//! | `isom-codec` | MPEG-4 音频配置位域, ADTS 头部 |
//! | `isom-format` | ES_Descriptor 三层描述符 |

/// 错误类型与流读写原语
pub use isom_core as core;

/// MPEG-4 音频配置与 ADTS 头部
pub use isom_codec as codec;

/// MPEG-4 描述符
pub use isom_format as format;

/// 获取 isom 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
