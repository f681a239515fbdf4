//! # isom-codec
//!
//! MPEG-4 音频配置的比特级编解码.
//!
//! - [`mpeg4audio`]: `MPEG4AudioConfig` 位域 (对象类型 / 采样率索引 / 声道配置) 的读写,
//!   含转义扩展与查表投影
//! - [`adts`]: ADTS 帧头部的只读解析
//!
//! ## 使用示例
//!
//! ```rust
//! use isom_codec::Mpeg4AudioConfig;
//!
//! let config = Mpeg4AudioConfig {
//!     object_type: 2,
//!     sample_rate: 44100,
//!     channel_count: 2,
//!     ..Default::default()
//! };
//! let data = isom_codec::write_mpeg4_audio_config(&config).unwrap();
//! assert_eq!(data, vec![0x12, 0x10]);
//! ```

pub mod adts;
pub mod mpeg4audio;

// 重导出常用类型
pub use adts::{AdtsHeader, read_adts_header};
pub use mpeg4audio::{Mpeg4AudioConfig, read_mpeg4_audio_config, write_mpeg4_audio_config};
