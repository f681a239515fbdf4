//! # isom-format
//!
//! MP4 (ISO-BMFF) `esds` box 内的 MPEG-4 描述符编解码.
//!
//! - [`descriptor`]: 通用 tag-length-value 描述符, 长度为 base-128 变长编码
//! - [`esds`]: 固定三层嵌套 ES_Descriptor → DecoderConfigDescriptor → DecoderSpecificInfo,
//!   以及 AAC 便捷入口
//!
//! `esds` box 本身 (box 头部与 version/flags) 由上层容器解析, 这里只处理其后的描述符字节.

pub mod descriptor;
pub mod esds;

// 重导出常用类型
pub use descriptor::{Descriptor, read_descriptor, write_descriptor};
pub use esds::{
    DecoderConfigDescriptor, EsDescriptor, EsFlags, read_elem_stream_desc,
    read_elem_stream_desc_aac, write_elem_stream_desc_aac,
};
