mod convert;
mod decode;

pub use convert::{ConvertError, to_bgr24};
pub use decode::{DecoderRegistry, FrameDecoder};
