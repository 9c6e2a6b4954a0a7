#![allow(dead_code)]

pub mod mock_transport;

pub use mock_transport::*;

use framecast_core::{VideoFormat, VideoFrame};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A tiny BGR24 frame whose pixels all carry `tag`, for order assertions.
pub fn bgr(tag: u8) -> VideoFrame {
    VideoFrame::new(2, 2, VideoFormat::Bgr24, vec![tag; 12])
}

/// A black I420 frame.
pub fn i420_black(width: u32, height: u32) -> VideoFrame {
    let chroma = (width as usize).div_ceil(2) * (height as usize).div_ceil(2);
    let mut data = vec![16u8; (width * height) as usize];
    data.extend(std::iter::repeat_n(128u8, 2 * chroma));
    VideoFrame::new(width, height, VideoFormat::I420, data)
}
