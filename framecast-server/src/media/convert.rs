//! Pixel format conversion to the fixed BGR24 layout the display stage
//! expects.

use framecast_core::{VideoFormat, VideoFrame};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("frame buffer too short for {width}x{height} {format:?}: {len} bytes")]
pub struct ConvertError {
    pub width: u32,
    pub height: u32,
    pub format: VideoFormat,
    pub len: usize,
}

/// Converts a frame to BGR24. BGR24 input passes through unchanged; I420 is
/// converted with BT.601 full-swing coefficients.
pub fn to_bgr24(frame: VideoFrame) -> Result<VideoFrame, ConvertError> {
    if !frame.is_well_formed() {
        return Err(ConvertError {
            width: frame.width,
            height: frame.height,
            format: frame.format,
            len: frame.data.len(),
        });
    }
    match frame.format {
        VideoFormat::Bgr24 => Ok(frame),
        VideoFormat::I420 => Ok(i420_to_bgr24(&frame)),
    }
}

fn i420_to_bgr24(frame: &VideoFrame) -> VideoFrame {
    let w = frame.width as usize;
    let h = frame.height as usize;
    let cw = w.div_ceil(2);
    let ch = h.div_ceil(2);

    let y_plane = &frame.data[..w * h];
    let u_plane = &frame.data[w * h..w * h + cw * ch];
    let v_plane = &frame.data[w * h + cw * ch..w * h + 2 * cw * ch];

    let mut out = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        for col in 0..w {
            let y = y_plane[row * w + col] as i32;
            let u = u_plane[(row / 2) * cw + col / 2] as i32 - 128;
            let v = v_plane[(row / 2) * cw + col / 2] as i32 - 128;

            let c = 298 * (y - 16);
            let b = (c + 516 * u + 128) >> 8;
            let g = (c - 100 * u - 208 * v + 128) >> 8;
            let r = (c + 409 * v + 128) >> 8;

            out.push(clamp_u8(b));
            out.push(clamp_u8(g));
            out.push(clamp_u8(r));
        }
    }

    VideoFrame::new(frame.width, frame.height, VideoFormat::Bgr24, out)
}

fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
