/// Pixel layout of a [`VideoFrame`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    /// YUV 4:2:0 planar, chroma planes rounded up for odd dimensions.
    I420,
    /// Packed 8-bit blue/green/red, the format the display stage expects.
    Bgr24,
}

impl VideoFormat {
    /// Byte length of a full frame buffer at the given dimensions.
    pub fn buffer_len(self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        match self {
            VideoFormat::I420 => {
                let chroma = w.div_ceil(2) * h.div_ceil(2);
                w * h + 2 * chroma
            }
            VideoFormat::Bgr24 => w * h * 3,
        }
    }
}

/// One raw video frame as delivered by a transport track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub format: VideoFormat,
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, format: VideoFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Whether the buffer length matches the declared dimensions and format.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() >= self.format.buffer_len(self.width, self.height)
    }
}
