use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChannelFlags: u32 {
        const COLOR = 1 << 0;
        const ACCUM = 1 << 1;
    }
}

/// Output pixel buffer: 8-bit RGBA, rows stored bottom-up.
pub struct FrameBuffer {
    width: u32,
    height: u32,
    channels: ChannelFlags,
    color: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, channels: ChannelFlags) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            channels,
            color: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> ChannelFlags {
        self.channels
    }

    /// The color channel as interleaved RGBA bytes, bottom row first.
    pub fn map_color(&self) -> &[u8] {
        &self.color
    }

    pub(crate) fn write_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.color[idx..idx + 4].copy_from_slice(&rgba);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_and_writes() {
        let mut fb = FrameBuffer::new(4, 2, ChannelFlags::COLOR);
        assert_eq!(fb.map_color().len(), 4 * 2 * 4);

        fb.write_pixel(3, 1, [1, 2, 3, 4]);
        let idx = ((1 * 4 + 3) * 4) as usize;
        assert_eq!(&fb.map_color()[idx..idx + 4], &[1, 2, 3, 4]);
    }
}
