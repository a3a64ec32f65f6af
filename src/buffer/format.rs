#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Float3,
    Float4,
    UByte3,
    UByte4,
}

impl PixelFormat {
    pub fn channel_count(&self) -> usize {
        match self {
            PixelFormat::Float3 | PixelFormat::UByte3 => 3,
            PixelFormat::Float4 | PixelFormat::UByte4 => 4,
        }
    }

    pub fn bytes_per_channel(&self) -> usize {
        match self {
            PixelFormat::Float3 | PixelFormat::Float4 => 4,
            PixelFormat::UByte3 | PixelFormat::UByte4 => 1,
        }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.channel_count() * self.bytes_per_channel()
    }

    // 8-bit normalized formats can only hold [0, 1]
    pub fn is_normalized(&self) -> bool {
        matches!(self, PixelFormat::UByte3 | PixelFormat::UByte4)
    }

    pub(crate) fn read_channel(&self, bytes: &[u8], channel: usize) -> f32 {
        match self {
            PixelFormat::Float3 | PixelFormat::Float4 => {
                let at = channel * 4;
                f32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
            },
            PixelFormat::UByte3 | PixelFormat::UByte4 => bytes[channel] as f32 / 255.0,
        }
    }

    // Value must already be clamped to the format's range
    pub(crate) fn write_channel(&self, bytes: &mut [u8], channel: usize, value: f32) {
        match self {
            PixelFormat::Float3 | PixelFormat::Float4 => {
                let at = channel * 4;
                bytes[at..at + 4].copy_from_slice(&value.to_ne_bytes());
            },
            PixelFormat::UByte3 | PixelFormat::UByte4 => {
                bytes[channel] = (value * 255.0).round() as u8;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(PixelFormat::Float3.size_in_bytes(), 12);
        assert_eq!(PixelFormat::Float4.size_in_bytes(), 16);
        assert_eq!(PixelFormat::UByte3.size_in_bytes(), 3);
        assert_eq!(PixelFormat::UByte4.size_in_bytes(), 4);
    }

    #[test]
    fn channel_io() {
        let mut px = [0u8; 12];
        PixelFormat::Float3.write_channel(&mut px, 2, 0.25);
        assert_eq!(PixelFormat::Float3.read_channel(&px, 2), 0.25);

        let mut px = [0u8; 3];
        PixelFormat::UByte3.write_channel(&mut px, 1, 1.0);
        assert_eq!(px[1], 255);
        assert_eq!(PixelFormat::UByte3.read_channel(&px, 1), 1.0);
    }
}
