use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::filter::error::DenoiseError;

use super::format::PixelFormat;

/// Pixel memory owned by the caller. Several image descriptors may view the
/// same buffer at different offsets.
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer(Arc<RwLock<Vec<u8>>>);

impl SharedBuffer {
    pub fn new(len: usize) -> Self {
        Self::from_bytes(vec![0; len])
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Arc::new(RwLock::new(bytes)))
    }

    pub fn from_f32(values: &[f32]) -> Self {
        Self::from_bytes(values.iter().flat_map(|v| v.to_ne_bytes()).collect())
    }

    pub fn len(&self) -> usize {
        self.read_recovered().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Vec<u8>>, DenoiseError> {
        self.0.read().map_err(|_| DenoiseError::internal("Image buffer lock is poisoned"))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<u8>>, DenoiseError> {
        self.0.write().map_err(|_| DenoiseError::internal("Image buffer lock is poisoned"))
    }

    // Snapshots read through a poisoned lock
    fn read_recovered(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        match self.0.read() {
            Ok(bytes) => bytes,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.read_recovered()
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.read_recovered().clone()
    }

    pub fn same_buffer(&self, other: &SharedBuffer) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Describes where the pixels of one image live inside a [`SharedBuffer`].
#[derive(Clone, Debug)]
pub struct ImageDesc {
    buffer: SharedBuffer,
    format: PixelFormat,
    width: usize,
    height: usize,
    byte_offset: usize,
    pixel_stride: usize,
    row_stride: usize,
}

impl ImageDesc {
    pub fn new(
        buffer: SharedBuffer,
        format: PixelFormat,
        width: usize,
        height: usize,
    ) -> Result<Self, DenoiseError> {
        Self::new_with(buffer, format, width, height, 0, 0, 0)
    }

    /// A zero pixel or row stride means tightly packed.
    pub fn new_with(
        buffer: SharedBuffer,
        format: PixelFormat,
        width: usize,
        height: usize,
        byte_offset: usize,
        pixel_stride: usize,
        row_stride: usize,
    ) -> Result<Self, DenoiseError> {
        if width == 0 || height == 0 {
            return Err(DenoiseError::config(format!(
                "Image dimensions must be non-zero, got {}x{}", width, height
            )));
        }

        let pixel_stride = if pixel_stride == 0 { format.size_in_bytes() } else { pixel_stride };
        let row_stride = if row_stride == 0 { pixel_stride * width } else { row_stride };

        if pixel_stride < format.size_in_bytes() {
            return Err(DenoiseError::config(format!(
                "Pixel stride {} is smaller than the {:?} pixel size {}",
                pixel_stride, format, format.size_in_bytes()
            )));
        }
        if row_stride < pixel_stride * width {
            return Err(DenoiseError::config(format!(
                "Row stride {} is smaller than {} pixels of {} bytes",
                row_stride, width, pixel_stride
            )));
        }

        let image = Self {
            buffer,
            format,
            width,
            height,
            byte_offset,
            pixel_stride,
            row_stride,
        };

        let available = image.buffer.len();
        if image.required_len() > available {
            return Err(DenoiseError::config(format!(
                "Image needs {} bytes but its buffer holds {}",
                image.required_len(), available
            )));
        }

        Ok(image)
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    // One past the last byte addressed by this image
    pub fn required_len(&self) -> usize {
        self.byte_offset
            + (self.height - 1) * self.row_stride
            + (self.width - 1) * self.pixel_stride
            + self.format.size_in_bytes()
    }

    pub fn pixel_offset(&self, y: usize, x: usize) -> usize {
        self.byte_offset + y * self.row_stride + x * self.pixel_stride
    }

    pub fn same_size(&self, other: &ImageDesc) -> bool {
        self.width == other.width && self.height == other.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageSlot {
    Color,
    Albedo,
    Normal,
    Output,
}

impl ImageSlot {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "color" => Some(Self::Color),
            "albedo" => Some(Self::Albedo),
            "normal" => Some(Self::Normal),
            "output" => Some(Self::Output),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Albedo => "albedo",
            Self::Normal => "normal",
            Self::Output => "output",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct BoundImages {
    pub color: Option<ImageDesc>,
    pub albedo: Option<ImageDesc>,
    pub normal: Option<ImageDesc>,
    pub output: Option<ImageDesc>,
}

impl BoundImages {
    pub fn get(&self, slot: ImageSlot) -> Option<&ImageDesc> {
        match slot {
            ImageSlot::Color => self.color.as_ref(),
            ImageSlot::Albedo => self.albedo.as_ref(),
            ImageSlot::Normal => self.normal.as_ref(),
            ImageSlot::Output => self.output.as_ref(),
        }
    }

    pub fn set(&mut self, slot: ImageSlot, image: Option<ImageDesc>) {
        match slot {
            ImageSlot::Color => self.color = image,
            ImageSlot::Albedo => self.albedo = image,
            ImageSlot::Normal => self.normal = image,
            ImageSlot::Output => self.output = image,
        }
    }
}
