//! Conversion between caller-owned image buffers and CHW tensors.

use crate::{filter::error::DenoiseError, tensor::tensor::Tensor, transfer::transfer_function::TransferFunction};

use super::image_desc::ImageDesc;

/// Rectangle of an image, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub y: usize,
    pub x: usize,
    pub height: usize,
    pub width: usize,
}

impl Region {
    pub fn whole(image: &ImageDesc) -> Self {
        Self { y: 0, x: 0, height: image.height(), width: image.width() }
    }
}

/// Reads `region` of `image` into three channel planes of `tensor`, starting at
/// `channel_offset`. Pixels land at the top-left of the planes; everything
/// outside the region is zeroed. `transfer` is applied to every value when given.
pub fn pack_image(
    image: &ImageDesc,
    region: &Region,
    tensor: &mut Tensor,
    channel_offset: usize,
    transfer: Option<TransferFunction>,
) -> Result<(), DenoiseError> {
    let (channels, height, width) = tensor.chw()?;

    if channel_offset + 3 > channels {
        return Err(DenoiseError::internal(format!(
            "Cannot pack 3 channels at offset {} into a {}-channel tensor",
            channel_offset, channels
        )));
    }
    if region.height > height || region.width > width
        || region.y + region.height > image.height() || region.x + region.width > image.width()
    {
        return Err(DenoiseError::internal(format!(
            "Pack region {:?} does not fit image {}x{} or tensor {}x{}",
            region, image.width(), image.height(), width, height
        )));
    }

    let bytes = image.buffer().read()?;
    if image.required_len() > bytes.len() {
        return Err(DenoiseError::config(format!(
            "Image buffer shrank to {} bytes, {} required", bytes.len(), image.required_len()
        )));
    }

    let format = image.format();
    let pixel_size = format.size_in_bytes();

    for c in 0..3 {
        let plane = tensor.plane_mut(channel_offset + c);
        plane.iter_mut().for_each(|v| *v = 0.0);

        for y in 0..region.height {
            let row = &mut plane[y * width..y * width + region.width];
            for (x, value) in row.iter_mut().enumerate() {
                let at = image.pixel_offset(region.y + y, region.x + x);
                let raw = format.read_channel(&bytes[at..at + pixel_size], c);
                *value = match transfer {
                    Some(tf) => tf.forward(raw),
                    None => raw,
                };
            }
        }
    }

    Ok(())
}

/// Writes the first three channels of `tensor` into `image`, applying the inverse
/// transfer function and clamping to the output range. The tensor must have the
/// image's dimensions. Nothing is written if validation fails.
pub fn unpack_image(
    tensor: &Tensor,
    image: &ImageDesc,
    transfer: TransferFunction,
) -> Result<(), DenoiseError> {
    let (channels, height, width) = tensor.chw()?;

    if channels < 3 || height != image.height() || width != image.width() {
        return Err(DenoiseError::internal(format!(
            "Cannot unpack a {}x{}x{} tensor into a {}x{} image",
            channels, height, width, image.width(), image.height()
        )));
    }

    let mut bytes = image.buffer().write()?;
    if image.required_len() > bytes.len() {
        return Err(DenoiseError::config(format!(
            "Output buffer shrank to {} bytes, {} required", bytes.len(), image.required_len()
        )));
    }

    let format = image.format();
    let pixel_size = format.size_in_bytes();
    let normalized = format.is_normalized();

    for y in 0..height {
        for x in 0..width {
            let at = image.pixel_offset(y, x);
            let pixel = &mut bytes[at..at + pixel_size];
            for c in 0..3 {
                let value = transfer.inverse(tensor.plane(c)[y * width + x]);
                format.write_channel(pixel, c, transfer.clamp_output(value, normalized));
            }
        }
    }

    Ok(())
}
