use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    filter::error::DenoiseError,
    tensor::{tensor::Tensor, tensor_desc::TensorDesc},
    weights::weight_source::ConvWeights,
};

use super::{execution::ExecContext, node::Node};

// Stride 1 convolution with zero "same" padding. Kernel size and channel
// counts come from the weights.
#[derive(Clone)]
pub struct Conv2DNode {
    pub layer: String,
    pub weights: Arc<ConvWeights>,
}

impl Conv2DNode {
    pub fn new(layer: &str, weights: Arc<ConvWeights>) -> Self {
        Self {
            layer: layer.to_string(),
            weights,
        }
    }
}

impl Node for Conv2DNode {
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError> {
        if input_descs.len() != 1 {
            return Err(DenoiseError::internal(
                format!("Conv2D layer requires exactly 1 input, got {}", input_descs.len())
            ));
        }

        let (channels, height, width) = input_descs[0].chw().ok_or_else(|| {
            DenoiseError::internal(format!("Conv2D requires a CHW input, got {:?}", input_descs[0]))
        })?;

        let (out_channels, in_channels, kernel_h, kernel_w) = self.weights.dims();

        if channels != in_channels {
            return Err(DenoiseError::config(format!(
                "Conv2D {} weights expect {} input channels, got {}",
                self.layer, in_channels, channels
            )));
        }
        if self.weights.bias().len() != out_channels
            || self.weights.weights().len() != out_channels * in_channels * kernel_h * kernel_w
        {
            return Err(DenoiseError::config(format!(
                "Conv2D {} has {} weights and {} biases for a {}×{}×{}×{} kernel",
                self.layer, self.weights.weights().len(), self.weights.bias().len(),
                out_channels, in_channels, kernel_h, kernel_w
            )));
        }
        if kernel_h % 2 == 0 || kernel_w % 2 == 0 {
            return Err(DenoiseError::config(format!(
                "Conv2D {} needs an odd kernel for same padding, got {}×{}",
                self.layer, kernel_h, kernel_w
            )));
        }

        Ok(TensorDesc::new_tensor3d(out_channels, height, width))
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn name(&self) -> String {
        "Conv2D".to_string()
    }

    fn config_string(&self) -> Option<String> {
        let (out_channels, in_channels, kernel_h, kernel_w) = self.weights.dims();
        Some(format!(
            "{}: in_channels={}, out_channels={}, kernel={}×{}, padding={}×{}",
            self.layer, in_channels, out_channels,
            kernel_h, kernel_w,
            kernel_h / 2, kernel_w / 2
        ))
    }

    fn parameter_count(&self) -> usize {
        self.weights.parameter_count()
    }

    fn forward(&self, _ctx: &ExecContext<'_>, inputs: &[&Tensor], output: &mut Tensor) -> Result<(), DenoiseError> {
        let input = inputs[0];
        let (in_channels, height, width) = input.chw()?;
        let (out_channels, _, kernel_h, kernel_w) = self.weights.dims();
        let (pad_h, pad_w) = (kernel_h / 2, kernel_w / 2);
        let plane_size = height * width;

        if output.chw()? != (out_channels, height, width) {
            return Err(DenoiseError::internal(format!(
                "Conv2D {} output tensor is {:?}, expected {}×{}×{}",
                self.layer, output.desc().to_dims(), out_channels, height, width
            )));
        }
        if plane_size == 0 {
            return Ok(());
        }

        let kernel = self.weights.weights().data();
        let bias = self.weights.bias().data();
        let src = input.data();

        output.data_mut().par_chunks_mut(plane_size).enumerate().for_each(|(oc, out_plane)| {
            out_plane.iter_mut().for_each(|v| *v = bias[oc]);

            for ic in 0..in_channels {
                let in_plane = &src[ic * plane_size..(ic + 1) * plane_size];

                for ky in 0..kernel_h {
                    // Output rows whose source row y + ky - pad_h lies inside the image
                    let y_lo = pad_h.saturating_sub(ky);
                    let y_hi = (height + pad_h).saturating_sub(ky).min(height);

                    for kx in 0..kernel_w {
                        let x_lo = pad_w.saturating_sub(kx);
                        let x_hi = (width + pad_w).saturating_sub(kx).min(width);
                        let w = kernel[((oc * in_channels + ic) * kernel_h + ky) * kernel_w + kx];

                        for y in y_lo..y_hi {
                            let iy = y + ky - pad_h;
                            let out_row = &mut out_plane[y * width..(y + 1) * width];
                            let in_row = &in_plane[iy * width..(iy + 1) * width];
                            for x in x_lo..x_hi {
                                out_row[x] += w * in_row[x + kx - pad_w];
                            }
                        }
                    }
                }
            }
        });

        Ok(())
    }
}
