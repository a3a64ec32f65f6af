use rayon::prelude::*;

use crate::{filter::error::DenoiseError, tensor::{tensor::Tensor, tensor_desc::TensorDesc}};

use super::{execution::ExecContext, node::Node};

// Nearest-neighbour upsampling, the inverse of PoolNode's resolution change
#[derive(Clone)]
pub struct UpsampleNode {
    pub factor: usize,
}

impl UpsampleNode {
    pub fn new(factor: usize) -> Self {
        Self { factor }
    }
}

impl Node for UpsampleNode {
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError> {
        if input_descs.len() != 1 {
            return Err(DenoiseError::internal(
                format!("Upsample requires exactly 1 input, got {}", input_descs.len())
            ));
        }

        let (channels, height, width) = input_descs[0].chw().ok_or_else(|| {
            DenoiseError::internal(format!("Upsample requires a CHW input, got {:?}", input_descs[0]))
        })?;

        if self.factor == 0 {
            return Err(DenoiseError::config("Upsample factor must be non-zero"));
        }

        Ok(TensorDesc::new_tensor3d(channels, height * self.factor, width * self.factor))
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn name(&self) -> String {
        "Upsample".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!("factor={}, mode=nearest", self.factor))
    }

    fn forward(&self, _ctx: &ExecContext<'_>, inputs: &[&Tensor], output: &mut Tensor) -> Result<(), DenoiseError> {
        let input = inputs[0];
        let (_, in_h, in_w) = input.chw()?;
        let (_, out_h, out_w) = output.chw()?;
        let f = self.factor;

        if in_h * f != out_h || in_w * f != out_w {
            return Err(DenoiseError::internal(format!(
                "Upsample output {}x{} does not match input {}x{} * {}", out_w, out_h, in_w, in_h, f
            )));
        }
        if in_h * in_w == 0 {
            return Ok(());
        }

        output.data_mut().par_chunks_mut(out_h * out_w)
            .zip(input.data().par_chunks(in_h * in_w))
            .for_each(|(dst, src)| {
                for y in 0..out_h {
                    let src_row = &src[(y / f) * in_w..(y / f + 1) * in_w];
                    let dst_row = &mut dst[y * out_w..(y + 1) * out_w];
                    for (x, v) in dst_row.iter_mut().enumerate() {
                        *v = src_row[x / f];
                    }
                }
            });

        Ok(())
    }
}
