use rayon::prelude::*;

use crate::{filter::error::DenoiseError, tensor::{tensor::Tensor, tensor_desc::TensorDesc}};

use super::{execution::ExecContext, node::Node};

// Max pooling with window = stride = factor. Channel count unchanged.
#[derive(Clone)]
pub struct PoolNode {
    pub factor: usize,
}

impl PoolNode {
    pub fn new(factor: usize) -> Self {
        Self { factor }
    }
}

impl Node for PoolNode {
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError> {
        if input_descs.len() != 1 {
            return Err(DenoiseError::internal(
                format!("Pool requires exactly 1 input, got {}", input_descs.len())
            ));
        }

        let (channels, height, width) = input_descs[0].chw().ok_or_else(|| {
            DenoiseError::internal(format!("Pool requires a CHW input, got {:?}", input_descs[0]))
        })?;

        if self.factor == 0 || height % self.factor != 0 || width % self.factor != 0 {
            return Err(DenoiseError::config(format!(
                "Cannot pool {}x{} by a factor of {}", width, height, self.factor
            )));
        }

        Ok(TensorDesc::new_tensor3d(channels, height / self.factor, width / self.factor))
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn name(&self) -> String {
        "MaxPool".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some(format!("factor={}", self.factor))
    }

    fn forward(&self, _ctx: &ExecContext<'_>, inputs: &[&Tensor], output: &mut Tensor) -> Result<(), DenoiseError> {
        let input = inputs[0];
        let (_, in_h, in_w) = input.chw()?;
        let (_, out_h, out_w) = output.chw()?;
        let f = self.factor;

        if out_h * f != in_h || out_w * f != in_w {
            return Err(DenoiseError::internal(format!(
                "Pool output {}x{} does not match input {}x{} / {}", out_w, out_h, in_w, in_h, f
            )));
        }
        if out_h * out_w == 0 {
            return Ok(());
        }

        output.data_mut().par_chunks_mut(out_h * out_w)
            .zip(input.data().par_chunks(in_h * in_w))
            .for_each(|(dst, src)| {
                for y in 0..out_h {
                    for x in 0..out_w {
                        let mut m = f32::NEG_INFINITY;
                        for dy in 0..f {
                            let row = &src[(y * f + dy) * in_w + x * f..][..f];
                            for &v in row {
                                if v > m || v.is_nan() {
                                    m = v;
                                }
                            }
                        }
                        dst[y * out_w + x] = m;
                    }
                }
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::{image_desc::BoundImages, reorder::Region}, transfer::transfer_function::TransferFunction};

    #[test]
    fn takes_window_maximum() {
        let node = PoolNode::new(2);
        let input = Tensor::from_vec(TensorDesc::new_tensor3d(1, 2, 4), vec![
            1.0, 5.0, -1.0, -3.0,
            2.0, 0.0, -2.0, -4.0,
        ]).unwrap();
        let mut output = Tensor::zeros(node.output_desc(&[input.desc()]).unwrap());

        let images = BoundImages::default();
        let ctx = ExecContext::new(&images, TransferFunction::Linear, Region { y: 0, x: 0, height: 0, width: 0 });
        node.forward(&ctx, &[&input], &mut output).unwrap();

        assert_eq!(output.desc(), &TensorDesc::new_tensor3d(1, 1, 2));
        assert_eq!(output.plane(0), &[5.0, -1.0]);
    }

    #[test]
    fn odd_dimensions_fail_at_build() {
        let node = PoolNode::new(2);
        let err = node.output_desc(&[&TensorDesc::new_tensor3d(3, 5, 4)]).unwrap_err();
        assert!(matches!(err, DenoiseError::Configuration(_)));
    }
}
