use crate::{filter::error::DenoiseError, tensor::{tensor::Tensor, tensor_desc::TensorDesc}};

use super::{execution::ExecContext, node::Node};

// Channel-wise concatenation of tensors with identical spatial dims
#[derive(Clone, Default)]
pub struct ConcatNode;

impl ConcatNode {
    pub fn new() -> Self {
        Self
    }
}

impl Node for ConcatNode {
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError> {
        if input_descs.len() < 2 {
            return Err(DenoiseError::internal(
                format!("Concat node requires at least 2 inputs, got {}", input_descs.len())
            ));
        }

        let mut channels = 0;
        let mut spatial = None;

        for desc in input_descs {
            let (c, h, w) = desc.chw().ok_or_else(|| {
                DenoiseError::internal(format!("Concat requires CHW inputs, got {:?}", desc))
            })?;

            match spatial {
                None => spatial = Some((h, w)),
                Some(expected) if expected != (h, w) => {
                    return Err(DenoiseError::internal(format!(
                        "Concat inputs differ spatially: {:?} vs {:?}", expected, (h, w)
                    )));
                },
                Some(_) => {},
            }
            channels += c;
        }

        let (height, width) = spatial.unwrap_or((0, 0));
        Ok(TensorDesc::new_tensor3d(channels, height, width))
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (2, None)  // At least 2 inputs, no maximum
    }

    fn name(&self) -> String {
        "Concat".to_string()
    }

    fn config_string(&self) -> Option<String> {
        Some("dim=channels".to_string())
    }

    fn forward(&self, _ctx: &ExecContext<'_>, inputs: &[&Tensor], output: &mut Tensor) -> Result<(), DenoiseError> {
        let total: usize = inputs.iter().map(|t| t.len()).sum();
        if total != output.len() {
            return Err(DenoiseError::internal(format!(
                "Concat inputs hold {} elements, output {}", total, output.len()
            )));
        }

        // CHW planes are contiguous, so concatenating channels is concatenating buffers
        let mut offset = 0;
        for input in inputs {
            output.data_mut()[offset..offset + input.len()].copy_from_slice(input.data());
            offset += input.len();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{buffer::{image_desc::BoundImages, reorder::Region}, transfer::transfer_function::TransferFunction};

    #[test]
    fn stacks_channels() {
        let node = ConcatNode::new();
        let a = Tensor::from_vec(TensorDesc::new_tensor3d(1, 1, 2), vec![1.0, 2.0]).unwrap();
        let b = Tensor::from_vec(TensorDesc::new_tensor3d(2, 1, 2), vec![3.0, 4.0, 5.0, 6.0]).unwrap();
        let desc = node.output_desc(&[a.desc(), b.desc()]).unwrap();
        assert_eq!(desc, TensorDesc::new_tensor3d(3, 1, 2));

        let mut output = Tensor::zeros(desc);
        let images = BoundImages::default();
        let ctx = ExecContext::new(&images, TransferFunction::Linear, Region { y: 0, x: 0, height: 0, width: 0 });
        node.forward(&ctx, &[&a, &b], &mut output).unwrap();

        assert_eq!(output.plane(2), &[5.0, 6.0]);
    }

    #[test]
    fn spatial_mismatch_is_internal_error() {
        let node = ConcatNode::new();
        let err = node.output_desc(&[
            &TensorDesc::new_tensor3d(1, 4, 4),
            &TensorDesc::new_tensor3d(1, 2, 2),
        ]).unwrap_err();
        assert!(matches!(err, DenoiseError::InternalInconsistency(_)));
    }
}
