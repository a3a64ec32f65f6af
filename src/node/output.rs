use crate::{filter::error::DenoiseError, tensor::{tensor::Tensor, tensor_desc::TensorDesc}};

use super::{execution::ExecContext, node::Node};

pub const OUTPUT_CHANNELS: usize = 3;

// Terminal node holding the RGB prediction the filter reads back
#[derive(Clone, Default)]
pub struct OutputNode;

impl OutputNode {
    pub fn new() -> Self {
        Self
    }
}

impl Node for OutputNode {
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError> {
        if input_descs.len() != 1 {
            return Err(DenoiseError::internal(
                format!("Output requires exactly 1 input, got {}", input_descs.len())
            ));
        }

        match input_descs[0].chw() {
            Some((OUTPUT_CHANNELS, _, _)) => Ok(input_descs[0].clone()),
            Some((channels, _, _)) => Err(DenoiseError::config(format!(
                "Final layer produces {} channels, expected {}", channels, OUTPUT_CHANNELS
            ))),
            None => Err(DenoiseError::internal(
                format!("Output requires a CHW input, got {:?}", input_descs[0])
            )),
        }
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (1, Some(1))
    }

    fn name(&self) -> String {
        "Output".to_string()
    }

    fn forward(&self, _ctx: &ExecContext<'_>, inputs: &[&Tensor], output: &mut Tensor) -> Result<(), DenoiseError> {
        if inputs[0].len() != output.len() {
            return Err(DenoiseError::internal("Output tensor does not match its input"));
        }
        output.data_mut().copy_from_slice(inputs[0].data());
        Ok(())
    }
}
