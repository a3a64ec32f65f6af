use crate::{filter::error::DenoiseError, tensor::{tensor::Tensor, tensor_desc::TensorDesc}};

use super::execution::ExecContext;

pub trait Node: Send + Sync {
    // Output shape from input shapes. Called once at build time, errors here fail the build
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError>;

    // For graph verification, how many inputs this node requires (min and max)
    fn input_requirements(&self) -> (usize, Option<usize>);

    // Return a string representation of the node's name
    fn name(&self) -> String;

    // Return optional configuration details for the node
    fn config_string(&self) -> Option<String> {
        None
    }

    fn parameter_count(&self) -> usize {
        0
    }

    // Compute `output` from `inputs`. Shapes were validated by output_desc
    fn forward(
        &self,
        ctx: &ExecContext<'_>,
        inputs: &[&Tensor],
        output: &mut Tensor,
    ) -> Result<(), DenoiseError>;
}
