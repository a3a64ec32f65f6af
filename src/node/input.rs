use crate::{
    buffer::{image_desc::ImageSlot, reorder::pack_image},
    filter::error::DenoiseError,
    tensor::{tensor::Tensor, tensor_desc::TensorDesc},
};

use super::{execution::ExecContext, node::Node};

// Packs the bound images into one tensor, three channels per slot.
// Only the color slot goes through the transfer function.
#[derive(Clone)]
pub struct InputNode {
    pub slots: Vec<ImageSlot>,
    pub height: usize,
    pub width: usize,
}

impl InputNode {
    pub fn new(slots: Vec<ImageSlot>, height: usize, width: usize) -> Self {
        Self { slots, height, width }
    }

    pub fn channels(&self) -> usize {
        self.slots.len() * 3
    }
}

impl Node for InputNode {
    fn output_desc(&self, input_descs: &[&TensorDesc]) -> Result<TensorDesc, DenoiseError> {
        if !input_descs.is_empty() {
            return Err(DenoiseError::internal(
                format!("Input expects 0 inputs, got {}", input_descs.len())
            ));
        }

        Ok(TensorDesc::new_tensor3d(self.channels(), self.height, self.width))
    }

    fn input_requirements(&self) -> (usize, Option<usize>) {
        (0, Some(0))
    }

    fn name(&self) -> String {
        "Input".to_string()
    }

    fn config_string(&self) -> Option<String> {
        let slots = self.slots.iter().map(|s| s.name()).collect::<Vec<_>>().join("+");
        Some(format!("slots={}, tile={}x{}", slots, self.width, self.height))
    }

    fn forward(&self, ctx: &ExecContext<'_>, _inputs: &[&Tensor], output: &mut Tensor) -> Result<(), DenoiseError> {
        for (idx, slot) in self.slots.iter().enumerate() {
            let image = ctx.images.get(*slot).ok_or_else(|| {
                DenoiseError::usage(format!("Image '{}' is not bound", slot.name()))
            })?;

            let transfer = match slot {
                ImageSlot::Color => Some(ctx.transfer),
                _ => None,
            };

            pack_image(image, &ctx.region, output, idx * 3, transfer)?;
        }

        Ok(())
    }
}
