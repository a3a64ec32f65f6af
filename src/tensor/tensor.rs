use crate::filter::error::DenoiseError;

use super::tensor_desc::{Layout, TensorDesc};

#[derive(Clone, Debug)]
pub struct Tensor {
    desc: TensorDesc,
    layout: Layout,
    data: Vec<f32>,
}

impl Tensor {
    pub fn zeros(desc: TensorDesc) -> Self {
        let len = desc.num_elements();
        Self {
            layout: desc.layout(),
            desc,
            data: vec![0.0; len],
        }
    }

    pub fn from_vec(desc: TensorDesc, data: Vec<f32>) -> Result<Self, DenoiseError> {
        if data.len() != desc.num_elements() {
            return Err(DenoiseError::config(format!(
                "Tensor {:?} needs {} elements, got {}",
                desc.to_dims(), desc.num_elements(), data.len()
            )));
        }

        Ok(Self {
            layout: desc.layout(),
            desc,
            data,
        })
    }

    pub fn desc(&self) -> &TensorDesc {
        &self.desc
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    // Length is fixed by the desc, only values may change
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn chw(&self) -> Result<(usize, usize, usize), DenoiseError> {
        self.desc.chw().ok_or_else(|| {
            DenoiseError::internal(format!("Expected a CHW tensor, got {:?}", self.desc))
        })
    }

    pub fn plane(&self, channel: usize) -> &[f32] {
        let (_, h, w) = self.desc.chw().unwrap_or((0, 0, 0));
        &self.data[channel * h * w..(channel + 1) * h * w]
    }

    pub fn plane_mut(&mut self, channel: usize) -> &mut [f32] {
        let (_, h, w) = self.desc.chw().unwrap_or((0, 0, 0));
        &mut self.data[channel * h * w..(channel + 1) * h * w]
    }

    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    // Copies a height x width window of every channel from `src` at src_origin
    // to self at dst_origin. Channel counts must match.
    pub fn copy_region_from(
        &mut self,
        src: &Tensor,
        src_origin: (usize, usize),
        dst_origin: (usize, usize),
        size: (usize, usize),
    ) -> Result<(), DenoiseError> {
        let (src_c, src_h, src_w) = src.chw()?;
        let (dst_c, dst_h, dst_w) = self.chw()?;
        let (height, width) = size;

        if src_c != dst_c {
            return Err(DenoiseError::internal(format!(
                "Region copy between {} and {} channels", src_c, dst_c
            )));
        }
        if src_origin.0 + height > src_h || src_origin.1 + width > src_w
            || dst_origin.0 + height > dst_h || dst_origin.1 + width > dst_w
        {
            return Err(DenoiseError::internal(format!(
                "Region {}x{} out of bounds (src {}x{} at {:?}, dst {}x{} at {:?})",
                height, width, src_h, src_w, src_origin, dst_h, dst_w, dst_origin
            )));
        }

        for c in 0..src_c {
            let src_plane = src.plane(c);
            let dst_plane = self.plane_mut(c);
            for y in 0..height {
                let s = (src_origin.0 + y) * src_w + src_origin.1;
                let d = (dst_origin.0 + y) * dst_w + dst_origin.1;
                dst_plane[d..d + width].copy_from_slice(&src_plane[s..s + width]);
            }
        }

        Ok(())
    }
}

impl Default for Tensor {
    fn default() -> Self {
        Self::zeros(TensorDesc::new_vector(0))
    }
}
