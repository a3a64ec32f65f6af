#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    // Flat vector (conv biases)
    X,
    // Channel-major activations: channel planes of height x width
    Chw,
    // Conv weights: [out_channels, in_channels, kernel_h, kernel_w]
    Oihw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TensorDesc {
    // For vectors/1D tensors (e.g., biases)
    Vector { length: usize },

    // For activations flowing between nodes
    Tensor3D {
        channels: usize,
        height: usize,
        width: usize,
    },

    // For conv weights, batch is the output channel count
    Tensor4D {
        batch: usize,
        channels: usize,
        height: usize,
        width: usize,
    },
}

impl TensorDesc {
    pub fn new_vector(length: usize) -> Self {
        Self::Vector { length }
    }

    pub fn new_tensor3d(channels: usize, height: usize, width: usize) -> Self {
        Self::Tensor3D { channels, height, width }
    }

    pub fn new_tensor4d(batch: usize, channels: usize, height: usize, width: usize) -> Self {
        Self::Tensor4D { batch, channels, height, width }
    }

    pub fn size_in_bytes(&self) -> usize {
        self.num_elements() * std::mem::size_of::<f32>()
    }

    pub fn num_elements(&self) -> usize {
        match &self {
            Self::Vector { length } => *length,
            Self::Tensor3D { channels, height, width } => channels * height * width,
            Self::Tensor4D { batch, channels, height, width } =>
                batch * channels * height * width,
        }
    }

    pub fn to_dims(&self) -> Vec<usize> {
        match &self {
            Self::Vector { length } => vec![*length],
            Self::Tensor3D { channels, height, width } => vec![*channels, *height, *width],
            Self::Tensor4D { batch, channels, height, width } =>
                vec![*batch, *channels, *height, *width],
        }
    }

    pub fn layout(&self) -> Layout {
        match &self {
            Self::Vector { .. } => Layout::X,
            Self::Tensor3D { .. } => Layout::Chw,
            Self::Tensor4D { .. } => Layout::Oihw,
        }
    }

    // (channels, height, width) of an activation tensor
    pub fn chw(&self) -> Option<(usize, usize, usize)> {
        match &self {
            Self::Tensor3D { channels, height, width } => Some((*channels, *height, *width)),
            _ => None,
        }
    }

    pub fn to_shape_string(&self) -> String {
        self.to_dims()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("×")
    }
}
