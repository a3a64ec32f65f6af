pub mod buffer {
    pub mod format;
    pub mod image_desc;
    pub mod reorder;
}

pub mod filter {
    pub mod autoencoder;
    pub mod config;
    pub mod device;
    pub mod error;
    pub mod tiling;
}

pub mod graph {
    pub mod graph_model;
}

pub mod network {
    pub mod network;
    pub mod print_network_stats;
    pub mod unet;
    pub mod variant;
}

pub mod node {
    pub mod activations;
    pub mod concat;
    pub mod conv2d;
    pub mod execution;
    pub mod factory;
    pub mod input;
    pub mod node;
    pub mod output;
    pub mod pool;
    pub mod upsample;
}

pub mod tensor {
    pub mod tensor;
    pub mod tensor_desc;
}

pub mod transfer {
    pub mod transfer_function;
}

pub mod weights {
    pub mod synthetic;
    pub mod weight_init;
    pub mod weight_source;
}

pub use buffer::{format::PixelFormat, image_desc::{ImageDesc, SharedBuffer}};
pub use filter::{
    autoencoder::AutoencoderFilter,
    config::FilterConfig,
    device::{Device, DeviceConfig},
    error::{DenoiseError, ErrorKind},
};
pub use network::variant::Variant;
pub use weights::weight_source::{ConvWeights, WeightMap, WeightSource};
