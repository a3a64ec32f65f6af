use std::{sync::Arc, time::Instant};

use log::{debug, info};

use crate::{
    buffer::{
        image_desc::{BoundImages, ImageDesc, ImageSlot},
        reorder::unpack_image,
    },
    network::{network::Network, unet::UNetTopology, variant::Variant},
    node::{execution::ExecContext, output::OUTPUT_CHANNELS},
    tensor::{tensor::Tensor, tensor_desc::TensorDesc},
    transfer::transfer_function::TransferFunction,
    weights::weight_source::WeightSource,
};

use super::{
    config::FilterConfig,
    device::Device,
    error::DenoiseError,
    tiling::TileGrid,
};

struct CommittedFilter {
    network: Network,
    transfer: TransferFunction,
    grid: TileGrid,
    // Full-image RGB result, unpacked in one go once every tile is done
    staging: Tensor,
}

enum FilterState {
    Configuring,
    Committed(Box<CommittedFilter>),
    Failed,
}

/// Denoising filter: bind images, set options, `commit`, then `execute` as
/// often as needed. Failures are recorded on the [`Device`], never returned.
pub struct AutoencoderFilter {
    device: Arc<Device>,
    weights: Arc<dyn WeightSource>,
    config: FilterConfig,
    images: BoundImages,
    srgb: bool,
    hdr: bool,
    state: FilterState,
}

impl AutoencoderFilter {
    pub fn new(device: Arc<Device>, weights: Arc<dyn WeightSource>) -> Self {
        Self {
            device,
            weights,
            config: FilterConfig::default(),
            images: BoundImages::default(),
            srgb: false,
            hdr: false,
            state: FilterState::Configuring,
        }
    }

    pub fn new_with(
        device: Arc<Device>,
        weights: Arc<dyn WeightSource>,
        config: FilterConfig,
    ) -> Result<Self, DenoiseError> {
        let config = config.build()?;
        Ok(Self {
            config,
            ..Self::new(device, weights)
        })
    }

    pub fn set_image(&mut self, name: &str, image: ImageDesc) {
        if let Err(e) = self.try_bind(name, Some(image)) {
            self.device.set_error(&e);
        }
    }

    pub fn remove_image(&mut self, name: &str) {
        if let Err(e) = self.try_bind(name, None) {
            self.device.set_error(&e);
        }
    }

    pub fn set1i(&mut self, name: &str, value: i32) {
        let flag = match name {
            "srgb" => &mut self.srgb,
            "hdr" => &mut self.hdr,
            _ => {
                self.device.set_error(&DenoiseError::config(format!("Unknown filter option '{}'", name)));
                return;
            },
        };

        *flag = value != 0;
        self.invalidate();
    }

    pub fn get1i(&self, name: &str) -> i32 {
        match name {
            "srgb" => self.srgb as i32,
            "hdr" => self.hdr as i32,
            _ => {
                self.device.set_error(&DenoiseError::config(format!("Unknown filter option '{}'", name)));
                0
            },
        }
    }

    pub fn commit(&mut self) {
        match self.try_commit() {
            Ok(committed) => self.state = FilterState::Committed(Box::new(committed)),
            Err(e) => {
                self.state = FilterState::Failed;
                self.device.set_error(&e);
            },
        }
    }

    /// Blocks until `output` holds the denoised image.
    pub fn execute(&mut self) {
        if let Err(e) = self.try_execute() {
            self.device.set_error(&e);
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.state, FilterState::Committed(_))
    }

    pub fn variant(&self) -> Option<Variant> {
        self.network().map(|n| n.variant())
    }

    pub fn network(&self) -> Option<&Network> {
        match &self.state {
            FilterState::Committed(committed) => Some(&committed.network),
            _ => None,
        }
    }

    pub fn tile_count(&self) -> usize {
        match &self.state {
            FilterState::Committed(committed) => committed.grid.len(),
            _ => 0,
        }
    }

    fn invalidate(&mut self) {
        if !matches!(self.state, FilterState::Configuring) {
            debug!("Filter configuration changed, network will be rebuilt on commit");
        }
        self.state = FilterState::Configuring;
    }

    fn try_bind(&mut self, name: &str, image: Option<ImageDesc>) -> Result<(), DenoiseError> {
        let slot = ImageSlot::from_name(name)
            .ok_or_else(|| DenoiseError::config(format!("Unknown image '{}'", name)))?;

        self.images.set(slot, image);
        self.invalidate();
        Ok(())
    }

    fn try_commit(&self) -> Result<CommittedFilter, DenoiseError> {
        let color = self.images.color.as_ref()
            .ok_or_else(|| DenoiseError::config("Image 'color' is not bound"))?;
        let output = self.images.output.as_ref()
            .ok_or_else(|| DenoiseError::config("Image 'output' is not bound"))?;

        if color.width() == 0 || color.height() == 0 {
            return Err(DenoiseError::config(format!(
                "Image 'color' must be non-empty, got {}x{}", color.width(), color.height()
            )));
        }

        for slot in [ImageSlot::Albedo, ImageSlot::Normal, ImageSlot::Output] {
            if let Some(image) = self.images.get(slot) {
                if !image.same_size(color) {
                    return Err(DenoiseError::config(format!(
                        "Image '{}' is {}x{} but color is {}x{}",
                        slot.name(), image.width(), image.height(), color.width(), color.height()
                    )));
                }
            }
        }

        let variant = Variant::from_bindings(self.images.albedo.is_some(), self.images.normal.is_some())?;
        let transfer = TransferFunction::from_flags(self.srgb, self.hdr)?;

        if transfer.is_hdr() {
            for (slot, image) in [(ImageSlot::Color, color), (ImageSlot::Output, output)] {
                if image.format().is_normalized() {
                    return Err(DenoiseError::config(format!(
                        "HDR mode does not support the 8-bit {:?} format of '{}'", image.format(), slot.name()
                    )));
                }
            }
        }

        let (height, width) = (color.height(), color.width());
        let grid = TileGrid::new(height, width, self.config.tile_size, self.config.tile_overlap)?;

        let topology = UNetTopology::from_weights(self.weights.as_ref(), variant)?;
        let factor = self.config.scale_factor;
        let alignment = topology.alignment(factor)?;
        let tile_height = grid.tile_height.div_ceil(alignment) * alignment;
        let tile_width = grid.tile_width.div_ceil(alignment) * alignment;

        let network = topology.build_network(tile_height, tile_width, factor)?;

        info!(
            "Committed {} network: {}x{} image, {} tile(s) of {}x{}, {} parameters",
            variant.tag(), width, height, grid.len(), tile_width, tile_height, network.parameter_count()
        );

        Ok(CommittedFilter {
            network,
            transfer,
            grid,
            staging: Tensor::zeros(TensorDesc::new_tensor3d(OUTPUT_CHANNELS, height, width)),
        })
    }

    fn try_execute(&mut self) -> Result<(), DenoiseError> {
        let committed = match &mut self.state {
            FilterState::Committed(committed) => committed,
            FilterState::Configuring => return Err(DenoiseError::usage("Filter must be committed before execute")),
            FilterState::Failed => return Err(DenoiseError::usage("Filter commit failed, fix the configuration and commit again")),
        };

        let images = &self.images;
        let started = Instant::now();
        self.device.install(|| committed.run(images))?;

        debug!(
            "Executed {} tile(s) in {:.2} ms",
            committed.grid.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        Ok(())
    }
}

impl CommittedFilter {
    fn run(&mut self, images: &BoundImages) -> Result<(), DenoiseError> {
        let output = images.output.as_ref()
            .ok_or_else(|| DenoiseError::internal("Committed filter has no output image"))?;

        for tile in &self.grid.tiles {
            let ctx = ExecContext::new(images, self.transfer, tile.src);
            self.network.execute(&ctx)?;

            self.staging.copy_region_from(
                self.network.output(),
                tile.interior_origin(),
                (tile.dst.y, tile.dst.x),
                (tile.dst.height, tile.dst.width),
            )?;
        }

        unpack_image(&self.staging, output, self.transfer)
    }
}
