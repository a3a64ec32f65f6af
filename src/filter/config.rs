use super::error::DenoiseError;

pub struct FilterConfig {
    // Largest tile edge in pixels; None runs the whole image in one pass
    pub tile_size: Option<usize>,
    // Margin around each tile that is computed and then discarded
    pub tile_overlap: usize,
    pub scale_factor: usize,
}

impl FilterConfig {
    pub fn build(self) -> Result<Self, DenoiseError> {
        if self.scale_factor < 2 {
            return Err(DenoiseError::config(
                format!("Scale factor must be at least 2, got {}", self.scale_factor)
            ));
        }

        if let Some(tile_size) = self.tile_size {
            if tile_size <= 2 * self.tile_overlap {
                return Err(DenoiseError::config(format!(
                    "Tile size {} leaves no interior with overlap {}", tile_size, self.tile_overlap
                )));
            }
        }

        Ok(self)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            tile_size: None,
            tile_overlap: 16,
            scale_factor: 2,
        }
    }
}
