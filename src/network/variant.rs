use crate::{buffer::image_desc::ImageSlot, filter::error::DenoiseError};

/// Network topology family, selected by which auxiliary images are bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variant {
    Color,
    ColorAlbedoNormal,
}

impl Variant {
    pub fn from_bindings(albedo: bool, normal: bool) -> Result<Self, DenoiseError> {
        match (albedo, normal) {
            (false, false) => Ok(Variant::Color),
            (true, true) => Ok(Variant::ColorAlbedoNormal),
            (true, false) => Err(DenoiseError::config(
                "Albedo is bound without normal; bind both or neither",
            )),
            (false, true) => Err(DenoiseError::config(
                "Normal is bound without albedo; bind both or neither",
            )),
        }
    }

    pub fn slots(&self) -> Vec<ImageSlot> {
        match self {
            Variant::Color => vec![ImageSlot::Color],
            Variant::ColorAlbedoNormal => vec![ImageSlot::Color, ImageSlot::Albedo, ImageSlot::Normal],
        }
    }

    pub fn input_channels(&self) -> usize {
        self.slots().len() * 3
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Variant::Color => "color",
            Variant::ColorAlbedoNormal => "color_albedo_normal",
        }
    }
}
