use crate::filter::error::DenoiseError;

// Largest radiance the log curve maps into [0, 1] (half-float max)
pub const HDR_MAX: f32 = 65504.0;

const SRGB_LINEAR_LIMIT: f32 = 0.0031308;
const SRGB_ENCODED_LIMIT: f32 = 12.92 * SRGB_LINEAR_LIMIT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferFunction {
    Linear,
    Srgb,
    Log,
}

impl TransferFunction {
    pub fn from_flags(srgb: bool, hdr: bool) -> Result<Self, DenoiseError> {
        match (srgb, hdr) {
            (false, false) => Ok(TransferFunction::Linear),
            (true, false) => Ok(TransferFunction::Srgb),
            (false, true) => Ok(TransferFunction::Log),
            (true, true) => Err(DenoiseError::config(
                "Options srgb and hdr cannot both be enabled",
            )),
        }
    }

    pub fn is_hdr(&self) -> bool {
        matches!(self, TransferFunction::Log)
    }

    // Storage domain to network domain
    pub fn forward(&self, x: f32) -> f32 {
        match self {
            TransferFunction::Linear => x,
            TransferFunction::Srgb => {
                if x <= SRGB_LINEAR_LIMIT {
                    12.92 * x
                } else {
                    1.055 * x.powf(1.0 / 2.4) - 0.055
                }
            },
            TransferFunction::Log => x.ln_1p() / HDR_MAX.ln_1p(),
        }
    }

    // Network domain back to storage domain
    pub fn inverse(&self, y: f32) -> f32 {
        match self {
            TransferFunction::Linear => y,
            TransferFunction::Srgb => {
                if y <= SRGB_ENCODED_LIMIT {
                    y / 12.92
                } else {
                    ((y + 0.055) / 1.055).powf(2.4)
                }
            },
            TransferFunction::Log => (y * HDR_MAX.ln_1p()).exp_m1(),
        }
    }

    // Valid range of a decoded output value. NaN maps to zero.
    pub fn clamp_output(&self, value: f32, normalized_format: bool) -> f32 {
        if value.is_nan() {
            return 0.0;
        }
        let max = if self.is_hdr() && !normalized_format { f32::MAX } else { 1.0 };
        value.clamp(0.0, max)
    }
}
