use crate::{
    buffer::{image_desc::BoundImages, reorder::Region},
    transfer::transfer_function::TransferFunction,
};

// Per-pass state handed to every node: the bound images, the active transfer
// function and the image region covered by the current tile.
pub struct ExecContext<'a> {
    pub images: &'a BoundImages,
    pub transfer: TransferFunction,
    pub region: Region,
}

impl<'a> ExecContext<'a> {
    pub fn new(images: &'a BoundImages, transfer: TransferFunction, region: Region) -> Self {
        Self { images, transfer, region }
    }
}
