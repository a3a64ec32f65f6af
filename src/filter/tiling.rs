use crate::buffer::reorder::Region;

use super::error::DenoiseError;

/// One network pass. `src` is the image area packed into the tile, `dst` the
/// part of it kept in the result. `dst` always lies inside `src`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub src: Region,
    pub dst: Region,
}

impl Tile {
    // Where `dst` starts inside the tile tensor
    pub fn interior_origin(&self) -> (usize, usize) {
        (self.dst.y - self.src.y, self.dst.x - self.src.x)
    }
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    pub tiles: Vec<Tile>,
    pub tile_height: usize,
    pub tile_width: usize,
}

// (src_begin, dst_begin, dst_len) along one axis
fn split_axis(size: usize, tile: usize, overlap: usize) -> Result<Vec<(usize, usize, usize)>, DenoiseError> {
    if tile >= size {
        return Ok(vec![(0, 0, size)]);
    }

    let step = tile.saturating_sub(2 * overlap);
    if step == 0 {
        return Err(DenoiseError::config(format!(
            "Tile size {} leaves no interior with overlap {}", tile, overlap
        )));
    }

    let mut spans = Vec::with_capacity(size.div_ceil(step));
    let mut dst_begin = 0;
    while dst_begin < size {
        let dst_len = step.min(size - dst_begin);
        let src_begin = dst_begin.saturating_sub(overlap).min(size - tile);
        spans.push((src_begin, dst_begin, dst_len));
        dst_begin += step;
    }

    Ok(spans)
}

impl TileGrid {
    pub fn new(height: usize, width: usize, tile_size: Option<usize>, overlap: usize) -> Result<Self, DenoiseError> {
        let tile = tile_size.unwrap_or(usize::MAX);
        let tile_height = tile.min(height);
        let tile_width = tile.min(width);

        let rows = split_axis(height, tile_height, overlap)?;
        let cols = split_axis(width, tile_width, overlap)?;

        let mut tiles = Vec::with_capacity(rows.len() * cols.len());
        for &(src_y, dst_y, dst_h) in &rows {
            for &(src_x, dst_x, dst_w) in &cols {
                tiles.push(Tile {
                    src: Region { y: src_y, x: src_x, height: tile_height, width: tile_width },
                    dst: Region { y: dst_y, x: dst_x, height: dst_h, width: dst_w },
                });
            }
        }

        Ok(Self {
            tiles,
            tile_height,
            tile_width,
        })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
