use std::ops::Range;

use parfilter_image::Image;

use super::convolution::PixelOp;
use super::kernels::Kernel;
use super::FilterError;
use crate::config::{FilterConfig, Schedule};
use crate::parallel::WorkerPool;

/// A rectangle of the output plane together with its rows.
struct Tile<'a> {
    y0: usize,
    xs: Range<usize>,
    rows: Vec<&'a mut [u8]>,
}

/// Split the output buffer into `tile_size` x `tile_size` tiles, row-major.
///
/// Tiles on the right and bottom edges are clipped to the image.
fn split_tiles<'a>(
    dst: &'a mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    tile_size: usize,
) -> Vec<Tile<'a>> {
    let tiles_x = width.div_ceil(tile_size);
    let tiles_y = height.div_ceil(tile_size);

    let mut tiles = (0..tiles_y)
        .flat_map(|ty| {
            (0..tiles_x).map(move |tx| Tile {
                y0: ty * tile_size,
                xs: tx * tile_size..((tx + 1) * tile_size).min(width),
                rows: Vec::with_capacity(tile_size.min(height)),
            })
        })
        .collect::<Vec<_>>();

    for (y, row) in dst.chunks_exact_mut(width * channels).enumerate() {
        let band = (y / tile_size) * tiles_x;
        for (tx, segment) in row.chunks_mut(tile_size * channels).enumerate() {
            tiles[band + tx].rows.push(segment);
        }
    }

    tiles
}

pub(crate) fn run_tiled<const C: usize>(
    op: &PixelOp<'_>,
    src: &Image<C>,
    config: &FilterConfig,
) -> Result<Image<C>, FilterError> {
    let tile_size = config.tile_size;
    if tile_size == 0 {
        return Err(FilterError::InvalidTileSize(tile_size));
    }

    let mut dst = src.zeros_like();
    if dst.is_empty() {
        return Ok(dst);
    }

    // a tile never needs to be larger than the image itself
    let tile_size = tile_size.min(src.width().max(src.height()));

    let pool = WorkerPool::new(config.num_threads)?;
    let tiles = split_tiles(
        dst.as_slice_mut(),
        src.width(),
        src.height(),
        C,
        tile_size,
    );

    log::debug!("filtering {} tiles of {tile_size}x{tile_size}", tiles.len());

    pool.dispatch(
        Schedule::Dynamic,
        tiles,
        || (),
        |_, tile| {
            for (dy, out) in tile.rows.into_iter().enumerate() {
                op.fill_segment(src, tile.y0 + dy, tile.xs.clone(), out);
            }
        },
        |_| {},
    );

    Ok(dst)
}

/// Convolve an image with a kernel, one square tile per work item.
///
/// The image is cut into `ceil(W / T) x ceil(H / T)` tiles of edge
/// `config.tile_size`, clipped at the right and bottom borders. Tiles are
/// claimed one at a time by the workers regardless of `config.schedule`.
/// The output is byte-identical to [`filter_serial`](super::filter_serial).
///
/// # Errors
///
/// Returns [`FilterError::InvalidTileSize`] if `config.tile_size` is zero.
///
/// # Example
///
/// ```
/// use parfilter_image::GrayImage;
/// use parfilter_imgproc::config::FilterConfig;
/// use parfilter_imgproc::filter::{filter_serial, filter_tiled, kernels::kernel_by_name};
///
/// let image = GrayImage::new([3, 3].into(), (0..9).collect()).unwrap();
/// let kernel = kernel_by_name("laplacian").unwrap();
/// let config = FilterConfig::new().with_num_threads(2).with_tiling(2);
///
/// let tiled = filter_tiled(&image, &kernel, &config).unwrap();
/// assert_eq!(tiled, filter_serial(&image, &kernel));
/// ```
pub fn filter_tiled<const C: usize>(
    src: &Image<C>,
    kernel: &Kernel,
    config: &FilterConfig,
) -> Result<Image<C>, FilterError> {
    run_tiled(&PixelOp::Convolve(kernel), src, config)
}
