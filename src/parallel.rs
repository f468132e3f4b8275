//! Parallel row dispatch for the rasterizer.
//!
//! Splits a triangle's draw rows into disjoint ranges and hands each range to
//! a worker in a bounded, scoped thread pool, so the borrowed framebuffer/
//! depth slices never need to be `'static` or wrapped in an `Arc`. Each
//! worker gets its own non-overlapping row-range sub-slice of both buffers,
//! split by row only, so no pixel index is ever touched by two workers in
//! the same frame.

use scoped_threadpool::Pool;

use crate::framebuffer::{DepthBuffer, Framebuffer};
use crate::rasterizer::{rasterize_row_range, PreparedTriangle};
use crate::shading::ShadingState;
use crate::texture::TextureView;

/// Minimum row count below which splitting work across threads isn't worth
/// the dispatch overhead; small triangles just run on the calling thread.
const MIN_ROWS_PER_WORKER: i64 = 8;

/// Rasterizes `prepared` using up to `worker_count` threads, splitting its row
/// range into that many contiguous chunks. Falls back to the single-threaded
/// path when the triangle's row span is too small to split usefully.
pub fn rasterize_parallel(
    prepared: &PreparedTriangle,
    tex: &TextureView,
    shading: &ShadingState,
    framebuffer: &mut Framebuffer,
    depth: &mut DepthBuffer,
    worker_count: usize,
) -> u32 {
    let width = framebuffer.width();
    let total_rows = prepared.draw_max_y - prepared.draw_min_y + 1;
    let workers = worker_count.max(1) as i64;

    if workers <= 1 || total_rows < MIN_ROWS_PER_WORKER * 2 {
        return rasterize_row_range(
            prepared,
            tex,
            shading,
            prepared.draw_min_y,
            prepared.draw_max_y,
            width,
            0,
            framebuffer.pixels_mut(),
            depth.cells_mut(),
        );
    }

    let chunk_rows = (total_rows / workers).max(MIN_ROWS_PER_WORKER);
    let chunks = row_chunks(prepared.draw_min_y, prepared.draw_max_y, chunk_rows);

    let pixels = framebuffer.pixels_mut();
    let depth_cells = depth.cells_mut();
    let mut counts = vec![0u32; chunks.len()];

    let mut pool = Pool::new(chunks.len() as u32);
    pool.scoped(|scope| {
        let mut remaining_pixels: &mut [u8] = pixels;
        let mut remaining_depth: &mut [f32] = depth_cells;
        let mut cursor = prepared.draw_min_y;

        for (chunk, count_slot) in chunks.iter().zip(counts.iter_mut()) {
            let (start, end) = *chunk;
            let rows_before = (start - cursor) as usize;
            let pixel_split = rows_before * width as usize * 4;
            let depth_split = rows_before * width as usize;

            let (_, rest_pixels) = remaining_pixels.split_at_mut(pixel_split);
            let (_, rest_depth) = remaining_depth.split_at_mut(depth_split);

            let rows_in_chunk = (end - start + 1) as usize;
            let (chunk_pixels, next_pixels) = rest_pixels.split_at_mut(rows_in_chunk * width as usize * 4);
            let (chunk_depth, next_depth) = rest_depth.split_at_mut(rows_in_chunk * width as usize);

            remaining_pixels = next_pixels;
            remaining_depth = next_depth;
            cursor = end + 1;

            scope.execute(move || {
                *count_slot = rasterize_row_range(
                    prepared,
                    tex,
                    shading,
                    start,
                    end,
                    width,
                    start,
                    chunk_pixels,
                    chunk_depth,
                );
            });
        }
    });

    counts.into_iter().sum()
}

/// Splits `[min_y, max_y]` into contiguous chunks of at most `chunk_rows` rows each.
fn row_chunks(min_y: i64, max_y: i64, chunk_rows: i64) -> Vec<(i64, i64)> {
    let mut chunks = Vec::new();
    let mut start = min_y;
    while start <= max_y {
        let end = (start + chunk_rows - 1).min(max_y);
        chunks.push((start, end));
        start = end + 1;
    }
    chunks
}
