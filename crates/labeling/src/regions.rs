//! Palette masking and connected-region extraction.

use contracts::TRAFFIC_LIGHT_COLOR;
use image::RgbImage;

/// Axis-aligned pixel-space bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl BoundingBox {
    /// Box area in square pixels.
    pub fn area(&self) -> u32 {
        self.w * self.h
    }

    /// True when the box touches or crosses the image's right/bottom edge.
    pub fn clipped_by_edge(&self, image_width: u32, image_height: u32) -> bool {
        self.x + self.w >= image_width || self.y + self.h >= image_height
    }
}

/// Binary mask of pixels equal to the traffic-light palette color.
///
/// All three channels must match exactly; the palette is lossless on disk
/// so near-matches only occur for genuinely different classes.
pub fn traffic_light_mask(seg: &RgbImage) -> Vec<u8> {
    let (tr, tg, tb) = TRAFFIC_LIGHT_COLOR;
    seg.pixels()
        .map(|p| {
            if p.0[0] == tr && p.0[1] == tg && p.0[2] == tb {
                255
            } else {
                0
            }
        })
        .collect()
}

/// Bounding boxes of the mask's 8-connected regions.
///
/// Row-major `mask` of 0/255 values; region discovery is an iterative
/// flood fill so pathological masks cannot overflow the stack.
pub fn connected_regions(mask: &[u8], width: u32, height: u32) -> Vec<BoundingBox> {
    let w = width as usize;
    let h = height as usize;
    debug_assert_eq!(mask.len(), w * h);

    let mut visited = vec![false; mask.len()];
    let mut regions = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start_y in 0..h {
        for start_x in 0..w {
            let idx = start_y * w + start_x;
            if mask[idx] == 0 || visited[idx] {
                continue;
            }

            let (mut min_x, mut max_x) = (start_x, start_x);
            let (mut min_y, mut max_y) = (start_y, start_y);

            visited[idx] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);

                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                            continue;
                        }
                        let nidx = ny as usize * w + nx as usize;
                        if mask[nidx] != 0 && !visited[nidx] {
                            visited[nidx] = true;
                            stack.push((nx as usize, ny as usize));
                        }
                    }
                }
            }

            regions.push(BoundingBox {
                x: min_x as u32,
                y: min_y as u32,
                w: (max_x - min_x + 1) as u32,
                h: (max_y - min_y + 1) as u32,
            });
        }
    }

    regions
}
