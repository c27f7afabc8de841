//! Lamp color classification in HSV space.
//!
//! Operates on the RGB crop under a region's bounding box: convert to HSV,
//! suppress the uniformly dark housing with a brightness floor, threshold
//! the three lamp hues, denoise each mask with a median filter and pick the
//! color with the largest pixel count.

use contracts::LabelClass;
use image::RgbImage;

use crate::regions::BoundingBox;

/// Value-channel floor subtracted before thresholding.
const BRIGHTNESS_FLOOR: u8 = 80;

/// Minimum winning pixel count for a color-specific class.
const MIN_COLOR_PIXELS: u32 = 20;

/// Median filter kernel size (square).
const MEDIAN_KERNEL: usize = 5;

/// Inclusive HSV threshold range, OpenCV 8-bit convention
/// (H in 0..=180, S and V in 0..=255).
struct HsvRange {
    h_min: u8,
    h_max: u8,
    s_min: u8,
    s_max: u8,
    v_min: u8,
    v_max: u8,
}

impl HsvRange {
    const fn new(h_min: u8, h_max: u8, s_min: u8, s_max: u8, v_min: u8, v_max: u8) -> Self {
        Self {
            h_min,
            h_max,
            s_min,
            s_max,
            v_min,
            v_max,
        }
    }

    fn contains(&self, h: u8, s: u8, v: u8) -> bool {
        h >= self.h_min
            && h <= self.h_max
            && s >= self.s_min
            && s <= self.s_max
            && v >= self.v_min
            && v <= self.v_max
    }
}

// Red wraps across hue 0/180, so it needs two bands.
const RED_LOW: HsvRange = HsvRange::new(0, 10, 5, 255, 150, 255);
const RED_HIGH: HsvRange = HsvRange::new(175, 180, 5, 255, 150, 255);
const YELLOW: HsvRange = HsvRange::new(25, 35, 5, 180, 150, 255);
const GREEN: HsvRange = HsvRange::new(35, 90, 5, 255, 150, 255);

/// Classify the dominant lamp color under `bbox`.
///
/// Ties break in red/yellow/green order; a winner at or below
/// `MIN_COLOR_PIXELS` yields the color-indeterminate class.
pub(crate) fn classify_region(rgb: &RgbImage, bbox: &BoundingBox) -> LabelClass {
    let w = bbox.w as usize;
    let h = bbox.h as usize;

    let mut red_mask = vec![0u8; w * h];
    let mut yellow_mask = vec![0u8; w * h];
    let mut green_mask = vec![0u8; w * h];

    for dy in 0..bbox.h {
        for dx in 0..bbox.w {
            let p = rgb.get_pixel(bbox.x + dx, bbox.y + dy).0;
            let (hue, sat, val) = rgb_to_hsv(p[0], p[1], p[2]);
            let val = suppress_background(val);

            let idx = dy as usize * w + dx as usize;
            if RED_LOW.contains(hue, sat, val) || RED_HIGH.contains(hue, sat, val) {
                red_mask[idx] = 255;
            }
            if YELLOW.contains(hue, sat, val) {
                yellow_mask[idx] = 255;
            }
            if GREEN.contains(hue, sat, val) {
                green_mask[idx] = 255;
            }
        }
    }

    let red = count_nonzero(&median_denoise(&red_mask, w, h));
    let yellow = count_nonzero(&median_denoise(&yellow_mask, w, h));
    let green = count_nonzero(&median_denoise(&green_mask, w, h));

    let winner = red.max(yellow).max(green);
    if winner > MIN_COLOR_PIXELS {
        if winner == red {
            LabelClass::TrafficLightRed
        } else if winner == yellow {
            LabelClass::TrafficLightYellow
        } else {
            LabelClass::TrafficLightGreen
        }
    } else {
        LabelClass::TrafficLight
    }
}

/// RGB to HSV, OpenCV 8-bit convention: H in 0..=180, S and V in 0..=255.
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let rf = r as f64;
    let gf = g as f64;
    let bf = b as f64;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let h_deg = if delta == 0.0 {
        0.0
    } else if max == rf {
        let h = 60.0 * (gf - bf) / delta;
        if h < 0.0 {
            h + 360.0
        } else {
            h
        }
    } else if max == gf {
        60.0 * (bf - rf) / delta + 120.0
    } else {
        60.0 * (rf - gf) / delta + 240.0
    };

    (
        (h_deg / 2.0).round() as u8,
        s.round() as u8,
        v.round() as u8,
    )
}

/// Brightness-floor normalization: raise values below the floor to it,
/// then subtract the floor everywhere. Suppresses a uniform dark housing
/// without inverting bright lamp pixels.
fn suppress_background(v: u8) -> u8 {
    v.max(BRIGHTNESS_FLOOR) - BRIGHTNESS_FLOOR
}

/// Square-kernel median filter over a binary 0/255 mask, borders replicated.
///
/// For a binary image the median is the majority vote over the window.
fn median_denoise(mask: &[u8], width: usize, height: usize) -> Vec<u8> {
    let half = (MEDIAN_KERNEL / 2) as i64;
    let majority = (MEDIAN_KERNEL * MEDIAN_KERNEL / 2 + 1) as u32;
    let mut out = vec![0u8; mask.len()];

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut set = 0u32;
            for dy in -half..=half {
                for dx in -half..=half {
                    let sx = (x + dx).clamp(0, width as i64 - 1) as usize;
                    let sy = (y + dy).clamp(0, height as i64 - 1) as usize;
                    if mask[sy * width + sx] != 0 {
                        set += 1;
                    }
                }
            }
            if set >= majority {
                out[y as usize * width + x as usize] = 255;
            }
        }
    }

    out
}

fn count_nonzero(mask: &[u8]) -> u32 {
    mask.iter().filter(|&&v| v != 0).count() as u32
}
