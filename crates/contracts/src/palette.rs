//! Semantic segmentation palette
//!
//! Fixed mapping from simulator semantic tags to display colors, matching
//! the CityScapes palette the segmentation camera renders with. The label
//! extractor matches `TRAFFIC_LIGHT_COLOR` against decoded pixels exactly,
//! so these values are part of the on-disk contract.

/// RGB color triple.
pub type PaletteColor = (u8, u8, u8);

/// Semantic tag carried by the traffic-light class.
pub const TRAFFIC_LIGHT_TAG: u8 = 18;

/// Palette color of `TRAFFIC_LIGHT_TAG`.
pub const TRAFFIC_LIGHT_COLOR: PaletteColor = (250, 170, 30);

/// CityScapes colors indexed by semantic tag.
pub const SEMANTIC_PALETTE: [PaletteColor; 23] = [
    (0, 0, 0),       // 0  unlabeled
    (70, 70, 70),    // 1  building
    (100, 40, 40),   // 2  fence
    (55, 90, 80),    // 3  other
    (220, 20, 60),   // 4  pedestrian
    (153, 153, 153), // 5  pole
    (157, 234, 50),  // 6  road line
    (128, 64, 128),  // 7  road
    (244, 35, 232),  // 8  sidewalk
    (107, 142, 35),  // 9  vegetation
    (0, 0, 142),     // 10 vehicle
    (102, 102, 156), // 11 wall
    (220, 220, 0),   // 12 traffic sign
    (70, 130, 180),  // 13 sky
    (81, 0, 81),     // 14 ground
    (150, 100, 100), // 15 bridge
    (230, 150, 140), // 16 rail track
    (180, 165, 180), // 17 guard rail
    (250, 170, 30),  // 18 traffic light
    (110, 190, 160), // 19 static
    (170, 120, 50),  // 20 dynamic
    (45, 60, 150),   // 21 water
    (145, 170, 100), // 22 terrain
];

/// Palette color for a semantic tag; out-of-range tags map to unlabeled.
#[inline]
pub fn palette_color(tag: u8) -> PaletteColor {
    SEMANTIC_PALETTE
        .get(tag as usize)
        .copied()
        .unwrap_or(SEMANTIC_PALETTE[0])
}
