//! Layout constants: units, size floors, tolerances and link types.
//!
//! Plain constants with no runtime dependency. Both the optimizer and the
//! headless harness read these.

/// Layout units per metre. Areas and grid spacing are given in metres,
/// positions and room extents in layout units.
pub const UNITS_PER_METER: f32 = 10.0;

/// Smallest width/height a room may be given at ingestion (layout units).
pub const MIN_ROOM_SIZE: f32 = 20.0;

/// Area assumed for a room record that carries none (m²).
pub const DEFAULT_ROOM_AREA: f32 = 25.0;

/// Maximum wall gap (layout units) for two rooms to count as touching.
pub const EDGE_TOLERANCE: f32 = 3.0;

/// Smallest accepted grid spacing (metres).
pub const MIN_GRID_SPACING: f32 = 0.5;

/// Relative area deviation accepted when snapping sizes to the grid.
pub const AREA_TOLERANCE: f32 = 0.05;

/// Centre and spread of the initial scatter for rooms without a position.
pub const SCATTER_CENTER: (f32, f32) = (600.0, 400.0);
pub const SCATTER_SPREAD: f32 = 200.0;

/// Link type ids. Only rendering distinguishes them; the solver treats
/// every link with a type above `NONE` as a required adjacency.
pub mod link_types {
    pub const NONE: u8 = 0;
    pub const DIRECT: u8 = 1;
    pub const DOOR: u8 = 2;
    pub const VISUAL: u8 = 3;

    /// Human-readable label for a link type.
    pub fn name(link_type: u8) -> &'static str {
        match link_type {
            NONE => "None",
            DIRECT => "Direct",
            DOOR => "Door",
            VISUAL => "Visual",
            _ => "Other",
        }
    }

    /// Whether a link of this type asks for adjacency at all.
    pub fn is_required(link_type: u8) -> bool {
        link_type != NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_links_are_not_required() {
        assert!(!link_types::is_required(link_types::NONE));
        assert!(link_types::is_required(link_types::DOOR));
        assert!(link_types::is_required(9));
    }

    #[test]
    fn link_type_names() {
        assert_eq!(link_types::name(link_types::DIRECT), "Direct");
        assert_eq!(link_types::name(42), "Other");
    }

    #[test]
    fn min_room_size_covers_small_areas() {
        // 2 m² → sqrt(2) * 10 ≈ 14 units, below the floor
        assert!((2.0f32).sqrt() * UNITS_PER_METER < MIN_ROOM_SIZE);
    }
}
