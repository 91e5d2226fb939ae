//! Grid snapping for positions and room sizes.
//!
//! The grid is anchored at the top-left of the boundary's bounding box and
//! only exists when a boundary does. Spacing is configured in metres and
//! converted to layout units here.

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_GRID_SPACING, UNITS_PER_METER};
use crate::geometry::{bounding_box, Point};
use crate::layout::{Layout, Room};

/// Per-run grid settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Grid spacing in metres.
    pub spacing: f32,
    /// Snap room positions (top-left corner) to grid lines.
    pub snap_positions: bool,
    /// Round room sizes to whole grid cells before the run.
    pub snap_sizes: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            snap_positions: true,
            snap_sizes: false,
        }
    }
}

/// Bounding rectangle the grid is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl GridBounds {
    pub fn from_boundary(boundary: &[Point]) -> Option<Self> {
        let (min, max) = bounding_box(boundary)?;
        Some(Self {
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
        })
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// A usable grid: bounds plus spacing in layout units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub bounds: GridBounds,
    pub spacing: f32,
}

impl Grid {
    /// Grid for a spacing given in metres. Spacing below the minimum is
    /// raised to it.
    pub fn new(bounds: GridBounds, spacing_m: f32) -> Self {
        Self {
            bounds,
            spacing: spacing_m.max(MIN_GRID_SPACING) * UNITS_PER_METER,
        }
    }

    /// The layout's grid, or `None` when it has no boundary.
    pub fn for_layout(layout: &Layout, spacing_m: f32) -> Option<Self> {
        let bounds = GridBounds::from_boundary(layout.boundary()?)?;
        Some(Self::new(bounds, spacing_m))
    }

    /// Snap a room-sized rectangle centred at (x, y).
    pub fn snap_rect(&self, x: f32, y: f32, width: f32, height: f32) -> Point {
        snap_position(x, y, Some((width, height)), &self.bounds, self.spacing)
    }

    pub fn snap_room(&self, room: &Room) -> Point {
        self.snap_rect(room.x, room.y, room.width, room.height)
    }
}

fn snap_axis(v: f32, origin: f32, spacing: f32) -> f32 {
    ((v - origin) / spacing).round() * spacing + origin
}

/// Snap a rectangle's top-left corner to the nearest grid intersection
/// and return the resulting centre. Without a usable size the bare point
/// is snapped instead.
pub fn snap_position(
    x: f32,
    y: f32,
    size: Option<(f32, f32)>,
    bounds: &GridBounds,
    spacing: f32,
) -> Point {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Point::new(x, y);
    }
    match size {
        Some((w, h)) if w > 0.0 && h > 0.0 => {
            let left = snap_axis(x - w / 2.0, bounds.min_x, spacing);
            let top = snap_axis(y - h / 2.0, bounds.min_y, spacing);
            Point::new(left + w / 2.0, top + h / 2.0)
        }
        _ => Point::new(
            snap_axis(x, bounds.min_x, spacing),
            snap_axis(y, bounds.min_y, spacing),
        ),
    }
}

// ── Size snapping ───────────────────────────────────────────────────────

/// Outcome of rounding a room's size to whole grid cells (metres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSnap {
    pub width: f32,
    pub height: f32,
    pub meets_requirement: bool,
    /// Relative deviation of the snapped area from the target.
    pub area_change: f32,
}

/// Pick the floor/ceil grid multiple for width and height whose area is
/// closest to `target_area`. Ties keep the earlier candidate, in the
/// order (ceil, ceil), (ceil, floor), (floor, ceil), (floor, floor).
/// Neither side ever drops below one grid cell.
pub fn snap_dimensions(
    width_m: f32,
    height_m: f32,
    target_area: f32,
    spacing: f32,
    tolerance: f32,
) -> SizeSnap {
    let mut best = SizeSnap {
        width: spacing,
        height: spacing,
        meets_requirement: false,
        area_change: f32::INFINITY,
    };
    if !(spacing > 0.0 && target_area > 0.0) {
        return best;
    }

    let w_cells = width_m / spacing;
    let h_cells = height_m / spacing;
    let candidates = [
        (w_cells.ceil(), h_cells.ceil()),
        (w_cells.ceil(), h_cells.floor()),
        (w_cells.floor(), h_cells.ceil()),
        (w_cells.floor(), h_cells.floor()),
    ];

    for (w, h) in candidates {
        let width = w.max(1.0) * spacing;
        let height = h.max(1.0) * spacing;
        let deviation = (width * height - target_area).abs() / target_area;
        if deviation < best.area_change {
            best = SizeSnap {
                width,
                height,
                meets_requirement: deviation <= tolerance,
                area_change: deviation,
            };
        }
    }
    best
}

/// [`snap_dimensions`] for a room, working from its pre-snap size when
/// one is stored.
pub fn snap_room_dimensions(room: &Room, spacing: f32, tolerance: f32) -> SizeSnap {
    let (w, h) = room.original_size.unwrap_or((room.width, room.height));
    snap_dimensions(
        w / UNITS_PER_METER,
        h / UNITS_PER_METER,
        room.area,
        spacing,
        tolerance,
    )
}

/// A room whose snapped size misses the area tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaWarning {
    pub id: u32,
    pub code: String,
    pub name: String,
    pub original_area: f32,
    pub new_area: f32,
    pub area_change: f32,
}

/// Snap every room's size to the grid, remembering the original size.
/// Returns a warning per room outside `tolerance`.
pub fn apply_size_snap(layout: &mut Layout, spacing: f32, tolerance: f32) -> Vec<AreaWarning> {
    let mut warnings = Vec::new();
    for room in layout.rooms_mut() {
        let snap = snap_room_dimensions(room, spacing, tolerance);
        if room.original_size.is_none() {
            room.original_size = Some((room.width, room.height));
        }
        room.width = snap.width * UNITS_PER_METER;
        room.height = snap.height * UNITS_PER_METER;
        room.grid_adjusted = true;
        room.meets_area_requirement = snap.meets_requirement;

        if !snap.meets_requirement {
            log::debug!(
                "room {} ({}) snapped to {}×{} m, {:.1}% off target",
                room.code,
                room.name,
                snap.width,
                snap.height,
                snap.area_change * 100.0
            );
            warnings.push(AreaWarning {
                id: room.id,
                code: room.code.clone(),
                name: room.name.clone(),
                original_area: room.area,
                new_area: snap.width * snap.height,
                area_change: snap.area_change,
            });
        }
    }
    warnings
}

/// Undo [`apply_size_snap`]. Returns how many rooms were restored.
pub fn restore_sizes(layout: &mut Layout) -> usize {
    let mut restored = 0;
    for room in layout.rooms_mut() {
        if let Some((w, h)) = room.original_size.take() {
            room.width = w;
            room.height = h;
            room.grid_adjusted = false;
            room.meets_area_requirement = true;
            restored += 1;
        }
    }
    restored
}

// ── Empty cells ─────────────────────────────────────────────────────────

/// Grid points inside `bounds` (inset by one `spacing`) that no room,
/// inflated by half a spacing, covers. Scans column-major.
pub fn find_empty_cells(rooms: &[Room], bounds: &GridBounds, spacing: f32) -> Vec<Point> {
    let mut cells = Vec::new();
    if !(spacing.is_finite() && spacing > 0.0) {
        return cells;
    }

    let mut x = bounds.min_x + spacing;
    while x < bounds.max_x - spacing {
        let mut y = bounds.min_y + spacing;
        while y < bounds.max_y - spacing {
            let covered = rooms.iter().any(|r| {
                (r.x - x).abs() < r.width / 2.0 + spacing / 2.0
                    && (r.y - y).abs() < r.height / 2.0 + spacing / 2.0
            });
            if !covered {
                cells.push(Point::new(x, y));
            }
            y += spacing;
        }
        x += spacing;
    }
    cells
}
