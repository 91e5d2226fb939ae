//! Hard constraints: no overlap, stay inside the boundary.
//!
//! Both passes are bounded-effort and meant to be re-run every tick rather
//! than driven to convergence once. Pinned rooms are never moved here.
//!
//! `settle` is the per-tick pass the optimizer runs after each step:
//! link attraction, boundary rollback, guarded grid snap, wall alignment
//! for linked pairs that are nearly flush, and overlap separation last.

use crate::forces::{apply_forces, ForceConfig};
use crate::geometry::{are_adjacent, bounding_box, corners_inside, Point};
use crate::grid::Grid;
use crate::layout::Room;

/// Passes per `resolve_overlaps` call.
pub const OVERLAP_PASSES: usize = 5;

/// Push overlapping rooms apart along their axis of least overlap.
///
/// Each pass visits every unordered pair that is not fully pinned. Two free
/// rooms each move half the overlap; a free room next to a pinned one is
/// placed flush against it. Returns `true` once a pass finds no overlap,
/// `false` if the pass budget ran out first.
pub fn resolve_overlaps(rooms: &mut [Room], max_passes: usize) -> bool {
    for _ in 0..max_passes {
        let mut found = false;

        for i in 0..rooms.len() {
            for j in (i + 1)..rooms.len() {
                let (a_pinned, b_pinned) = (rooms[i].pinned, rooms[j].pinned);
                if a_pinned && b_pinned {
                    continue;
                }

                let (ax, ay, aw, ah) = (rooms[i].x, rooms[i].y, rooms[i].width, rooms[i].height);
                let (bx, by, bw, bh) = (rooms[j].x, rooms[j].y, rooms[j].width, rooms[j].height);
                let dx = bx - ax;
                let dy = by - ay;
                let min_dx = (aw + bw) / 2.0;
                let min_dy = (ah + bh) / 2.0;

                if dx.abs() >= min_dx || dy.abs() >= min_dy {
                    continue;
                }
                found = true;

                let overlap_x = min_dx - dx.abs();
                let overlap_y = min_dy - dy.abs();
                let along_x = overlap_x < overlap_y;
                // direction from a to b; coincident centres part along +
                let sx = if dx > 0.0 { 1.0 } else { -1.0 };
                let sy = if dy > 0.0 { 1.0 } else { -1.0 };

                match (a_pinned, b_pinned) {
                    (false, false) => {
                        if along_x {
                            let m = overlap_x / 2.0;
                            rooms[i].x -= sx * m;
                            rooms[j].x += sx * m;
                        } else {
                            let m = overlap_y / 2.0;
                            rooms[i].y -= sy * m;
                            rooms[j].y += sy * m;
                        }
                    }
                    (false, true) => {
                        if along_x {
                            rooms[i].x = bx - sx * min_dx;
                        } else {
                            rooms[i].y = by - sy * min_dy;
                        }
                    }
                    (true, _) => {
                        if along_x {
                            rooms[j].x = ax + sx * min_dx;
                        } else {
                            rooms[j].y = ay + sy * min_dy;
                        }
                    }
                }
            }
        }

        if !found {
            return true;
        }
    }
    false
}

/// Whether any other room overlaps room `i`.
pub fn overlaps_any(rooms: &[Room], i: usize) -> bool {
    let rect = rooms[i].rect();
    rooms
        .iter()
        .enumerate()
        .any(|(j, other)| j != i && rect.overlaps(&other.rect()))
}

/// Roll unpinned rooms with a corner outside the boundary back to their
/// last valid centre; record the centre of rooms that are inside.
/// Returns how many rooms were rolled back.
pub fn enforce_boundary(rooms: &mut [Room], boundary: Option<&[Point]>) -> usize {
    let Some(poly) = boundary else {
        return 0;
    };
    let mut reverted = 0;
    for room in rooms.iter_mut().filter(|r| !r.pinned) {
        if corners_inside(&room.rect(), Some(poly)) {
            room.last_valid = Some(room.center());
        } else if let Some(valid) = room.last_valid {
            room.set_center(valid);
            reverted += 1;
        }
    }
    reverted
}

/// Make nearly-flush linked pairs exactly flush.
///
/// A pair qualifies on an axis when its wall gap there is within
/// `tolerance + 1` of touching and the rooms clearly overlap on the other
/// axis. Free pairs meet at their midpoint; if one side is pinned the
/// other moves the whole way. Returns the number of corrections.
pub fn align_edges(rooms: &mut [Room], neighbors: &[Vec<usize>], tolerance: f32) -> usize {
    let threshold = tolerance + 1.0;
    let n = rooms.len();
    let mut aligned = 0;

    for (i, list) in neighbors.iter().enumerate().take(n) {
        for &j in list.iter().filter(|&&j| j > i && j < n) {
            if rooms[i].pinned && rooms[j].pinned {
                continue;
            }
            let (s, t) = (&rooms[i], &rooms[j]);
            let touch_x = (s.width + t.width) / 2.0;
            let touch_y = (s.height + t.height) / 2.0;
            let dx = (s.x - t.x).abs();
            let dy = (s.y - t.y).abs();

            if (dx - touch_x).abs() <= threshold && dy < touch_y - threshold {
                let sign = if s.x <= t.x { 1.0 } else { -1.0 };
                let (sx, tx) = flush(s.x, t.x, s.pinned, t.pinned, sign, touch_x);
                rooms[i].x = sx;
                rooms[j].x = tx;
                aligned += 1;
            }

            let (s, t) = (&rooms[i], &rooms[j]);
            let dx = (s.x - t.x).abs();
            if (dy - touch_y).abs() <= threshold && dx < touch_x - threshold {
                let sign = if s.y <= t.y { 1.0 } else { -1.0 };
                let (sy, ty) = flush(s.y, t.y, s.pinned, t.pinned, sign, touch_y);
                rooms[i].y = sy;
                rooms[j].y = ty;
                aligned += 1;
            }
        }
    }
    aligned
}

/// New coordinates along one axis that put `s` and `t` exactly `touch`
/// apart, `t` on the `sign` side of `s`.
fn flush(s: f32, t: f32, s_pinned: bool, t_pinned: bool, sign: f32, touch: f32) -> (f32, f32) {
    match (s_pinned, t_pinned) {
        (false, false) => {
            let mid = (s + t) / 2.0;
            (mid - sign * touch / 2.0, mid + sign * touch / 2.0)
        }
        (true, _) => (s, s + sign * touch),
        (false, true) => (t - sign * touch, t),
    }
}

/// Snap unpinned rooms to the grid.
///
/// A snap is undone when it would open a wall the room shares with a
/// linked room, push it into a room it was clear of, or take it out of the
/// boundary. Returns how many rooms were snapped.
pub fn snap_to_grid(
    rooms: &mut [Room],
    neighbors: &[Vec<usize>],
    boundary: Option<&[Point]>,
    grid: &Grid,
    tolerance: f32,
) -> usize {
    let mut snapped = 0;
    for i in 0..rooms.len() {
        if rooms[i].pinned {
            continue;
        }
        let here = rooms[i].center();
        let target = grid.snap_room(&rooms[i]);
        if target == here {
            continue;
        }

        let linked = neighbors.get(i).map(Vec::as_slice).unwrap_or(&[]);
        let met: Vec<usize> = linked
            .iter()
            .copied()
            .filter(|&j| j < rooms.len() && are_adjacent(&rooms[i].rect(), &rooms[j].rect(), tolerance))
            .collect();
        let was_overlapping = overlaps_any(rooms, i);
        let was_inside = corners_inside(&rooms[i].rect(), boundary);

        rooms[i].set_center(target);
        let opens_wall = met
            .iter()
            .any(|&j| !are_adjacent(&rooms[i].rect(), &rooms[j].rect(), tolerance));
        let leaves = was_inside && !corners_inside(&rooms[i].rect(), boundary);
        if opens_wall || leaves || (!was_overlapping && overlaps_any(rooms, i)) {
            rooms[i].set_center(here);
        } else {
            snapped += 1;
        }
    }
    snapped
}

/// One simulation tick of constraint upkeep.
///
/// Overlap separation runs last so a tick never ends with overlaps that
/// the snap or alignment introduced, within the pass budget.
pub fn settle(
    rooms: &mut [Room],
    neighbors: &[Vec<usize>],
    boundary: Option<&[Point]>,
    grid: Option<&Grid>,
    forces: &ForceConfig,
    tolerance: f32,
) {
    let center = boundary
        .and_then(bounding_box)
        .map(|(min, max)| Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0));
    apply_forces(rooms, neighbors, center, forces, tolerance);

    let reverted = enforce_boundary(rooms, boundary);
    if reverted > 0 {
        log::trace!("{reverted} rooms rolled back inside the boundary");
    }
    if let Some(grid) = grid {
        snap_to_grid(rooms, neighbors, boundary, grid, tolerance);
    }
    align_edges(rooms, neighbors, tolerance);
    if !resolve_overlaps(rooms, OVERLAP_PASSES) {
        log::trace!("overlaps remain after {OVERLAP_PASSES} separation passes");
    }
}
