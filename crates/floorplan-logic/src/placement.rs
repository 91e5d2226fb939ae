//! Placement search: docking candidates, blocked rooms and trial swaps.
//!
//! Everything here is a small enumeration over the rooms it is handed.
//! Nothing is retained between calls.

use serde::{Deserialize, Serialize};

use crate::geometry::{dock_position, free_edges, Edge, Point};
use crate::layout::Room;
use crate::satisfaction::{evaluate, unmet_neighbors};

/// Distance a blocked-room nudge is pushed toward its neighbor.
pub const NUDGE_STEP: f32 = 5.0;

/// Where a room could sit flush against another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DockCandidate {
    /// Centre for the docking room.
    pub position: Point,
    /// Wall of the anchor room it docks against.
    pub edge: Edge,
    /// Displacement from the docking room's current centre.
    pub distance: f32,
}

/// Best spot to place room `b` flush against room `a`.
///
/// Only pairs of free walls that face each other are tried (a's top with
/// b's bottom and so on). Candidates that would overlap any third room
/// are rejected; among the rest the one closest to `b` wins.
pub fn find_best_dock(rooms: &[Room], a: usize, b: usize, tolerance: f32) -> Option<DockCandidate> {
    if a == b || a >= rooms.len() || b >= rooms.len() {
        return None;
    }
    let rects: Vec<_> = rooms.iter().map(Room::rect).collect();
    let others_of = |k: usize| {
        rects
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != k)
            .map(|(_, r)| r)
    };
    let a_free = free_edges(&rects[a], others_of(a), tolerance);
    let b_free = free_edges(&rects[b], others_of(b), tolerance);
    let b_center = rects[b].center();

    let mut best: Option<DockCandidate> = None;
    for edge_a in a_free.free() {
        for edge_b in b_free.free() {
            if edge_b != edge_a.opposite() {
                continue;
            }
            let position = dock_position(&rects[a], &rects[b], edge_a);
            let placed = rects[b].moved_to(position.x, position.y);
            let blocked = rects
                .iter()
                .enumerate()
                .any(|(k, r)| k != a && k != b && placed.overlaps(r));
            if blocked {
                continue;
            }
            let distance = b_center.distance(position);
            if best.map_or(true, |c| distance < c.distance) {
                best = Some(DockCandidate {
                    position,
                    edge: edge_a,
                    distance,
                });
            }
        }
    }
    best
}

/// Rooms that cannot take a step toward any unmet neighbor.
///
/// A room is blocked when it has unmet required neighbors and a
/// `NUDGE_STEP` nudge toward each of them runs into some other room.
/// Neighbors sharing the room's centre give no direction and are skipped.
pub fn find_blocked_rooms(rooms: &[Room], neighbors: &[Vec<usize>], tolerance: f32) -> Vec<usize> {
    let mut blocked = Vec::new();
    for (i, list) in neighbors.iter().enumerate().take(rooms.len()) {
        let valid: Vec<usize> = list.iter().copied().filter(|&j| j < rooms.len()).collect();
        let unmet = unmet_neighbors(rooms, &valid, i, tolerance);
        if unmet.is_empty() {
            continue;
        }

        let here = rooms[i].rect();
        let mut nudges = 0;
        let mut collisions = 0;
        for j in unmet {
            let dx = rooms[j].x - rooms[i].x;
            let dy = rooms[j].y - rooms[i].y;
            let d = dx.hypot(dy);
            if d == 0.0 {
                continue;
            }
            nudges += 1;
            let nudged = here.moved_to(
                here.cx + dx / d * NUDGE_STEP,
                here.cy + dy / d * NUDGE_STEP,
            );
            let hits = rooms
                .iter()
                .enumerate()
                .any(|(k, r)| k != i && nudged.overlaps(&r.rect()));
            if hits {
                collisions += 1;
            }
        }
        if nudges > 0 && collisions == nudges {
            blocked.push(i);
        }
    }
    blocked
}

/// Exchange the centres of rooms `i` and `j` and keep the exchange only if
/// aggregate satisfaction strictly improves. Pinned rooms never swap.
pub fn try_swap(
    rooms: &mut [Room],
    neighbors: &[Vec<usize>],
    i: usize,
    j: usize,
    tolerance: f32,
) -> bool {
    if i == j || i >= rooms.len() || j >= rooms.len() || rooms[i].pinned || rooms[j].pinned {
        return false;
    }
    let before = evaluate(rooms, neighbors, tolerance).aggregate;
    swap_centers(rooms, i, j);
    let after = evaluate(rooms, neighbors, tolerance).aggregate;
    if after > before {
        log::debug!(
            "swapped {} and {} ({:.3} → {:.3})",
            rooms[i].code,
            rooms[j].code,
            before,
            after
        );
        true
    } else {
        swap_centers(rooms, i, j);
        false
    }
}

fn swap_centers(rooms: &mut [Room], i: usize, j: usize) {
    let (pi, pj) = (rooms[i].center(), rooms[j].center());
    rooms[i].set_center(pj);
    rooms[j].set_center(pi);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::are_adjacent;
    use crate::layout::{Layout, RoomRecord};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn room(id: u32, x: f32, y: f32, w: f32, h: f32) -> Room {
        let mut rng = StdRng::seed_from_u64(0);
        let mut layout = Layout::new();
        layout.add_room(
            RoomRecord {
                code: format!("R{id}"),
                x: Some(x),
                y: Some(y),
                ..Default::default()
            },
            &mut rng,
        );
        let mut r = layout.rooms()[0].clone();
        r.id = id;
        r.width = w;
        r.height = h;
        r
    }

    // ── Docking ─────────────────────────────────────────────────────────

    #[test]
    fn docks_on_nearest_facing_wall() {
        let rooms = vec![room(0, 0.0, 0.0, 50.0, 50.0), room(1, 120.0, 10.0, 40.0, 40.0)];
        let c = find_best_dock(&rooms, 0, 1, 3.0).unwrap();
        assert_eq!(c.edge, Edge::Right);
        assert_eq!(c.position, Point::new(45.0, 0.0));
        assert!((c.distance - 75.0f32.hypot(10.0)).abs() < 1e-4);

        let mut moved = rooms.clone();
        moved[1].set_center(c.position);
        assert!(are_adjacent(&moved[0].rect(), &moved[1].rect(), 3.0));
    }

    #[test]
    fn occupied_wall_is_skipped() {
        // a third room already sits on A's right wall
        let rooms = vec![
            room(0, 0.0, 0.0, 50.0, 50.0),
            room(1, 120.0, 0.0, 40.0, 40.0),
            room(2, 50.0, 0.0, 50.0, 50.0),
        ];
        let c = find_best_dock(&rooms, 0, 1, 3.0).unwrap();
        assert_ne!(c.edge, Edge::Right);
        let placed = rooms[1].rect().moved_to(c.position.x, c.position.y);
        assert!(!placed.overlaps(&rooms[2].rect()));
    }

    #[test]
    fn candidate_overlapping_third_room_is_rejected() {
        // free walls everywhere, but a room sits where B would dock on the right
        let rooms = vec![
            room(0, 0.0, 0.0, 50.0, 50.0),
            room(1, 200.0, 0.0, 40.0, 40.0),
            room(2, 60.0, 20.0, 20.0, 20.0),
        ];
        let c = find_best_dock(&rooms, 0, 1, 3.0).unwrap();
        assert_ne!(c.edge, Edge::Right);
    }

    #[test]
    fn fully_enclosed_anchor_has_no_dock() {
        let rooms = vec![
            room(0, 0.0, 0.0, 50.0, 50.0),
            room(1, 300.0, 300.0, 40.0, 40.0),
            room(2, 50.0, 0.0, 50.0, 50.0),
            room(3, -50.0, 0.0, 50.0, 50.0),
            room(4, 0.0, 50.0, 50.0, 50.0),
            room(5, 0.0, -50.0, 50.0, 50.0),
        ];
        assert!(find_best_dock(&rooms, 0, 1, 3.0).is_none());
        assert!(find_best_dock(&rooms, 0, 0, 3.0).is_none());
        assert!(find_best_dock(&rooms, 0, 9, 3.0).is_none());
    }

    // ── Blocked rooms ───────────────────────────────────────────────────

    #[test]
    fn wedged_room_is_blocked() {
        // 0 wants 3 to the right, but 1 is flush in between
        let rooms = vec![
            room(0, 0.0, 0.0, 50.0, 50.0),
            room(1, 50.0, 0.0, 50.0, 50.0),
            room(2, 0.0, 300.0, 50.0, 50.0),
            room(3, 200.0, 0.0, 50.0, 50.0),
        ];
        let neighbors = vec![vec![3], vec![], vec![], vec![0]];
        let blocked = find_blocked_rooms(&rooms, &neighbors, 3.0);
        assert_eq!(blocked, vec![0]);
    }

    #[test]
    fn open_or_satisfied_rooms_are_not_blocked() {
        let rooms = vec![
            room(0, 0.0, 0.0, 50.0, 50.0),
            room(1, 50.0, 0.0, 50.0, 50.0),
            room(2, 300.0, 0.0, 50.0, 50.0),
        ];
        // 0 and 1 touch; 2 has open space toward 1
        let neighbors = vec![vec![1], vec![0, 2], vec![1]];
        assert!(find_blocked_rooms(&rooms, &neighbors, 3.0).is_empty());
    }

    #[test]
    fn coincident_neighbor_gives_no_direction() {
        let rooms = vec![room(0, 0.0, 0.0, 50.0, 50.0), room(1, 0.0, 0.0, 10.0, 10.0)];
        // same centre, overlapping, not adjacent
        let neighbors = vec![vec![1], vec![0]];
        assert!(find_blocked_rooms(&rooms, &neighbors, 3.0).is_empty());
    }

    // ── Swaps ───────────────────────────────────────────────────────────

    #[test]
    fn improving_swap_is_kept() {
        // 0 must touch 2, but 1 occupies the spot next to 2
        let mut rooms = vec![
            room(0, 400.0, 0.0, 50.0, 50.0),
            room(1, 50.0, 0.0, 50.0, 50.0),
            room(2, 0.0, 0.0, 50.0, 50.0),
        ];
        let neighbors = vec![vec![2], vec![], vec![0]];
        assert!(try_swap(&mut rooms, &neighbors, 0, 1, 3.0));
        assert_eq!(rooms[0].center(), Point::new(50.0, 0.0));
        assert_eq!(rooms[1].center(), Point::new(400.0, 0.0));
    }

    #[test]
    fn neutral_swap_is_reverted() {
        let mut rooms = vec![
            room(0, 0.0, 0.0, 50.0, 50.0),
            room(1, 50.0, 0.0, 50.0, 50.0),
            room(2, 500.0, 0.0, 50.0, 50.0),
        ];
        let neighbors = vec![vec![1], vec![0], vec![]];
        assert!(!try_swap(&mut rooms, &neighbors, 1, 2, 3.0));
        assert_eq!(rooms[1].center(), Point::new(50.0, 0.0));
        assert_eq!(rooms[2].center(), Point::new(500.0, 0.0));
    }

    #[test]
    fn pinned_rooms_never_swap() {
        let mut rooms = vec![
            room(0, 400.0, 0.0, 50.0, 50.0),
            room(1, 50.0, 0.0, 50.0, 50.0),
            room(2, 0.0, 0.0, 50.0, 50.0),
        ];
        rooms[1].pinned = true;
        let neighbors = vec![vec![2], vec![], vec![0]];
        assert!(!try_swap(&mut rooms, &neighbors, 0, 1, 3.0));
        assert_eq!(rooms[1].center(), Point::new(50.0, 0.0));
    }
}
