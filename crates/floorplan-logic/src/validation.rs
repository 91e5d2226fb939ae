//! Layout validation.
//!
//! Pure functions that inspect rooms and return validation errors. Used by
//! the harness after a run and by integration tests.

use std::collections::HashMap;

use crate::geometry::{corners_inside, Point};
use crate::layout::{Layout, Room};

/// A layout validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

/// Slack allowed before two walls count as overlapping (layout units).
const OVERLAP_SLACK: f32 = 0.1;

// ── A. Per-room ─────────────────────────────────────────────────────────

/// Check that no room has zero, negative or non-finite dimensions.
pub fn check_room_dimensions(rooms: &[Room]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in rooms {
        if !(r.width > 0.0 && r.height > 0.0) || !r.width.is_finite() || !r.height.is_finite() {
            errors.push(ValidationError {
                category: "room_geometry",
                severity: Severity::Error,
                message: format!(
                    "Room {} has non-positive dimensions: {}×{}",
                    r.code, r.width, r.height
                ),
            });
        }
        if !(r.x.is_finite() && r.y.is_finite()) {
            errors.push(ValidationError {
                category: "room_geometry",
                severity: Severity::Error,
                message: format!("Room {} has a non-finite position ({}, {})", r.code, r.x, r.y),
            });
        }
    }
    errors
}

/// Check that room aspect ratios are reasonable (< 10:1).
pub fn check_room_aspect_ratios(rooms: &[Room]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for r in rooms {
        if r.width <= 0.0 || r.height <= 0.0 {
            continue; // caught by dimension check
        }
        let ratio = r.width.max(r.height) / r.width.min(r.height);
        if ratio > 10.0 {
            errors.push(ValidationError {
                category: "room_geometry",
                severity: Severity::Warning,
                message: format!(
                    "Room {} has extreme aspect ratio {:.1}:1 ({}×{})",
                    r.code, ratio, r.width, r.height
                ),
            });
        }
    }
    errors
}

/// Warn about rooms whose grid-snapped size misses the target area.
pub fn check_area_requirements(rooms: &[Room]) -> Vec<ValidationError> {
    rooms
        .iter()
        .filter(|r| !r.meets_area_requirement)
        .map(|r| ValidationError {
            category: "room_area",
            severity: Severity::Warning,
            message: format!(
                "Room {} is {:.1} m² against a target of {:.1} m²",
                r.code,
                r.actual_area(),
                r.area
            ),
        })
        .collect()
}

/// Check every room's corners lie inside the boundary.
pub fn check_rooms_within_boundary(
    rooms: &[Room],
    boundary: Option<&[Point]>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if boundary.is_none() {
        return errors;
    }
    for r in rooms {
        if !corners_inside(&r.rect(), boundary) {
            let rect = r.rect();
            errors.push(ValidationError {
                category: "room_boundary",
                severity: if r.pinned {
                    Severity::Warning
                } else {
                    Severity::Error
                },
                message: format!(
                    "Room {} extends outside boundary: ({:.1},{:.1})→({:.1},{:.1})",
                    r.code,
                    rect.left(),
                    rect.top(),
                    rect.right(),
                    rect.bottom()
                ),
            });
        }
    }
    errors
}

// ── B. Pairwise ─────────────────────────────────────────────────────────

/// Check no two rooms on the same floor overlap. Pairs that are both
/// pinned were placed by hand and are skipped.
pub fn check_room_overlaps(rooms: &[Room]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut by_floor: HashMap<&str, Vec<&Room>> = HashMap::new();
    for r in rooms {
        by_floor.entry(r.floor.as_str()).or_default().push(r);
    }

    for floor_rooms in by_floor.values() {
        for i in 0..floor_rooms.len() {
            for j in (i + 1)..floor_rooms.len() {
                let (a, b) = (floor_rooms[i], floor_rooms[j]);
                if a.pinned && b.pinned {
                    continue;
                }
                let overlap_x = (a.x - b.x).abs() < (a.width + b.width) / 2.0 - OVERLAP_SLACK;
                let overlap_y = (a.y - b.y).abs() < (a.height + b.height) / 2.0 - OVERLAP_SLACK;
                if overlap_x && overlap_y {
                    errors.push(ValidationError {
                        category: "room_overlap",
                        severity: Severity::Error,
                        message: format!("Rooms {} and {} overlap", a.code, b.code),
                    });
                }
            }
        }
    }
    errors
}

// ── C. Run invariants ───────────────────────────────────────────────────

/// Check that every room pinned in `before` sits at the same centre in
/// `after`. Size snapping may still resize it. Rooms missing from `after`
/// are ignored.
pub fn check_pinned_unmoved(before: &[Room], after: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for old in before.iter().filter(|r| r.pinned) {
        let Some(new) = after.room(old.id) else {
            continue;
        };
        if new.x != old.x || new.y != old.y {
            errors.push(ValidationError {
                category: "pinned",
                severity: Severity::Error,
                message: format!(
                    "Pinned room {} moved from ({:.1},{:.1}) to ({:.1},{:.1})",
                    old.code, old.x, old.y, new.x, new.y
                ),
            });
        }
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_all(layout: &Layout) -> Vec<ValidationError> {
    let rooms = layout.rooms();
    let mut all = Vec::new();
    all.extend(check_room_dimensions(rooms));
    all.extend(check_room_aspect_ratios(rooms));
    all.extend(check_area_requirements(rooms));
    all.extend(check_rooms_within_boundary(rooms, layout.boundary()));
    all.extend(check_room_overlaps(rooms));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RoomRecord;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_layout(rooms: &[(&str, f32, f32, f32)]) -> Layout {
        let mut rng = StdRng::seed_from_u64(0);
        let mut layout = Layout::new();
        for (code, x, y, area) in rooms {
            layout.add_room(
                RoomRecord {
                    code: code.to_string(),
                    floor: "F1".into(),
                    area: Some(*area),
                    x: Some(*x),
                    y: Some(*y),
                    ..Default::default()
                },
                &mut rng,
            );
        }
        layout
    }

    fn boundary(size: f32) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn test_valid_rooms_no_errors() {
        let mut layout = make_layout(&[("A", 100.0, 100.0, 25.0), ("B", 150.0, 100.0, 25.0)]);
        layout.set_boundary(Some(boundary(400.0)));
        assert!(validate_all(&layout).is_empty());
    }

    #[test]
    fn test_zero_width_room() {
        let mut layout = make_layout(&[("A", 0.0, 0.0, 25.0)]);
        layout.rooms_mut()[0].width = 0.0;
        let errs = check_room_dimensions(layout.rooms());
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("non-positive"));
    }

    #[test]
    fn test_extreme_aspect_ratio() {
        let mut layout = make_layout(&[("A", 0.0, 0.0, 25.0)]);
        layout.set_width(0, 25.0).unwrap(); // 25 m × 1 m
        let errs = check_room_aspect_ratios(layout.rooms());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].severity, Severity::Warning);
    }

    #[test]
    fn test_room_outside_boundary() {
        let mut layout = make_layout(&[("A", 390.0, 100.0, 25.0), ("B", 100.0, 100.0, 25.0)]);
        layout.set_boundary(Some(boundary(400.0)));
        let errs = check_rooms_within_boundary(layout.rooms(), layout.boundary());
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("Room A"));
        assert!(check_rooms_within_boundary(layout.rooms(), None).is_empty());
    }

    #[test]
    fn test_overlapping_rooms() {
        let layout = make_layout(&[("A", 0.0, 0.0, 25.0), ("B", 25.0, 25.0, 25.0)]);
        let errs = check_room_overlaps(layout.rooms());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].category, "room_overlap");
    }

    #[test]
    fn test_no_overlap_adjacent() {
        let layout = make_layout(&[("A", 0.0, 0.0, 25.0), ("B", 50.0, 0.0, 25.0)]);
        assert!(check_room_overlaps(layout.rooms()).is_empty());
    }

    #[test]
    fn test_overlap_on_other_floor_ignored() {
        let mut layout = make_layout(&[("A", 0.0, 0.0, 25.0), ("B", 10.0, 0.0, 25.0)]);
        layout.rooms_mut()[1].floor = "F2".into();
        assert!(check_room_overlaps(layout.rooms()).is_empty());
    }

    #[test]
    fn test_pinned_pair_overlap_ignored() {
        let mut layout = make_layout(&[("A", 0.0, 0.0, 25.0), ("B", 10.0, 0.0, 25.0)]);
        layout.set_pinned(0, true).unwrap();
        layout.set_pinned(1, true).unwrap();
        assert!(check_room_overlaps(layout.rooms()).is_empty());
    }

    #[test]
    fn test_pinned_moved() {
        let mut layout = make_layout(&[("A", 0.0, 0.0, 25.0), ("B", 100.0, 0.0, 25.0)]);
        layout.set_pinned(0, true).unwrap();
        let before = layout.rooms().to_vec();
        layout.rooms_mut()[1].x = 300.0;
        assert!(check_pinned_unmoved(&before, &layout).is_empty());
        layout.rooms_mut()[0].x = 1.0;
        let errs = check_pinned_unmoved(&before, &layout);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("Pinned room A"));
    }

    #[test]
    fn test_area_warning() {
        let mut layout = make_layout(&[("A", 0.0, 0.0, 25.0)]);
        layout.rooms_mut()[0].meets_area_requirement = false;
        let errs = check_area_requirements(layout.rooms());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].severity, Severity::Warning);
    }
}
