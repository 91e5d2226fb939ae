//! Room/link/boundary data model and ingestion.
//!
//! `Layout` is an arena: rooms live in a `Vec` and are addressed by a stable
//! `u32` id through an index map. Every optimizer component mutates rooms
//! through this arena rather than through shared references.
//!
//! Ingestion normalizes loader output (`LayoutInput`) into this form:
//! room codes resolve to ids, links are deduplicated per unordered pair,
//! links naming unknown rooms are dropped, and room extents are derived
//! from the target area.
//!
//! ```
//! use floorplan_logic::layout::{Layout, LayoutInput};
//!
//! let json = r#"{
//!     "rooms": [
//!         {"code": "A", "name": "Lobby", "area": 25.0, "x": 0.0, "y": 0.0},
//!         {"code": "B", "name": "Office", "area": 16.0, "x": 80.0, "y": 0.0}
//!     ],
//!     "links": [{"source": "A", "target": "B", "type": 1}]
//! }"#;
//! let layout = Layout::from_json(json, 7).unwrap();
//! assert_eq!(layout.rooms().len(), 2);
//! assert_eq!(layout.links().len(), 1);
//! assert_eq!(layout.rooms()[0].width, 50.0);
//! ```

use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::constants::{
    link_types, DEFAULT_ROOM_AREA, MIN_ROOM_SIZE, SCATTER_CENTER, SCATTER_SPREAD, UNITS_PER_METER,
};
use crate::error::{LayoutError, Result};
use crate::geometry::{bounding_box, is_valid_polygon, Point, Rect};

// ── Records ─────────────────────────────────────────────────────────────

/// A room placed in the layout. Extents and position are in layout units,
/// `area` is the target floor area in m².
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: u32,
    pub code: String,
    pub name: String,
    pub floor: String,
    pub zone: String,
    pub area: f32,
    pub width: f32,
    pub height: f32,
    pub x: f32,
    pub y: f32,
    pub pinned: bool,
    pub grid_adjusted: bool,
    pub meets_area_requirement: bool,
    /// Last centre at which every corner was inside the boundary.
    #[serde(skip)]
    pub last_valid: Option<Point>,
    /// Width/height before grid size snapping, kept for restore.
    #[serde(skip)]
    pub original_size: Option<(f32, f32)>,
}

impl Room {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_center(&mut self, p: Point) {
        self.x = p.x;
        self.y = p.y;
    }

    /// Current footprint in m².
    pub fn actual_area(&self) -> f32 {
        (self.width / UNITS_PER_METER) * (self.height / UNITS_PER_METER)
    }
}

/// Initial square side (layout units) for a target area in m².
pub fn initial_side(area: f32) -> f32 {
    (area.max(0.0).sqrt() * UNITS_PER_METER).max(MIN_ROOM_SIZE)
}

/// Required adjacency between two rooms. Stored with `source < target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: u32,
    pub target: u32,
    pub link_type: u8,
}

impl Link {
    pub fn new(a: u32, b: u32, link_type: u8) -> Self {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        Self {
            source,
            target,
            link_type,
        }
    }

    pub fn touches(&self, id: u32) -> bool {
        self.source == id || self.target == id
    }

    /// The endpoint opposite `id`, if `id` is an endpoint at all.
    pub fn other(&self, id: u32) -> Option<u32> {
        if self.source == id {
            Some(self.target)
        } else if self.target == id {
            Some(self.source)
        } else {
            None
        }
    }
}

// ── Loader input ────────────────────────────────────────────────────────

/// One row of the room table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomRecord {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub area: Option<f32>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub pinned: bool,
}

/// One link by room code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default = "default_link_type")]
    pub link_type: u8,
}

fn default_link_type() -> u8 {
    link_types::DIRECT
}

/// Square connectivity matrix: `rows[i][j] > 0` links `codes[i]` and
/// `codes[j]` with that link type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityMatrix {
    pub codes: Vec<String>,
    pub rows: Vec<Vec<u8>>,
}

impl ConnectivityMatrix {
    /// Flatten into link records, upper and lower triangle alike.
    /// Deduplication happens at ingestion.
    pub fn to_links(&self) -> Result<Vec<LinkRecord>> {
        let n = self.codes.len();
        if self.rows.len() != n {
            return Err(LayoutError::MalformedMatrix(format!(
                "{} codes but {} rows",
                n,
                self.rows.len()
            )));
        }
        let mut links = Vec::new();
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != n {
                return Err(LayoutError::MalformedMatrix(format!(
                    "row {} ({}) has {} cells, expected {}",
                    i,
                    self.codes[i],
                    row.len(),
                    n
                )));
            }
            for (j, &cell) in row.iter().enumerate() {
                if cell > 0 {
                    links.push(LinkRecord {
                        source: self.codes[i].clone(),
                        target: self.codes[j].clone(),
                        link_type: cell,
                    });
                }
            }
        }
        Ok(links)
    }
}

/// Everything a loader hands to the core.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutInput {
    pub rooms: Vec<RoomRecord>,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    #[serde(default)]
    pub matrix: Option<ConnectivityMatrix>,
    /// Boundary polygon in metres.
    #[serde(default)]
    pub boundary: Option<Vec<[f32; 2]>>,
}

// ── Layout arena ────────────────────────────────────────────────────────

/// Summary numbers for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutStats {
    pub total_rooms: usize,
    pub total_links: usize,
    pub total_area: f32,
    pub avg_links_per_room: f32,
}

/// Rooms, required links and an optional boundary.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    rooms: Vec<Room>,
    index: HashMap<u32, usize>,
    links: Vec<Link>,
    link_keys: HashSet<(u32, u32)>,
    boundary: Option<Vec<Point>>,
    next_id: u32,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loader output. Rooms without a position are scattered
    /// around the default centre using `rng`.
    pub fn from_input(input: LayoutInput, rng: &mut impl Rng) -> Result<Self> {
        let mut layout = Layout::new();
        let mut by_code: HashMap<String, u32> = HashMap::new();

        for record in input.rooms {
            if by_code.contains_key(&record.code) {
                return Err(LayoutError::DuplicateRoom(record.code));
            }
            let code = record.code.clone();
            let id = layout.add_room(record, rng);
            by_code.insert(code, id);
        }

        let mut link_records = input.links;
        if let Some(matrix) = &input.matrix {
            link_records.extend(matrix.to_links()?);
        }
        let mut dropped = 0usize;
        for link in &link_records {
            match (by_code.get(&link.source), by_code.get(&link.target)) {
                (Some(&a), Some(&b)) => {
                    layout.add_link(a, b, link.link_type);
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            log::debug!("dropped {} links naming unknown rooms", dropped);
        }

        if let Some(points) = input.boundary {
            let scaled = points
                .iter()
                .map(|[x, y]| Point::new(x * UNITS_PER_METER, y * UNITS_PER_METER))
                .collect();
            layout.set_boundary(Some(scaled));
        }

        Ok(layout)
    }

    /// Parse a JSON `LayoutInput` and build from it with a seeded scatter.
    pub fn from_json(json: &str, seed: u64) -> Result<Self> {
        let input: LayoutInput = serde_json::from_str(json)?;
        let mut rng = StdRng::seed_from_u64(seed);
        Self::from_input(input, &mut rng)
    }

    /// Add a room from a record. Returns its arena id.
    pub fn add_room(&mut self, record: RoomRecord, rng: &mut impl Rng) -> u32 {
        let area = record
            .area
            .filter(|a| a.is_finite() && *a > 0.0)
            .unwrap_or(DEFAULT_ROOM_AREA);
        let side = initial_side(area);
        let half = SCATTER_SPREAD / 2.0;
        let x = record
            .x
            .unwrap_or_else(|| SCATTER_CENTER.0 + rng.gen_range(-half..half));
        let y = record
            .y
            .unwrap_or_else(|| SCATTER_CENTER.1 + rng.gen_range(-half..half));

        let id = self.next_id;
        self.next_id += 1;
        self.index.insert(id, self.rooms.len());
        self.rooms.push(Room {
            id,
            code: record.code,
            name: record.name,
            floor: record.floor,
            zone: record.zone,
            area,
            width: side,
            height: side,
            x,
            y,
            pinned: record.pinned,
            grid_adjusted: false,
            meets_area_requirement: true,
            last_valid: None,
            original_size: None,
        });
        id
    }

    /// Add a link between two existing rooms. Returns `false` for
    /// self-links, unknown endpoints and pairs that are already linked.
    pub fn add_link(&mut self, a: u32, b: u32, link_type: u8) -> bool {
        if a == b || !self.index.contains_key(&a) || !self.index.contains_key(&b) {
            return false;
        }
        let link = Link::new(a, b, link_type);
        if !self.link_keys.insert((link.source, link.target)) {
            return false;
        }
        self.links.push(link);
        true
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Mutable access to room records. The slice cannot grow or shrink,
    /// so ids stay valid.
    pub fn rooms_mut(&mut self) -> &mut [Room] {
        &mut self.rooms
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn boundary(&self) -> Option<&[Point]> {
        self.boundary.as_deref()
    }

    /// Replace the boundary. Polygons that cannot bound anything are
    /// stored as absent.
    pub fn set_boundary(&mut self, boundary: Option<Vec<Point>>) {
        self.boundary = boundary.filter(|b| is_valid_polygon(b));
        for room in &mut self.rooms {
            room.last_valid = None;
        }
    }

    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn room(&self, id: u32) -> Option<&Room> {
        self.index_of(id).map(|i| &self.rooms[i])
    }

    pub fn room_mut(&mut self, id: u32) -> Option<&mut Room> {
        self.index_of(id).map(move |i| &mut self.rooms[i])
    }

    pub fn room_by_code(&self, code: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.code == code)
    }

    /// For each room (by index), the indices of its required neighbors.
    /// Links whose endpoints are not both present are skipped.
    pub fn neighbor_indices(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.rooms.len()];
        for link in &self.links {
            if !link_types::is_required(link.link_type) {
                continue;
            }
            if let (Some(a), Some(b)) = (self.index_of(link.source), self.index_of(link.target)) {
                neighbors[a].push(b);
                neighbors[b].push(a);
            }
        }
        neighbors
    }

    /// Ids of pinned rooms.
    pub fn pinned_ids(&self) -> HashSet<u32> {
        self.rooms.iter().filter(|r| r.pinned).map(|r| r.id).collect()
    }

    pub fn set_pinned(&mut self, id: u32, pinned: bool) -> Result<()> {
        let room = self.room_mut(id).ok_or(LayoutError::UnknownRoom(id))?;
        room.pinned = pinned;
        Ok(())
    }

    /// Flip a room's pin. Returns the new state.
    pub fn toggle_pin(&mut self, id: u32) -> Result<bool> {
        let room = self.room_mut(id).ok_or(LayoutError::UnknownRoom(id))?;
        room.pinned = !room.pinned;
        Ok(room.pinned)
    }

    /// Delete a room together with every link touching it. Its pin goes
    /// with it.
    pub fn remove_room(&mut self, id: u32) -> Result<Room> {
        let idx = self.index_of(id).ok_or(LayoutError::UnknownRoom(id))?;
        let room = self.rooms.remove(idx);
        self.links.retain(|l| !l.touches(id));
        self.link_keys.retain(|&(a, b)| a != id && b != id);
        self.reindex();
        Ok(room)
    }

    fn reindex(&mut self) {
        self.index = self
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, i))
            .collect();
    }

    /// Set a room's width in metres; height follows from the target area.
    pub fn set_width(&mut self, id: u32, width_m: f32) -> Result<()> {
        if !(width_m.is_finite() && width_m > 0.0) {
            return Err(LayoutError::InvalidDimension(width_m));
        }
        let room = self.room_mut(id).ok_or(LayoutError::UnknownRoom(id))?;
        room.width = width_m * UNITS_PER_METER;
        room.height = room.area / width_m * UNITS_PER_METER;
        Ok(())
    }

    /// Set a room's height in metres; width follows from the target area.
    pub fn set_height(&mut self, id: u32, height_m: f32) -> Result<()> {
        if !(height_m.is_finite() && height_m > 0.0) {
            return Err(LayoutError::InvalidDimension(height_m));
        }
        let room = self.room_mut(id).ok_or(LayoutError::UnknownRoom(id))?;
        room.height = height_m * UNITS_PER_METER;
        room.width = room.area / height_m * UNITS_PER_METER;
        Ok(())
    }

    /// Distinct floor tags in first-seen order.
    pub fn floors(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.rooms
            .iter()
            .filter(|r| seen.insert(r.floor.as_str()))
            .map(|r| r.floor.clone())
            .collect()
    }

    /// The rooms of one floor and the links among them. `"all"` copies
    /// the whole layout. Room ids are preserved.
    pub fn floor_view(&self, floor: &str) -> Layout {
        if floor == "all" {
            return self.clone();
        }
        let rooms: Vec<Room> = self
            .rooms
            .iter()
            .filter(|r| r.floor == floor)
            .cloned()
            .collect();
        let mut view = Layout {
            rooms,
            index: HashMap::new(),
            links: Vec::new(),
            link_keys: HashSet::new(),
            boundary: self.boundary.clone(),
            next_id: self.next_id,
        };
        view.reindex();
        for link in &self.links {
            if view.index.contains_key(&link.source) && view.index.contains_key(&link.target) {
                view.link_keys.insert((link.source, link.target));
                view.links.push(*link);
            }
        }
        view
    }

    /// Copy positions and extents of rooms in `view` back into this
    /// layout, matching by id. Returns how many rooms were updated.
    pub fn apply_positions(&mut self, view: &Layout) -> usize {
        let mut updated = 0;
        for r in view.rooms() {
            if let Some(room) = self.room_mut(r.id) {
                room.x = r.x;
                room.y = r.y;
                room.width = r.width;
                room.height = r.height;
                room.grid_adjusted = r.grid_adjusted;
                room.meets_area_requirement = r.meets_area_requirement;
                updated += 1;
            }
        }
        updated
    }

    /// Re-scatter every unpinned room within ±50 units of the boundary's
    /// bounding-box centre. Without a boundary nothing moves.
    pub fn reshuffle(&mut self, rng: &mut impl Rng) {
        let Some((min, max)) = self.boundary.as_deref().and_then(bounding_box) else {
            return;
        };
        let cx = (min.x + max.x) / 2.0;
        let cy = (min.y + max.y) / 2.0;
        for room in self.rooms.iter_mut().filter(|r| !r.pinned) {
            room.x = cx + rng.gen_range(-50.0..50.0);
            room.y = cy + rng.gen_range(-50.0..50.0);
        }
    }

    pub fn stats(&self) -> LayoutStats {
        let total_rooms = self.rooms.len();
        let total_links = self.links.len();
        LayoutStats {
            total_rooms,
            total_links,
            total_area: self.rooms.iter().map(|r| r.area).sum(),
            avg_links_per_room: if total_rooms == 0 {
                0.0
            } else {
                total_links as f32 * 2.0 / total_rooms as f32
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, floor: &str, area: f32, x: f32, y: f32) -> RoomRecord {
        RoomRecord {
            code: code.into(),
            name: format!("Room {code}"),
            floor: floor.into(),
            zone: "CM".into(),
            area: Some(area),
            x: Some(x),
            y: Some(y),
            pinned: false,
        }
    }

    fn three_rooms() -> Layout {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layout = Layout::new();
        let a = layout.add_room(record("A", "F1", 25.0, 0.0, 0.0), &mut rng);
        let b = layout.add_room(record("B", "F1", 16.0, 100.0, 0.0), &mut rng);
        let c = layout.add_room(record("C", "F2", 9.0, 200.0, 0.0), &mut rng);
        layout.add_link(a, b, link_types::DIRECT);
        layout.add_link(b, c, link_types::DOOR);
        layout
    }

    #[test]
    fn sizes_derive_from_area() {
        let layout = three_rooms();
        assert_eq!(layout.rooms()[0].width, 50.0);
        assert_eq!(layout.rooms()[1].height, 40.0);
        // 9 m² → 30 units, above the 20-unit floor
        assert_eq!(layout.rooms()[2].width, 30.0);
        assert_eq!(initial_side(1.0), MIN_ROOM_SIZE);
    }

    #[test]
    fn missing_area_defaults() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut layout = Layout::new();
        let mut r = record("X", "F1", 0.0, 0.0, 0.0);
        r.area = None;
        let id = layout.add_room(r, &mut rng);
        assert_eq!(layout.room(id).unwrap().area, DEFAULT_ROOM_AREA);
    }

    #[test]
    fn links_deduplicate_per_unordered_pair() {
        let mut layout = three_rooms();
        assert!(!layout.add_link(1, 0, link_types::VISUAL));
        assert!(!layout.add_link(0, 0, link_types::DIRECT));
        assert!(!layout.add_link(0, 99, link_types::DIRECT));
        assert_eq!(layout.links().len(), 2);
        assert_eq!(layout.links()[0], Link::new(0, 1, link_types::DIRECT));
    }

    #[test]
    fn link_other_endpoint() {
        let l = Link::new(5, 2, 1);
        assert_eq!((l.source, l.target), (2, 5));
        assert_eq!(l.other(2), Some(5));
        assert_eq!(l.other(5), Some(2));
        assert_eq!(l.other(7), None);
    }

    #[test]
    fn ingestion_drops_unknown_links_and_rejects_duplicates() {
        let mut rng = StdRng::seed_from_u64(3);
        let input = LayoutInput {
            rooms: vec![record("A", "F1", 25.0, 0.0, 0.0), record("B", "F1", 25.0, 60.0, 0.0)],
            links: vec![
                LinkRecord {
                    source: "A".into(),
                    target: "B".into(),
                    link_type: 2,
                },
                LinkRecord {
                    source: "B".into(),
                    target: "A".into(),
                    link_type: 3,
                },
                LinkRecord {
                    source: "A".into(),
                    target: "ZZ".into(),
                    link_type: 1,
                },
            ],
            matrix: None,
            boundary: None,
        };
        let layout = Layout::from_input(input.clone(), &mut rng).unwrap();
        assert_eq!(layout.links().len(), 1);
        assert_eq!(layout.links()[0].link_type, 2);

        let mut dup = input;
        dup.rooms.push(record("A", "F1", 10.0, 0.0, 0.0));
        assert!(matches!(
            Layout::from_input(dup, &mut rng),
            Err(LayoutError::DuplicateRoom(code)) if code == "A"
        ));
    }

    #[test]
    fn matrix_ingestion() {
        let json = r#"{
            "rooms": [{"code": "A"}, {"code": "B"}, {"code": "C"}],
            "matrix": {"codes": ["A", "B", "C"], "rows": [[0, 1, 0], [1, 0, 2], [0, 2, 0]]},
            "boundary": [[0, 0], [100, 0], [100, 80], [0, 80]]
        }"#;
        let layout = Layout::from_json(json, 11).unwrap();
        assert_eq!(layout.links().len(), 2);
        let boundary = layout.boundary().unwrap();
        assert_eq!(boundary[2], Point::new(1000.0, 800.0));
        // scattered around the default centre
        for r in layout.rooms() {
            assert!((r.x - SCATTER_CENTER.0).abs() <= SCATTER_SPREAD / 2.0);
            assert!((r.y - SCATTER_CENTER.1).abs() <= SCATTER_SPREAD / 2.0);
        }
    }

    #[test]
    fn malformed_matrix_is_rejected() {
        let json = r#"{
            "rooms": [{"code": "A"}, {"code": "B"}],
            "matrix": {"codes": ["A", "B"], "rows": [[0, 1]]}
        }"#;
        assert!(matches!(
            Layout::from_json(json, 1),
            Err(LayoutError::MalformedMatrix(_))
        ));
        assert!(matches!(Layout::from_json("{", 1), Err(LayoutError::Json(_))));
    }

    #[test]
    fn degenerate_boundary_is_absent() {
        let mut layout = three_rooms();
        layout.set_boundary(Some(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]));
        assert!(layout.boundary().is_none());
    }

    #[test]
    fn remove_room_drops_links_and_pin() {
        let mut layout = three_rooms();
        layout.set_pinned(1, true).unwrap();
        let removed = layout.remove_room(1).unwrap();
        assert_eq!(removed.code, "B");
        assert!(layout.links().is_empty());
        assert!(layout.pinned_ids().is_empty());
        assert_eq!(layout.index_of(2), Some(1));
        assert!(matches!(layout.remove_room(1), Err(LayoutError::UnknownRoom(1))));
        // ids are never reused
        assert!(!layout.add_link(0, 1, 1));
    }

    #[test]
    fn neighbor_indices_follow_links() {
        let layout = three_rooms();
        let n = layout.neighbor_indices();
        assert_eq!(n[0], vec![1]);
        assert_eq!(n[1], vec![0, 2]);
        assert_eq!(n[2], vec![1]);
    }

    #[test]
    fn none_links_are_not_neighbors() {
        let mut layout = three_rooms();
        layout.add_link(0, 2, link_types::NONE);
        assert_eq!(layout.neighbor_indices()[0], vec![1]);
    }

    #[test]
    fn pin_toggle() {
        let mut layout = three_rooms();
        assert!(layout.toggle_pin(0).unwrap());
        assert!(!layout.toggle_pin(0).unwrap());
        assert!(layout.toggle_pin(42).is_err());
    }

    #[test]
    fn dimension_edit_keeps_area() {
        let mut layout = three_rooms();
        layout.set_width(0, 10.0).unwrap();
        let r = layout.room(0).unwrap();
        assert_eq!(r.width, 100.0);
        assert!((r.height - 25.0).abs() < 1e-4);
        assert!((r.actual_area() - 25.0).abs() < 1e-3);

        layout.set_height(1, 2.0).unwrap();
        let r = layout.room(1).unwrap();
        assert!((r.width - 80.0).abs() < 1e-4);

        assert!(matches!(
            layout.set_width(0, 0.0),
            Err(LayoutError::InvalidDimension(_))
        ));
    }

    #[test]
    fn floor_view_filters_links() {
        let layout = three_rooms();
        assert_eq!(layout.floors(), vec!["F1".to_string(), "F2".to_string()]);
        let f1 = layout.floor_view("F1");
        assert_eq!(f1.rooms().len(), 2);
        assert_eq!(f1.links().len(), 1);
        let all = layout.floor_view("all");
        assert_eq!(all.rooms().len(), 3);
    }

    #[test]
    fn apply_positions_writes_back() {
        let mut layout = three_rooms();
        let mut view = layout.floor_view("F1");
        view.rooms_mut()[0].x = -77.0;
        assert_eq!(layout.apply_positions(&view), 2);
        assert_eq!(layout.room(0).unwrap().x, -77.0);
    }

    #[test]
    fn reshuffle_moves_only_unpinned() {
        let mut layout = three_rooms();
        layout.set_boundary(Some(vec![
            Point::new(0.0, 0.0),
            Point::new(400.0, 0.0),
            Point::new(400.0, 400.0),
            Point::new(0.0, 400.0),
        ]));
        layout.set_pinned(0, true).unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        layout.reshuffle(&mut rng);
        assert_eq!(layout.room(0).unwrap().x, 0.0);
        let b = layout.room(1).unwrap();
        assert!((b.x - 200.0).abs() <= 50.0 && (b.y - 200.0).abs() <= 50.0);
    }

    #[test]
    fn stats_summarize() {
        let layout = three_rooms();
        let s = layout.stats();
        assert_eq!(s.total_rooms, 3);
        assert_eq!(s.total_links, 2);
        assert_eq!(s.total_area, 50.0);
        assert!((s.avg_links_per_room - 4.0 / 3.0).abs() < 1e-6);
        assert_eq!(Layout::new().stats().avg_links_per_room, 0.0);
    }
}
