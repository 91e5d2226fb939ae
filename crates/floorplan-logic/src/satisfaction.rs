//! Adjacency satisfaction scoring.
//!
//! A room's ratio is the share of its required neighbors it actually
//! touches. The aggregate is the plain mean of room ratios, so every room
//! weighs the same no matter how many links it has.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geometry::are_adjacent;
use crate::layout::{Layout, Room};

/// Per-room ratios (aligned with the room slice) and their mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satisfaction {
    pub ratios: Vec<f32>,
    pub aggregate: f32,
}

impl Satisfaction {
    pub fn ratio(&self, index: usize) -> f32 {
        self.ratios.get(index).copied().unwrap_or(1.0)
    }

    /// Ratios keyed by room id.
    pub fn by_id(&self, rooms: &[Room]) -> HashMap<u32, f32> {
        rooms
            .iter()
            .zip(&self.ratios)
            .map(|(r, s)| (r.id, *s))
            .collect()
    }

    /// Aggregate as a percentage.
    pub fn percent(&self) -> f32 {
        self.aggregate * 100.0
    }
}

/// Score rooms against their required neighbors.
///
/// `neighbors[i]` lists the room indices room `i` must touch. Indices out
/// of range are ignored, which keeps a stale neighbor list from counting a
/// deleted room against anyone. A room with no valid neighbors scores 1.
/// An empty layout aggregates to 1.
pub fn evaluate(rooms: &[Room], neighbors: &[Vec<usize>], tolerance: f32) -> Satisfaction {
    let rects: Vec<_> = rooms.iter().map(Room::rect).collect();
    let ratios: Vec<f32> = (0..rooms.len())
        .map(|i| {
            let required: Vec<usize> = neighbors
                .get(i)
                .map(|n| n.iter().copied().filter(|&j| j < rooms.len()).collect())
                .unwrap_or_default();
            if required.is_empty() {
                return 1.0;
            }
            let met = required
                .iter()
                .filter(|&&j| are_adjacent(&rects[i], &rects[j], tolerance))
                .count();
            met as f32 / required.len() as f32
        })
        .collect();

    let aggregate = if ratios.is_empty() {
        1.0
    } else {
        ratios.iter().sum::<f32>() / ratios.len() as f32
    };
    Satisfaction { ratios, aggregate }
}

/// Score a whole layout using its own links.
pub fn evaluate_layout(layout: &Layout, tolerance: f32) -> Satisfaction {
    evaluate(layout.rooms(), &layout.neighbor_indices(), tolerance)
}

/// Whether room `i` touches none of its required neighbors.
pub fn is_isolated(rooms: &[Room], neighbors: &[usize], i: usize, tolerance: f32) -> bool {
    let rect = rooms[i].rect();
    !neighbors
        .iter()
        .any(|&j| are_adjacent(&rect, &rooms[j].rect(), tolerance))
}

/// Required neighbors of room `i` it does not touch yet.
pub fn unmet_neighbors(rooms: &[Room], neighbors: &[usize], i: usize, tolerance: f32) -> Vec<usize> {
    let rect = rooms[i].rect();
    neighbors
        .iter()
        .copied()
        .filter(|&j| !are_adjacent(&rect, &rooms[j].rect(), tolerance))
        .collect()
}
