//! Link attraction and centring.
//!
//! One damped step of a spring layout, run every tick ahead of the hard
//! constraints. Linked rooms whose walls do not yet touch are pulled toward
//! a rest length of half their smaller width plus half their smaller
//! height, and every free room drifts weakly toward the layout centre.
//!
//! Displacements are accumulated first and applied together, so the result
//! does not depend on room order. Pinned rooms are never displaced.

use serde::{Deserialize, Serialize};

use crate::geometry::{are_adjacent, Point};
use crate::layout::Room;

/// Energy of a single tick relative to a freshly started simulation.
const TICK_ALPHA: f32 = 0.3;

/// Spring layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceConfig {
    /// Spring strength along links, in [0, 1]. Zero disables attraction.
    pub link_strength: f32,
    /// Pull toward the layout centre, in [0, 1].
    pub center_strength: f32,
    /// Share of each tick's motion lost to friction, in [0, 1].
    pub velocity_decay: f32,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            link_strength: 0.8,
            center_strength: 0.01,
            velocity_decay: 0.7,
        }
    }
}

impl ForceConfig {
    /// No attraction and no centring.
    pub fn disabled() -> Self {
        Self {
            link_strength: 0.0,
            center_strength: 0.0,
            velocity_decay: 0.7,
        }
    }

    fn gain(&self) -> f32 {
        TICK_ALPHA * (1.0 - self.velocity_decay)
    }
}

/// Rest length between the centres of two linked rooms.
pub fn link_distance(a: &Room, b: &Room) -> f32 {
    a.width.min(b.width) / 2.0 + a.height.min(b.height) / 2.0
}

/// Apply one tick of link attraction and centring.
///
/// The room with more links moves less along a shared spring; if one end
/// is pinned the other covers the whole pull. Returns how many rooms moved.
pub fn apply_forces(
    rooms: &mut [Room],
    neighbors: &[Vec<usize>],
    center: Option<Point>,
    config: &ForceConfig,
    tolerance: f32,
) -> usize {
    let n = rooms.len();
    let gain = config.gain();
    let mut disp = vec![(0.0f32, 0.0f32); n];

    // 1. Springs along unmet links.
    for (i, list) in neighbors.iter().enumerate().take(n) {
        for &j in list.iter().filter(|&&j| j > i && j < n) {
            let (a, b) = (&rooms[i], &rooms[j]);
            if (a.pinned && b.pinned) || are_adjacent(&a.rect(), &b.rect(), tolerance) {
                continue;
            }
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let dist = dx.hypot(dy);
            let rest = link_distance(a, b);
            if dist <= rest {
                continue;
            }
            let pull = (dist - rest) / dist * config.link_strength * gain;
            // share of the pull taken by b
            let share = match (a.pinned, b.pinned) {
                (true, _) => 1.0,
                (_, true) => 0.0,
                _ => {
                    let (deg_a, deg_b) = (list.len() as f32, neighbors[j].len() as f32);
                    deg_a / (deg_a + deg_b)
                }
            };
            disp[i].0 += dx * pull * (1.0 - share);
            disp[i].1 += dy * pull * (1.0 - share);
            disp[j].0 -= dx * pull * share;
            disp[j].1 -= dy * pull * share;
        }
    }

    // 2. Centring.
    if let Some(c) = center {
        let k = config.center_strength * gain;
        for (d, r) in disp.iter_mut().zip(rooms.iter()) {
            d.0 += (c.x - r.x) * k;
            d.1 += (c.y - r.y) * k;
        }
    }

    // 3. Move.
    let mut moved = 0;
    for (room, (dx, dy)) in rooms.iter_mut().zip(disp) {
        if room.pinned || (dx == 0.0 && dy == 0.0) {
            continue;
        }
        room.x += dx;
        room.y += dy;
        moved += 1;
    }
    moved
}
