//! Side-by-side tiling of concurrent items within one lane.
//!
//! Each item's overlap group is itself plus every item it intersects
//! pairwise. The group is not closed transitively: with A overlapping B and
//! B overlapping C (but not A), B is split three ways while A and C are each
//! split two ways. Rendering depends on this exact behaviour.

use crate::models::interval::Interval;

/// One item fed to the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInput {
    pub id: i64,
    pub interval: Interval,
}

/// Horizontal placement of an item inside its lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanePlacement {
    pub id: i64,
    /// Interval clamped to the lane bounds.
    pub interval: Interval,
    /// Members of the overlap group, including the item itself.
    pub group_size: usize,
    /// Position among the group members, `0..group_size`.
    pub index: usize,
}

impl LanePlacement {
    /// Fraction of the lane width this item occupies.
    pub fn width_fraction(&self) -> f32 {
        1.0 / self.group_size as f32
    }

    /// Left edge as a fraction of the lane width.
    pub fn offset_fraction(&self) -> f32 {
        self.index as f32 / self.group_size as f32
    }
}

/// Place every item of a lane.
///
/// Items are clamped to `bounds` first; anything left empty is dropped. The
/// result is ordered by start time, then id.
pub fn layout_lane(items: &[LayoutInput], bounds: &Interval) -> Vec<LanePlacement> {
    let mut resolved: Vec<LayoutInput> = items
        .iter()
        .filter_map(|item| {
            item.interval.clamp_to(bounds).map(|interval| LayoutInput {
                id: item.id,
                interval,
            })
        })
        .collect();
    resolved.sort_by(|a, b| {
        a.interval
            .start
            .cmp(&b.interval.start)
            .then(a.id.cmp(&b.id))
    });

    resolved
        .iter()
        .map(|item| {
            let mut group_size = 1;
            let mut index = 0;
            for other in resolved.iter().filter(|o| o.id != item.id) {
                if !other.interval.overlaps(&item.interval) {
                    continue;
                }
                group_size += 1;
                if precedes(other, item) {
                    index += 1;
                }
            }
            LanePlacement {
                id: item.id,
                interval: item.interval,
                group_size,
                index,
            }
        })
        .collect()
}

/// Earlier start wins; equal starts fall back to the smaller id.
fn precedes(a: &LayoutInput, b: &LayoutInput) -> bool {
    a.interval.start < b.interval.start || (a.interval.start == b.interval.start && a.id < b.id)
}
