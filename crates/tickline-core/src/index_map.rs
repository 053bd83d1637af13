use std::collections::HashMap;

use crate::timeline::{ClipId, Track};

/// Bidirectional mapping between a track's display order (z-order) and its
/// temporal order (by start tick).
///
/// Built from a snapshot of one track and never kept in sync: rebuild it
/// whenever the track changes.
#[derive(Debug, Clone, Default)]
pub struct OrderedIndexMap {
    display: Vec<ClipId>,
    display_of: HashMap<ClipId, usize>,
    rank_of: HashMap<ClipId, usize>,
    rank_to_display: Vec<usize>,
}

impl OrderedIndexMap {
    pub fn build(track: &Track) -> Self {
        let display: Vec<ClipId> = track.clips().iter().map(|c| c.id).collect();
        let display_of = display
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect::<HashMap<_, _>>();

        // Stable sort: clips sharing a start keep their display order.
        let mut rank_to_display: Vec<usize> = (0..display.len()).collect();
        rank_to_display.sort_by_key(|&i| track.clips()[i].span().start());

        let rank_of = rank_to_display
            .iter()
            .enumerate()
            .map(|(rank, &di)| (display[di], rank))
            .collect::<HashMap<_, _>>();

        Self {
            display,
            display_of,
            rank_of,
            rank_to_display,
        }
    }

    pub fn len(&self) -> usize {
        self.display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    pub fn ordered_index_of(&self, clip: ClipId) -> Option<usize> {
        self.rank_of.get(&clip).copied()
    }

    pub fn display_index_of(&self, clip: ClipId) -> Option<usize> {
        self.display_of.get(&clip).copied()
    }

    pub fn ordered_index_to_display_index(&self, ordered: usize) -> Option<usize> {
        self.rank_to_display.get(ordered).copied()
    }

    pub fn clip_at_display_index(&self, index: usize) -> Option<ClipId> {
        self.display.get(index).copied()
    }

    pub fn clip_at_ordered_index(&self, ordered: usize) -> Option<ClipId> {
        self.ordered_index_to_display_index(ordered)
            .map(|di| self.display[di])
    }

    /// Clips whose temporal rank lies between the ranks of `a` and `b`,
    /// inclusive, in temporal order. The argument order does not matter.
    /// `None` if either clip is not part of the map.
    pub fn ordered_range(&self, a: ClipId, b: ClipId) -> Option<Vec<ClipId>> {
        let ra = self.ordered_index_of(a)?;
        let rb = self.ordered_index_of(b)?;
        let (lo, hi) = if ra <= rb { (ra, rb) } else { (rb, ra) };
        Some(
            self.rank_to_display[lo..=hi]
                .iter()
                .map(|&di| self.display[di])
                .collect(),
        )
    }

    /// Clip ids in temporal order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = ClipId> + '_ {
        self.rank_to_display.iter().map(|&di| self.display[di])
    }
}
