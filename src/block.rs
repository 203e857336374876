// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The block allocator: a `VecDeque` of fixed-capacity [`Block`]s forming
//! the flattened row address space `[0, total_lines)`, plus the
//! [`LocateCache`] that keeps bulk operations out of quadratic territory.

use std::collections::VecDeque;

use crate::line::Line;

/// No block ever grows past this many lines.
pub const MAX_BLOCK_LINES: usize = 1024;

/// A contiguous run of lines, all laid out at the same width `sx`.
#[derive(Debug)]
pub struct Block {
    pub lines: Vec<Line>,
    pub sx: usize,
    pub need_reflow: bool,
}

impl Block {
    pub fn new(sx: usize) -> Self {
        Block { lines: Vec::new(), sx, need_reflow: false }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// The `VecDeque<Block>` that backs the grid's row address space. A
/// `VecDeque` is the idiomatic stand-in for a doubly-linked list of
/// segments here: cheap push/pop at either end, random access by index
/// everywhere else.
#[derive(Debug, Default)]
pub struct BlockStore {
    blocks: VecDeque<Block>,
}

impl BlockStore {
    pub fn new() -> Self {
        BlockStore { blocks: VecDeque::new() }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn total_lines(&self) -> usize {
        self.blocks.iter().map(Block::len).sum()
    }

    pub fn block(&self, idx: usize) -> &Block {
        &self.blocks[idx]
    }

    pub fn block_mut(&mut self, idx: usize) -> &mut Block {
        &mut self.blocks[idx]
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Block> {
        self.blocks.iter_mut()
    }

    pub fn push_back(&mut self, block: Block) {
        self.blocks.push_back(block);
    }

    pub fn push_front(&mut self, block: Block) {
        self.blocks.push_front(block);
    }

    /// Two-sided scan: walk from the head if `py` is in the first half of
    /// the address space, from the tail otherwise. Returns the owning
    /// block's index and `py`'s offset within it.
    pub fn locate(&self, py: usize) -> (usize, usize) {
        let total = self.total_lines();
        debug_assert!(py < total, "locate({py}) out of range, total_lines={total}");

        if py < total / 2 {
            let mut base = 0;
            for (i, block) in self.blocks.iter().enumerate() {
                if py < base + block.len() {
                    return (i, py - base);
                }
                base += block.len();
            }
        } else {
            let mut base = total;
            for (i, block) in self.blocks.iter().enumerate().rev() {
                base -= block.len();
                if py >= base {
                    return (i, py - base);
                }
            }
        }
        unreachable!("locate({py}) not covered by any block, total_lines={total}");
    }

    /// Grow or shrink so `total_lines() == target`, laying new lines out
    /// at width `sx`.
    pub fn realloc(&mut self, target: usize, sx: usize) {
        let total = self.total_lines();
        if target > total {
            self.grow(target - total, sx);
        } else if target < total {
            self.shrink(total - target);
        }
    }

    fn grow(&mut self, mut remaining: usize, sx: usize) {
        while remaining > 0 {
            if self.blocks.back().map_or(true, |b| b.len() >= MAX_BLOCK_LINES) {
                self.blocks.push_back(Block::new(sx));
            }
            let block = self.blocks.back_mut().expect("just ensured a tail block exists");
            let room = MAX_BLOCK_LINES - block.len();
            let take = room.min(remaining);
            block.lines.resize_with(block.len() + take, Line::new);
            remaining -= take;
        }
    }

    fn shrink(&mut self, mut to_free: usize) {
        while to_free > 0 {
            let Some(block) = self.blocks.back_mut() else { break };
            if block.len() <= to_free {
                to_free -= block.len();
                self.blocks.pop_back();
            } else {
                let new_len = block.len() - to_free;
                block.lines.truncate(new_len);
                to_free = 0;
            }
        }
    }

    /// Free the first `n` rows overall: whole blocks from the head when
    /// they fit entirely inside `n`, otherwise a partial in-place drain of
    /// the head block (the memmove costs O(remaining), which is fine since
    /// partial trims are the rare case — history collection almost always
    /// removes whole blocks).
    pub fn trim_head(&mut self, mut n: usize) {
        while n > 0 {
            let Some(front) = self.blocks.front_mut() else { break };
            if front.len() <= n {
                n -= front.len();
                self.blocks.pop_front();
            } else {
                front.lines.drain(0..n);
                n = 0;
            }
        }
    }

    #[cfg(debug_assertions)]
    pub fn assert_consistent(&self, hallocated: usize) {
        debug_assert_eq!(self.total_lines(), hallocated, "block sizes disagree with hallocated");
        for block in self.blocks.iter() {
            debug_assert!(block.len() <= MAX_BLOCK_LINES);
        }
    }
}

/// A one-entry `(offset_base, block_index)` cache, scoped to a single bulk
/// operation. Not an optimization so much as load-bearing: without it,
/// a monotone sweep over `n` rows costs O(n * block_count) instead of
/// O(n + block_count).
#[derive(Debug, Default)]
pub struct LocateCache {
    cached: Option<(usize, usize)>,
}

impl LocateCache {
    pub fn new() -> Self {
        LocateCache { cached: None }
    }

    pub fn locate(&mut self, store: &BlockStore, py: usize) -> (usize, usize) {
        if let Some((offset_base, block_index)) = self.cached {
            if py >= offset_base {
                let block = store.block(block_index);
                if py < offset_base + block.len() {
                    return (block_index, py - offset_base);
                }
            }
        }
        let (block_index, local) = store.locate(py);
        self.cached = Some((py - local, block_index));
        (block_index, local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_store(block_sizes: &[usize], sx: usize) -> BlockStore {
        let mut store = BlockStore::new();
        for &size in block_sizes {
            let mut block = Block::new(sx);
            block.lines.resize_with(size, Line::new);
            store.push_back(block);
        }
        store
    }

    #[test]
    fn locate_finds_owning_block_from_head_and_tail() {
        let store = filled_store(&[3, 3, 4], 80);
        assert_eq!(store.locate(0), (0, 0));
        assert_eq!(store.locate(2), (0, 2));
        assert_eq!(store.locate(3), (1, 0));
        assert_eq!(store.locate(5), (1, 2));
        assert_eq!(store.locate(9), (2, 3));
    }

    #[test]
    fn grow_spills_into_a_new_block_at_capacity() {
        let mut store = BlockStore::new();
        store.realloc(MAX_BLOCK_LINES + 5, 80);
        assert_eq!(store.block_count(), 2);
        assert_eq!(store.block(0).len(), MAX_BLOCK_LINES);
        assert_eq!(store.block(1).len(), 5);
    }

    #[test]
    fn shrink_drops_whole_blocks_then_trims_the_tail() {
        let mut store = filled_store(&[4, 4, 4], 80);
        store.realloc(5, 80);
        assert_eq!(store.total_lines(), 5);
        assert_eq!(store.block_count(), 2);
    }

    #[test]
    fn trim_head_consumes_whole_blocks_then_partial() {
        let mut store = filled_store(&[4, 4], 80);
        store.trim_head(6);
        assert_eq!(store.total_lines(), 2);
        assert_eq!(store.block_count(), 1);
    }

    #[test]
    fn locate_cache_reuses_within_a_block_and_recomputes_across_boundary() {
        let store = filled_store(&[3, 3], 80);
        let mut cache = LocateCache::new();
        assert_eq!(cache.locate(&store, 0), (0, 0));
        assert_eq!(cache.locate(&store, 2), (0, 2));
        assert_eq!(cache.locate(&store, 3), (1, 0));
        assert_eq!(cache.locate(&store, 5), (1, 2));
    }
}
