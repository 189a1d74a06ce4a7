//! The LZ78-style context tree: a fixed-alphabet, depth-capped prefix tree
//! over {A,C,G,T}, grown one FASTA stream at a time and scored against
//! another.
//!
//! Node slots are addressed by a path-derived index into a single flat
//! bit vector ([`BitStore`]) rather than by pointer, which keeps the
//! whole tree a couple of allocations regardless of how deep it grows.

mod bitstore;

use anyhow::{Result, bail};
use bitstore::BitStore;
use file_reader::{FastaReader, LineSource};
use std::io::Write;
use std::path::Path;

/// Hard ceiling on `max_depth`. At 17 the bit array already approaches
/// gigabyte scale; higher would not be practical to allocate.
pub const MAX_DEPTH_LIMIT: u32 = 17;

/// A single cluster's context tree.
#[derive(Debug)]
pub struct Tree {
    name: String,
    max_depth: u32,
    bits: BitStore,
    /// `base[d]` is the first slot index used by depth `d + 1` nodes.
    base: Vec<usize>,
    /// Number of promoted (inner) nodes at each depth, index 0..=max_depth-1.
    /// `u64` because depth 16 alone can hold `4^16` nodes, past `u32::MAX`.
    nodes_at_depth: Vec<u64>,
    leaf_count: u64,
    full_depth: u32,
}

/// Tracks the walk position shared by the build and score automata: the
/// depth of the next node to visit, and the partial path index
/// accumulated so far.
struct Walk {
    depth: u32,
    index: usize,
}

impl Walk {
    fn reset(&mut self) {
        self.depth = 1;
        self.index = 0;
    }
}

impl Tree {
    /// Allocates a new, empty tree. `max_depth` must be in `[1, 17]`.
    pub fn new(name: impl Into<String>, max_depth: u32) -> Result<Self> {
        if max_depth == 0 || max_depth > MAX_DEPTH_LIMIT {
            bail!(
                "invalid max_depth {max_depth}: must be between 1 and {MAX_DEPTH_LIMIT}"
            );
        }

        let mut base = vec![0usize; max_depth as usize];
        for d in 1..max_depth as usize {
            base[d] = base[d - 1] + 4usize.pow(d as u32);
        }
        let total_inner_slots = base[max_depth as usize - 1];

        let mut nodes_at_depth = vec![0u64; max_depth as usize];
        nodes_at_depth[0] = 1;

        Ok(Self {
            name: name.into(),
            max_depth,
            bits: BitStore::new(total_inner_slots),
            base,
            nodes_at_depth,
            leaf_count: 4,
            full_depth: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn leaf_count(&self) -> u64 {
        self.leaf_count
    }

    /// Sum of inner nodes across all depths, the implicit root included.
    pub fn total_inner_nodes(&self) -> u64 {
        self.nodes_at_depth.iter().sum()
    }

    /// Largest depth at which every possible node is inner.
    pub fn max_complete_depth(&self) -> u32 {
        self.full_depth
    }

    /// Smallest depth with no inner nodes at all (the shallowest
    /// depth no path has reached yet).
    pub fn longest_root_to_leaf(&self) -> u32 {
        self.nodes_at_depth
            .iter()
            .position(|&n| n == 0)
            .map(|d| d as u32)
            .unwrap_or(self.max_depth)
    }

    /// Parses the FASTA file at `path` and grows the tree. Can be called
    /// more than once on the same tree to accumulate structure from
    /// multiple files; walk state is reset at the start of every call and
    /// at every path break within it.
    pub fn build(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let mut reader = FastaReader::open(path.as_ref())?;
        let before = self.leaf_count;
        self.build_from_source(&mut reader);
        tracing::debug!(
            tree = %self.name,
            path = %path.as_ref().display(),
            leaves_added = self.leaf_count - before,
            "built tree from fasta file"
        );
        Ok(())
    }

    /// Core build automaton, decoupled from file I/O so it can run over
    /// any [`LineSource`] (tests use in-memory fixtures).
    pub fn build_from_source(&mut self, reader: &mut impl LineSource) {
        let mut line = Vec::new();
        let mut walk = Walk { depth: 1, index: 0 };

        loop {
            let n = reader.next_line(&mut line);
            if n == 0 {
                break;
            }
            if line[0] == b'>' || line[0] == b'\n' {
                walk.reset();
                continue;
            }

            let mut end = n;
            if line[end - 1] == b'\n' {
                end -= 1;
            }

            for &raw in &line[..end] {
                let b = if raw >= b'a' { raw - 32 } else { raw };
                if b == b'N' {
                    walk.reset();
                    continue;
                }

                let symbol = ((b >> 1) & 3) as usize;
                walk.index |= symbol;

                // Only reachable when max_depth == 1: there is no inner
                // layer to index into at all.
                if walk.depth > self.max_depth - 1 {
                    walk.reset();
                    continue;
                }

                let slot = self.base[(walk.depth - 1) as usize] + walk.index;
                if self.bits.set(slot) {
                    self.nodes_at_depth[walk.depth as usize] += 1;
                    self.leaf_count += 3;
                    walk.reset();
                    continue;
                }

                if walk.depth == self.max_depth - 1 {
                    walk.reset();
                } else {
                    walk.index <<= 2;
                    walk.depth += 1;
                }
            }
        }

        self.recompute_full_depth();
    }

    fn recompute_full_depth(&mut self) {
        self.full_depth = 0;
        while self.full_depth + 1 < self.max_depth
            && self.nodes_at_depth[(self.full_depth + 1) as usize]
                == 4u64.pow(self.full_depth + 1)
        {
            self.full_depth += 1;
        }
    }

    /// Average log2-loss of the sequences in `reader` against this tree.
    /// Rewinds `reader` on entry; does not mutate the tree.
    ///
    /// Returns a non-finite value when no phrase closes (an empty or
    /// all-break query) — matching the reference implementation's
    /// `0.0 / 0.0`, which compares as "not better than any real score"
    /// under `<` during argmin selection.
    pub fn score(&self, reader: &mut impl LineSource) -> f64 {
        reader.rewind();

        let mut line = Vec::new();
        let mut walk = Walk { depth: 1, index: 0 };
        let mut nchars: u64 = 0;
        let mut actual_nchars: u64 = 0;
        let mut phrases_closed: u64 = 0;

        loop {
            let n = reader.next_line(&mut line);
            if n == 0 {
                break;
            }
            if line[0] == b'>' || line[0] == b'\n' {
                walk.reset();
                continue;
            }

            let mut end = n;
            if line[end - 1] == b'\n' {
                end -= 1;
            }

            for &raw in &line[..end] {
                let b = if raw >= b'a' { raw - 32 } else { raw };
                if b == b'N' {
                    walk.reset();
                    continue;
                }

                let symbol = ((b >> 1) & 3) as usize;
                nchars += 1;
                walk.index |= symbol;

                let slot = self.base[(walk.depth - 1) as usize] + walk.index;
                let descend = walk.depth <= self.full_depth
                    || (walk.depth < self.max_depth && self.bits.get(slot));

                if descend {
                    walk.index <<= 2;
                    walk.depth += 1;
                } else {
                    phrases_closed += 1;
                    actual_nchars = nchars;
                    walk.reset();
                }
            }
        }

        if phrases_closed == 0 {
            tracing::trace!(tree = %self.name, "score: query closed no phrases");
        }

        (self.leaf_count as f64).log2() * phrases_closed as f64 / actual_nchars as f64
    }

    /// Writes a human-readable stats dump (node counts per depth, leaf
    /// count, longest path) to `out`.
    pub fn write_stats(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "Name:                      {}", self.name)?;
        writeln!(out, "Number of inner nodes:     {}", self.total_inner_nodes())?;
        writeln!(out, "Max complete depth:        {}", self.max_complete_depth())?;
        writeln!(
            out,
            "Longest path (root->leaf): {}",
            self.longest_root_to_leaf()
        )?;
        writeln!(out, "Depth\tNNodes\tNFull\t% of full")?;
        writeln!(out, "0\t1\t1\t100.0")?;
        for d in 1..self.max_depth {
            let full_n = 4u64.pow(d);
            let n = self.nodes_at_depth[d as usize] as f64;
            writeln!(
                out,
                "{d}\t{}\t{full_n}\t{:.1}",
                self.nodes_at_depth[d as usize],
                100.0 * n / full_n as f64
            )?;
        }
        writeln!(out, "\nNumber of leaves:\t{}", self.leaf_count)?;
        Ok(())
    }
}
