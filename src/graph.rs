//! commit DAG over hash-keyed nodes
//!
//! nodes live in a flat map keyed by commit hash; parent and child edges are
//! hashes, never references. the graph is built in two phases (insert every
//! node, then link edges) so no node is ever observed with partial data.
//! commits added one at a time whose parents are not known yet are queued
//! and linked when the parent arrives.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::Result;
use crate::hash::Hash;

/// a commit's position in the graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// parents in commit order (first parent first)
    pub parents: Vec<Hash>,
    /// derived back-edges
    pub children: Vec<Hash>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitGraph {
    nodes: HashMap<Hash, Node>,
    /// missing parent -> children waiting for it
    pending: HashMap<Hash, Vec<Hash>>,
}

impl CommitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// build a graph from (commit, parents) pairs
    pub fn build<I>(commits: I) -> Self
    where
        I: IntoIterator<Item = (Hash, Vec<Hash>)>,
    {
        let mut graph = Self::new();

        // phase 1: every node with its parent list
        for (hash, parents) in commits {
            graph.nodes.entry(hash).or_insert(Node {
                parents,
                children: Vec::new(),
            });
        }

        // phase 2: derive child edges now that every node exists
        let mut edges = Vec::new();
        for (hash, node) in &graph.nodes {
            for parent in &node.parents {
                edges.push((*parent, *hash));
            }
        }
        for (parent, child) in edges {
            graph.link(parent, child);
        }

        graph
    }

    /// load every commit reachable from `tips`
    ///
    /// `parents_of` returns the parent list of a commit; it is called once per
    /// reachable commit.
    pub fn load_reachable<F>(tips: &[Hash], mut parents_of: F) -> Result<Self>
    where
        F: FnMut(&Hash) -> Result<Vec<Hash>>,
    {
        let mut collected = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<Hash> = tips.iter().copied().collect();

        while let Some(hash) = queue.pop_front() {
            if !seen.insert(hash) {
                continue;
            }
            let parents = parents_of(&hash)?;
            queue.extend(parents.iter().copied());
            collected.push((hash, parents));
        }

        Ok(Self::build(collected))
    }

    /// register one commit, linking it to any parents already present
    pub fn add_commit(&mut self, hash: Hash, parents: &[Hash]) {
        if self.nodes.contains_key(&hash) {
            return;
        }

        let waiting = self.pending.remove(&hash).unwrap_or_default();
        self.nodes.insert(
            hash,
            Node {
                parents: parents.to_vec(),
                children: waiting,
            },
        );

        for parent in parents {
            self.link(*parent, hash);
        }
    }

    fn link(&mut self, parent: Hash, child: Hash) {
        match self.nodes.get_mut(&parent) {
            Some(node) => {
                if !node.children.contains(&child) {
                    node.children.push(child);
                }
            }
            None => self.pending.entry(parent).or_default().push(child),
        }
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.nodes.contains_key(hash)
    }

    pub fn node(&self, hash: &Hash) -> Option<&Node> {
        self.nodes.get(hash)
    }

    pub fn parents(&self, hash: &Hash) -> &[Hash] {
        self.nodes.get(hash).map(|n| n.parents.as_slice()).unwrap_or(&[])
    }

    pub fn children(&self, hash: &Hash) -> &[Hash] {
        self.nodes.get(hash).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// true when no node is waiting on a parent that has not been added
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// parents referenced by some node but not present in the graph
    pub fn missing_parents(&self) -> Vec<Hash> {
        let mut missing: Vec<Hash> = self.pending.keys().copied().collect();
        missing.sort();
        missing
    }

    /// `start` and every commit reachable from it through parent edges
    pub fn ancestors(&self, start: &Hash) -> HashSet<Hash> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([*start]);

        while let Some(hash) = queue.pop_front() {
            if !seen.insert(hash) {
                continue;
            }
            queue.extend(self.parents(&hash).iter().copied());
        }

        seen
    }

    /// true iff `a` is reachable from `b` by zero or more parent edges
    pub fn is_ancestor(&self, a: &Hash, b: &Hash) -> bool {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([*b]);

        while let Some(hash) = queue.pop_front() {
            if hash == *a {
                return true;
            }
            if !seen.insert(hash) {
                continue;
            }
            queue.extend(self.parents(&hash).iter().copied());
        }

        false
    }

    /// first commit reached breadth-first from `c2` that is an ancestor of `c1`
    ///
    /// this is the merge base for two-branch histories. with several merge
    /// bases (criss-cross merges) the first one found in BFS order wins, which
    /// is not necessarily the lowest common ancestor.
    pub fn find_split_point(&self, c1: &Hash, c2: &Hash) -> Option<Hash> {
        let ours = self.ancestors(c1);

        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([*c2]);

        while let Some(hash) = queue.pop_front() {
            if !seen.insert(hash) {
                continue;
            }
            if ours.contains(&hash) {
                return Some(hash);
            }
            queue.extend(self.parents(&hash).iter().copied());
        }

        None
    }
}
