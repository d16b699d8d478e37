// --- File: src/core/trie.rs
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;

const ROOT: usize = 0;

#[derive(Clone, Debug, Default)]
struct TrieNode {
    /// Ordered so that traversal yields words lexicographically.
    children: BTreeMap<char, usize>,
    /// Insertion multiplicity; `None` means no word ends here.
    count: Option<NonZeroU32>,
}

impl TrieNode {
    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.count.is_none()
    }
}

/// A character trie that counts how many times each word was inserted.
///
/// Nodes live in an arena. Removing the last occurrence of a word prunes
/// every node that is left without children and without a terminal count;
/// freed slots are recycled by later insertions.
#[derive(Clone, Debug)]
pub struct PrefixTrie {
    nodes: Vec<TrieNode>,
    free: Vec<usize>,
    words: usize,
}

impl Default for PrefixTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::default()], free: Vec::new(), words: 0 }
    }

    fn alloc(&mut self) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = TrieNode::default();
            idx
        } else {
            self.nodes.push(TrieNode::default());
            self.nodes.len() - 1
        }
    }

    fn find(&self, word: &str) -> Option<usize> {
        let mut node_idx = ROOT;
        for c in word.chars() {
            node_idx = *self.nodes[node_idx].children.get(&c)?;
        }
        Some(node_idx)
    }

    /// Inserts one occurrence of `word`. O(k) where k is the word length.
    pub fn add(&mut self, word: &str) {
        let mut node_idx = ROOT;
        for c in word.chars() {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&c) {
                id
            } else {
                let new_node_id = self.alloc();
                self.nodes[node_idx].children.insert(c, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
        }

        let node = &mut self.nodes[node_idx];
        node.count = match node.count {
            None => {
                self.words += 1;
                Some(NonZeroU32::MIN)
            }
            Some(n) => Some(n.saturating_add(1)),
        };
    }

    /// Removes one occurrence of `word`. Unknown words are ignored.
    pub fn remove(&mut self, word: &str) {
        let mut path = vec![(ROOT, '\0')];
        let mut node_idx = ROOT;
        for c in word.chars() {
            match self.nodes[node_idx].children.get(&c) {
                Some(&next_idx) => {
                    path.push((next_idx, c));
                    node_idx = next_idx;
                }
                None => return,
            }
        }

        let Some(count) = self.nodes[node_idx].count else {
            return;
        };
        if let Some(decremented) = NonZeroU32::new(count.get() - 1) {
            self.nodes[node_idx].count = Some(decremented);
            return;
        }
        self.nodes[node_idx].count = None;
        self.words -= 1;

        // Walk back up, detaching nodes that no longer carry anything.
        while path.len() > 1 {
            let (idx, c) = path[path.len() - 1];
            if !self.nodes[idx].is_empty() {
                break;
            }
            path.pop();
            let parent_idx = path[path.len() - 1].0;
            self.nodes[parent_idx].children.remove(&c);
            self.free.push(idx);
        }
    }

    pub fn exists(&self, word: &str) -> bool {
        self.find(word)
            .map(|idx| self.nodes[idx].count.is_some())
            .unwrap_or(false)
    }

    /// Multiplicity of `word`, or 0 if it is absent.
    pub fn count(&self, word: &str) -> u32 {
        self.find(word)
            .and_then(|idx| self.nodes[idx].count)
            .map(NonZeroU32::get)
            .unwrap_or(0)
    }

    /// Number of distinct words stored.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Nodes currently reachable from the root, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// All stored words starting with `prefix`, in lexicographic order.
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries_with_prefix(prefix)
            .into_iter()
            .map(|(word, _)| word)
            .collect()
    }

    /// Like [`words_with_prefix`](Self::words_with_prefix), paired with each
    /// word's multiplicity.
    pub fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, u32)> {
        let Some(node_idx) = self.find(prefix) else {
            return vec![];
        };
        let mut found = Vec::new();
        let mut current = prefix.to_string();
        self.dfs_collect(node_idx, &mut current, &mut found);
        found
    }

    fn dfs_collect(&self, node_idx: usize, current: &mut String, found: &mut Vec<(String, u32)>) {
        let node = &self.nodes[node_idx];
        if let Some(count) = node.count {
            found.push((current.clone(), count.get()));
        }
        for (&c, &child_idx) in &node.children {
            current.push(c);
            self.dfs_collect(child_idx, current, found);
            current.pop();
        }
    }

    /// Descends from the root while the path is unbranched and no word has
    /// ended yet.
    pub fn longest_common_prefix(&self) -> String {
        let mut prefix = String::new();
        let mut node = &self.nodes[ROOT];
        while node.count.is_none() && node.children.len() == 1 {
            if let Some((&c, &child_idx)) = node.children.iter().next() {
                prefix.push(c);
                node = &self.nodes[child_idx];
            }
        }
        prefix
    }

    /// Every stored word occurring anywhere in `document`, overlapping
    /// occurrences included. O(n * d) for document length n and trie depth d.
    pub fn find_matches(&self, document: &str) -> BTreeSet<String> {
        let chars: Vec<char> = document.chars().collect();
        let mut matches = BTreeSet::new();
        for start in 0..chars.len() {
            let mut node_idx = ROOT;
            for end in start..chars.len() {
                match self.nodes[node_idx].children.get(&chars[end]) {
                    Some(&next_idx) => node_idx = next_idx,
                    None => break,
                }
                if self.nodes[node_idx].count.is_some() {
                    matches.insert(chars[start..=end].iter().collect());
                }
            }
        }
        matches
    }
}
