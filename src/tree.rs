//! The decision-tree node type (C6, in-memory half) plus the BFS flattener,
//! binary serializer, and verifier.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::pattern;
use crate::wordlist::WordList;
use crate::MAX_PATTERNS;

/// A node built during search. `children` only has entries for pattern
/// codes that actually occur for some candidate at this point in the
/// recursion; code 242 (all-green) never has a child; it marks the
/// terminal. Shared subtrees from the builder's memoization cache are
/// `Rc`-shared here and cloned into separate slots only at flatten time.
pub struct Node {
    pub guess: u32,
    pub is_leaf: bool,
    pub children: HashMap<u8, Rc<Node>>,
}

impl Node {
    pub fn leaf(guess: u32) -> Rc<Node> {
        Rc::new(Node {
            guess,
            is_leaf: true,
            children: HashMap::new(),
        })
    }

    pub fn internal(guess: u32, children: HashMap<u8, Rc<Node>>) -> Rc<Node> {
        Rc::new(Node {
            guess,
            is_leaf: false,
            children,
        })
    }
}

const MAGIC: u32 = 0x5752_444C;
const VERSION: u32 = 1;
const HEADER_LEN: usize = 24;
const NODE_RECORD_LEN: usize = 4;
const FLAG_LEAF: u16 = 1;
const FLAG_IMPLICIT_SOLUTION: u16 = 2;
const ABSENT_CHILD: u32 = 0xFFFF_FFFF;

/// Flatten `root` via breadth-first traversal, assigning each distinct
/// visited node a dense index, and serialize to the binary layout described
/// in the design document.
pub fn serialize(root: &Rc<Node>, checksum: u64) -> Vec<u8> {
    let mut flat: Vec<Rc<Node>> = Vec::new();
    let mut index_of: HashMap<*const Node, u32> = HashMap::new();

    flat.push(root.clone());
    index_of.insert(Rc::as_ptr(root), 0);

    let mut head = 0;
    while head < flat.len() {
        let node = flat[head].clone();
        head += 1;
        for child in node.children.values() {
            let ptr = Rc::as_ptr(child);
            if !index_of.contains_key(&ptr) {
                index_of.insert(ptr, flat.len() as u32);
                flat.push(child.clone());
            }
        }
    }

    let num_nodes = flat.len() as u32;
    let mut buf = Vec::with_capacity(HEADER_LEN + flat.len() * (NODE_RECORD_LEN + 4 * MAX_PATTERNS));

    buf.extend_from_slice(&MAGIC.to_le_bytes());
    buf.extend_from_slice(&VERSION.to_le_bytes());
    buf.extend_from_slice(&checksum.to_le_bytes());
    buf.extend_from_slice(&num_nodes.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // root_index

    for node in &flat {
        let mut flags = 0u16;
        if node.is_leaf {
            flags |= FLAG_LEAF | FLAG_IMPLICIT_SOLUTION;
        }
        buf.extend_from_slice(&(node.guess as u16).to_le_bytes());
        buf.extend_from_slice(&flags.to_le_bytes());
    }

    for node in &flat {
        for pattern in 0..MAX_PATTERNS as u8 {
            let child_index = node
                .children
                .get(&pattern)
                .map(|child| index_of[&Rc::as_ptr(child)])
                .unwrap_or(ABSENT_CHILD);
            buf.extend_from_slice(&child_index.to_le_bytes());
        }
    }

    buf
}

/// A deserialized tree: flat arrays mirroring the on-disk layout, with
/// bounds already validated so [`SerializedTree::step`] can stay a pure
/// array index.
pub struct SerializedTree {
    pub checksum: u64,
    pub root_index: u32,
    guesses: Vec<u16>,
    flags: Vec<u16>,
    children: Vec<u32>,
}

impl SerializedTree {
    pub fn deserialize(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_LEN {
            return Err(Error::CorruptTree("buffer shorter than header".into()));
        }
        let magic = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        if magic != MAGIC {
            return Err(Error::CorruptTree(format!(
                "bad magic: expected {MAGIC:#x}, found {magic:#x}"
            )));
        }
        let version = u32::from_le_bytes(buf[4..8].try_into().unwrap());
        if version != VERSION {
            return Err(Error::CorruptTree(format!(
                "unsupported version: {version}"
            )));
        }
        let checksum = u64::from_le_bytes(buf[8..16].try_into().unwrap());
        let num_nodes = u32::from_le_bytes(buf[16..20].try_into().unwrap()) as usize;
        let root_index = u32::from_le_bytes(buf[20..24].try_into().unwrap());

        let nodes_end = HEADER_LEN + num_nodes * NODE_RECORD_LEN;
        if buf.len() < nodes_end {
            return Err(Error::CorruptTree("buffer too short for node records".into()));
        }
        let mut guesses = Vec::with_capacity(num_nodes);
        let mut flags = Vec::with_capacity(num_nodes);
        for i in 0..num_nodes {
            let off = HEADER_LEN + i * NODE_RECORD_LEN;
            guesses.push(u16::from_le_bytes(buf[off..off + 2].try_into().unwrap()));
            flags.push(u16::from_le_bytes(buf[off + 2..off + 4].try_into().unwrap()));
        }

        let children_len = num_nodes * MAX_PATTERNS;
        let children_end = nodes_end + children_len * 4;
        if buf.len() < children_end {
            return Err(Error::CorruptTree("buffer too short for children table".into()));
        }
        let mut children = Vec::with_capacity(children_len);
        for i in 0..children_len {
            let off = nodes_end + i * 4;
            children.push(u32::from_le_bytes(buf[off..off + 4].try_into().unwrap()));
        }

        if root_index as usize >= num_nodes {
            return Err(Error::CorruptTree("root index out of range".into()));
        }

        Ok(Self {
            checksum,
            root_index,
            guesses,
            flags,
            children,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.guesses.len()
    }

    pub fn guess(&self, node_index: u32) -> u16 {
        self.guesses[node_index as usize]
    }

    pub fn is_leaf(&self, node_index: u32) -> bool {
        self.flags[node_index as usize] & FLAG_LEAF != 0
    }

    /// The child reached from `node_index` on `pattern`, or `None` if that
    /// pattern has no outgoing edge (`0xFFFFFFFF` in the on-disk table).
    pub fn step(&self, node_index: u32, pattern: u8) -> Option<u32> {
        let idx = node_index as usize * MAX_PATTERNS + pattern as usize;
        match self.children[idx] {
            ABSENT_CHILD => None,
            child => Some(child),
        }
    }
}

/// Replay `root` against every secret in `words`, asserting every secret
/// terminates in at most six guesses and every requested child edge exists.
/// Used by the builder CLI's `--verify` flag before a tree is written to
/// disk.
pub fn verify_in_memory(root: &Rc<Node>, words: &WordList) -> Result<VerifyReport> {
    let mut max_depth = 0usize;
    let mut total_depth = 0usize;

    for secret in &words.secrets {
        let mut node = root.clone();
        let mut depth = 0usize;
        loop {
            depth += 1;
            if depth > 6 {
                return Err(Error::VerificationFailed {
                    secret: secret.clone(),
                    reason: "depth limit exceeded".into(),
                });
            }
            let guess_word = &words.guesses[node.guess as usize];
            let p = pattern::compute(guess_word, secret);
            if p == pattern::SOLVED {
                break;
            }
            let Some(child) = node.children.get(&p) else {
                return Err(Error::VerificationFailed {
                    secret: secret.clone(),
                    reason: format!("no transition for pattern {p} at guess '{guess_word}'"),
                });
            };
            node = child.clone();
        }
        max_depth = max_depth.max(depth);
        total_depth += depth;
    }

    Ok(VerifyReport {
        max_depth,
        average_depth: total_depth as f64 / words.secrets.len() as f64,
    })
}

/// Replay a [`SerializedTree`] against every secret, used by the on-disk
/// round-trip test and by the `wordle-tree-replay` consumer binary.
pub fn verify_serialized(tree: &SerializedTree, words: &WordList) -> Result<VerifyReport> {
    let mut max_depth = 0usize;
    let mut total_depth = 0usize;

    for secret in &words.secrets {
        let mut node_index = tree.root_index;
        let mut depth = 0usize;
        loop {
            depth += 1;
            if depth > 6 {
                return Err(Error::VerificationFailed {
                    secret: secret.clone(),
                    reason: "depth limit exceeded".into(),
                });
            }
            let guess_word = &words.guesses[tree.guess(node_index) as usize];
            let p = pattern::compute(guess_word, secret);
            if p == pattern::SOLVED {
                break;
            }
            match tree.step(node_index, p) {
                Some(next) => node_index = next,
                None => {
                    return Err(Error::VerificationFailed {
                        secret: secret.clone(),
                        reason: format!("no transition for pattern {p} at guess '{guess_word}'"),
                    })
                }
            }
        }
        max_depth = max_depth.max(depth);
        total_depth += depth;
    }

    Ok(VerifyReport {
        max_depth,
        average_depth: total_depth as f64 / words.secrets.len() as f64,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct VerifyReport {
    pub max_depth: usize,
    pub average_depth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wordlist::WordList;
    use std::io::Write;

    fn word_list(words: &[&str]) -> WordList {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        for w in words {
            writeln!(f, "{}", w).unwrap();
        }
        WordList::load_single(f.path()).unwrap()
    }

    fn tiny_tree(words: &WordList) -> Rc<Node> {
        // apple, pearl, spell all guessed via "pearl" as root, each a leaf.
        let pearl = words.guess_index("pearl").unwrap() as u32;
        let apple = words.guess_index("apple").unwrap() as u32;
        let spell = words.guess_index("spell").unwrap() as u32;

        let mut children = HashMap::new();
        let p_apple = pattern::compute("pearl", "apple");
        let p_spell = pattern::compute("pearl", "spell");
        children.insert(p_apple, Node::leaf(apple));
        children.insert(p_spell, Node::leaf(spell));
        Node::internal(pearl, children)
    }

    #[test]
    fn serialize_then_deserialize_replays_identically() {
        let words = word_list(&["apple", "pearl", "spell"]);
        let root = tiny_tree(&words);

        let in_memory = verify_in_memory(&root, &words).unwrap();

        let bytes = serialize(&root, words.checksum());
        let deserialized = SerializedTree::deserialize(&bytes).unwrap();
        assert_eq!(deserialized.checksum, words.checksum());
        let from_disk = verify_serialized(&deserialized, &words).unwrap();

        assert_eq!(in_memory.max_depth, from_disk.max_depth);
        assert!((in_memory.average_depth - from_disk.average_depth).abs() < 1e-9);
    }

    #[test]
    fn deserialize_rejects_bad_magic() {
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&0xdeadbeefu32.to_le_bytes());
        let err = SerializedTree::deserialize(&bytes).unwrap_err();
        assert!(matches!(err, Error::CorruptTree(_)));
    }

    #[test]
    fn deserialize_rejects_truncated_buffer() {
        let err = SerializedTree::deserialize(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, Error::CorruptTree(_)));
    }
}
