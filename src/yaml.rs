//! Indentation-driven reader for block-style YAML mappings and sequences.
//!
//! Containers live in a flat arena and every open container is tracked by a
//! frame holding its node id and the column of the line that opened it. A
//! `key:` line with nothing after it opens an empty mapping; if the first
//! child line turns out to be a `- ` item, that node is overwritten with an
//! empty sequence in place, so the slot in its parent never has to be
//! revisited.

use std::io::BufRead;

use indexmap::IndexMap;

use crate::error::Error;
use crate::scalar::coerce;
use crate::value::{Mapping, Value};

/// Parse a block-style YAML document into its root mapping.
///
/// Empty input yields an empty mapping. Lines that fit neither the
/// `key: value` nor the `- item` shape are skipped.
pub fn parse_yaml(input: &str) -> Mapping {
    let mut reader = Reader::new();
    for line in input.lines() {
        reader.feed(line);
    }
    reader.finish()
}

/// Parse a YAML document from UTF-8 bytes.
pub fn parse_yaml_bytes(input: &[u8]) -> Result<Mapping, Error> {
    let text = std::str::from_utf8(input)?;
    Ok(parse_yaml(text))
}

/// Parse a YAML document from a buffered reader.
pub fn parse_yaml_reader<R: BufRead>(mut reader: R) -> Result<Mapping, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_yaml_bytes(&buf)
}

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug)]
enum Slot {
    Leaf(Value),
    Node(NodeId),
}

#[derive(Debug)]
enum Container {
    Mapping(IndexMap<String, Slot>),
    Sequence(Vec<Slot>),
}

impl Container {
    fn mapping() -> Self {
        Self::Mapping(IndexMap::new())
    }
}

#[derive(Debug)]
struct Frame {
    /// Column of the line that opened the container; `None` for the root.
    indent: Option<usize>,
    node: NodeId,
    /// Mapping element most recently appended by a `- key: value` item.
    /// Only meaningful while `node` is a sequence.
    last_item: Option<NodeId>,
}

impl Frame {
    fn new(indent: usize, node: NodeId) -> Self {
        Self {
            indent: Some(indent),
            node,
            last_item: None,
        }
    }
}

#[derive(Debug, PartialEq)]
enum LineKind<'a> {
    Item(&'a str),
    Pair { key: &'a str, value: &'a str },
}

impl<'a> LineKind<'a> {
    fn classify(trimmed: &'a str) -> Option<Self> {
        if let Some(payload) = trimmed.strip_prefix("- ") {
            return Some(Self::Item(payload.trim()));
        }
        split_pair(trimmed).map(|(key, value)| Self::Pair { key, value })
    }
}

/// Split `key: value` at the first colon. The key must be non-empty.
fn split_pair(text: &str) -> Option<(&str, &str)> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

struct Reader {
    nodes: Vec<Container>,
    stack: Vec<Frame>,
}

impl Reader {
    fn new() -> Self {
        Self {
            nodes: vec![Container::mapping()],
            stack: vec![Frame {
                indent: None,
                node: ROOT,
                last_item: None,
            }],
        }
    }

    fn feed(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let indent = line.chars().take_while(|ch| ch.is_whitespace()).count();
        self.unwind(indent);

        match LineKind::classify(trimmed) {
            Some(LineKind::Item(payload)) => self.push_item(indent, payload),
            Some(LineKind::Pair { key, value }) => self.insert_pair(indent, key, value),
            None => {}
        }
    }

    /// Close every container opened at or beyond `indent`.
    fn unwind(&mut self, indent: usize) {
        while self.stack.len() > 1
            && self
                .stack
                .last()
                .and_then(|frame| frame.indent)
                .is_some_and(|column| column >= indent)
        {
            self.stack.pop();
        }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn alloc(&mut self, container: Container) -> NodeId {
        self.nodes.push(container);
        self.nodes.len() - 1
    }

    /// Make the top frame a sequence, promoting an empty non-root mapping.
    fn ensure_sequence(&mut self) -> bool {
        let frame = self.top();
        let (node, is_root) = (frame.node, frame.indent.is_none());
        let promotable = match &self.nodes[node] {
            Container::Sequence(_) => return true,
            Container::Mapping(map) => map.is_empty() && !is_root,
        };
        if !promotable {
            return false;
        }

        self.nodes[node] = Container::Sequence(Vec::new());
        self.top().last_item = None;
        true
    }

    fn push_item(&mut self, indent: usize, payload: &str) {
        if !self.ensure_sequence() {
            return;
        }
        let sequence = self.top().node;

        // A quoted payload is one scalar item, even when its text contains
        // `key: value` (`- "a: b"` yields the string `a: b`, not a mapping
        // with key `"a`).
        let pair = if payload.starts_with(['"', '\'']) {
            None
        } else {
            split_pair(payload)
        };

        match pair {
            Some((key, value)) => {
                let element = self.alloc(Container::mapping());
                self.append(sequence, Slot::Node(element));
                self.top().last_item = Some(element);
                self.stack.push(Frame::new(indent, element));
                // The key begins two columns after the dash.
                self.assign(element, key, value, indent + 2);
            }
            None => {
                self.append(sequence, Slot::Leaf(coerce(payload)));
                self.top().last_item = None;
            }
        }
    }

    fn insert_pair(&mut self, indent: usize, key: &str, value: &str) {
        let frame = self.top();
        let (node, last_item) = (frame.node, frame.last_item);

        let in_sequence = matches!(self.nodes[node], Container::Sequence(_));
        let target = match (in_sequence, last_item) {
            (false, _) => node,
            (true, Some(element)) => element,
            (true, None) => {
                let element = self.alloc(Container::mapping());
                self.append(node, Slot::Node(element));
                self.top().last_item = Some(element);
                element
            }
        };

        self.assign(target, key, value, indent);
    }

    /// Store `key` in the mapping `target`. An empty value opens a nested
    /// mapping whose frame sits at `child_indent`; anything else, including a
    /// lone trailing comment, is coerced as a scalar.
    fn assign(&mut self, target: NodeId, key: &str, value: &str, child_indent: usize) {
        if value.is_empty() {
            let child = self.alloc(Container::mapping());
            self.insert(target, key, Slot::Node(child));
            self.stack.push(Frame::new(child_indent, child));
        } else {
            self.insert(target, key, Slot::Leaf(coerce(value)));
        }
    }

    fn insert(&mut self, target: NodeId, key: &str, slot: Slot) {
        if let Container::Mapping(map) = &mut self.nodes[target] {
            map.insert(key.to_owned(), slot);
        }
    }

    fn append(&mut self, target: NodeId, slot: Slot) {
        if let Container::Sequence(items) = &mut self.nodes[target] {
            items.push(slot);
        }
    }

    fn finish(mut self) -> Mapping {
        match self.build(ROOT) {
            Value::Mapping(map) => map,
            _ => Mapping::new(),
        }
    }

    fn build(&mut self, node: NodeId) -> Value {
        let container = std::mem::replace(&mut self.nodes[node], Container::mapping());
        match container {
            Container::Mapping(slots) => Value::Mapping(
                slots
                    .into_iter()
                    .map(|(key, slot)| (key, self.resolve(slot)))
                    .collect(),
            ),
            Container::Sequence(slots) => {
                Value::Sequence(slots.into_iter().map(|slot| self.resolve(slot)).collect())
            }
        }
    }

    fn resolve(&mut self, slot: Slot) -> Value {
        match slot {
            Slot::Leaf(value) => value,
            Slot::Node(node) => self.build(node),
        }
    }
}
