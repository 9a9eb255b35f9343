use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use tracing::debug;

use super::decode_pdf_string;

pub const ROOT: usize = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    pub title: String,
    /// Raw `Dest` value, or the `D` entry of a GoTo action.
    pub destination: Option<Object>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: u32,
}

/// Outline as a flat arena; node 0 is the outline root and never a chapter.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
}

impl Default for OutlineTree {
    fn default() -> Self {
        Self::new()
    }
}

impl OutlineTree {
    pub fn new() -> Self {
        OutlineTree {
            nodes: vec![OutlineNode {
                title: String::new(),
                destination: None,
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
        }
    }

    /// Append a node under `parent` and return its index.
    pub fn push(&mut self, parent: usize, title: String, destination: Option<Object>) -> usize {
        let index = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(OutlineNode {
            title,
            destination,
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        self.nodes[parent].children.push(index);
        index
    }

    /// Direct children of the root, in outline order. Nodes are pushed in
    /// sibling order, so a scan over the arena keeps that order.
    pub fn top_level(&self) -> impl Iterator<Item = &OutlineNode> + '_ {
        self.nodes.iter().filter(|n| n.parent == Some(ROOT))
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.is_empty()
    }

    /// Number of bookmarks, excluding the root
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Depth-first walk in outline order, skipping the root.
    pub fn walk(&self) -> Vec<&OutlineNode> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<usize> = self.nodes[ROOT].children.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Read the `/Outlines` tree of a document. A missing or unreadable outline
    /// gives a tree with only the root.
    pub fn from_document(doc: &Document) -> Self {
        let mut tree = OutlineTree::new();

        let Ok(catalog) = doc.catalog() else {
            return tree;
        };

        let outlines = match catalog.get(b"Outlines") {
            Ok(Object::Reference(r)) => match doc.get_dictionary(*r) {
                Ok(d) => d,
                Err(_) => return tree,
            },
            Ok(Object::Dictionary(d)) => d,
            _ => return tree,
        };

        let first = match outlines.get(b"First") {
            Ok(Object::Reference(r)) => *r,
            _ => return tree,
        };

        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut pending: Vec<(usize, ObjectId)> = vec![(ROOT, first)];

        while let Some((parent, first_id)) = pending.pop() {
            let mut current = Some(first_id);

            while let Some(id) = current {
                if !visited.insert(id) {
                    debug!(object = ?id, "outline item visited twice, stopping chain");
                    break;
                }
                let Ok(dict) = doc.get_dictionary(id) else {
                    break;
                };

                let title = match dict.get(b"Title") {
                    Ok(Object::String(bytes, _)) => decode_pdf_string(bytes),
                    _ => String::new(),
                };
                let index = tree.push(parent, title, item_destination(doc, dict));

                if let Ok(Object::Reference(child)) = dict.get(b"First") {
                    pending.push((index, *child));
                }

                current = match dict.get(b"Next") {
                    Ok(Object::Reference(r)) => Some(*r),
                    _ => None,
                };
            }
        }

        tree
    }
}

fn item_destination(doc: &Document, dict: &Dictionary) -> Option<Object> {
    if let Ok(dest) = dict.get(b"Dest") {
        return Some(dest.clone());
    }

    let action = match dict.get(b"A") {
        Ok(Object::Reference(r)) => doc.get_dictionary(*r).ok()?,
        Ok(Object::Dictionary(d)) => d,
        _ => return None,
    };
    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind == b"GoTo" => action.get(b"D").ok().cloned(),
        _ => None,
    }
}
