use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

use super::OutlineNode;

// Bounds indirect chains and name-tree descent on hostile input.
const MAX_DEPTH: u32 = 32;

pub trait DestinationResolver {
    /// 0-based page index the node points at, or `None` if it cannot be resolved.
    fn resolve(&self, node: &OutlineNode) -> Option<u32>;
}

/// Resolves destinations against one document's page tree.
pub struct PageResolver<'a> {
    doc: &'a Document,
    page_map: &'a HashMap<ObjectId, u32>,
}

impl<'a> PageResolver<'a> {
    pub fn new(doc: &'a Document, page_map: &'a HashMap<ObjectId, u32>) -> Self {
        PageResolver { doc, page_map }
    }

    pub fn resolve_object(&self, dest: &Object) -> Option<u32> {
        self.resolve_at(dest, 0)
    }

    fn resolve_at(&self, dest: &Object, depth: u32) -> Option<u32> {
        if depth > MAX_DEPTH {
            return None;
        }
        match dest {
            Object::Array(arr) => self.page_from_dest_array(arr),
            Object::String(name, _) | Object::Name(name) => self.resolve_named(name, depth + 1),
            // Value of a named destination may be wrapped as << /D [...] >>
            Object::Dictionary(dict) => self.resolve_at(dict.get(b"D").ok()?, depth + 1),
            Object::Reference(r) => self.resolve_at(self.doc.get_object(*r).ok()?, depth + 1),
            _ => None,
        }
    }

    fn page_from_dest_array(&self, arr: &[Object]) -> Option<u32> {
        // [page_ref /XYZ left top zoom] or similar
        match arr.first()? {
            Object::Reference(page_ref) => self.page_map.get(page_ref).copied(),
            // Some producers write a page index instead of a reference
            Object::Integer(n) => u32::try_from(*n).ok(),
            _ => None,
        }
    }

    fn resolve_named(&self, name: &[u8], depth: u32) -> Option<u32> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(names) = self.dict_entry(catalog, b"Names") {
            if let Some(dests) = self.dict_entry(names, b"Dests") {
                if let Some(dest) = self.search_name_tree(dests, name, 0) {
                    return self.resolve_at(dest, depth + 1);
                }
            }
        }

        // Older style: catalog /Dests dictionary keyed by name
        let dests = self.dict_entry(catalog, b"Dests")?;
        let dest = dests.get(name).ok()?;
        self.resolve_at(dest, depth + 1)
    }

    fn search_name_tree(&self, node: &'a Dictionary, name: &[u8], depth: u32) -> Option<&'a Object> {
        if depth > MAX_DEPTH {
            return None;
        }

        if let Ok(Object::Array(names)) = node.get(b"Names") {
            for chunk in names.chunks(2) {
                if let [Object::String(key, _), value] = chunk {
                    if key == name {
                        return Some(value);
                    }
                }
            }
        }

        if let Ok(Object::Array(kids)) = node.get(b"Kids") {
            for kid in kids {
                if let Object::Reference(kid_ref) = kid {
                    let Ok(kid_dict) = self.doc.get_dictionary(*kid_ref) else {
                        continue;
                    };
                    if let Some(found) = self.search_name_tree(kid_dict, name, depth + 1) {
                        return Some(found);
                    }
                }
            }
        }

        None
    }

    fn dict_entry(&self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
        match dict.get(key).ok()? {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }
}

impl DestinationResolver for PageResolver<'_> {
    fn resolve(&self, node: &OutlineNode) -> Option<u32> {
        self.resolve_object(node.destination.as_ref()?)
    }
}
