//! In-memory PDFs and sources for tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::cell::RefCell;

use super::{ChapterSource, DestinationResolver, ExtractError, OutlineNode, OutlineTree};

const MISSING: ObjectId = (9999, 0);

#[derive(Debug, Clone)]
pub enum Target {
    Page(u32),
    Action(u32),
    Named(String, u32),
    /// Named destination stored as `<< /D [...] >>` in the name tree
    NamedWrapped(String, u32),
    /// Named destination in a `/Kids` leaf of the name tree
    NamedInKids(String, u32),
    /// Name object looked up in the catalog `/Dests` dictionary
    LegacyNamed(String, u32),
    /// GoTo action stored as its own object
    IndirectAction(u32),
    Index(i64),
    Dangling,
    None,
}

#[derive(Debug, Clone)]
pub struct Bookmark {
    pub title: Option<String>,
    pub target: Target,
    pub children: Vec<Bookmark>,
}

impl Bookmark {
    fn new(title: &str, target: Target) -> Self {
        Bookmark {
            title: Some(title.to_string()),
            target,
            children: Vec::new(),
        }
    }

    pub fn page(title: &str, page: u32) -> Self {
        Self::new(title, Target::Page(page))
    }

    pub fn action(title: &str, page: u32) -> Self {
        Self::new(title, Target::Action(page))
    }

    pub fn named(title: &str, name: &str, page: u32) -> Self {
        Self::new(title, Target::Named(name.to_string(), page))
    }

    pub fn named_wrapped(title: &str, name: &str, page: u32) -> Self {
        Self::new(title, Target::NamedWrapped(name.to_string(), page))
    }

    pub fn named_in_kids(title: &str, name: &str, page: u32) -> Self {
        Self::new(title, Target::NamedInKids(name.to_string(), page))
    }

    pub fn legacy_named(title: &str, name: &str, page: u32) -> Self {
        Self::new(title, Target::LegacyNamed(name.to_string(), page))
    }

    pub fn indirect_action(title: &str, page: u32) -> Self {
        Self::new(title, Target::IndirectAction(page))
    }

    pub fn index(title: &str, index: i64) -> Self {
        Self::new(title, Target::Index(index))
    }

    pub fn dangling(title: &str) -> Self {
        Self::new(title, Target::Dangling)
    }

    pub fn no_target(title: &str) -> Self {
        Self::new(title, Target::None)
    }

    pub fn untitled(page: u32) -> Self {
        Bookmark {
            title: None,
            target: Target::Page(page),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Bookmark>) -> Self {
        self.children = children;
        self
    }
}

/// A PDF with `num_pages` pages reading "Page N", plus the given outline.
pub fn build_pdf(num_pages: u32, bookmarks: &[Bookmark]) -> Vec<u8> {
    build(num_pages, None, bookmarks)
}

/// Like `build_pdf`, but the 0-based page `broken` has a dangling content stream.
pub fn build_pdf_with_broken_page(num_pages: u32, broken: u32, bookmarks: &[Bookmark]) -> Vec<u8> {
    build(num_pages, Some(broken), bookmarks)
}

fn build(num_pages: u32, broken: Option<u32>, bookmarks: &[Bookmark]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::new();
    for i in 0..num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
                Operation::new("Td", vec![Object::Integer(100), Object::Integer(700)]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let contents = if broken == Some(i) {
            (8888, 0)
        } else {
            doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()))
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
            "Contents" => contents,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => num_pages as i64,
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };

    if !bookmarks.is_empty() {
        let outlines_id = doc.new_object_id();
        let mut named = NamedDests::default();
        let (first, last) =
            add_items(&mut doc, outlines_id, bookmarks, &page_ids, &mut named).unwrap();
        doc.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first,
                "Last" => last,
                "Count" => bookmarks.len() as i64,
            }),
        );
        catalog.set("Outlines", outlines_id);

        if !named.tree.is_empty() || !named.kids.is_empty() {
            let mut root = Dictionary::new();
            if !named.tree.is_empty() {
                root.set("Names", named.tree);
            }
            if !named.kids.is_empty() {
                let leaf = doc.add_object(dictionary! { "Names" => named.kids });
                root.set("Kids", vec![Object::Reference(leaf)]);
            }
            let dests_id = doc.add_object(root);
            catalog.set("Names", dictionary! { "Dests" => dests_id });
        }
        if !named.legacy.is_empty() {
            let legacy_id = doc.add_object(named.legacy);
            catalog.set("Dests", legacy_id);
        }
    }

    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[derive(Default)]
struct NamedDests {
    tree: Vec<Object>,
    kids: Vec<Object>,
    legacy: Dictionary,
}

fn fit(page: ObjectId) -> Object {
    Object::Array(vec![Object::Reference(page), "Fit".into()])
}

fn add_items(
    doc: &mut Document,
    parent: ObjectId,
    items: &[Bookmark],
    page_ids: &[ObjectId],
    named: &mut NamedDests,
) -> Option<(ObjectId, ObjectId)> {
    if items.is_empty() {
        return None;
    }
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (i, item) in items.iter().enumerate() {
        let mut dict = Dictionary::new();
        if let Some(title) = &item.title {
            dict.set("Title", Object::string_literal(title.as_str()));
        }
        dict.set("Parent", parent);
        if i > 0 {
            dict.set("Prev", ids[i - 1]);
        }
        if i + 1 < ids.len() {
            dict.set("Next", ids[i + 1]);
        }

        match &item.target {
            Target::Page(p) => dict.set("Dest", fit(page_ids[*p as usize])),
            Target::Action(p) => dict.set(
                "A",
                dictionary! { "S" => "GoTo", "D" => fit(page_ids[*p as usize]) },
            ),
            Target::Named(name, p) => {
                named.tree.push(Object::string_literal(name.as_str()));
                named.tree.push(fit(page_ids[*p as usize]));
                dict.set("Dest", Object::string_literal(name.as_str()));
            }
            Target::NamedWrapped(name, p) => {
                named.tree.push(Object::string_literal(name.as_str()));
                named.tree.push(Object::Dictionary(dictionary! {
                    "D" => fit(page_ids[*p as usize]),
                }));
                dict.set("Dest", Object::string_literal(name.as_str()));
            }
            Target::NamedInKids(name, p) => {
                named.kids.push(Object::string_literal(name.as_str()));
                named.kids.push(fit(page_ids[*p as usize]));
                dict.set("Dest", Object::string_literal(name.as_str()));
            }
            Target::LegacyNamed(name, p) => {
                named.legacy.set(name.as_bytes().to_vec(), fit(page_ids[*p as usize]));
                dict.set("Dest", Object::Name(name.as_bytes().to_vec()));
            }
            Target::IndirectAction(p) => {
                let action = doc.add_object(dictionary! {
                    "S" => "GoTo",
                    "D" => fit(page_ids[*p as usize]),
                });
                dict.set("A", action);
            }
            Target::Index(n) => dict.set(
                "Dest",
                Object::Array(vec![Object::Integer(*n), "Fit".into()]),
            ),
            Target::Dangling => dict.set("Dest", fit(MISSING)),
            Target::None => {}
        }

        if let Some((first, last)) = add_items(doc, ids[i], &item.children, page_ids, named) {
            dict.set("First", first);
            dict.set("Last", last);
            dict.set("Count", item.children.len() as i64);
        }
        doc.objects.insert(ids[i], Object::Dictionary(dict));
    }

    Some((ids[0], ids[ids.len() - 1]))
}

/// Text drawn on each page, in page order.
pub fn page_texts(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .values()
        .map(|&id| {
            let raw = doc.get_page_content(id).unwrap();
            let content = Content::decode(&raw).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(bytes, _)) => {
                        Some(String::from_utf8_lossy(bytes).into_owned())
                    }
                    _ => None,
                })
                .collect::<String>()
        })
        .collect()
}

/// Source with integer destinations and scriptable extraction failures.
pub struct FakeSource {
    pub pages: u32,
    pub outline: OutlineTree,
    pub fail_starts: Vec<u32>,
    pub calls: RefCell<Vec<(u32, u32)>>,
}

impl FakeSource {
    /// `None` marks an entry without a destination.
    pub fn new(pages: u32, tops: &[(&str, Option<i64>)]) -> Self {
        let mut outline = OutlineTree::new();
        for (title, page) in tops {
            outline.push(0, title.to_string(), page.map(Object::Integer));
        }
        FakeSource {
            pages,
            outline,
            fail_starts: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing_at(mut self, start: u32) -> Self {
        self.fail_starts.push(start);
        self
    }
}

impl DestinationResolver for FakeSource {
    fn resolve(&self, node: &OutlineNode) -> Option<u32> {
        match node.destination {
            Some(Object::Integer(n)) => u32::try_from(n).ok(),
            _ => None,
        }
    }
}

impl ChapterSource for FakeSource {
    fn page_count(&self) -> u32 {
        self.pages
    }

    fn outline(&self) -> OutlineTree {
        self.outline.clone()
    }

    fn extract_pages(&self, start: u32, end: u32) -> Result<Vec<u8>, ExtractError> {
        self.calls.borrow_mut().push((start, end));
        if self.fail_starts.contains(&start) {
            return Err(ExtractError::BrokenPage {
                page: start,
                reason: "simulated corrupt page".to_string(),
            });
        }
        Ok(format!("{}-{}", start, end).into_bytes())
    }
}
