//! Integration tests for outline building, caching, and named-destination
//! resolution through the public API.

use lopdf::{dictionary, Document, Object, ObjectId};
use pdfnav::{CatalogError, PdfDocument, OUTLINE_ROOT_TITLE};

/// A document with two pages and outlines:
/// root -> "Chapter 1" (child "Section 1.1") -> "Chapter 2".
/// "Chapter 1" targets page 1 explicitly; "Section 1.1" targets the named
/// destination "sec11" stored in the Names->Dests tree; "Chapter 2" has no
/// destination.
fn outline_fixture() -> (PdfDocument, ObjectId, ObjectId, ObjectId) {
    let mut graph = Document::with_version("1.5");
    let pages_id = graph.new_object_id();
    let page1 = graph.add_object(dictionary! { "Type" => "Page", "Parent" => pages_id });
    let page2 = graph.add_object(dictionary! { "Type" => "Page", "Parent" => pages_id });
    graph.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page1), Object::Reference(page2)],
            "Count" => 2i64,
        }),
    );

    let outlines_id = graph.new_object_id();
    let ch1 = graph.new_object_id();
    let sec11 = graph.new_object_id();
    let ch2 = graph.new_object_id();
    graph.objects.insert(
        ch1,
        Object::Dictionary(dictionary! {
            "Title" => Object::string_literal("Chapter 1"),
            "Parent" => Object::Reference(outlines_id),
            "Dest" => vec![Object::Reference(page1), "Fit".into()],
            "First" => Object::Reference(sec11),
            "Next" => Object::Reference(ch2),
        }),
    );
    graph.objects.insert(
        sec11,
        Object::Dictionary(dictionary! {
            "Title" => Object::string_literal("Section 1.1"),
            "Parent" => Object::Reference(ch1),
            "Dest" => Object::string_literal("sec11"),
        }),
    );
    graph.objects.insert(
        ch2,
        Object::Dictionary(dictionary! {
            "Title" => Object::string_literal("Chapter 2"),
            "Parent" => Object::Reference(outlines_id),
        }),
    );
    graph.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => Object::Reference(ch1),
        }),
    );

    let dests_leaf = graph.add_object(dictionary! {
        "Names" => vec![
            Object::string_literal("sec11"),
            Object::Array(vec![Object::Reference(page2), "Fit".into()]),
        ],
    });
    let catalog_id = graph.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "Outlines" => Object::Reference(outlines_id),
        "Names" => Object::Dictionary(dictionary! {
            "Dests" => Object::Reference(dests_leaf),
        }),
    });
    graph.trailer.set("Root", catalog_id);

    let doc = PdfDocument::from_document(graph).expect("fixture document is well-formed");
    (doc, page1, page2, sec11)
}

#[test]
fn builds_the_expected_shape() {
    let (mut doc, _, _, _) = outline_fixture();
    let tree = doc.outlines(false).unwrap().unwrap();

    let root = tree.root();
    assert_eq!(tree.node(root).title(), OUTLINE_ROOT_TITLE);
    let top: Vec<&str> = tree
        .node(root)
        .children()
        .iter()
        .map(|&id| tree.node(id).title())
        .collect();
    assert_eq!(top, ["Chapter 1", "Chapter 2"]);

    let ch1 = tree.node(root).children()[0];
    let sections: Vec<&str> = tree
        .node(ch1)
        .children()
        .iter()
        .map(|&id| tree.node(id).title())
        .collect();
    assert_eq!(sections, ["Section 1.1"]);
}

#[test]
fn named_destination_is_replaced_in_tree_and_graph() {
    let (mut doc, _, page2, sec11) = outline_fixture();
    let tree = doc.outlines(false).unwrap().unwrap();

    let root = tree.root();
    let ch1 = tree.node(root).children()[0];
    let section = tree.node(ch1).children()[0];
    let dest = tree.node(section).destination().unwrap();
    assert_eq!(dest.page(), Some(page2));
    assert_eq!(
        dest.as_explicit().unwrap(),
        &[Object::Reference(page2), "Fit".into()]
    );

    // The item dictionary's Dest entry was rewritten in the object graph.
    let item = doc.graph().get_object(sec11).unwrap().as_dict().unwrap();
    assert_eq!(
        item.get(b"Dest").unwrap(),
        &Object::Array(vec![Object::Reference(page2), "Fit".into()])
    );
}

#[test]
fn replace_flag_off_leaves_graph_and_name_untouched() {
    let (mut doc, _, _, sec11) = outline_fixture();
    doc.catalog_mut().set_replace_named_destinations(false);
    let tree = doc.outlines(false).unwrap().unwrap();

    let root = tree.root();
    let ch1 = tree.node(root).children()[0];
    let section = tree.node(ch1).children()[0];
    assert_eq!(
        tree.node(section).destination().unwrap().as_named(),
        Some("sec11")
    );

    let item = doc.graph().get_object(sec11).unwrap().as_dict().unwrap();
    assert_eq!(
        item.get(b"Dest").unwrap(),
        &Object::string_literal("sec11")
    );

    // The reverse index still resolved the named destination's page.
    let index = doc.pages_with_outlines().unwrap();
    assert_eq!(index.len(), 2);
}

#[test]
fn reverse_index_maps_pages_to_outline_nodes_in_order() {
    let (mut doc, page1, page2, _) = outline_fixture();
    doc.outlines(false).unwrap();

    let index = doc.pages_with_outlines().unwrap();
    let tree = doc.catalog().outline_tree().unwrap();

    let on_page1: Vec<&str> = index[&page1]
        .iter()
        .map(|&id| tree.node(id).title())
        .collect();
    assert_eq!(on_page1, ["Chapter 1"]);

    let on_page2: Vec<&str> = index[&page2]
        .iter()
        .map(|&id| tree.node(id).title())
        .collect();
    assert_eq!(on_page2, ["Section 1.1"]);

    // "Chapter 2" has no destination and must appear nowhere.
    assert_eq!(index.len(), 2);
}

#[test]
fn outline_cache_is_reused_until_forced() {
    let (mut doc, _, _, _) = outline_fixture();
    doc.outlines(false).unwrap();

    // Mutate the graph behind the cache: retitle "Chapter 2".
    let root_id = doc.catalog().root_id();
    let outlines_ref = doc
        .graph()
        .get_object(root_id)
        .unwrap()
        .as_dict()
        .unwrap()
        .get(b"Outlines")
        .unwrap()
        .as_reference()
        .unwrap();
    let ch2_id = {
        let outlines = doc.graph().get_object(outlines_ref).unwrap().as_dict().unwrap();
        let ch1_id = outlines.get(b"First").unwrap().as_reference().unwrap();
        let ch1 = doc.graph().get_object(ch1_id).unwrap().as_dict().unwrap();
        ch1.get(b"Next").unwrap().as_reference().unwrap()
    };
    doc.graph_mut()
        .get_object_mut(ch2_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Title", Object::string_literal("Renamed"));

    // Unforced: the cached tree still shows the old title.
    let tree = doc.outlines(false).unwrap().unwrap();
    let titles: Vec<&str> = tree
        .node(tree.root())
        .children()
        .iter()
        .map(|&id| tree.node(id).title())
        .collect();
    assert_eq!(titles, ["Chapter 1", "Chapter 2"]);

    // Forced: the rebuild sees the mutation.
    let tree = doc.outlines(true).unwrap().unwrap();
    let titles: Vec<&str> = tree
        .node(tree.root())
        .children()
        .iter()
        .map(|&id| tree.node(id).title())
        .collect();
    assert_eq!(titles, ["Chapter 1", "Renamed"]);
}

#[test]
fn forced_refresh_rebuilds_an_equivalent_tree() {
    let (mut doc, _, _, _) = outline_fixture();
    let first = doc.outlines(false).unwrap().unwrap().clone();
    let second = doc.outlines(true).unwrap().unwrap();
    assert_eq!(&first, second);
}

#[test]
fn absent_outlines_do_not_cache_a_sentinel() {
    let mut doc = PdfDocument::new();
    let page = doc.new_page();
    doc.add_page(page).unwrap();
    assert!(doc.outlines(false).unwrap().is_none());
    assert!(doc.pages_with_outlines().is_none());

    // Wire an outline tree into the graph; the very next unforced call
    // must pick it up because no "no outlines" sentinel was cached.
    let item = doc.graph_mut().add_object(dictionary! {
        "Title" => Object::string_literal("Late"),
    });
    let outlines_id = doc.graph_mut().add_object(dictionary! {
        "Type" => "Outlines",
        "First" => Object::Reference(item),
    });
    let root_id = doc.catalog().root_id();
    doc.graph_mut()
        .get_object_mut(root_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Outlines", Object::Reference(outlines_id));

    let tree = doc.outlines(false).unwrap().unwrap();
    assert_eq!(tree.node(tree.root()).children().len(), 1);
}

#[test]
fn failed_build_caches_nothing() {
    let mut doc = PdfDocument::new();
    let item = doc.graph_mut().new_object_id();
    doc.graph_mut().objects.insert(
        item,
        Object::Dictionary(dictionary! {
            "Title" => Object::string_literal("Loop"),
            "Next" => Object::Reference(item),
        }),
    );
    let outlines_id = doc.graph_mut().add_object(dictionary! {
        "Type" => "Outlines",
        "First" => Object::Reference(item),
    });
    let root_id = doc.catalog().root_id();
    doc.graph_mut()
        .get_object_mut(root_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Outlines", Object::Reference(outlines_id));

    let err = doc.outlines(false).unwrap_err();
    assert!(matches!(err, CatalogError::OutlineCycle(id) if id == item));
    assert!(doc.catalog().outline_tree().is_none());
    assert!(doc.pages_with_outlines().is_none());
}

#[test]
fn failed_rebuild_discards_the_previous_cache() {
    let (mut doc, _, _, sec11) = outline_fixture();
    doc.outlines(false).unwrap();
    assert!(doc.catalog().outline_tree().is_some());

    // Corrupt the graph: the section now points at itself as a sibling.
    doc.graph_mut()
        .get_object_mut(sec11)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Next", Object::Reference(sec11));

    assert!(doc.outlines(true).is_err());
    assert!(doc.catalog().outline_tree().is_none());
    assert!(doc.pages_with_outlines().is_none());
}

#[test]
fn named_destinations_merge_with_tree_precedence() {
    let mut graph = Document::with_version("1.5");
    let page1 = graph.add_object(dictionary! { "Type" => "Page" });
    let page2 = graph.add_object(dictionary! { "Type" => "Page" });
    let leaf = graph.add_object(dictionary! {
        "Names" => vec![
            Object::string_literal("shared"),
            Object::Array(vec![Object::Reference(page2), "Fit".into()]),
        ],
    });
    let catalog_id = graph.add_object(dictionary! {
        "Type" => "Catalog",
        "Dests" => Object::Dictionary(dictionary! {
            "shared" => vec![Object::Reference(page1), "Fit".into()],
            "flat-only" => Object::Dictionary(dictionary! {
                "D" => vec![Object::Reference(page1), "Fit".into()],
            }),
            "dropped" => Object::Integer(3),
        }),
        "Names" => Object::Dictionary(dictionary! {
            "Dests" => Object::Reference(leaf),
        }),
    });
    graph.trailer.set("Root", catalog_id);
    let doc = PdfDocument::from_document(graph).unwrap();

    let names = doc.named_destinations().unwrap();
    assert_eq!(names.len(), 2);
    // The tree entry wins the key collision.
    assert_eq!(names["shared"][0], Object::Reference(page2));
    // The flat dictionary entry coerced through its D array.
    assert_eq!(names["flat-only"][0], Object::Reference(page1));
    assert!(!names.contains_key("dropped"));
}

#[test]
fn bookmarks_flatten_titles_levels_and_pages() {
    let (mut doc, _, _, _) = outline_fixture();
    let bookmarks = doc.bookmarks().unwrap();

    let summary: Vec<(&str, usize, Option<usize>)> = bookmarks
        .iter()
        .map(|b| (b.title.as_str(), b.level, b.page_number))
        .collect();
    assert_eq!(
        summary,
        [
            ("Chapter 1", 0, Some(0)),
            ("Section 1.1", 1, Some(1)),
            ("Chapter 2", 0, None),
        ]
    );
}

#[test]
fn bookmarks_without_outlines_are_empty() {
    let mut doc = PdfDocument::new();
    assert!(doc.bookmarks().unwrap().is_empty());
}
