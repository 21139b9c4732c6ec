//! Programmatic PDF fixtures for unit tests.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// Standard Helvetica, no explicit encoding.
pub(crate) fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    }
}

/// Build a document with one page per content stream. Every page inherits
/// `/Resources << /Font << /F1 Helvetica >> >>` from the page tree root.
pub(crate) fn build_pdf_doc(pages: &[&[u8]]) -> Document {
    build_pdf_doc_with_fonts(pages, vec![("F1", helvetica())])
}

/// Like [`build_pdf_doc`] with a custom font resource set.
pub(crate) fn build_pdf_doc_with_fonts(
    pages: &[&[u8]],
    fonts: Vec<(&str, Dictionary)>,
) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut font_resources = Dictionary::new();
    for (name, font) in fonts {
        let font_id = doc.add_object(font);
        font_resources.set(name, font_id);
    }

    let mut kids: Vec<Object> = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => dictionary! { "Font" => font_resources },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Serialized form of [`build_pdf_doc`].
pub(crate) fn build_pdf(pages: &[&[u8]]) -> Vec<u8> {
    save(build_pdf_doc(pages))
}

pub(crate) fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// A Form XObject stream; `dict` adds `/Matrix`, `/Resources` and the like.
pub(crate) fn form_xobject(content: &[u8], mut dict: Dictionary) -> Stream {
    dict.set("Type", "XObject");
    dict.set("Subtype", "Form");
    dict.set("BBox", vec![0.into(), 0.into(), 612.into(), 792.into()]);
    Stream::new(dict, content.to_vec())
}

/// Register `xobject` as `/<name>` in the page tree root's resources.
pub(crate) fn add_xobject(doc: &mut Document, name: &str, xobject: Stream) -> ObjectId {
    let id = doc.add_object(xobject);
    let root_resources = root_resources_mut(doc);
    if !root_resources.has(b"XObject") {
        root_resources.set("XObject", Dictionary::new());
    }
    root_resources
        .get_mut(b"XObject")
        .and_then(Object::as_dict_mut)
        .expect("/XObject is a dictionary")
        .set(name, id);
    id
}

/// The `/Resources` dictionary every test page inherits.
pub(crate) fn root_resources_mut(doc: &mut Document) -> &mut Dictionary {
    let page_id = *doc.get_pages().get(&1).expect("document has a page");
    let pages_id = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .and_then(|page| page.get(b"Parent"))
        .and_then(Object::as_reference)
        .expect("page has a /Parent");
    doc.get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .and_then(|pages| pages.get_mut(b"Resources"))
        .and_then(Object::as_dict_mut)
        .expect("page tree root has /Resources")
}
