//! Shared PDF fixtures for integration tests.
#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

/// How content streams are stored in a fixture.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Plain,
    Flate,
}

/// Standard Helvetica, no explicit encoding.
pub fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    }
}

/// One page per content stream, `/F1` Helvetica inherited from the page tree.
pub fn pdf_with_pages(pages: &[&[u8]]) -> Vec<u8> {
    save(build(pages, Storage::Plain, |_| vec![("F1", helvetica())]))
}

/// Like [`pdf_with_pages`] with FlateDecode-compressed content streams.
pub fn compressed_pdf_with_pages(pages: &[&[u8]]) -> Vec<u8> {
    save(build(pages, Storage::Flate, |_| vec![("F1", helvetica())]))
}

/// One page using `/F1` Helvetica and `/F2`, a Type0 Identity-H font whose
/// ToUnicode maps codes 1, 2, 3 to "A", "B", " ".
pub fn pdf_with_composite_font(content: &[u8]) -> Vec<u8> {
    save(build(&[content], Storage::Plain, |doc| {
        vec![("F1", helvetica()), ("F2", identity_font(doc))]
    }))
}

fn identity_font(doc: &mut Document) -> Dictionary {
    let cmap = b"1 begincodespacerange <0000> <FFFF> endcodespacerange\n\
        3 beginbfchar <0001> <0041> <0002> <0042> <0003> <0020> endbfchar";
    let cmap_id = doc.add_object(Stream::new(dictionary! {}, cmap.to_vec()));
    let cid_font = dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "NotoSans",
        "DW" => 500,
        "W" => Object::Array(vec![
            Object::Integer(1),
            Object::Array(vec![Object::Integer(650), Object::Integer(700), Object::Integer(250)]),
        ]),
    };
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "NotoSans",
        "Encoding" => "Identity-H",
        "DescendantFonts" => Object::Array(vec![Object::Dictionary(cid_font)]),
        "ToUnicode" => cmap_id,
    }
}

fn deflate(content: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

/// Build a document. Fonts are registered once and shared by every page
/// through the page tree's `/Resources`.
pub fn build(
    pages: &[&[u8]],
    storage: Storage,
    fonts: impl FnOnce(&mut Document) -> Vec<(&'static str, Dictionary)>,
) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let mut font_resources = Dictionary::new();
    for (name, font) in fonts(&mut doc) {
        let font_id = doc.add_object(font);
        font_resources.set(name, font_id);
    }

    let mut kids: Vec<Object> = Vec::new();
    for content in pages {
        let stream = match storage {
            Storage::Plain => Stream::new(dictionary! {}, content.to_vec()),
            Storage::Flate => Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                deflate(content),
            ),
        };
        let content_id = doc.add_object(stream);
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

/// Two pages whose `/Contents` point at the same stream object.
pub fn pdf_with_shared_content(content: &[u8]) -> Vec<u8> {
    let mut doc = build(&[content, content], Storage::Plain, |_| vec![("F1", helvetica())]);
    let pages = doc.get_pages();
    let (first, second) = (pages[&1], pages[&2]);
    let shared = doc
        .get_object(first)
        .and_then(Object::as_dict)
        .and_then(|page| page.get(b"Contents"))
        .and_then(Object::as_reference)
        .unwrap();
    doc.get_object_mut(second)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("Contents", shared);
    save(doc)
}

/// One page drawing `/Fm1`, a Form XObject with no resources of its own,
/// so its text uses the inherited `/F1` Helvetica.
pub fn pdf_with_form(page: &[u8], form: &[u8]) -> Vec<u8> {
    let mut doc = build(&[page], Storage::Plain, |_| vec![("F1", helvetica())]);
    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        },
        form.to_vec(),
    ));
    let pages_id = doc
        .catalog()
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .unwrap();
    doc.get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .and_then(|pages| pages.get_mut(b"Resources"))
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("XObject", dictionary! { "Fm1" => form_id });
    save(doc)
}

pub fn save(mut doc: Document) -> Vec<u8> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Decoded content of every page's first content stream.
pub fn page_contents(bytes: &[u8]) -> Vec<Vec<u8>> {
    let doc = pdfmodifier::Document::parse(bytes).expect("output should parse");
    doc.pages()
        .iter()
        .map(|page| doc.stream_content(page.contents[0]).unwrap())
        .collect()
}

/// Whether the first content stream of a page is stored with a `/Filter`.
pub fn page_is_compressed(bytes: &[u8], page: usize) -> bool {
    let doc = pdfmodifier::Document::parse(bytes).unwrap();
    let id = doc.page(page).unwrap().contents[0];
    doc.is_stream_compressed(id)
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
