//! lopdf-backed document model.
//!
//! [`Document`] owns the parsed object graph (an arena keyed by object id)
//! plus a cached page list. The only mutation path is
//! [`Document::replace_stream_content`].

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Dictionary, Object, ObjectId};
use pdfmodifier_core::{BBox, ObjectRef, PdfModifierError};
use tracing::debug;

use crate::error::BackendError;
use crate::font::{Font, load_fonts};

/// US Letter, used when no `/MediaBox` is found on a page or its ancestors.
const DEFAULT_MEDIA_BOX: BBox = BBox {
    x0: 0.0,
    top: 0.0,
    x1: 612.0,
    bottom: 792.0,
};

/// Options for parsing a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOptions {
    /// Reject inputs larger than this many bytes (default: no limit).
    pub max_input_bytes: Option<usize>,
}

impl ParseOptions {
    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }
}

/// One page of a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// The 0-based page index.
    pub index: usize,
    /// The page dictionary's object id.
    pub id: ObjectRef,
    /// Content streams in drawing order.
    pub contents: Vec<ObjectRef>,
    /// Media box in PDF user space, stored as `[x0 y0 x1 y1]` in the
    /// `x0`/`top`/`x1`/`bottom` slots (bottom-left origin).
    pub media_box: BBox,
}

impl Page {
    /// Page height in user space units.
    pub fn height(&self) -> f64 {
        (self.media_box.bottom - self.media_box.top).abs()
    }
}

/// A parsed PDF document.
#[derive(Clone)]
pub struct Document {
    inner: lopdf::Document,
    pages: Vec<Page>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.inner.version)
            .field("page_count", &self.pages.len())
            .finish_non_exhaustive()
    }
}

impl Document {
    /// Parse a document from raw bytes with default options.
    pub fn parse(bytes: &[u8]) -> Result<Self, BackendError> {
        Self::parse_with_options(bytes, &ParseOptions::default())
    }

    /// Parse a document from raw bytes.
    ///
    /// # Errors
    ///
    /// [`BackendError::Parse`] if the bytes are not a readable PDF, the
    /// document is encrypted, or a page's content stream does not resolve.
    /// A [`PdfModifierError::ResourceLimitExceeded`] if the input exceeds
    /// `max_input_bytes`.
    pub fn parse_with_options(bytes: &[u8], options: &ParseOptions) -> Result<Self, BackendError> {
        if let Some(limit) = options.max_input_bytes {
            if bytes.len() > limit {
                return Err(BackendError::Core(
                    PdfModifierError::ResourceLimitExceeded {
                        limit_name: "max_input_bytes".to_string(),
                        limit_value: limit,
                        actual_value: bytes.len(),
                    },
                ));
            }
        }

        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        Self::from_lopdf(inner)
    }

    /// Wrap an already-loaded lopdf document.
    pub fn from_lopdf(inner: lopdf::Document) -> Result<Self, BackendError> {
        if inner.is_encrypted() || inner.trailer.get(b"Encrypt").is_ok() {
            return Err(BackendError::Parse(
                "encrypted documents are not supported".to_string(),
            ));
        }

        // get_pages() keys are 1-based page numbers in order
        let page_ids: Vec<ObjectId> = inner.get_pages().values().copied().collect();
        let mut pages = Vec::with_capacity(page_ids.len());
        for (index, id) in page_ids.into_iter().enumerate() {
            let contents = page_content_ids(&inner, id)?;
            let media_box = match resolve_inherited(&inner, id, b"MediaBox")? {
                Some(obj) => extract_box(resolve_ref(&inner, obj))?,
                None => DEFAULT_MEDIA_BOX,
            };
            pages.push(Page {
                index,
                id,
                contents,
                media_box,
            });
        }

        debug!(pages = pages.len(), version = %inner.version, "parsed document");
        Ok(Document { inner, pages })
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    /// Consume the document, returning the lopdf document.
    pub fn into_inner(self) -> lopdf::Document {
        self.inner
    }

    /// PDF header version, e.g. `"1.7"`.
    pub fn version(&self) -> &str {
        &self.inner.version
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Look up an object by id.
    pub fn object(&self, id: ObjectRef) -> Result<&Object, BackendError> {
        self.inner
            .get_object(id)
            .map_err(|e| BackendError::Parse(format!("object {} {} not found: {e}", id.0, id.1)))
    }

    /// Follow an indirect reference; other objects are returned as-is.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        resolve_ref(&self.inner, obj)
    }

    /// The page's resource dictionary, following `/Parent` inheritance.
    /// Pages without resources get an empty dictionary.
    pub fn page_resources(&self, page: &Page) -> Result<Dictionary, BackendError> {
        match resolve_inherited(&self.inner, page.id, b"Resources")? {
            Some(obj) => resolve_ref(&self.inner, obj)
                .as_dict()
                .cloned()
                .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
            None => Ok(Dictionary::new()),
        }
    }

    /// Fonts in the page's resource dictionary, sorted by resource name.
    pub fn page_fonts(&self, page: &Page) -> Result<Vec<Font>, BackendError> {
        let resources = self.page_resources(page)?;
        load_fonts(self, &resources)
    }

    /// Decoded (decompressed) bytes of a content stream.
    pub fn stream_content(&self, id: ObjectRef) -> Result<Vec<u8>, BackendError> {
        let stream = self
            .object(id)?
            .as_stream()
            .map_err(|_| BackendError::Parse(format!("object {} {} is not a stream", id.0, id.1)))?;
        if stream.dict.get(b"Filter").is_ok() {
            stream.decompressed_content().map_err(|e| {
                BackendError::Parse(format!(
                    "failed to decompress stream {} {}: {e}",
                    id.0, id.1
                ))
            })
        } else {
            Ok(stream.content.clone())
        }
    }

    /// Whether a stream is stored with a `/Filter`.
    pub fn is_stream_compressed(&self, id: ObjectRef) -> bool {
        self.inner
            .get_object(id)
            .and_then(Object::as_stream)
            .is_ok_and(|s| s.dict.get(b"Filter").is_ok())
    }

    /// Replace the content of a stream object.
    ///
    /// With `compress` the bytes are stored FlateDecode-encoded; otherwise
    /// they are stored plain and any `/Filter` is removed.
    pub fn replace_stream_content(
        &mut self,
        id: ObjectRef,
        content: Vec<u8>,
        compress: bool,
    ) -> Result<(), BackendError> {
        let stream = self
            .inner
            .get_object_mut(id)
            .and_then(Object::as_stream_mut)
            .map_err(|e| {
                BackendError::Parse(format!("stream {} {} not found: {e}", id.0, id.1))
            })?;

        if compress {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&content)?;
            let compressed = encoder.finish()?;
            stream.dict.remove(b"DecodeParms");
            stream.dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            stream.set_content(compressed);
        } else {
            stream.set_plain_content(content);
        }
        debug!(object = id.0, generation = id.1, compress, "replaced stream content");
        Ok(())
    }
}

/// Collect the content stream ids of a page, verifying each resolves to a stream.
fn page_content_ids(doc: &lopdf::Document, page_id: ObjectId) -> Result<Vec<ObjectRef>, BackendError> {
    let page_dict = doc
        .get_object(page_id)
        .and_then(Object::as_dict)
        .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

    let contents_obj = match page_dict.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()),
    };

    let refs: Vec<ObjectId> = match contents_obj {
        Object::Reference(id) => match doc.get_object(*id) {
            // /Contents may reference an array of streams
            Ok(Object::Array(arr)) => array_refs(arr)?,
            _ => vec![*id],
        },
        Object::Array(arr) => array_refs(arr)?,
        _ => {
            return Err(BackendError::Parse(
                "/Contents is not a reference or array".to_string(),
            ));
        }
    };

    for id in &refs {
        let obj = doc.get_object(*id).map_err(|e| {
            BackendError::Parse(format!(
                "content stream {} {} does not resolve: {e}",
                id.0, id.1
            ))
        })?;
        obj.as_stream().map_err(|_| {
            BackendError::Parse(format!("/Contents entry {} {} is not a stream", id.0, id.1))
        })?;
    }
    Ok(refs)
}

fn array_refs(arr: &[Object]) -> Result<Vec<ObjectId>, BackendError> {
    arr.iter()
        .map(|item| {
            item.as_reference().map_err(|e| {
                BackendError::Parse(format!("/Contents array item is not a reference: {e}"))
            })
        })
        .collect()
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    // bounded walk guards against /Parent cycles
    for _ in 0..64 {
        let dict = doc
            .get_object(current_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
    Err(BackendError::Parse("page tree /Parent chain too deep".to_string()))
}

/// Resolve an indirect reference, returning the referenced object.
pub(crate) fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Convert a lopdf numeric object (Integer or Real) to f64.
pub(crate) fn object_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Read a name object as a string.
pub(crate) fn object_to_name(obj: &Object) -> Option<String> {
    obj.as_name().ok().map(display_name)
}

/// Printable form of a raw PDF name, without the leading `/`.
///
/// Valid UTF-8 is kept as text. Otherwise every byte outside printable
/// ASCII is written as a `#XX` escape, so distinct names never collide.
pub fn display_name(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes
            .iter()
            .map(|&b| {
                if (0x21..=0x7E).contains(&b) && b != b'#' {
                    (b as char).to_string()
                } else {
                    format!("#{b:02X}")
                }
            })
            .collect(),
    }
}

/// Extract a box from a lopdf array of 4 numbers `[x0, y0, x1, y1]`.
fn extract_box(obj: &Object) -> Result<BBox, BackendError> {
    let array = obj
        .as_array()
        .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
    let nums: Vec<f64> = array.iter().filter_map(object_to_f64).collect();
    if nums.len() != 4 {
        return Err(BackendError::Parse(format!(
            "expected 4-element array for box, got {}",
            array.len()
        )));
    }
    Ok(BBox::new(
        nums[0].min(nums[2]),
        nums[1].min(nums[3]),
        nums[0].max(nums[2]),
        nums[1].max(nums[3]),
    ))
}
