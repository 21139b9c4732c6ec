//! Serializer: writes a [`Document`] back to PDF bytes with a classic
//! cross-reference table.

use std::collections::BTreeSet;

use lopdf::{Dictionary, Object, ObjectId};
use tracing::debug;

use crate::document::Document;
use crate::error::BackendError;

/// Trailer entries that describe the input's cross-reference layout and
/// are stale once the table is rewritten.
const STALE_TRAILER_KEYS: [&[u8]; 9] = [
    b"Prev",
    b"XRefStm",
    b"Type",
    b"W",
    b"Index",
    b"Filter",
    b"DecodeParms",
    b"Length",
    b"Size",
];

/// Object types that only carried the input's cross-reference data.
const XREF_OBJECT_TYPES: [&[u8]; 2] = [b"XRef", b"ObjStm"];

/// Serialize a document.
///
/// Objects are written in id order; output is deterministic for a given
/// document.
///
/// # Errors
///
/// [`BackendError::Serialize`] if an indirect reference does not resolve
/// or the writer fails.
pub fn write(doc: &Document) -> Result<Vec<u8>, BackendError> {
    let source = doc.inner();
    let mut out = lopdf::Document::with_version(source.version.clone());

    for (id, obj) in &source.objects {
        if is_xref_object(obj) {
            debug!(object = id.0, "dropping cross-reference object");
            continue;
        }
        out.objects.insert(*id, obj.clone());
    }

    let mut trailer = source.trailer.clone();
    for key in STALE_TRAILER_KEYS {
        trailer.remove(key);
    }
    out.trailer = trailer;
    out.max_id = out.objects.keys().map(|id| id.0).max().unwrap_or(0);

    check_references(&out)?;

    let mut buf = Vec::new();
    out.save_to(&mut buf)
        .map_err(|e| BackendError::Serialize(format!("failed to write PDF: {e}")))?;
    debug!(bytes = buf.len(), objects = out.objects.len(), "serialized document");
    Ok(buf)
}

fn is_xref_object(obj: &Object) -> bool {
    let dict = match obj {
        Object::Stream(stream) => &stream.dict,
        _ => return false,
    };
    dict.get(b"Type")
        .and_then(Object::as_name)
        .is_ok_and(|name| XREF_OBJECT_TYPES.iter().any(|t| *t == name))
}

/// Every indirect reference in the object table and trailer must name an
/// object that will be written.
fn check_references(doc: &lopdf::Document) -> Result<(), BackendError> {
    let mut refs = BTreeSet::new();
    collect_dict_refs(&doc.trailer, &mut refs);
    for obj in doc.objects.values() {
        collect_refs(obj, &mut refs);
    }
    match refs.iter().find(|id| !doc.objects.contains_key(id)) {
        Some(id) => Err(BackendError::Serialize(format!(
            "dangling reference to object {} {}",
            id.0, id.1
        ))),
        None => Ok(()),
    }
}

fn collect_refs(obj: &Object, refs: &mut BTreeSet<ObjectId>) {
    match obj {
        Object::Reference(id) => {
            refs.insert(*id);
        }
        Object::Array(items) => items.iter().for_each(|item| collect_refs(item, refs)),
        Object::Dictionary(dict) => collect_dict_refs(dict, refs),
        Object::Stream(stream) => collect_dict_refs(&stream.dict, refs),
        _ => {}
    }
}

fn collect_dict_refs(dict: &Dictionary, refs: &mut BTreeSet<ObjectId>) {
    for (_, value) in dict.iter() {
        collect_refs(value, refs);
    }
}
