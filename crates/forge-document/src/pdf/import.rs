// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page import — copy every page of a source document into the output document.

use std::collections::HashMap;

use forge_core::error::{ForgeError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Bound on page-tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Copy all pages of `source` into `target`, in page order, parented to
/// `parent`. Returns the new page object IDs.
///
/// Every object a page reaches is copied once per import; shared resources
/// stay shared and reference cycles terminate. `/Parent` links are not
/// followed, so the source page tree itself is never copied.
pub(crate) fn import_pages(
    source: &Document,
    target: &mut Document,
    parent: ObjectId,
) -> Result<Vec<ObjectId>> {
    let mut cache: HashMap<ObjectId, ObjectId> = HashMap::new();

    // Reserve target IDs up front so back-references to pages (e.g. an
    // annotation's /P) resolve to the copies.
    let planned: Vec<(ObjectId, ObjectId)> = source
        .get_pages()
        .into_values()
        .map(|source_id| {
            let target_id = target.new_object_id();
            cache.insert(source_id, target_id);
            (source_id, target_id)
        })
        .collect();

    for &(source_id, target_id) in &planned {
        let page = source.get_dictionary(source_id).map_err(|err| {
            ForgeError::SourceDocument(format!("cannot read page {source_id:?}: {err}"))
        })?;

        let mut flattened = page.clone();
        for key in INHERITABLE {
            if !flattened.has(key)
                && let Some(value) = inherited_attribute(source, page, key)
            {
                flattened.set(key.to_vec(), value.clone());
            }
        }

        let mut copied = copy_dictionary(source, target, &flattened, &mut cache);
        copied.set("Parent", Object::Reference(parent));
        target.objects.insert(target_id, Object::Dictionary(copied));
    }

    debug!(
        pages = planned.len(),
        objects_copied = cache.len(),
        "Source pages imported"
    );
    Ok(planned.into_iter().map(|(_, target_id)| target_id).collect())
}

/// Walk up the page tree looking for `key`.
fn inherited_attribute<'a>(
    source: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = source.get_dictionary(parent_id).ok()?;
    }
    None
}

fn copy_object(
    source: &Document,
    target: &mut Document,
    object: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Object {
    match object {
        Object::Reference(source_id) => {
            if let Some(&target_id) = cache.get(source_id) {
                return Object::Reference(target_id);
            }
            let referenced = match source.get_object(*source_id) {
                Ok(referenced) => referenced,
                Err(err) => {
                    warn!(?source_id, %err, "Cannot resolve reference, using Null");
                    return Object::Null;
                }
            };
            // Register before recursing so cycles land on this ID.
            let target_id = target.new_object_id();
            cache.insert(*source_id, target_id);
            let copied = copy_object(source, target, referenced, cache);
            target.objects.insert(target_id, copied);
            Object::Reference(target_id)
        }
        Object::Dictionary(dict) => Object::Dictionary(copy_dictionary(source, target, dict, cache)),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| copy_object(source, target, item, cache))
                .collect(),
        ),
        Object::Stream(stream) => {
            let dict = copy_dictionary(source, target, &stream.dict, cache);
            Object::Stream(
                Stream::new(dict, stream.content.clone()).with_compression(stream.allows_compression),
            )
        }
        other => other.clone(),
    }
}

fn copy_dictionary(
    source: &Document,
    target: &mut Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Dictionary {
    let mut copied = Dictionary::new();
    for (key, value) in dict.iter() {
        if key == b"Parent" {
            continue;
        }
        copied.set(key.clone(), copy_object(source, target, value, cache));
    }
    copied
}
