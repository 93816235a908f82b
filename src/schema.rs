//! Serialization of diff documents to and from the element-tree format.
//!
//! Document shape:
//!
//! ```text
//! root
//!  ├─ baseline/file/{name, sha}
//!  ├─ delta/file/{name, sha}
//!  ├─ delta/app/{name, nsrl, action}
//!  ├─ diffnode/{arch, sys, os, osver, user, time}
//!  ├─ add/{key*{path}, value*{path, name, data}}
//!  ├─ del/{key*{path}, value*{path, name, data}}
//!  └─ mod/value*{path, name, data}
//! ```
//!
//! Metadata elements are always written, empty or not. The reader refuses
//! to default any of them: a missing structural path is an error for that
//! document. The `mod` section carries values only; key-level modification
//! is not a category of the data model.

use crate::diff::ClassifiedDiff;
use crate::document::{Action, DiffDocument, DiffMetadata};
use crate::error::Result;
use crate::patch::{RegKey, RegValue};
use crate::tree::Element;
use tracing::instrument;

fn key_element(key: &RegKey) -> Element {
    Element::node("key").with(Element::leaf("path", &key.path))
}

fn value_element(value: &RegValue) -> Element {
    Element::node("value")
        .with(Element::leaf("path", &value.path))
        .with(Element::leaf("name", &value.name))
        .with(Element::leaf("data", &value.data))
}

/// Serializes a diff document to its element-tree text form.
///
/// Sections are emitted in fixed order: metadata, then `add`, `del`, `mod`,
/// with keys before values inside `add` and `del`. Empty sections are still
/// emitted so the document shape is stable.
pub fn write_document(doc: &DiffDocument) -> String {
    let meta = &doc.metadata;

    let mut add = Element::node("add");
    for key in &doc.diff.keys_added {
        add.push(key_element(key));
    }
    for value in &doc.diff.values_added {
        add.push(value_element(value));
    }

    let mut del = Element::node("del");
    for key in &doc.diff.keys_deleted {
        del.push(key_element(key));
    }
    for value in &doc.diff.values_deleted {
        del.push(value_element(value));
    }

    let mut modified = Element::node("mod");
    for value in &doc.diff.values_modified {
        modified.push(value_element(value));
    }

    Element::node("root")
        .with(Element::node("baseline").with(
            Element::node("file")
                .with(Element::leaf("name", &meta.baseline_file))
                .with(Element::leaf("sha", &meta.baseline_hash)),
        ))
        .with(
            Element::node("delta")
                .with(
                    Element::node("file")
                        .with(Element::leaf("name", &meta.delta_file))
                        .with(Element::leaf("sha", &meta.delta_hash)),
                )
                .with(
                    Element::node("app")
                        .with(Element::leaf("name", &meta.app_name))
                        .with(Element::leaf("nsrl", meta.nsrl_id.as_deref().unwrap_or("")))
                        .with(Element::leaf("action", meta.action.code())),
                ),
        )
        .with(
            Element::node("diffnode")
                .with(Element::leaf("arch", &meta.host_arch))
                .with(Element::leaf("sys", &meta.host_system_name))
                .with(Element::leaf("os", &meta.host_os_name))
                .with(Element::leaf("osver", &meta.host_os_version))
                .with(Element::leaf("user", &meta.user))
                .with(Element::leaf("time", &meta.timestamp)),
        )
        .with(add)
        .with(del)
        .with(modified)
        .render()
}

fn read_keys_and_values(
    root: &Element,
    section: &str,
) -> Result<(Vec<RegKey>, Vec<RegValue>)> {
    let mut keys = Vec::new();
    let mut values = Vec::new();

    if let Some(node) = root.child(section) {
        for key in node.children_named("key") {
            keys.push(RegKey {
                path: key.require_text("path")?.to_string(),
            });
        }
        for value in node.children_named("value") {
            values.push(RegValue {
                path: value.require_text("path")?.to_string(),
                name: value.require_text("name")?.to_string(),
                data: value.require_text("data")?.to_string(),
            });
        }
    }

    Ok((keys, values))
}

/// Reads a serialized diff document back into its in-memory form.
///
/// # Errors
///
/// Returns an error if the text is not a well-formed element tree, if any
/// required metadata path is absent, or if the action code is unrecognized.
#[instrument(skip(text))]
pub fn read_document(text: &str) -> Result<DiffDocument> {
    let root = Element::parse(text)?;

    let nsrl = root
        .descendant("delta/app/nsrl")
        .map(|e| e.text.clone())
        .filter(|s| !s.is_empty());

    let metadata = DiffMetadata {
        baseline_file: root.require_text("baseline/file/name")?.to_string(),
        baseline_hash: root.require_text("baseline/file/sha")?.to_string(),
        delta_file: root.require_text("delta/file/name")?.to_string(),
        delta_hash: root.require_text("delta/file/sha")?.to_string(),
        app_name: root.require_text("delta/app/name")?.to_string(),
        nsrl_id: nsrl,
        action: root.require_text("delta/app/action")?.parse::<Action>()?,
        host_arch: root.require_text("diffnode/arch")?.to_string(),
        host_system_name: root.require_text("diffnode/sys")?.to_string(),
        host_os_name: root.require_text("diffnode/os")?.to_string(),
        host_os_version: root.require_text("diffnode/osver")?.to_string(),
        user: root.require_text("diffnode/user")?.to_string(),
        timestamp: root.require_text("diffnode/time")?.to_string(),
    };

    let (keys_added, values_added) = read_keys_and_values(&root, "add")?;
    let (keys_deleted, values_deleted) = read_keys_and_values(&root, "del")?;
    let (_, values_modified) = read_keys_and_values(&root, "mod")?;

    Ok(DiffDocument {
        metadata,
        diff: ClassifiedDiff {
            keys_added,
            keys_deleted,
            values_added,
            values_deleted,
            values_modified,
        },
    })
}
