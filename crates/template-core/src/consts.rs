//! Path vocabulary for locating blocks and attributes in condition documents.

/// Local name of the document root element.
pub const ROOT_NAME: &str = "conditions";

/// Local name of a condition block.
pub const BLOCK_NAME: &str = "condition";

/// Blocks directly under the root, for documents without a namespace URI.
pub const BLOCK_PATH: &str = "/conditions/condition";

/// Blocks under the root for documents declaring a namespace URI. The prefix
/// is bound to the document's URI at query time.
pub const BLOCK_PATH_WITH_NAMESPACE: &str = "//ns:conditions/ns:condition";

/// Prefix used in [`BLOCK_PATH_WITH_NAMESPACE`].
pub const NAMESPACE_ALIAS: &str = "ns";

/// Variable the block id is bound to when filtering blocks.
pub const ID_VARIABLE: &str = "id";

/// Separator of the composite `namespace.id` index key.
pub const KEY_SEPARATOR: char = '.';

pub const ATTR_NAMESPACE: &str = "attribute::namespace";

pub const ATTR_CHILD: &str = "child::node()";

pub const ATTR_ID: &str = "attribute::id";

pub const ATTR_RESULT_TYPE: &str = "attribute::resultType";

pub const ATTR_REMOVE: &str = "attribute::removeIfExist";

pub const ATTR_MATCH: &str = "attribute::match";

pub const ATTR_FIELD: &str = "attribute::field";

/// Custom name of a named parameter.
pub const ATTR_NAME: &str = "attribute::name";

pub const ATTR_START_NAME: &str = "attribute::startName";

pub const ATTR_END_NAME: &str = "attribute::endName";

pub const ATTR_VALUE: &str = "attribute::value";

pub const ATTR_PATTERN: &str = "attribute::pattern";

pub const ATTR_START: &str = "attribute::start";

pub const ATTR_END: &str = "attribute::end";

/// Id of another block to splice in (`<include refId="..."/>`).
pub const ATTR_REF_ID: &str = "attribute::refId";

pub const ATTR_WHEN: &str = "attribute::when";

pub const ATTR_THEN: &str = "attribute::then";

pub const ATTR_ELSE: &str = "attribute::else";

/// Human-readable field name for an attribute path: `attribute::start` → `start`.
pub fn field_label(path: &str) -> &str {
    path.strip_prefix("attribute::")
        .or_else(|| path.strip_prefix('@'))
        .unwrap_or(path)
}
