//! Hand-off of picked files to the query-editing consumer.

use uuid::Uuid;

/// Kind tag carried by every file handed to the consumer.
pub const RAW_INLINE_DATA: &str = "raw_inline_data";

/// One picked file. Ids are freshly generated; the consumer appends and
/// never reorders existing entries.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFile {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub kind: &'static str,
}

impl QueryFile {
    pub fn raw_inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            content: content.into(),
            kind: RAW_INLINE_DATA,
        }
    }
}

/// Consumer seam for picked files.
pub trait QueryFileSink: Send + Sync {
    fn append(&self, file: QueryFile);
}
