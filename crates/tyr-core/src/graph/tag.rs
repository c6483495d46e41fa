//! Link tags: the semantic kind of a relation between two layout nodes.
//!
//! Tags are immutable values. The graph interns them into a [`TagTable`] so
//! that adjacency entries can refer to a distinct tag with a small handle,
//! and two equal tags always resolve to the same handle.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Interned handle to a [`LinkTag`] stored in a [`TagTable`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TagId(pub(crate) u32);

impl TagId {
    /// Index into the owning table's storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag{}", self.0)
    }
}

/// The semantic kind of a link between two layout nodes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TagKind {
    /// Both endpoints denote the same byte region. Always inserted as a
    /// symmetric pair, one link in each direction.
    Equality,
    /// The target's bytes are a zero-offset prefix of the source's bytes.
    Inheritance,
    /// The source contains an instance of the target at a fixed byte offset,
    /// possibly repeated as an array.
    Instance,
    /// The source holds a pointer whose pointee layout is the target.
    Pointer,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKind::Equality => write!(f, "Equality"),
            TagKind::Inheritance => write!(f, "Inheritance"),
            TagKind::Instance => write!(f, "Instance"),
            TagKind::Pointer => write!(f, "Pointer"),
        }
    }
}

/// Byte offset of an embedded instance, with optional array dimensions.
///
/// Each array dimension carries a stride and a trip count; the trip count may
/// be unknown. Strides and trip counts are always the same length.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OffsetExpr {
    pub offset: i64,
    pub strides: SmallVec<[i64; 4]>,
    pub trip_counts: SmallVec<[Option<u64>; 4]>,
}

impl OffsetExpr {
    /// An instance at the given byte offset with no array dimensions.
    pub fn at(offset: i64) -> Self {
        Self {
            offset,
            ..Default::default()
        }
    }

    /// Append an array dimension with the given stride and trip count.
    pub fn with_dimension(mut self, stride: i64, trip_count: Option<u64>) -> Self {
        self.strides.push(stride);
        self.trip_counts.push(trip_count);
        self
    }

    /// True for the canonical "instance at offset zero" case: offset 0 and
    /// no array dimensions. This sub-relation behaves like inheritance for
    /// conflict purposes.
    pub fn is_zero(&self) -> bool {
        self.offset == 0 && self.strides.is_empty() && self.trip_counts.is_empty()
    }
}

impl fmt::Display for OffsetExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Off: {}", self.offset)?;
        for (stride, trip_count) in self.strides.iter().zip(&self.trip_counts) {
            write!(f, ", {{S:{stride},TC:")?;
            match trip_count {
                Some(tc) => write!(f, "{tc}")?,
                None => write!(f, "none")?,
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}

/// An immutable, value-equal tag describing one link.
///
/// Only `Instance` tags carry a meaningful offset expression; the other kinds
/// store the zero expression so that tag ordering and equality stay total.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LinkTag {
    kind: TagKind,
    offset: OffsetExpr,
}

impl LinkTag {
    pub fn equality() -> Self {
        Self {
            kind: TagKind::Equality,
            offset: OffsetExpr::default(),
        }
    }

    pub fn inheritance() -> Self {
        Self {
            kind: TagKind::Inheritance,
            offset: OffsetExpr::default(),
        }
    }

    pub fn instance(offset: OffsetExpr) -> Self {
        Self {
            kind: TagKind::Instance,
            offset,
        }
    }

    pub fn pointer() -> Self {
        Self {
            kind: TagKind::Pointer,
            offset: OffsetExpr::default(),
        }
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    /// The offset expression of an instance tag.
    ///
    /// # Panics
    ///
    /// Panics if the tag is not an `Instance` tag.
    pub fn offset_expr(&self) -> &OffsetExpr {
        assert!(
            self.kind == TagKind::Instance,
            "offset expression requested on a {} tag",
            self.kind
        );
        &self.offset
    }

    /// True for an instance tag at offset zero with no array dimensions.
    pub fn is_instance_at_zero(&self) -> bool {
        self.kind == TagKind::Instance && self.offset.is_zero()
    }
}

impl fmt::Display for LinkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TagKind::Instance => write!(f, "Instance({})", self.offset),
            kind => write!(f, "{kind}"),
        }
    }
}

/// Intern table deduplicating [`LinkTag`] values.
///
/// Equal tags are stored once and identified by a stable [`TagId`]; adjacency
/// entries store the handle instead of the tag itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagTable {
    tags: Vec<LinkTag>,
    #[serde(skip)]
    index: HashMap<LinkTag, TagId>,
}

impl<'de> Deserialize<'de> for TagTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            tags: Vec<LinkTag>,
        }
        let raw = Raw::deserialize(deserializer)?;
        let mut table = TagTable {
            tags: raw.tags,
            index: HashMap::new(),
        };
        table.rebuild_index();
        Ok(table)
    }
}

impl TagTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a tag, returning the handle of the stored instance.
    pub fn intern(&mut self, tag: LinkTag) -> TagId {
        if let Some(&id) = self.index.get(&tag) {
            return id;
        }
        let id = TagId(self.tags.len() as u32);
        self.index.insert(tag.clone(), id);
        self.tags.push(tag);
        id
    }

    /// Resolve a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not belong to this table.
    pub fn resolve(&self, id: TagId) -> &LinkTag {
        &self.tags[id.index()]
    }

    pub fn get(&self, id: TagId) -> Option<&LinkTag> {
        self.tags.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Rebuild the lookup index after deserialization.
    pub(crate) fn rebuild_index(&mut self) {
        self.index = self
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), TagId(i as u32)))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_deduplicates() {
        let mut table = TagTable::new();
        let a = table.intern(LinkTag::instance(OffsetExpr::at(8)));
        let b = table.intern(LinkTag::instance(OffsetExpr::at(8)));
        let c = table.intern(LinkTag::instance(OffsetExpr::at(16)));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn kinds_intern_separately() {
        let mut table = TagTable::new();
        let eq = table.intern(LinkTag::equality());
        let inh = table.intern(LinkTag::inheritance());
        let ptr = table.intern(LinkTag::pointer());
        assert_ne!(eq, inh);
        assert_ne!(inh, ptr);
        assert_eq!(table.resolve(inh).kind(), TagKind::Inheritance);
    }

    #[test]
    fn instance_at_zero() {
        assert!(LinkTag::instance(OffsetExpr::at(0)).is_instance_at_zero());
        assert!(!LinkTag::instance(OffsetExpr::at(4)).is_instance_at_zero());
        assert!(!LinkTag::instance(OffsetExpr::at(0).with_dimension(4, Some(8)))
            .is_instance_at_zero());
        assert!(!LinkTag::inheritance().is_instance_at_zero());
    }

    #[test]
    fn offset_expr_display() {
        let oe = OffsetExpr::at(16)
            .with_dimension(8, Some(4))
            .with_dimension(2, None);
        assert_eq!(oe.to_string(), "Off: 16, {S:8,TC:4}, {S:2,TC:none}");
    }

    #[test]
    #[should_panic]
    fn offset_expr_of_pointer_tag_panics() {
        let _ = LinkTag::pointer().offset_expr();
    }
}
