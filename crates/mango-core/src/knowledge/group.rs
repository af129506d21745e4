//! Folding a document list into per-source groups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::classify::classify;
use crate::types::{KnowledgeDocument, SourceType};

/// All chunks that came from one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SourceGroup {
    pub group_key: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub title: String,
    pub docs: Vec<KnowledgeDocument>,
}

impl SourceGroup {
    pub fn doc_ids(&self) -> Vec<i64> {
        self.docs.iter().map(|d| d.id).collect()
    }
}

/// Group documents by source.
///
/// Groups appear in the order their first member appears in `docs`, and
/// members keep their relative order.
pub fn group(docs: &[KnowledgeDocument]) -> Vec<SourceGroup> {
    let mut groups: Vec<SourceGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for doc in docs {
        let c = classify(doc);
        match index.get(&c.group_key) {
            Some(&i) => groups[i].docs.push(doc.clone()),
            None => {
                index.insert(c.group_key.clone(), groups.len());
                groups.push(SourceGroup {
                    group_key: c.group_key,
                    source_type: c.source_type,
                    title: c.title,
                    docs: vec![doc.clone()],
                });
            }
        }
    }

    groups
}

pub fn find_group<'g>(groups: &'g [SourceGroup], group_key: &str) -> Option<&'g SourceGroup> {
    groups.iter().find(|g| g.group_key == group_key)
}

/// Document counts per provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct KnowledgeStats {
    pub total: usize,
    pub manual: usize,
    pub pdf: usize,
    pub website: usize,
}

impl KnowledgeStats {
    pub fn from_documents(docs: &[KnowledgeDocument]) -> Self {
        docs.iter().fold(Self::default(), |mut stats, doc| {
            stats.total += 1;
            match classify(doc).source_type {
                SourceType::Manual => stats.manual += 1,
                SourceType::Pdf => stats.pdf += 1,
                SourceType::Website => stats.website += 1,
            }
            stats
        })
    }
}
