use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Origin marker of a tag. Display surfaces may group by it, but it never
/// affects equality, ordering, or uniqueness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TagSource {
    Ai,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    id: TagId,
    text: String,
    source: TagSource,
}

impl Tag {
    pub fn id(&self) -> &TagId {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> TagSource {
        self.source
    }
}

/// Insertion-ordered tag collection, unique by exact display text.
#[derive(Debug, Default)]
pub struct TagSet {
    tags: Vec<Tag>,
    next_seq: u64,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    pub fn get(&self, id: &TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| &tag.id == id)
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.tags.iter().any(|tag| tag.text == text)
    }

    /// Ordered display texts, provenance dropped. This is the shape the
    /// publish endpoint receives.
    pub fn texts(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.text.clone()).collect()
    }

    /// Materialize AI-suggested strings into tags, verbatim. The flow only
    /// calls this while the set is still empty, so no dedup runs here.
    pub fn adopt_suggestions(&mut self, suggestions: Vec<String>) {
        for text in suggestions {
            let id = self.next_id(None);
            self.tags.push(Tag {
                id,
                text,
                source: TagSource::Ai,
            });
        }
    }

    /// Add a user-entered tag. Whitespace is trimmed and one leading `#`
    /// stripped; an empty result or a duplicate display text is a silent
    /// no-op. Returns the new tag's id when one was actually added.
    pub fn add_user(&mut self, raw: &str) -> Option<TagId> {
        let trimmed = raw.trim();
        let text = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if text.is_empty() || self.contains_text(text) {
            return None;
        }

        let suffix: u16 = rand::thread_rng().gen();
        let id = self.next_id(Some(suffix));
        self.tags.push(Tag {
            id: id.clone(),
            text: text.to_string(),
            source: TagSource::User,
        });
        Some(id)
    }

    /// Remove the tag with the given id. Idempotent: an unknown id leaves the
    /// set unchanged and returns false.
    pub fn remove(&mut self, id: &TagId) -> bool {
        let before = self.tags.len();
        self.tags.retain(|tag| &tag.id != id);
        self.tags.len() < before
    }

    pub fn to_vec(&self) -> Vec<Tag> {
        self.tags.clone()
    }

    // The sequence counter keeps ids unique within the session even when two
    // tags land in the same millisecond; user tags carry an extra random
    // suffix.
    fn next_id(&mut self, suffix: Option<u16>) -> TagId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = match suffix {
            Some(suffix) => format!("{}-{}-{:04x}", now_utc_ms(), seq, suffix),
            None => format!("{}-{}", now_utc_ms(), seq),
        };
        TagId(id)
    }
}

fn now_utc_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
