// SPDX-FileCopyrightText: 2026 Lynqar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential records and the collection that is persisted as one blob.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::error::LynqarError;

/// Maximum number of tags kept on an entry.
pub const MAX_TAGS: usize = 3;

/// Unique, never-reused identifier for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    /// Allocate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One credential record.
///
/// The password is zeroed when the entry is dropped and never appears in
/// `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("tags", &self.tags)
            .field("created", &self.created)
            .finish()
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl Entry {
    /// Case-insensitive substring match on title or username.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.username.to_lowercase().contains(&needle)
    }
}

/// Caller-supplied draft of an entry. Id and creation time are assigned on insert.
#[derive(Clone, Default)]
pub struct NewEntry {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: String,
    pub tags: Vec<String>,
}

impl fmt::Debug for NewEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewEntry")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .field("tags", &self.tags)
            .finish()
    }
}

impl Drop for NewEntry {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

impl NewEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            username: String::new(),
            password: String::new(),
            url: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Reject drafts that cannot become a valid entry.
    pub fn validate(&self) -> Result<(), LynqarError> {
        if self.title.trim().is_empty() {
            return Err(LynqarError::InvalidEntry("title must not be empty".to_string()));
        }
        Ok(())
    }

    /// Turn the draft into a stored entry.
    ///
    /// Title, username and URL are trimmed; the password is kept verbatim.
    /// Tags are trimmed, de-duplicated in order, and capped at [`MAX_TAGS`].
    pub fn into_entry(mut self, id: EntryId, created: DateTime<Utc>) -> Entry {
        let mut seen = HashSet::new();
        let tags = std::mem::take(&mut self.tags)
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .take(MAX_TAGS)
            .collect();

        Entry {
            id,
            title: self.title.trim().to_string(),
            username: self.username.trim().to_string(),
            password: std::mem::take(&mut self.password),
            url: self.url.trim().to_string(),
            tags,
            created,
        }
    }
}

/// Ordered sequence of entries, the sole unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryCollection {
    entries: Vec<Entry>,
}

impl EntryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn contains(&self, id: &EntryId) -> bool {
        self.get(id).is_some()
    }

    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Append an entry. Callers are responsible for id uniqueness.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Remove the entry with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &EntryId) -> Option<Entry> {
        let pos = self.entries.iter().position(|e| &e.id == id)?;
        Some(self.entries.remove(pos))
    }

    /// Entries whose title or username contains `query`, in collection order.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Entry> {
        self.entries.iter().filter(|e| e.matches(query)).collect()
    }

    /// Serialize to the persisted JSON form.
    ///
    /// The buffer holds plaintext passwords, so it is zeroed on drop.
    pub fn to_json(&self) -> Result<Zeroizing<Vec<u8>>, LynqarError> {
        serde_json::to_vec(self)
            .map(Zeroizing::new)
            .map_err(|e| LynqarError::Internal(format!("failed to serialize entries: {e}")))
    }

    /// Parse and validate the persisted JSON form.
    ///
    /// Anything other than a well-formed collection is reported as
    /// [`LynqarError::CorruptStore`]; nothing is partially applied.
    pub fn from_json(bytes: &[u8]) -> Result<Self, LynqarError> {
        let collection: Self = serde_json::from_slice(bytes)
            .map_err(|e| LynqarError::CorruptStore(format!("entry collection is malformed: {e}")))?;
        collection.check_well_formed()?;
        Ok(collection)
    }

    fn check_well_formed(&self) -> Result<(), LynqarError> {
        let mut ids = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if entry.title.trim().is_empty() {
                return Err(LynqarError::CorruptStore(format!(
                    "entry {} has an empty title",
                    entry.id
                )));
            }
            if !ids.insert(&entry.id) {
                return Err(LynqarError::CorruptStore(format!(
                    "duplicate entry id {}",
                    entry.id
                )));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EntryCollection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, title: &str) -> Entry {
        NewEntry::new(title).into_entry(EntryId::from(id), Utc::now())
    }

    #[test]
    fn draft_without_title_is_rejected() {
        let err = NewEntry::new("   ").validate().unwrap_err();
        assert!(matches!(err, LynqarError::InvalidEntry(_)));
        assert!(NewEntry::new("GitHub").validate().is_ok());
    }

    #[test]
    fn into_entry_normalizes_tags() {
        let e = NewEntry::new(" Mail ")
            .tags(["Work", " Work", "", "Social", "Developer", "Banking"])
            .into_entry(EntryId::generate(), Utc::now());
        assert_eq!(e.title, "Mail");
        assert_eq!(e.tags, vec!["Work", "Social", "Developer"]);
    }

    #[test]
    fn into_entry_keeps_password_verbatim() {
        let e = NewEntry::new("x")
            .password("  spaced  ")
            .into_entry(EntryId::generate(), Utc::now());
        assert_eq!(e.password, "  spaced  ");
    }

    #[test]
    fn debug_output_redacts_password() {
        let e = NewEntry::new("bank")
            .password("hunter2")
            .into_entry(EntryId::generate(), Utc::now());
        let rendered = format!("{e:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn json_round_trip_preserves_order_and_fields() {
        let mut c = EntryCollection::new();
        c.push(entry("a", "first"));
        c.push(entry("b", "second"));

        let json = c.to_json().unwrap();
        let parsed = EntryCollection::from_json(&json).unwrap();
        assert_eq!(parsed, c);
        let titles: Vec<_> = parsed.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn persisted_shape_uses_plain_field_names() {
        let mut c = EntryCollection::new();
        c.push(entry("id-1", "t"));
        let value: serde_json::Value = serde_json::from_slice(&c.to_json().unwrap()).unwrap();
        let obj = value[0].as_object().unwrap();
        for key in ["id", "title", "username", "password", "url", "tags", "created"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["id"], "id-1");
    }

    #[test]
    fn garbage_is_corrupt_store() {
        let err = EntryCollection::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, LynqarError::CorruptStore(_)));

        let err = EntryCollection::from_json(br#"{"title":"object not array"}"#).unwrap_err();
        assert!(matches!(err, LynqarError::CorruptStore(_)));
    }

    #[test]
    fn duplicate_ids_are_corrupt_store() {
        let mut c = EntryCollection::new();
        c.push(entry("same", "one"));
        c.push(entry("same", "two"));
        let json = serde_json::to_vec(&c).unwrap();
        let err = EntryCollection::from_json(&json).unwrap_err();
        assert!(matches!(err, LynqarError::CorruptStore(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn search_is_case_insensitive_on_title_and_username() {
        let mut c = EntryCollection::new();
        c.push(NewEntry::new("GitHub").username("octo").into_entry(EntryId::from("1"), Utc::now()));
        c.push(NewEntry::new("Bank").username("alice@GIT.example").into_entry(EntryId::from("2"), Utc::now()));
        c.push(NewEntry::new("Netflix").into_entry(EntryId::from("3"), Utc::now()));

        let hits: Vec<_> = c.search("git").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(hits, ["1", "2"]);
        assert_eq!(c.search("").len(), 3);
        assert!(c.search("zzz").is_empty());
    }

    #[test]
    fn remove_returns_removed_entry() {
        let mut c = EntryCollection::new();
        c.push(entry("a", "one"));
        c.push(entry("b", "two"));

        assert!(c.remove(&EntryId::from("missing")).is_none());
        assert_eq!(c.len(), 2);

        let removed = c.remove(&EntryId::from("a")).unwrap();
        assert_eq!(removed.title, "one");
        assert_eq!(c.len(), 1);
        assert!(!c.contains(&EntryId::from("a")));
    }

    #[test]
    fn generated_ids_are_distinct() {
        let ids: HashSet<_> = (0..256).map(|_| EntryId::generate()).collect();
        assert_eq!(ids.len(), 256);
    }
}
