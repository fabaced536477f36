//! Translation lookup for the fixed strings a filter popup shows.
//!
//! The engine only ever asks for a handful of [`Tag`]s; hosts plug in their own
//! [`Translator`] or load a [`TableTranslator`] from a JSON object keyed by tag name.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::utils::files::read_json_file;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    All,
    Empty,
    Clear,
    Contains,
    StartsWith,
    Ok,
    Cancel,
    Status,
    ElapsedTime,
    RemoveAll,
    True,
    False,
}

pub trait Translator: Send + Sync {
    fn translate(&self, tag: Tag) -> String;
}

/// Built-in English strings
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTranslator;

impl Translator for EnglishTranslator {
    fn translate(&self, tag: Tag) -> String {
        english(tag).to_string()
    }
}

fn english(tag: Tag) -> &'static str {
    match tag {
        Tag::All => "(Select all)",
        Tag::Empty => "(Blank)",
        Tag::Clear => "Clear filter",
        Tag::Contains => "Contains",
        Tag::StartsWith => "Starts with",
        Tag::Ok => "Ok",
        Tag::Cancel => "Cancel",
        Tag::Status => "Status",
        Tag::ElapsedTime => "Elapsed time",
        Tag::RemoveAll => "Remove all filters",
        Tag::True => "True",
        Tag::False => "False",
    }
}

/// Translation table with English fallback for missing tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableTranslator {
    entries: HashMap<Tag, String>,
}

impl TableTranslator {
    pub fn new(entries: HashMap<Tag, String>) -> Self {
        Self { entries }
    }

    /// Load a `{"All": "(Tout)", ...}` table
    pub fn from_file(path: &Path) -> Result<Self> {
        read_json_file(path)
    }
}

impl Translator for TableTranslator {
    fn translate(&self, tag: Tag) -> String {
        self.entries.get(&tag).cloned().unwrap_or_else(|| english(tag).to_string())
    }
}
