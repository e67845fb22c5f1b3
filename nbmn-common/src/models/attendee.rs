//! Attendees and the oligarchs
//!
//! Attendees are labels for the people at a movie night, not logins. The
//! oligarchs are the hosts: they are at every night and always sort first.

use crate::db::{Document, Store};
use crate::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

pub const NAME_INDEX: &str = "name";

/// Someone who came to a movie night
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
}

impl Attendee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Name suitable for URL use
    pub fn urlname(&self) -> &str {
        &self.name
    }

    pub async fn find_by_name<S: Store>(store: &S, name: &str) -> Result<Vec<Self>> {
        store.find_by_index(NAME_INDEX, name).await
    }
}

impl Document for Attendee {
    const TABLE: &'static str = "attendees";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn indexes(&self) -> Vec<(&'static str, String)> {
        vec![(NAME_INDEX, self.name.clone())]
    }
}

/// Anything sortable as an attendee name
pub trait AttendeeName {
    fn attendee_name(&self) -> &str;
}

impl AttendeeName for String {
    fn attendee_name(&self) -> &str {
        self
    }
}

impl AttendeeName for &str {
    fn attendee_name(&self) -> &str {
        self
    }
}

impl AttendeeName for Attendee {
    fn attendee_name(&self) -> &str {
        &self.name
    }
}

/// The set of hosts present at every night
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oligarchs(BTreeSet<String>);

impl Default for Oligarchs {
    fn default() -> Self {
        Self::new(["Adam", "Marty"])
    }
}

impl Oligarchs {
    pub fn new<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// True when `names` is non-empty and every one is an oligarch
    pub fn olis<I, N>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut any = false;
        for name in names {
            if !self.contains(name.as_ref()) {
                return false;
            }
            any = true;
        }
        any
    }

    /// Create attendee records for any `required` name (and any oligarch)
    /// that does not have one yet. Returns the names that were created.
    pub async fn ensure_attendees<S: Store>(
        &self,
        store: &S,
        required: &[String],
    ) -> Result<Vec<String>> {
        let existing: BTreeSet<String> = store
            .find_all::<Attendee>()
            .await?
            .into_iter()
            .map(|a| a.name)
            .collect();

        let wanted: BTreeSet<&str> = required
            .iter()
            .map(String::as_str)
            .chain(self.names())
            .filter(|name| !name.is_empty())
            .collect();

        let mut created = Vec::new();
        for name in wanted {
            if existing.contains(name) {
                continue;
            }
            let mut attendee = Attendee::new(name);
            store.save(&mut attendee).await?;
            info!(name, "Created attendee");
            created.push(attendee.name);
        }
        Ok(created)
    }

    /// Oligarchs first, then by name; two leading oligarchs trade places at
    /// random so neither is always billed first.
    pub fn sort<T: AttendeeName>(&self, attendees: &mut [T]) {
        self.sort_with(attendees, &mut rand::thread_rng());
    }

    pub fn sort_with<T: AttendeeName, R: Rng + ?Sized>(&self, attendees: &mut [T], rng: &mut R) {
        attendees.sort_by(|a, b| self.sort_key(a).cmp(&self.sort_key(b)));

        if attendees.len() >= 2
            && self.olis(attendees[..2].iter().map(AttendeeName::attendee_name))
            && rng.gen_bool(0.5)
        {
            attendees.swap(0, 1);
        }
    }

    fn sort_key<'a, T: AttendeeName>(&self, attendee: &'a T) -> (bool, &'a str) {
        let name = attendee.attendee_name();
        (!self.contains(name), name)
    }
}

/// Title-case each word: "bob SMITH" -> "Bob Smith"
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
