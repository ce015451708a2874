use std::collections::BTreeMap;

use crate::buch::entity::{Art, BUCH_PROPS};

/// Generic equality value, typed once at the boundary.
///
/// `"true"` / `"false"` become real booleans so that comparisons against
/// boolean columns bind as integers; everything else stays text and relies on
/// the store's comparison affinity for numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Wert {
    Text(String),
    Bool(bool),
}

/// Normalized criteria bag for the Buch search.
///
/// The raw query-parameter map is classified in a single pass: recognized
/// special keys get typed fields, the four tag flags become real booleans,
/// everything else lands in `sonstige` as generic equality criteria.
/// `rating` and `preis` stay raw strings on purpose: parse failures are
/// skipped silently inside the clause compiler, not rejected here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suchkriterien {
    pub titel: Option<String>,
    pub rating: Option<String>,
    pub preis: Option<String>,
    pub javascript: bool,
    pub typescript: bool,
    pub java: bool,
    pub python: bool,
    pub sonstige: BTreeMap<String, Wert>,
}

/// The four fixed tag-flag keys (part of the search contract).
pub const TAG_FLAGS: &[&str] = &["javascript", "typescript", "java", "python"];

impl Suchkriterien {
    /// Classifies raw key/value pairs into the normalized bag.
    ///
    /// A tag flag is set only by the literal string `"true"`; any other value
    /// leaves the flag unset, matching the flag-off behavior of absent keys.
    pub fn from_params<I>(params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut kriterien = Suchkriterien::default();
        for (key, value) in params {
            match key.as_str() {
                "titel" => kriterien.titel = Some(value),
                "rating" => kriterien.rating = Some(value),
                "preis" => kriterien.preis = Some(value),
                "javascript" => kriterien.javascript = value == "true",
                "typescript" => kriterien.typescript = value == "true",
                "java" => kriterien.java = value == "true",
                "python" => kriterien.python = value == "true",
                _ => {
                    let wert = match value.as_str() {
                        "true" => Wert::Bool(true),
                        "false" => Wert::Bool(false),
                        _ => Wert::Text(value),
                    };
                    kriterien.sonstige.insert(key, wert);
                }
            }
        }
        kriterien
    }

    pub fn is_empty(&self) -> bool {
        self.titel.is_none()
            && self.rating.is_none()
            && self.preis.is_none()
            && !self.javascript
            && !self.typescript
            && !self.java
            && !self.python
            && self.sonstige.is_empty()
    }

    /// Generic keys that name neither a Buch attribute nor a tag flag.
    pub fn invalid_keys(&self) -> Vec<&str> {
        self.sonstige
            .keys()
            .map(String::as_str)
            .filter(|key| !BUCH_PROPS.contains(key) && !TAG_FLAGS.contains(key))
            .collect()
    }

    /// Checks the enumerated `art` criterion against its fixed value set.
    pub fn art_ok(&self) -> bool {
        match self.sonstige.get("art") {
            None => true,
            Some(Wert::Text(value)) => Art::is_valid(value),
            Some(Wert::Bool(_)) => false,
        }
    }
}
