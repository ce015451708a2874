use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Buchart (fixed enum set, part of the search contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Art {
    Epub,
    Hardcover,
    Paperback,
}

impl Art {
    pub fn as_str(self) -> &'static str {
        match self {
            Art::Epub => "EPUB",
            Art::Hardcover => "HARDCOVER",
            Art::Paperback => "PAPERBACK",
        }
    }

    /// Is the raw value a member of the enum set?
    pub fn is_valid(value: &str) -> bool {
        value.parse::<Art>().is_ok()
    }
}

#[derive(Debug)]
pub struct ArtParseError(String);

impl fmt::Display for ArtParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid art: {}", self.0)
    }
}

impl std::error::Error for ArtParseError {}

impl FromStr for Art {
    type Err = ArtParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EPUB" => Ok(Art::Epub),
            "HARDCOVER" => Ok(Art::Hardcover),
            "PAPERBACK" => Ok(Art::Paperback),
            _ => Err(ArtParseError(s.to_string())),
        }
    }
}

/// Attribute names of `Buch` as accepted search keys.
///
/// Mirrors the entity below; the four tag flags are validated separately.
pub const BUCH_PROPS: &[&str] = &[
    "id",
    "version",
    "isbn",
    "rating",
    "art",
    "preis",
    "rabatt",
    "lieferbar",
    "datum",
    "homepage",
    "schlagwoerter",
    "titel",
    "abbildungen",
    "erzeugt",
    "aktualisiert",
];

#[derive(Debug, Clone, Serialize)]
pub struct Titel {
    pub id: i64,
    pub titel: String,
    pub untertitel: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Abbildung {
    pub id: i64,
    pub beschriftung: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Buch {
    pub id: i64,
    pub version: i64,
    pub isbn: String,
    pub rating: Option<i64>,
    pub art: Option<Art>,
    pub preis: f64,
    pub rabatt: Option<f64>,
    pub lieferbar: bool,
    pub datum: Option<String>,
    pub homepage: Option<String>,
    /// Stored nullable, but never `null` on the way out: absent keyword
    /// collections are normalized to an empty list when rows are mapped.
    pub schlagwoerter: Vec<String>,
    pub erzeugt: String,
    pub aktualisiert: String,
    pub titel: Titel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbildungen: Option<Vec<Abbildung>>,
}

impl Buch {
    /// Maps one row of the buch-titel join (see
    /// [`crate::buch::query_builder::SELECT_BUCH`]) into the entity.
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let art = match row.try_get::<Option<String>, _>("art")? {
            Some(raw) => Some(raw.parse::<Art>().map_err(|e| sqlx::Error::ColumnDecode {
                index: "art".into(),
                source: Box::new(e),
            })?),
            None => None,
        };

        let schlagwoerter = match row.try_get::<Option<String>, _>("schlagwoerter")? {
            Some(json) => {
                serde_json::from_str::<Vec<String>>(&json).map_err(|e| sqlx::Error::ColumnDecode {
                    index: "schlagwoerter".into(),
                    source: Box::new(e),
                })?
            }
            None => Vec::new(),
        };

        Ok(Buch {
            id: row.try_get("id")?,
            version: row.try_get("version")?,
            isbn: row.try_get("isbn")?,
            rating: row.try_get("rating")?,
            art,
            preis: row.try_get("preis")?,
            rabatt: row.try_get("rabatt")?,
            lieferbar: row.try_get("lieferbar")?,
            datum: row.try_get("datum")?,
            homepage: row.try_get("homepage")?,
            schlagwoerter,
            erzeugt: row.try_get("erzeugt")?,
            aktualisiert: row.try_get("aktualisiert")?,
            titel: Titel {
                id: row.try_get("titel_id")?,
                titel: row.try_get("titel_titel")?,
                untertitel: row.try_get("titel_untertitel")?,
            },
            abbildungen: None,
        })
    }
}

/// Binary attachment of a Buch (one per Buch).
#[derive(Debug, Clone)]
pub struct BuchFile {
    pub id: i64,
    pub buch_id: i64,
    pub filename: String,
    pub mimetype: Option<String>,
    pub data: Vec<u8>,
}

impl BuchFile {
    pub fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(BuchFile {
            id: row.try_get("id")?,
            buch_id: row.try_get("buch_id")?,
            filename: row.try_get("filename")?,
            mimetype: row.try_get("mimetype")?,
            data: row.try_get("data")?,
        })
    }
}
