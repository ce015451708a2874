//! Criteria-to-query compiler for the Buch search.
//!
//! [`predicates`] is the pure core: it turns a normalized criteria bag into
//! an ordered list of predicate descriptors. Rendering reduces that list to
//! one conjunctive WHERE clause on a `sqlx::QueryBuilder`; the same list is
//! rendered twice, once for the page query and once for the total count, so
//! `totalElements` always reflects the full filtered set.

use sqlx::{QueryBuilder, Sqlite};

use crate::buch::entity::BUCH_PROPS;
use crate::buch::pageable::Pageable;
use crate::buch::suchkriterien::{Suchkriterien, Wert};
use crate::config::{LikeOperator, SucheConfig};

/// Base select over the mandatory buch-titel join.
pub const SELECT_BUCH: &str = "SELECT buch.id, buch.version, buch.isbn, buch.rating, buch.art, \
     buch.preis, buch.rabatt, buch.lieferbar, buch.datum, buch.homepage, buch.schlagwoerter, \
     buch.erzeugt, buch.aktualisiert, \
     titel.id AS titel_id, titel.titel AS titel_titel, titel.untertitel AS titel_untertitel \
     FROM buch INNER JOIN titel ON titel.buch_id = buch.id";

const COUNT_BUCH: &str =
    "SELECT COUNT(*) FROM buch INNER JOIN titel ON titel.buch_id = buch.id";

/// One compiled search predicate. All predicates of a bag are conjoined.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring over `titel.titel`.
    TitelTeilstring(String),
    /// `buch.rating >= n` (minimum threshold).
    MinRating(i64),
    /// `buch.preis <= x` (upper bound).
    MaxPreis(f64),
    /// Substring presence of a tag label in `buch.schlagwoerter`.
    ///
    /// `ohne` strips occurrences of a lexically overlapping label before the
    /// test, so a tag whose name contains this label does not match.
    Schlagwort {
        label: &'static str,
        ohne: Option<&'static str>,
    },
    /// Parameterized equality against a whitelisted Buch column.
    Gleich { spalte: String, wert: Wert },
}

/// Compiles the criteria bag into an ordered predicate list.
///
/// Pure function: no query handle, no mutable first-predicate flag.
/// Unparseable `rating`/`preis` values are skipped silently; a bag of only
/// unparseable values compiles to the same empty list as an empty bag.
pub fn predicates(kriterien: &Suchkriterien) -> Vec<Predicate> {
    let mut liste = Vec::new();

    if let Some(titel) = &kriterien.titel {
        liste.push(Predicate::TitelTeilstring(titel.clone()));
    }

    if let Some(rating) = &kriterien.rating {
        if let Ok(min) = rating.trim().parse::<i64>() {
            liste.push(Predicate::MinRating(min));
        }
    }

    if let Some(preis) = &kriterien.preis {
        if let Ok(max) = preis.trim().parse::<f64>() {
            liste.push(Predicate::MaxPreis(max));
        }
    }

    if kriterien.javascript {
        liste.push(Predicate::Schlagwort { label: "JAVASCRIPT", ohne: None });
    }
    if kriterien.typescript {
        liste.push(Predicate::Schlagwort { label: "TYPESCRIPT", ohne: None });
    }
    // "JAVA" darf Treffer, die nur von "JAVASCRIPT" stammen, nicht zaehlen.
    // Bekannte Einschraenkung: genau dieses eine Paar, nicht verallgemeinert.
    if kriterien.java {
        liste.push(Predicate::Schlagwort { label: "JAVA", ohne: Some("JAVASCRIPT") });
    }
    if kriterien.python {
        liste.push(Predicate::Schlagwort { label: "PYTHON", ohne: None });
    }

    for (spalte, wert) in &kriterien.sonstige {
        liste.push(Predicate::Gleich { spalte: spalte.clone(), wert: wert.clone() });
    }

    liste
}

/// Renders the predicate list as one conjunctive WHERE clause.
///
/// An empty list renders nothing: no restriction beyond the mandatory join.
fn push_predicates(
    qb: &mut QueryBuilder<'static, Sqlite>,
    liste: Vec<Predicate>,
    op: LikeOperator,
) {
    for (i, predicate) in liste.into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::TitelTeilstring(titel) => {
                qb.push(format!("titel.titel {} '%' || ", op.as_sql()));
                qb.push_bind(titel);
                qb.push(" || '%'");
            }
            Predicate::MinRating(min) => {
                qb.push("buch.rating >= ");
                qb.push_bind(min);
            }
            Predicate::MaxPreis(max) => {
                qb.push("buch.preis <= ");
                qb.push_bind(max);
            }
            Predicate::Schlagwort { label, ohne } => match ohne {
                Some(ohne) => {
                    qb.push(format!(
                        "REPLACE(buch.schlagwoerter, '{}', '') {} '%{}%'",
                        ohne,
                        op.as_sql(),
                        label
                    ));
                }
                None => {
                    qb.push(format!("buch.schlagwoerter {} '%{}%'", op.as_sql(), label));
                }
            },
            Predicate::Gleich { spalte, wert } => {
                // Identifiers are validated against BUCH_PROPS before the
                // compiler runs; values are always bound.
                debug_assert!(BUCH_PROPS.contains(&spalte.as_str()));
                qb.push(format!("buch.{} = ", spalte));
                match wert {
                    Wert::Text(text) => qb.push_bind(text),
                    Wert::Bool(b) => qb.push_bind(b),
                };
            }
        }
    }
}

/// Page query: filter, default order, paging (unless the sentinel size 0).
pub fn select_query(
    kriterien: &Suchkriterien,
    pageable: Pageable,
    cfg: &SucheConfig,
) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_BUCH);
    push_predicates(&mut qb, predicates(kriterien), cfg.case_insensitive_operator);
    qb.push(" ORDER BY buch.id");

    if !pageable.unpaged() {
        qb.push(" LIMIT ");
        qb.push_bind(pageable.size);
        qb.push(" OFFSET ");
        qb.push_bind(pageable.offset());
    }
    qb
}

/// Count query: same filter, no limit/offset.
pub fn count_query(kriterien: &Suchkriterien, cfg: &SucheConfig) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(COUNT_BUCH);
    push_predicates(&mut qb, predicates(kriterien), cfg.case_insensitive_operator);
    qb
}

/// Lookup by id over the same join, optionally preceding an extra
/// abbildungen fetch in the read service.
pub fn select_by_id_query(id: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(SELECT_BUCH);
    qb.push(" WHERE buch.id = ");
    qb.push_bind(id);
    qb
}
