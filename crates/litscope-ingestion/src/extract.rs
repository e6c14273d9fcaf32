//! Flattening of a Scopus abstract-retrieval document into a `BibliographicRecord`.
//!
//! Scopus JSON has a few quirks handled here:
//! - a one-element list is often serialized as a bare object
//! - text may be wrapped as `{"$": "..."}`
//! - numbers usually arrive as strings

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::models::{Affiliation, Author, AuthorAffiliation, BibliographicRecord, Reference};

/// Build the flat record from a retrieval response (with or without the
/// `abstracts-retrieval-response` envelope).
pub fn flatten(doc: &Value) -> BibliographicRecord {
    let root = doc.get("abstracts-retrieval-response").unwrap_or(doc);
    let core = &root["coredata"];
    let head = &root["item"]["bibrecord"]["head"];
    let tail = &root["item"]["bibrecord"]["tail"];
    let source = &head["source"];
    let confevent = &source["additional-srcinfo"]["conferenceinfo"]["confevent"];

    BibliographicRecord {
        id:               text(&core["dc:identifier"]),
        doi:              text(&core["prism:doi"]),
        eid:              text(&core["eid"]),
        pii:              text(&core["pii"]),
        pubmed_id:        text(&core["pubmed-id"]),
        title:            text(&core["dc:title"]),
        abstract_text:    text(&head["abstracts"]),
        description:      text(&core["dc:description"]),
        publication_date: text(&core["prism:coverDate"]).and_then(|d| parse_cover_date(&d)),
        cited_by_count:   number(&core["citedby-count"]),
        language:         as_list(&root["language"]).first().and_then(|l| text(&l["@xml:lang"])),
        aggregation_type: text(&core["prism:aggregationType"]),
        source_type:      text(&core["srctype"]),
        author_keywords:  non_empty(texts(&root["authkeywords"]["author-keyword"])),
        index_terms:      non_empty(texts(&root["idxterms"]["mainterm"])),
        issn:             text(&core["prism:issn"]),
        isbn:             non_empty(texts(&core["prism:isbn"])).map(|isbns| isbns.join(" ")),

        conference_location: conference_location(&confevent["conflocation"]),
        conference_name:     text(&confevent["confname"]),
        publication_name:    text(&core["prism:publicationName"]),
        publisher_address:   text(&source["publisher"]["publisheraddress"]),
        issue_title:         text(&source["issuetitle"]),
        publisher:           text(&core["dc:publisher"]),

        affiliations:        non_empty(affiliations(&root["affiliation"])),
        authors:             non_empty(authors(&root["authors"]["author"])),
        author_affiliations: non_empty(author_groups(&head["author-group"])),

        ref_count:  number(&tail["bibliography"]["@refcount"]),
        references: non_empty(references(&tail["bibliography"]["reference"])),
    }
}

/// Parse a `YYYY-MM-DD` cover date. Partial or malformed dates are missing.
pub fn parse_cover_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok();
    if parsed.is_none() && !raw.is_empty() {
        debug!(value = raw, "Unparseable publication date treated as missing");
    }
    parsed
}

// ── JSON helpers ────────────────────────────────────────────────────────────

/// A list, a lone object standing in for a one-element list, or nothing.
fn as_list(v: &Value) -> Vec<&Value> {
    match v {
        Value::Array(items) => items.iter().collect(),
        Value::Null => vec![],
        other => vec![other],
    }
}

/// Scalar text, unwrapping `{"$": ...}`. Empty strings count as absent.
fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$").and_then(text),
        _ => None,
    }
}

fn texts(v: &Value) -> Vec<String> {
    as_list(v).into_iter().filter_map(text).collect()
}

fn number(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        other => text(other).and_then(|s| s.trim().parse().ok()),
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() { None } else { Some(items) }
}

/// "Given Surname", only when both parts are known.
fn full_name(person: &Value) -> Option<String> {
    let given = text(&person["ce:given-name"])
        .or_else(|| text(&person["preferred-name"]["ce:given-name"]));
    let surname = text(&person["ce:surname"])
        .or_else(|| text(&person["preferred-name"]["ce:surname"]));
    match (given, surname) {
        (Some(g), Some(s)) => Some(format!("{g} {s}")),
        _ => None,
    }
}

// ── Nested fields ───────────────────────────────────────────────────────────

fn conference_location(loc: &Value) -> Option<String> {
    if loc.is_null() {
        return None;
    }
    let parts: Vec<String> = [
        text(&loc["venue"]),
        text(&loc["city-group"]).or_else(|| text(&loc["city"])),
        text(&loc["@country"]),
    ]
    .into_iter()
    .flatten()
    .collect();
    if parts.is_empty() { None } else { Some(parts.join(", ")) }
}

fn affiliations(v: &Value) -> Vec<Affiliation> {
    as_list(v)
        .into_iter()
        .map(|a| Affiliation {
            id:      text(&a["@id"]),
            name:    text(&a["affilname"]),
            country: text(&a["affiliation-country"]),
        })
        .collect()
}

fn authors(v: &Value) -> Vec<Author> {
    as_list(v)
        .into_iter()
        .map(|a| Author {
            id:   text(&a["@auid"]),
            name: full_name(a),
        })
        .collect()
}

/// One entry per (affiliation group, author) pair.
fn author_groups(v: &Value) -> Vec<AuthorAffiliation> {
    let mut out = Vec::new();
    for group in as_list(v) {
        let affil = &group["affiliation"];
        let organization = non_empty(texts(&affil["organization"])).map(|orgs| orgs.join(", "));
        let affiliation_id = text(&affil["@afid"]);
        let country = text(&affil["country"]);

        for author in as_list(&group["author"]) {
            out.push(AuthorAffiliation {
                id:             text(&author["@auid"]),
                name:           full_name(author),
                affiliation_id: affiliation_id.clone(),
                affiliation:    organization.clone(),
                country:        country.clone(),
            });
        }
    }
    out
}

fn references(v: &Value) -> Vec<Reference> {
    as_list(v)
        .into_iter()
        .map(|r| {
            let info = &r["ref-info"];
            let item_ids = as_list(&info["refd-itemidlist"]["itemid"]);
            let item_id = |kind: &str| {
                item_ids
                    .iter()
                    .find(|i| i["@idtype"].as_str() == Some(kind))
                    .and_then(|i| text(i))
            };
            let ref_authors = non_empty(
                as_list(&info["ref-authors"]["author"])
                    .into_iter()
                    .filter_map(|a| text(&a["ce:indexed-name"]))
                    .collect(),
            );

            Reference {
                id:      item_id("SGR").or_else(|| text(&r["@id"])),
                title:   text(&info["ref-title"]["ref-titletext"]),
                doi:     item_id("DOI"),
                authors: ref_authors.map(|names: Vec<String>| names.join("; ")),
            }
        })
        .collect()
}
