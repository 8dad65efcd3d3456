//! Bibliographic metadata from a TEI header.
//!
//! Reads the `<teiHeader>` produced by GROBID:
//! - `fileDesc/titleStmt/title` for the title
//! - `fileDesc/sourceDesc/biblStruct/analytic/author` for authors and affiliations
//! - `publicationStmt/date` (or the imprint date) for the publication date
//! - `profileDesc/abstract` and `profileDesc/textClass/keywords`
//! - every `idno` under `sourceDesc` for identifiers

use crate::error::Result;
use crate::tei::node::{parse_document, XmlElement};
use crate::text::cleanup::{non_empty, normalize_whitespace};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Organisation and address details of one affiliation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Affiliation {
    /// Organisation names keyed by `orgName@type` (department, institution...)
    pub organizations: IndexMap<String, String>,
    /// City
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<String>,
    /// Region or state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Country
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A paper author.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Forenames joined with spaces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forename: Option<String>,
    /// Surname
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Affiliations in document order
    pub affiliations: Vec<Affiliation>,
}

impl Author {
    /// Display name, `"Forename Surname"`.
    pub fn full_name(&self) -> String {
        [self.forename.as_deref(), self.surname.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Bibliographic metadata of a paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    /// Main title
    pub title: Option<String>,
    /// Authors in document order
    pub authors: Vec<Author>,
    /// Publication date (ISO `when` value when available)
    pub published: Option<String>,
    /// Abstract text
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    /// Keywords
    pub keywords: Vec<String>,
    /// Identifiers keyed by type (DOI, arXiv, MD5...)
    pub identifiers: IndexMap<String, String>,
}

impl PaperMetadata {
    /// Check if any metadata is present.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_empty()
            && self.published.is_none()
            && self.abstract_text.is_none()
            && self.keywords.is_empty()
            && self.identifiers.is_empty()
    }
}

/// Metadata row as stored, tagged with the paper it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// Extracted metadata
    #[serde(flatten)]
    pub metadata: PaperMetadata,
    /// Owning paper summary id
    #[serde(rename = "paperSummaryID")]
    pub paper_summary_id: String,
}

/// Parse TEI text and extract its header metadata.
pub fn extract_metadata(tei_xml: &str) -> Result<PaperMetadata> {
    let root = parse_document(tei_xml)?;
    Ok(metadata_from_tree(&root))
}

/// Extract header metadata from an already parsed TEI tree.
pub fn metadata_from_tree(root: &XmlElement) -> PaperMetadata {
    let mut metadata = PaperMetadata::default();
    let Some(header) = root.find("teiHeader") else {
        return metadata;
    };

    let file_desc = header.child("fileDesc");

    metadata.title = file_desc
        .and_then(|fd| fd.path(&["titleStmt"]))
        .and_then(main_title);

    if let Some(source) = file_desc.and_then(|fd| fd.child("sourceDesc")) {
        if let Some(analytic) = source.find("analytic") {
            metadata.authors = analytic
                .children_named("author")
                .filter_map(author_from_element)
                .collect();
        }
        for idno in source.find_all("idno") {
            let Some(value) = non_empty(&idno.text()) else {
                continue;
            };
            let key = idno.attr("type").unwrap_or("unknown").to_string();
            metadata.identifiers.insert(key, value);
        }
    }

    metadata.published = file_desc
        .and_then(|fd| fd.path(&["publicationStmt", "date"]))
        .and_then(date_value)
        .or_else(|| {
            file_desc
                .and_then(|fd| fd.child("sourceDesc"))
                .and_then(|s| s.find("imprint"))
                .and_then(|imprint| {
                    imprint
                        .children_named("date")
                        .find(|d| d.attr("type") == Some("published"))
                })
                .and_then(date_value)
        });

    if let Some(profile) = header.child("profileDesc") {
        metadata.abstract_text = profile.child("abstract").and_then(|a| non_empty(&a.text()));
        if let Some(keywords) = profile.find("keywords") {
            metadata.keywords = keywords
                .children_named("term")
                .filter_map(|t| non_empty(&t.text()))
                .collect();
        }
    }

    metadata
}

fn main_title(title_stmt: &XmlElement) -> Option<String> {
    let titles: Vec<&XmlElement> = title_stmt.children_named("title").collect();
    titles
        .iter()
        .find(|t| t.attr("type") == Some("main"))
        .or_else(|| titles.first())
        .and_then(|t| non_empty(&t.text()))
}

fn date_value(date: &XmlElement) -> Option<String> {
    date.attr("when")
        .and_then(non_empty)
        .or_else(|| non_empty(&date.text()))
}

fn author_from_element(author: &XmlElement) -> Option<Author> {
    let pers_name = author.child("persName")?;

    let forenames: Vec<String> = pers_name
        .children_named("forename")
        .filter_map(|f| non_empty(&f.text()))
        .collect();
    let forename = if forenames.is_empty() {
        None
    } else {
        Some(forenames.join(" "))
    };

    Some(Author {
        forename,
        surname: pers_name.child("surname").and_then(|s| non_empty(&s.text())),
        email: author.child("email").and_then(|e| non_empty(&e.text())),
        affiliations: author
            .children_named("affiliation")
            .map(affiliation_from_element)
            .collect(),
    })
}

fn affiliation_from_element(affiliation: &XmlElement) -> Affiliation {
    let mut result = Affiliation::default();
    for org in affiliation.children_named("orgName") {
        let name = normalize_whitespace(&org.text());
        if name.is_empty() {
            continue;
        }
        let key = org.attr("type").unwrap_or("organization").to_string();
        // Repeated types (e.g. two departments) keep the first value
        result.organizations.entry(key).or_insert(name);
    }
    if let Some(address) = affiliation.child("address") {
        result.settlement = address.child("settlement").and_then(|s| non_empty(&s.text()));
        result.region = address.child("region").and_then(|r| non_empty(&r.text()));
        result.country = address.child("country").and_then(|c| non_empty(&c.text()));
    }
    result
}
