//! Section and paragraph extraction from a TEI body.
//!
//! Each direct `<div>` child of `<body>` becomes a [`Division`] holding its
//! heading and every paragraph below it, with the in-text reference markers
//! of each paragraph.

use crate::error::Result;
use crate::tei::node::{parse_document, XmlElement};
use crate::text::cleanup::normalize_whitespace;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Target and kind of an in-text reference (`<ref>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefMarker {
    /// Reference target (`target`, falling back to `coords`), empty if absent
    pub id: String,
    /// Reference type (`bibr`, `figure`, `table`, `formula`...), empty if absent
    #[serde(rename = "type")]
    pub ref_type: String,
}

/// One paragraph of a division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Whitespace-normalized paragraph text
    pub text: String,
    /// Reference markers keyed by their visible text
    pub refs: IndexMap<String, RefMarker>,
    /// Position of the paragraph inside its division
    pub order_index: usize,
}

/// A body section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    /// Position of the division inside the body
    pub order_index: usize,
    /// Whitespace-normalized heading text
    pub head: Option<String>,
    /// Section number from the heading's `n` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_n: Option<String>,
    /// Paragraphs in document order
    #[serde(rename = "para")]
    pub paragraphs: Vec<Paragraph>,
}

/// A division row as stored, tagged with the paper it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionRecord {
    /// Extracted division
    #[serde(flatten)]
    pub division: Division,
    /// Owning paper summary id
    #[serde(rename = "paperSummaryID")]
    pub paper_summary_id: String,
}

/// Parse TEI text and extract its body divisions.
pub fn extract_divisions(tei_xml: &str) -> Result<Vec<Division>> {
    let root = parse_document(tei_xml)?;
    Ok(divisions_from_tree(&root))
}

/// Extract body divisions from an already parsed TEI tree.
///
/// Returns an empty list when the document has no `<body>`.
pub fn divisions_from_tree(root: &XmlElement) -> Vec<Division> {
    let Some(body) = root.find("body") else {
        log::debug!("TEI document has no body");
        return Vec::new();
    };

    body.children_named("div")
        .enumerate()
        .map(|(order_index, div)| division_from_element(order_index, div))
        .collect()
}

fn division_from_element(order_index: usize, div: &XmlElement) -> Division {
    let (head, head_n) = match div.find("head") {
        Some(head) => {
            let head_n = head
                .attr("n")
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            (Some(normalize_whitespace(&head.text())), head_n)
        },
        None => (None, None),
    };

    let paragraphs = div
        .find_all("p")
        .into_iter()
        .enumerate()
        .map(|(i, p)| paragraph_from_element(i, p))
        .collect();

    Division {
        order_index,
        head,
        head_n,
        paragraphs,
    }
}

fn paragraph_from_element(order_index: usize, p: &XmlElement) -> Paragraph {
    let mut refs = IndexMap::new();
    for r in p.find_all("ref") {
        let id = r.attr("target").or_else(|| r.attr("coords")).unwrap_or_default();
        let marker = RefMarker {
            id: id.to_string(),
            ref_type: r.attr("type").unwrap_or_default().to_string(),
        };
        refs.insert(normalize_whitespace(&r.text()), marker);
    }

    Paragraph {
        text: normalize_whitespace(&p.text()),
        refs,
        order_index,
    }
}

/// Tag each division with the paper it was extracted from.
pub fn into_records(divisions: Vec<Division>, paper_summary_id: &str) -> Vec<DivisionRecord> {
    divisions
        .into_iter()
        .map(|division| DivisionRecord {
            division,
            paper_summary_id: paper_summary_id.to_string(),
        })
        .collect()
}
