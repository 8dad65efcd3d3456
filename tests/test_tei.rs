//! Integration tests for TEI extraction on a GROBID-style document.

use scholar_extract::tei::divisions::into_records;
use scholar_extract::tei::{
    extract_divisions, extract_figures, extract_metadata, FigureKind, FigureKindFallback, TeiDocument,
};

const SAMPLE: &str = include_str!("fixtures/sample.tei.xml");

fn fixture_path() -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("sample.tei.xml")
}

// ============================================================================
// Divisions
// ============================================================================

#[test]
fn test_divisions_in_body_order() {
    let divisions = extract_divisions(SAMPLE).unwrap();
    assert_eq!(divisions.len(), 3);

    let indices: Vec<usize> = divisions.iter().map(|d| d.order_index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    assert_eq!(divisions[0].head.as_deref(), Some("Introduction"));
    assert_eq!(divisions[0].head_n.as_deref(), Some("1."));
    assert_eq!(divisions[1].head.as_deref(), Some("Method"));
    assert_eq!(divisions[1].head_n, None);
    assert_eq!(divisions[2].head, None);
}

#[test]
fn test_paragraph_text_and_refs() {
    let divisions = extract_divisions(SAMPLE).unwrap();
    let intro = &divisions[0];
    assert_eq!(intro.paragraphs.len(), 2);

    let first = &intro.paragraphs[0];
    assert_eq!(first.order_index, 0);
    assert_eq!(first.text, "Transformers [4] scale quadratically, see Figure 1.");
    assert_eq!(first.refs.len(), 2);
    assert_eq!(first.refs["[4]"].id, "#b3");
    assert_eq!(first.refs["[4]"].ref_type, "bibr");
    assert_eq!(first.refs["Figure 1"].ref_type, "figure");

    // No target: the coordinates identify the marker
    let second = &intro.paragraphs[1];
    assert_eq!(second.order_index, 1);
    assert_eq!(second.refs["[7]"].id, "1,80,500,20,10");
}

#[test]
fn test_repeated_ref_text_keeps_last() {
    let divisions = extract_divisions(SAMPLE).unwrap();
    let method = &divisions[1];
    assert_eq!(method.paragraphs.len(), 1);
    assert_eq!(method.paragraphs[0].refs.len(), 1);
    assert_eq!(method.paragraphs[0].refs["[2]"].id, "#b5");
}

#[test]
fn test_division_records_serialize_for_store() {
    let records = into_records(extract_divisions(SAMPLE).unwrap(), "paper-1");
    let json = serde_json::to_value(&records).unwrap();

    assert_eq!(json[0]["paperSummaryID"], "paper-1");
    assert_eq!(json[0]["order_index"], 0);
    assert_eq!(json[0]["head"], "Introduction");
    assert_eq!(json[0]["para"][0]["refs"]["[4]"]["type"], "bibr");
    assert!(json[2]["head"].is_null());
    assert!(json[1].get("head_n").is_none());
}

#[test]
fn test_document_without_body() {
    let divisions = extract_divisions("<TEI><teiHeader/></TEI>").unwrap();
    assert!(divisions.is_empty());
}

#[test]
fn test_malformed_xml_is_an_error() {
    assert!(extract_divisions("<TEI><text><body><div></body></TEI>").is_err());
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_header_metadata() {
    let metadata = extract_metadata(SAMPLE).unwrap();

    assert_eq!(
        metadata.title.as_deref(),
        Some("Sparse Attention for Long Document Summarization")
    );
    assert_eq!(metadata.published.as_deref(), Some("2021-06-01"));
    assert_eq!(metadata.abstract_text.as_deref(), Some("We study long documents. Results improve."));
    assert_eq!(metadata.keywords, vec!["summarization", "sparse attention"]);

    let ids: Vec<(&str, &str)> = metadata
        .identifiers
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(ids, vec![("DOI", "10.1000/example.2021.42"), ("arXiv", "arXiv:2106.00001v2")]);
}

#[test]
fn test_authors_and_affiliations() {
    let metadata = extract_metadata(SAMPLE).unwrap();

    // The organisation-only author has no persName and is skipped
    assert_eq!(metadata.authors.len(), 2);

    let ada = &metadata.authors[0];
    assert_eq!(ada.full_name(), "Ada M Lovelace");
    assert_eq!(ada.email.as_deref(), Some("ada@example.edu"));
    let affiliation = &ada.affiliations[0];
    assert_eq!(affiliation.organizations["department"], "Department of Computer Science");
    assert_eq!(affiliation.organizations["institution"], "Example University");
    assert_eq!(affiliation.settlement.as_deref(), Some("Cambridge"));
    assert_eq!(affiliation.country.as_deref(), Some("USA"));

    let alan = &metadata.authors[1];
    assert_eq!(alan.email, None);
    assert_eq!(alan.affiliations[0].organizations["laboratory"], "Applied Reasoning Lab");
}

// ============================================================================
// Figures
// ============================================================================

#[test]
fn test_figures_and_tables() {
    let figures = extract_figures(SAMPLE, FigureKindFallback::Bitmap).unwrap();
    assert_eq!(figures.len(), 3);

    let fig = &figures[0];
    assert_eq!(fig.xml_id.as_deref(), Some("fig_0"));
    assert_eq!(fig.kind, FigureKind::BitmapFigure);
    assert_eq!(fig.head.as_deref(), Some("Figure 1 :"));
    assert_eq!(fig.description.as_deref(), Some("Overview of the sparse attention pattern."));
    assert_eq!(fig.page(), Some(2));

    let table = &figures[1];
    assert_eq!(table.kind, FigureKind::Table);
    assert_eq!(table.kind.figure_type(), "table");
    assert_eq!(table.page(), Some(3));
}

#[test]
fn test_figure_without_graphic_uses_fallback() {
    let bitmap = extract_figures(SAMPLE, FigureKindFallback::Bitmap).unwrap();
    assert_eq!(bitmap[2].kind, FigureKind::BitmapFigure);
    assert_eq!(bitmap[2].page(), None);

    let vector = extract_figures(SAMPLE, FigureKindFallback::Vector).unwrap();
    assert_eq!(vector[2].kind, FigureKind::VectorFigure);
    assert_eq!(vector[2].kind.figure_type(), "figure");
}

// ============================================================================
// Parsed document
// ============================================================================

#[test]
fn test_document_opened_from_disk() {
    let document = TeiDocument::open(fixture_path()).unwrap();
    assert_eq!(document.divisions(), extract_divisions(SAMPLE).unwrap());
    assert_eq!(document.metadata(), extract_metadata(SAMPLE).unwrap());
    assert_eq!(document.figures(FigureKindFallback::default()).len(), 3);
}
