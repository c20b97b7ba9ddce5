use std::fs;

use super::document::{DocumentExtraction, document_stem};
use super::plan::{DescentPlan, validate_steps};
use super::scheme::{PathStep, SCHEME_TABLE, SchemeId, select_canonical_pattern};
use super::*;
use crate::model::ReferencePattern;

fn tei(patterns: &[&str], body: &str) -> String {
    let declared = patterns
        .iter()
        .enumerate()
        .map(|(index, pattern)| {
            format!(
                "<cRefPattern n=\"level{index}\" replacementPattern=\"#xpath({})\"/>",
                pattern.replace('"', "&quot;")
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
<teiHeader>
<fileDesc><titleStmt><title>Test Work</title><author>Test Author</author></titleStmt></fileDesc>
<encodingDesc><refsDecl n="CTS">
{declared}
</refsDecl></encodingDesc>
<profileDesc><langUsage><language ident="grc">Greek</language></langUsage></profileDesc>
</teiHeader>
<text><body>
{body}
</body></text>
</TEI>"#
    )
}

fn extractor() -> Extractor {
    Extractor::new(DEFAULT_URN_PREFIX).expect("extractor should build")
}

fn extract_segments(file_name: &str, document: String) -> (SchemeId, Vec<crate::model::Segment>) {
    match extractor()
        .extract(file_name, document)
        .expect("document should extract")
    {
        DocumentExtraction::Extracted {
            scheme, segments, ..
        } => (scheme, segments),
        other => panic!("expected extracted document, got {other:?}"),
    }
}

fn identifiers(segments: &[crate::model::Segment]) -> Vec<&str> {
    segments
        .iter()
        .map(|segment| segment.identifier.as_str())
        .collect()
}

fn pattern(literal: &str) -> ReferencePattern {
    ReferencePattern {
        literal_path: literal.to_string(),
        kind: String::new(),
    }
}

#[test]
fn static_scheme_table_compiles() {
    let catalog = SchemeCatalog::new().expect("scheme table should validate");
    assert_eq!(catalog.plans().len(), SCHEME_TABLE.len());
}

#[test]
fn observed_spellings_classify_to_their_scheme() {
    let catalog = SchemeCatalog::new().expect("scheme table should validate");
    let cases = [
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']/tei:div[@n='$3']/tei:p[@n='$4']",
            SchemeId::Div3Paragraph,
        ),
        ("/tei:TEI/tei:text/tei:body/tei:div//tei:div[@n='$1']", SchemeId::DescendantDiv),
        ("/tei:TEI/tei:text/tei:body/tei:div//tei:div[@n=\\'$1\\']", SchemeId::DescendantDiv),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div//tei:div[@subtype='fragment'][@n='$1']",
            SchemeId::DescendantFragment,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:p//tei:l[@n='$1']",
            SchemeId::ParagraphDescendantLine,
        ),
        ("/tei:TEI/tei:text/tei:body/tei:div//tei:l[@n='$1']", SchemeId::DescendantLine),
        ("/tei:TEI/tei:text/tei:body/tei:div//tei:l[@n=\\'$1\\']", SchemeId::DescendantLine),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:sp/tei:l[@n='$1']", SchemeId::DescendantLine),
        ("/tei:TEI/tei:text/tei:body//tei:l[@n=\\'$1\\']", SchemeId::BodyDescendantLine),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']//tei:div[@n='$2']",
            SchemeId::DivDescendantDiv,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']//tei:div[@n='$3']",
            SchemeId::Div2DescendantDiv,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']//tei:l[@n='$2']",
            SchemeId::DivDescendantLine,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']/tei:p[@n='$3']",
            SchemeId::Div2Paragraph,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div[@type='edition']/tei:div[@n=\\'$1\\']/tei:div[@n=\\'$2\\']/tei:p[@n=\\'$3\\']",
            SchemeId::Div2Paragraph,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:p[@n='$2']/tei:cit[@n='$3']",
            SchemeId::DivParagraphCit,
        ),
        ("/tei:TEI/tei:text/tei:body/tei:div[@n=\\'$1\\']", SchemeId::BodyDiv),
        ("/tei:TEI.2/tei:text/tei:body/tei:div[@n=\\'$1\\']", SchemeId::BodyDiv),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:div/tei:div[@n='$1']", SchemeId::NestedDiv),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:p/tei:seg[@n='$1']", SchemeId::ParagraphSeg),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:p[@n='$1']", SchemeId::Paragraph),
        ("/tei:TEI/tei:text/tei:body/tei:div[@type='edition']/tei:div[@n='$1']", SchemeId::Div),
        ("/tei:TEI/tei:text/tei:body/div[@type='edition']/div[@n='$1']", SchemeId::Div),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n=\\'$1\\']", SchemeId::Div),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']", SchemeId::Div),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:p[@n='$2']",
            SchemeId::DivParagraph,
        ),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:ab[@n='$2']", SchemeId::DivAb),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:lg/tei:l[@n='$2']",
            SchemeId::DivLineGroupLine,
        ),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']", SchemeId::Div2),
        (
            "/tei:TEI/tei:text/tei:body/tei:div[@type='translation']/tei:div[@n='$1']/tei:div[@n='$2']",
            SchemeId::Div2,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n=\\'$1\\']/tei:div[@n=\\'$2\\']",
            SchemeId::Div2,
        ),
        (
            "/tei:TEI/tei:text/tei:body/div[@type='edition']/div[@n='$1']/div[@n='$2']",
            SchemeId::Div2,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div[@type='edition']/tei:div[@n='$1']/tei:div[@n='$2']",
            SchemeId::Div2,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div[@type='edition']/tei:div[@n='$1']/tei:div[@n='$2']/tei:div[@n='$3']",
            SchemeId::Div3,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']/tei:div[@n='$3']",
            SchemeId::Div3,
        ),
        (
            "/tei:TEI/tei:text/tei:body/div[@type='edition']/div[@n='$1']/div[@n='$2']/div[@n='$3']",
            SchemeId::Div3,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n=\\'$1\\']/tei:div[@n=\\'$2\\']/tei:div[@n=\\'$3\\']",
            SchemeId::Div3,
        ),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:l[@n='$1']", SchemeId::Line),
        (
            "/tei:TEI.2/tei:text/tei:body/tei:div[@n=\\'$1\\']/tei:div[@n=\\'$2\\']",
            SchemeId::BodyDiv2,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div[@n=\\'$1\\']/tei:div[@n=\\'$2\\']",
            SchemeId::BodyDiv2,
        ),
        (
            "/tei:TEI.2/tei:text/tei:body/tei:div1[@n=\\'$1\\']/tei:div2[@n=\\'$2\\']/tei:div3[@n=\\'$3\\']",
            SchemeId::BodyDiv3,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']/tei:l[@n='$3']",
            SchemeId::Div2Line,
        ),
        ("/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:l[@n='$2']", SchemeId::DivLine),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']/tei:div[@n='$3']/tei:div[@n='$4']",
            SchemeId::Div4,
        ),
        (
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']/tei:cit[@n='$3']",
            SchemeId::Div2Cit,
        ),
    ];

    for (literal, expected) in cases {
        let wrapped = format!("#xpath({literal})");
        for spelling in [literal, wrapped.as_str()] {
            let plan = catalog
                .lookup(spelling)
                .unwrap_or_else(|| panic!("no scheme for {spelling}"));
            assert_eq!(plan.scheme(), expected, "spelling: {spelling}");
        }
    }
}

#[test]
fn normalization_collapses_cosmetic_variants_only() {
    let catalog = SchemeCatalog::new().expect("scheme table should validate");
    assert_eq!(
        catalog.normalize(" #xpath(/tei:TEI.2/tei:text/tei:body/tei:div1[@n=\\'$1\\']) "),
        "/TEI.2/text/body/div[@n='$1']"
    );
    assert_eq!(
        catalog.normalize("/tei:TEI/tei:text/tei:body/tei:div[@type='edition']"),
        "/TEI/text/body/div[@type='edition']"
    );
    assert!(catalog.lookup("/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n=\"$1\"]").is_none());
}

#[test]
fn longest_pattern_wins_and_first_declared_breaks_ties() {
    let patterns = vec![pattern("/a/b"), pattern("/a/b/c"), pattern("/a/b/d"), pattern("/a")];
    let selected = select_canonical_pattern(&patterns).expect("a pattern should be selected");
    assert_eq!(selected.literal_path, "/a/b/c");
    assert!(select_canonical_pattern(&[]).is_none());
}

#[test]
fn classify_reports_no_pattern_and_unclassified() {
    let catalog = SchemeCatalog::new().expect("scheme table should validate");
    assert!(matches!(catalog.classify(&[]), Classification::NoPattern));

    match catalog.classify(&[pattern("#xpath(/tei:TEI/tei:text/tei:body/tei:sp[@n='$1'])")]) {
        Classification::Unclassified { literal, canonical } => {
            assert_eq!(literal, "#xpath(/tei:TEI/tei:text/tei:body/tei:sp[@n='$1'])");
            assert_eq!(canonical, "/TEI/text/body/sp[@n='$1']");
        }
        other => panic!("expected unclassified, got {other:?}"),
    }
}

#[test]
fn compiler_rejects_malformed_plans() {
    assert!(validate_steps(&[]).is_err());
    assert!(validate_steps(&[PathStep::child("div"), PathStep::numbered("p")]).is_err());
    assert!(validate_steps(&[PathStep::leaf("div"), PathStep::leaf("p")]).is_err());
    assert!(validate_steps(&[PathStep::descendant_leaf("div"), PathStep::leaf("p")]).is_err());
    assert!(validate_steps(&[PathStep::child("div"), PathStep::child("p")]).is_err());
    assert!(validate_steps(&[PathStep::child("div"), PathStep::descendant_leaf("l")]).is_ok());
}

#[test]
fn plans_report_capture_depth_and_render() {
    let catalog = SchemeCatalog::new().expect("scheme table should validate");
    let plan = catalog
        .plans()
        .iter()
        .find(|plan| plan.scheme() == SchemeId::DivDescendantLine)
        .copied()
        .expect("scheme should exist");
    assert_eq!(plan.capture_count(), 2);
    assert_eq!(plan.render(), "div/div[@n]//l[@n]");

    let depths = catalog
        .plans()
        .iter()
        .map(DescentPlan::capture_count)
        .collect::<Vec<usize>>();
    assert!(depths.iter().all(|depth| (1..=4).contains(depth)));
}

#[test]
fn two_level_scheme_yields_segments_in_document_order() {
    let document = tei(
        &[
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']",
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:p[@n='$2']",
        ],
        r#"<div type="edition">
<div n="1"><p n="1">πρῶτον</p><p n="2">second <hi>part</hi></p></div>
<div n="2"><p n="1">tertium</p><p n="2">τέταρτον  λόγος</p></div>
</div>"#,
    );

    let (scheme, segments) = extract_segments("tlg0001.tlg001.test-grc1.xml", document);
    assert_eq!(scheme, SchemeId::DivParagraph);
    assert_eq!(
        identifiers(&segments),
        vec![
            "urn:cts:greekLit:tlg0001.tlg001.test-grc1:1.1",
            "urn:cts:greekLit:tlg0001.tlg001.test-grc1:1.2",
            "urn:cts:greekLit:tlg0001.tlg001.test-grc1:2.1",
            "urn:cts:greekLit:tlg0001.tlg001.test-grc1:2.2",
        ]
    );
    assert_eq!(segments[1].text, "second part");
    assert_eq!(segments[1].counts.latin_words, 2);
    assert_eq!(segments[3].text, "τέταρτον λόγος");
    assert_eq!(segments[3].counts.greek_words, 2);
}

#[test]
fn descendant_scheme_matches_inner_divs_at_any_depth() {
    let document = tei(
        &["/tei:TEI/tei:text/tei:body/tei:div//tei:div[@n='$1']"],
        r#"<div type="edition">
<div n="1">first</div>
<sp><lg><div n="2">second</div></lg></sp>
</div>"#,
    );

    let (scheme, segments) = extract_segments("phi0001.phi001.test-lat1.xml", document);
    assert_eq!(scheme, SchemeId::DescendantDiv);
    assert_eq!(
        identifiers(&segments),
        vec![
            "urn:cts:greekLit:phi0001.phi001.test-lat1:1",
            "urn:cts:greekLit:phi0001.phi001.test-lat1:2",
        ]
    );
    assert_eq!(segments[1].text, "second");
}

#[test]
fn identifiers_have_one_component_per_capturing_step() {
    let document = tei(
        &[
            "/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:div[@n='$2']/tei:div[@n='$3']/tei:p[@n='$4']",
        ],
        r#"<div>
<div n="1"><div n="1"><div n="1"><p n="1">a</p><p n="2">b</p></div></div>
<div n="2"><div n="5"><p>no number</p></div></div></div>
</div>"#,
    );

    let (scheme, segments) = extract_segments("work.xml", document);
    let plan = SchemeCatalog::new()
        .expect("scheme table should validate")
        .plans()
        .iter()
        .find(|plan| plan.scheme() == scheme)
        .copied()
        .expect("scheme should exist");

    assert_eq!(segments.len(), 3);
    for segment in &segments {
        let (_, dotted) = segment
            .identifier
            .rsplit_once(':')
            .expect("identifier should contain a colon");
        assert_eq!(dotted.split('.').count(), plan.capture_count());
    }
    assert_eq!(segments[2].identifier, "urn:cts:greekLit:work:1.2.5.");
}

#[test]
fn numbered_divisions_and_escaped_quotes_walk_div1_to_div3() {
    let document = tei(
        &[
            "/tei:TEI.2/tei:text/tei:body/tei:div1[@n=\\'$1\\']/tei:div2[@n=\\'$2\\']/tei:div3[@n=\\'$3\\']",
        ],
        r#"<div1 n="A"><div2 n="1"><div3 n="1">x</div3><div3 n="2">y</div3></div2></div1>"#,
    );

    let (scheme, segments) = extract_segments("stoa0001.xml", document);
    assert_eq!(scheme, SchemeId::BodyDiv3);
    assert_eq!(
        identifiers(&segments),
        vec!["urn:cts:greekLit:stoa0001:A.1.1", "urn:cts:greekLit:stoa0001:A.1.2"]
    );
}

#[test]
fn line_group_level_is_descended_without_capture() {
    let document = tei(
        &["/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:lg/tei:l[@n='$2']"],
        r#"<div><div n="3"><lg><l n="1">one</l><l n="2">two</l></lg><lg><l n="3">three</l></lg></div></div>"#,
    );

    let (_, segments) = extract_segments("poem.xml", document);
    assert_eq!(
        identifiers(&segments),
        vec![
            "urn:cts:greekLit:poem:3.1",
            "urn:cts:greekLit:poem:3.2",
            "urn:cts:greekLit:poem:3.3",
        ]
    );
}

#[test]
fn missing_levels_yield_fewer_segments_without_error() {
    let document = tei(
        &["/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:p[@n='$2']"],
        r#"<div><div n="1"><ab n="1">not a paragraph</ab></div><div n="2"><p n="1">kept</p></div></div>"#,
    );

    let (_, segments) = extract_segments("gappy.xml", document);
    assert_eq!(identifiers(&segments), vec!["urn:cts:greekLit:gappy:2.1"]);
}

#[test]
fn urn_prefix_is_taken_from_document_text() {
    let document = tei(
        &["/tei:TEI/tei:text/tei:body/tei:div/tei:p[@n='$1']"],
        r#"<div n="urn:cts:latinLit:phi0448.phi001.perseus-lat2"><p n="1">Gallia est omnis divisa</p></div>"#,
    );

    let (_, segments) = extract_segments("phi0448.phi001.perseus-lat2.xml", document);
    assert_eq!(segments[0].identifier, "urn:cts:latinLit:phi0448.phi001.perseus-lat2:1");
    assert_eq!(segments[0].counts.latin_words, 4);
}

#[test]
fn unrecognised_scheme_keeps_catalog_metadata_without_segments() {
    let literal = "/tei:TEI/tei:text/tei:body/tei:div/tei:list/tei:item[@n='$1']";
    let document = tei(&[literal], r#"<div><list><item n="1">x</item></list></div>"#);

    let extraction = extractor()
        .extract("odd.xml", document)
        .expect("document should parse");
    let mut output = crate::model::BatchOutput::default();
    output.absorb(extraction);

    assert!(output.segments.is_empty());
    assert_eq!(output.catalog.len(), 1);
    assert_eq!(output.catalog[0].urn, "urn:cts:greekLit:odd");
    assert_eq!(output.catalog[0].work_title, "Test Work");
    assert_eq!(output.catalog[0].group_name, "Test Author");
    assert_eq!(output.catalog[0].language, "grc");
    assert_eq!(output.unclassified_patterns, vec![format!("#xpath({literal})")]);
    assert_eq!(output.documents_unclassified, 1);
}

#[test]
fn byte_order_mark_does_not_shift_captured_text() {
    let document = format!(
        "\u{feff}{}",
        tei(
            &["/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']/tei:p[@n='$2']"],
            r#"<div><div n="1"><p n="1">alpha beta</p><p n="2">μῆνιν ἄειδε</p></div></div>"#,
        )
    );

    let extraction = extractor()
        .extract("bom.xml", document)
        .expect("document should parse");
    let (entry, segments) = match extraction {
        DocumentExtraction::Extracted {
            entry, segments, ..
        } => (entry, segments),
        other => panic!("expected extracted document, got {other:?}"),
    };

    assert_eq!(entry.work_title, "Test Work");
    assert_eq!(entry.group_name, "Test Author");
    assert_eq!(
        identifiers(&segments),
        vec!["urn:cts:greekLit:bom:1.1", "urn:cts:greekLit:bom:1.2"]
    );
    assert_eq!(segments[0].text, "alpha beta");
    assert_eq!(segments[1].text, "μῆνιν ἄειδε");
    assert_eq!(segments[1].counts.greek_words, 2);
}

#[test]
fn header_entity_references_are_resolved_in_catalog() {
    let document = tei(
        &["/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']"],
        r#"<div><div n="1">x</div></div>"#,
    )
    .replace("<title>Test Work</title>", "<title>Arma &amp; virum</title>");

    let extraction = extractor()
        .extract("aeneid.xml", document)
        .expect("document should parse");
    let entry = match extraction {
        DocumentExtraction::Extracted { entry, .. } => entry,
        other => panic!("expected extracted document, got {other:?}"),
    };
    assert_eq!(entry.work_title, "Arma & virum");
}

#[test]
fn document_without_pattern_is_not_cataloged() {
    let document = tei(&[], r#"<div><p n="1">x</p></div>"#);
    let extraction = extractor()
        .extract("bare.xml", document)
        .expect("document should parse");
    let mut output = crate::model::BatchOutput::default();
    output.absorb(extraction);

    assert!(output.catalog.is_empty());
    assert!(output.segments.is_empty());
    assert_eq!(output.files_without_pattern, vec!["bare.xml".to_string()]);
}

#[test]
fn document_stem_strips_xml_extension_only() {
    assert_eq!(document_stem("tlg0012.tlg001.xml"), "tlg0012.tlg001");
    assert_eq!(document_stem("UPPER.XML"), "UPPER");
    assert_eq!(document_stem("notes.txt"), "notes.txt");
    assert_eq!(document_stem("x"), "x");
}

#[test]
fn batch_skips_bad_files_and_keeps_going() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let nested = dir.path().join("data").join("tlg0001");
    fs::create_dir_all(&nested).expect("nested dir should be created");

    let good = tei(
        &["/tei:TEI/tei:text/tei:body/tei:div/tei:div[@n='$1']"],
        r#"<div><div n="1">ἀρχή</div><div n="2">τέλος</div></div>"#,
    );
    fs::write(nested.join("a.xml"), &good).expect("write a.xml");
    fs::write(nested.join("b.xml"), "<TEI><text><body></TEI>").expect("write b.xml");
    fs::write(nested.join("c.xml"), tei(&[], "")).expect("write c.xml");
    fs::write(nested.join("__cts__.xml"), &good).expect("write __cts__.xml");
    fs::write(nested.join("notes.txt"), "ignored").expect("write notes.txt");

    let excluded = DEFAULT_EXCLUDED_FILES
        .iter()
        .map(|name| name.to_string())
        .collect::<Vec<String>>();
    let documents = discover_documents(dir.path(), &excluded).expect("discovery should work");
    let names = documents.iter().map(|path| file_name_of(path)).collect::<Vec<String>>();
    assert_eq!(names, vec!["a.xml", "b.xml", "c.xml"]);

    let output = run_batch(&extractor(), &documents);
    assert_eq!(output.documents_seen, 3);
    assert_eq!(output.documents_extracted, 1);
    assert_eq!(output.segments.len(), 2);
    assert_eq!(output.totals.greek_words, 2);
    assert_eq!(output.skipped_files.len(), 1);
    assert_eq!(output.skipped_files[0].file_name, "b.xml");
    assert_eq!(output.files_without_pattern, vec!["c.xml".to_string()]);
    assert_eq!(output.scheme_usage.get("div"), Some(&1));
}

#[test]
fn discovery_fails_for_missing_source_directory() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    assert!(discover_documents(&dir.path().join("missing"), &[]).is_err());
}
