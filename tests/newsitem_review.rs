use newsitem_reviewer::api::{SUMMARY_FAILED, summarize_session};
use newsitem_reviewer::config::SummarizerConfig;
use newsitem_reviewer::extractor::{
    BatchError, ExtractError, ExtractionPolicy, Extractor, MissingText, SourceFile, extract_batch,
    load_sources,
};
use newsitem_reviewer::outputs::json::{ReviewExport, write_export};
use newsitem_reviewer::outputs::markdown::write_report;
use newsitem_reviewer::session::Session;

const ARTICLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- exported by the archive -->
<newsitem>
  <language>nl</language>
  <mediatype>print</mediatype>
  <source name="Het Dagblad" country="NL"/>
  <docdate local="2023-11-02"/>
  <physical_position page="3"/>
  <logical_position value="Binnenland" type="section"/>
  <byline>
    Piet de Vries
  </byline>
  <headline>Dijken &amp; duinen versterkt</headline>
  <subheadline>Waterschap investeert miljoenen</subheadline>
  <intro>Het waterschap begint volgende week.</intro>
  <story>
    De werkzaamheden duren <em>twee jaar</em>.
    <![CDATA[Kosten: < 40 miljoen]]>
  </story>
  <image>Een graafmachine op de dijk</image>
</newsitem>
"#;

#[test]
fn test_realistic_article() {
    let item = Extractor::default().extract(ARTICLE, "dagblad_0311.xml").unwrap();

    assert_eq!(item.headline, "Dijken & duinen versterkt");
    assert_eq!(item.subheadline, "Waterschap investeert miljoenen");
    assert_eq!(item.byline, "Piet de Vries");
    assert_eq!(item.intro, "Het waterschap begint volgende week.");
    assert!(item.story.starts_with("De werkzaamheden duren twee jaar."));
    assert!(item.story.contains("Kosten: < 40 miljoen"));
    assert!(item.story.ends_with("\n\n[Image: Een graafmachine op de dijk]"));
    assert_eq!(item.metadata.language, "nl");
    assert_eq!(item.metadata.source.name, "Het Dagblad");
    assert_eq!(item.metadata.doc_date, "2023-11-02");
    assert_eq!(item.metadata.physical_position, "3");
    assert_eq!(item.metadata.logical_position.value, "Binnenland");
    assert_eq!(item.metadata.logical_position.kind, "section");
}

#[test]
fn test_batch_into_session_and_export() {
    let policy = ExtractionPolicy::merged().with_missing_text(MissingText::NotAvailable);
    let files = vec![
        Ok(SourceFile::new("dagblad_0311.xml", ARTICLE)),
        Ok(SourceFile::new("broken.xml", "<newsitem><headline>Oops</newsitem>")),
        Ok(SourceFile::new(
            "storm.xml",
            "<newsitem><headline>Storm nadert</headline></newsitem>",
        )),
    ];

    let outcome = extract_batch(&Extractor::new(policy), files);
    assert_eq!(outcome.items.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
        &outcome.failures[0],
        BatchError::Extract(ExtractError::InvalidXmlStructure { filename, .. }) if filename == "broken.xml"
    ));

    let merged = &outcome.items[0];
    assert!(merged.story.starts_with("Het waterschap begint volgende week.\n\nDe werkzaamheden"));
    assert_eq!(merged.intro, "N/A");
    assert_eq!(outcome.items[1].story, "N/A");
    assert_eq!(outcome.items[1].metadata.language, "N/A");

    let mut session = Session::new();
    session.add_batch(outcome.items);
    let hits = session.search("storm");
    assert_eq!(hits.len(), 1);
    let storm_id = hits[0].id;

    session.update_story(storm_id, "Edited by reviewer").unwrap();
    let export = ReviewExport::new(session.search("STORM"));
    let json = export.to_json().unwrap();
    assert!(json.contains("Edited by reviewer"));
    assert!(json.contains("\"item_count\": 1"));
}

#[tokio::test]
async fn test_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.xml");
    let other = dir.path().join("other.xml");
    std::fs::write(&good, ARTICLE).unwrap();
    std::fs::write(&other, "<rss><channel/></rss>").unwrap();

    let sources = load_sources(&[good, other]).await;
    let outcome = extract_batch(&Extractor::default(), sources);

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].filename, "good.xml");
    assert_eq!(
        outcome.failures[0].to_string(),
        "No <newsitem> tag found in other.xml"
    );
}

#[tokio::test]
async fn test_unusable_summarizer_still_exports() {
    let files = vec![
        Ok(SourceFile::new("dagblad_0311.xml", ARTICLE)),
        Ok(SourceFile::new(
            "storm.xml",
            "<newsitem><headline>Storm nadert</headline></newsitem>",
        )),
    ];
    let outcome = extract_batch(&Extractor::default(), files);
    let mut session = Session::new();
    session.add_batch(outcome.items);
    let ids: Vec<_> = session.items().iter().map(|item| item.id).collect();

    let config = SummarizerConfig {
        api_base: "::not a url::".to_string(),
        ..SummarizerConfig::default()
    };
    assert_eq!(summarize_session(&mut session, &ids, &config).await, 2);

    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("out").join("review.json");
    let md_path = dir.path().join("out").join("review.md");
    let items: Vec<_> = ids.iter().filter_map(|id| session.get(*id)).collect();
    write_export(items.clone(), &json_path).await.unwrap();
    write_report(&items, &outcome.failures, &md_path).await.unwrap();

    let json = std::fs::read_to_string(&json_path).unwrap();
    assert!(json.contains("\"item_count\": 2"));
    assert_eq!(json.matches(SUMMARY_FAILED).count(), 2);
    let markdown = std::fs::read_to_string(&md_path).unwrap();
    assert!(markdown.contains("Storm nadert"));
    assert!(markdown.contains(SUMMARY_FAILED));
}
