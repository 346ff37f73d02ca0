//! Flat key-value serializers for scraped page content.
//!
//! Every format emits the same four fields in the same order
//! (`PageContent::fields`), so downstream consumers can switch formats
//! without re-mapping columns.

use anyhow::{Context, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::core::types::{OutputFormat, PageContent};

pub fn render(content: &PageContent, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(content),
        OutputFormat::Csv => to_delimited(content, b','),
        OutputFormat::Tsv => to_delimited(content, b'\t'),
        OutputFormat::Xml => to_xml(content),
        OutputFormat::Markdown => Ok(to_markdown(content)),
    }
}

fn to_json(content: &PageContent) -> Result<String> {
    serde_json::to_string(content).context("page content JSON serialization failed")
}

/// Header row plus one record, RFC-4180 quoting handled by the csv writer.
fn to_delimited(content: &PageContent, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    let fields = content.fields();
    writer
        .write_record(fields.iter().map(|(key, _)| *key))
        .context("delimited header write failed")?;
    writer
        .write_record(fields.iter().map(|(_, value)| *value))
        .context("delimited record write failed")?;
    let bytes = writer
        .into_inner()
        .context("delimited writer flush failed")?;
    String::from_utf8(bytes).context("delimited output was not UTF-8")
}

/// `<ragData>` root with one child element per field; text is escaped by the
/// writer.
fn to_xml(content: &PageContent) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer
        .write_event(Event::Start(BytesStart::new("ragData")))
        .context("xml root start failed")?;
    for (key, value) in content.fields() {
        writer
            .write_event(Event::Start(BytesStart::new(key)))
            .context("xml element start failed")?;
        writer
            .write_event(Event::Text(BytesText::new(value)))
            .context("xml text write failed")?;
        writer
            .write_event(Event::End(BytesEnd::new(key)))
            .context("xml element end failed")?;
    }
    writer
        .write_event(Event::End(BytesEnd::new("ragData")))
        .context("xml root end failed")?;
    String::from_utf8(writer.into_inner()).context("xml output was not UTF-8")
}

/// `key: value` lines — also the rendering the extraction loop consumes as
/// its source text.
pub fn to_markdown(content: &PageContent) -> String {
    let mut out = String::new();
    for (key, value) in content.fields() {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PageContent {
        PageContent {
            url: "https://example.com/a".to_string(),
            title: "A Title, With Comma".to_string(),
            publication_date: "2024-03-01".to_string(),
            content: "Body & <tags>".to_string(),
        }
    }

    #[test]
    fn json_round_trips_field_values() {
        let rendered = render(&sample(), OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["url"], "https://example.com/a");
        assert_eq!(parsed["title"], "A Title, With Comma");
        assert_eq!(parsed["publication_date"], "2024-03-01");
        assert_eq!(parsed["content"], "Body & <tags>");
    }

    #[test]
    fn csv_has_header_row_and_quotes_commas() {
        let rendered = render(&sample(), OutputFormat::Csv).unwrap();
        let mut lines = rendered.lines();
        assert_eq!(lines.next().unwrap(), "url,title,publication_date,content");
        let record = lines.next().unwrap();
        assert!(record.contains("\"A Title, With Comma\""));
    }

    #[test]
    fn tsv_separates_fields_with_tabs() {
        let rendered = render(&sample(), OutputFormat::Tsv).unwrap();
        let header = rendered.lines().next().unwrap();
        assert_eq!(header, "url\ttitle\tpublication_date\tcontent");
    }

    #[test]
    fn xml_wraps_fields_in_rag_data_root_and_escapes() {
        let rendered = render(&sample(), OutputFormat::Xml).unwrap();
        assert!(rendered.starts_with("<ragData>"));
        assert!(rendered.ends_with("</ragData>"));
        assert!(rendered.contains("<publication_date>2024-03-01</publication_date>"));
        assert!(rendered.contains("Body &amp; &lt;tags&gt;"));
    }

    #[test]
    fn markdown_emits_key_value_lines() {
        let rendered = render(&sample(), OutputFormat::Markdown).unwrap();
        assert!(rendered.contains("url: https://example.com/a\n\n"));
        assert!(rendered.contains("title: A Title, With Comma\n\n"));
        assert!(rendered.contains("content: Body & <tags>\n\n"));
    }
}
