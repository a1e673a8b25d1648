// src/ingest/providers/rss.rs
use metrics::{counter, histogram};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::errors::SourceError;
use crate::ingest::types::Item;

/// Root elements accepted as a feed: RSS 0.9x/2.0 and RSS 1.0 (`rdf:RDF`).
const FEED_ROOTS: &[&[u8]] = &[b"rss", b"RDF"];

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Link,
    Description,
}

impl Field {
    /// Only unprefixed children count; `atom:link`, `media:title`, `dc:title` are ignored.
    fn from_qname(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"description" => Some(Self::Description),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Draft {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
}

impl Draft {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Description => &mut self.description,
        }
    }

    fn finish(self) -> Item {
        Item {
            title: self.title.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
        }
    }
}

/// Parse an RSS document into items, in document order.
///
/// Every `<item>` counts, whether it sits inside `<channel>` (RSS 2.0) or
/// next to it (RSS 1.0). The first direct `title`/`link`/`description`
/// child wins; missing ones become empty strings. Nothing is filtered here
/// (an item without a link is dropped later by the pipeline).
pub fn parse_items(xml: &str) -> Result<Vec<Item>, SourceError> {
    let t0 = std::time::Instant::now();
    let mut reader = Reader::from_str(xml);

    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    // (depth of the <item>, fields collected so far)
    let mut item: Option<(usize, Draft)> = None;
    // (field being read, depth of its element)
    let mut field: Option<(Field, usize)> = None;
    let mut buf = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SourceError::Parse(format!("rss: {e}")))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                if !saw_root {
                    check_root(e.local_name().as_ref())?;
                    saw_root = true;
                }
                let name = e.name();
                let item_depth = item.as_ref().map(|(d, _)| *d);
                match item_depth {
                    None if name.as_ref() == b"item" => item = Some((depth, Draft::default())),
                    Some(d) if field.is_none() && depth == d + 1 => {
                        if let Some(f) = Field::from_qname(name.as_ref()) {
                            field = Some((f, depth));
                            buf.clear();
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if !saw_root {
                    check_root(e.local_name().as_ref())?;
                    saw_root = true;
                }
                if item.is_none() && e.name().as_ref() == b"item" {
                    out.push(Draft::default().finish());
                }
            }
            Event::Text(t) if field.is_some() => buf.push_str(&decode_text(&t)),
            Event::CData(c) if field.is_some() => buf.push_str(&String::from_utf8_lossy(&c)),
            Event::End(_) => {
                if let Some((f, d)) = field {
                    if depth == d {
                        if let Some((_, draft)) = item.as_mut() {
                            draft.slot(f).get_or_insert_with(|| buf.trim().to_string());
                        }
                        field = None;
                    }
                } else if matches!(&item, Some((d, _)) if *d == depth) {
                    if let Some((_, draft)) = item.take() {
                        out.push(draft.finish());
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(SourceError::Parse("rss: document has no root element".into()));
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("jobwatch_parse_ms", "kind" => "rss").record(ms);
    counter!("jobwatch_items_extracted_total", "kind" => "rss").increment(out.len() as u64);
    Ok(out)
}

fn check_root(local: &[u8]) -> Result<(), SourceError> {
    if FEED_ROOTS.contains(&local) {
        return Ok(());
    }
    Err(SourceError::Parse(format!(
        "rss: not a feed (root element <{}>)",
        String::from_utf8_lossy(local)
    )))
}

/// Feeds leak HTML entities (`&eacute;`, `&nbsp;`) that XML does not define,
/// so text is decoded with the HTML entity table rather than XML's five.
fn decode_text(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    html_escape::decode_html_entities(&s).replace('\u{a0}', " ")
}
