// src/ingest/providers/html.rs
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::ingest::types::Item;

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));

const ABSOLUTE_PREFIXES: &[&str] = &["http://", "https://"];

/// Collect every anchor with visible text and an absolute http(s) target.
///
/// High recall on purpose: navigation and footer links come through too and
/// are left for the scorer to discard. Relative hrefs are dropped, not resolved.
pub fn extract_links(html: &str) -> Vec<Item> {
    let t0 = std::time::Instant::now();
    let document = Html::parse_document(html);

    let mut out = Vec::new();
    for element in document.select(&ANCHORS) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let link = href.trim();
        let title = visible_text(&element);
        if title.is_empty() || !is_absolute(link) {
            continue;
        }
        out.push(Item {
            title,
            link: link.to_string(),
            description: String::new(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("jobwatch_parse_ms", "kind" => "html").record(ms);
    counter!("jobwatch_items_extracted_total", "kind" => "html").increment(out.len() as u64);
    out
}

/// Text nodes trimmed individually and concatenated.
fn visible_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

fn is_absolute(link: &str) -> bool {
    ABSOLUTE_PREFIXES.iter().any(|p| {
        link.len() >= p.len()
            && link.is_char_boundary(p.len())
            && link[..p.len()].eq_ignore_ascii_case(p)
    })
}
