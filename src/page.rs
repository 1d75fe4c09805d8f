use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::{annotator::RiskMarker, error::PageError};

/// The anchors of one document, as seen by the page-side script.
pub trait Page {
    /// Resolved href of every anchor in document order; `None` when the
    /// anchor has no usable href.
    fn hrefs(&self) -> Vec<Option<String>>;

    fn mark(&mut self, index: usize, marker: RiskMarker) -> Result<(), PageError>;
}

#[derive(Debug, Clone)]
struct Anchor {
    /// Byte offset of the `<a` that opens the tag.
    offset: usize,
    href: Option<String>,
    marker: Option<RiskMarker>,
}

/// Anchor view over a static HTML document.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    html: String,
    anchors: Vec<Anchor>,
}

/// An `<a>` start tag; quoted attribute values may contain `>`.
fn anchor_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<a(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?>"#).expect("valid anchor regex")
    })
}

/// One attribute: name, then an optional double-quoted, single-quoted or bare value.
fn attribute() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .expect("valid attribute regex")
    })
}

fn char_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9a-fA-F]+)|(amp|quot|apos|lt|gt));").expect("valid reference regex")
    })
}

impl HtmlPage {
    /// Harvests anchors from `html`. Relative hrefs are resolved against
    /// `page_url` the way a browser exposes `anchor.href`.
    pub fn parse(html: impl Into<String>, page_url: Option<&str>) -> Self {
        let html = html.into();
        let base = page_url.and_then(|u| Url::parse(u).ok());

        let anchors = anchor_tag()
            .find_iter(&html)
            .map(|tag| Anchor {
                offset: tag.start(),
                href: raw_href(tag.as_str()).and_then(|raw| resolve(&raw, base.as_ref())),
                marker: None,
            })
            .collect();

        Self { html, anchors }
    }

    pub fn markers(&self) -> Vec<Option<RiskMarker>> {
        self.anchors.iter().map(|a| a.marker).collect()
    }

    /// The document with an outline style injected into every marked anchor.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.html.len() + self.anchors.len() * 40);
        let mut cursor = 0;

        for anchor in &self.anchors {
            let Some(marker) = anchor.marker else { continue };
            let insert_at = anchor.offset + 2;
            out.push_str(&self.html[cursor..insert_at]);
            out.push_str(&format!(" style=\"outline: {}\"", marker.outline()));
            cursor = insert_at;
        }
        out.push_str(&self.html[cursor..]);
        out
    }
}

impl Page for HtmlPage {
    fn hrefs(&self) -> Vec<Option<String>> {
        self.anchors.iter().map(|a| a.href.clone()).collect()
    }

    fn mark(&mut self, index: usize, marker: RiskMarker) -> Result<(), PageError> {
        let anchor = self.anchors.get_mut(index).ok_or(PageError::MissingAnchor(index))?;
        anchor.marker = Some(marker);
        Ok(())
    }
}

/// Value of the first real `href` attribute of an `<a ...>` tag. Attributes
/// are consumed whole, so text inside another attribute's value never matches.
fn raw_href(tag: &str) -> Option<String> {
    let inner = &tag[2..tag.len() - 1];
    let caps = attribute()
        .captures_iter(inner)
        .find(|caps| caps[1].eq_ignore_ascii_case("href"))?;
    let value = caps
        .get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))
        .map_or("", |m| m.as_str());
    Some(decode_entities(value.trim()))
}

fn resolve(raw: &str, base: Option<&Url>) -> Option<String> {
    match base {
        Some(base) => Some(base.join(raw).map(String::from).unwrap_or_else(|_| raw.to_string())),
        None if raw.is_empty() => None,
        None => Some(Url::parse(raw).map(String::from).unwrap_or_else(|_| raw.to_string())),
    }
}

/// Decodes numeric references and the common named ones. Anything else,
/// including out-of-range code points, is left as written.
fn decode_entities(value: &str) -> String {
    if !value.contains('&') {
        return value.to_string();
    }
    char_reference()
        .replace_all(value, |caps: &regex::Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16).ok().and_then(char::from_u32)
            } else {
                match &caps[3] {
                    "amp" => Some('&'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "lt" => Some('<'),
                    _ => Some('>'),
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
