//! Format-tolerant RSS/Atom parsing.
//!
//! The document is read once with a namespace-aware streaming reader. RSS
//! `<item>` elements are collected from anywhere in the document; only when
//! there are none does the parser fall back to Atom `<entry>` elements in the
//! Atom namespace.
//!
//! At most `limit` candidates are taken per document. Candidates whose title
//! or link is empty after trimming are dropped, since both take part in the
//! article's identity.
//!
//! Text is decoded with the encoding the document declares (or its BOM), so
//! Latin-1 and windows-1252 feeds read the same as UTF-8 ones.

use crate::models::FeedEntry;
use chrono::{DateTime, NaiveDateTime, Weekday};
use quick_xml::encoding::Decoder;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use thiserror::Error;
use tracing::{debug, instrument};

/// The Atom syndication namespace.
pub const ATOM_NS: &[u8] = b"http://www.w3.org/2005/Atom";

/// Zone names accepted by the named-zone RSS date format.
const NAMED_ZONES: &[&str] = &["GMT", "UT", "UTC", "Z"];

/// The feed document could not be read as XML.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed feed: {0}")]
    Malformed(String),
}

/// Which syndication format the entries were read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Rss,
    Atom,
}

/// The normalized entries of one feed document.
///
/// A single-pass iterator: trimming, date normalization and the empty-field
/// filter are applied as entries are pulled.
#[derive(Debug)]
pub struct FeedEntries {
    format: FeedFormat,
    candidates: std::vec::IntoIter<Candidate>,
}

impl FeedEntries {
    pub fn format(&self) -> FeedFormat {
        self.format
    }
}

impl Iterator for FeedEntries {
    type Item = FeedEntry;

    fn next(&mut self) -> Option<FeedEntry> {
        for candidate in self.candidates.by_ref() {
            if let Some(entry) = candidate.into_entry(self.format) {
                return Some(entry);
            }
        }
        None
    }
}

/// Parse `xml` and return up to `limit` candidate entries.
#[instrument(level = "debug", skip(xml), fields(bytes = xml.len()))]
pub fn parse_feed(xml: &[u8], limit: usize) -> Result<FeedEntries, ParseError> {
    let mut reader = NsReader::from_reader(xml);
    let mut buf = Vec::new();

    let mut depth = 0usize;
    let mut seen_root = false;
    let mut items: Vec<Candidate> = Vec::new();
    let mut entries: Vec<Candidate> = Vec::new();
    let mut current: Option<Candidate> = None;
    let mut capture: Option<Capture> = None;

    loop {
        let position = reader.buffer_position();
        // Refreshed every event; the XML declaration can switch it.
        let decoder = reader.decoder();
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|source| ParseError::Xml {
                position: position as u64,
                source,
            })?;

        match event {
            Event::Start(e) => {
                depth += 1;
                seen_root = true;
                open_element(&ns, &e, depth, false, decoder, &mut current, &mut capture);
            }
            Event::Empty(e) => {
                seen_root = true;
                open_element(&ns, &e, depth + 1, true, decoder, &mut current, &mut capture);
                if let Some(candidate) = current.take_if(|c| c.depth == depth + 1) {
                    keep(candidate, &mut items, &mut entries, limit);
                }
            }
            Event::Text(e) => {
                if let Some(capture) = capture.as_mut() {
                    capture.push_escaped(&decode(decoder, &e));
                }
            }
            Event::CData(e) => {
                if let Some(capture) = capture.as_mut() {
                    capture.text.push_str(&decode(decoder, &e));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(capture) = capture.as_mut() {
                    capture.push_reference(&decode(decoder, &e));
                }
            }
            Event::End(_) => {
                if let Some(done) = capture.take_if(|c| c.depth == depth) {
                    if let Some(candidate) = current.as_mut() {
                        candidate.set(done.field, done.text);
                    }
                }
                if let Some(candidate) = current.take_if(|c| c.depth == depth) {
                    keep(candidate, &mut items, &mut entries, limit);
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ParseError::Malformed("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(ParseError::Malformed(format!(
            "document ended with {} unclosed element(s)",
            depth
        )));
    }

    let (format, candidates) = if items.is_empty() {
        (FeedFormat::Atom, entries)
    } else {
        (FeedFormat::Rss, items)
    };
    debug!(?format, candidates = candidates.len(), "Parsed feed document");

    Ok(FeedEntries {
        format,
        candidates: candidates.into_iter(),
    })
}

/// Decode raw document bytes, replacing anything the decoder rejects.
fn decode(decoder: Decoder, raw: &[u8]) -> String {
    match decoder.decode(raw) {
        Ok(text) => text.into_owned(),
        Err(_) => String::from_utf8_lossy(raw).into_owned(),
    }
}

fn keep(candidate: Candidate, items: &mut Vec<Candidate>, entries: &mut Vec<Candidate>, limit: usize) {
    let bucket = match candidate.format {
        FeedFormat::Rss => items,
        FeedFormat::Atom => entries,
    };
    if bucket.len() < limit {
        bucket.push(candidate);
    }
}

/// Handle an opening (or self-closing) tag at `depth`.
fn open_element(
    ns: &ResolveResult,
    e: &BytesStart,
    depth: usize,
    empty: bool,
    decoder: Decoder,
    current: &mut Option<Candidate>,
    capture: &mut Option<Capture>,
) {
    let local = e.local_name();
    let local = local.as_ref();
    let is_atom = matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == ATOM_NS);
    let is_plain = matches!(ns, ResolveResult::Unbound);

    if current.is_none() {
        if is_plain && local == b"item" {
            *current = Some(Candidate::new(FeedFormat::Rss, depth));
        } else if is_atom && local == b"entry" {
            *current = Some(Candidate::new(FeedFormat::Atom, depth));
        }
        return;
    }
    let Some(candidate) = current.as_mut() else {
        return;
    };

    // Only direct children of the item/entry carry its fields.
    if depth != candidate.depth + 1 || capture.is_some() {
        return;
    }

    let field = match (candidate.format, local) {
        (FeedFormat::Rss, b"title") if is_plain => Field::Title,
        (FeedFormat::Rss, b"link") if is_plain => Field::Link,
        (FeedFormat::Rss, b"pubDate") if is_plain => Field::Published,
        (FeedFormat::Atom, b"title") if is_atom => Field::Title,
        (FeedFormat::Atom, b"published") if is_atom => Field::Published,
        (FeedFormat::Atom, b"updated") if is_atom => Field::Updated,
        (FeedFormat::Atom, b"link") if is_atom => {
            candidate.add_atom_link(e, decoder);
            return;
        }
        _ => return,
    };

    if empty {
        candidate.set(field, String::new());
    } else {
        *capture = Some(Capture {
            field,
            depth,
            text: String::new(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Published,
    Updated,
}

/// Text being collected for one field element.
#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

impl Capture {
    fn push_escaped(&mut self, text: &str) {
        match unescape(text) {
            Ok(unescaped) => self.text.push_str(&unescaped),
            Err(_) => self.text.push_str(text),
        }
    }

    fn push_reference(&mut self, name: &str) {
        if let Some(ch) = resolve_char_reference(name) {
            self.text.push(ch);
        } else if let Some(resolved) = resolve_predefined_entity(name) {
            self.text.push_str(resolved);
        } else if let Some(resolved) = resolve_html_entity(name) {
            self.text.push_str(&resolved);
        }
        // Anything else is an undeclared entity and is dropped.
    }
}

fn resolve_char_reference(name: &str) -> Option<char> {
    let digits = name.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// Named HTML entities (`nbsp`, `hellip`, ...) that feeds use without
/// declaring them.
fn resolve_html_entity(name: &str) -> Option<String> {
    let reference = format!("&{};", name);
    let decoded = html_escape::decode_html_entities(&reference);
    (decoded != reference).then(|| decoded.into_owned())
}

/// One `<item>` or `<entry>` before normalization.
#[derive(Debug)]
struct Candidate {
    format: FeedFormat,
    depth: usize,
    title: Option<String>,
    link: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    first_link: Option<String>,
    alternate_link: Option<String>,
}

impl Candidate {
    fn new(format: FeedFormat, depth: usize) -> Self {
        Self {
            format,
            depth,
            title: None,
            link: None,
            published: None,
            updated: None,
            first_link: None,
            alternate_link: None,
        }
    }

    /// Record a field; the first occurrence of each element wins.
    fn set(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
            Field::Updated => &mut self.updated,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn add_atom_link(&mut self, e: &BytesStart, decoder: Decoder) {
        let mut rel = None;
        let mut href = None;
        for attr in e.attributes().flatten() {
            let value = decode(decoder, &attr.value);
            let value = match unescape(&value) {
                Ok(unescaped) => unescaped.into_owned(),
                Err(_) => value,
            };
            match attr.key.local_name().as_ref() {
                b"rel" => rel = Some(value),
                b"href" => href = Some(value),
                _ => {}
            }
        }

        let href = href.unwrap_or_default();
        if self.first_link.is_none() {
            self.first_link = Some(href.clone());
        }
        if self.alternate_link.is_none() && rel.as_deref() == Some("alternate") {
            self.alternate_link = Some(href);
        }
    }

    fn into_entry(self, format: FeedFormat) -> Option<FeedEntry> {
        let (link, published) = match format {
            FeedFormat::Rss => {
                let published = self.published.as_deref().and_then(normalize_rss_date);
                (self.link, published)
            }
            FeedFormat::Atom => {
                let link = self.alternate_link.or(self.first_link);
                let published = self
                    .published
                    .filter(|p| !p.is_empty())
                    .or(self.updated)
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty());
                (link, published)
            }
        };

        let title = self.title.unwrap_or_default().trim().to_string();
        let link = link.unwrap_or_default().trim().to_string();
        if title.is_empty() || link.is_empty() {
            return None;
        }
        Some(FeedEntry {
            title,
            link,
            published,
        })
    }
}

/// Normalize an RSS `pubDate` to ISO 8601.
///
/// Two layouts are understood: `Tue, 10 Jun 2025 14:30:00 GMT` (named zone,
/// giving a zone-less timestamp) and `Tue, 10 Jun 2025 14:30:00 +0200`
/// (numeric offset, which is kept). The weekday must be a weekday name but
/// is not checked against the date. Anything else yields `None`.
pub fn normalize_rss_date(raw: &str) -> Option<String> {
    let (weekday, rest) = raw.trim().split_once(", ")?;
    weekday.parse::<Weekday>().ok()?;
    let rest = rest.trim();

    if let Some((stamp, zone)) = rest.rsplit_once(' ') {
        if NAMED_ZONES.iter().any(|z| z.eq_ignore_ascii_case(zone)) {
            return NaiveDateTime::parse_from_str(stamp, "%d %b %Y %H:%M:%S")
                .ok()
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }

    DateTime::parse_from_str(rest, "%d %b %Y %H:%M:%S %z")
        .ok()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string())
}
