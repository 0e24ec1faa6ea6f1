//! Sitemap XML parser.
//!
//! Handles the two sitemap protocol shapes:
//!
//! ```text
//! <sitemapindex><sitemap><loc>…</loc></sitemap>…</sitemapindex>
//! <urlset><url><loc>…</loc></url>…</urlset>
//! ```
//!
//! Element names are matched on their local name, case-insensitively, so
//! namespace prefixes and odd casing do not matter. Only `loc` elements that
//! are direct children of an entry directly under the root count.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ParseError, ParseResult};
use crate::types::sitemap::SitemapNode;

#[derive(Clone, Copy, PartialEq, Eq)]
enum RootKind {
    Index,
    UrlSet,
    Other,
}

impl RootKind {
    fn entry_name(self) -> Option<&'static str> {
        match self {
            RootKind::Index => Some("sitemap"),
            RootKind::UrlSet => Some("url"),
            RootKind::Other => None,
        }
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// Parse a sitemap document.
///
/// Returns the `loc` values trimmed, with blanks dropped. Duplicates are kept;
/// deduplication is the resolver's job.
pub fn parse_sitemap(bytes: &[u8]) -> ParseResult<SitemapNode> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut root: Option<(RootKind, String)> = None;
    let mut locs: Vec<String> = Vec::new();
    let mut current_loc: Option<String> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ParseError::Malformed {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;

        match event {
            Event::Start(ref e) => {
                let name = local_name(e.local_name().as_ref());

                if root.is_none() {
                    let kind = match name.as_str() {
                        "sitemapindex" => RootKind::Index,
                        "urlset" => RootKind::UrlSet,
                        _ => RootKind::Other,
                    };
                    root = Some((kind, name.clone()));
                } else if let Some((kind, _)) = &root {
                    // root / entry / loc
                    if stack.len() == 2
                        && name == "loc"
                        && kind.entry_name() == Some(stack[1].as_str())
                    {
                        current_loc = Some(String::new());
                    }
                }

                stack.push(name);
            }
            Event::Empty(ref e) => {
                if root.is_none() {
                    let name = local_name(e.local_name().as_ref());
                    let kind = match name.as_str() {
                        "sitemapindex" => RootKind::Index,
                        "urlset" => RootKind::UrlSet,
                        _ => RootKind::Other,
                    };
                    root = Some((kind, name));
                }
            }
            Event::Text(ref e) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = e.unescape().map_err(|err| ParseError::Malformed {
                        position: reader.buffer_position() as u64,
                        message: err.to_string(),
                    })?;
                    loc.push_str(&text);
                }
            }
            Event::CData(ref e) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(e));
                }
            }
            Event::End(_) => {
                if let Some(name) = stack.pop() {
                    if name == "loc" {
                        if let Some(loc) = current_loc.take() {
                            let trimmed = loc.trim();
                            if !trimmed.is_empty() {
                                locs.push(trimmed.to_string());
                            }
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::Truncated { element: open });
    }

    match root {
        Some((RootKind::Index, _)) => Ok(SitemapNode::Index(locs)),
        Some((RootKind::UrlSet, _)) => Ok(SitemapNode::UrlList(locs)),
        Some((RootKind::Other, name)) => Ok(SitemapNode::Unrecognized(name)),
        None => Err(ParseError::NoRoot),
    }
}
