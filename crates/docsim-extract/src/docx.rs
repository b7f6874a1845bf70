use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Text of every non-blank body-level `<w:p>` paragraph in
/// `word/document.xml`, one paragraph per line. Table cells are skipped.
pub fn read_docx(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open DOCX: {}", path.display()))?;
    let mut archive =
        zip::ZipArchive::new(file).with_context(|| format!("Failed to read DOCX as ZIP: {}", path.display()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .with_context(|| format!("DOCX missing word/document.xml: {}", path.display()))?
        .read_to_string(&mut xml)
        .context("Failed to read document.xml from DOCX")?;

    Ok(paragraphs(&xml).join("\n"))
}

/// Find the next opening tag named exactly `name` at or after `from`.
/// Returns (tag start, index just past `>`, self-closing).
fn find_open_tag(xml: &str, name: &str, from: usize) -> Option<(usize, usize, bool)> {
    let needle = format!("<{name}");
    let mut pos = from;
    while let Some(rel) = xml[pos..].find(&needle) {
        let start = pos + rel;
        let after = start + needle.len();
        match xml[after..].chars().next() {
            Some('>') | Some('/') | Some(' ') | Some('\t') | Some('\n') | Some('\r') => {
                let close = after + xml[after..].find('>')?;
                let self_closing = xml[..close].ends_with('/');
                return Some((start, close + 1, self_closing));
            }
            _ => pos = after,
        }
    }
    None
}

/// Index just past the `</w:tbl>` closing the table opened at `open_end`.
fn skip_table(xml: &str, open_end: usize) -> usize {
    let mut depth = 1;
    let mut pos = open_end;
    while depth > 0 {
        let close = xml[pos..].find("</w:tbl>").map(|c| pos + c);
        match (find_open_tag(xml, "w:tbl", pos), close) {
            (Some((start, end, self_closing)), Some(close)) if start < close => {
                if !self_closing {
                    depth += 1;
                }
                pos = end;
            }
            (_, Some(close)) => {
                depth -= 1;
                pos = close + "</w:tbl>".len();
            }
            (_, None) => return xml.len(),
        }
    }
    pos
}

fn paragraphs(xml: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut pos = 0;
    let mut next_table = find_open_tag(xml, "w:tbl", 0);
    while let Some((start, body_start, self_closing)) = find_open_tag(xml, "w:p", pos) {
        if let Some((tbl_start, tbl_end, tbl_self_closing)) = next_table {
            if tbl_start < start {
                pos = if tbl_self_closing { tbl_end } else { skip_table(xml, tbl_end) };
                next_table = find_open_tag(xml, "w:tbl", pos);
                continue;
            }
        }
        if self_closing {
            pos = body_start;
            continue;
        }
        let body_end = xml[body_start..].find("</w:p>").map_or(xml.len(), |e| body_start + e);
        let text = runs(&xml[body_start..body_end]);
        if !text.trim().is_empty() {
            out.push(text);
        }
        pos = (body_end + "</w:p>".len()).min(xml.len());
    }
    out
}

fn runs(paragraph: &str) -> String {
    let mut text = String::new();
    let mut pos = 0;
    while let Some((_, body_start, self_closing)) = find_open_tag(paragraph, "w:t", pos) {
        if self_closing {
            pos = body_start;
            continue;
        }
        match paragraph[body_start..].find("</w:t>") {
            Some(end) => {
                text.push_str(&decode_entities(&paragraph[body_start..body_start + end]));
                pos = body_start + end + "</w:t>".len();
            }
            None => break,
        }
    }
    text
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi + 1))
        });
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
