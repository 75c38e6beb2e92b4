use super::*;
use std::collections::HashMap;

pub(crate) fn parse_document(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let root = dom.root;
    parse_into(&mut dom, root, html, true)?;
    dom.rebuild_id_index();
    Ok(dom)
}

pub(crate) fn parse_fragment_into(dom: &mut Dom, parent: NodeId, html: &str) -> Result<()> {
    parse_into(dom, parent, html, false)
}

// In document mode every piece of top-level content hangs off a single
// `html` document element (created on demand when the markup does not open
// one), so that derived `html > ...` selector paths re-resolve against any
// fixture. The document element itself never sits on the open-tag stack and
// so cannot be destroyed by a stray end tag.
fn parse_into(dom: &mut Dom, base: NodeId, html: &str, document_mode: bool) -> Result<()> {
    let mut stack = vec![base];
    let mut doc_element: Option<NodeId> = None;
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            if let Some(end) = find_subslice(bytes, i + 4, b"-->") {
                i = end + 3;
            } else {
                return Err(Error::HtmlParse("unclosed HTML comment".into()));
            }
            continue;
        }

        if starts_with_at(bytes, i, b"<!") {
            // Doctype or other markup declaration.
            while i < bytes.len() && bytes[i] != b'>' {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(Error::HtmlParse("unclosed markup declaration".into()));
            }
            i += 1;
            continue;
        }

        if bytes[i] == b'<' {
            if starts_with_at(bytes, i, b"</") {
                let (tag, next) = parse_end_tag(html, i)?;
                i = next;

                while stack.len() > 1 {
                    let top = *stack
                        .last()
                        .ok_or_else(|| Error::HtmlParse("invalid stack state".into()))?;
                    let top_tag = dom.tag_name(top).unwrap_or("");
                    stack.pop();
                    if top_tag.eq_ignore_ascii_case(&tag) {
                        break;
                    }
                }
                continue;
            }

            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            if document_mode && stack.len() == 1 && tag == "html" {
                match doc_element {
                    Some(existing) => {
                        if let Some(element) = dom.element_mut(existing) {
                            element.attrs.extend(attrs);
                        }
                    }
                    None => {
                        doc_element = Some(dom.create_element(base, tag, attrs));
                    }
                }
                continue;
            }

            let parent = if document_mode && stack.len() == 1 {
                content_parent(dom, base, &mut doc_element)
            } else {
                *stack
                    .last()
                    .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?
            };
            let node = dom.create_element(parent, tag.clone(), attrs);

            if is_raw_text_tag(&tag) {
                let close = find_case_insensitive_end_tag(bytes, i, tag.as_bytes())
                    .ok_or_else(|| Error::HtmlParse(format!("unclosed <{tag}>")))?;
                if let Some(body) = html.get(i..close) {
                    if !body.is_empty() {
                        dom.create_text(node, body.to_string());
                    }
                }
                i = close;
                let (_, after_end) = parse_end_tag(html, i)?;
                i = after_end;
                continue;
            }

            if !self_closing && !is_void_tag(&tag) {
                stack.push(node);
            }
            continue;
        }

        let text_start = i;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }

        if let Some(text) = html.get(text_start..i) {
            if !text.is_empty() {
                if document_mode && stack.len() == 1 {
                    if doc_element.is_none() && text.trim().is_empty() {
                        continue;
                    }
                    let parent = content_parent(dom, base, &mut doc_element);
                    dom.create_text(parent, text.to_string());
                } else {
                    let parent = *stack
                        .last()
                        .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
                    dom.create_text(parent, text.to_string());
                }
            }
        }
    }

    Ok(())
}

fn content_parent(dom: &mut Dom, base: NodeId, doc_element: &mut Option<NodeId>) -> NodeId {
    if let Some(existing) = *doc_element {
        return existing;
    }
    let created = dom.create_element(base, "html".to_string(), HashMap::new());
    *doc_element = Some(created);
    created
}

fn parse_start_tag(html: &str, at: usize) -> Result<(String, HashMap<String, String>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;
    if bytes.get(i) != Some(&b'<') {
        return Err(Error::HtmlParse("expected '<'".into()));
    }
    i += 1;

    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }

    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid tag name".into()))?
        .to_ascii_lowercase();

    if tag.is_empty() {
        return Err(Error::HtmlParse("empty tag name".into()));
    }

    let mut attrs = HashMap::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(Error::HtmlParse("unclosed start tag".into()));
        }

        if bytes[i] == b'>' {
            i += 1;
            break;
        }

        if bytes[i] == b'/' {
            self_closing = true;
            i += 1;
            skip_ws(bytes, &mut i);
            if bytes.get(i) != Some(&b'>') {
                return Err(Error::HtmlParse("expected '>' after '/'".into()));
            }
            i += 1;
            break;
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if name_start == i {
            return Err(Error::HtmlParse(format!("invalid attribute in <{tag}>")));
        }
        let name = html
            .get(name_start..i)
            .ok_or_else(|| Error::HtmlParse("invalid attribute name".into()))?
            .to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        if bytes.get(i) != Some(&b'=') {
            attrs.insert(name, String::new());
            continue;
        }
        i += 1;
        skip_ws(bytes, &mut i);

        let value = if matches!(bytes.get(i), Some(b'"') | Some(b'\'')) {
            let quote = bytes[i];
            i += 1;
            let value_start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(Error::HtmlParse("unclosed attribute value".into()));
            }
            let value = html
                .get(value_start..i)
                .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?
                .to_string();
            i += 1;
            value
        } else {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                i += 1;
            }
            html.get(value_start..i)
                .ok_or_else(|| Error::HtmlParse("invalid attribute value".into()))?
                .to_string()
        };
        attrs.insert(name, value);
    }

    Ok((tag, attrs, self_closing, i))
}

fn parse_end_tag(html: &str, at: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at;
    if !starts_with_at(bytes, i, b"</") {
        return Err(Error::HtmlParse("expected '</'".into()));
    }
    i += 2;

    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html
        .get(tag_start..i)
        .ok_or_else(|| Error::HtmlParse("invalid end tag".into()))?
        .to_ascii_lowercase();
    if tag.is_empty() {
        return Err(Error::HtmlParse("empty end tag".into()));
    }

    skip_ws(bytes, &mut i);
    if bytes.get(i) != Some(&b'>') {
        return Err(Error::HtmlParse(format!("unclosed end tag </{tag}>")));
    }
    Ok((tag, i + 1))
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_raw_text_tag(tag: &str) -> bool {
    tag == "script" || tag == "style"
}

fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn is_attr_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes.len() >= at + needle.len() && &bytes[at..at + needle.len()] == needle
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || bytes.len() < needle.len() {
        return None;
    }
    (from..=bytes.len() - needle.len()).find(|&i| &bytes[i..i + needle.len()] == needle)
}

fn find_case_insensitive_end_tag(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while i + tag.len() + 2 <= bytes.len() {
        if bytes[i] == b'<' && bytes[i + 1] == b'/' {
            let candidate = &bytes[i + 2..i + 2 + tag.len()];
            if candidate.eq_ignore_ascii_case(tag) {
                return Some(i);
            }
        }
        i += 1;
    }
    None
}
