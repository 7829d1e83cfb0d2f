//! Minimal element tree built from a quick-xml event stream.
//!
//! The reader runs with end-name checking disabled so that a mismatched
//! closing tag is recorded as a violation and reading continues; this lets a
//! single pass report every well-formedness problem it can recover from.
//! Element and attribute names are stored by local name (namespace prefix
//! dropped) except for `xml:*` attributes, which keep their prefix.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ParseViolation;

#[derive(Debug, Clone, Default)]
pub(crate) struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value, trimmed, with empty treated as absent.
    pub fn attr_value(&self, key: &str) -> Option<String> {
        self.attr(key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn trimmed_text(&self) -> Option<String> {
        let t = self.text.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    }
}

/// Result of reading a document: the root (possibly partial) plus any
/// well-formedness violations.
pub(crate) struct XmlTree {
    pub root: Option<Element>,
    pub violations: Vec<ParseViolation>,
}

pub(crate) fn read_tree(text: &str) -> XmlTree {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut violations = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf);
        let pos = reader.buffer_position() as u64;
        match event {
            Ok(Event::Start(ref e)) => {
                stack.push(start_element(e, &mut violations, pos));
            }
            Ok(Event::Empty(ref e)) => {
                let el = start_element(e, &mut violations, pos);
                close_into(&mut stack, &mut root, el, &mut violations, pos);
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match stack.iter().rposition(|el| el.name == name) {
                    Some(idx) => {
                        if idx != stack.len() - 1 {
                            let open = &stack[stack.len() - 1].name;
                            violations.push(ParseViolation::malformed(
                                format!("closing tag </{name}> does not match open <{open}>"),
                                pos,
                            ));
                        }
                        while stack.len() > idx {
                            if let Some(el) = stack.pop() {
                                close_into(&mut stack, &mut root, el, &mut violations, pos);
                            }
                        }
                    }
                    None => {
                        violations.push(ParseViolation::malformed(
                            format!("closing tag </{name}> has no matching open tag"),
                            pos,
                        ));
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                let raw = String::from_utf8_lossy(e);
                push_text(&mut stack, &raw, &mut violations, pos);
            }
            Ok(Event::CData(e)) => {
                let raw = String::from_utf8_lossy(&e.into_inner()).to_string();
                push_text(&mut stack, &raw, &mut violations, pos);
            }
            Ok(Event::GeneralRef(ref e)) => {
                let name = String::from_utf8_lossy(e).to_string();
                match resolve_entity(&name) {
                    Some(s) => push_text(&mut stack, &s, &mut violations, pos),
                    None => violations.push(ParseViolation::malformed(
                        format!("unknown entity &{name};"),
                        pos,
                    )),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                violations.push(ParseViolation::malformed(
                    e.to_string(),
                    reader.error_position() as u64,
                ));
                break;
            }
            // Declarations, comments, processing instructions, doctype.
            Ok(_) => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        let names: Vec<String> = stack.iter().map(|e| format!("<{}>", e.name)).collect();
        violations.push(ParseViolation::malformed(
            format!(
                "document ended inside <{}> (unclosed: {})",
                open.name,
                names.join(" ")
            ),
            text.len() as u64,
        ));
        // Keep whatever was read so structural checks can still run.
        while let Some(el) = stack.pop() {
            match stack.last_mut() {
                Some(parent) => parent.children.push(el),
                None => {
                    if root.is_none() {
                        root = Some(el);
                    }
                }
            }
        }
    }

    XmlTree { root, violations }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

/// Duplicate and unquoted attributes are recorded as violations and left out.
fn start_element(e: &BytesStart<'_>, violations: &mut Vec<ParseViolation>, pos: u64) -> Element {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = match attr {
            Ok(attr) => attr,
            Err(err) => {
                violations.push(ParseViolation::malformed(
                    format!("bad attribute on <{}>: {err}", local_name(e)),
                    pos,
                ));
                continue;
            }
        };
        let full = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let key = if full.starts_with("xml:") {
            full
        } else {
            String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string()
        };
        let raw = String::from_utf8_lossy(&attr.value).to_string();
        let value = match quick_xml::escape::unescape(&raw) {
            Ok(v) => v.into_owned(),
            Err(_) => raw,
        };
        attrs.push((key, value));
    }
    Element {
        name: local_name(e),
        attrs,
        text: String::new(),
        children: Vec::new(),
    }
}

fn close_into(
    stack: &mut [Element],
    root: &mut Option<Element>,
    el: Element,
    violations: &mut Vec<ParseViolation>,
    pos: u64,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None => {
            if root.is_none() {
                *root = Some(el);
            } else {
                violations.push(ParseViolation::malformed(
                    format!("second root element <{}>", el.name),
                    pos,
                ));
            }
        }
    }
}

fn push_text(stack: &mut [Element], text: &str, violations: &mut Vec<ParseViolation>, pos: u64) {
    match stack.last_mut() {
        Some(el) => el.text.push_str(text),
        None => {
            let stray = text.trim();
            if !stray.is_empty() {
                let excerpt: String = stray.chars().take(24).collect();
                violations.push(ParseViolation::malformed(
                    format!("text outside the root element: {excerpt:?}"),
                    pos,
                ));
            }
        }
    }
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let s = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        _ => return None,
    };
    Some(s.to_string())
}
