//! Well-formedness check and element index over a newsitem document.
//!
//! [`Document::parse`] streams the input through `quick-xml` once and keeps a
//! flat, document-order list of every element with its attributes. Character
//! data is stored once, in document order, in a single buffer. Every element
//! records the byte range of that buffer covered by its descendants, so its
//! text content (the way DOM `textContent` reads) is a slice taken on demand.
//! Lookups are document-wide: [`Document::first`] returns the first element
//! with a given tag name in start-tag order, regardless of where it sits in
//! the tree.
//!
//! Anything a browser XML parser would reject is a [`DocumentError`]:
//! syntax errors, mismatched or unclosed elements, a missing root, more than
//! one top-level element, stray text outside the root, undefined entities,
//! characters outside the XML character range, invalid names, and malformed
//! or duplicate attributes.

use std::ops::Range;

use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Why a document failed the well-formedness check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("syntax error at byte {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("element <{tag}> is not closed")]
    Unclosed { tag: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("unexpected <{tag}> after the root element")]
    MultipleRoots { tag: String },

    #[error("text outside the root element at byte {position}")]
    TextOutsideRoot { position: usize },

    #[error("undefined entity &{name};")]
    UndefinedEntity { name: String },

    #[error("character U+{code:04X} is not allowed in XML (byte {position})")]
    InvalidChar { position: usize, code: u32 },

    #[error("invalid name `{name}` at byte {position}")]
    InvalidName { position: usize, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    /// Byte range of the document text buffer covered by this element.
    text: Range<usize>,
}

/// One element of a parsed document, borrowed from it.
#[derive(Debug, Clone, Copy)]
pub struct Element<'a> {
    node: &'a Node,
    text: &'a str,
}

impl<'a> Element<'a> {
    /// Qualified tag name as written in the document.
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// Attribute value by exact name, unescaped and untrimmed.
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of this element and all of its descendants.
    pub fn text(&self) -> &'a str {
        self.text
    }
}

/// A well-formed document flattened into document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
    text: String,
}

impl Document {
    /// Check `xml` for well-formedness and index its elements.
    ///
    /// # Arguments
    ///
    /// * `xml` - The complete document text
    ///
    /// # Returns
    ///
    /// The parsed [`Document`], or the first [`DocumentError`] found.
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut nodes: Vec<Node> = Vec::new();
        let mut text = String::new();
        // indices into `nodes` of the currently open elements
        let mut open: Vec<usize> = Vec::new();
        let mut seen_root = false;

        loop {
            let position = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| DocumentError::Syntax {
                position: reader.buffer_position() as usize,
                message: e.to_string(),
            })?;

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let node = read_node(e, position, text.len())?;
                    if open.is_empty() {
                        if seen_root {
                            return Err(DocumentError::MultipleRoots { tag: node.name });
                        }
                        seen_root = true;
                    }
                    nodes.push(node);
                    if matches!(event, Event::Start(_)) {
                        open.push(nodes.len() - 1);
                    }
                }
                Event::End(ref e) => match open.pop() {
                    Some(idx) => nodes[idx].text.end = text.len(),
                    None => {
                        return Err(DocumentError::Syntax {
                            position,
                            message: format!(
                                "unmatched end tag </{}>",
                                String::from_utf8_lossy(e.name().as_ref())
                            ),
                        });
                    }
                },
                Event::Text(e) => {
                    let decoded = e.decode().map_err(|e| DocumentError::Syntax {
                        position,
                        message: e.to_string(),
                    })?;
                    if decoded.contains("]]>") {
                        return Err(DocumentError::Syntax {
                            position,
                            message: "`]]>` is not allowed in character data".to_string(),
                        });
                    }
                    append_text(&mut text, &open, &decoded, position)?;
                }
                Event::CData(e) => {
                    let decoded = String::from_utf8_lossy(&e);
                    append_text(&mut text, &open, &decoded, position)?;
                }
                Event::GeneralRef(e) => {
                    let raw = e.decode().map_err(|e| DocumentError::Syntax {
                        position,
                        message: e.to_string(),
                    })?;
                    let resolved = resolve_entity(&raw, position)?;
                    append_text(&mut text, &open, &resolved, position)?;
                }
                Event::Comment(e) => check_chars(&String::from_utf8_lossy(&e), position)?,
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if let Some(&idx) = open.last() {
            return Err(DocumentError::Unclosed {
                tag: nodes[idx].name.clone(),
            });
        }
        if !seen_root {
            return Err(DocumentError::NoRoot);
        }

        Ok(Self { nodes, text })
    }

    /// First element named `tag` anywhere in the document.
    pub fn first(&self, tag: &str) -> Option<Element<'_>> {
        self.nodes
            .iter()
            .find(|node| node.name == tag)
            .map(|node| Element {
                node,
                text: &self.text[node.text.clone()],
            })
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn read_node(
    start: &BytesStart<'_>,
    position: usize,
    text_at: usize,
) -> Result<Node, DocumentError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    check_name(&name, position)?;
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Syntax {
            position,
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        check_name(&key, position)?;
        if attr.value.contains(&b'<') {
            return Err(DocumentError::Syntax {
                position,
                message: format!("attribute `{key}`: `<` is not allowed in attribute values"),
            });
        }
        let value = attr
            .unescape_value()
            .map_err(|e| DocumentError::Syntax {
                position,
                message: format!("attribute `{key}`: {e}"),
            })?
            .into_owned();
        check_chars(&value, position)?;
        attributes.push((key, value));
    }

    Ok(Node {
        name,
        attributes,
        text: text_at..text_at,
    })
}

fn append_text(
    buffer: &mut String,
    open: &[usize],
    text: &str,
    position: usize,
) -> Result<(), DocumentError> {
    check_chars(text, position)?;
    if open.is_empty() {
        if text.trim().is_empty() {
            return Ok(());
        }
        return Err(DocumentError::TextOutsideRoot { position });
    }
    buffer.push_str(text);
    Ok(())
}

/// XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn is_name_start_char(c: char) -> bool {
    matches!(
        c,
        ':' | 'A'..='Z'
            | '_'
            | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(
            c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

fn check_chars(text: &str, position: usize) -> Result<(), DocumentError> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(DocumentError::InvalidChar {
            position,
            code: c as u32,
        }),
        None => Ok(()),
    }
}

fn check_name(name: &str, position: usize) -> Result<(), DocumentError> {
    let mut chars = name.chars();
    let valid = chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char);
    if valid {
        Ok(())
    } else {
        Err(DocumentError::InvalidName {
            position,
            name: name.to_string(),
        })
    }
}

/// Resolve a predefined or numeric character reference.
fn resolve_entity(raw: &str, position: usize) -> Result<String, DocumentError> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }

    if let Some(rest) = raw.strip_prefix('#') {
        let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => rest.parse::<u32>().ok(),
        };
        let Some(code) = code else {
            return Err(DocumentError::Syntax {
                position,
                message: format!("invalid character reference &{raw};"),
            });
        };
        return char::from_u32(code)
            .filter(|&ch| is_xml_char(ch))
            .map(|ch| ch.to_string())
            .ok_or(DocumentError::InvalidChar { position, code });
    }

    Err(DocumentError::UndefinedEntity {
        name: raw.to_string(),
    })
}
