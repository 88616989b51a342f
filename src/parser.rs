use crate::document::{Document, Node};
use crate::element::Element;
use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::Reader;

/// Figure out the document encoding and decode the whole buffer to UTF-8.
///
/// Record files are small, so the buffer is decoded in one go rather than
/// through a streaming decoder.
fn decode(bytes: &[u8]) -> Result<String> {
    // BOMs and UTF-16 byte patterns first: the declaration cannot be read
    // before the document is decoded.
    let (encoding, offset) = match bytes {
        [0xfe, 0xff, ..] => (UTF_16BE, 2),
        [0xff, 0xfe, ..] => (UTF_16LE, 2),
        [0xef, 0xbb, 0xbf, ..] => (UTF_8, 3),
        [0x00, 0x3c, ..] => (UTF_16BE, 0),
        [0x3c, 0x00, ..] => (UTF_16LE, 0),
        _ => (declared_encoding(bytes).unwrap_or(UTF_8), 0),
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[offset..]);
    if had_errors {
        return Err(Error::CannotDecode);
    }
    Ok(text.into_owned())
}

/// Encoding named by the XML declaration, if the document starts with one.
///
/// The declaration itself is ASCII, so it can be scanned before the
/// encoding it names is known.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let mut reader = Reader::from_reader(bytes);
    reader.trim_text(true);
    let mut buf = Vec::with_capacity(150);
    if let Ok(Event::Decl(ev)) = reader.read_event(&mut buf) {
        if let Some(Ok(label)) = ev.encoding() {
            return Encoding::for_label(&label);
        }
    }
    None
}

pub(crate) struct DocumentParser {
    document: Document,
}

impl DocumentParser {
    pub(crate) fn parse_bytes(bytes: &[u8]) -> Result<Document> {
        let text = decode(bytes)?;
        let mut parser = DocumentParser {
            document: Document::new(),
        };
        let reader = Reader::from_str(&text);
        parser.parse_content(reader)?;
        if parser.document.root_element().is_none() {
            return Err(Error::MalformedXML(
                "Document has no root element".to_string(),
            ));
        }
        Ok(parser.document)
    }

    fn handle_decl(&mut self, ev: &BytesDecl) -> Result<()> {
        self.document.version = String::from_utf8(ev.version()?.to_vec())?;
        self.document.standalone = match ev.standalone() {
            Some(res) => {
                let val = std::str::from_utf8(&*res?)?.to_lowercase();
                if val == "yes" {
                    true
                } else if val == "no" {
                    false
                } else {
                    return Err(Error::MalformedXML(
                        "Standalone Document Declaration has non boolean value".to_string(),
                    ));
                }
            }
            None => false,
        };
        Ok(())
    }

    fn handle_bytes_start(
        &mut self,
        element_stack: &[Element],
        ev: &BytesStart,
    ) -> Result<Element> {
        let mut_doc = &mut self.document;
        let name = String::from_utf8(ev.name().to_vec())?;
        let mut attributes = Vec::new();
        for attr in ev.attributes() {
            let attr = attr?;
            let key = String::from_utf8(attr.key.to_vec())?;
            let value = String::from_utf8(attr.unescaped_value()?.to_vec())?;
            attributes.push((key, value));
        }
        let element = Element::with_data(mut_doc, name, attributes);
        let parent = *element_stack.last().unwrap();
        parent.push_child(mut_doc, Node::Element(element)).unwrap();
        Ok(element)
    }

    // Returns whether document parsing is finished.
    fn handle_event(&mut self, element_stack: &mut Vec<Element>, event: Event) -> Result<bool> {
        let mut_doc = &mut self.document;
        match event {
            Event::Start(ref ev) => {
                let element = self.handle_bytes_start(element_stack, ev)?;
                element_stack.push(element);
                Ok(false)
            }
            Event::End(_) => {
                let elem = element_stack.pop().unwrap(); // quick-xml checks if tag names match for us
                // distinguish <tag></tag> from <tag />
                if !elem.has_children(mut_doc) {
                    elem.push_child(mut_doc, Node::Text(String::new())).unwrap();
                }
                Ok(false)
            }
            Event::Empty(ref ev) => {
                self.handle_bytes_start(element_stack, ev)?;
                Ok(false)
            }
            Event::Text(ev) => {
                let content = String::from_utf8(ev.unescaped()?.to_vec())?;
                let elem = *element_stack.last().unwrap();
                elem.push_child(mut_doc, Node::Text(content)).unwrap();
                Ok(false)
            }
            // CData content is not escaped; fold it into text.
            Event::CData(ev) => {
                let content = String::from_utf8(ev.to_vec())?;
                let elem = *element_stack.last().unwrap();
                elem.push_child(mut_doc, Node::Text(content)).unwrap();
                Ok(false)
            }
            // Comments, processing instructions and doctypes take no part
            // in the record model and are dropped on read.
            Event::Comment(_) | Event::PI(_) | Event::DocType(_) => Ok(false),
            Event::Decl(ev) => {
                self.handle_decl(&ev)?;
                Ok(false)
            }
            Event::Eof => {
                if element_stack.len() > 1 {
                    let elem = *element_stack.last().unwrap();
                    return Err(Error::MalformedXML(format!(
                        "Missing closing tag for {}",
                        elem.name(mut_doc)
                    )));
                }
                Ok(true)
            }
        }
    }

    fn parse_content<B: std::io::BufRead>(&mut self, mut reader: Reader<B>) -> Result<()> {
        reader.trim_text(true);
        let mut buf = Vec::with_capacity(200);
        let mut element_stack: Vec<Element> = vec![self.document.container()];

        loop {
            let ev = reader.read_event(&mut buf)?;
            if self.handle_event(&mut element_stack, ev)? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DocumentParser;
    use crate::error::Error;

    fn utf16le_with_bom(xml: &str) -> Vec<u8> {
        let mut bytes = vec![0xff, 0xfe];
        for unit in xml.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_utf16_bom() {
        let bytes = utf16le_with_bom(r#"<?xml version="1.0"?><r><v>hola</v></r>"#);
        let doc = DocumentParser::parse_bytes(&bytes).unwrap();
        let root = doc.root_element().unwrap();
        let v = root.child_elements(&doc)[0];
        assert_eq!(v.text(&doc), Some("hola"));
    }

    #[test]
    fn test_declared_encoding() {
        let mut bytes =
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><r><v>caf".to_vec();
        bytes.push(0xe9); // 'e' acute in latin-1, invalid on its own in utf-8
        bytes.extend_from_slice(b"</v></r>");
        let doc = DocumentParser::parse_bytes(&bytes).unwrap();
        let root = doc.root_element().unwrap();
        let v = root.child_elements(&doc)[0];
        assert_eq!(v.text(&doc), Some("caf\u{e9}"));
    }

    #[test]
    fn test_undecodable() {
        let bytes = b"<r>\xff\xfe\xff</r>";
        assert!(matches!(
            DocumentParser::parse_bytes(bytes).unwrap_err(),
            Error::CannotDecode
        ));
    }

    #[test]
    fn test_no_root() {
        let err = DocumentParser::parse_bytes(b"<?xml version=\"1.0\"?>").unwrap_err();
        assert!(matches!(err, Error::MalformedXML(_)));
    }

    #[test]
    fn test_missing_closing_tag() {
        let err = DocumentParser::parse_bytes(b"<img>").unwrap_err();
        assert!(matches!(err, Error::MalformedXML(_)));
    }

    #[test]
    fn test_comments_dropped() {
        let doc = DocumentParser::parse_bytes(b"<r><!-- note --><v>1</v></r>").unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.children(&doc).len(), 1);
    }
}
