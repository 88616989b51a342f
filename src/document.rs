use crate::element::{Element, ElementData};
use crate::error::Result;
use crate::parser::DocumentParser;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// A node of the document tree.
///
/// The flat record model only keeps elements and text. Comments, processing
/// instructions and doctypes are dropped on read, and CDATA folds into text.
#[derive(Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<Element> {
        match self {
            Self::Element(elem) => Some(*elem),
            _ => None,
        }
    }
}

/// Represents an XML document.
///
/// Use [`Document::parse_str`], [`Document::parse_reader`] or
/// [`Document::parse_file`] to parse xml.
///
/// # Examples
/// ```
/// use xml_records::Document;
///
/// let mut doc = Document::parse_str(
///     "<Productos>
///         <Producto>
///             <Nombre>Rosa</Nombre>
///             <Precio>1</Precio>
///         </Producto>
///     </Productos>",
/// )
/// .unwrap();
/// let producto = doc.root_element().unwrap().child_elements(&doc)[0];
/// let nombre = producto.child_elements(&doc)[0];
/// nombre.set_text(&mut doc, "Lirio");
/// let xml = doc.write_str().unwrap();
/// assert!(xml.contains("<Nombre>Lirio</Nombre>"));
/// ```
#[derive(Debug)]
pub struct Document {
    pub(crate) counter: usize, // == self.store.len()
    pub(crate) store: Vec<ElementData>,
    container: Element,

    pub(crate) version: String,
    pub(crate) standalone: bool,
}

impl Document {
    /// Create a blank new xml document.
    pub fn new() -> Document {
        let (container, container_data) = Element::container();
        Document {
            counter: 1, // because container is id 0
            store: vec![container_data],
            container,
            version: "1.0".to_string(),
            standalone: false,
        }
    }

    pub fn container(&self) -> Element {
        self.container
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 1
    }

    /// Get the first top-level element of the document.
    pub fn root_element(&self) -> Option<Element> {
        self.container.child_elements(self).get(0).copied()
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

// Read and write
impl Document {
    /// Parses an xml string.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::MalformedXML`]: Could not read XML.
    pub fn parse_str(str: &str) -> Result<Document> {
        DocumentParser::parse_bytes(str.as_bytes())
    }

    /// Parses xml from a reader. The input is read fully into memory,
    /// then its encoding is sniffed and the buffer decoded before parsing.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::CannotDecode`]: Could not decode XML.
    /// - [`crate::Error::MalformedXML`]: Could not read XML.
    /// - [`crate::Error::Io`]: IO Error
    pub fn parse_reader<R: Read>(mut reader: R) -> Result<Document> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        DocumentParser::parse_bytes(&bytes)
    }

    /// Parses the xml file at `path`.
    ///
    /// # Errors
    ///
    /// Returns errors from [`Document::parse_reader`].
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
        let bytes = std::fs::read(path)?;
        DocumentParser::parse_bytes(&bytes)
    }

    /// Writes document as an xml string.
    pub fn write_str(&self) -> Result<String> {
        let mut buf: Vec<u8> = Vec::with_capacity(200);
        self.write(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Write document to writer, indented, in UTF-8.
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        let container = self.container();
        let mut writer = Writer::new_with_indent(writer, b' ', 4);
        self.write_decl(&mut writer)?;
        self.write_nodes(&mut writer, container.children(self))?;
        writer.write_event(Event::Eof)?;
        Ok(())
    }

    /// Write document to the file at `path`, overwriting it.
    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        self.write(&mut file)?;
        Ok(())
    }

    fn write_decl(&self, writer: &mut Writer<impl Write>) -> Result<()> {
        let standalone = match self.standalone {
            true => Some("yes".as_bytes()),
            false => None,
        };
        writer.write_event(Event::Decl(BytesDecl::new(
            self.version.as_bytes(),
            Some("UTF-8".as_bytes()),
            standalone,
        )))?;
        Ok(())
    }

    fn write_nodes(&self, writer: &mut Writer<impl Write>, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Element(eid) => self.write_element(writer, *eid)?,
                Node::Text(text) => {
                    writer.write_event(Event::Text(BytesText::from_plain_str(text)))?
                }
            };
        }
        Ok(())
    }

    fn write_element(&self, writer: &mut Writer<impl Write>, element: Element) -> Result<()> {
        let name_bytes = element.name(self).as_bytes();
        let mut start = BytesStart::borrowed_name(name_bytes);
        for (key, val) in element.attributes(self) {
            start.push_attribute((key.as_bytes(), val.as_bytes()));
        }
        if element.has_children(self) {
            writer.write_event(Event::Start(start))?;
            self.write_nodes(writer, element.children(self))?;
            writer.write_event(Event::End(BytesEnd::borrowed(name_bytes)))?;
        } else {
            writer.write_event(Event::Empty(start))?;
        }
        Ok(())
    }
}
