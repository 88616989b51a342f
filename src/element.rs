use crate::document::{Document, Node};
use crate::error::{Error, Result};

/// The data of an element, stored in [`Document`].
#[derive(Debug)]
pub(crate) struct ElementData {
    name: String,
    attributes: Vec<(String, String)>, // preserved verbatim, in document order
    parent: Option<Element>,
    children: Vec<Node>,
}

/// Represents an XML element.
///
/// This struct only contains a unique usize id and implements trait `Copy`.
/// So you do not need to bother with having a reference.
///
/// Because the actual data of the element is stored in [`Document`],
/// most methods take `&Document` or `&mut Document` as their first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    id: usize,
}

impl Element {
    /// Create a new empty element with name.
    pub fn new<S: Into<String>>(document: &mut Document, name: S) -> Element {
        Self::with_data(document, name.into(), Vec::new())
    }

    pub(crate) fn with_data(
        document: &mut Document,
        name: String,
        attributes: Vec<(String, String)>,
    ) -> Element {
        let elem = Element {
            id: document.counter,
        };
        let elem_data = ElementData {
            name,
            attributes,
            parent: None,
            children: vec![],
        };
        document.store.push(elem_data);
        document.counter += 1;
        elem
    }

    pub(crate) fn container() -> (Element, ElementData) {
        let elem_data = ElementData {
            name: String::new(),
            attributes: Vec::new(),
            parent: None,
            children: Vec::new(),
        };
        let elem = Element { id: 0 };
        (elem, elem_data)
    }

    /// The container element is a hidden element that parents the root node(s).
    /// It is not part of the document tree proper.
    pub fn is_container(&self) -> bool {
        self.id == 0
    }
}

impl Element {
    fn data<'a>(&self, document: &'a Document) -> &'a ElementData {
        document.store.get(self.id).unwrap()
    }

    fn mut_data<'a>(&self, document: &'a mut Document) -> &'a mut ElementData {
        document.store.get_mut(self.id).unwrap()
    }

    /// Get the tag name of the element.
    pub fn name<'a>(&self, document: &'a Document) -> &'a str {
        &self.data(document).name
    }

    /// Get attributes of the element, in document order.
    ///
    /// Attributes take no part in the record model; they are carried along
    /// so that opening and saving a document does not lose them.
    pub fn attributes<'a>(&self, document: &'a Document) -> &'a [(String, String)] {
        &self.data(document).attributes
    }

    pub fn parent(&self, document: &Document) -> Option<Element> {
        self.data(document).parent
    }

    /// ```ignore
    /// self.parent(document).is_some()
    /// ```
    pub fn has_parent(&self, document: &Document) -> bool {
        self.parent(document).is_some()
    }

    pub fn children<'a>(&self, document: &'a Document) -> &'a Vec<Node> {
        &self.data(document).children
    }

    /// ```ignore
    /// !self.children(document).is_empty()
    /// ```
    pub fn has_children(&self, document: &Document) -> bool {
        !self.children(document).is_empty()
    }

    /// Child nodes that are elements, in document order.
    pub fn child_elements(&self, document: &Document) -> Vec<Element> {
        self.children(document)
            .iter()
            .filter_map(|node| {
                if let Node::Element(elemid) = node {
                    Some(*elemid)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Content of the first text child, if there is one.
    ///
    /// `<tag></tag>` parses with an empty text child, so for leaf elements
    /// coming from a parsed document this is `Some("")` rather than `None`.
    pub fn text<'a>(&self, document: &'a Document) -> Option<&'a str> {
        self.children(document).iter().find_map(|node| {
            if let Node::Text(text) = node {
                Some(text.as_str())
            } else {
                None
            }
        })
    }

    /// Replace the content of the first text child, or push a new text child
    /// if the element has none.
    pub fn set_text<S: Into<String>>(&self, document: &mut Document, text: S) {
        let children = &mut self.mut_data(document).children;
        for node in children.iter_mut() {
            if let Node::Text(content) = node {
                *content = text.into();
                return;
            }
        }
        children.push(Node::Text(text.into()));
    }

    /// Equivalent to `vec.push()`.
    ///
    /// # Errors
    ///
    /// - [`Error::HasAParent`]: If node is an element, it must not have a parent.
    /// Call `elem.detach()` before.
    pub fn push_child(&self, document: &mut Document, node: Node) -> Result<()> {
        if let Node::Element(elem) = node {
            if elem.is_container() {
                return Err(Error::ContainerCannotMove);
            }
            let data = elem.mut_data(document);
            if data.parent.is_some() {
                return Err(Error::HasAParent);
            }
            data.parent = Some(*self);
        }
        self.mut_data(document).children.push(node);
        Ok(())
    }

    /// Remove child element by value.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`]: Element was not found among its children.
    pub fn remove_child_elem(&self, document: &mut Document, element: Element) -> Result<()> {
        let children = &mut self.mut_data(document).children;
        let pos = children
            .iter()
            .filter_map(|n| {
                if let Node::Element(elem) = &n {
                    Some(*elem)
                } else {
                    None
                }
            })
            .position(|e| e == element)
            .ok_or(Error::NotFound)?;
        children.remove(pos);
        element.mut_data(document).parent = None;
        Ok(())
    }

    pub fn detach(&self, document: &mut Document) -> Result<()> {
        if self.is_container() {
            return Err(Error::ContainerCannotMove);
        }
        let parent = self.data(document).parent;
        if let Some(parent) = parent {
            parent.remove_child_elem(document, *self)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, Node};
    use crate::document::Document;

    #[test]
    fn test_children() {
        let xml = r#"<Productos>
            <Producto>
                <Nombre>Rosa</Nombre>
                <Precio>1</Precio>
            </Producto>
            <Producto>
                <Nombre>Lirio</Nombre>
                <Precio>2</Precio>
            </Producto>
        </Productos>"#;
        let doc = Document::parse_str(xml).unwrap();
        let root = doc.root_element().unwrap();
        assert_eq!(root.name(&doc), "Productos");
        let records = root.child_elements(&doc);
        assert_eq!(records.len(), 2);
        let fields = records[0].child_elements(&doc);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name(&doc), "Nombre");
        assert_eq!(fields[0].text(&doc), Some("Rosa"));
        assert_eq!(fields[1].text(&doc), Some("1"));
    }

    #[test]
    fn test_set_text() {
        let xml = "<a><b>old</b><c/></a>";
        let mut doc = Document::parse_str(xml).unwrap();
        let root = doc.root_element().unwrap();
        let children = root.child_elements(&doc);
        children[0].set_text(&mut doc, "new");
        assert_eq!(children[0].text(&doc), Some("new"));
        // <c/> has no text child until one is set
        assert_eq!(children[1].text(&doc), None);
        children[1].set_text(&mut doc, "filled");
        assert_eq!(children[1].text(&doc), Some("filled"));
    }

    #[test]
    fn test_push_and_remove_child() {
        let mut doc = Document::parse_str("<a><b/></a>").unwrap();
        let root = doc.root_element().unwrap();
        let b = root.child_elements(&doc)[0];
        let c = Element::new(&mut doc, "c");
        root.push_child(&mut doc, Node::Element(c)).unwrap();
        assert_eq!(c.parent(&doc).unwrap(), root);
        assert_eq!(root.child_elements(&doc), vec![b, c]);

        root.remove_child_elem(&mut doc, b).unwrap();
        assert_eq!(root.child_elements(&doc), vec![c]);
        assert!(!b.has_parent(&doc));
        // already removed
        assert!(root.remove_child_elem(&mut doc, b).is_err());
    }
}
