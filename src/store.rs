use crate::document::{Document, Node};
use crate::element::Element;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// How multi-field search criteria combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Every `(field, value)` pair must match (logical AND).
    All,
    /// At least one `(field, value)` pair must match (logical OR).
    Any,
}

/// A flat, one-level-deep XML document treated as an ad-hoc record store.
///
/// The document's root element holds a sequence of sibling record elements,
/// and each record holds a flat list of named field elements whose sole
/// content is text:
///
/// ```xml
/// <Productos>
///     <Producto>
///         <Nombre>Rosa</Nombre>
///         <Precio>1</Precio>
///     </Producto>
/// </Productos>
/// ```
///
/// Nested elements below the field level are outside this model; they are
/// preserved on save but produce meaningless query results.
///
/// # Record index
///
/// Queries and mutations address records by position in the *record index*,
/// a snapshot of root's direct child elements in document order taken when
/// the store is opened. Structural edits ([`RecordStore::append_record`],
/// [`RecordStore::delete_record`]) do NOT refresh the index; the caller must
/// call [`RecordStore::reindex`] to observe them through index-based
/// operations. This explicit cache-invalidation contract is deliberate.
///
/// # Concurrency
///
/// `RecordStore` is single-threaded and performs no internal locking.
/// Sharing one across threads requires external synchronization.
///
/// # Examples
/// ```
/// use xml_records::RecordStore;
///
/// let mut store = RecordStore::parse_str(
///     "<Productos>
///         <Producto>
///             <Nombre>Rosa</Nombre>
///             <Precio>1</Precio>
///         </Producto>
///     </Productos>",
/// )
/// .unwrap();
/// assert_eq!(store.summaries(), vec!["Rosa-1"]);
/// assert_eq!(store.find_first("Nombre", "Rosa"), Some(0));
/// store.set_field("Precio", "2", 0).unwrap();
/// assert_eq!(store.field(0, "Precio").unwrap(), "2");
/// ```
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    document: Document,
    root: Element,
    records: Vec<Element>,
}

impl RecordStore {
    /// Open the record file at `path`.
    ///
    /// # Errors
    ///
    /// - [`Error::Io`]: file missing or unreadable.
    /// - [`Error::CannotDecode`]: could not decode the file.
    /// - [`Error::MalformedXML`]: not well-formed XML, or no root element.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<RecordStore> {
        let document = Document::parse_file(&path)?;
        Self::from_document(document, path.as_ref().to_path_buf())
    }

    /// Build a store from an in-memory xml string.
    ///
    /// The store has no backing file path, so only [`RecordStore::save_as`]
    /// can persist it.
    pub fn parse_str(xml: &str) -> Result<RecordStore> {
        let document = Document::parse_str(xml)?;
        Self::from_document(document, PathBuf::new())
    }

    fn from_document(document: Document, path: PathBuf) -> Result<RecordStore> {
        let root = document
            .root_element()
            .ok_or_else(|| Error::MalformedXML("Document has no root element".to_string()))?;
        let records = root.child_elements(&document);
        Ok(RecordStore {
            path,
            document,
            root,
            records,
        })
    }

    /// The path the store was opened from. Empty for [`RecordStore::parse_str`].
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the document's root element.
    pub fn root_name(&self) -> &str {
        self.root.name(&self.document)
    }

    /// Diagnostic label combining the file path and root element name.
    /// For logging, not for parsing.
    pub fn describe(&self) -> String {
        format!("{}-{}", self.path.display(), self.root_name())
    }

    /// Number of records in the record index.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// All positions in the record index, in order.
    ///
    /// The index only ever holds element nodes, so this is every position.
    pub fn indices(&self) -> Vec<usize> {
        (0..self.records.len()).collect()
    }

    /// One string per record: its field values in document order joined
    /// with `"-"`.
    pub fn summaries(&self) -> Vec<String> {
        self.summaries_with("-")
    }

    /// One string per record: its field values in document order joined
    /// with `separator`, without a trailing separator.
    ///
    /// A record with no fields yields an empty string.
    pub fn summaries_with(&self, separator: &str) -> Vec<String> {
        self.records
            .iter()
            .map(|&record| self.values_of(record).join(separator))
            .collect()
    }

    /// Field values of the record at `index`, in document order.
    pub fn record_values(&self, index: usize) -> Result<Vec<String>> {
        let record = self.record_elem(index)?;
        Ok(self.values_of(record))
    }

    /// `(field name, value)` pairs of the record at `index`, in document order.
    pub fn record(&self, index: usize) -> Result<Vec<(String, String)>> {
        let doc = &self.document;
        let record = self.record_elem(index)?;
        Ok(record
            .child_elements(doc)
            .into_iter()
            .map(|field| {
                (
                    field.name(doc).to_string(),
                    field.text(doc).unwrap_or("").to_string(),
                )
            })
            .collect())
    }

    /// Value of the first field named `name` in the record at `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]
    /// - [`Error::FieldNotFound`]
    pub fn field(&self, index: usize, name: &str) -> Result<&str> {
        let record = self.record_elem(index)?;
        self.field_value(record, name)
            .ok_or_else(|| Error::FieldNotFound(name.to_string()))
    }

    /// Index of the first record whose field `field` equals `value` exactly
    /// (case-sensitive), scanning the record index in order.
    pub fn find_first(&self, field: &str, value: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|&record| self.matches(record, field, value))
    }

    /// Every index whose record's field `field` equals `value`, ascending.
    pub fn find_all(&self, field: &str, value: &str) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, &record)| self.matches(record, field, value))
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the first record satisfying `criteria` under `mode`.
    ///
    /// With an empty `criteria`, [`MatchMode::All`] matches every record and
    /// [`MatchMode::Any`] matches none.
    pub fn find_first_where(&self, criteria: &[(&str, &str)], mode: MatchMode) -> Option<usize> {
        self.records
            .iter()
            .position(|&record| self.qualifies(record, criteria, mode))
    }

    /// Every index whose record satisfies `criteria` under `mode`, ascending.
    pub fn find_all_where(&self, criteria: &[(&str, &str)], mode: MatchMode) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, &record)| self.qualifies(record, criteria, mode))
            .map(|(i, _)| i)
            .collect()
    }

    /// Replace the value of the first field named `field` in the record at
    /// `index`. On failure the record is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]
    /// - [`Error::FieldNotFound`]
    pub fn set_field(&mut self, field: &str, new_value: &str, index: usize) -> Result<()> {
        let record = self.record_elem(index)?;
        let target = record
            .child_elements(&self.document)
            .into_iter()
            .find(|f| f.name(&self.document) == field)
            .ok_or_else(|| Error::FieldNotFound(field.to_string()))?;
        target.set_text(&mut self.document, new_value);
        Ok(())
    }

    /// Build a record from `rows` and append it as root's last child.
    ///
    /// Every row must be exactly `[field name, field value]`; the whole table
    /// is validated before any node is created, so a failure never leaves a
    /// partially built record behind. `name` defaults to the name of the
    /// first record in the index. Row positions listed in `skip` are omitted
    /// entirely rather than stored as empty fields.
    ///
    /// The record index is NOT refreshed; call [`RecordStore::reindex`] to
    /// make the new record addressable.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedRow`]: a row is not a `[name, value]` pair.
    /// - [`Error::NoRecords`]: `name` was defaulted but the index is empty.
    pub fn append_record(
        &mut self,
        name: Option<&str>,
        rows: &[&[&str]],
        skip: &[usize],
    ) -> Result<()> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != 2 {
                return Err(Error::MalformedRow(i));
            }
        }
        let name = match name {
            Some(name) => name.to_string(),
            None => {
                let first = self.records.first().copied().ok_or(Error::NoRecords)?;
                first.name(&self.document).to_string()
            }
        };
        let doc = &mut self.document;
        let record = Element::new(doc, name);
        for (i, row) in rows.iter().enumerate() {
            if skip.contains(&i) {
                continue;
            }
            let field = Element::new(doc, row[0]);
            field.set_text(doc, row[1]);
            // fresh element, cannot already have a parent
            record.push_child(doc, Node::Element(field)).unwrap();
        }
        self.root.push_child(doc, Node::Element(record)).unwrap();
        Ok(())
    }

    /// Remove the record at `index` from root's children.
    ///
    /// The record index is NOT refreshed; the removed record stays
    /// addressable until [`RecordStore::reindex`] is called.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`]
    /// - [`Error::NotFound`]: the record is no longer among root's children
    /// (it was already deleted). Nothing is mutated.
    pub fn delete_record(&mut self, index: usize) -> Result<()> {
        let record = self.record_elem(index)?;
        self.root.remove_child_elem(&mut self.document, record)
    }

    /// Rebuild the record index from root's current child elements, in
    /// document order. Call after [`RecordStore::append_record`] or
    /// [`RecordStore::delete_record`].
    pub fn reindex(&mut self) {
        self.records = self.root.child_elements(&self.document);
    }

    /// Serialize the document, indented, over the original open path.
    ///
    /// A failed write may leave a truncated file; there is no atomic-rename
    /// guarantee.
    pub fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "store has no backing file path",
            )));
        }
        self.document.write_file(&self.path)
    }

    /// Serialize the document, indented, to `path`.
    pub fn save_as<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.document.write_file(path)
    }

    fn record_elem(&self, index: usize) -> Result<Element> {
        self.records
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
    }

    fn values_of(&self, record: Element) -> Vec<String> {
        let doc = &self.document;
        record
            .child_elements(doc)
            .into_iter()
            .map(|field| field.text(doc).unwrap_or("").to_string())
            .collect()
    }

    // First field of that name wins; field names need not be unique.
    fn field_value(&self, record: Element, name: &str) -> Option<&str> {
        let doc = &self.document;
        record
            .child_elements(doc)
            .into_iter()
            .find(|field| field.name(doc) == name)
            .map(|field| field.text(doc).unwrap_or(""))
    }

    fn matches(&self, record: Element, field: &str, value: &str) -> bool {
        self.field_value(record, field) == Some(value)
    }

    fn qualifies(&self, record: Element, criteria: &[(&str, &str)], mode: MatchMode) -> bool {
        let matched = criteria
            .iter()
            .filter(|(field, value)| self.matches(record, field, value))
            .count();
        match mode {
            MatchMode::All => matched == criteria.len(),
            MatchMode::Any => matched >= 1,
        }
    }
}
