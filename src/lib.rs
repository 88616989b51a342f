//! Read, query, modify and write flat one-level-deep xml record files.
//!
//! A record file is an xml document whose root element holds a sequence of
//! sibling record elements, each holding a flat list of named field elements
//! with text content. [`RecordStore`] opens such a file, searches and mutates
//! it in memory and serializes it back, indented, in UTF-8.
//!
//! ```
//! use xml_records::RecordStore;
//!
//! let mut store = RecordStore::parse_str(
//!     "<Productos>
//!         <Producto>
//!             <Nombre>Rosa</Nombre>
//!             <Precio>1</Precio>
//!         </Producto>
//!         <Producto>
//!             <Nombre>Lirio</Nombre>
//!             <Precio>2</Precio>
//!         </Producto>
//!     </Productos>",
//! )
//! .unwrap();
//!
//! assert_eq!(store.summaries(), vec!["Rosa-1", "Lirio-2"]);
//! assert_eq!(store.find_first("Nombre", "Lirio"), Some(1));
//!
//! store.append_record(None, &[&["Nombre", "Dalia"], &["Precio", "3"]], &[])?;
//! store.reindex();
//! assert_eq!(store.record_count(), 3);
//! # Ok::<(), xml_records::Error>(())
//! ```
//!
//! The underlying [`Document`] and [`Element`] tree is also public for the
//! cases where the record model is not enough.

mod document;
mod element;
mod error;
mod parser;
mod store;

pub use crate::document::{Document, Node};
pub use crate::element::Element;
pub use crate::error::{Error, Result};
pub use crate::store::{MatchMode, RecordStore};
