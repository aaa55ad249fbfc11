//! Flat file support: delimited and fixed-width records.
//!
//! A flat file holds one record per line. How a record maps to a line is
//! driven entirely by metadata declared once per record type, instead of
//! parsing code written for each type.
//!
//! # Module Architecture
//!
//! 1. **field**: the field descriptors (name, ordinal, layout) and the
//!    immutable [`FieldTable`](field::FieldTable) that orders them.
//!
//! 2. **mapping**: binds every field of a table to a getter, a setter and a
//!    [`Converter`](mapping::Converter) of the record type.
//!
//! 3. **codec**: the generic [`RecordCodec`](codec::RecordCodec), turning one
//!    record into one line and back, and the
//!    [`LineStrategy`](codec::LineStrategy) it delegates tokenizing and
//!    rendering to.
//!
//! 4. **delimited** / **fixed**: the two line strategies.
//!
//! 5. **reader** / **writer**: `ItemReader` and `ItemWriter` running a codec
//!    over a line-oriented stream, with optional header line.
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "delimited")]
//! # fn main() {
//! use flatfile_batch_rs::core::item::{ItemReader, ItemWriter};
//! use flatfile_batch_rs::item::flat::codec::RecordCodec;
//! use flatfile_batch_rs::item::flat::delimited::DelimitedLineStrategy;
//! use flatfile_batch_rs::item::flat::mapping::{Binding, RecordMapping};
//! use flatfile_batch_rs::item::flat::reader::FlatFileItemReaderBuilder;
//! use flatfile_batch_rs::item::flat::writer::FlatFileItemWriterBuilder;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u8,
//!     occupation: String,
//! }
//!
//! let mapping = Arc::new(
//!     RecordMapping::builder()
//!         .column("name", Binding::new(|p: &Person| &p.name, |p, v| p.name = v))
//!         .column("age", Binding::new(|p: &Person| &p.age, |p, v| p.age = v))
//!         .column("occupation", Binding::new(|p: &Person| &p.occupation, |p, v| p.occupation = v))
//!         .build()
//!         .unwrap(),
//! );
//! let strategy = DelimitedLineStrategy::builder().always_qualify(false).build().unwrap();
//!
//! let people = vec![
//!     Person { name: "Alice".to_string(), age: 28, occupation: "Engineer, R&D".to_string() },
//!     Person { name: "Bob".to_string(), age: 35, occupation: "Designer".to_string() },
//! ];
//!
//! let writer = FlatFileItemWriterBuilder::new(RecordCodec::with_shared_mapping(mapping.clone(), strategy))
//!     .has_header(true)
//!     .from_writer(Vec::new());
//! writer.write(&people).unwrap();
//! let output = writer.into_inner().unwrap();
//!
//! assert_eq!(
//!     String::from_utf8(output.clone()).unwrap(),
//!     "name,age,occupation\nAlice,28,\"Engineer, R&D\"\nBob,35,Designer\n"
//! );
//!
//! let reader = FlatFileItemReaderBuilder::new(RecordCodec::with_shared_mapping(mapping, strategy))
//!     .has_header(true)
//!     .from_reader(output.as_slice());
//! assert_eq!(reader.read_all().unwrap(), people);
//! # }
//! # #[cfg(not(feature = "delimited"))]
//! # fn main() {}
//! ```
pub mod codec;

pub mod field;

pub mod mapping;

#[cfg(feature = "delimited")]
/// Delimited (CSV-style) lines.
pub mod delimited;

#[cfg(feature = "fixed-width")]
/// Fixed-width lines.
pub mod fixed;

/// A module providing facilities for reading flat file records.
pub mod reader;

/// A module providing facilities for writing flat file records.
pub mod writer;
