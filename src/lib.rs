#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # Flat files for batch applications

 Readers and writers for **flat files**: text files holding one record per
 line, either delimited (CSV-style) or fixed-width. How a record maps to a
 line is declared once per record type as metadata (field names, order,
 column ranges, padding) instead of being written as parsing code.

 ## Core Concepts

- **Field Table:** the ordered, immutable field descriptors of a record type.
- **Record Mapping:** the field table plus a getter, a setter and a converter for every field.
- **Record Codec:** turns one record into one line and back, delegating the
  line layout to a `LineStrategy` (delimited or fixed-width).
- **ItemReader / ItemWriter:** run a codec over a line-oriented stream, one
  record per line, with an optional header line.
- **Step / Job:** move items from a reader to a writer, chunk by chunk, and
  stop at the first failure.

 ## Features

| **Feature**   | **Description**                                     |
|---------------|-----------------------------------------------------|
| delimited     | Enables the delimited (CSV-style) line strategy     |
| fixed-width   | Enables the fixed-width line strategy               |
| time          | Enables a `time::Date` converter                    |
| full          | Enables all available features                      |

 ## Getting Started

```rust
# #[cfg(all(feature = "delimited", feature = "fixed-width"))]
# use flatfile_batch_rs::{
#     core::{
#         item::PassThroughProcessor,
#         job::{Job, JobBuilder},
#         step::StepBuilder,
#     },
#     error::BatchError,
#     item::flat::{
#         codec::RecordCodec,
#         delimited::DelimitedLineStrategy,
#         field::FixedLayout,
#         fixed::FixedWidthLineStrategy,
#         mapping::{Binding, RecordMapping},
#         reader::FlatFileItemReaderBuilder,
#         writer::FlatFileItemWriterBuilder,
#     },
# };
# #[cfg(all(feature = "delimited", feature = "fixed-width"))]
#[derive(Default, Clone, Debug)]
struct Car {
    year: u16,
    make: String,
    model: String,
}

# #[cfg(all(feature = "delimited", feature = "fixed-width"))]
fn main() -> Result<(), BatchError> {
    let csv = "year,make,model
1948,Porsche,356
1995,Peugeot,205
2021,Mazda,CX-30";

    let csv_mapping = RecordMapping::builder()
        .column("year", Binding::new(|c: &Car| &c.year, |c, v| c.year = v))
        .column("make", Binding::new(|c: &Car| &c.make, |c, v| c.make = v))
        .column("model", Binding::new(|c: &Car| &c.model, |c, v| c.model = v))
        .build()?;

    let fixed_mapping = RecordMapping::builder()
        .fixed("year", FixedLayout::new(0, 4), Binding::new(|c: &Car| &c.year, |c, v| c.year = v))
        .fixed("make", FixedLayout::new(4, 10), Binding::new(|c: &Car| &c.make, |c, v| c.make = v))
        .fixed("model", FixedLayout::new(14, 8), Binding::new(|c: &Car| &c.model, |c, v| c.model = v))
        .build()?;

    let reader = FlatFileItemReaderBuilder::new(RecordCodec::new(csv_mapping, DelimitedLineStrategy::default()))
        .has_header(true)
        .from_reader(csv.as_bytes());

    let writer = FlatFileItemWriterBuilder::new(RecordCodec::new(fixed_mapping, FixedWidthLineStrategy))
        .from_writer(Vec::new());

    {
        let step = StepBuilder::new("csv-to-fixed")
            .chunk::<Car, Car>(2)
            .reader(&reader)
            .processor(&PassThroughProcessor)
            .writer(&writer)
            .build()?;

        let job = JobBuilder::new().start(&step).build();
        job.run()?;
    } // step and job are dropped here, releasing the writer

    let output = String::from_utf8(writer.into_inner()?).unwrap();
    assert_eq!(output, "1948   Porsche     356\n1995   Peugeot     205\n2021     Mazda   CX-30\n");

    Ok(())
}
# #[cfg(not(all(feature = "delimited", feature = "fixed-width")))]
# fn main() {}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers / writers
pub mod item;
