use std::sync::Arc;

use log::debug;

use crate::error::BatchError;

use super::{field::FieldTable, mapping::RecordMapping};

/// Splits a line into field texts and assembles field texts into a line.
///
/// A strategy only deals with text: it never sees records. The same field
/// table is passed to every call so that per-field layout (column ranges,
/// padding, ...) can drive the work.
pub trait LineStrategy {
    /// Layout attributes attached to each field descriptor.
    type Layout;

    /// Splits `line` into field texts, in ordinal order.
    ///
    /// The result may hold fewer or more texts than the table has fields.
    fn tokenize(&self, table: &FieldTable<Self::Layout>, line: &str)
    -> Result<Vec<String>, BatchError>;

    /// Assembles field texts, given in ordinal order, into one line.
    fn render(&self, table: &FieldTable<Self::Layout>, fields: &[String])
    -> Result<String, BatchError>;

    /// Assembles the header line from the field names.
    fn render_header(
        &self,
        table: &FieldTable<Self::Layout>,
        names: &[String],
    ) -> Result<String, BatchError> {
        self.render(table, names)
    }
}

/// Record codec generic over the line layout.
///
/// Converts one record to one line (`serialize`) and one line to one record
/// (`deserialize`) by walking the fields of its [`RecordMapping`] in ordinal
/// order. The mapping is shared behind an `Arc` and never mutated, so a codec
/// is cheap to clone and can be used from several threads at once.
pub struct RecordCodec<T, S: LineStrategy> {
    mapping: Arc<RecordMapping<T, S::Layout>>,
    strategy: S,
}

impl<T, S: LineStrategy + Clone> Clone for RecordCodec<T, S> {
    fn clone(&self) -> Self {
        Self {
            mapping: Arc::clone(&self.mapping),
            strategy: self.strategy.clone(),
        }
    }
}

impl<T, S: LineStrategy> RecordCodec<T, S> {
    pub fn new(mapping: RecordMapping<T, S::Layout>, strategy: S) -> Self {
        Self::with_shared_mapping(Arc::new(mapping), strategy)
    }

    /// Creates a codec reusing a mapping already shared with other codecs.
    pub fn with_shared_mapping(mapping: Arc<RecordMapping<T, S::Layout>>, strategy: S) -> Self {
        Self { mapping, strategy }
    }

    pub fn mapping(&self) -> &Arc<RecordMapping<T, S::Layout>> {
        &self.mapping
    }

    pub fn table(&self) -> &FieldTable<S::Layout> {
        self.mapping.table()
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Converts one record into one line.
    pub fn serialize(&self, record: &T) -> Result<String, BatchError> {
        let fields = self.mapping.extract(record)?;
        self.strategy.render(self.table(), &fields)
    }

    /// Renders every record, in order. The first failure aborts the whole call.
    pub fn serialize_all(&self, records: &[T]) -> Result<Vec<String>, BatchError> {
        records.iter().map(|record| self.serialize(record)).collect()
    }

    /// Renders the header line holding the field names in ordinal order.
    pub fn header(&self) -> Result<String, BatchError> {
        let names: Vec<String> = self.table().names().map(str::to_owned).collect();
        self.strategy.render_header(self.table(), &names)
    }

    /// Checks a header line against the field names.
    ///
    /// # Errors
    /// Returns [`BatchError::Structure`] when the names, taken in order, differ
    /// from the declared field names.
    pub fn check_header(&self, line: &str) -> Result<(), BatchError> {
        let names = self.strategy.tokenize(self.table(), line)?;

        let matches = names.len() == self.table().len()
            && names
                .iter()
                .zip(self.table().names())
                .all(|(found, expected)| found == expected);

        if matches {
            debug!("Header matches {} fields", names.len());
            Ok(())
        } else {
            Err(BatchError::Structure(format!(
                "header does not match expected structure: expected {:?}, found {:?}",
                self.table().names().collect::<Vec<_>>(),
                names
            )))
        }
    }
}

impl<T: Default, S: LineStrategy> RecordCodec<T, S> {
    /// Converts one line into a new record.
    ///
    /// Fields missing from the line keep their default value.
    ///
    /// # Errors
    /// - [`BatchError::Structure`] when the line holds more fields than declared
    ///   or does not satisfy a required field's bounds
    /// - [`BatchError::Configuration`] on an invalid layout
    /// - [`BatchError::Conversion`] when a field text cannot be converted
    pub fn deserialize(&self, line: &str) -> Result<T, BatchError> {
        let fields = self.strategy.tokenize(self.table(), line)?;

        let mut record = T::default();
        for (ordinal, text) in fields.iter().enumerate() {
            self.mapping.assign(&mut record, ordinal, text)?;
        }

        Ok(record)
    }

    /// Converts lines into records, in order.
    ///
    /// At most `count` lines are read; `0` reads until `lines` is exhausted.
    /// The first failure aborts the whole call.
    pub fn deserialize_all<I>(&self, lines: I, count: usize) -> Result<Vec<T>, BatchError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let limit = if count == 0 { usize::MAX } else { count };

        lines
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, line)| {
                self.deserialize(line.as_ref()).inspect_err(|error| {
                    debug!("Record {} rejected: {}", index, error);
                })
            })
            .collect()
    }
}

#[cfg(all(test, feature = "delimited"))]
mod tests {
    use crate::{
        error::BatchError,
        item::flat::{
            delimited::{DelimitedCodec, DelimitedLineStrategy},
            mapping::{Binding, RecordMapping},
        },
    };

    use super::RecordCodec;

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Car {
        year: u16,
        make: String,
        model: String,
    }

    fn codec() -> DelimitedCodec<Car> {
        let mapping = RecordMapping::builder()
            .column("year", Binding::new(|c: &Car| &c.year, |c, v| c.year = v))
            .column("make", Binding::new(|c: &Car| &c.make, |c, v| c.make = v))
            .column(
                "model",
                Binding::new(|c: &Car| &c.model, |c, v| c.model = v),
            )
            .build()
            .unwrap();

        RecordCodec::new(
            mapping,
            DelimitedLineStrategy::builder()
                .always_qualify(false)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn serialize_should_render_fields_in_ordinal_order() {
        let car = Car {
            year: 1948,
            make: "Porsche".to_string(),
            model: "356".to_string(),
        };

        assert_eq!(codec().serialize(&car).unwrap(), "1948,Porsche,356");
    }

    #[test]
    fn deserialize_should_leave_missing_fields_to_default() {
        let car = codec().deserialize("1995,Peugeot").unwrap();

        assert_eq!(car.year, 1995);
        assert_eq!(car.make, "Peugeot");
        assert_eq!(car.model, "");
    }

    #[test]
    fn deserialize_should_reject_extra_fields() {
        let result = codec().deserialize("2021,Mazda,CX-30,SUV");

        assert!(matches!(result, Err(BatchError::Structure(_))));
    }

    #[test]
    fn deserialize_all_should_honor_count() {
        let lines = ["1948,Porsche,356", "1995,Peugeot,205", "2021,Mazda,CX-30"];

        let bounded = codec().deserialize_all(lines, 2).unwrap();
        let unbounded = codec().deserialize_all(lines, 0).unwrap();

        assert_eq!(bounded.len(), 2);
        assert_eq!(unbounded.len(), 3);
        assert_eq!(unbounded[2].model, "CX-30");
    }

    #[test]
    fn deserialize_all_should_fail_on_first_bad_line() {
        let lines = ["1948,Porsche,356", "19x5,Peugeot,205", "2021,Mazda,CX-30"];

        let result = codec().deserialize_all(lines, 0);

        assert!(matches!(result, Err(BatchError::Conversion { .. })));
    }

    #[test]
    fn serialize_all_should_preserve_order() {
        let cars = vec![
            Car {
                year: 1967,
                make: "Ford".to_string(),
                model: "Mustang, fastback".to_string(),
            },
            Car {
                year: 2011,
                make: "Peugeot".to_string(),
                model: "206+".to_string(),
            },
        ];

        let lines = codec().serialize_all(&cars).unwrap();

        assert_eq!(lines, vec!["1967,Ford,\"Mustang, fastback\"", "2011,Peugeot,206+"]);
    }

    #[test]
    fn header_should_be_checked_position_by_position() {
        let codec = codec();

        assert_eq!(codec.header().unwrap(), "year,make,model");
        assert!(codec.check_header("year,make,model").is_ok());
        assert!(matches!(
            codec.check_header("make,year,model"),
            Err(BatchError::Structure(_))
        ));
        assert!(matches!(
            codec.check_header("year,make"),
            Err(BatchError::Structure(_))
        ));
    }

    #[test]
    fn codec_should_be_shareable_between_threads() {
        let codec = codec();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4u16)
                .map(|i| {
                    let codec = &codec;
                    scope.spawn(move || {
                        let car = codec.deserialize(&format!("{},Ford,T", 1900 + i)).unwrap();
                        codec.serialize(&car).unwrap()
                    })
                })
                .collect();

            for (i, handle) in handles.into_iter().enumerate() {
                assert_eq!(handle.join().unwrap(), format!("{},Ford,T", 1900 + i));
            }
        });
    }
}
