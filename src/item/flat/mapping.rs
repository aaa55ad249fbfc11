use std::{fmt::Display, str::FromStr};

use crate::error::{BatchError, ConversionError};

use super::field::{DelimitedLayout, FieldTable, FieldTableBuilder, FixedLayout};

/// Converts a field value to and from its text representation.
pub trait Converter<V>: Send + Sync {
    fn to_text(&self, value: &V) -> Result<String, ConversionError>;
    fn from_text(&self, text: &str) -> Result<V, ConversionError>;
}

/// Converter based on `Display` and `FromStr`.
///
/// This is the converter used by [`Binding::new`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisplayConverter;

impl<V> Converter<V> for DisplayConverter
where
    V: Display + FromStr,
    <V as FromStr>::Err: Display,
{
    fn to_text(&self, value: &V) -> Result<String, ConversionError> {
        Ok(value.to_string())
    }

    fn from_text(&self, text: &str) -> Result<V, ConversionError> {
        text.parse::<V>()
            .map_err(|error| ConversionError::new(format!("cannot parse '{}': {}", text, error)))
    }
}

/// Maps `None` to an empty text and delegates everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionalConverter<C> {
    inner: C,
}

impl<C> OptionalConverter<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<V, C: Converter<V>> Converter<Option<V>> for OptionalConverter<C> {
    fn to_text(&self, value: &Option<V>) -> Result<String, ConversionError> {
        match value {
            Some(value) => self.inner.to_text(value),
            None => Ok(String::new()),
        }
    }

    fn from_text(&self, text: &str) -> Result<Option<V>, ConversionError> {
        if text.is_empty() {
            Ok(None)
        } else {
            self.inner.from_text(text).map(Some)
        }
    }
}

/// Booleans written with custom literals, e.g. `Y`/`N`.
#[derive(Debug, Clone)]
pub struct BoolConverter {
    true_literal: String,
    false_literal: String,
}

impl Default for BoolConverter {
    fn default() -> Self {
        Self::new("true", "false")
    }
}

impl BoolConverter {
    pub fn new(true_literal: impl Into<String>, false_literal: impl Into<String>) -> Self {
        Self {
            true_literal: true_literal.into(),
            false_literal: false_literal.into(),
        }
    }
}

impl Converter<bool> for BoolConverter {
    fn to_text(&self, value: &bool) -> Result<String, ConversionError> {
        if *value {
            Ok(self.true_literal.clone())
        } else {
            Ok(self.false_literal.clone())
        }
    }

    fn from_text(&self, text: &str) -> Result<bool, ConversionError> {
        if text == self.true_literal {
            Ok(true)
        } else if text == self.false_literal {
            Ok(false)
        } else {
            Err(ConversionError::new(format!(
                "expected '{}' or '{}', found '{}'",
                self.true_literal, self.false_literal, text
            )))
        }
    }
}

/// Dates written with a `time` format description such as `[year][month][day]`.
#[cfg(feature = "time")]
#[derive(Debug, Clone)]
pub struct DateConverter {
    format: time::format_description::OwnedFormatItem,
}

#[cfg(feature = "time")]
impl DateConverter {
    /// # Errors
    /// Returns [`BatchError::Configuration`] when the format description is invalid.
    pub fn new(format: &str) -> Result<Self, BatchError> {
        let format = time::format_description::parse_owned::<1>(format).map_err(|error| {
            BatchError::Configuration(format!("invalid date format '{}': {}", format, error))
        })?;
        Ok(Self { format })
    }
}

#[cfg(feature = "time")]
impl Converter<time::Date> for DateConverter {
    fn to_text(&self, value: &time::Date) -> Result<String, ConversionError> {
        value
            .format(&self.format)
            .map_err(|error| ConversionError::new(error.to_string()))
    }

    fn from_text(&self, text: &str) -> Result<time::Date, ConversionError> {
        time::Date::parse(text, &self.format)
            .map_err(|error| ConversionError::new(format!("cannot parse '{}': {}", text, error)))
    }
}

/// Reads and writes the text of one field of a record.
pub trait FieldAccessor<T>: Send + Sync {
    fn get(&self, record: &T) -> Result<String, ConversionError>;
    fn set(&self, record: &mut T, text: &str) -> Result<(), ConversionError>;
}

/// [`FieldAccessor`] made of a getter, a setter and a [`Converter`].
///
/// # Examples
///
/// ```
/// use flatfile_batch_rs::item::flat::mapping::{Binding, FieldAccessor};
///
/// #[derive(Default)]
/// struct Car {
///     year: u16,
/// }
///
/// let year = Binding::new(|car: &Car| &car.year, |car, value| car.year = value);
///
/// let mut car = Car::default();
/// year.set(&mut car, "1948").unwrap();
/// assert_eq!(car.year, 1948);
/// assert_eq!(year.get(&car).unwrap(), "1948");
/// assert!(year.set(&mut car, "19x8").is_err());
/// ```
pub struct Binding<T, V, C = DisplayConverter> {
    getter: fn(&T) -> &V,
    setter: fn(&mut T, V),
    converter: C,
}

impl<T, V> Binding<T, V, DisplayConverter>
where
    DisplayConverter: Converter<V>,
{
    pub fn new(getter: fn(&T) -> &V, setter: fn(&mut T, V)) -> Self {
        Self {
            getter,
            setter,
            converter: DisplayConverter,
        }
    }
}

impl<T, V, C: Converter<V>> Binding<T, V, C> {
    pub fn converted(getter: fn(&T) -> &V, setter: fn(&mut T, V), converter: C) -> Self {
        Self {
            getter,
            setter,
            converter,
        }
    }
}

impl<T, V, C: Converter<V>> FieldAccessor<T> for Binding<T, V, C> {
    fn get(&self, record: &T) -> Result<String, ConversionError> {
        self.converter.to_text((self.getter)(record))
    }

    fn set(&self, record: &mut T, text: &str) -> Result<(), ConversionError> {
        let value = self.converter.from_text(text)?;
        (self.setter)(record, value);
        Ok(())
    }
}

/// Field table of a record type together with one accessor per field.
///
/// A mapping is built once per record type and then shared, read-only, by
/// every codec working on that type.
pub struct RecordMapping<T, L> {
    table: FieldTable<L>,
    accessors: Vec<Box<dyn FieldAccessor<T>>>,
}

impl<T, L> RecordMapping<T, L> {
    pub fn builder() -> RecordMappingBuilder<T, L> {
        RecordMappingBuilder::new()
    }

    pub fn table(&self) -> &FieldTable<L> {
        &self.table
    }

    /// Text of every field of `record`, in ordinal order.
    pub fn extract(&self, record: &T) -> Result<Vec<String>, BatchError> {
        self.table
            .iter()
            .zip(&self.accessors)
            .map(|(descriptor, accessor)| {
                accessor
                    .get(record)
                    .map_err(|error| BatchError::conversion(descriptor.name(), error.0))
            })
            .collect()
    }

    /// Sets the field at `ordinal` from its text.
    pub fn assign(&self, record: &mut T, ordinal: usize, text: &str) -> Result<(), BatchError> {
        let (descriptor, accessor) = self
            .table
            .get(ordinal)
            .zip(self.accessors.get(ordinal))
            .ok_or_else(|| {
                BatchError::Structure(format!(
                    "value at position {} has no matching field (record has {} fields)",
                    ordinal,
                    self.table.len()
                ))
            })?;

        accessor
            .set(record, text)
            .map_err(|error| BatchError::conversion(descriptor.name(), error.0))
    }
}

/// Builder of a [`RecordMapping`]. Ordinals follow the order of declaration.
pub struct RecordMappingBuilder<T, L> {
    table: FieldTableBuilder<L>,
    accessors: Vec<Box<dyn FieldAccessor<T>>>,
}

impl<T, L> Default for RecordMappingBuilder<T, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, L> RecordMappingBuilder<T, L> {
    pub fn new() -> Self {
        Self {
            table: FieldTableBuilder::new(),
            accessors: Vec::new(),
        }
    }

    pub fn field<A>(mut self, name: impl Into<String>, layout: L, accessor: A) -> Self
    where
        A: FieldAccessor<T> + 'static,
    {
        self.table = self.table.field(name, layout);
        self.accessors.push(Box::new(accessor));
        self
    }

    /// # Errors
    /// Returns [`BatchError::Configuration`] when a name is declared twice.
    pub fn build(self) -> Result<RecordMapping<T, L>, BatchError> {
        Ok(RecordMapping {
            table: self.table.build()?,
            accessors: self.accessors,
        })
    }
}

impl<T> RecordMappingBuilder<T, DelimitedLayout> {
    /// Declares the next column of a delimited record.
    pub fn column<A>(self, name: impl Into<String>, accessor: A) -> Self
    where
        A: FieldAccessor<T> + 'static,
    {
        self.field(name, DelimitedLayout, accessor)
    }
}

impl<T> RecordMappingBuilder<T, FixedLayout> {
    /// Declares the next field of a fixed-width record.
    pub fn fixed<A>(self, name: impl Into<String>, layout: FixedLayout, accessor: A) -> Self
    where
        A: FieldAccessor<T> + 'static,
    {
        self.field(name, layout, accessor)
    }
}
