use log::debug;

use crate::error::BatchError;

use super::{
    codec::{LineStrategy, RecordCodec},
    field::{FieldTable, FixedLayout},
};

/// Record codec reading and writing fixed-width lines.
pub type FixedWidthCodec<T> = RecordCodec<T, FixedWidthLineStrategy>;

/// Line strategy placing every field in its own column range.
///
/// All the layout is carried by the [`FixedLayout`] of each field; columns are
/// counted in characters.
///
/// # Examples
///
/// ```
/// use flatfile_batch_rs::item::flat::codec::LineStrategy;
/// use flatfile_batch_rs::item::flat::field::{FieldTable, FixedLayout};
/// use flatfile_batch_rs::item::flat::fixed::FixedWidthLineStrategy;
///
/// let table = FieldTable::builder()
///     .field("amount", FixedLayout::new(0, 5).padding('0'))
///     .build()
///     .unwrap();
///
/// let line = FixedWidthLineStrategy.render(&table, &["42".to_string()]).unwrap();
/// assert_eq!(line, "00042");
/// assert_eq!(FixedWidthLineStrategy.tokenize(&table, &line).unwrap(), vec!["42"]);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidthLineStrategy;

impl LineStrategy for FixedWidthLineStrategy {
    type Layout = FixedLayout;

    /// Extracts every field from its column range and trims its padding.
    ///
    /// A field whose range ends past the end of the line stops the scan when
    /// it is optional: that field and all the following ones are left out.
    fn tokenize(
        &self,
        table: &FieldTable<FixedLayout>,
        line: &str,
    ) -> Result<Vec<String>, BatchError> {
        let chars: Vec<char> = line.chars().collect();
        let mut fields = Vec::with_capacity(table.len());

        for descriptor in table {
            let size = descriptor.checked_size()?;
            let layout = descriptor.layout();
            let start = layout.position();
            let end = start.saturating_add(size);

            if end > chars.len() {
                if layout.is_optional() {
                    debug!(
                        "Line of length {} stops before optional field '{}'",
                        chars.len(),
                        descriptor.name()
                    );
                    break;
                }
                return Err(BatchError::Structure(format!(
                    "line length {} does not cover field '{}' (columns {} to {})",
                    chars.len(),
                    descriptor.name(),
                    start,
                    end
                )));
            }

            let text: String = chars[start..end].iter().collect();
            fields.push(text.trim_matches(layout.get_padding()).to_string());
        }

        Ok(fields)
    }

    /// Left-pads every field to its size and concatenates them.
    ///
    /// A text longer than its field is written unchanged.
    fn render(
        &self,
        table: &FieldTable<FixedLayout>,
        fields: &[String],
    ) -> Result<String, BatchError> {
        let mut line = String::new();

        for (ordinal, field) in fields.iter().enumerate() {
            let descriptor = table.get(ordinal).ok_or_else(|| {
                BatchError::Configuration(format!(
                    "value at position {} has no field descriptor (table has {} fields)",
                    ordinal,
                    table.len()
                ))
            })?;
            let size = descriptor.checked_size()?;

            let padding_count = size.saturating_sub(field.chars().count());
            line.extend(std::iter::repeat_n(
                descriptor.layout().get_padding(),
                padding_count,
            ));
            line.push_str(field);
        }

        Ok(line)
    }

    /// Pads every field name into its column range.
    ///
    /// # Errors
    /// Returns [`BatchError::Configuration`] when a name does not fit its field
    /// or starts or ends with the field's padding, since such a header could
    /// not be checked when read back.
    fn render_header(
        &self,
        table: &FieldTable<FixedLayout>,
        names: &[String],
    ) -> Result<String, BatchError> {
        for (descriptor, name) in table.iter().zip(names) {
            let size = descriptor.checked_size()?;
            let padding = descriptor.layout().get_padding();

            if name.chars().count() > size {
                return Err(BatchError::Configuration(format!(
                    "header name '{}' does not fit in {} columns",
                    name, size
                )));
            }
            if name.starts_with(padding) || name.ends_with(padding) {
                return Err(BatchError::Configuration(format!(
                    "header name '{}' starts or ends with its padding '{}'",
                    name, padding
                )));
            }
        }

        self.render(table, names)
    }
}
