use serde::{Deserialize, Serialize};

use crate::error::BatchError;

use super::{
    codec::{LineStrategy, RecordCodec},
    field::{DelimitedLayout, FieldTable},
};

/// Record codec reading and writing delimited (CSV-style) lines.
pub type DelimitedCodec<T> = RecordCodec<T, DelimitedLineStrategy>;

fn default_delimiter() -> char {
    ','
}

fn default_qualifier() -> char {
    '"'
}

fn default_always_qualify() -> bool {
    true
}

/// Delimiter-splitting, qualifier-aware line strategy.
///
/// # Tokenizing
///
/// The line is scanned once, left to right, with a single flag telling
/// whether a delimiter currently separates fields:
/// - every qualifier toggles the flag and is dropped from the output;
///   doubled qualifiers are not an escape
/// - a delimiter closes the current field when the flag is set and is kept
///   as text otherwise
/// - at the end of the line the last field is kept only if the flag is set,
///   so a field opened by an unterminated qualifier is dropped
///
/// # Rendering
///
/// Fields are wrapped in the qualifier either always (`always_qualify`) or
/// only when they contain the delimiter, then joined with the delimiter.
///
/// # Examples
///
/// ```
/// use flatfile_batch_rs::item::flat::delimited::DelimitedLineStrategy;
/// use flatfile_batch_rs::item::flat::field::FieldTable;
/// use flatfile_batch_rs::item::flat::codec::LineStrategy;
///
/// let table = FieldTable::builder().build().unwrap();
/// let strategy = DelimitedLineStrategy::builder().always_qualify(false).build().unwrap();
///
/// let fields = vec!["a,b".to_string(), "c".to_string()];
/// let line = strategy.render(&table, &fields).unwrap();
/// assert_eq!(line, r#""a,b",c"#);
/// assert_eq!(strategy.tokenize(&table, &line).unwrap(), fields);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimitedLineStrategy {
    #[serde(default = "default_delimiter")]
    delimiter: char,
    #[serde(default = "default_qualifier")]
    qualifier: char,
    #[serde(default = "default_always_qualify")]
    always_qualify: bool,
}

impl Default for DelimitedLineStrategy {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            qualifier: default_qualifier(),
            always_qualify: default_always_qualify(),
        }
    }
}

impl DelimitedLineStrategy {
    pub fn builder() -> DelimitedLineStrategyBuilder {
        DelimitedLineStrategyBuilder::new()
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn qualifier(&self) -> char {
        self.qualifier
    }

    pub fn always_qualify(&self) -> bool {
        self.always_qualify
    }

    /// # Errors
    /// Returns [`BatchError::Configuration`] when the delimiter and the
    /// qualifier are the same character.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.delimiter == self.qualifier {
            return Err(BatchError::Configuration(format!(
                "delimiter and qualifier must differ, both are '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    fn render_with(&self, fields: &[String], always_qualify: bool) -> String {
        let mut line = String::new();

        for field in fields {
            let qualify = always_qualify || field.contains(self.delimiter);
            if qualify {
                line.push(self.qualifier);
            }
            line.push_str(field);
            if qualify {
                line.push(self.qualifier);
            }
            line.push(self.delimiter);
        }

        // Only the delimiter appended after the last field goes away.
        line.pop();
        line
    }
}

impl LineStrategy for DelimitedLineStrategy {
    type Layout = DelimitedLayout;

    fn tokenize(
        &self,
        _table: &FieldTable<DelimitedLayout>,
        line: &str,
    ) -> Result<Vec<String>, BatchError> {
        self.validate()?;

        let mut fields = Vec::new();
        let mut buffer = String::new();
        let mut count_delimiter = true;

        for c in line.chars() {
            if c == self.qualifier {
                count_delimiter = !count_delimiter;
            } else if c == self.delimiter && count_delimiter {
                fields.push(std::mem::take(&mut buffer));
            } else {
                buffer.push(c);
            }
        }

        if count_delimiter {
            fields.push(buffer);
        }

        Ok(fields)
    }

    fn render(
        &self,
        _table: &FieldTable<DelimitedLayout>,
        fields: &[String],
    ) -> Result<String, BatchError> {
        self.validate()?;
        Ok(self.render_with(fields, self.always_qualify))
    }

    fn render_header(
        &self,
        _table: &FieldTable<DelimitedLayout>,
        names: &[String],
    ) -> Result<String, BatchError> {
        self.validate()?;
        Ok(self.render_with(names, false))
    }
}

/// Builder of a [`DelimitedLineStrategy`].
///
/// # Default Configuration
///
/// - Delimiter: comma (,)
/// - Qualifier: double quote (")
/// - Always qualify: enabled
#[derive(Default)]
pub struct DelimitedLineStrategyBuilder {
    strategy: DelimitedLineStrategy,
}

impl DelimitedLineStrategyBuilder {
    pub fn new() -> Self {
        Self {
            strategy: DelimitedLineStrategy::default(),
        }
    }

    /// Sets the character separating fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use flatfile_batch_rs::item::flat::delimited::DelimitedLineStrategy;
    ///
    /// let strategy = DelimitedLineStrategy::builder().delimiter(';').build().unwrap();
    /// assert_eq!(strategy.delimiter(), ';');
    /// ```
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.strategy.delimiter = delimiter;
        self
    }

    /// Sets the character wrapping fields.
    pub fn qualifier(mut self, qualifier: char) -> Self {
        self.strategy.qualifier = qualifier;
        self
    }

    /// When disabled, only fields containing the delimiter are qualified.
    pub fn always_qualify(mut self, yes: bool) -> Self {
        self.strategy.always_qualify = yes;
        self
    }

    /// # Errors
    /// Returns [`BatchError::Configuration`] when the delimiter and the
    /// qualifier are the same character.
    pub fn build(self) -> Result<DelimitedLineStrategy, BatchError> {
        self.strategy.validate()?;
        Ok(self.strategy)
    }
}
