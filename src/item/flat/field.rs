use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Layout of a field in a delimited line.
///
/// Columns of a delimited line are identified by their ordinal only, so this
/// layout carries no attribute.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelimitedLayout;

fn default_padding() -> char {
    ' '
}

/// Layout of a field in a fixed-width line.
///
/// The field occupies the characters `[position, position + size)` of the
/// line and is left-padded with `padding` up to `size` when written.
///
/// `size` is signed: a negative size can be declared but is rejected with a
/// [`BatchError::Configuration`] as soon as the field is used.
///
/// # Examples
///
/// ```
/// use flatfile_batch_rs::item::flat::field::FixedLayout;
///
/// let layout = FixedLayout::new(0, 5).padding('0');
/// assert_eq!(layout.size(), 5);
/// assert_eq!(layout.get_padding(), '0');
/// assert!(!layout.is_optional());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedLayout {
    position: usize,
    size: i32,
    #[serde(default = "default_padding")]
    padding: char,
    #[serde(default)]
    optional: bool,
}

impl FixedLayout {
    /// Creates a required, space-padded layout.
    pub fn new(position: usize, size: i32) -> Self {
        Self {
            position,
            size,
            padding: default_padding(),
            optional: false,
        }
    }

    pub fn padding(mut self, padding: char) -> Self {
        self.padding = padding;
        self
    }

    /// Marks the field as allowed to be missing from a line that is too short.
    pub fn optional(mut self, yes: bool) -> Self {
        self.optional = yes;
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn get_padding(&self) -> char {
        self.padding
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Immutable metadata of one record field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor<L> {
    name: String,
    ordinal: usize,
    layout: L,
}

impl<L> FieldDescriptor<L> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based declaration index of the field.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn layout(&self) -> &L {
        &self.layout
    }
}

impl FieldDescriptor<FixedLayout> {
    /// Returns the declared size, or a configuration error when it is negative.
    pub fn checked_size(&self) -> Result<usize, BatchError> {
        usize::try_from(self.layout.size).map_err(|_| {
            BatchError::Configuration(format!(
                "field '{}' has a negative size: {}",
                self.name, self.layout.size
            ))
        })
    }
}

/// Ordered, immutable collection of the field descriptors of one record type.
///
/// Descriptors are addressable both by ordinal and by name. Ordinals form the
/// dense sequence `0..len()` in declaration order.
///
/// # Examples
///
/// ```
/// use flatfile_batch_rs::item::flat::field::{DelimitedLayout, FieldTable};
///
/// let table = FieldTable::builder()
///     .field("year", DelimitedLayout)
///     .field("make", DelimitedLayout)
///     .build()
///     .unwrap();
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.by_name("make").unwrap().ordinal(), 1);
/// assert_eq!(table.names().collect::<Vec<_>>(), vec!["year", "make"]);
/// ```
#[derive(Debug, Clone)]
pub struct FieldTable<L> {
    descriptors: Vec<FieldDescriptor<L>>,
    index: HashMap<String, usize>,
}

impl<L> FieldTable<L> {
    pub fn builder() -> FieldTableBuilder<L> {
        FieldTableBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&FieldDescriptor<L>> {
        self.descriptors.get(ordinal)
    }

    pub fn by_name(&self, name: &str) -> Option<&FieldDescriptor<L>> {
        self.index.get(name).map(|ordinal| &self.descriptors[*ordinal])
    }

    /// Iterates descriptors in ordinal order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor<L>> {
        self.descriptors.iter()
    }

    /// Field names in ordinal order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.descriptors.iter().map(FieldDescriptor::name)
    }
}

impl<'a, L> IntoIterator for &'a FieldTable<L> {
    type Item = &'a FieldDescriptor<L>;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor<L>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builder of a [`FieldTable`]. Ordinals follow the order of the `field` calls.
pub struct FieldTableBuilder<L> {
    fields: Vec<(String, L)>,
}

impl<L> Default for FieldTableBuilder<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> FieldTableBuilder<L> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn field(mut self, name: impl Into<String>, layout: L) -> Self {
        self.fields.push((name.into(), layout));
        self
    }

    /// Builds the table.
    ///
    /// # Errors
    /// Returns [`BatchError::Configuration`] when a name is declared twice.
    pub fn build(self) -> Result<FieldTable<L>, BatchError> {
        let mut descriptors = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::with_capacity(self.fields.len());

        for (ordinal, (name, layout)) in self.fields.into_iter().enumerate() {
            if index.insert(name.clone(), ordinal).is_some() {
                return Err(BatchError::Configuration(format!(
                    "field '{}' is declared more than once",
                    name
                )));
            }
            descriptors.push(FieldDescriptor {
                name,
                ordinal,
                layout,
            });
        }

        Ok(FieldTable { descriptors, index })
    }
}
