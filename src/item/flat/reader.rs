use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufRead, BufReader, Lines, Read},
    path::Path,
};

use log::{debug, error};

use crate::{
    core::item::{ItemReader, ItemReaderResult},
    error::BatchError,
};

use super::codec::{LineStrategy, RecordCodec};

/// Item reader turning each line of a text source into one record.
///
/// # Header
///
/// With `has_header(true)` the first line is read on the first call to
/// [`read`](ItemReader::read) and compared with the field names of the codec;
/// a mismatch fails the read before any data line is consumed. An empty
/// source has no header and simply yields no record.
///
/// A rejected header leaves the reader failed: every later call returns the
/// same structure error and no data line is read.
///
/// # Bounded reads
///
/// `max_items(n)` stops after `n` records without reading further lines;
/// `0` (the default) reads until the end of the source.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "delimited")]
/// # fn main() {
/// use flatfile_batch_rs::core::item::ItemReader;
/// use flatfile_batch_rs::item::flat::codec::RecordCodec;
/// use flatfile_batch_rs::item::flat::delimited::DelimitedLineStrategy;
/// use flatfile_batch_rs::item::flat::mapping::{Binding, RecordMapping};
/// use flatfile_batch_rs::item::flat::reader::FlatFileItemReaderBuilder;
///
/// #[derive(Default, Debug)]
/// struct City {
///     name: String,
///     pop: u32,
/// }
///
/// let mapping = RecordMapping::builder()
///     .column("name", Binding::new(|c: &City| &c.name, |c, v| c.name = v))
///     .column("pop", Binding::new(|c: &City| &c.pop, |c, v| c.pop = v))
///     .build()
///     .unwrap();
/// let codec = RecordCodec::new(mapping, DelimitedLineStrategy::default());
///
/// let data = "name,pop\nBoston,4628910\nConcord,42695\n";
/// let reader = FlatFileItemReaderBuilder::new(codec)
///     .has_header(true)
///     .from_reader(data.as_bytes());
///
/// let cities = reader.read_all().unwrap();
/// assert_eq!(cities.len(), 2);
/// assert_eq!(cities[1].name, "Concord");
/// assert_eq!(cities[1].pop, 42695);
/// # }
/// # #[cfg(not(feature = "delimited"))]
/// # fn main() {}
/// ```
pub struct FlatFileItemReader<R, T, S: LineStrategy> {
    lines: RefCell<Lines<BufReader<R>>>,
    codec: RecordCodec<T, S>,
    header_pending: Cell<bool>,
    rejected_header: RefCell<Option<String>>,
    max_items: usize,
    read_count: Cell<usize>,
    line_number: Cell<usize>,
}

impl<R: Read, T: Default, S: LineStrategy> FlatFileItemReader<R, T, S> {
    /// Reads every remaining record, in order.
    ///
    /// The first failing line fails the whole call.
    pub fn read_all(&self) -> Result<Vec<T>, BatchError> {
        let mut records = Vec::new();
        while let Some(record) = self.read()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Number of records read so far.
    pub fn read_count(&self) -> usize {
        self.read_count.get()
    }

    fn next_line(&self) -> Result<Option<String>, BatchError> {
        let next = self.lines.borrow_mut().next();
        match next {
            Some(line) => {
                self.line_number.set(self.line_number.get() + 1);
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn read_header(&self) -> Result<(), BatchError> {
        match self.next_line()? {
            Some(header) => self.codec.check_header(&header),
            None => {
                debug!("Source is empty, no header to check");
                Ok(())
            }
        }
    }

    fn ensure_header(&self) -> Result<(), BatchError> {
        if let Some(message) = self.rejected_header.borrow().as_ref() {
            return Err(BatchError::Structure(message.clone()));
        }

        if !self.header_pending.get() {
            return Ok(());
        }

        match self.read_header() {
            Ok(()) => {
                self.header_pending.set(false);
                Ok(())
            }
            Err(BatchError::Structure(message)) => {
                error!("Header rejected: {}", message);
                *self.rejected_header.borrow_mut() = Some(message.clone());
                Err(BatchError::Structure(message))
            }
            Err(error) => Err(error),
        }
    }

    fn is_limit_reached(&self) -> bool {
        self.max_items > 0 && self.read_count.get() >= self.max_items
    }
}

impl<R: Read, T: Default, S: LineStrategy> ItemReader<T> for FlatFileItemReader<R, T, S> {
    /// Reads and converts the next line.
    ///
    /// # Returns
    /// - `Ok(Some(record))` when a line was converted
    /// - `Ok(None)` at the end of the source or once `max_items` is reached
    /// - `Err(BatchError)` when the header, the line or the I/O failed
    fn read(&self) -> ItemReaderResult<T> {
        self.ensure_header()?;

        if self.is_limit_reached() {
            return Ok(None);
        }

        let Some(line) = self.next_line()? else {
            return Ok(None);
        };

        let record = self.codec.deserialize(&line).inspect_err(|error| {
            debug!("Line {} rejected: {}", self.line_number.get(), error);
        })?;
        self.read_count.set(self.read_count.get() + 1);

        Ok(Some(record))
    }
}

/// A builder for configuring flat file item reading.
///
/// # Default Configuration
///
/// - Headers: disabled
/// - Max items: 0 (unbounded)
pub struct FlatFileItemReaderBuilder<T, S: LineStrategy> {
    codec: RecordCodec<T, S>,
    has_header: bool,
    max_items: usize,
}

impl<T, S: LineStrategy> FlatFileItemReaderBuilder<T, S> {
    pub fn new(codec: RecordCodec<T, S>) -> Self {
        Self {
            codec,
            has_header: false,
            max_items: 0,
        }
    }

    /// Sets whether the first line holds the field names.
    pub fn has_header(mut self, yes: bool) -> Self {
        self.has_header = yes;
        self
    }

    /// Maximum number of records to read, `0` for no limit.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn from_reader<R: Read>(self, rdr: R) -> FlatFileItemReader<R, T, S> {
        FlatFileItemReader {
            lines: RefCell::new(BufReader::new(rdr).lines()),
            codec: self.codec,
            header_pending: Cell::new(self.has_header),
            rejected_header: RefCell::new(None),
            max_items: self.max_items,
            read_count: Cell::new(0),
            line_number: Cell::new(0),
        }
    }

    /// # Errors
    /// Returns [`BatchError::Io`] when the file cannot be opened.
    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<FlatFileItemReader<File, T, S>, BatchError> {
        let file = File::open(path)?;
        Ok(self.from_reader(file))
    }
}
