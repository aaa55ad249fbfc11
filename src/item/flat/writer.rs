use std::{
    cell::{Cell, RefCell},
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::debug;

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::BatchError,
};

use super::codec::{LineStrategy, RecordCodec};

/// Item writer turning each record into one line of text.
///
/// When headers are enabled the field names are written once, either when the
/// writer is opened or right before the first record, whichever comes first.
///
/// Lines are written as soon as they are rendered: when a record of a chunk
/// fails, the lines of the records before it stay in the output.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "fixed-width")]
/// # fn main() {
/// use flatfile_batch_rs::core::item::ItemWriter;
/// use flatfile_batch_rs::item::flat::codec::RecordCodec;
/// use flatfile_batch_rs::item::flat::field::FixedLayout;
/// use flatfile_batch_rs::item::flat::fixed::FixedWidthLineStrategy;
/// use flatfile_batch_rs::item::flat::mapping::{Binding, RecordMapping};
/// use flatfile_batch_rs::item::flat::writer::FlatFileItemWriterBuilder;
///
/// #[derive(Default)]
/// struct Stock {
///     code: String,
///     qty: u32,
/// }
///
/// let mapping = RecordMapping::builder()
///     .fixed("code", FixedLayout::new(0, 4), Binding::new(|s: &Stock| &s.code, |s, v| s.code = v))
///     .fixed("qty", FixedLayout::new(4, 5).padding('0'), Binding::new(|s: &Stock| &s.qty, |s, v| s.qty = v))
///     .build()
///     .unwrap();
///
/// let writer = FlatFileItemWriterBuilder::new(RecordCodec::new(mapping, FixedWidthLineStrategy))
///     .from_writer(Vec::new());
///
/// writer.write(&[Stock { code: "AB".to_string(), qty: 42 }]).unwrap();
///
/// let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
/// assert_eq!(output, "  AB00042\n");
/// # }
/// # #[cfg(not(feature = "fixed-width"))]
/// # fn main() {}
/// ```
pub struct FlatFileItemWriter<W: Write, T, S: LineStrategy> {
    stream: RefCell<W>,
    codec: RecordCodec<T, S>,
    header_pending: Cell<bool>,
    line_separator: String,
}

impl<W: Write, T, S: LineStrategy> FlatFileItemWriter<W, T, S> {
    /// Flushes and returns the underlying stream.
    pub fn into_inner(self) -> Result<W, BatchError> {
        let mut stream = self.stream.into_inner();
        stream.flush()?;
        Ok(stream)
    }

    fn write_line(&self, line: &str) -> Result<(), BatchError> {
        let mut stream = self.stream.borrow_mut();
        stream.write_all(line.as_bytes())?;
        stream.write_all(self.line_separator.as_bytes())?;
        Ok(())
    }

    fn write_header(&self) -> Result<(), BatchError> {
        if self.header_pending.get() {
            let header = self.codec.header()?;
            debug!("Writing header: {}", header);
            self.write_line(&header)?;
            self.header_pending.set(false);
        }
        Ok(())
    }
}

impl<W: Write, T, S: LineStrategy> ItemWriter<T> for FlatFileItemWriter<W, T, S> {
    /// Writes one line per record, in order.
    ///
    /// # Errors
    /// The first record that cannot be converted or written aborts the call.
    fn write(&self, items: &[T]) -> ItemWriterResult {
        self.write_header()?;

        for item in items {
            let line = self.codec.serialize(item)?;
            self.write_line(&line)?;
        }

        debug!("{} lines written", items.len());
        Ok(())
    }

    fn flush(&self) -> ItemWriterResult {
        self.stream.borrow_mut().flush()?;
        Ok(())
    }

    fn open(&self) -> ItemWriterResult {
        self.write_header()
    }
}

/// A builder for configuring flat file item writing.
///
/// # Default Configuration
///
/// - Headers: disabled
/// - Line separator: `\n`
pub struct FlatFileItemWriterBuilder<T, S: LineStrategy> {
    codec: RecordCodec<T, S>,
    has_header: bool,
    line_separator: String,
}

impl<T, S: LineStrategy> FlatFileItemWriterBuilder<T, S> {
    pub fn new(codec: RecordCodec<T, S>) -> Self {
        Self {
            codec,
            has_header: false,
            line_separator: String::from("\n"),
        }
    }

    /// Sets whether a line holding the field names is written first.
    pub fn has_header(mut self, yes: bool) -> Self {
        self.has_header = yes;
        self
    }

    /// Sets the text written after every line, e.g. `"\r\n"`.
    pub fn line_separator(mut self, separator: &str) -> Self {
        self.line_separator = separator.to_owned();
        self
    }

    pub fn from_writer<W: Write>(self, wtr: W) -> FlatFileItemWriter<W, T, S> {
        FlatFileItemWriter {
            stream: RefCell::new(wtr),
            codec: self.codec,
            header_pending: Cell::new(self.has_header),
            line_separator: self.line_separator,
        }
    }

    /// Creates (or truncates) the file at `path`.
    ///
    /// # Errors
    /// Returns [`BatchError::Io`] when the file cannot be created.
    pub fn from_path<P: AsRef<Path>>(
        self,
        path: P,
    ) -> Result<FlatFileItemWriter<BufWriter<File>, T, S>, BatchError> {
        let file = File::create(path)?;
        Ok(self.from_writer(BufWriter::new(file)))
    }
}
