use crate::error::BatchError;

/// Result of a single read: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<R> = Result<Option<R>, BatchError>;

/// Result of processing one item.
pub type ItemProcessorResult<W> = Result<W, BatchError>;

/// Result of writing a chunk of items.
pub type ItemWriterResult = Result<(), BatchError>;

/// Retrieves input for a step, one item at a time.
pub trait ItemReader<R> {
    /// Reads the next item.
    ///
    /// # Returns
    /// - `Ok(Some(item))` when an item was read
    /// - `Ok(None)` when there is nothing left to read
    /// - `Err(BatchError)` when the item could not be read
    fn read(&self) -> ItemReaderResult<R>;
}

/// Business logic applied to each item between reading and writing.
pub trait ItemProcessor<R, W> {
    fn process(&self, item: &R) -> ItemProcessorResult<W>;
}

/// Output of a step, one chunk of items at a time.
pub trait ItemWriter<W> {
    /// Writes every item of the chunk, in order.
    fn write(&self, items: &[W]) -> ItemWriterResult;

    fn flush(&self) -> ItemWriterResult {
        Ok(())
    }

    /// Called once before the first chunk is written.
    fn open(&self) -> ItemWriterResult {
        Ok(())
    }

    /// Called once after the last chunk was written.
    fn close(&self) -> ItemWriterResult {
        Ok(())
    }
}

/// Processor that forwards every item unchanged.
#[derive(Default)]
pub struct PassThroughProcessor;

impl<R: Clone> ItemProcessor<R, R> for PassThroughProcessor {
    fn process(&self, item: &R) -> ItemProcessorResult<R> {
        Ok(item.clone())
    }
}
