use std::time::{Duration, Instant};

use log::{debug, error, info};
use uuid::Uuid;

use crate::error::BatchError;

use super::item::{ItemProcessor, ItemReader, ItemWriter};

/// Status of a step execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step has been created but not run to completion yet.
    Starting,
    /// Every item was read, processed and written.
    Success,
    /// Reading an item failed.
    ReadError,
    /// Processing an item failed.
    ProcessorError,
    /// Opening, writing, flushing or closing the writer failed.
    WriteError,
}

/// Outcome and counters of one step run.
#[derive(Debug, Clone)]
pub struct StepExecution {
    /// Unique identifier for this step run
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    pub status: StepStatus,
    pub start_time: Instant,
    pub end_time: Instant,
    pub duration: Duration,
    /// Number of items successfully read
    pub read_count: usize,
    /// Number of items successfully processed
    pub process_count: usize,
    /// Number of items successfully written
    pub write_count: usize,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            status: StepStatus::Starting,
            start_time: now,
            end_time: now,
            duration: Duration::ZERO,
            read_count: 0,
            process_count: 0,
            write_count: 0,
        }
    }
}

/// An independent, sequential phase of a job.
///
/// # Design Pattern
///
/// Like [`Job`](super::job::Job), a step follows the Command Pattern: it is
/// executed on demand and fills the [`StepExecution`] it is given with its
/// status, timing and counters.
pub trait Step {
    /// Returns the name used to look the step execution up after a run.
    fn get_name(&self) -> &str;

    /// Executes the step.
    ///
    /// # Returns
    /// - `Ok(())`: the step completed successfully
    /// - `Err(BatchError::Step)`: the step failed; details are in `step_execution`
    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError>;
}

#[derive(Debug, PartialEq)]
enum ChunkStatus {
    /// The chunk is full, more items may follow.
    Full,
    /// The reader is exhausted.
    Finished,
}

/// Step reading, processing and writing items chunk by chunk.
///
/// The step stops at the first failing item: there is no skip policy. Items
/// written by previous chunks stay written.
///
/// # Execution Flow
///
/// 1. The writer is opened (a flat file writer emits its header there)
/// 2. Up to `chunk_size` items are read
/// 3. Every item of the chunk is processed
/// 4. The processed chunk is written, then the writer is flushed
/// 5. Steps 2 to 4 repeat until the reader is exhausted
/// 6. The writer is closed, even when a phase failed
///
/// The phase that failed is recorded in [`StepExecution::status`].
pub struct ChunkOrientedStep<'a, I, O> {
    name: String,
    reader: &'a dyn ItemReader<I>,
    processor: &'a dyn ItemProcessor<I, O>,
    writer: &'a dyn ItemWriter<O>,
    chunk_size: usize,
}

impl<I, O> Step for ChunkOrientedStep<'_, I, O> {
    fn get_name(&self) -> &str {
        &self.name
    }

    fn execute(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        let start_time = Instant::now();
        step_execution.status = StepStatus::Starting;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let result = self.run_chunks(step_execution);

        // The writer is closed even when a chunk failed.
        let close_result = self.writer.close();

        let result = match (result, close_result) {
            (Ok(()), Err(close_error)) => {
                step_execution.status = StepStatus::WriteError;
                Err(close_error)
            }
            (result, _) => result,
        };

        step_execution.start_time = start_time;
        step_execution.end_time = Instant::now();
        step_execution.duration = start_time.elapsed();

        info!(
            "End of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        match result {
            Ok(()) => {
                step_execution.status = StepStatus::Success;
                Ok(())
            }
            Err(error) => {
                error!(
                    "Step {} failed with status {:?}: {}",
                    step_execution.name, step_execution.status, error
                );
                Err(BatchError::Step(step_execution.name.clone()))
            }
        }
    }
}

impl<I, O> ChunkOrientedStep<'_, I, O> {
    fn run_chunks(&self, step_execution: &mut StepExecution) -> Result<(), BatchError> {
        if let Err(error) = self.writer.open() {
            step_execution.status = StepStatus::WriteError;
            return Err(error);
        }

        loop {
            let (read_items, chunk_status) = match self.read_chunk(step_execution) {
                Ok(chunk) => chunk,
                Err(error) => {
                    step_execution.status = StepStatus::ReadError;
                    return Err(error);
                }
            };

            if !read_items.is_empty() {
                let processed_items = match self.process_chunk(step_execution, &read_items) {
                    Ok(items) => items,
                    Err(error) => {
                        step_execution.status = StepStatus::ProcessorError;
                        return Err(error);
                    }
                };

                if let Err(error) = self.write_chunk(step_execution, &processed_items) {
                    step_execution.status = StepStatus::WriteError;
                    return Err(error);
                }
            }

            if chunk_status == ChunkStatus::Finished {
                return Ok(());
            }
        }
    }

    /// Reads up to `chunk_size` items.
    fn read_chunk(
        &self,
        step_execution: &mut StepExecution,
    ) -> Result<(Vec<I>, ChunkStatus), BatchError> {
        debug!("Start reading chunk");

        let mut read_items = Vec::with_capacity(self.chunk_size);

        while read_items.len() < self.chunk_size {
            match self.reader.read()? {
                Some(item) => {
                    read_items.push(item);
                    step_execution.read_count += 1;
                }
                None => {
                    debug!("End reading chunk: FINISHED");
                    return Ok((read_items, ChunkStatus::Finished));
                }
            }
        }

        debug!("End reading chunk: FULL");
        Ok((read_items, ChunkStatus::Full))
    }

    fn process_chunk(
        &self,
        step_execution: &mut StepExecution,
        read_items: &[I],
    ) -> Result<Vec<O>, BatchError> {
        debug!("Processing chunk of {} items", read_items.len());

        let mut result = Vec::with_capacity(read_items.len());
        for item in read_items {
            result.push(self.processor.process(item)?);
            step_execution.process_count += 1;
        }

        Ok(result)
    }

    fn write_chunk(
        &self,
        step_execution: &mut StepExecution,
        processed_items: &[O],
    ) -> Result<(), BatchError> {
        debug!("Start writing chunk of {} items", processed_items.len());

        self.writer.write(processed_items)?;
        self.writer.flush()?;
        step_execution.write_count += processed_items.len();

        debug!("End writing chunk");
        Ok(())
    }
}

/// Entry point for building a step.
///
/// # Examples
///
/// ```
/// use flatfile_batch_rs::core::item::{ItemReader, ItemReaderResult, ItemWriter, ItemWriterResult, PassThroughProcessor};
/// use flatfile_batch_rs::core::step::{Step, StepBuilder, StepExecution};
/// use std::cell::RefCell;
///
/// struct Numbers(RefCell<Vec<u32>>);
///
/// impl ItemReader<u32> for Numbers {
///     fn read(&self) -> ItemReaderResult<u32> {
///         Ok(self.0.borrow_mut().pop())
///     }
/// }
///
/// #[derive(Default)]
/// struct Sum(RefCell<u32>);
///
/// impl ItemWriter<u32> for Sum {
///     fn write(&self, items: &[u32]) -> ItemWriterResult {
///         *self.0.borrow_mut() += items.iter().sum::<u32>();
///         Ok(())
///     }
/// }
///
/// let reader = Numbers(RefCell::new(vec![1, 2, 3, 4, 5]));
/// let writer = Sum::default();
///
/// let step = StepBuilder::new("sum")
///     .chunk::<u32, u32>(2)
///     .reader(&reader)
///     .processor(&PassThroughProcessor)
///     .writer(&writer)
///     .build()
///     .unwrap();
///
/// let mut execution = StepExecution::new(step.get_name());
/// step.execute(&mut execution).unwrap();
///
/// assert_eq!(*writer.0.borrow(), 15);
/// assert_eq!(execution.read_count, 5);
/// ```
pub struct StepBuilder {
    name: String,
}

impl StepBuilder {
    /// Creates a builder for a step named `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    /// Starts a chunk-oriented step committing every `chunk_size` items.
    ///
    /// # Parameters
    /// - `chunk_size`: The number of items read, processed and written together
    ///
    /// # Returns
    /// A `ChunkOrientedStepBuilder` waiting for its reader, processor and writer
    pub fn chunk<'a, I, O>(self, chunk_size: usize) -> ChunkOrientedStepBuilder<'a, I, O> {
        ChunkOrientedStepBuilder {
            name: self.name,
            reader: None,
            processor: None,
            writer: None,
            chunk_size,
        }
    }
}

/// Builder of a [`ChunkOrientedStep`].
///
/// The reader, the processor and the writer are all required and borrowed for
/// the lifetime of the step.
pub struct ChunkOrientedStepBuilder<'a, I, O> {
    name: String,
    reader: Option<&'a dyn ItemReader<I>>,
    processor: Option<&'a dyn ItemProcessor<I, O>>,
    writer: Option<&'a dyn ItemWriter<O>>,
    chunk_size: usize,
}

impl<'a, I, O> ChunkOrientedStepBuilder<'a, I, O> {
    /// Sets the item reader.
    ///
    /// # Parameters
    /// - `reader`: The source of the items, read one by one
    ///
    /// # Returns
    /// The updated builder instance
    pub fn reader(mut self, reader: &'a impl ItemReader<I>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Sets the processor; use `PassThroughProcessor` to forward items unchanged.
    pub fn processor(mut self, processor: &'a impl ItemProcessor<I, O>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Sets the item writer.
    ///
    /// # Parameters
    /// - `writer`: The destination of the processed items, written chunk by chunk
    ///
    /// # Returns
    /// The updated builder instance
    pub fn writer(mut self, writer: &'a impl ItemWriter<O>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// # Errors
    /// Returns [`BatchError::Configuration`] when the reader, the processor or
    /// the writer is missing, or when the chunk size is zero.
    pub fn build(self) -> Result<ChunkOrientedStep<'a, I, O>, BatchError> {
        let missing = |part: &str| {
            BatchError::Configuration(format!("step '{}' has no {}", self.name, part))
        };

        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(format!(
                "step '{}' has a chunk size of 0",
                self.name
            )));
        }

        let reader = self.reader.ok_or_else(|| missing("reader"))?;
        let processor = self.processor.ok_or_else(|| missing("processor"))?;
        let writer = self.writer.ok_or_else(|| missing("writer"))?;

        Ok(ChunkOrientedStep {
            name: self.name.clone(),
            reader,
            processor,
            writer,
            chunk_size: self.chunk_size,
        })
    }
}
