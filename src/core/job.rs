use std::{
    cell::RefCell,
    time::{Duration, Instant},
};

use log::info;
use uuid::Uuid;

use crate::error::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
///
/// A `JobResult` is a `Result` that contains either:
/// - A successful `JobExecution` with timing details
/// - A `BatchError` naming the step that failed
type JobResult<T> = Result<T, BatchError>;

/// A batch job: a sequence of steps executed in order.
///
/// A job owns no items itself. It orchestrates its steps, records one
/// [`StepExecution`] per step that ran and reports the overall result.
///
/// # Design Pattern
///
/// The `Job` trait follows the Command Pattern: a job is an operation that can
/// be executed on demand and keeps track of its own execution details.
///
/// # Implementation Note
///
/// Implementations of this trait should:
/// - Execute the steps in the order they were declared
/// - Stop at the first failing step, without running the following ones
/// - Return execution details upon completion
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when every step succeeded
    /// - `Err(BatchError)` as soon as one step failed
    fn run(&self) -> JobResult<JobExecution>;
}

/// Timing information about a job run.
///
/// Counters are kept per step in [`StepExecution`]; a `JobExecution` only
/// tells when the job started, when it ended and how long it took.
#[derive(Debug)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
}

/// A configured job, created through [`JobBuilder`].
///
/// The instance borrows its steps, so the readers and writers they use stay
/// owned by the caller and can be inspected once the job is dropped.
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
    /// Executions of the steps that ran during the last run
    executions: RefCell<Vec<StepExecution>>,
}

impl JobInstance<'_> {
    /// Returns the name of the job, generated when the builder had none.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the execution of the step named `name`, if it ran.
    ///
    /// # Parameters
    /// - `name`: The name given to the step in its `StepBuilder`
    ///
    /// # Returns
    /// - `Some(StepExecution)` for a step that ran during the last run, whether
    ///   it succeeded or failed
    /// - `None` for an unknown step or a step skipped after an earlier failure
    pub fn get_step_execution(&self, name: &str) -> Option<StepExecution> {
        self.executions
            .borrow()
            .iter()
            .find(|execution| execution.name == name)
            .cloned()
    }
}

impl Job for JobInstance<'_> {
    /// Runs the steps in sequence, stopping at the first failing step.
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        self.executions.borrow_mut().clear();

        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution);
            self.executions.borrow_mut().push(step_execution);

            // If a step fails, abort the job and return an error
            result?;
        }

        info!("End of job: {}, id: {}", self.name, self.id);

        Ok(JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
        })
    }
}

/// Builder for creating a job instance.
///
/// # Design Pattern
///
/// Implements the Builder Pattern so that a job can be assembled step by step
/// with a fluent interface; only the steps are required.
///
/// # Example
///
/// ```rust,ignore
/// let job = JobBuilder::new()
///     .name("import-customers".to_string())
///     .start(&read_step)
///     .next(&write_step)
///     .build();
/// ```
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    /// Creates a builder with no name and no step.
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    /// Sets the name of the job.
    ///
    /// # Parameters
    /// - `name`: The name reported in the logs
    ///
    /// # Returns
    /// The updated `JobBuilder` instance
    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// # Parameters
    /// - `step`: The step executed first
    ///
    /// # Returns
    /// The updated `JobBuilder` instance
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps are executed in the order they are added.
    ///
    /// # Parameters
    /// - `step`: The step executed after the ones already added
    ///
    /// # Returns
    /// The updated `JobBuilder` instance
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Builds the job. A random name is generated when none was provided.
    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
            executions: RefCell::new(Vec::new()),
        }
    }
}
