mod common;

use std::io;

use common::MockFile;
use flatfile_batch_rs::{
    core::{
        item::{ItemProcessor, ItemProcessorResult},
        job::{Job, JobBuilder},
        step::{StepBuilder, StepStatus},
    },
    error::BatchError,
    item::flat::{
        codec::RecordCodec,
        delimited::{DelimitedCodec, DelimitedLineStrategy},
        field::FixedLayout,
        fixed::{FixedWidthCodec, FixedWidthLineStrategy},
        mapping::{Binding, RecordMapping},
        reader::FlatFileItemReaderBuilder,
        writer::FlatFileItemWriterBuilder,
    },
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Car {
    year: u16,
    make: String,
    model: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct CarLine {
    year: u16,
    label: String,
}

struct LabelProcessor;

impl ItemProcessor<Car, CarLine> for LabelProcessor {
    fn process(&self, item: &Car) -> ItemProcessorResult<CarLine> {
        Ok(CarLine {
            year: item.year,
            label: format!("{} {}", item.make, item.model).to_uppercase(),
        })
    }
}

fn csv_codec() -> DelimitedCodec<Car> {
    let mapping = RecordMapping::builder()
        .column("year", Binding::new(|c: &Car| &c.year, |c, v| c.year = v))
        .column("make", Binding::new(|c: &Car| &c.make, |c, v| c.make = v))
        .column("model", Binding::new(|c: &Car| &c.model, |c, v| c.model = v))
        .build()
        .expect("valid mapping");
    let strategy = DelimitedLineStrategy::builder()
        .always_qualify(false)
        .build()
        .expect("valid strategy");
    RecordCodec::new(mapping, strategy)
}

fn fixed_codec() -> FixedWidthCodec<CarLine> {
    let mapping = RecordMapping::builder()
        .fixed(
            "year",
            FixedLayout::new(0, 4),
            Binding::new(|c: &CarLine| &c.year, |c, v| c.year = v),
        )
        .fixed(
            "label",
            FixedLayout::new(4, 24),
            Binding::new(|c: &CarLine| &c.label, |c, v| c.label = v),
        )
        .build()
        .expect("valid mapping");
    RecordCodec::new(mapping, FixedWidthLineStrategy)
}

#[test]
fn transform_csv_to_fixed_width_without_error() {
    let _ = env_logger::builder().is_test(true).try_init();

    let csv = "year,make,model
1948,Porsche,356
1995,Peugeot,205
2021,Mazda,CX-30
1967,Ford,\"Mustang, fastback\"";

    let reader = FlatFileItemReaderBuilder::new(csv_codec())
        .has_header(true)
        .from_reader(csv.as_bytes());
    let writer = FlatFileItemWriterBuilder::new(fixed_codec()).from_writer(Vec::new());

    let step = StepBuilder::new("csv-to-fixed")
        .chunk::<Car, CarLine>(3)
        .reader(&reader)
        .processor(&LabelProcessor)
        .writer(&writer)
        .build()
        .expect("complete step");

    let job = JobBuilder::new().start(&step).build();
    let result = job.run();

    assert!(result.is_ok());
    let execution = job.get_step_execution("csv-to-fixed").unwrap();
    assert_eq!(execution.status, StepStatus::Success);
    assert_eq!(execution.read_count, 4);
    assert_eq!(execution.write_count, 4);

    drop(job);
    drop(step);
    let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(
        output,
        "1948             PORSCHE 356
1995             PEUGEOT 205
2021             MAZDA CX-30
1967  FORD MUSTANG, FASTBACK
"
    );
}

#[test]
fn transform_csv_to_fixed_width_with_error_in_the_middle() {
    let csv = "1948,Porsche,356
1995,Peugeot,205
19x1,Mazda,CX-30
1967,Ford,Mustang";

    let reader = FlatFileItemReaderBuilder::new(csv_codec()).from_reader(csv.as_bytes());
    let writer = FlatFileItemWriterBuilder::new(fixed_codec()).from_writer(Vec::new());

    let step = StepBuilder::new("csv-to-fixed")
        .chunk::<Car, CarLine>(2)
        .reader(&reader)
        .processor(&LabelProcessor)
        .writer(&writer)
        .build()
        .expect("complete step");

    let job = JobBuilder::new().start(&step).build();
    let result = job.run();

    assert!(matches!(result, Err(BatchError::Step(_))));
    let execution = job.get_step_execution("csv-to-fixed").unwrap();
    assert_eq!(execution.status, StepStatus::ReadError);
    assert_eq!(execution.read_count, 2);
    assert_eq!(execution.write_count, 2);

    drop(job);
    drop(step);
    let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    assert_eq!(output.lines().count(), 2);
}

#[test]
fn header_mismatch_should_fail_the_step_before_any_write() {
    let csv = "year,brand,model
1948,Porsche,356";

    let reader = FlatFileItemReaderBuilder::new(csv_codec())
        .has_header(true)
        .from_reader(csv.as_bytes());
    let writer = FlatFileItemWriterBuilder::new(fixed_codec()).from_writer(Vec::new());

    let step = StepBuilder::new("csv-to-fixed")
        .chunk::<Car, CarLine>(10)
        .reader(&reader)
        .processor(&LabelProcessor)
        .writer(&writer)
        .build()
        .expect("complete step");

    let job = JobBuilder::new().start(&step).build();

    assert!(job.run().is_err());
    assert_eq!(job.get_step_execution("csv-to-fixed").unwrap().write_count, 0);
}

#[test]
fn failing_output_should_end_step_with_write_error() {
    let csv = "1948,Porsche,356";

    let mut file = MockFile::default();
    file.expect_write()
        .returning(|_| Err(io::Error::other("disk full")));

    let reader = FlatFileItemReaderBuilder::new(csv_codec()).from_reader(csv.as_bytes());
    let writer = FlatFileItemWriterBuilder::new(fixed_codec()).from_writer(file);

    let step = StepBuilder::new("csv-to-fixed")
        .chunk::<Car, CarLine>(1)
        .reader(&reader)
        .processor(&LabelProcessor)
        .writer(&writer)
        .build()
        .expect("complete step");

    let job = JobBuilder::new().start(&step).build();

    assert!(job.run().is_err());
    assert_eq!(
        job.get_step_execution("csv-to-fixed").unwrap().status,
        StepStatus::WriteError
    );
}
