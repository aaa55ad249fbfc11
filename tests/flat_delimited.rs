mod common;

use std::io;

use anyhow::Result;
use common::MockFile;
use flatfile_batch_rs::{
    core::item::{ItemReader, ItemWriter},
    error::BatchError,
    item::flat::{
        codec::RecordCodec,
        delimited::{DelimitedCodec, DelimitedLineStrategy},
        field::DelimitedLayout,
        mapping::{Binding, BoolConverter, DisplayConverter, OptionalConverter, RecordMapping},
        reader::FlatFileItemReaderBuilder,
        writer::FlatFileItemWriterBuilder,
    },
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Product {
    id: String,
    name: String,
    price: f64,
    description: Option<String>,
    available: bool,
}

fn mapping() -> RecordMapping<Product, DelimitedLayout> {
    RecordMapping::builder()
        .column("id", Binding::new(|p: &Product| &p.id, |p, v| p.id = v))
        .column("name", Binding::new(|p: &Product| &p.name, |p, v| p.name = v))
        .column(
            "price",
            Binding::new(|p: &Product| &p.price, |p, v| p.price = v),
        )
        .column(
            "description",
            Binding::converted(
                |p: &Product| &p.description,
                |p, v| p.description = v,
                OptionalConverter::new(DisplayConverter),
            ),
        )
        .column(
            "available",
            Binding::converted(
                |p: &Product| &p.available,
                |p, v| p.available = v,
                BoolConverter::default(),
            ),
        )
        .build()
        .expect("valid mapping")
}

fn codec(strategy: DelimitedLineStrategy) -> DelimitedCodec<Product> {
    RecordCodec::new(mapping(), strategy)
}

fn products() -> Vec<Product> {
    vec![
        Product {
            id: "P001".to_string(),
            name: "Wireless Headphones".to_string(),
            price: 79.99,
            description: Some("Noise-cancelling, 20hr battery".to_string()),
            available: true,
        },
        Product {
            id: "P002".to_string(),
            name: "USB-C Cable".to_string(),
            price: 12.99,
            description: None,
            available: false,
        },
        Product {
            id: "P003".to_string(),
            name: "Smart Watch; v2".to_string(),
            price: 149.99,
            description: Some("Fitness tracker".to_string()),
            available: true,
        },
    ]
}

fn round_trip(strategy: DelimitedLineStrategy, has_header: bool) -> Result<Vec<Product>> {
    let writer = FlatFileItemWriterBuilder::new(codec(strategy))
        .has_header(has_header)
        .from_writer(Vec::new());
    writer.write(&products())?;
    let output = writer.into_inner()?;

    let reader = FlatFileItemReaderBuilder::new(codec(strategy))
        .has_header(has_header)
        .from_reader(output.as_slice());

    Ok(reader.read_all()?)
}

#[test]
fn records_should_survive_a_round_trip_with_default_settings() -> Result<()> {
    let records = round_trip(DelimitedLineStrategy::default(), true)?;

    assert_eq!(records, products());
    Ok(())
}

#[test]
fn records_should_survive_a_round_trip_with_minimal_qualifying() -> Result<()> {
    let strategy = DelimitedLineStrategy::builder()
        .delimiter(';')
        .qualifier('\'')
        .always_qualify(false)
        .build()?;

    let records = round_trip(strategy, false)?;

    assert_eq!(records, products());
    Ok(())
}

#[test]
fn only_fields_containing_the_delimiter_should_be_qualified() -> Result<()> {
    let strategy = DelimitedLineStrategy::builder()
        .always_qualify(false)
        .build()?;

    let line = codec(strategy).serialize(&products()[0])?;

    assert_eq!(
        line,
        "P001,Wireless Headphones,79.99,\"Noise-cancelling, 20hr battery\",true"
    );
    Ok(())
}

#[test]
fn header_mismatch_should_fail_before_reading_rows() {
    let data = "id,title,price,description,available\nP001,Headphones,79.99,,true\n";

    let reader = FlatFileItemReaderBuilder::new(codec(DelimitedLineStrategy::default()))
        .has_header(true)
        .from_reader(data.as_bytes());

    let result = reader.read();

    assert!(matches!(result, Err(BatchError::Structure(message)) if message.contains("header")));
    assert_eq!(reader.read_count(), 0);
}

#[test]
fn reader_should_keep_failing_after_header_mismatch() {
    let data = "wrong,header\nP001,Headphones,79.99,,true\nP002,Cable,12.99,,false\n";

    let reader = FlatFileItemReaderBuilder::new(codec(DelimitedLineStrategy::default()))
        .has_header(true)
        .from_reader(data.as_bytes());

    assert!(matches!(reader.read(), Err(BatchError::Structure(_))));
    assert!(matches!(reader.read(), Err(BatchError::Structure(_))));
    assert_eq!(reader.read_count(), 0);
}

#[test]
fn quoted_header_should_match_field_names() -> Result<()> {
    let data = "\"id\",\"name\",\"price\",\"description\",\"available\"\n\"P9\",\"Pen\",\"1.5\",\"\",\"false\"\n";

    let reader = FlatFileItemReaderBuilder::new(codec(DelimitedLineStrategy::default()))
        .has_header(true)
        .from_reader(data.as_bytes());

    let records = reader.read_all()?;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Pen");
    assert_eq!(records[0].description, None);
    Ok(())
}

#[test]
fn bad_value_should_fail_the_whole_read() {
    let data = "P001,Headphones,79.99,,true\nP002,Cable,twelve,,false\nP003,Watch,149.99,,true\n";

    let reader = FlatFileItemReaderBuilder::new(codec(DelimitedLineStrategy::default()))
        .from_reader(data.as_bytes());

    let result = reader.read_all();

    match result {
        Err(BatchError::Conversion { field, .. }) => assert_eq!(field, "price"),
        other => panic!("expected a conversion error, got {:?}", other),
    }
}

#[test]
fn max_items_should_limit_the_records_read() -> Result<()> {
    let data = "P001,Headphones,79.99,,true\nP002,Cable,12.99,,false\nP003,Watch,149.99,,true\n";

    let reader = FlatFileItemReaderBuilder::new(codec(DelimitedLineStrategy::default()))
        .max_items(2)
        .from_reader(data.as_bytes());

    let records = reader.read_all()?;

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].id, "P002");
    Ok(())
}

#[test]
fn line_with_unterminated_qualifier_should_lose_its_last_field() -> Result<()> {
    let codec = codec(DelimitedLineStrategy::default());

    let product = codec.deserialize("P001,Headphones,79.99,,\"true")?;

    assert_eq!(product.price, 79.99);
    assert!(!product.available);
    Ok(())
}

#[test]
fn file_round_trip_should_preserve_records() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("products.csv");

    let writer = FlatFileItemWriterBuilder::new(codec(DelimitedLineStrategy::default()))
        .has_header(true)
        .from_path(&path)?;
    writer.write(&products())?;
    ItemWriter::<Product>::flush(&writer)?;
    drop(writer);

    let reader = FlatFileItemReaderBuilder::new(codec(DelimitedLineStrategy::default()))
        .has_header(true)
        .from_path(&path)?;

    assert_eq!(reader.read_all()?, products());
    Ok(())
}

#[test]
fn strategy_should_load_from_json_config() -> Result<()> {
    let strategy: DelimitedLineStrategy =
        serde_json::from_str(r#"{"delimiter": "|", "qualifier": "'", "always_qualify": false}"#)?;

    let line = codec(strategy).serialize(&products()[1])?;

    assert_eq!(line, "P002|USB-C Cable|12.99||false");
    Ok(())
}

#[test]
fn writer_failure_should_be_reported() {
    let mut file = MockFile::default();
    file.expect_write()
        .returning(|_| Err(io::Error::other("disk full")));

    let writer = FlatFileItemWriterBuilder::new(codec(DelimitedLineStrategy::default()))
        .from_writer(file);

    let result = writer.write(&products());

    assert!(matches!(result, Err(BatchError::Io(_))));
}
