use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::fmt::Write;
use xml_records::RecordStore;

fn generate(records: usize) -> String {
    let mut xml = String::from("<Productos>");
    for i in 0..records {
        write!(
            xml,
            "<Producto><Nombre>P{}</Nombre><Precio>{}</Precio><Icono>p{}.png</Icono></Producto>",
            i,
            i % 10,
            i
        )
        .unwrap();
    }
    xml.push_str("</Productos>");
    xml
}

fn parse(c: &mut Criterion) {
    let xml = generate(1000);
    c.bench_function("parse_1000", |b| {
        b.iter(|| RecordStore::parse_str(black_box(&xml)).unwrap())
    });
}

fn find_first(c: &mut Criterion) {
    let xml = generate(1000);
    let store = RecordStore::parse_str(&xml).unwrap();
    c.bench_function("find_first_last_of_1000", |b| {
        b.iter(|| store.find_first(black_box("Nombre"), black_box("P999")))
    });
}

fn summaries(c: &mut Criterion) {
    let xml = generate(1000);
    let store = RecordStore::parse_str(&xml).unwrap();
    c.bench_function("summaries_1000", |b| b.iter(|| store.summaries()));
}

criterion_group!(benches, parse, find_first, summaries);
criterion_main!(benches);
