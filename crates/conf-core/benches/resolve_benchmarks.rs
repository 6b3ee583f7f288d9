use conf_core::{LayerMerger, Resolver};
use conf_model::{Configuration, Layer, ParamType};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn layered_configuration(categories: usize, params: usize) -> Configuration {
    let mut base = Layer::new("base");
    let mut user = Layer::new("user");
    for c in 0..categories {
        let category = format!("cat{}", c);
        base.push(&category, "root", "1", Some(ParamType::Int));
        for p in 0..params {
            let name = format!("p{}", p);
            let previous = if p == 0 { "root".to_string() } else { format!("p{}", p - 1) };
            base.push(&category, name.as_str(), format!("=@{} + 1", previous), Some(ParamType::Int));
            user.push(&category, name.as_str(), format!("=@.{} * 2", name), None);
        }
    }
    LayerMerger::new().merge(&[base, user]).unwrap()
}

fn resolve_benchmark(c: &mut Criterion) {
    c.bench_function("Resolver::resolve (10x20 chained, 2 layers)", |b| {
        let conf = layered_configuration(10, 20);
        let resolver = Resolver::default();

        b.iter(|| {
            let mut conf = conf.clone();
            let resolution = resolver.resolve(black_box(&mut conf));
            assert!(resolution.is_complete());
        })
    });
}

fn merge_benchmark(c: &mut Criterion) {
    c.bench_function("LayerMerger::merge (template instantiation)", |b| {
        let mut defaults = Layer::new("defaults");
        defaults.push("net", "port_.*", "0", Some(ParamType::Int));
        let mut user = Layer::new("user");
        for i in 0..200 {
            user.push("net", format!("port_{}", i), i.to_string(), None);
        }
        let merger = LayerMerger::new();

        b.iter(|| {
            let _ = merger.merge(black_box([&defaults, &user])).unwrap();
        })
    });
}

fn text_expansion_benchmark(c: &mut Criterion) {
    c.bench_function("Resolver::resolve (text tokens)", |b| {
        let conf = LayerMerger::new()
            .merge(&[Layer::new("base")
                .with("A", "host", "example.org", None)
                .with("A", "port", "8080", Some(ParamType::Int))
                .with("A", "url", "https://@host:@port/%1 + 1%/\\@literal", None)])
            .unwrap();
        let resolver = Resolver::default();

        b.iter(|| {
            let mut conf = conf.clone();
            resolver.resolve(black_box(&mut conf))
        })
    });
}

criterion_group!(benches, resolve_benchmark, merge_benchmark, text_expansion_benchmark);
criterion_main!(benches);
