use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mg::{build_lexicon, continuations, generate_grammar, parse, Lexicon, SearchConfig};

fn english_fragment() -> Lexicon {
    build_lexicon(
        "the::N= D\n\
         a::N= D\n\
         cat::N\n\
         dog::N\n\
         man::N\n\
         John::D\n\
         Mary::D\n\
         sleeps::D= V\n\
         runs::D= V\n\
         sees::D= D= V\n\
         chases::D= D= V\n\
         will::D= V= T\n\
         that::T= C\n\
         who::T= C -wh",
    )
    .expect("fragment grammar is well-formed")
}

fn wh_fragment() -> Lexicon {
    build_lexicon(
        "what::D -wh\n\
         who::D -wh\n\
         book::N\n\
         person::N\n\
         John::D\n\
         Mary::D\n\
         read::D= D= V\n\
         saw::D= D= V\n\
         did::V= D= T\n\
         ::T= +wh C",
    )
    .expect("wh fragment grammar is well-formed")
}

fn bench_mg_parsing(c: &mut Criterion) {
    let english = english_fragment();
    let wh = wh_fragment();
    let cfg = SearchConfig::default();

    let simple_sentence = "the cat sleeps";
    let complex_sentence = "the dog chases the cat";
    let wh_question = "what did John read";

    let mut group = c.benchmark_group("MG Parsing");

    group.bench_function("simple sentence", |b| {
        b.iter(|| parse(&english, black_box(simple_sentence), "V", &cfg))
    });

    group.bench_function("complex sentence", |b| {
        b.iter(|| parse(&english, black_box(complex_sentence), "V", &cfg))
    });

    group.bench_function("wh-movement", |b| {
        b.iter(|| parse(&wh, black_box(wh_question), "C", &cfg))
    });

    group.finish();
}

fn bench_mg_generation(c: &mut Criterion) {
    let english = english_fragment();
    let mut cfg = SearchConfig::default();
    cfg.max_strings = 50;

    c.bench_function("generate_grammar english fragment", |b| {
        b.iter(|| generate_grammar(black_box(&english), "V", &cfg))
    });
}

fn bench_mg_continuations(c: &mut Criterion) {
    let english = english_fragment();
    let cfg = SearchConfig::default();

    c.bench_function("continuations after 'the cat'", |b| {
        b.iter(|| continuations(black_box(&english), "the cat", "V", &cfg))
    });
}

criterion_group!(
    benches,
    bench_mg_parsing,
    bench_mg_generation,
    bench_mg_continuations
);
criterion_main!(benches);
