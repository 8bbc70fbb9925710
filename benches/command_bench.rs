use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Url;
use tinify::{
    resolve_proxy, Command, CommandSet, ConvertOptions, ImageType, ProxyCandidates, ResizeMethod,
    ResizeOption, ResultMeta, TransformOptions,
};

fn full_command_set() -> CommandSet {
    let mut commands = CommandSet::new();
    commands.insert(Command::Resize(ResizeOption::new(ResizeMethod::Cover, 640, 480)));
    commands.insert(Command::Convert(
        ConvertOptions::from_type_names(&["avif", "webp", "png"]).unwrap(),
    ));
    commands.insert(Command::Transform(TransformOptions::background("#ffffff")));
    commands
}

fn bench_command_serialization(c: &mut Criterion) {
    let commands = full_command_set();

    c.bench_function("command_set_to_json", |b| {
        b.iter(|| serde_json::to_vec(black_box(&commands)).unwrap())
    });
}

fn bench_convert_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert_options");

    for count in [1usize, 4, 16] {
        let names: Vec<&str> = ImageType::names().into_iter().cycle().take(count).collect();

        group.bench_with_input(BenchmarkId::new("from_type_names", count), &names, |b, names| {
            b.iter(|| ConvertOptions::from_type_names(black_box(names.as_slice())))
        });
    }

    group.finish();
}

fn bench_result_meta(c: &mut Criterion) {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("image/webp"));
    headers.insert("content-length", HeaderValue::from_static("48213"));
    headers.insert("compression-count", HeaderValue::from_static("417"));
    headers.insert("image-width", HeaderValue::from_static("640"));
    headers.insert("image-height", HeaderValue::from_static("480"));
    let meta = ResultMeta::new(headers);

    c.bench_function("result_meta_read", |b| {
        b.iter(|| {
            let meta = black_box(&meta);
            (
                meta.width(),
                meta.height(),
                meta.size(),
                meta.compression_count(),
                meta.media_type().len(),
            )
        })
    });
}

fn bench_proxy_resolution(c: &mut Criterion) {
    let target = Url::parse("https://api.tinify.com/shrink").unwrap();
    let env = |name: &str| match name {
        "HTTPS_PROXY" => Some("proxy.internal:3128".to_string()),
        "NO_PROXY" => Some("localhost,.example.com".to_string()),
        _ => None,
    };
    let candidates = ProxyCandidates::default();

    c.bench_function("resolve_proxy_from_env", |b| {
        b.iter(|| resolve_proxy(black_box(&candidates), &env, black_box(&target)))
    });
}

criterion_group!(
    benches,
    bench_command_serialization,
    bench_convert_options,
    bench_result_meta,
    bench_proxy_resolution
);
criterion_main!(benches);
