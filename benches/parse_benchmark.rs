use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::fs;
use tempfile::TempDir;

use iac_scan::discovery::Loader;
use iac_scan::parser::{ContentParser, ParseContext, ParserRegistry, YamlParser, parse_hcl};
use iac_scan::types::{FileType, SourceFile};

fn terraform_module(resources: usize) -> String {
    (0..resources)
        .map(|i| {
            format!(
                r#"resource "aws_security_group" "sg_{i}" {{
  name = "sg-${{var.env}}-{i}"

  ingress {{
    from_port   = {port}
    to_port     = {port}
    cidr_blocks = ["10.0.{i}.0/24"]
  }}
}}
"#,
                port = 1000 + i
            )
        })
        .collect()
}

fn manifests(documents: usize) -> String {
    (0..documents)
        .map(|i| {
            format!(
                "apiVersion: v1\nkind: Pod\nmetadata:\n  name: pod-{i}\nspec:\n  containers:\n    - name: app\n      image: nginx:1.{i}\n      securityContext:\n        privileged: false\n"
            )
        })
        .collect::<Vec<_>>()
        .join("---\n")
}

fn bench_hcl(c: &mut Criterion) {
    let mut group = c.benchmark_group("hcl_parse");
    for count in [10, 100].iter() {
        let content = terraform_module(*count);
        group.bench_with_input(BenchmarkId::new("resources", count), count, |b, _| {
            b.iter(|| parse_hcl(black_box(&content)))
        });
    }
    group.finish();
}

fn bench_yaml(c: &mut Criterion) {
    let parser = YamlParser::new();
    let context = ParseContext::default();
    let mut group = c.benchmark_group("yaml_parse");
    for count in [10, 100].iter() {
        let source = SourceFile::new("pods.yaml", FileType::Yaml, manifests(*count));
        group.bench_with_input(BenchmarkId::new("documents", count), count, |b, _| {
            b.iter(|| parser.parse(black_box(&source), &context))
        });
    }
    group.finish();
}

fn bench_directory(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("variables.tf"),
        "variable \"env\" {\n  default = \"prod\"\n}\n",
    )
    .unwrap();
    for i in 0..20 {
        fs::write(temp_dir.path().join(format!("sg_{i}.tf")), terraform_module(5)).unwrap();
    }
    let loader = Loader::default();
    let registry = ParserRegistry::new();

    c.bench_function("directory_load_and_parse", |b| {
        b.iter(|| {
            let outcome = loader.load(black_box(temp_dir.path())).unwrap();
            registry.parse_loaded(&outcome).unwrap()
        })
    });
}

criterion_group!(benches, bench_hcl, bench_yaml, bench_directory);
criterion_main!(benches);
