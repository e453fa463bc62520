//! Benchmark for structure summaries.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SOURCE: &str = r#"
import os
from pathlib import Path

class MyClass(BaseClass):
    """A test class with various methods."""

    def __init__(self, name: str, value: int = 0):
        self.name = name
        self.value = value

    def process(self, data: list[str]) -> dict[str, int]:
        """Process the data and return results."""
        result = {}
        for item in data:
            if item.startswith("_"):
                continue
            result[item] = len(item)
        return result

    @staticmethod
    def helper() -> None:
        pass

    @property
    def info(self) -> str:
        return f"{self.name}: {self.value}"

def main():
    obj = MyClass("test", 42)
    print(obj.info)
"#;

fn bench_summarize_python(c: &mut Criterion) {
    c.bench_function("summarize_python_file", |b| {
        b.iter(|| critic_core::parser::summarize(black_box(SOURCE)))
    });
}

fn bench_summarize_large_file(c: &mut Criterion) {
    let large = SOURCE.repeat(200);
    c.bench_function("summarize_python_200x", |b| {
        b.iter(|| critic_core::parser::summarize(black_box(&large)))
    });
}

criterion_group!(benches, bench_summarize_python, bench_summarize_large_file);
criterion_main!(benches);
