#![deny(warnings)]
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use gcodebuilder::{AbsolutePos, CommentFlags, GCodeBuilder, Scalar, Workspace, decode};

/// Drawing of `count` random circles and lines inside of the default workspace
fn random_drawing(count: usize) -> GCodeBuilder {
    let mut rnd = Rnd::new();
    let mut builder = GCodeBuilder::new(Workspace::default());
    builder.set_comments(true, true);
    for _ in 0..count {
        let center = AbsolutePos::new(rnd.uniform() * 60.0 + 10.0, rnd.uniform() * 60.0 + 10.0);
        let radius = rnd.uniform() * 8.0 + 1.0;
        // every primitive stays inside the 80x80 drawing space
        builder
            .draw_circle(center, radius)
            .expect("circle inside of the workspace");
        builder
            .draw_line(rnd.point(80.0), rnd.point(80.0))
            .expect("line inside of the workspace");
    }
    builder
}

fn build_benchmark(c: &mut Criterion) {
    let count = 1024;
    let mut group = c.benchmark_group("build");
    group.throughput(Throughput::Elements(count as u64));
    group.bench_function("build", |b| b.iter_with_large_drop(|| random_drawing(count)));

    let builder = random_drawing(count);
    group.bench_function("serialize", |b| b.iter_with_large_drop(|| builder.to_string()));
    group.finish();
}

fn decode_benchmark(c: &mut Criterion) {
    let count = 1024;
    let mut builder = random_drawing(count);
    builder.set_preamble("").set_postamble("");
    let text = builder.to_string();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("decode", |b| b.iter_with_large_drop(|| decode(&text)));

    let commands = decode(&text).expect("generated G-code decodes");
    group.bench_function("render", |b| {
        b.iter_with_large_drop(|| gcodebuilder::render_commands(&commands, CommentFlags::NONE))
    });
    group.finish();
}

criterion_group!(benches, build_benchmark, decode_benchmark);
criterion_main!(benches);

/// Very basic random number generator
#[derive(Default)]
pub struct Rnd {
    state: u32,
}

impl Rnd {
    /// Create new random number generator with seed `0`
    pub fn new() -> Self {
        Self::default()
    }

    fn step(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(214_013).wrapping_add(2_531_011) & 0x7fffffff;
        self.state >> 16
    }

    /// Sample `u32` from uniform distributes
    pub fn uniform_u32(&mut self) -> u32 {
        (self.step() & 0xffff) << 16 | (self.step() & 0xffff)
    }

    /// Sample f64 from `Uniform([0, 1])`
    pub fn uniform(&mut self) -> Scalar {
        self.uniform_u32() as Scalar / u32::MAX as Scalar
    }

    /// Random position inside of `[0, size]` square
    pub fn point(&mut self, size: Scalar) -> AbsolutePos {
        AbsolutePos::new(self.uniform() * size, self.uniform() * size)
    }
}
