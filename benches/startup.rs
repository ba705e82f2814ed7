use criterion::{Criterion, criterion_group, criterion_main};
use reelname::ui::PanelRegistry;
use reelname::{HostEnvironment, ModeResolver, StartupArguments};
use std::hint::black_box;

struct DesktopHost;

impl HostEnvironment for DesktopHost {
    fn console_attached(&self) -> bool {
        true
    }

    fn headless(&self) -> bool {
        false
    }

    fn var(&self, _key: &str) -> Option<String> {
        None
    }
}

fn bench_mode_resolution(c: &mut Criterion) {
    c.bench_function("parse_and_resolve", |b| {
        b.iter(|| {
            let args = StartupArguments::parse_from(black_box([
                "reelname",
                "--mode",
                "Rename|SFV",
                "--log",
                "debug",
                "movie.mkv",
            ]))
            .unwrap_or_default();
            ModeResolver::resolve(&args, &DesktopHost)
        })
    });
}

fn bench_panel_filter(c: &mut Criterion) {
    let registry = PanelRegistry::default_sequence();

    c.bench_function("panel_filter", |b| {
        b.iter(|| registry.filter(black_box(Some("Rename|Episodes|S.*"))))
    });
}

criterion_group!(benches, bench_mode_resolution, bench_panel_filter);
criterion_main!(benches);
