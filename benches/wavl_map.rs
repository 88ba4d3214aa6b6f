use criterion::{criterion_group, criterion_main, Criterion};
use std::collections::BTreeMap;
use std::hint::black_box;
use wavl_map::WavlMap;

pub fn bench_wavl_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("ordered_maps");

    // You can easily adjust this set
    let sizes = [10, 100, 1_000, 10_000];

    //
    // Custom WavlMap
    //
    let text = "Custom WavlMap";
    println!("\n{text}");
    underline(text.len());
    println!();

    for &n in &sizes {
        group.bench_with_input(format!("wavl_map_insert_{n}"), &n, |b, &n| {
            b.iter(|| {
                let mut map = WavlMap::new();
                for i in 0..n {
                    map.insert(black_box(i), black_box("value"));
                }
                black_box(map);
            })
        });

        group.bench_with_input(format!("wavl_map_remove_{n}"), &n, |b, &n| {
            b.iter(|| {
                let mut map = {
                    let mut m = WavlMap::new();
                    for i in 0..n {
                        m.insert(i, "value");
                    }
                    m
                };
                for i in 0..n {
                    black_box(map.remove(&i));
                }
            });
        });

        group.bench_with_input(format!("wavl_map_search_{n}"), &n, |b, &n| {
            let mut map = WavlMap::new();
            for i in 0..n {
                map.insert(i, "value");
            }
            b.iter(|| {
                for i in 0..n {
                    black_box(map.has(&i));
                }
            })
        });

        group.bench_with_input(format!("wavl_map_range_scan_{n}"), &n, |b, &n| {
            let mut map = WavlMap::new();
            for i in 0..n {
                map.insert(i, "value");
            }
            b.iter(|| {
                let range = map.range(None, None, false).unwrap();
                black_box(range.count(&map));
            })
        });
    }

    //
    // std::collections::BTreeMap
    //
    let text = "std BTreeMap";
    println!("\n{text}");
    underline(text.len());
    println!();

    for &n in &sizes {
        group.bench_with_input(format!("std_btreemap_insert_{n}"), &n, |b, &n| {
            b.iter(|| {
                let mut map = BTreeMap::new();
                for i in 0..n {
                    map.insert(black_box(i), "value");
                }
                black_box(map);
            })
        });

        group.bench_with_input(format!("std_btreemap_remove_{n}"), &n, |b, &n| {
            b.iter(|| {
                let mut map = {
                    let mut m = BTreeMap::new();
                    for i in 0..n {
                        m.insert(i, "value");
                    }
                    m
                };
                for i in 0..n {
                    black_box(map.remove(&i));
                }
            });
        });

        group.bench_with_input(format!("std_btreemap_search_{n}"), &n, |b, &n| {
            let mut map = BTreeMap::new();
            for i in 0..n {
                map.insert(i, "value");
            }
            b.iter(|| {
                for i in 0..n {
                    black_box(map.contains_key(&i));
                }
            })
        });

        group.bench_with_input(format!("std_btreemap_range_scan_{n}"), &n, |b, &n| {
            let mut map = BTreeMap::new();
            for i in 0..n {
                map.insert(i, "value");
            }
            b.iter(|| {
                black_box(map.range(..).count());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_wavl_map);
criterion_main!(benches);

fn underline(len: usize) {
    for _ in 0..len {
        print!("=");
    }
    println!();
}
