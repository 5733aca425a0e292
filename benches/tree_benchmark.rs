use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use heartwood::{HeartwoodMap, HeartwoodMultiMap, HeartwoodSet};
use rand::prelude::*;
use std::collections::BTreeSet;
use std::ops::Range;

const TREE_SIZE: usize = 100_000;

fn shuffled_keys() -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let mut keys: Vec<usize> = (0..TREE_SIZE).collect();

    keys.shuffle(&mut rng);

    keys
}

fn random_keys(count: usize, range: Range<usize>) -> Vec<usize> {
    let mut rng = rand::thread_rng();
    let range = rand::distributions::Uniform::new(range.start, range.end);

    (0..count).map(|_| rng.sample(range)).collect()
}

fn large_btree() -> BTreeSet<usize> {
    shuffled_keys().into_iter().collect()
}

fn large_set() -> HeartwoodSet<usize> {
    shuffled_keys().into_iter().collect()
}

fn insertion_benchmarks(c: &mut Criterion) {
    c.bench_function("baseline 100K insertions", |b| {
        b.iter_batched(
            shuffled_keys,
            |keys| {
                let mut tree = BTreeSet::new();
                for key in keys {
                    tree.insert(key);
                }
                tree
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("set 100K insertions", |b| {
        b.iter_batched(
            shuffled_keys,
            |keys| {
                let mut set = HeartwoodSet::new();
                for key in keys {
                    set.insert(key);
                }
                set
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("set 100K insertions with size hint", |b| {
        b.iter_batched(
            shuffled_keys,
            |keys| {
                let mut set = HeartwoodSet::with_capacity(keys.len());
                for key in keys {
                    set.insert(key);
                }
                set
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("map 100K find-or-insert", |b| {
        b.iter_batched(
            || random_keys(TREE_SIZE, 0..TREE_SIZE / 4),
            |keys| {
                let mut counts = HeartwoodMap::<usize, u32>::new();
                for key in keys {
                    *counts.get_or_default(key) += 1;
                }
                counts
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("multimap 100K duplicate-heavy insertions", |b| {
        b.iter_batched(
            || random_keys(TREE_SIZE, 0..64),
            |keys| {
                let mut map = HeartwoodMultiMap::new();
                for (order, key) in keys.into_iter().enumerate() {
                    map.insert(key, order);
                }
                map
            },
            BatchSize::LargeInput,
        )
    });
}

fn lookup_and_erase_benchmarks(c: &mut Criterion) {
    c.bench_function("baseline random lookups", |b| {
        b.iter_batched(
            || (large_btree(), random_keys(5000, 0..TREE_SIZE)),
            |(tree, keys)| {
                for key in keys {
                    assert!(tree.contains(&key));
                }
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("set random lookups", |b| {
        b.iter_batched(
            || (large_set(), random_keys(5000, 0..TREE_SIZE)),
            |(set, keys)| {
                for key in keys {
                    assert!(set.contains(&key));
                }
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("baseline random deletions", |b| {
        b.iter_batched(
            || (large_btree(), random_keys(5000, 0..TREE_SIZE)),
            |(mut tree, keys)| {
                for key in keys {
                    tree.remove(&key);
                }
                tree
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("set random deletions", |b| {
        b.iter_batched(
            || (large_set(), random_keys(5000, 0..TREE_SIZE)),
            |(mut set, keys)| {
                for key in keys {
                    set.remove(&key);
                }
                set
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("set churn: delete holes then refill", |b| {
        b.iter_batched(
            || {
                (
                    large_set(),
                    random_keys(2000, 0..TREE_SIZE),
                    random_keys(2000, TREE_SIZE..3 * TREE_SIZE),
                )
            },
            |(mut set, holes, fresh)| {
                for key in &holes {
                    set.remove(key);
                }
                for key in fresh {
                    set.insert(key);
                }
                set
            },
            BatchSize::LargeInput,
        )
    });
}

fn traversal_benchmarks(c: &mut Criterion) {
    c.bench_function("baseline inorder iteration", |b| {
        b.iter_batched(
            large_btree,
            |tree| {
                for (expected, &key) in tree.iter().enumerate() {
                    assert_eq!(expected, key);
                }
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("set inorder iteration", |b| {
        b.iter_batched(
            large_set,
            |set| {
                for (expected, &key) in set.iter().enumerate() {
                    assert_eq!(expected, key);
                }
            },
            BatchSize::LargeInput,
        )
    });

    c.bench_function("set reverse iteration", |b| {
        b.iter_batched(
            large_set,
            |set| {
                for (expected, &key) in set.iter().rev().enumerate() {
                    assert_eq!(TREE_SIZE - 1 - expected, key);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    insertion_benchmarks,
    lookup_and_erase_benchmarks,
    traversal_benchmarks
);
criterion_main!(benches);
