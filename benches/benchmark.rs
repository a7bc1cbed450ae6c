use criterion::{Criterion, criterion_group, criterion_main};
use flexclock::clock::{
    CategoryParameter, Change, FlexibleLocalClock, FlexibleLocalClockBuilder, LogNormalRates, QuantileParameter,
    RateInputs, RealParameter, RegimeChange, RegimeId, RelaxedClock, RelaxedClockConfig,
};
use flexclock::model::{Height, NodeId, RootedTree, TaxonSet, TimeTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

const TREE_SIZES: &[(&str, usize)] = &[("n50", 50), ("n500", 500), ("n5000", 5000)];

/// Random tree built by joining random pairs of lineages.
fn random_tree(num_leaves: usize) -> TimeTree {
    let mut rng = StdRng::seed_from_u64(2018);
    let mut tree = TimeTree::new(num_leaves);
    let mut lineages: Vec<NodeId> = (0..num_leaves)
        .map(|i| tree.add_leaf(Height::ZERO, &format!("t{i}")))
        .collect();

    let mut height = 0.0;
    while lineages.len() > 2 {
        height += rng.random_range(0.01..0.1);
        let a = lineages.swap_remove(rng.random_range(0..lineages.len()));
        let b = lineages.swap_remove(rng.random_range(0..lineages.len()));
        lineages.push(tree.add_internal_vertex([a, b], Height::new(height)));
    }
    tree.add_root([lineages[0], lineages[1]], Height::new(height + 0.1));
    tree
}

/// Relaxed background plus a relaxed clade on the first child of the root.
fn clock_for(tree: &TimeTree, use_quantiles: bool) -> FlexibleLocalClock {
    let relaxed = |name: &str| {
        let inputs = if use_quantiles {
            RateInputs::Quantiles(QuantileParameter::new(vec![]))
        } else {
            RateInputs::Categories(CategoryParameter::new(vec![]))
        };
        RelaxedClock::new(
            name,
            LogNormalRates::new(RealParameter::scalar(0.3)),
            inputs,
            RelaxedClockConfig::default().with_normalize(true),
        )
        .unwrap()
    };

    let first_child = tree.children(tree.root())[0];
    let mut stack = vec![first_child];
    let mut labels = Vec::new();
    while let Some(node) = stack.pop() {
        labels.extend(tree.label(node));
        stack.extend_from_slice(tree.children(node));
    }

    let mut builder = FlexibleLocalClockBuilder::new(relaxed("background"));
    let clade = builder.add_regime(relaxed("clade"));
    builder.add_clade(TaxonSet::new("clade", labels), true, clade);
    builder.build(tree, &mut StdRng::seed_from_u64(1)).unwrap()
}

fn rates_cached(c: &mut Criterion) {
    for (name, num_leaves) in TREE_SIZES {
        let tree = random_tree(*num_leaves);
        let clock = clock_for(&tree, false);
        c.bench_function(&format!("cached/{name}"), |b| {
            b.iter(|| black_box(clock.branch_rates(&tree).unwrap()));
        });
    }
}

fn rates_after_invalidation(c: &mut Criterion) {
    for (name, num_leaves) in TREE_SIZES {
        let tree = random_tree(*num_leaves);
        for (mode, use_quantiles) in [("discrete", false), ("quantile", true)] {
            let mut clock = clock_for(&tree, use_quantiles);
            c.bench_function(&format!("{mode}/{name}"), |b| {
                b.iter(|| {
                    clock
                        .invalidate(Change::Regime(RegimeId::BACKGROUND, RegimeChange::Distribution))
                        .unwrap();
                    black_box(clock.branch_rates(&tree).unwrap())
                });
            });
        }
    }
}

fn reassignment(c: &mut Criterion) {
    for (name, num_leaves) in TREE_SIZES {
        let tree = random_tree(*num_leaves);
        let mut clock = clock_for(&tree, false);
        c.bench_function(&format!("reassign/{name}"), |b| {
            b.iter(|| {
                clock.invalidate(Change::Topology).unwrap();
                black_box(clock.assignment(&tree).unwrap().node_count())
            });
        });
    }
}

criterion_group!(regression, rates_cached, rates_after_invalidation);
criterion_group! {
    name = reporting;
    config = Criterion::default().sample_size(10);
    targets = reassignment
}
criterion_main!(regression, reporting);
