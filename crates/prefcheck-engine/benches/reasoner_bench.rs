use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prefcheck_engine::{AcyclicReasoner, CyclicReasoner, Reasoner, ReasonerConfig, Session};
use prefcheck_model::{Outcome, PreferenceSpecification, Variable};
use prefcheck_oracle::backends::explicit::ExplicitOracle;

fn binary_spec(width: usize) -> PreferenceSpecification {
    let variables = (0..width).map(|i| Variable::binary(format!("v{i}")).unwrap());
    PreferenceSpecification::new("bench", variables).unwrap()
}

/// Every variable prefers 1 regardless of the others: the outcome lattice.
fn lattice(width: usize) -> (PreferenceSpecification, ExplicitOracle) {
    let spec = binary_spec(width);
    let mut oracle = ExplicitOracle::new(spec.clone()).unwrap();
    for outcome in spec.enumerate_outcomes() {
        for variable in spec.variable_names() {
            if outcome.get(variable) == Some("0") {
                let better = outcome.clone().with(variable, "1");
                oracle.add_flip(&outcome, &better).unwrap();
            }
        }
    }
    (spec, oracle)
}

/// The lattice with its top replaced by a ring through every outcome with
/// exactly one 0.
fn lattice_with_ring(width: usize) -> (PreferenceSpecification, ExplicitOracle) {
    let spec = binary_spec(width);
    let mut oracle = ExplicitOracle::new(spec.clone()).unwrap();
    let names = spec.variable_names();
    let top: Outcome = names.iter().map(|n| (*n, "1")).collect();
    let ring: Vec<Outcome> = names
        .iter()
        .map(|n| top.clone().with(*n, "0"))
        .collect();
    for outcome in spec.enumerate_outcomes() {
        if outcome == top || ring.contains(&outcome) {
            continue;
        }
        for variable in &names {
            if outcome.get(variable) == Some("0") {
                oracle
                    .add_flip(&outcome, &outcome.clone().with(*variable, "1"))
                    .unwrap();
            }
        }
    }
    oracle.add_flip(&top, &ring[0]).unwrap();
    for (i, outcome) in ring.iter().enumerate() {
        oracle.add_flip(outcome, &ring[(i + 1) % ring.len()]).unwrap();
    }
    (spec, oracle)
}

// ---------------------------------------------------------------------------
// Raw queries
// ---------------------------------------------------------------------------

fn bench_dominance_with_proof(c: &mut Criterion) {
    let (spec, oracle) = lattice(4);
    let bottom: Outcome = spec.variable_names().into_iter().map(|n| (n, "0")).collect();
    let top: Outcome = spec.variable_names().into_iter().map(|n| (n, "1")).collect();
    c.bench_function("engine_dominance_lattice4", |b| {
        b.iter(|| {
            let mut reasoner = AcyclicReasoner::new(spec.clone(), oracle.clone());
            let mut session = Session::new();
            reasoner
                .dominates(&mut session, black_box(&top), black_box(&bottom))
                .unwrap()
        })
    });
}

fn bench_consistency(c: &mut Criterion) {
    let (spec, oracle) = lattice_with_ring(4);
    c.bench_function("engine_consistency_ring4", |b| {
        b.iter(|| {
            let mut reasoner = AcyclicReasoner::new(spec.clone(), oracle.clone());
            reasoner.is_consistent(&mut Session::new()).unwrap()
        })
    });
}

// ---------------------------------------------------------------------------
// Orderings
// ---------------------------------------------------------------------------

fn bench_acyclic_weak_order(c: &mut Criterion) {
    let (spec, oracle) = lattice(4);
    c.bench_function("engine_weak_order_lattice4", |b| {
        b.iter(|| {
            let mut reasoner = AcyclicReasoner::new(spec.clone(), oracle.clone());
            reasoner.generate_weak_order(&mut Session::new()).unwrap()
        })
    });
}

fn bench_acyclic_weak_order_capped(c: &mut Criterion) {
    let (spec, oracle) = lattice(4);
    let config = ReasonerConfig::default().with_max_outcomes(5);
    c.bench_function("engine_weak_order_lattice4_capped", |b| {
        b.iter(|| {
            let mut reasoner =
                AcyclicReasoner::with_config(spec.clone(), oracle.clone(), config.clone());
            reasoner.generate_weak_order(&mut Session::new()).unwrap()
        })
    });
}

fn bench_cyclic_weak_order(c: &mut Criterion) {
    let (spec, oracle) = lattice_with_ring(4);
    c.bench_function("engine_cyclic_weak_order_ring4", |b| {
        b.iter(|| {
            let mut reasoner = CyclicReasoner::new(spec.clone(), oracle.clone());
            reasoner
                .generate_weak_order_with_cycles(&mut Session::new())
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_dominance_with_proof,
    bench_consistency,
    bench_acyclic_weak_order,
    bench_acyclic_weak_order_capped,
    bench_cyclic_weak_order,
);
criterion_main!(benches);
