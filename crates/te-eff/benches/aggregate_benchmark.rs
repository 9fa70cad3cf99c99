use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use te_core::{Category, Direction, LorentzVector, OfflineEvent};
use te_eff::{Aggregator, CurveBuilder, RunConfig};
use te_io::{MemoryEventSource, RecordTriggerSource, TriggerRecord};

const CONFIG: &str = r#"{
    "datasets": [{"label": "Online"}, {"label": "Miscalibrated"}],
    "triggers": {
        "SingleMuon": ["HLT_Mu3", "HLT_Mu5", "HLT_Mu7"],
        "DoubleMuon": ["HLT_DoubleMu0", "HLT_DoubleMu3"]
    },
    "binning": {
        "SingleMuon": {"Pt": [0, 1, 2, 3, 4, 5, 6, 8, 10, 15, 20], "Eta": [-2.4, -1.6, -0.8, 0, 0.8, 1.6, 2.4]},
        "DoubleMuon": {"Pt": [0, 2, 4, 6, 10, 20, 50], "Rapidity": [-2.4, -1.2, 0, 1.2, 2.4]}
    }
}"#;

// Deterministic pseudo-random sequence, keeps the bench reproducible.
fn lcg(state: &mut u64) -> f64 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    ((*state >> 11) as f64) / ((1u64 << 53) as f64)
}

fn make_inputs(
    n_events: usize,
    muons_per_event: usize,
) -> (MemoryEventSource, Vec<Vec<TriggerRecord>>) {
    let mut s = 42u64;
    let mut events = Vec::with_capacity(n_events);
    let mut online = vec![Vec::with_capacity(n_events), Vec::with_capacity(n_events)];
    for id in 0..n_events as u64 {
        let muons: Vec<LorentzVector> = (0..muons_per_event)
            .map(|_| {
                let pt = 20.0 * lcg(&mut s);
                let eta = 4.8 * lcg(&mut s) - 2.4;
                let phi = 6.28 * lcg(&mut s) - 3.14;
                LorentzVector::from_pt_eta_phi_m(pt, eta, phi, 0.105)
            })
            .collect();
        for (d, recs) in online.iter_mut().enumerate() {
            let dirs: Vec<Direction> = muons
                .iter()
                .filter(|_| lcg(&mut s) < 0.9 - 0.2 * d as f64)
                .map(|m| m.direction())
                .collect();
            let mut rec = TriggerRecord::new(id);
            for path in ["HLT_Mu3", "HLT_Mu5", "HLT_Mu7", "HLT_DoubleMu0", "HLT_DoubleMu3"] {
                rec = rec.with_path(path, dirs.clone());
            }
            recs.push(rec);
        }
        events.push(OfflineEvent::new(id, true, 0.0).with_objects(Category::Muon, muons));
    }
    (MemoryEventSource::new(events), online)
}

fn bench_aggregate(c: &mut Criterion) {
    let cfg = serde_json::from_str::<RunConfig>(CONFIG).unwrap().resolve().unwrap();
    let mut group = c.benchmark_group("aggregate");

    for muons in [2usize, 4, 8] {
        let (events, online) = make_inputs(2_000, muons);
        group.bench_with_input(BenchmarkId::new("run_2k_events", muons), &muons, |b, _| {
            b.iter(|| {
                let mut events = events.clone();
                let mut triggers: Vec<_> =
                    online.iter().cloned().map(RecordTriggerSource::from_records).collect();
                let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
                black_box(agg.run(&mut events, &mut triggers).unwrap())
            })
        });
    }

    let (mut events, online) = make_inputs(2_000, 4);
    let mut triggers: Vec<_> = online.into_iter().map(RecordTriggerSource::from_records).collect();
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    agg.run(&mut events, &mut triggers).unwrap();
    let builder = CurveBuilder::new(cfg.interval).unwrap();
    group.bench_function("build_all_curves", |b| {
        b.iter(|| black_box(builder.build_all(agg.counter_list()).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
