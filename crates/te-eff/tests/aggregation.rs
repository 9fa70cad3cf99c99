//! End-to-end aggregation over in-memory event and trigger streams.

use te_core::{Arity, Category, Direction, LorentzVector, ObjectKind, OfflineEvent, Variable};
use te_eff::{Aggregator, CounterKey, CurveBuilder, RunConfig};
use te_io::{MemoryEventSource, RecordTriggerSource, TriggerRecord};

fn resolve(json: &str) -> te_eff::EfficiencyConfig {
    serde_json::from_str::<RunConfig>(json).unwrap().resolve().unwrap()
}

fn muon(pt: f64, eta: f64, phi: f64) -> LorentzVector {
    LorentzVector::from_pt_eta_phi_m(pt, eta, phi, 0.105)
}

fn single_key(path: &str, ds: &str) -> CounterKey {
    CounterKey::new(ObjectKind::new(Arity::Single, Category::Muon), path, Variable::Pt, ds)
}

const SINGLE_T1: &str = r#"{
    "datasets": [{"label": "A"}, {"label": "B"}],
    "triggers": {"SingleMuon": ["T1"]},
    "binning": {"SingleMuon": {"Pt": [0, 10, 20, 30]}}
}"#;

#[test]
fn matched_in_one_dataset_only() {
    let cfg = resolve(SINGLE_T1);
    let mut events = MemoryEventSource::new(vec![
        OfflineEvent::new(1, true, 20.0).with_objects(Category::Muon, vec![muon(15.0, 0.2, 0.4)]),
    ]);
    let mut triggers = vec![
        RecordTriggerSource::from_records(vec![
            TriggerRecord::new(1).with_path("T1", vec![Direction::new(0.21, 0.41)]),
        ]),
        RecordTriggerSource::from_records(vec![TriggerRecord::new(1)]),
    ];
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    let summary = agg.run(&mut events, &mut triggers).unwrap();
    assert_eq!(summary.processed_events, 1);

    let a = agg.get(&single_key("T1", "A")).unwrap();
    let b = agg.get(&single_key("T1", "B")).unwrap();
    assert_eq!((a.fired(), a.total()), (&[0, 1, 0][..], &[0, 1, 0][..]));
    assert_eq!((b.fired(), b.total()), (&[0, 0, 0][..], &[0, 1, 0][..]));

    let builder = CurveBuilder::new(cfg.interval).unwrap();
    assert_eq!(builder.build(a).unwrap().points[1].estimate, Some(1.0));
    assert_eq!(builder.build(b).unwrap().points[1].estimate, Some(0.0));
}

#[test]
fn top_edge_value_is_dropped() {
    let cfg = resolve(SINGLE_T1);
    let mut events = MemoryEventSource::new(vec![
        OfflineEvent::new(1, true, 0.0).with_objects(Category::Muon, vec![muon(30.0, 0.0, 0.0)]),
    ]);
    let mut triggers = vec![
        RecordTriggerSource::from_records(vec![TriggerRecord::new(1)]),
        RecordTriggerSource::from_records(vec![TriggerRecord::new(1)]),
    ];
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    agg.run(&mut events, &mut triggers).unwrap();
    for (_, c) in agg.counters() {
        assert_eq!(c.entries(), 0);
        assert_eq!(c.out_of_range(), 1);
    }
}

#[test]
fn missing_event_in_one_stream_is_skipped_for_all() {
    let cfg = resolve(SINGLE_T1);
    let mut events = MemoryEventSource::new(vec![
        OfflineEvent::new(41, true, 0.0).with_objects(Category::Muon, vec![muon(5.0, 0.0, 0.0)]),
        OfflineEvent::new(42, true, 0.0).with_objects(Category::Muon, vec![muon(15.0, 0.0, 0.0)]),
        OfflineEvent::new(43, true, 0.0).with_objects(Category::Muon, vec![muon(25.0, 0.0, 0.0)]),
    ]);
    let hit = |id| TriggerRecord::new(id).with_path("T1", vec![Direction::new(0.0, 0.0)]);
    let mut triggers = vec![
        RecordTriggerSource::from_records(vec![hit(41), hit(42), hit(43)]),
        RecordTriggerSource::from_records(vec![hit(41), hit(43)]),
    ];
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    let summary = agg.run(&mut events, &mut triggers).unwrap();
    assert_eq!(summary.skipped_events, 1);
    assert_eq!(summary.processed_events, 2);

    for ds in ["A", "B"] {
        let c = agg.get(&single_key("T1", ds)).unwrap();
        assert_eq!(c.total(), &[1, 0, 1], "dataset {ds}");
        assert_eq!(c.fired(), &[1, 0, 1], "dataset {ds}");
    }
}

#[test]
fn unreadable_trigger_line_skips_only_that_event() {
    let cfg = resolve(SINGLE_T1);
    let mut events = MemoryEventSource::new(vec![
        OfflineEvent::new(1, true, 0.0).with_objects(Category::Muon, vec![muon(5.0, 0.0, 0.0)]),
        OfflineEvent::new(2, true, 0.0).with_objects(Category::Muon, vec![muon(15.0, 0.0, 0.0)]),
        OfflineEvent::new(3, true, 0.0).with_objects(Category::Muon, vec![muon(25.0, 0.0, 0.0)]),
    ]);
    let broken = concat!(
        "{\"event\": 1, \"paths\": {\"T1\": [{\"eta\": 0.0, \"phi\": 0.0}]}}\n",
        "{\"event\": 2, \"paths\": {\"T1\": [{\"eta\": \"bad\", \"phi\": 0.0}]}}\n",
        "{\"event\": 3, \"paths\": {\"T1\": [{\"eta\": 0.0, \"phi\": 0.0}]}}\n",
    );
    let hit = |id| TriggerRecord::new(id).with_path("T1", vec![Direction::new(0.0, 0.0)]);
    let mut triggers = vec![
        RecordTriggerSource::from_reader(broken.as_bytes(), "hlt_a.jsonl"),
        RecordTriggerSource::from_records(vec![hit(1), hit(2), hit(3)]),
    ];
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    let summary = agg.run(&mut events, &mut triggers).unwrap();
    assert_eq!(summary.processed_events, 2);
    assert_eq!(summary.malformed_events, 1);
    assert_eq!(summary.skipped_events, 0);

    for ds in ["A", "B"] {
        let c = agg.get(&single_key("T1", ds)).unwrap();
        assert_eq!(c.total(), &[1, 0, 1], "dataset {ds}");
        assert_eq!(c.fired(), &[1, 0, 1], "dataset {ds}");
    }
}

#[test]
fn unreadable_offline_lines_are_counted() {
    let cfg = resolve(SINGLE_T1);
    let text = concat!(
        "{\"event\": 1, \"objects\": {\"muon\": [{\"pt\": 5, \"eta\": 0, \"phi\": 0}]}}\n",
        "{\"event\": 2, \"objects\": {\"muon\": [{\"pt\": \"x\"}]}}\n",
        "{\"event\": 3, \"objects\": {\"muon\": [{\"pt\": 25, \"eta\": 0, \"phi\": 0}]}}\n",
    );
    let mut events = MemoryEventSource::from_reader(text.as_bytes(), "reco.jsonl").unwrap();
    let recs = || vec![TriggerRecord::new(1), TriggerRecord::new(2), TriggerRecord::new(3)];
    let mut triggers = vec![
        RecordTriggerSource::from_records(recs()),
        RecordTriggerSource::from_records(recs()),
    ];
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    let summary = agg.run(&mut events, &mut triggers).unwrap();
    assert_eq!(summary.processed_events, 2);
    assert_eq!(summary.malformed_events, 1);
    assert_eq!(agg.get(&single_key("T1", "A")).unwrap().total(), &[1, 0, 1]);
}

#[test]
fn max_events_limits_the_pass() {
    let cfg = resolve(SINGLE_T1).with_max_events(Some(1));
    let mut events = MemoryEventSource::new(vec![
        OfflineEvent::new(1, true, 0.0).with_objects(Category::Muon, vec![muon(5.0, 0.0, 0.0)]),
        OfflineEvent::new(2, true, 0.0).with_objects(Category::Muon, vec![muon(5.0, 0.0, 0.0)]),
    ]);
    let recs = || vec![TriggerRecord::new(1), TriggerRecord::new(2)];
    let mut triggers = vec![
        RecordTriggerSource::from_records(recs()),
        RecordTriggerSource::from_records(recs()),
    ];
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    let summary = agg.run(&mut events, &mut triggers).unwrap();
    assert_eq!(summary.processed_events, 1);
}

#[test]
fn other_categories_are_untouched() {
    let cfg = resolve(
        r#"{
            "datasets": [{"label": "Online"}],
            "triggers": {"SingleElectron": ["HLT_Ele20"], "SinglePhoton": ["HLT_Photon40"]},
            "binning": {
                "SingleElectron": {"Pt": [20, 40, 80], "Eta": [-2.1, 0, 2.1]},
                "SinglePhoton": {"Pt": [40, 80, 160]}
            }
        }"#,
    );
    let ele = LorentzVector::from_pt_eta_phi_m(30.0, 0.5, 0.0, 0.000511);
    let mut events = MemoryEventSource::new(vec![
        OfflineEvent::new(7, true, 0.0).with_objects(Category::Electron, vec![ele]),
    ]);
    let mut triggers = vec![RecordTriggerSource::from_records(vec![
        TriggerRecord::new(7).with_path("HLT_Ele20", vec![Direction::new(0.5, 0.0)]),
    ])];
    let mut agg = Aggregator::new(&cfg, &mut triggers).unwrap();
    agg.run(&mut events, &mut triggers).unwrap();

    for (key, c) in agg.counters() {
        match key.kind.category {
            Category::Electron => {
                assert_eq!(c.entries(), 1, "{key}");
                assert_eq!(c.fired().iter().sum::<u64>(), 1, "{key}");
            }
            _ => assert_eq!(c.entries(), 0, "{key}"),
        }
    }
}
