use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rigkit_api_core::{TypedPath, Value};
use rigkit_graph_core::{evaluate_all, GraphRuntime, GraphSpec};
use rigkit_test_fixtures::node_graphs;

fn bench_two_bone_ik(c: &mut Criterion) {
    let json = node_graphs::spec_json("two-bone-ik").expect("graph fixture");
    let spec = GraphSpec::from_json(&json).expect("graph parses");
    let handle = TypedPath::parse("rig/arm.handle_parent_matrix").expect("valid path");
    let stretch = TypedPath::parse("rig/arm.stretch").expect("valid path");
    let mut rt = GraphRuntime::default();

    let mut frame = 0u32;
    c.bench_function("graph_two_bone_ik_frame", |b| {
        b.iter(|| {
            frame = frame.wrapping_add(1);
            let reach = 1.5 + (frame % 100) as f64 * 0.01;
            rt.set_input(handle.clone(), Value::translation(reach, 0.0, 0.0), None);
            rt.set_input(stretch.clone(), Value::Float(1.0), None);
            evaluate_all(&mut rt, black_box(&spec)).expect("evaluate");
            black_box(rt.writes.len())
        })
    });
}

criterion_group!(benches, bench_two_bone_ik);
criterion_main!(benches);
