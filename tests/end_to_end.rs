//! Runs against a real Julia installation. Enable with `cargo test -- --ignored`.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use pssfss_link::prelude::*;

fn session() -> Arc<Session> {
    init_tracing();
    let config = SessionConfig::from_env().expect("valid PSSFSS_* environment");
    Session::start(&config).expect("julia engine starts")
}

#[test]
#[ignore = "needs julia with PSSFSS"]
fn dielectric_slab_reflection_matches_reference() {
    let session = session();
    let strata: Vec<Stratum> = vec![
        Layer::free_space().into(),
        Layer::free_space().epsr(10.0).width(10.0 * MM).tandel(0.02).into(),
        Layer::free_space().into(),
    ];
    let results = analyze(
        &session,
        &strata,
        &Frequencies::from(10.0),
        &Steering::theta_phi(0.0, 0.0),
        &AnalysisOptions::default().quiet(),
    )
    .expect("analysis");
    let request = OutputRequest::new(&session, "fghz s11db(te,te) s11ang(te,te)").expect("output request");
    assert_eq!(request.field_count(), 3);

    let columns = extract(&session, &results, &request).expect("columns");
    let value = |i: usize| columns[i].as_real().expect("real field")[0];
    assert_abs_diff_eq!(value(0), 10.0, epsilon = 1e-12);
    assert_abs_diff_eq!(value(1), -7.922_095_13, epsilon = 1e-8);
    assert_abs_diff_eq!(value(2), -131.168_178_47, epsilon = 1e-8);
}

#[test]
#[ignore = "needs julia with PSSFSS"]
fn sheet_snapshot_agrees_with_engine_counts() {
    let session = session();
    let sheet = polyring(
        &session,
        &PolyRing::default()
            .s1([1.0, 0.0])
            .s2([0.5, 1.0])
            .a([-1.0])
            .b([0.4])
            .sides(6)
            .ntri(200)
            .units(CM),
    )
    .expect("polyring");
    let g = sheet.geometry();
    assert_eq!(sheet.units(), CM);
    assert_eq!(sheet.style(), "polyring");
    assert_eq!(sheet.edge_count().expect("edges"), g.edge_count());
    assert_eq!(sheet.face_count().expect("faces"), g.face_count());
    assert_eq!(sheet.node_count().expect("nodes"), g.node_count());
    assert!(g.fv.iter().flatten().all(|&i| i < g.node_count()));

    let text = doc(&session, (&sheet).into()).expect("doc");
    assert!(text.contains("polyring"));
}
