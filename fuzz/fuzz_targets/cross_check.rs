#![no_main]

use libfuzzer_sys::fuzz_target;
use serde::Deserialize;
use smtlab_domain::{ResourceGraph, cross_check};
use smtlab_types::{Benchmark, Id, Instance, ResultDetail, Run, Solver, SolverResult};
use std::collections::BTreeMap;

#[derive(Deserialize)]
struct Bundle {
    run: Run,
    benchmark: Benchmark,
    solvers: Vec<Solver>,
    instances: Vec<Instance>,
    results: Vec<SolverResult>,
    details: Vec<ResultDetail>,
}

fuzz_target!(|data: &[u8]| {
    let Ok(bundle) = serde_json::from_slice::<Bundle>(data) else {
        return;
    };
    let details: BTreeMap<Id, ResultDetail> =
        bundle.details.into_iter().map(|d| (d.id, d)).collect();
    let graph = ResourceGraph::new(
        bundle.run,
        bundle.benchmark,
        bundle.solvers,
        bundle.instances,
        bundle.results,
    );

    if let Ok(check) = cross_check(&graph, &details) {
        let mut with_issues = 0;
        for instance in &check.instances {
            assert!(instance.validations_ok() <= instance.validations_total());
            if instance.validations_ok() < instance.validations_total() {
                with_issues += 1;
            }
        }
        assert_eq!(check.instances_with_issues, with_issues);
    }
});
