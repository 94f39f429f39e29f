//! The resolved resource graph of one run.

use smtlab_types::{Benchmark, Id, Instance, Label, Run, RunHeader, Solver, SolverResult};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Everything fetched for one run, joined by identifier.
///
/// The instance and solver indexes are built once in [`ResourceGraph::new`];
/// every foreign-key lookup afterwards is a map probe, and a miss is an
/// explicit [`Label::Unresolved`] rather than a default value.
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    run: Run,
    benchmark: Benchmark,
    solvers: Vec<Solver>,
    instances: Vec<Instance>,
    results: Vec<SolverResult>,
    instance_index: HashMap<Id, usize>,
    solver_index: HashMap<Id, usize>,
}

impl ResourceGraph {
    pub fn new(
        run: Run,
        benchmark: Benchmark,
        solvers: Vec<Solver>,
        instances: Vec<Instance>,
        results: Vec<SolverResult>,
    ) -> Self {
        let instance_index = index_by_id(instances.iter().map(|i| i.id));
        let solver_index = index_by_id(solvers.iter().map(|s| s.id));
        Self {
            run,
            benchmark,
            solvers,
            instances,
            results,
            instance_index,
            solver_index,
        }
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn benchmark(&self) -> &Benchmark {
        &self.benchmark
    }

    pub fn solvers(&self) -> &[Solver] {
        &self.solvers
    }

    /// Benchmark instances in the order the service listed them.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn results(&self) -> &[SolverResult] {
        &self.results
    }

    pub fn instance(&self, id: Id) -> Option<&Instance> {
        self.instance_index.get(&id).map(|&i| &self.instances[i])
    }

    pub fn solver(&self, id: Id) -> Option<&Solver> {
        self.solver_index.get(&id).map(|&i| &self.solvers[i])
    }

    pub fn instance_label(&self, id: Id) -> Label {
        match self.instance(id) {
            Some(instance) => Label::resolved(instance.name.clone()),
            None => Label::Unresolved { id },
        }
    }

    pub fn solver_label(&self, id: Id) -> Label {
        match self.solver(id) {
            Some(solver) => Label::resolved(solver.name.clone()),
            None => Label::Unresolved { id },
        }
    }

    /// Number of instance ids in the benchmark, ignoring repeats in the listing.
    pub fn distinct_instance_count(&self) -> usize {
        self.instance_index.len()
    }

    /// Results of the run grouped by the instance they were computed for.
    ///
    /// Within a group, results keep the order of the run's result list.
    pub fn results_by_instance(&self) -> BTreeMap<Id, Vec<&SolverResult>> {
        let mut groups: BTreeMap<Id, Vec<&SolverResult>> = BTreeMap::new();
        for r in &self.results {
            groups.entry(r.instance_id).or_default().push(r);
        }
        groups
    }

    /// Instance ids referenced by results but absent from the benchmark, ascending.
    pub fn unresolved_instance_ids(&self) -> Vec<Id> {
        self.results
            .iter()
            .map(|r| r.instance_id)
            .filter(|id| !self.instance_index.contains_key(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn header(&self) -> RunHeader {
        RunHeader {
            id: self.run.id,
            solver: self.solver_label(self.run.solver_id),
            benchmark: Label::resolved(self.benchmark.name.clone()),
            arguments: self.run.arguments.clone(),
            description: self.run.description.trim().to_string(),
            started_at: self.run.start_date.clone(),
        }
    }
}

/// First occurrence wins when the service lists an id twice.
pub(crate) fn index_by_id(ids: impl Iterator<Item = Id>) -> HashMap<Id, usize> {
    let mut index = HashMap::new();
    for (pos, id) in ids.enumerate() {
        index.entry(id).or_insert(pos);
    }
    index
}
