//! Validation cross-check policy.
//!
//! Each validation attached to a result is either OK or suspect. Only two
//! things make a validation suspect:
//!
//! - a validator re-solved the instance and got `unsat` for a result that
//!   claims `sat`;
//! - a validator explicitly judged the result `invalid`.
//!
//! A validator answering `sat` for an `unsat` result is deliberately not
//! flagged: a false `sat` claim is the costly error in this domain.

use crate::graph::ResourceGraph;
use crate::DomainError;
use smtlab_types::{
    CrossCheck, Id, InstanceCheck, Judgment, Label, Outcome, ResultCheck, ResultDetail,
    SolverResult, SuspectValidation,
};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Classification {
    Ok,
    Suspect,
}

/// Classify one validation of a result whose own outcome is `result`.
pub fn classify(result: Outcome, judgment: &Judgment) -> Classification {
    let suspect = match judgment {
        Judgment::Result { outcome } => result == Outcome::Sat && *outcome == Outcome::Unsat,
        Judgment::Verdict { valid } => !valid,
    };
    if suspect {
        Classification::Suspect
    } else {
        Classification::Ok
    }
}

/// Apply the policy to every validation of one result.
pub fn check_result(
    graph: &ResourceGraph,
    result: &SolverResult,
    detail: &ResultDetail,
) -> ResultCheck {
    let suspects: Vec<SuspectValidation> = detail
        .validations
        .iter()
        .filter(|v| classify(result.outcome, &v.judgment) == Classification::Suspect)
        .map(|v| SuspectValidation {
            solver: graph.solver_label(v.solver_id),
            judgment: v.judgment.text().to_string(),
        })
        .collect();

    let total = u32::try_from(detail.validations.len()).unwrap_or(u32::MAX);
    let ok = total.saturating_sub(u32::try_from(suspects.len()).unwrap_or(u32::MAX));

    ResultCheck {
        result_id: result.id,
        outcome: result.outcome,
        runtime_ms: result.runtime_ms,
        validations_ok: ok,
        validations_total: total,
        suspects,
        stdout: if result.outcome == Outcome::Error {
            detail.stdout.clone()
        } else {
            None
        },
    }
}

/// Cross-check every result of the run.
///
/// `details` must hold the detail record of every result in the graph, keyed
/// by result id. Instances appear in benchmark order (including those with no
/// results, which check as `0/0`), followed by one entry per unresolved
/// instance id that results point at.
pub fn cross_check(
    graph: &ResourceGraph,
    details: &BTreeMap<Id, ResultDetail>,
) -> Result<CrossCheck, DomainError> {
    let groups = graph.results_by_instance();

    let check_group = |instance_id: Id, instance: Label| -> Result<InstanceCheck, DomainError> {
        let results = groups
            .get(&instance_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|r| {
                details
                    .get(&r.id)
                    .map(|d| check_result(graph, r, d))
                    .ok_or(DomainError::MissingDetail { result_id: r.id })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(InstanceCheck {
            instance_id,
            instance,
            results,
        })
    };

    let mut instances = Vec::with_capacity(graph.instances().len());
    // A listing may repeat an id; the first occurrence is the instance.
    let mut seen = HashSet::new();
    for instance in graph.instances() {
        if !seen.insert(instance.id) {
            continue;
        }
        instances.push(check_group(
            instance.id,
            Label::resolved(instance.name.clone()),
        )?);
    }
    for id in graph.unresolved_instance_ids() {
        instances.push(check_group(id, Label::Unresolved { id })?);
    }

    let instances_with_issues = instances.iter().filter(|i| i.has_issues()).count() as u64;

    Ok(CrossCheck {
        instances,
        instances_with_issues,
    })
}
