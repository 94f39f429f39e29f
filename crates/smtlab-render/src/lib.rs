//! Text and JSON rendering for smtlab reports.
//!
//! Rendering is pure: the same report always produces the same bytes.

use smtlab_types::{InstanceCheck, Outcome, ResultCheck, RunListing, RunReport, RunSummary};

/// Format integer milliseconds as seconds with three decimals.
///
/// Exact for every `u64`; no floating point is involved.
pub fn format_seconds(ms: u64) -> String {
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

pub fn render_summary(summary: &RunSummary) -> String {
    let c = &summary.counts;
    format!(
        "SAT: {} UNSAT: {} TIMEOUT: {} UNKNOWN: {} ERROR: {}\n\
         Total time: {} seconds (without timeouts: {} seconds)\n",
        c.sat,
        c.unsat,
        c.timeout,
        c.unknown,
        c.error,
        format_seconds(summary.total_runtime_ms),
        format_seconds(summary.runtime_without_timeouts_ms),
    )
}

/// Headline line of the cross-check section.
pub fn issues_line(instances_with_issues: u64) -> String {
    match instances_with_issues {
        1 => "1 instance had validation issues".to_string(),
        n => format!("{n} instances had validation issues"),
    }
}

/// Render a full run report as plain text.
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let run = &report.run;

    out.push_str(&format!(
        "Run {}: {} / {}\n",
        run.id, run.solver, run.benchmark
    ));
    out.push_str(&format!(
        "{} results / {} instances in this benchmark\n",
        report.result_count, report.instance_count
    ));
    if !run.arguments.is_empty() {
        out.push_str(&format!("Arguments: {}\n", run.arguments.join(" ")));
    }
    if !run.description.is_empty() {
        out.push_str(&format!("Description: {}\n", run.description));
    }
    if let Some(started) = &run.started_at {
        out.push_str(&format!("Started: {started}\n"));
    }
    out.push_str(&render_summary(&report.summary));

    out.push('\n');
    out.push_str("Validation:\n");
    for instance in &report.validation.instances {
        render_instance(&mut out, instance);
    }
    out.push_str(&issues_line(report.validation.instances_with_issues));
    out.push('\n');
    out
}

fn render_instance(out: &mut String, instance: &InstanceCheck) {
    out.push_str(&format!(
        "{}: {}/{} validations OK\n",
        instance.instance,
        instance.validations_ok(),
        instance.validations_total()
    ));
    for result in &instance.results {
        render_result(out, result);
    }
}

fn render_result(out: &mut String, result: &ResultCheck) {
    for suspect in &result.suspects {
        out.push_str(&format!(
            "  result {} ({}): {} says {}\n",
            result.result_id, result.outcome, suspect.solver, suspect.judgment
        ));
    }
    if result.outcome == Outcome::Error
        && let Some(stdout) = result.stdout.as_deref()
    {
        out.push_str(&format!("  result {} (error) stdout:\n", result.result_id));
        for line in stdout.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }
}

/// One line per run: `{id}: {solver} / {benchmark} : {arguments} ({description})`.
pub fn render_run_listing(runs: &[RunListing]) -> String {
    let mut out = String::new();
    for run in runs {
        let arguments =
            serde_json::to_string(&run.arguments).unwrap_or_else(|_| run.arguments.join(" "));
        out.push_str(&format!(
            "{}: {} / {} : {} ({})\n",
            run.id, run.solver, run.benchmark, arguments, run.description
        ));
    }
    out
}

pub fn render_json<T: serde::Serialize + ?Sized>(
    value: &T,
    pretty: bool,
) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smtlab_types::{
        CrossCheck, Id, Label, OutcomeCounts, REPORT_SCHEMA_V1, RunHeader, SuspectValidation,
        ToolInfo,
    };

    fn check(id: u64, outcome: Outcome, ok: u32, total: u32) -> ResultCheck {
        ResultCheck {
            result_id: Id(id),
            outcome,
            runtime_ms: 0,
            validations_ok: ok,
            validations_total: total,
            suspects: vec![],
            stdout: None,
        }
    }

    fn report() -> RunReport {
        let mut a = check(1000, Outcome::Sat, 0, 1);
        a.suspects.push(SuspectValidation {
            solver: Label::resolved("cvc5"),
            judgment: "unsat".into(),
        });
        let b = check(1001, Outcome::Unsat, 2, 2);
        let mut err = check(1002, Outcome::Error, 0, 0);
        err.stdout = Some("(error \"line 3: unknown sort\")\n".into());

        RunReport {
            schema: REPORT_SCHEMA_V1.into(),
            tool: ToolInfo {
                name: "smtlab".into(),
                version: "0.0.0".into(),
            },
            run: RunHeader {
                id: Id(1),
                solver: Label::resolved("z3"),
                benchmark: Label::resolved("QF_S"),
                arguments: vec!["--smt2".into(), "-q".into()],
                description: "nightly".into(),
                started_at: Some("2024-05-01T10:00:00Z".into()),
            },
            result_count: 3,
            instance_count: 3,
            summary: RunSummary {
                counts: OutcomeCounts {
                    sat: 1,
                    unsat: 1,
                    timeout: 0,
                    unknown: 0,
                    error: 1,
                },
                total_runtime_ms: 1754,
                runtime_without_timeouts_ms: 1754,
            },
            validation: CrossCheck {
                instances: vec![
                    InstanceCheck {
                        instance_id: Id(20),
                        instance: Label::resolved("a.smt2"),
                        results: vec![a],
                    },
                    InstanceCheck {
                        instance_id: Id(21),
                        instance: Label::resolved("b.smt2"),
                        results: vec![b],
                    },
                    InstanceCheck {
                        instance_id: Id(22),
                        instance: Label::resolved("c.smt2"),
                        results: vec![],
                    },
                    InstanceCheck {
                        instance_id: Id(77),
                        instance: Label::Unresolved { id: Id(77) },
                        results: vec![err],
                    },
                ],
                instances_with_issues: 1,
            },
        }
    }

    #[test]
    fn seconds_have_three_decimals() {
        assert_eq!(format_seconds(0), "0.000");
        assert_eq!(format_seconds(7), "0.007");
        assert_eq!(format_seconds(1500), "1.500");
        assert_eq!(format_seconds(61_234), "61.234");
        assert_eq!(format_seconds(u64::MAX), "18446744073709551.615");
    }

    #[test]
    fn issues_line_is_pluralized() {
        assert_eq!(issues_line(0), "0 instances had validation issues");
        assert_eq!(issues_line(1), "1 instance had validation issues");
        assert_eq!(issues_line(3), "3 instances had validation issues");
    }

    #[test]
    fn summary_lines() {
        let summary = RunSummary {
            counts: OutcomeCounts {
                sat: 1,
                unsat: 1,
                timeout: 1,
                unknown: 0,
                error: 0,
            },
            total_runtime_ms: 61_750,
            runtime_without_timeouts_ms: 1_750,
        };
        assert_eq!(
            render_summary(&summary),
            "SAT: 1 UNSAT: 1 TIMEOUT: 1 UNKNOWN: 0 ERROR: 0\n\
             Total time: 61.750 seconds (without timeouts: 1.750 seconds)\n"
        );
    }

    #[test]
    fn full_report_text() {
        insta::assert_snapshot!(render_report(&report()), @r#"
Run 1: z3 / QF_S
3 results / 3 instances in this benchmark
Arguments: --smt2 -q
Description: nightly
Started: 2024-05-01T10:00:00Z
SAT: 1 UNSAT: 1 TIMEOUT: 0 UNKNOWN: 0 ERROR: 1
Total time: 1.754 seconds (without timeouts: 1.754 seconds)

Validation:
a.smt2: 0/1 validations OK
  result 1000 (sat): cvc5 says unsat
b.smt2: 2/2 validations OK
c.smt2: 0/0 validations OK
???: 0/0 validations OK
  result 1002 (error) stdout:
    (error "line 3: unknown sort")
1 instance had validation issues
"#);
    }

    #[test]
    fn optional_header_lines_are_omitted() {
        let mut r = report();
        r.run.arguments.clear();
        r.run.description.clear();
        r.run.started_at = None;
        let text = render_report(&r);
        assert!(!text.contains("Arguments:"));
        assert!(!text.contains("Description:"));
        assert!(!text.contains("Started:"));
    }

    #[test]
    fn stdout_only_shown_for_error_outcomes() {
        let mut r = report();
        r.validation.instances[1].results[0].stdout = Some("unsat".into());
        let text = render_report(&r);
        assert!(!text.contains("result 1001"));
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render_report(&report()), render_report(&report()));
    }

    #[test]
    fn run_listing_lines() {
        let text = render_run_listing(&[
            RunListing {
                id: Id(1),
                solver: Label::resolved("z3"),
                benchmark: Label::resolved("QF_S"),
                arguments: vec!["--smt2".into()],
                description: "nightly".into(),
            },
            RunListing {
                id: Id(2),
                solver: Label::Unresolved { id: Id(9) },
                benchmark: Label::resolved("QF_LIA"),
                arguments: vec![],
                description: String::new(),
            },
        ]);
        assert_eq!(
            text,
            "1: z3 / QF_S : [\"--smt2\"] (nightly)\n2: ??? / QF_LIA : [] ()\n"
        );
    }

    #[test]
    fn json_carries_schema_and_placeholder_ids() {
        let json = render_json(&report(), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["schema"], "smtlab.report.v1");
        assert_eq!(
            value["validation"]["instances"][3]["instance"],
            serde_json::json!({"kind": "unresolved", "id": 77})
        );
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn seconds_parse_back_to_milliseconds(ms in any::<u64>()) {
                let s = format_seconds(ms);
                let (whole, frac) = s.split_once('.').unwrap();
                prop_assert_eq!(frac.len(), 3);
                let back = whole.parse::<u64>().unwrap() * 1000 + frac.parse::<u64>().unwrap();
                prop_assert_eq!(back, ms);
            }
        }
    }
}
