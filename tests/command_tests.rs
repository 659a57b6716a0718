use collapsed_trace::commands::{
    execute_flamegraph, execute_replay, execute_report, validate_replay_args, FlamegraphArgs,
    ReplayArgs, ReportArgs,
};
use collapsed_trace::flamegraph::FlamegraphConfig;
use collapsed_trace::output::read_report;
use collapsed_trace::tracer::TraceFormat;
use collapsed_trace::utils::{AggregationMode, TraceConfig};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

const EVENTS: &str = r#"{"event":"enter","timestamp":0,"function":{"kind":"main"}}
{"event":"enter","timestamp":100,"function":{"kind":"function","function":"foo"}}
{"event":"enter","timestamp":150,"function":{"kind":"function","function":"bar"}}
{"event":"exit","timestamp":250}
{"event":"exit","timestamp":400}

{"event":"enter","timestamp":500,"function":{"kind":"function","function":"FOO"}}
{"event":"exit","timestamp":700}
{"event":"exit","timestamp":1000}
"#;

fn replay_args(dir: &tempfile::TempDir, mode: &str) -> ReplayArgs {
    let events = dir.path().join("events.jsonl");
    fs::write(&events, EVENTS).unwrap();

    ReplayArgs {
        events,
        output: dir.path().join("trace").to_string_lossy().into_owned(),
        format: TraceFormat::Collapsed,
        config: TraceConfig::new().with_mode(mode),
    }
}

#[test]
fn test_replay_writes_collapsed_trace() {
    let dir = tempfile::tempdir().unwrap();
    let args = replay_args(&dir, "time");

    validate_replay_args(&args).unwrap();
    let outcome = execute_replay(&args).unwrap();

    assert_eq!(outcome.stats.entries, 4);
    assert_eq!(outcome.stats.exits, 4);
    assert_eq!(outcome.stats.max_depth, 3);
    assert_eq!(outcome.stats.open_at_end, 0);
    assert_eq!(
        fs::read_to_string(&outcome.output_filename).unwrap(),
        "{main} 1000\n{main};foo 500\n{main};foo;bar 100\n"
    );
}

#[test]
fn test_replay_rejects_invalid_mode() {
    let dir = tempfile::tempdir().unwrap();
    let args = replay_args(&dir, "wall");

    assert!(validate_replay_args(&args).is_err());
    assert!(execute_replay(&args).is_err());
    assert!(!dir.path().join("trace.txt").exists());
}

#[test]
fn test_replay_keeps_events_before_malformed_line() {
    let dir = tempfile::tempdir().unwrap();
    let args = replay_args(&dir, "calls");
    fs::write(
        &args.events,
        "{\"event\":\"enter\",\"timestamp\":0,\"function\":{\"kind\":\"main\"}}\nnot json\n",
    )
    .unwrap();

    assert!(execute_replay(&args).is_err());

    // The trace is still finished with what was seen
    let content = fs::read_to_string(dir.path().join("trace.txt")).unwrap();
    assert_eq!(content, "{main} 0\n");
}

#[test]
fn test_report_from_replayed_trace() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = execute_replay(&replay_args(&dir, "calls")).unwrap();
    let report_path = dir.path().join("reports/report.json");

    let report = execute_report(&ReportArgs {
        input: PathBuf::from(&outcome.output_filename),
        output: Some(report_path.clone()),
        mode: AggregationMode::Calls,
        top_paths: 5,
        print_summary: false,
    })
    .unwrap();

    assert_eq!(report.stack_count, 3);
    assert_eq!(report.total_weight, 1);
    assert_eq!(report.hot_paths[0].stack, "{main};foo");
    assert_eq!(report.hot_paths[0].weight, 2);

    let loaded = read_report(&report_path).unwrap();
    assert_eq!(loaded.hot_paths.len(), report.hot_paths.len());
    assert_eq!(loaded.mode, AggregationMode::Calls);
}

#[test]
fn test_flamegraph_from_replayed_trace() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = execute_replay(&replay_args(&dir, "time")).unwrap();
    let svg_path = dir.path().join("flame.svg");

    execute_flamegraph(&FlamegraphArgs {
        input: PathBuf::from(&outcome.output_filename),
        output: svg_path.clone(),
        config: FlamegraphConfig::new()
            .with_title("Replay")
            .with_self_weights(true),
    })
    .unwrap();

    let svg = fs::read_to_string(svg_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("foo"));
}
