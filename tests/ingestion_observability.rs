mod common;

use std::sync::{Arc, Mutex};

use data_import::ingestion::{load_tables, LoadOptions};
use data_import::observability::{
    CompositeObserver, IngestionContext, IngestionSeverity, IngestionStats, PipelineObserver,
};
use data_import::IngestionError;

use common::write_file;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

#[test]
fn observer_receives_failure_and_alert_on_critical_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let obs = RecordingObserver::default();

    // Missing file -> I/O error -> Critical
    let outcome = load_tables(&["does_not_exist.csv"], dir.path(), &obs, &LoadOptions::default());

    assert_eq!(outcome.errors, 1);
    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Critical]);
}

#[test]
fn parse_errors_are_not_alerted_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "bad.json", "{oops");
    let obs = RecordingObserver::default();

    load_tables(&["bad.json"], dir.path(), &obs, &LoadOptions::default());

    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_threshold_alerts_on_warnings() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "x.txt", "hello");
    let obs = RecordingObserver::default();
    let opts = LoadOptions {
        alert_at_or_above: IngestionSeverity::Warning,
    };

    let outcome = load_tables(&["x.txt"], dir.path(), &obs, &opts);

    assert_eq!(outcome.errors, 1);
    assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Warning]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Warning]);
}

#[test]
fn successes_report_table_and_row_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.csv", "x\n1\n2\n3\n");
    write_file(dir.path(), "b.json", r#"[{"y":1}]"#);
    let obs = RecordingObserver::default();

    let outcome = load_tables(&["a.csv", "b.json"], dir.path(), &obs, &LoadOptions::default());

    assert_eq!(outcome.errors, 0);
    assert_eq!(outcome.tables.keys().collect::<Vec<_>>(), vec!["a.csv", "b.json"]);
    assert_eq!(
        *obs.successes.lock().unwrap(),
        vec![
            IngestionStats { tables: 1, rows: 3 },
            IngestionStats { tables: 1, rows: 1 },
        ]
    );
}

#[test]
fn composite_observer_fans_out() {
    let dir = tempfile::tempdir().unwrap();
    let a = Arc::new(RecordingObserver::default());
    let b = Arc::new(RecordingObserver::default());
    let composite = CompositeObserver::new(vec![
        a.clone() as Arc<dyn PipelineObserver>,
        b.clone() as Arc<dyn PipelineObserver>,
    ]);

    load_tables(&["missing.json"], dir.path(), &composite, &LoadOptions::default());

    for obs in [&a, &b] {
        assert_eq!(*obs.failures.lock().unwrap(), vec![IngestionSeverity::Critical]);
        assert_eq!(*obs.alerts.lock().unwrap(), vec![IngestionSeverity::Critical]);
    }
}
