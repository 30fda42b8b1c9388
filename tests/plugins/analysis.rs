use pulsecheck::core::db;
use pulsecheck::core::config::AnalysisConfig;
use pulsecheck::core::error::PulseError;
use pulsecheck::core::guard::Caller;
use pulsecheck::core::store::Store;
use pulsecheck::plugins::analysis::{
    self, AnalysisService, CompanyAnalysisRequest, IndividualAnalysisRequest, TriggerKind,
};
use pulsecheck::plugins::directory;
use pulsecheck::plugins::report;
use pulsecheck::plugins::survey::{self, AnswerInput};
use std::collections::HashSet;
use std::sync::Mutex;
use tempfile::{TempDir, tempdir};

fn setup_store() -> (TempDir, Store) {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join(".pulsecheck").join("data");
    db::initialize_pulse_db(&root).unwrap();
    (tmp, Store::new(root))
}

fn root_caller() -> Caller {
    Caller::Root
}

fn cfg() -> AnalysisConfig {
    AnalysisConfig::default()
}

/// Seeds a complete company: every listed employee has submitted.
fn seed_complete_company(store: &Store, name: &str, employees: &[&str]) -> (i64, Vec<i64>) {
    let prompts: Vec<String> = vec!["How are things?".into(), "What would you change?".into()];
    let form = survey::create_form(store, &root_caller(), &format!("{name} form"), &prompts)
        .unwrap();
    let company = directory::add_company(store, &root_caller(), name).unwrap();
    let mut ids = Vec::new();
    for employee_name in employees {
        let employee = directory::add_employee(
            store,
            &root_caller(),
            &company.id.to_string(),
            employee_name,
            &format!("{}@{}.example.com", employee_name.to_lowercase(), company.id),
            "employee",
        )
        .unwrap();
        let (_, questions) = survey::get_form(store, form.id).unwrap();
        let answers: Vec<AnswerInput> = questions
            .iter()
            .map(|q| AnswerInput {
                question_id: q.id,
                answer: format!("{employee_name} on q{}", q.position),
            })
            .collect();
        survey::submit(store, &root_caller(), employee.id, form.id, &answers).unwrap();
        ids.push(employee.id);
    }
    (company.id, ids)
}

/// Configurable in-memory stand-in for the external analysis service. Like
/// the HTTP client it persists the reports it produces.
struct MockService {
    store: Store,
    fail_employees: HashSet<i64>,
    company_failure: Option<&'static str>,
    /// Clears this employee's `filled` flag during phase 1, simulating a
    /// reset racing the run.
    clear_flag_during_phase1: Option<i64>,
    calls: Mutex<Vec<String>>,
}

impl MockService {
    fn new(store: &Store) -> Self {
        Self {
            store: store.clone(),
            fail_employees: HashSet::new(),
            company_failure: None,
            clear_flag_during_phase1: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl AnalysisService for MockService {
    fn analyze_individual(
        &self,
        request: &IndividualAnalysisRequest,
    ) -> Result<(), PulseError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("individual:{}", request.employee_id));
        if let Some(employee_id) = self.clear_flag_during_phase1 {
            let conn =
                db::db_connect(&db::pulse_db_path(&self.store.root).to_string_lossy()).unwrap();
            conn.execute(
                "UPDATE employees SET filled = 0 WHERE id = ?1",
                [employee_id],
            )
            .unwrap();
        }
        if self.fail_employees.contains(&request.employee_id) {
            return Err(PulseError::ExternalRejected {
                status: 500,
                detail: "model backend exploded".into(),
            });
        }
        report::insert_individual_report(
            &self.store,
            request.employee_id,
            &serde_json::json!({
                "employee_id": request.employee_id,
                "sentiment": "steady",
                "answer_count": request.answers.len()
            }),
        )?;
        Ok(())
    }

    fn analyze_company(&self, request: &CompanyAnalysisRequest) -> Result<(), PulseError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("company:{}", request.company_id));
        match self.company_failure {
            Some("timeout") => Err(PulseError::ExternalTimeout {
                timeout_ms: 180_000,
                detail: "read timed out".into(),
            }),
            Some("unavailable") => {
                Err(PulseError::ExternalUnavailable("connection refused".into()))
            }
            Some(other) => Err(PulseError::ExternalRejected {
                status: 422,
                detail: other.into(),
            }),
            None => {
                report::insert_company_report(
                    &self.store,
                    request.company_id,
                    &serde_json::json!({
                        "company_id": request.company_id,
                        "overall": "healthy"
                    }),
                )?;
                Ok(())
            }
        }
    }
}

fn open_conn(store: &Store) -> rusqlite::Connection {
    db::db_connect(&db::pulse_db_path(&store.root).to_string_lossy()).unwrap()
}

#[test]
fn test_full_run_produces_individual_and_company_reports() {
    let (_tmp, store) = setup_store();
    let (company_id, ids) = seed_complete_company(&store, "Acme", &["ada", "ben"]);
    let service = MockService::new(&store);

    let summary = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Manual,
    )
    .unwrap();

    assert_eq!(summary.status, "succeeded");
    assert_eq!(summary.attempted, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
    assert!(summary.company_report_stored);

    // Company phase runs last, after every individual was attempted.
    let calls = service.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls.last().unwrap(), &format!("company:{company_id}"));

    let conn = open_conn(&store);
    for id in &ids {
        assert!(report::latest_individual_report(&conn, *id).unwrap().is_some());
    }
    assert!(report::latest_company_report(&conn, company_id).unwrap().is_some());

    let runs = analysis::run_status(&store, &root_caller(), &company_id.to_string(), 5).unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].0.status, "succeeded");
}

#[test]
fn test_one_employee_failure_does_not_abort_the_phase() {
    let (_tmp, store) = setup_store();
    let (company_id, ids) = seed_complete_company(&store, "Acme", &["ada", "ben", "cleo"]);
    let mut service = MockService::new(&store);
    service.fail_employees.insert(ids[1]);

    let summary = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Manual,
    )
    .unwrap();

    assert_eq!(summary.status, "succeeded");
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures[0].employee_id, ids[1]);
    assert!(summary.company_report_stored);

    // The failure is on the status surface.
    let runs = analysis::run_status(&store, &root_caller(), &company_id.to_string(), 5).unwrap();
    let events = &runs[0].1;
    assert!(events.iter().any(|e| e.kind == "employee_failed"));

    let conn = open_conn(&store);
    assert!(report::latest_individual_report(&conn, ids[1]).unwrap().is_none());
}

#[test]
fn test_filled_employee_with_no_answers_is_skipped() {
    let (_tmp, store) = setup_store();
    let (company_id, _ids) = seed_complete_company(&store, "Acme", &["ada"]);
    // A flag set without any persisted answers (e.g. a partially failed
    // import repair): completion counts it, analysis must skip it.
    let ghost = directory::add_employee(
        &store,
        &root_caller(),
        &company_id.to_string(),
        "ghost",
        "ghost@acme.example.com",
        "employee",
    )
    .unwrap();
    let conn = open_conn(&store);
    conn.execute("UPDATE employees SET filled = 1 WHERE id = ?1", [ghost.id])
        .unwrap();
    drop(conn);

    let service = MockService::new(&store);
    let summary = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Manual,
    )
    .unwrap();

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.attempted, 1);
    assert!(
        !service
            .calls()
            .contains(&format!("individual:{}", ghost.id))
    );

    let runs = analysis::run_status(&store, &root_caller(), &company_id.to_string(), 5).unwrap();
    assert!(runs[0].1.iter().any(|e| e.kind == "zero_answer_skip"));
}

#[test]
fn test_incomplete_company_is_not_ready() {
    let (_tmp, store) = setup_store();
    let (company_id, _) = seed_complete_company(&store, "Acme", &["ada"]);
    directory::add_employee(
        &store,
        &root_caller(),
        &company_id.to_string(),
        "ben",
        "ben@acme.example.com",
        "employee",
    )
    .unwrap();

    let service = MockService::new(&store);
    let err = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Auto,
    )
    .unwrap_err();
    assert!(matches!(err, PulseError::NotReady(_)));
    assert!(service.calls().is_empty());
}

#[test]
fn test_duplicate_trigger_conflicts_on_the_run_marker() {
    let (_tmp, store) = setup_store();
    let (company_id, _) = seed_complete_company(&store, "Acme", &["ada"]);

    // A concurrent trigger already holds the slot.
    let conn = open_conn(&store);
    conn.execute(
        "INSERT INTO analysis_runs(id, company_id, trigger_kind, status, started_at)
         VALUES('01RUNNINGMARKER', ?1, 'auto', 'running', ?2)",
        rusqlite::params![
            company_id,
            pulsecheck::core::time::now_epoch_z()
        ],
    )
    .unwrap();
    drop(conn);

    let service = MockService::new(&store);
    let err = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Manual,
    )
    .unwrap_err();
    assert!(matches!(err, PulseError::Conflict(_)));
    assert!(service.calls().is_empty());

    // Reset is blocked while the marker is live.
    let err = report::reset(&store, &root_caller(), &company_id.to_string(), false).unwrap_err();
    assert!(matches!(err, PulseError::Conflict(_)));
}

#[test]
fn test_stale_running_marker_is_reaped() {
    let (_tmp, store) = setup_store();
    let (company_id, _) = seed_complete_company(&store, "Acme", &["ada"]);

    // A marker left behind by a crashed child, hours old.
    let stale_ts = format!("{}Z", pulsecheck::core::time::now_unix_secs() - 24 * 3600);
    let conn = open_conn(&store);
    conn.execute(
        "INSERT INTO analysis_runs(id, company_id, trigger_kind, status, started_at)
         VALUES('01STALEMARKER', ?1, 'auto', 'running', ?2)",
        rusqlite::params![company_id, stale_ts],
    )
    .unwrap();
    drop(conn);

    let service = MockService::new(&store);
    let summary = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Manual,
    )
    .unwrap();
    assert_eq!(summary.status, "succeeded");

    let conn = open_conn(&store);
    let stale_status: String = conn
        .query_row(
            "SELECT status FROM analysis_runs WHERE id = '01STALEMARKER'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stale_status, "failed");
}

#[test]
fn test_company_phase_failure_propagates_and_keeps_individuals() {
    let (_tmp, store) = setup_store();
    let (company_id, ids) = seed_complete_company(&store, "Acme", &["ada", "ben"]);
    let mut service = MockService::new(&store);
    service.company_failure = Some("timeout");

    let err = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Manual,
    )
    .unwrap_err();
    assert!(matches!(err, PulseError::ExternalTimeout { .. }));

    // Phase-1 results stay; the run is recorded as failed.
    let conn = open_conn(&store);
    for id in &ids {
        assert!(report::latest_individual_report(&conn, *id).unwrap().is_some());
    }
    assert!(report::latest_company_report(&conn, company_id).unwrap().is_none());
    let runs = analysis::run_status(&store, &root_caller(), &company_id.to_string(), 5).unwrap();
    assert_eq!(runs[0].0.status, "failed");
    assert!(runs[0].1.iter().any(|e| e.kind == "company_failed"));
}

#[test]
fn test_reset_racing_the_run_fails_the_recheck() {
    let (_tmp, store) = setup_store();
    let (company_id, ids) = seed_complete_company(&store, "Acme", &["ada", "ben"]);
    let mut service = MockService::new(&store);
    service.clear_flag_during_phase1 = Some(ids[0]);

    let err = analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Auto,
    )
    .unwrap_err();
    assert!(matches!(err, PulseError::Conflict(_)));

    // The company phase never ran.
    assert!(
        !service
            .calls()
            .iter()
            .any(|call| call.starts_with("company:"))
    );
    let conn = open_conn(&store);
    assert!(report::latest_company_report(&conn, company_id).unwrap().is_none());
    let runs = analysis::run_status(&store, &root_caller(), &company_id.to_string(), 5).unwrap();
    assert_eq!(runs[0].0.status, "failed");
    assert!(runs[0].1.iter().any(|e| e.kind == "recheck_failed"));
}

#[test]
fn test_regenerate_refills_a_missing_individual_report() {
    let (_tmp, store) = setup_store();
    let (company_id, ids) = seed_complete_company(&store, "Acme", &["ada"]);
    let service = MockService::new(&store);
    analysis::run_company_analysis(
        &store,
        &cfg(),
        &service,
        &root_caller(),
        &company_id.to_string(),
        TriggerKind::Manual,
    )
    .unwrap();

    // Simulate a lost report row.
    let conn = open_conn(&store);
    conn.execute(
        "DELETE FROM individual_reports WHERE employee_id = ?1",
        [ids[0]],
    )
    .unwrap();
    drop(conn);

    let availability = report::individual_report(&store, &root_caller(), ids[0]).unwrap();
    assert!(matches!(
        availability,
        report::ReportAvailability::Pending
    ));

    analysis::regenerate(&store, &service, &root_caller(), ids[0]).unwrap();
    let availability = report::individual_report(&store, &root_caller(), ids[0]).unwrap();
    assert!(matches!(
        availability,
        report::ReportAvailability::Report { .. }
    ));
}

#[test]
fn test_regenerate_requires_a_submission() {
    let (_tmp, store) = setup_store();
    let (company_id, _) = seed_complete_company(&store, "Acme", &["ada"]);
    let fresh = directory::add_employee(
        &store,
        &root_caller(),
        &company_id.to_string(),
        "ben",
        "ben@acme.example.com",
        "employee",
    )
    .unwrap();

    let service = MockService::new(&store);
    let err = analysis::regenerate(&store, &service, &root_caller(), fresh.id).unwrap_err();
    assert!(matches!(err, PulseError::NotReady(_)));
}
