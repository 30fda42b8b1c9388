use pulsecheck::core::completion;
use pulsecheck::core::db;
use pulsecheck::core::error::PulseError;
use pulsecheck::core::guard::{Caller, Role};
use pulsecheck::core::store::Store;
use pulsecheck::plugins::directory::{self, ImportEmployeeRow};
use pulsecheck::plugins::survey::{self, AnswerInput};
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

fn seed_form(store: &Store) -> i64 {
    let prompts: Vec<String> = (1..=3)
        .map(|i| format!("Question number {i}?"))
        .collect();
    survey::create_form(store, &root_caller(), "Quarterly Pulse", &prompts)
        .unwrap()
        .id
}

fn seed_company(store: &Store, name: &str, roster: &[(&str, &str)]) -> (i64, Vec<i64>) {
    let company = directory::add_company(store, &root_caller(), name).unwrap();
    let mut ids = Vec::new();
    for (employee_name, role) in roster {
        let email = format!(
            "{}@{}.example.com",
            employee_name.to_lowercase().replace(' ', "."),
            name.to_lowercase().replace(' ', "-")
        );
        let employee = directory::add_employee(
            store,
            &root_caller(),
            &company.id.to_string(),
            employee_name,
            &email,
            role,
        )
        .unwrap();
        ids.push(employee.id);
    }
    (company.id, ids)
}

fn answers_for(store: &Store, form_id: i64) -> Vec<AnswerInput> {
    let (_, questions) = survey::get_form(store, form_id).unwrap();
    questions
        .iter()
        .map(|q| AnswerInput {
            question_id: q.id,
            answer: format!("answer to {}", q.position),
        })
        .collect()
}

fn response_count(store: &Store, employee_id: i64) -> i64 {
    let conn = db::db_connect(&db::pulse_db_path(&store.root).to_string_lossy()).unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM survey_responses WHERE employee_id = ?1",
        [employee_id],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn test_submission_walks_company_to_completion() {
    let (_tmp, store) = setup_store();
    let form_id = seed_form(&store);
    let (company_id, ids) = seed_company(
        &store,
        "Acme Corp",
        &[("Ada", "employee"), ("Ben", "employee"), ("Cleo", "manager")],
    );
    let answers = answers_for(&store, form_id);

    let first = survey::submit(&store, &root_caller(), ids[0], form_id, &answers).unwrap();
    assert!(first.filled_flag_set);
    assert_eq!(first.completion.total, 3);
    assert_eq!(first.completion.filled, 1);
    assert!(!first.completion.complete);
    assert!(!first.analysis_due);

    let second = survey::submit(&store, &root_caller(), ids[1], form_id, &answers).unwrap();
    assert_eq!(second.completion.filled, 2);
    assert!(!second.analysis_due);

    let third = survey::submit(&store, &root_caller(), ids[2], form_id, &answers).unwrap();
    assert_eq!(third.completion.filled, 3);
    assert!(third.completion.complete);
    assert!(third.analysis_due);
    assert_eq!(third.company_id, company_id);
}

#[test]
fn test_hr_is_excluded_from_completion() {
    let (_tmp, store) = setup_store();
    let form_id = seed_form(&store);
    let (company_id, ids) = seed_company(
        &store,
        "Acme Corp",
        &[("Ada", "employee"), ("Harriet", "hr")],
    );
    let answers = answers_for(&store, form_id);

    let outcome = survey::submit(&store, &root_caller(), ids[0], form_id, &answers).unwrap();
    assert_eq!(outcome.completion.total, 1);
    assert!(outcome.completion.complete);

    let status = survey::company_status(&store, &root_caller(), &company_id.to_string()).unwrap();
    assert!(status.missing.is_empty());
}

#[test]
fn test_empty_company_is_never_complete() {
    let (_tmp, store) = setup_store();
    let (company_id, _) = seed_company(&store, "Hollow Inc", &[]);
    let conn = db::db_connect(&db::pulse_db_path(&store.root).to_string_lossy()).unwrap();
    let status = completion::completion_status(&conn, company_id).unwrap();
    assert_eq!(status.total, 0);
    assert!(!status.complete);

    // A company with only HR is equally empty for completion purposes.
    let (hr_only, _) = seed_company(&store, "HR Island", &[("Harriet", "hr")]);
    let status = completion::completion_status(&conn, hr_only).unwrap();
    assert_eq!(status.total, 0);
    assert!(!status.complete);
}

#[test]
fn test_submission_is_all_or_nothing() {
    let (_tmp, store) = setup_store();
    let form_id = seed_form(&store);
    let (_, ids) = seed_company(&store, "Acme Corp", &[("Ada", "employee")]);
    let mut answers = answers_for(&store, form_id);
    answers.push(AnswerInput {
        question_id: 9_999,
        answer: "refers to a question outside the form".into(),
    });

    let err = survey::submit(&store, &root_caller(), ids[0], form_id, &answers).unwrap_err();
    assert!(matches!(err, PulseError::ValidationError(_)));

    // No partial batch is ever visible, and the flag stayed clear.
    assert_eq!(response_count(&store, ids[0]), 0);
    let (_, filled) = survey::submission_status(&store, &root_caller(), ids[0]).unwrap();
    assert!(!filled);
}

#[test]
fn test_submission_validation_rejections() {
    let (_tmp, store) = setup_store();
    let form_id = seed_form(&store);
    let (_, ids) = seed_company(&store, "Acme Corp", &[("Ada", "employee")]);
    let answers = answers_for(&store, form_id);

    // Empty batch
    let err = survey::submit(&store, &root_caller(), ids[0], form_id, &[]).unwrap_err();
    assert!(matches!(err, PulseError::ValidationError(_)));

    // Duplicate question
    let mut duplicated = answers.clone();
    duplicated.push(duplicated[0].clone());
    let err = survey::submit(&store, &root_caller(), ids[0], form_id, &duplicated).unwrap_err();
    assert!(matches!(err, PulseError::ValidationError(_)));

    // Blank answer
    let mut blank = answers.clone();
    blank[1].answer = "   ".into();
    let err = survey::submit(&store, &root_caller(), ids[0], form_id, &blank).unwrap_err();
    assert!(matches!(err, PulseError::ValidationError(_)));

    // Unknown employee / unknown form
    let err = survey::submit(&store, &root_caller(), 404, form_id, &answers).unwrap_err();
    assert!(matches!(err, PulseError::NotFound(_)));
    let err = survey::submit(&store, &root_caller(), ids[0], 404, &answers).unwrap_err();
    assert!(matches!(err, PulseError::NotFound(_)));

    assert_eq!(response_count(&store, ids[0]), 0);
}

#[test]
fn test_double_submission_conflicts_until_reset() {
    let (_tmp, store) = setup_store();
    let form_id = seed_form(&store);
    let (_, ids) = seed_company(&store, "Acme Corp", &[("Ada", "employee")]);
    let answers = answers_for(&store, form_id);

    survey::submit(&store, &root_caller(), ids[0], form_id, &answers).unwrap();
    let err = survey::submit(&store, &root_caller(), ids[0], form_id, &answers).unwrap_err();
    assert!(matches!(err, PulseError::Conflict(_)));
}

#[test]
fn test_employee_submits_for_self_only() {
    let (_tmp, store) = setup_store();
    let form_id = seed_form(&store);
    let (company_id, ids) = seed_company(
        &store,
        "Acme Corp",
        &[("Ada", "employee"), ("Ben", "employee")],
    );
    let answers = answers_for(&store, form_id);

    let ada = Caller::Employee {
        employee_id: ids[0],
        company_id,
        role: Role::Employee,
    };
    let err = survey::submit(&store, &ada, ids[1], form_id, &answers).unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));
    survey::submit(&store, &ada, ids[0], form_id, &answers).unwrap();
}

#[test]
fn test_company_status_lists_missing_employees() {
    let (_tmp, store) = setup_store();
    let form_id = seed_form(&store);
    let (company_id, ids) = seed_company(
        &store,
        "Acme Corp",
        &[("Ada", "employee"), ("Ben", "employee")],
    );
    let answers = answers_for(&store, form_id);
    survey::submit(&store, &root_caller(), ids[0], form_id, &answers).unwrap();

    let status = survey::company_status(&store, &root_caller(), "Acme Corp").unwrap();
    assert_eq!(status.company_id, company_id);
    assert_eq!(status.completion.filled, 1);
    assert_eq!(status.missing.len(), 1);
    assert_eq!(status.missing[0].name, "Ben");
}

#[test]
fn test_seed_default_form_is_idempotent() {
    let (_tmp, store) = setup_store();
    let first = survey::seed_default_form(&store, &root_caller()).unwrap();
    let second = survey::seed_default_form(&store, &root_caller()).unwrap();
    assert_eq!(first.id, second.id);

    let (_, questions) = survey::get_form(&store, first.id).unwrap();
    assert!(questions.len() >= 5);
    assert_eq!(questions[0].position, 1);
}

#[test]
fn test_employee_import_is_atomic() {
    let (_tmp, store) = setup_store();
    let (company_id, _) = seed_company(&store, "Acme Corp", &[]);
    let rows = vec![
        ImportEmployeeRow {
            name: "Ada".into(),
            email: "ada@acme.example.com".into(),
            role: None,
        },
        ImportEmployeeRow {
            name: "Broken".into(),
            email: "not-an-email".into(),
            role: Some("employee".into()),
        },
    ];
    let err =
        directory::import_employees(&store, &root_caller(), &company_id.to_string(), &rows)
            .unwrap_err();
    assert!(matches!(err, PulseError::ValidationError(_)));

    let employees =
        directory::list_employees(&store, &root_caller(), &company_id.to_string()).unwrap();
    assert!(employees.is_empty());

    let good: Vec<ImportEmployeeRow> = vec![
        ImportEmployeeRow {
            name: "Ada".into(),
            email: "ada@acme.example.com".into(),
            role: None,
        },
        ImportEmployeeRow {
            name: "Harriet".into(),
            email: "harriet@acme.example.com".into(),
            role: Some("hr".into()),
        },
    ];
    let imported =
        directory::import_employees(&store, &root_caller(), &company_id.to_string(), &good)
            .unwrap();
    assert_eq!(imported, 2);
}

#[test]
fn test_company_resolution_by_id_and_name() {
    let (_tmp, store) = setup_store();
    let (company_id, _) = seed_company(&store, "Acme Corp", &[]);
    let conn = db::db_connect(&db::pulse_db_path(&store.root).to_string_lossy()).unwrap();

    let by_id = directory::resolve_company(&conn, &company_id.to_string()).unwrap();
    let by_name = directory::resolve_company(&conn, "Acme Corp").unwrap();
    assert_eq!(by_id.id, by_name.id);

    let err = directory::resolve_company(&conn, "No Such Company").unwrap_err();
    assert!(matches!(err, PulseError::NotFound(_)));
}
