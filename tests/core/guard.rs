use pulsecheck::core::db;
use pulsecheck::core::error::PulseError;
use pulsecheck::core::guard::{self, Caller, Role};
use pulsecheck::core::store::Store;
use pulsecheck::plugins::directory;
use pulsecheck::plugins::report;
use pulsecheck::plugins::survey;
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

/// Two isolated companies, each with one HR and one employee.
struct TwoTenants {
    company_a: i64,
    company_b: i64,
    hr_a: Caller,
    employee_b_id: i64,
}

fn seed_two_tenants(store: &Store) -> TwoTenants {
    let a = directory::add_company(store, &root_caller(), "Alpha Works").unwrap();
    let b = directory::add_company(store, &root_caller(), "Beta Labs").unwrap();
    let hr_a = directory::add_employee(
        store,
        &root_caller(),
        &a.id.to_string(),
        "Harriet",
        "harriet@alpha.example.com",
        "hr",
    )
    .unwrap();
    directory::add_employee(
        store,
        &root_caller(),
        &a.id.to_string(),
        "Ada",
        "ada@alpha.example.com",
        "employee",
    )
    .unwrap();
    let employee_b = directory::add_employee(
        store,
        &root_caller(),
        &b.id.to_string(),
        "Bjorn",
        "bjorn@beta.example.com",
        "employee",
    )
    .unwrap();
    TwoTenants {
        company_a: a.id,
        company_b: b.id,
        hr_a: Caller::Employee {
            employee_id: hr_a.id,
            company_id: a.id,
            role: Role::Hr,
        },
        employee_b_id: employee_b.id,
    }
}

#[test]
fn test_hr_cannot_cross_tenant_boundaries() {
    let (_tmp, store) = setup_store();
    let tenants = seed_two_tenants(&store);

    // Every company-B surface rejects HR of company A, regardless of
    // whether the targeted resource exists.
    let err = survey::company_status(&store, &tenants.hr_a, &tenants.company_b.to_string())
        .unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));

    let err = report::company_report(&store, &tenants.hr_a, &tenants.company_b.to_string())
        .unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));

    let err = report::individual_report(&store, &tenants.hr_a, tenants.employee_b_id).unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));

    let err =
        report::reset(&store, &tenants.hr_a, &tenants.company_b.to_string(), false).unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));

    let err = report::reset_one(&store, &tenants.hr_a, tenants.employee_b_id).unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));

    let err = directory::add_employee(
        &store,
        &tenants.hr_a,
        &tenants.company_b.to_string(),
        "Intruder",
        "intruder@beta.example.com",
        "employee",
    )
    .unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));

    // Inside its own company, HR passes the same gates.
    survey::company_status(&store, &tenants.hr_a, &tenants.company_a.to_string()).unwrap();
    report::reset(&store, &tenants.hr_a, &tenants.company_a.to_string(), false).unwrap();
}

#[test]
fn test_unknown_company_is_not_found_not_empty() {
    let (_tmp, store) = setup_store();
    seed_two_tenants(&store);
    let err = survey::company_status(&store, &root_caller(), "Gamma Ghost").unwrap_err();
    assert!(matches!(err, PulseError::NotFound(_)));
}

#[test]
fn test_admin_role_is_superuser() {
    let (_tmp, store) = setup_store();
    let tenants = seed_two_tenants(&store);
    let admin = directory::add_employee(
        &store,
        &root_caller(),
        &tenants.company_a.to_string(),
        "Root Admin",
        "admin@alpha.example.com",
        "admin",
    )
    .unwrap();
    let admin_caller = Caller::Employee {
        employee_id: admin.id,
        company_id: tenants.company_a,
        role: Role::Admin,
    };
    // Admin of company A may read company B.
    survey::company_status(&store, &admin_caller, &tenants.company_b.to_string()).unwrap();
}

#[test]
fn test_plain_employee_lacks_management_surfaces() {
    let (_tmp, store) = setup_store();
    let tenants = seed_two_tenants(&store);
    let employee_b = Caller::Employee {
        employee_id: tenants.employee_b_id,
        company_id: tenants.company_b,
        role: Role::Employee,
    };
    // Own-company, but management-gated.
    let err = survey::company_status(&store, &employee_b, &tenants.company_b.to_string())
        .unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));
    let err =
        report::reset(&store, &employee_b, &tenants.company_b.to_string(), false).unwrap_err();
    assert!(matches!(err, PulseError::Forbidden(_)));

    // Own submission status and report remain readable.
    survey::submission_status(&store, &employee_b, tenants.employee_b_id).unwrap();
    report::individual_report(&store, &employee_b, tenants.employee_b_id).unwrap();
}

#[test]
fn test_resolve_actor() {
    let (_tmp, store) = setup_store();
    let tenants = seed_two_tenants(&store);
    let conn = db::db_connect(&db::pulse_db_path(&store.root).to_string_lossy()).unwrap();

    assert!(matches!(
        guard::resolve_actor(&conn, "root").unwrap(),
        Caller::Root
    ));

    match guard::resolve_actor(&conn, &tenants.employee_b_id.to_string()).unwrap() {
        Caller::Employee {
            employee_id,
            company_id,
            role,
        } => {
            assert_eq!(employee_id, tenants.employee_b_id);
            assert_eq!(company_id, tenants.company_b);
            assert_eq!(role, Role::Employee);
        }
        other => panic!("expected employee caller, got {other:?}"),
    }

    let err = guard::resolve_actor(&conn, "123456").unwrap_err();
    assert!(matches!(err, PulseError::NotFound(_)));
    let err = guard::resolve_actor(&conn, "not-a-number").unwrap_err();
    assert!(matches!(err, PulseError::ValidationError(_)));
}
