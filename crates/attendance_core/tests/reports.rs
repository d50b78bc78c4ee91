use attendance_core::db::open_db_in_memory;
use attendance_core::{
    AttendanceService, AttendanceStatus, ExportScope, RepoError, ReportFilter, ReportService,
    RosterService, SqliteAttendanceRepository, SqliteReportRepository, SqliteStudentRepository,
    Student,
};
use rusqlite::Connection;

struct Fixture {
    conn: Connection,
}

impl Fixture {
    fn new() -> Self {
        Self {
            conn: open_db_in_memory().unwrap(),
        }
    }

    fn roster(&self) -> RosterService<SqliteStudentRepository<'_>> {
        RosterService::new(SqliteStudentRepository::try_new(&self.conn).unwrap())
    }

    fn ledger(&self) -> AttendanceService<SqliteAttendanceRepository<'_>> {
        AttendanceService::new(SqliteAttendanceRepository::try_new(&self.conn).unwrap())
    }

    fn reports(&self) -> ReportService<SqliteReportRepository<'_>> {
        ReportService::new(SqliteReportRepository::try_new(&self.conn).unwrap())
    }

    fn add(&self, roll_no: &str, name: &str, class_label: &str) -> Student {
        self.roster().add_student(roll_no, name, class_label).unwrap()
    }

    fn mark(&self, student: &Student, date: &str, status: AttendanceStatus) {
        self.ledger().mark(student.id, date, status).unwrap();
    }
}

fn as_tuples(rows: &[attendance_core::ReportRow]) -> Vec<(String, String, String, String)> {
    rows.iter()
        .map(|row| {
            (
                row.roll_no.clone(),
                row.name.clone(),
                row.date.to_string(),
                row.status.to_string(),
            )
        })
        .collect()
}

#[test]
fn report_by_date_returns_marked_students_in_roll_order() {
    let fx = Fixture::new();
    let bob = fx.add("S2", "Bob", "10A");
    let alice = fx.add("S1", "Alice", "10A");
    fx.mark(&alice, "2024-01-10", AttendanceStatus::Present);
    fx.mark(&bob, "2024-01-10", AttendanceStatus::Absent);

    let rows = fx.reports().report_by_date("2024-01-10").unwrap();

    assert_eq!(
        as_tuples(&rows),
        vec![
            (
                "S1".to_string(),
                "Alice".to_string(),
                "2024-01-10".to_string(),
                "Present".to_string()
            ),
            (
                "S2".to_string(),
                "Bob".to_string(),
                "2024-01-10".to_string(),
                "Absent".to_string()
            ),
        ]
    );
}

#[test]
fn report_by_date_omits_unmarked_students_and_orders_by_class() {
    let fx = Fixture::new();
    let senior = fx.add("S1", "Alice", "11A");
    let junior = fx.add("S9", "Ivan", "09B");
    let unmarked = fx.add("S5", "Erin", "10A");
    fx.mark(&senior, "2024-01-10", AttendanceStatus::Absent);
    fx.mark(&junior, "2024-01-10", AttendanceStatus::Present);
    fx.mark(&unmarked, "2024-01-11", AttendanceStatus::Present);

    let rows = fx.reports().report_by_date("2024-01-10").unwrap();

    let rolls: Vec<_> = rows.iter().map(|row| row.roll_no.as_str()).collect();
    assert_eq!(rolls, vec!["S9", "S1"]);
}

#[test]
fn report_by_date_rejects_invalid_date() {
    let fx = Fixture::new();

    let err = fx.reports().report_by_date("2024-13-40").unwrap_err();
    assert!(matches!(err, RepoError::InvalidDate(_)));
}

#[test]
fn report_by_student_is_date_ordered_inner_join() {
    let fx = Fixture::new();
    let alice = fx.add("S1", "Alice", "10A");
    fx.mark(&alice, "2024-02-01", AttendanceStatus::Absent);
    fx.mark(&alice, "2023-12-31", AttendanceStatus::Present);
    fx.mark(&alice, "2024-01-15", AttendanceStatus::Present);

    let rows = fx.reports().report_by_student(alice.id).unwrap();

    let dates: Vec<_> = rows.iter().map(|row| row.date.to_string()).collect();
    assert_eq!(dates, vec!["2023-12-31", "2024-01-15", "2024-02-01"]);
    assert!(rows.iter().all(|row| row.roll_no == "S1" && row.name == "Alice"));
}

#[test]
fn report_by_student_without_marks_is_empty_but_unknown_is_not_found() {
    let fx = Fixture::new();
    let alice = fx.add("S1", "Alice", "10A");

    assert!(fx.reports().report_by_student(alice.id).unwrap().is_empty());

    let err = fx.reports().report_by_student(alice.id + 100).unwrap_err();
    assert!(matches!(err, RepoError::StudentNotFound(_)));
}

#[test]
fn report_filter_dispatches_to_matching_report() {
    let fx = Fixture::new();
    let alice = fx.add("S1", "Alice", "10A");
    let bob = fx.add("S2", "Bob", "10A");
    fx.mark(&alice, "2024-01-10", AttendanceStatus::Present);
    fx.mark(&bob, "2024-01-11", AttendanceStatus::Present);

    let reports = fx.reports();
    let by_student = reports.report(&ReportFilter::ByStudent(bob.id)).unwrap();
    assert_eq!(by_student.len(), 1);
    assert_eq!(by_student[0].roll_no, "S2");

    let by_date = reports
        .report(&ReportFilter::ByDate("2024-01-10".to_string()))
        .unwrap();
    assert_eq!(by_date.len(), 1);
    assert_eq!(by_date[0].roll_no, "S1");
}

#[test]
fn export_students_uses_fixed_columns_in_id_order() {
    let fx = Fixture::new();
    let bob = fx.add("S2", "Bob", "10B");
    let alice = fx.add("S1", "Alice", "10A");

    let table = fx.reports().export_rows(ExportScope::Students).unwrap();

    assert_eq!(table.columns, ["id", "roll_no", "name", "class_label"]);
    assert_eq!(
        table.rows,
        vec![
            vec![bob.id.to_string(), "S2".into(), "Bob".into(), "10B".into()],
            vec![alice.id.to_string(), "S1".into(), "Alice".into(), "10A".into()],
        ]
    );
}

#[test]
fn export_attendance_orders_by_date_class_and_roll() {
    let fx = Fixture::new();
    let cara = fx.add("S3", "Cara", "10B");
    let bob = fx.add("S2", "Bob", "10A");
    let alice = fx.add("S1", "Alice", "10A");
    fx.mark(&cara, "2024-01-10", AttendanceStatus::Present);
    fx.mark(&bob, "2024-01-10", AttendanceStatus::Absent);
    fx.mark(&alice, "2024-01-11", AttendanceStatus::Present);
    fx.mark(&alice, "2024-01-10", AttendanceStatus::Present);

    let table = fx.reports().export_rows(ExportScope::Attendance).unwrap();

    assert_eq!(
        table.columns,
        ["id", "roll_no", "name", "class_label", "date", "status"]
    );
    let keys: Vec<_> = table
        .rows
        .iter()
        .map(|row| (row[4].as_str(), row[1].as_str(), row[5].as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2024-01-10", "S1", "Present"),
            ("2024-01-10", "S2", "Absent"),
            ("2024-01-10", "S3", "Present"),
            ("2024-01-11", "S1", "Present"),
        ]
    );
}

#[test]
fn export_scope_parses_selector_text() {
    assert_eq!("students".parse::<ExportScope>().unwrap(), ExportScope::Students);
    assert_eq!(
        " Attendance ".parse::<ExportScope>().unwrap(),
        ExportScope::Attendance
    );
    for scope in [ExportScope::Students, ExportScope::Attendance] {
        assert_eq!(scope.as_str().parse::<ExportScope>().unwrap(), scope);
    }
    assert_eq!(ExportScope::Attendance.columns().len(), 6);
    let err = "grades".parse::<ExportScope>().unwrap_err();
    assert!(err.to_string().contains("grades"));
}

#[test]
fn export_table_serializes_for_external_writers() {
    let fx = Fixture::new();
    let alice = fx.add("S1", "Alice", "10A");
    fx.mark(&alice, "2024-01-10", AttendanceStatus::Present);

    let table = fx.reports().export_rows(ExportScope::Attendance).unwrap();
    let json = serde_json::to_value(&table).unwrap();

    assert_eq!(json["scope"], "attendance");
    assert_eq!(json["columns"][5], "status");
    assert_eq!(json["rows"][0][4], "2024-01-10");

    let report = fx.reports().report_by_date("2024-01-10").unwrap();
    let row_json = serde_json::to_value(&report[0]).unwrap();
    assert_eq!(row_json["date"], "2024-01-10");
    assert_eq!(row_json["status"], "Present");
}
