//! Parameter validation through wrapped statements and connections.
//!
//! Run with: cargo test --package sqltap --test validation

mod common;

use common::{CallLog, Fixture, Outcome, ScriptedChecker};
use pretty_assertions::assert_eq;
use sqltap::{CapabilityMask, Converter, Middleware, NullInterceptor, WrappedStmt};
use sqltap_core::{
    Check, Conn, Context, Error, NamedParam, NamedValue, NamedValueChecker, Param, Stmt, Value,
};

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

fn fixture(stmt: Option<Outcome>, conn: Option<Outcome>) -> Fixture {
    let log = CallLog::default();
    Fixture {
        stmt_checker: stmt.map(|o| ScriptedChecker::shared("stmt", o, &log)),
        conn_checker: conn.map(|o| ScriptedChecker::shared("conn", o, &log)),
        log,
        ..Fixture::new(CapabilityMask::EMPTY)
    }
}

fn prepare(fixture: &Fixture) -> WrappedStmt {
    let mw = Middleware::new(NullInterceptor);
    let mut conn = fixture.conn();
    let stmt = conn.prepare(&Context::new(), "INSERT INTO t VALUES (?)").unwrap();
    WrappedStmt::new(
        mw,
        Context::new(),
        "INSERT INTO t VALUES (?)",
        stmt,
        conn.value_checker(),
    )
}

fn checks(log: &CallLog) -> Vec<String> {
    log.entries()
        .into_iter()
        .filter(|e| e.contains(".check"))
        .collect()
}

/// Test that an accepting statement validator is the only one consulted.
#[test]
fn test_statement_accepts() {
    common::init_logging();
    let fixture = fixture(
        Some(Outcome::Accept(text("from stmt"))),
        Some(Outcome::Accept(text("from conn"))),
    );
    let stmt = prepare(&fixture);

    let converted = stmt.check_and_convert(&NamedParam::positional(1, 5i32)).unwrap();
    assert_eq!(converted.by, Converter::Statement);
    assert_eq!(converted.value, text("from stmt"));
    assert_eq!(checks(&fixture.log), vec!["stmt.check 1"]);
}

/// Test that a declining statement validator hands over to the connection.
#[test]
fn test_statement_declines_connection_accepts() {
    let fixture = fixture(Some(Outcome::Decline), Some(Outcome::Accept(text("from conn"))));
    let stmt = prepare(&fixture);

    let converted = stmt.check_and_convert(&NamedParam::positional(1, 5i32)).unwrap();
    assert_eq!(converted.by, Converter::Connection);
    assert_eq!(converted.value, text("from conn"));
    assert_eq!(checks(&fixture.log), vec!["stmt.check 1", "conn.check 1"]);
}

/// Test that a connection validator alone is used when the statement has none.
#[test]
fn test_connection_only() {
    let fixture = fixture(None, Some(Outcome::Accept(Value::Int64(99))));
    let stmt = prepare(&fixture);

    let converted = stmt.check_and_convert(&NamedParam::positional(1, 5i32)).unwrap();
    assert_eq!(converted.by, Converter::Connection);
    assert_eq!(converted.value, Value::Int64(99));
}

/// Test that a statement rejection ends the chain.
#[test]
fn test_statement_rejects() {
    let fixture = fixture(
        Some(Outcome::Reject("negative ids are not allowed")),
        Some(Outcome::Accept(text("from conn"))),
    );
    let stmt = prepare(&fixture);

    let result = stmt.check_and_convert(&NamedParam::positional(1, -5i32));
    assert_eq!(result.unwrap_err().to_string(), "negative ids are not allowed");
    assert_eq!(checks(&fixture.log), vec!["stmt.check 1"]);
}

/// Test that without validators the default converter widens a 32-bit integer.
#[test]
fn test_default_widens_int32() {
    let fixture = fixture(None, None);
    let stmt = prepare(&fixture);

    let converted = stmt.check_and_convert(&NamedParam::positional(1, 1234i32)).unwrap();
    assert_eq!(converted.by, Converter::Default);
    assert_eq!(converted.value, Value::Int64(1234));
}

/// Test that both validators declining falls back to the default converter.
#[test]
fn test_both_decline_falls_back() {
    let fixture = fixture(Some(Outcome::Decline), Some(Outcome::Decline));
    let stmt = prepare(&fixture);

    let values = stmt.bind(&NamedParam::from_values([7u16, 8u16])).unwrap();
    assert_eq!(
        values,
        vec![
            NamedValue::new(1, None, Value::Int64(7)),
            NamedValue::new(2, None, Value::Int64(8)),
        ]
    );
    assert_eq!(
        checks(&fixture.log),
        vec!["stmt.check 1", "conn.check 1", "stmt.check 2", "conn.check 2"]
    );
}

/// Test that an unconvertible value without validators is unsupported.
#[test]
fn test_custom_value_unsupported_without_validator() {
    let fixture = fixture(Some(Outcome::Decline), None);
    let stmt = prepare(&fixture);
    let param = NamedParam::named(
        1,
        "location",
        Param::Custom {
            type_name: "geo.point".to_string(),
            payload: serde_json::json!([4.9, 52.3]),
        },
    );

    match stmt.check_and_convert(&param) {
        Err(Error::UnsupportedValue { ordinal, kind, .. }) => {
            assert_eq!(ordinal, 1);
            assert_eq!(kind, "geo.point");
        }
        other => panic!("expected unsupported value, got {other:?}"),
    }
}

/// Test that a prepared statement acts as a single converged validator.
#[test]
fn test_prepared_statement_is_a_validator() {
    let fixture = fixture(Some(Outcome::Decline), None);
    let mw = Middleware::new(NullInterceptor);
    let mut conn = mw.wrap_conn(fixture.conn());
    let stmt = conn.prepare(&Context::new(), "SELECT ?").unwrap();

    let checker = stmt.as_value_checker().unwrap();
    let check = checker.check_named_value(&NamedParam::positional(1, 2.5f32)).unwrap();
    assert_eq!(check, Check::Accept(Value::Float64(2.5)));
}

/// Test that connection-level binding uses the connection validator.
#[test]
fn test_conn_bind_uses_connection_validator() {
    let fixture = fixture(None, Some(Outcome::Accept(text("checked"))));
    let mw = Middleware::new(NullInterceptor);
    let conn = mw.wrap_conn(fixture.conn());

    let values = conn.bind(&[NamedParam::named(1, "name", "x")]).unwrap();
    assert_eq!(values, vec![NamedValue::new(1, Some("name".to_string()), text("checked"))]);
    assert!(conn.value_checker().is_some());
}
