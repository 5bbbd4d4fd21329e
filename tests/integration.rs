//! End-to-end tests for apicase
//!
//! These tests:
//! 1. Write small .xlsx fixtures into a temp directory
//! 2. Read them back through the fixture reader, alongside the checked-in
//!    legacy workbook in tests/fixtures/cases.xls
//! 3. Run the cases against a mock HTTP server

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use apicase::fixture::{self, Cell, ReadOptions};
use apicase::http::{Dispatch, Dispatcher, Payload, ResponseBody};
use apicase::testing::{self, Outcome};
use apicase::{Config, Error, ParamParser};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;

/// A cell written into a test workbook
enum X {
    S(&'static str),
    N(f64),
    B(bool),
    Blank,
}

type Sheet = (&'static str, Vec<Vec<X>>);

fn column_letter(idx: usize) -> char {
    (b'A' + idx as u8) as char
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn sheet_xml(rows: &[Vec<X>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let at = format!("{}{}", column_letter(c), r + 1);
            match cell {
                X::S(s) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    at,
                    escape(s)
                )),
                X::N(n) => xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, at, n)),
                X::B(b) => xml.push_str(&format!(
                    r#"<c r="{}" t="b"><v>{}</v></c>"#,
                    at,
                    u8::from(*b)
                )),
                X::Blank => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Write a minimal .xlsx workbook
fn write_xlsx(path: &Path, sheets: &[Sheet]) {
    let file = File::create(path).expect("Failed to create workbook");
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut overrides = String::new();
    let mut sheet_entries = String::new();
    let mut rels = String::new();
    for (i, (name, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        sheet_entries.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape(name)
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }

    let parts = vec![
        (
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>{overrides}</Types>"#
            ),
        ),
        (
            "_rels/.rels".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
            ),
        ),
    ];

    for (name, content) in parts {
        zip.start_file(name, options).expect("Failed to start zip entry");
        zip.write_all(content.as_bytes()).expect("Failed to write zip entry");
    }
    for (i, (_, rows)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", i + 1), options)
            .expect("Failed to start sheet entry");
        zip.write_all(sheet_xml(rows).as_bytes())
            .expect("Failed to write sheet entry");
    }
    zip.finish().expect("Failed to finish workbook");
}

/// Temp directory holding one fixture file
struct TestContext {
    _dir: tempfile::TempDir,
    fixture: PathBuf,
}

impl TestContext {
    fn new(sheets: &[Sheet]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let fixture = dir.path().join("cases.xlsx");
        write_xlsx(&fixture, sheets);
        Self { _dir: dir, fixture }
    }
}

fn login_sheet() -> Vec<Vec<X>> {
    use X::*;
    vec![
        vec![S("name"), S("method"), S("url"), S("parameters"), S("expected_status")],
        vec![S("login"), S("POST"), S("/login"), S("{\"user\":\"a\"}"), N(200.0)],
        vec![S("missing page"), S("GET"), S("/missing"), Blank, N(200.0)],
        vec![Blank, Blank, Blank, Blank, Blank],
        vec![S("health"), S("get"), S("/health"), Blank, N(200.0)],
    ]
}

/// Sheets of tests/fixtures/cases.xls
///
/// The `.xls` copy stores the fourth row as six empty strings; here those
/// cells are left out.
fn cases_workbook() -> Vec<Sheet> {
    use X::*;
    vec![
        ("Smoke", vec![vec![S("sheet")], vec![S("smoke")]]),
        (
            "Cases",
            vec![
                vec![
                    S("name"),
                    S("method"),
                    S("url"),
                    S("parameters"),
                    S("expected_status"),
                    S("enabled"),
                ],
                vec![S("login"), S("POST"), S("/login"), S("{\"user\":\"a\"}"), N(200.0), B(true)],
                vec![S("missing page"), S("GET"), S("/missing"), Blank, N(404.0), B(false)],
                vec![Blank, Blank, Blank, Blank, Blank, Blank],
                vec![S("health"), S("get"), S("/health"), Blank, N(200.0), B(true)],
            ],
        ),
    ]
}

fn xls_fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cases.xls")
}

fn cases_options() -> ReadOptions {
    ReadOptions {
        sheet_name: Some("Cases".to_string()),
        ..Default::default()
    }
}

fn config_for(server: &MockServer, timeout: f64) -> Arc<Config> {
    let map = serde_json::from_value(json!({
        "base_url": server.uri(),
        "timeout": timeout,
    }))
    .unwrap();
    Arc::new(Config::from_map(map))
}

// ============== Fixture reader ==============

#[test]
fn test_read_xlsx_with_header() {
    let ctx = TestContext::new(&[("Sheet1", login_sheet())]);
    let rows = fixture::read(&ctx.fixture, &ReadOptions::default()).unwrap();

    // The fully blank row is dropped
    assert_eq!(rows.len(), 3);
    for row in &rows {
        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, ["name", "method", "url", "parameters", "expected_status"]);
    }
    assert_eq!(rows[0].get("url"), Some(&Cell::String("/login".into())));
    assert_eq!(rows[0].get("expected_status"), Some(&Cell::Number(200.0)));
    assert_eq!(rows[1].get("parameters"), Some(&Cell::Null));
    assert_eq!(rows[2].get("name"), Some(&Cell::String("health".into())));
}

#[test]
fn test_read_xlsx_without_header() {
    use X::*;
    let ctx = TestContext::new(&[(
        "Sheet1",
        vec![vec![S("GET"), S("/a"), B(true)], vec![S("POST"), S("/b"), N(1.5)]],
    )]);
    let options = ReadOptions {
        skip_header: false,
        ..Default::default()
    };
    let rows = fixture::read(&ctx.fixture, &options).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].keys().collect::<Vec<_>>(), ["col_0", "col_1", "col_2"]);
    assert_eq!(rows[0].get("col_2"), Some(&Cell::Bool(true)));
    assert_eq!(rows[1].get("col_2"), Some(&Cell::Number(1.5)));
}

#[test]
fn test_sheet_name_takes_priority_and_falls_back() {
    use X::*;
    let ctx = TestContext::new(&[
        ("First", vec![vec![S("sheet")], vec![S("first")]]),
        ("Second", vec![vec![S("sheet")], vec![S("second")]]),
    ]);

    let read_with = |name: Option<&str>, index: usize| {
        let options = ReadOptions {
            sheet_name: name.map(str::to_string),
            sheet_index: index,
            skip_header: true,
        };
        let rows = fixture::read(&ctx.fixture, &options).unwrap();
        rows[0].get("sheet").cloned()
    };

    assert_eq!(read_with(Some("Second"), 0), Some(Cell::String("second".into())));
    assert_eq!(read_with(Some("Nope"), 0), Some(Cell::String("first".into())));
    assert_eq!(read_with(Some("Nope"), 1), Some(Cell::String("second".into())));
    assert_eq!(read_with(None, 1), Some(Cell::String("second".into())));
}

#[test]
fn test_sheet_index_out_of_range() {
    let ctx = TestContext::new(&[("Sheet1", login_sheet())]);
    let options = ReadOptions {
        sheet_index: 5,
        ..Default::default()
    };
    let err = fixture::read(&ctx.fixture, &options).unwrap_err();
    assert!(matches!(err, Error::Workbook(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_corrupt_workbook_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"not a zip file").unwrap();
    let err = fixture::read(&path, &ReadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::Workbook(_)));
}

#[test]
fn test_xls_reads_like_xlsx() {
    let ctx = TestContext::new(&cases_workbook());

    let from_xls = fixture::read(&xls_fixture(), &cases_options()).unwrap();
    let from_xlsx = fixture::read(&ctx.fixture, &cases_options()).unwrap();

    assert_eq!(from_xls, from_xlsx);

    // The row of empty strings is dropped
    assert_eq!(from_xls.len(), 3);
    assert_eq!(
        from_xls[0].keys().collect::<Vec<_>>(),
        ["name", "method", "url", "parameters", "expected_status", "enabled"]
    );
    assert_eq!(from_xls[0].get("enabled"), Some(&Cell::Bool(true)));
    assert_eq!(from_xls[1].get("parameters"), Some(&Cell::Null));
    assert_eq!(from_xls[1].get("expected_status"), Some(&Cell::Number(404.0)));
    assert_eq!(from_xls[2].get("name"), Some(&Cell::String("health".into())));
}

#[test]
fn test_xls_without_header_still_drops_empty_string_row() {
    let options = ReadOptions {
        skip_header: false,
        ..cases_options()
    };
    let rows = fixture::read(&xls_fixture(), &options).unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].get("col_0"), Some(&Cell::String("name".into())));
    assert_eq!(rows[3].get("col_0"), Some(&Cell::String("health".into())));
}

#[test]
fn test_xls_sheet_selection() {
    let path = xls_fixture();

    let by_name = fixture::read(&path, &cases_options()).unwrap();
    let by_index = fixture::read(
        &path,
        &ReadOptions {
            sheet_index: 1,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_name, by_index);

    let fallback = ReadOptions {
        sheet_name: Some("Nope".to_string()),
        ..Default::default()
    };
    let rows = fixture::read(&path, &fallback).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("sheet"), Some(&Cell::String("smoke".into())));

    let out_of_range = ReadOptions {
        sheet_index: 5,
        ..Default::default()
    };
    let err = fixture::read(&path, &out_of_range).unwrap_err();
    assert!(matches!(err, Error::Workbook(_)));
}

// ============== Dispatcher ==============

#[tokio::test]
async fn test_dispatcher_captures_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 7, "name": "alice"}))
                .insert_header("set-cookie", "session=abc123; Path=/"),
        )
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(config_for(&server, 5.0)).unwrap();
    let response = dispatcher
        .send("GET", "/api/profile", &Payload::None)
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.url, format!("{}/api/profile", server.uri()));
    assert_eq!(response.body, ResponseBody::Json(json!({"id": 7, "name": "alice"})));
    assert_eq!(response.cookies.get("session").map(String::as_str), Some("abc123"));
    assert!(response
        .header("content-type")
        .unwrap()
        .starts_with("application/json"));
}

#[tokio::test]
async fn test_dispatcher_sends_json_payload() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .and(body_string_contains("\"qty\":3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(config_for(&server, 5.0)).unwrap();
    let response = dispatcher
        .send("put", "/items/1", &Payload::Json(json!({"qty": 3})))
        .await
        .unwrap();
    assert_eq!(response.status, 204);
}

#[tokio::test]
async fn test_dispatcher_timeout_is_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let dispatcher = Dispatcher::new(config_for(&server, 0.2)).unwrap();
    let err = dispatcher
        .send("GET", "/slow", &Payload::None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Request(_)));
}

// ============== End to end ==============

#[tokio::test]
async fn test_run_fixture_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("user=a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "t"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let ctx = TestContext::new(&[("Sheet1", login_sheet())]);
    let summary = testing::run_file(
        &ctx.fixture,
        &ReadOptions::default(),
        config_for(&server, 5.0),
        ParamParser::new(),
        2,
    )
    .await
    .unwrap();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.passed(), 2);

    let names: Vec<&str> = summary.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["login", "missing page", "health"]);

    match &summary.results[1].outcome {
        Outcome::Failed(message) => {
            assert!(message.contains("200"), "message: {message}");
            assert!(message.contains("404"), "message: {message}");
        }
        Outcome::Passed => panic!("Expected /missing to fail"),
    }
}

#[tokio::test]
async fn test_run_xls_fixture() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("user=a"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    // Unmatched /missing gets the mock server's 404, which the row expects
    let summary = testing::run_file(
        &xls_fixture(),
        &cases_options(),
        config_for(&server, 5.0),
        ParamParser::new(),
        1,
    )
    .await
    .unwrap();

    assert_eq!(summary.total(), 3);
    assert!(summary.all_passed(), "results: {:?}", summary.results);
}

#[tokio::test]
async fn test_run_with_empty_config_fails_each_row() {
    let ctx = TestContext::new(&[("Sheet1", login_sheet())]);
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(Some(&dir.path().join("absent.yaml")));
    assert!(config.is_empty());

    let summary = testing::run_file(
        &ctx.fixture,
        &ReadOptions::default(),
        Arc::new(config),
        ParamParser::new(),
        1,
    )
    .await
    .unwrap();

    assert_eq!(summary.failed(), 3);
    for result in &summary.results {
        assert!(matches!(&result.outcome, Outcome::Failed(m) if m.contains("base_url")));
    }
}

#[tokio::test]
async fn test_run_missing_fixture_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let err = testing::run_file(
        &dir.path().join("nope.xlsx"),
        &ReadOptions::default(),
        Arc::new(Config::default()),
        ParamParser::new(),
        1,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}
