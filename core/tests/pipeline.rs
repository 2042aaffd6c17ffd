//! End-to-end pipeline tests against the sample upstream dumps in data/.

use birth_lottery_core::{
    config::LotteryConfig,
    error::LotteryError,
    indicator::{parse_country_response, parse_indicator_response, YearSelection},
    pipeline::build_from_source,
    report::{lookup_row, respond, DataResponse},
    source::{DataSource, FileSource},
};

fn data_dir() -> String {
    format!("{}/../data", env!("CARGO_MANIFEST_DIR"))
}

fn file_source(config: &LotteryConfig) -> FileSource {
    FileSource::new(config.worldbank_path(&data_dir()))
}

#[test]
fn config_loads_from_data_dir() {
    let config = LotteryConfig::load(&data_dir()).expect("config");

    assert_eq!(config.cache_ttl_secs, 86_400);
    assert_eq!(config.year, Some(2022));
    assert_eq!(config.batch_size, 10);
    assert_eq!(config.indicators.population, "SP.POP.TOTL");
}

#[test]
fn sample_data_builds_distribution() {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = LotteryConfig::default_test();

    let dist = build_from_source(&file_source(&config), &config).expect("pipeline");

    // Eritrea has no population value; aggregates are listed but not drawable.
    assert!(dist.lookup("ERI").is_err());
    assert_eq!(dist.eligible_count(), 11);
    assert!(!dist.lookup("WLD").unwrap().eligible);
    assert!(!dist.lookup("EAS").unwrap().eligible);
    assert_eq!(dist.eligible().next().unwrap().id(), "IND");

    let sum: f64 = dist.eligible().map(|e| e.probability).sum();
    assert!((sum - 100.0).abs() <= 1e-3, "probability sum {sum}");
}

#[test]
fn null_gdp_merges_as_zero() {
    let config = LotteryConfig::default_test();

    let dist = build_from_source(&file_source(&config), &config).unwrap();

    let prk = dist.lookup("PRK").unwrap();
    assert!(prk.eligible);
    assert_eq!(prk.record.gdp_per_capita, 0.0);
}

#[test]
fn year_selection_changes_values() {
    let config = LotteryConfig::default_test();
    let source = file_source(&config);

    let y2022 = source.fetch_indicator("SP.DYN.CBRT.IN", YearSelection::Exact(2022)).unwrap();
    let y2021 = source.fetch_indicator("SP.DYN.CBRT.IN", YearSelection::Exact(2021)).unwrap();
    let latest = source.fetch_indicator("SP.DYN.CBRT.IN", YearSelection::MostRecent).unwrap();

    assert_eq!(y2022.get("FRA"), Some(10.7));
    assert_ne!(y2021.get("FRA"), y2022.get("FRA"));
    assert_eq!(latest.get("FRA"), Some(10.7));
    assert_eq!(latest.year_of("FRA"), Some(2022));
}

#[test]
fn missing_dump_is_upstream_fetch_error() {
    let config = LotteryConfig::default_test();
    let source = FileSource::new(format!("{}/no-such-dir", data_dir()));

    let err = build_from_source(&source, &config).unwrap_err();

    assert!(matches!(err, LotteryError::UpstreamFetch { .. }), "got {err}");
}

#[test]
fn malformed_envelopes_are_rejected() {
    let one_element = r#"[{"message":[{"id":"120","key":"Invalid value"}]}]"#;
    let not_array = r#"{"page":1}"#;
    let null_records = r#"[{"page":1}, null]"#;
    let bad_json = r#"[{"page":1}, [ {"countryiso3code": "#;

    for body in [one_element, not_array, null_records, bad_json] {
        let err = parse_indicator_response("SP.POP.TOTL", body, YearSelection::MostRecent).unwrap_err();
        assert!(matches!(err, LotteryError::MalformedResponse { .. }), "{body} -> {err}");
    }

    let err = parse_country_response("countries", one_element).unwrap_err();
    assert!(matches!(err, LotteryError::MalformedResponse { .. }));
}

#[test]
fn null_values_are_dropped_not_zero_filled() {
    let body = r#"[{"page":1},[
        {"countryiso3code":"ERI","date":"2022","value":null},
        {"countryiso3code":"","date":"2022","value":5.0},
        {"countryiso3code":"FRA","date":"2022","value":67935660}
    ]]"#;

    let table = parse_indicator_response("SP.POP.TOTL", body, YearSelection::Exact(2022)).unwrap();

    assert_eq!(table.len(), 1);
    assert_eq!(table.get("ERI"), None);
    assert_eq!(table.get("FRA"), Some(67_935_660.0));
}

/// The output contract keeps its field names verbatim.
#[test]
fn response_contract_field_names() {
    let config = LotteryConfig::default_test();
    let result = build_from_source(&file_source(&config), &config);

    let response = respond(&result);
    assert!(response.is_success());
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["totalCountries"], 11);
    assert!(json["totalBirths"].as_f64().unwrap() > 0.0);
    let row = &json["countries"][0];
    for key in [
        "id", "name", "iso2", "region", "incomeLevel", "capital", "longitude", "latitude",
        "birthRate", "population", "gdpPerCapita", "births", "probability",
    ] {
        assert!(row.get(key).is_some(), "missing field {key} in {row}");
    }
}

#[test]
fn lookup_row_uses_contract_field_names() {
    let config = LotteryConfig::default_test();
    let dist = build_from_source(&file_source(&config), &config).unwrap();

    let row = lookup_row(&dist, "fr").unwrap();
    let json = serde_json::to_value(&row).unwrap();

    assert_eq!(json["id"], "FRA");
    assert_eq!(json["birthRate"], 10.7);
    assert_eq!(json["incomeLevel"], "High income");
    assert!(json["gdpPerCapita"].as_f64().unwrap() > 0.0);
    for key in ["record", "weight", "birth_rate_per_mille", "gdp_per_capita", "income_level"] {
        assert!(json.get(key).is_none(), "unexpected key {key} in {json}");
    }
    assert!(matches!(lookup_row(&dist, "XXX"), Err(LotteryError::UnknownCountry { .. })));
}

#[test]
fn failure_contract_shape() {
    let config = LotteryConfig::default_test();
    let source = FileSource::new("/nonexistent");
    let result = build_from_source(&source, &config);

    let response = respond(&result);

    assert!(matches!(response, DataResponse::Failure(_)));
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("Upstream fetch failed"));
}
