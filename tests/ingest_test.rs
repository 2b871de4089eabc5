use pbl_startanalyse::aggregate::{
    average, co2_reduction_percent, contributing, indicator_averages, sum, totals_column_sum,
};
use pbl_startanalyse::catalog::{InsulationTier, StrategyCode};
use pbl_startanalyse::reports::{baseline_energy_profile, generate_scenario_comparison, strategy_summaries};
use pbl_startanalyse::{load_archive, CellValue, FileRole, IngestConfig, PblError};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const TOTALS: &str = "\
I01_buurtcode;I02_buurtnaam;I03_wijkcode;I06_gemeentenaam;I09_aantal_woningen;I12_CO2_startjaar;Kantoor;Utiliteit_Winkel
BU00010001;Centrum;WK000100;Testdorp;1200;3.450,5;4;2
BU00010002;Haven;WK000100;Testdorp;300;812,25;;7
";

const STRATEGY: &str = "\
I01_buurtcode;I02_buurtnaam;Code_Indicator;Indicator_Label;Referentie_2023;Strategie_1;Strategie_2;Variant_s2d_D_Restwarmte
BU00010001;Centrum;;;;;;
BU00010001;Centrum;V01_Strategievariant;Variant;;s1b;s2d;s2d
BU00010001;Centrum;H01_Vraag_totaal;Totale vraag;100,5;80;70;75
BU00010001;Centrum;H15_CO2_uitstoot;CO2;200;100;50;60
BU00010001;Centrum;H17_Nat_meerkost_CO2;Kosten per ton;;250;300;310
BU00010001;Centrum;A01_Aansl_aardgas;Aardgas;500;0;10;10
BU00010001;Centrum;A02_Aansl_eWP;eWP;0;480;5;5
";

const DETAIL: &str = "\
I01_buurtcode;Type;Aantal
BU00010001;Rijwoning;812
BU00010002;Appartement;120
BU99999999;Vrijstaand;3
";

fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn sample_archive() -> Vec<u8> {
    build_zip(&[
        ("GM0001_bebouwing.csv", DETAIL),
        ("GM0001_strategie.csv", STRATEGY),
        ("GM0001_totaalbebouwing.csv", TOTALS),
    ])
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn neighborhood_missing_from_strategy_keeps_totals() {
    let (dataset, report) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();

    assert_eq!(dataset.neighborhoods.len(), 2);
    assert_eq!(dataset.metadata.neighborhood_count, 2);
    assert_eq!(report.totals_rows, 2);

    let haven = dataset.get("BU00010002").unwrap();
    assert!(haven.matrix.is_empty());
    assert!(haven.basis.is_none());
    let totals = haven.totals.as_ref().unwrap();
    assert_eq!(totals.neighborhood_name().as_deref(), Some("Haven"));
    assert_eq!(totals.dwellings(), Some(300.0));

    let codes = ["BU00010001", "BU00010002"];
    assert_eq!(average(&dataset, &codes, "H01_Vraag_totaal", "Referentie_2023"), Some(100.5));
    assert_eq!(contributing(&dataset, &codes, "H01_Vraag_totaal", "Referentie_2023"), 1);
}

#[test]
fn scenario_columns_come_from_first_matrix_row() {
    let (dataset, _) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    assert_eq!(
        dataset.scenario_columns,
        vec!["Referentie_2023", "Strategie_1", "Strategie_2", "Variant_s2d_D_Restwarmte"]
    );
    let centrum = dataset.get("BU00010001").unwrap();
    assert_eq!(centrum.scenario_columns, dataset.scenario_columns);
    assert!(centrum.basis.is_some());
    assert_eq!(centrum.matrix.len(), 6);
    assert_eq!(
        centrum.matrix.cell("V01_Strategievariant", "Strategie_2"),
        Some(&CellValue::Text("s2d".into()))
    );
}

#[test]
fn absent_cells_are_distinguishable_from_zero() {
    let (dataset, _) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    let centrum = dataset.get("BU00010001").unwrap();
    for indicator in centrum.matrix.indicators() {
        for column in &centrum.scenario_columns {
            assert!(centrum.matrix.cell(indicator, column).is_some());
        }
    }
    assert_eq!(centrum.matrix.cell("H17_Nat_meerkost_CO2", "Referentie_2023"), Some(&CellValue::Null));
    assert_eq!(centrum.matrix.number("H17_Nat_meerkost_CO2", "Referentie_2023"), None);
    assert_eq!(centrum.matrix.number("A02_Aansl_eWP", "Referentie_2023"), Some(0.0));
}

#[test]
fn average_and_sum_on_empty_selection() {
    let (dataset, _) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    let none: [&str; 0] = [];
    assert_eq!(average(&dataset, &none, "H01_Vraag_totaal", "Strategie_1"), None);
    assert_eq!(sum(&dataset, &none, "H01_Vraag_totaal", "Strategie_1"), 0.0);
    let unknown = ["BU404"];
    assert_eq!(average(&dataset, &unknown, "H01_Vraag_totaal", "Strategie_1"), None);
    assert_eq!(average(&dataset, &["BU00010001"], "H01_Vraag_totaal", "Onbekend"), None);
}

#[test]
fn denominator_skips_neighborhoods_without_value() {
    let strategy = "\
I01_buurtcode;Code_Indicator;Strategie_1
BU01;H01_Vraag_totaal;10
BU02;H02_Vraag_RV;99
BU03;H01_Vraag_totaal;30
";
    let totals = "I01_buurtcode\nBU01\nBU02\nBU03\n";
    let bytes = build_zip(&[
        ("a_totaalbebouwing.csv", totals),
        ("a_strategie.csv", strategy),
        ("a_bebouwing.csv", "I01_buurtcode\n"),
    ]);
    let (dataset, _) = load_archive(&bytes, "denominator.zip", &IngestConfig::default()).unwrap();
    let codes = ["BU01", "BU02", "BU03"];
    assert_eq!(average(&dataset, &codes, "H01_Vraag_totaal", "Strategie_1"), Some(20.0));
    assert_eq!(sum(&dataset, &codes, "H01_Vraag_totaal", "Strategie_1"), 40.0);
}

#[test]
fn ingestion_is_deterministic() {
    let bytes = sample_archive();
    let cfg = IngestConfig::default();
    let (a, _) = load_archive(&bytes, "GM0001.zip", &cfg).unwrap();
    let (b, _) = load_archive(&bytes, "GM0001.zip", &cfg).unwrap();
    assert_eq!(a.neighborhoods, b.neighborhoods);
    assert_eq!(a.scenario_columns, b.scenario_columns);
    assert_eq!(a.metadata.neighborhood_count, b.metadata.neighborhood_count);
}

#[test]
fn co2_reduction_against_baseline() {
    let (dataset, _) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    let codes = ["BU00010001", "BU00010002"];
    let baseline = indicator_averages(&dataset, &codes, "Referentie_2023");
    let s1 = indicator_averages(&dataset, &codes, "Strategie_1");
    assert_eq!(baseline.neighborhood_count, 1);
    assert!(close(co2_reduction_percent(&s1, &baseline), 50.0));

    // Strategie_1 emits more than Strategie_2.
    let s2 = indicator_averages(&dataset, &codes, "Strategie_2");
    assert!(co2_reduction_percent(&s1, &s2) < 0.0);
}

#[test]
fn orphan_detail_rows_are_dropped() {
    let (dataset, report) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    assert!(dataset.get("BU99999999").is_none());
    assert_eq!(report.build.orphan_detail_rows, 1);
    assert_eq!(dataset.get("BU00010001").unwrap().detail.len(), 1);
    assert_eq!(
        dataset.get("BU00010002").unwrap().detail[0].text("Type").as_deref(),
        Some("Appartement")
    );
}

#[test]
fn missing_member_is_fatal() {
    let bytes = build_zip(&[("x_totaalbebouwing.csv", TOTALS), ("x_bebouwing.csv", DETAIL)]);
    match load_archive(&bytes, "onvolledig.zip", &IngestConfig::default()) {
        Err(PblError::MissingFiles { archive, missing }) => {
            assert_eq!(archive, "onvolledig.zip");
            assert_eq!(missing, vec![FileRole::Strategy]);
        }
        other => panic!("expected MissingFiles, got {:?}", other.map(|(d, _)| d.metadata)),
    }
}

#[test]
fn empty_tables_are_fatal() {
    let bytes = build_zip(&[
        ("x_totaalbebouwing.csv", ""),
        ("x_strategie.csv", "I01_buurtcode;Code_Indicator\n"),
        ("x_bebouwing.csv", "\n"),
    ]);
    let err = load_archive(&bytes, "leeg.zip", &IngestConfig::default()).unwrap_err();
    assert!(matches!(err, PblError::NoUsableData { .. }));
    assert!(err.is_fatal_ingestion());
}

#[test]
fn strategy_overview_reads_variant_codes() {
    let (dataset, _) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    let codes = ["BU00010001", "BU00010002"];
    let summaries = strategy_summaries(&dataset, &codes, &IngestConfig::default());
    assert_eq!(summaries.len(), 4);

    let s1 = &summaries[0];
    assert_eq!(s1.code, StrategyCode::S1);
    assert_eq!(s1.variant.letter, 'b');
    assert_eq!(s1.co2_emission, 100.0);
    assert_eq!(s1.co2_reduction, 100.0);
    assert_eq!(s1.cost_per_ton_co2, Some(250.0));
    assert_eq!(s1.connections.electric_heat_pump, 480.0);

    let s2 = &summaries[1];
    assert_eq!(s2.variant.tier, InsulationTier::BPlus);
    assert_eq!(s2.variant.to_string(), "s2d");

    // No column for S3 in this archive: defaults and empty aggregates.
    let s3 = &summaries[2];
    assert_eq!(s3.variant.to_string(), "s3a");
    assert_eq!(s3.avg_demand, None);
    assert_eq!(s3.co2_emission, 0.0);
}

#[test]
fn scenario_comparison_is_display_sorted() {
    let (dataset, _) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    let codes: Vec<&str> = dataset.codes().collect();
    let rows = generate_scenario_comparison(&dataset, &codes, &IngestConfig::default());
    let columns: Vec<&str> = rows.iter().map(|r| r.column.as_str()).collect();
    assert_eq!(
        columns,
        vec!["Referentie_2023", "Strategie_1", "Strategie_2", "Variant_s2d_D_Restwarmte"]
    );
    assert_eq!(rows[0].co2_reduction_pct, "0,0");
    assert_eq!(rows[1].co2_reduction_pct, "50,0");
    assert_eq!(rows[1].code, "S1");
    assert_eq!(rows[3].label, "S2d: MT Restwarmte D+");
}

#[test]
fn baseline_profile_and_building_stock() {
    let (dataset, _) = load_archive(&sample_archive(), "GM0001.zip", &IngestConfig::default()).unwrap();
    let codes = ["BU00010001", "BU00010002"];
    let profile = baseline_energy_profile(&dataset, &codes, &IngestConfig::default());
    assert_eq!(profile.demand_total, Some(100.5));
    assert_eq!(profile.space_heating, None);
    assert_eq!(profile.connections.natural_gas, 500.0);

    assert_eq!(totals_column_sum(&dataset, &codes, "Kantoor"), 4.0);
    assert_eq!(totals_column_sum(&dataset, &codes, "Winkel"), 9.0);
    assert_eq!(totals_column_sum(&dataset, &codes, "Horeca"), 0.0);
}

#[test]
fn comma_delimited_archives_with_quoted_decimals() {
    let totals = "I01_buurtcode,I09_aantal_woningen\nBU01,\"1.234,5\"\n";
    let strategy = "I01_buurtcode,Code_Indicator,Strategie_1\nBU01,H01_Vraag_totaal,\"12,5\"\n";
    let bytes = build_zip(&[
        ("totaalbebouwing.csv", totals),
        ("strategie.csv", strategy),
        ("bebouwing.csv", "I01_buurtcode\nBU01\n"),
    ]);
    let (dataset, _) = load_archive(&bytes, "komma.zip", &IngestConfig::default()).unwrap();
    let bu = dataset.get("BU01").unwrap();
    assert_eq!(bu.totals.as_ref().unwrap().dwellings(), Some(1234.5));
    assert_eq!(bu.matrix.number("H01_Vraag_totaal", "Strategie_1"), Some(12.5));
}
