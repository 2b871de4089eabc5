use crate::aggregate::{
    average, co2_reduction_percent_for, indicator_averages, sum, totals_column_sum, totals_sum, with_matrix,
    COST_PER_TON_CO2_INDICATOR,
};
use crate::catalog::{describe, sort_for_display, StrategyCode, VariantCode};
use crate::config::IngestConfig;
use crate::types::{
    BuildingStockRow, ParsedDataset, ScenarioComparisonRow, StrategyOverviewRow, SummaryStats, TotalsRecord,
};
use crate::util::{format_euro, format_number, format_optional};
use serde::Serialize;

const VARIANT_INDICATOR: &str = "V01_Strategievariant";
const DEMAND_INDICATOR: &str = "H01_Vraag_totaal";
const EXTRA_COST_INDICATOR: &str = "H16_Nat_meerkost";

const CONSTRUCTION_PERIOD_COLUMNS: [&str; 9] = [
    "Voor_1920_m2_bvo",
    "1920_1945_m2_bvo",
    "1946_1964_m2_bvo",
    "1965_1974_m2_bvo",
    "1975_1991_m2_bvo",
    "1992_2005_m2_bvo",
    "2006_2014_m2_bvo",
    "2015_2022_m2_bvo",
    "Onbekend_bouwjaar_m2_bvo",
];

const BUILDING_TYPE_COLUMNS: [&str; 11] = [
    "Kantoor",
    "Winkel",
    "Horeca",
    "Bijeenkomst",
    "Cel",
    "Gezondheidszorg",
    "Industrie",
    "Logies",
    "Onderwijs",
    "Sport",
    "Overige_gebruiksfuncties",
];

const ENERGY_LABEL_COLUMNS: [&str; 8] = [
    "Label_A", "Label_B", "Label_C", "Label_D", "Label_E", "Label_F", "Label_G", "Geen_label",
];

/// Summed connection counts per heating technique.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Connections {
    pub natural_gas: f64,
    pub electric_heat_pump: f64,
    pub medium_temp_network: f64,
    pub low_temp_network: f64,
    pub hybrid_heat_pump: f64,
    pub green_gas_boiler: f64,
}

impl Connections {
    fn collect<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S], column: &str) -> Connections {
        Connections {
            natural_gas: sum(dataset, codes, "A01_Aansl_aardgas", column),
            electric_heat_pump: sum(dataset, codes, "A02_Aansl_eWP", column),
            medium_temp_network: sum(dataset, codes, "A03_Aansl_MT", column),
            low_temp_network: sum(dataset, codes, "A04_Aansl_LT", column),
            hybrid_heat_pump: sum(dataset, codes, "A05_Aansl_hWP_HG", column),
            green_gas_boiler: sum(dataset, codes, "A06_Aansl_HR_HG", column),
        }
    }

    /// Gas, all-electric and both heat-network connections.
    pub fn total(&self) -> f64 {
        self.natural_gas + self.electric_heat_pump + self.medium_temp_network + self.low_temp_network
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySummary {
    pub code: StrategyCode,
    pub column: String,
    pub variant: VariantCode,
    pub cost_per_ton_co2: Option<f64>,
    pub total_extra_cost: f64,
    pub co2_emission: f64,
    pub co2_reduction: f64,
    pub avg_demand: Option<f64>,
    pub connections: Connections,
}

/// One summary per canonical strategy for the selected neighborhoods.
///
/// Neighborhoods without a strategy matrix are left out; with none left the
/// result is empty.
pub fn strategy_summaries<S: AsRef<str>>(
    dataset: &ParsedDataset,
    codes: &[S],
    config: &IngestConfig,
) -> Vec<StrategySummary> {
    let selected = with_matrix(dataset, codes);
    let Some(first) = selected.first().and_then(|code| dataset.get(code)) else {
        return Vec::new();
    };
    let baseline_co2 = sum(dataset, &selected, &config.co2_indicator, &config.baseline_column);

    StrategyCode::ALL
        .into_iter()
        .map(|code| {
            let column = code.column();
            let variant = first
                .matrix
                .cell(VARIANT_INDICATOR, column)
                .and_then(|v| v.as_key())
                .and_then(|raw| VariantCode::parse(&raw))
                .unwrap_or_else(|| VariantCode::default_for(code));
            let co2_emission = sum(dataset, &selected, &config.co2_indicator, column);
            StrategySummary {
                code,
                column: column.to_string(),
                variant,
                cost_per_ton_co2: average(dataset, &selected, COST_PER_TON_CO2_INDICATOR, column),
                total_extra_cost: sum(dataset, &selected, EXTRA_COST_INDICATOR, column),
                co2_emission,
                co2_reduction: baseline_co2 - co2_emission,
                avg_demand: average(dataset, &selected, DEMAND_INDICATOR, column),
                connections: Connections::collect(dataset, &selected, column),
            }
        })
        .collect()
}

pub fn generate_strategy_overview<S: AsRef<str>>(
    dataset: &ParsedDataset,
    codes: &[S],
    config: &IngestConfig,
) -> Vec<StrategyOverviewRow> {
    strategy_summaries(dataset, codes, config)
        .into_iter()
        .map(|s| StrategyOverviewRow {
            strategy: s.code.to_string(),
            name: s.code.name().to_string(),
            variant_code: s.variant.to_string(),
            envelope: s.variant.tier.to_string(),
            cost_per_ton_co2: format_optional(s.cost_per_ton_co2, 0),
            total_extra_cost: format_euro(Some(s.total_extra_cost), true),
            co2_emission: format_number(s.co2_emission, 1),
            co2_reduction: format_number(s.co2_reduction, 1),
            avg_demand: format_optional(s.avg_demand, 1),
            connections: format_number(s.connections.total(), 0),
        })
        .collect()
}

/// Every available scenario column in display order, compared against the
/// configured baseline column.
pub fn generate_scenario_comparison<S: AsRef<str>>(
    dataset: &ParsedDataset,
    codes: &[S],
    config: &IngestConfig,
) -> Vec<ScenarioComparisonRow> {
    let baseline = indicator_averages(dataset, codes, &config.baseline_column);
    sort_for_display(&dataset.scenario_columns)
        .into_iter()
        .map(|column| {
            let descriptor = describe(&column);
            let scenario = indicator_averages(dataset, codes, &column);
            let reduction = if scenario.neighborhood_count == 0 {
                None
            } else {
                Some(co2_reduction_percent_for(&scenario, &baseline, &config.co2_indicator))
            };
            ScenarioComparisonRow {
                label: descriptor.label,
                code: descriptor.code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
                avg_demand: format_optional(scenario.average(DEMAND_INDICATOR), 1),
                co2_emission: format_number(sum(dataset, codes, &config.co2_indicator, &column), 1),
                co2_reduction_pct: format_optional(reduction, 1),
                column,
            }
        })
        .collect()
}

/// Baseline demand averages and connection sums for a selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyProfile {
    pub column: String,
    pub demand_total: Option<f64>,
    pub space_heating: Option<f64>,
    pub hot_water: Option<f64>,
    pub ventilation: Option<f64>,
    pub cooling: Option<f64>,
    pub appliances: Option<f64>,
    pub demand_per_hectare: Option<f64>,
    pub connections: Connections,
}

pub fn baseline_energy_profile<S: AsRef<str>>(
    dataset: &ParsedDataset,
    codes: &[S],
    config: &IngestConfig,
) -> EnergyProfile {
    let column = config.baseline_column.as_str();
    let avg = |indicator: &str| average(dataset, codes, indicator, column);
    EnergyProfile {
        column: column.to_string(),
        demand_total: avg(DEMAND_INDICATOR),
        space_heating: avg("H02_Vraag_RV"),
        hot_water: avg("H03_Vraag_TW"),
        ventilation: avg("H04_Vraag_Vent"),
        cooling: avg("H05_Vraag_K"),
        appliances: avg("H06_Vraag_App"),
        demand_per_hectare: avg("H07_vraag_tot_ha"),
        connections: Connections::collect(dataset, codes, column),
    }
}

/// Non-residential building stock from the totals table, per group.
pub fn generate_building_stock<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S]) -> Vec<BuildingStockRow> {
    let groups: [(&str, &[&str]); 3] = [
        ("Bouwperiode (m2 bvo)", &CONSTRUCTION_PERIOD_COLUMNS),
        ("Gebruiksfunctie", &BUILDING_TYPE_COLUMNS),
        ("Energielabel", &ENERGY_LABEL_COLUMNS),
    ];
    groups
        .iter()
        .flat_map(|(group, columns)| {
            columns.iter().map(move |column| BuildingStockRow {
                group: group.to_string(),
                column: column.to_string(),
                total: format_number(totals_column_sum(dataset, codes, column), 0),
            })
        })
        .collect()
}

pub fn generate_summary<S: AsRef<str>>(dataset: &ParsedDataset, codes: &[S]) -> SummaryStats {
    let co2_values: Vec<f64> = codes
        .iter()
        .filter_map(|code| dataset.get(code.as_ref())?.totals.as_ref()?.baseline_co2())
        .collect();
    SummaryStats {
        source: dataset.metadata.source.clone(),
        total_neighborhoods: dataset.neighborhoods.len(),
        neighborhoods_with_matrix: with_matrix(dataset, codes).len(),
        scenario_columns: dataset.scenario_columns.len(),
        total_dwellings: totals_sum(dataset, codes, TotalsRecord::dwellings),
        baseline_co2: if co2_values.is_empty() {
            None
        } else {
            Some(co2_values.iter().sum())
        },
        parsed_at: dataset.metadata.parsed_at,
    }
}
