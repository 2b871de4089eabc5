//! Display metadata for scenario columns.
//!
//! Everything here is a pure function of the column name: a lookup table
//! first, naming-pattern rules second.
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

pub const REFERENCE_2023: &str = "Referentie_2023";
pub const REFERENCE_2030: &str = "Referentie_2030";
pub const LOWEST_COST: &str = "Laagste_Nationale_Kosten";
pub const LOWEST_COST_FILE: &str = "LN_0BCM_combined.csv";

/// The four canonical strategy columns, in strategy order.
pub const CANONICAL_STRATEGIES: [&str; 4] = ["Strategie_1", "Strategie_2", "Strategie_3", "Strategie_4"];

const UNRANKED: u32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum StrategyCode {
    S1,
    S2,
    S3,
    S4,
}

impl StrategyCode {
    pub const ALL: [StrategyCode; 4] = [StrategyCode::S1, StrategyCode::S2, StrategyCode::S3, StrategyCode::S4];

    pub fn from_number(n: u32) -> Option<StrategyCode> {
        match n {
            1 => Some(StrategyCode::S1),
            2 => Some(StrategyCode::S2),
            3 => Some(StrategyCode::S3),
            4 => Some(StrategyCode::S4),
            _ => None,
        }
    }

    pub fn number(self) -> u32 {
        match self {
            StrategyCode::S1 => 1,
            StrategyCode::S2 => 2,
            StrategyCode::S3 => 3,
            StrategyCode::S4 => 4,
        }
    }

    /// Canonical scenario column, e.g. `Strategie_2`.
    pub fn column(self) -> &'static str {
        CANONICAL_STRATEGIES[(self.number() - 1) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyCode::S1 => "All-Electric",
            StrategyCode::S2 => "MT Warmtenet",
            StrategyCode::S3 => "LT Warmtenet",
            StrategyCode::S4 => "Klimaatneutraal Gas",
        }
    }
}

impl fmt::Display for StrategyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.number())
    }
}

/// Building envelope quality a variant insulates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InsulationTier {
    BPlus,
    DPlus,
}

impl InsulationTier {
    /// Column-name token marking a variant of this tier.
    fn marker(self) -> &'static str {
        match self {
            InsulationTier::BPlus => "_B_",
            InsulationTier::DPlus => "_D_",
        }
    }

    fn other(self) -> InsulationTier {
        match self {
            InsulationTier::BPlus => InsulationTier::DPlus,
            InsulationTier::DPlus => InsulationTier::BPlus,
        }
    }

    /// Variant letters `a`..`e` insulate to B+, later letters to D+.
    pub fn from_variant_letter(letter: char) -> InsulationTier {
        if ('a'..='e').contains(&letter.to_ascii_lowercase()) {
            InsulationTier::BPlus
        } else {
            InsulationTier::DPlus
        }
    }
}

impl fmt::Display for InsulationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsulationTier::BPlus => f.write_str("B+"),
            InsulationTier::DPlus => f.write_str("D+"),
        }
    }
}

/// Coarse bucket a scenario column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ScenarioGroup {
    Strategy(StrategyCode),
    Reference,
    LowestCost,
}

impl ScenarioGroup {
    pub fn of(column: &str) -> Option<ScenarioGroup> {
        if column.contains("Referentie") {
            Some(ScenarioGroup::Reference)
        } else if is_lowest_cost(column) {
            Some(ScenarioGroup::LowestCost)
        } else {
            classify(column).map(ScenarioGroup::Strategy)
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ScenarioGroup::Strategy(StrategyCode::S1) => "#3b82f6",
            ScenarioGroup::Strategy(StrategyCode::S2) => "#ef4444",
            ScenarioGroup::Strategy(StrategyCode::S3) => "#f59e0b",
            ScenarioGroup::Strategy(StrategyCode::S4) => "#10b981",
            ScenarioGroup::Reference => "#6b7280",
            ScenarioGroup::LowestCost => "#8b5cf6",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ScenarioGroup::Strategy(StrategyCode::S1) => "zap",
            ScenarioGroup::Strategy(StrategyCode::S2) => "heat-network",
            ScenarioGroup::Strategy(StrategyCode::S3) => "thermometer",
            ScenarioGroup::Strategy(StrategyCode::S4) => "flame",
            ScenarioGroup::Reference => "chart",
            ScenarioGroup::LowestCost => "coins",
        }
    }
}

pub const DEFAULT_COLOR: &str = "#83AF9A";
pub const DEFAULT_ICON: &str = "pin";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioDescriptor {
    pub column: String,
    pub code: Option<StrategyCode>,
    pub label: String,
    pub color: &'static str,
    pub icon: &'static str,
    pub sort_rank: u32,
}

pub fn describe(column: &str) -> ScenarioDescriptor {
    let group = ScenarioGroup::of(column);
    ScenarioDescriptor {
        column: column.to_string(),
        code: classify(column),
        label: label(column),
        color: group.map(ScenarioGroup::color).unwrap_or(DEFAULT_COLOR),
        icon: group.map(ScenarioGroup::icon).unwrap_or(DEFAULT_ICON),
        sort_rank: sort_rank(column),
    }
}

fn is_lowest_cost(column: &str) -> bool {
    column.contains("LN_0BCM") || column.contains(LOWEST_COST)
}

fn is_reference(column: &str) -> bool {
    column.contains("Referentie")
}

/// Numbered strategy a column belongs to; `None` for reference and
/// lowest-cost columns.
pub fn classify(column: &str) -> Option<StrategyCode> {
    if let Some(idx) = CANONICAL_STRATEGIES.iter().position(|c| *c == column) {
        return StrategyCode::from_number(idx as u32 + 1);
    }
    StrategyCode::ALL.into_iter().find(|code| {
        let n = code.number();
        column.starts_with(&format!("Strategie_{}", n)) || column.starts_with(&format!("Variant_s{}", n))
    })
}

fn table_label(column: &str) -> Option<&'static str> {
    let label = match column {
        REFERENCE_2023 => "Referentie 2023",
        REFERENCE_2030 => "Referentie 2030",
        LOWEST_COST | LOWEST_COST_FILE => "Laagste Nationale Kosten",
        "Strategie_1" => "S1: All-Electric (Lucht-WP B+)",
        "Strategie_2" => "S2: Warmtenet MT (Restwarmte B+)",
        "Strategie_3" => "S3: Warmtenet LT/ZLT (WKO B+)",
        "Strategie_4" => "S4: Klimaatneutraal Gas (Hybride B+)",
        "Variant_s1a_B_LuchtWP" => "S1a: Lucht-WP B+",
        "Variant_s1b_B_BodemWP" => "S1b: Bodem-WP B+",
        "Variant_s2a_B_Restwarmte" => "S2a: MT Restwarmte B+",
        "Variant_s2b_B_Geo_contour" => "S2b: MT Geo (contour) B+",
        "Variant_s2c_B_Geo_overal" => "S2c: MT Geo (overal) B+",
        "Variant_s2d_D_Restwarmte" => "S2d: MT Restwarmte D+",
        "Variant_s2e_D_Geo_contour" => "S2e: MT Geo (contour) D+",
        "Variant_s2f_D_Geo_overal" => "S2f: MT Geo (overal) D+",
        "Variant_s3a_B_LT30_30" => "S3a: LT 15-30°C ind. opw. B+",
        "Variant_s3b_B_WKO15_15" => "S3b: WKO 15°C ind. opw. B+",
        "Variant_s3c_B_WKO15_70" => "S3c: WKO 15°C coll. 70°C B+",
        "Variant_s3d_B_WKO15_50" => "S3d: WKO 15°C coll. 50°C B+",
        "Variant_s3e_B_TEO_15_15" => "S3e: WKO+TEO ind. opw. B+",
        "Variant_s3f_D_LT30_70" => "S3f: LT 30°C coll. 70°C D+",
        "Variant_s3g_D_WKO15_15" => "S3g: WKO 15°C ind. opw. D+",
        "Variant_s3h_D_WKO15_70" => "S3h: WKO+TEO coll. 70°C D+",
        "Variant_s4a_KG_B_hWP" => "S4a: Hybride WP B+",
        "Variant_s4b_KG_D_hWP" => "S4b: Hybride WP D+",
        _ => return None,
    };
    Some(label)
}

/// Human-readable label for a scenario column.
pub fn label(column: &str) -> String {
    if let Some(l) = table_label(column) {
        return l.to_string();
    }
    if column.contains("LN_0BCM") {
        return "Laagste Nationale Kosten".to_string();
    }
    if let Some(base) = column.strip_suffix("_BuurtWKO") {
        let base = base.strip_prefix("Supplementair_").unwrap_or(base);
        let inner = table_label(&format!("Variant_{}", base))
            .map(str::to_string)
            .unwrap_or_else(|| base.replace('_', " "));
        return format!("{} (Buurt-WKO)", inner);
    }
    column.replace('_', " ")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub insulation_tier: Option<InsulationTier>,
    /// `false` keeps only references, lowest cost and `Strategie_1..4`.
    pub include_variants: bool,
    pub strategy: Option<StrategyCode>,
    /// Case-insensitive substring such as `WKO` or `Geo`.
    pub source_kind: Option<String>,
}

impl FilterOptions {
    pub fn all() -> Self {
        FilterOptions {
            include_variants: true,
            ..Default::default()
        }
    }
}

pub fn filter(columns: &[String], opts: &FilterOptions) -> Vec<String> {
    columns
        .iter()
        .filter(|column| {
            if let Some(tier) = opts.insulation_tier {
                if column.contains(tier.other().marker()) {
                    return false;
                }
            }
            if !opts.include_variants
                && !(is_reference(column) || is_lowest_cost(column) || CANONICAL_STRATEGIES.contains(&column.as_str()))
            {
                return false;
            }
            if let Some(code) = opts.strategy {
                if classify(column) != Some(code) {
                    return false;
                }
            }
            if let Some(kind) = &opts.source_kind {
                if !column.to_lowercase().contains(&kind.to_lowercase()) {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

pub fn sort_rank(column: &str) -> u32 {
    match column {
        REFERENCE_2023 => 0,
        REFERENCE_2030 => 1,
        LOWEST_COST_FILE | LOWEST_COST => 2,
        "Strategie_1" => 3,
        "Strategie_2" => 4,
        "Strategie_3" => 5,
        "Strategie_4" => 6,
        _ => UNRANKED,
    }
}

/// References first, then lowest cost, then `Strategie_1..4`; everything
/// else after those in lexicographic order.
pub fn sort_for_display(columns: &[String]) -> Vec<String> {
    let mut sorted = columns.to_vec();
    sorted.sort_by(|a, b| match sort_rank(a).cmp(&sort_rank(b)) {
        Ordering::Equal => a.cmp(b),
        other => other,
    });
    sorted
}

pub fn group_by_strategy(columns: &[String]) -> BTreeMap<ScenarioGroup, Vec<String>> {
    let mut grouped: BTreeMap<ScenarioGroup, Vec<String>> = BTreeMap::new();
    for column in columns {
        if let Some(group) = ScenarioGroup::of(column) {
            grouped.entry(group).or_default().push(column.clone());
        }
    }
    grouped
}

/// Parsed `V01_Strategievariant` value such as `s2d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariantCode {
    pub strategy: StrategyCode,
    pub letter: char,
    pub tier: InsulationTier,
}

impl VariantCode {
    pub fn parse(raw: &str) -> Option<VariantCode> {
        let lower = raw.trim().to_lowercase();
        let mut chars = lower.strip_prefix('s')?.chars();
        let strategy = StrategyCode::from_number(chars.next()?.to_digit(10)?)?;
        let letter = chars.next().filter(char::is_ascii_lowercase).unwrap_or('a');
        Some(VariantCode {
            strategy,
            letter,
            tier: InsulationTier::from_variant_letter(letter),
        })
    }

    /// The default variant `s{n}a` of a strategy.
    pub fn default_for(strategy: StrategyCode) -> VariantCode {
        VariantCode {
            strategy,
            letter: 'a',
            tier: InsulationTier::BPlus,
        }
    }
}

impl fmt::Display for VariantCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}{}", self.strategy.number(), self.letter)
    }
}
