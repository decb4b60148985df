use crate::infra::{parse_combination_mode, InMemoryCaseRepository};
use case_triage::cases::{
    CaseDetail, CaseFilter, CaseRecord, CaseStatus, CaseTriageService, DocumentType, NewCase,
};
use case_triage::catalog::{CategoryId, IndicatorCatalog};
use case_triage::config::{AppConfig, CombinationMode, ScoringConfig};
use case_triage::detect::{CaseDocument, Detection, TranscriptAnalyzer};
use case_triage::error::AppError;
use case_triage::import::{ScoringWorksheet, WorksheetResult};
use case_triage::mock::MockCaseGenerator;
use case_triage::scoring::{ScoreBreakdown, ScoreExplanation, Severity};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct SeedArgs {
    /// Number of synthetic cases to generate (defaults to TRIAGE_SEED_CASES)
    #[arg(long)]
    pub(crate) count: Option<usize>,
    /// Seed for reproducible generation (defaults to TRIAGE_RNG_SEED)
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Maximum number of queue rows to print (defaults to TRIAGE_LIST_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Only show cases in this status
    #[arg(long)]
    pub(crate) status: Option<CaseStatus>,
    /// Only show cases from this county
    #[arg(long)]
    pub(crate) county: Option<String>,
    /// Hide cases scored below this priority
    #[arg(long)]
    pub(crate) min_priority: Option<f64>,
    /// Override the configured combination mode (count or named)
    #[arg(long, value_parser = parse_combination_mode)]
    pub(crate) combination_mode: Option<CombinationMode>,
    /// Emit JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Worksheet CSV with case_number,indicator_id,severity,weight,category_weight,confidence
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Override the configured combination mode (count or named)
    #[arg(long, value_parser = parse_combination_mode)]
    pub(crate) combination_mode: Option<CombinationMode>,
    /// Emit JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct IndicatorArgs {
    /// Only list indicators of this severity
    #[arg(long)]
    pub(crate) severity: Option<Severity>,
    /// Only list indicators in this category
    #[arg(long)]
    pub(crate) category_id: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Document to scan; repeat for every file in the case record
    #[arg(long = "document", required = true)]
    pub(crate) documents: Vec<PathBuf>,
    /// Document type applied to every scanned file
    #[arg(long, default_value = "transcript")]
    pub(crate) document_type: DocumentType,
    /// Case number to flag the analyzed case under
    #[arg(long)]
    pub(crate) case_number: String,
    #[arg(long, default_value = "Unknown")]
    pub(crate) defendant: String,
    #[arg(long, default_value = "Unknown")]
    pub(crate) county: String,
    #[arg(long, default_value = "Unspecified")]
    pub(crate) crime: String,
    /// Override the configured combination mode (count or named)
    #[arg(long, value_parser = parse_combination_mode)]
    pub(crate) combination_mode: Option<CombinationMode>,
    /// Emit JSON instead of a text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Serialize)]
struct AnalysisReport {
    documents: usize,
    detections: Vec<Detection>,
    case: TopCase,
}

#[derive(Serialize)]
struct SeedReport {
    generated: usize,
    combination_mode: &'static str,
    queue: Vec<CaseRecord>,
    top_case: Option<TopCase>,
}

#[derive(Serialize)]
struct TopCase {
    detail: CaseDetail,
    breakdown: ScoreBreakdown,
    explanation: ScoreExplanation,
}

pub(crate) fn run_seed(args: SeedArgs, config: &AppConfig) -> Result<(), AppError> {
    let SeedArgs {
        count,
        seed,
        limit,
        status,
        county,
        min_priority,
        combination_mode,
        json,
    } = args;

    let scoring = scoring_config(config, combination_mode);
    let service = CaseTriageService::from_config(
        Arc::new(InMemoryCaseRepository::default()),
        Arc::new(IndicatorCatalog::standard()),
        &scoring,
    );

    let mut generator = MockCaseGenerator::new(seed.or(config.seed.rng_seed));
    let generated = generator
        .populate(&service, count.unwrap_or(config.seed.case_count))?
        .len();

    let filter = CaseFilter {
        status,
        county,
        min_priority,
        limit: limit.unwrap_or(config.listing.default_limit),
        offset: 0,
    };
    let queue = service.list(&filter)?;
    info!(generated, listed = queue.len(), "review queue built");

    let top_case = match queue.first() {
        Some(record) => Some(TopCase {
            detail: service.detail(record.id)?,
            breakdown: service.breakdown(record.id)?,
            explanation: service.explain(record.id)?,
        }),
        None => None,
    };

    let report = SeedReport {
        generated,
        combination_mode: service.scorer().strategy().label(),
        queue,
        top_case,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    render_seed_report(&report);
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs, config: &AppConfig) -> Result<(), AppError> {
    let worksheet = ScoringWorksheet::from_path(&args.csv)?;
    let catalog = IndicatorCatalog::standard();
    let scorer = scoring_config(config, args.combination_mode).scorer(&catalog);
    let results = worksheet.score(&scorer);
    info!(
        cases = results.len(),
        path = %args.csv.display(),
        "worksheet scored"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!(
        "Worksheet {} ({} cases, combination mode: {})",
        args.csv.display(),
        results.len(),
        scorer.strategy().label()
    );
    for result in &results {
        render_worksheet_result(result);
    }
    Ok(())
}

pub(crate) fn run_analyze(args: AnalyzeArgs, config: &AppConfig) -> Result<(), AppError> {
    let AnalyzeArgs {
        documents,
        document_type,
        case_number,
        defendant,
        county,
        crime,
        combination_mode,
        json,
    } = args;

    let documents = documents
        .iter()
        .map(|path| {
            std::fs::read_to_string(path)
                .map(|content| CaseDocument::new(document_type, content))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let service = CaseTriageService::from_config(
        Arc::new(InMemoryCaseRepository::default()),
        Arc::new(IndicatorCatalog::standard()),
        &scoring_config(config, combination_mode),
    );
    let analyzer = TranscriptAnalyzer::new(service.catalog())?;
    let detections = analyzer.analyze_case(&documents);

    let record = service.flag(NewCase {
        case_number,
        defendant_name: defendant,
        conviction_date: None,
        sentence: None,
        crime_charged: crime,
        county,
        court_name: None,
        demographics: None,
    })?;
    service.attach_detections(record.id, &detections)?;

    let report = AnalysisReport {
        documents: documents.len(),
        detections,
        case: TopCase {
            detail: service.detail(record.id)?,
            breakdown: service.breakdown(record.id)?,
            explanation: service.explain(record.id)?,
        },
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    render_analysis_report(&report);
    Ok(())
}

pub(crate) fn run_indicators(args: IndicatorArgs) -> Result<(), AppError> {
    let catalog = IndicatorCatalog::standard();
    let mut views = match args.category_id {
        Some(id) => catalog.by_category(CategoryId(id)),
        None => catalog.all(),
    };
    if let Some(severity) = args.severity {
        views.retain(|view| view.definition.severity == severity);
    }

    println!("Innocence indicators ({} listed)", views.len());
    for view in &views {
        println!(
            "- [{}] {} | {} | weight {:.2} | {}",
            view.definition.id,
            view.definition.name,
            view.definition.severity,
            view.definition.weight,
            view.category_name
        );
        println!("    {}", view.definition.description);
    }
    Ok(())
}

pub(crate) fn run_categories() -> Result<(), AppError> {
    let catalog = IndicatorCatalog::standard();

    println!("Indicator categories");
    for category in catalog.categories() {
        let members = catalog.by_category(category.id).len();
        println!(
            "- {} (weight {:.1}, {} indicators)",
            category.name, category.weight, members
        );
        println!("    {}", category.description);
    }
    Ok(())
}

fn scoring_config(config: &AppConfig, mode: Option<CombinationMode>) -> ScoringConfig {
    match mode {
        Some(combination_mode) => ScoringConfig { combination_mode },
        None => config.scoring.clone(),
    }
}

fn render_seed_report(report: &SeedReport) {
    println!(
        "Case triage queue ({} cases generated, combination mode: {})",
        report.generated, report.combination_mode
    );
    if report.queue.is_empty() {
        println!("  No cases match the filter.");
        return;
    }

    for (index, record) in report.queue.iter().enumerate() {
        println!("{}", queue_row(index + 1, record));
    }

    if let Some(top) = &report.top_case {
        println!(
            "\nTop case {} ({})",
            top.detail.record.case_number, top.detail.record.defendant_name
        );
        println!(
            "  {} | score {:.2}",
            top.explanation.level, top.explanation.score
        );
        println!("  {}", top.explanation.recommendation);
        println!("{}", breakdown_line(&top.breakdown));
        println!("  Indicators:");
        for indicator in &top.detail.indicators {
            println!(
                "    - {} ({}, {}) confidence {:.0}% | {} citations",
                indicator.name,
                indicator.severity,
                indicator.category,
                indicator.confidence_score * 100.0,
                indicator.citations.len()
            );
        }
    }
}

fn render_analysis_report(report: &AnalysisReport) {
    let case = &report.case;
    println!(
        "Document analysis for {} ({} documents, {} indicators detected)",
        case.detail.record.case_number,
        report.documents,
        report.detections.len()
    );
    for detection in &report.detections {
        println!(
            "- {} [{}] confidence {:.0}% | {} excerpts",
            detection.indicator,
            detection.family.label(),
            detection.confidence * 100.0,
            detection.excerpts.len()
        );
        for excerpt in &detection.excerpts {
            println!(
                "    {} p.{} l.{}: \"{}\"",
                excerpt.document_type.label(),
                excerpt.page_number,
                excerpt.line_number,
                excerpt.quoted_text
            );
        }
    }

    println!(
        "\n  {} | score {:.2}",
        case.explanation.level, case.explanation.score
    );
    println!("  {}", case.explanation.recommendation);
    println!("{}", breakdown_line(&case.breakdown));
}

fn render_worksheet_result(result: &WorksheetResult) {
    println!(
        "\n{} -> {:.2} ({})",
        result.case_number, result.explanation.score, result.explanation.level
    );
    println!("  {}", result.explanation.recommendation);
    println!(
        "  {} indicators: {} critical / {} high / {} medium / {} low",
        result.explanation.breakdown.indicator_count,
        result.explanation.breakdown.critical_count,
        result.explanation.breakdown.high_count,
        result.explanation.breakdown.medium_count,
        result.explanation.breakdown.low_count
    );
    println!("{}", breakdown_line(&result.breakdown));
}

fn queue_row(rank: usize, record: &CaseRecord) -> String {
    let score = record
        .priority_score
        .map(|score| format!("{score:>6.2}"))
        .unwrap_or_else(|| "     -".to_string());
    format!(
        "{rank:>3}. {score} | {} | {} | {} County | {}",
        record.case_number, record.status, record.county, record.crime_charged
    )
}

fn breakdown_line(breakdown: &ScoreBreakdown) -> String {
    let combinations = if breakdown.combinations.is_empty() {
        "none".to_string()
    } else {
        breakdown
            .combinations
            .iter()
            .map(|combination| format!("{} x{:.1}", combination.label, combination.bonus))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "  base {:.2} x count {:.1} x combination {:.1} x critical {:.1} = {:.2} (combinations: {})",
        breakdown.base_score,
        breakdown.count_multiplier,
        breakdown.combination_bonus,
        breakdown.critical_bonus,
        breakdown.raw_score,
        combinations
    )
}
