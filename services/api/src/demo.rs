use crate::infra::{build_routing_service, classifier_config, department_source};
use clap::Args;
use pantau::config::AppConfig;
use pantau::error::AppError;
use pantau::workflows::routing::{
    CatalogCache, ClassificationEngine, ClassificationOutcome, ClassificationResult, ReportInput,
    ReportSubmission,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// Report title
    #[arg(long)]
    pub(crate) title: String,
    /// Report description
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    /// Category chosen by the reporter
    #[arg(long, default_value = "")]
    pub(crate) category: String,
    /// Urgency as entered on the form ("tinggi" raises scores)
    #[arg(long)]
    pub(crate) urgency: Option<String>,
    /// Free-text location
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Department CSV export (defaults to APP_CATALOG_PATH or the bundled catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Print the classification result as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Department CSV export (defaults to APP_CATALOG_PATH or the bundled catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Print the full reasoning trace for every report
    #[arg(long)]
    pub(crate) verbose: bool,
}

pub(crate) async fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let ClassifyArgs {
        title,
        description,
        category,
        urgency,
        location,
        catalog,
        json,
    } = args;

    let config = AppConfig::load()?;
    let catalog_path = catalog.or(config.catalog.source_path);
    let source = department_source(catalog_path.as_deref())?;
    let cache = CatalogCache::new(source, config.catalog.cache_ttl);
    let departments = cache.try_departments().await?;
    let engine =
        ClassificationEngine::new(classifier_config(&config.routing, catalog_path.is_none()));

    let input = ReportInput::from(ReportSubmission {
        title,
        description,
        category,
        urgency,
        location,
    });
    let result = engine.classify(&input, &departments);

    if json {
        let rendered = serde_json::to_string_pretty(&result).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Catalog: {} departments", departments.len());
    render_classification(&result, true);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { catalog, verbose } = args;

    let mut config = AppConfig::load()?;
    if catalog.is_some() {
        config.catalog.source_path = catalog;
    }

    let (service, notifier) = build_routing_service(&config.catalog, &config.routing)?;
    println!("Pantau.in routing demo");
    println!(
        "Catalog: {} departments (refreshed every {}s)",
        service.departments().await.len(),
        config.catalog.cache_ttl.as_secs()
    );

    for input in sample_reports() {
        println!("\nReport: {}", input.title);
        let record = service.submit(input).await?;
        let view = record.status_view();
        println!("- {} -> {} ({})", view.report_id, view.status, view.routing_summary);
        render_classification(&record.classification, verbose);
    }

    let queue = service.review_queue()?;
    println!("\nReview queue: {} report(s)", queue.len());
    for record in &queue {
        println!("- {} | {}", record.report_id, record.input.title);
    }

    let notices = notifier.notices();
    println!("Notices queued: {}", notices.len());
    for notice in &notices {
        let target = notice
            .department_id
            .as_ref()
            .map(|id| id.as_str())
            .unwrap_or("review desk");
        println!("- {} -> {} [{}]", notice.report_id, target, notice.template);
    }

    Ok(())
}

fn render_classification(result: &ClassificationResult, with_reasoning: bool) {
    match &result.outcome {
        ClassificationOutcome::Accepted { primary } => {
            println!("  Primary: {} ({}%)", primary.name, primary.confidence);
        }
        ClassificationOutcome::Rejected { candidate } => {
            println!(
                "  Needs review: best candidate {} at {}%",
                candidate.name, candidate.confidence
            );
        }
        ClassificationOutcome::NoMatch => println!("  No department matched"),
    }

    for related in &result.related_departments {
        println!("  Related: {} ({}%)", related.name, related.confidence);
    }

    if !result.matched_keywords.is_empty() {
        println!("  Keywords: {}", result.matched_keywords.join(", "));
    }

    if with_reasoning {
        println!("  Reasoning:");
        for line in &result.reasoning {
            println!("    - {line}");
        }
    }
}

fn sample_reports() -> Vec<ReportInput> {
    vec![
        ReportInput::from(ReportSubmission {
            title: "Jalan amblas dekat sekolah".to_string(),
            description: "Aspal retak dan lubang makin besar setelah hujan".to_string(),
            category: "infrastruktur".to_string(),
            urgency: Some("tinggi".to_string()),
            location: Some("Jl. Raya Bogor km 21".to_string()),
        }),
        ReportInput::from(ReportSubmission {
            title: "Pohon tumbang".to_string(),
            description: "Pohon besar roboh melintang, kemacetan sampai perempatan".to_string(),
            category: "lainnya".to_string(),
            urgency: None,
            location: Some("Jl. Diponegoro".to_string()),
        }),
        ReportInput::from(ReportSubmission {
            title: "Banjir bandang".to_string(),
            description: "Tanggul jebol, air masuk rumah warga dan saluran meluap".to_string(),
            category: "bencana".to_string(),
            urgency: Some("tinggi".to_string()),
            location: None,
        }),
        ReportInput::from(ReportSubmission {
            title: "Ada bau menyengat".to_string(),
            description: "Sejak kemarin".to_string(),
            category: "lainnya".to_string(),
            urgency: None,
            location: None,
        }),
        ReportInput::new("Pertanyaan layanan", "Bagaimana cara daftar akun?", "umum"),
    ]
}
