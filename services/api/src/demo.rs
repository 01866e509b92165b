use crate::infra::{parse_legal_form, InMemoryDossierRepository, InMemoryTimeline};
use crate::routes::{build_workflow_report, ReportDataSource, WorkflowReport};
use clap::Args;
use dossier_flow::config::DossierConfig;
use dossier_flow::error::AppError;
use dossier_flow::workflows::dossier::documents::{checklist_progress, DocumentType};
use dossier_flow::workflows::dossier::{
    rules, ChecklistTask, Dossier, DossierService, LegalForm, NewDossier, WorkflowStatus,
};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Legal form of the company (SASU, SAS, EURL, SARL, SCI, AUTRE)
    #[arg(long, value_parser = parse_legal_form)]
    pub(crate) form: LegalForm,
    /// Current workflow status tag (defaults to NOUVEAU)
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<WorkflowStatus>,
    /// Optional checklist export to hydrate task progress
    #[arg(long)]
    pub(crate) checklist_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Legal form of the sample company
    #[arg(long, value_parser = parse_legal_form, default_value = "SASU")]
    pub(crate) form: LegalForm,
    /// Name of the sample company
    #[arg(long, default_value = "Atelier Lumière")]
    pub(crate) company_name: String,
}

fn parse_status(raw: &str) -> Result<WorkflowStatus, String> {
    WorkflowStatus::parse(raw.trim()).ok_or_else(|| format!("unknown status '{raw}'"))
}

pub(crate) fn run_rules() {
    println!("Status rules");
    for rule in rules() {
        println!("\n{} ({})", rule.status.label(), rule.status);
        println!("  {}", rule.description);
        if rule.is_unconditional() {
            println!("  No task required");
        }
        for label in rule.required_labels() {
            println!("  - {label}");
        }
    }
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        form,
        status,
        checklist_csv,
    } = args;

    let export = checklist_csv.map(File::open).transpose()?;
    let report = build_workflow_report(form, status.unwrap_or(WorkflowStatus::New), export)?;
    render_report(&report);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { form, company_name } = args;

    println!("Company formation workflow demo");
    let service = DossierService::new(
        Arc::new(InMemoryDossierRepository::default()),
        Arc::new(InMemoryTimeline::default()),
        DossierConfig::default(),
    );

    let dossier = service.create(NewDossier {
        company_name,
        legal_form: form,
    })?;
    println!(
        "- Opened {} for {} ({})",
        dossier.reference, dossier.company_name, dossier.legal_form
    );

    match service.change_status(&dossier.id, WorkflowStatus::DraftStatutes) {
        Ok(change) => println!("  Unexpectedly moved to {}", change.to),
        Err(err) => println!("  Early move refused: {err}"),
    }

    for (task, target) in demo_script() {
        complete(&service, &dossier, task)?;
        if let Some(target) = target {
            let change = service.change_status(&dossier.id, target)?;
            println!("- {} -> {}", change.from.label(), change.to.label());
        }
    }

    let suggestion = service.suggestion(&dossier.id)?;
    println!(
        "\nCurrent status {} | suggested {}{}",
        suggestion.current,
        suggestion.suggested,
        if suggestion.differs { " (ahead)" } else { "" }
    );

    service.document_checklist(&dossier.id)?;
    service.link_document(&dossier.id, DocumentType::StatutsSignes, "ged-0001")?;
    let documents =
        service.link_document(&dossier.id, DocumentType::PieceIdentiteDirigeant, "ged-0002")?;
    let progress = checklist_progress(&documents);
    println!(
        "Documents: {}/{} collected ({}%), required {}/{}",
        progress.completed,
        progress.total,
        progress.percentage,
        progress.required.completed,
        progress.required.total
    );

    let overview = service.overview(&dossier.id)?;
    if !overview.missing_documents.is_empty() {
        println!("Missing required documents:");
        for label in &overview.missing_documents {
            println!("  - {label}");
        }
    }

    println!("\nTimeline");
    for entry in service.timeline(&dossier.id)? {
        println!("- {} {}", entry.at.format("%Y-%m-%d %H:%M"), entry.description);
    }

    match serde_json::to_string_pretty(&overview.stages) {
        Ok(json) => println!("\nStage payload:\n{json}"),
        Err(err) => println!("\nStage payload unavailable: {err}"),
    }

    Ok(())
}

/// Tasks completed in order, with the status moved to once each is done.
fn demo_script() -> Vec<(ChecklistTask, Option<WorkflowStatus>)> {
    use ChecklistTask::*;
    vec![
        (CompanyInformationCollected, None),
        (ManagerInformationCollected, Some(WorkflowStatus::QuoteSent)),
        (SignedQuoteReceived, Some(WorkflowStatus::DraftStatutes)),
        (DraftStatutesWritten, None),
        (DraftStatutesSent, Some(WorkflowStatus::AwaitingDeposit)),
        (CapitalDeposited, None),
        (DepositCertificateReceived, None),
    ]
}

fn complete(
    service: &DossierService<InMemoryDossierRepository, InMemoryTimeline>,
    dossier: &Dossier,
    task: ChecklistTask,
) -> Result<(), AppError> {
    let Some(item) = dossier.checklist.iter().find(|item| item.task() == Some(task)) else {
        println!("  {} is not on this checklist", task.label());
        return Ok(());
    };
    service.toggle_task(&dossier.id, &item.id, true)?;
    println!("  [x] {}", task.label());
    Ok(())
}

pub(crate) fn render_report(report: &WorkflowReport) {
    println!("Dossier workflow report ({})", report.legal_form);
    match report.data_source {
        ReportDataSource::Import => println!("Data source: checklist export"),
        ReportDataSource::Blank => println!("Data source: blank checklist (no export provided)"),
    }

    println!(
        "\nStatus {} | suggested {}",
        report.suggestion.current.label(),
        report.suggestion.suggested.label()
    );
    if let (Some(next), Some(check)) = (report.next_status, &report.next_transition) {
        match &check.reason {
            Some(reason) => println!("Next stage {}: blocked ({reason})", next.label()),
            None => println!("Next stage {}: ready", next.label()),
        }
    }

    println!("\nStage completion");
    for stage in &report.stages {
        println!("- {}: {}%", stage.status_label, stage.percentage);
    }

    if !report.applied.is_empty() {
        println!("\nImported completions");
        for label in &report.applied {
            println!("- {label}");
        }
    }
    if !report.unmatched.is_empty() {
        println!("\nUnrecognized rows");
        for label in &report.unmatched {
            println!("- {label}");
        }
    }
}
