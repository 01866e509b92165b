use super::normalizer::normalize_label;
use crate::workflows::dossier::ChecklistTask;
use std::collections::HashMap;
use std::sync::OnceLock;

static LABEL_MAP: OnceLock<HashMap<String, ChecklistTask>> = OnceLock::new();

pub(crate) fn task_for_normalized(normalized: &str) -> Option<ChecklistTask> {
    label_map().get(normalized).copied()
}

fn label_map() -> &'static HashMap<String, ChecklistTask> {
    LABEL_MAP.get_or_init(|| {
        // Short forms seen in practice-management exports.
        const ALIASES: &[(&str, ChecklistTask)] = &[
            ("Infos société", ChecklistTask::CompanyInformationCollected),
            ("Infos dirigeant", ChecklistTask::ManagerInformationCollected),
            ("Devis signé", ChecklistTask::SignedQuoteReceived),
            ("Rédaction des statuts", ChecklistTask::DraftStatutesWritten),
            ("Envoi du projet de statuts", ChecklistTask::DraftStatutesSent),
            ("Dépôt de capital", ChecklistTask::CapitalDeposited),
            ("Certificat du dépositaire", ChecklistTask::DepositCertificateReceived),
            ("Validation des statuts", ChecklistTask::StatutesApproved),
            ("Pièces reçues", ChecklistTask::SupportingDocumentsReceived),
            ("RDV de signature", ChecklistTask::SigningAppointmentScheduled),
            ("Signature des statuts", ChecklistTask::StatutesSigned),
            ("Publication JAL", ChecklistTask::LegalNoticePublished),
            ("Dépôt guichet unique", ChecklistTask::FilingSubmittedOnPortal),
            ("Récépissé greffe", ChecklistTask::RegistryAcknowledgementReceived),
        ];

        let mut map: HashMap<String, ChecklistTask> = ChecklistTask::ordered()
            .into_iter()
            .map(|task| (normalize_label(task.label()), task))
            .collect();
        for (alias, task) in ALIASES {
            map.entry(normalize_label(alias)).or_insert(*task);
        }
        map
    })
}

#[cfg(test)]
pub(crate) fn lookup_for_tests(raw: &str) -> Option<ChecklistTask> {
    task_for_normalized(&normalize_label(raw))
}
