use super::domain::ChecklistTask::{self, *};
use super::domain::WorkflowStatus;

/// Tasks that must be complete for a dossier to have reached `status`.
#[derive(Debug, Clone, Copy)]
pub struct StatusRule {
    pub status: WorkflowStatus,
    pub required: &'static [ChecklistTask],
    pub description: &'static str,
}

impl StatusRule {
    pub fn is_unconditional(&self) -> bool {
        self.required.is_empty()
    }

    pub fn required_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.required.iter().map(|task| task.label())
    }
}

// Each set repeats the previous one in full. Inference scans backward and
// relies on every set being a strict superset of its predecessor.
pub static STATUS_RULES: [StatusRule; 10] = [
    StatusRule {
        status: WorkflowStatus::New,
        required: &[],
        description: "Dossier ouvert, aucune tâche requise",
    },
    StatusRule {
        status: WorkflowStatus::QuoteSent,
        required: &[CompanyInformationCollected, ManagerInformationCollected],
        description: "Informations collectées, devis transmis au client",
    },
    StatusRule {
        status: WorkflowStatus::DraftStatutes,
        required: &[
            CompanyInformationCollected,
            ManagerInformationCollected,
            SignedQuoteReceived,
        ],
        description: "Devis signé, rédaction des statuts en cours",
    },
    StatusRule {
        status: WorkflowStatus::AwaitingDeposit,
        required: &[
            CompanyInformationCollected,
            ManagerInformationCollected,
            SignedQuoteReceived,
            DraftStatutesWritten,
            DraftStatutesSent,
        ],
        description: "Projet de statuts envoyé, en attente du dépôt de capital",
    },
    StatusRule {
        status: WorkflowStatus::DepositValidated,
        required: &[
            CompanyInformationCollected,
            ManagerInformationCollected,
            SignedQuoteReceived,
            DraftStatutesWritten,
            DraftStatutesSent,
            CapitalDeposited,
            DepositCertificateReceived,
        ],
        description: "Capital déposé et attestation de dépôt reçue",
    },
    StatusRule {
        status: WorkflowStatus::AppointmentPrep,
        required: &[
            CompanyInformationCollected,
            ManagerInformationCollected,
            SignedQuoteReceived,
            DraftStatutesWritten,
            DraftStatutesSent,
            CapitalDeposited,
            DepositCertificateReceived,
            StatutesApproved,
            SupportingDocumentsReceived,
        ],
        description: "Statuts validés, pièces réunies pour la signature",
    },
    StatusRule {
        status: WorkflowStatus::AppointmentSigned,
        required: &[
            CompanyInformationCollected,
            ManagerInformationCollected,
            SignedQuoteReceived,
            DraftStatutesWritten,
            DraftStatutesSent,
            CapitalDeposited,
            DepositCertificateReceived,
            StatutesApproved,
            SupportingDocumentsReceived,
            SigningAppointmentScheduled,
            StatutesSigned,
        ],
        description: "Rendez-vous tenu, statuts signés",
    },
    StatusRule {
        status: WorkflowStatus::FilingSubmitted,
        required: &[
            CompanyInformationCollected,
            ManagerInformationCollected,
            SignedQuoteReceived,
            DraftStatutesWritten,
            DraftStatutesSent,
            CapitalDeposited,
            DepositCertificateReceived,
            StatutesApproved,
            SupportingDocumentsReceived,
            SigningAppointmentScheduled,
            StatutesSigned,
            LegalNoticePublished,
            FilingSubmittedOnPortal,
        ],
        description: "Annonce légale publiée, formalité déposée sur le guichet unique",
    },
    StatusRule {
        status: WorkflowStatus::Monitoring,
        required: &[
            CompanyInformationCollected,
            ManagerInformationCollected,
            SignedQuoteReceived,
            DraftStatutesWritten,
            DraftStatutesSent,
            CapitalDeposited,
            DepositCertificateReceived,
            StatutesApproved,
            SupportingDocumentsReceived,
            SigningAppointmentScheduled,
            StatutesSigned,
            LegalNoticePublished,
            FilingSubmittedOnPortal,
            RegistryAcknowledgementReceived,
        ],
        description: "Formalité réceptionnée par le greffe, suivi jusqu'à l'immatriculation",
    },
    StatusRule {
        status: WorkflowStatus::Closed,
        required: &[],
        description: "Dossier clôturé manuellement",
    },
];

pub fn rules() -> &'static [StatusRule] {
    &STATUS_RULES
}

pub fn rule_for(status: WorkflowStatus) -> Option<&'static StatusRule> {
    STATUS_RULES.iter().find(|rule| rule.status == status)
}

pub fn rule_index(status: WorkflowStatus) -> Option<usize> {
    STATUS_RULES.iter().position(|rule| rule.status == status)
}
