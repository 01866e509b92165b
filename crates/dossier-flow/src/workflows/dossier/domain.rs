use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Position of a dossier in the formation pipeline. Declaration order is the
/// pipeline order and drives forward/backward transition checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    #[serde(rename = "NOUVEAU")]
    New,
    #[serde(rename = "DEVIS_ENVOYE")]
    QuoteSent,
    #[serde(rename = "REDACTION_STATUTS")]
    DraftStatutes,
    #[serde(rename = "ATTENTE_DEPOT")]
    AwaitingDeposit,
    #[serde(rename = "DEPOT_VALIDE")]
    DepositValidated,
    #[serde(rename = "PREPARATION_RDV")]
    AppointmentPrep,
    #[serde(rename = "RDV_SIGNE")]
    AppointmentSigned,
    #[serde(rename = "FORMALITE_DEPOSEE")]
    FilingSubmitted,
    #[serde(rename = "SUIVI")]
    Monitoring,
    #[serde(rename = "CLOTURE")]
    Closed,
}

impl WorkflowStatus {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::New,
            Self::QuoteSent,
            Self::DraftStatutes,
            Self::AwaitingDeposit,
            Self::DepositValidated,
            Self::AppointmentPrep,
            Self::AppointmentSigned,
            Self::FilingSubmitted,
            Self::Monitoring,
            Self::Closed,
        ]
    }

    /// Wire tag, identical to the serde representation.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::New => "NOUVEAU",
            Self::QuoteSent => "DEVIS_ENVOYE",
            Self::DraftStatutes => "REDACTION_STATUTS",
            Self::AwaitingDeposit => "ATTENTE_DEPOT",
            Self::DepositValidated => "DEPOT_VALIDE",
            Self::AppointmentPrep => "PREPARATION_RDV",
            Self::AppointmentSigned => "RDV_SIGNE",
            Self::FilingSubmitted => "FORMALITE_DEPOSEE",
            Self::Monitoring => "SUIVI",
            Self::Closed => "CLOTURE",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "Nouveau dossier",
            Self::QuoteSent => "Devis envoyé",
            Self::DraftStatutes => "Rédaction des statuts",
            Self::AwaitingDeposit => "En attente du dépôt de capital",
            Self::DepositValidated => "Dépôt de capital validé",
            Self::AppointmentPrep => "Préparation du rendez-vous",
            Self::AppointmentSigned => "Rendez-vous signé",
            Self::FilingSubmitted => "Formalité déposée",
            Self::Monitoring => "Suivi de la formalité",
            Self::Closed => "Clôturé",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ordered()
            .into_iter()
            .find(|status| status.tag().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Legal entity form of the company being registered.
///
/// Unrecognised tags collapse to [`LegalForm::Other`], which no catalog
/// restriction lists, so such dossiers only receive form-agnostic items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegalForm {
    Sasu,
    Sas,
    Eurl,
    Sarl,
    Sci,
    Other,
}

impl LegalForm {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Sasu => "SASU",
            Self::Sas => "SAS",
            Self::Eurl => "EURL",
            Self::Sarl => "SARL",
            Self::Sci => "SCI",
            Self::Other => "AUTRE",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_uppercase().as_str() {
            "SASU" => Self::Sasu,
            "SAS" => Self::Sas,
            "EURL" => Self::Eurl,
            "SARL" => Self::Sarl,
            "SCI" => Self::Sci,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for LegalForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for LegalForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for LegalForm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&raw))
    }
}

/// Identity of every checklist task the status rules know about. The label is
/// what gets stored on checklist items, so it must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistTask {
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
}

impl ChecklistTask {
    pub const fn ordered() -> [Self; 14] {
        [
            Self::CompanyInformationCollected,
            Self::ManagerInformationCollected,
            Self::SignedQuoteReceived,
            Self::DraftStatutesWritten,
            Self::DraftStatutesSent,
            Self::CapitalDeposited,
            Self::DepositCertificateReceived,
            Self::StatutesApproved,
            Self::SupportingDocumentsReceived,
            Self::SigningAppointmentScheduled,
            Self::StatutesSigned,
            Self::LegalNoticePublished,
            Self::FilingSubmittedOnPortal,
            Self::RegistryAcknowledgementReceived,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::CompanyInformationCollected => "Informations société collectées",
            Self::ManagerInformationCollected => "Informations gérant/président collectées",
            Self::SignedQuoteReceived => "Devis signé reçu",
            Self::DraftStatutesWritten => "Projet de statuts rédigé",
            Self::DraftStatutesSent => "Projet de statuts envoyé au client",
            Self::CapitalDeposited => "Dépôt de capital effectué",
            Self::DepositCertificateReceived => "Attestation de dépôt reçue",
            Self::StatutesApproved => "Statuts validés par le client",
            Self::SupportingDocumentsReceived => "Pièces justificatives reçues",
            Self::SigningAppointmentScheduled => "Rendez-vous de signature planifié",
            Self::StatutesSigned => "Statuts signés",
            Self::LegalNoticePublished => "Annonce légale publiée",
            Self::FilingSubmittedOnPortal => "Dossier déposé sur le guichet unique",
            Self::RegistryAcknowledgementReceived => "Accusé de réception du greffe reçu",
        }
    }

    /// Exact label match. Anything else is not a rule task.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|task| task.label() == label)
    }
}

/// Identifier wrapper for dossiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DossierId(pub String);

impl DossierId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for DossierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper shared by checklist and document checklist items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One task of a dossier checklist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: ItemId,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<ChecklistTask>,
    pub completed: bool,
    pub required: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_forms: Option<Vec<LegalForm>>,
}

impl ChecklistItem {
    pub fn for_task(task: ChecklistTask, required: bool) -> Self {
        Self {
            id: ItemId::generate(),
            label: task.label().to_string(),
            task: Some(task),
            completed: false,
            required,
            completed_at: None,
            depends_on: None,
            legal_forms: None,
        }
    }

    /// Free-form task. Resolves to a rule task only if the label matches one
    /// exactly.
    pub fn custom(label: impl Into<String>, required: bool) -> Self {
        let label = label.into();
        Self {
            id: ItemId::generate(),
            task: ChecklistTask::from_label(&label),
            label,
            completed: false,
            required,
            completed_at: None,
            depends_on: None,
            legal_forms: None,
        }
    }

    /// Task identity, falling back to the label for records stored without it.
    pub fn task(&self) -> Option<ChecklistTask> {
        self.task.or_else(|| ChecklistTask::from_label(&self.label))
    }

    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        match (self.completed, completed) {
            (false, true) => self.completed_at = Some(now),
            (true, false) => self.completed_at = None,
            _ => {}
        }
        self.completed = completed;
    }

    pub fn applies_to(&self, form: LegalForm) -> bool {
        match &self.legal_forms {
            Some(forms) => forms.contains(&form),
            None => true,
        }
    }
}

/// Rule tasks whose items are completed. Items with unknown labels are ignored.
pub fn completed_tasks(checklist: &[ChecklistItem]) -> HashSet<ChecklistTask> {
    checklist
        .iter()
        .filter(|item| item.completed)
        .filter_map(ChecklistItem::task)
        .collect()
}
