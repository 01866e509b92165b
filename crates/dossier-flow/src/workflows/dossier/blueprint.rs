use super::domain::{ChecklistItem, ChecklistTask, ItemId, LegalForm};

/// Template line used to instantiate a dossier checklist.
#[derive(Debug, Clone)]
pub struct ChecklistTemplate {
    pub label: &'static str,
    pub task: Option<ChecklistTask>,
    pub required: bool,
    pub depends_on: Option<&'static str>,
    pub legal_forms: Option<&'static [LegalForm]>,
}

impl ChecklistTemplate {
    const fn rule(task: ChecklistTask) -> Self {
        Self {
            label: task.label(),
            task: Some(task),
            required: true,
            depends_on: None,
            legal_forms: None,
        }
    }

    fn applies_to(&self, form: LegalForm) -> bool {
        match self.legal_forms {
            Some(forms) => forms.contains(&form),
            None => true,
        }
    }

    fn instantiate(&self) -> ChecklistItem {
        ChecklistItem {
            id: ItemId::generate(),
            label: self.label.to_string(),
            task: self.task,
            completed: false,
            required: self.required,
            completed_at: None,
            depends_on: self.depends_on.map(str::to_string),
            legal_forms: self.legal_forms.map(<[LegalForm]>::to_vec),
        }
    }
}

#[derive(Debug)]
pub struct ChecklistBlueprint {
    templates: Vec<ChecklistTemplate>,
}

impl ChecklistBlueprint {
    /// Checklist for a company formation: every status-rule task plus the
    /// form-specific follow-ups that only inform the team.
    pub fn company_formation() -> Self {
        use ChecklistTask::*;

        Self {
            templates: vec![
                ChecklistTemplate::rule(CompanyInformationCollected),
                ChecklistTemplate::rule(ManagerInformationCollected),
                ChecklistTemplate::rule(SignedQuoteReceived),
                ChecklistTemplate::rule(DraftStatutesWritten),
                ChecklistTemplate::rule(DraftStatutesSent),
                ChecklistTemplate::rule(CapitalDeposited),
                ChecklistTemplate::rule(DepositCertificateReceived),
                ChecklistTemplate {
                    label: "Liste des souscripteurs établie",
                    task: None,
                    required: false,
                    depends_on: None,
                    legal_forms: Some(&[LegalForm::Sasu, LegalForm::Sas]),
                },
                ChecklistTemplate {
                    label: "Rapport du commissaire aux apports obtenu",
                    task: None,
                    required: false,
                    depends_on: Some("apport_en_nature"),
                    legal_forms: Some(&[
                        LegalForm::Sasu,
                        LegalForm::Sas,
                        LegalForm::Eurl,
                        LegalForm::Sarl,
                    ]),
                },
                ChecklistTemplate::rule(StatutesApproved),
                ChecklistTemplate::rule(SupportingDocumentsReceived),
                ChecklistTemplate {
                    label: "Acte de nomination du gérant rédigé",
                    task: None,
                    required: false,
                    depends_on: Some("gerant_hors_statuts"),
                    legal_forms: Some(&[LegalForm::Eurl, LegalForm::Sarl, LegalForm::Sci]),
                },
                ChecklistTemplate::rule(SigningAppointmentScheduled),
                ChecklistTemplate::rule(StatutesSigned),
                ChecklistTemplate::rule(LegalNoticePublished),
                ChecklistTemplate::rule(FilingSubmittedOnPortal),
                ChecklistTemplate::rule(RegistryAcknowledgementReceived),
                ChecklistTemplate {
                    label: "Extrait Kbis transmis au client",
                    task: None,
                    required: false,
                    depends_on: None,
                    legal_forms: None,
                },
            ],
        }
    }

    pub fn instantiate(&self, form: LegalForm) -> Vec<ChecklistItem> {
        self.templates
            .iter()
            .filter(|template| template.applies_to(form))
            .map(ChecklistTemplate::instantiate)
            .collect()
    }
}
