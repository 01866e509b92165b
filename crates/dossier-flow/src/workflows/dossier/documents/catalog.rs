use crate::workflows::dossier::domain::LegalForm;
use serde::{Deserialize, Serialize};

/// Document kinds the filing portal may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    PieceIdentiteDirigeant,
    JustificatifDomicileDirigeant,
    JustificatifSiege,
    StatutsSignes,
    AttestationDepotFonds,
    ListeSouscripteurs,
    ActeNominationGerant,
    DeclarationNonCondamnation,
    BeneficiairesEffectifs,
    AttestationAnnonceLegale,
    RapportCommissaireApports,
    Pouvoir,
}

/// Static description of one document requirement.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRequirement {
    pub order: u8,
    pub document_type: DocumentType,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub required: bool,
    pub legal_forms: Option<&'static [LegalForm]>,
}

impl DocumentRequirement {
    pub fn applies_to(&self, form: LegalForm) -> bool {
        match self.legal_forms {
            Some(forms) => forms.contains(&form),
            None => true,
        }
    }
}

// `order` decides the generated sequence, not the position in this array.
pub static DOCUMENT_CATALOG: [DocumentRequirement; 12] = [
    DocumentRequirement {
        order: 1,
        document_type: DocumentType::PieceIdentiteDirigeant,
        label: "Pièce d'identité du dirigeant",
        description: "Copie recto-verso en cours de validité, signée et datée.",
        icon: "id-card",
        required: true,
        legal_forms: None,
    },
    DocumentRequirement {
        order: 2,
        document_type: DocumentType::JustificatifDomicileDirigeant,
        label: "Justificatif de domicile du dirigeant",
        description: "Facture ou avis d'imposition de moins de trois mois.",
        icon: "house",
        required: true,
        legal_forms: None,
    },
    DocumentRequirement {
        order: 3,
        document_type: DocumentType::JustificatifSiege,
        label: "Justificatif d'occupation du siège",
        description: "Bail, contrat de domiciliation ou attestation d'hébergement.",
        icon: "building",
        required: true,
        legal_forms: None,
    },
    DocumentRequirement {
        order: 4,
        document_type: DocumentType::StatutsSignes,
        label: "Statuts signés",
        description: "Exemplaire des statuts paraphé et signé par tous les associés.",
        icon: "file-signature",
        required: true,
        legal_forms: None,
    },
    DocumentRequirement {
        order: 5,
        document_type: DocumentType::AttestationDepotFonds,
        label: "Attestation de dépôt des fonds",
        description: "Certificat de la banque ou du notaire dépositaire du capital.",
        icon: "landmark",
        required: true,
        legal_forms: Some(&[
            LegalForm::Sasu,
            LegalForm::Sas,
            LegalForm::Eurl,
            LegalForm::Sarl,
        ]),
    },
    DocumentRequirement {
        order: 6,
        document_type: DocumentType::ListeSouscripteurs,
        label: "Liste des souscripteurs",
        description: "Liste certifiée des souscripteurs avec le nombre d'actions souscrites.",
        icon: "list",
        required: true,
        legal_forms: Some(&[LegalForm::Sasu, LegalForm::Sas]),
    },
    DocumentRequirement {
        order: 7,
        document_type: DocumentType::ActeNominationGerant,
        label: "Acte de nomination du gérant",
        description: "Requis lorsque le gérant n'est pas désigné dans les statuts.",
        icon: "user-tie",
        required: false,
        legal_forms: Some(&[LegalForm::Eurl, LegalForm::Sarl, LegalForm::Sci]),
    },
    DocumentRequirement {
        order: 8,
        document_type: DocumentType::DeclarationNonCondamnation,
        label: "Déclaration de non-condamnation",
        description: "Attestation sur l'honneur et filiation du dirigeant.",
        icon: "scale-balanced",
        required: true,
        legal_forms: None,
    },
    DocumentRequirement {
        order: 9,
        document_type: DocumentType::BeneficiairesEffectifs,
        label: "Déclaration des bénéficiaires effectifs",
        description: "Formulaire relatif aux personnes détenant plus de 25 % du capital.",
        icon: "users",
        required: true,
        legal_forms: None,
    },
    DocumentRequirement {
        order: 10,
        document_type: DocumentType::AttestationAnnonceLegale,
        label: "Attestation de parution de l'annonce légale",
        description: "Justificatif émis par le journal d'annonces légales.",
        icon: "newspaper",
        required: true,
        legal_forms: None,
    },
    DocumentRequirement {
        order: 11,
        document_type: DocumentType::RapportCommissaireApports,
        label: "Rapport du commissaire aux apports",
        description: "Uniquement en cas d'apport en nature au capital.",
        icon: "magnifying-glass-dollar",
        required: false,
        legal_forms: Some(&[
            LegalForm::Sasu,
            LegalForm::Sas,
            LegalForm::Eurl,
            LegalForm::Sarl,
        ]),
    },
    DocumentRequirement {
        order: 12,
        document_type: DocumentType::Pouvoir,
        label: "Pouvoir pour les formalités",
        description: "Mandat autorisant le cabinet à déposer la formalité.",
        icon: "stamp",
        required: false,
        legal_forms: None,
    },
];

/// Catalog entries that apply to `form`, in catalog order.
pub fn requirements_for(form: LegalForm) -> Vec<&'static DocumentRequirement> {
    let mut entries: Vec<_> = DOCUMENT_CATALOG
        .iter()
        .filter(|entry| entry.applies_to(form))
        .collect();
    entries.sort_by_key(|entry| entry.order);
    entries
}
