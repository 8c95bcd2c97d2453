use serde_json::{json, Value};

use super::{candidate, DocumentDomain};
use crate::domain::models::{
    today_iso, Candidate, ContractTemplate, StandardClause, ALL_CATEGORIES,
};

/// Contract type that carries no filtering power of its own.
pub const OTHER_CONTRACT_TYPE: &str = "outro";

const CONTRACT_TYPES: &[&str] = &[
    "prestacao_servicos",
    "compra_venda",
    "locacao",
    "trabalhista",
    "societario",
    OTHER_CONTRACT_TYPE,
];

// Payload keys, English first, then the Portuguese keys of existing collections.
const TITLE_KEYS: &[&str] = &["title", "titulo"];
const DESCRIPTION_KEYS: &[&str] = &["description", "descricao"];
const CONTRACT_TYPE_KEYS: &[&str] = &["contractType", "tipoContrato"];
const CLAUSES_KEYS: &[&str] = &["clauses", "clausulasPadrao"];
const VERSION_KEYS: &[&str] = &["version", "versao"];
const LAST_UPDATED_KEYS: &[&str] = &["lastUpdated", "ultimaAtualizacao"];
const SOURCE_KEYS: &[&str] = &["source", "fonte"];

/// Contract templates, filtered by contract type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractTemplates;

impl ContractTemplates {
    fn clauses(candidate: &Candidate) -> Vec<StandardClause> {
        CLAUSES_KEYS
            .iter()
            .find_map(|key| candidate.payload.get(*key).and_then(Value::as_array))
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl DocumentDomain for ContractTemplates {
    type Document = ContractTemplate;

    fn name(&self) -> &'static str {
        "contract-templates"
    }

    fn default_collection(&self) -> &'static str {
        "contratos_templates"
    }

    fn category_field(&self) -> &'static str {
        "contractType"
    }

    fn categories(&self) -> &'static [&'static str] {
        CONTRACT_TYPES
    }

    fn passthrough_categories(&self) -> &'static [&'static str] {
        &[ALL_CATEGORIES, OTHER_CONTRACT_TYPE]
    }

    fn map_candidate(&self, candidate: Candidate) -> ContractTemplate {
        ContractTemplate {
            title: candidate.first_text_or(TITLE_KEYS, "untitled"),
            description: candidate.first_text_or(DESCRIPTION_KEYS, "no description"),
            relevance: candidate.score,
            contract_type: candidate.first_text_or(CONTRACT_TYPE_KEYS, OTHER_CONTRACT_TYPE),
            clauses: Self::clauses(&candidate),
            version: candidate.first_text_or(VERSION_KEYS, "1.0"),
            last_updated: candidate
                .first_text(LAST_UPDATED_KEYS)
                .map(str::to_string)
                .unwrap_or_else(today_iso),
            source: candidate.first_text(SOURCE_KEYS).map(str::to_string),
            tags: candidate.tags("tags"),
        }
    }

    fn fallback_corpus(&self) -> Vec<Candidate> {
        vec![
            candidate(
                0.91,
                json!({
                    "title": "Contrato de Prestação de Serviços - Modelo Geral",
                    "description": "Modelo para prestação de serviços continuados entre pessoas jurídicas, com SLA, confidencialidade e rescisão motivada.",
                    "contractType": "prestacao_servicos",
                    "version": "2.1",
                    "lastUpdated": "2024-03-18",
                    "source": "Biblioteca interna de modelos",
                    "clauses": [
                        { "number": "1", "title": "Objeto", "text": "O presente contrato tem por objeto a prestação dos serviços descritos no Anexo I.", "mandatory": true },
                        { "number": "4", "title": "Níveis de Serviço", "text": "A CONTRATADA observará os níveis de serviço definidos no Anexo II.", "mandatory": false },
                        { "number": "9", "title": "Confidencialidade", "text": "As partes manterão sigilo sobre as informações trocadas durante a vigência e por cinco anos após o término.", "mandatory": true }
                    ],
                    "tags": ["serviços", "sla", "confidencialidade"]
                }),
            ),
            candidate(
                0.84,
                json!({
                    "title": "Contrato de Locação Comercial",
                    "description": "Locação não residencial regida pela Lei 8.245/1991, com garantia por fiança e reajuste anual pelo IPCA.",
                    "contractType": "locacao",
                    "version": "1.4",
                    "lastUpdated": "2023-11-07",
                    "clauses": [
                        { "number": "2", "title": "Prazo", "text": "A locação vigorará pelo prazo de 60 meses.", "mandatory": true },
                        { "number": "5", "title": "Reajuste", "text": "O aluguel será reajustado anualmente pela variação do IPCA.", "mandatory": true, "comments": "Índice pode ser negociado." }
                    ],
                    "tags": ["locação", "lei do inquilinato", "fiança"]
                }),
            ),
            candidate(
                0.77,
                json!({
                    "title": "Contrato de Compra e Venda de Bens Móveis",
                    "description": "Compra e venda com pagamento parcelado, reserva de domínio e cláusula de garantia contra vícios.",
                    "contractType": "compra_venda",
                    "version": "1.0",
                    "lastUpdated": "2022-09-30",
                    "clauses": [
                        { "number": "3", "title": "Preço e Pagamento", "text": "O preço será pago em 12 parcelas mensais e sucessivas.", "mandatory": true },
                        { "number": "6", "title": "Reserva de Domínio", "text": "A propriedade somente se transfere após a quitação integral do preço.", "mandatory": false }
                    ],
                    "tags": ["compra e venda", "reserva de domínio"]
                }),
            ),
            candidate(
                0.70,
                json!({
                    "title": "Contrato Individual de Trabalho por Prazo Determinado",
                    "description": "Contratação por prazo determinado nos termos do art. 443 da CLT, com cláusula de experiência.",
                    "contractType": "trabalhista",
                    "version": "3.0",
                    "lastUpdated": "2024-06-12",
                    "source": "CLT, arts. 443 e 445",
                    "clauses": [
                        { "number": "1", "title": "Função", "text": "O EMPREGADO exercerá a função descrita no Anexo I.", "mandatory": true },
                        { "number": "7", "title": "Jornada", "text": "A jornada será de 44 horas semanais.", "mandatory": true }
                    ],
                    "tags": ["trabalhista", "prazo determinado", "CLT"]
                }),
            ),
            candidate(
                0.65,
                json!({
                    "title": "Acordo de Sócios - Sociedade Limitada",
                    "description": "Acordo parassocial com regras de governança, direito de preferência, tag along e drag along.",
                    "contractType": "societario",
                    "version": "1.2",
                    "lastUpdated": "2023-04-25",
                    "clauses": [
                        { "number": "5", "title": "Direito de Preferência", "text": "Os sócios terão preferência na aquisição de quotas ofertadas a terceiros.", "mandatory": true },
                        { "number": "8", "title": "Tag Along", "text": "Os sócios minoritários poderão alienar suas quotas nas mesmas condições ofertadas ao controlador.", "mandatory": false }
                    ],
                    "tags": ["societário", "governança", "quotas"]
                }),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_get_readable_defaults() {
        let template = ContractTemplates.map_candidate(candidate(0.5, json!({})));
        assert_eq!(template.title, "untitled");
        assert_eq!(template.description, "no description");
        assert_eq!(template.contract_type, "outro");
        assert_eq!(template.version, "1.0");
        assert_eq!(template.last_updated, today_iso());
        assert!(template.clauses.is_empty());
        assert_eq!(template.source, None);
    }

    #[test]
    fn malformed_clauses_are_skipped() {
        let template = ContractTemplates.map_candidate(candidate(
            0.5,
            json!({
                "clauses": [
                    { "number": "1", "title": "Objeto", "text": "..." },
                    { "title": "sem número" },
                    "not an object"
                ]
            }),
        ));
        assert_eq!(template.clauses.len(), 1);
        assert!(!template.clauses[0].mandatory);
    }

    #[test]
    fn reads_portuguese_payload_keys() {
        let template = ContractTemplates.map_candidate(candidate(
            0.88,
            json!({
                "titulo": "Contrato de Locação Residencial",
                "descricao": "Modelo conforme a Lei 8.245/91",
                "tipoContrato": "locacao",
                "clausulasPadrao": [
                    {
                        "numero": "1",
                        "titulo": "Do Objeto",
                        "texto": "O LOCADOR cede ao LOCATÁRIO...",
                        "obrigatoria": true,
                        "comentarios": "Descrever o imóvel"
                    }
                ],
                "versao": "2.1",
                "ultimaAtualizacao": "2024-02-01",
                "fonte": "Lei 8.245/91"
            }),
        ));
        assert_eq!(template.title, "Contrato de Locação Residencial");
        assert_eq!(template.description, "Modelo conforme a Lei 8.245/91");
        assert_eq!(template.contract_type, "locacao");
        assert_eq!(template.version, "2.1");
        assert_eq!(template.last_updated, "2024-02-01");
        assert_eq!(template.source.as_deref(), Some("Lei 8.245/91"));
        assert_eq!(
            template.clauses,
            vec![StandardClause {
                number: "1".into(),
                title: "Do Objeto".into(),
                text: "O LOCADOR cede ao LOCATÁRIO...".into(),
                mandatory: true,
                comments: Some("Descrever o imóvel".into()),
            }]
        );
    }

    #[test]
    fn all_and_other_pass_through() {
        assert!(ContractTemplates.is_passthrough("all"));
        assert!(ContractTemplates.is_passthrough("outro"));
        assert!(!ContractTemplates.is_passthrough("locacao"));
    }

    #[test]
    fn fallback_corpus_covers_each_concrete_type_once() {
        let corpus = ContractTemplates.fallback_corpus();
        assert_eq!(corpus.len(), 5);
        for contract_type in CONTRACT_TYPES.iter().filter(|t| **t != OTHER_CONTRACT_TYPE) {
            let hits = corpus
                .iter()
                .filter(|c| c.text("contractType") == Some(*contract_type))
                .count();
            assert_eq!(hits, 1, "{contract_type}");
        }
    }
}
