use serde_json::json;

use super::{candidate, DocumentDomain};
use crate::domain::models::{today_iso, Candidate, Precedent};

const COURTS: &[&str] = &["STF", "STJ", "TST", "TRF1", "TRF2", "TRF3", "TRF4", "TRF5"];

// Payload keys, English first, then the Portuguese keys of existing collections.
const TITLE_KEYS: &[&str] = &["title", "titulo"];
const SUMMARY_KEYS: &[&str] = &["summary", "ementa"];
const COURT_KEYS: &[&str] = &["court", "tribunal"];
const DATE_KEYS: &[&str] = &["date", "data", "dataAjuizamento"];
const CASE_NUMBER_KEYS: &[&str] = &["caseNumber", "numeroProcesso", "numero"];
const RAPPORTEUR_KEYS: &[&str] = &["rapporteur", "relator"];

/// Case-law precedents, filtered by court.
#[derive(Debug, Clone, Copy, Default)]
pub struct Precedents;

impl DocumentDomain for Precedents {
    type Document = Precedent;

    fn name(&self) -> &'static str {
        "precedents"
    }

    fn default_collection(&self) -> &'static str {
        "jurisprudencias"
    }

    fn category_field(&self) -> &'static str {
        "court"
    }

    fn categories(&self) -> &'static [&'static str] {
        COURTS
    }

    fn map_candidate(&self, candidate: Candidate) -> Precedent {
        Precedent {
            title: candidate.first_text_or(TITLE_KEYS, "untitled"),
            summary: candidate.first_text_or(SUMMARY_KEYS, "no summary"),
            relevance: candidate.score,
            court: candidate.first_text_or(COURT_KEYS, "unknown court"),
            date: candidate
                .first_text(DATE_KEYS)
                .map(str::to_string)
                .unwrap_or_else(today_iso),
            case_number: candidate.first_text(CASE_NUMBER_KEYS).map(str::to_string),
            rapporteur: candidate.first_text(RAPPORTEUR_KEYS).map(str::to_string),
            tags: candidate.tags("tags"),
        }
    }

    fn fallback_corpus(&self) -> Vec<Candidate> {
        vec![
            candidate(
                0.92,
                json!({
                    "title": "STF - Tema 1234 - Direito à greve",
                    "summary": "É constitucional o exercício do direito de greve no serviço público, desde que observadas as limitações previstas em lei...",
                    "court": "STF",
                    "date": "2023-05-15",
                    "caseNumber": "RE 654432",
                    "rapporteur": "Min. Roberto Barroso",
                    "tags": ["direito constitucional", "greve", "serviço público"]
                }),
            ),
            candidate(
                0.85,
                json!({
                    "title": "STJ - REsp 987654 - Adicional de insalubridade",
                    "summary": "O adicional de insalubridade deve ser calculado sobre o salário base do empregado, conforme art. 192 da CLT...",
                    "court": "STJ",
                    "date": "2023-08-22",
                    "caseNumber": "REsp 987654/SP",
                    "rapporteur": "Min. Maria Isabel Gallotti",
                    "tags": ["direito do trabalho", "insalubridade", "CLT"]
                }),
            ),
            candidate(
                0.78,
                json!({
                    "title": "TST - RR 555666 - Horas extras",
                    "summary": "Configurada a prestação de horas extras habituais, devem ser consideradas no cálculo das verbas rescisórias...",
                    "court": "TST",
                    "date": "2024-02-10",
                    "caseNumber": "RR 555666-12.2023.5.02.0000",
                    "rapporteur": "Min. Augusto César Leite de Carvalho",
                    "tags": ["direito do trabalho", "horas extras", "rescisão"]
                }),
            ),
            candidate(
                0.72,
                json!({
                    "title": "STF - ADI 5555 - Reforma Trabalhista",
                    "summary": "São constitucionais as alterações promovidas pela Lei 13.467/2017...",
                    "court": "STF",
                    "date": "2022-11-05",
                    "caseNumber": "ADI 5555",
                    "rapporteur": "Min. Gilmar Mendes",
                    "tags": ["direito do trabalho", "reforma trabalhista", "constitucionalidade"]
                }),
            ),
            candidate(
                0.68,
                json!({
                    "title": "TRF3 - AC 123456 - Acidente de trabalho",
                    "summary": "Demonstrada a culpa do empregador no acidente de trabalho, é devida a indenização por danos morais...",
                    "court": "TRF3",
                    "date": "2024-01-20",
                    "caseNumber": "AC 0123456-12.2023.4.03.6100",
                    "rapporteur": "Des. Federal Carlos Muta",
                    "tags": ["direito do trabalho", "acidente de trabalho", "danos morais"]
                }),
            ),
        ]
    }
}
