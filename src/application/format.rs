//! Plain-text rendering of search results for agents that consume text, not JSON.

use crate::domain::{ContractTemplate, Precedent};

const SEPARATOR: &str = "\n\n---\n\n";
const CLAUSE_PREVIEW: usize = 3;

fn percent(relevance: f32) -> String {
    format!("{:.0}%", relevance * 100.0)
}

pub fn format_precedents(precedents: &[Precedent]) -> String {
    if precedents.is_empty() {
        return "No precedents found matching the given criteria.".to_string();
    }

    precedents
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let mut lines = vec![
                format!(
                    "{}. **{} - {}**",
                    idx + 1,
                    p.court,
                    p.case_number.as_deref().unwrap_or(&p.title)
                ),
                format!("Summary: {}", p.summary),
                format!("Relevance: {}", percent(p.relevance)),
                format!("Date: {}", p.date),
            ];
            if let Some(rapporteur) = &p.rapporteur {
                lines.push(format!("Rapporteur: {rapporteur}"));
            }
            if !p.tags.is_empty() {
                lines.push(format!("Tags: {}", p.tags.join(", ")));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

pub fn format_templates(templates: &[ContractTemplate]) -> String {
    if templates.is_empty() {
        return "No contract templates found matching the given criteria.".to_string();
    }

    templates
        .iter()
        .enumerate()
        .map(|(idx, t)| {
            let mut lines = vec![
                format!("{}. **{}**", idx + 1, t.title),
                format!("Type: {}", t.contract_type),
                format!("Description: {}", t.description),
                format!("Relevance: {}", percent(t.relevance)),
                format!("Version: {} | Updated: {}", t.version, t.last_updated),
                format!("Standard clauses: {}", t.clauses.len()),
            ];
            if let Some(source) = &t.source {
                lines.push(format!("Source: {source}"));
            }
            if !t.clauses.is_empty() {
                lines.push("Key clauses:".to_string());
                for clause in t.clauses.iter().take(CLAUSE_PREVIEW) {
                    lines.push(format!(
                        "  - {}. {}{}",
                        clause.number,
                        clause.title,
                        if clause.mandatory { " (mandatory)" } else { "" }
                    ));
                }
            }
            if !t.tags.is_empty() {
                lines.push(format!("Tags: {}", t.tags.join(", ")));
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
