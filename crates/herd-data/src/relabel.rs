//! Friendly column labels for exported breeding-plan spreadsheets
//!
//! Herd-management software exports headers like `NÚMERO DE VACAS`, `NAAB`
//! (repeated once per sire option) or `INB %`. The heuristic maps them to the
//! labels printed in the report. It is best-effort: headers that match no
//! rule are kept as they are.

use crate::{DatasetError, Result};

/// How the label of a matched header is produced
#[derive(Clone, Copy)]
enum Label {
    /// Always the same text
    Fixed(&'static str),
    /// Depends on how many earlier headers matched the same rule (1-based)
    Numbered(fn(usize) -> String),
}

/// One entry of the ordered rule table
struct Rule {
    matches: fn(&str) -> bool,
    label: Label,
}

/// Rules are tried top to bottom against the trimmed, upper-cased header;
/// the first match wins.
const RULES: &[Rule] = &[
    Rule {
        matches: is_animal_number,
        label: Label::Fixed("ID animal"),
    },
    Rule {
        matches: is_semen_type,
        label: Label::Fixed("Tipo sêmen"),
    },
    Rule {
        matches: is_index,
        label: Label::Fixed("Índice"),
    },
    Rule {
        matches: is_sire,
        label: Label::Fixed("Código pai"),
    },
    Rule {
        matches: is_naab,
        label: Label::Numbered(naab_label),
    },
    Rule {
        matches: is_short_name,
        label: Label::Numbered(option_label),
    },
    Rule {
        matches: is_inbreeding,
        label: Label::Numbered(inbreeding_label),
    },
];

fn is_animal_number(h: &str) -> bool {
    h.contains("NÚMERO") || h.contains("NUMERO")
}

fn is_semen_type(h: &str) -> bool {
    h == "STOC"
}

fn is_index(h: &str) -> bool {
    h.contains("ÍNDICE") || h.contains("INDICE")
}

fn is_sire(h: &str) -> bool {
    h.contains("TOURO")
}

fn is_naab(h: &str) -> bool {
    h == "NAAB"
}

fn is_short_name(h: &str) -> bool {
    h.contains("NOME CURTO") || (h.contains("NOME") && h.contains("CURTO"))
}

fn is_inbreeding(h: &str) -> bool {
    h.contains("INB") && h.contains('%')
}

fn naab_label(n: usize) -> String {
    if n <= 3 {
        format!("NAAB Opção {n}")
    } else {
        format!("NAAB {n}")
    }
}

fn option_label(n: usize) -> String {
    format!("{n}º Opção")
}

fn inbreeding_label(n: usize) -> String {
    if n == 1 {
        "INB %".to_string()
    } else {
        format!("INB % ({n})")
    }
}

/// Map raw headers to friendly labels using the rule table
///
/// Order and count are preserved, and applying it to its own output gives
/// the same labels back.
pub fn relabel_headers(headers: &[String]) -> Vec<String> {
    let mut counts = [0usize; RULES.len()];

    headers
        .iter()
        .map(|header| {
            let key = header.trim().to_uppercase();
            let Some(index) = RULES.iter().position(|rule| (rule.matches)(&key)) else {
                return header.clone();
            };
            counts[index] += 1;
            match RULES[index].label {
                Label::Fixed(label) => label.to_string(),
                Label::Numbered(make) => make(counts[index]),
            }
        })
        .collect()
}

/// Strategy for replacing dataset headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Relabeler {
    /// Content-based rule table
    #[default]
    Heuristic,
    /// Explicit labels by column position
    Positional(Vec<String>),
}

impl Relabeler {
    pub fn relabel(&self, headers: &[String]) -> Result<Vec<String>> {
        match self {
            Relabeler::Heuristic => Ok(relabel_headers(headers)),
            Relabeler::Positional(labels) => {
                if labels.len() != headers.len() {
                    return Err(DatasetError::LabelCount {
                        expected: headers.len(),
                        found: labels.len(),
                    });
                }
                Ok(labels.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_export_header() {
        let raw = strings(&[
            "NÚMERO DE VACAS",
            "STOC",
            "ÍNDICE",
            "TOURO NAAB",
            "NAAB",
            "NOME CURTO",
            "INB %",
            "NAAB",
            "NOME CURTO",
            "INB %",
            "NAAB",
            "NOME CURTO",
            "INB %",
        ]);
        let expected = strings(&[
            "ID animal",
            "Tipo sêmen",
            "Índice",
            "Código pai",
            "NAAB Opção 1",
            "1º Opção",
            "INB %",
            "NAAB Opção 2",
            "2º Opção",
            "INB % (2)",
            "NAAB Opção 3",
            "3º Opção",
            "INB % (3)",
        ]);
        assert_eq!(relabel_headers(&raw), expected);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_trimmed() {
        let raw = strings(&["  numero vaca ", "stoc", "Indice Total", "touro"]);
        assert_eq!(
            relabel_headers(&raw),
            strings(&["ID animal", "Tipo sêmen", "Índice", "Código pai"])
        );
    }

    #[test]
    fn test_fourth_naab_uses_plain_number() {
        let raw = strings(&["NAAB", "NAAB", "NAAB", "NAAB"]);
        assert_eq!(
            relabel_headers(&raw),
            strings(&["NAAB Opção 1", "NAAB Opção 2", "NAAB Opção 3", "NAAB 4"])
        );
    }

    #[test]
    fn test_exact_rules_do_not_match_substrings() {
        let raw = strings(&["STOCK", "NAAB CODE"]);
        assert_eq!(relabel_headers(&raw), raw);
    }

    #[test]
    fn test_rule_order_takes_first_match() {
        // Contains both NÚMERO and TOURO; the earlier rule wins
        let raw = strings(&["NÚMERO DO TOURO"]);
        assert_eq!(relabel_headers(&raw), strings(&["ID animal"]));
    }

    #[test]
    fn test_unmatched_headers_pass_through() {
        let raw = strings(&["Lote", "Observação", ""]);
        assert_eq!(relabel_headers(&raw), raw);
    }

    #[test]
    fn test_idempotent_on_friendly_headers() {
        let raw = strings(&["NÚMERO", "STOC", "NAAB", "NOME CURTO", "INB %", "INB %"]);
        let once = relabel_headers(&raw);
        let twice = relabel_headers(&once);
        assert_eq!(once, twice);
        assert_eq!(once.len(), raw.len());
    }

    #[test]
    fn test_positional_labels() {
        let headers = strings(&["a", "b"]);
        let relabeler = Relabeler::Positional(strings(&["Vaca", "Touro"]));
        assert_eq!(relabeler.relabel(&headers).unwrap(), strings(&["Vaca", "Touro"]));
    }

    #[test]
    fn test_positional_label_count_mismatch() {
        let headers = strings(&["a", "b", "c"]);
        let relabeler = Relabeler::Positional(strings(&["Vaca"]));
        assert!(matches!(
            relabeler.relabel(&headers),
            Err(DatasetError::LabelCount {
                expected: 3,
                found: 1
            })
        ));
    }
}
