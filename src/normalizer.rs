//! Tolerant readers for lender JSON bodies.
//!
//! The lender is inconsistent about field names, so every read goes through a
//! fixed priority list: the first present field wins, then the next, and a
//! field missing from all names is simply absent. Only callers that cannot
//! proceed without a value turn absence into an error.

use crate::models::{Offer, RateTable};
use serde_json::Value;

/// Keys that may carry the offer list, in priority order.
pub const OFFER_LIST_KEYS: [&str; 2] = ["dados", "ofertas"];
const OFFER_DESCRIPTION_KEYS: [&str; 2] = ["oferta", "descricao"];
const OFFER_STATUS_KEYS: [&str; 2] = ["resposta", "situacao"];

/// Keeps only the digits of a CPF, in their original order.
pub fn canonical_cpf(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Returns the value of the first key in `keys` that is present and not blank.
pub fn first_present<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find(|value| !is_blank(value))
}

/// Renders a JSON scalar the way it is sent in query strings and form bodies.
///
/// Strings go out verbatim, numbers in their JSON text form (`1500.0` stays
/// `1500.0`), null becomes empty text.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Text of the first present key, if any.
pub fn field_text(body: &Value, keys: &[&str]) -> Option<String> {
    first_present(body, keys).map(value_text)
}

/// Maps one raw offer entry to an [`Offer`]; missing names yield `None`, never an error.
pub fn normalize_offer(entry: &Value) -> Offer {
    Offer {
        oferta: field_text(entry, &OFFER_DESCRIPTION_KEYS),
        resposta: field_text(entry, &OFFER_STATUS_KEYS),
    }
}

/// Extracts and normalizes the offer list from an offer-lookup body.
///
/// A missing list, or one that is not an array, yields zero offers.
pub fn extract_offers(body: &Value) -> Vec<Offer> {
    let Some(raw) = first_present(body, &OFFER_LIST_KEYS) else {
        tracing::warn!(
            "Offer lookup body has no '{}' or '{}' list; reporting zero offers",
            OFFER_LIST_KEYS[0],
            OFFER_LIST_KEYS[1]
        );
        return Vec::new();
    };

    let Some(entries) = raw.as_array() else {
        tracing::warn!("Offer list is not an array ({}); reporting zero offers", raw);
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| {
            let offer = normalize_offer(entry);
            if offer.oferta.is_none() && offer.resposta.is_none() {
                tracing::warn!("Offer entry without description or status: {}", entry);
            }
            offer
        })
        .collect()
}

/// Maps one raw table entry to a [`RateTable`].
pub fn normalize_rate_table(entry: &Value) -> RateTable {
    RateTable {
        codigo_tabela: field_text(entry, &["codigoTabela"]),
        prazo: field_text(entry, &["prazo"]),
        valor_liquido: field_text(entry, &["valor_liquido"]),
        contrato: field_text(entry, &["contrato"]),
        parcela: field_text(entry, &["parcela"]),
        coeficiente: field_text(entry, &["coeficiente"]),
    }
}

/// Extracts the candidate tables from an available-operations body.
///
/// A missing or non-array `tabelas` field yields no candidates.
pub fn extract_rate_tables(body: &Value) -> Vec<RateTable> {
    match body.get("tabelas") {
        Some(Value::Array(entries)) => entries.iter().map(normalize_rate_table).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            tracing::warn!("'tabelas' is not an array ({}); treating as empty", other);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_cpf_strips_punctuation() {
        assert_eq!(canonical_cpf("123.456.789-09"), "12345678909");
        assert_eq!(canonical_cpf(" 123 456 789 09 "), "12345678909");
        assert_eq!(canonical_cpf(""), "");
        assert_eq!(canonical_cpf("abc"), "");
    }

    #[test]
    fn test_first_present_priority() {
        let body = json!({"oferta": "A", "descricao": "B"});
        assert_eq!(first_present(&body, &["oferta", "descricao"]), Some(&json!("A")));

        let body = json!({"oferta": null, "descricao": "B"});
        assert_eq!(first_present(&body, &["oferta", "descricao"]), Some(&json!("B")));

        let body = json!({"oferta": "", "descricao": "B"});
        assert_eq!(first_present(&body, &["oferta", "descricao"]), Some(&json!("B")));

        let body = json!({});
        assert_eq!(first_present(&body, &["oferta", "descricao"]), None);
    }

    #[test]
    fn test_offer_alternate_names_are_equivalent() {
        let primary = normalize_offer(&json!({"oferta": "Refin", "resposta": "Aprovado"}));
        let alternate = normalize_offer(&json!({"descricao": "Refin", "situacao": "Aprovado"}));
        assert_eq!(primary, alternate);
    }

    #[test]
    fn test_offer_without_known_fields() {
        let offer = normalize_offer(&json!({"valor": 1000}));
        assert_eq!(
            offer,
            Offer {
                oferta: None,
                resposta: None
            }
        );
    }

    #[test]
    fn test_extract_offers_prefers_dados() {
        let body = json!({
            "dados": [{"descricao": "Refin", "situacao": "Aprovado"}],
            "ofertas": [{"oferta": "Other"}, {"oferta": "Another"}]
        });
        let offers = extract_offers(&body);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].oferta.as_deref(), Some("Refin"));
    }

    #[test]
    fn test_extract_offers_falls_back_to_ofertas() {
        let body = json!({"dados": [], "ofertas": [{"oferta": "Novo"}]});
        let offers = extract_offers(&body);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].oferta.as_deref(), Some("Novo"));
    }

    #[test]
    fn test_extract_offers_tolerates_bad_shapes() {
        assert!(extract_offers(&json!({})).is_empty());
        assert!(extract_offers(&json!({"dados": "nenhuma"})).is_empty());
        assert!(extract_offers(&json!({"dados": {"oferta": "x"}})).is_empty());
        assert!(extract_offers(&json!([])).is_empty());
    }

    #[test]
    fn test_value_text_rendering() {
        assert_eq!(value_text(&json!("abc")), "abc");
        assert_eq!(value_text(&json!(1500.0)), "1500.0");
        assert_eq!(value_text(&json!(42)), "42");
        assert_eq!(value_text(&json!(null)), "");
        assert_eq!(value_text(&json!(true)), "true");
    }

    #[test]
    fn test_extract_rate_tables() {
        let body = json!({"tabelas": [
            {"codigoTabela": 5012, "prazo": 24, "valor_liquido": "1000.50", "coeficiente": 0.0521}
        ]});
        let tables = extract_rate_tables(&body);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].codigo_tabela.as_deref(), Some("5012"));
        assert_eq!(tables[0].prazo.as_deref(), Some("24"));
        assert_eq!(tables[0].valor_liquido.as_deref(), Some("1000.50"));
        assert_eq!(tables[0].coeficiente.as_deref(), Some("0.0521"));
        assert!(tables[0].contrato.is_none());

        assert!(extract_rate_tables(&json!({})).is_empty());
        assert!(extract_rate_tables(&json!({"tabelas": null})).is_empty());
        assert!(extract_rate_tables(&json!({"tabelas": "x"})).is_empty());
    }
}
