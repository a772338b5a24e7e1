//! Decimal fields arrive from the backend either as JSON numbers or as
//! numeric strings (`"125.50"`). These helpers accept both.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn parse_text<E: de::Error>(text: &str) -> Result<Option<f64>, E> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| E::custom(format!("invalid decimal value: {:?}", text)))
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(text) => Ok(parse_text(&text)?.unwrap_or(0.0)),
    }
}

pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(text)) => parse_text(&text),
    }
}

/// `$1234.50`
pub fn format_money(amount: f64) -> String {
    format!("${:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "lenient_f64")]
        quantity: f64,
        #[serde(default, deserialize_with = "lenient_opt_f64")]
        price: Option<f64>,
    }

    #[test]
    fn test_accepts_numbers_and_strings() {
        let row: Row = serde_json::from_str(r#"{"quantity": "12.50", "price": 3}"#).unwrap();
        assert_eq!(row.quantity, 12.5);
        assert_eq!(row.price, Some(3.0));
    }

    #[test]
    fn test_missing_null_and_blank_are_none() {
        let row: Row = serde_json::from_str(r#"{"quantity": 1}"#).unwrap();
        assert_eq!(row.price, None);
        let row: Row = serde_json::from_str(r#"{"quantity": 1, "price": null}"#).unwrap();
        assert_eq!(row.price, None);
        let row: Row = serde_json::from_str(r#"{"quantity": 1, "price": ""}"#).unwrap();
        assert_eq!(row.price, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_str::<Row>(r#"{"quantity": "abc"}"#).is_err());
    }
}
