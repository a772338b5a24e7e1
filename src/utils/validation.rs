use crate::utils::error::{AppError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(AppError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

// Input validators below report form errors; the ones above guard config.

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| AppError::form(field_name, "campo requerido"))
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::form(field_name, "campo requerido"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AppError::form(
            field_name,
            format!("debe estar entre {} y {}", min, max),
        ));
    }
    Ok(())
}

/// Strictly above `min`, for quantities and prices.
pub fn validate_greater_than(field_name: &str, value: f64, min: f64) -> Result<()> {
    if !value.is_finite() || value <= min {
        return Err(AppError::form(field_name, format!("debe ser mayor a {}", min)));
    }
    Ok(())
}

/// `yyyy-mm-dd`, the date format the backend accepts.
pub fn validate_iso_date(field_name: &str, value: &str) -> Result<()> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::form(field_name, "fecha inválida, use aaaa-mm-dd"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://example.com/api/").is_ok());
        assert!(validate_url("base_url", "http://10.0.2.2:8000/api/").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "invalid-url").is_err());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("connect_timeout_secs", 30, 1).is_ok());
        assert!(validate_positive_number("connect_timeout_secs", 0, 1).is_err());
    }

    #[test]
    fn test_validate_iso_date() {
        assert!(validate_iso_date("purchase_date", "2024-03-15").is_ok());
        assert!(validate_iso_date("purchase_date", "15/03/2024").is_err());
        assert!(validate_iso_date("purchase_date", "2024-02-30").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("number_of_coats", 2, 1, 10).is_ok());
        assert!(validate_range("number_of_coats", 11, 1, 10).is_err());
    }

    #[test]
    fn test_input_validators_report_form_errors() {
        let missing: Option<String> = None;
        let err = validate_required_field("purchase_date", &missing).unwrap_err();
        assert!(matches!(err, AppError::FormError { ref field, .. } if field == "purchase_date"));

        assert!(validate_non_empty_string("description", "  ").is_err());
        assert!(validate_non_empty_string("description", "Pintura").is_ok());

        assert!(validate_greater_than("unit_price", 0.0, 0.0).is_err());
        assert!(validate_greater_than("unit_price", f64::NAN, 0.0).is_err());
        assert!(validate_greater_than("unit_price", 0.5, 0.0).is_ok());
    }
}
