use crate::utils::error::{Result, StatsError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> StatsError {
    StatsError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_positive_real(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field_name, value, "Value must be a positive number"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN fails both comparisons, so test containment rather than exclusion
    if !(value >= min && value <= max) {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_coordinates(field_prefix: &str, latitude: f64, longitude: f64) -> Result<()> {
    validate_range(&format!("{}.latitude", field_prefix), latitude, -90.0, 90.0)?;
    validate_range(&format!("{}.longitude", field_prefix), longitude, -180.0, 180.0)
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| StatsError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("source.endpoint", "https://example.com/ads").is_ok());
        assert!(validate_url("source.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("source.endpoint", "").is_err());
        assert!(validate_url("source.endpoint", "not a url").is_err());
        assert!(validate_url("source.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates("cities[0]", 52.52, 13.405).is_ok());
        assert!(validate_coordinates("cities[0]", 91.0, 13.405).is_err());
        assert!(validate_coordinates("cities[0]", 52.52, -181.0).is_err());
        assert!(validate_coordinates("cities[0]", f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_validate_positive_values() {
        assert!(validate_positive_number("batch.concurrency", 2, 1).is_ok());
        assert!(validate_positive_number("batch.concurrency", 0, 1).is_err());
        assert!(validate_positive_real("histogram.bucket_width", 10.0).is_ok());
        assert!(validate_positive_real("histogram.bucket_width", 0.0).is_err());
        assert!(validate_positive_real("histogram.bucket_width", f64::INFINITY).is_err());
    }
}
