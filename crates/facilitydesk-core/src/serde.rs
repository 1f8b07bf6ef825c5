use serde::{Deserialize, Deserializer};

/// Treats missing, empty and whitespace-only strings as `None` and trims the rest.
pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Profile {
        #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
        phone: Option<String>,
    }

    #[test]
    fn test_empty_and_blank_become_none() {
        let p: Profile = serde_json::from_str(r#"{"phone":""}"#).unwrap();
        assert_eq!(p.phone, None);
        let p: Profile = serde_json::from_str(r#"{"phone":"   "}"#).unwrap();
        assert_eq!(p.phone, None);
        let p: Profile = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(p.phone, None);
    }

    #[test]
    fn test_values_are_trimmed() {
        let p: Profile = serde_json::from_str(r#"{"phone":" +44 20 7946 0000 "}"#).unwrap();
        assert_eq!(p.phone.as_deref(), Some("+44 20 7946 0000"));
    }
}
