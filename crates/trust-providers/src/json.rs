use serde_json::Value;
use trust_core::{CertifyError, Result, U256};

/// A located value inside an untrusted provider response.
///
/// Every accessor fails with [`CertifyError::MissingFact`] naming the JSON
/// path, so a bad response points at the exact field.
#[derive(Clone, Debug)]
pub(crate) struct Field<'a> {
    provider: &'static str,
    path: String,
    value: &'a Value,
}

impl<'a> Field<'a> {
    pub(crate) fn root(provider: &'static str, value: &'a Value) -> Self {
        Self {
            provider,
            path: String::new(),
            value,
        }
    }

    pub(crate) fn value(&self) -> &'a Value {
        self.value
    }

    pub(crate) fn get(&self, key: &str) -> Result<Field<'a>> {
        let path = self.child_path(key);
        match self.value.get(key) {
            None | Some(Value::Null) => Err(CertifyError::missing_fact(self.provider, path, "absent")),
            Some(value) => Ok(Field {
                provider: self.provider,
                path,
                value,
            }),
        }
    }

    /// Unwraps single-element arrays, which some endpoints use interchangeably with objects.
    pub(crate) fn first_if_array(&self) -> Result<Field<'a>> {
        match self.value {
            Value::Array(items) => match items.first() {
                Some(value) => Ok(Field {
                    provider: self.provider,
                    path: format!("{}[0]", self.path),
                    value,
                }),
                None => Err(self.missing("empty array")),
            },
            _ => Ok(self.clone()),
        }
    }

    /// Returns the first key/value pair of an object, in document order.
    pub(crate) fn first_entry(&self) -> Result<(&'a str, Field<'a>)> {
        let object = self
            .value
            .as_object()
            .ok_or_else(|| self.missing("expected an object"))?;
        let (key, value) = object
            .iter()
            .next()
            .ok_or_else(|| self.missing("empty object"))?;

        Ok((
            key.as_str(),
            Field {
                provider: self.provider,
                path: self.child_path(key),
                value,
            },
        ))
    }

    pub(crate) fn as_str(&self) -> Result<&'a str> {
        self.value
            .as_str()
            .ok_or_else(|| self.missing("expected a string"))
    }

    /// Reads a boolean given either as `true`/`false` or as `1`/`0`.
    pub(crate) fn as_flag(&self) -> Result<bool> {
        match self.value {
            Value::Bool(flag) => Ok(*flag),
            Value::Number(n) => match n.as_u64() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                _ => Err(self.missing(format!("expected 0 or 1, got {n}"))),
            },
            _ => Err(self.missing("expected a boolean")),
        }
    }

    /// Reads a non-negative amount.
    ///
    /// Accepts JSON numbers and decimal strings. Numbers are read from their
    /// literal text, so integers of any width stay exact and fractions are
    /// truncated toward zero without a detour through `f64`.
    pub(crate) fn as_amount(&self) -> Result<U256> {
        match self.value {
            Value::Number(n) => {
                let literal = n.to_string();
                if literal.starts_with('-') {
                    return Err(self.missing(format!("negative amount {literal}")));
                }
                let digits = truncated_digits(&literal)
                    .ok_or_else(|| self.missing(format!("not a 256-bit amount: {literal}")))?;
                digits
                    .parse::<U256>()
                    .map_err(|e| self.missing(format!("{literal}: {e}")))
            }
            Value::String(text) => {
                if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
                    return Err(self.missing(format!("not a decimal amount: {text:?}")));
                }
                text.parse::<U256>()
                    .map_err(|e| self.missing(e.to_string()))
            }
            _ => Err(self.missing("expected a number")),
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn missing(&self, reason: impl Into<String>) -> CertifyError {
        CertifyError::missing_fact(self.provider, self.path.clone(), reason)
    }
}

/// Decimal digits of a non-negative JSON number literal truncated toward zero.
///
/// Handles fractions and exponents on the text itself. `None` for malformed
/// literals and for values with more digits than any `U256` can hold.
fn truncated_digits(literal: &str) -> Option<String> {
    const MAX_DIGITS: usize = 78;

    let (mantissa, exponent) = match literal.find(['e', 'E']) {
        Some(at) => (&literal[..at], literal[at + 1..].parse::<i64>().ok()?),
        None => (literal, 0),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int.is_empty() || !int.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let all = format!("{int}{frac}");
    let shift = exponent.checked_sub(i64::try_from(frac.len()).ok()?)?;
    let kept = if shift >= 0 {
        let significant = all.trim_start_matches('0');
        if significant.is_empty() {
            return Some("0".to_string());
        }
        let zeros = usize::try_from(shift).ok()?;
        if significant.len().checked_add(zeros)? > MAX_DIGITS {
            return None;
        }
        format!("{significant}{}", "0".repeat(zeros))
    } else {
        let dropped = usize::try_from(shift.unsigned_abs()).ok()?;
        all[..all.len().saturating_sub(dropped)].to_string()
    };

    let trimmed = kept.trim_start_matches('0');
    Some(if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_full_path_of_absent_field() {
        let body = json!({ "data": { "quote": { "USD": {} } } });
        let root = Field::root("test", &body);

        let err = root
            .get("data")
            .and_then(|f| f.get("quote"))
            .and_then(|f| f.get("USD"))
            .and_then(|f| f.get("volume_24h"))
            .unwrap_err();

        match err {
            CertifyError::MissingFact { provider, field, .. } => {
                assert_eq!(provider, "test");
                assert_eq!(field, "data.quote.USD.volume_24h");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn null_counts_as_absent() {
        let body = json!({ "name": null });
        assert!(Field::root("test", &body).get("name").is_err());
    }

    #[test]
    fn amounts_accept_integers_floats_and_strings() {
        let body = json!({
            "int": 500,
            "float": 1234.99,
            "string": "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        });
        let root = Field::root("test", &body);

        assert_eq!(root.get("int").unwrap().as_amount().unwrap(), U256::from(500u64));
        assert_eq!(root.get("float").unwrap().as_amount().unwrap(), U256::from(1234u64));
        assert_eq!(root.get("string").unwrap().as_amount().unwrap(), U256::MAX);
    }

    #[test]
    fn amounts_reject_negative_and_garbage() {
        let body = json!({ "neg": -1, "negf": -0.5, "text": "12a", "bool": true, "empty": "" });
        let root = Field::root("test", &body);

        for key in ["neg", "negf", "text", "bool", "empty"] {
            let err = root.get(key).unwrap().as_amount().unwrap_err();
            assert!(matches!(err, CertifyError::MissingFact { .. }), "{key}");
        }
    }

    #[test]
    fn amounts_wider_than_64_bits_stay_exact() {
        let body: Value = serde_json::from_str(
            r#"{ "wide": 123456789012345678901234567, "wide_fraction": 123456789012345678901234567.89 }"#,
        )
        .unwrap();
        let root = Field::root("test", &body);
        let expected = "123456789012345678901234567".parse::<U256>().unwrap();

        assert_eq!(root.get("wide").unwrap().as_amount().unwrap(), expected);
        assert_eq!(root.get("wide_fraction").unwrap().as_amount().unwrap(), expected);
    }

    #[test]
    fn amounts_apply_exponents_on_the_literal() {
        let body: Value =
            serde_json::from_str(r#"{ "a": 1.5e3, "b": 9.99e-1, "c": 2E+20, "d": 0e400, "e": 12345e-2 }"#)
                .unwrap();
        let root = Field::root("test", &body);
        let amount = |key: &str| root.get(key).unwrap().as_amount().unwrap();

        assert_eq!(amount("a"), U256::from(1500u64));
        assert_eq!(amount("b"), U256::ZERO);
        assert_eq!(amount("c"), "200000000000000000000".parse::<U256>().unwrap());
        assert_eq!(amount("d"), U256::ZERO);
        assert_eq!(amount("e"), U256::from(123u64));
    }

    #[test]
    fn amounts_beyond_256_bits_are_rejected() {
        let body: Value = serde_json::from_str(
            r#"{ "max_plus_one": 115792089237316195423570985008687907853269984665640564039457584007913129639936, "huge": 1e100 }"#,
        )
        .unwrap();
        let root = Field::root("test", &body);

        assert!(root.get("max_plus_one").unwrap().as_amount().is_err());
        assert!(root.get("huge").unwrap().as_amount().is_err());
    }

    #[test]
    fn first_entry_follows_document_order() {
        let body: Value = serde_json::from_str(r#"{ "data": { "9": 1, "10": 2 } }"#).unwrap();
        let (key, _) = Field::root("test", &body).get("data").unwrap().first_entry().unwrap();
        assert_eq!(key, "9");
    }

    #[test]
    fn flags_accept_bool_and_bit() {
        let body = json!({ "a": true, "b": 0, "c": 1, "d": 2, "e": "yes" });
        let root = Field::root("test", &body);

        assert!(root.get("a").unwrap().as_flag().unwrap());
        assert!(!root.get("b").unwrap().as_flag().unwrap());
        assert!(root.get("c").unwrap().as_flag().unwrap());
        assert!(root.get("d").unwrap().as_flag().is_err());
        assert!(root.get("e").unwrap().as_flag().is_err());
    }

    #[test]
    fn first_entry_and_array_unwrapping() {
        let body = json!({ "data": { "33251": [{ "name": "Lombard" }] } });
        let data = Field::root("test", &body).get("data").unwrap();

        let (key, entry) = data.first_entry().unwrap();
        assert_eq!(key, "33251");

        let name = entry.first_if_array().unwrap().get("name").unwrap();
        assert_eq!(name.as_str().unwrap(), "Lombard");

        let empty = json!({ "data": {} });
        assert!(Field::root("test", &empty).get("data").unwrap().first_entry().is_err());
    }
}
