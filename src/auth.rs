use crate::error::AuthError;

/// Session cookies copied from a logged-in browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pairs: Vec<(String, String)>,
}

impl Credentials {
    /// Parses a `name=value; name2=value2` cookie header.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(AuthError::Empty);
        }

        let mut pairs = Vec::new();
        for part in raw.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| AuthError::Malformed(part.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(AuthError::Malformed(part.to_string()));
            }
            pairs.push((name.to_string(), value.trim().to_string()));
        }

        if pairs.is_empty() {
            return Err(AuthError::Empty);
        }
        Ok(Self { pairs })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value for the `Cookie` request header.
    pub fn header_value(&self) -> String {
        self.pairs
            .iter()
            .map(|(n, v)| format!("{}={}", n, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_renders_in_order() {
        let creds = Credentials::parse(" wr_vid=123 ; wr_skey=abc;").unwrap();
        assert_eq!(creds.get("wr_vid"), Some("123"));
        assert_eq!(creds.get("wr_skey"), Some("abc"));
        assert_eq!(creds.header_value(), "wr_vid=123; wr_skey=abc");
    }

    #[test]
    fn keeps_equals_inside_value() {
        let creds = Credentials::parse("token=a=b==").unwrap();
        assert_eq!(creds.get("token"), Some("a=b=="));
    }

    #[test]
    fn rejects_empty_and_malformed() {
        assert_eq!(Credentials::parse("   "), Err(AuthError::Empty));
        assert_eq!(Credentials::parse(";;"), Err(AuthError::Empty));
        assert_eq!(
            Credentials::parse("a=1; nonsense"),
            Err(AuthError::Malformed("nonsense".to_string()))
        );
        assert_eq!(
            Credentials::parse("=value"),
            Err(AuthError::Malformed("=value".to_string()))
        );
    }
}
