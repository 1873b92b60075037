//! IPMI passwd file: maps IPMI credentials onto KVMD credentials.
//!
//! ```text
//! # ipmi_user:ipmi_passwd -> kvmd_user:kvmd_passwd
//! admin:admin -> admin:admin
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Incorrect IPMI passwd file: {0}")]
pub struct PasswdError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpmiUserCredentials {
    pub ipmi_user: String,
    pub ipmi_passwd: String,
    pub kvmd_user: String,
    pub kvmd_passwd: String,
}

#[derive(Debug, Clone, Default)]
pub struct IpmiAuthManager {
    credentials: BTreeMap<String, IpmiUserCredentials>,
}

impl IpmiAuthManager {
    pub async fn load(path: &Path) -> crate::error::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Self::parse(&text)?)
    }

    pub fn parse(text: &str) -> Result<Self, PasswdError> {
        let mut credentials = BTreeMap::new();

        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            let Some((left, right)) = line.split_once(" -> ") else {
                return Err(PasswdError(format!("Missing ' -> ' operator at line #{number}")));
            };
            let (left, right) = (left.trim_start(), right.trim_start());

            let Some((ipmi_user, ipmi_passwd)) = left.split_once(':') else {
                return Err(PasswdError(format!("Missing ':' operator in left credentials at line #{number}")));
            };
            let Some((kvmd_user, kvmd_passwd)) = right.split_once(':') else {
                return Err(PasswdError(format!("Missing ':' operator in right credentials at line #{number}")));
            };

            let ipmi_user = ipmi_user.trim();
            if ipmi_user.is_empty() {
                return Err(PasswdError(format!("Empty IPMI user (left) at line #{number}")));
            }
            let kvmd_user = kvmd_user.trim();
            if kvmd_user.is_empty() {
                return Err(PasswdError(format!("Empty KVMD user (right) at line #{number}")));
            }
            if credentials.contains_key(ipmi_user) {
                return Err(PasswdError(format!(
                    "Found duplicating user {ipmi_user:?} (left) at line #{number}"
                )));
            }

            credentials.insert(
                ipmi_user.to_string(),
                IpmiUserCredentials {
                    ipmi_user: ipmi_user.to_string(),
                    ipmi_passwd: ipmi_passwd.to_string(),
                    kvmd_user: kvmd_user.to_string(),
                    kvmd_passwd: kvmd_passwd.to_string(),
                },
            );
        }

        Ok(Self { credentials })
    }

    pub fn contains(&self, ipmi_user: &str) -> bool {
        self.credentials.contains_key(ipmi_user)
    }

    pub fn ipmi_passwd(&self, ipmi_user: &str) -> Option<&str> {
        self.credentials.get(ipmi_user).map(|c| c.ipmi_passwd.as_str())
    }

    pub fn credentials(&self, ipmi_user: &str) -> Option<&IpmiUserCredentials> {
        self.credentials.get(ipmi_user)
    }

    /// IPMI users, sorted.
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.credentials.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let text = "# IPMI -> KVMD\n\n   \n  # indented comment\nadmin:admin -> admin:admin\n  ops : s3cr:et -> kvm-ops:pw\n";
        let auth = IpmiAuthManager::parse(text).unwrap();

        assert_eq!(auth.len(), 2);
        assert!(auth.contains("admin"));
        assert_eq!(auth.ipmi_passwd("ops"), Some(" s3cr:et"));

        let creds = auth.credentials("ops").unwrap();
        assert_eq!(creds.kvmd_user, "kvm-ops");
        assert_eq!(creds.kvmd_passwd, "pw");
        assert_eq!(auth.users().collect::<Vec<_>>(), vec!["admin", "ops"]);
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            ("admin:admin admin:admin", "Missing ' -> ' operator at line #0"),
            ("\nadmin -> admin:admin", "Missing ':' operator in left credentials at line #1"),
            ("admin:admin -> admin", "Missing ':' operator in right credentials at line #0"),
            (" :admin -> admin:admin", "Empty IPMI user (left) at line #0"),
            ("admin:admin -> :admin", "Empty KVMD user (right) at line #0"),
            (
                "admin:a -> admin:a\nadmin:b -> other:b",
                "Found duplicating user \"admin\" (left) at line #1",
            ),
        ];
        for (text, message) in cases {
            let err = IpmiAuthManager::parse(text).unwrap_err();
            assert_eq!(err.to_string(), format!("Incorrect IPMI passwd file: {message}"));
        }
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ipmipasswd");
        std::fs::write(&path, "admin:admin -> admin:admin\n").unwrap();

        let auth = IpmiAuthManager::load(&path).await.unwrap();
        assert!(auth.contains("admin"));
        assert!(IpmiAuthManager::load(&dir.path().join("missing")).await.is_err());
    }
}
