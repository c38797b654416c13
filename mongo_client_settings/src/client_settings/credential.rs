use std::{collections::BTreeMap, fmt, str::FromStr};

use percent_encoding::percent_decode_str;

use crate::ParseError;

const EXTERNAL_SOURCE: &str = "$external";
const OPTION_PREFIX: &str = "uri.";
const AUTH_MECHANISM_OPTION: &str = "authMechanism";

/// Authentication mechanisms a credential can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    Plain,
    ScramSha1,
    ScramSha256,
    GssApi,
    MongoDbX509,
}

impl AuthMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::ScramSha1 => "SCRAM-SHA-1",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::GssApi => "GSSAPI",
            Self::MongoDbX509 => "MONGODB-X509",
        }
    }
}

impl FromStr for AuthMechanism {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PLAIN" => Ok(Self::Plain),
            "SCRAM-SHA-1" => Ok(Self::ScramSha1),
            "SCRAM-SHA-256" => Ok(Self::ScramSha256),
            "GSSAPI" => Ok(Self::GssApi),
            "MONGODB-X509" => Ok(Self::MongoDbX509),
            _ => Err(ParseError::invalid_value("authentication mechanism", s)),
        }
    }
}

impl fmt::Display for AuthMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials used to authenticate against a MongoDB deployment.
#[derive(Clone, PartialEq, Eq)]
pub struct MongoCredential {
    mechanism: Option<AuthMechanism>,
    user_name: Option<String>,
    source: String,
    password: Option<String>,
    mechanism_properties: BTreeMap<String, String>,
}

impl MongoCredential {
    /// A credential whose mechanism is negotiated with the server.
    pub fn new(user_name: &str, source: &str, password: &str) -> Self {
        Self::with_password(None, user_name, source, password)
    }

    pub fn plain(user_name: &str, source: &str, password: &str) -> Self {
        Self::with_password(Some(AuthMechanism::Plain), user_name, source, password)
    }

    pub fn scram_sha_1(user_name: &str, source: &str, password: &str) -> Self {
        Self::with_password(Some(AuthMechanism::ScramSha1), user_name, source, password)
    }

    pub fn scram_sha_256(user_name: &str, source: &str, password: &str) -> Self {
        Self::with_password(Some(AuthMechanism::ScramSha256), user_name, source, password)
    }

    pub fn gssapi(user_name: &str) -> Self {
        Self::external(AuthMechanism::GssApi, Some(user_name))
    }

    /// The user name is optional since the server can take it from the client certificate.
    pub fn x509(user_name: Option<&str>) -> Self {
        Self::external(AuthMechanism::MongoDbX509, user_name)
    }

    pub(crate) fn with_password(
        mechanism: Option<AuthMechanism>,
        user_name: &str,
        source: &str,
        password: &str,
    ) -> Self {
        Self {
            mechanism,
            user_name: Some(user_name.to_string()),
            source: source.to_string(),
            password: Some(password.to_string()),
            mechanism_properties: BTreeMap::new(),
        }
    }

    fn external(mechanism: AuthMechanism, user_name: Option<&str>) -> Self {
        Self {
            mechanism: Some(mechanism),
            user_name: user_name.map(str::to_string),
            source: EXTERNAL_SOURCE.to_string(),
            password: None,
            mechanism_properties: BTreeMap::new(),
        }
    }

    pub fn with_mechanism_property(mut self, key: &str, value: &str) -> Self {
        self.mechanism_properties
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn mechanism(&self) -> Option<AuthMechanism> {
        self.mechanism
    }

    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn mechanism_properties(&self) -> &BTreeMap<String, String> {
        &self.mechanism_properties
    }

    /**
    Parses a comma separated list of credentials in the form
    `user:password@source?uri.authMechanism=MECHANISM`.

    Entries can be wrapped in single quotes when a password contains a comma. User names and
    passwords are URL decoded. Any `uri.` option other than `authMechanism` becomes a
    mechanism property. Blank text yields an empty list.

    ```rust
    use mongo_client_settings::{AuthMechanism, MongoCredential};

    let credentials = MongoCredential::parse_list("jon:warg@snow?uri.authMechanism=PLAIN").unwrap();
    assert_eq!(credentials[0].mechanism(), Some(AuthMechanism::Plain));
    assert_eq!(credentials[0].source(), "snow");
    ```
    */
    pub fn parse_list(text: &str) -> Result<Vec<MongoCredential>, ParseError> {
        split_credentials(text)
            .into_iter()
            .map(|credential| credential.parse())
            .collect()
    }
}

impl FromStr for MongoCredential {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ParseError::InvalidCredential {
            credential: redact(s),
            reason: reason.to_string(),
        };

        let (user_info, rest) = s
            .trim()
            .rsplit_once('@')
            .ok_or_else(|| invalid("missing `@` between user and database"))?;
        let (user_name, password) = match user_info.split_once(':') {
            Some((user_name, password)) => (decode(user_name), Some(decode(password))),
            None => (decode(user_info), None),
        };
        let (source, options) = match rest.split_once('?') {
            Some((source, options)) => (source, Some(options)),
            None => (rest, None),
        };

        let mut mechanism = None;
        let mut properties = BTreeMap::new();
        for option in options.into_iter().flat_map(|o| o.split('&')) {
            if option.is_empty() {
                continue;
            }
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| invalid("options must be `key=value` pairs"))?;
            let key = key.strip_prefix(OPTION_PREFIX).unwrap_or(key);
            if key == AUTH_MECHANISM_OPTION {
                mechanism = Some(value.parse::<AuthMechanism>()?);
            } else {
                properties.insert(key.to_string(), value.to_string());
            }
        }

        if user_name.is_empty() {
            return Err(invalid("user name is required"));
        }

        let credential = match mechanism {
            Some(AuthMechanism::GssApi) => MongoCredential::gssapi(&user_name),
            Some(AuthMechanism::MongoDbX509) => MongoCredential::x509(Some(&user_name)),
            mechanism => {
                let password = password
                    .filter(|password| !password.is_empty())
                    .ok_or_else(|| invalid("password is required"))?;
                if source.is_empty() {
                    return Err(invalid("database is required"));
                }
                MongoCredential::with_password(mechanism, &user_name, source, &password)
            }
        };

        Ok(properties
            .iter()
            .fold(credential, |credential, (key, value)| {
                credential.with_mechanism_property(key, value)
            }))
    }
}

impl fmt::Debug for MongoCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoCredential")
            .field("mechanism", &self.mechanism)
            .field("user_name", &self.user_name)
            .field("source", &self.source)
            .field("password", &self.password.as_ref().map(|_| "<hidden>"))
            .field("mechanism_properties", &self.mechanism_properties)
            .finish()
    }
}

/// Splits on commas outside of single quoted sections and strips the quotes.
fn split_credentials(text: &str) -> Vec<String> {
    let mut credentials = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in text.chars() {
        match c {
            '\'' => quoted = !quoted,
            ',' if !quoted => credentials.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    credentials.push(current);

    credentials
        .into_iter()
        .map(|credential| credential.trim().to_string())
        .filter(|credential| !credential.is_empty())
        .collect()
}

/// URL decodes a user name or password. `+` becomes a space and every other character,
/// `&` and `=` included, is kept as written.
pub(crate) fn decode(component: &str) -> String {
    percent_decode_str(&component.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

/// Hides everything between the first `:` and the last `@` so errors never leak a password.
fn redact(credential: &str) -> String {
    match (credential.find(':'), credential.rfind('@')) {
        (Some(colon), Some(at)) if colon < at => {
            format!("{}:***{}", &credential[..colon], &credential[at..])
        }
        _ => credential.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use crate::{AuthMechanism, MongoCredential, ParseError};

    #[test]
    fn parse_list_reads_plain_credential() {
        // Act
        let credentials =
            MongoCredential::parse_list("jon:warg@snow?uri.authMechanism=PLAIN").unwrap();

        // Assert
        assert_eq!(credentials, vec![MongoCredential::plain("jon", "snow", "warg")]);
    }

    #[test]
    fn parse_list_reads_several_credentials() {
        let credentials = MongoCredential::parse_list(
            "jon:warg@snow, 'arya:need,le@winterfell?uri.authMechanism=SCRAM-SHA-256'",
        )
        .unwrap();

        assert_eq!(
            credentials,
            vec![
                MongoCredential::new("jon", "snow", "warg"),
                MongoCredential::scram_sha_256("arya", "winterfell", "need,le"),
            ]
        );
    }

    #[test]
    fn parse_list_returns_nothing_for_blank_text() {
        assert!(MongoCredential::parse_list("  ").unwrap().is_empty());
    }

    #[test]
    fn parse_decodes_url_encoded_passwords() {
        let credential = "jon:p%40ss%3Aword@snow".parse::<MongoCredential>().unwrap();

        assert_eq!(credential.password(), Some("p@ss:word"));
    }

    #[test]
    fn parse_keeps_literal_ampersands_in_passwords() {
        for password in ["a&&b", "&ab", "ab&", "a=b&c"] {
            let credential = format!("jon:{}@snow", password)
                .parse::<MongoCredential>()
                .unwrap();

            assert_eq!(credential.password(), Some(password));
        }
    }

    #[test]
    fn parse_decodes_plus_as_space() {
        let credential = "jon%20snow:war+g@snow".parse::<MongoCredential>().unwrap();

        assert_eq!(credential.user_name(), Some("jon snow"));
        assert_eq!(credential.password(), Some("war g"));
    }

    #[test]
    fn parse_builds_x509_credential_without_password() {
        let credential = "CN=client@?uri.authMechanism=MONGODB-X509"
            .parse::<MongoCredential>()
            .unwrap();

        assert_eq!(credential.mechanism(), Some(AuthMechanism::MongoDbX509));
        assert_eq!(credential.user_name(), Some("CN=client"));
        assert_eq!(credential.source(), "$external");
        assert!(credential.password().is_none());
    }

    #[test]
    fn parse_keeps_extra_options_as_mechanism_properties() {
        let credential = "jon@?uri.authMechanism=GSSAPI&uri.SERVICE_NAME=mongo"
            .parse::<MongoCredential>()
            .unwrap();

        assert_eq!(
            credential.mechanism_properties().get("SERVICE_NAME"),
            Some(&"mongo".to_string())
        );
    }

    #[test]
    fn parse_fails_without_password_and_hides_it_in_errors() {
        assert!("jon@snow".parse::<MongoCredential>().is_err());

        let error = "jon:secret@".parse::<MongoCredential>().unwrap_err();
        assert!(matches!(error, ParseError::InvalidCredential { .. }));
        assert!(!error.to_string().contains("secret"));
    }

    #[test]
    fn parse_fails_for_unknown_mechanism() {
        let result = "jon:warg@snow?uri.authMechanism=MONGODB-CR".parse::<MongoCredential>();

        assert!(result.is_err());
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", MongoCredential::plain("jon", "snow", "warg"));

        assert!(!rendered.contains("warg"));
        assert!(rendered.contains("<hidden>"));
    }
}
