//! # Connection string module
//!
//! Decomposes URL-style database connection strings
//! (`scheme://[user[:password]@]host[:port]/dbname[?opt=val&...]`) into
//! the keyword/value pairs understood by database drivers.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv6Addr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{form_urlencoded, Host, Url};

use crate::error::ConfigError;

/// Key holding the host name, IP address or socket directory.
pub const HOST: &str = "host";
/// Key holding the TCP port.
pub const PORT: &str = "port";
/// Key holding the user name.
pub const USER: &str = "user";
/// Key holding the password.
pub const PASSWORD: &str = "password";
/// Key holding the database name.
pub const DBNAME: &str = "dbname";

const REDACTED: &str = "************";

// RFC 3986 unreserved characters pass through, everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Structured view of a connection string.
///
/// Every key is present only if the corresponding part appeared in the URL:
/// a connection string without a port yields no `port` entry, leaving the
/// default to the consumer. Query parameters become entries verbatim; when a
/// key repeats, the last occurrence wins.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    scheme: String,
    fields: BTreeMap<String, String>,
}

impl ConnectionDescriptor {
    /// Parses a URL-style connection string.
    ///
    /// Fails with [`ConfigError::MalformedConnectionString`] if the input is
    /// not valid URL syntax or has no host segment. A string without a scheme
    /// either fails URL parsing outright or is read as an opaque URL without
    /// an authority, which is reported as a missing host.
    pub fn parse(dsn: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(dsn)
            .map_err(|err| ConfigError::MalformedConnectionString(err.to_string()))?;

        let host = match url.host() {
            Some(Host::Domain(domain)) if !domain.is_empty() => decode(domain, HOST)?,
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            _ => {
                return Err(ConfigError::MalformedConnectionString(
                    "missing host".into(),
                ))
            }
        };

        let mut fields = BTreeMap::new();
        fields.insert(HOST.to_string(), host);

        if let Some(port) = url.port() {
            fields.insert(PORT.to_string(), port.to_string());
        }
        if !url.username().is_empty() {
            fields.insert(USER.to_string(), decode(url.username(), USER)?);
        }
        if let Some(password) = url.password() {
            fields.insert(PASSWORD.to_string(), decode(password, PASSWORD)?);
        }

        let path = url.path();
        let dbname = path.strip_prefix('/').unwrap_or(path);
        if !dbname.is_empty() {
            fields.insert(DBNAME.to_string(), decode(dbname, DBNAME)?);
        }

        for (key, value) in url.query_pairs() {
            if key.is_empty() {
                continue;
            }
            fields.insert(key.into_owned(), value.into_owned());
        }

        Ok(ConnectionDescriptor {
            scheme: url.scheme().to_string(),
            fields,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn host(&self) -> Option<&str> {
        self.get(HOST)
    }

    pub fn port(&self) -> Option<&str> {
        self.get(PORT)
    }

    pub fn user(&self) -> Option<&str> {
        self.get(USER)
    }

    pub fn password(&self) -> Option<&str> {
        self.get(PASSWORD)
    }

    pub fn dbname(&self) -> Option<&str> {
        self.get(DBNAME)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }

    /// Serializes the descriptor back to URL form.
    ///
    /// Parsing the result yields a descriptor equal to `self`.
    pub fn to_url(&self) -> String {
        let mut dsn = format!("{}://", self.scheme);

        if self.user().is_some() || self.password().is_some() {
            dsn.push_str(&encode(self.user().unwrap_or_default()));
            if let Some(password) = self.password() {
                dsn.push(':');
                dsn.push_str(&encode(password));
            }
            dsn.push('@');
        }

        if let Some(host) = self.host() {
            dsn.push_str(&url_host(host));
        }
        if let Some(port) = self.port() {
            dsn.push(':');
            dsn.push_str(port);
        }
        if let Some(dbname) = self.dbname() {
            dsn.push('/');
            dsn.push_str(&encode(dbname));
        }

        let mut options = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.options() {
            options.append_pair(key, value);
        }
        let options = options.finish();
        if !options.is_empty() {
            dsn.push('?');
            dsn.push_str(&options);
        }

        dsn
    }

    /// Renders the keyword/value form (`dbname=postgres host=localhost ...`)
    /// accepted by libpq-compatible drivers. Keys are sorted.
    pub fn to_key_value(&self) -> String {
        self.fields
            .iter()
            .map(|(key, value)| format!("{}={}", key, quote(value)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn options(&self) -> impl Iterator<Item = (&String, &String)> {
        self.fields
            .iter()
            .filter(|(key, _)| ![HOST, PORT, USER, PASSWORD, DBNAME].contains(&key.as_str()))
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("scheme", &self.scheme)
            .field("fields", &RedactedFields(&self.fields))
            .finish()
    }
}

struct RedactedFields<'a>(&'a BTreeMap<String, String>);

impl fmt::Debug for RedactedFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(key, value)| {
                if key == PASSWORD {
                    (key.as_str(), REDACTED)
                } else {
                    (key.as_str(), value.as_str())
                }
            }))
            .finish()
    }
}

/// Parses a connection string into its keyword/value mapping.
///
/// Shorthand for [`ConnectionDescriptor::parse`] when the scheme is not
/// needed.
pub fn parse_connection_string(dsn: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    ConnectionDescriptor::parse(dsn).map(ConnectionDescriptor::into_fields)
}

fn decode(value: &str, part: &str) -> Result<String, ConfigError> {
    percent_decode_str(value)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| {
            ConfigError::MalformedConnectionString(format!("{} is not valid UTF-8", part))
        })
}

fn encode(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, COMPONENT).into()
}

/// Renders a host for the authority part of a URL: IPv6 literals in
/// brackets, anything else percent-encoded.
pub(crate) fn url_host(host: &str) -> Cow<'_, str> {
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]", host).into()
    } else {
        encode(host)
    }
}

fn quote(value: &str) -> Cow<'_, str> {
    let needs_quoting = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if needs_quoting {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'")).into()
    } else {
        value.into()
    }
}
