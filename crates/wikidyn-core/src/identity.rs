use serde::{Deserialize, Serialize};

use crate::revision::RawRevision;
use crate::{RecordError, blake3_hex};

const CONVERSION_SCRIPT_USER: &str = "Conversion script";
const SYNTHETIC_HASH_LEN: usize = 16;

/// Upstream shape an editor identity was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(rename_all = "snake_case")]
pub enum EditorKind {
    Named,
    Ipv4,
    Hidden,
    ConversionScript,
    MaskedIp,
}

impl EditorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Named => "named",
            Self::Ipv4 => "ipv4",
            Self::Hidden => "hidden",
            Self::ConversionScript => "conversion_script",
            Self::MaskedIp => "masked_ip",
        }
    }

    pub fn is_synthetic(self) -> bool {
        matches!(self, Self::Hidden | Self::ConversionScript | Self::MaskedIp)
    }
}

/// Resolved editor. `name` is what graphs and distinct-editor counts key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EditorIdentity {
    pub kind: EditorKind,
    pub name: String,
    pub id: String,
}

impl EditorIdentity {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: EditorKind::Named,
            id: name.clone(),
            name,
        }
    }
}

/// Maps the anomalous upstream user shapes onto stable identities.
///
/// Hidden users, the conversion-script placeholder and masked addresses get a
/// synthetic `<kind>#<hash>` name derived from the record itself. `#` cannot
/// appear in a registered username, so these never collide with named editors.
/// Bare IPv4 editors keep their address and get a 12-digit zero-padded id.
/// The script, IPv4 and masked shapes only apply to records flagged `anon`.
pub fn resolve_editor(raw: &RawRevision) -> Result<EditorIdentity, RecordError> {
    if raw.user_hidden {
        return Ok(synthetic(EditorKind::Hidden, "", raw));
    }

    let user = raw
        .user
        .as_deref()
        .map(str::trim)
        .filter(|user| !user.is_empty())
        .ok_or(RecordError::MissingField("user"))?;

    if !raw.anon {
        return Ok(EditorIdentity::named(user));
    }
    if user == CONVERSION_SCRIPT_USER {
        return Ok(synthetic(EditorKind::ConversionScript, user, raw));
    }
    if is_ipv4(user) {
        return Ok(EditorIdentity {
            kind: EditorKind::Ipv4,
            name: user.to_owned(),
            id: padded_ipv4_id(user),
        });
    }
    if is_masked_ipv4(user) {
        return Ok(synthetic(EditorKind::MaskedIp, user, raw));
    }

    Ok(EditorIdentity::named(user))
}

pub fn is_ipv4(candidate: &str) -> bool {
    octets(candidate).is_some_and(|parts| {
        parts
            .iter()
            .all(|part| part.chars().all(|ch| ch.is_ascii_digit()))
    })
}

/// Partially redacted addresses such as `66.92.166.xxx` or `255.XXX.XXX.XXX`.
pub fn is_masked_ipv4(candidate: &str) -> bool {
    let Some(parts) = octets(candidate) else {
        return false;
    };
    let masked = |part: &str| part.chars().all(|ch| ch == 'x' || ch == 'X');
    let numeric = |part: &str| part.chars().all(|ch| ch.is_ascii_digit());

    parts.iter().all(|part| masked(part) || numeric(part)) && parts.iter().any(|part| masked(part))
}

fn octets(candidate: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = candidate.split('.').collect();
    let well_formed = parts.len() == 4
        && parts
            .iter()
            .all(|part| (1..=3).contains(&part.len()) && part.is_ascii());
    well_formed.then_some(parts)
}

fn padded_ipv4_id(address: &str) -> String {
    address
        .split('.')
        .map(|octet| format!("{octet:0>3}"))
        .collect()
}

fn synthetic(kind: EditorKind, user: &str, raw: &RawRevision) -> EditorIdentity {
    let locator = match raw.revision_id {
        Some(revision_id) => revision_id.to_string(),
        None => raw.timestamp.clone().unwrap_or_default(),
    };
    let material = format!(
        "{}\n{}\n{}\n{}",
        kind.as_str(),
        user,
        raw.page_id.map(|id| id.to_string()).unwrap_or_default(),
        locator,
    );
    let hash = blake3_hex(material.as_bytes());
    let short = &hash[..SYNTHETIC_HASH_LEN];

    EditorIdentity {
        kind,
        name: format!("{}#{short}", kind.as_str()),
        id: short.to_owned(),
    }
}
