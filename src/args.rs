use crate::error::NamecardError;
use crate::types::{CardPayload, CardType, Gender, SocialInput};

/// Card fields accepted on the command line.
pub const CARD_FIELDS: &[&str] = &[
    "card_type",
    "gender",
    "nationality",
    "dob",
    "address",
    "phone",
    "web_site",
    "job",
    "bio",
    "company",
    "social",
];

/// Split a `key:value` or `key=value` argument. Surrounding quotes on the
/// value are removed; the value is otherwise kept verbatim so phone numbers
/// keep their leading zeros.
pub fn split_field(arg: &str) -> Result<(String, String), NamecardError> {
    let pos = arg
        .find([':', '='])
        .ok_or_else(|| {
            NamecardError::InvalidArgument(format!(
                "Cannot parse argument '{arg}': expected 'key:value' or 'key=value'"
            ))
        })?;
    let key = arg[..pos].trim();
    if key.is_empty() {
        return Err(NamecardError::InvalidArgument(format!(
            "Empty key in argument '{arg}'"
        )));
    }
    Ok((key.to_string(), unquote(arg[pos + 1..].trim()).to_string()))
}

fn unquote(raw: &str) -> &str {
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if quoted {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Apply field arguments on top of `base`.
///
/// `social` may be repeated; the first `social` argument replaces the
/// links carried over from `base`, later ones append.
pub fn apply_card_fields(mut base: CardPayload, args: &[String]) -> Result<CardPayload, NamecardError> {
    let mut social_replaced = false;
    for arg in args {
        let (key, value) = split_field(arg)?;
        let field = canonical_field(&key)?;
        let text = Some(value.clone()).filter(|v| !v.is_empty());
        match field {
            "card_type" => base.card_type = parse_card_type(&value)?,
            "gender" => base.gender = parse_gender(&value)?,
            "nationality" => base.nationality = text,
            "dob" => base.dob = text,
            "address" => base.address = text,
            "phone" => base.phone = text,
            "web_site" => base.web_site = text,
            "job" => base.job = text,
            "bio" => base.bio = text,
            "company" => base.company = text,
            "social" => {
                if !social_replaced {
                    base.social.clear();
                    social_replaced = true;
                }
                if !value.is_empty() {
                    base.social.push(parse_social(&value)?);
                }
            }
            other => {
                return Err(NamecardError::InvalidArgument(format!(
                    "Unknown card field '{other}'"
                )))
            }
        }
    }
    Ok(base)
}

fn canonical_field(key: &str) -> Result<&'static str, NamecardError> {
    let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
    let normalized = match normalized.as_str() {
        "type" | "cardtype" | "template" => "card_type".to_string(),
        "website" => "web_site".to_string(),
        _ => normalized,
    };
    if let Some(field) = CARD_FIELDS.iter().find(|f| **f == normalized) {
        return Ok(field);
    }
    let hint = suggest(&normalized, CARD_FIELDS)
        .map(|s| format!(" Did you mean '{s}'?"))
        .unwrap_or_default();
    Err(NamecardError::InvalidArgument(format!(
        "Unknown card field '{key}'.{hint}"
    )))
}

/// Parse a card template name, suggesting the closest one on a near miss.
pub fn parse_card_type(value: &str) -> Result<CardType, NamecardError> {
    value.parse::<CardType>().map_err(|err| {
        let names: Vec<&str> = CardType::ALL.iter().map(|t| t.as_str()).collect();
        match suggest(value, &names) {
            Some(s) => NamecardError::InvalidArgument(format!(
                "Unknown card type '{value}'. Did you mean '{s}'?"
            )),
            None => err,
        }
    })
}

fn parse_gender(value: &str) -> Result<Option<Gender>, NamecardError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "male" => Ok(Some(Gender::Male)),
        "female" => Ok(Some(Gender::Female)),
        other => Err(NamecardError::InvalidArgument(format!(
            "Unknown gender '{other}'. Expected 'male' or 'female'"
        ))),
    }
}

/// Parse `platform|url|icon`. The icon is optional.
pub fn parse_social(value: &str) -> Result<SocialInput, NamecardError> {
    let mut parts = value.split('|').map(str::trim);
    let platform = parts.next().unwrap_or_default();
    let url = parts.next().unwrap_or_default();
    let icon = parts.next().unwrap_or_default();
    if platform.is_empty() || url.is_empty() || parts.next().is_some() {
        return Err(NamecardError::InvalidArgument(format!(
            "Invalid social link '{value}': expected 'platform|url|icon'"
        )));
    }
    Ok(SocialInput {
        id: None,
        platform: platform.to_string(),
        icon: icon.to_string(),
        url: url.to_string(),
    })
}

/// Closest known name within a Levenshtein distance of 2, unless two names
/// tie for closest.
pub fn suggest(input: &str, known: &[&str]) -> Option<String> {
    let input = input.to_ascii_lowercase();
    let mut best_dist = usize::MAX;
    let mut best: Option<&str> = None;
    let mut ambiguous = false;

    for &candidate in known {
        let dist = strsim::levenshtein(&input, &candidate.to_ascii_lowercase());
        if dist < best_dist {
            best_dist = dist;
            best = Some(candidate);
            ambiguous = false;
        } else if dist == best_dist {
            ambiguous = true;
        }
    }

    if best_dist <= 2 && !ambiguous {
        best.map(str::to_string)
    } else {
        None
    }
}
