//! Decoding of option values supplied with a command invocation

use std::collections::HashMap;

use chat_core::{
    Channel, CommandOptionType, DecodeError, DecodeResult, GuildMember, InteractionDataOption,
    ResolvedData, Role, Snowflake, User,
};
use serde_json::Value;
use tracing::trace;

/// A decoded command argument
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(User),
    /// A user that was only resolved as a guild member
    Member(GuildMember),
    Channel(Channel),
    Role(Role),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value; integers widen to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Member(member) => member.user.as_ref(),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            Self::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&Role> {
        match self {
            Self::Role(role) => Some(role),
            _ => None,
        }
    }
}

/// Decode the supplied options into values keyed by option name
///
/// Entity options (user, channel, role, mentionable) are looked up in
/// `resolved` by the id the option carries.
pub fn decode_options(
    options: &[InteractionDataOption],
    resolved: Option<&ResolvedData>,
) -> DecodeResult<HashMap<String, OptionValue>> {
    options
        .iter()
        .map(|option| {
            trace!(name = %option.name, kind = u8::from(option.kind), "Decoding option");
            Ok((option.name.clone(), decode_option(option, resolved)?))
        })
        .collect()
}

fn decode_option(option: &InteractionDataOption, resolved: Option<&ResolvedData>) -> DecodeResult<OptionValue> {
    match option.kind {
        CommandOptionType::String => match raw(option)? {
            Value::String(s) => Ok(OptionValue::String(s.clone())),
            other => Err(invalid(other, "expected a string")),
        },
        CommandOptionType::Integer => raw(option)?
            .as_i64()
            .map(OptionValue::Integer)
            .ok_or_else(|| invalid(&option.value, "expected an integer")),
        CommandOptionType::Number => raw(option)?
            .as_f64()
            .map(OptionValue::Number)
            .ok_or_else(|| invalid(&option.value, "expected a number")),
        CommandOptionType::Boolean => raw(option)?
            .as_bool()
            .map(OptionValue::Boolean)
            .ok_or_else(|| invalid(&option.value, "expected a boolean")),
        CommandOptionType::User => {
            let (id, resolved) = reference(option, resolved)?;
            lookup_user(id, resolved).ok_or_else(|| unresolved("users", id))
        }
        CommandOptionType::Channel => {
            let (id, resolved) = reference(option, resolved)?;
            resolved
                .channels
                .get(&id)
                .cloned()
                .map(OptionValue::Channel)
                .ok_or_else(|| unresolved("channels", id))
        }
        CommandOptionType::Role => {
            let (id, resolved) = reference(option, resolved)?;
            lookup_role(id, resolved).ok_or_else(|| unresolved("roles", id))
        }
        CommandOptionType::Mentionable => {
            let (id, resolved) = reference(option, resolved)?;
            lookup_user(id, resolved)
                .or_else(|| lookup_role(id, resolved))
                .ok_or_else(|| unresolved("users", id))
        }
        other => Err(DecodeError::UnknownOptionType(other.into())),
    }
}

/// Users take precedence over members
fn lookup_user(id: Snowflake, resolved: &ResolvedData) -> Option<OptionValue> {
    resolved
        .users
        .get(&id)
        .cloned()
        .map(OptionValue::User)
        .or_else(|| resolved.members.get(&id).cloned().map(OptionValue::Member))
}

fn lookup_role(id: Snowflake, resolved: &ResolvedData) -> Option<OptionValue> {
    resolved.roles.get(&id).cloned().map(OptionValue::Role)
}

fn raw(option: &InteractionDataOption) -> DecodeResult<&Value> {
    option.value.as_ref().ok_or(DecodeError::MissingField("value"))
}

/// The referenced id and the side-table it must be found in
fn reference<'a>(
    option: &InteractionDataOption,
    resolved: Option<&'a ResolvedData>,
) -> DecodeResult<(Snowflake, &'a ResolvedData)> {
    let id = DecodeError::from_value("option id", raw(option)?.clone())?;
    let resolved = resolved.ok_or(DecodeError::MissingField("resolved"))?;
    Ok((id, resolved))
}

fn invalid(value: &impl std::fmt::Debug, reason: &str) -> DecodeError {
    DecodeError::InvalidValue {
        field: "value",
        reason: format!("{reason}, got {value:?}"),
    }
}

fn unresolved(table: &'static str, id: Snowflake) -> DecodeError {
    DecodeError::Unresolved {
        table,
        id: id.to_string(),
    }
}
