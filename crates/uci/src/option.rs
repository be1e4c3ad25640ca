//! UCI option parsing, validation, and formatting.

use crate::UciError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;

/// Words that start a new field in an `option` line.
const KEYWORDS: [&str; 6] = ["name", "type", "default", "min", "max", "var"];

/// Spelling of an empty string value.
const EMPTY: &str = "<empty>";

/// The kind of an option, with its kind-specific constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UciOptionKind {
    /// `true` or `false`.
    Check,
    /// An integer in `min..=max`.
    Spin { min: i64, max: i64 },
    /// One of a fixed list of strings.
    Combo { vars: Vec<String> },
    /// A trigger with no value.
    Button,
    /// Free text.
    String,
}

impl UciOptionKind {
    /// Name used after `type` in the definition line.
    pub fn name(&self) -> &'static str {
        match self {
            UciOptionKind::Check => "check",
            UciOptionKind::Spin { .. } => "spin",
            UciOptionKind::Combo { .. } => "combo",
            UciOptionKind::Button => "button",
            UciOptionKind::String => "string",
        }
    }
}

/// The value of an option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptionValue {
    /// Buttons have no value.
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::None => Ok(()),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// An engine option: its definition plus the current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UciOption {
    name: String,
    kind: UciOptionKind,
    default: OptionValue,
    value: OptionValue,
}

impl UciOption {
    /// Creates an option, checking the kind's constraints and the default.
    pub fn new(
        name: impl Into<String>,
        kind: UciOptionKind,
        default: OptionValue,
    ) -> Result<Self, UciError> {
        let name = name.into();
        if name.is_empty() {
            return Err(UciError::MissingName);
        }
        match &kind {
            UciOptionKind::Spin { min, max } if min > max => {
                return Err(UciError::InvalidBounds {
                    min: *min,
                    max: *max,
                });
            }
            UciOptionKind::Combo { vars } if vars.is_empty() => return Err(UciError::EmptyCombo),
            _ => {}
        }

        let mut option = UciOption {
            name,
            kind,
            default: OptionValue::None,
            value: OptionValue::None,
        };
        if option.kind != UciOptionKind::Button {
            option.check(&default)?;
            option.default = default.clone();
            option.value = default;
        }
        Ok(option)
    }

    /// Parses a definition line such as
    /// `option name Skill Level type spin default 20 min 0 max 20`.
    ///
    /// Fields may come in any order, and names and values run until the
    /// next keyword. The leading `option` word is optional.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.peek() == Some(&"option") {
            tokens.next();
        }

        let mut name = None;
        let mut kind = None;
        let mut default = None;
        let mut min = None;
        let mut max = None;
        let mut vars = Vec::new();

        while let Some(keyword) = tokens.next() {
            let words = read_words(&mut tokens);
            match keyword {
                "name" => name = Some(words),
                "type" => kind = Some(words),
                "default" => default = Some(words),
                "min" => min = Some(parse_int(&words)?),
                "max" => max = Some(parse_int(&words)?),
                "var" => vars.push(words),
                // Unknown fields are skipped along with their words.
                _ => {}
            }
        }

        let name = name.ok_or(UciError::MissingName)?;
        let kind = match kind.as_deref() {
            None => return Err(UciError::MissingType),
            Some("check") => UciOptionKind::Check,
            Some("spin") => UciOptionKind::Spin {
                min: min.unwrap_or(0),
                max: max.unwrap_or(-1),
            },
            Some("combo") => UciOptionKind::Combo { vars },
            Some("button") => UciOptionKind::Button,
            Some("string") => UciOptionKind::String,
            Some(other) => return Err(UciError::UnknownType(other.to_string())),
        };

        // Bounds and variants are known only now, since the default may
        // come before them.
        let default = match kind {
            UciOptionKind::Button => OptionValue::None,
            _ => parse_unchecked(&kind, default.as_deref().unwrap_or(""))?,
        };
        Self::new(name, kind, default)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &UciOptionKind {
        &self.kind
    }

    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    pub fn default_value(&self) -> &OptionValue {
        &self.default
    }

    /// Parses and validates a value without storing it.
    pub fn parse_value(&self, text: &str) -> Result<OptionValue, UciError> {
        let value = parse_unchecked(&self.kind, text)?;
        self.check(&value)?;
        Ok(value)
    }

    /// Sets the value after validating it; the old value stays on error.
    pub fn set_value(&mut self, value: OptionValue) -> Result<(), UciError> {
        self.check(&value)?;
        self.value = value;
        Ok(())
    }

    /// Parses, validates, and sets a value.
    pub fn set_value_from_str(&mut self, text: &str) -> Result<(), UciError> {
        self.value = self.parse_value(text)?;
        Ok(())
    }

    /// Restores the default value.
    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    /// The current value as text, `None` for buttons.
    pub fn value_string(&self) -> Option<String> {
        match self.kind {
            UciOptionKind::Button => None,
            _ => Some(self.value.to_string()),
        }
    }

    /// Renders the definition line.
    pub fn to_uci(&self) -> String {
        let mut line = format!("option name {} type {}", self.name, self.kind.name());
        if self.kind != UciOptionKind::Button {
            line.push_str(" default ");
            line.push_str(&text_or_empty(&self.default));
        }
        match &self.kind {
            UciOptionKind::Spin { min, max } => {
                line.push_str(&format!(" min {} max {}", min, max));
            }
            UciOptionKind::Combo { vars } => {
                for var in vars {
                    line.push_str(" var ");
                    line.push_str(var);
                }
            }
            _ => {}
        }
        line
    }

    /// The `setoption` command that sends the current value to an engine.
    pub fn set_option_command(&self) -> String {
        match self.kind {
            UciOptionKind::Button => format!("setoption name {}", self.name),
            _ => format!(
                "setoption name {} value {}",
                self.name,
                text_or_empty(&self.value)
            ),
        }
    }

    fn check(&self, value: &OptionValue) -> Result<(), UciError> {
        match (&self.kind, value) {
            (UciOptionKind::Button, _) => Err(UciError::ButtonHasNoValue),
            (UciOptionKind::Check, OptionValue::Bool(_)) => Ok(()),
            (UciOptionKind::Spin { min, max }, OptionValue::Int(n)) => {
                if (*min..=*max).contains(n) {
                    Ok(())
                } else {
                    Err(UciError::OutOfBounds {
                        value: *n,
                        min: *min,
                        max: *max,
                    })
                }
            }
            (UciOptionKind::Combo { vars }, OptionValue::Str(s)) => {
                if vars.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(UciError::UnknownVariant(s.clone()))
                }
            }
            (UciOptionKind::String, OptionValue::Str(_)) => Ok(()),
            (kind, value) => Err(UciError::InvalidValue {
                kind: kind.name(),
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for UciOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

/// Joins the words up to the next keyword.
fn read_words<'a, I>(tokens: &mut Peekable<I>) -> String
where
    I: Iterator<Item = &'a str>,
{
    let mut words = Vec::new();
    while let Some(word) = tokens.next_if(|w| !KEYWORDS.contains(w)) {
        words.push(word);
    }
    words.join(" ")
}

fn parse_int(text: &str) -> Result<i64, UciError> {
    text.parse().map_err(|_| UciError::InvalidValue {
        kind: "spin",
        value: text.to_string(),
    })
}

/// Converts text to the value type of `kind` without range checks.
fn parse_unchecked(kind: &UciOptionKind, text: &str) -> Result<OptionValue, UciError> {
    match kind {
        UciOptionKind::Check => match text {
            "true" => Ok(OptionValue::Bool(true)),
            "false" => Ok(OptionValue::Bool(false)),
            _ => Err(UciError::InvalidValue {
                kind: "check",
                value: text.to_string(),
            }),
        },
        UciOptionKind::Spin { .. } => parse_int(text).map(OptionValue::Int),
        UciOptionKind::Combo { .. } | UciOptionKind::String => {
            let text = if text == EMPTY { "" } else { text };
            Ok(OptionValue::Str(text.to_string()))
        }
        UciOptionKind::Button => Err(UciError::ButtonHasNoValue),
    }
}

fn text_or_empty(value: &OptionValue) -> String {
    match value {
        OptionValue::Str(s) if s.is_empty() => EMPTY.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_spin() {
        let option = UciOption::parse("option name Hash type spin default 16 min 1 max 1024").unwrap();
        assert_eq!(option.name(), "Hash");
        assert_eq!(option.kind(), &UciOptionKind::Spin { min: 1, max: 1024 });
        assert_eq!(option.default_value(), &OptionValue::Int(16));
        assert_eq!(option.value(), &OptionValue::Int(16));
    }

    #[test]
    fn parse_fields_in_any_order() {
        let option = UciOption::parse("option name Threads default 1 max 64 min 1 type spin").unwrap();
        assert_eq!(option.kind(), &UciOptionKind::Spin { min: 1, max: 64 });
        assert_eq!(option.value().as_int(), Some(1));
    }

    #[test]
    fn parse_multi_word_name_and_default() {
        let option =
            UciOption::parse("option name Book File type string default my book.bin").unwrap();
        assert_eq!(option.name(), "Book File");
        assert_eq!(option.value().as_str(), Some("my book.bin"));
    }

    #[test]
    fn parse_empty_string_default() {
        let option = UciOption::parse("option name NalimovPath type string default <empty>").unwrap();
        assert_eq!(option.value().as_str(), Some(""));
        assert_eq!(
            option.to_uci(),
            "option name NalimovPath type string default <empty>"
        );
    }

    #[test]
    fn parse_combo() {
        let line = "option name Style type combo default Normal var Solid var Normal var Risky";
        let option = UciOption::parse(line).unwrap();
        assert_eq!(
            option.kind(),
            &UciOptionKind::Combo {
                vars: vec!["Solid".into(), "Normal".into(), "Risky".into()]
            }
        );
        assert_eq!(option.to_uci(), line);
    }

    #[test]
    fn parse_check_and_button() {
        let ponder = UciOption::parse("option name Ponder type check default true").unwrap();
        assert_eq!(ponder.value().as_bool(), Some(true));

        let clear = UciOption::parse("option name Clear Hash type button").unwrap();
        assert_eq!(clear.value(), &OptionValue::None);
        assert_eq!(clear.value_string(), None);
        assert_eq!(clear.to_uci(), "option name Clear Hash type button");
        assert_eq!(clear.set_option_command(), "setoption name Clear Hash");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(UciOption::parse("option type check default true"), Err(UciError::MissingName));
        assert_eq!(UciOption::parse("option name Ponder default true"), Err(UciError::MissingType));
        assert_eq!(
            UciOption::parse("option name X type slider"),
            Err(UciError::UnknownType("slider".into()))
        );
        assert_eq!(
            UciOption::parse("option name Hash type spin default 16"),
            Err(UciError::InvalidBounds { min: 0, max: -1 })
        );
        assert_eq!(
            UciOption::parse("option name Style type combo default Normal"),
            Err(UciError::EmptyCombo)
        );
        assert!(matches!(
            UciOption::parse("option name Hash type spin default big min 1 max 8"),
            Err(UciError::InvalidValue { .. })
        ));
        assert_eq!(
            UciOption::parse("option name Hash type spin default 16 min 1 max 8"),
            Err(UciError::OutOfBounds { value: 16, min: 1, max: 8 })
        );
        assert_eq!(
            UciOption::parse("option name Style type combo default Wild var Solid"),
            Err(UciError::UnknownVariant("Wild".into()))
        );
        assert!(matches!(
            UciOption::parse("option name Ponder type check"),
            Err(UciError::InvalidValue { kind: "check", .. })
        ));
    }

    #[test]
    fn set_and_reset_values() {
        let mut option =
            UciOption::parse("option name Style type combo default Normal var Solid var Normal")
                .unwrap();
        option.set_value_from_str("Solid").unwrap();
        assert_eq!(option.value_string().as_deref(), Some("Solid"));
        assert_eq!(option.set_option_command(), "setoption name Style value Solid");

        assert_eq!(
            option.set_value_from_str("Wild"),
            Err(UciError::UnknownVariant("Wild".into()))
        );
        assert_eq!(option.value().as_str(), Some("Solid"));

        assert!(matches!(
            option.set_value(OptionValue::Int(3)),
            Err(UciError::InvalidValue { kind: "combo", .. })
        ));

        option.reset();
        assert_eq!(option.value().as_str(), Some("Normal"));
    }

    #[test]
    fn button_rejects_values() {
        let mut clear = UciOption::parse("option name Clear Hash type button").unwrap();
        assert_eq!(clear.set_value_from_str("1"), Err(UciError::ButtonHasNoValue));
        assert_eq!(clear.set_value(OptionValue::None), Err(UciError::ButtonHasNoValue));
    }

    #[test]
    fn new_checks_constraints() {
        assert_eq!(
            UciOption::new("", UciOptionKind::Check, OptionValue::Bool(false)),
            Err(UciError::MissingName)
        );
        assert_eq!(
            UciOption::new("Depth", UciOptionKind::Spin { min: 5, max: 1 }, OptionValue::Int(3)),
            Err(UciError::InvalidBounds { min: 5, max: 1 })
        );
        let option =
            UciOption::new("Depth", UciOptionKind::Spin { min: 1, max: 5 }, OptionValue::Int(3))
                .unwrap();
        assert_eq!(option.to_string(), "option name Depth type spin default 3 min 1 max 5");
    }

    #[test]
    fn definition_reparses_to_same_option() {
        let lines = [
            "option name Hash type spin default 16 min 1 max 1024",
            "option name Ponder type check default false",
            "option name Book File type string default <empty>",
            "option name Style type combo default Risky var Solid var Risky",
            "option name Clear Hash type button",
        ];
        for line in lines {
            let option = UciOption::parse(line).unwrap();
            assert_eq!(UciOption::parse(&option.to_uci()).unwrap(), option, "{line}");
        }
    }

    #[test]
    fn serde_keeps_kind_and_value() {
        let mut option = UciOption::parse("option name Hash type spin default 16 min 1 max 1024").unwrap();
        option.set_value(OptionValue::Int(64)).unwrap();
        let text = toml::to_string(&option).unwrap();
        let back: UciOption = toml::from_str(&text).unwrap();
        assert_eq!(back, option);
    }

    proptest! {
        #[test]
        fn spin_accepts_exactly_its_range(min in -1000i64..1000, span in 0i64..1000, value in -3000i64..3000) {
            let max = min + span;
            let line = format!("option name N type spin default {min} min {min} max {max}");
            let mut option = UciOption::parse(&line).unwrap();
            let result = option.set_value_from_str(&value.to_string());
            if (min..=max).contains(&value) {
                prop_assert_eq!(result, Ok(()));
                prop_assert_eq!(option.value(), &OptionValue::Int(value));
            } else {
                prop_assert_eq!(result, Err(UciError::OutOfBounds { value, min, max }));
                prop_assert_eq!(option.value(), &OptionValue::Int(min));
            }
        }
    }
}
