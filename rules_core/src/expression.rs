//! Placeholder resolution in description text
//!
//! Descriptions embed `${...}` expressions such as
//! `${perks.PerkID_Str.ScalingPerGearScore * 100}`. Tokens resolve from the
//! caller's context, from `resource.id.attribute` lookups into the game data,
//! or from the named constants `perkMultiplier` and `ConsumablePotency`.

use crate::data::{eq_ci, GameData};
use crate::modifier::perk_multiplier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Failure to resolve an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Unknown resource \"{resource}\" (for token \"{token}\" in text \"{text}\")")]
    UnknownResource {
        resource: String,
        token: String,
        text: String,
    },
    #[error("Object for ID \"{id}\" not found (for token \"{token}\" in text \"{text}\")")]
    ObjectNotFound { id: String, token: String, text: String },
    #[error("Object has no attribute \"{attribute}\" (for token \"{token}\" in text \"{text}\")")]
    NoAttribute {
        attribute: String,
        token: String,
        text: String,
    },
    #[error("Unresolved token \"{token}\" in text \"{text}\"")]
    UnresolvedToken { token: String, text: String },
    #[error("Invalid expression near \"{token}\" in text \"{text}\": {message}")]
    Syntax {
        message: String,
        token: String,
        text: String,
    },
}

/// Caller supplied values for token resolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionContext {
    pub char_level: u32,
    pub gear_score: f64,
    /// Perk or status effect the text belongs to
    pub item_id: Option<String>,
    /// Additional named numbers
    pub vars: BTreeMap<String, f64>,
}

/// Result of a token or sub-expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExprValue {
    Number(f64),
    Text(String),
}

impl ExprValue {
    fn from_text(text: &str) -> Self {
        match text.trim().parse::<f64>() {
            Ok(value) => ExprValue::Number(value),
            Err(_) => ExprValue::Text(text.to_string()),
        }
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExprValue::Number(value) => write!(f, "{value}"),
            ExprValue::Text(text) => f.write_str(text),
        }
    }
}

const CONST_PERK_MULTIPLIER: &str = "perkMultiplier";
const CONST_CONSUMABLE_POTENCY: &str = "ConsumablePotency";
/// Limit for nested parentheses and unary minus
const MAX_NESTING: usize = 64;

/// Resolves tokens against game data and a context
pub struct ExpressionResolver<'d> {
    db: &'d GameData,
    context: &'d ExpressionContext,
    text: &'d str,
}

impl<'d> ExpressionResolver<'d> {
    pub fn new(db: &'d GameData, context: &'d ExpressionContext, text: &'d str) -> Self {
        ExpressionResolver { db, context, text }
    }

    /// Value of one token
    pub fn resolve(&self, token: &str) -> Result<ExprValue, ExpressionError> {
        if let Some(value) = self.context_value(token) {
            return Ok(value);
        }
        if token.contains('.') {
            return self.resource_value(token);
        }
        self.constant_value(token)
    }

    fn context_value(&self, token: &str) -> Option<ExprValue> {
        let ctx = self.context;
        match token {
            "charLevel" => Some(ExprValue::Number(f64::from(ctx.char_level))),
            "gearScore" => Some(ExprValue::Number(ctx.gear_score)),
            "itemId" => ctx.item_id.clone().map(ExprValue::Text),
            _ => ctx.vars.get(token).copied().map(ExprValue::Number),
        }
    }

    fn resource_value(&self, token: &str) -> Result<ExprValue, ExpressionError> {
        let mut parts = token.splitn(3, '.');
        let resource = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        let attribute = parts.next().unwrap_or_default();

        let record = self.lookup(resource, id, token)?;
        let value = record
            .as_object()
            .and_then(|object| {
                object
                    .get(attribute)
                    .or_else(|| object.iter().find(|(key, _)| eq_ci(key, attribute)).map(|(_, it)| it))
            })
            .filter(|it| !it.is_null())
            .ok_or_else(|| ExpressionError::NoAttribute {
                attribute: attribute.to_string(),
                token: token.to_string(),
                text: self.text.to_string(),
            })?;

        let value = match value {
            serde_json::Value::Number(number) => return Ok(ExprValue::Number(number.as_f64().unwrap_or(0.0))),
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        match value.split_once('=') {
            Some((_, value)) => {
                tracing::debug!(token, value, "using value of key=value pair");
                Ok(ExprValue::from_text(value))
            }
            None => Ok(ExprValue::from_text(&value)),
        }
    }

    fn lookup(&self, resource: &str, id: &str, token: &str) -> Result<serde_json::Value, ExpressionError> {
        let db = self.db;
        let not_found = || ExpressionError::ObjectNotFound {
            id: id.to_string(),
            token: token.to_string(),
            text: self.text.to_string(),
        };
        let record = match resource.to_ascii_lowercase().as_str() {
            "perks" | "perk" => db.perks.get(id).map(serde_json::to_value),
            "affixes" | "affix" | "affixstats" => db.affixes.get(id).map(serde_json::to_value),
            "statuseffects" | "statuseffect" | "effects" => db.effects.get(id).map(serde_json::to_value),
            "abilities" | "ability" => db.abilities.get(id).map(serde_json::to_value),
            "items" | "item" => db.items.get(id).map(serde_json::to_value),
            "consumables" | "consumable" => db.consumables.get(id).map(serde_json::to_value),
            "weapons" | "weapon" => db.weapons.get(id).map(serde_json::to_value),
            "armors" | "armor" => db.armors.get(id).map(serde_json::to_value),
            "ammos" | "ammo" => db.ammos.get(id).map(serde_json::to_value),
            _ => {
                return Err(ExpressionError::UnknownResource {
                    resource: resource.to_string(),
                    token: token.to_string(),
                    text: self.text.to_string(),
                })
            }
        };
        record.and_then(Result::ok).ok_or_else(not_found)
    }

    fn constant_value(&self, token: &str) -> Result<ExprValue, ExpressionError> {
        let item_id = self.context.item_id.as_deref().unwrap_or_default();
        if token == CONST_PERK_MULTIPLIER {
            if let Some(perk) = self.db.perks.get(item_id) {
                return Ok(ExprValue::Number(perk_multiplier(perk, self.context.gear_score)));
            }
        } else if token == CONST_CONSUMABLE_POTENCY {
            let potency = self.db.effects.get(item_id).and_then(|it| it.potency_per_level);
            return match potency {
                Some(potency) => Ok(ExprValue::Number(potency * f64::from(self.context.char_level))),
                None => {
                    tracing::error!(token, item_id, text = self.text, "consumable potency not resolved");
                    Ok(ExprValue::Number(1.0))
                }
            };
        }
        Err(ExpressionError::UnresolvedToken {
            token: token.to_string(),
            text: self.text.to_string(),
        })
    }
}

// === Parsing ===

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    Open,
    Close,
}

fn tokenize(expr: &str, text: &str) -> Result<Vec<Token>, ExpressionError> {
    let syntax = |message: &str, token: &str| ExpressionError::Syntax {
        message: message.to_string(),
        token: token.to_string(),
        text: text.to_string(),
    };
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|it| it.is_ascii_digit())) {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let literal: String = chars[start..i].iter().collect();
            let value = literal.parse().map_err(|_| syntax("invalid number", &literal))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
        } else if matches!(c, '+' | '-' | '*' | '/') {
            tokens.push(Token::Op(c));
            i += 1;
        } else if c == '(' {
            tokens.push(Token::Open);
            i += 1;
        } else if c == ')' {
            tokens.push(Token::Close);
            i += 1;
        } else {
            return Err(syntax("unexpected character", &c.to_string()));
        }
    }
    Ok(tokens)
}

struct Parser<'p, 'd> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    resolver: &'p ExpressionResolver<'d>,
}

impl<'p, 'd> Parser<'p, 'd> {
    fn syntax(&self, message: &str) -> ExpressionError {
        let token = match self.tokens.get(self.pos) {
            Some(Token::Number(value)) => value.to_string(),
            Some(Token::Ident(name)) => name.clone(),
            Some(Token::Op(op)) => op.to_string(),
            Some(Token::Open) => "(".to_string(),
            Some(Token::Close) => ")".to_string(),
            None => String::new(),
        };
        ExpressionError::Syntax {
            message: message.to_string(),
            token,
            text: self.resolver.text.to_string(),
        }
    }

    fn number(&self, value: ExprValue) -> Result<f64, ExpressionError> {
        match value {
            ExprValue::Number(value) => Ok(value),
            ExprValue::Text(text) => Err(ExpressionError::Syntax {
                message: "not a number".to_string(),
                token: text,
                text: self.resolver.text.to_string(),
            }),
        }
    }

    fn expression(&mut self) -> Result<ExprValue, ExpressionError> {
        let mut left = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            let right = self.term()?;
            let (a, b) = (self.number(left)?, self.number(right)?);
            left = ExprValue::Number(if op == '+' { a + b } else { a - b });
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<ExprValue, ExpressionError> {
        let mut left = self.factor()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            let right = self.factor()?;
            let (a, b) = (self.number(left)?, self.number(right)?);
            left = ExprValue::Number(if op == '*' { a * b } else { a / b });
        }
        Ok(left)
    }

    fn enter(&mut self) -> Result<(), ExpressionError> {
        if self.depth >= MAX_NESTING {
            return Err(self.syntax("expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    fn factor(&mut self) -> Result<ExprValue, ExpressionError> {
        match self.tokens.get(self.pos).cloned() {
            Some(Token::Number(value)) => {
                self.pos += 1;
                Ok(ExprValue::Number(value))
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                self.resolver.resolve(&name)
            }
            Some(Token::Op('-')) => {
                self.enter()?;
                self.pos += 1;
                let value = self.factor()?;
                self.depth -= 1;
                Ok(ExprValue::Number(-self.number(value)?))
            }
            Some(Token::Open) => {
                self.enter()?;
                self.pos += 1;
                let value = self.expression()?;
                if self.tokens.get(self.pos) != Some(&Token::Close) {
                    return Err(self.syntax("expected ')'"));
                }
                self.pos += 1;
                self.depth -= 1;
                Ok(value)
            }
            _ => Err(self.syntax("expected a value")),
        }
    }
}

/// Evaluate a single expression without the `${}` wrapper
pub fn evaluate(expr: &str, resolver: &ExpressionResolver<'_>) -> Result<ExprValue, ExpressionError> {
    let mut parser = Parser {
        tokens: tokenize(expr, resolver.text)?,
        pos: 0,
        depth: 0,
        resolver,
    };
    let value = parser.expression()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.syntax("unexpected trailing input"));
    }
    Ok(value)
}

/// Replace every `${...}` placeholder of `text`
pub fn try_solve(db: &GameData, context: &ExpressionContext, text: &str) -> Result<String, ExpressionError> {
    let resolver = ExpressionResolver::new(db, context, text);
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| ExpressionError::Syntax {
            message: "unclosed placeholder".to_string(),
            token: after.to_string(),
            text: text.to_string(),
        })?;
        let value = evaluate(&after[..end], &resolver)?;
        result.push_str(&value.to_string());
        rest = &after[end + 1..];
    }
    result.push_str(rest);
    Ok(result)
}

/// Replace every `${...}` placeholder, falling back to the original text
pub fn solve(db: &GameData, context: &ExpressionContext, text: &str) -> String {
    match try_solve(db, context, text) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(error = %err, "expression fallback");
            text.to_string()
        }
    }
}
