//! Unit expression parsing.
//!
//! Unit strings are split into tokens and reduced to a [`ParsedUnit`]: a
//! product of registered symbols raised to integer powers. Accepted spellings:
//!
//! - Exponents: `cm^-1`, `m**2`, `m2`, `s-1`
//! - Products: `kg m`, `kg*m`, `kg·m`
//! - Quotients: `rad/s`, `rad per s`, `1/s`
//! - Grouping: `(m/s)^2`
//!
//! # Grammar
//!
//! ```text
//! expression = product (('/' | 'per') product)*
//! product    = factor (('*' | '·')? factor)*
//! factor     = (symbol | '1' | '(' expression ')') power?
//! power      = ('^' | '**') '-'? integer | '-' integer | <attached digits>
//! ```

use super::dimensionality::Dimensionality;
use super::registry::{registry, UnitInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

/// Error type for unit parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty unit string")]
    EmptyUnit,
    #[error("unknown unit: '{0}'")]
    UnknownUnit(String),
    #[error("invalid exponent: '{0}'")]
    InvalidExponent(String),
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),
    /// The numeric part of a quantity string is malformed.
    #[error("invalid numeric expression: '{0}'")]
    InvalidNumber(String),
    #[error("parse failed: {0}")]
    ParseFailed(String),
}

/// A unit as registered symbols with non-zero integer exponents.
///
/// `rad/s` is `{rad: 1, s: -1}`. Symbols are kept as written, so `Hz` and
/// `1/s` are different (though compatible) units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedUnit {
    components: BTreeMap<String, i32>,
}

impl ParsedUnit {
    #[must_use]
    pub fn dimensionless() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    /// Builds a unit from symbol exponents, dropping zero exponents.
    #[must_use]
    pub fn from_components(components: BTreeMap<String, i32>) -> Self {
        let mut unit = Self::dimensionless();
        for (symbol, exponent) in components {
            unit.accumulate(&symbol, exponent);
        }
        unit
    }

    fn symbol(symbol: &str, exponent: i32) -> Self {
        let mut unit = Self::dimensionless();
        unit.accumulate(symbol, exponent);
        unit
    }

    fn accumulate(&mut self, symbol: &str, exponent: i32) {
        let total = self.components.get(symbol).copied().unwrap_or(0) + exponent;
        if total == 0 {
            self.components.remove(symbol);
        } else {
            self.components.insert(symbol.to_string(), total);
        }
    }

    /// Parses a unit expression.
    ///
    /// ```
    /// use csdm_core::units::parser::ParsedUnit;
    ///
    /// let unit = ParsedUnit::parse("cm^-1").unwrap();
    /// let unit2 = ParsedUnit::parse("1 / cm").unwrap();
    /// assert_eq!(unit, unit2);
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseError::EmptyUnit);
        }
        if input.eq_ignore_ascii_case("dimensionless") {
            return Ok(Self::dimensionless());
        }

        let mut parser = Parser {
            tokens: tokenize(input)?.into_iter().peekable(),
        };
        let unit = parser.expression()?;
        match parser.tokens.next() {
            None => Ok(unit),
            Some(token) => Err(ParseError::ParseFailed(format!(
                "unexpected {token} in '{input}'"
            ))),
        }
    }

    #[must_use]
    pub fn components(&self) -> &BTreeMap<String, i32> {
        &self.components
    }

    /// True for the explicit dimensionless unit. `ppm` has a component and
    /// is still physically dimensionless; see [`is_dimensionless`](Self::is_dimensionless).
    #[must_use]
    pub fn has_no_components(&self) -> bool {
        self.components.is_empty()
    }

    pub fn is_dimensionless(&self) -> Result<bool, ParseError> {
        Ok(self.dimensionality()?.is_dimensionless())
    }

    /// Physical dimensionality, looked up in the global registry.
    pub fn dimensionality(&self) -> Result<Dimensionality, ParseError> {
        self.fold_registry(Dimensionality::dimensionless(), |total, info, exponent| {
            total + info.dimensionality.pow(exponent as i8)
        })
    }

    /// Multiplier taking a value in this unit to SI base units.
    pub fn to_si_factor(&self) -> Result<f64, ParseError> {
        self.fold_registry(1.0, |factor, info, exponent| {
            factor * info.to_si_factor.powi(exponent)
        })
    }

    fn fold_registry<T>(
        &self,
        init: T,
        step: impl Fn(T, &UnitInfo, i32) -> T,
    ) -> Result<T, ParseError> {
        let registry = registry();
        self.components
            .iter()
            .try_fold(init, |acc, (symbol, &exponent)| {
                let info = registry
                    .lookup(symbol)
                    .ok_or_else(|| ParseError::UnknownUnit(symbol.clone()))?;
                Ok(step(acc, &info, exponent))
            })
    }

    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        self.combine(other, 1)
    }

    #[must_use]
    pub fn divide(&self, other: &Self) -> Self {
        self.combine(other, -1)
    }

    fn combine(&self, other: &Self, sign: i32) -> Self {
        let mut unit = self.clone();
        for (symbol, exponent) in &other.components {
            unit.accumulate(symbol, sign * exponent);
        }
        unit
    }

    #[must_use]
    pub fn pow(&self, exp: i32) -> Self {
        Self::from_components(
            self.components
                .iter()
                .map(|(symbol, exponent)| (symbol.clone(), exponent * exp))
                .collect(),
        )
    }

    /// Canonical spelling: positive powers, then ` / `, then negative powers,
    /// each group in symbol order. `rad/s` becomes `rad / s`, `s^-1` becomes
    /// `1 / s` and the dimensionless unit is `1`.
    #[must_use]
    pub fn normalized(&self) -> String {
        let spell = |(symbol, exponent): (&String, i32)| match exponent {
            1 => symbol.clone(),
            e => format!("{symbol}^{e}"),
        };
        let numerator: Vec<String> = self
            .components
            .iter()
            .filter(|(_, &e)| e > 0)
            .map(|(s, &e)| spell((s, e)))
            .collect();
        let denominator: Vec<String> = self
            .components
            .iter()
            .filter(|(_, &e)| e < 0)
            .map(|(s, &e)| spell((s, -e)))
            .collect();

        let numerator = if numerator.is_empty() {
            "1".to_string()
        } else {
            numerator.join(" ")
        };
        if denominator.is_empty() {
            numerator
        } else {
            format!("{numerator} / {}", denominator.join(" "))
        }
    }
}

impl fmt::Display for ParsedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Symbol(String),
    /// An unsigned integer; `attached` when it directly follows a symbol.
    Integer { value: i32, attached: bool },
    Minus,
    Power,
    Times,
    Divide,
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Symbol(s) => write!(f, "'{s}'"),
            Token::Integer { value, .. } => write!(f, "'{value}'"),
            Token::Minus => f.write_str("'-'"),
            Token::Power => f.write_str("'^'"),
            Token::Times => f.write_str("'*'"),
            Token::Divide => f.write_str("'/'"),
            Token::Open => f.write_str("'('"),
            Token::Close => f.write_str("')'"),
        }
    }
}

/// Micro sign and greek mu, both accepted as the micro prefix.
fn is_micro(c: char) -> bool {
    c == '\u{00B5}' || c == '\u{03BC}'
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_micro(c)
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            c if is_symbol_char(c) => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !is_symbol_char(c) {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let mut digits_end = end;
                while let Some(&(i, c)) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    digits_end = i + 1;
                    chars.next();
                }
                let word = &input[start..end];
                let digits = &input[end..digits_end];
                if !digits.is_empty() && registry().contains(&input[start..digits_end]) {
                    tokens.push(Token::Symbol(input[start..digits_end].to_string()));
                } else {
                    tokens.push(if word.eq_ignore_ascii_case("per") {
                        Token::Divide
                    } else {
                        Token::Symbol(word.to_string())
                    });
                    if !digits.is_empty() {
                        tokens.push(Token::Integer {
                            value: parse_integer(digits)?,
                            attached: true,
                        });
                    }
                }
            }
            c if c.is_ascii_digit() => {
                let mut end = start;
                while let Some(&(i, c)) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    end = i + 1;
                    chars.next();
                }
                tokens.push(Token::Integer {
                    value: parse_integer(&input[start..end])?,
                    attached: false,
                });
            }
            '*' => {
                chars.next();
                if chars.next_if(|&(_, c)| c == '*').is_some() {
                    tokens.push(Token::Power);
                } else {
                    tokens.push(Token::Times);
                }
            }
            other => {
                chars.next();
                tokens.push(match other {
                    '^' => Token::Power,
                    '\u{00B7}' => Token::Times,
                    '/' => Token::Divide,
                    '-' => Token::Minus,
                    '(' => Token::Open,
                    ')' => Token::Close,
                    _ => return Err(ParseError::UnexpectedChar(other)),
                });
            }
        }
    }
    Ok(tokens)
}

fn parse_integer(digits: &str) -> Result<i32, ParseError> {
    digits
        .parse()
        .map_err(|_| ParseError::InvalidExponent(digits.to_string()))
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    fn expression(&mut self) -> Result<ParsedUnit, ParseError> {
        let mut unit = self.product()?;
        while self.tokens.next_if_eq(&Token::Divide).is_some() {
            unit = unit.divide(&self.product()?);
        }
        Ok(unit)
    }

    fn product(&mut self) -> Result<ParsedUnit, ParseError> {
        let mut unit = self.factor()?;
        loop {
            if self.tokens.next_if_eq(&Token::Times).is_some() {
                unit = unit.multiply(&self.factor()?);
            } else if matches!(self.tokens.peek(), Some(Token::Symbol(_) | Token::Open)) {
                unit = unit.multiply(&self.factor()?);
            } else {
                return Ok(unit);
            }
        }
    }

    fn factor(&mut self) -> Result<ParsedUnit, ParseError> {
        let base = match self.tokens.next() {
            Some(Token::Symbol(symbol)) => ParsedUnit::symbol(&symbol, 1),
            Some(Token::Integer { value: 1, .. }) => return Ok(ParsedUnit::dimensionless()),
            Some(Token::Open) => {
                let inner = self.expression()?;
                if self.tokens.next() != Some(Token::Close) {
                    return Err(ParseError::ParseFailed(
                        "missing closing parenthesis".into(),
                    ));
                }
                inner
            }
            Some(token) => {
                return Err(ParseError::ParseFailed(format!(
                    "expected a unit symbol, found {token}"
                )))
            }
            None => return Err(ParseError::ParseFailed("expected a unit symbol".into())),
        };
        Ok(base.pow(self.power()?))
    }

    fn power(&mut self) -> Result<i32, ParseError> {
        let marked = self.tokens.next_if_eq(&Token::Power).is_some();
        let negative = self.tokens.next_if_eq(&Token::Minus).is_some();
        match self.tokens.peek() {
            Some(&Token::Integer { value, attached }) if marked || negative || attached => {
                self.tokens.next();
                Ok(if negative { -value } else { value })
            }
            _ if marked || negative => Err(ParseError::InvalidExponent(
                self.tokens
                    .peek()
                    .map_or_else(String::new, ToString::to_string),
            )),
            _ => Ok(1),
        }
    }
}
