//! Resolves which column is the response and which are explanatory variables.
//!
//! Accepted forms, given either as separate tokens or as one string:
//!
//! - `y ~ x1 + x2`
//! - `y ~ x1 x2`
//! - `y~x1+x2`
//! - `y ~` (intercept only)
//!
//! Shells expand a bare `~` to the home directory, so a token equal to `$HOME`
//! is read as the tilde.

use std::ffi::OsString;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("Expected '~' after the response variable, found '{0}'.")]
    ExpectedTilde(String),
    #[error("The formula has no response variable before '~'.")]
    MissingResponse,
    #[error("The formula contains more than one '~'.")]
    RepeatedTilde,
    #[error("The input table has no columns to build a default formula from.")]
    EmptyHeader,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub dependent: String,
    pub independent: Vec<String>,
}

impl Formula {
    /// First header column is the response; the remaining columns explain it.
    pub fn from_header(header: &[String]) -> Result<Self, FormulaError> {
        let (dependent, independent) = header.split_first().ok_or(FormulaError::EmptyHeader)?;
        Ok(Self {
            dependent: dependent.clone(),
            independent: independent.to_vec(),
        })
    }

    /// Parses formula tokens, treating a token equal to `home` as `~`.
    pub fn parse_with_home<S: AsRef<str>>(
        tokens: &[S],
        home: Option<&str>,
    ) -> Result<Self, FormulaError> {
        let normalized = tokens
            .iter()
            .map(|token| {
                let token = token.as_ref();
                if home.is_some_and(|home| !home.is_empty() && token == home) {
                    " ~ ".to_string()
                } else {
                    token.replace('~', " ~ ").replace('+', " + ")
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        let mut words = normalized.split_whitespace();
        let dependent = match words.next() {
            None | Some("~") => return Err(FormulaError::MissingResponse),
            Some(word) => word.to_string(),
        };
        match words.next() {
            Some("~") => {}
            Some(other) => return Err(FormulaError::ExpectedTilde(other.to_string())),
            None => return Err(FormulaError::ExpectedTilde(String::new())),
        }

        let mut independent: Vec<String> = Vec::new();
        for word in words {
            match word {
                "+" => continue,
                "~" => return Err(FormulaError::RepeatedTilde),
                name if independent.iter().any(|seen| seen == name) => {
                    log::warn!("Explanatory variable '{name}' listed more than once; using it once");
                }
                name => independent.push(name.to_string()),
            }
        }

        Ok(Self {
            dependent,
            independent,
        })
    }

    /// Parses formula tokens, reading `$HOME` as an expanded `~`.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, FormulaError> {
        let home: Option<OsString> = std::env::var_os("HOME");
        let home = home.as_ref().and_then(|home| home.to_str());
        Self::parse_with_home(tokens, home)
    }

    /// Uses the tokens when there are any, otherwise the header default.
    pub fn resolve<S: AsRef<str>>(tokens: &[S], header: &[String]) -> Result<Self, FormulaError> {
        if tokens.is_empty() {
            Self::from_header(header)
        } else {
            Self::parse(tokens)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parses_separate_tokens() {
        let formula = Formula::parse_with_home(&["y", "~", "x1", "+", "x2"], None).unwrap();
        assert_eq!(formula.dependent, "y");
        assert_eq!(formula.independent, names(&["x1", "x2"]));
    }

    #[test]
    fn parses_a_single_compact_string() {
        let formula = Formula::parse_with_home(&["y~x1+x2"], None).unwrap();
        assert_eq!(formula.dependent, "y");
        assert_eq!(formula.independent, names(&["x1", "x2"]));
    }

    #[test]
    fn plus_signs_are_optional() {
        let formula = Formula::parse_with_home(&["y ~ a b"], None).unwrap();
        assert_eq!(formula.independent, names(&["a", "b"]));
    }

    #[test]
    fn expanded_home_directory_counts_as_tilde() {
        let formula =
            Formula::parse_with_home(&["y", "/home/alex", "x1"], Some("/home/alex")).unwrap();
        assert_eq!(formula.dependent, "y");
        assert_eq!(formula.independent, names(&["x1"]));
    }

    #[test]
    fn intercept_only_formula_is_allowed() {
        let formula = Formula::parse_with_home(&["y", "~"], None).unwrap();
        assert!(formula.independent.is_empty());
    }

    #[test]
    fn repeated_names_are_kept_once() {
        let formula = Formula::parse_with_home(&["y ~ a + a + b"], None).unwrap();
        assert_eq!(formula.independent, names(&["a", "b"]));
    }

    #[test]
    fn malformed_formulas_are_rejected() {
        assert_eq!(
            Formula::parse_with_home(&["y", "x1"], None),
            Err(FormulaError::ExpectedTilde("x1".to_string()))
        );
        assert_eq!(
            Formula::parse_with_home(&["y"], None),
            Err(FormulaError::ExpectedTilde(String::new()))
        );
        assert_eq!(
            Formula::parse_with_home(&["~", "x"], None),
            Err(FormulaError::MissingResponse)
        );
        assert_eq!(
            Formula::parse_with_home(&["y ~ a ~ b"], None),
            Err(FormulaError::RepeatedTilde)
        );
    }

    #[test]
    fn default_formula_comes_from_the_header() {
        let header = names(&["price", "size", "age"]);
        let empty: [&str; 0] = [];
        let formula = Formula::resolve(&empty, &header).unwrap();
        assert_eq!(formula.dependent, "price");
        assert_eq!(formula.independent, names(&["size", "age"]));

        assert_eq!(
            Formula::from_header(&[]),
            Err(FormulaError::EmptyHeader)
        );
    }
}
