use std::iter::Peekable;
use std::vec::IntoIter;

use porta_core::{AppError, AppResult};
use serde_json::{Number, Value};

use super::{ConditionOperator, TriggerCondition, TriggerFilter};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Word(String),
    Quoted(String),
}

/// Deepest parenthesised group accepted in a filter.
const MAX_NESTING_DEPTH: usize = 32;

pub(super) fn parse(text: &str) -> AppResult<TriggerFilter> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Ok(TriggerFilter::default());
    }

    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        depth: 0,
    };
    parser.parse_group(false)
}

fn tokenize(text: &str) -> AppResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&character) = chars.peek() {
        match character {
            _ if character.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '\'' => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            chars.next();
                            literal.push('\'');
                        }
                        Some('\'') => break,
                        Some(other) => literal.push(other),
                        None => {
                            return Err(AppError::Validation(
                                "unterminated string literal in filter".to_owned(),
                            ));
                        }
                    }
                }
                tokens.push(Token::Quoted(literal));
            }
            _ => {
                let mut word = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || next == '(' || next == ')' || next == '\'' {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    depth: usize,
}

impl Parser {
    fn parse_group(&mut self, nested: bool) -> AppResult<TriggerFilter> {
        let mut filter = TriggerFilter::default();

        loop {
            self.parse_term(&mut filter)?;

            match self.tokens.next() {
                None if nested => {
                    return Err(AppError::Validation(
                        "missing ')' in filter expression".to_owned(),
                    ));
                }
                None => return Ok(filter),
                Some(Token::Close) if nested => return Ok(filter),
                Some(Token::Close) => {
                    return Err(AppError::Validation(
                        "unexpected ')' in filter expression".to_owned(),
                    ));
                }
                Some(Token::Word(word)) if word.eq_ignore_ascii_case("and") => {}
                Some(Token::Word(word)) if word.eq_ignore_ascii_case("or") => {
                    return Err(AppError::Validation(
                        "'or' is not supported in action filters".to_owned(),
                    ));
                }
                Some(other) => {
                    return Err(AppError::Validation(format!(
                        "expected 'and' between filter conditions, found {}",
                        describe(&other)
                    )));
                }
            }
        }
    }

    fn parse_term(&mut self, filter: &mut TriggerFilter) -> AppResult<()> {
        match self.tokens.next() {
            Some(Token::Open) => {
                if self.depth >= MAX_NESTING_DEPTH {
                    return Err(AppError::Validation("filter nesting too deep".to_owned()));
                }

                self.depth += 1;
                let nested = self.parse_group(true)?;
                self.depth -= 1;
                filter.filters.push(nested);
                Ok(())
            }
            Some(Token::Word(attribute)) => {
                let operator = match self.tokens.next() {
                    Some(Token::Word(keyword)) => ConditionOperator::parse_transport(&keyword)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "unsupported filter operator '{keyword}' for '{attribute}'"
                            ))
                        })?,
                    other => {
                        return Err(AppError::Validation(format!(
                            "expected comparison operator after '{attribute}', found {}",
                            other.as_ref().map_or("end of input".to_owned(), describe)
                        )));
                    }
                };

                let value = match self.tokens.next() {
                    Some(Token::Quoted(literal)) => Value::String(literal),
                    Some(Token::Word(word)) => bare_literal(word),
                    other => {
                        return Err(AppError::Validation(format!(
                            "expected value after '{attribute}', found {}",
                            other.as_ref().map_or("end of input".to_owned(), describe)
                        )));
                    }
                };

                filter.conditions.push(TriggerCondition {
                    attribute,
                    operator,
                    values: vec![value],
                });
                Ok(())
            }
            other => Err(AppError::Validation(format!(
                "expected filter condition, found {}",
                other.as_ref().map_or("end of input".to_owned(), describe)
            ))),
        }
    }
}

fn bare_literal(word: String) -> Value {
    match word.as_str() {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(integer) = word.parse::<i64>() {
                return Value::Number(integer.into());
            }

            word.parse::<f64>()
                .ok()
                .filter(|_| word.contains('.'))
                .and_then(Number::from_f64)
                .map_or(Value::String(word), Value::Number)
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Open => "'('".to_owned(),
        Token::Close => "')'".to_owned(),
        Token::Word(word) => format!("'{word}'"),
        Token::Quoted(literal) => format!("string '{literal}'"),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use porta_core::AppError;

    use super::{MAX_NESTING_DEPTH, parse};
    use crate::trigger::{ActionTrigger, ConditionOperator};

    #[test]
    fn parses_portal_client_filter() {
        let filter = parse(concat!(
            "createdon ge 2024-08-03T15:27:41.000Z and operation eq 'porta_Greeter' ",
            "and inputs eq '{\"Text\":\"it''s {FullName}\"}'",
        ))
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(filter.conditions.len(), 3);
        assert_eq!(filter.conditions[0].operator, ConditionOperator::Ge);
        assert_eq!(
            filter.conditions[0].values,
            vec![json!("2024-08-03T15:27:41.000Z")]
        );

        let trigger = ActionTrigger::from_filter(&filter);
        assert_eq!(trigger.operation(), Some("porta_Greeter"));
        assert_eq!(trigger.inputs(), Some("{\"Text\":\"it's {FullName}\"}"));
    }

    #[test]
    fn parenthesized_groups_become_nested_filters() {
        let filter = parse(concat!(
            "(operation eq 'a' and contact_id eq 4121902e-0530-ef11-8409-6045bd9e7366) ",
            "and limit eq 5",
        ))
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(filter.filters.len(), 1);
        assert_eq!(filter.filters[0].conditions.len(), 2);
        assert_eq!(filter.conditions[0].values, vec![json!(5)]);
        assert!(ActionTrigger::from_filter(&filter).contact_id().is_some());
    }

    #[test]
    fn bare_keywords_map_to_json_literals() {
        let filter =
            parse("a eq null and b eq true and c eq 1.5").unwrap_or_else(|_| unreachable!());

        let values: Vec<_> = filter
            .conditions
            .iter()
            .map(|condition| condition.values[0].clone())
            .collect();
        assert_eq!(values, vec![json!(null), json!(true), json!(1.5)]);
    }

    #[test]
    fn deeply_nested_groups_are_rejected() {
        let depth = 10_000;
        let text = format!(
            "{}operation eq 'x'{}",
            "(".repeat(depth),
            ")".repeat(depth)
        );

        assert!(matches!(
            parse(&text),
            Err(AppError::Validation(message)) if message == "filter nesting too deep"
        ));
    }

    #[test]
    fn nesting_up_to_the_limit_is_accepted() {
        let text = format!(
            "{}operation eq 'x'{}",
            "(".repeat(MAX_NESTING_DEPTH),
            ")".repeat(MAX_NESTING_DEPTH)
        );

        let filter = parse(&text).unwrap_or_else(|_| unreachable!());
        assert_eq!(ActionTrigger::from_filter(&filter).operation(), Some("x"));
    }

    #[test]
    fn empty_filter_is_empty() {
        assert_eq!(parse("   ").map(|filter| filter.conditions.len()).ok(), Some(0));
    }

    #[test]
    fn rejects_or_and_malformed_input() {
        assert!(parse("operation eq 'a' or operation eq 'b'").is_err());
        assert!(parse("operation eq 'unterminated").is_err());
        assert!(parse("(operation eq 'a'").is_err());
        assert!(parse("operation eq 'a')").is_err());
        assert!(parse("operation contains 'a'").is_err());
        assert!(parse("operation eq").is_err());
    }

    proptest! {
        #[test]
        fn parser_never_panics(input in ".{0,64}") {
            let _ = parse(&input);
        }

        #[test]
        fn quoted_literals_survive_escaping(literal in "[^\\u{0}]{0,32}") {
            let escaped = literal.replace('\'', "''");
            let filter = parse(&format!("inputs eq '{escaped}'"));
            prop_assert_eq!(
                filter.ok().and_then(|value| {
                    value
                        .conditions
                        .first()
                        .map(|condition| condition.values.clone())
                }),
                Some(vec![json!(literal)])
            );
        }
    }
}
