//! Filter expression parser
//!
//! Parses a compact text form of filter clauses, used by the CLI and by
//! query strings on the API.
//!
//! # Supported Syntax
//!
//! ```text
//! clause [AND clause ...]
//!
//! clause := field = value | field != value | field > value | field < value
//!         | field contains value | field not contains value
//!         | field between value..value
//!         | field in last <days>
//!         | field is null | field is not null
//! value  := 'quoted text' | number
//! ```
//!
//! # Examples
//!
//! ```text
//! status = 'Customer' AND tags contains 'VIP'
//! amount between 5000..15000
//! closeDate in last 30
//! completedAt is null
//! ```

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{map, map_res, opt, recognize, value},
    multi::separated_list1,
    sequence::{delimited, pair, separated_pair, tuple},
    IResult,
};

use crate::report::ast::{FilterClause, Operator};
use crate::report::error::{ReportError, ReportResult};
use crate::store::Value;

/// Parse an expression into filter clauses
pub fn parse_filter_expression(input: &str) -> ReportResult<Vec<FilterClause>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    match parse_clauses(input) {
        Ok((remaining, clauses)) => {
            if remaining.trim().is_empty() {
                Ok(clauses)
            } else {
                Err(ReportError::Parse(format!(
                    "Unexpected input after filter: '{}'",
                    remaining.trim()
                )))
            }
        }
        Err(e) => Err(ReportError::Parse(format!("Invalid filter '{}': {:?}", input, e))),
    }
}

fn parse_clauses(input: &str) -> IResult<&str, Vec<FilterClause>> {
    separated_list1(
        delimited(multispace1, tag_no_case("AND"), multispace1),
        parse_clause,
    )(input)
}

/// Parse a single clause
fn parse_clause(input: &str) -> IResult<&str, FilterClause> {
    let (input, field) = parse_identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, (operator, value)) = alt((
        parse_null_test,
        parse_in_last,
        parse_between,
        parse_contains,
        parse_comparison,
    ))(input)?;

    Ok((input, FilterClause::new(field, operator, value)))
}

/// "is null" / "is not null"
fn parse_null_test(input: &str) -> IResult<&str, (Operator, Value)> {
    let (input, _) = tag_no_case("is")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, negated) = opt(pair(tag_no_case("not"), multispace1))(input)?;
    let (input, _) = tag_no_case("null")(input)?;

    let op = if negated.is_some() {
        Operator::IsNotNull
    } else {
        Operator::IsNull
    };
    Ok((input, (op, Value::Null)))
}

/// "in last 30"
fn parse_in_last(input: &str) -> IResult<&str, (Operator, Value)> {
    let (input, _) = tuple((
        tag_no_case("in"),
        multispace1,
        tag_no_case("last"),
        multispace1,
    ))(input)?;
    let (input, days) = map_res(digit1, |s: &str| s.parse::<f64>())(input)?;
    Ok((input, (Operator::InTheLast, Value::Number(days))))
}

/// "between 5000..15000"
fn parse_between(input: &str) -> IResult<&str, (Operator, Value)> {
    let (input, _) = tag_no_case("between")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, (low, high)) = separated_pair(
        parse_bound,
        delimited(multispace0, tag(".."), multispace0),
        parse_bound,
    )(input)?;
    Ok((input, (Operator::Between, Value::List(vec![low, high]))))
}

fn parse_bound(input: &str) -> IResult<&str, String> {
    alt((parse_quoted_string, map(recognize_number, |s: &str| s.to_string())))(input)
}

/// "contains 'x'" / "not contains 'x'"
fn parse_contains(input: &str) -> IResult<&str, (Operator, Value)> {
    let (input, op) = alt((
        value(
            Operator::NotContains,
            tuple((tag_no_case("not"), multispace1, tag_no_case("contains"))),
        ),
        value(Operator::Contains, tag_no_case("contains")),
    ))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, v) = parse_value(input)?;
    Ok((input, (op, v)))
}

fn parse_comparison(input: &str) -> IResult<&str, (Operator, Value)> {
    let (input, op) = parse_operator(input)?;
    let (input, _) = multispace0(input)?;
    let (input, v) = parse_value(input)?;
    Ok((input, (op, v)))
}

/// Parse comparison operator
fn parse_operator(input: &str) -> IResult<&str, Operator> {
    alt((
        value(Operator::NotEquals, alt((tag("!="), tag("<>")))),
        value(Operator::Equals, alt((tag("=="), tag("=")))),
        value(Operator::GreaterThan, tag(">")),
        value(Operator::LessThan, tag("<")),
    ))(input)
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    alt((
        map(parse_quoted_string, Value::Text),
        map(parse_number, Value::Number),
    ))(input)
}

/// Parse field identifier (letters, digits, `_` and `.`)
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '.'),
    ))(input)
}

/// Parse quoted string
fn parse_quoted_string(input: &str) -> IResult<&str, String> {
    let (input, _) = char('\'')(input)?;
    let (input, content) = take_while(|c| c != '\'')(input)?;
    let (input, _) = char('\'')(input)?;
    Ok((input, content.to_string()))
}

fn recognize_number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

/// Parse floating point number
fn parse_number(input: &str) -> IResult<&str, f64> {
    map_res(recognize_number, |s: &str| s.parse::<f64>())(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_equals() {
        let clauses = parse_filter_expression("status = 'Customer'").unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].field, "status");
        assert_eq!(clauses[0].operator, Operator::Equals);
        assert_eq!(clauses[0].value, Value::from("Customer"));
    }

    #[test]
    fn test_parse_and_chain() {
        let clauses =
            parse_filter_expression("status = 'Customer' AND tags contains 'VIP' and amount > 100")
                .unwrap();
        assert_eq!(clauses.len(), 3);
        assert_eq!(clauses[1].operator, Operator::Contains);
        assert_eq!(clauses[1].value, Value::from("VIP"));
        assert_eq!(clauses[2].operator, Operator::GreaterThan);
        assert_eq!(clauses[2].value, Value::Number(100.0));
    }

    #[test]
    fn test_parse_keyword_operators() {
        let clauses = parse_filter_expression("email NOT CONTAINS 'example.com'").unwrap();
        assert_eq!(clauses[0].operator, Operator::NotContains);

        let clauses = parse_filter_expression("stage != 'Closed Lost'").unwrap();
        assert_eq!(clauses[0].operator, Operator::NotEquals);

        let clauses = parse_filter_expression("probability<50.5").unwrap();
        assert_eq!(clauses[0].operator, Operator::LessThan);
        assert_eq!(clauses[0].value, Value::Number(50.5));
    }

    #[test]
    fn test_parse_between() {
        let clauses = parse_filter_expression("amount between 5000..15000").unwrap();
        assert_eq!(clauses[0].operator, Operator::Between);
        assert_eq!(
            clauses[0].value,
            Value::List(vec!["5000".to_string(), "15000".to_string()])
        );

        let clauses =
            parse_filter_expression("closeDate between '2023-09-01' .. '2023-10-01'").unwrap();
        assert_eq!(
            clauses[0].value,
            Value::List(vec!["2023-09-01".to_string(), "2023-10-01".to_string()])
        );
    }

    #[test]
    fn test_parse_in_last_and_null_tests() {
        let clauses =
            parse_filter_expression("lastActivity in last 30 AND completedAt is null").unwrap();
        assert_eq!(clauses[0].operator, Operator::InTheLast);
        assert_eq!(clauses[0].value, Value::Number(30.0));
        assert_eq!(clauses[1].operator, Operator::IsNull);
        assert!(clauses[1].value.is_null());

        let clauses = parse_filter_expression("phone IS NOT NULL").unwrap();
        assert_eq!(clauses[0].operator, Operator::IsNotNull);
    }

    #[test]
    fn test_parse_empty_is_no_filters() {
        assert!(parse_filter_expression("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_trailing_input() {
        let err = parse_filter_expression("status = 'Lead' OR status = 'Partner'").unwrap_err();
        assert!(matches!(err, ReportError::Parse(_)));
        assert!(err.to_string().contains("OR status"));
    }

    #[test]
    fn test_parse_rejects_bare_words() {
        assert!(parse_filter_expression("status = Customer").is_err());
        assert!(parse_filter_expression("= 'x'").is_err());
        assert!(parse_filter_expression("amount between 5000").is_err());
    }
}
