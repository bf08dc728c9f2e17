// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use nom::branch::alt;
use nom::bytes::complete::{take_till, take_till1};
use nom::character::complete::char;
use nom::{sequence::delimited, IResult};

pub(crate) fn parse_double_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c: char| c == '"'), char('"'))(input)
}

pub(crate) fn parse_single_quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('\''), take_till(|c: char| c == '\''), char('\''))(input)
}

pub(crate) fn parse_bare(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace() || c == '"' || c == '\'')(input)
}

pub(crate) fn parse_token(input: &str) -> IResult<&str, &str> {
    alt((parse_double_quoted, parse_single_quoted, parse_bare))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quoted() {
        let parsed = parse_double_quoted("\"Louie's Pizza\" BTL");
        let expected = (" BTL", "Louie's Pizza");

        assert_eq!(parsed, Ok(expected));

        let parsed = parse_single_quoted("'Chili\"s' x");
        let expected = (" x", "Chili\"s");

        assert_eq!(parsed, Ok(expected));

        assert!(parse_double_quoted("\"never closed").is_err());
    }

    #[test]
    fn test_parse_bare() {
        let parsed = parse_bare("add-user bob");
        let expected = (" bob", "add-user");

        assert_eq!(parsed, Ok(expected));
        assert!(parse_bare(" leading").is_err());
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("\"\" rest"), Ok((" rest", "")));
        assert_eq!(parse_token("1/2/21"), Ok(("", "1/2/21")));
    }
}
