use std::collections::HashSet;

use super::*;
use crate::ast::Attribute;
use crate::source;

/// `@[ key (= literal)? (, key (= literal)?)* ]`
///
/// Returns an empty list when the cursor is not at `@[`. Keys are unique
/// within the block; literals are scalar only.
pub(super) fn parse_attribute_block(p: &mut Parser) -> Parse<Vec<Attribute>> {
    if !p.src.is("@[") {
        return Ok(Vec::new());
    }
    let (open_line, open_col) = (p.src.line(), p.src.column());
    p.src.consume_n(2);
    p.src.skip_whitespace();

    let mut attrs: Vec<Attribute> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        if p.src.is_eof() {
            p.error(ErrorCode::ExpectedArrayClose, open_line, open_col);
            return Err(Failed);
        }
        if p.src.is_operator(Operator::RBracket) {
            break;
        }

        let (line, col) = (p.src.line(), p.src.column());
        let key = match p.read_identifier() {
            Some(key) => key,
            None => {
                p.error(ErrorCode::ExpectedIdentifier, line, col);
                p.recover_to(Operator::LBracket, Operator::RBracket);
                return Err(Failed);
            }
        };
        if source::is_keyword(&key) {
            p.error(ErrorCode::AttributeIsKeyword, line, col);
            p.recover_to(Operator::LBracket, Operator::RBracket);
            return Err(Failed);
        }

        let duplicate = !seen.insert(key.clone());
        if duplicate {
            p.error(ErrorCode::DuplicateAttributeKey, line, col);
        }

        p.src.skip_whitespace();
        let value = if p.src.consume_operator(Operator::Equal) {
            p.src.skip_whitespace();
            Some(parse_literal(p)?)
        } else {
            None // tag form
        };

        if !duplicate {
            attrs.push(Attribute { key, value });
        }

        p.src.skip_whitespace();
        if p.src.is_operator(Operator::RBracket) {
            break;
        }
        if p.src.is_eof() {
            p.error(ErrorCode::ExpectedArrayClose, open_line, open_col);
            return Err(Failed);
        }
        if !p.src.is_operator(Operator::Comma) {
            p.error_here(ErrorCode::MissingCommaInAttributes);
            p.recover_to(Operator::LBracket, Operator::RBracket);
            return Err(Failed);
        }
        p.src.consume_operator(Operator::Comma);
        p.src.skip_whitespace();
    }

    p.src.consume_operator(Operator::RBracket);
    Ok(attrs)
}

/// An attribute literal is any scalar value. Composites are rejected with
/// the cursor restored to the literal start.
fn parse_literal(p: &mut Parser) -> Parse<Value> {
    let (pos, line, col) = p.src.mark();
    let value = value::parse_value(p)?;
    match value {
        Value::Object(_) | Value::Array(_) | Value::Tuple(_) | Value::Blob(_) => {
            p.src.set_position(pos, line, col);
            p.error_here(ErrorCode::InvalidValueInAttribute);
            Err(Failed)
        }
        scalar => Ok(scalar),
    }
}
