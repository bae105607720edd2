use super::*;
use crate::ast::{ArrayValue, Blob, Field, Numeric, ObjectValue, TupleValue};
use crate::source;

/// Value grammar, dispatched on the first significant character.
pub(super) fn parse_value(p: &mut Parser) -> Parse<Value> {
    p.src.skip_whitespace();

    // ":=" is only legal between a key and its value.
    if p.src.is_operator(Operator::Assign) {
        p.error_here(ErrorCode::AssignmentNotAllowedHere);
        return Err(Failed);
    }

    match p.src.peek() {
        '{' => parse_object(p),
        '[' => parse_array(p),
        '(' => parse_tuple(p),
        '"' => parse_string(p),
        '@' | '`' => parse_blob(p),
        _ => parse_scalar(p),
    }
}

/// Literal keywords, numbers, and bare identifiers. The keyword literals
/// only match when not followed by an identifier character; `nullable`
/// tokenizes as a bare.
fn parse_scalar(p: &mut Parser) -> Parse<Value> {
    if p.src.is("null") && !source::is_bare_char(p.src.peek_at(4)) {
        p.src.consume_n(4);
        return Ok(Value::Null);
    }
    if p.src.is("true") && !source::is_bare_char(p.src.peek_at(4)) {
        p.src.consume_n(4);
        return Ok(Value::Boolean(true));
    }
    if p.src.is("false") && !source::is_bare_char(p.src.peek_at(5)) {
        p.src.consume_n(5);
        return Ok(Value::Boolean(false));
    }

    let c = p.src.peek();
    if c == '-' || c == '#' || source::is_digit(c) {
        return parse_number(p);
    }
    if source::is_alpha(c) {
        return parse_bare(p);
    }

    p.error_here(ErrorCode::UnexpectedToken);
    Err(Failed)
}

/// `{ field (","? field)* }` with at least one field and unique keys.
fn parse_object(p: &mut Parser) -> Parse<Value> {
    let start = p.src.position();
    p.src.consume(); // {
    p.src.skip_whitespace();

    if p.src.is_operator(Operator::RBrace) {
        p.error_here(ErrorCode::EmptyObjectNotAllowed);
        p.src.consume();
        return Err(Failed);
    }

    let mut fields: Vec<Field> = Vec::new();
    loop {
        if p.src.is_eof() {
            p.error_here(ErrorCode::ExpectedObjectClose);
            return Err(Failed);
        }

        let (line, col) = (p.src.line(), p.src.column());
        let key = match p.read_identifier() {
            Some(key) => key,
            None => {
                p.error(ErrorCode::ExpectedObjectField, line, col);
                p.recover_to(Operator::LBrace, Operator::RBrace);
                return Err(Failed);
            }
        };
        if source::is_keyword(&key) {
            p.error(ErrorCode::InvalidKeyInObject, line, col);
            p.recover_to(Operator::LBrace, Operator::RBrace);
            return Err(Failed);
        }

        let duplicate = fields.iter().any(|f| f.key == key);
        if duplicate {
            p.error(ErrorCode::DuplicateFieldInObject, line, col);
        }

        p.src.skip_whitespace();
        let attributes = match attributes::parse_attribute_block(p) {
            Ok(attrs) => attrs,
            Err(Failed) => {
                p.recover_to(Operator::LBrace, Operator::RBrace);
                return Err(Failed);
            }
        };
        p.src.skip_whitespace();

        if !p.src.is_operator(Operator::Assign) {
            p.error_here(ErrorCode::ExpectedAssign);
            p.recover_to(Operator::LBrace, Operator::RBrace);
            return Err(Failed);
        }
        p.src.consume_operator(Operator::Assign);
        p.src.skip_whitespace();

        let value = match parse_value(p) {
            Ok(value) => value,
            Err(Failed) => {
                p.recover_to(Operator::LBrace, Operator::RBrace);
                return Err(Failed);
            }
        };
        if !duplicate {
            fields.push(Field {
                key,
                attributes,
                value,
            });
        }

        p.src.skip_whitespace();
        if p.src.is_operator(Operator::Comma) {
            p.src.consume_operator(Operator::Comma);
            p.src.skip_whitespace();
        }
        if p.src.is_operator(Operator::RBrace) {
            break;
        }
    }
    p.src.consume(); // }

    let span = p.src.substring(start, p.src.position()).to_string();
    Ok(Value::Object(ObjectValue { fields, span }))
}

/// `[ (value ("," value)*)? ]` with commas required between elements, no
/// trailing comma, and empty allowed.
fn parse_array(p: &mut Parser) -> Parse<Value> {
    let start = p.src.position();
    p.src.consume(); // [
    p.src.skip_whitespace();

    let mut elements: Vec<Value> = Vec::new();
    loop {
        if p.src.is_eof() {
            p.error_here(ErrorCode::ExpectedArrayClose);
            return Err(Failed);
        }
        if p.src.is_operator(Operator::RBracket) {
            break;
        }

        let element = match parse_value(p) {
            Ok(value) => value,
            Err(Failed) => {
                p.recover_to(Operator::LBracket, Operator::RBracket);
                return Err(Failed);
            }
        };
        elements.push(element);

        p.src.skip_whitespace();
        if p.src.is_operator(Operator::RBracket) {
            break;
        }
        if p.src.is_eof() {
            p.error_here(ErrorCode::ExpectedArrayClose);
            return Err(Failed);
        }
        if !p.src.is_operator(Operator::Comma) {
            p.error_here(ErrorCode::MissingCommaInArray);
            p.recover_to(Operator::LBracket, Operator::RBracket);
            return Err(Failed);
        }
        p.src.consume_operator(Operator::Comma);
        p.src.skip_whitespace();
        if p.src.is_operator(Operator::RBracket) {
            p.error_here(ErrorCode::TrailingCommaInArray);
            p.src.consume();
            return Err(Failed);
        }
    }
    p.src.consume(); // ]

    let span = p.src.substring(start, p.src.position()).to_string();
    Ok(Value::Array(ArrayValue { elements, span }))
}

/// `( value ("," value)+ )` with arity at least two and commas required.
fn parse_tuple(p: &mut Parser) -> Parse<Value> {
    let start = p.src.position();
    p.src.consume(); // (
    p.src.skip_whitespace();

    if p.src.is_operator(Operator::RParen) {
        p.error_here(ErrorCode::EmptyTupleElement);
        p.src.consume();
        return Err(Failed);
    }

    let mut elements: Vec<Value> = Vec::new();
    loop {
        if p.src.is_eof() {
            p.error_here(ErrorCode::ExpectedTupleClose);
            return Err(Failed);
        }

        let element = match parse_value(p) {
            Ok(value) => value,
            Err(Failed) => {
                p.recover_to(Operator::LParen, Operator::RParen);
                return Err(Failed);
            }
        };
        elements.push(element);

        p.src.skip_whitespace();
        if p.src.is_operator(Operator::RParen) {
            break;
        }
        if p.src.is_eof() {
            p.error_here(ErrorCode::ExpectedTupleClose);
            return Err(Failed);
        }
        if !p.src.is_operator(Operator::Comma) {
            p.error_here(ErrorCode::ExpectedCommaInTuple);
            p.recover_to(Operator::LParen, Operator::RParen);
            return Err(Failed);
        }
        p.src.consume_operator(Operator::Comma);
        p.src.skip_whitespace();
    }

    let too_short = elements.len() < 2;
    if too_short {
        p.error_here(ErrorCode::TupleTooShort);
    }
    p.src.consume(); // )
    if too_short {
        return Err(Failed);
    }

    // "=>" has no meaning after a tuple; reserved and rejected. Look across
    // inline whitespace only so recovery never crosses a line.
    let mut offset = 0;
    while matches!(p.src.peek_at(offset), ' ' | '\t') {
        offset += 1;
    }
    if p.src.is_at(Operator::Rocket.symbol(), offset) {
        p.src.consume_n(offset);
        p.error_here(ErrorCode::RocketOpNotValid);
        p.src.consume_n(2);
        return Err(Failed);
    }

    let span = p.src.substring(start, p.src.position()).to_string();
    Ok(Value::Tuple(TupleValue { elements, span }))
}

/// `"` body `"` with escape decoding. Unknown escapes pass through with the
/// backslash preserved.
fn parse_string(p: &mut Parser) -> Parse<Value> {
    p.src.consume_operator(Operator::Quote);
    let mut out = String::new();
    loop {
        if p.src.is_eof() {
            p.error_here(ErrorCode::UnterminatedString);
            return Err(Failed);
        }
        let c = p.src.consume();
        match c {
            '"' => break,
            '\\' => match p.src.peek() {
                'n' => {
                    p.src.consume();
                    out.push('\n');
                }
                't' => {
                    p.src.consume();
                    out.push('\t');
                }
                'r' => {
                    p.src.consume();
                    out.push('\r');
                }
                '\\' => {
                    p.src.consume();
                    out.push('\\');
                }
                '"' => {
                    p.src.consume();
                    out.push('"');
                }
                // unknown escape: keep the backslash, the next character
                // flows through the loop untouched
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    Ok(Value::String(out))
}

/// `@ IDENT? \`` body `` ` `` or a bare `` ` `` for an untagged blob. The
/// body runs to the next unescaped backtick and is kept verbatim.
fn parse_blob(p: &mut Parser) -> Parse<Value> {
    let (line, col) = (p.src.line(), p.src.column());

    let mut tag = None;
    if p.src.is_operator(Operator::At) {
        p.src.consume();
        if let Some(id) = p.read_identifier() {
            if source::is_keyword(&id) {
                p.error(ErrorCode::AttributeIsKeyword, line, col);
                return Err(Failed);
            }
            tag = Some(id);
        }
    }

    if !p.src.is_operator(Operator::Backtick) {
        p.error(ErrorCode::ExpectedBacktick, line, col);
        return Err(Failed);
    }
    p.src.consume();

    let content_start = p.src.position();
    while !p.src.is_eof() {
        if p.src.is_operator(Operator::Backtick) && !p.src.is_escaped(p.src.position()) {
            break;
        }
        p.src.consume();
    }
    if p.src.is_eof() {
        p.error_here(ErrorCode::UnterminatedFreeform);
        return Err(Failed);
    }
    let content = p.src.substring(content_start, p.src.position()).to_string();
    p.src.consume(); // closing `

    Ok(Value::Blob(Blob { content, tag }))
}

/// Decimal with optional fraction/exponent, or `#`/`0x` hex. Underscores
/// are digit separators and discarded. Integer vs. float is decided by the
/// presence of a dot or exponent.
fn parse_number(p: &mut Parser) -> Parse<Value> {
    let (line, col) = (p.src.line(), p.src.column());

    let negative = if p.src.peek() == '-' {
        p.src.consume();
        true
    } else {
        false
    };

    if p.src.is("#") || p.src.is("0x") || p.src.is("0X") {
        return parse_hex(p, negative, line, col);
    }

    let mut digits = String::new();
    if negative {
        digits.push('-');
    }
    let mut has_digit = false;
    let mut is_float = false;

    while source::is_digit(p.src.peek()) || p.src.peek() == '_' {
        let c = p.src.consume();
        if c != '_' {
            digits.push(c);
            has_digit = true;
        }
    }

    if p.src.peek() == '.' {
        digits.push(p.src.consume());
        is_float = true;
        while source::is_digit(p.src.peek()) || p.src.peek() == '_' {
            let c = p.src.consume();
            if c != '_' {
                digits.push(c);
            }
        }
    }

    if p.src.peek() == 'e' || p.src.peek() == 'E' {
        digits.push(p.src.consume());
        is_float = true;
        if p.src.peek() == '+' || p.src.peek() == '-' {
            digits.push(p.src.consume());
        }
        if !source::is_digit(p.src.peek()) {
            p.error(ErrorCode::InvalidExponent, line, col);
            return Err(Failed);
        }
        while source::is_digit(p.src.peek()) || p.src.peek() == '_' {
            let c = p.src.consume();
            if c != '_' {
                digits.push(c);
            }
        }
    }

    if !has_digit {
        p.error(ErrorCode::InvalidNumber, line, col);
        return Err(Failed);
    }

    if is_float {
        match digits.parse::<f64>() {
            Ok(v) => Ok(Value::Numeric(Numeric::Float(v))),
            Err(_) => {
                p.error(ErrorCode::InvalidNumber, line, col);
                Err(Failed)
            }
        }
    } else {
        match digits.parse::<i64>() {
            Ok(v) => Ok(Value::Numeric(Numeric::Int(v))),
            Err(_) => {
                p.error(ErrorCode::InvalidNumber, line, col);
                Err(Failed)
            }
        }
    }
}

fn parse_hex(p: &mut Parser, negative: bool, line: usize, col: usize) -> Parse<Value> {
    let prefix_len = if p.src.is("#") { 1 } else { 2 };
    if !source::is_hex_digit(p.src.peek_at(prefix_len)) {
        p.error(ErrorCode::InvalidNumber, line, col);
        return Err(Failed);
    }
    p.src.consume_n(prefix_len);

    let mut digits = String::new();
    while source::is_hex_digit(p.src.peek()) || p.src.peek() == '_' {
        let c = p.src.consume();
        if c != '_' {
            digits.push(c);
        }
    }

    match i64::from_str_radix(&digits, 16) {
        Ok(v) => {
            let v = if negative { -v } else { v };
            Ok(Value::Numeric(Numeric::Int(v)))
        }
        Err(_) => {
            p.error(ErrorCode::InvalidNumber, line, col);
            Err(Failed)
        }
    }
}

/// Unquoted symbol, e.g. `stone` or `minecraft:diamond_sword`. Reserved
/// words are never bares.
fn parse_bare(p: &mut Parser) -> Parse<Value> {
    let (line, col) = (p.src.line(), p.src.column());
    match p.src.bare_literal() {
        Some(id) => {
            p.src.consume_str(id);
            if source::is_keyword(id) {
                p.error(ErrorCode::IdentifierIsKeyword, line, col);
                return Err(Failed);
            }
            Ok(Value::Bare(id.to_string()))
        }
        None => {
            p.error(ErrorCode::UnexpectedToken, line, col);
            Err(Failed)
        }
    }
}
