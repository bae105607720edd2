use super::*;
use crate::ast::{Assignment, Attribute};
use crate::source;

/// Raw parse output, before the module artifact is assembled.
pub(super) struct ParsedSource {
    pub dialect: Dialect,
    pub attributes: Vec<Attribute>,
    pub statements: Vec<Assignment>,
}

/// Top-level grammar: `shebang? moduleAttr* stmt*`.
pub(super) fn parse_source(p: &mut Parser, hint: Option<Dialect>) -> ParsedSource {
    p.src.skip_whitespace();
    let dialect = detect_dialect(p, hint);
    p.src.skip_whitespace();

    // Module-level attribute blocks, concatenated in source order.
    let mut attributes = Vec::new();
    while p.src.is("@[") {
        match attributes::parse_attribute_block(p) {
            Ok(block) => attributes.extend(block),
            Err(Failed) => p.recover(),
        }
        p.src.skip_whitespace();
    }

    let mut statements: Vec<Assignment> = Vec::new();
    loop {
        p.src.skip_whitespace();
        if p.src.is_eof() {
            break;
        }

        if p.src.peek() == '#' && p.src.is_shebang() {
            stray_shebang(p);
            continue;
        }

        match parse_statement(p) {
            Ok(Some(stmt)) => statements.push(stmt),
            Ok(None) => {} // parsed but rejected (duplicate key)
            Err(Failed) => p.recover(),
        }
    }

    ParsedSource {
        dialect,
        attributes,
        statements,
    }
}

/// Dialect resolution: shebang wins, then the extension hint, then the
/// permissive default.
fn detect_dialect(p: &mut Parser, hint: Option<Dialect>) -> Dialect {
    if p.src.is_shebang() {
        p.has_shebang = true;
        let token = p.src.consume_n(5);
        return Dialect::from_shebang(token).unwrap_or_default();
    }
    hint.unwrap_or_default()
}

// A second shebang, or a first one below module content.
fn stray_shebang(p: &mut Parser) {
    let code = if p.has_shebang {
        ErrorCode::MultipleShebang
    } else {
        ErrorCode::ShebangAfterStatements
    };
    p.error_here(code);
    p.has_shebang = true;
    p.src.consume_n(5);
    p.recover();
}

/// `IDENT (":" IDENT)? ATTR_BLOCK? ":=" VALUE ","?`
///
/// Returns `Ok(None)` for a statement that parsed but re-bound an existing
/// top-level key; the duplicate is recorded and the first binding kept.
fn parse_statement(p: &mut Parser) -> Parse<Option<Assignment>> {
    let (line, col) = (p.src.line(), p.src.column());
    let key = match p.read_identifier() {
        Some(key) => key,
        None => {
            p.error(ErrorCode::UnexpectedToken, line, col);
            return Err(Failed);
        }
    };
    if source::is_keyword(&key) {
        p.error(ErrorCode::IdentifierIsKeyword, line, col);
        return Err(Failed);
    }

    let duplicate = !p.seen_keys.insert(key.clone());
    if duplicate {
        p.error(ErrorCode::DuplicateTopLevelKey, line, col);
    }

    p.src.skip_whitespace();

    // Optional inheritance clause: `key : Parent`. The bare ":" must not be
    // the head of ":=".
    let mut parent = None;
    if p.src.is_operator(Operator::Colon) && !p.src.is_operator(Operator::Assign) {
        p.src.consume();
        p.src.skip_whitespace();
        let (pline, pcol) = (p.src.line(), p.src.column());
        match p.read_identifier() {
            Some(name) if source::is_keyword(&name) => {
                p.error(ErrorCode::IdentifierIsKeyword, pline, pcol);
                return Err(Failed);
            }
            Some(name) => parent = Some(name),
            None => {
                p.error(ErrorCode::ExpectedIdentifier, pline, pcol);
                return Err(Failed);
            }
        }
        p.src.skip_whitespace();
    }

    let attributes = attributes::parse_attribute_block(p)?;
    p.src.skip_whitespace();

    if !p.src.is_operator(Operator::Assign) {
        p.error_here(ErrorCode::ExpectedAssign);
        return Err(Failed);
    }
    p.src.consume_operator(Operator::Assign);
    p.src.skip_whitespace();

    let value = value::parse_value(p)?;

    // Optional terminator between statements.
    p.src.skip_whitespace();
    if p.src.is_operator(Operator::Comma) {
        p.src.consume_operator(Operator::Comma);
    }

    if duplicate {
        return Ok(None);
    }
    Ok(Some(Assignment {
        key,
        attributes,
        value,
        parent,
    }))
}
