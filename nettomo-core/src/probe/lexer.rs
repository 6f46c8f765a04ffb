use super::{ProbeParseError, ProbeRecord};
use crate::path::PathId;
use logos::{Lexer, Logos};

/// Tokens of a probe log line.
///
/// The receiver writes one Python `repr` tuple per packet, so the
/// grammar is limited to parenthesis, commas, single quoted strings and
/// numbers.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(super) enum Token {
    #[token("(")]
    Open,
    #[token(")")]
    Close,
    #[token(",")]
    Comma,
    #[regex(r"'[^']*'")]
    Str,
    #[regex("-?[0-9]+")]
    Int,
    #[regex(r"-?[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?")]
    #[regex(r"-?[0-9]+[eE][+-]?[0-9]+")]
    Float,
}

impl Token {
    fn describe(self) -> &'static str {
        match self {
            Token::Open => "`('",
            Token::Close => "`)'",
            Token::Comma => "`,'",
            Token::Str => "a quoted string",
            Token::Int => "an integer",
            Token::Float => "a number",
        }
    }
}

struct Parser<'s> {
    lex: Lexer<'s, Token>,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            lex: Token::lexer(source),
        }
    }

    fn next(&mut self, expected: &'static str) -> Result<Token, ProbeParseError> {
        match self.lex.next() {
            None => Err(ProbeParseError::UnexpectedEnd { expected }),
            Some(Err(())) => Err(ProbeParseError::InvalidToken {
                column: self.lex.span().start,
            }),
            Some(Ok(token)) => Ok(token),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ProbeParseError> {
        let token = self.next(expected.describe())?;
        if token != expected {
            return Err(self.unexpected(expected.describe()));
        }
        Ok(())
    }

    fn unexpected(&self, expected: &'static str) -> ProbeParseError {
        ProbeParseError::Unexpected {
            expected,
            found: self.lex.slice().to_owned(),
            column: self.lex.span().start,
        }
    }

    /// the content of a quoted string, without the quotes
    fn string(&mut self) -> Result<&'s str, ProbeParseError> {
        self.expect(Token::Str)?;
        let slice = self.lex.slice();
        Ok(&slice[1..slice.len() - 1])
    }

    fn integer<T>(&mut self, what: &'static str) -> Result<T, ProbeParseError>
    where
        T: std::str::FromStr,
    {
        self.expect(Token::Int)?;
        let slice = self.lex.slice();
        slice.parse().map_err(|_| ProbeParseError::InvalidNumber {
            what,
            value: slice.to_owned(),
        })
    }

    fn number(&mut self, what: &'static str) -> Result<f64, ProbeParseError> {
        let token = self.next(Token::Float.describe())?;
        if !matches!(token, Token::Int | Token::Float) {
            return Err(self.unexpected(Token::Float.describe()));
        }

        let slice = self.lex.slice();
        slice.parse().map_err(|_| ProbeParseError::InvalidNumber {
            what,
            value: slice.to_owned(),
        })
    }

    fn end(&mut self) -> Result<(), ProbeParseError> {
        match self.lex.next() {
            None => Ok(()),
            Some(_) => Err(ProbeParseError::Trailing {
                column: self.lex.span().start,
            }),
        }
    }
}

/// parse `(('<host>', <port>), '(<seq>, <send time>)', <receive time>)`
pub(super) fn parse_record(line: &str) -> Result<ProbeRecord, ProbeParseError> {
    let mut parser = Parser::new(line);

    parser.expect(Token::Open)?;
    parser.expect(Token::Open)?;
    let source_host = parser.string()?.to_owned();
    parser.expect(Token::Comma)?;
    let port: u32 = parser.integer("source port")?;
    parser.expect(Token::Close)?;
    parser.expect(Token::Comma)?;
    let payload = parser.string()?;
    parser.expect(Token::Comma)?;
    let receive_time = parser.number("receive time")?;
    parser.expect(Token::Close)?;
    parser.end()?;

    let (sequence, send_time) =
        parse_payload(payload).map_err(|error| ProbeParseError::Payload(Box::new(error)))?;

    Ok(ProbeRecord {
        source_host,
        path: PathId::new(port),
        sequence,
        send_time,
        receive_time,
    })
}

/// parse the probe payload `(<seq>, <send time>)`
fn parse_payload(payload: &str) -> Result<(u64, f64), ProbeParseError> {
    let mut parser = Parser::new(payload);

    parser.expect(Token::Open)?;
    let sequence = parser.integer("sequence number")?;
    parser.expect(Token::Comma)?;
    let send_time = parser.number("send time")?;
    parser.expect(Token::Close)?;
    parser.end()?;

    Ok((sequence, send_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logos_lexer() {
        let mut lex = Token::lexer("('10.0.0.1', 7) 1.5e3");

        assert_eq!(lex.next(), Some(Ok(Token::Open)));
        assert_eq!(lex.next(), Some(Ok(Token::Str)));
        assert_eq!(lex.slice(), "'10.0.0.1'");
        assert_eq!(lex.next(), Some(Ok(Token::Comma)));
        assert_eq!(lex.next(), Some(Ok(Token::Int)));
        assert_eq!(lex.next(), Some(Ok(Token::Close)));
        assert_eq!(lex.next(), Some(Ok(Token::Float)));
        assert_eq!(lex.slice(), "1.5e3");
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn payload() {
        assert_eq!(
            parse_payload("(12, 1487236862.123)").unwrap(),
            (12, 1487236862.123)
        );
    }

    #[test]
    fn payload_with_integer_time() {
        assert_eq!(parse_payload("(0, 5)").unwrap(), (0, 5.0));
    }

    #[test]
    fn negative_sequence_rejected() {
        assert!(matches!(
            parse_payload("(-1, 5.0)"),
            Err(ProbeParseError::InvalidNumber {
                what: "sequence number",
                ..
            })
        ));
    }
}
