use log::trace;
use thiserror::Error;

use super::ast::{Command, Next, Pipeline};
use super::lexer::{Lexer, Token};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error near unexpected token `{operator}' at position {position}")]
    LeadingOperator { operator: String, position: usize },
    #[error("syntax error: `{operator}' at position {position} is not followed by a command")]
    TrailingOperator { operator: String, position: usize },
    #[error("syntax error: empty command")]
    EmptyCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Connector {
    And,
    Or,
}

/// Collects segments in order and links them once the whole line is read, so
/// the chain can only ever grow forwards.
#[derive(Default)]
struct ChainBuilder {
    segments: Vec<(Pipeline, Option<Connector>)>,
}

impl ChainBuilder {
    fn push(&mut self, segment: Pipeline) {
        self.segments.push((segment, None));
    }

    fn connect_last(&mut self, connector: Connector) {
        if let Some((_, slot)) = self.segments.last_mut() {
            *slot = Some(connector);
        }
    }

    fn build(self) -> Result<Pipeline, ParseError> {
        let mut tail: Option<Pipeline> = None;
        for (mut segment, connector) in self.segments.into_iter().rev() {
            segment.next = match (connector, tail.take()) {
                (Some(Connector::And), Some(next)) => Some(Next::And(Box::new(next))),
                (Some(Connector::Or), Some(next)) => Some(Next::Or(Box::new(next))),
                _ => None,
            };
            tail = Some(segment);
        }
        tail.ok_or(ParseError::EmptyCommand)
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
            position: 0,
        }
    }

    fn next_token(&mut self) {
        self.current_token = self.lexer.next_token();
        self.position += 1;
    }

    /// Conditional level: segments separated by `&&` / `||`, left to right.
    pub fn parse_line(&mut self) -> Result<Pipeline, ParseError> {
        let mut chain = ChainBuilder::default();
        let mut pending: Option<(Token, usize)> = None;

        loop {
            let mut segment = Vec::new();
            while !matches!(self.current_token, Token::And | Token::Or | Token::EOF) {
                segment.push(self.current_token.clone());
                self.next_token();
            }

            let operator = self.current_token.clone();
            let position = self.position;

            if segment.is_empty() {
                match (&pending, &operator) {
                    (_, Token::And | Token::Or) => {
                        return Err(ParseError::LeadingOperator {
                            operator: operator.to_string(),
                            position,
                        })
                    }
                    (Some((prev, prev_pos)), Token::EOF) => {
                        return Err(ParseError::TrailingOperator {
                            operator: prev.to_string(),
                            position: *prev_pos,
                        })
                    }
                    _ => return Err(ParseError::EmptyCommand),
                }
            }

            chain.push(parse_pipeline(&segment)?);

            match operator {
                Token::And => chain.connect_last(Connector::And),
                Token::Or => chain.connect_last(Connector::Or),
                _ => break,
            }
            pending = Some((operator, position));
            self.next_token();
        }

        chain.build()
    }
}

/// Pipeline level: split on `|`. Empty stages become commands with an empty
/// name and are rejected at execution time.
fn parse_pipeline(tokens: &[Token]) -> Result<Pipeline, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyCommand);
    }

    let commands = tokens
        .split(|token| *token == Token::Pipe)
        .map(parse_command)
        .collect();

    Ok(Pipeline::new(commands))
}

/// Command level: `<` / `>` take the following token as a path; a dangling
/// redirection operator is ignored, and so is a stray `&`.
fn parse_command(tokens: &[Token]) -> Command {
    let mut command = Command::default();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        match token {
            Token::RedirectOut => {
                if let Some(path) = iter.next() {
                    command.output = Some(path.to_string());
                }
            }
            Token::RedirectIn => {
                if let Some(path) = iter.next() {
                    command.input = Some(path.to_string());
                }
            }
            Token::Background => {
                trace!("ignoring `&' in command");
            }
            word => {
                if command.name.is_empty() {
                    command.name = word.to_string();
                } else {
                    command.args.push(word.to_string());
                }
            }
        }
    }

    command
}

/// Parses one input line into its conditional chain of pipelines.
pub fn parse(line: &str) -> Result<Pipeline, ParseError> {
    Parser::new(line).parse_line()
}
