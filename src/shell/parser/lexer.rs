use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    Word(String),
    Pipe,
    Background,
    And,
    Or,
    RedirectIn,
    RedirectOut,
    EOF,
}

impl Token {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Word(word) => word,
            Token::Pipe => "|",
            Token::Background => "&",
            Token::And => "&&",
            Token::Or => "||",
            Token::RedirectIn => "<",
            Token::RedirectOut => ">",
            Token::EOF => "",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Lexer<'a> {
    input: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.chars().peekable(),
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.peek_char() {
            None => Token::EOF,
            Some(c) => match c {
                '|' => {
                    self.read_char();
                    if self.peek_char() == Some('|') {
                        self.read_char();
                        Token::Or
                    } else {
                        Token::Pipe
                    }
                }
                '&' => {
                    self.read_char();
                    if self.peek_char() == Some('&') {
                        self.read_char();
                        Token::And
                    } else {
                        Token::Background
                    }
                }
                '<' => {
                    self.read_char();
                    Token::RedirectIn
                }
                '>' => {
                    self.read_char();
                    Token::RedirectOut
                }
                _ => self.read_word(),
            },
        }
    }

    fn read_char(&mut self) -> Option<char> {
        self.input.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.read_char();
        }
    }

    // Quotes and backslashes stay in the word; echo interprets them later.
    fn read_word(&mut self) -> Token {
        let mut word = String::new();

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || "<>|&".contains(c) {
                break;
            }
            word.push(c);
            self.read_char();
        }

        Token::Word(word)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.next_token() {
            Token::EOF => None,
            token => Some(token),
        }
    }
}

/// Splits a line into its flat token sequence.
pub fn tokenize(line: &str) -> Vec<Token> {
    Lexer::new(line).collect()
}
