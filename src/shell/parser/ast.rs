/// One invocation unit. Pipe wiring is decided by its position in a [`Pipeline`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

/// Commands joined by `|`, plus at most one conditional continuation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    pub next: Option<Next>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Followed when the pipeline succeeds (`&&`).
    And(Box<Pipeline>),
    /// Followed when the pipeline fails (`||`).
    Or(Box<Pipeline>),
}

impl Pipeline {
    pub fn new(commands: Vec<Command>) -> Self {
        Self {
            commands,
            next: None,
        }
    }

    pub fn and_next(&self) -> Option<&Pipeline> {
        match &self.next {
            Some(Next::And(next)) => Some(next),
            _ => None,
        }
    }

    pub fn or_next(&self) -> Option<&Pipeline> {
        match &self.next {
            Some(Next::Or(next)) => Some(next),
            _ => None,
        }
    }

    /// Number of segments in the conditional chain starting here.
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut cur = self;
        while let Some(next) = cur.and_next().or_else(|| cur.or_next()) {
            len += 1;
            cur = next;
        }
        len
    }
}
