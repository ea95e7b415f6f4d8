//! Control-channel command parsing.
//!
//! The first whitespace-delimited token selects the command, compared
//! case-sensitively. For `add` and `delete` the keyword is every remaining
//! token joined with single spaces.

/// Help text posted in reply to `help`.
pub const HELP_TEXT: &str = "Commands:\n\
    • `add <keyword>` start forwarding source messages containing <keyword>\n\
    • `get` list the current keywords\n\
    • `delete <keyword>` stop forwarding on <keyword>\n\
    • `help` show this message";

/// A parsed control-channel command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Get,
    Delete(String),
    Help,
    None,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let mut words = text.split_whitespace();
        let Some(verb) = words.next() else {
            return Self::None;
        };

        match verb {
            "add" => Self::Add(words.collect::<Vec<_>>().join(" ")),
            "get" => Self::Get,
            "delete" => Self::Delete(words.collect::<Vec<_>>().join(" ")),
            "help" => Self::Help,
            _ => Self::None,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Get => "get",
            Self::Delete(_) => "delete",
            Self::Help => "help",
            Self::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_keeps_the_whole_tail() {
        assert_eq!(Command::parse("add foo bar"), Command::Add("foo bar".into()));
    }

    #[test]
    fn tail_is_rejoined_with_single_spaces() {
        assert_eq!(
            Command::parse("delete   release \t notes "),
            Command::Delete("release notes".into())
        );
    }

    #[test]
    fn bare_add_has_empty_keyword() {
        assert_eq!(Command::parse("add"), Command::Add(String::new()));
    }

    #[test]
    fn get_and_help_ignore_trailing_words() {
        assert_eq!(Command::parse("get"), Command::Get);
        assert_eq!(Command::parse("get everything"), Command::Get);
        assert_eq!(Command::parse("help me"), Command::Help);
    }

    #[test]
    fn verbs_are_case_sensitive() {
        assert_eq!(Command::parse("Add foo"), Command::None);
        assert_eq!(Command::parse("GET"), Command::None);
    }

    #[test]
    fn verb_must_be_the_first_token() {
        assert_eq!(Command::parse("please add foo"), Command::None);
        assert_eq!(Command::parse("adding foo"), Command::None);
    }

    #[test]
    fn empty_and_blank_text_is_none() {
        assert_eq!(Command::parse(""), Command::None);
        assert_eq!(Command::parse("   "), Command::None);
    }
}
