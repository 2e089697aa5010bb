//! Console input parsing

use replbridge_domain::Breakpoint;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain input: evaluated in the debuggee
    Evaluate(String),
    /// `:raw <text>`: sent verbatim, bypassing the dialect
    Raw(String),
    Backtrace,
    Next,
    Step,
    Finish,
    Continue,
    Pause,
    Variables,
    Break(Breakpoint),
    Breakpoints,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  <expression>        Evaluate in the debuggee
  :bt, :where         Stack trace
  :next, :n           Step over
  :step, :s           Step into
  :finish, :f         Step out
  :continue, :c       Resume the debuggee
  :pause              Interrupt the debuggee (if the dialect supports it)
  :vars               Local variables
  :break <file:line>  Set a breakpoint
  :breakpoints        List breakpoints set in this session
  :raw <text>         Send text verbatim
  :help, :h, :?       Show this help
  :quit, :exit, :q    Resume the debuggee, detach and exit";

impl ReplCommand {
    /// Parse a non-empty, trimmed input line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(ReplCommand::Evaluate(line.to_string()));
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "bt" | "where" | "backtrace" => ReplCommand::Backtrace,
            "next" | "n" => ReplCommand::Next,
            "step" | "s" => ReplCommand::Step,
            "finish" | "f" => ReplCommand::Finish,
            "continue" | "c" => ReplCommand::Continue,
            "pause" => ReplCommand::Pause,
            "vars" | "locals" => ReplCommand::Variables,
            "breakpoints" | "bps" => ReplCommand::Breakpoints,
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            "break" | "b" => {
                if arg.is_empty() {
                    return Err("Usage: :break <file>:<line>".to_string());
                }
                let location = Breakpoint::parse_location(arg).map_err(|e| e.to_string())?;
                ReplCommand::Break(location)
            }
            "raw" => {
                if arg.is_empty() {
                    return Err("Usage: :raw <text>".to_string());
                }
                ReplCommand::Raw(arg.to_string())
            }
            _ => {
                return Err(format!(
                    "Unknown command: :{}\nType :help for available commands",
                    name
                ));
            }
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_input_is_evaluated() {
        assert_eq!(
            ReplCommand::parse("user.name").unwrap(),
            ReplCommand::Evaluate("user.name".to_string())
        );
    }

    #[test]
    fn test_aliases() {
        assert_eq!(ReplCommand::parse(":bt").unwrap(), ReplCommand::Backtrace);
        assert_eq!(ReplCommand::parse(":where").unwrap(), ReplCommand::Backtrace);
        assert_eq!(ReplCommand::parse(":n").unwrap(), ReplCommand::Next);
        assert_eq!(ReplCommand::parse(":c").unwrap(), ReplCommand::Continue);
        assert_eq!(ReplCommand::parse(":q").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_break_parses_location() {
        let command = ReplCommand::parse(":break app/models/user.rb:42").unwrap();
        assert_eq!(
            command,
            ReplCommand::Break(Breakpoint::new(0, "app/models/user.rb", 42))
        );
        assert!(ReplCommand::parse(":break").is_err());
        assert!(ReplCommand::parse(":break nowhere").is_err());
    }

    #[test]
    fn test_raw_keeps_text() {
        assert_eq!(
            ReplCommand::parse(":raw  show-source  User#save").unwrap(),
            ReplCommand::Raw("show-source  User#save".to_string())
        );
        assert!(ReplCommand::parse(":raw").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = ReplCommand::parse(":frobnicate").unwrap_err();
        assert!(err.starts_with("Unknown command: :frobnicate"));
    }
}
