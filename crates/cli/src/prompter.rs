//! Terminal prompts for rendered wizard steps.
//!
//! The [`Prompter`] trait is the seam between the run loop and the
//! terminal; tests drive the loop with a scripted implementation instead.

use std::io::{BufRead, BufReader, Stdin, Stdout, Write};

use serde_json::Value;

use waypoint_wizard::{NavAction, RenderedStep};

/// What the user did at a prompt: an answer, or a navigation request.
#[derive(Debug, Clone)]
pub struct PromptReply {
    pub value: Option<Value>,
    pub nav: NavAction,
}

impl PromptReply {
    pub fn answer(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            nav: NavAction::Next,
        }
    }

    pub fn nav(nav: NavAction) -> Self {
        Self { value: None, nav }
    }
}

pub trait Prompter {
    /// Show a message that needs no answer.
    fn note(&mut self, title: Option<&str>, message: Option<&str>) -> anyhow::Result<()>;
    /// Wait for the user to proceed past a note or trigger an action.
    fn proceed(&mut self, label: &str, can_go_back: bool) -> anyhow::Result<PromptReply>;
    fn text(&mut self, step: &RenderedStep, can_go_back: bool) -> anyhow::Result<PromptReply>;
    fn confirm(&mut self, step: &RenderedStep, can_go_back: bool) -> anyhow::Result<PromptReply>;
    fn select(&mut self, step: &RenderedStep, can_go_back: bool) -> anyhow::Result<PromptReply>;
    fn multiselect(&mut self, step: &RenderedStep, can_go_back: bool)
    -> anyhow::Result<PromptReply>;
}

enum Input {
    Line(String),
    Nav(NavAction),
}

/// Line-oriented prompter over any reader/writer pair.
///
/// Reserved inputs: `back` pops to the previous step (when allowed) and
/// `exit` requests cancellation. EOF counts as `exit`.
pub struct TerminalPrompter<R, W> {
    reader: R,
    writer: W,
}

impl TerminalPrompter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self {
            reader: BufReader::new(std::io::stdin()),
            writer: std::io::stdout(),
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn header(&mut self, step: &RenderedStep) -> anyhow::Result<()> {
        if let Some(title) = &step.title {
            writeln!(self.writer, "\n{title}")?;
        }
        if let Some(message) = &step.message {
            writeln!(self.writer, "{message}")?;
        }
        Ok(())
    }

    fn read_input(&mut self, can_go_back: bool) -> anyhow::Result<Input> {
        write!(self.writer, "> ")?;
        self.writer.flush()?;
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(Input::Nav(NavAction::Cancel));
        }
        let trimmed = line.trim();
        match trimmed {
            "exit" => Ok(Input::Nav(NavAction::Cancel)),
            "back" if can_go_back => Ok(Input::Nav(NavAction::Back)),
            _ => Ok(Input::Line(trimmed.to_string())),
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn note(&mut self, title: Option<&str>, message: Option<&str>) -> anyhow::Result<()> {
        if let Some(title) = title {
            writeln!(self.writer, "\n{title}")?;
        }
        if let Some(message) = message {
            writeln!(self.writer, "{message}")?;
        }
        Ok(())
    }

    fn proceed(&mut self, label: &str, can_go_back: bool) -> anyhow::Result<PromptReply> {
        writeln!(self.writer, "[{label}: press Enter]")?;
        match self.read_input(can_go_back)? {
            Input::Nav(nav) => Ok(PromptReply::nav(nav)),
            Input::Line(_) => Ok(PromptReply::answer(Value::Null)),
        }
    }

    fn text(&mut self, step: &RenderedStep, can_go_back: bool) -> anyhow::Result<PromptReply> {
        self.header(step)?;
        let initial = step.initial_value.as_ref().and_then(Value::as_str);
        // Never echo prior answers to sensitive steps.
        if let Some(initial) = initial
            && !step.sensitive
        {
            writeln!(self.writer, "(default: {initial})")?;
        } else if let Some(placeholder) = &step.placeholder {
            writeln!(self.writer, "(e.g. {placeholder})")?;
        }
        match self.read_input(can_go_back)? {
            Input::Nav(nav) => Ok(PromptReply::nav(nav)),
            Input::Line(line) if line.is_empty() && initial.is_some() => Ok(PromptReply::answer(
                step.initial_value.clone().unwrap_or(Value::Null),
            )),
            Input::Line(line) => Ok(PromptReply::answer(line)),
        }
    }

    fn confirm(&mut self, step: &RenderedStep, can_go_back: bool) -> anyhow::Result<PromptReply> {
        self.header(step)?;
        let default = step
            .initial_value
            .as_ref()
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            writeln!(self.writer, "{hint}")?;
            match self.read_input(can_go_back)? {
                Input::Nav(nav) => return Ok(PromptReply::nav(nav)),
                Input::Line(line) => {
                    let answer = match line.to_ascii_lowercase().as_str() {
                        "" => Some(default),
                        "y" | "yes" => Some(true),
                        "n" | "no" => Some(false),
                        _ => None,
                    };
                    match answer {
                        Some(answer) => return Ok(PromptReply::answer(answer)),
                        None => writeln!(self.writer, "Please answer y or n.")?,
                    }
                },
            }
        }
    }

    fn select(&mut self, step: &RenderedStep, can_go_back: bool) -> anyhow::Result<PromptReply> {
        self.header(step)?;
        let options = step.options.clone().unwrap_or_default();
        loop {
            for (index, option) in options.iter().enumerate() {
                match &option.hint {
                    Some(hint) => {
                        writeln!(self.writer, "  {}. {} ({hint})", index + 1, option.label)?;
                    },
                    None => writeln!(self.writer, "  {}. {}", index + 1, option.label)?,
                }
            }
            match self.read_input(can_go_back)? {
                Input::Nav(nav) => return Ok(PromptReply::nav(nav)),
                Input::Line(line) => {
                    if line.is_empty()
                        && let Some(initial) = &step.initial_value
                    {
                        return Ok(PromptReply::answer(initial.clone()));
                    }
                    if let Some(option) = match_option(&options, &line) {
                        return Ok(PromptReply::answer(option.value.clone()));
                    }
                    writeln!(self.writer, "Pick one of the listed options.")?;
                },
            }
        }
    }

    fn multiselect(
        &mut self,
        step: &RenderedStep,
        can_go_back: bool,
    ) -> anyhow::Result<PromptReply> {
        self.header(step)?;
        let options = step.options.clone().unwrap_or_default();
        for (index, option) in options.iter().enumerate() {
            writeln!(self.writer, "  {}. {}", index + 1, option.label)?;
        }
        writeln!(self.writer, "(comma-separated, e.g. 1,3)")?;
        match self.read_input(can_go_back)? {
            Input::Nav(nav) => Ok(PromptReply::nav(nav)),
            Input::Line(line) => {
                let values: Vec<Value> = line
                    .split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .filter_map(|token| match_option(&options, token))
                    .map(|option| option.value.clone())
                    .collect();
                Ok(PromptReply::answer(Value::Array(values)))
            },
        }
    }
}

/// Match user input against an option by 1-based index, value, or label.
fn match_option<'a>(
    options: &'a [waypoint_wizard::StepOption],
    input: &str,
) -> Option<&'a waypoint_wizard::StepOption> {
    if let Ok(index) = input.parse::<usize>()
        && index >= 1
    {
        return options.get(index - 1);
    }
    options.iter().find(|option| {
        option.value.as_str().is_some_and(|v| v.eq_ignore_ascii_case(input))
            || option.label.eq_ignore_ascii_case(input)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {serde_json::json, waypoint_wizard::StepKind};

    use super::*;

    fn step(kind: StepKind) -> RenderedStep {
        RenderedStep {
            id: "s".into(),
            kind,
            title: Some("Title".into()),
            message: None,
            options: None,
            initial_value: None,
            placeholder: None,
            sensitive: false,
            executor: None,
        }
    }

    fn prompter(input: &str) -> TerminalPrompter<std::io::Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompter::new(std::io::Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn empty_text_input_uses_the_default() {
        let mut step = step(StepKind::Text);
        step.initial_value = Some(json!("Waypoint"));
        let reply = prompter("\n").text(&step, false).unwrap();
        assert_eq!(reply.value, Some(json!("Waypoint")));
        assert_eq!(reply.nav, NavAction::Next);
    }

    #[test]
    fn back_keyword_navigates_when_allowed() {
        let step = step(StepKind::Text);
        let reply = prompter("back\n").text(&step, true).unwrap();
        assert_eq!(reply.nav, NavAction::Back);

        // Without back available it is a literal answer.
        let reply = prompter("back\n").text(&step, false).unwrap();
        assert_eq!(reply.value, Some(json!("back")));
    }

    #[test]
    fn exit_and_eof_request_cancellation() {
        let step = step(StepKind::Text);
        assert_eq!(
            prompter("exit\n").text(&step, false).unwrap().nav,
            NavAction::Cancel,
        );
        assert_eq!(
            prompter("").text(&step, false).unwrap().nav,
            NavAction::Cancel,
        );
    }

    #[test]
    fn sensitive_defaults_are_not_echoed() {
        let mut step = step(StepKind::Text);
        step.sensitive = true;
        step.initial_value = Some(json!("s3cret"));
        let mut p = prompter("\n");
        p.text(&step, false).unwrap();
        let output = String::from_utf8(p.writer).unwrap();
        assert!(!output.contains("s3cret"));
    }

    #[test]
    fn confirm_parses_yes_no_and_default() {
        let mut step = step(StepKind::Confirm);
        step.initial_value = Some(json!(true));
        assert_eq!(
            prompter("\n").confirm(&step, false).unwrap().value,
            Some(json!(true)),
        );
        assert_eq!(
            prompter("n\n").confirm(&step, false).unwrap().value,
            Some(json!(false)),
        );
        // Garbage reprompts until parseable.
        assert_eq!(
            prompter("what\nyes\n").confirm(&step, false).unwrap().value,
            Some(json!(true)),
        );
    }

    #[test]
    fn multiselect_accepts_indices_and_values() {
        let mut step = step(StepKind::MultiSelect);
        step.options = Some(vec![
            waypoint_wizard::StepOption::new("identity", "Identity"),
            waypoint_wizard::StepOption::new("workspace", "Workspace"),
            waypoint_wizard::StepOption::new("gateway", "Gateway"),
        ]);
        let reply = prompter("1, gateway\n").multiselect(&step, false).unwrap();
        assert_eq!(reply.value, Some(json!(["identity", "gateway"])));
    }
}
