use std::fmt;

use services::sessions::{Feedback, ItemView, ScoreDisplay, SessionView};

use crate::commands::choice_label;

/// Plain-text rendering of a [`SessionView`].
pub struct Screen<'v, 'a>(pub &'v SessionView<'a>);

impl fmt::Display for Screen<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "{}", view.title)?;
        write!(f, "Progress: {} ({}%)", view.counter, view.progress_percent)?;
        match view.score {
            ScoreDisplay::NoScoreYet | ScoreDisplay::Hidden => {}
            visible @ ScoreDisplay::Visible { .. } => write!(f, "  {}", visible.label())?,
        }
        if let Some(timer) = &view.timer {
            write!(f, "  Time left: {timer}")?;
        }
        writeln!(f)?;

        for item in &view.items {
            writeln!(f)?;
            write_item(f, item)?;
        }

        writeln!(f)?;
        write!(f, "[mode: {}]", view.mode_button_label())?;
        if view.reveal_enabled {
            write!(f, "  [reveal]")?;
        }
        write!(f, "  [reset]  [export]")
    }
}

fn write_item(f: &mut fmt::Formatter<'_>, item: &ItemView<'_>) -> fmt::Result {
    writeln!(f, "{}. {}", item.number, item.stem)?;

    let (selected, answer) = match item.feedback {
        Feedback::Unanswered => (None, None),
        Feedback::Selected { choice } => (Some(choice), None),
        Feedback::Graded { choice, answer, .. } => (Some(choice), Some(answer)),
        Feedback::Revealed { selected, answer, .. } => (selected, Some(answer)),
    };
    for (idx, text) in item.choices.iter().enumerate() {
        let marker = match (selected == Some(idx), answer == Some(idx)) {
            (true, true) => "=>",
            (true, false) => " *",
            (false, true) => " +",
            (false, false) => "  ",
        };
        writeln!(f, "  {marker} {}) {text}", choice_label(idx))?;
    }

    match item.feedback {
        Feedback::Graded {
            correct: true,
            explain,
            ..
        } => {
            writeln!(f, "     Correct.")?;
            write_explain(f, explain)?;
        }
        Feedback::Graded {
            correct: false,
            answer,
            explain,
            ..
        }
        | Feedback::Revealed {
            answer, explain, ..
        } => {
            let text = item.choices.get(answer).map_or("", String::as_str);
            let lead = if matches!(item.feedback, Feedback::Graded { .. }) {
                "Incorrect. "
            } else {
                ""
            };
            writeln!(f, "     {lead}Answer: {}) {text}", choice_label(answer))?;
            write_explain(f, explain)?;
        }
        Feedback::Unanswered | Feedback::Selected { .. } => {}
    }
    Ok(())
}

fn write_explain(f: &mut fmt::Formatter<'_>, explain: Option<&str>) -> fmt::Result {
    match explain {
        Some(text) => writeln!(f, "     {text}"),
        None => Ok(()),
    }
}
