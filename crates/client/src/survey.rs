//! Onboarding questionnaire shown on first launch.

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
};

use crate::error::{AppError, Result};

pub struct Question {
    pub id: u32,
    pub question: &'static str,
    pub options: &'static [&'static str],
}

pub const QUESTIONS: [Question; 4] = [
    Question {
        id: 1,
        question: "What is your main goal?",
        options: &[
            "Save money",
            "Organize my finances",
            "Track my expenses",
            "Invest wisely",
        ],
    },
    Question {
        id: 2,
        question: "What kind of spender are you?",
        options: &[
            "I buy on impulse",
            "I plan my expenses",
            "I have steady fixed costs",
        ],
    },
    Question {
        id: 3,
        question: "Do you want financial advice?",
        options: &[
            "Yes, based on my data",
            "Only general advice",
            "No, I just want to see my transactions",
        ],
    },
    Question {
        id: 4,
        question: "Do you want budget alerts?",
        options: &[
            "Yes, notify me when I go over a limit",
            "Yes, but only monthly",
            "No, I don't need notifications",
        ],
    },
];

/// Asks every question in order; invalid choices are asked again.
pub fn run(input: &mut impl BufRead, output: &mut impl Write) -> Result<BTreeMap<u32, String>> {
    let mut answers = BTreeMap::new();

    for (step, question) in QUESTIONS.iter().enumerate() {
        writeln!(output, "Question {} / {}", step + 1, QUESTIONS.len())?;
        writeln!(output, "{}", question.question)?;
        for (index, option) in question.options.iter().enumerate() {
            writeln!(output, "  {}) {}", index + 1, option)?;
        }

        let choice = loop {
            write!(output, "> ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Err(AppError::Input("survey aborted".to_string()));
            }
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=question.options.len()).contains(&n) => break n - 1,
                _ => writeln!(output, "Pick a number between 1 and {}", question.options.len())?,
            }
        };

        answers.insert(question.id, question.options[choice].to_string());
    }

    Ok(answers)
}
