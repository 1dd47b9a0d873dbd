use crate::error::ValidationError;
use quickpoll_models::{
    MAX_OPTIONS, MAX_OPTION_LENGTH, MAX_TIME_MINUTES, MIN_OPTIONS, OPTION_PREVIEW_LEN,
};

/// A creation request that passed every structural check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPoll {
    pub question: String,
    pub options: Vec<String>,
    pub minutes: i64,
}

/// Validate creation parameters. Checks run in a fixed order and the first
/// failure wins, so each rejection maps to exactly one reported error.
///
/// An option list with no usable labels falls back to Yes/No; the minimum
/// count only applies when options were explicitly supplied.
pub fn validate_poll(
    question: &str,
    options: &[String],
    duration: &str,
) -> Result<ValidatedPoll, ValidationError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }

    let supplied: Vec<String> = options
        .iter()
        .map(|opt| opt.trim().to_string())
        .filter(|opt| !opt.is_empty())
        .collect();
    let explicit = !supplied.is_empty();
    let options = if explicit {
        supplied
    } else {
        vec!["Yes".to_string(), "No".to_string()]
    };

    if options.len() > MAX_OPTIONS {
        return Err(ValidationError::TooManyOptions(options.len()));
    }
    if explicit && options.len() < MIN_OPTIONS {
        return Err(ValidationError::TooFewOptions);
    }

    for opt in &options {
        if opt.chars().count() > MAX_OPTION_LENGTH {
            let preview: String = opt.chars().take(OPTION_PREVIEW_LEN).collect();
            return Err(ValidationError::OptionTooLong(preview));
        }
    }

    if let Some(duplicate) = first_duplicate(&options) {
        return Err(ValidationError::DuplicateOption(duplicate));
    }

    let minutes = duration
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| *minutes > 0)
        .ok_or(ValidationError::InvalidDuration)?;
    if minutes > MAX_TIME_MINUTES {
        return Err(ValidationError::DurationTooLarge);
    }

    Ok(ValidatedPoll {
        question: question.to_string(),
        options,
        minutes,
    })
}

/// First label that repeats an earlier one, comparing case-insensitively and
/// scanning in list order.
fn first_duplicate(options: &[String]) -> Option<String> {
    for (index, opt) in options.iter().enumerate() {
        let lower = opt.to_lowercase();
        if options[..index]
            .iter()
            .any(|earlier| earlier.to_lowercase() == lower)
        {
            return Some(opt.clone());
        }
    }
    None
}
