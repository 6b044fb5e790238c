//! Human-readable replies for extracted or rejected instructions

use crate::command::extractor::{Progress, Rejection, RejectionReason};
use crate::core::types::MoveCommand;

/// Reply confirming an extracted command
pub fn success(command: &MoveCommand) -> String {
    format!(
        "Hey! Perfect, I understood that {}. Doing my job now!",
        summary(&Progress::from(command))
    )
}

/// Reply explaining why an instruction was rejected
pub fn rejection(rejection: &Rejection) -> String {
    let item = match &rejection.reason {
        RejectionReason::NotARequest => return "Please, a request must be placed.".to_string(),
        RejectionReason::InferenceUnavailable(detail) => {
            return format!(
                "The language models are unavailable right now ({}). Please try again later.",
                detail
            )
        }
        RejectionReason::UnsupportedDiscipline(discipline) => {
            return format!(
                "Sorry, {} requests are not supported yet.",
                discipline
            )
        }
        RejectionReason::NoDisciplineFound => "discipline",
        RejectionReason::NoTargetFound => "element name",
        RejectionReason::NoActionFound => "action",
        RejectionReason::NoDirectionFound => "direction",
        RejectionReason::NoMagnitudeFound | RejectionReason::MalformedNumber => "amount",
    };

    let understood = summary(&rejection.progress);
    let mut reply = if understood.is_empty() {
        "Sorry, ".to_string()
    } else {
        format!("Hey! I understood {}. However, ", understood)
    };
    reply.push_str(&format!(
        "I could not understand which {} you are talking about. ",
        item
    ));
    reply.push_str("Would you mind to rephrase it in a clear way for me and try again? Thanks in advance!");
    reply
}

/// Describe what was understood, stopping at the first missing piece
pub fn summary(progress: &Progress) -> String {
    let mut s = String::new();

    let Some(element) = &progress.element else {
        return s;
    };
    s.push_str(&format!("{} {}", article(element), element));

    let Some(target) = &progress.target else {
        return s;
    };
    s.push_str(&format!(" named {}", target));

    let Some(direction) = progress.direction else {
        return s;
    };
    s.push_str(&format!(" is requested to be moved {}", direction));

    if let Some((magnitude, unit)) = &progress.magnitude {
        s.push_str(&format!(" by {} {}", magnitude, unit));
    }

    s
}

fn article(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Direction;

    fn rejected(reason: RejectionReason, progress: Progress) -> Rejection {
        Rejection { reason, progress }
    }

    #[test]
    fn test_success_reply() {
        let command = MoveCommand::new("B125", "beam", Direction::Down, 0.2, "m");
        assert_eq!(
            success(&command),
            "Hey! Perfect, I understood that a beam named B125 is requested to be moved down by 0.2 m. Doing my job now!"
        );
    }

    #[test]
    fn test_not_a_request_reply() {
        let reply = rejection(&rejected(RejectionReason::NotARequest, Progress::default()));
        assert_eq!(reply, "Please, a request must be placed.");
    }

    #[test]
    fn test_rejection_without_progress() {
        let reply = rejection(&rejected(RejectionReason::NoTargetFound, Progress::default()));
        assert!(reply.starts_with("Sorry, I could not understand which element name"));
    }

    #[test]
    fn test_rejection_with_progress() {
        let progress = Progress {
            element: Some("column".into()),
            target: Some("C27".into()),
            direction: Some(Direction::Left),
            magnitude: None,
        };
        let reply = rejection(&rejected(RejectionReason::MalformedNumber, progress));
        assert!(reply.starts_with(
            "Hey! I understood a column named C27 is requested to be moved left. However, "
        ));
        assert!(reply.contains("which amount"));
    }

    #[test]
    fn test_generic_element_article() {
        let progress = Progress {
            element: Some("element".into()),
            ..Progress::default()
        };
        assert_eq!(summary(&progress), "an element");
    }

    #[test]
    fn test_unsupported_discipline_reply() {
        let reply = rejection(&rejected(
            RejectionReason::UnsupportedDiscipline("MEP".into()),
            Progress::default(),
        ));
        assert_eq!(
            reply,
            "Sorry, MEP requests are not supported yet."
        );
    }

    #[test]
    fn test_no_discipline_reply() {
        let reply = rejection(&rejected(RejectionReason::NoDisciplineFound, Progress::default()));
        assert!(reply.starts_with("Sorry, I could not understand which discipline"));
    }

    #[test]
    fn test_unavailable_reply_mentions_detail() {
        let reply = rejection(&rejected(
            RejectionReason::InferenceUnavailable("Inference timed out after 10s".into()),
            Progress::default(),
        ));
        assert!(reply.contains("timed out"));
    }
}
