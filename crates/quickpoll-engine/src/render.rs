use crate::tally::{Tally, Verdict};
use quickpoll_models::{ActionButton, MessageBlock, Poll, PollAction, VotePayload};

/// Strip markdown control characters so an option label cannot break the
/// message formatting it is embedded in.
fn sanitize(label: &str) -> String {
    label
        .chars()
        .filter(|ch| !matches!(ch, '*' | '_' | '`' | '~'))
        .collect()
}

/// Live tally line(s) for a public poll: inline for the two-option case, a
/// bullet list otherwise.
pub fn vote_display(tally: &Tally) -> String {
    if tally.counts.len() == 2 {
        let (first, first_count) = &tally.counts[0];
        let (second, second_count) = &tally.counts[1];
        format!(
            "**Votes:** {}: {} | {}: {}",
            sanitize(first),
            first_count,
            sanitize(second),
            second_count
        )
    } else {
        let lines: Vec<String> = tally
            .counts
            .iter()
            .map(|(opt, count)| format!("• {}: {}", sanitize(opt), count))
            .collect();
        format!("**Votes:**\n{}", lines.join("\n"))
    }
}

fn poll_header(poll: &Poll, tally: &Tally) -> String {
    let lock_marker = if poll.vote_locked { " 🔒" } else { "" };
    let live = if poll.is_public {
        format!("\n━━━━━━━━━━━━━━━━━\n{}", vote_display(tally))
    } else {
        String::new()
    };
    let locked_note = if poll.vote_locked {
        " • Votes locked"
    } else {
        ""
    };
    format!(
        "## Poll has started{lock_marker}\n**{}**{live}\n_Created by: {}{locked_note}_",
        poll.question, poll.creator_name
    )
}

fn poll_buttons(poll: &Poll) -> Vec<ActionButton> {
    let mut buttons: Vec<ActionButton> = poll
        .options
        .iter()
        .map(|opt| {
            let payload = VotePayload {
                poll_id: poll.id.clone(),
                option: opt.clone(),
            };
            ActionButton {
                action: PollAction::Vote,
                value: serde_json::to_string(&payload).unwrap_or_default(),
                label: opt.clone(),
                danger: false,
            }
        })
        .collect();
    buttons.push(ActionButton {
        action: PollAction::Cancel,
        value: poll.id.clone(),
        label: "Cancel poll".to_string(),
        danger: true,
    });
    if poll.is_public {
        buttons.push(ActionButton {
            action: PollAction::Refresh,
            value: poll.id.clone(),
            label: "Refresh results".to_string(),
            danger: false,
        });
    }
    buttons
}

/// The open-poll message: question header (with live tallies when public) and
/// one button per option, plus cancel and, for public polls, refresh.
pub fn poll_blocks(poll: &Poll, tally: &Tally) -> Vec<MessageBlock> {
    vec![
        MessageBlock::Section {
            text: poll_header(poll, tally),
        },
        MessageBlock::Actions {
            elements: poll_buttons(poll),
        },
    ]
}

/// Terminal view after a creator cancellation. No action buttons remain.
pub fn cancelled_blocks(poll: &Poll) -> Vec<MessageBlock> {
    vec![MessageBlock::Section {
        text: format!(
            "## ⛔ Poll Cancelled\n**Question:** ~~{}~~\n_Cancelled by: {}_",
            poll.question, poll.creator_name
        ),
    }]
}

fn verdict_label(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Winner(option) => option.clone(),
        Verdict::Tie(_) => "TIE".to_string(),
        Verdict::NoVotes => "No votes".to_string(),
    }
}

/// Channel-visible results: per-option counts with one-decimal percentages
/// and the verdict line.
pub fn results_summary(poll: &Poll, tally: &Tally, verdict: &Verdict) -> String {
    let mut lines = String::new();
    for (opt, count) in &tally.counts {
        let percentage = tally.percentage(*count);
        lines.push_str(&format!("• {}: {} ({:.1}%)\n", sanitize(opt), count, percentage));
    }
    format!(
        "### 📋 Poll Results\n**Question:** {}\n_Created by: {}_\n━━━━━━━━━━━━━━━━━\n{}\n### Verdict: {}",
        poll.question,
        poll.creator_name,
        lines,
        verdict_label(verdict)
    )
}

/// Private breakdown for the creator: two-decimal percentages and the voter
/// display names behind every option.
pub fn detailed_results(poll: &Poll, tally: &Tally, voters: &[(String, Vec<String>)]) -> String {
    let mut lines = String::new();
    for (opt, names) in voters {
        let percentage = tally.percentage(tally.count(opt));
        let voters = if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        };
        lines.push_str(&format!("{} ({:.2}%): {}\n", sanitize(opt), percentage, voters));
    }
    format!(
        "### Detailed Poll Results:\n**{}**\n\n{}",
        poll.question, lines
    )
}
