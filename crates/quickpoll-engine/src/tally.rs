use quickpoll_models::Vote;

/// Per-option vote counts, in the poll's declared option order.
///
/// Counts are built by iterating the declared options, so a stored vote whose
/// label matches none of them is never counted (see DESIGN.md on the trust
/// boundary of the vote path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub counts: Vec<(String, usize)>,
    pub total: usize,
}

/// Closure-time outcome of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Winner(String),
    /// Two or more options share the maximum count. An equal maximum is
    /// always reported as a tie, never as a win for the first option.
    Tie(Vec<String>),
    NoVotes,
}

impl Tally {
    pub fn empty(options: &[String]) -> Self {
        Self {
            counts: options.iter().map(|opt| (opt.clone(), 0)).collect(),
            total: 0,
        }
    }

    pub fn from_votes(options: &[String], votes: &[Vote]) -> Self {
        let counts: Vec<(String, usize)> = options
            .iter()
            .map(|opt| {
                let count = votes.iter().filter(|vote| vote.option == *opt).count();
                (opt.clone(), count)
            })
            .collect();
        let total = counts.iter().map(|(_, count)| count).sum();
        Self { counts, total }
    }

    pub fn count(&self, option: &str) -> usize {
        self.counts
            .iter()
            .find(|(opt, _)| opt == option)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Share of the total for `count`, as a percentage. Zero when no votes
    /// were cast at all.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.total == 0 {
            return Verdict::NoVotes;
        }
        let max = self
            .counts
            .iter()
            .map(|(_, count)| *count)
            .max()
            .unwrap_or(0);
        let mut leaders: Vec<String> = self
            .counts
            .iter()
            .filter(|(_, count)| *count == max)
            .map(|(opt, _)| opt.clone())
            .collect();
        if leaders.len() > 1 {
            Verdict::Tie(leaders)
        } else {
            Verdict::Winner(leaders.remove(0))
        }
    }
}

/// Voter display names grouped per declared option, in vote order.
pub fn voters_by_option(options: &[String], votes: &[Vote]) -> Vec<(String, Vec<String>)> {
    options
        .iter()
        .map(|opt| {
            let voters = votes
                .iter()
                .filter(|vote| vote.option == *opt)
                .map(|vote| vote.voter_name.clone())
                .collect();
            (opt.clone(), voters)
        })
        .collect()
}
