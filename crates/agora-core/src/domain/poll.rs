use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 6;
pub const MAX_POLL_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub label: String,
    pub votes: u32,
    #[serde(default)]
    pub voters: Vec<String>,
}

/// Poll attached to a poll post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub options: Vec<PollOption>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ends_at: DateTime<Utc>,
    pub active: bool,
}

impl Poll {
    /// Open a poll running for `duration_days` from `now`.
    ///
    /// Blank labels are dropped before the option count is checked.
    pub fn open(
        labels: Vec<String>,
        duration_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let options: Vec<PollOption> = labels
            .into_iter()
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .map(|label| PollOption {
                label,
                votes: 0,
                voters: Vec::new(),
            })
            .collect();

        if options.len() < MIN_POLL_OPTIONS {
            return Err(DomainError::validation(
                "At least 2 poll options are required",
            ));
        }
        if options.len() > MAX_POLL_OPTIONS {
            return Err(DomainError::validation("A poll can have at most 6 options"));
        }
        if duration_days == 0 || duration_days > MAX_POLL_DAYS {
            return Err(DomainError::validation(
                "Poll duration must be between 1 and 7 days",
            ));
        }

        Ok(Self {
            options,
            ends_at: now + Duration::days(i64::from(duration_days)),
            active: true,
        })
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.ends_at
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.options
            .iter()
            .any(|option| option.voters.iter().any(|v| v == voter))
    }

    pub fn total_votes(&self) -> u32 {
        self.options.iter().map(|option| option.votes).sum()
    }

    /// Record `voter`'s choice of the option at `index`.
    pub fn cast(&mut self, index: usize, voter: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_open(now) {
            return Err(DomainError::PollClosed);
        }
        if self.has_voted(voter) {
            return Err(DomainError::AlreadyVoted);
        }

        let option = self
            .options
            .get_mut(index)
            .ok_or_else(|| DomainError::validation("Invalid poll option"))?;
        option.votes += 1;
        option.voters.push(voter.to_string());
        Ok(())
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    /// Human readable time left, e.g. `2d 4h`, `3h 15m`, `12m` or `Ended`.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> String {
        let remaining = self.ends_at - now;
        if remaining <= Duration::zero() {
            return "Ended".to_string();
        }

        let days = remaining.num_days();
        let hours = remaining.num_hours() % 24;
        let minutes = remaining.num_minutes() % 60;

        if days > 0 {
            format!("{days}d {hours}h")
        } else if hours > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{minutes}m")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn open_drops_blank_options() {
        let now = Utc::now();
        let poll = Poll::open(labels(&["Rust", "  ", "Go"]), 3, now).unwrap();

        assert_eq!(poll.options.len(), 2);
        assert_eq!(poll.ends_at, now + Duration::days(3));
        assert!(poll.is_open(now));
    }

    #[test]
    fn open_rejects_bad_input() {
        let now = Utc::now();
        assert!(Poll::open(labels(&["only one", ""]), 1, now).is_err());
        assert!(Poll::open(labels(&["a", "b"]), 0, now).is_err());
        assert!(Poll::open(labels(&["a", "b"]), 8, now).is_err());
        assert!(Poll::open(labels(&["1", "2", "3", "4", "5", "6", "7"]), 1, now).is_err());
    }

    #[test]
    fn cast_enforces_one_vote_per_voter() {
        let now = Utc::now();
        let mut poll = Poll::open(labels(&["yes", "no"]), 1, now).unwrap();

        poll.cast(1, "alice", now).unwrap();
        assert_eq!(poll.options[1].votes, 1);
        assert_eq!(poll.cast(0, "alice", now), Err(DomainError::AlreadyVoted));
        assert!(matches!(
            poll.cast(5, "bob", now),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(poll.total_votes(), 1);
    }

    #[test]
    fn closed_or_expired_poll_rejects_votes() {
        let now = Utc::now();
        let mut poll = Poll::open(labels(&["yes", "no"]), 1, now).unwrap();

        let later = now + Duration::days(2);
        assert_eq!(poll.cast(0, "carol", later), Err(DomainError::PollClosed));

        poll.close();
        assert_eq!(poll.cast(0, "carol", now), Err(DomainError::PollClosed));
    }

    #[test]
    fn formats_time_remaining() {
        let now = Utc::now();
        let mut poll = Poll::open(labels(&["a", "b"]), 2, now).unwrap();

        assert_eq!(poll.time_remaining(now), "2d 0h");

        poll.ends_at = now + Duration::minutes(200);
        assert_eq!(poll.time_remaining(now), "3h 20m");

        poll.ends_at = now + Duration::minutes(12);
        assert_eq!(poll.time_remaining(now), "12m");

        assert_eq!(poll.time_remaining(now + Duration::hours(1)), "Ended");
    }
}
